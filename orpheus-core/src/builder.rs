//! Job Spec Builder
//!
//! Turns a [`WorkloadRequest`] into a uniquely named [`WorkloadDescriptor`].
//! No I/O happens here; the only source of non-determinism is the name
//! suffix.
//!
//! The execution statement (`from MODULE import FUNCTION; FUNCTION(args)`) is
//! an opaque payload for the runtime container. The builder only makes sure
//! it stays on one line; deciding which callables may run is left to the
//! execution environment.

use serde_json::{Map, Value};
use uuid::Uuid;

use crate::domain::workload::{RestartPolicy, WorkloadDescriptor, WorkloadRequest};
use crate::error::ValidationError;

const NAME_PREFIX: &str = "job-";
const SUFFIX_LEN: usize = 5;
/// DNS label limit
const MAX_NAME_LEN: usize = 63;
const MAX_TAG_LEN: usize = 128;

/// Build a workload descriptor for `request` in `namespace`.
pub fn build(
    request: &WorkloadRequest,
    namespace: &str,
) -> Result<WorkloadDescriptor, ValidationError> {
    build_with_suffix(request, namespace, &random_suffix())
}

fn build_with_suffix(
    request: &WorkloadRequest,
    namespace: &str,
    suffix: &str,
) -> Result<WorkloadDescriptor, ValidationError> {
    validate_request(request)?;

    let name = job_name(&request.function, suffix)?;
    let command = execution_statement(&request.module, &request.function, &request.params);

    Ok(WorkloadDescriptor {
        name,
        namespace: namespace.to_string(),
        image: request.image.clone(),
        command,
        restart_policy: RestartPolicy::Never,
        backoff_limit: 0,
        request: request.clone(),
    })
}

/// Lowercase and drop everything outside `[a-z0-9-]`
pub fn sanitize_function_name(function: &str) -> String {
    function
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-')
        .collect()
}

fn job_name(function: &str, suffix: &str) -> Result<String, ValidationError> {
    let mut segment = sanitize_function_name(function);
    if segment.is_empty() {
        return Err(ValidationError::UnnamableFunction(function.to_string()));
    }

    let budget = MAX_NAME_LEN - NAME_PREFIX.len() - 1 - SUFFIX_LEN;
    segment.truncate(budget);

    Ok(format!("{NAME_PREFIX}{segment}-{suffix}"))
}

fn random_suffix() -> String {
    // Collision avoidance only; five hex digits of a v4 UUID.
    let mut suffix = Uuid::new_v4().simple().to_string();
    suffix.truncate(SUFFIX_LEN);
    suffix
}

/// Render `key=literal, key=literal` in map order
pub fn render_arguments(params: &Map<String, Value>) -> String {
    params
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join(", ")
}

fn execution_statement(module: &str, function: &str, params: &Map<String, Value>) -> String {
    format!(
        "from {module} import {function}; {function}({})",
        render_arguments(params)
    )
}

// =============================================================================
// Validation
// =============================================================================

fn validate_request(request: &WorkloadRequest) -> Result<(), ValidationError> {
    if request.function.trim().is_empty() {
        return Err(ValidationError::EmptyFunction);
    }
    if request.module.trim().is_empty() {
        return Err(ValidationError::EmptyModule);
    }
    if is_multi_line(&request.function) {
        return Err(ValidationError::MultiLine { field: "function" });
    }
    if is_multi_line(&request.module) {
        return Err(ValidationError::MultiLine { field: "module" });
    }

    if let Some(key) = request.params.keys().find(|k| !is_identifier(k)) {
        return Err(ValidationError::InvalidParameterName(key.clone()));
    }

    validate_image(&request.image)
}

fn is_multi_line(s: &str) -> bool {
    s.contains(['\n', '\r'])
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Check the shape of a container image reference
/// (`[registry/]path[:tag][@algorithm:digest]`).
pub fn validate_image(reference: &str) -> Result<(), ValidationError> {
    let malformed = |reason| ValidationError::MalformedImage {
        reference: reference.to_string(),
        reason,
    };

    if reference.trim().is_empty() {
        return Err(ValidationError::EmptyImage);
    }
    if reference.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(malformed("contains whitespace"));
    }

    let name = match reference.split_once('@') {
        Some((name, digest)) => {
            let valid_digest = digest
                .split_once(':')
                .is_some_and(|(algo, hex)| !algo.is_empty() && !hex.is_empty())
                && !digest.contains('@');
            if !valid_digest {
                return Err(malformed("digest must be algorithm:hex"));
            }
            name
        }
        None => reference,
    };

    let (repository, tag) = match name.rfind(':') {
        Some(i) if !name[i + 1..].contains('/') => (&name[..i], Some(&name[i + 1..])),
        _ => (name, None),
    };

    if repository.is_empty() {
        return Err(malformed("missing repository"));
    }

    if let Some(tag) = tag {
        let valid_tag = !tag.is_empty()
            && tag.len() <= MAX_TAG_LEN
            && tag
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'));
        if !valid_tag {
            return Err(malformed("invalid tag"));
        }
    }

    let components: Vec<&str> = repository.split('/').collect();
    if components.iter().any(|c| c.is_empty()) {
        return Err(malformed("empty path component"));
    }

    // The first component is a registry host when it looks like one.
    let first = components[0];
    let has_registry = components.len() > 1
        && (first.contains('.') || first.contains(':') || first == "localhost");
    let path = if has_registry {
        &components[1..]
    } else {
        &components[..]
    };

    let valid_path = path.iter().all(|component| {
        component
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '.' | '_' | '-'))
    });
    if !valid_path {
        return Err(malformed("repository path must be lowercase alphanumerics"));
    }

    Ok(())
}
