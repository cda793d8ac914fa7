//! Bulk Operation Coordinator
//!
//! Applies one lifecycle operation to an operator-selected set of jobs.
//! Items run one after another; a failing item is recorded and the batch
//! moves on.

use std::collections::HashSet;
use std::future::Future;

use orpheus_core::dto::job::{BulkItemResult, BulkOperation, BulkOutcome};

use crate::service::lifecycle::{JobError, LifecycleService};

/// Drop repeated names, keeping the first occurrence
pub fn dedup_selection(names: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    names
        .into_iter()
        .filter(|name| seen.insert(name.clone()))
        .collect()
}

/// Run `operation` once per distinct name, sequentially.
///
/// The returned list has one entry per distinct name, keyed by name, in
/// selection order. `Ok(Some(text))` carries output (log text) back to the
/// caller. Blank names fail without running `operation`.
pub async fn apply_to_selection<F, Fut>(names: Vec<String>, mut operation: F) -> Vec<BulkItemResult>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<Option<String>, JobError>>,
{
    let names = dedup_selection(names);
    let mut results = Vec::with_capacity(names.len());

    for name in names {
        if name.trim().is_empty() {
            results.push(BulkItemResult {
                name,
                outcome: BulkOutcome::Failed {
                    error: "name is required".to_string(),
                },
            });
            continue;
        }

        let outcome = match operation(name.clone()).await {
            Ok(output) => BulkOutcome::Succeeded { output },
            Err(e) => {
                tracing::warn!("Bulk item {} failed: {}", name, e);
                BulkOutcome::Failed {
                    error: e.to_string(),
                }
            }
        };
        results.push(BulkItemResult { name, outcome });
    }

    results
}

/// Apply a named lifecycle operation to a selection
pub async fn run(
    service: &LifecycleService,
    names: Vec<String>,
    operation: BulkOperation,
) -> Vec<BulkItemResult> {
    tracing::info!("Bulk {} over {} selected job(s)", operation, names.len());

    let results = match operation {
        BulkOperation::Delete => {
            apply_to_selection(names, |name| async move {
                service.delete(&name).await.map(|_| None)
            })
            .await
        }
        BulkOperation::Restart => {
            apply_to_selection(names, |name| async move {
                service.restart(&name).await.map(|_| None)
            })
            .await
        }
        BulkOperation::Logs => {
            apply_to_selection(names, |name| async move {
                service.fetch_logs_for_job(&name).await.map(Some)
            })
            .await
        }
    };

    let failed = results.iter().filter(|r| !r.outcome.is_success()).count();
    if failed > 0 {
        tracing::warn!("Bulk {}: {} of {} item(s) failed", operation, failed, results.len());
    }

    results
}
