//! Kubernetes implementation of the Cluster Gateway
//!
//! Each call loads credentials and builds its own client, then runs under
//! the configured call timeout. Responses are decoded into explicit records;
//! a record missing a required field fails the call instead of producing a
//! partial view.

use std::collections::BTreeMap;
use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::AsyncReadExt;
use k8s_openapi::api::batch::v1::{CronJob, Job, JobSpec};
use k8s_openapi::api::core::v1::{Container, EnvVar, Namespace, Pod, PodSpec, PodTemplateSpec};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::api::{Api, DeleteParams, ListParams, LogParams, PostParams, PropagationPolicy};
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Client, Config};
use orpheus_core::domain::cronjob::CronJobRecord;
use orpheus_core::domain::pod::PodRecord;
use orpheus_core::domain::workload::{
    Condition, EXEC_CODE_ENV, JOB_LABEL, LaunchedWorkload, REQUEST_ANNOTATION, RUNNER_CONTAINER,
    WorkloadDescriptor, WorkloadRecord, WorkloadRequest,
};
use tracing::{debug, warn};

use super::{ClusterGateway, ClusterReachability, GatewayError};

/// Context name reported when running with in-cluster credentials
const IN_CLUSTER_CONTEXT: &str = "in-cluster";

/// A freshly built client and the kubeconfig context it came from
struct Connection {
    client: Client,
    context: String,
}

/// Cluster Gateway talking to a real Kubernetes API server
#[derive(Debug, Clone)]
pub struct KubeGateway {
    /// Kubeconfig file; `None` infers the config (env, default path, in-cluster)
    kubeconfig: Option<PathBuf>,
    connect_timeout: Duration,
    call_timeout: Duration,
}

impl KubeGateway {
    pub fn new(kubeconfig: Option<PathBuf>, connect_timeout: Duration, call_timeout: Duration) -> Self {
        Self {
            kubeconfig,
            connect_timeout,
            call_timeout,
        }
    }

    async fn connect(&self) -> Result<Connection, GatewayError> {
        let (mut config, context) = match &self.kubeconfig {
            Some(path) => {
                let kubeconfig = Kubeconfig::read_from(path).map_err(|e| {
                    GatewayError::auth(format!(
                        "failed to read kubeconfig {}: {}",
                        path.display(),
                        e
                    ))
                })?;
                let context = kubeconfig
                    .current_context
                    .clone()
                    .unwrap_or_else(|| "default".to_string());
                let config =
                    Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default())
                        .await
                        .map_err(|e| {
                            GatewayError::auth(format!("failed to load kubeconfig: {}", e))
                        })?;
                (config, context)
            }
            None => {
                let config = Config::infer()
                    .await
                    .map_err(|e| GatewayError::auth(format!("failed to infer config: {}", e)))?;
                let context = Kubeconfig::read()
                    .ok()
                    .and_then(|k| k.current_context)
                    .unwrap_or_else(|| IN_CLUSTER_CONTEXT.to_string());
                (config, context)
            }
        };

        config.connect_timeout = Some(self.connect_timeout);
        config.read_timeout = Some(self.call_timeout);

        let client = Client::try_from(config)
            .map_err(|e| GatewayError::auth(format!("failed to create client: {}", e)))?;

        Ok(Connection { client, context })
    }

    /// Connect and run `call`, bounded by the call timeout.
    async fn run<T, F, Fut>(&self, operation: &str, call: F) -> Result<T, GatewayError>
    where
        F: FnOnce(Connection) -> Fut + Send,
        Fut: Future<Output = Result<T, GatewayError>> + Send,
        T: Send,
    {
        let attempt = async {
            let connection = self.connect().await?;
            call(connection).await
        };

        tokio::time::timeout(self.call_timeout, attempt)
            .await
            .map_err(|_| {
                GatewayError::network(format!(
                    "{} timed out after {:?}",
                    operation, self.call_timeout
                ))
            })?
    }
}

#[async_trait]
impl ClusterGateway for KubeGateway {
    async fn submit(
        &self,
        descriptor: &WorkloadDescriptor,
    ) -> Result<LaunchedWorkload, GatewayError> {
        let manifest = job_manifest(descriptor);
        let namespace = descriptor.namespace.as_str();

        self.run("submit", |conn| async move {
            let jobs: Api<Job> = Api::namespaced(conn.client, namespace);
            let created = jobs.create(&PostParams::default(), &manifest).await?;
            launched_from_job(created)
        })
        .await
    }

    async fn list(&self, namespace: &str) -> Result<Vec<WorkloadRecord>, GatewayError> {
        self.run("list jobs", |conn| async move {
            let jobs: Api<Job> = Api::namespaced(conn.client, namespace);
            let listing = jobs.list(&ListParams::default()).await?;
            debug!("Listed {} jobs in {}", listing.items.len(), namespace);
            listing.items.into_iter().map(record_from_job).collect()
        })
        .await
    }

    async fn get(&self, name: &str, namespace: &str) -> Result<WorkloadRecord, GatewayError> {
        self.run("get job", |conn| async move {
            let jobs: Api<Job> = Api::namespaced(conn.client, namespace);
            let job = jobs.get(name).await?;
            record_from_job(job)
        })
        .await
    }

    async fn delete(&self, name: &str, namespace: &str) -> Result<(), GatewayError> {
        self.run("delete job", |conn| async move {
            let jobs: Api<Job> = Api::namespaced(conn.client, namespace);
            let params = DeleteParams {
                propagation_policy: Some(PropagationPolicy::Background),
                ..Default::default()
            };
            jobs.delete(name, &params).await?;
            Ok(())
        })
        .await
    }

    async fn list_pods(&self, namespace: &str) -> Result<Vec<PodRecord>, GatewayError> {
        self.run("list pods", |conn| async move {
            let pods: Api<Pod> = Api::namespaced(conn.client, namespace);
            let listing = pods.list(&ListParams::default()).await?;
            listing.items.into_iter().map(pod_record).collect()
        })
        .await
    }

    async fn fetch_logs(
        &self,
        pod: &str,
        namespace: &str,
        container: &str,
    ) -> Result<String, GatewayError> {
        self.run("fetch logs", |conn| async move {
            let pods: Api<Pod> = Api::namespaced(conn.client, namespace);
            let params = LogParams {
                container: Some(container.to_string()),
                ..Default::default()
            };
            let mut stream = Box::pin(pods.log_stream(pod, &params).await?);
            let mut bytes = Vec::new();
            stream
                .read_to_end(&mut bytes)
                .await
                .map_err(|e| GatewayError::network(format!("reading logs of {}: {}", pod, e)))?;
            Ok(decode_log_bytes(&bytes))
        })
        .await
    }

    async fn list_cron_jobs(&self, namespace: &str) -> Result<Vec<CronJobRecord>, GatewayError> {
        self.run("list cron jobs", |conn| async move {
            let cron_jobs: Api<CronJob> = Api::namespaced(conn.client, namespace);
            let listing = cron_jobs.list(&ListParams::default()).await?;
            listing.items.into_iter().map(cron_job_record).collect()
        })
        .await
    }

    async fn create_cron_job(
        &self,
        namespace: &str,
        manifest: &serde_json::Value,
    ) -> Result<CronJobRecord, GatewayError> {
        let cron_job = cron_job_from_manifest(manifest, namespace)?;

        self.run("create cron job", |conn| async move {
            let cron_jobs: Api<CronJob> = Api::namespaced(conn.client, namespace);
            let created = cron_jobs.create(&PostParams::default(), &cron_job).await?;
            cron_job_record(created)
        })
        .await
    }

    async fn health_check(&self) -> Result<ClusterReachability, GatewayError> {
        self.run("list namespaces", |conn| async move {
            let namespaces: Api<Namespace> = Api::all(conn.client);
            let listing = namespaces.list(&ListParams::default()).await?;
            let names = listing
                .items
                .into_iter()
                .filter_map(|ns| ns.metadata.name)
                .collect();
            Ok(ClusterReachability {
                context: conn.context,
                namespaces: names,
            })
        })
        .await
    }
}

// =============================================================================
// Manifest construction
// =============================================================================

/// Type a caller-supplied CronJob manifest and pin it to `namespace`.
///
/// `apiVersion` and `kind` may be omitted.
pub fn cron_job_from_manifest(
    manifest: &serde_json::Value,
    namespace: &str,
) -> Result<CronJob, GatewayError> {
    let mut manifest = manifest.clone();
    if let Some(object) = manifest.as_object_mut() {
        object
            .entry("apiVersion")
            .or_insert_with(|| "batch/v1".into());
        object.entry("kind").or_insert_with(|| "CronJob".into());
    }

    let mut cron_job: CronJob = serde_json::from_value(manifest)
        .map_err(|e| GatewayError::invalid(format!("cron job manifest: {}", e)))?;
    cron_job.metadata.namespace = Some(namespace.to_string());

    Ok(cron_job)
}

pub fn cron_job_record(cron_job: CronJob) -> Result<CronJobRecord, GatewayError> {
    let name = cron_job
        .metadata
        .name
        .ok_or_else(|| GatewayError::decode("cron job without metadata.name"))?;
    let spec = cron_job
        .spec
        .ok_or_else(|| GatewayError::decode(format!("cron job {} has no spec", name)))?;
    let status = cron_job.status.unwrap_or_default();

    Ok(CronJobRecord {
        name,
        schedule: spec.schedule,
        suspend: spec.suspend.unwrap_or(false),
        active: status.active.map(|jobs| jobs.len()).unwrap_or(0),
        last_schedule_time: status.last_schedule_time.map(|t| t.0),
        last_successful_time: status.last_successful_time.map(|t| t.0),
    })
}

/// Container output is arbitrary bytes; invalid UTF-8 becomes U+FFFD
pub fn decode_log_bytes(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

/// Build the `batch/v1` Job submitted for a descriptor
pub fn job_manifest(descriptor: &WorkloadDescriptor) -> Job {
    let mut labels = BTreeMap::new();
    labels.insert(JOB_LABEL.to_string(), descriptor.name.clone());

    let mut annotations = BTreeMap::new();
    if let Ok(request) = serde_json::to_string(&descriptor.request) {
        annotations.insert(REQUEST_ANNOTATION.to_string(), request);
    }

    let container = Container {
        name: RUNNER_CONTAINER.to_string(),
        image: Some(descriptor.image.clone()),
        image_pull_policy: Some("Always".to_string()),
        env: Some(vec![EnvVar {
            name: EXEC_CODE_ENV.to_string(),
            value: Some(descriptor.command.clone()),
            ..Default::default()
        }]),
        ..Default::default()
    };

    Job {
        metadata: ObjectMeta {
            name: Some(descriptor.name.clone()),
            namespace: Some(descriptor.namespace.clone()),
            annotations: Some(annotations),
            ..Default::default()
        },
        spec: Some(JobSpec {
            backoff_limit: Some(descriptor.backoff_limit),
            template: PodTemplateSpec {
                metadata: Some(ObjectMeta {
                    labels: Some(labels),
                    ..Default::default()
                }),
                spec: Some(PodSpec {
                    containers: vec![container],
                    restart_policy: Some(descriptor.restart_policy.as_str().to_string()),
                    ..Default::default()
                }),
            },
            ..Default::default()
        }),
        ..Default::default()
    }
}

// =============================================================================
// Response decoding
// =============================================================================

fn required<T>(value: Option<T>, what: &str) -> Result<T, GatewayError> {
    value.ok_or_else(|| GatewayError::decode(format!("missing {}", what)))
}

/// Decode the orchestrator's echo of a created Job
pub fn launched_from_job(job: Job) -> Result<LaunchedWorkload, GatewayError> {
    let name = required(job.metadata.name, "job metadata.name")?;
    let namespace = required(job.metadata.namespace, "job metadata.namespace")?;
    let created_at = job.metadata.creation_timestamp.map(|t| t.0);

    let container = job
        .spec
        .and_then(|spec| spec.template.spec)
        .and_then(|pod| pod.containers.into_iter().next());
    let container = required(container, "job container")?;

    let image = required(container.image, "container image")?;
    let command = container
        .env
        .unwrap_or_default()
        .into_iter()
        .find(|env| env.name == EXEC_CODE_ENV)
        .and_then(|env| env.value);
    let command = required(command, "EXEC_CODE environment variable")?;

    Ok(LaunchedWorkload {
        name,
        namespace,
        image,
        command,
        created_at,
    })
}

/// Decode a Job from a listing
pub fn record_from_job(job: Job) -> Result<WorkloadRecord, GatewayError> {
    let name = required(job.metadata.name, "job metadata.name")?;
    let namespace = required(job.metadata.namespace, "job metadata.namespace")?;

    let request = job
        .metadata
        .annotations
        .as_ref()
        .and_then(|a| a.get(REQUEST_ANNOTATION))
        .and_then(|raw| match serde_json::from_str::<WorkloadRequest>(raw) {
            Ok(request) => Some(request),
            Err(e) => {
                warn!("Ignoring unreadable request annotation on {}: {}", name, e);
                None
            }
        });

    let status = job.status.unwrap_or_default();
    let conditions = status
        .conditions
        .unwrap_or_default()
        .into_iter()
        .map(|c| Condition {
            kind: c.type_,
            reason: c.reason,
            message: c.message,
        })
        .collect();

    Ok(WorkloadRecord {
        name,
        namespace,
        created_at: job.metadata.creation_timestamp.map(|t| t.0),
        start_time: status.start_time.map(|t| t.0),
        succeeded: status.succeeded.unwrap_or(0),
        failed: status.failed.unwrap_or(0),
        active: status.active.unwrap_or(0),
        conditions,
        request,
    })
}

/// Decode a Pod from a listing
pub fn pod_record(pod: Pod) -> Result<PodRecord, GatewayError> {
    let name = required(pod.metadata.name, "pod metadata.name")?;

    let containers = pod
        .spec
        .map(|spec| spec.containers.into_iter().map(|c| c.name).collect())
        .unwrap_or_default();

    let status = pod.status.unwrap_or_default();
    let conditions = status
        .conditions
        .unwrap_or_default()
        .into_iter()
        .map(|c| Condition {
            kind: c.type_,
            reason: c.reason,
            message: c.message,
        })
        .collect();

    Ok(PodRecord {
        name,
        phase: status.phase,
        start_time: status.start_time.map(|t| t.0),
        containers,
        conditions,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use k8s_openapi::api::batch::v1::{JobCondition, JobStatus};
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::Time;
    use std::io::Write;
    use orpheus_core::domain::workload::RestartPolicy;

    use crate::gateway::GatewayCause;

    fn descriptor() -> WorkloadDescriptor {
        let params = serde_json::from_str(r#"{"ticker":"SPY","days":30}"#).unwrap();
        WorkloadDescriptor {
            name: "job-plotchart-abcde".to_string(),
            namespace: "orpheus".to_string(),
            image: "runner:latest".to_string(),
            command: r#"from charts import plot_chart; plot_chart(ticker="SPY", days=30)"#
                .to_string(),
            restart_policy: RestartPolicy::Never,
            backoff_limit: 0,
            request: WorkloadRequest {
                function: "plot_chart".to_string(),
                params,
                image: "runner:latest".to_string(),
                module: "charts".to_string(),
            },
        }
    }

    #[test]
    fn test_manifest_shape() {
        let job = job_manifest(&descriptor());

        assert_eq!(job.metadata.name.as_deref(), Some("job-plotchart-abcde"));
        assert_eq!(job.metadata.namespace.as_deref(), Some("orpheus"));

        let spec = job.spec.as_ref().unwrap();
        assert_eq!(spec.backoff_limit, Some(0));

        let pod = spec.template.spec.as_ref().unwrap();
        assert_eq!(pod.restart_policy.as_deref(), Some("Never"));
        assert_eq!(pod.containers.len(), 1);

        let container = &pod.containers[0];
        assert_eq!(container.name, "runner");
        assert_eq!(container.image.as_deref(), Some("runner:latest"));
        assert_eq!(container.image_pull_policy.as_deref(), Some("Always"));
        let env = container.env.as_ref().unwrap();
        assert_eq!(env[0].name, "EXEC_CODE");
        assert!(env[0].value.as_deref().unwrap().starts_with("from charts import"));

        let labels = spec
            .template
            .metadata
            .as_ref()
            .and_then(|m| m.labels.as_ref())
            .unwrap();
        assert_eq!(labels.get("job").map(String::as_str), Some("job-plotchart-abcde"));
    }

    #[test]
    fn test_echo_decodes_back_to_launched_view() {
        let mut job = job_manifest(&descriptor());
        let created = chrono::Utc::now();
        job.metadata.creation_timestamp = Some(Time(created));

        let launched = launched_from_job(job).unwrap();
        assert_eq!(launched.name, "job-plotchart-abcde");
        assert_eq!(launched.namespace, "orpheus");
        assert_eq!(launched.image, "runner:latest");
        assert_eq!(launched.created_at, Some(created));
        assert!(launched.command.contains("plot_chart(ticker=\"SPY\", days=30)"));
    }

    #[test]
    fn test_echo_without_exec_code_is_decode_error() {
        let mut job = job_manifest(&descriptor());
        if let Some(pod) = job.spec.as_mut().and_then(|s| s.template.spec.as_mut()) {
            pod.containers[0].env = None;
        }

        let err = launched_from_job(job).unwrap_err();
        assert_eq!(err.cause, GatewayCause::Decode);
    }

    #[test]
    fn test_record_keeps_counts_and_request() {
        let mut job = job_manifest(&descriptor());
        job.status = Some(JobStatus {
            succeeded: Some(1),
            failed: Some(1),
            conditions: Some(vec![JobCondition {
                type_: "Complete".to_string(),
                status: "True".to_string(),
                reason: Some("Done".to_string()),
                ..Default::default()
            }]),
            ..Default::default()
        });

        let record = record_from_job(job).unwrap();
        assert_eq!(record.succeeded, 1);
        assert_eq!(record.failed, 1);
        assert_eq!(record.active, 0);
        assert_eq!(record.conditions[0].kind, "Complete");
        assert_eq!(record.request, Some(descriptor().request));
    }

    #[test]
    fn test_record_without_name_is_decode_error() {
        let mut job = job_manifest(&descriptor());
        job.metadata.name = None;

        let err = record_from_job(job).unwrap_err();
        assert_eq!(err.cause, GatewayCause::Decode);
    }

    #[test]
    fn test_record_with_garbled_annotation_has_no_request() {
        let mut job = job_manifest(&descriptor());
        job.metadata.annotations = Some(BTreeMap::from([(
            REQUEST_ANNOTATION.to_string(),
            "not json".to_string(),
        )]));

        let record = record_from_job(job).unwrap();
        assert!(record.request.is_none());
    }

    #[test]
    fn test_pod_without_spec_has_no_containers() {
        let pod = Pod {
            metadata: ObjectMeta {
                name: Some("job-plotchart-abcde-x7k2p".to_string()),
                ..Default::default()
            },
            ..Default::default()
        };

        let record = pod_record(pod).unwrap();
        assert!(record.containers.is_empty());
        assert!(record.belongs_to("job-plotchart-abcde"));
    }

    #[test]
    fn test_log_bytes_decode_lossily() {
        assert_eq!(decode_log_bytes(b"chart saved\n"), "chart saved\n");
        assert_eq!(decode_log_bytes(&[b'o', b'k', 0xff, b'\n']), "ok\u{fffd}\n");
    }

    #[test]
    fn test_cron_job_manifest_is_pinned_to_namespace() {
        let manifest = serde_json::json!({
            "metadata": { "name": "nightly-report", "namespace": "elsewhere" },
            "spec": {
                "schedule": "0 2 * * *",
                "jobTemplate": {
                    "spec": {
                        "template": {
                            "spec": {
                                "containers": [{ "name": "runner", "image": "runner:latest" }],
                                "restartPolicy": "Never"
                            }
                        }
                    }
                }
            }
        });

        let cron_job = cron_job_from_manifest(&manifest, "orpheus").unwrap();
        assert_eq!(cron_job.metadata.namespace.as_deref(), Some("orpheus"));

        let record = cron_job_record(cron_job).unwrap();
        assert_eq!(record.name, "nightly-report");
        assert_eq!(record.schedule, "0 2 * * *");
        assert!(!record.suspend);
        assert_eq!(record.active, 0);
    }

    #[test]
    fn test_untyped_cron_job_manifest_is_rejected() {
        let manifest = serde_json::json!({
            "metadata": { "name": "nightly-report" },
            "spec": { "schedule": 5 }
        });

        let err = cron_job_from_manifest(&manifest, "orpheus").unwrap_err();
        assert_eq!(err.cause, GatewayCause::Rejected);
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_cron_job_without_spec_fails_decoding() {
        let cron_job = CronJob {
            metadata: ObjectMeta {
                name: Some("nightly-report".to_string()),
                ..Default::default()
            },
            ..Default::default()
        };

        let err = cron_job_record(cron_job).unwrap_err();
        assert_eq!(err.cause, GatewayCause::Decode);
    }

    fn kubeconfig_for(server: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"apiVersion: v1
kind: Config
clusters:
- name: silent
  cluster:
    server: {server}
contexts:
- name: silent
  context:
    cluster: silent
    user: silent
current-context: silent
users:
- name: silent
  user:
    token: test
"#
        )
        .unwrap();
        file
    }

    #[tokio::test]
    async fn test_unanswered_call_times_out_as_network() {
        // Accepts connections and never answers.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        let kubeconfig = kubeconfig_for(&format!("http://{}", addr));
        let gateway = KubeGateway::new(
            Some(kubeconfig.path().to_path_buf()),
            Duration::from_secs(1),
            Duration::from_millis(500),
        );

        let err = gateway.list("orpheus").await.unwrap_err();

        assert_eq!(err.cause, GatewayCause::Network);
        assert!(err.is_retryable());
        assert!(err.message.contains("timed out"), "{}", err.message);
    }

    #[tokio::test]
    async fn test_missing_kubeconfig_is_auth() {
        let dir = tempfile::tempdir().unwrap();
        let gateway = KubeGateway::new(
            Some(dir.path().join("absent-kubeconfig")),
            Duration::from_secs(1),
            Duration::from_secs(5),
        );

        let err = gateway.health_check().await.unwrap_err();

        assert_eq!(err.cause, GatewayCause::Auth);
        assert!(!err.is_retryable());
    }
}
