//! In-memory stand-ins for the cluster and the datastore

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use orpheus_console::api::{AppState, create_router};
use orpheus_console::gateway::{ClusterGateway, ClusterReachability, GatewayError};
use orpheus_console::repository::Datastore;
use orpheus_console::service::{LifecycleService, MetricsService};
use orpheus_core::domain::cronjob::{self, CronJobRecord};
use orpheus_core::domain::metrics::{
    CumulativeCounters, DatastoreMetadata, TimescaleInfo,
};
use orpheus_core::domain::pod::PodRecord;
use orpheus_core::domain::workload::{
    LaunchedWorkload, WorkloadDescriptor, WorkloadRecord, WorkloadRequest,
};
use serde_json::json;

pub const NAMESPACE: &str = "orpheus";

#[derive(Default)]
struct ClusterState {
    /// Jobs in submission order
    jobs: Vec<WorkloadRecord>,
    pods: Vec<PodRecord>,
    logs: HashMap<String, String>,
    submitted: Vec<WorkloadDescriptor>,
    deleted: Vec<String>,
    failing_deletes: HashSet<String>,
    cron_jobs: Vec<CronJobRecord>,
    unreachable: bool,
    no_namespaces: bool,
}

/// Fake cluster keeping jobs and pods in memory
#[derive(Default, Clone)]
pub struct FakeGateway {
    state: Arc<Mutex<ClusterState>>,
}

impl FakeGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_job(&self, record: WorkloadRecord) {
        self.state.lock().unwrap().jobs.push(record);
    }

    pub fn add_pod(&self, name: &str, containers: &[&str], logs: &str) {
        let mut state = self.state.lock().unwrap();
        state.pods.push(PodRecord {
            name: name.to_string(),
            phase: Some("Succeeded".to_string()),
            start_time: None,
            containers: containers.iter().map(|c| c.to_string()).collect(),
            conditions: Vec::new(),
        });
        state.logs.insert(name.to_string(), logs.to_string());
    }

    pub fn fail_delete_of(&self, name: &str) {
        self.state
            .lock()
            .unwrap()
            .failing_deletes
            .insert(name.to_string());
    }

    pub fn hide_namespaces(&self) {
        self.state.lock().unwrap().no_namespaces = true;
    }

    pub fn cron_jobs(&self) -> Vec<CronJobRecord> {
        self.state.lock().unwrap().cron_jobs.clone()
    }

    pub fn set_unreachable(&self) {
        self.state.lock().unwrap().unreachable = true;
    }

    pub fn submitted(&self) -> Vec<WorkloadDescriptor> {
        self.state.lock().unwrap().submitted.clone()
    }

    pub fn deleted(&self) -> Vec<String> {
        self.state.lock().unwrap().deleted.clone()
    }

    fn check_reachable(&self) -> Result<(), GatewayError> {
        if self.state.lock().unwrap().unreachable {
            return Err(GatewayError::network("connection refused"));
        }
        Ok(())
    }
}

#[async_trait]
impl ClusterGateway for FakeGateway {
    async fn submit(
        &self,
        descriptor: &WorkloadDescriptor,
    ) -> Result<LaunchedWorkload, GatewayError> {
        self.check_reachable()?;
        let mut state = self.state.lock().unwrap();

        if state.jobs.iter().any(|job| job.name == descriptor.name) {
            return Err(GatewayError::rejected(409, "jobs.batch already exists"));
        }

        let created_at = Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).single();
        state.jobs.push(WorkloadRecord {
            name: descriptor.name.clone(),
            namespace: descriptor.namespace.clone(),
            created_at,
            start_time: None,
            succeeded: 0,
            failed: 0,
            active: 0,
            conditions: Vec::new(),
            request: Some(descriptor.request.clone()),
        });
        state.submitted.push(descriptor.clone());

        Ok(LaunchedWorkload {
            name: descriptor.name.clone(),
            namespace: descriptor.namespace.clone(),
            image: descriptor.image.clone(),
            command: descriptor.command.clone(),
            created_at,
        })
    }

    async fn list(&self, namespace: &str) -> Result<Vec<WorkloadRecord>, GatewayError> {
        self.check_reachable()?;
        let state = self.state.lock().unwrap();
        Ok(state
            .jobs
            .iter()
            .filter(|job| job.namespace == namespace)
            .cloned()
            .collect())
    }

    async fn get(&self, name: &str, namespace: &str) -> Result<WorkloadRecord, GatewayError> {
        self.check_reachable()?;
        let state = self.state.lock().unwrap();
        state
            .jobs
            .iter()
            .find(|job| job.name == name && job.namespace == namespace)
            .cloned()
            .ok_or_else(|| GatewayError::rejected(404, format!("jobs.batch \"{}\" not found", name)))
    }

    async fn delete(&self, name: &str, namespace: &str) -> Result<(), GatewayError> {
        self.check_reachable()?;
        let mut state = self.state.lock().unwrap();

        if state.failing_deletes.contains(name) {
            return Err(GatewayError::rejected(500, format!("cannot delete {}", name)));
        }

        let before = state.jobs.len();
        state
            .jobs
            .retain(|job| !(job.name == name && job.namespace == namespace));
        if state.jobs.len() == before {
            return Err(GatewayError::rejected(404, format!("jobs.batch \"{}\" not found", name)));
        }

        state.deleted.push(name.to_string());
        Ok(())
    }

    async fn list_pods(&self, _namespace: &str) -> Result<Vec<PodRecord>, GatewayError> {
        self.check_reachable()?;
        Ok(self.state.lock().unwrap().pods.clone())
    }

    async fn fetch_logs(
        &self,
        pod: &str,
        _namespace: &str,
        _container: &str,
    ) -> Result<String, GatewayError> {
        self.check_reachable()?;
        self.state
            .lock()
            .unwrap()
            .logs
            .get(pod)
            .cloned()
            .ok_or_else(|| GatewayError::rejected(404, format!("pods \"{}\" not found", pod)))
    }

    async fn list_cron_jobs(&self, _namespace: &str) -> Result<Vec<CronJobRecord>, GatewayError> {
        self.check_reachable()?;
        Ok(self.state.lock().unwrap().cron_jobs.clone())
    }

    async fn create_cron_job(
        &self,
        _namespace: &str,
        manifest: &serde_json::Value,
    ) -> Result<CronJobRecord, GatewayError> {
        self.check_reachable()?;
        let name = cronjob::manifest_name(manifest)
            .map_err(|e| GatewayError::invalid(e.to_string()))?;
        let schedule = manifest["spec"]["schedule"]
            .as_str()
            .ok_or_else(|| GatewayError::invalid("spec.schedule is required"))?;

        let mut state = self.state.lock().unwrap();
        if state.cron_jobs.iter().any(|cron| cron.name == name) {
            return Err(GatewayError::rejected(409, "cronjobs.batch already exists"));
        }

        let record = CronJobRecord {
            name: name.to_string(),
            schedule: schedule.to_string(),
            suspend: manifest["spec"]["suspend"].as_bool().unwrap_or(false),
            active: 0,
            last_schedule_time: None,
            last_successful_time: None,
        };
        state.cron_jobs.push(record.clone());
        Ok(record)
    }

    async fn health_check(&self) -> Result<ClusterReachability, GatewayError> {
        self.check_reachable()?;
        let namespaces = if self.state.lock().unwrap().no_namespaces {
            Vec::new()
        } else {
            vec!["default".to_string(), NAMESPACE.to_string()]
        };
        Ok(ClusterReachability {
            context: "kind-orpheus".to_string(),
            namespaces,
        })
    }
}

/// Fake datastore replaying cumulative transaction counts
pub struct FakeDatastore {
    transactions: Mutex<Vec<u64>>,
    down: bool,
}

impl FakeDatastore {
    pub fn with_transactions(readings: &[u64]) -> Self {
        Self {
            transactions: Mutex::new(readings.iter().rev().copied().collect()),
            down: false,
        }
    }

    pub fn down() -> Self {
        Self {
            transactions: Mutex::new(Vec::new()),
            down: true,
        }
    }
}

#[async_trait]
impl Datastore for FakeDatastore {
    async fn ping(&self) -> Result<(), sqlx::Error> {
        if self.down {
            return Err(sqlx::Error::PoolTimedOut);
        }
        Ok(())
    }

    async fn counters(&self) -> Result<CumulativeCounters, sqlx::Error> {
        let transactions = self
            .transactions
            .lock()
            .unwrap()
            .pop()
            .ok_or(sqlx::Error::PoolTimedOut)?;
        Ok(CumulativeCounters {
            transactions,
            inserts: transactions / 10,
            selects: transactions / 2,
        })
    }

    async fn connections(&self) -> Result<i64, sqlx::Error> {
        Ok(3)
    }

    async fn metadata(&self) -> Result<DatastoreMetadata, sqlx::Error> {
        if self.down {
            return Err(sqlx::Error::PoolTimedOut);
        }
        let uptime_start = Utc
            .with_ymd_and_hms(2026, 1, 1, 0, 0, 0)
            .single()
            .ok_or(sqlx::Error::PoolTimedOut)?;
        Ok(DatastoreMetadata {
            server_version: "PostgreSQL 16.2".to_string(),
            uptime_start,
            uptime_seconds: 3600,
            total_tables: 12,
            size_pretty: "8 MB".to_string(),
            size_bytes: 8_388_608,
            timescale: TimescaleInfo::default(),
            status: "healthy".to_string(),
        })
    }
}

pub fn plot_chart_request() -> WorkloadRequest {
    serde_json::from_value(json!({
        "function": "plot_chart",
        "params": { "ticker": "SPY", "days": 30 },
        "image": "registry.local/orpheus/runner:latest",
        "module": "charts"
    }))
    .unwrap()
}

pub fn record(name: &str, succeeded: i32, failed: i32, active: i32) -> WorkloadRecord {
    WorkloadRecord {
        name: name.to_string(),
        namespace: NAMESPACE.to_string(),
        created_at: None,
        start_time: None,
        succeeded,
        failed,
        active,
        conditions: Vec::new(),
        request: None,
    }
}

pub fn lifecycle(gateway: &FakeGateway) -> LifecycleService {
    LifecycleService::new(Arc::new(gateway.clone()), NAMESPACE)
}

pub fn app(gateway: &FakeGateway, datastore: FakeDatastore) -> axum::Router {
    create_router(AppState::new(
        lifecycle(gateway),
        MetricsService::new(Arc::new(datastore)),
    ))
}
