//! Platform connector and session traits

use async_trait::async_trait;
use std::fmt::Debug;
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, warn};

use super::types::{CreateExperimentParams, ExperimentMetadata, ExperimentSummary};
use crate::domain::experiment::ExperimentMetrics;
use crate::domain::DomainError;

/// One open session against the experiment platform
#[async_trait]
pub trait ExperimentPlatform: Send + Sync + Debug {
    /// Authenticate the session
    async fn login(&self) -> Result<(), DomainError>;

    /// Create an experiment and report whatever the platform returns
    async fn create_experiment(
        &self,
        params: &CreateExperimentParams,
    ) -> Result<ExperimentMetadata, DomainError>;

    /// Current counters for both arms
    async fn fetch_metrics(&self, experiment_id: &str) -> Result<ExperimentMetrics, DomainError>;

    async fn list_experiments(&self) -> Result<Vec<ExperimentSummary>, DomainError>;

    /// Release the session; must be safe to call after any failure
    async fn close(&self) -> Result<(), DomainError>;
}

/// Opens platform sessions
#[async_trait]
pub trait PlatformConnector: Send + Sync + Debug {
    async fn connect(&self) -> Result<Arc<dyn ExperimentPlatform>, DomainError>;
}

/// Run `op` inside a session that is closed whether `op` succeeds or fails
///
/// A close failure is logged and never replaces the operation's result.
pub async fn with_session<T, F, Fut>(
    connector: &dyn PlatformConnector,
    op: F,
) -> Result<T, DomainError>
where
    F: FnOnce(Arc<dyn ExperimentPlatform>) -> Fut + Send,
    Fut: Future<Output = Result<T, DomainError>> + Send,
    T: Send,
{
    let session = connector.connect().await?;
    debug!("Opened platform session");

    let result = op(Arc::clone(&session)).await;

    if let Err(e) = session.close().await {
        warn!(error = %e, "Failed to close platform session");
    } else {
        debug!("Closed platform session");
    }

    result
}
