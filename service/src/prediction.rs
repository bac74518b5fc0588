use async_trait::async_trait;
use mockall::automock;
use time::Date;
use uuid::Uuid;

use crate::ServiceError;

/// Forecasting collaborator the orchestrator consults for workload-aware
/// strategies; the model that produces these numbers lives outside this
/// crate's scope, this is the port it plugs into.
#[automock]
#[async_trait]
pub trait PredictionConsumer {
    async fn predict_daily_demand(
        &self,
        service_id: Uuid,
        date: Date,
    ) -> Result<f64, ServiceError>;

    async fn specialist_allocation_ratio(
        &self,
        specialist_id: Uuid,
        date: Date,
    ) -> Result<f64, ServiceError>;
}
