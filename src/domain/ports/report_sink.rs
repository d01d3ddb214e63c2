use async_trait::async_trait;

use crate::domain::errors::DomainResult;
use crate::domain::models::SearchReport;

/// Destination for structured run reports.
#[async_trait]
pub trait ReportSink: Send + Sync {
    /// Store `report` and return where it was written.
    async fn persist(&self, report: &SearchReport) -> DomainResult<String>;
}
