//! Report sink writing one JSON or YAML file per run.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{ReportFormat, SearchReport};
use crate::domain::ports::ReportSink;

/// Writes reports to `<dir>/tot_<strategy>_<timestamp>.<ext>`.
pub struct FileReportSink {
    directory: PathBuf,
    format: ReportFormat,
}

impl FileReportSink {
    pub fn new(directory: impl Into<PathBuf>, format: ReportFormat) -> Self {
        Self {
            directory: directory.into(),
            format,
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    fn file_name(&self, report: &SearchReport) -> String {
        format!(
            "tot_{}_{}.{}",
            report.strategy.kind().file_tag(),
            report.created_at.format("%Y%m%d_%H%M%S"),
            self.format.extension()
        )
    }

    fn render(&self, report: &SearchReport) -> DomainResult<String> {
        Ok(match self.format {
            ReportFormat::Json => serde_json::to_string_pretty(report)?,
            ReportFormat::Yaml => serde_yaml::to_string(report)?,
        })
    }
}

#[async_trait]
impl ReportSink for FileReportSink {
    async fn persist(&self, report: &SearchReport) -> DomainResult<String> {
        let contents = self.render(report)?;

        tokio::fs::create_dir_all(&self.directory)
            .await
            .map_err(|e| {
                DomainError::ReportFailed(format!(
                    "cannot create {}: {e}",
                    self.directory.display()
                ))
            })?;

        let mut path = self.directory.join(self.file_name(report));
        if tokio::fs::try_exists(&path).await.unwrap_or(false) {
            // Two runs in the same second: disambiguate with the run id.
            path = self.directory.join(format!(
                "tot_{}_{}_{}.{}",
                report.strategy.kind().file_tag(),
                report.created_at.format("%Y%m%d_%H%M%S"),
                report.run_id.simple(),
                self.format.extension()
            ));
        }

        tokio::fs::write(&path, contents)
            .await
            .map_err(|e| {
                DomainError::ReportFailed(format!("cannot write {}: {e}", path.display()))
            })?;

        info!(path = %path.display(), run_id = %report.run_id, "report saved");
        Ok(path.display().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{
        Problem, SearchResult, SearchStats, SearchStrategy, SolveOutcome, Step,
    };
    use tempfile::TempDir;

    fn report() -> SearchReport {
        let outcome = SolveOutcome {
            problem: Problem::new("p"),
            strategy: SearchStrategy::depth_first_beam(3, 2),
            steps: vec![Step::new(0, "Count", "", "")],
            result: SearchResult::ranked(Vec::new(), SearchStats::default()),
            synthesis: "none".to_string(),
        };
        SearchReport::from_outcome(&outcome, 3, "mock-model")
    }

    #[tokio::test]
    async fn test_persist_writes_json_named_by_strategy() {
        let dir = TempDir::new().unwrap();
        let sink = FileReportSink::new(dir.path().join("results"), ReportFormat::Json);

        let location = sink.persist(&report()).await.unwrap();

        let path = PathBuf::from(&location);
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("tot_beam_"));
        assert!(name.ends_with(".json"));

        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written["model"], "mock-model");
        assert_eq!(written["strategy"]["strategy"], "depth-first-beam");
    }

    #[tokio::test]
    async fn test_persist_same_second_does_not_overwrite() {
        let dir = TempDir::new().unwrap();
        let sink = FileReportSink::new(dir.path(), ReportFormat::Yaml);
        let first = report();
        let mut second = first.clone();
        second.run_id = uuid::Uuid::new_v4();

        let a = sink.persist(&first).await.unwrap();
        let b = sink.persist(&second).await.unwrap();

        assert_ne!(a, b);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 2);
    }
}
