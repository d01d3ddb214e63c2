//! Implementation of the `thicket solve` command.

use anyhow::{bail, Context, Result};
use clap::{Args, ValueEnum};
use console::style;
use serde::Serialize;
use std::fmt::Write as _;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use super::connect_oracle;
use crate::adapters::report::FileReportSink;
use crate::cli::output::{create_spinner, output, CommandOutput, ProgressBarExt, TableFormatter};
use crate::domain::models::{
    Config, Problem, ReportFormat, SearchReport, SearchStrategy, StrategyKind,
};
use crate::domain::ports::{Oracle, ReportSink};
use crate::services::ReasoningPipeline;

#[derive(Args, Debug)]
pub struct SolveArgs {
    /// Problem statement
    pub problem: String,

    /// Search strategy: breadth-first (bfs) or depth-first-beam (beam)
    #[arg(short, long)]
    pub strategy: Option<StrategyKind>,

    /// Solutions to collect before a breadth-first search stops
    #[arg(short, long)]
    pub amplitude: Option<usize>,

    /// Children generated for every expanded node
    #[arg(short, long)]
    pub branching_factor: Option<usize>,

    /// Children kept per node by depth-first-beam
    #[arg(short = 'k', long)]
    pub beam_width: Option<usize>,

    /// Model id sent to the oracle (defaults to the first model it lists)
    #[arg(short, long)]
    pub model: Option<String>,

    /// Do not write a report file
    #[arg(long)]
    pub no_report: bool,

    /// Report file format
    #[arg(long, value_enum)]
    pub report_format: Option<ReportFormatArg>,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReportFormatArg {
    Json,
    Yaml,
}

impl From<ReportFormatArg> for ReportFormat {
    fn from(format: ReportFormatArg) -> Self {
        match format {
            ReportFormatArg::Json => Self::Json,
            ReportFormatArg::Yaml => Self::Yaml,
        }
    }
}

impl SolveArgs {
    /// Fold the command-line overrides into `config` and build the strategy
    /// to run. The branching factor applies to the selected strategy only.
    pub fn apply(&self, config: &mut Config) -> SearchStrategy {
        if let Some(model) = &self.model {
            config.oracle.model = Some(model.clone());
        }
        if let Some(format) = self.report_format {
            config.report.format = format.into();
        }
        if self.no_report {
            config.report.enabled = false;
        }

        let search = &mut config.search;
        let kind = self.strategy.unwrap_or(search.strategy);
        search.strategy = kind;
        if let Some(amplitude) = self.amplitude {
            search.amplitude = amplitude;
        }
        if let Some(branching_factor) = self.branching_factor {
            match kind {
                StrategyKind::BreadthFirst => search.bfs_branching_factor = branching_factor,
                StrategyKind::DepthFirstBeam => search.beam_branching_factor = branching_factor,
            }
        }
        if let Some(beam_width) = self.beam_width {
            search.beam_width = beam_width;
        }

        search.strategy_for(kind)
    }
}

#[derive(Debug, Serialize)]
pub struct SolveOutput {
    pub report: SearchReport,
    pub report_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report_error: Option<String>,
}

impl CommandOutput for SolveOutput {
    fn to_human(&self) -> String {
        let report = &self.report;
        let formatter = TableFormatter::new();
        let mut out = String::new();

        let _ = writeln!(out, "{}", style("Problem").bold().underlined());
        let _ = writeln!(out, "{}\n", report.problem);
        let _ = writeln!(out, "{} {}", style("Strategy:").bold(), report.strategy);
        let _ = writeln!(out, "{} {}\n", style("Model:").bold(), report.model);

        let _ = writeln!(out, "{}", style("Steps").bold().underlined());
        for step in &report.steps {
            let _ = writeln!(out, "  {}", step.label());
        }
        out.push('\n');

        match report.solutions.first() {
            Some(best) => {
                let _ = writeln!(
                    out,
                    "{} {}",
                    style("Best solution").bold().underlined(),
                    style(format!("({}/10)", best.score)).green().bold()
                );
                for step in &best.steps {
                    let _ = writeln!(
                        out,
                        "\n  {} {}",
                        style(format!("STEP {}: {}", step.ordinal + 1, step.step_name)).cyan(),
                        style(format!("[{}/10]", step.score)).dim()
                    );
                    for line in step.thought.lines() {
                        let _ = writeln!(out, "    {line}");
                    }
                }
                let _ = writeln!(
                    out,
                    "\n  {} {}\n",
                    style("Verdict:").bold(),
                    best.final_justification
                );

                let _ = writeln!(
                    out,
                    "{} (top {} of {})",
                    style("Ranked solutions").bold().underlined(),
                    report.solutions.len(),
                    report.total_solutions
                );
                let _ = writeln!(out, "{}\n", formatter.format_solutions(&report.solutions));
            }
            None => {
                let _ = writeln!(out, "{}\n", style("No solution was found.").yellow());
            }
        }

        let _ = writeln!(out, "{}", style("Synthesis").bold().underlined());
        let _ = writeln!(out, "{}\n", report.synthesis);

        let _ = writeln!(out, "{}", style("Search statistics").bold().underlined());
        let _ = writeln!(out, "{}", formatter.format_stats(&report.stats));

        match (&self.report_path, &self.report_error) {
            (Some(path), _) => {
                let _ = write!(out, "\nReport saved to {}", style(path).cyan());
            }
            (None, Some(error)) => {
                let _ = write!(out, "\n{} {error}", style("Report not saved:").yellow());
            }
            (None, None) => {}
        }

        out.trim_end().to_string()
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub async fn execute(args: SolveArgs, mut config: Config, json_mode: bool) -> Result<()> {
    let strategy = args.apply(&mut config);
    strategy.validate().context("Invalid search parameters")?;

    let problem = Problem::new(&args.problem);
    if problem.is_blank() {
        bail!("Problem statement is empty");
    }

    let oracle = connect_oracle(&config).await?;
    let model = oracle.model().to_string();
    let oracle: Arc<dyn Oracle> = Arc::new(oracle);

    let cancel = CancellationToken::new();
    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, cancelling search");
            interrupt.cancel();
        }
    });

    let pipeline = ReasoningPipeline::from_config(oracle, &config);
    let spinner = create_spinner(format!("Searching ({strategy})"), json_mode);
    let outcome = match pipeline.solve(problem, strategy, &cancel).await {
        Ok(outcome) => {
            spinner.finish_success(format!("{} solution(s) found", outcome.result.len()));
            outcome
        }
        Err(e) => {
            spinner.finish_error("search aborted");
            return Err(e).context("Search failed");
        }
    };

    let report = SearchReport::from_outcome(&outcome, config.report.top_n, &model);
    let (report_path, report_error) = if config.report.enabled {
        let sink = FileReportSink::new(&config.report.directory, config.report.format);
        match sink.persist(&report).await {
            Ok(path) => (Some(path), None),
            Err(e) => {
                warn!(error = %e, "failed to save report");
                (None, Some(e.to_string()))
            }
        }
    } else {
        (None, None)
    };

    output(
        &SolveOutput {
            report,
            report_path,
            report_error,
        },
        json_mode,
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{SearchResult, SearchStats, SolveOutcome, Step};

    fn args(strategy: Option<StrategyKind>) -> SolveArgs {
        SolveArgs {
            problem: "p".to_string(),
            strategy,
            amplitude: None,
            branching_factor: Some(4),
            beam_width: None,
            model: Some("qwen".to_string()),
            no_report: true,
            report_format: Some(ReportFormatArg::Yaml),
        }
    }

    #[test]
    fn test_apply_branching_factor_targets_selected_strategy() {
        let mut config = Config::default();
        let strategy = args(Some(StrategyKind::DepthFirstBeam)).apply(&mut config);

        assert_eq!(strategy, SearchStrategy::depth_first_beam(4, 2));
        assert_eq!(config.search.bfs_branching_factor, 2);
        assert_eq!(config.oracle.model.as_deref(), Some("qwen"));
        assert_eq!(config.report.format, ReportFormat::Yaml);
        assert!(!config.report.enabled);
    }

    #[test]
    fn test_apply_defaults_to_configured_strategy() {
        let mut config = Config::default();
        let strategy = args(None).apply(&mut config);
        assert_eq!(strategy, SearchStrategy::breadth_first(3, 4));
    }

    #[test]
    fn test_human_output_without_solutions() {
        let outcome = SolveOutcome {
            problem: Problem::new("p"),
            strategy: SearchStrategy::breadth_first(1, 1),
            steps: vec![Step::new(0, "Count", "", "")],
            result: SearchResult::ranked(Vec::new(), SearchStats::default()),
            synthesis: "No solution was found.".to_string(),
        };
        let rendered = SolveOutput {
            report: SearchReport::from_outcome(&outcome, 3, "mock-model"),
            report_path: None,
            report_error: None,
        }
        .to_human();

        assert!(rendered.contains("STEP 1: Count"));
        assert!(rendered.contains("No solution was found."));
        assert!(!rendered.contains("Report saved"));
    }
}
