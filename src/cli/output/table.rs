//! Table output formatting for CLI commands
//!
//! Ranked solutions, search statistics and model lists rendered with
//! comfy-table.

use comfy_table::{presets, Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use std::env;

use super::truncate;
use crate::domain::models::{ReportedSolution, SearchStats};

/// Table formatter for CLI output
pub struct TableFormatter {
    /// Whether to use colors in output
    use_colors: bool,
    /// Maximum width for tables (None = auto)
    max_width: Option<u16>,
}

impl TableFormatter {
    /// Create a new table formatter
    pub fn new() -> Self {
        Self {
            use_colors: supports_color(),
            max_width: None,
        }
    }

    /// Create a new table formatter with custom settings
    pub const fn with_config(use_colors: bool, max_width: Option<u16>) -> Self {
        Self {
            use_colors,
            max_width,
        }
    }

    /// Ranked solutions, best first.
    pub fn format_solutions(&self, solutions: &[ReportedSolution]) -> String {
        let mut table = self.create_base_table();

        table.set_header(vec![
            Cell::new("Rank").add_attribute(Attribute::Bold),
            Cell::new("Score").add_attribute(Attribute::Bold),
            Cell::new("Found").add_attribute(Attribute::Bold),
            Cell::new("Final thought").add_attribute(Attribute::Bold),
            Cell::new("Justification").add_attribute(Attribute::Bold),
        ]);

        for solution in solutions {
            let last_thought = solution
                .steps
                .last()
                .map_or("-", |step| step.thought.as_str());

            let score = Cell::new(format!("{}/10", solution.score))
                .set_alignment(CellAlignment::Right);
            let score = if self.use_colors {
                score.fg(score_color(solution.score))
            } else {
                score
            };

            table.add_row(vec![
                Cell::new(solution.rank),
                score,
                Cell::new(format!("#{}", solution.discovery_index + 1)),
                Cell::new(truncate(last_thought, 50)),
                Cell::new(truncate(&solution.final_justification, 50)),
            ]);
        }

        table.to_string()
    }

    /// Counters collected during the search.
    pub fn format_stats(&self, stats: &SearchStats) -> String {
        let mut table = self.create_base_table();
        table.set_header(vec![
            Cell::new("Metric").add_attribute(Attribute::Bold),
            Cell::new("Count").add_attribute(Attribute::Bold),
        ]);

        for (metric, count) in [
            ("Nodes expanded", stats.nodes_expanded),
            ("Thoughts generated", stats.thoughts_generated),
            ("Evaluations", stats.evaluations),
            ("Generation failures", stats.generation_failures),
            ("Evaluation fallbacks", stats.evaluation_fallbacks),
            ("Branches pruned", stats.branches_pruned),
        ] {
            let count_cell = Cell::new(count).set_alignment(CellAlignment::Right);
            let count_cell = if self.use_colors
                && count > 0
                && matches!(metric, "Generation failures" | "Evaluation fallbacks")
            {
                count_cell.fg(Color::Yellow)
            } else {
                count_cell
            };
            table.add_row(vec![Cell::new(metric), count_cell]);
        }

        table.to_string()
    }

    /// Models advertised by the oracle, with the selected one marked.
    pub fn format_models(&self, models: &[String], selected: &str) -> String {
        let mut table = self.create_base_table();
        table.set_header(vec![
            Cell::new("Model").add_attribute(Attribute::Bold),
            Cell::new("Selected").add_attribute(Attribute::Bold),
        ]);

        for model in models {
            let marker = if model == selected {
                let cell = Cell::new("✓");
                if self.use_colors {
                    cell.fg(Color::Green)
                } else {
                    cell
                }
            } else {
                Cell::new("")
            };
            table.add_row(vec![Cell::new(model), marker]);
        }

        table.to_string()
    }

    fn create_base_table(&self) -> Table {
        let mut table = Table::new();

        table
            .load_preset(presets::UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic);

        if let Some(width) = self.max_width {
            table.set_width(width);
        }

        table
    }
}

impl Default for TableFormatter {
    fn default() -> Self {
        Self::new()
    }
}

/// Check if color output is supported
fn supports_color() -> bool {
    // Respect NO_COLOR environment variable
    if env::var("NO_COLOR").is_ok() {
        return false;
    }

    if let Ok(term) = env::var("TERM") {
        if term == "dumb" {
            return false;
        }
    }

    console::colors_enabled()
}

const fn score_color(score: u8) -> Color {
    match score {
        8..=10 => Color::Green,
        5..=7 => Color::Yellow,
        _ => Color::Red,
    }
}
