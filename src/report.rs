//! Run summaries
//!
//! `summarize` is a pure function of the flat result list and the registry's
//! category partition. Categories are sliced out of the results by position,
//! so their stats always line up with the registry order.

use std::fmt::Write as _;
use std::io::{self, BufWriter, Write};
use std::ops::Range;
use std::path::Path;

use serde::Serialize;

use crate::common::{Error, Result};
use crate::scenario::{Category, ScenarioResult};

/// Pass/fail counts for one category
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryStats {
    pub name: String,
    pub passed: usize,
    pub total: usize,
    /// Position of this category's results in the flat list
    #[serde(skip)]
    pub range: Range<usize>,
}

impl CategoryStats {
    pub fn rate(&self) -> f64 {
        rate(self.passed, self.total)
    }

    pub fn tier(&self) -> Tier {
        Tier::classify(self.passed, self.total)
    }
}

/// Summary of one run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub passed: usize,
    pub total: usize,
    pub rate: f64,
    pub categories: Vec<CategoryStats>,
    pub results: Vec<ScenarioResult>,
}

impl RunReport {
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }

    pub fn all_passed(&self) -> bool {
        self.passed == self.total
    }

    /// Results belonging to a category
    pub fn category_results(&self, stats: &CategoryStats) -> &[ScenarioResult] {
        &self.results[stats.range.clone()]
    }

    /// Results that did not pass, in run order
    pub fn failures(&self) -> impl Iterator<Item = &ScenarioResult> {
        self.results.iter().filter(|r| !r.passed())
    }
}

/// Status marker for a category line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    /// Every scenario passed
    Full,
    /// At least 80% passed
    Partial,
    /// Below 80%, or nothing to run
    Failing,
}

impl Tier {
    pub fn classify(passed: usize, total: usize) -> Self {
        if total > 0 && passed == total {
            Tier::Full
        } else if rate(passed, total) >= 80.0 {
            Tier::Partial
        } else {
            Tier::Failing
        }
    }

    pub fn marker(self) -> &'static str {
        match self {
            Tier::Full => "✓",
            Tier::Partial => "!",
            Tier::Failing => "✗",
        }
    }
}

/// Closing remark for the overall pass rate
pub fn closing_remark(passed: usize, total: usize) -> &'static str {
    let rate = rate(passed, total);
    if total > 0 && passed == total {
        "All scenarios passed! The system is working as specified."
    } else if rate >= 90.0 {
        "Excellent! Almost every scenario passed. Fix the few that failed."
    } else if rate >= 80.0 {
        "Good progress. Most scenarios passed; focus on the failures to finish."
    } else {
        "Several scenarios failed. Review the implementation against the failures below."
    }
}

/// Percentage, 0 when there is nothing to count
fn rate(passed: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        passed as f64 / total as f64 * 100.0
    }
}

/// Build a report from a run's results and the registry categories
///
/// Overall counts cover every result. Category stats take consecutive
/// slices of `results` sized like the categories; a slice is cut short if
/// the results run out.
pub fn summarize(results: &[ScenarioResult], categories: &[Category]) -> RunReport {
    let mut stats = Vec::with_capacity(categories.len());
    let mut start = 0;

    for category in categories {
        let begin = start.min(results.len());
        let end = (start + category.len()).min(results.len());
        let passed = results[begin..end].iter().filter(|r| r.passed()).count();

        stats.push(CategoryStats {
            name: category.name.clone(),
            passed,
            total: category.len(),
            range: begin..end,
        });
        start += category.len();
    }

    let passed = results.iter().filter(|r| r.passed()).count();
    let total = results.len();

    RunReport {
        title: None,
        passed,
        total,
        rate: rate(passed, total),
        categories: stats,
        results: results.to_vec(),
    }
}

/// Render the report for the terminal
pub fn render(report: &RunReport) -> String {
    let mut out = String::new();
    let rule = "=".repeat(60);

    let _ = writeln!(out, "{}", rule);
    let _ = writeln!(out, "FINAL REPORT");
    let _ = writeln!(out, "{}", rule);
    let _ = writeln!(
        out,
        "Result: {}/{} passed ({:.1}%)",
        report.passed,
        report.total,
        report.rate()
    );
    let _ = writeln!(out);

    for category in &report.categories {
        let _ = writeln!(
            out,
            "{} {}: {}/{} ({:.1}%)",
            category.tier().marker(),
            category.name,
            category.passed,
            category.total,
            category.rate()
        );
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "{}", closing_remark(report.passed, report.total));

    let failures: Vec<_> = report.failures().collect();
    if !failures.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Not passed:");
        for result in failures {
            let _ = writeln!(
                out,
                "  ✗ {} [{}]: {}",
                result.scenario.id,
                result.scenario.category,
                result.outcome
            );
        }
    }

    out
}

/// Report file format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
}

/// Write the report to a sink
pub fn persist<W: Write>(report: &RunReport, sink: &mut W, format: ReportFormat) -> io::Result<()> {
    match format {
        ReportFormat::Json => {
            serde_json::to_writer_pretty(&mut *sink, report)?;
            writeln!(sink)?;
        }
        ReportFormat::Text => {
            match &report.title {
                Some(title) => writeln!(sink, "SCENARIO REPORT - {}", title)?,
                None => writeln!(sink, "SCENARIO REPORT")?,
            }
            writeln!(sink, "{}", "=".repeat(60))?;
            writeln!(sink)?;
            writeln!(
                sink,
                "Total: {}/{} passed ({:.1}%)",
                report.passed,
                report.total,
                report.rate()
            )?;

            for category in &report.categories {
                writeln!(sink)?;
                writeln!(sink, "{}:", category.name)?;
                for result in report.category_results(category) {
                    writeln!(sink, "  {}: {}", result.scenario.id, result.outcome)?;
                }
            }
        }
    }
    sink.flush()
}

/// Write the report to a file, replacing any previous report
pub fn persist_to_path(report: &RunReport, path: &Path, format: ReportFormat) -> Result<()> {
    let file = std::fs::File::create(path).map_err(|e| Error::sink_write(path, e))?;
    let mut writer = BufWriter::new(file);
    persist(report, &mut writer, format).map_err(|e| Error::sink_write(path, e))?;
    tracing::info!(path = %path.display(), "Report written");
    Ok(())
}
