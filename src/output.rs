//! Terminal-facing rendering: caret parse reports, lint lines and gid
//! tables. Nothing here prints by itself, the CLI decides where the text
//! goes.

use colored::Colorize;
use serde::Serialize;

use crate::error::{Error, Result};
use crate::format::Format;
use crate::gid::GidFields;
use crate::lexer::LineIndex;
use crate::linter::{FileReport, Verdict};

/// Render a parse failure the way a compiler would: the offending line with
/// a caret marker underneath, tabs preserved so the marker stays aligned in
/// a terminal.
///
/// ```text
/// File project.pbxproj, line 2, column 15
///             runOnlyFor DeploymentPostprocessing = 1;
///                        ^~~~~~~~~~~~~~~~~~~~~~~~
/// Error: parsing Xcode plist failed: found 'DeploymentPostprocessing', expected '='
/// ```
pub fn report_parse_status(filename: &str, bytes: &[u8], error: &Error) -> String {
    let diag = match error.diagnostic() {
        Some(d) => d,
        None => return format!("File {filename}\n{}\n", format!("Error: {error}").red()),
    };

    let input = String::from_utf8_lossy(bytes);
    let index = LineIndex::new(&input);
    let line_text = index.line_text(diag.line);

    // Tabs are copied into the marker line so the caret lands under the
    // token at any tab width.
    let mut marker = String::new();
    for c in line_text.chars().take(diag.column - 1) {
        marker.push(if c == '\t' { '\t' } else { ' ' });
    }
    marker.push('^');
    for _ in 1..diag.width {
        marker.push('~');
    }

    let mut message = format!("Error: {}: found {}", diag.message, diag.found);
    if !diag.expected.is_empty() {
        message.push_str(&format!(", expected {}", diag.expected.join(" or ")));
    }

    format!(
        "File {filename}, line {}, column {}\n{line_text}\n{}\n{}\n",
        diag.line,
        diag.column,
        marker.yellow(),
        message.red(),
    )
}

/// One line per linted file.
pub fn report_lint(report: &FileReport) -> String {
    let verdict = report.outcome.verdict;
    let label = match verdict {
        Verdict::Canonical => verdict.describe().green(),
        Verdict::NonCanonical => verdict.describe().yellow(),
        Verdict::Unparsable => verdict.describe().red(),
    };
    let mut line = format!("{}: {label}", report.path.display());
    if let Some(stats) = &report.outcome.stats {
        line.push_str(&format!(
            " (-{}/+{} lines vs canonical)",
            stats.deleted, stats.inserted
        ));
    } else if verdict == Verdict::NonCanonical && report.outcome.format != Format::Xcode {
        line.push_str(&format!(
            " ({} is nothing that Xcode can read)",
            report.outcome.format
        ));
    }
    line.push('\n');
    line
}

/// Serialization style for gid listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
    JsonPretty,
}

/// A decoded gid, ready for table or JSON output.
#[derive(Debug, Clone, Serialize)]
pub struct GidRecord {
    pub gid: String,
    pub date: String,
    pub user: u8,
    pub pid: u8,
    pub seq: u16,
    pub random: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl GidRecord {
    pub fn decode(gid: &str) -> Result<Self> {
        let fields = GidFields::decode(gid)?;
        Ok(GidRecord {
            gid: gid.to_string(),
            date: fields.date.format("%Y-%m-%dT%H:%M:%SZ").to_string(),
            user: fields.user,
            pid: fields.pid,
            seq: fields.seq,
            random: fields.random,
            comment: None,
        })
    }

    pub fn with_comment(mut self, comment: Option<String>) -> Self {
        self.comment = comment;
        self
    }
}

pub fn format_gid_records(records: &[GidRecord], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(format!("{}\n", serde_json::to_string(records)?)),
        OutputFormat::JsonPretty => {
            Ok(format!("{}\n", serde_json::to_string_pretty(records)?))
        }
        OutputFormat::Text => {
            let mut out = String::new();
            let header = format!(
                "{:<24}  {:<20}  {:>4}  {:>3}  {:>5}  {:>10}",
                "GID", "DATE", "USER", "PID", "SEQ", "RANDOM"
            );
            out.push_str(&format!("{}\n", header.bold()));
            for r in records {
                out.push_str(&format!(
                    "{:<24}  {:<20}  {:>4}  {:>3}  {:>5}  {:>10}",
                    r.gid, r.date, r.user, r.pid, r.seq, r.random
                ));
                if let Some(comment) = &r.comment {
                    out.push_str(&format!("  {comment}"));
                }
                out.push('\n');
            }
            Ok(out)
        }
    }
}
