//! Conformance linter: does a project file match its canonical rendition
//! byte for byte?

use std::path::{Path, PathBuf};

use crate::diff::{self, DiffStats};
use crate::error::{Error, Result};
use crate::format::Format;
use crate::parser;
use crate::project::{find_projectfiles, project_name_for_path};
use crate::writer;

/// Fallback project name for files outside a recognized wrapper directory.
/// Only synthesized comments depend on it, so the verdict of a canonical
/// file is unaffected unless the file really was written under a different
/// name.
pub const DEFAULT_PROJECT_NAME: &str = "project";

/// Lint verdict, ordered by severity. The numeric value doubles as the
/// process exit code, and a batch reports the worst verdict seen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verdict {
    Canonical,
    NonCanonical,
    Unparsable,
}

impl Verdict {
    pub fn exit_code(self) -> u8 {
        match self {
            Verdict::Canonical => 0,
            Verdict::NonCanonical => 1,
            Verdict::Unparsable => 2,
        }
    }

    pub fn describe(self) -> &'static str {
        match self {
            Verdict::Canonical => "canonical",
            Verdict::NonCanonical => "not canonical",
            Verdict::Unparsable => "unparsable",
        }
    }
}

/// Outcome of linting one input.
#[derive(Debug)]
pub struct LintOutcome {
    pub verdict: Verdict,
    /// The format the input was read as (or assumed to be when parsing
    /// failed). JSON or XML here explains a `NonCanonical` verdict: valid
    /// content, but not something Xcode itself can read.
    pub format: Format,
    /// The parse failure behind an `Unparsable` verdict.
    pub error: Option<Error>,
    /// Line-level difference from canonical, when both sides are native text.
    pub stats: Option<DiffStats>,
}

/// Lint in-memory bytes. Input that parses as JSON or XML is valid but by
/// definition not the canonical native form.
pub fn lint_bytes(bytes: &[u8], projectname: &str) -> LintOutcome {
    let (root, info) = parser::parse(bytes);
    let root = match root {
        Some(root) => root,
        None => {
            return LintOutcome {
                verdict: Verdict::Unparsable,
                format: info.format,
                error: info.error,
                stats: None,
            }
        }
    };
    if info.format != Format::Xcode {
        return LintOutcome {
            verdict: Verdict::NonCanonical,
            format: info.format,
            error: None,
            stats: None,
        };
    }
    let canonical = writer::write_native(&root, projectname);
    if canonical.as_bytes() == bytes {
        LintOutcome {
            verdict: Verdict::Canonical,
            format: Format::Xcode,
            error: None,
            stats: None,
        }
    } else {
        // Native input is valid UTF-8 at this point.
        let input = String::from_utf8_lossy(bytes);
        let stats = diff::stats(&diff::diff_lines(&input, &canonical));
        LintOutcome {
            verdict: Verdict::NonCanonical,
            format: Format::Xcode,
            error: None,
            stats: Some(stats),
        }
    }
}

/// A linted file. The bytes are kept so error reports render against
/// exactly what was linted, not a second read of a possibly changed file.
#[derive(Debug)]
pub struct FileReport {
    pub path: PathBuf,
    pub bytes: Vec<u8>,
    pub outcome: LintOutcome,
}

pub fn lint_file(path: &Path) -> Result<FileReport> {
    let bytes = std::fs::read(path).map_err(|source| Error::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    let name = project_name_for_path(path);
    let outcome = lint_bytes(
        &bytes,
        name.as_deref().unwrap_or(DEFAULT_PROJECT_NAME),
    );
    Ok(FileReport {
        path: path.to_path_buf(),
        bytes,
        outcome,
    })
}

/// Expand the argument list: directories are searched recursively for
/// `project.pbxproj` files, plain files pass through.
pub fn expand_paths(paths: &[PathBuf]) -> Vec<PathBuf> {
    let mut expanded = Vec::new();
    for path in paths {
        if path.is_dir() {
            expanded.extend(find_projectfiles(path));
        } else {
            expanded.push(path.clone());
        }
    }
    expanded
}

/// The worst verdict in a batch.
pub fn batch_verdict(reports: &[FileReport]) -> Verdict {
    reports
        .iter()
        .map(|r| r.outcome.verdict)
        .max()
        .unwrap_or(Verdict::Canonical)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testdata::MINI_PROJECT;

    #[test]
    fn test_canonical_input() {
        let outcome = lint_bytes(MINI_PROJECT.as_bytes(), "MiniProject");
        assert_eq!(outcome.verdict, Verdict::Canonical);
        assert!(outcome.error.is_none());
    }

    #[test]
    fn test_whitespace_deviation_is_noncanonical() {
        let relaxed = MINI_PROJECT.replace(" = ", "  =  ");
        let outcome = lint_bytes(relaxed.as_bytes(), "MiniProject");
        assert_eq!(outcome.verdict, Verdict::NonCanonical);
        let stats = outcome.stats.unwrap();
        assert!(stats.deleted > 0 && stats.inserted > 0);
    }

    #[test]
    fn test_reordered_keys_are_noncanonical() {
        // Swap two root fields; the content is identical after parsing.
        let reordered = MINI_PROJECT.replace(
            "\tarchiveVersion = 1;\n\tclasses = {\n\t};\n",
            "\tclasses = {\n\t};\n\tarchiveVersion = 1;\n",
        );
        assert_ne!(reordered, MINI_PROJECT);
        let outcome = lint_bytes(reordered.as_bytes(), "MiniProject");
        assert_eq!(outcome.verdict, Verdict::NonCanonical);
    }

    #[test]
    fn test_wrong_project_name_is_noncanonical() {
        // The synthesized configuration list comment embeds the name.
        let outcome = lint_bytes(MINI_PROJECT.as_bytes(), "SomethingElse");
        assert_eq!(outcome.verdict, Verdict::NonCanonical);
    }

    #[test]
    fn test_json_input_is_noncanonical() {
        let outcome = lint_bytes(br#"{"objectVersion": "46", "objects": {}}"#, "P");
        assert_eq!(outcome.verdict, Verdict::NonCanonical);
        assert_eq!(outcome.format, Format::Json);
        assert!(outcome.stats.is_none());
    }

    #[test]
    fn test_outcome_reports_detected_format() {
        assert_eq!(
            lint_bytes(MINI_PROJECT.as_bytes(), "MiniProject").format,
            Format::Xcode
        );
        let truncated = &MINI_PROJECT[..MINI_PROJECT.len() / 2];
        assert_eq!(
            lint_bytes(truncated.as_bytes(), "MiniProject").format,
            Format::Xcode
        );
    }

    #[test]
    fn test_truncated_input_is_unparsable() {
        let truncated = &MINI_PROJECT[..MINI_PROJECT.len() / 2];
        let outcome = lint_bytes(truncated.as_bytes(), "MiniProject");
        assert_eq!(outcome.verdict, Verdict::Unparsable);
        assert!(outcome.error.is_some());
    }

    #[test]
    fn test_verdict_ordering() {
        assert!(Verdict::Canonical < Verdict::NonCanonical);
        assert!(Verdict::NonCanonical < Verdict::Unparsable);
        assert_eq!(Verdict::Unparsable.exit_code(), 2);
    }

    #[test]
    fn test_batch_takes_worst_verdict() {
        let reordered = MINI_PROJECT.replace(" = ", "  =  ");
        let truncated = &MINI_PROJECT[..MINI_PROJECT.len() / 2];
        let reports = vec![
            FileReport {
                path: PathBuf::from("a"),
                bytes: MINI_PROJECT.as_bytes().to_vec(),
                outcome: lint_bytes(MINI_PROJECT.as_bytes(), "MiniProject"),
            },
            FileReport {
                path: PathBuf::from("b"),
                bytes: reordered.as_bytes().to_vec(),
                outcome: lint_bytes(reordered.as_bytes(), "MiniProject"),
            },
            FileReport {
                path: PathBuf::from("c"),
                bytes: truncated.as_bytes().to_vec(),
                outcome: lint_bytes(truncated.as_bytes(), "MiniProject"),
            },
        ];
        assert_eq!(reports[0].outcome.verdict, Verdict::Canonical);
        assert_eq!(reports[1].outcome.verdict, Verdict::NonCanonical);
        assert_eq!(reports[2].outcome.verdict, Verdict::Unparsable);
        assert_eq!(batch_verdict(&reports), Verdict::Unparsable);
    }

    #[test]
    fn test_batch_of_nothing_is_canonical() {
        assert_eq!(batch_verdict(&[]), Verdict::Canonical);
    }

    #[test]
    fn test_lint_file_and_directory_expansion() {
        let dir = tempfile::tempdir().unwrap();
        let wrapper = dir.path().join("MiniProject.xcodeproj");
        std::fs::create_dir_all(&wrapper).unwrap();
        let file = wrapper.join("project.pbxproj");
        std::fs::write(&file, MINI_PROJECT).unwrap();

        let expanded = expand_paths(&[dir.path().to_path_buf()]);
        assert_eq!(expanded, vec![file.clone()]);

        let report = lint_file(&file).unwrap();
        assert_eq!(report.outcome.verdict, Verdict::Canonical);
        assert_eq!(report.bytes, MINI_PROJECT.as_bytes());
    }
}
