//! # pbxplist
//!
//! A library for reading, canonicalizing and converting Xcode
//! `project.pbxproj` files: the old-style OpenStep plist dialect Xcode still
//! writes, complete with its synthesized `/* comments */`, plus JSON and XML
//! bridges, a conformance linter and the 96-bit object identifier scheme.
//!
//! ## Example
//!
//! ```rust,no_run
//! use pbxplist::{format::Format, parser, writer};
//!
//! // Read a project file in whatever format it is in.
//! let bytes = std::fs::read("MyApp.xcodeproj/project.pbxproj").unwrap();
//! let (root, info) = parser::parse(&bytes);
//! let root = root.expect("parse failed");
//! println!("read as {}", info.format);
//!
//! // Write it back in canonical native form.
//! let out = writer::unparse(&root, Format::Xcode, Some("MyApp")).unwrap();
//! std::fs::write("project.pbxproj", out).unwrap();
//! ```

pub mod bridge;
pub mod diff;
pub mod error;
pub mod format;
pub mod gid;
pub mod lexer;
pub mod linter;
pub mod output;
pub mod parser;
pub mod plist;
pub mod project;
pub mod writer;

#[cfg(test)]
pub mod testdata;

pub use error::{Diagnostic, Error, Result};
pub use format::{detect_format, Format};
pub use gid::{is_gid, GeneratorOptions, GidFields, GidGenerator};
pub use linter::{lint_bytes, lint_file, Verdict};
pub use output::OutputFormat;
pub use parser::{parse, parse_as, ParseInfo};
pub use plist::{Dict, Value};
pub use writer::unparse;
