//! Supported serialization formats and content sniffing.

use crate::error::{Error, Result};

/// The formats the converter can read and write. `Xcode` is the native
/// pbxproj plist dialect; the others are structural bridges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Xcode,
    Json,
    Xml,
}

impl Format {
    pub fn name(&self) -> &'static str {
        match self {
            Format::Xcode => "xcode",
            Format::Json => "json",
            Format::Xml => "xml",
        }
    }

    /// Parse a user-supplied format name.
    pub fn from_name(name: &str) -> Result<Format> {
        match name.to_ascii_lowercase().as_str() {
            "xcode" | "pbxproj" => Ok(Format::Xcode),
            "json" => Ok(Format::Json),
            "xml" | "plist" => Ok(Format::Xml),
            other => Err(Error::UnsupportedFormat(other.to_string())),
        }
    }
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Guess the format from the first non-whitespace bytes. Returns `None` when
/// the content is ambiguous (a bare `{` opens both the native dialect and
/// JSON); the parser then tries native first and falls back to JSON.
pub fn detect_format(bytes: &[u8]) -> Option<Format> {
    let rest = skip_whitespace(bytes);
    if rest.starts_with(b"<") {
        Some(Format::Xml)
    } else if rest.starts_with(b"//") {
        Some(Format::Xcode)
    } else {
        None
    }
}

fn skip_whitespace(bytes: &[u8]) -> &[u8] {
    let start = bytes
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(bytes.len());
    &bytes[start..]
}
