//! Locating project files on disk and inferring project names from their
//! wrapper directories.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

/// Wrapper directory suffixes Xcode has used over the years.
const WRAPPER_SUFFIXES: [&str; 3] = [".xcodeproj", ".xcode", ".pbproj"];

/// Infer the project name from a pbxproj path: a `project.pbxproj` lives
/// inside a wrapper directory named `<Project>.xcodeproj`. Returns `None`
/// when the file does not sit inside a recognized wrapper.
pub fn project_name_for_path(path: &Path) -> Option<String> {
    let wrapper = path.parent()?.file_name()?.to_str()?;
    for suffix in WRAPPER_SUFFIXES {
        if let Some(name) = wrapper.strip_suffix(suffix) {
            if !name.is_empty() {
                return Some(name.to_string());
            }
        }
    }
    None
}

/// Recursively collect every `project.pbxproj` under `dir`, sorted for
/// stable batch output.
pub fn find_projectfiles(dir: &Path) -> Vec<PathBuf> {
    let mut found: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| {
            entry.file_type().is_file() && entry.file_name() == "project.pbxproj"
        })
        .map(|entry| entry.into_path())
        .collect();
    found.sort();
    found
}
