//! Comment annotator and canonical writer for the native dialect.
//!
//! "Canonical" is exactly what Xcode itself writes: the `// !$*UTF8*$!`
//! header, tab indentation, every dict's keys in byte order with `isa`
//! hoisted first, `objects` grouped into isa sections with column-0 boundary
//! comments, one-line entries for `PBXBuildFile` and `PBXFileReference`, and
//! a synthesized `/* ... */` comment after every resolvable gid value.
//!
//! Output is a pure function of the tree and the supplied project name.

use std::collections::HashMap;

use crate::bridge;
use crate::error::{Error, Result};
use crate::format::Format;
use crate::gid::is_gid;
use crate::lexer::quote;
use crate::plist::{get_str, isa, objects, Dict, Value};

/// Sections whose entries Xcode flattens onto a single line.
const FLAT_ISAS: [&str; 2] = ["PBXBuildFile", "PBXFileReference"];

/// Fields whose gid value never receives a comment even when it resolves.
const BARE_GID_KEYS: [&str; 1] = ["remoteGlobalIDString"];

/// Serialize a tree to the requested format. The project name is required
/// for the native dialect (it appears in synthesized comments and is not
/// stored in the file); the bridge formats ignore it.
pub fn unparse(root: &Dict, format: Format, projectname: Option<&str>) -> Result<Vec<u8>> {
    match format {
        Format::Xcode => {
            let name = projectname.ok_or(Error::MissingProjectName)?;
            Ok(write_native(root, name).into_bytes())
        }
        Format::Json => bridge::render_json(root),
        Format::Xml => Ok(bridge::render_xml(root)),
    }
}

/// Render the native dialect.
pub fn write_native(root: &Dict, projectname: &str) -> String {
    let comments = gid_comments(root, projectname);
    let mut writer = Writer {
        out: String::new(),
        comments,
    };
    writer.out.push_str("// !$*UTF8*$!\n{\n");
    for (key, value) in sorted_entries(root) {
        if key == "objects" {
            if let Some(table) = value.as_dict() {
                writer.write_objects(table);
                continue;
            }
        }
        writer.write_entry(key, value, 1);
    }
    writer.out.push_str("}\n");
    writer.out
}

/// Derive the descriptive comment for every object key. All lookups are
/// direct keyed accesses into `objects`; reference cycles (groups containing
/// each other, say) cannot cause non-termination because nothing recurses.
pub fn gid_comments(root: &Dict, projectname: &str) -> HashMap<String, String> {
    let mut comments = HashMap::new();
    let table = match objects(root) {
        Some(t) => t,
        None => return comments,
    };

    // Direct per-object comments.
    for (gid, value) in table {
        let obj = match value.as_dict() {
            Some(o) => o,
            None => continue,
        };
        if let Some(text) = direct_comment(obj) {
            comments.insert(gid.clone(), text);
        }
    }

    // Build files read as "<file> in <phase>": find the phase whose `files`
    // array names each build file, then combine with the fileRef's comment.
    let mut phase_of: HashMap<&str, &str> = HashMap::new();
    for (gid, value) in table {
        let obj = match value.as_dict() {
            Some(o) => o,
            None => continue,
        };
        if !isa(obj).ends_with("BuildPhase") {
            continue;
        }
        if let Some(files) = obj.get("files").and_then(|v| v.as_array()) {
            for file in files {
                if let Some(file_gid) = file.as_str() {
                    phase_of.insert(file_gid, gid.as_str());
                }
            }
        }
    }
    for (gid, value) in table {
        let obj = match value.as_dict() {
            Some(o) => o,
            None => continue,
        };
        if isa(obj) != "PBXBuildFile" {
            continue;
        }
        let referenced = get_str(obj, "fileRef").or_else(|| get_str(obj, "productRef"));
        let file_text = match referenced.and_then(|r| comments.get(r)) {
            Some(t) => t.clone(),
            None => continue,
        };
        let text = match phase_of.get(gid.as_str()).and_then(|p| comments.get(*p)) {
            Some(phase_text) => format!("{file_text} in {phase_text}"),
            None => file_text,
        };
        comments.insert(gid.clone(), text);
    }

    // Configuration lists describe their owner: the object whose
    // `buildConfigurationList` field points at them. A project owner
    // substitutes the externally supplied project name.
    for value in table.values() {
        let owner = match value.as_dict() {
            Some(o) => o,
            None => continue,
        };
        let list_gid = match get_str(owner, "buildConfigurationList") {
            Some(g) => g,
            None => continue,
        };
        let owner_isa = isa(owner);
        let owner_name = if owner_isa == "PBXProject" {
            projectname
        } else {
            get_str(owner, "name").unwrap_or("")
        };
        comments.insert(
            list_gid.to_string(),
            format!("Build configuration list for {owner_isa} \"{owner_name}\""),
        );
    }

    comments
}

fn direct_comment(obj: &Dict) -> Option<String> {
    let name = get_str(obj, "name");
    let path = get_str(obj, "path");
    let text = match isa(obj) {
        "PBXProject" => Some("Project object".to_string()),
        "PBXNativeTarget" | "PBXAggregateTarget" | "PBXLegacyTarget" => {
            name.map(str::to_string)
        }
        "PBXSourcesBuildPhase" => phase_comment(name, "Sources"),
        "PBXFrameworksBuildPhase" => phase_comment(name, "Frameworks"),
        "PBXResourcesBuildPhase" => phase_comment(name, "Resources"),
        "PBXHeadersBuildPhase" => phase_comment(name, "Headers"),
        "PBXCopyFilesBuildPhase" => phase_comment(name, "CopyFiles"),
        "PBXShellScriptBuildPhase" => phase_comment(name, "ShellScript"),
        "PBXRezBuildPhase" => phase_comment(name, "Rez"),
        "XCBuildConfiguration" => name.map(str::to_string),
        "PBXTargetDependency" | "PBXContainerItemProxy" | "PBXBuildRule" => {
            Some(isa(obj).to_string())
        }
        // File references, groups and unknown classes all describe
        // themselves by name, falling back to path.
        _ => name.or(path).map(str::to_string),
    };
    text
}

fn phase_comment(name: Option<&str>, fallback: &str) -> Option<String> {
    Some(name.unwrap_or(fallback).to_string())
}

/// Dict entries in canonical order: `isa` first, the rest byte-sorted.
fn sorted_entries(dict: &Dict) -> Vec<(&String, &Value)> {
    let mut entries: Vec<_> = dict.iter().collect();
    entries.sort_by(|a, b| {
        (a.0.as_str() != "isa", a.0.as_str()).cmp(&(b.0.as_str() != "isa", b.0.as_str()))
    });
    entries
}

struct Writer {
    out: String,
    comments: HashMap<String, String>,
}

impl Writer {
    fn indent(&mut self, depth: usize) {
        for _ in 0..depth {
            self.out.push('\t');
        }
    }

    fn push_string(&mut self, s: &str, annotate: bool) {
        self.out.push_str(&quote(s));
        if annotate && is_gid(s) {
            if let Some(comment) = self.comments.get(s) {
                self.out.push_str(" /* ");
                self.out.push_str(comment);
                self.out.push_str(" */");
            }
        }
    }

    fn write_entry(&mut self, key: &str, value: &Value, depth: usize) {
        self.indent(depth);
        self.out.push_str(&quote(key));
        self.out.push_str(" = ");
        self.write_value(value, depth, !BARE_GID_KEYS.contains(&key));
        self.out.push_str(";\n");
    }

    fn write_value(&mut self, value: &Value, depth: usize, annotate: bool) {
        match value {
            Value::String(s) => self.push_string(s, annotate),
            Value::Array(items) => {
                self.out.push_str("(\n");
                for item in items {
                    self.indent(depth + 1);
                    self.write_value(item, depth + 1, true);
                    self.out.push_str(",\n");
                }
                self.indent(depth);
                self.out.push(')');
            }
            Value::Dict(dict) => {
                self.out.push_str("{\n");
                for (key, item) in sorted_entries(dict) {
                    self.write_entry(key, item, depth + 1);
                }
                self.indent(depth);
                self.out.push('}');
            }
        }
    }

    /// The `objects` table: isa-grouped sections with boundary comments at
    /// column 0, sections and entries both in byte order.
    fn write_objects(&mut self, table: &Dict) {
        self.indent(1);
        self.out.push_str("objects = {\n");

        let mut sections: std::collections::BTreeMap<&str, Vec<(&String, &Value)>> =
            std::collections::BTreeMap::new();
        for (gid, value) in table {
            let class = value.as_dict().map(isa).unwrap_or("");
            sections.entry(class).or_default().push((gid, value));
        }

        for (class, mut entries) in sections {
            entries.sort_by(|a, b| a.0.cmp(b.0));
            self.out.push_str(&format!("\n/* Begin {class} section */\n"));
            for (gid, value) in entries {
                if FLAT_ISAS.contains(&class) {
                    self.write_flat_object(gid, value);
                } else {
                    self.write_object(gid, value);
                }
            }
            self.out.push_str(&format!("/* End {class} section */\n"));
        }

        self.indent(1);
        self.out.push_str("};\n");
    }

    fn write_object(&mut self, gid: &str, value: &Value) {
        self.indent(2);
        self.push_string(gid, true);
        self.out.push_str(" = ");
        self.write_value(value, 2, true);
        self.out.push_str(";\n");
    }

    /// One-line rendition used for build files and file references.
    fn write_flat_object(&mut self, gid: &str, value: &Value) {
        self.indent(2);
        self.push_string(gid, true);
        self.out.push_str(" = ");
        self.write_flat_value(value, true);
        self.out.push_str(";\n");
    }

    fn write_flat_value(&mut self, value: &Value, annotate: bool) {
        match value {
            Value::String(s) => self.push_string(s, annotate),
            Value::Array(items) => {
                self.out.push('(');
                for item in items {
                    self.write_flat_value(item, true);
                    self.out.push_str(", ");
                }
                self.out.push(')');
            }
            Value::Dict(dict) => {
                self.out.push('{');
                for (key, item) in sorted_entries(dict) {
                    self.out.push_str(&quote(key));
                    self.out.push_str(" = ");
                    self.write_flat_value(item, !BARE_GID_KEYS.contains(&key.as_str()));
                    self.out.push_str("; ");
                }
                self.out.push('}');
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_native;
    use crate::testdata::MINI_PROJECT;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_roundtrip_canonical_fixture() {
        let root = parse_native(MINI_PROJECT).unwrap();
        let out = write_native(&root, "MiniProject");
        assert_eq!(out, MINI_PROJECT);
    }

    #[test]
    fn test_idempotence() {
        let root = parse_native("{ zebra = 1; an_array = (1 ,  2  ,  3); alpha = { b = 2; a = 1; }; }").unwrap();
        let once = write_native(&root, "P");
        let twice = write_native(&parse_native(&once).unwrap(), "P");
        assert_eq!(once, twice);
    }

    #[test]
    fn test_canonical_reformatting() {
        let root = parse_native("{\n\tobjectVersion = 46;\n\tobjects = {\n\t};\n\tan_array  = (1 ,  2  ,  3);\n}").unwrap();
        let out = write_native(&root, "P");
        assert_eq!(
            out,
            "// !$*UTF8*$!\n{\n\tan_array = (\n\t\t1,\n\t\t2,\n\t\t3,\n\t);\n\tobjectVersion = 46;\n\tobjects = {\n\t};\n}\n"
        );
    }

    #[test]
    fn test_key_order_isa_first() {
        let root = parse_native("{ objects = { 4C0A1B3419C0000100ABCDEF = { runOnlyForDeploymentPostprocessing = 0; isa = PBXSourcesBuildPhase; buildActionMask = 2147483647; files = (); }; }; }").unwrap();
        let out = write_native(&root, "P");
        let entry_start = out.find("isa = PBXSourcesBuildPhase").unwrap();
        let mask = out.find("buildActionMask").unwrap();
        let run_only = out.find("runOnlyForDeploymentPostprocessing").unwrap();
        assert!(entry_start < mask && mask < run_only);
    }

    #[test]
    fn test_comment_synthesis() {
        let root = parse_native(MINI_PROJECT).unwrap();
        let comments = gid_comments(&root, "MiniProject");
        assert_eq!(comments["4C0A1B3319C0000100ABCDEF"], "Project object");
        assert_eq!(comments["4C0A1B2E19C0000100ABCDEF"], "main.m");
        assert_eq!(comments["4C0A1B2C19C0000100ABCDEF"], "main.m in Sources");
        assert_eq!(comments["4C0A1B3419C0000100ABCDEF"], "Sources");
        assert_eq!(
            comments["4C0A1B3719C0000100ABCDEF"],
            "Build configuration list for PBXProject \"MiniProject\""
        );
        assert_eq!(
            comments["4C0A1B3819C0000100ABCDEF"],
            "Build configuration list for PBXNativeTarget \"MiniApp\""
        );
        // The main group has neither name nor path: no comment.
        assert!(!comments.contains_key("4C0A1B2F19C0000100ABCDEF"));
    }

    #[test]
    fn test_cyclic_groups_terminate() {
        // Two groups referencing each other; comment synthesis must not
        // recurse into the reference graph.
        let root = parse_native(concat!(
            "{ objects = { ",
            "AAAAAAAAAAAAAAAAAAAAAAA1 = { isa = PBXGroup; name = One; children = (AAAAAAAAAAAAAAAAAAAAAAA2, ); }; ",
            "AAAAAAAAAAAAAAAAAAAAAAA2 = { isa = PBXGroup; name = Two; children = (AAAAAAAAAAAAAAAAAAAAAAA1, ); }; ",
            "}; }"
        ))
        .unwrap();
        let comments = gid_comments(&root, "P");
        assert_eq!(comments["AAAAAAAAAAAAAAAAAAAAAAA1"], "One");
        assert_eq!(comments["AAAAAAAAAAAAAAAAAAAAAAA2"], "Two");
        let out = write_native(&root, "P");
        assert!(out.contains("AAAAAAAAAAAAAAAAAAAAAAA2 /* Two */,"));
    }

    #[test]
    fn test_remote_global_id_not_annotated() {
        let root = parse_native(concat!(
            "{ objects = { ",
            "AAAAAAAAAAAAAAAAAAAAAAA1 = { isa = PBXNativeTarget; name = App; }; ",
            "AAAAAAAAAAAAAAAAAAAAAAA2 = { isa = PBXContainerItemProxy; remoteGlobalIDString = AAAAAAAAAAAAAAAAAAAAAAA1; }; ",
            "}; }"
        ))
        .unwrap();
        let out = write_native(&root, "P");
        assert!(out.contains("remoteGlobalIDString = AAAAAAAAAAAAAAAAAAAAAAA1;\n"));
    }

    #[test]
    fn test_unparse_requires_project_name() {
        let root = parse_native("{ objects = { }; }").unwrap();
        assert!(matches!(
            unparse(&root, Format::Xcode, None),
            Err(Error::MissingProjectName)
        ));
        assert!(unparse(&root, Format::Json, None).is_ok());
    }

    #[test]
    fn test_insert_build_phase_end_to_end() {
        use crate::diff::{diff_lines, DiffOp};
        use crate::gid::{GeneratorOptions, GidGenerator};
        use crate::plist::objects_mut;
        use chrono::TimeZone;

        let mut root = parse_native(MINI_PROJECT).unwrap();
        let original = write_native(&root, "MiniProject");

        let mut gen = GidGenerator::with_options(GeneratorOptions {
            user: Some(0x4C),
            pid: Some(0x0A),
            date: Some(chrono::Utc.with_ymd_and_hms(2014, 8, 17, 12, 35, 41).unwrap()),
            random: Some(0xABCDEF),
            seq: Some(0x9999),
        })
        .unwrap();
        let new_gid = gen.generate();

        let mut phase = Dict::new();
        phase.insert("isa".into(), "PBXShellScriptBuildPhase".into());
        phase.insert("buildActionMask".into(), "2147483647".into());
        phase.insert("files".into(), Value::Array(vec![]));
        phase.insert("inputPaths".into(), Value::Array(vec![]));
        phase.insert("outputPaths".into(), Value::Array(vec![]));
        phase.insert("runOnlyForDeploymentPostprocessing".into(), "0".into());
        phase.insert("shellPath".into(), "/bin/sh".into());
        phase.insert("shellScript".into(), "echo 'A new buildphase says hi!'".into());

        let table = objects_mut(&mut root).unwrap();
        table.insert(new_gid.clone(), Value::Dict(phase));
        let target = table
            .get_mut("4C0A1B3219C0000100ABCDEF")
            .and_then(|v| v.as_dict_mut())
            .unwrap();
        let phases = target
            .get_mut("buildPhases")
            .and_then(|v| v.as_array_mut())
            .unwrap();
        phases.insert(0, Value::String(new_gid.clone()));

        let updated = write_native(&root, "MiniProject");

        // The new entry is annotated from its isa and precedes the old phase
        // in the target's buildPhases array.
        assert!(updated.contains(&format!("{new_gid} /* ShellScript */ = {{")));
        let pos_new = updated.find(&format!("\t\t\t\t{new_gid} /* ShellScript */,")).unwrap();
        let pos_old = updated
            .find("\t\t\t\t4C0A1B3419C0000100ABCDEF /* Sources */,")
            .unwrap();
        assert!(pos_new < pos_old);

        // Everything else is untouched: the line diff is pure insertion.
        let ops = diff_lines(&original, &updated);
        assert!(ops.iter().all(|op| !matches!(op, DiffOp::Delete(_))));
        assert!(ops.iter().any(|op| matches!(op, DiffOp::Insert(_))));
    }
}
