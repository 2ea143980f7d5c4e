//! Data model for the pbxproj object tree.
//!
//! The dialect knows exactly three shapes: strings, arrays and dicts. There
//! are no native numbers or booleans; every scalar stays a string. Dicts keep
//! insertion order, which is what makes the non-native bridges lossless and
//! lets the canonical writer impose its own ordering only at write time.

use indexmap::IndexMap;

/// An ordered string-keyed mapping, used for the root, for every object in
/// `objects` and for anonymous nested dicts.
pub type Dict = IndexMap<String, Value>;

/// A value in the object tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    String(String),
    Array(Vec<Value>),
    Dict(Dict),
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_array_mut(&mut self) -> Option<&mut Vec<Value>> {
        match self {
            Value::Array(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_dict(&self) -> Option<&Dict> {
        match self {
            Value::Dict(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_dict_mut(&mut self) -> Option<&mut Dict> {
        match self {
            Value::Dict(d) => Some(d),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(a: Vec<Value>) -> Self {
        Value::Array(a)
    }
}

impl From<Dict> for Value {
    fn from(d: Dict) -> Self {
        Value::Dict(d)
    }
}

/// The `objects` table of a project root, if present and dict-shaped.
pub fn objects(root: &Dict) -> Option<&Dict> {
    root.get("objects")?.as_dict()
}

pub fn objects_mut(root: &mut Dict) -> Option<&mut Dict> {
    root.get_mut("objects")?.as_dict_mut()
}

/// A string field of an object, e.g. `isa`, `name` or `path`.
pub fn get_str<'a>(obj: &'a Dict, key: &str) -> Option<&'a str> {
    obj.get(key)?.as_str()
}

/// The declared class of an object. Objects without an `isa` are tolerated
/// (the system is syntax-only) and report an empty class.
pub fn isa(obj: &Dict) -> &str {
    get_str(obj, "isa").unwrap_or("")
}

/// First object in `objects` with the given isa, in insertion order.
pub fn find_isa<'a>(root: &'a Dict, wanted: &str) -> Option<(&'a str, &'a Dict)> {
    for (gid, value) in objects(root)? {
        if let Some(obj) = value.as_dict() {
            if isa(obj) == wanted {
                return Some((gid.as_str(), obj));
            }
        }
    }
    None
}
