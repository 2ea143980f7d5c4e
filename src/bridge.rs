//! JSON and XML bridges.
//!
//! Both formats carry the same structural tree as the native dialect: dicts,
//! arrays and strings. JSON uses objects/arrays/strings directly; numbers and
//! booleans on input are stringified, since the native dialect has no scalar
//! types. XML is the plist 1.0 document plutil emits for `-convert xml1`.

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::{Diagnostic, Error, Result};
use crate::plist::{Dict, Value};

// ---------------------------------------------------------------------------
// JSON

pub fn parse_json(bytes: &[u8]) -> Result<Dict> {
    let value: serde_json::Value = serde_json::from_slice(bytes)?;
    match value {
        serde_json::Value::Object(map) => {
            let mut dict = Dict::new();
            for (key, item) in map {
                dict.insert(key, from_json(item)?);
            }
            Ok(dict)
        }
        other => Err(json_error(format!(
            "top-level JSON value must be an object, found {}",
            json_kind(&other)
        ))),
    }
}

fn from_json(value: serde_json::Value) -> Result<Value> {
    match value {
        serde_json::Value::String(s) => Ok(Value::String(s)),
        serde_json::Value::Number(n) => Ok(Value::String(n.to_string())),
        serde_json::Value::Bool(b) => Ok(Value::String(b.to_string())),
        serde_json::Value::Array(items) => Ok(Value::Array(
            items.into_iter().map(from_json).collect::<Result<_>>()?,
        )),
        serde_json::Value::Object(map) => {
            let mut dict = Dict::new();
            for (key, item) in map {
                dict.insert(key, from_json(item)?);
            }
            Ok(Value::Dict(dict))
        }
        serde_json::Value::Null => Err(json_error(
            "JSON null has no plist equivalent".to_string(),
        )),
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

fn json_error(message: String) -> Error {
    Error::Parse(Diagnostic {
        line: 1,
        column: 1,
        width: 1,
        found: "JSON document".to_string(),
        expected: Vec::new(),
        message,
    })
}

pub fn render_json(root: &Dict) -> Result<Vec<u8>> {
    let mut out = serde_json::to_vec_pretty(&to_json(root))?;
    out.push(b'\n');
    Ok(out)
}

fn to_json(dict: &Dict) -> serde_json::Value {
    let mut map = serde_json::Map::new();
    for (key, value) in dict {
        map.insert(key.clone(), value_to_json(value));
    }
    serde_json::Value::Object(map)
}

fn value_to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::String(s) => serde_json::Value::String(s.clone()),
        Value::Array(items) => {
            serde_json::Value::Array(items.iter().map(value_to_json).collect())
        }
        Value::Dict(dict) => to_json(dict),
    }
}

// ---------------------------------------------------------------------------
// XML

const XML_HEADER: &str = concat!(
    "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n",
    "<!DOCTYPE plist PUBLIC \"-//Apple//DTD PLIST 1.0//EN\" ",
    "\"http://www.apple.com/DTDs/PropertyList-1.0.dtd\">\n",
    "<plist version=\"1.0\">\n",
);

pub fn parse_xml(bytes: &[u8]) -> Result<Dict> {
    let mut parser = XmlParser::new(bytes);
    loop {
        match parser.next_node()? {
            XmlNode::Open(name) if name == "plist" => break,
            XmlNode::Text(t) if t.trim().is_empty() => continue,
            XmlNode::Eof => return Err(parser.error("missing <plist> element")),
            node => return Err(parser.unexpected(&node, "<plist>")),
        }
    }
    let node = parser.next_meaningful()?;
    let root = match parser.parse_value(node)? {
        Value::Dict(dict) => dict,
        _ => return Err(parser.error("top-level plist value must be a <dict>")),
    };
    match parser.next_meaningful()? {
        XmlNode::Close(name) if name == "plist" => Ok(root),
        node => Err(parser.unexpected(&node, "</plist>")),
    }
}

/// One structural XML event, detached from the reader's buffer.
#[derive(Debug)]
enum XmlNode {
    Open(String),
    Close(String),
    Empty(String),
    Text(String),
    Eof,
}

struct XmlParser<'a> {
    reader: Reader<&'a [u8]>,
    input: &'a [u8],
    buf: Vec<u8>,
}

impl<'a> XmlParser<'a> {
    fn new(input: &'a [u8]) -> Self {
        XmlParser {
            reader: Reader::from_reader(input),
            input,
            buf: Vec::new(),
        }
    }

    /// Next structural node; declarations, doctype, comments and processing
    /// instructions are skipped. Text is returned verbatim, whitespace
    /// included, so string values keep their exact content.
    fn next_node(&mut self) -> Result<XmlNode> {
        loop {
            self.buf.clear();
            let node = match self.reader.read_event_into(&mut self.buf)? {
                Event::Start(e) => XmlNode::Open(tag_name(e.name().as_ref())),
                Event::End(e) => XmlNode::Close(tag_name(e.name().as_ref())),
                Event::Empty(e) => XmlNode::Empty(tag_name(e.name().as_ref())),
                Event::Text(e) => XmlNode::Text(
                    e.unescape().map_err(quick_xml::Error::from)?.into_owned(),
                ),
                Event::CData(e) => {
                    XmlNode::Text(String::from_utf8_lossy(&e.into_inner()).into_owned())
                }
                Event::Eof => XmlNode::Eof,
                Event::Decl(_) | Event::DocType(_) | Event::Comment(_) | Event::PI(_) => {
                    continue
                }
            };
            return Ok(node);
        }
    }

    /// Like `next_node` but also drops whitespace-only text (the indentation
    /// between elements).
    fn next_meaningful(&mut self) -> Result<XmlNode> {
        loop {
            match self.next_node()? {
                XmlNode::Text(t) if t.trim().is_empty() => continue,
                node => return Ok(node),
            }
        }
    }

    fn parse_value(&mut self, node: XmlNode) -> Result<Value> {
        match node {
            XmlNode::Open(name) if name == "dict" => Ok(Value::Dict(self.parse_dict()?)),
            XmlNode::Empty(name) if name == "dict" => Ok(Value::Dict(Dict::new())),
            XmlNode::Open(name) if name == "array" => Ok(Value::Array(self.parse_array()?)),
            XmlNode::Empty(name) if name == "array" => Ok(Value::Array(Vec::new())),
            XmlNode::Open(name) if name == "string" => {
                Ok(Value::String(self.read_text("string")?))
            }
            XmlNode::Empty(name) if name == "string" => Ok(Value::String(String::new())),
            node => Err(self.unexpected(&node, "<dict>, <array> or <string>")),
        }
    }

    fn parse_dict(&mut self) -> Result<Dict> {
        let mut dict = Dict::new();
        loop {
            match self.next_meaningful()? {
                XmlNode::Close(name) if name == "dict" => return Ok(dict),
                XmlNode::Open(name) if name == "key" => {
                    let key = self.read_text("key")?;
                    let node = self.next_meaningful()?;
                    let value = self.parse_value(node)?;
                    dict.insert(key, value);
                }
                XmlNode::Empty(name) if name == "key" => {
                    let node = self.next_meaningful()?;
                    let value = self.parse_value(node)?;
                    dict.insert(String::new(), value);
                }
                node => return Err(self.unexpected(&node, "<key> or </dict>")),
            }
        }
    }

    fn parse_array(&mut self) -> Result<Vec<Value>> {
        let mut items = Vec::new();
        loop {
            match self.next_meaningful()? {
                XmlNode::Close(name) if name == "array" => return Ok(items),
                node => items.push(self.parse_value(node)?),
            }
        }
    }

    /// Accumulate the text content of an element up to its closing tag.
    fn read_text(&mut self, element: &str) -> Result<String> {
        let mut text = String::new();
        loop {
            match self.next_node()? {
                XmlNode::Text(t) => text.push_str(&t),
                XmlNode::Close(name) if name == element => return Ok(text),
                node => {
                    let expected = format!("</{element}>");
                    return Err(self.unexpected(&node, &expected));
                }
            }
        }
    }

    fn unexpected(&self, node: &XmlNode, expected: &str) -> Error {
        let found = match node {
            XmlNode::Open(name) => format!("<{name}>"),
            XmlNode::Close(name) => format!("</{name}>"),
            XmlNode::Empty(name) => format!("<{name}/>"),
            XmlNode::Text(_) => "text content".to_string(),
            XmlNode::Eof => "end of input".to_string(),
        };
        self.diagnostic(found, format!("expected {expected}"))
    }

    fn error(&self, message: &str) -> Error {
        self.diagnostic("plist XML document".to_string(), message.to_string())
    }

    fn diagnostic(&self, found: String, message: String) -> Error {
        let offset = (self.reader.buffer_position() as usize).min(self.input.len());
        let before = &self.input[..offset];
        let line = before.iter().filter(|&&b| b == b'\n').count() + 1;
        let line_start = before
            .iter()
            .rposition(|&b| b == b'\n')
            .map(|i| i + 1)
            .unwrap_or(0);
        Error::Parse(Diagnostic {
            line,
            column: offset - line_start + 1,
            width: 1,
            found,
            expected: Vec::new(),
            message,
        })
    }
}

fn tag_name(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw).into_owned()
}

/// Render the tree the way plutil writes plist XML: tab indentation, dict
/// keys in byte order, self-closing tags for empty collections.
pub fn render_xml(root: &Dict) -> Vec<u8> {
    let mut out = String::from(XML_HEADER);
    write_xml_dict(&mut out, root, 0);
    out.push_str("</plist>\n");
    out.into_bytes()
}

fn write_xml_dict(out: &mut String, dict: &Dict, depth: usize) {
    if dict.is_empty() {
        out.push_str("<dict/>\n");
        return;
    }
    out.push_str("<dict>\n");
    let mut keys: Vec<&String> = dict.keys().collect();
    keys.sort();
    for key in keys {
        xml_indent(out, depth + 1);
        out.push_str("<key>");
        out.push_str(&xml_escape(key));
        out.push_str("</key>\n");
        xml_indent(out, depth + 1);
        write_xml_value(out, &dict[key.as_str()], depth + 1);
    }
    xml_indent(out, depth);
    out.push_str("</dict>\n");
}

fn write_xml_value(out: &mut String, value: &Value, depth: usize) {
    match value {
        Value::String(s) => {
            out.push_str("<string>");
            out.push_str(&xml_escape(s));
            out.push_str("</string>\n");
        }
        Value::Array(items) => {
            if items.is_empty() {
                out.push_str("<array/>\n");
                return;
            }
            out.push_str("<array>\n");
            for item in items {
                xml_indent(out, depth + 1);
                write_xml_value(out, item, depth + 1);
            }
            xml_indent(out, depth);
            out.push_str("</array>\n");
        }
        Value::Dict(dict) => write_xml_dict(out, dict, depth),
    }
}

fn xml_indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push('\t');
    }
}

/// The partial escaping plutil applies to text content.
fn xml_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            c => out.push(c),
        }
    }
    out
}
