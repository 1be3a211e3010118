// Author: Dustin Pilgrim
// License: MIT

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{json, Map, Value as Json};

use crate::ast::{LiteralValue, Number, Range};

pub type ValueMap = IndexMap<String, ValueNode>;
pub type LineEntries = IndexMap<String, LineNode>;

/// The document's data content.
#[derive(Debug, Clone, PartialEq)]
pub enum ValueNode {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Sequence(Vec<ValueNode>),
    Mapping(ValueMap),
}

impl From<&LiteralValue> for ValueNode {
    fn from(value: &LiteralValue) -> Self {
        match value {
            LiteralValue::Null => ValueNode::Null,
            LiteralValue::Bool(b) => ValueNode::Bool(*b),
            LiteralValue::Number(n) => ValueNode::Number(n.clone()),
            LiteralValue::String(s) => ValueNode::String(s.clone()),
        }
    }
}

/// Numbers are written out digit for digit, never through a float.
fn number_to_json(n: &Number) -> Json {
    n.as_str()
        .parse::<serde_json::Number>()
        .map_or_else(|_| json!(n.as_str()), Json::Number)
}

impl ValueNode {
    pub fn as_mapping(&self) -> Option<&ValueMap> {
        if let ValueNode::Mapping(map) = self {
            Some(map)
        } else {
            None
        }
    }

    pub fn as_sequence(&self) -> Option<&Vec<ValueNode>> {
        if let ValueNode::Sequence(items) = self {
            Some(items)
        } else {
            None
        }
    }

    pub fn to_json(&self) -> Json {
        match self {
            ValueNode::Null => Json::Null,
            ValueNode::Bool(b) => json!(b),
            ValueNode::Number(n) => number_to_json(n),
            ValueNode::String(s) => json!(s),
            ValueNode::Sequence(items) => Json::Array(items.iter().map(ValueNode::to_json).collect()),
            ValueNode::Mapping(map) => Json::Object(
                map.iter().map(|(k, v)| (k.clone(), v.to_json())).collect::<Map<_, _>>(),
            ),
        }
    }
}

/// Where something sits in the source: line plus start and end column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    pub line: usize,
    pub start_index: usize,
    pub end_index: usize,
}

impl From<&Range> for Position {
    fn from(range: &Range) -> Self {
        Position {
            line: range.start.line,
            start_index: range.start.column,
            end_index: range.end.column,
        }
    }
}

impl Position {
    fn write_into(&self, map: &mut Map<String, Json>) {
        map.insert("line".into(), json!(self.line));
        map.insert("startIndex".into(), json!(self.start_index));
        map.insert("endIndex".into(), json!(self.end_index));
    }

    fn write_key_into(&self, map: &mut Map<String, Json>) {
        map.insert("__key__startIndex".into(), json!(self.start_index));
        map.insert("__key__endIndex".into(), json!(self.end_index));
        map.insert("__key__line".into(), json!(self.line));
    }
}

/// Position of a leaf expression, plus the name range of the attribute
/// that owns it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineRecord {
    pub position: Position,
    pub key: Option<Position>,
}

/// Line information for a body, object or label level. `entries` mirror
/// the keys of the matching value map.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LineMap {
    pub entries: LineEntries,
    pub position: Option<Position>,
    pub key: Option<Position>,
}

/// Source positions, shaped like the value tree they describe.
#[derive(Debug, Clone, PartialEq)]
pub enum LineNode {
    Record(LineRecord),
    Sequence(Vec<LineNode>),
    Mapping(LineMap),
}

impl LineNode {
    pub fn record(range: &Range) -> Self {
        LineNode::Record(LineRecord {
            position: Position::from(range),
            key: None,
        })
    }

    /// Attach the range of the name this node is stored under.
    /// Merge sequences have no single name and are left as they are.
    pub fn annotate_key(&mut self, key: Position) {
        match self {
            LineNode::Record(record) => record.key = Some(key),
            LineNode::Mapping(map) => map.key = Some(key),
            LineNode::Sequence(_) => {}
        }
    }

    pub fn as_mapping(&self) -> Option<&LineMap> {
        if let LineNode::Mapping(map) = self {
            Some(map)
        } else {
            None
        }
    }

    pub fn as_record(&self) -> Option<&LineRecord> {
        if let LineNode::Record(record) = self {
            Some(record)
        } else {
            None
        }
    }

    pub fn as_sequence(&self) -> Option<&Vec<LineNode>> {
        if let LineNode::Sequence(items) = self {
            Some(items)
        } else {
            None
        }
    }

    pub fn to_json(&self) -> Json {
        match self {
            LineNode::Record(record) => {
                let mut map = Map::new();
                record.position.write_into(&mut map);
                if let Some(key) = &record.key {
                    key.write_key_into(&mut map);
                }
                Json::Object(map)
            }
            LineNode::Sequence(items) => Json::Array(items.iter().map(LineNode::to_json).collect()),
            LineNode::Mapping(line_map) => line_map.to_json(),
        }
    }
}

impl LineMap {
    /// Entries first; the positional fields are written last and win over
    /// an entry of the same name.
    pub fn to_json(&self) -> Json {
        let mut map: Map<String, Json> = self
            .entries
            .iter()
            .map(|(k, v)| (k.clone(), v.to_json()))
            .collect();
        if let Some(position) = &self.position {
            position.write_into(&mut map);
        }
        if let Some(key) = &self.key {
            key.write_key_into(&mut map);
        }
        Json::Object(map)
    }
}

/// Store `value`/`line` under `key`, never overwriting an earlier entry.
///
/// The first entry is stored bare. A second one turns the entry into a
/// two-element sequence, later ones are appended. Whether an entry is
/// already a merge sequence is read from the line tree, where sequences
/// only ever come from merging, and the same step is applied to both
/// trees so they keep the same shape.
pub fn merge_entry(
    values: &mut ValueMap,
    lines: &mut LineEntries,
    key: &str,
    value: ValueNode,
    line: LineNode,
) {
    let Some(existing_line) = lines.get_mut(key) else {
        values.insert(key.to_string(), value);
        lines.insert(key.to_string(), line);
        return;
    };

    let existing_value = values.entry(key.to_string()).or_insert(ValueNode::Null);
    match (existing_line, existing_value) {
        (LineNode::Sequence(line_items), ValueNode::Sequence(value_items)) => {
            line_items.push(line);
            value_items.push(value);
        }
        (existing_line, existing_value) => {
            let first_line = std::mem::replace(existing_line, LineNode::Sequence(Vec::new()));
            let first_value = std::mem::replace(existing_value, ValueNode::Null);
            *existing_line = LineNode::Sequence(vec![first_line, line]);
            *existing_value = ValueNode::Sequence(vec![first_value, value]);
        }
    }
}
