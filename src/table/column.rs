use std::cmp::Ordering;

use chrono::NaiveDateTime;

/// A cell value pulled out of a record by a column accessor.
///
/// Each table field sticks to one variant, so ordering within a column is
/// numeric, lexicographic or temporal. The cross-variant branch only exists
/// to keep the ordering total.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Text(String),
    Int(i64),
    Date(NaiveDateTime),
}

impl Value {
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Text(s) => serde_json::Value::String(s.clone()),
            Value::Int(n) => serde_json::Value::Number((*n).into()),
            Value::Date(d) => serde_json::Value::String(d.format("%Y-%m-%d %H:%M:%S").to_string()),
        }
    }

    /// Lowercased rendering used for contains-matching by the search
    /// parameter.
    pub fn search_text(&self) -> String {
        match self {
            Value::Text(s) => s.to_lowercase(),
            Value::Int(n) => n.to_string(),
            Value::Date(d) => d.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Value::Text(_) => 0,
            Value::Int(_) => 1,
            Value::Date(_) => 2,
        }
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Value::Text(a), Value::Text(b)) => a.cmp(b),
            (Value::Int(a), Value::Int(b)) => a.cmp(b),
            (Value::Date(a), Value::Date(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Declares one field of a table: whether clients may order by it, which
/// filter (if any) hangs off it, and how to read it out of a record.
pub struct Column<R> {
    pub field_name: &'static str,
    pub orderable: bool,
    pub filter_name: Option<&'static str>,
    pub accessor: fn(&R) -> Value,
}
