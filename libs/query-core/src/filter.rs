use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::params::{ParamMap, ParamValue};

/// Bare comparison tokens accepted from query strings.
pub const OPERATOR_TOKENS: [&str; 5] = ["gt", "gte", "lt", "lte", "in"];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CompareOp {
    Gt,
    Gte,
    Lt,
    Lte,
    In,
}

impl CompareOp {
    pub fn from_token(token: &str) -> Option<Self> {
        Some(match token {
            "gt" => CompareOp::Gt,
            "gte" => CompareOp::Gte,
            "lt" => CompareOp::Lt,
            "lte" => CompareOp::Lte,
            "in" => CompareOp::In,
            _ => return None,
        })
    }

    pub fn token(self) -> &'static str {
        match self {
            CompareOp::Gt => "gt",
            CompareOp::Gte => "gte",
            CompareOp::Lt => "lt",
            CompareOp::Lte => "lte",
            CompareOp::In => "in",
        }
    }

    /// The store's spelling of the operator.
    pub fn native(self) -> &'static str {
        match self {
            CompareOp::Gt => "$gt",
            CompareOp::Gte => "$gte",
            CompareOp::Lt => "$lt",
            CompareOp::Lte => "$lte",
            CompareOp::In => "$in",
        }
    }
}

/// Store predicate in document form: `{field: value | {$op: operand}}`.
///
/// Top-level entries are AND-ed. The store decides how to match each entry.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Filter(Map<String, Value>);

impl Filter {
    /// Matches every document.
    pub fn all() -> Self {
        Self(Map::new())
    }

    pub fn from_map(map: Map<String, Value>) -> Self {
        Self(map)
    }

    /// `field == value`
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::all().and(field, value)
    }

    /// Adds (or replaces) a field condition.
    pub fn and(mut self, field: impl Into<String>, cond: impl Into<Value>) -> Self {
        self.0.insert(field.into(), cond.into());
        self
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }
}

/// Turn a filter draft into a store predicate.
///
/// Walks the parameter tree and rewrites map keys equal to one of the
/// [`OPERATOR_TOKENS`] into their `$`-prefixed form at any depth below the
/// field name. Field names and string values are left untouched, so
/// `?name=gte` or a field literally called `in` stay as they are.
pub fn rewrite_operators(draft: ParamMap) -> Filter {
    let map = draft
        .into_inner()
        .into_iter()
        .map(|(field, value)| (field, operand_to_value(value)))
        .collect();
    Filter(map)
}

fn operand_to_value(value: ParamValue) -> Value {
    match value {
        ParamValue::Str(s) => Value::String(s),
        ParamValue::List(items) => Value::Array(items.into_iter().map(Value::String).collect()),
        ParamValue::Map(inner) => Value::Object(
            inner
                .into_iter()
                .map(|(key, v)| {
                    let key = match CompareOp::from_token(&key) {
                        Some(op) => op.native().to_string(),
                        None => key,
                    };
                    (key, operand_to_value(v))
                })
                .collect(),
        ),
    }
}
