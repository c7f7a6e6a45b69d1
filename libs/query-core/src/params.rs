use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Bracket nesting deeper than this is kept as a literal key suffix.
pub const MAX_DEPTH: usize = 5;
/// Pairs beyond this count are ignored.
pub const MAX_PARAMS: usize = 1000;

/// A single query-string value: plain, repeated, or bracket-nested.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Str(String),
    List(Vec<String>),
    Map(BTreeMap<String, ParamValue>),
}

impl ParamValue {
    /// Plain value, or the first entry of a repeated one.
    pub fn first(&self) -> Option<&str> {
        match self {
            ParamValue::Str(s) => Some(s),
            ParamValue::List(items) => items.first().map(String::as_str),
            ParamValue::Map(_) => None,
        }
    }

    /// Repeated values are joined with `sep`; maps yield `None`.
    pub fn joined(&self, sep: &str) -> Option<String> {
        match self {
            ParamValue::Str(s) => Some(s.clone()),
            ParamValue::List(items) => Some(items.join(sep)),
            ParamValue::Map(_) => None,
        }
    }

    fn push(&mut self, value: String) {
        match self {
            ParamValue::Str(old) => {
                let old = std::mem::take(old);
                *self = ParamValue::List(vec![old, value]);
            }
            ParamValue::List(items) => items.push(value),
            // a plain value colliding with a nested one is dropped
            ParamValue::Map(_) => {}
        }
    }
}

impl From<&str> for ParamValue {
    fn from(s: &str) -> Self {
        ParamValue::Str(s.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(s: String) -> Self {
        ParamValue::Str(s)
    }
}

impl From<Vec<String>> for ParamValue {
    fn from(items: Vec<String>) -> Self {
        ParamValue::List(items)
    }
}

/// Parsed query-string mapping, name → value.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamMap(BTreeMap<String, ParamValue>);

impl ParamMap {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Parse a raw (still percent-encoded) query string.
    ///
    /// `a=1&a=2` becomes a list, `a[b]=1` a nested map and `a[]=1` a list even
    /// with a single occurrence. Conflicting shapes keep the first one seen.
    pub fn from_query_str(raw: &str) -> Self {
        let mut out = ParamMap::new();
        for (k, v) in url::form_urlencoded::parse(raw.as_bytes()).take(MAX_PARAMS) {
            let path = split_key(&k);
            if path.is_empty() || path[0].is_empty() {
                continue;
            }
            insert_path(&mut out.0, &path, v.into_owned());
        }
        out
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<ParamValue>) {
        self.0.insert(name.into(), value.into());
    }

    /// Builder-style insert, handy in tests and internal callers.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.0.get(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<ParamValue> {
        self.0.remove(name)
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ParamValue)> {
        self.0.iter()
    }

    pub fn into_inner(self) -> BTreeMap<String, ParamValue> {
        self.0
    }
}

impl From<BTreeMap<String, ParamValue>> for ParamMap {
    fn from(map: BTreeMap<String, ParamValue>) -> Self {
        Self(map)
    }
}

impl<K: Into<String>, V: Into<ParamValue>> FromIterator<(K, V)> for ParamMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// `a[b][c]` → `["a", "b", "c"]`, `a[]` → `["a", ""]`.
fn split_key(key: &str) -> Vec<String> {
    let Some(open) = key.find('[') else {
        return vec![key.to_string()];
    };
    if open == 0 {
        return vec![key.to_string()];
    }

    let mut path = vec![key[..open].to_string()];
    let mut rest = &key[open..];
    while let Some(stripped) = rest.strip_prefix('[') {
        let Some(close) = stripped.find(']') else {
            break;
        };
        if path.len() > MAX_DEPTH {
            break;
        }
        path.push(stripped[..close].to_string());
        rest = &stripped[close + 1..];
    }
    if !rest.is_empty() {
        // unbalanced or too deep: keep the tail on the last segment
        if let Some(last) = path.last_mut() {
            last.push_str(rest);
        }
    }
    path
}

fn insert_path(map: &mut BTreeMap<String, ParamValue>, path: &[String], value: String) {
    let (head, tail) = match path.split_first() {
        Some(split) => split,
        None => return,
    };

    match tail {
        [] => match map.get_mut(head) {
            Some(existing) => existing.push(value),
            None => {
                map.insert(head.clone(), ParamValue::Str(value));
            }
        },
        [seg] if seg.is_empty() => match map.get_mut(head) {
            Some(existing) => existing.push(value),
            None => {
                map.insert(head.clone(), ParamValue::List(vec![value]));
            }
        },
        _ => {
            let entry = map
                .entry(head.clone())
                .or_insert_with(|| ParamValue::Map(BTreeMap::new()));
            if let ParamValue::Map(inner) = entry {
                insert_path(inner, tail, value);
            }
        }
    }
}
