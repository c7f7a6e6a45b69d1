use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDir {
    Asc,
    Desc,
}

impl SortDir {
    pub fn reverse(self) -> Self {
        match self {
            SortDir::Asc => SortDir::Desc,
            SortDir::Desc => SortDir::Asc,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortKey {
    pub field: String,
    pub dir: SortDir,
}

impl SortKey {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            dir: SortDir::Asc,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            dir: SortDir::Desc,
        }
    }
}

/// Ordered list of sort keys, highest priority first.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec(pub Vec<SortKey>);

impl SortSpec {
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    /// Parse `"-createdAt,name"` (commas or whitespace between keys).
    ///
    /// A leading `-` means descending, `+` or nothing ascending. Empty
    /// segments are skipped and a repeated field keeps its first position.
    pub fn parse(raw: &str) -> Self {
        let mut keys: Vec<SortKey> = Vec::new();
        for part in raw.split(|c: char| c == ',' || c.is_whitespace()) {
            let (field, dir) = if let Some(f) = part.strip_prefix('-') {
                (f, SortDir::Desc)
            } else if let Some(f) = part.strip_prefix('+') {
                (f, SortDir::Asc)
            } else {
                (part, SortDir::Asc)
            };
            if field.is_empty() || keys.iter().any(|k| k.field == field) {
                continue;
            }
            keys.push(SortKey {
                field: field.to_string(),
                dir,
            });
        }
        Self(keys)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn keys(&self) -> &[SortKey] {
        &self.0
    }

    /// Append `field` unless the sort already orders by it.
    pub fn then(mut self, field: &str, dir: SortDir) -> Self {
        if !self.0.iter().any(|k| k.field == field) {
            self.0.push(SortKey {
                field: field.to_string(),
                dir,
            });
        }
        self
    }

    /// "-createdAt,+name"
    pub fn to_signed_tokens(&self) -> String {
        self.0
            .iter()
            .map(|k| match k.dir {
                SortDir::Asc => format!("+{}", k.field),
                SortDir::Desc => format!("-{}", k.field),
            })
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl fmt::Display for SortSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_signed_tokens())
    }
}
