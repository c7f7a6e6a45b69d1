use serde::{Deserialize, Serialize};

/// Field projection: either an inclusion list or an exclusion list.
///
/// Both lists may be filled by a careless caller (`select=name,-photo`);
/// the store rejects that shape when it executes.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Projection {
    pub include: Vec<String>,
    pub exclude: Vec<String>,
}

impl Projection {
    /// Parse `"name,description"` or `"name description"`; `-field` excludes.
    pub fn parse(raw: &str) -> Self {
        let mut p = Projection::default();
        for part in raw.split(|c: char| c == ',' || c.is_whitespace()) {
            if let Some(field) = part.strip_prefix('-') {
                if !field.is_empty() && !p.exclude.iter().any(|f| f == field) {
                    p.exclude.push(field.to_string());
                }
            } else if !part.is_empty() && !p.include.iter().any(|f| f == part) {
                p.include.push(part.to_string());
            }
        }
        p
    }

    pub fn include<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            include: fields.into_iter().map(Into::into).collect(),
            exclude: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.include.is_empty() && self.exclude.is_empty()
    }

    pub fn is_mixed(&self) -> bool {
        !self.include.is_empty() && !self.exclude.is_empty()
    }
}
