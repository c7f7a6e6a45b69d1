use query_core::{Projection, ID_FIELD};

use crate::error::{Result, StoreError};
use crate::path::{get_path, remove_path, set_path};
use crate::Document;

/// The identity field is always returned, so excluding it is ignored.
pub fn validate_projection(p: &Projection) -> Result<()> {
    let excludes = p.exclude.iter().filter(|f| f.as_str() != ID_FIELD).count();
    if !p.include.is_empty() && excludes > 0 {
        return Err(StoreError::InvalidProjection(
            "cannot mix inclusion and exclusion".into(),
        ));
    }
    Ok(())
}

pub fn apply_projection(doc: Document, p: &Projection) -> Document {
    if !p.include.is_empty() {
        let mut out = Document::new();
        if let Some(id) = doc.get(ID_FIELD) {
            out.insert(ID_FIELD.to_string(), id.clone());
        }
        for field in &p.include {
            if let Some(v) = get_path(&doc, field) {
                set_path(&mut out, field, v.clone());
            }
        }
        return out;
    }
    let mut doc = doc;
    for field in p.exclude.iter().filter(|f| f.as_str() != ID_FIELD) {
        remove_path(&mut doc, field);
    }
    doc
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn doc(v: Value) -> Document {
        match v {
            Value::Object(m) => m,
            _ => unreachable!(),
        }
    }

    #[test]
    fn include_keeps_id() {
        let d = doc(json!({"_id": "1", "name": "a", "description": "b", "photo": "p"}));
        let out = apply_projection(d, &Projection::parse("name,description"));
        assert_eq!(
            Value::Object(out),
            json!({"_id": "1", "name": "a", "description": "b"})
        );
    }

    #[test]
    fn include_nested_and_missing() {
        let d = doc(json!({"_id": "1", "location": {"city": "Boston", "state": "MA"}}));
        let out = apply_projection(d, &Projection::parse("location.city,nope"));
        assert_eq!(
            Value::Object(out),
            json!({"_id": "1", "location": {"city": "Boston"}})
        );
    }

    #[test]
    fn exclude_drops_fields_but_not_id() {
        let d = doc(json!({"_id": "1", "name": "a", "photo": "p"}));
        let out = apply_projection(d, &Projection::parse("-photo,-_id"));
        assert_eq!(Value::Object(out), json!({"_id": "1", "name": "a"}));
    }

    #[test]
    fn mixed_is_rejected_except_for_id() {
        assert!(validate_projection(&Projection::parse("name,-photo")).is_err());
        assert!(validate_projection(&Projection::parse("name,-_id")).is_ok());
        assert!(validate_projection(&Projection::parse("")).is_ok());
    }
}
