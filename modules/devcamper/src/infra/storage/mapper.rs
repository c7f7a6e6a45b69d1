//! Conversions between contract models and stored documents.

use docstore::{Document, StoreError, CREATED_AT_FIELD, ID_FIELD};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

pub fn to_document<T: Serialize>(model: &T) -> Result<Document, StoreError> {
    match serde_json::to_value(model)? {
        Value::Object(map) => Ok(map),
        _ => Err(StoreError::NotADocument),
    }
}

pub fn to_model<T: DeserializeOwned>(doc: Document) -> Result<T, StoreError> {
    Ok(serde_json::from_value(Value::Object(doc))?)
}

pub fn to_models<T: DeserializeOwned>(docs: Vec<Document>) -> Result<Vec<T>, StoreError> {
    docs.into_iter().map(to_model).collect()
}

/// `$set` patch for an update: everything but identity and creation time.
pub fn to_patch<T: Serialize>(model: &T) -> Result<Document, StoreError> {
    let mut doc = to_document(model)?;
    doc.remove(ID_FIELD);
    doc.remove(CREATED_AT_FIELD);
    Ok(doc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::model::{BootcampLink, Course, MinimumSkill};
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    fn course() -> Course {
        Course {
            id: "c1".into(),
            title: "Front End Web Development".into(),
            description: "HTML, CSS and JavaScript".into(),
            weeks: "8".into(),
            tuition: 8000.0,
            minimum_skill: MinimumSkill::Beginner,
            scholarship_available: true,
            bootcamp: BootcampLink::Id("b1".into()),
            user: None,
            created_at: Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap(),
        }
    }

    #[test]
    fn document_uses_store_field_names() {
        let doc = to_document(&course()).unwrap();
        assert_eq!(doc["_id"], json!("c1"));
        assert_eq!(doc["minimumSkill"], json!("beginner"));
        assert_eq!(doc["bootcamp"], json!("b1"));
        assert_eq!(doc["createdAt"], json!("2024-01-02T03:04:05.000Z"));
        assert!(!doc.contains_key("user"));
    }

    #[test]
    fn populated_bootcamp_becomes_summary() {
        let mut doc = to_document(&course()).unwrap();
        doc.insert(
            "bootcamp".into(),
            json!({"_id": "b1", "name": "Devworks", "description": "Full stack"}),
        );
        let c: Course = to_model(doc).unwrap();
        match c.bootcamp {
            BootcampLink::Summary(s) => assert_eq!(s.name.as_deref(), Some("Devworks")),
            other => panic!("expected summary, got {other:?}"),
        }
    }

    #[test]
    fn dangling_bootcamp_reads_as_missing() {
        let mut doc = to_document(&course()).unwrap();
        doc.insert("bootcamp".into(), json!(null));
        let c: Course = to_model(doc.clone()).unwrap();
        assert_eq!(c.bootcamp, BootcampLink::Missing);
        assert_eq!(c.bootcamp.id(), None);
        assert_eq!(serde_json::to_value(&c).unwrap()["bootcamp"], json!(null));

        doc.remove("bootcamp");
        let c: Course = to_model(doc).unwrap();
        assert_eq!(c.bootcamp, BootcampLink::Missing);
    }

    #[test]
    fn patch_drops_identity() {
        let patch = to_patch(&course()).unwrap();
        assert!(!patch.contains_key("_id"));
        assert!(!patch.contains_key("createdAt"));
        assert_eq!(patch["tuition"], json!(8000.0));
    }
}
