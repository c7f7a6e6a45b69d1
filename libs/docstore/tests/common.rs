#![allow(dead_code)]

use docstore::{Collection, CollectionSpec, Document, MemoryStore};
use serde_json::{json, Value};

pub fn doc(v: Value) -> Document {
    match v {
        Value::Object(m) => m,
        other => panic!("not an object: {other}"),
    }
}

pub fn store() -> MemoryStore {
    let store = MemoryStore::new();
    store.declare(
        CollectionSpec::new("bootcamps")
            .unique("name")
            .virtual_relation("courses", "courses", "bootcamp"),
    );
    store.declare(CollectionSpec::new("courses").reference("bootcamp", "bootcamps"));
    store.declare(
        CollectionSpec::new("users")
            .unique("email")
            .hidden("password"),
    );
    store
}

/// `n` bootcamps named `camp-00`.. with strictly increasing `createdAt`.
pub async fn seed_bootcamps(store: &MemoryStore, n: usize) {
    let camps = store.collection("bootcamps").unwrap();
    for i in 0..n {
        camps
            .insert_one(doc(json!({
                "_id": format!("b{i:02}"),
                "name": format!("camp-{i:02}"),
                "description": format!("description {i}"),
                "averageCost": (i as u64) * 1000,
                "housing": i % 2 == 0,
                "careers": if i % 3 == 0 { json!(["Business"]) } else { json!(["Web Development", "UI/UX"]) },
                "createdAt": format!("2024-01-01T00:00:{i:02}.000Z"),
            })))
            .await
            .unwrap();
    }
}

pub fn ids(docs: &[Document]) -> Vec<String> {
    docs.iter()
        .map(|d| d["_id"].as_str().unwrap_or_default().to_string())
        .collect()
}
