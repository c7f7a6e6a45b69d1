use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use dashmap::DashMap;
use parking_lot::RwLock;
use query_core::{Filter, FindQuery, Projection, RelationSpec, ID_FIELD};
use serde_json::Value;
use tracing::debug;

use crate::collection::{Collection, CollectionSpec, Relation};
use crate::error::{Result, StoreError};
use crate::matcher::{matches, validate};
use crate::path::{get_path, remove_path};
use crate::projection::{apply_projection, validate_projection};
use crate::sorting::sort_documents;
use crate::{Document, CREATED_AT_FIELD};

pub(crate) struct CollectionData {
    pub(crate) spec: CollectionSpec,
    /// Insertion order is the natural order of the collection.
    pub(crate) docs: RwLock<Vec<Document>>,
}

impl CollectionData {
    fn strip_hidden(&self, mut doc: Document) -> Document {
        for field in &self.spec.hidden {
            remove_path(&mut doc, field);
        }
        doc
    }

    fn present(&self, doc: Document, projection: &Projection) -> Document {
        apply_projection(self.strip_hidden(doc), projection)
    }

    fn check_unique(&self, docs: &[Document], candidate: &Document, skip_id: Option<&str>) -> Result<()> {
        for field in &self.spec.unique {
            let Some(value) = get_path(candidate, field).filter(|v| !v.is_null()) else {
                continue;
            };
            let clash = docs
                .iter()
                .filter(|d| skip_id.is_none() || id_of(d) != skip_id)
                .any(|d| get_path(d, field) == Some(value));
            if clash {
                return Err(StoreError::Duplicate {
                    field: field.clone(),
                });
            }
        }
        Ok(())
    }
}

fn id_of(doc: &Document) -> Option<&str> {
    doc.get(ID_FIELD).and_then(Value::as_str)
}

/// In-process store of named collections.
///
/// Cheap to clone; clones share the same data.
#[derive(Clone, Default)]
pub struct MemoryStore {
    collections: Arc<DashMap<String, Arc<CollectionData>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare (or re-declare) a collection. Existing documents are kept.
    pub fn declare(&self, spec: CollectionSpec) {
        let docs = self
            .collections
            .get(&spec.name)
            .map(|c| c.docs.read().clone())
            .unwrap_or_default();
        let name = spec.name.clone();
        self.collections.insert(
            name,
            Arc::new(CollectionData {
                spec,
                docs: RwLock::new(docs),
            }),
        );
    }

    pub fn collection(&self, name: &str) -> Result<MemCollection> {
        Ok(MemCollection {
            name: name.to_string(),
            data: self.data(name)?,
            store: self.clone(),
        })
    }

    /// Type-erased handle for callers that only know the trait.
    pub fn handle(&self, name: &str) -> Result<Arc<dyn Collection>> {
        Ok(Arc::new(self.collection(name)?))
    }

    pub fn collection_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.collections.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    pub(crate) fn data(&self, name: &str) -> Result<Arc<CollectionData>> {
        self.collections
            .get(name)
            .map(|c| Arc::clone(c.value()))
            .ok_or_else(|| StoreError::UnknownCollection(name.to_string()))
    }
}

/// Handle to one collection of a [`MemoryStore`].
#[derive(Clone)]
pub struct MemCollection {
    name: String,
    data: Arc<CollectionData>,
    store: MemoryStore,
}

impl MemCollection {
    pub fn spec(&self) -> &CollectionSpec {
        &self.data.spec
    }

    fn relation(&self, spec: &RelationSpec) -> Result<Relation> {
        self.data
            .spec
            .relation(spec.relation())
            .cloned()
            .ok_or_else(|| StoreError::UnknownRelation {
                collection: self.name.clone(),
                relation: spec.relation().to_string(),
            })
    }

    fn populate(
        &self,
        mut docs: Vec<Document>,
        relation: &Relation,
        spec: &RelationSpec,
    ) -> Result<Vec<Document>> {
        let target = self.store.data(relation.target())?;
        let projection = spec.projection().cloned().unwrap_or_default();

        match relation {
            Relation::Ref { path, .. } => {
                let wanted: Vec<String> = docs
                    .iter()
                    .filter_map(|d| d.get(path).and_then(Value::as_str).map(str::to_string))
                    .collect();
                let found: HashMap<String, Document> = {
                    let rows = target.docs.read();
                    rows.iter()
                        .filter(|r| id_of(r).is_some_and(|id| wanted.iter().any(|w| w == id)))
                        .filter_map(|r| id_of(r).map(|id| (id.to_string(), r.clone())))
                        .collect()
                };
                for doc in docs.iter_mut() {
                    let Some(id) = doc.get(path).and_then(Value::as_str).map(str::to_string) else {
                        continue;
                    };
                    let expanded = found
                        .get(&id)
                        .map(|r| Value::Object(target.present(r.clone(), &projection)))
                        .unwrap_or(Value::Null);
                    doc.insert(path.clone(), expanded);
                }
            }
            Relation::Virtual {
                path,
                foreign_field,
                ..
            } => {
                let mut children: HashMap<String, Vec<Value>> = HashMap::new();
                {
                    let rows = target.docs.read();
                    for row in rows.iter() {
                        let Some(parent) = get_path(row, foreign_field).and_then(Value::as_str) else {
                            continue;
                        };
                        if docs.iter().any(|d| id_of(d) == Some(parent)) {
                            children
                                .entry(parent.to_string())
                                .or_default()
                                .push(Value::Object(target.present(row.clone(), &projection)));
                        }
                    }
                }
                for doc in docs.iter_mut() {
                    let list = id_of(doc)
                        .and_then(|id| children.remove(id))
                        .unwrap_or_default();
                    doc.insert(path.clone(), Value::Array(list));
                }
            }
        }
        Ok(docs)
    }
}

#[async_trait]
impl Collection for MemCollection {
    fn name(&self) -> &str {
        &self.name
    }

    async fn find(&self, query: &FindQuery) -> Result<Vec<Document>> {
        validate(&query.filter)?;
        validate_projection(&query.projection)?;
        let populate = match &query.populate {
            Some(spec) => {
                if let Some(p) = spec.projection() {
                    validate_projection(p)?;
                }
                Some((self.relation(spec)?, spec))
            }
            None => None,
        };

        let mut hits = {
            let docs = self.data.docs.read();
            let mut hits = Vec::new();
            for doc in docs.iter() {
                if matches(doc, &query.filter)? {
                    hits.push(doc.clone());
                }
            }
            hits
        };
        let matched = hits.len();
        sort_documents(&mut hits, &query.sort);

        let skip = usize::try_from(query.skip).unwrap_or(usize::MAX);
        let limit = query
            .limit
            .map_or(usize::MAX, |l| usize::try_from(l).unwrap_or(usize::MAX));
        let page: Vec<Document> = hits
            .into_iter()
            .skip(skip)
            .take(limit)
            .map(|d| self.data.present(d, &query.projection))
            .collect();
        debug!(
            collection = %self.name,
            matched,
            returned = page.len(),
            "find"
        );

        match populate {
            Some((relation, spec)) => self.populate(page, &relation, spec),
            None => Ok(page),
        }
    }

    async fn count_documents(&self, filter: &Filter) -> Result<u64> {
        validate(filter)?;
        let docs = self.data.docs.read();
        let mut n = 0u64;
        for doc in docs.iter() {
            if matches(doc, filter)? {
                n += 1;
            }
        }
        Ok(n)
    }

    async fn find_by_id(
        &self,
        id: &str,
        populate: Option<&RelationSpec>,
    ) -> Result<Option<Document>> {
        let query = FindQuery::new(Filter::eq(ID_FIELD, id))
            .limit(1)
            .populate(populate.cloned());
        Ok(self.find(&query).await?.into_iter().next())
    }

    async fn find_one(&self, filter: &Filter) -> Result<Option<Document>> {
        let query = FindQuery::new(filter.clone()).limit(1);
        Ok(self.find(&query).await?.into_iter().next())
    }

    async fn find_one_with_hidden(&self, filter: &Filter) -> Result<Option<Document>> {
        validate(filter)?;
        let docs = self.data.docs.read();
        for doc in docs.iter() {
            if matches(doc, filter)? {
                return Ok(Some(doc.clone()));
            }
        }
        Ok(None)
    }

    async fn insert_one(&self, mut doc: Document) -> Result<Document> {
        if !matches!(doc.get(ID_FIELD), Some(Value::String(_))) {
            doc.insert(
                ID_FIELD.to_string(),
                Value::String(uuid::Uuid::new_v4().simple().to_string()),
            );
        }
        if !doc.contains_key(CREATED_AT_FIELD) {
            doc.insert(
                CREATED_AT_FIELD.to_string(),
                Value::String(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)),
            );
        }

        {
            let mut docs = self.data.docs.write();
            if docs.iter().any(|d| id_of(d) == id_of(&doc)) {
                return Err(StoreError::Duplicate {
                    field: ID_FIELD.to_string(),
                });
            }
            self.data.check_unique(&docs, &doc, None)?;
            docs.push(doc.clone());
        }
        debug!(collection = %self.name, id = ?id_of(&doc), "inserted");
        Ok(self.data.strip_hidden(doc))
    }

    async fn update_by_id(&self, id: &str, patch: Document) -> Result<Option<Document>> {
        let updated = {
            let mut docs = self.data.docs.write();
            let Some(pos) = docs.iter().position(|d| id_of(d) == Some(id)) else {
                return Ok(None);
            };
            let mut updated = docs[pos].clone();
            for (key, value) in patch {
                if key == ID_FIELD {
                    continue;
                }
                if value.is_null() {
                    updated.remove(&key);
                } else {
                    updated.insert(key, value);
                }
            }
            self.data.check_unique(&docs, &updated, Some(id))?;
            docs[pos] = updated.clone();
            updated
        };
        Ok(Some(self.data.strip_hidden(updated)))
    }

    async fn delete_by_id(&self, id: &str) -> Result<bool> {
        let mut docs = self.data.docs.write();
        match docs.iter().position(|d| id_of(d) == Some(id)) {
            Some(pos) => {
                docs.remove(pos);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_many(&self, filter: &Filter) -> Result<u64> {
        validate(filter)?;
        let mut docs = self.data.docs.write();
        let doomed = docs
            .iter()
            .map(|d| matches(d, filter))
            .collect::<Result<Vec<bool>>>()?;
        let mut idx = 0;
        docs.retain(|_| {
            let keep = !doomed[idx];
            idx += 1;
            keep
        });
        Ok(doomed.iter().filter(|d| **d).count() as u64)
    }
}
