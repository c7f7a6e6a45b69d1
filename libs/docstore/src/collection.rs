use async_trait::async_trait;
use query_core::{Filter, FindQuery, RelationSpec};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::Document;

/// A named set of documents.
///
/// Reads never return hidden fields except through
/// [`Collection::find_one_with_hidden`].
#[async_trait]
pub trait Collection: Send + Sync {
    fn name(&self) -> &str;

    /// Execute a described fetch: filter, sort, window, projection, populate.
    async fn find(&self, query: &FindQuery) -> Result<Vec<Document>>;

    async fn count_documents(&self, filter: &Filter) -> Result<u64>;

    async fn find_by_id(&self, id: &str, populate: Option<&RelationSpec>)
        -> Result<Option<Document>>;

    async fn find_one(&self, filter: &Filter) -> Result<Option<Document>>;

    /// Like `find_one` but keeps hidden fields (credential checks).
    async fn find_one_with_hidden(&self, filter: &Filter) -> Result<Option<Document>>;

    /// Assigns `_id` and `createdAt` when missing; enforces unique fields.
    async fn insert_one(&self, doc: Document) -> Result<Document>;

    /// Shallow merge of `patch` into the stored document. A `null` in the
    /// patch removes the field. Returns the updated document.
    async fn update_by_id(&self, id: &str, patch: Document) -> Result<Option<Document>>;

    async fn delete_by_id(&self, id: &str) -> Result<bool>;

    async fn delete_many(&self, filter: &Filter) -> Result<u64>;
}

/// How a relation path is resolved during populate.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Relation {
    /// `path` stores the id of one document in `target`.
    Ref { path: String, target: String },
    /// Documents in `target` whose `foreign_field` holds this document's id.
    Virtual {
        path: String,
        target: String,
        foreign_field: String,
    },
}

impl Relation {
    pub fn path(&self) -> &str {
        match self {
            Relation::Ref { path, .. } | Relation::Virtual { path, .. } => path,
        }
    }

    pub fn target(&self) -> &str {
        match self {
            Relation::Ref { target, .. } | Relation::Virtual { target, .. } => target,
        }
    }
}

/// Declaration of one collection.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionSpec {
    pub name: String,
    #[serde(default)]
    pub unique: Vec<String>,
    #[serde(default)]
    pub hidden: Vec<String>,
    #[serde(default)]
    pub relations: Vec<Relation>,
}

impl CollectionSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn unique(mut self, field: impl Into<String>) -> Self {
        self.unique.push(field.into());
        self
    }

    pub fn hidden(mut self, field: impl Into<String>) -> Self {
        self.hidden.push(field.into());
        self
    }

    pub fn reference(mut self, path: impl Into<String>, target: impl Into<String>) -> Self {
        self.relations.push(Relation::Ref {
            path: path.into(),
            target: target.into(),
        });
        self
    }

    pub fn virtual_relation(
        mut self,
        path: impl Into<String>,
        target: impl Into<String>,
        foreign_field: impl Into<String>,
    ) -> Self {
        self.relations.push(Relation::Virtual {
            path: path.into(),
            target: target.into(),
            foreign_field: foreign_field.into(),
        });
        self
    }

    pub fn relation(&self, path: &str) -> Option<&Relation> {
        self.relations.iter().find(|r| r.path() == path)
    }
}
