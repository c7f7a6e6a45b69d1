//! Repositories over the in-process document store.
//!
//! Each repository holds a type-erased collection handle; any `Collection`
//! implementation works, the `MemoryStore` wiring lives in [`repositories`].

use std::sync::Arc;

use async_trait::async_trait;
use docstore::{
    advanced_results, Collection, CollectionSpec, MemoryStore, Result as StoreResult,
};
use query_core::{Filter, FindQuery, ParamMap, RelationSpec, ResultEnvelope, TranslatorConfig};
use serde_json::{json, Map, Value};

use crate::contract::model::{Bootcamp, Course, Review, User};
use crate::domain::repo::{
    BootcampsRepository, CoursesRepository, Repositories, ReviewsRepository, UsersRepository,
};
use crate::infra::storage::mapper::{to_document, to_model, to_models, to_patch};

pub const BOOTCAMPS: &str = "bootcamps";
pub const COURSES: &str = "courses";
pub const REVIEWS: &str = "reviews";
pub const USERS: &str = "users";

const PASSWORD_FIELD: &str = "password";

/// Declare the four collections with their unique keys and relations.
pub fn declare_collections(store: &MemoryStore) {
    store.declare(
        CollectionSpec::new(BOOTCAMPS)
            .unique("name")
            .reference("user", USERS)
            .virtual_relation("courses", COURSES, "bootcamp"),
    );
    store.declare(
        CollectionSpec::new(COURSES)
            .reference("bootcamp", BOOTCAMPS)
            .reference("user", USERS),
    );
    store.declare(
        CollectionSpec::new(REVIEWS)
            .reference("bootcamp", BOOTCAMPS)
            .reference("user", USERS),
    );
    store.declare(
        CollectionSpec::new(USERS)
            .unique("email")
            .hidden(PASSWORD_FIELD),
    );
}

/// Declare the collections on `store` and build every repository over it.
pub fn repositories(store: &MemoryStore) -> StoreResult<Repositories> {
    declare_collections(store);
    Ok(Repositories {
        bootcamps: Arc::new(DocstoreBootcampsRepository::new(store.handle(BOOTCAMPS)?)),
        courses: Arc::new(DocstoreCoursesRepository::new(store.handle(COURSES)?)),
        reviews: Arc::new(DocstoreReviewsRepository::new(store.handle(REVIEWS)?)),
        users: Arc::new(DocstoreUsersRepository::new(store.handle(USERS)?)),
    })
}

fn single_field(field: &str, value: Option<f64>) -> Map<String, Value> {
    let mut patch = Map::new();
    patch.insert(field.to_string(), value.map_or(Value::Null, Value::from));
    patch
}

pub struct DocstoreBootcampsRepository {
    coll: Arc<dyn Collection>,
}

impl DocstoreBootcampsRepository {
    pub fn new(coll: Arc<dyn Collection>) -> Self {
        Self { coll }
    }
}

#[async_trait]
impl BootcampsRepository for DocstoreBootcampsRepository {
    async fn list(
        &self,
        params: &ParamMap,
        populate: Option<&RelationSpec>,
        cfg: &TranslatorConfig,
    ) -> StoreResult<ResultEnvelope> {
        advanced_results(self.coll.as_ref(), params, populate, cfg).await
    }

    async fn find_by_id(&self, id: &str) -> StoreResult<Option<Bootcamp>> {
        self.coll
            .find_by_id(id, None)
            .await?
            .map(to_model)
            .transpose()
    }

    async fn insert(&self, b: Bootcamp) -> StoreResult<Bootcamp> {
        to_model(self.coll.insert_one(to_document(&b)?).await?)
    }

    async fn update(&self, b: Bootcamp) -> StoreResult<Option<Bootcamp>> {
        self.coll
            .update_by_id(&b.id, to_patch(&b)?)
            .await?
            .map(to_model)
            .transpose()
    }

    async fn set_average_cost(&self, id: &str, cost: Option<f64>) -> StoreResult<()> {
        self.coll
            .update_by_id(id, single_field("averageCost", cost))
            .await?;
        Ok(())
    }

    async fn set_average_rating(&self, id: &str, rating: Option<f64>) -> StoreResult<()> {
        self.coll
            .update_by_id(id, single_field("averageRating", rating))
            .await?;
        Ok(())
    }

    async fn delete(&self, id: &str) -> StoreResult<bool> {
        self.coll.delete_by_id(id).await
    }

    async fn within_radius(&self, center: (f64, f64), radians: f64) -> StoreResult<Vec<Bootcamp>> {
        let filter = Filter::all().and(
            "location",
            json!({ "$geoWithin": { "$centerSphere": [[center.0, center.1], radians] } }),
        );
        to_models(self.coll.find(&FindQuery::new(filter)).await?)
    }
}

pub struct DocstoreCoursesRepository {
    coll: Arc<dyn Collection>,
}

impl DocstoreCoursesRepository {
    pub fn new(coll: Arc<dyn Collection>) -> Self {
        Self { coll }
    }
}

#[async_trait]
impl CoursesRepository for DocstoreCoursesRepository {
    async fn list(
        &self,
        params: &ParamMap,
        populate: Option<&RelationSpec>,
        cfg: &TranslatorConfig,
    ) -> StoreResult<ResultEnvelope> {
        advanced_results(self.coll.as_ref(), params, populate, cfg).await
    }

    async fn list_by_bootcamp(&self, bootcamp_id: &str) -> StoreResult<Vec<Course>> {
        let query = FindQuery::new(Filter::eq("bootcamp", bootcamp_id));
        to_models(self.coll.find(&query).await?)
    }

    async fn find_by_id(
        &self,
        id: &str,
        populate: Option<&RelationSpec>,
    ) -> StoreResult<Option<Course>> {
        self.coll
            .find_by_id(id, populate)
            .await?
            .map(to_model)
            .transpose()
    }

    async fn insert(&self, c: Course) -> StoreResult<Course> {
        to_model(self.coll.insert_one(to_document(&c)?).await?)
    }

    async fn update(&self, c: Course) -> StoreResult<Option<Course>> {
        self.coll
            .update_by_id(&c.id, to_patch(&c)?)
            .await?
            .map(to_model)
            .transpose()
    }

    async fn delete(&self, id: &str) -> StoreResult<bool> {
        self.coll.delete_by_id(id).await
    }

    async fn delete_by_bootcamp(&self, bootcamp_id: &str) -> StoreResult<u64> {
        self.coll
            .delete_many(&Filter::eq("bootcamp", bootcamp_id))
            .await
    }
}

pub struct DocstoreReviewsRepository {
    coll: Arc<dyn Collection>,
}

impl DocstoreReviewsRepository {
    pub fn new(coll: Arc<dyn Collection>) -> Self {
        Self { coll }
    }
}

#[async_trait]
impl ReviewsRepository for DocstoreReviewsRepository {
    async fn list(
        &self,
        params: &ParamMap,
        populate: Option<&RelationSpec>,
        cfg: &TranslatorConfig,
    ) -> StoreResult<ResultEnvelope> {
        advanced_results(self.coll.as_ref(), params, populate, cfg).await
    }

    async fn list_by_bootcamp(&self, bootcamp_id: &str) -> StoreResult<Vec<Review>> {
        let query = FindQuery::new(Filter::eq("bootcamp", bootcamp_id));
        to_models(self.coll.find(&query).await?)
    }

    async fn find_by_id(
        &self,
        id: &str,
        populate: Option<&RelationSpec>,
    ) -> StoreResult<Option<Review>> {
        self.coll
            .find_by_id(id, populate)
            .await?
            .map(to_model)
            .transpose()
    }

    async fn find_by_bootcamp_and_user(
        &self,
        bootcamp_id: &str,
        user_id: &str,
    ) -> StoreResult<Option<Review>> {
        let filter = Filter::eq("bootcamp", bootcamp_id).and("user", user_id);
        self.coll.find_one(&filter).await?.map(to_model).transpose()
    }

    async fn insert(&self, r: Review) -> StoreResult<Review> {
        to_model(self.coll.insert_one(to_document(&r)?).await?)
    }

    async fn update(&self, r: Review) -> StoreResult<Option<Review>> {
        self.coll
            .update_by_id(&r.id, to_patch(&r)?)
            .await?
            .map(to_model)
            .transpose()
    }

    async fn delete(&self, id: &str) -> StoreResult<bool> {
        self.coll.delete_by_id(id).await
    }

    async fn delete_by_bootcamp(&self, bootcamp_id: &str) -> StoreResult<u64> {
        self.coll
            .delete_many(&Filter::eq("bootcamp", bootcamp_id))
            .await
    }
}

pub struct DocstoreUsersRepository {
    coll: Arc<dyn Collection>,
}

impl DocstoreUsersRepository {
    pub fn new(coll: Arc<dyn Collection>) -> Self {
        Self { coll }
    }
}

#[async_trait]
impl UsersRepository for DocstoreUsersRepository {
    async fn list(&self, params: &ParamMap, cfg: &TranslatorConfig) -> StoreResult<ResultEnvelope> {
        advanced_results(self.coll.as_ref(), params, None, cfg).await
    }

    async fn find_by_id(&self, id: &str) -> StoreResult<Option<User>> {
        self.coll
            .find_by_id(id, None)
            .await?
            .map(to_model)
            .transpose()
    }

    async fn email_exists(&self, email: &str) -> StoreResult<bool> {
        Ok(self.coll.count_documents(&Filter::eq("email", email)).await? > 0)
    }

    async fn find_with_password(&self, email: &str) -> StoreResult<Option<(User, String)>> {
        let Some(mut doc) = self
            .coll
            .find_one_with_hidden(&Filter::eq("email", email))
            .await?
        else {
            return Ok(None);
        };
        let hash = match doc.remove(PASSWORD_FIELD) {
            Some(Value::String(h)) => h,
            _ => return Ok(None),
        };
        Ok(Some((to_model(doc)?, hash)))
    }

    async fn insert(&self, u: User, password_hash: String) -> StoreResult<User> {
        let mut doc = to_document(&u)?;
        doc.insert(PASSWORD_FIELD.to_string(), Value::String(password_hash));
        to_model(self.coll.insert_one(doc).await?)
    }

    async fn update(&self, u: User) -> StoreResult<Option<User>> {
        self.coll
            .update_by_id(&u.id, to_patch(&u)?)
            .await?
            .map(to_model)
            .transpose()
    }

    async fn delete(&self, id: &str) -> StoreResult<bool> {
        self.coll.delete_by_id(id).await
    }
}
