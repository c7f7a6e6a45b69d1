use std::sync::Arc;

use async_trait::async_trait;
use docstore::Result as StoreResult;
use query_core::{ParamMap, RelationSpec, ResultEnvelope, TranslatorConfig};

use crate::contract::model::{Bootcamp, Course, Review, User};

/// Persistence the domain needs for bootcamps.
///
/// The service computes ids, timestamps and derived fields; repositories
/// persist. Store errors pass through untouched.
#[async_trait]
pub trait BootcampsRepository: Send + Sync {
    async fn list(
        &self,
        params: &ParamMap,
        populate: Option<&RelationSpec>,
        cfg: &TranslatorConfig,
    ) -> StoreResult<ResultEnvelope>;
    async fn find_by_id(&self, id: &str) -> StoreResult<Option<Bootcamp>>;
    async fn insert(&self, b: Bootcamp) -> StoreResult<Bootcamp>;
    /// Overwrite the stored fields present in `b`.
    async fn update(&self, b: Bootcamp) -> StoreResult<Option<Bootcamp>>;
    /// `None` removes the field.
    async fn set_average_cost(&self, id: &str, cost: Option<f64>) -> StoreResult<()>;
    /// `None` removes the field.
    async fn set_average_rating(&self, id: &str, rating: Option<f64>) -> StoreResult<()>;
    async fn delete(&self, id: &str) -> StoreResult<bool>;
    /// Bootcamps whose location lies within `radians` of `center` (`[lng, lat]`).
    async fn within_radius(&self, center: (f64, f64), radians: f64) -> StoreResult<Vec<Bootcamp>>;
}

#[async_trait]
pub trait CoursesRepository: Send + Sync {
    async fn list(
        &self,
        params: &ParamMap,
        populate: Option<&RelationSpec>,
        cfg: &TranslatorConfig,
    ) -> StoreResult<ResultEnvelope>;
    async fn list_by_bootcamp(&self, bootcamp_id: &str) -> StoreResult<Vec<Course>>;
    async fn find_by_id(&self, id: &str, populate: Option<&RelationSpec>)
        -> StoreResult<Option<Course>>;
    async fn insert(&self, c: Course) -> StoreResult<Course>;
    async fn update(&self, c: Course) -> StoreResult<Option<Course>>;
    async fn delete(&self, id: &str) -> StoreResult<bool>;
    async fn delete_by_bootcamp(&self, bootcamp_id: &str) -> StoreResult<u64>;
}

#[async_trait]
pub trait ReviewsRepository: Send + Sync {
    async fn list(
        &self,
        params: &ParamMap,
        populate: Option<&RelationSpec>,
        cfg: &TranslatorConfig,
    ) -> StoreResult<ResultEnvelope>;
    async fn list_by_bootcamp(&self, bootcamp_id: &str) -> StoreResult<Vec<Review>>;
    async fn find_by_id(&self, id: &str, populate: Option<&RelationSpec>)
        -> StoreResult<Option<Review>>;
    async fn find_by_bootcamp_and_user(
        &self,
        bootcamp_id: &str,
        user_id: &str,
    ) -> StoreResult<Option<Review>>;
    async fn insert(&self, r: Review) -> StoreResult<Review>;
    async fn update(&self, r: Review) -> StoreResult<Option<Review>>;
    async fn delete(&self, id: &str) -> StoreResult<bool>;
    async fn delete_by_bootcamp(&self, bootcamp_id: &str) -> StoreResult<u64>;
}

#[async_trait]
pub trait UsersRepository: Send + Sync {
    async fn list(&self, params: &ParamMap, cfg: &TranslatorConfig) -> StoreResult<ResultEnvelope>;
    async fn find_by_id(&self, id: &str) -> StoreResult<Option<User>>;
    async fn email_exists(&self, email: &str) -> StoreResult<bool>;
    /// The user and its stored password hash, for credential checks.
    async fn find_with_password(&self, email: &str) -> StoreResult<Option<(User, String)>>;
    async fn insert(&self, u: User, password_hash: String) -> StoreResult<User>;
    async fn update(&self, u: User) -> StoreResult<Option<User>>;
    async fn delete(&self, id: &str) -> StoreResult<bool>;
}

/// Every repository the service talks to.
#[derive(Clone)]
pub struct Repositories {
    pub bootcamps: Arc<dyn BootcampsRepository>,
    pub courses: Arc<dyn CoursesRepository>,
    pub reviews: Arc<dyn ReviewsRepository>,
    pub users: Arc<dyn UsersRepository>,
}
