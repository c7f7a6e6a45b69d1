use std::sync::Arc;

use apikit::{AdvancedParams, DataEnvelope, JsonBody, JsonList, ProblemResponse};
use axum::{
    extract::{OriginalUri, Path},
    http::StatusCode,
    Extension, Json,
};
use tracing::{error, info};

use crate::api::rest::auth::AuthUser;
use crate::api::rest::dto::{CollectionDto, CreateReviewReq, UpdateReviewReq};
use crate::api::rest::error::map_domain_error;
use crate::contract::model::{Review, Role};
use crate::domain::service::Service;

const REVIEWERS: [Role; 2] = [Role::User, Role::Admin];

pub async fn list_reviews(
    Extension(svc): Extension<Arc<Service>>,
    AdvancedParams(params): AdvancedParams,
    OriginalUri(uri): OriginalUri,
) -> Result<JsonList, ProblemResponse> {
    info!("Listing reviews");

    match svc.list_reviews(&params).await {
        Ok(page) => Ok(Json(page)),
        Err(e) => {
            error!("Failed to list reviews: {}", e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

pub async fn bootcamp_reviews(
    Extension(svc): Extension<Arc<Service>>,
    Path(bootcamp_id): Path<String>,
    OriginalUri(uri): OriginalUri,
) -> Result<Json<CollectionDto<Review>>, ProblemResponse> {
    info!("Listing reviews of bootcamp {}", bootcamp_id);

    match svc.bootcamp_reviews(&bootcamp_id).await {
        Ok(reviews) => Ok(Json(CollectionDto::new(reviews))),
        Err(e) => {
            error!("Failed to list reviews of bootcamp {}: {}", bootcamp_id, e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

pub async fn get_review(
    Extension(svc): Extension<Arc<Service>>,
    Path(id): Path<String>,
    OriginalUri(uri): OriginalUri,
) -> Result<JsonBody<Review>, ProblemResponse> {
    info!("Getting review with id: {}", id);

    match svc.get_review(&id).await {
        Ok(review) => Ok(Json(DataEnvelope::new(review))),
        Err(e) => {
            error!("Failed to get review {}: {}", id, e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

pub async fn create_review(
    OriginalUri(uri): OriginalUri,
    Extension(svc): Extension<Arc<Service>>,
    Path(bootcamp_id): Path<String>,
    user: AuthUser,
    Json(req_body): Json<CreateReviewReq>,
) -> Result<(StatusCode, JsonBody<Review>), ProblemResponse> {
    info!("Creating review for bootcamp {}", bootcamp_id);
    user.require(&REVIEWERS, uri.path())?;

    match svc
        .create_review(&user.0, &bootcamp_id, req_body.into())
        .await
    {
        Ok(review) => Ok((StatusCode::CREATED, Json(DataEnvelope::new(review)))),
        Err(e) => {
            error!("Failed to create review: {}", e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

pub async fn update_review(
    OriginalUri(uri): OriginalUri,
    Extension(svc): Extension<Arc<Service>>,
    Path(id): Path<String>,
    user: AuthUser,
    Json(req_body): Json<UpdateReviewReq>,
) -> Result<JsonBody<Review>, ProblemResponse> {
    info!("Updating review {}", id);
    user.require(&REVIEWERS, uri.path())?;

    match svc.update_review(&user.0, &id, req_body.into()).await {
        Ok(review) => Ok(Json(DataEnvelope::new(review))),
        Err(e) => {
            error!("Failed to update review {}: {}", id, e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

pub async fn delete_review(
    OriginalUri(uri): OriginalUri,
    Extension(svc): Extension<Arc<Service>>,
    Path(id): Path<String>,
    user: AuthUser,
) -> Result<Json<DataEnvelope<serde_json::Value>>, ProblemResponse> {
    info!("Deleting review {}", id);
    user.require(&REVIEWERS, uri.path())?;

    match svc.delete_review(&user.0, &id).await {
        Ok(()) => Ok(Json(DataEnvelope::empty())),
        Err(e) => {
            error!("Failed to delete review {}: {}", id, e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}
