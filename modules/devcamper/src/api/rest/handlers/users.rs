//! Admin-only account management.

use std::sync::Arc;

use apikit::{AdvancedParams, DataEnvelope, JsonBody, JsonList, ProblemResponse};
use axum::{
    extract::{OriginalUri, Path},
    http::StatusCode,
    Extension, Json,
};
use tracing::{error, info};

use crate::api::rest::auth::AuthUser;
use crate::api::rest::dto::{CreateUserReq, UpdateUserReq};
use crate::api::rest::error::map_domain_error;
use crate::contract::model::{Role, User};
use crate::domain::service::Service;

const ADMINS: [Role; 1] = [Role::Admin];

pub async fn list_users(
    Extension(svc): Extension<Arc<Service>>,
    user: AuthUser,
    AdvancedParams(params): AdvancedParams,
    OriginalUri(uri): OriginalUri,
) -> Result<JsonList, ProblemResponse> {
    info!("Listing users");
    user.require(&ADMINS, uri.path())?;

    match svc.list_users(&params).await {
        Ok(page) => Ok(Json(page)),
        Err(e) => {
            error!("Failed to list users: {}", e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

pub async fn get_user(
    Extension(svc): Extension<Arc<Service>>,
    Path(id): Path<String>,
    user: AuthUser,
    OriginalUri(uri): OriginalUri,
) -> Result<JsonBody<User>, ProblemResponse> {
    info!("Getting user with id: {}", id);
    user.require(&ADMINS, uri.path())?;

    match svc.get_user(&id).await {
        Ok(found) => Ok(Json(DataEnvelope::new(found))),
        Err(e) => {
            error!("Failed to get user {}: {}", id, e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

pub async fn create_user(
    OriginalUri(uri): OriginalUri,
    Extension(svc): Extension<Arc<Service>>,
    user: AuthUser,
    Json(req_body): Json<CreateUserReq>,
) -> Result<(StatusCode, JsonBody<User>), ProblemResponse> {
    info!("Creating user: {}", req_body.email);
    user.require(&ADMINS, uri.path())?;

    match svc.create_user(req_body.into()).await {
        Ok(created) => Ok((StatusCode::CREATED, Json(DataEnvelope::new(created)))),
        Err(e) => {
            error!("Failed to create user: {}", e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

pub async fn update_user(
    OriginalUri(uri): OriginalUri,
    Extension(svc): Extension<Arc<Service>>,
    Path(id): Path<String>,
    user: AuthUser,
    Json(req_body): Json<UpdateUserReq>,
) -> Result<JsonBody<User>, ProblemResponse> {
    info!("Updating user {}", id);
    user.require(&ADMINS, uri.path())?;

    match svc.update_user(&id, req_body.into()).await {
        Ok(updated) => Ok(Json(DataEnvelope::new(updated))),
        Err(e) => {
            error!("Failed to update user {}: {}", id, e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

pub async fn delete_user(
    OriginalUri(uri): OriginalUri,
    Extension(svc): Extension<Arc<Service>>,
    Path(id): Path<String>,
    user: AuthUser,
) -> Result<Json<DataEnvelope<serde_json::Value>>, ProblemResponse> {
    info!("Deleting user {}", id);
    user.require(&ADMINS, uri.path())?;

    match svc.delete_user(&id).await {
        Ok(()) => Ok(Json(DataEnvelope::empty())),
        Err(e) => {
            error!("Failed to delete user {}: {}", id, e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}
