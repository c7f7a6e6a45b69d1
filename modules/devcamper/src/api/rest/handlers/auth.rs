use std::sync::Arc;

use apikit::{DataEnvelope, JsonBody, ProblemResponse};
use axum::{extract::OriginalUri, Extension, Json};
use tracing::{error, info};

use crate::api::rest::auth::AuthUser;
use crate::api::rest::dto::{CreateUserReq, LoginReq, TokenResponse};
use crate::api::rest::error::map_domain_error;
use crate::contract::model::User;
use crate::domain::service::Service;

pub async fn register(
    OriginalUri(uri): OriginalUri,
    Extension(svc): Extension<Arc<Service>>,
    Json(req_body): Json<CreateUserReq>,
) -> Result<Json<TokenResponse>, ProblemResponse> {
    info!("Registering user: {}", req_body.email);

    match svc.register(req_body.into()).await {
        Ok((_, token)) => Ok(Json(TokenResponse::new(token))),
        Err(e) => {
            error!("Failed to register user: {}", e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

pub async fn login(
    OriginalUri(uri): OriginalUri,
    Extension(svc): Extension<Arc<Service>>,
    Json(req_body): Json<LoginReq>,
) -> Result<Json<TokenResponse>, ProblemResponse> {
    info!("Login attempt: {}", req_body.email);

    match svc.login(req_body.into()).await {
        Ok((_, token)) => Ok(Json(TokenResponse::new(token))),
        Err(e) => {
            error!("Login failed: {}", e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

/// The caller's own account
pub async fn me(AuthUser(user): AuthUser) -> JsonBody<User> {
    Json(DataEnvelope::new(user))
}
