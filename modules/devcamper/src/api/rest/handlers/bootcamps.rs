use std::sync::Arc;

use apikit::{AdvancedParams, DataEnvelope, JsonBody, JsonList, ProblemResponse};
use axum::{
    extract::{OriginalUri, Path},
    http::StatusCode,
    Extension, Json,
};
use tracing::{error, info};

use crate::api::rest::auth::AuthUser;
use crate::api::rest::dto::{CollectionDto, CreateBootcampReq, UpdateBootcampReq};
use crate::api::rest::error::map_domain_error;
use crate::contract::model::{Bootcamp, Role};
use crate::domain::service::Service;

const PUBLISHERS: [Role; 2] = [Role::Publisher, Role::Admin];

/// List bootcamps with filtering, select, sort and paging
pub async fn list_bootcamps(
    Extension(svc): Extension<Arc<Service>>,
    AdvancedParams(params): AdvancedParams,
    OriginalUri(uri): OriginalUri,
) -> Result<JsonList, ProblemResponse> {
    info!("Listing bootcamps");

    match svc.list_bootcamps(&params).await {
        Ok(page) => Ok(Json(page)),
        Err(e) => {
            error!("Failed to list bootcamps: {}", e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

pub async fn get_bootcamp(
    Extension(svc): Extension<Arc<Service>>,
    Path(id): Path<String>,
    OriginalUri(uri): OriginalUri,
) -> Result<JsonBody<Bootcamp>, ProblemResponse> {
    info!("Getting bootcamp with id: {}", id);

    match svc.get_bootcamp(&id).await {
        Ok(bootcamp) => Ok(Json(DataEnvelope::new(bootcamp))),
        Err(e) => {
            error!("Failed to get bootcamp {}: {}", id, e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

pub async fn create_bootcamp(
    OriginalUri(uri): OriginalUri,
    Extension(svc): Extension<Arc<Service>>,
    user: AuthUser,
    Json(req_body): Json<CreateBootcampReq>,
) -> Result<(StatusCode, JsonBody<Bootcamp>), ProblemResponse> {
    info!("Creating bootcamp: {}", req_body.name);
    user.require(&PUBLISHERS, uri.path())?;

    match svc.create_bootcamp(&user.0, req_body.into()).await {
        Ok(bootcamp) => Ok((StatusCode::CREATED, Json(DataEnvelope::new(bootcamp)))),
        Err(e) => {
            error!("Failed to create bootcamp: {}", e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

pub async fn update_bootcamp(
    OriginalUri(uri): OriginalUri,
    Extension(svc): Extension<Arc<Service>>,
    Path(id): Path<String>,
    user: AuthUser,
    Json(req_body): Json<UpdateBootcampReq>,
) -> Result<JsonBody<Bootcamp>, ProblemResponse> {
    info!("Updating bootcamp {}", id);
    user.require(&PUBLISHERS, uri.path())?;

    match svc.update_bootcamp(&user.0, &id, req_body.into()).await {
        Ok(bootcamp) => Ok(Json(DataEnvelope::new(bootcamp))),
        Err(e) => {
            error!("Failed to update bootcamp {}: {}", id, e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

pub async fn delete_bootcamp(
    OriginalUri(uri): OriginalUri,
    Extension(svc): Extension<Arc<Service>>,
    Path(id): Path<String>,
    user: AuthUser,
) -> Result<Json<DataEnvelope<serde_json::Value>>, ProblemResponse> {
    info!("Deleting bootcamp {}", id);
    user.require(&PUBLISHERS, uri.path())?;

    match svc.delete_bootcamp(&user.0, &id).await {
        Ok(()) => Ok(Json(DataEnvelope::empty())),
        Err(e) => {
            error!("Failed to delete bootcamp {}: {}", id, e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

/// Bootcamps within `distance` miles of a zip code
pub async fn bootcamps_in_radius(
    Extension(svc): Extension<Arc<Service>>,
    Path((zipcode, distance)): Path<(String, String)>,
    OriginalUri(uri): OriginalUri,
) -> Result<Json<CollectionDto<Bootcamp>>, ProblemResponse> {
    info!("Radius search: {} miles around {}", distance, zipcode);

    match svc.bootcamps_in_radius(&zipcode, &distance).await {
        Ok(found) => Ok(Json(CollectionDto::new(found))),
        Err(e) => {
            error!("Radius search failed: {}", e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}
