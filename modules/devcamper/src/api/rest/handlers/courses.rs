use std::sync::Arc;

use apikit::{AdvancedParams, DataEnvelope, JsonBody, JsonList, ProblemResponse};
use axum::{
    extract::{OriginalUri, Path},
    http::StatusCode,
    Extension, Json,
};
use tracing::{error, info};

use crate::api::rest::auth::AuthUser;
use crate::api::rest::dto::{CollectionDto, CreateCourseReq, UpdateCourseReq};
use crate::api::rest::error::map_domain_error;
use crate::contract::model::{Course, Role};
use crate::domain::service::Service;

const PUBLISHERS: [Role; 2] = [Role::Publisher, Role::Admin];

pub async fn list_courses(
    Extension(svc): Extension<Arc<Service>>,
    AdvancedParams(params): AdvancedParams,
    OriginalUri(uri): OriginalUri,
) -> Result<JsonList, ProblemResponse> {
    info!("Listing courses");

    match svc.list_courses(&params).await {
        Ok(page) => Ok(Json(page)),
        Err(e) => {
            error!("Failed to list courses: {}", e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

pub async fn bootcamp_courses(
    Extension(svc): Extension<Arc<Service>>,
    Path(bootcamp_id): Path<String>,
    OriginalUri(uri): OriginalUri,
) -> Result<Json<CollectionDto<Course>>, ProblemResponse> {
    info!("Listing courses of bootcamp {}", bootcamp_id);

    match svc.bootcamp_courses(&bootcamp_id).await {
        Ok(courses) => Ok(Json(CollectionDto::new(courses))),
        Err(e) => {
            error!("Failed to list courses of bootcamp {}: {}", bootcamp_id, e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

pub async fn get_course(
    Extension(svc): Extension<Arc<Service>>,
    Path(id): Path<String>,
    OriginalUri(uri): OriginalUri,
) -> Result<JsonBody<Course>, ProblemResponse> {
    info!("Getting course with id: {}", id);

    match svc.get_course(&id).await {
        Ok(course) => Ok(Json(DataEnvelope::new(course))),
        Err(e) => {
            error!("Failed to get course {}: {}", id, e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

pub async fn create_course(
    OriginalUri(uri): OriginalUri,
    Extension(svc): Extension<Arc<Service>>,
    Path(bootcamp_id): Path<String>,
    user: AuthUser,
    Json(req_body): Json<CreateCourseReq>,
) -> Result<(StatusCode, JsonBody<Course>), ProblemResponse> {
    info!("Creating course for bootcamp {}", bootcamp_id);
    user.require(&PUBLISHERS, uri.path())?;

    match svc
        .create_course(&user.0, &bootcamp_id, req_body.into())
        .await
    {
        Ok(course) => Ok((StatusCode::CREATED, Json(DataEnvelope::new(course)))),
        Err(e) => {
            error!("Failed to create course: {}", e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

pub async fn update_course(
    OriginalUri(uri): OriginalUri,
    Extension(svc): Extension<Arc<Service>>,
    Path(id): Path<String>,
    user: AuthUser,
    Json(req_body): Json<UpdateCourseReq>,
) -> Result<JsonBody<Course>, ProblemResponse> {
    info!("Updating course {}", id);
    user.require(&PUBLISHERS, uri.path())?;

    match svc.update_course(&user.0, &id, req_body.into()).await {
        Ok(course) => Ok(Json(DataEnvelope::new(course))),
        Err(e) => {
            error!("Failed to update course {}: {}", id, e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

pub async fn delete_course(
    OriginalUri(uri): OriginalUri,
    Extension(svc): Extension<Arc<Service>>,
    Path(id): Path<String>,
    user: AuthUser,
) -> Result<Json<DataEnvelope<serde_json::Value>>, ProblemResponse> {
    info!("Deleting course {}", id);
    user.require(&PUBLISHERS, uri.path())?;

    match svc.delete_course(&user.0, &id).await {
        Ok(()) => Ok(Json(DataEnvelope::empty())),
        Err(e) => {
            error!("Failed to delete course {}: {}", id, e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}
