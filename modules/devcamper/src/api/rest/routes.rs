use std::sync::Arc;

use anyhow::bail;
use axum::{
    routing::{get, post},
    Extension, Router,
};

use crate::api::rest::handlers::{auth, bootcamps, courses, reviews, users};
use crate::domain::service::Service;

/// Mount every REST route under `prefix` (e.g. `/api/v1`) onto `router`.
pub fn register_routes(
    router: Router,
    service: Arc<Service>,
    prefix: &str,
) -> anyhow::Result<Router> {
    let prefix = prefix.trim_end_matches('/');
    if !prefix.is_empty() && !prefix.starts_with('/') {
        bail!("api prefix must start with '/', got '{prefix}'");
    }

    let api = Router::new()
        // Bootcamps
        .route(
            "/bootcamps",
            get(bootcamps::list_bootcamps).post(bootcamps::create_bootcamp),
        )
        .route(
            "/bootcamps/{id}",
            get(bootcamps::get_bootcamp)
                .put(bootcamps::update_bootcamp)
                .delete(bootcamps::delete_bootcamp),
        )
        .route(
            "/bootcamps/radius/{zipcode}/{distance}",
            get(bootcamps::bootcamps_in_radius),
        )
        // Courses
        .route(
            "/bootcamps/{id}/courses",
            get(courses::bootcamp_courses).post(courses::create_course),
        )
        .route("/courses", get(courses::list_courses))
        .route(
            "/courses/{id}",
            get(courses::get_course)
                .put(courses::update_course)
                .delete(courses::delete_course),
        )
        // Reviews
        .route(
            "/bootcamps/{id}/reviews",
            get(reviews::bootcamp_reviews).post(reviews::create_review),
        )
        .route("/reviews", get(reviews::list_reviews))
        .route(
            "/reviews/{id}",
            get(reviews::get_review)
                .put(reviews::update_review)
                .delete(reviews::delete_review),
        )
        // Auth
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/me", get(auth::me))
        // Admin users
        .route("/admin", get(users::list_users).post(users::create_user))
        .route(
            "/admin/{id}",
            get(users::get_user)
                .put(users::update_user)
                .delete(users::delete_user),
        )
        .layer(Extension(service));

    let router = if prefix.is_empty() {
        router.merge(api)
    } else {
        router.nest(prefix, api)
    };
    Ok(router)
}
