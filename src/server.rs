use axum::routing::{get, post, put};
use axum::{middleware, Router};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::db::Database;
use crate::handlers::{attachment, auth, catalog, group, issue, project, user};
use crate::middleware::jwt_auth_middleware;

pub fn app() -> Router {
    Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        .route("/auth/login", post(auth::login))
        // Protected API
        .merge(api_routes())
        // Global middleware
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

fn api_routes() -> Router {
    Router::new()
        // Issues
        .route("/api/issue", post(issue::crud::create))
        .route("/api/issue/bulk", post(issue::crud::create_bulk))
        .route("/api/issue/createmeta", get(issue::meta::createmeta))
        .route(
            "/api/issue/:key",
            get(issue::crud::get)
                .put(issue::crud::edit)
                .delete(issue::crud::delete),
        )
        .route("/api/issue/:key/editmeta", get(issue::meta::editmeta))
        .route(
            "/api/issue/:key/transitions",
            get(issue::transitions::list).post(issue::transitions::perform),
        )
        .route("/api/issue/:key/assignee", put(issue::assignee::assign))
        .route(
            "/api/issue/:key/votes",
            get(issue::votes::get)
                .post(issue::votes::add)
                .delete(issue::votes::remove),
        )
        .route(
            "/api/issue/:key/watchers",
            get(issue::watchers::get)
                .post(issue::watchers::add)
                .delete(issue::watchers::remove),
        )
        .route(
            "/api/issue/:key/comment",
            get(issue::comment::list).post(issue::comment::add),
        )
        .route(
            "/api/issue/:key/comment/:id",
            get(issue::comment::get)
                .put(issue::comment::update)
                .delete(issue::comment::delete),
        )
        .route("/api/issue/:key/attachments", post(issue::attachment::upload))
        // Attachments
        .route(
            "/api/attachment/:id",
            get(attachment::get).delete(attachment::delete),
        )
        .route("/api/attachment/:id/content", get(attachment::content))
        // Users and groups
        .route("/api/user", get(user::get))
        .route("/api/user/search", get(user::search))
        .route(
            "/api/group",
            get(group::get).post(group::create).delete(group::delete),
        )
        .route(
            "/api/group/user",
            post(group::add_user).delete(group::remove_user),
        )
        // Catalog
        .route("/api/field", get(catalog::fields))
        .route("/api/priority", get(catalog::priorities))
        .route("/api/priority/:id", get(catalog::priority))
        .route("/api/status", get(catalog::statuses))
        .route("/api/status/:id", get(catalog::status))
        .route("/api/resolution", get(catalog::resolutions))
        .route("/api/resolution/:id", get(catalog::resolution))
        // Projects
        .route("/api/project", get(project::list))
        .route("/api/project/:key", get(project::get))
        .route_layer(middleware::from_fn(jwt_auth_middleware))
}

async fn root() -> axum::response::Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    axum::response::Json(json!({
        "success": true,
        "data": {
            "name": "Tracker API",
            "version": version,
            "description": "Issue tracker REST API built with Rust (Axum)",
            "endpoints": {
                "home": "/ (public)",
                "auth": "/auth/login (public - token acquisition)",
                "issue": "/api/issue[/:key] (protected)",
                "meta": "/api/issue/createmeta, /api/issue/:key/editmeta (protected)",
                "transitions": "/api/issue/:key/transitions (protected)",
                "attachment": "/api/attachment/:id (protected)",
                "user": "/api/user, /api/user/search (protected)",
                "group": "/api/group[/user] (protected)",
                "catalog": "/api/field, /api/priority, /api/status, /api/resolution (protected)",
                "project": "/api/project[/:key] (protected)",
            }
        }
    }))
}

async fn health() -> impl axum::response::IntoResponse {
    let now = chrono::Utc::now();

    match Database::health_check().await {
        Ok(_) => (
            axum::http::StatusCode::OK,
            axum::response::Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => (
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            axum::response::Json(json!({
                "success": false,
                "error": "database unavailable",
                "data": {
                    "status": "degraded",
                    "timestamp": now,
                    "database_error": e.to_string()
                }
            })),
        ),
    }
}
