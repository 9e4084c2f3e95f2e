use std::sync::Arc;

use axum::{
    Router,
    routing::get,
};

use crate::handlers;
use crate::services::DoctorRegistry;

pub fn doctor_routes(registry: Arc<DoctorRegistry>) -> Router {
    Router::new()
        .route("/", get(handlers::list_doctors).post(handlers::register_doctor))
        .route("/{name}", get(handlers::get_doctor))
        .with_state(registry)
}
