use std::sync::Arc;

use axum::{
    Router,
    routing::get,
};

use appointment_cell::router::appointment_routes;
use appointment_cell::AppointmentLedger;
use doctor_cell::router::doctor_routes;
use doctor_cell::DoctorRegistry;

pub fn create_router(doctors: Arc<DoctorRegistry>, ledger: Arc<AppointmentLedger>) -> Router {
    Router::new()
        .route("/", get(|| async { "Clinic booking API is running!" }))
        .nest("/doctors", doctor_routes(doctors))
        .nest("/appointments", appointment_routes(ledger))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use shared_database::{MemoryStore, RecordStore};
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_cells_are_mounted() {
        let store: Arc<dyn RecordStore> = Arc::new(MemoryStore::new());
        let doctors = Arc::new(DoctorRegistry::new(store.clone(), doctor_cell::default_roster()));
        let ledger = Arc::new(AppointmentLedger::open(store, doctors.clone(), "A").await.unwrap());
        let app = create_router(doctors, ledger);

        for uri in ["/", "/doctors", "/appointments"] {
            let response = app
                .clone()
                .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK, "{uri}");
        }

        let response = app
            .oneshot(Request::builder().uri("/doctors/rehan%20khan").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json_response: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json_response["id"], "D001");
    }
}
