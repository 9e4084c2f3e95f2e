// libs/appointment-cell/src/router.rs
use std::sync::Arc;

use axum::{
    Router,
    routing::{get, patch, post},
};

use crate::handlers;
use crate::services::AppointmentLedger;

pub fn appointment_routes(ledger: Arc<AppointmentLedger>) -> Router {
    Router::new()
        .route("/", get(handlers::list_appointments).post(handlers::book_appointment))
        .route("/availability", get(handlers::check_availability))
        .route("/quote", post(handlers::quote_item))
        .route("/{appointment_id}", get(handlers::get_appointment))
        .route("/{appointment_id}/reschedule", patch(handlers::reschedule_appointment))
        .route("/{appointment_id}/cancel", post(handlers::cancel_appointment))
        .route("/{appointment_id}/complete", post(handlers::complete_appointment))
        .route("/patients/{patient_name}", get(handlers::get_patient_appointments))
        .route("/doctors/{doctor_name}", get(handlers::get_doctor_appointments))
        .with_state(ledger)
}
