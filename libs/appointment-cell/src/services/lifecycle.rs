// libs/appointment-cell/src/services/lifecycle.rs
use tracing::{debug, warn};

use crate::models::{AppointmentError, AppointmentStatus};

/// Status rules for appointments. Only `Booked` can move; `Cancelled` and
/// `Completed` are terminal.
pub struct AppointmentLifecycleService;

impl Default for AppointmentLifecycleService {
    fn default() -> Self {
        Self::new()
    }
}

impl AppointmentLifecycleService {
    pub fn new() -> Self {
        Self
    }

    /// Validate that a status transition is allowed
    pub fn validate_status_transition(
        &self,
        current_status: AppointmentStatus,
        new_status: AppointmentStatus,
    ) -> Result<(), AppointmentError> {
        debug!("Validating status transition from {} to {}", current_status, new_status);

        if !self.get_valid_transitions(current_status).contains(&new_status) {
            warn!("Invalid status transition attempted: {} -> {}", current_status, new_status);
            return Err(AppointmentError::InvalidState(format!(
                "Cannot change a {} appointment to {}",
                current_status, new_status
            )));
        }

        Ok(())
    }

    pub fn get_valid_transitions(&self, current_status: AppointmentStatus) -> Vec<AppointmentStatus> {
        match current_status {
            AppointmentStatus::Booked => vec![AppointmentStatus::Cancelled, AppointmentStatus::Completed],
            AppointmentStatus::Cancelled | AppointmentStatus::Completed => vec![],
        }
    }

    /// Rescheduling keeps the status but is only allowed while the appointment is active.
    pub fn validate_reschedule(&self, current_status: AppointmentStatus) -> Result<(), AppointmentError> {
        if current_status.is_active() {
            Ok(())
        } else {
            warn!("Reschedule attempted on {} appointment", current_status);
            Err(AppointmentError::InvalidState(format!(
                "Cannot reschedule a {} appointment",
                current_status
            )))
        }
    }
}
