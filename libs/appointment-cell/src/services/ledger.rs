use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, error, info, instrument, warn};

use doctor_cell::DoctorDirectory;
use shared_database::{load_records, save_records, RecordStore};
use shared_utils::IdentifierAllocator;

use crate::models::{
    format_appointment_date, parse_appointment_date, Appointment, AppointmentError,
    AppointmentStatus, AvailabilityCheck, BookableItem, APPOINTMENTS_KEY,
};
use crate::services::availability::AvailabilityChecker;
use crate::services::consistency::SchedulingLocks;
use crate::services::lifecycle::AppointmentLifecycleService;
use crate::services::pricing::{PriceQuote, PricingResolver};

/// Owns the appointment collection and every change made to it.
///
/// Mutations take the target doctor's scheduling lock first and the record
/// lock second. A change is written to the store before it becomes visible,
/// so a failed write leaves the ledger exactly as it was.
pub struct AppointmentLedger {
    store: Arc<dyn RecordStore>,
    directory: Arc<dyn DoctorDirectory>,
    appointments: RwLock<Vec<Appointment>>,
    ids: IdentifierAllocator,
    locks: SchedulingLocks,
    availability: AvailabilityChecker,
    pricing: PricingResolver,
    lifecycle: AppointmentLifecycleService,
}

impl AppointmentLedger {
    pub fn new(
        store: Arc<dyn RecordStore>,
        directory: Arc<dyn DoctorDirectory>,
        id_prefix: &str,
        appointments: Vec<Appointment>,
    ) -> Self {
        let ids = IdentifierAllocator::seeded(id_prefix, appointments.iter().map(|a| a.id.as_str()));
        debug!("Appointment ids will continue from {}{}", ids.prefix(), ids.peek());

        Self {
            store,
            directory,
            appointments: RwLock::new(appointments),
            ids,
            locks: SchedulingLocks::new(),
            availability: AvailabilityChecker::new(),
            pricing: PricingResolver::new(),
            lifecycle: AppointmentLifecycleService::new(),
        }
    }

    pub async fn open(
        store: Arc<dyn RecordStore>,
        directory: Arc<dyn DoctorDirectory>,
        id_prefix: &str,
    ) -> Result<Self, AppointmentError> {
        let appointments: Vec<Appointment> = load_records(store.as_ref(), APPOINTMENTS_KEY)
            .await
            .map_err(|e| {
                error!("Failed to load appointments: {}", e);
                AppointmentError::from(e)
            })?;
        info!("Loaded {} appointments", appointments.len());

        Ok(Self::new(store, directory, id_prefix, appointments))
    }

    #[instrument(skip(self, item), fields(item = item.name()))]
    pub async fn book(
        &self,
        patient_name: &str,
        doctor_name: &str,
        item: &BookableItem,
        date: &str,
        time: &str,
    ) -> Result<Appointment, AppointmentError> {
        let patient_name = required("Patient name", patient_name)?;
        let doctor_name = required("Doctor name", doctor_name)?;
        required("Item name", item.name())?;
        let date = required("Date", date)?;
        let time = required("Time", time)?;

        let doctor = self.directory.get_by_name(doctor_name).ok_or_else(|| {
            warn!("Booking refused, unknown doctor '{}'", doctor_name);
            AppointmentError::NotFound(format!("Doctor '{}' not found", doctor_name))
        })?;

        let _slot = self.locks.acquire(&doctor.name).await;
        let mut appointments = self.appointments.write().await;

        let check = self.availability.check(&doctor, date, time, &appointments, None);
        if !check.available {
            return Err(AppointmentError::Conflict(refusal(check)));
        }

        let Some(parsed_date) = parse_appointment_date(date) else {
            return Err(AppointmentError::Validation(format!("Invalid date '{}'", date)));
        };

        let Some(id) = self.ids.next_id() else {
            error!("Appointment identifiers for prefix '{}' are exhausted", self.ids.prefix());
            return Err(AppointmentError::InvalidState(
                "No appointment identifiers left to allocate".to_string(),
            ));
        };

        let appointment = Appointment {
            id,
            patient_name: patient_name.to_string(),
            doctor_name: doctor.name.clone(),
            item_name: item.name().to_string(),
            price: self.pricing.resolve_price(item, Some(&doctor)),
            date: format_appointment_date(parsed_date),
            time: time.to_string(),
            status: AppointmentStatus::Booked,
        };

        let mut next = appointments.clone();
        next.push(appointment.clone());
        self.persist(&next).await?;
        *appointments = next;

        info!(
            "Booked {} for {} with Dr. {} on {} at {} ({:.2})",
            appointment.id,
            appointment.patient_name,
            appointment.doctor_name,
            appointment.date,
            appointment.time,
            appointment.price
        );
        Ok(appointment)
    }

    #[instrument(skip(self))]
    pub async fn reschedule(
        &self,
        id: &str,
        new_date: &str,
        new_time: &str,
    ) -> Result<Appointment, AppointmentError> {
        let id = required("Appointment id", id)?;
        let new_date = required("Date", new_date)?;
        let new_time = required("Time", new_time)?;

        let current = self.find(id).await?;
        let doctor = self.directory.get_by_name(&current.doctor_name).ok_or_else(|| {
            AppointmentError::NotFound(format!("Doctor '{}' not found", current.doctor_name))
        })?;

        let _slot = self.locks.acquire(&doctor.name).await;
        let mut appointments = self.appointments.write().await;

        let index = position(&appointments, id)?;
        self.lifecycle.validate_reschedule(appointments[index].status)?;

        let check = self.availability.check(
            &doctor,
            new_date,
            new_time,
            &appointments,
            Some(&appointments[index].id),
        );
        if !check.available {
            return Err(AppointmentError::Conflict(refusal(check)));
        }

        let Some(parsed_date) = parse_appointment_date(new_date) else {
            return Err(AppointmentError::Validation(format!("Invalid date '{}'", new_date)));
        };

        let mut next = appointments.clone();
        next[index].date = format_appointment_date(parsed_date);
        next[index].time = new_time.to_string();
        let updated = next[index].clone();

        self.persist(&next).await?;
        *appointments = next;

        info!("Rescheduled {} to {} at {}", updated.id, updated.date, updated.time);
        Ok(updated)
    }

    pub async fn cancel(&self, id: &str) -> Result<Appointment, AppointmentError> {
        self.transition(id, AppointmentStatus::Cancelled).await
    }

    pub async fn complete(&self, id: &str) -> Result<Appointment, AppointmentError> {
        self.transition(id, AppointmentStatus::Completed).await
    }

    #[instrument(skip(self))]
    async fn transition(
        &self,
        id: &str,
        new_status: AppointmentStatus,
    ) -> Result<Appointment, AppointmentError> {
        let id = required("Appointment id", id)?;
        let current = self.find(id).await?;

        let _slot = self.locks.acquire(&current.doctor_name).await;
        let mut appointments = self.appointments.write().await;

        let index = position(&appointments, id)?;
        self.lifecycle
            .validate_status_transition(appointments[index].status, new_status)?;

        let mut next = appointments.clone();
        next[index].status = new_status;
        let updated = next[index].clone();

        self.persist(&next).await?;
        *appointments = next;

        info!("Appointment {} is now {}", updated.id, updated.status);
        Ok(updated)
    }

    /// Slot check without booking. Unknown doctors and bad input are reported
    /// as unavailable, never as errors.
    pub async fn check_availability(&self, doctor_name: &str, date: &str, time: &str) -> AvailabilityCheck {
        let Some(doctor) = self.directory.get_by_name(doctor_name) else {
            return AvailabilityCheck::unavailable(format!("Doctor '{}' not found", doctor_name.trim()));
        };

        let appointments = self.appointments.read().await;
        self.availability.check(&doctor, date, time, &appointments, None)
    }

    /// Prices an item outside any booking, so no doctor discount applies.
    pub fn quote(&self, item: &BookableItem) -> PriceQuote {
        self.pricing.quote(item, None)
    }

    /// Records for a patient, Booked only unless `include_all`.
    pub async fn list_by_patient(&self, patient_name: &str, include_all: bool) -> Vec<Appointment> {
        let patient_name = patient_name.trim();
        self.select(|a| {
            a.patient_name.eq_ignore_ascii_case(patient_name)
                && (include_all || a.status == AppointmentStatus::Booked)
        })
        .await
    }

    /// Records for a doctor, Booked and Completed unless `include_all`.
    pub async fn list_by_doctor(&self, doctor_name: &str, include_all: bool) -> Vec<Appointment> {
        let doctor_name = doctor_name.trim();
        self.select(|a| {
            a.doctor_name.eq_ignore_ascii_case(doctor_name)
                && (include_all || a.status != AppointmentStatus::Cancelled)
        })
        .await
    }

    pub async fn get(&self, id: &str) -> Result<Appointment, AppointmentError> {
        let id = required("Appointment id", id)?;
        self.find(id).await
    }

    pub async fn list_all(&self) -> Vec<Appointment> {
        self.select(|_| true).await
    }

    async fn find(&self, id: &str) -> Result<Appointment, AppointmentError> {
        let appointments = self.appointments.read().await;
        let index = position(&appointments, id)?;
        Ok(appointments[index].clone())
    }

    async fn select<F>(&self, filter: F) -> Vec<Appointment>
    where
        F: Fn(&Appointment) -> bool,
    {
        let mut selected: Vec<Appointment> = self
            .appointments
            .read()
            .await
            .iter()
            .filter(|&a| filter(a))
            .cloned()
            .collect();
        selected.sort_by(|a, b| a.chronological_cmp(b));
        selected
    }

    async fn persist(&self, appointments: &[Appointment]) -> Result<(), AppointmentError> {
        save_records(self.store.as_ref(), APPOINTMENTS_KEY, appointments)
            .await
            .map_err(|e| {
                error!("Failed to persist appointments: {}", e);
                AppointmentError::from(e)
            })
    }
}

fn required<'a>(field: &str, value: &'a str) -> Result<&'a str, AppointmentError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppointmentError::Validation(format!("{} is required", field)));
    }
    Ok(trimmed)
}

fn position(appointments: &[Appointment], id: &str) -> Result<usize, AppointmentError> {
    appointments
        .iter()
        .position(|a| a.has_id(id))
        .ok_or_else(|| AppointmentError::NotFound(format!("Appointment '{}' not found", id)))
}

fn refusal(check: AvailabilityCheck) -> String {
    check
        .reason
        .unwrap_or_else(|| "Requested slot is not available".to_string())
}
