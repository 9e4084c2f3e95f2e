// libs/appointment-cell/src/models.rs
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

use shared_database::StoreError;

/// Record-store key the appointment list lives under.
pub const APPOINTMENTS_KEY: &str = "appointments";

/// Appointment dates are authored as day-month-year, e.g. `7-3-2025`.
pub const DATE_FORMAT: &str = "%d-%m-%Y";

const TIME_FORMATS: [&str; 5] = ["%H:%M", "%H:%M:%S", "%I:%M%p", "%I:%M %p", "%I%p"];

// ==============================================================================
// CORE APPOINTMENT MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Appointment {
    pub id: String,
    pub patient_name: String,
    pub doctor_name: String,
    pub item_name: String,
    /// Price resolved when the appointment was booked. Never recomputed.
    pub price: f64,
    pub date: String,
    pub time: String,
    pub status: AppointmentStatus,
}

impl Appointment {
    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }

    pub fn parsed_date(&self) -> Option<NaiveDate> {
        parse_appointment_date(&self.date)
    }

    pub fn parsed_time(&self) -> Option<NaiveTime> {
        parse_appointment_time(&self.time)
    }

    /// Whether this record holds `date`/`time` for the named doctor.
    pub fn occupies(&self, doctor_name: &str, date: NaiveDate, time: &str) -> bool {
        self.doctor_name.eq_ignore_ascii_case(doctor_name)
            && self.parsed_date() == Some(date)
            && self.time.trim() == time.trim()
    }

    pub fn has_id(&self, id: &str) -> bool {
        self.id.eq_ignore_ascii_case(id.trim())
    }

    /// Chronological ordering; unparsable dates or times sort after parsable
    /// ones and then by their raw text.
    pub fn chronological_cmp(&self, other: &Self) -> Ordering {
        sort_key(self).cmp(&sort_key(other))
    }
}

type SortKey<'a> = (bool, Option<NaiveDate>, bool, Option<NaiveTime>, &'a str, &'a str);

fn sort_key(appointment: &Appointment) -> SortKey<'_> {
    let date = appointment.parsed_date();
    let time = appointment.parsed_time();
    (
        date.is_none(),
        date,
        time.is_none(),
        time,
        appointment.date.as_str(),
        appointment.time.as_str(),
    )
}

/// `%Y` alone would read `2-6-25` as the year 25, so the year must be
/// written out with four digits.
pub fn parse_appointment_date(date: &str) -> Option<NaiveDate> {
    let date = date.trim();
    let (_, year) = date.rsplit_once('-')?;
    if year.len() != 4 || !year.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    NaiveDate::parse_from_str(date, DATE_FORMAT).ok()
}

/// Canonical text for a date: no zero padding, e.g. `2-6-2025`.
pub fn format_appointment_date(date: NaiveDate) -> String {
    date.format("%-d-%-m-%Y").to_string()
}

pub fn parse_appointment_time(time: &str) -> Option<NaiveTime> {
    let time = time.trim();
    TIME_FORMATS
        .iter()
        .find_map(|format| NaiveTime::parse_from_str(time, format).ok())
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Booked,
    Cancelled,
    Completed,
}

impl AppointmentStatus {
    /// Active appointments occupy their slot.
    pub fn is_active(&self) -> bool {
        matches!(self, AppointmentStatus::Booked)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, AppointmentStatus::Cancelled | AppointmentStatus::Completed)
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentStatus::Booked => write!(f, "booked"),
            AppointmentStatus::Cancelled => write!(f, "cancelled"),
            AppointmentStatus::Completed => write!(f, "completed"),
        }
    }
}

// ==============================================================================
// BOOKABLE ITEM MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Service {
    pub id: String,
    pub name: String,
    pub category: String,
    pub price: f64,
}

fn services_total(services: &[Service]) -> f64 {
    services.iter().map(|s| s.price).sum()
}

pub(crate) fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

/// Curated bundle with a fixed discount applied once, at construction.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SpecialPackage {
    name: String,
    services: Vec<Service>,
    price: f64,
}

impl SpecialPackage {
    pub const DISCOUNT_RATE: f64 = 0.15;

    pub fn new(name: impl Into<String>, services: Vec<Service>) -> Result<Self, AppointmentError> {
        let name = name.into().trim().to_string();
        if name.is_empty() {
            return Err(AppointmentError::Validation("Package name is required".to_string()));
        }

        let price = round_cents(services_total(&services) * (1.0 - Self::DISCOUNT_RATE));
        Ok(Self { name, services, price })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn services(&self) -> &[Service] {
        &self.services
    }

    /// Sum of the included services before the package discount.
    pub fn raw_price(&self) -> f64 {
        services_total(&self.services)
    }

    pub fn price(&self) -> f64 {
        self.price
    }
}

/// Patient-assembled bundle. Its nominal price is the plain sum of its
/// services; any discount comes from the doctor it is booked with.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CustomPackage {
    name: String,
    services: Vec<Service>,
}

impl CustomPackage {
    pub fn new(name: impl Into<String>, services: Vec<Service>) -> Result<Self, AppointmentError> {
        let name = name.into().trim().to_string();
        if name.is_empty() {
            return Err(AppointmentError::Validation("Package name is required".to_string()));
        }
        if services.is_empty() {
            return Err(AppointmentError::Validation(
                "A custom package must include at least one service".to_string(),
            ));
        }

        Ok(Self { name, services })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn services(&self) -> &[Service] {
        &self.services
    }

    pub fn raw_price(&self) -> f64 {
        services_total(&self.services)
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BookableItem {
    Service(Service),
    SpecialPackage(SpecialPackage),
    CustomPackage(CustomPackage),
}

impl BookableItem {
    pub fn name(&self) -> &str {
        match self {
            BookableItem::Service(service) => &service.name,
            BookableItem::SpecialPackage(package) => package.name(),
            BookableItem::CustomPackage(package) => package.name(),
        }
    }

    /// Price outside any booking: no doctor discount.
    pub fn nominal_price(&self) -> f64 {
        match self {
            BookableItem::Service(service) => service.price,
            BookableItem::SpecialPackage(package) => package.price(),
            BookableItem::CustomPackage(package) => package.raw_price(),
        }
    }
}

impl From<Service> for BookableItem {
    fn from(service: Service) -> Self {
        BookableItem::Service(service)
    }
}

impl From<SpecialPackage> for BookableItem {
    fn from(package: SpecialPackage) -> Self {
        BookableItem::SpecialPackage(package)
    }
}

impl From<CustomPackage> for BookableItem {
    fn from(package: CustomPackage) -> Self {
        BookableItem::CustomPackage(package)
    }
}

// ==============================================================================
// REQUEST/RESPONSE MODELS
// ==============================================================================

/// Wire form of a bookable item. Packages are rebuilt through their
/// constructors, so prices are always computed here rather than trusted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BookableItemRequest {
    Service(Service),
    SpecialPackage { name: String, services: Vec<Service> },
    CustomPackage { name: String, services: Vec<Service> },
}

impl TryFrom<BookableItemRequest> for BookableItem {
    type Error = AppointmentError;

    fn try_from(request: BookableItemRequest) -> Result<Self, Self::Error> {
        match request {
            BookableItemRequest::Service(service) => Ok(BookableItem::Service(service)),
            BookableItemRequest::SpecialPackage { name, services } => {
                Ok(SpecialPackage::new(name, services)?.into())
            }
            BookableItemRequest::CustomPackage { name, services } => {
                Ok(CustomPackage::new(name, services)?.into())
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookAppointmentRequest {
    pub patient_name: String,
    pub doctor_name: String,
    pub item: BookableItemRequest,
    pub date: String,
    pub time: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RescheduleAppointmentRequest {
    pub new_date: String,
    pub new_time: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteRequest {
    pub item: BookableItemRequest,
}

/// Result of a slot check. `reason` explains a refusal.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AvailabilityCheck {
    pub available: bool,
    pub reason: Option<String>,
}

impl AvailabilityCheck {
    pub fn available() -> Self {
        Self { available: true, reason: None }
    }

    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self { available: false, reason: Some(reason.into()) }
    }
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    NotFound,
    Conflict,
    State,
    Persistence,
}

#[derive(Debug, Clone, Serialize, Deserialize, thiserror::Error)]
pub enum AppointmentError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Persistence error: {0}")]
    Persistence(String),
}

impl AppointmentError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppointmentError::Validation(_) => ErrorKind::Validation,
            AppointmentError::NotFound(_) => ErrorKind::NotFound,
            AppointmentError::Conflict(_) => ErrorKind::Conflict,
            AppointmentError::InvalidState(_) => ErrorKind::State,
            AppointmentError::Persistence(_) => ErrorKind::Persistence,
        }
    }
}

impl From<StoreError> for AppointmentError {
    fn from(e: StoreError) -> Self {
        AppointmentError::Persistence(e.to_string())
    }
}
