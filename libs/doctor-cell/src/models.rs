use serde::{Deserialize, Serialize};
use shared_database::StoreError;

/// Record-store key the doctor roster lives under.
pub const DOCTORS_KEY: &str = "doctors";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Doctor {
    pub id: String,
    pub name: String,
    pub specialization: String,
    #[serde(default)]
    pub contact: Option<String>,
    /// Free-text working days, e.g. "Monday, Tuesday" or "Wednesday to Friday".
    pub working_days: String,
    pub working_hours: String,
    /// Fraction in 0..=1 applied to custom packages booked with this doctor.
    #[serde(default)]
    pub discount_rate: f64,
    #[serde(default)]
    pub age: Option<u32>,
    #[serde(default)]
    pub gender: Option<String>,
}

impl Doctor {
    pub fn display_name(&self) -> String {
        format!("Dr. {}", self.name)
    }

    pub fn has_name(&self, name: &str) -> bool {
        self.name.trim().eq_ignore_ascii_case(name.trim())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterDoctorRequest {
    pub name: String,
    pub specialization: String,
    pub working_days: String,
    pub start_time: String,
    pub end_time: String,
    #[serde(default)]
    pub discount_rate: f64,
    pub contact: Option<String>,
    pub age: Option<u32>,
    pub gender: Option<String>,
}

impl RegisterDoctorRequest {
    pub fn working_hours(&self) -> String {
        format!("{} to {}", self.start_time.trim(), self.end_time.trim())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Doctor already registered: {0}")]
    Duplicate(String),

    #[error("Persistence error: {0}")]
    Persistence(#[from] StoreError),
}
