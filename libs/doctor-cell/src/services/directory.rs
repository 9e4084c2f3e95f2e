use std::sync::{Arc, RwLock, RwLockReadGuard};

use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use shared_database::{load_records, save_records, RecordStore};
use shared_utils::IdentifierAllocator;

use crate::models::{DirectoryError, Doctor, RegisterDoctorRequest, DOCTORS_KEY};

/// Read-only view of the doctors the booking core may schedule against.
pub trait DoctorDirectory: Send + Sync {
    /// Case-insensitive lookup by display name.
    fn get_by_name(&self, name: &str) -> Option<Doctor>;

    fn list_names(&self) -> Vec<String>;
}

/// Store-backed doctor roster.
pub struct DoctorRegistry {
    store: Arc<dyn RecordStore>,
    doctors: RwLock<Vec<Doctor>>,
    ids: IdentifierAllocator,
    write_gate: Mutex<()>,
}

impl DoctorRegistry {
    pub fn new(store: Arc<dyn RecordStore>, doctors: Vec<Doctor>) -> Self {
        let ids = IdentifierAllocator::seeded("D", doctors.iter().map(|d| d.id.as_str()))
            .with_width(3);

        Self {
            store,
            doctors: RwLock::new(doctors),
            ids,
            write_gate: Mutex::new(()),
        }
    }

    pub async fn load(store: Arc<dyn RecordStore>) -> Result<Self, DirectoryError> {
        let doctors: Vec<Doctor> = load_records(store.as_ref(), DOCTORS_KEY).await?;
        info!("Loaded {} doctors", doctors.len());
        Ok(Self::new(store, doctors))
    }

    /// Load the roster, writing `seed` to the store first if it is empty.
    pub async fn load_or_seed(
        store: Arc<dyn RecordStore>,
        seed: Vec<Doctor>,
    ) -> Result<Self, DirectoryError> {
        let doctors: Vec<Doctor> = load_records(store.as_ref(), DOCTORS_KEY).await?;
        if !doctors.is_empty() {
            info!("Loaded {} doctors", doctors.len());
            return Ok(Self::new(store, doctors));
        }

        info!("Doctor roster empty, seeding {} doctors", seed.len());
        save_records(store.as_ref(), DOCTORS_KEY, &seed).await?;
        Ok(Self::new(store, seed))
    }

    pub async fn register(&self, request: RegisterDoctorRequest) -> Result<Doctor, DirectoryError> {
        let name = request.name.trim();
        if name.is_empty() {
            return Err(DirectoryError::Validation("Doctor name is required".to_string()));
        }
        if request.working_days.trim().is_empty() {
            return Err(DirectoryError::Validation("Working days are required".to_string()));
        }
        if !request.discount_rate.is_finite() || !(0.0..=1.0).contains(&request.discount_rate) {
            return Err(DirectoryError::Validation(format!(
                "Discount rate must be between 0 and 1, got {}",
                request.discount_rate
            )));
        }

        let _gate = self.write_gate.lock().await;

        if self.get_by_name(name).is_some() {
            warn!("Rejected duplicate doctor registration for {}", name);
            return Err(DirectoryError::Duplicate(name.to_string()));
        }

        let Some(id) = self.ids.next_id() else {
            error!("Doctor identifiers are exhausted");
            return Err(DirectoryError::Validation("No doctor identifiers left to allocate".to_string()));
        };

        let doctor = Doctor {
            id,
            name: name.to_string(),
            specialization: request.specialization.trim().to_string(),
            contact: request.contact.clone(),
            working_days: request.working_days.trim().to_string(),
            working_hours: request.working_hours(),
            discount_rate: request.discount_rate,
            age: request.age,
            gender: request.gender.clone(),
        };

        let mut roster = self.snapshot();
        roster.push(doctor.clone());

        if let Err(e) = save_records(self.store.as_ref(), DOCTORS_KEY, &roster).await {
            error!("Failed to persist doctor {}: {}", doctor.id, e);
            return Err(e.into());
        }

        match self.doctors.write() {
            Ok(mut doctors) => *doctors = roster,
            Err(poisoned) => *poisoned.into_inner() = roster,
        }

        info!("Registered doctor {} ({})", doctor.name, doctor.id);
        Ok(doctor)
    }

    pub fn all(&self) -> Vec<Doctor> {
        self.snapshot()
    }

    fn read(&self) -> RwLockReadGuard<'_, Vec<Doctor>> {
        match self.doctors.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn snapshot(&self) -> Vec<Doctor> {
        self.read().clone()
    }
}

impl DoctorDirectory for DoctorRegistry {
    fn get_by_name(&self, name: &str) -> Option<Doctor> {
        let found = self.read().iter().find(|d| d.has_name(name)).cloned();
        debug!("Doctor lookup '{}': {}", name, if found.is_some() { "found" } else { "missing" });
        found
    }

    fn list_names(&self) -> Vec<String> {
        self.read().iter().map(|d| d.name.clone()).collect()
    }
}

/// Demo roster used to seed an empty store.
pub fn default_roster() -> Vec<Doctor> {
    vec![
        Doctor {
            id: "D001".to_string(),
            name: "Rehan Khan".to_string(),
            specialization: "Dermatology (Skin/Hair)".to_string(),
            contact: Some("0301-1234567".to_string()),
            working_days: "Monday, Tuesday".to_string(),
            working_hours: "9:00am to 1:00pm".to_string(),
            discount_rate: 0.0,
            age: None,
            gender: None,
        },
        Doctor {
            id: "D002".to_string(),
            name: "Sarah Ahmed".to_string(),
            specialization: "Laser & PRP Specialist".to_string(),
            contact: Some("0302-7654321".to_string()),
            working_days: "Wednesday to Friday".to_string(),
            working_hours: "2:00pm to 5:00pm".to_string(),
            discount_rate: 0.0,
            age: None,
            gender: None,
        },
        Doctor {
            id: "D003".to_string(),
            name: "Ayesha Malik".to_string(),
            specialization: "Aesthetic Surgery Consult".to_string(),
            contact: Some("0303-9876543".to_string()),
            working_days: "Saturday, Sunday".to_string(),
            working_hours: "4:00pm to 8:00pm".to_string(),
            discount_rate: 0.0,
            age: None,
            gender: None,
        },
    ]
}
