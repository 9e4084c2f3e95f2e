use chrono::Datelike;
use tracing::{debug, warn};

use doctor_cell::services::schedule::day_name;
use doctor_cell::{Doctor, ScheduleMatch, WorkingScheduleParser};

use crate::models::{parse_appointment_date, Appointment, AvailabilityCheck};

/// Decides whether a doctor can take a new appointment at a date and time.
///
/// Never fails: anything that cannot be parsed yields "unavailable".
pub struct AvailabilityChecker {
    parser: WorkingScheduleParser,
}

impl Default for AvailabilityChecker {
    fn default() -> Self {
        Self::new()
    }
}

impl AvailabilityChecker {
    pub fn new() -> Self {
        Self {
            parser: WorkingScheduleParser::new(),
        }
    }

    /// `exclude_id` leaves one appointment out of the conflict scan, so an
    /// appointment being moved does not collide with itself.
    pub fn check(
        &self,
        doctor: &Doctor,
        date: &str,
        time: &str,
        appointments: &[Appointment],
        exclude_id: Option<&str>,
    ) -> AvailabilityCheck {
        debug!("Checking availability for Dr. {} on {} at {}", doctor.name, date, time);

        let Some(parsed_date) = parse_appointment_date(date) else {
            warn!("Unparsable appointment date '{}'", date);
            return AvailabilityCheck::unavailable(format!(
                "Date '{}' is not a valid day-month-year date",
                date.trim()
            ));
        };

        if time.trim().is_empty() {
            return AvailabilityCheck::unavailable("Time is required");
        }

        let weekday = parsed_date.weekday();
        match self.parser.evaluate(&doctor.working_days, weekday) {
            ScheduleMatch::Literal | ScheduleMatch::Range | ScheduleMatch::Token => {}
            ScheduleMatch::NotListed => {
                return AvailabilityCheck::unavailable(format!(
                    "Dr. {} does not work on {} (working days: {})",
                    doctor.name,
                    day_name(weekday),
                    doctor.working_days
                ));
            }
            ScheduleMatch::Unparsable(reason) => {
                return AvailabilityCheck::unavailable(format!(
                    "Working days for Dr. {} could not be read: {}",
                    doctor.name, reason
                ));
            }
        }

        let taken = appointments
            .iter()
            .filter(|a| a.is_active())
            .filter(|a| exclude_id.map_or(true, |id| !a.has_id(id)))
            .any(|a| a.occupies(&doctor.name, parsed_date, time));

        if taken {
            warn!("Slot conflict for Dr. {} on {} at {}", doctor.name, date, time);
            return AvailabilityCheck::unavailable(format!(
                "Dr. {} is already booked on {} at {}",
                doctor.name,
                date.trim(),
                time.trim()
            ));
        }

        AvailabilityCheck::available()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AppointmentStatus;

    // 2-6-2025 is a Monday, 4-6-2025 a Wednesday
    const MONDAY: &str = "2-6-2025";
    const WEDNESDAY: &str = "4-6-2025";

    fn doctor(working_days: &str) -> Doctor {
        Doctor {
            id: "D002".to_string(),
            name: "Sarah Ahmed".to_string(),
            specialization: "Laser & PRP Specialist".to_string(),
            contact: None,
            working_days: working_days.to_string(),
            working_hours: "2:00pm to 5:00pm".to_string(),
            discount_rate: 0.0,
            age: None,
            gender: None,
        }
    }

    fn booked(id: &str, doctor_name: &str, date: &str, time: &str, status: AppointmentStatus) -> Appointment {
        Appointment {
            id: id.to_string(),
            patient_name: "Hina".to_string(),
            doctor_name: doctor_name.to_string(),
            item_name: "Face Laser".to_string(),
            price: 5000.0,
            date: date.to_string(),
            time: time.to_string(),
            status,
        }
    }

    #[test]
    fn test_free_slot_on_working_day() {
        let checker = AvailabilityChecker::new();
        let result = checker.check(&doctor("Wednesday to Friday"), WEDNESDAY, "14:00", &[], None);
        assert_eq!(result, AvailabilityCheck::available());
    }

    #[test]
    fn test_day_off_is_unavailable() {
        let checker = AvailabilityChecker::new();
        let result = checker.check(&doctor("Wednesday to Friday"), MONDAY, "14:00", &[], None);
        assert!(!result.available);
        assert!(result.reason.unwrap().contains("Monday"));
    }

    #[test]
    fn test_bad_date_fails_closed() {
        let checker = AvailabilityChecker::new();
        for date in ["2025-06-04", "", "32-1-2025", "Wednesday"] {
            assert!(!checker.check(&doctor("Monday to Sunday"), date, "14:00", &[], None).available);
        }
    }

    #[test]
    fn test_unreadable_schedule_fails_closed() {
        let checker = AvailabilityChecker::new();
        assert!(!checker.check(&doctor(""), WEDNESDAY, "14:00", &[], None).available);
        assert!(!checker.check(&doctor("wed to fri"), WEDNESDAY, "14:00", &[], None).available);
    }

    #[test]
    fn test_active_appointment_blocks_slot_case_insensitively() {
        let checker = AvailabilityChecker::new();
        let existing = vec![booked("A0001", "SARAH AHMED", "04-06-2025", "14:00", AppointmentStatus::Booked)];

        let result = checker.check(&doctor("Wednesday to Friday"), WEDNESDAY, "14:00", &existing, None);
        assert!(!result.available);

        let other_time = checker.check(&doctor("Wednesday to Friday"), WEDNESDAY, "15:00", &existing, None);
        assert!(other_time.available);
    }

    #[test]
    fn test_terminal_appointments_free_the_slot() {
        let checker = AvailabilityChecker::new();
        let existing = vec![
            booked("A0001", "Sarah Ahmed", WEDNESDAY, "14:00", AppointmentStatus::Cancelled),
            booked("A0002", "Sarah Ahmed", WEDNESDAY, "14:00", AppointmentStatus::Completed),
        ];

        assert!(checker.check(&doctor("Wednesday to Friday"), WEDNESDAY, "14:00", &existing, None).available);
    }

    #[test]
    fn test_other_doctor_does_not_conflict() {
        let checker = AvailabilityChecker::new();
        let existing = vec![booked("A0001", "Rehan Khan", WEDNESDAY, "14:00", AppointmentStatus::Booked)];

        assert!(checker.check(&doctor("Wednesday to Friday"), WEDNESDAY, "14:00", &existing, None).available);
    }

    #[test]
    fn test_excluded_appointment_is_ignored() {
        let checker = AvailabilityChecker::new();
        let existing = vec![booked("A0001", "Sarah Ahmed", WEDNESDAY, "14:00", AppointmentStatus::Booked)];

        let result = checker.check(&doctor("Wednesday to Friday"), WEDNESDAY, "14:00", &existing, Some("a0001"));
        assert!(result.available);
    }
}
