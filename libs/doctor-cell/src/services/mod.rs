pub mod directory;
pub mod schedule;

pub use directory::{default_roster, DoctorDirectory, DoctorRegistry};
pub use schedule::{ScheduleMatch, WorkingScheduleParser};
