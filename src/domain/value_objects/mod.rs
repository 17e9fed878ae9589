pub mod appointments;
pub mod availability;
pub mod enums;
pub mod jobs;
