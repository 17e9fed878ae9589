pub mod appointments;
pub mod jobs;
