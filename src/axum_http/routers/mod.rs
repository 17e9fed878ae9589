pub mod admin;
pub mod appointments;
pub mod availability;
pub mod payments;
pub mod video_sessions;
