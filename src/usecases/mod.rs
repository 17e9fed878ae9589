pub mod appointments;
pub mod authorization;
pub mod availability;
pub mod payments;
pub mod video_sessions;
