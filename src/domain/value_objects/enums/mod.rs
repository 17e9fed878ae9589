pub mod appointment_statuses;
pub mod packages;
pub mod payment_statuses;
pub mod user_roles;
