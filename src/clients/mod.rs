pub mod mail;
pub mod payment;
pub mod video;
