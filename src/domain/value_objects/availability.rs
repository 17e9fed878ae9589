use serde::Serialize;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct AvailabilitySlot {
    pub time: String,
    pub label: String,
}

impl AvailabilitySlot {
    pub fn new(time: &str, label: &str) -> Self {
        Self {
            time: time.to_string(),
            label: label.to_string(),
        }
    }
}
