use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const ROOM_TEARDOWN_JOB_TYPE: &str = "RoomTeardown";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomTeardownPayload {
    pub appointment_id: Uuid,
    pub room_name: String,
}
