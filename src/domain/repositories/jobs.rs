use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockall::automock;
use uuid::Uuid;

use crate::domain::entities::jobs::JobEntity;

#[async_trait]
#[automock]
pub trait JobRepository {
    async fn enqueue_room_teardown(
        &self,
        appointment_id: Uuid,
        room_name: String,
        run_at: DateTime<Utc>,
    ) -> Result<Uuid>;

    async fn lock_next_room_teardown_job(&self) -> Result<Option<JobEntity>>;

    async fn mark_job_done(&self, job_id: Uuid) -> Result<()>;

    async fn mark_job_failed(&self, job_id: Uuid, err: &str, max_attempts: i32) -> Result<()>;
}
