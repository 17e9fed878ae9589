use std::{sync::Arc, time::Duration};

use anyhow::Result;
use tracing::{error, info, warn};

use crate::{
    domain::{
        entities::jobs::JobEntity, repositories::jobs::JobRepository,
        value_objects::jobs::RoomTeardownPayload,
    },
    usecases::video_sessions::VideoGateway,
};

const MAX_ATTEMPTS: i32 = 5;
const POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Polls the jobs table for due room teardowns and deletes the rooms at the
/// provider. Jobs survive restarts; a failed delete is retried with backoff
/// until `MAX_ATTEMPTS`, then parked as dead.
pub async fn run(
    job_repo: Arc<dyn JobRepository + Send + Sync>,
    video_gateway: Arc<dyn VideoGateway + Send + Sync>,
) -> Result<()> {
    info!("room_teardown: starting worker loop");
    loop {
        match job_repo.lock_next_room_teardown_job().await {
            Ok(Some(job)) => {
                info!(job_id = %job.id, "room_teardown: processing job");
                if let Err(e) = process_room_teardown_job(&video_gateway, &job).await {
                    error!(
                        job_id = %job.id,
                        error = %e,
                        "room_teardown: failed to process job"
                    );
                    if let Err(mark_err) = job_repo
                        .mark_job_failed(job.id, &e.to_string(), MAX_ATTEMPTS)
                        .await
                    {
                        error!(
                            job_id = %job.id,
                            error = %mark_err,
                            "room_teardown: failed to mark job as failed"
                        );
                    }
                } else if let Err(mark_err) = job_repo.mark_job_done(job.id).await {
                    error!(
                        job_id = %job.id,
                        error = %mark_err,
                        "room_teardown: failed to mark job done"
                    );
                } else {
                    info!(job_id = %job.id, "room_teardown: job processed successfully");
                }
            }
            Ok(None) => {
                tokio::time::sleep(POLL_INTERVAL).await;
            }
            Err(e) => {
                error!(
                    error = %e,
                    "room_teardown: error locking next job"
                );
                tokio::time::sleep(POLL_INTERVAL).await;
            }
        }
    }
}

async fn process_room_teardown_job(
    video_gateway: &Arc<dyn VideoGateway + Send + Sync>,
    job: &JobEntity,
) -> Result<()> {
    let payload: RoomTeardownPayload = serde_json::from_value(job.payload.clone())?;

    match video_gateway.delete_room(&payload.room_name).await {
        Ok(()) => {
            info!(
                job_id = %job.id,
                appointment_id = %payload.appointment_id,
                room_name = %payload.room_name,
                "room_teardown: room deleted"
            );
            Ok(())
        }
        // A room the provider no longer knows is already torn down.
        Err(err) if is_room_missing(&err) => {
            warn!(
                job_id = %job.id,
                room_name = %payload.room_name,
                "room_teardown: room already gone at provider"
            );
            Ok(())
        }
        Err(err) => {
            error!(
                job_id = %job.id,
                room_name = %payload.room_name,
                error = %err,
                "room_teardown: provider delete failed"
            );
            Err(err)
        }
    }
}

fn is_room_missing(err: &anyhow::Error) -> bool {
    let message = err.to_string();
    message.contains("404") || message.to_lowercase().contains("not found")
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    #[test]
    fn provider_404_counts_as_missing_room() {
        assert!(is_room_missing(&anyhow!(
            "video api error: 404 Not Found: room does not exist"
        )));
        assert!(is_room_missing(&anyhow!("room Not Found at provider")));
        assert!(!is_room_missing(&anyhow!(
            "video api error: 500 Internal Server Error"
        )));
    }
}
