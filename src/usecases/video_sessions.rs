use std::sync::Arc;

use anyhow::{Result as AnyResult, anyhow};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::{
    clients::video::{ProvisionedRoom, RoomConfig, VideoRoomClient},
    domain::{
        entities::appointments::AppointmentEntity,
        repositories::{appointments::AppointmentRepository, jobs::JobRepository},
        value_objects::{
            appointments::CallStatus,
            enums::{appointment_statuses::AppointmentStatus, user_roles::UserRole},
        },
    },
    usecases::authorization::{AppointmentAction, can_act},
};

/// Rooms expire 3 hours after the scheduled start so an overrunning session
/// is not cut off mid-call.
const ROOM_EXPIRY_HOURS: i64 = 3;

/// The room stays up for an hour after the call ends before the durable
/// teardown job deletes it.
const TEARDOWN_DELAY_HOURS: i64 = 1;

#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait VideoGateway: Send + Sync {
    async fn create_room(
        &self,
        name: &str,
        expires_at: DateTime<Utc>,
        config: &RoomConfig,
    ) -> AnyResult<ProvisionedRoom>;

    async fn delete_room(&self, name: &str) -> AnyResult<()>;

    async fn issue_token(
        &self,
        room_name: &str,
        display_name: &str,
        elevated: bool,
    ) -> AnyResult<String>;
}

#[async_trait]
impl VideoGateway for VideoRoomClient {
    async fn create_room(
        &self,
        name: &str,
        expires_at: DateTime<Utc>,
        config: &RoomConfig,
    ) -> AnyResult<ProvisionedRoom> {
        self.create_room(name, expires_at, config).await
    }

    async fn delete_room(&self, name: &str) -> AnyResult<()> {
        self.delete_room(name).await
    }

    async fn issue_token(
        &self,
        room_name: &str,
        display_name: &str,
        elevated: bool,
    ) -> AnyResult<String> {
        self.issue_token(room_name, display_name, elevated).await
    }
}

#[derive(Debug, Error)]
pub enum VideoSessionError {
    #[error("appointment not found")]
    NotFound,
    #[error("no room has been created for this appointment")]
    RoomNotFound,
    #[error("not allowed to act on this appointment")]
    Forbidden,
    #[error("appointment is already closed")]
    AppointmentClosed,
    #[error("video room provisioning failed")]
    RoomProvisioningFailed(#[source] anyhow::Error),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl VideoSessionError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            VideoSessionError::NotFound | VideoSessionError::RoomNotFound => {
                StatusCode::NOT_FOUND
            }
            VideoSessionError::Forbidden => StatusCode::FORBIDDEN,
            VideoSessionError::AppointmentClosed => StatusCode::CONFLICT,
            VideoSessionError::RoomProvisioningFailed(_) => StatusCode::BAD_GATEWAY,
            VideoSessionError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type VideoSessionResult<T> = std::result::Result<T, VideoSessionError>;

#[derive(Debug, Serialize)]
pub struct RoomDto {
    pub room_name: String,
    pub room_url: String,
}

#[derive(Debug, Serialize)]
pub struct MeetingTokenDto {
    pub token: String,
    pub room_url: String,
}

pub struct VideoSessionUseCase<A, J, V>
where
    A: AppointmentRepository + Send + Sync + 'static,
    J: JobRepository + Send + Sync + 'static,
    V: VideoGateway + Send + Sync + 'static,
{
    appointment_repo: Arc<A>,
    job_repo: Arc<J>,
    video_gateway: Arc<V>,
}

impl<A, J, V> VideoSessionUseCase<A, J, V>
where
    A: AppointmentRepository + Send + Sync + 'static,
    J: JobRepository + Send + Sync + 'static,
    V: VideoGateway + Send + Sync + 'static,
{
    pub fn new(appointment_repo: Arc<A>, job_repo: Arc<J>, video_gateway: Arc<V>) -> Self {
        Self {
            appointment_repo,
            job_repo,
            video_gateway,
        }
    }

    /// Provisions the consultation room. Idempotent: a second call against an
    /// appointment that already has a room returns the existing one without
    /// touching the provider.
    pub async fn create_room(
        &self,
        appointment_id: Uuid,
        acting_user_id: Uuid,
        role: UserRole,
    ) -> VideoSessionResult<RoomDto> {
        let appointment = self.load(appointment_id).await?;

        if !can_act(
            role,
            appointment.user_id,
            acting_user_id,
            AppointmentAction::CreateRoom,
        ) {
            return Err(VideoSessionError::Forbidden);
        }

        if let (Some(room_name), Some(room_url)) =
            (appointment.room_name.clone(), appointment.room_url.clone())
        {
            info!(
                %appointment_id,
                %room_name,
                "video: room already provisioned, returning existing"
            );
            return Ok(RoomDto {
                room_name,
                room_url,
            });
        }

        let scheduled_start = appointment
            .scheduled_start()
            .ok_or_else(|| anyhow!("unparsable scheduled time on {}", appointment_id))?;
        let expires_at = scheduled_start + Duration::hours(ROOM_EXPIRY_HOURS);
        let room_name = format!("consultation-{}", appointment_id);

        let room = self
            .video_gateway
            .create_room(&room_name, expires_at, &RoomConfig::default())
            .await
            .map_err(|err| {
                error!(
                    %appointment_id,
                    %room_name,
                    error = ?err,
                    "video: room provisioning failed; appointment left unchanged"
                );
                VideoSessionError::RoomProvisioningFailed(err)
            })?;

        self.appointment_repo
            .set_room(appointment_id, room.name.clone(), room.url.clone())
            .await
            .map_err(|err| {
                error!(%appointment_id, db_error = ?err, "video: failed to store room");
                VideoSessionError::Internal(err)
            })?;

        info!(%appointment_id, room_name = %room.name, "video: room provisioned");
        Ok(RoomDto {
            room_name: room.name,
            room_url: room.url,
        })
    }

    pub async fn issue_token(
        &self,
        appointment_id: Uuid,
        acting_user_id: Uuid,
        role: UserRole,
    ) -> VideoSessionResult<MeetingTokenDto> {
        let appointment = self.load(appointment_id).await?;

        let (room_name, room_url) = match (&appointment.room_name, &appointment.room_url) {
            (Some(name), Some(url)) => (name.clone(), url.clone()),
            _ => return Err(VideoSessionError::RoomNotFound),
        };

        if !can_act(
            role,
            appointment.user_id,
            acting_user_id,
            AppointmentAction::IssueToken,
        ) {
            return Err(VideoSessionError::Forbidden);
        }

        // Admins join as hosts: room ownership plus recording permission.
        let elevated = role.is_admin();
        let display_name = format!("user-{}", acting_user_id);

        let token = self
            .video_gateway
            .issue_token(&room_name, &display_name, elevated)
            .await
            .map_err(|err| {
                error!(
                    %appointment_id,
                    %room_name,
                    error = ?err,
                    "video: token issuance failed"
                );
                VideoSessionError::Internal(err)
            })?;

        info!(%appointment_id, %room_name, elevated, "video: meeting token issued");
        Ok(MeetingTokenDto { token, room_url })
    }

    pub async fn set_call_status(
        &self,
        appointment_id: Uuid,
        acting_user_id: Uuid,
        role: UserRole,
        call_status: CallStatus,
    ) -> VideoSessionResult<()> {
        let appointment = self.load(appointment_id).await?;

        if !can_act(
            role,
            appointment.user_id,
            acting_user_id,
            AppointmentAction::SetCallStatus,
        ) {
            return Err(VideoSessionError::Forbidden);
        }

        // Terminal statuses accept no further transitions; a cancelled
        // booking must not be driven back into the call flow.
        let status = AppointmentStatus::from_str(&appointment.status);
        if status.is_some_and(|status| status.is_terminal()) {
            return Err(VideoSessionError::AppointmentClosed);
        }

        match call_status {
            CallStatus::Started => {
                self.appointment_repo
                    .set_call_started(appointment_id)
                    .await
                    .map_err(VideoSessionError::Internal)?;
                info!(%appointment_id, "video: call started, appointment in progress");
            }
            CallStatus::Ended => {
                self.appointment_repo
                    .set_call_ended(appointment_id)
                    .await
                    .map_err(VideoSessionError::Internal)?;
                info!(%appointment_id, "video: call ended, appointment completed");

                self.schedule_room_teardown(&appointment).await;
            }
        }

        Ok(())
    }

    /// Durable deferred teardown: enqueue a job due an hour from now instead
    /// of holding an in-process timer, so a restart does not leak the room.
    /// Enqueue failures are logged, not surfaced; the caller's call-status
    /// update already succeeded.
    async fn schedule_room_teardown(&self, appointment: &AppointmentEntity) {
        let Some(room_name) = appointment.room_name.clone() else {
            return;
        };

        let run_at = Utc::now() + Duration::hours(TEARDOWN_DELAY_HOURS);
        match self
            .job_repo
            .enqueue_room_teardown(appointment.id, room_name.clone(), run_at)
            .await
        {
            Ok(job_id) => {
                info!(
                    appointment_id = %appointment.id,
                    %room_name,
                    %job_id,
                    %run_at,
                    "video: room teardown scheduled"
                );
            }
            Err(err) => {
                warn!(
                    appointment_id = %appointment.id,
                    %room_name,
                    error = ?err,
                    "video: failed to schedule room teardown; room may need manual cleanup"
                );
            }
        }
    }

    async fn load(&self, appointment_id: Uuid) -> VideoSessionResult<AppointmentEntity> {
        self.appointment_repo
            .find_by_id(appointment_id)
            .await
            .map_err(|err| {
                error!(%appointment_id, db_error = ?err, "video: failed to load appointment");
                VideoSessionError::Internal(err)
            })?
            .ok_or(VideoSessionError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        repositories::{appointments::MockAppointmentRepository, jobs::MockJobRepository},
        value_objects::enums::{
            appointment_statuses::AppointmentStatus, payment_statuses::PaymentStatus,
        },
    };
    use mockall::predicate::{always, eq};

    fn sample_appointment(status: AppointmentStatus, room: Option<&str>) -> AppointmentEntity {
        let now = Utc::now();
        let start = now + Duration::hours(4);
        AppointmentEntity {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            scheduled_date: start.date_naive(),
            scheduled_time: start.format("%H:%M").to_string(),
            consultation_type: "video".to_string(),
            package: "premium".to_string(),
            duration_minutes: 45,
            amount_minor: 80_000,
            status: status.to_string(),
            payment_status: PaymentStatus::Completed.to_string(),
            payment_order_id: Some("order_abc".to_string()),
            payment_id: Some("pay_123".to_string()),
            paid_at: Some(now),
            room_name: room.map(|r| r.to_string()),
            room_url: room.map(|r| format!("https://rooms.example/{}", r)),
            call_active: false,
            call_started_at: None,
            call_ended_at: None,
            rating: None,
            review: None,
            client_questions: None,
            notes: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn usecase(
        repo: MockAppointmentRepository,
        jobs: MockJobRepository,
        gateway: MockVideoGateway,
    ) -> VideoSessionUseCase<MockAppointmentRepository, MockJobRepository, MockVideoGateway> {
        VideoSessionUseCase::new(Arc::new(repo), Arc::new(jobs), Arc::new(gateway))
    }

    #[tokio::test]
    async fn create_room_provisions_and_persists() {
        let appointment = sample_appointment(AppointmentStatus::Confirmed, None);
        let owner = appointment.user_id;
        let id = appointment.id;
        let expected_name = format!("consultation-{}", id);

        let mut repo = MockAppointmentRepository::new();
        let mut gateway = MockVideoGateway::new();

        repo.expect_find_by_id().returning(move |_| {
            let appointment = appointment.clone();
            Box::pin(async move { Ok(Some(appointment)) })
        });
        let name_for_gateway = expected_name.clone();
        gateway
            .expect_create_room()
            .withf(move |name, _, config| {
                name == name_for_gateway && config.max_participants == 2 && config.enable_recording
            })
            .returning(|name, _, _| {
                let name = name.to_string();
                Box::pin(async move {
                    Ok(ProvisionedRoom {
                        url: format!("https://rooms.example/{}", name),
                        name,
                    })
                })
            });
        repo.expect_set_room()
            .with(eq(id), eq(expected_name.clone()), always())
            .returning(|_, _, _| Box::pin(async { Ok(()) }));

        let dto = usecase(repo, MockJobRepository::new(), gateway)
            .create_room(id, owner, UserRole::Client)
            .await
            .unwrap();

        assert_eq!(dto.room_name, expected_name);
    }

    #[tokio::test]
    async fn create_room_is_idempotent_for_existing_room() {
        let appointment = sample_appointment(AppointmentStatus::Confirmed, Some("consultation-x"));
        let owner = appointment.user_id;
        let id = appointment.id;

        let mut repo = MockAppointmentRepository::new();
        repo.expect_find_by_id().returning(move |_| {
            let appointment = appointment.clone();
            Box::pin(async move { Ok(Some(appointment)) })
        });

        // No gateway expectations: the provider must not be called again.
        let dto = usecase(repo, MockJobRepository::new(), MockVideoGateway::new())
            .create_room(id, owner, UserRole::Client)
            .await
            .unwrap();

        assert_eq!(dto.room_name, "consultation-x");
    }

    #[tokio::test]
    async fn provisioning_failure_leaves_appointment_unchanged() {
        let appointment = sample_appointment(AppointmentStatus::Confirmed, None);
        let owner = appointment.user_id;
        let id = appointment.id;

        let mut repo = MockAppointmentRepository::new();
        let mut gateway = MockVideoGateway::new();

        repo.expect_find_by_id().returning(move |_| {
            let appointment = appointment.clone();
            Box::pin(async move { Ok(Some(appointment)) })
        });
        gateway
            .expect_create_room()
            .returning(|_, _, _| Box::pin(async { Err(anyhow!("provider 500")) }));
        // No set_room expectation: the record must not be written.

        let err = usecase(repo, MockJobRepository::new(), gateway)
            .create_room(id, owner, UserRole::Client)
            .await
            .unwrap_err();

        assert!(matches!(err, VideoSessionError::RoomProvisioningFailed(_)));
    }

    #[tokio::test]
    async fn token_before_room_is_not_found() {
        let appointment = sample_appointment(AppointmentStatus::Confirmed, None);
        let owner = appointment.user_id;
        let id = appointment.id;

        let mut repo = MockAppointmentRepository::new();
        repo.expect_find_by_id().returning(move |_| {
            let appointment = appointment.clone();
            Box::pin(async move { Ok(Some(appointment)) })
        });

        let err = usecase(repo, MockJobRepository::new(), MockVideoGateway::new())
            .issue_token(id, owner, UserRole::Client)
            .await
            .unwrap_err();

        assert!(matches!(err, VideoSessionError::RoomNotFound));
    }

    #[tokio::test]
    async fn admin_gets_elevated_token() {
        let appointment = sample_appointment(AppointmentStatus::Confirmed, Some("consultation-x"));
        let id = appointment.id;

        let mut repo = MockAppointmentRepository::new();
        let mut gateway = MockVideoGateway::new();

        repo.expect_find_by_id().returning(move |_| {
            let appointment = appointment.clone();
            Box::pin(async move { Ok(Some(appointment)) })
        });
        gateway
            .expect_issue_token()
            .withf(|room, _, elevated| room == "consultation-x" && *elevated)
            .returning(|_, _, _| Box::pin(async { Ok("tok_admin".to_string()) }));

        let dto = usecase(repo, MockJobRepository::new(), gateway)
            .issue_token(id, Uuid::new_v4(), UserRole::Admin)
            .await
            .unwrap();

        assert_eq!(dto.token, "tok_admin");
    }

    #[tokio::test]
    async fn call_started_marks_in_progress() {
        let appointment = sample_appointment(AppointmentStatus::Confirmed, Some("consultation-x"));
        let owner = appointment.user_id;
        let id = appointment.id;

        let mut repo = MockAppointmentRepository::new();
        repo.expect_find_by_id().returning(move |_| {
            let appointment = appointment.clone();
            Box::pin(async move { Ok(Some(appointment)) })
        });
        repo.expect_set_call_started()
            .with(eq(id))
            .returning(|_| Box::pin(async { Ok(()) }));

        let result = usecase(repo, MockJobRepository::new(), MockVideoGateway::new())
            .set_call_status(id, owner, UserRole::Client, CallStatus::Started)
            .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn call_cannot_start_on_cancelled_appointment() {
        let appointment = sample_appointment(AppointmentStatus::Cancelled, Some("consultation-x"));
        let owner = appointment.user_id;
        let id = appointment.id;

        let mut repo = MockAppointmentRepository::new();
        repo.expect_find_by_id().returning(move |_| {
            let appointment = appointment.clone();
            Box::pin(async move { Ok(Some(appointment)) })
        });
        // No set_call_started expectation: the record must not be written.

        let err = usecase(repo, MockJobRepository::new(), MockVideoGateway::new())
            .set_call_status(id, owner, UserRole::Client, CallStatus::Started)
            .await
            .unwrap_err();

        assert!(matches!(err, VideoSessionError::AppointmentClosed));
    }

    #[tokio::test]
    async fn call_ended_completes_and_schedules_teardown() {
        let appointment = sample_appointment(AppointmentStatus::InProgress, Some("consultation-x"));
        let owner = appointment.user_id;
        let id = appointment.id;

        let mut repo = MockAppointmentRepository::new();
        let mut jobs = MockJobRepository::new();

        repo.expect_find_by_id().returning(move |_| {
            let appointment = appointment.clone();
            Box::pin(async move { Ok(Some(appointment)) })
        });
        repo.expect_set_call_ended()
            .with(eq(id))
            .returning(|_| Box::pin(async { Ok(()) }));
        jobs.expect_enqueue_room_teardown()
            .withf(move |appointment_id, room_name, run_at| {
                let delay = *run_at - Utc::now();
                *appointment_id == id
                    && room_name == "consultation-x"
                    && delay > Duration::minutes(59)
                    && delay <= Duration::minutes(61)
            })
            .returning(|_, _, _| Box::pin(async { Ok(Uuid::new_v4()) }));

        let result = usecase(repo, jobs, MockVideoGateway::new())
            .set_call_status(id, owner, UserRole::Client, CallStatus::Ended)
            .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn call_end_succeeds_even_when_teardown_enqueue_fails() {
        let appointment = sample_appointment(AppointmentStatus::InProgress, Some("consultation-x"));
        let owner = appointment.user_id;
        let id = appointment.id;

        let mut repo = MockAppointmentRepository::new();
        let mut jobs = MockJobRepository::new();

        repo.expect_find_by_id().returning(move |_| {
            let appointment = appointment.clone();
            Box::pin(async move { Ok(Some(appointment)) })
        });
        repo.expect_set_call_ended()
            .returning(|_| Box::pin(async { Ok(()) }));
        jobs.expect_enqueue_room_teardown()
            .returning(|_, _, _| Box::pin(async { Err(anyhow!("db down")) }));

        let result = usecase(repo, jobs, MockVideoGateway::new())
            .set_call_status(id, owner, UserRole::Client, CallStatus::Ended)
            .await;

        assert!(result.is_ok());
    }
}
