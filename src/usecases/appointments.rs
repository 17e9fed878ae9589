use std::sync::Arc;

use anyhow::{Result as AnyResult, anyhow};
use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::{
    clients::mail::{MailClient, MailMessage},
    domain::{
        entities::appointments::{AppointmentEntity, InsertAppointmentEntity},
        repositories::appointments::AppointmentRepository,
        value_objects::{
            appointments::{AdminStatusModel, BookAppointmentModel, Pagination, ReviewModel},
            enums::{
                appointment_statuses::AppointmentStatus, packages::PackageTier,
                payment_statuses::PaymentStatus, user_roles::UserRole,
            },
        },
    },
    usecases::authorization::{AppointmentAction, can_act},
};

/// Minimum lead time for cancelling a confirmed (or later-stage) appointment.
/// Pending bookings may always be cancelled: an unpaid slot carries no risk.
const CANCELLATION_WINDOW_HOURS: i64 = 2;

#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait MailGateway: Send + Sync {
    async fn send(&self, message: &MailMessage) -> AnyResult<()>;
}

#[async_trait]
impl MailGateway for MailClient {
    async fn send(&self, message: &MailMessage) -> AnyResult<()> {
        self.send(message).await
    }
}

#[derive(Debug, Error)]
pub enum BookingError {
    #[error("missing required field: {0}")]
    MissingField(&'static str),
    #[error("unknown package: {0}")]
    InvalidPackage(String),
    #[error("rating must be between 1 and 5")]
    InvalidRating,
    #[error("appointment not found")]
    NotFound,
    #[error("not allowed to act on this appointment")]
    Forbidden,
    #[error("appointment can no longer be cancelled")]
    TooLate,
    #[error("appointment is not completed yet")]
    NotCompleted,
    #[error("appointment is already closed")]
    AlreadyClosed,
    #[error("invalid status: {0}")]
    InvalidStatus(String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl BookingError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            BookingError::MissingField(_)
            | BookingError::InvalidPackage(_)
            | BookingError::InvalidRating
            | BookingError::InvalidStatus(_) => StatusCode::BAD_REQUEST,
            BookingError::NotFound => StatusCode::NOT_FOUND,
            BookingError::Forbidden => StatusCode::FORBIDDEN,
            BookingError::TooLate | BookingError::NotCompleted | BookingError::AlreadyClosed => {
                StatusCode::CONFLICT
            }
            BookingError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type BookingResult<T> = std::result::Result<T, BookingError>;

#[derive(Debug, Serialize)]
pub struct AppointmentDto {
    pub id: Uuid,
    pub user_id: Uuid,
    pub scheduled_date: NaiveDate,
    pub scheduled_time: String,
    pub consultation_type: String,
    pub package: String,
    pub duration_minutes: i32,
    pub amount_minor: i32,
    pub status: String,
    pub payment_status: String,
    pub room_url: Option<String>,
    pub call_started_at: Option<DateTime<Utc>>,
    pub call_ended_at: Option<DateTime<Utc>>,
    pub rating: Option<i32>,
    pub review: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<AppointmentEntity> for AppointmentDto {
    fn from(value: AppointmentEntity) -> Self {
        Self {
            id: value.id,
            user_id: value.user_id,
            scheduled_date: value.scheduled_date,
            scheduled_time: value.scheduled_time,
            consultation_type: value.consultation_type,
            package: value.package,
            duration_minutes: value.duration_minutes,
            amount_minor: value.amount_minor,
            status: value.status,
            payment_status: value.payment_status,
            room_url: value.room_url,
            call_started_at: value.call_started_at,
            call_ended_at: value.call_ended_at,
            rating: value.rating,
            review: value.review,
            created_at: value.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PagedAppointmentsDto {
    pub appointments: Vec<AppointmentDto>,
    pub total: i64,
}

/// The appointment lifecycle controller: the only component that coordinates
/// the record store with external bridges around one shared record.
pub struct BookingUseCase<A, M>
where
    A: AppointmentRepository + Send + Sync + 'static,
    M: MailGateway + Send + Sync + 'static,
{
    appointment_repo: Arc<A>,
    mail_gateway: Arc<M>,
    operator_email: String,
}

impl<A, M> BookingUseCase<A, M>
where
    A: AppointmentRepository + Send + Sync + 'static,
    M: MailGateway + Send + Sync + 'static,
{
    pub fn new(appointment_repo: Arc<A>, mail_gateway: Arc<M>, operator_email: String) -> Self {
        Self {
            appointment_repo,
            mail_gateway,
            operator_email,
        }
    }

    pub async fn create(
        &self,
        user_id: Uuid,
        model: BookAppointmentModel,
    ) -> BookingResult<AppointmentDto> {
        let scheduled_date = model
            .scheduled_date
            .ok_or(BookingError::MissingField("scheduled_date"))?;
        let scheduled_time = model
            .scheduled_time
            .ok_or(BookingError::MissingField("scheduled_time"))?;
        let consultation_type = model
            .consultation_type
            .ok_or(BookingError::MissingField("consultation_type"))?;
        let package_name = model
            .package
            .ok_or(BookingError::MissingField("package"))?;

        let tier = PackageTier::resolve(&package_name).ok_or_else(|| {
            let err = BookingError::InvalidPackage(package_name.clone());
            warn!(
                %user_id,
                package = %package_name,
                status = err.status_code().as_u16(),
                "booking: unresolvable package name"
            );
            err
        })?;

        let now = Utc::now();
        let appointment = self
            .appointment_repo
            .create(InsertAppointmentEntity {
                user_id,
                scheduled_date,
                scheduled_time,
                consultation_type,
                package: tier.to_string(),
                duration_minutes: tier.duration_minutes(),
                amount_minor: tier.amount_minor(),
                status: AppointmentStatus::Pending.to_string(),
                payment_status: PaymentStatus::Pending.to_string(),
                client_questions: model.client_questions,
                created_at: now,
                updated_at: now,
            })
            .await
            .map_err(|err| {
                error!(%user_id, db_error = ?err, "booking: failed to persist appointment");
                BookingError::Internal(err)
            })?;

        info!(
            %user_id,
            appointment_id = %appointment.id,
            package = %tier,
            "booking: appointment created"
        );

        // Operator notification is best-effort; a mail outage must not lose
        // the booking the client just paid attention to.
        let message = MailMessage {
            to: self.operator_email.clone(),
            subject: "New consultation booked".to_string(),
            body: format!(
                "Appointment {} booked for {} at {} ({} package).",
                appointment.id, appointment.scheduled_date, appointment.scheduled_time, tier,
            ),
        };
        if let Err(err) = self.mail_gateway.send(&message).await {
            error!(
                appointment_id = %appointment.id,
                error = ?err,
                "booking: operator notification failed; continuing"
            );
        }

        Ok(AppointmentDto::from(appointment))
    }

    pub async fn cancel(
        &self,
        appointment_id: Uuid,
        acting_user_id: Uuid,
        role: UserRole,
    ) -> BookingResult<()> {
        let appointment = self.load(appointment_id).await?;

        if !can_act(
            role,
            appointment.user_id,
            acting_user_id,
            AppointmentAction::Cancel,
        ) {
            let err = BookingError::Forbidden;
            warn!(
                %appointment_id,
                %acting_user_id,
                status = err.status_code().as_u16(),
                "booking: cancel denied"
            );
            return Err(err);
        }

        let status = Self::parse_status(&appointment.status)?;
        if status.is_terminal() {
            return Err(BookingError::AlreadyClosed);
        }

        if status != AppointmentStatus::Pending {
            let scheduled_start = appointment
                .scheduled_start()
                .ok_or_else(|| anyhow!("unparsable scheduled time on {}", appointment_id))?;
            let lead_time = scheduled_start - Utc::now();
            if lead_time < Duration::hours(CANCELLATION_WINDOW_HOURS) {
                let err = BookingError::TooLate;
                warn!(
                    %appointment_id,
                    lead_minutes = lead_time.num_minutes(),
                    status = err.status_code().as_u16(),
                    "booking: cancellation window violated"
                );
                return Err(err);
            }
        }

        let note = format!("Cancelled by user at {}", Utc::now().to_rfc3339());
        self.appointment_repo
            .cancel(appointment_id, note)
            .await
            .map_err(|err| {
                error!(%appointment_id, db_error = ?err, "booking: failed to cancel appointment");
                BookingError::Internal(err)
            })?;

        info!(%appointment_id, "booking: appointment cancelled, payment marked refunded");
        Ok(())
    }

    pub async fn submit_review(
        &self,
        appointment_id: Uuid,
        acting_user_id: Uuid,
        role: UserRole,
        model: ReviewModel,
    ) -> BookingResult<()> {
        if !(1..=5).contains(&model.rating) {
            return Err(BookingError::InvalidRating);
        }

        let appointment = self.load(appointment_id).await?;

        if !can_act(
            role,
            appointment.user_id,
            acting_user_id,
            AppointmentAction::Review,
        ) {
            return Err(BookingError::Forbidden);
        }

        if Self::parse_status(&appointment.status)? != AppointmentStatus::Completed {
            return Err(BookingError::NotCompleted);
        }

        self.appointment_repo
            .set_review(appointment_id, model.rating, model.review)
            .await
            .map_err(|err| {
                error!(%appointment_id, db_error = ?err, "booking: failed to store review");
                BookingError::Internal(err)
            })?;

        info!(%appointment_id, rating = model.rating, "booking: review stored");
        Ok(())
    }

    pub async fn get(
        &self,
        appointment_id: Uuid,
        acting_user_id: Uuid,
        role: UserRole,
    ) -> BookingResult<AppointmentDto> {
        let appointment = self.load(appointment_id).await?;

        if !can_act(
            role,
            appointment.user_id,
            acting_user_id,
            AppointmentAction::View,
        ) {
            return Err(BookingError::Forbidden);
        }

        Ok(AppointmentDto::from(appointment))
    }

    pub async fn list_for_user(
        &self,
        user_id: Uuid,
        pagination: Pagination,
    ) -> BookingResult<PagedAppointmentsDto> {
        let appointments = self
            .appointment_repo
            .list_by_user(user_id, pagination.limit(), pagination.offset())
            .await
            .map_err(|err| {
                error!(%user_id, db_error = ?err, "booking: failed to list appointments");
                BookingError::Internal(err)
            })?;
        let total = self
            .appointment_repo
            .count_by_user(user_id)
            .await
            .map_err(BookingError::Internal)?;

        Ok(PagedAppointmentsDto {
            appointments: appointments.into_iter().map(AppointmentDto::from).collect(),
            total,
        })
    }

    /// Administrative status override. When forcing a pending-payment booking
    /// into `confirmed`, the payment is marked completed without touching the
    /// payment bridge. Recognized escape hatch for operational fixes.
    pub async fn admin_override(
        &self,
        appointment_id: Uuid,
        acting_user_id: Uuid,
        role: UserRole,
        model: AdminStatusModel,
    ) -> BookingResult<()> {
        if !can_act(
            role,
            acting_user_id,
            acting_user_id,
            AppointmentAction::OverrideStatus,
        ) {
            return Err(BookingError::Forbidden);
        }

        let new_status = AppointmentStatus::from_str(&model.status)
            .filter(|status| *status != AppointmentStatus::InProgress)
            .ok_or_else(|| BookingError::InvalidStatus(model.status.clone()))?;

        let appointment = self.load(appointment_id).await?;

        let forced_payment = if new_status == AppointmentStatus::Confirmed
            && appointment.payment_status == PaymentStatus::Pending.to_string()
        {
            Some(PaymentStatus::Completed)
        } else {
            None
        };

        self.appointment_repo
            .set_status(appointment_id, new_status, forced_payment)
            .await
            .map_err(|err| {
                error!(%appointment_id, db_error = ?err, "booking: admin override failed");
                BookingError::Internal(err)
            })?;

        info!(
            %appointment_id,
            %acting_user_id,
            new_status = %new_status,
            payment_forced = forced_payment.is_some(),
            "booking: admin status override applied"
        );
        Ok(())
    }

    async fn load(&self, appointment_id: Uuid) -> BookingResult<AppointmentEntity> {
        self.appointment_repo
            .find_by_id(appointment_id)
            .await
            .map_err(|err| {
                error!(%appointment_id, db_error = ?err, "booking: failed to load appointment");
                BookingError::Internal(err)
            })?
            .ok_or(BookingError::NotFound)
    }

    fn parse_status(value: &str) -> BookingResult<AppointmentStatus> {
        AppointmentStatus::from_str(value)
            .ok_or_else(|| BookingError::Internal(anyhow!("corrupt status value: {}", value)))
    }
}
