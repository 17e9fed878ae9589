use std::sync::Arc;

use anyhow::Result as AnyResult;
use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::{
    clients::payment::{PaymentOrder, StubPaymentClient},
    domain::{
        repositories::appointments::AppointmentRepository,
        value_objects::{
            appointments::VerifyPaymentModel,
            enums::{appointment_statuses::AppointmentStatus, user_roles::UserRole},
        },
    },
    usecases::authorization::{AppointmentAction, can_act},
};

#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait PaymentGateway: Send + Sync {
    async fn create_order(&self, amount_minor: i32, receipt: &str) -> AnyResult<PaymentOrder>;

    async fn verify(&self, order_id: &str, payment_id: &str, signature: &str) -> AnyResult<bool>;
}

#[async_trait]
impl PaymentGateway for StubPaymentClient {
    async fn create_order(&self, amount_minor: i32, receipt: &str) -> AnyResult<PaymentOrder> {
        self.create_order(amount_minor, receipt).await
    }

    async fn verify(&self, order_id: &str, payment_id: &str, signature: &str) -> AnyResult<bool> {
        self.verify(order_id, payment_id, signature).await
    }
}

#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("appointment not found")]
    NotFound,
    #[error("not allowed to act on this appointment")]
    Forbidden,
    #[error("appointment is already closed")]
    AppointmentClosed,
    #[error("payment verification failed")]
    VerificationFailed,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl PaymentError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            PaymentError::NotFound => StatusCode::NOT_FOUND,
            PaymentError::Forbidden => StatusCode::FORBIDDEN,
            PaymentError::AppointmentClosed => StatusCode::CONFLICT,
            PaymentError::VerificationFailed => StatusCode::PAYMENT_REQUIRED,
            PaymentError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type PaymentResult<T> = std::result::Result<T, PaymentError>;

#[derive(Debug, Serialize)]
pub struct PaymentOrderDto {
    pub order_id: String,
    pub amount_minor: i32,
}

pub struct PaymentUseCase<A, G>
where
    A: AppointmentRepository + Send + Sync + 'static,
    G: PaymentGateway + Send + Sync + 'static,
{
    appointment_repo: Arc<A>,
    payment_gateway: Arc<G>,
}

impl<A, G> PaymentUseCase<A, G>
where
    A: AppointmentRepository + Send + Sync + 'static,
    G: PaymentGateway + Send + Sync + 'static,
{
    pub fn new(appointment_repo: Arc<A>, payment_gateway: Arc<G>) -> Self {
        Self {
            appointment_repo,
            payment_gateway,
        }
    }

    pub async fn create_order(
        &self,
        appointment_id: Uuid,
        acting_user_id: Uuid,
        role: UserRole,
    ) -> PaymentResult<PaymentOrderDto> {
        let appointment = self
            .appointment_repo
            .find_by_id(appointment_id)
            .await
            .map_err(PaymentError::Internal)?
            .ok_or(PaymentError::NotFound)?;

        if !can_act(
            role,
            appointment.user_id,
            acting_user_id,
            AppointmentAction::CreatePaymentOrder,
        ) {
            return Err(PaymentError::Forbidden);
        }

        let status = AppointmentStatus::from_str(&appointment.status);
        if status.is_some_and(|status| status.is_terminal()) {
            return Err(PaymentError::AppointmentClosed);
        }

        let order = self
            .payment_gateway
            .create_order(appointment.amount_minor, &appointment_id.to_string())
            .await
            .map_err(|err| {
                error!(
                    %appointment_id,
                    error = ?err,
                    "payments: gateway order creation failed"
                );
                PaymentError::Internal(err)
            })?;

        self.appointment_repo
            .set_payment_order(appointment_id, order.order_id.clone())
            .await
            .map_err(|err| {
                error!(%appointment_id, db_error = ?err, "payments: failed to store order id");
                PaymentError::Internal(err)
            })?;

        info!(
            %appointment_id,
            order_id = %order.order_id,
            amount_minor = order.amount_minor,
            "payments: order created"
        );

        Ok(PaymentOrderDto {
            order_id: order.order_id,
            amount_minor: order.amount_minor,
        })
    }

    /// Successful verification confirms the appointment and completes the
    /// payment in one write; a rejected verification marks the payment failed
    /// and leaves the lifecycle status untouched.
    pub async fn verify(
        &self,
        appointment_id: Uuid,
        acting_user_id: Uuid,
        role: UserRole,
        model: VerifyPaymentModel,
    ) -> PaymentResult<()> {
        let appointment = self
            .appointment_repo
            .find_by_id(appointment_id)
            .await
            .map_err(PaymentError::Internal)?
            .ok_or(PaymentError::NotFound)?;

        if !can_act(
            role,
            appointment.user_id,
            acting_user_id,
            AppointmentAction::VerifyPayment,
        ) {
            return Err(PaymentError::Forbidden);
        }

        // A closed appointment cannot be paid for; verifying against a
        // cancelled booking must not resurrect it as confirmed.
        let status = AppointmentStatus::from_str(&appointment.status);
        if status.is_some_and(|status| status.is_terminal()) {
            return Err(PaymentError::AppointmentClosed);
        }

        let verified = self
            .payment_gateway
            .verify(&model.order_id, &model.payment_id, &model.signature)
            .await
            .map_err(|err| {
                error!(%appointment_id, error = ?err, "payments: gateway verification errored");
                PaymentError::Internal(err)
            })?;

        if !verified {
            warn!(
                %appointment_id,
                order_id = %model.order_id,
                "payments: verification rejected"
            );
            self.appointment_repo
                .mark_payment_failed(appointment_id)
                .await
                .map_err(PaymentError::Internal)?;
            return Err(PaymentError::VerificationFailed);
        }

        self.appointment_repo
            .mark_paid(appointment_id, model.payment_id.clone())
            .await
            .map_err(|err| {
                error!(%appointment_id, db_error = ?err, "payments: failed to record payment");
                PaymentError::Internal(err)
            })?;

        info!(
            %appointment_id,
            payment_id = %model.payment_id,
            "payments: verified, appointment confirmed"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        entities::appointments::AppointmentEntity,
        repositories::appointments::MockAppointmentRepository,
        value_objects::enums::payment_statuses::PaymentStatus,
    };
    use chrono::{Duration, Utc};
    use mockall::predicate::eq;

    fn sample_appointment(status: AppointmentStatus) -> AppointmentEntity {
        let now = Utc::now();
        let start = now + Duration::days(1);
        AppointmentEntity {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            scheduled_date: start.date_naive(),
            scheduled_time: "18:00".to_string(),
            consultation_type: "video".to_string(),
            package: "basic".to_string(),
            duration_minutes: 30,
            amount_minor: 50_000,
            status: status.to_string(),
            payment_status: PaymentStatus::Pending.to_string(),
            payment_order_id: None,
            payment_id: None,
            paid_at: None,
            room_name: None,
            room_url: None,
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

    fn verify_model() -> VerifyPaymentModel {
        VerifyPaymentModel {
            order_id: "order_abc".to_string(),
            payment_id: "pay_123".to_string(),
            signature: "sig".to_string(),
        }
    }

    #[tokio::test]
    async fn create_order_stores_gateway_order_id() {
        let appointment = sample_appointment(AppointmentStatus::Pending);
        let owner = appointment.user_id;
        let id = appointment.id;

        let mut repo = MockAppointmentRepository::new();
        let mut gateway = MockPaymentGateway::new();

        repo.expect_find_by_id().returning(move |_| {
            let appointment = appointment.clone();
            Box::pin(async move { Ok(Some(appointment)) })
        });
        gateway
            .expect_create_order()
            .withf(|amount, _| *amount == 50_000)
            .returning(|amount, _| {
                Box::pin(async move {
                    Ok(PaymentOrder {
                        order_id: "order_abc".to_string(),
                        amount_minor: amount,
                    })
                })
            });
        repo.expect_set_payment_order()
            .with(eq(id), eq("order_abc".to_string()))
            .returning(|_, _| Box::pin(async { Ok(()) }));

        let dto = PaymentUseCase::new(Arc::new(repo), Arc::new(gateway))
            .create_order(id, owner, UserRole::Client)
            .await
            .unwrap();

        assert_eq!(dto.order_id, "order_abc");
        assert_eq!(dto.amount_minor, 50_000);
    }

    #[tokio::test]
    async fn create_order_rejected_for_cancelled_appointment() {
        let appointment = sample_appointment(AppointmentStatus::Cancelled);
        let owner = appointment.user_id;
        let id = appointment.id;

        let mut repo = MockAppointmentRepository::new();
        repo.expect_find_by_id().returning(move |_| {
            let appointment = appointment.clone();
            Box::pin(async move { Ok(Some(appointment)) })
        });

        let err = PaymentUseCase::new(Arc::new(repo), Arc::new(MockPaymentGateway::new()))
            .create_order(id, owner, UserRole::Client)
            .await
            .unwrap_err();

        assert!(matches!(err, PaymentError::AppointmentClosed));
    }

    #[tokio::test]
    async fn verify_rejected_for_cancelled_appointment() {
        let appointment = sample_appointment(AppointmentStatus::Cancelled);
        let owner = appointment.user_id;
        let id = appointment.id;

        let mut repo = MockAppointmentRepository::new();
        repo.expect_find_by_id().returning(move |_| {
            let appointment = appointment.clone();
            Box::pin(async move { Ok(Some(appointment)) })
        });
        // No mark_paid expectation: the cancelled record must stay untouched.

        let err = PaymentUseCase::new(Arc::new(repo), Arc::new(MockPaymentGateway::new()))
            .verify(id, owner, UserRole::Client, verify_model())
            .await
            .unwrap_err();

        assert!(matches!(err, PaymentError::AppointmentClosed));
    }

    #[tokio::test]
    async fn verify_success_marks_paid_and_confirmed() {
        let appointment = sample_appointment(AppointmentStatus::Pending);
        let owner = appointment.user_id;
        let id = appointment.id;

        let mut repo = MockAppointmentRepository::new();
        let mut gateway = MockPaymentGateway::new();

        repo.expect_find_by_id().returning(move |_| {
            let appointment = appointment.clone();
            Box::pin(async move { Ok(Some(appointment)) })
        });
        gateway
            .expect_verify()
            .returning(|_, _, _| Box::pin(async { Ok(true) }));
        repo.expect_mark_paid()
            .with(eq(id), eq("pay_123".to_string()))
            .returning(|_, _| Box::pin(async { Ok(()) }));

        let result = PaymentUseCase::new(Arc::new(repo), Arc::new(gateway))
            .verify(id, owner, UserRole::Client, verify_model())
            .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn verify_rejection_marks_payment_failed() {
        let appointment = sample_appointment(AppointmentStatus::Pending);
        let owner = appointment.user_id;
        let id = appointment.id;

        let mut repo = MockAppointmentRepository::new();
        let mut gateway = MockPaymentGateway::new();

        repo.expect_find_by_id().returning(move |_| {
            let appointment = appointment.clone();
            Box::pin(async move { Ok(Some(appointment)) })
        });
        gateway
            .expect_verify()
            .returning(|_, _, _| Box::pin(async { Ok(false) }));
        repo.expect_mark_payment_failed()
            .with(eq(id))
            .returning(|_| Box::pin(async { Ok(()) }));

        let err = PaymentUseCase::new(Arc::new(repo), Arc::new(gateway))
            .verify(id, owner, UserRole::Client, verify_model())
            .await
            .unwrap_err();

        assert!(matches!(err, PaymentError::VerificationFailed));
    }

    #[tokio::test]
    async fn stranger_cannot_create_order() {
        let appointment = sample_appointment(AppointmentStatus::Pending);
        let id = appointment.id;

        let mut repo = MockAppointmentRepository::new();
        repo.expect_find_by_id().returning(move |_| {
            let appointment = appointment.clone();
            Box::pin(async move { Ok(Some(appointment)) })
        });

        let err = PaymentUseCase::new(Arc::new(repo), Arc::new(MockPaymentGateway::new()))
            .create_order(id, Uuid::new_v4(), UserRole::Client)
            .await
            .unwrap_err();

        assert!(matches!(err, PaymentError::Forbidden));
    }
}
