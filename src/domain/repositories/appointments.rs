use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::domain::{
    entities::appointments::{AppointmentEntity, InsertAppointmentEntity},
    value_objects::enums::{
        appointment_statuses::AppointmentStatus, payment_statuses::PaymentStatus,
    },
};

#[async_trait]
#[automock]
pub trait AppointmentRepository {
    async fn create(&self, insert_entity: InsertAppointmentEntity) -> Result<AppointmentEntity>;

    async fn find_by_id(&self, appointment_id: Uuid) -> Result<Option<AppointmentEntity>>;

    /// Owner's appointments, newest scheduled first (date desc, time desc).
    async fn list_by_user(
        &self,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<AppointmentEntity>>;

    async fn count_by_user(&self, user_id: Uuid) -> Result<i64>;

    /// Soft cancellation: status=cancelled, payment_status=refunded, note kept
    /// for audit. The row is never deleted.
    async fn cancel(&self, appointment_id: Uuid, note: String) -> Result<()>;

    async fn set_review(
        &self,
        appointment_id: Uuid,
        rating: i32,
        review: Option<String>,
    ) -> Result<()>;

    async fn set_payment_order(&self, appointment_id: Uuid, order_id: String) -> Result<()>;

    /// Single write: payment_status=completed, status=confirmed, paid_at=now.
    async fn mark_paid(&self, appointment_id: Uuid, payment_id: String) -> Result<()>;

    async fn mark_payment_failed(&self, appointment_id: Uuid) -> Result<()>;

    async fn set_room(
        &self,
        appointment_id: Uuid,
        room_name: String,
        room_url: String,
    ) -> Result<()>;

    async fn set_call_started(&self, appointment_id: Uuid) -> Result<()>;

    async fn set_call_ended(&self, appointment_id: Uuid) -> Result<()>;

    async fn set_status(
        &self,
        appointment_id: Uuid,
        status: AppointmentStatus,
        payment_status: Option<PaymentStatus>,
    ) -> Result<()>;
}
