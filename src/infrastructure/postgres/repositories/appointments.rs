use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use uuid::Uuid;

use crate::{
    domain::{
        entities::appointments::{AppointmentEntity, InsertAppointmentEntity},
        repositories::appointments::AppointmentRepository,
        value_objects::enums::{
            appointment_statuses::AppointmentStatus, payment_statuses::PaymentStatus,
        },
    },
    infrastructure::postgres::{postgres_connection::PgPoolSquad, schema::appointments},
};

pub struct AppointmentPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl AppointmentPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl AppointmentRepository for AppointmentPostgres {
    async fn create(&self, insert_entity: InsertAppointmentEntity) -> Result<AppointmentEntity> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = diesel::insert_into(appointments::table)
            .values(&insert_entity)
            .returning(AppointmentEntity::as_select())
            .get_result::<AppointmentEntity>(&mut conn)?;

        Ok(result)
    }

    async fn find_by_id(&self, appointment_id: Uuid) -> Result<Option<AppointmentEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = appointments::table
            .find(appointment_id)
            .select(AppointmentEntity::as_select())
            .first::<AppointmentEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }

    async fn list_by_user(
        &self,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<AppointmentEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = appointments::table
            .filter(appointments::user_id.eq(user_id))
            .order((
                appointments::scheduled_date.desc(),
                appointments::scheduled_time.desc(),
            ))
            .limit(limit)
            .offset(offset)
            .select(AppointmentEntity::as_select())
            .load::<AppointmentEntity>(&mut conn)?;

        Ok(result)
    }

    async fn count_by_user(&self, user_id: Uuid) -> Result<i64> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = appointments::table
            .filter(appointments::user_id.eq(user_id))
            .count()
            .get_result::<i64>(&mut conn)?;

        Ok(result)
    }

    async fn cancel(&self, appointment_id: Uuid, note: String) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        diesel::update(appointments::table.find(appointment_id))
            .set((
                appointments::status.eq(AppointmentStatus::Cancelled.to_string()),
                appointments::payment_status.eq(PaymentStatus::Refunded.to_string()),
                appointments::notes.eq(Some(note)),
                appointments::updated_at.eq(Utc::now()),
            ))
            .execute(&mut conn)?;

        Ok(())
    }

    async fn set_review(
        &self,
        appointment_id: Uuid,
        rating: i32,
        review: Option<String>,
    ) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        diesel::update(appointments::table.find(appointment_id))
            .set((
                appointments::rating.eq(Some(rating)),
                appointments::review.eq(review),
                appointments::updated_at.eq(Utc::now()),
            ))
            .execute(&mut conn)?;

        Ok(())
    }

    async fn set_payment_order(&self, appointment_id: Uuid, order_id: String) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        diesel::update(appointments::table.find(appointment_id))
            .set((
                appointments::payment_order_id.eq(Some(order_id)),
                appointments::updated_at.eq(Utc::now()),
            ))
            .execute(&mut conn)?;

        Ok(())
    }

    async fn mark_paid(&self, appointment_id: Uuid, payment_id: String) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;
        let current_time = Utc::now();

        diesel::update(appointments::table.find(appointment_id))
            .set((
                appointments::payment_status.eq(PaymentStatus::Completed.to_string()),
                appointments::status.eq(AppointmentStatus::Confirmed.to_string()),
                appointments::payment_id.eq(Some(payment_id)),
                appointments::paid_at.eq(Some(current_time)),
                appointments::updated_at.eq(current_time),
            ))
            .execute(&mut conn)?;

        Ok(())
    }

    async fn mark_payment_failed(&self, appointment_id: Uuid) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        diesel::update(appointments::table.find(appointment_id))
            .set((
                appointments::payment_status.eq(PaymentStatus::Failed.to_string()),
                appointments::updated_at.eq(Utc::now()),
            ))
            .execute(&mut conn)?;

        Ok(())
    }

    async fn set_room(
        &self,
        appointment_id: Uuid,
        room_name: String,
        room_url: String,
    ) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        diesel::update(appointments::table.find(appointment_id))
            .set((
                appointments::room_name.eq(Some(room_name)),
                appointments::room_url.eq(Some(room_url)),
                appointments::updated_at.eq(Utc::now()),
            ))
            .execute(&mut conn)?;

        Ok(())
    }

    async fn set_call_started(&self, appointment_id: Uuid) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;
        let current_time = Utc::now();

        diesel::update(appointments::table.find(appointment_id))
            .set((
                appointments::status.eq(AppointmentStatus::InProgress.to_string()),
                appointments::call_active.eq(true),
                appointments::call_started_at.eq(Some(current_time)),
                appointments::updated_at.eq(current_time),
            ))
            .execute(&mut conn)?;

        Ok(())
    }

    async fn set_call_ended(&self, appointment_id: Uuid) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;
        let current_time = Utc::now();

        diesel::update(appointments::table.find(appointment_id))
            .set((
                appointments::status.eq(AppointmentStatus::Completed.to_string()),
                appointments::call_active.eq(false),
                appointments::call_ended_at.eq(Some(current_time)),
                appointments::updated_at.eq(current_time),
            ))
            .execute(&mut conn)?;

        Ok(())
    }

    async fn set_status(
        &self,
        appointment_id: Uuid,
        status: AppointmentStatus,
        payment_status: Option<PaymentStatus>,
    ) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;
        let current_time = Utc::now();

        match payment_status {
            Some(payment_status) => {
                diesel::update(appointments::table.find(appointment_id))
                    .set((
                        appointments::status.eq(status.to_string()),
                        appointments::payment_status.eq(payment_status.to_string()),
                        appointments::updated_at.eq(current_time),
                    ))
                    .execute(&mut conn)?;
            }
            None => {
                diesel::update(appointments::table.find(appointment_id))
                    .set((
                        appointments::status.eq(status.to_string()),
                        appointments::updated_at.eq(current_time),
                    ))
                    .execute(&mut conn)?;
            }
        }

        Ok(())
    }
}
