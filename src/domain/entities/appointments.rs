use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::infrastructure::postgres::schema::appointments;

#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = appointments)]
pub struct AppointmentEntity {
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
    pub payment_order_id: Option<String>,
    pub payment_id: Option<String>,
    pub paid_at: Option<DateTime<Utc>>,
    pub room_name: Option<String>,
    pub room_url: Option<String>,
    pub call_active: bool,
    pub call_started_at: Option<DateTime<Utc>>,
    pub call_ended_at: Option<DateTime<Utc>>,
    pub rating: Option<i32>,
    pub review: Option<String>,
    pub client_questions: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AppointmentEntity {
    /// Scheduled start instant derived from the date and the "HH:MM" slot.
    /// Returns None when the stored slot string does not parse.
    pub fn scheduled_start(&self) -> Option<DateTime<Utc>> {
        let time = NaiveTime::parse_from_str(&self.scheduled_time, "%H:%M").ok()?;
        Some(self.scheduled_date.and_time(time).and_utc())
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = appointments)]
pub struct InsertAppointmentEntity {
    pub user_id: Uuid,
    pub scheduled_date: NaiveDate,
    pub scheduled_time: String,
    pub consultation_type: String,
    pub package: String,
    pub duration_minutes: i32,
    pub amount_minor: i32,
    pub status: String,
    pub payment_status: String,
    pub client_questions: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
