use chrono::NaiveDate;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct BookAppointmentModel {
    pub scheduled_date: Option<NaiveDate>,
    pub scheduled_time: Option<String>,
    pub consultation_type: Option<String>,
    pub package: Option<String>,
    pub client_questions: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReviewModel {
    pub rating: i32,
    pub review: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VerifyPaymentModel {
    pub order_id: String,
    pub payment_id: String,
    pub signature: String,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CallStatus {
    Started,
    Ended,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CallStatusModel {
    pub status: CallStatus,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AdminStatusModel {
    pub status: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Pagination {
    #[serde(default)]
    pub page: i64,
    #[serde(default)]
    pub per_page: i64,
}

impl Pagination {
    pub fn limit(&self) -> i64 {
        match self.per_page {
            n if n > 0 && n <= 100 => n,
            _ => 20,
        }
    }

    pub fn offset(&self) -> i64 {
        self.limit() * self.page.max(0)
    }
}
