use anyhow::Result;
use tracing::info;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct PaymentOrder {
    pub order_id: String,
    pub amount_minor: i32,
}

/// Stub payment provider client. Order ids are generated locally and every
/// verification passes; the lifecycle controller treats this exactly like a
/// real gateway so swapping in a live provider only touches this file.
pub struct StubPaymentClient {
    key_id: String,
}

impl StubPaymentClient {
    pub fn new(key_id: String) -> Self {
        Self { key_id }
    }

    pub async fn create_order(&self, amount_minor: i32, receipt: &str) -> Result<PaymentOrder> {
        let order_id = format!("order_{}", Uuid::new_v4().simple());
        info!(
            key_id = %self.key_id,
            %order_id,
            amount_minor,
            receipt,
            "payment: stub order created"
        );
        Ok(PaymentOrder {
            order_id,
            amount_minor,
        })
    }

    pub async fn verify(&self, order_id: &str, payment_id: &str, _signature: &str) -> Result<bool> {
        info!(
            %order_id,
            %payment_id,
            "payment: stub verification accepted"
        );
        Ok(true)
    }
}
