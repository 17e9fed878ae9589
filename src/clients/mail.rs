use anyhow::{Result, anyhow};
use tracing::{error, info};

#[derive(Debug, Clone)]
pub struct MailMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// HTTP mail API client. Callers treat sending as best-effort; this client
/// still reports failures so they can be logged at the call site.
pub struct MailClient {
    http: reqwest::Client,
    api_base: String,
    api_key: String,
    from: String,
}

impl MailClient {
    pub fn new(api_base: String, api_key: String, from: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_base,
            api_key,
            from,
        }
    }

    pub async fn send(&self, message: &MailMessage) -> Result<()> {
        let form = vec![
            ("from", self.from.as_str()),
            ("to", message.to.as_str()),
            ("subject", message.subject.as_str()),
            ("plain", message.body.as_str()),
        ];

        let resp = self
            .http
            .post(format!("{}/send", self.api_base))
            .header("X-API-Key", &self.api_key)
            .form(&form)
            .send()
            .await?;

        let status = resp.status();
        let result_json: serde_json::Value = resp.json().await?;
        let success = result_json
            .get("success")
            .and_then(|v| v.as_bool())
            .unwrap_or(false);

        if !status.is_success() || !success {
            let message = result_json
                .get("message")
                .and_then(|v| v.as_str())
                .unwrap_or("unknown error");
            error!(%status, message, "mail: provider rejected message");
            return Err(anyhow!("mail provider rejected message: {}", message));
        }

        info!(to = %message.to, subject = %message.subject, "mail: message sent");
        Ok(())
    }
}
