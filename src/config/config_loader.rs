use anyhow::{Ok, Result};

use super::config_model::{Auth, Database, DotEnvyConfig, Mail, Payment, Server, Video};

pub fn load() -> Result<DotEnvyConfig> {
    dotenvy::dotenv().ok();

    let server = Server {
        port: std::env::var("SERVER_PORT")
            .expect("SERVER_PORT is invalid")
            .parse()?,
        body_limit: std::env::var("SERVER_BODY_LIMIT")
            .expect("SERVER_BODY_LIMIT is invalid")
            .parse()?,
        timeout: std::env::var("SERVER_TIMEOUT")
            .expect("SERVER_TIMEOUT is invalid")
            .parse()?,
    };

    let database = Database {
        url: std::env::var("DATABASE_URL").expect("DATABASE_URL is invalid"),
    };

    let auth = Auth {
        jwt_secret: std::env::var("JWT_SECRET").expect("JWT_SECRET is invalid"),
    };

    let video = Video {
        api_base: std::env::var("VIDEO_API_BASE")
            .unwrap_or_else(|_| "https://api.daily.co/v1".to_string()),
        api_key: std::env::var("VIDEO_API_KEY").expect("VIDEO_API_KEY is invalid"),
    };

    let payment = Payment {
        key_id: std::env::var("PAYMENT_KEY_ID").expect("PAYMENT_KEY_ID is invalid"),
    };

    let mail = Mail {
        api_base: std::env::var("MAIL_API_BASE")
            .unwrap_or_else(|_| "https://smtp.maileroo.com".to_string()),
        api_key: std::env::var("MAIL_API_KEY").expect("MAIL_API_KEY is invalid"),
        from: std::env::var("MAIL_FROM").expect("MAIL_FROM is invalid"),
        operator_email: std::env::var("OPERATOR_EMAIL").expect("OPERATOR_EMAIL is invalid"),
    };

    Ok(DotEnvyConfig {
        server,
        database,
        auth,
        video,
        payment,
        mail,
    })
}
