pub mod auth;
pub mod axum_http;
pub mod clients;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod usecases;
pub mod workers;

use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use crate::{
    clients::{mail::MailClient, payment::StubPaymentClient, video::VideoRoomClient},
    domain::repositories::jobs::JobRepository,
    infrastructure::postgres::{postgres_connection, repositories::jobs::JobPostgres},
    usecases::video_sessions::VideoGateway,
};

pub async fn run() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let dotenvy_env = config::config_loader::load()?;
    info!("ENV has been loaded");

    let postgres_pool = postgres_connection::establish_connection(&dotenvy_env.database.url)?;
    info!("Postgres connection has been established");

    let config = Arc::new(dotenvy_env);
    let db_pool = Arc::new(postgres_pool);

    let video_client = Arc::new(VideoRoomClient::new(
        config.video.api_base.clone(),
        config.video.api_key.clone(),
    ));
    let payment_client = Arc::new(StubPaymentClient::new(config.payment.key_id.clone()));
    let mail_client = Arc::new(MailClient::new(
        config.mail.api_base.clone(),
        config.mail.api_key.clone(),
        config.mail.from.clone(),
    ));

    let job_repository: Arc<dyn JobRepository + Send + Sync> =
        Arc::new(JobPostgres::new(Arc::clone(&db_pool)));
    let video_gateway = Arc::clone(&video_client) as Arc<dyn VideoGateway + Send + Sync>;

    let room_teardown_loop = tokio::spawn(workers::room_teardown::run(
        job_repository,
        video_gateway,
    ));

    let http_server = tokio::spawn(axum_http::http_serve::start(
        Arc::clone(&config),
        Arc::clone(&db_pool),
        video_client,
        payment_client,
        mail_client,
    ));

    tokio::select! {
        result = room_teardown_loop => result??,
        result = http_server => result??,
    };

    Ok(())
}
