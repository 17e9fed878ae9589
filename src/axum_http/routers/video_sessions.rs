use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::post,
};
use uuid::Uuid;

use crate::{
    auth::AuthUser,
    axum_http::error_responses::error_response,
    clients::video::VideoRoomClient,
    domain::{
        repositories::{appointments::AppointmentRepository, jobs::JobRepository},
        value_objects::appointments::CallStatusModel,
    },
    infrastructure::postgres::{
        postgres_connection::PgPoolSquad,
        repositories::{appointments::AppointmentPostgres, jobs::JobPostgres},
    },
    usecases::video_sessions::{VideoGateway, VideoSessionError, VideoSessionUseCase},
};

pub fn routes(db_pool: Arc<PgPoolSquad>, video_client: Arc<VideoRoomClient>) -> Router {
    let appointment_repository = AppointmentPostgres::new(Arc::clone(&db_pool));
    let job_repository = JobPostgres::new(Arc::clone(&db_pool));
    let video_usecase = VideoSessionUseCase::new(
        Arc::new(appointment_repository),
        Arc::new(job_repository),
        video_client,
    );

    Router::new()
        .route("/:id/room", post(create_room))
        .route("/:id/token", post(issue_token))
        .route("/:id/call-status", post(set_call_status))
        .with_state(Arc::new(video_usecase))
}

fn video_error(err: VideoSessionError) -> axum::response::Response {
    error_response(err.status_code(), err)
}

pub async fn create_room<A, J, V>(
    State(usecase): State<Arc<VideoSessionUseCase<A, J, V>>>,
    AuthUser { user_id, role }: AuthUser,
    Path(appointment_id): Path<Uuid>,
) -> impl IntoResponse
where
    A: AppointmentRepository + Send + Sync + 'static,
    J: JobRepository + Send + Sync + 'static,
    V: VideoGateway + Send + Sync + 'static,
{
    match usecase.create_room(appointment_id, user_id, role).await {
        Ok(dto) => (StatusCode::CREATED, Json(dto)).into_response(),
        Err(err) => video_error(err),
    }
}

pub async fn issue_token<A, J, V>(
    State(usecase): State<Arc<VideoSessionUseCase<A, J, V>>>,
    AuthUser { user_id, role }: AuthUser,
    Path(appointment_id): Path<Uuid>,
) -> impl IntoResponse
where
    A: AppointmentRepository + Send + Sync + 'static,
    J: JobRepository + Send + Sync + 'static,
    V: VideoGateway + Send + Sync + 'static,
{
    match usecase.issue_token(appointment_id, user_id, role).await {
        Ok(dto) => Json(dto).into_response(),
        Err(err) => video_error(err),
    }
}

pub async fn set_call_status<A, J, V>(
    State(usecase): State<Arc<VideoSessionUseCase<A, J, V>>>,
    AuthUser { user_id, role }: AuthUser,
    Path(appointment_id): Path<Uuid>,
    Json(model): Json<CallStatusModel>,
) -> impl IntoResponse
where
    A: AppointmentRepository + Send + Sync + 'static,
    J: JobRepository + Send + Sync + 'static,
    V: VideoGateway + Send + Sync + 'static,
{
    match usecase
        .set_call_status(appointment_id, user_id, role, model.status)
        .await
    {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => video_error(err),
    }
}
