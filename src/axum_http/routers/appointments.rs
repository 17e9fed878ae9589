use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use uuid::Uuid;

use crate::{
    auth::AuthUser,
    axum_http::error_responses::error_response,
    clients::mail::MailClient,
    domain::{
        repositories::appointments::AppointmentRepository,
        value_objects::appointments::{BookAppointmentModel, Pagination, ReviewModel},
    },
    infrastructure::postgres::{
        postgres_connection::PgPoolSquad, repositories::appointments::AppointmentPostgres,
    },
    usecases::appointments::{BookingError, BookingUseCase, MailGateway},
};

pub fn routes(db_pool: Arc<PgPoolSquad>, mail_client: Arc<MailClient>, operator_email: String) -> Router {
    let appointment_repository = AppointmentPostgres::new(Arc::clone(&db_pool));
    let booking_usecase = BookingUseCase::new(
        Arc::new(appointment_repository),
        mail_client,
        operator_email,
    );

    Router::new()
        .route("/", post(book_appointment).get(list_appointments))
        .route("/:id", get(get_appointment))
        .route("/:id/cancel", post(cancel_appointment))
        .route("/:id/review", post(submit_review))
        .with_state(Arc::new(booking_usecase))
}

fn booking_error(err: BookingError) -> axum::response::Response {
    error_response(err.status_code(), err)
}

pub async fn book_appointment<A, M>(
    State(usecase): State<Arc<BookingUseCase<A, M>>>,
    AuthUser { user_id, .. }: AuthUser,
    Json(model): Json<BookAppointmentModel>,
) -> impl IntoResponse
where
    A: AppointmentRepository + Send + Sync + 'static,
    M: MailGateway + Send + Sync + 'static,
{
    match usecase.create(user_id, model).await {
        Ok(dto) => (StatusCode::CREATED, Json(dto)).into_response(),
        Err(err) => booking_error(err),
    }
}

pub async fn list_appointments<A, M>(
    State(usecase): State<Arc<BookingUseCase<A, M>>>,
    AuthUser { user_id, .. }: AuthUser,
    Query(pagination): Query<Pagination>,
) -> impl IntoResponse
where
    A: AppointmentRepository + Send + Sync + 'static,
    M: MailGateway + Send + Sync + 'static,
{
    match usecase.list_for_user(user_id, pagination).await {
        Ok(page) => Json(page).into_response(),
        Err(err) => booking_error(err),
    }
}

pub async fn get_appointment<A, M>(
    State(usecase): State<Arc<BookingUseCase<A, M>>>,
    AuthUser { user_id, role }: AuthUser,
    Path(appointment_id): Path<Uuid>,
) -> impl IntoResponse
where
    A: AppointmentRepository + Send + Sync + 'static,
    M: MailGateway + Send + Sync + 'static,
{
    match usecase.get(appointment_id, user_id, role).await {
        Ok(dto) => Json(dto).into_response(),
        Err(err) => booking_error(err),
    }
}

pub async fn cancel_appointment<A, M>(
    State(usecase): State<Arc<BookingUseCase<A, M>>>,
    AuthUser { user_id, role }: AuthUser,
    Path(appointment_id): Path<Uuid>,
) -> impl IntoResponse
where
    A: AppointmentRepository + Send + Sync + 'static,
    M: MailGateway + Send + Sync + 'static,
{
    match usecase.cancel(appointment_id, user_id, role).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => booking_error(err),
    }
}

pub async fn submit_review<A, M>(
    State(usecase): State<Arc<BookingUseCase<A, M>>>,
    AuthUser { user_id, role }: AuthUser,
    Path(appointment_id): Path<Uuid>,
    Json(model): Json<ReviewModel>,
) -> impl IntoResponse
where
    A: AppointmentRepository + Send + Sync + 'static,
    M: MailGateway + Send + Sync + 'static,
{
    match usecase.submit_review(appointment_id, user_id, role, model).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => booking_error(err),
    }
}
