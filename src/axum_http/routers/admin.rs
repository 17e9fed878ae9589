use std::sync::Arc;

use axum::{
    Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::patch,
};
use uuid::Uuid;

use crate::{
    auth::AuthUser,
    axum_http::error_responses::error_response,
    clients::mail::MailClient,
    domain::{
        repositories::appointments::AppointmentRepository,
        value_objects::appointments::AdminStatusModel,
    },
    infrastructure::postgres::{
        postgres_connection::PgPoolSquad, repositories::appointments::AppointmentPostgres,
    },
    usecases::appointments::{BookingUseCase, MailGateway},
};

pub fn routes(
    db_pool: Arc<PgPoolSquad>,
    mail_client: Arc<MailClient>,
    operator_email: String,
) -> Router {
    let appointment_repository = AppointmentPostgres::new(Arc::clone(&db_pool));
    let booking_usecase = BookingUseCase::new(
        Arc::new(appointment_repository),
        mail_client,
        operator_email,
    );

    Router::new()
        .route("/appointments/:id/status", patch(override_status))
        .with_state(Arc::new(booking_usecase))
}

pub async fn override_status<A, M>(
    State(usecase): State<Arc<BookingUseCase<A, M>>>,
    AuthUser { user_id, role }: AuthUser,
    Path(appointment_id): Path<Uuid>,
    axum::Json(model): axum::Json<AdminStatusModel>,
) -> impl IntoResponse
where
    A: AppointmentRepository + Send + Sync + 'static,
    M: MailGateway + Send + Sync + 'static,
{
    match usecase
        .admin_override(appointment_id, user_id, role, model)
        .await
    {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => error_response(err.status_code(), err),
    }
}
