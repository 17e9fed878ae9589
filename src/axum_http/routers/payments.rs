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
    clients::payment::StubPaymentClient,
    domain::{
        repositories::appointments::AppointmentRepository,
        value_objects::appointments::VerifyPaymentModel,
    },
    infrastructure::postgres::{
        postgres_connection::PgPoolSquad, repositories::appointments::AppointmentPostgres,
    },
    usecases::payments::{PaymentError, PaymentGateway, PaymentUseCase},
};

pub fn routes(db_pool: Arc<PgPoolSquad>, payment_client: Arc<StubPaymentClient>) -> Router {
    let appointment_repository = AppointmentPostgres::new(Arc::clone(&db_pool));
    let payment_usecase = PaymentUseCase::new(Arc::new(appointment_repository), payment_client);

    Router::new()
        .route("/:id/payment/order", post(create_order))
        .route("/:id/payment/verify", post(verify_payment))
        .with_state(Arc::new(payment_usecase))
}

fn payment_error(err: PaymentError) -> axum::response::Response {
    error_response(err.status_code(), err)
}

pub async fn create_order<A, G>(
    State(usecase): State<Arc<PaymentUseCase<A, G>>>,
    AuthUser { user_id, role }: AuthUser,
    Path(appointment_id): Path<Uuid>,
) -> impl IntoResponse
where
    A: AppointmentRepository + Send + Sync + 'static,
    G: PaymentGateway + Send + Sync + 'static,
{
    match usecase.create_order(appointment_id, user_id, role).await {
        Ok(dto) => (StatusCode::CREATED, Json(dto)).into_response(),
        Err(err) => payment_error(err),
    }
}

pub async fn verify_payment<A, G>(
    State(usecase): State<Arc<PaymentUseCase<A, G>>>,
    AuthUser { user_id, role }: AuthUser,
    Path(appointment_id): Path<Uuid>,
    Json(model): Json<VerifyPaymentModel>,
) -> impl IntoResponse
where
    A: AppointmentRepository + Send + Sync + 'static,
    G: PaymentGateway + Send + Sync + 'static,
{
    match usecase.verify(appointment_id, user_id, role, model).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => payment_error(err),
    }
}
