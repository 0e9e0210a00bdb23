use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::models::Booking;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingParams {
    pub route_id: i64,
    pub user_id: i64,
    pub booking_date_time: String,
    pub with_baggage: bool,
    pub with_child: i32,
    pub with_pet: i32,
}

pub async fn list_bookings(
    State((_city_service, _transport_type_service, _route_service, _user_service, booking_service)): State<crate::AppState>,
) -> AppResult<Json<Vec<Booking>>> {
    let bookings = booking_service.get_all_bookings().await?;
    Ok(Json(bookings))
}

pub async fn get_booking(
    State((_city_service, _transport_type_service, _route_service, _user_service, booking_service)): State<crate::AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Option<Booking>>> {
    let booking = booking_service.get_booking(id).await?;
    Ok(Json(booking))
}

pub async fn create_booking(
    State((_city_service, _transport_type_service, _route_service, _user_service, booking_service)): State<crate::AppState>,
    Query(params): Query<CreateBookingParams>,
) -> AppResult<Json<Booking>> {
    let booking = booking_service
        .create_booking(
            params.route_id,
            params.user_id,
            &params.booking_date_time,
            params.with_baggage,
            params.with_child,
            params.with_pet,
        )
        .await
        .map_err(|err| match err {
            // Invalid input surfaces as not-found on this endpoint.
            AppError::BadRequest(msg) => AppError::NotFound(msg),
            other => other,
        })?;
    Ok(Json(booking))
}

pub async fn get_bookings_by_user(
    State((_city_service, _transport_type_service, _route_service, _user_service, booking_service)): State<crate::AppState>,
    Path(user_id): Path<i64>,
) -> AppResult<Response> {
    let bookings = booking_service.get_bookings_by_user(user_id).await?;
    if bookings.is_empty() {
        return Ok((StatusCode::NOT_FOUND, "No bookings found.").into_response());
    }
    Ok(Json(bookings).into_response())
}

pub async fn delete_booking(
    State((_city_service, _transport_type_service, _route_service, _user_service, booking_service)): State<crate::AppState>,
    Path(id): Path<i64>,
) -> AppResult<String> {
    booking_service.delete_booking(id).await?;
    Ok("Booking deleted successfully.".to_string())
}
