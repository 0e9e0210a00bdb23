use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::models::{CreateRouteRequest, Route, RoutesPageResponse, UpdateRouteRequest};

#[derive(Deserialize)]
pub struct PagedQuery {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_size")]
    pub size: u32,
}

fn default_page() -> u32 {
    0
}

fn default_size() -> u32 {
    10
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartDateQuery {
    pub start_date: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateIntervalQuery {
    pub date_one: String,
    pub date_two: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CityPointsQuery {
    pub departure_city_id: String,
    pub arrival_city_id: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteFilterQuery {
    pub departure_city_id: Option<String>,
    pub arrival_city_id: Option<String>,
    pub transport_id: Option<String>,
    pub start_date: Option<String>,
    pub date_one: Option<String>,
    pub date_two: Option<String>,
}

pub async fn list_routes(
    State((_city_service, _transport_type_service, route_service, _user_service, _booking_service)): State<crate::AppState>,
) -> AppResult<Json<Vec<Route>>> {
    let routes = route_service.get_all_routes().await?;
    Ok(Json(routes))
}

pub async fn get_route(
    State((_city_service, _transport_type_service, route_service, _user_service, _booking_service)): State<crate::AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Option<Route>>> {
    let route = route_service.get_route(id).await?;
    Ok(Json(route))
}

pub async fn create_route(
    State((_city_service, _transport_type_service, route_service, _user_service, _booking_service)): State<crate::AppState>,
    Json(req): Json<CreateRouteRequest>,
) -> AppResult<Json<Route>> {
    req.validate()
        .map_err(|e| AppError::ValidationError(e.to_string()))?;

    let route = route_service.create_route(req).await?;
    Ok(Json(route))
}

pub async fn update_route(
    State((_city_service, _transport_type_service, route_service, _user_service, _booking_service)): State<crate::AppState>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateRouteRequest>,
) -> AppResult<Json<Option<Route>>> {
    req.validate()
        .map_err(|e| AppError::ValidationError(e.to_string()))?;

    let route = route_service.update_route(id, req).await?;
    Ok(Json(route))
}

pub async fn delete_route(
    State((_city_service, _transport_type_service, route_service, _user_service, _booking_service)): State<crate::AppState>,
    Path(id): Path<i64>,
) -> AppResult<String> {
    route_service.delete_route(id).await?;
    Ok("Route deleted successfully.".to_string())
}

pub async fn get_paged_routes(
    State((_city_service, _transport_type_service, route_service, _user_service, _booking_service)): State<crate::AppState>,
    Query(params): Query<PagedQuery>,
) -> AppResult<Json<RoutesPageResponse>> {
    let page = route_service.get_routes_paged(params.page, params.size).await?;
    Ok(Json(page))
}

// The search endpoints keep their peculiar status contract: an empty result
// is a 404 that still carries the (empty) array, and any failure collapses
// to a 500 with an empty array.
pub async fn get_routes_by_transport(
    State((_city_service, _transport_type_service, route_service, _user_service, _booking_service)): State<crate::AppState>,
    Path(transport_id): Path<String>,
) -> (StatusCode, Json<Vec<Route>>) {
    match route_service.get_routes_by_transport_type(&transport_id).await {
        Ok(routes) if routes.is_empty() => (StatusCode::NOT_FOUND, Json(routes)),
        Ok(routes) => (StatusCode::OK, Json(routes)),
        Err(err) => {
            tracing::error!("Route search by transport type failed: {}", err);
            (StatusCode::INTERNAL_SERVER_ERROR, Json(Vec::new()))
        }
    }
}

pub async fn get_routes_by_start_date(
    State((_city_service, _transport_type_service, route_service, _user_service, _booking_service)): State<crate::AppState>,
    Query(params): Query<StartDateQuery>,
) -> (StatusCode, Json<Vec<Route>>) {
    match route_service
        .get_routes_by_departure_date(&params.start_date)
        .await
    {
        Ok(routes) if routes.is_empty() => (StatusCode::NOT_FOUND, Json(routes)),
        Ok(routes) => (StatusCode::OK, Json(routes)),
        Err(err) => {
            tracing::error!("Route search by departure date failed: {}", err);
            (StatusCode::INTERNAL_SERVER_ERROR, Json(Vec::new()))
        }
    }
}

// Unlike the other searches this one returns 200 with an empty array.
pub async fn get_routes_by_date_interval(
    State((_city_service, _transport_type_service, route_service, _user_service, _booking_service)): State<crate::AppState>,
    Query(params): Query<DateIntervalQuery>,
) -> AppResult<Json<Vec<Route>>> {
    let routes = route_service
        .get_routes_by_date_interval(&params.date_one, &params.date_two)
        .await
        .map_err(|err| {
            AppError::InternalServerError(format!("Route search by date interval failed: {}", err))
        })?;
    Ok(Json(routes))
}

pub async fn get_routes_by_points(
    State((_city_service, _transport_type_service, route_service, _user_service, _booking_service)): State<crate::AppState>,
    Query(params): Query<CityPointsQuery>,
) -> (StatusCode, Json<Vec<Route>>) {
    match route_service
        .get_routes_by_cities(&params.departure_city_id, &params.arrival_city_id)
        .await
    {
        Ok(routes) if routes.is_empty() => (StatusCode::NOT_FOUND, Json(routes)),
        Ok(routes) => (StatusCode::OK, Json(routes)),
        Err(err) => {
            tracing::error!("Route search by city pair failed: {}", err);
            (StatusCode::INTERNAL_SERVER_ERROR, Json(Vec::new()))
        }
    }
}

pub async fn get_filtered_routes(
    State((_city_service, _transport_type_service, route_service, _user_service, _booking_service)): State<crate::AppState>,
    Query(params): Query<RouteFilterQuery>,
) -> (StatusCode, Json<Vec<Route>>) {
    match route_service
        .get_filtered_routes(
            params.departure_city_id.as_deref(),
            params.arrival_city_id.as_deref(),
            params.transport_id.as_deref(),
            params.start_date.as_deref(),
            params.date_one.as_deref(),
            params.date_two.as_deref(),
        )
        .await
    {
        Ok(routes) if routes.is_empty() => (StatusCode::NOT_FOUND, Json(routes)),
        Ok(routes) => (StatusCode::OK, Json(routes)),
        Err(err) => {
            tracing::error!("Route filtering failed: {}", err);
            (StatusCode::INTERNAL_SERVER_ERROR, Json(Vec::new()))
        }
    }
}
