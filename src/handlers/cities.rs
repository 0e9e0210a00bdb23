use axum::{
    extract::{Path, State},
    Json,
};

use crate::error::AppResult;
use crate::models::{City, CreateCityRequest, UpdateCityRequest};

pub async fn list_cities(
    State((city_service, _transport_type_service, _route_service, _user_service, _booking_service)): State<crate::AppState>,
) -> AppResult<Json<Vec<City>>> {
    let cities = city_service.get_all_cities().await?;
    Ok(Json(cities))
}

pub async fn get_city(
    State((city_service, _transport_type_service, _route_service, _user_service, _booking_service)): State<crate::AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Option<City>>> {
    let city = city_service.get_city(&id).await?;
    Ok(Json(city))
}

pub async fn create_city(
    State((city_service, _transport_type_service, _route_service, _user_service, _booking_service)): State<crate::AppState>,
    Json(req): Json<CreateCityRequest>,
) -> AppResult<Json<City>> {
    let city = city_service.create_city(req).await?;
    Ok(Json(city))
}

pub async fn update_city(
    State((city_service, _transport_type_service, _route_service, _user_service, _booking_service)): State<crate::AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateCityRequest>,
) -> AppResult<Json<Option<City>>> {
    let city = city_service.update_city(&id, req).await?;
    Ok(Json(city))
}

pub async fn delete_city(
    State((city_service, _transport_type_service, _route_service, _user_service, _booking_service)): State<crate::AppState>,
    Path(id): Path<String>,
) -> AppResult<String> {
    city_service.delete_city(&id).await?;
    Ok("City deleted successfully.".to_string())
}
