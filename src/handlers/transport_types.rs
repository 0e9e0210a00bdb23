use axum::{
    extract::{Path, State},
    Json,
};

use crate::error::AppResult;
use crate::models::{CreateTransportTypeRequest, TransportType, UpdateTransportTypeRequest};

pub async fn list_transport_types(
    State((_city_service, transport_type_service, _route_service, _user_service, _booking_service)): State<crate::AppState>,
) -> AppResult<Json<Vec<TransportType>>> {
    let transport_types = transport_type_service.get_all_transport_types().await?;
    Ok(Json(transport_types))
}

pub async fn get_transport_type(
    State((_city_service, transport_type_service, _route_service, _user_service, _booking_service)): State<crate::AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Option<TransportType>>> {
    let transport_type = transport_type_service.get_transport_type(&id).await?;
    Ok(Json(transport_type))
}

pub async fn create_transport_type(
    State((_city_service, transport_type_service, _route_service, _user_service, _booking_service)): State<crate::AppState>,
    Json(req): Json<CreateTransportTypeRequest>,
) -> AppResult<Json<TransportType>> {
    let transport_type = transport_type_service.create_transport_type(req).await?;
    Ok(Json(transport_type))
}

pub async fn update_transport_type(
    State((_city_service, transport_type_service, _route_service, _user_service, _booking_service)): State<crate::AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateTransportTypeRequest>,
) -> AppResult<Json<Option<TransportType>>> {
    let transport_type = transport_type_service
        .update_transport_type(&id, req)
        .await?;
    Ok(Json(transport_type))
}

pub async fn delete_transport_type(
    State((_city_service, transport_type_service, _route_service, _user_service, _booking_service)): State<crate::AppState>,
    Path(id): Path<String>,
) -> AppResult<String> {
    transport_type_service.delete_transport_type(&id).await?;
    Ok("Transport type deleted successfully.".to_string())
}
