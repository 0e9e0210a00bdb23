use axum::{
    extract::{Path, Query, State},
    Form, Json,
};
use serde::Deserialize;

use crate::error::AppResult;
use crate::models::{CreateUserRequest, UpdateUserRequest, User};

#[derive(Deserialize)]
pub struct LoginParams {
    pub login: String,
    pub password: String,
}

pub async fn list_users(
    State((_city_service, _transport_type_service, _route_service, user_service, _booking_service)): State<crate::AppState>,
) -> AppResult<Json<Vec<User>>> {
    let users = user_service.get_all_users().await?;
    Ok(Json(users))
}

pub async fn get_user(
    State((_city_service, _transport_type_service, _route_service, user_service, _booking_service)): State<crate::AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Option<User>>> {
    let user = user_service.get_user(id).await?;
    Ok(Json(user))
}

pub async fn create_user(
    State((_city_service, _transport_type_service, _route_service, user_service, _booking_service)): State<crate::AppState>,
    Form(req): Form<CreateUserRequest>,
) -> AppResult<Json<User>> {
    let user = user_service.create_user(req).await?;
    Ok(Json(user))
}

pub async fn update_user(
    State((_city_service, _transport_type_service, _route_service, user_service, _booking_service)): State<crate::AppState>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateUserRequest>,
) -> AppResult<Json<User>> {
    let user = user_service.update_user(id, req).await?;
    Ok(Json(user))
}

pub async fn delete_user(
    State((_city_service, _transport_type_service, _route_service, user_service, _booking_service)): State<crate::AppState>,
    Path(id): Path<i64>,
) -> AppResult<String> {
    user_service.delete_user(id).await?;
    Ok("User deleted successfully.".to_string())
}

pub async fn login_user(
    State((_city_service, _transport_type_service, _route_service, user_service, _booking_service)): State<crate::AppState>,
    Query(params): Query<LoginParams>,
) -> AppResult<Json<User>> {
    let user = user_service
        .authenticate_user(&params.login, &params.password)
        .await?;
    Ok(Json(user))
}
