use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{City, TransportType};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Route {
    pub id_route: i64,
    pub transport_type: TransportType,
    pub departure_city: City,
    pub arrival_city: City,
    pub departure_date_time: NaiveDateTime,
    pub arrival_date_time: NaiveDateTime,
    pub price: Decimal,
    pub available_seats: i32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransportTypeRef {
    pub id_transport: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CityRef {
    pub id_city: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateRouteRequest {
    pub transport_type: TransportTypeRef,
    pub departure_city: CityRef,
    pub arrival_city: CityRef,
    pub departure_date_time: NaiveDateTime,
    pub arrival_date_time: NaiveDateTime,
    pub price: Decimal,
    #[validate(range(min = 0))]
    pub available_seats: i32,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRouteRequest {
    pub transport_type: TransportTypeRef,
    pub departure_city: CityRef,
    pub arrival_city: CityRef,
    pub departure_date_time: NaiveDateTime,
    pub arrival_date_time: NaiveDateTime,
    pub price: Decimal,
    #[validate(range(min = 0))]
    pub available_seats: i32,
}

#[derive(Debug, Serialize)]
pub struct RoutesPageResponse {
    pub routes: Vec<Route>,
    pub total: i64,
    pub page: u32,
    pub size: u32,
}
