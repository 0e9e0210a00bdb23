use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::{Route, User};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id_booking: i64,
    pub route: Route,
    pub user: User,
    pub booking_date_time: NaiveDateTime,
    pub with_baggage: bool,
    pub with_child: i32,
    pub with_pet: i32,
}
