pub mod booking_service;
pub mod city_service;
pub mod route_service;
pub mod transport_type_service;
pub mod user_service;

pub use booking_service::*;
pub use city_service::*;
pub use route_service::*;
pub use transport_type_service::*;
pub use user_service::*;
