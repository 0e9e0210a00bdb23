pub mod booking;
pub mod city;
pub mod route;
pub mod transport_type;
pub mod user;

pub use booking::*;
pub use city::*;
pub use route::*;
pub use transport_type::*;
pub use user::*;
