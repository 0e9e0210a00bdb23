pub mod bookings;
pub mod cities;
pub mod routes;
pub mod transport_types;
pub mod users;

pub use bookings::*;
pub use cities::*;
pub use routes::*;
pub use transport_types::*;
pub use users::*;
