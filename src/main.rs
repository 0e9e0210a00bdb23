use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod db;
mod error;
mod handlers;
mod models;
mod services;

use crate::config::Config;
use crate::db::DatabasePool;
use crate::services::{
    BookingService, CityService, RouteService, TransportTypeService, UserService,
};

pub type AppState = (
    Arc<CityService>,
    Arc<TransportTypeService>,
    Arc<RouteService>,
    Arc<UserService>,
    Arc<BookingService>,
);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "transit_booking_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Transit Booking server...");

    // Load configuration
    let config = Config::from_env()?;
    info!("Configuration loaded: {:?}", config);

    // Initialize database connection
    let db_pool = DatabasePool::new(&config).await?;
    info!("Database connection established");

    // Run migrations
    db_pool.migrate().await?;
    info!("Database migrations completed");

    // Initialize services
    let city_service = Arc::new(CityService::new(db_pool.clone()));
    let transport_type_service = Arc::new(TransportTypeService::new(db_pool.clone()));
    let route_service = Arc::new(RouteService::new(db_pool.clone()));
    let user_service = Arc::new(UserService::new(db_pool.clone()));
    let booking_service = Arc::new(BookingService::new(db_pool.clone()));

    // Create app state
    let app_state = (
        city_service,
        transport_type_service,
        route_service,
        user_service,
        booking_service,
    );

    let app = Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        // Booking routes
        .route("/bookings", get(handlers::list_bookings))
        .route("/bookings/createNewBooking", post(handlers::create_booking))
        .route("/bookings/user/:user_id", get(handlers::get_bookings_by_user))
        .route(
            "/bookings/:id",
            get(handlers::get_booking).delete(handlers::delete_booking),
        )
        // Route routes
        .route(
            "/routes",
            get(handlers::list_routes).post(handlers::create_route),
        )
        .route("/routes/paged", get(handlers::get_paged_routes))
        .route("/routes/startDate", get(handlers::get_routes_by_start_date))
        .route(
            "/routes/intervalDates",
            get(handlers::get_routes_by_date_interval),
        )
        .route("/routes/points", get(handlers::get_routes_by_points))
        .route("/routes/filteredRoutes", get(handlers::get_filtered_routes))
        .route(
            "/routes/transport/:transport_id",
            get(handlers::get_routes_by_transport),
        )
        .route(
            "/routes/:id",
            get(handlers::get_route)
                .put(handlers::update_route)
                .delete(handlers::delete_route),
        )
        // User routes
        .route("/users", get(handlers::list_users))
        .route("/users/createNewUser", post(handlers::create_user))
        .route("/users/login", get(handlers::login_user))
        .route(
            "/users/:id",
            get(handlers::get_user)
                .put(handlers::update_user)
                .delete(handlers::delete_user),
        )
        // City routes
        .route(
            "/cities",
            get(handlers::list_cities).post(handlers::create_city),
        )
        .route(
            "/cities/:id",
            get(handlers::get_city)
                .put(handlers::update_city)
                .delete(handlers::delete_city),
        )
        // Transport type routes
        .route(
            "/transport-types",
            get(handlers::list_transport_types).post(handlers::create_transport_type),
        )
        .route(
            "/transport-types/:id",
            get(handlers::get_transport_type)
                .put(handlers::update_transport_type)
                .delete(handlers::delete_transport_type),
        )
        .with_state(app_state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
                .allow_credentials(false),
        )
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr = SocketAddr::from((
        config.server.host.parse::<std::net::IpAddr>()?,
        config.server.port,
    ));
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn root() -> &'static str {
    "Transit Booking Server"
}

async fn health_check() -> &'static str {
    "OK"
}
