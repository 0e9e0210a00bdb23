use crate::db::DatabasePool;
use crate::error::{AppError, AppResult};
use crate::models::{City, CreateRouteRequest, Route, RoutesPageResponse, TransportType, UpdateRouteRequest};
use chrono::{Duration, Local, NaiveDate, NaiveDateTime};
use sqlx::Row;

// Shared projection for route queries; reference columns come back aliased so
// one row carries the transport type and both cities.
const ROUTE_SELECT: &str = r#"
    SELECT r.id_route, r.departure_date_time, r.arrival_date_time, r.price, r.available_seats,
           t.id_transport, t.transport_name,
           cd.id_city AS departure_city_id, cd.city_name AS departure_city_name,
           ca.id_city AS arrival_city_id, ca.city_name AS arrival_city_name
    FROM routes r
    INNER JOIN transport_types t ON r.id_transport = t.id_transport
    INNER JOIN cities cd ON r.id_city_departure = cd.id_city
    INNER JOIN cities ca ON r.id_city_arrival = ca.id_city
"#;

fn sqlite_datetime(value: NaiveDateTime) -> String {
    value.format("%Y-%m-%d %H:%M:%S").to_string()
}

fn parse_filter_date(value: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| AppError::BadRequest(format!("Invalid date value: {}", value)))
}

fn parse_datetime(value: &str) -> AppResult<NaiveDateTime> {
    value
        .parse::<NaiveDateTime>()
        .map_err(|_| AppError::BadRequest(format!("Invalid date-time value: {}", value)))
}

pub struct RouteService {
    db: DatabasePool,
}

impl RouteService {
    pub fn new(db: DatabasePool) -> Self {
        Self { db }
    }

    pub async fn create_route(&self, req: CreateRouteRequest) -> AppResult<Route> {
        let id = match &self.db {
            DatabasePool::Postgres(pool) => {
                let result = sqlx::query(
                    r#"
                    INSERT INTO routes (id_transport, id_city_departure, id_city_arrival,
                                        departure_date_time, arrival_date_time, price, available_seats)
                    VALUES ($1, $2, $3, $4, $5, $6, $7)
                    RETURNING id_route
                    "#,
                )
                .bind(&req.transport_type.id_transport)
                .bind(&req.departure_city.id_city)
                .bind(&req.arrival_city.id_city)
                .bind(req.departure_date_time)
                .bind(req.arrival_date_time)
                .bind(req.price)
                .bind(req.available_seats)
                .fetch_one(pool)
                .await?;

                result.get::<i64, _>("id_route")
            }
            DatabasePool::Sqlite(pool) => {
                let result = sqlx::query(
                    r#"
                    INSERT INTO routes (id_transport, id_city_departure, id_city_arrival,
                                        departure_date_time, arrival_date_time, price, available_seats)
                    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                    "#,
                )
                .bind(&req.transport_type.id_transport)
                .bind(&req.departure_city.id_city)
                .bind(&req.arrival_city.id_city)
                .bind(sqlite_datetime(req.departure_date_time))
                .bind(sqlite_datetime(req.arrival_date_time))
                .bind(req.price.to_string())
                .bind(req.available_seats)
                .execute(pool)
                .await?;

                result.last_insert_rowid()
            }
        };

        self.get_route(id).await?.ok_or_else(|| {
            AppError::InternalServerError("Failed to load created route".to_string())
        })
    }

    pub async fn get_route(&self, id: i64) -> AppResult<Option<Route>> {
        match &self.db {
            DatabasePool::Postgres(pool) => {
                let query = format!("{} WHERE r.id_route = $1", ROUTE_SELECT);
                let row = sqlx::query(&query).bind(id).fetch_optional(pool).await?;

                Ok(row.map(|row| self.row_to_route_postgres(row)))
            }
            DatabasePool::Sqlite(pool) => {
                let query = format!("{} WHERE r.id_route = ?1", ROUTE_SELECT);
                let row = sqlx::query(&query).bind(id).fetch_optional(pool).await?;

                Ok(row.map(|row| self.row_to_route(row)))
            }
        }
    }

    pub async fn get_all_routes(&self) -> AppResult<Vec<Route>> {
        match &self.db {
            DatabasePool::Postgres(pool) => {
                let query = format!("{} ORDER BY r.id_route", ROUTE_SELECT);
                let rows = sqlx::query(&query).fetch_all(pool).await?;

                Ok(rows
                    .into_iter()
                    .map(|row| self.row_to_route_postgres(row))
                    .collect())
            }
            DatabasePool::Sqlite(pool) => {
                let query = format!("{} ORDER BY r.id_route", ROUTE_SELECT);
                let rows = sqlx::query(&query).fetch_all(pool).await?;

                Ok(rows.into_iter().map(|row| self.row_to_route(row)).collect())
            }
        }
    }

    pub async fn update_route(&self, id: i64, req: UpdateRouteRequest) -> AppResult<Option<Route>> {
        if self.get_route(id).await?.is_none() {
            return Ok(None);
        }

        match &self.db {
            DatabasePool::Postgres(pool) => {
                sqlx::query(
                    r#"
                    UPDATE routes SET
                        id_transport = $2,
                        id_city_departure = $3,
                        id_city_arrival = $4,
                        departure_date_time = $5,
                        arrival_date_time = $6,
                        price = $7,
                        available_seats = $8
                    WHERE id_route = $1
                    "#,
                )
                .bind(id)
                .bind(&req.transport_type.id_transport)
                .bind(&req.departure_city.id_city)
                .bind(&req.arrival_city.id_city)
                .bind(req.departure_date_time)
                .bind(req.arrival_date_time)
                .bind(req.price)
                .bind(req.available_seats)
                .execute(pool)
                .await?;
            }
            DatabasePool::Sqlite(pool) => {
                sqlx::query(
                    r#"
                    UPDATE routes SET
                        id_transport = ?2,
                        id_city_departure = ?3,
                        id_city_arrival = ?4,
                        departure_date_time = ?5,
                        arrival_date_time = ?6,
                        price = ?7,
                        available_seats = ?8
                    WHERE id_route = ?1
                    "#,
                )
                .bind(id)
                .bind(&req.transport_type.id_transport)
                .bind(&req.departure_city.id_city)
                .bind(&req.arrival_city.id_city)
                .bind(sqlite_datetime(req.departure_date_time))
                .bind(sqlite_datetime(req.arrival_date_time))
                .bind(req.price.to_string())
                .bind(req.available_seats)
                .execute(pool)
                .await?;
            }
        }

        self.get_route(id).await
    }

    pub async fn delete_route(&self, id: i64) -> AppResult<()> {
        match &self.db {
            DatabasePool::Postgres(pool) => {
                let existing = sqlx::query("SELECT id_route FROM routes WHERE id_route = $1")
                    .bind(id)
                    .fetch_optional(pool)
                    .await?;
                if existing.is_none() {
                    return Err(AppError::NotFound("Route with this ID not found.".to_string()));
                }

                let count_row =
                    sqlx::query("SELECT COUNT(*) as count FROM bookings WHERE id_route = $1")
                        .bind(id)
                        .fetch_one(pool)
                        .await?;
                let bookings: i64 = count_row.get("count");
                if bookings > 0 {
                    return Err(AppError::Conflict(
                        "Cannot delete the route because it has active bookings.".to_string(),
                    ));
                }

                sqlx::query("DELETE FROM routes WHERE id_route = $1")
                    .bind(id)
                    .execute(pool)
                    .await?;
            }
            DatabasePool::Sqlite(pool) => {
                let existing = sqlx::query("SELECT id_route FROM routes WHERE id_route = ?1")
                    .bind(id)
                    .fetch_optional(pool)
                    .await?;
                if existing.is_none() {
                    return Err(AppError::NotFound("Route with this ID not found.".to_string()));
                }

                let count_row =
                    sqlx::query("SELECT COUNT(*) as count FROM bookings WHERE id_route = ?1")
                        .bind(id)
                        .fetch_one(pool)
                        .await?;
                let bookings: i64 = count_row.get("count");
                if bookings > 0 {
                    return Err(AppError::Conflict(
                        "Cannot delete the route because it has active bookings.".to_string(),
                    ));
                }

                sqlx::query("DELETE FROM routes WHERE id_route = ?1")
                    .bind(id)
                    .execute(pool)
                    .await?;
            }
        }

        Ok(())
    }

    // Upcoming departures only: anything that left more than four hours ago
    // is no longer offered. Pages are zero-based.
    pub async fn get_routes_paged(&self, page: u32, size: u32) -> AppResult<RoutesPageResponse> {
        let cutoff = Local::now().naive_local() - Duration::hours(4);
        let limit = size as i64;
        let offset = page as i64 * size as i64;

        let (routes, total) = match &self.db {
            DatabasePool::Postgres(pool) => {
                let query = format!(
                    "{} WHERE r.departure_date_time > $1 ORDER BY r.departure_date_time ASC LIMIT $2 OFFSET $3",
                    ROUTE_SELECT
                );
                let rows = sqlx::query(&query)
                    .bind(cutoff)
                    .bind(limit)
                    .bind(offset)
                    .fetch_all(pool)
                    .await?;

                let routes: Vec<Route> = rows
                    .into_iter()
                    .map(|row| self.row_to_route_postgres(row))
                    .collect();

                let count_row = sqlx::query(
                    "SELECT COUNT(*) as count FROM routes WHERE departure_date_time > $1",
                )
                .bind(cutoff)
                .fetch_one(pool)
                .await?;
                let total: i64 = count_row.get("count");

                (routes, total)
            }
            DatabasePool::Sqlite(pool) => {
                let cutoff = sqlite_datetime(cutoff);
                let query = format!(
                    "{} WHERE r.departure_date_time > ?1 ORDER BY r.departure_date_time ASC LIMIT ?2 OFFSET ?3",
                    ROUTE_SELECT
                );
                let rows = sqlx::query(&query)
                    .bind(&cutoff)
                    .bind(limit)
                    .bind(offset)
                    .fetch_all(pool)
                    .await?;

                let routes: Vec<Route> =
                    rows.into_iter().map(|row| self.row_to_route(row)).collect();

                let count_row = sqlx::query(
                    "SELECT COUNT(*) as count FROM routes WHERE departure_date_time > ?1",
                )
                .bind(&cutoff)
                .fetch_one(pool)
                .await?;
                let total: i64 = count_row.get("count");

                (routes, total)
            }
        };

        Ok(RoutesPageResponse {
            routes,
            total,
            page,
            size,
        })
    }

    pub async fn get_routes_by_transport_type(&self, transport_id: &str) -> AppResult<Vec<Route>> {
        match &self.db {
            DatabasePool::Postgres(pool) => {
                let query = format!("{} WHERE r.id_transport = $1 ORDER BY r.id_route", ROUTE_SELECT);
                let rows = sqlx::query(&query).bind(transport_id).fetch_all(pool).await?;

                Ok(rows
                    .into_iter()
                    .map(|row| self.row_to_route_postgres(row))
                    .collect())
            }
            DatabasePool::Sqlite(pool) => {
                let query = format!("{} WHERE r.id_transport = ?1 ORDER BY r.id_route", ROUTE_SELECT);
                let rows = sqlx::query(&query).bind(transport_id).fetch_all(pool).await?;

                Ok(rows.into_iter().map(|row| self.row_to_route(row)).collect())
            }
        }
    }

    pub async fn get_routes_by_departure_date(&self, start_date: &str) -> AppResult<Vec<Route>> {
        let instant = parse_datetime(start_date)?;

        match &self.db {
            DatabasePool::Postgres(pool) => {
                let query = format!("{} WHERE r.departure_date_time = $1", ROUTE_SELECT);
                let rows = sqlx::query(&query).bind(instant).fetch_all(pool).await?;

                Ok(rows
                    .into_iter()
                    .map(|row| self.row_to_route_postgres(row))
                    .collect())
            }
            DatabasePool::Sqlite(pool) => {
                let query = format!("{} WHERE r.departure_date_time = ?1", ROUTE_SELECT);
                let rows = sqlx::query(&query)
                    .bind(sqlite_datetime(instant))
                    .fetch_all(pool)
                    .await?;

                Ok(rows.into_iter().map(|row| self.row_to_route(row)).collect())
            }
        }
    }

    pub async fn get_routes_by_date_interval(
        &self,
        date_one: &str,
        date_two: &str,
    ) -> AppResult<Vec<Route>> {
        let from = parse_datetime(date_one)?;
        let to = parse_datetime(date_two)?;

        match &self.db {
            DatabasePool::Postgres(pool) => {
                let query = format!(
                    "{} WHERE r.departure_date_time BETWEEN $1 AND $2 ORDER BY r.departure_date_time",
                    ROUTE_SELECT
                );
                let rows = sqlx::query(&query).bind(from).bind(to).fetch_all(pool).await?;

                Ok(rows
                    .into_iter()
                    .map(|row| self.row_to_route_postgres(row))
                    .collect())
            }
            DatabasePool::Sqlite(pool) => {
                let query = format!(
                    "{} WHERE r.departure_date_time BETWEEN ?1 AND ?2 ORDER BY r.departure_date_time",
                    ROUTE_SELECT
                );
                let rows = sqlx::query(&query)
                    .bind(sqlite_datetime(from))
                    .bind(sqlite_datetime(to))
                    .fetch_all(pool)
                    .await?;

                Ok(rows.into_iter().map(|row| self.row_to_route(row)).collect())
            }
        }
    }

    pub async fn get_routes_by_cities(
        &self,
        departure_city_id: &str,
        arrival_city_id: &str,
    ) -> AppResult<Vec<Route>> {
        match &self.db {
            DatabasePool::Postgres(pool) => {
                let query = format!(
                    "{} WHERE r.id_city_departure = $1 AND r.id_city_arrival = $2 ORDER BY r.id_route",
                    ROUTE_SELECT
                );
                let rows = sqlx::query(&query)
                    .bind(departure_city_id)
                    .bind(arrival_city_id)
                    .fetch_all(pool)
                    .await?;

                Ok(rows
                    .into_iter()
                    .map(|row| self.row_to_route_postgres(row))
                    .collect())
            }
            DatabasePool::Sqlite(pool) => {
                let query = format!(
                    "{} WHERE r.id_city_departure = ?1 AND r.id_city_arrival = ?2 ORDER BY r.id_route",
                    ROUTE_SELECT
                );
                let rows = sqlx::query(&query)
                    .bind(departure_city_id)
                    .bind(arrival_city_id)
                    .fetch_all(pool)
                    .await?;

                Ok(rows.into_iter().map(|row| self.row_to_route(row)).collect())
            }
        }
    }

    // Conjunctive filter over the full route set, applied in a fixed order:
    // departure city, arrival city, transport type, then either an exact
    // calendar date or a complete date range. Without a date the result is
    // empty by contract.
    pub async fn get_filtered_routes(
        &self,
        departure_city_id: Option<&str>,
        arrival_city_id: Option<&str>,
        transport_id: Option<&str>,
        start_date: Option<&str>,
        date_one: Option<&str>,
        date_two: Option<&str>,
    ) -> AppResult<Vec<Route>> {
        let mut routes = self.get_all_routes().await?;

        if let Some(city) = departure_city_id.filter(|v| !v.is_empty()) {
            routes.retain(|route| route.departure_city.id_city == city);
        }
        if let Some(city) = arrival_city_id.filter(|v| !v.is_empty()) {
            routes.retain(|route| route.arrival_city.id_city == city);
        }
        if let Some(transport) = transport_id.filter(|v| !v.is_empty()) {
            routes.retain(|route| route.transport_type.id_transport == transport);
        }

        let start_date = start_date.filter(|v| !v.is_empty());
        let date_one = date_one.filter(|v| !v.is_empty());
        let date_two = date_two.filter(|v| !v.is_empty());

        if let Some(value) = start_date {
            let date = parse_filter_date(value)?;
            routes.retain(|route| route.departure_date_time.date() == date);
        } else if let (Some(one), Some(two)) = (date_one, date_two) {
            let from = parse_filter_date(one)?;
            let to = parse_filter_date(two)?;
            routes.retain(|route| {
                let date = route.departure_date_time.date();
                date >= from && date <= to
            });
        } else {
            return Ok(Vec::new());
        }

        Ok(routes)
    }

    fn row_to_route(&self, row: sqlx::sqlite::SqliteRow) -> Route {
        let price: String = row.get("price");
        Route {
            id_route: row.get("id_route"),
            transport_type: TransportType {
                id_transport: row.get("id_transport"),
                transport_name: row.get("transport_name"),
            },
            departure_city: City {
                id_city: row.get("departure_city_id"),
                city_name: row.get("departure_city_name"),
            },
            arrival_city: City {
                id_city: row.get("arrival_city_id"),
                city_name: row.get("arrival_city_name"),
            },
            departure_date_time: row.get("departure_date_time"),
            arrival_date_time: row.get("arrival_date_time"),
            price: price.parse().unwrap_or_default(),
            available_seats: row.get("available_seats"),
        }
    }

    fn row_to_route_postgres(&self, row: sqlx::postgres::PgRow) -> Route {
        Route {
            id_route: row.get("id_route"),
            transport_type: TransportType {
                id_transport: row.get("id_transport"),
                transport_name: row.get("transport_name"),
            },
            departure_city: City {
                id_city: row.get("departure_city_id"),
                city_name: row.get("departure_city_name"),
            },
            arrival_city: City {
                id_city: row.get("arrival_city_id"),
                city_name: row.get("arrival_city_name"),
            },
            departure_date_time: row.get("departure_date_time"),
            arrival_date_time: row.get("arrival_date_time"),
            price: row.get("price"),
            available_seats: row.get("available_seats"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        CityRef, CreateCityRequest, CreateTransportTypeRequest, CreateUserRequest,
        TransportTypeRef,
    };
    use crate::services::{BookingService, CityService, TransportTypeService, UserService};
    use rust_decimal::Decimal;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn test_db() -> DatabasePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        let db = DatabasePool::Sqlite(pool);
        db.migrate().await.unwrap();
        db
    }

    async fn seed_reference_data(db: &DatabasePool) {
        let cities = CityService::new(db.clone());
        for (id, name) in [
            ("MOW", "Moscow"),
            ("LED", "Saint Petersburg"),
            ("KZN", "Kazan"),
        ] {
            cities
                .create_city(CreateCityRequest {
                    id_city: id.to_string(),
                    city_name: name.to_string(),
                })
                .await
                .unwrap();
        }

        let transport_types = TransportTypeService::new(db.clone());
        for (id, name) in [("BUS", "Bus"), ("TRAIN", "Train")] {
            transport_types
                .create_transport_type(CreateTransportTypeRequest {
                    id_transport: id.to_string(),
                    transport_name: name.to_string(),
                })
                .await
                .unwrap();
        }
    }

    fn dt(value: &str) -> NaiveDateTime {
        value.parse().unwrap()
    }

    fn route_request(
        transport: &str,
        from: &str,
        to: &str,
        departure: NaiveDateTime,
        seats: i32,
    ) -> CreateRouteRequest {
        CreateRouteRequest {
            transport_type: TransportTypeRef {
                id_transport: transport.to_string(),
            },
            departure_city: CityRef {
                id_city: from.to_string(),
            },
            arrival_city: CityRef {
                id_city: to.to_string(),
            },
            departure_date_time: departure,
            arrival_date_time: departure + Duration::hours(6),
            price: Decimal::new(125050, 2),
            available_seats: seats,
        }
    }

    #[tokio::test]
    async fn test_create_and_get_route() {
        let db = test_db().await;
        seed_reference_data(&db).await;
        let service = RouteService::new(db);

        let created = service
            .create_route(route_request("BUS", "MOW", "LED", dt("2030-05-01T10:00:00"), 40))
            .await
            .unwrap();
        assert_eq!(created.transport_type.transport_name, "Bus");
        assert_eq!(created.departure_city.city_name, "Moscow");
        assert_eq!(created.arrival_city.city_name, "Saint Petersburg");
        assert_eq!(created.price, Decimal::new(125050, 2));
        assert_eq!(created.available_seats, 40);

        let fetched = service.get_route(created.id_route).await.unwrap().unwrap();
        assert_eq!(fetched.departure_date_time, dt("2030-05-01T10:00:00"));
        assert_eq!(fetched.arrival_date_time, dt("2030-05-01T16:00:00"));
        assert_eq!(fetched.price, Decimal::new(125050, 2));
    }

    #[tokio::test]
    async fn test_get_missing_route_is_none() {
        let service = RouteService::new(test_db().await);
        assert!(service.get_route(9000).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_route_replaces_all_fields() {
        let db = test_db().await;
        seed_reference_data(&db).await;
        let service = RouteService::new(db);

        let created = service
            .create_route(route_request("BUS", "MOW", "LED", dt("2030-05-01T10:00:00"), 40))
            .await
            .unwrap();

        let updated = service
            .update_route(
                created.id_route,
                UpdateRouteRequest {
                    transport_type: TransportTypeRef {
                        id_transport: "TRAIN".to_string(),
                    },
                    departure_city: CityRef {
                        id_city: "MOW".to_string(),
                    },
                    arrival_city: CityRef {
                        id_city: "KZN".to_string(),
                    },
                    departure_date_time: dt("2030-05-02T08:30:00"),
                    arrival_date_time: dt("2030-05-02T20:30:00"),
                    price: Decimal::new(99900, 2),
                    available_seats: 12,
                },
            )
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.transport_type.id_transport, "TRAIN");
        assert_eq!(updated.arrival_city.city_name, "Kazan");
        assert_eq!(updated.departure_date_time, dt("2030-05-02T08:30:00"));
        assert_eq!(updated.price, Decimal::new(99900, 2));
        assert_eq!(updated.available_seats, 12);
    }

    #[tokio::test]
    async fn test_update_missing_route_returns_none() {
        let db = test_db().await;
        seed_reference_data(&db).await;
        let service = RouteService::new(db);

        let updated = service
            .update_route(
                9000,
                UpdateRouteRequest {
                    transport_type: TransportTypeRef {
                        id_transport: "BUS".to_string(),
                    },
                    departure_city: CityRef {
                        id_city: "MOW".to_string(),
                    },
                    arrival_city: CityRef {
                        id_city: "LED".to_string(),
                    },
                    departure_date_time: dt("2030-05-01T10:00:00"),
                    arrival_date_time: dt("2030-05-01T16:00:00"),
                    price: Decimal::new(125050, 2),
                    available_seats: 40,
                },
            )
            .await
            .unwrap();
        assert!(updated.is_none());
    }

    #[tokio::test]
    async fn test_delete_missing_route_is_not_found() {
        let service = RouteService::new(test_db().await);
        let err = service.delete_route(9000).await.unwrap_err();
        match err {
            AppError::NotFound(msg) => assert_eq!(msg, "Route with this ID not found."),
            other => panic!("expected not found, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_delete_route_with_bookings_is_conflict() {
        let db = test_db().await;
        seed_reference_data(&db).await;

        let users = UserService::new(db.clone());
        let user = users
            .create_user(CreateUserRequest {
                login: "traveler".to_string(),
                password: "secret123".to_string(),
                phone_number: "+79991234567".to_string(),
                user_name: "Ivan".to_string(),
                user_surname: "Petrov".to_string(),
                user_patronymic: String::new(),
            })
            .await
            .unwrap();

        let routes = RouteService::new(db.clone());
        let route = routes
            .create_route(route_request("BUS", "MOW", "LED", dt("2030-05-01T10:00:00"), 5))
            .await
            .unwrap();

        let bookings = BookingService::new(db.clone());
        let booking = bookings
            .create_booking(
                route.id_route,
                user.id_user,
                "2030-04-30T12:00:00",
                false,
                0,
                0,
            )
            .await
            .unwrap();

        let err = routes.delete_route(route.id_route).await.unwrap_err();
        match err {
            AppError::Conflict(msg) => {
                assert_eq!(msg, "Cannot delete the route because it has active bookings.")
            }
            other => panic!("expected conflict, got {other:?}"),
        }

        bookings.delete_booking(booking.id_booking).await.unwrap();
        routes.delete_route(route.id_route).await.unwrap();
        assert!(routes.get_route(route.id_route).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_paged_keeps_upcoming_routes_in_departure_order() {
        let db = test_db().await;
        seed_reference_data(&db).await;
        let service = RouteService::new(db);

        let now = Local::now().naive_local();
        // Departed six hours ago: outside the four-hour grace window.
        service
            .create_route(route_request("BUS", "MOW", "LED", now - Duration::hours(6), 40))
            .await
            .unwrap();
        let recent = service
            .create_route(route_request("BUS", "MOW", "KZN", now - Duration::hours(2), 40))
            .await
            .unwrap();
        let later = service
            .create_route(route_request("TRAIN", "LED", "KZN", now + Duration::hours(2), 40))
            .await
            .unwrap();
        let soon = service
            .create_route(route_request("BUS", "KZN", "MOW", now + Duration::hours(1), 40))
            .await
            .unwrap();

        let page = service.get_routes_paged(0, 10).await.unwrap();
        assert_eq!(page.total, 3);
        let ids: Vec<i64> = page.routes.iter().map(|r| r.id_route).collect();
        assert_eq!(ids, vec![recent.id_route, soon.id_route, later.id_route]);
    }

    #[tokio::test]
    async fn test_paged_slices_by_page_and_size() {
        let db = test_db().await;
        seed_reference_data(&db).await;
        let service = RouteService::new(db);

        let now = Local::now().naive_local();
        for hours in [1, 2, 3] {
            service
                .create_route(route_request(
                    "BUS",
                    "MOW",
                    "LED",
                    now + Duration::hours(hours),
                    40,
                ))
                .await
                .unwrap();
        }

        let page = service.get_routes_paged(1, 1).await.unwrap();
        assert_eq!(page.total, 3);
        assert_eq!(page.routes.len(), 1);
        assert_eq!(page.page, 1);
        assert_eq!(page.size, 1);
        let all = service.get_routes_paged(0, 10).await.unwrap();
        assert_eq!(page.routes[0].id_route, all.routes[1].id_route);
    }

    #[tokio::test]
    async fn test_filter_without_date_is_empty() {
        let db = test_db().await;
        seed_reference_data(&db).await;
        let service = RouteService::new(db);

        service
            .create_route(route_request("BUS", "MOW", "LED", dt("2030-05-01T10:00:00"), 40))
            .await
            .unwrap();

        let filtered = service
            .get_filtered_routes(Some("MOW"), None, None, None, None, None)
            .await
            .unwrap();
        assert!(filtered.is_empty());

        // A half-open range does not count as a date either.
        let filtered = service
            .get_filtered_routes(Some("MOW"), None, None, None, Some("2030-05-01"), None)
            .await
            .unwrap();
        assert!(filtered.is_empty());
    }

    #[tokio::test]
    async fn test_filter_by_cities_transport_and_exact_date() {
        let db = test_db().await;
        seed_reference_data(&db).await;
        let service = RouteService::new(db);

        let bus = service
            .create_route(route_request("BUS", "MOW", "LED", dt("2030-05-01T10:00:00"), 40))
            .await
            .unwrap();
        service
            .create_route(route_request("TRAIN", "MOW", "LED", dt("2030-05-01T11:00:00"), 40))
            .await
            .unwrap();
        service
            .create_route(route_request("BUS", "MOW", "LED", dt("2030-05-02T10:00:00"), 40))
            .await
            .unwrap();
        service
            .create_route(route_request("BUS", "MOW", "KZN", dt("2030-05-01T12:00:00"), 40))
            .await
            .unwrap();

        let filtered = service
            .get_filtered_routes(
                Some("MOW"),
                Some("LED"),
                Some("BUS"),
                Some("2030-05-01"),
                None,
                None,
            )
            .await
            .unwrap();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].id_route, bus.id_route);
    }

    #[tokio::test]
    async fn test_filter_by_date_range_is_inclusive() {
        let db = test_db().await;
        seed_reference_data(&db).await;
        let service = RouteService::new(db);

        for day in ["01", "03", "05"] {
            service
                .create_route(route_request(
                    "BUS",
                    "MOW",
                    "LED",
                    dt(&format!("2030-05-{day}T10:00:00")),
                    40,
                ))
                .await
                .unwrap();
        }

        let filtered = service
            .get_filtered_routes(None, None, None, None, Some("2030-05-01"), Some("2030-05-03"))
            .await
            .unwrap();
        assert_eq!(filtered.len(), 2);
    }

    #[tokio::test]
    async fn test_search_by_departure_instant() {
        let db = test_db().await;
        seed_reference_data(&db).await;
        let service = RouteService::new(db);

        let exact = service
            .create_route(route_request("BUS", "MOW", "LED", dt("2030-05-01T10:00:00"), 40))
            .await
            .unwrap();
        service
            .create_route(route_request("BUS", "MOW", "LED", dt("2030-05-01T10:30:00"), 40))
            .await
            .unwrap();

        let found = service
            .get_routes_by_departure_date("2030-05-01T10:00:00")
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id_route, exact.id_route);

        let err = service
            .get_routes_by_departure_date("May 1st 2030")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_search_by_date_interval_includes_bounds() {
        let db = test_db().await;
        seed_reference_data(&db).await;
        let service = RouteService::new(db);

        for time in ["08:00:00", "12:00:00", "18:00:00"] {
            service
                .create_route(route_request(
                    "BUS",
                    "MOW",
                    "LED",
                    dt(&format!("2030-05-01T{time}")),
                    40,
                ))
                .await
                .unwrap();
        }

        let found = service
            .get_routes_by_date_interval("2030-05-01T08:00:00", "2030-05-01T12:00:00")
            .await
            .unwrap();
        assert_eq!(found.len(), 2);
    }

    #[tokio::test]
    async fn test_search_by_cities_and_transport() {
        let db = test_db().await;
        seed_reference_data(&db).await;
        let service = RouteService::new(db);

        service
            .create_route(route_request("BUS", "MOW", "LED", dt("2030-05-01T10:00:00"), 40))
            .await
            .unwrap();
        service
            .create_route(route_request("TRAIN", "LED", "MOW", dt("2030-05-01T11:00:00"), 40))
            .await
            .unwrap();

        let by_cities = service.get_routes_by_cities("MOW", "LED").await.unwrap();
        assert_eq!(by_cities.len(), 1);
        assert_eq!(by_cities[0].transport_type.id_transport, "BUS");

        let by_transport = service.get_routes_by_transport_type("TRAIN").await.unwrap();
        assert_eq!(by_transport.len(), 1);
        assert_eq!(by_transport[0].departure_city.id_city, "LED");

        let none = service.get_routes_by_transport_type("PLANE").await.unwrap();
        assert!(none.is_empty());
    }
}
