use crate::db::DatabasePool;
use crate::error::{AppError, AppResult};
use crate::models::{Booking, City, Route, TransportType, User};
use chrono::NaiveDateTime;
use sqlx::Row;

const BOOKING_SELECT: &str = r#"
    SELECT b.id_booking, b.booking_date_time, b.with_baggage, b.with_child, b.with_pet,
           r.id_route, r.departure_date_time, r.arrival_date_time, r.price, r.available_seats,
           t.id_transport, t.transport_name,
           cd.id_city AS departure_city_id, cd.city_name AS departure_city_name,
           ca.id_city AS arrival_city_id, ca.city_name AS arrival_city_name,
           u.id_user, u.user_login, u.password, u.phone_number, u.user_name, u.user_surname, u.user_patronymic
    FROM bookings b
    INNER JOIN routes r ON b.id_route = r.id_route
    INNER JOIN transport_types t ON r.id_transport = t.id_transport
    INNER JOIN cities cd ON r.id_city_departure = cd.id_city
    INNER JOIN cities ca ON r.id_city_arrival = ca.id_city
    INNER JOIN users u ON b.id_user = u.id_user
"#;

const BOOKING_DATE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

const INVALID_DATE_TIME: &str =
    "Invalid date and time format. Expected yyyy-MM-dd'T'HH:mm:ss (for example, 2025-04-12T22:39:46).";

fn sqlite_datetime(value: NaiveDateTime) -> String {
    value.format("%Y-%m-%d %H:%M:%S").to_string()
}

fn capacity_error(with_child: i32) -> AppError {
    if with_child > 0 {
        AppError::Conflict("Not enough seats for a booking with children.".to_string())
    } else {
        AppError::Conflict("No seats available for booking.".to_string())
    }
}

pub struct BookingService {
    db: DatabasePool,
}

impl BookingService {
    pub fn new(db: DatabasePool) -> Self {
        Self { db }
    }

    pub async fn get_all_bookings(&self) -> AppResult<Vec<Booking>> {
        match &self.db {
            DatabasePool::Postgres(pool) => {
                let query = format!("{} ORDER BY b.id_booking", BOOKING_SELECT);
                let rows = sqlx::query(&query).fetch_all(pool).await?;

                Ok(rows
                    .into_iter()
                    .map(|row| self.row_to_booking_postgres(row))
                    .collect())
            }
            DatabasePool::Sqlite(pool) => {
                let query = format!("{} ORDER BY b.id_booking", BOOKING_SELECT);
                let rows = sqlx::query(&query).fetch_all(pool).await?;

                Ok(rows
                    .into_iter()
                    .map(|row| self.row_to_booking(row))
                    .collect())
            }
        }
    }

    pub async fn get_booking(&self, id: i64) -> AppResult<Option<Booking>> {
        match &self.db {
            DatabasePool::Postgres(pool) => {
                let query = format!("{} WHERE b.id_booking = $1", BOOKING_SELECT);
                let row = sqlx::query(&query).bind(id).fetch_optional(pool).await?;

                Ok(row.map(|row| self.row_to_booking_postgres(row)))
            }
            DatabasePool::Sqlite(pool) => {
                let query = format!("{} WHERE b.id_booking = ?1", BOOKING_SELECT);
                let row = sqlx::query(&query).bind(id).fetch_optional(pool).await?;

                Ok(row.map(|row| self.row_to_booking(row)))
            }
        }
    }

    pub async fn get_bookings_by_user(&self, user_id: i64) -> AppResult<Vec<Booking>> {
        match &self.db {
            DatabasePool::Postgres(pool) => {
                let user = sqlx::query("SELECT id_user FROM users WHERE id_user = $1")
                    .bind(user_id)
                    .fetch_optional(pool)
                    .await?;
                if user.is_none() {
                    return Err(AppError::NotFound("User with this ID not found.".to_string()));
                }

                let query = format!("{} WHERE b.id_user = $1 ORDER BY b.id_booking", BOOKING_SELECT);
                let rows = sqlx::query(&query).bind(user_id).fetch_all(pool).await?;

                Ok(rows
                    .into_iter()
                    .map(|row| self.row_to_booking_postgres(row))
                    .collect())
            }
            DatabasePool::Sqlite(pool) => {
                let user = sqlx::query("SELECT id_user FROM users WHERE id_user = ?1")
                    .bind(user_id)
                    .fetch_optional(pool)
                    .await?;
                if user.is_none() {
                    return Err(AppError::NotFound("User with this ID not found.".to_string()));
                }

                let query = format!("{} WHERE b.id_user = ?1 ORDER BY b.id_booking", BOOKING_SELECT);
                let rows = sqlx::query(&query).bind(user_id).fetch_all(pool).await?;

                Ok(rows
                    .into_iter()
                    .map(|row| self.row_to_booking(row))
                    .collect())
            }
        }
    }

    // The checks run in a fixed order so the caller always sees the first
    // violated rule. One booking consumes 1 + with_child seats. The lookup,
    // the guarded decrement and the insert share one transaction; a guard
    // miss rolls everything back.
    pub async fn create_booking(
        &self,
        route_id: i64,
        user_id: i64,
        booking_date_time: &str,
        with_baggage: bool,
        with_child: i32,
        with_pet: i32,
    ) -> AppResult<Booking> {
        if booking_date_time.trim().is_empty() {
            return Err(AppError::BadRequest("Fill in all fields!".to_string()));
        }
        if !(0..=3).contains(&with_child) {
            return Err(AppError::BadRequest(
                "Number of children must be between 0 and 3.".to_string(),
            ));
        }
        if !(0..=3).contains(&with_pet) {
            return Err(AppError::BadRequest(
                "Number of pets must be between 0 and 3.".to_string(),
            ));
        }

        let seats_needed = 1 + with_child;

        let id = match &self.db {
            DatabasePool::Postgres(pool) => {
                let mut tx = pool.begin().await?;

                let route = sqlx::query("SELECT available_seats FROM routes WHERE id_route = $1")
                    .bind(route_id)
                    .fetch_optional(&mut *tx)
                    .await?
                    .ok_or_else(|| {
                        AppError::NotFound("Route with this ID not found.".to_string())
                    })?;
                let available_seats: i32 = route.get("available_seats");

                let user = sqlx::query("SELECT id_user FROM users WHERE id_user = $1")
                    .bind(user_id)
                    .fetch_optional(&mut *tx)
                    .await?;
                if user.is_none() {
                    return Err(AppError::NotFound("User with this ID not found.".to_string()));
                }

                if available_seats <= 0 {
                    return Err(AppError::Conflict(
                        "No seats available for booking.".to_string(),
                    ));
                }
                if available_seats < seats_needed {
                    return Err(AppError::Conflict(
                        "Not enough seats for a booking with children.".to_string(),
                    ));
                }

                let parsed =
                    NaiveDateTime::parse_from_str(booking_date_time, BOOKING_DATE_TIME_FORMAT)
                        .map_err(|_| AppError::BadRequest(INVALID_DATE_TIME.to_string()))?;

                let updated = sqlx::query(
                    r#"
                    UPDATE routes SET available_seats = available_seats - $1
                    WHERE id_route = $2 AND available_seats >= $1
                    "#,
                )
                .bind(seats_needed)
                .bind(route_id)
                .execute(&mut *tx)
                .await?;
                if updated.rows_affected() == 0 {
                    return Err(capacity_error(with_child));
                }

                let result = sqlx::query(
                    r#"
                    INSERT INTO bookings (id_route, id_user, booking_date_time, with_baggage, with_child, with_pet)
                    VALUES ($1, $2, $3, $4, $5, $6)
                    RETURNING id_booking
                    "#,
                )
                .bind(route_id)
                .bind(user_id)
                .bind(parsed)
                .bind(with_baggage)
                .bind(with_child)
                .bind(with_pet)
                .fetch_one(&mut *tx)
                .await?;
                let id: i64 = result.get("id_booking");

                tx.commit().await?;
                id
            }
            DatabasePool::Sqlite(pool) => {
                let mut tx = pool.begin().await?;

                let route = sqlx::query("SELECT available_seats FROM routes WHERE id_route = ?1")
                    .bind(route_id)
                    .fetch_optional(&mut *tx)
                    .await?
                    .ok_or_else(|| {
                        AppError::NotFound("Route with this ID not found.".to_string())
                    })?;
                let available_seats: i32 = route.get("available_seats");

                let user = sqlx::query("SELECT id_user FROM users WHERE id_user = ?1")
                    .bind(user_id)
                    .fetch_optional(&mut *tx)
                    .await?;
                if user.is_none() {
                    return Err(AppError::NotFound("User with this ID not found.".to_string()));
                }

                if available_seats <= 0 {
                    return Err(AppError::Conflict(
                        "No seats available for booking.".to_string(),
                    ));
                }
                if available_seats < seats_needed {
                    return Err(AppError::Conflict(
                        "Not enough seats for a booking with children.".to_string(),
                    ));
                }

                let parsed =
                    NaiveDateTime::parse_from_str(booking_date_time, BOOKING_DATE_TIME_FORMAT)
                        .map_err(|_| AppError::BadRequest(INVALID_DATE_TIME.to_string()))?;

                let updated = sqlx::query(
                    r#"
                    UPDATE routes SET available_seats = available_seats - ?1
                    WHERE id_route = ?2 AND available_seats >= ?1
                    "#,
                )
                .bind(seats_needed)
                .bind(route_id)
                .execute(&mut *tx)
                .await?;
                if updated.rows_affected() == 0 {
                    return Err(capacity_error(with_child));
                }

                let result = sqlx::query(
                    r#"
                    INSERT INTO bookings (id_route, id_user, booking_date_time, with_baggage, with_child, with_pet)
                    VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                    "#,
                )
                .bind(route_id)
                .bind(user_id)
                .bind(sqlite_datetime(parsed))
                .bind(with_baggage)
                .bind(with_child)
                .bind(with_pet)
                .execute(&mut *tx)
                .await?;
                let id = result.last_insert_rowid();

                tx.commit().await?;
                id
            }
        };

        self.get_booking(id).await?.ok_or_else(|| {
            AppError::InternalServerError("Failed to load created booking".to_string())
        })
    }

    // Deletion returns the consumed seats (base seat plus child seats) to the
    // route before removing the record, in one transaction.
    pub async fn delete_booking(&self, id: i64) -> AppResult<()> {
        match &self.db {
            DatabasePool::Postgres(pool) => {
                let mut tx = pool.begin().await?;

                let booking =
                    sqlx::query("SELECT id_route, with_child FROM bookings WHERE id_booking = $1")
                        .bind(id)
                        .fetch_optional(&mut *tx)
                        .await?
                        .ok_or_else(|| {
                            AppError::NotFound("Booking with this ID not found.".to_string())
                        })?;
                let route_id: i64 = booking.get("id_route");
                let with_child: i32 = booking.get("with_child");

                sqlx::query(
                    "UPDATE routes SET available_seats = available_seats + $1 WHERE id_route = $2",
                )
                .bind(1 + with_child)
                .bind(route_id)
                .execute(&mut *tx)
                .await?;

                sqlx::query("DELETE FROM bookings WHERE id_booking = $1")
                    .bind(id)
                    .execute(&mut *tx)
                    .await?;

                tx.commit().await?;
            }
            DatabasePool::Sqlite(pool) => {
                let mut tx = pool.begin().await?;

                let booking =
                    sqlx::query("SELECT id_route, with_child FROM bookings WHERE id_booking = ?1")
                        .bind(id)
                        .fetch_optional(&mut *tx)
                        .await?
                        .ok_or_else(|| {
                            AppError::NotFound("Booking with this ID not found.".to_string())
                        })?;
                let route_id: i64 = booking.get("id_route");
                let with_child: i32 = booking.get("with_child");

                sqlx::query(
                    "UPDATE routes SET available_seats = available_seats + ?1 WHERE id_route = ?2",
                )
                .bind(1 + with_child)
                .bind(route_id)
                .execute(&mut *tx)
                .await?;

                sqlx::query("DELETE FROM bookings WHERE id_booking = ?1")
                    .bind(id)
                    .execute(&mut *tx)
                    .await?;

                tx.commit().await?;
            }
        }

        Ok(())
    }

    fn row_to_booking(&self, row: sqlx::sqlite::SqliteRow) -> Booking {
        let price: String = row.get("price");
        Booking {
            id_booking: row.get("id_booking"),
            route: Route {
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
            },
            user: User {
                id_user: row.get("id_user"),
                login: row.get("user_login"),
                password: row.get("password"),
                phone_number: row.get("phone_number"),
                user_name: row.get("user_name"),
                user_surname: row.get("user_surname"),
                user_patronymic: row.get("user_patronymic"),
            },
            booking_date_time: row.get("booking_date_time"),
            with_baggage: row.get("with_baggage"),
            with_child: row.get("with_child"),
            with_pet: row.get("with_pet"),
        }
    }

    fn row_to_booking_postgres(&self, row: sqlx::postgres::PgRow) -> Booking {
        Booking {
            id_booking: row.get("id_booking"),
            route: Route {
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
            },
            user: User {
                id_user: row.get("id_user"),
                login: row.get("user_login"),
                password: row.get("password"),
                phone_number: row.get("phone_number"),
                user_name: row.get("user_name"),
                user_surname: row.get("user_surname"),
                user_patronymic: row.get("user_patronymic"),
            },
            booking_date_time: row.get("booking_date_time"),
            with_baggage: row.get("with_baggage"),
            with_child: row.get("with_child"),
            with_pet: row.get("with_pet"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        CityRef, CreateCityRequest, CreateRouteRequest, CreateTransportTypeRequest,
        CreateUserRequest, TransportTypeRef,
    };
    use crate::services::{CityService, RouteService, TransportTypeService, UserService};
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

    async fn seed_route(db: &DatabasePool, seats: i32) -> i64 {
        let cities = CityService::new(db.clone());
        for (id, name) in [("MOW", "Moscow"), ("LED", "Saint Petersburg")] {
            cities
                .create_city(CreateCityRequest {
                    id_city: id.to_string(),
                    city_name: name.to_string(),
                })
                .await
                .unwrap();
        }

        TransportTypeService::new(db.clone())
            .create_transport_type(CreateTransportTypeRequest {
                id_transport: "BUS".to_string(),
                transport_name: "Bus".to_string(),
            })
            .await
            .unwrap();

        let route = RouteService::new(db.clone())
            .create_route(CreateRouteRequest {
                transport_type: TransportTypeRef {
                    id_transport: "BUS".to_string(),
                },
                departure_city: CityRef {
                    id_city: "MOW".to_string(),
                },
                arrival_city: CityRef {
                    id_city: "LED".to_string(),
                },
                departure_date_time: "2030-05-01T10:00:00".parse().unwrap(),
                arrival_date_time: "2030-05-01T16:00:00".parse().unwrap(),
                price: Decimal::new(125050, 2),
                available_seats: seats,
            })
            .await
            .unwrap();
        route.id_route
    }

    async fn seed_user(db: &DatabasePool) -> i64 {
        let user = UserService::new(db.clone())
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
        user.id_user
    }

    async fn available_seats(db: &DatabasePool, route_id: i64) -> i32 {
        RouteService::new(db.clone())
            .get_route(route_id)
            .await
            .unwrap()
            .unwrap()
            .available_seats
    }

    fn conflict_message(err: AppError) -> String {
        match err {
            AppError::Conflict(msg) => msg,
            other => panic!("expected conflict, got {other:?}"),
        }
    }

    fn bad_request_message(err: AppError) -> String {
        match err {
            AppError::BadRequest(msg) => msg,
            other => panic!("expected bad request, got {other:?}"),
        }
    }

    fn not_found_message(err: AppError) -> String {
        match err {
            AppError::NotFound(msg) => msg,
            other => panic!("expected not found, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_booking_consumes_and_restores_child_seats() {
        let db = test_db().await;
        let route_id = seed_route(&db, 5).await;
        let user_id = seed_user(&db).await;
        let service = BookingService::new(db.clone());

        // One base seat plus two child seats.
        let booking = service
            .create_booking(route_id, user_id, "2030-04-30T12:00:00", true, 2, 1)
            .await
            .unwrap();
        assert_eq!(booking.with_child, 2);
        assert_eq!(available_seats(&db, route_id).await, 2);

        service.delete_booking(booking.id_booking).await.unwrap();
        assert_eq!(available_seats(&db, route_id).await, 5);
        assert!(service.get_booking(booking.id_booking).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_booking_without_children_consumes_one_seat() {
        let db = test_db().await;
        let route_id = seed_route(&db, 5).await;
        let user_id = seed_user(&db).await;
        let service = BookingService::new(db.clone());

        service
            .create_booking(route_id, user_id, "2030-04-30T12:00:00", false, 0, 0)
            .await
            .unwrap();
        assert_eq!(available_seats(&db, route_id).await, 4);
    }

    #[tokio::test]
    async fn test_empty_route_reports_no_seats_before_children_check() {
        let db = test_db().await;
        let route_id = seed_route(&db, 0).await;
        let user_id = seed_user(&db).await;
        let service = BookingService::new(db.clone());

        let err = service
            .create_booking(route_id, user_id, "2030-04-30T12:00:00", false, 2, 0)
            .await
            .unwrap_err();
        assert_eq!(conflict_message(err), "No seats available for booking.");
    }

    #[tokio::test]
    async fn test_insufficient_seats_for_children() {
        let db = test_db().await;
        let route_id = seed_route(&db, 2).await;
        let user_id = seed_user(&db).await;
        let service = BookingService::new(db.clone());

        let err = service
            .create_booking(route_id, user_id, "2030-04-30T12:00:00", false, 2, 0)
            .await
            .unwrap_err();
        assert_eq!(
            conflict_message(err),
            "Not enough seats for a booking with children."
        );
        assert_eq!(available_seats(&db, route_id).await, 2);
    }

    #[tokio::test]
    async fn test_child_and_pet_counts_validated_in_order() {
        let db = test_db().await;
        let route_id = seed_route(&db, 5).await;
        let user_id = seed_user(&db).await;
        let service = BookingService::new(db.clone());

        let err = service
            .create_booking(route_id, user_id, "2030-04-30T12:00:00", false, 4, 7)
            .await
            .unwrap_err();
        assert_eq!(
            bad_request_message(err),
            "Number of children must be between 0 and 3."
        );

        let err = service
            .create_booking(route_id, user_id, "2030-04-30T12:00:00", false, 0, 4)
            .await
            .unwrap_err();
        assert_eq!(
            bad_request_message(err),
            "Number of pets must be between 0 and 3."
        );

        let err = service
            .create_booking(route_id, user_id, "2030-04-30T12:00:00", false, -1, 0)
            .await
            .unwrap_err();
        assert_eq!(
            bad_request_message(err),
            "Number of children must be between 0 and 3."
        );
    }

    #[tokio::test]
    async fn test_blank_booking_datetime_rejected() {
        let db = test_db().await;
        let route_id = seed_route(&db, 5).await;
        let user_id = seed_user(&db).await;
        let service = BookingService::new(db.clone());

        let err = service
            .create_booking(route_id, user_id, "   ", false, 0, 0)
            .await
            .unwrap_err();
        assert_eq!(bad_request_message(err), "Fill in all fields!");
        assert_eq!(available_seats(&db, route_id).await, 5);
    }

    #[tokio::test]
    async fn test_malformed_datetime_leaves_seats_untouched() {
        let db = test_db().await;
        let route_id = seed_route(&db, 5).await;
        let user_id = seed_user(&db).await;
        let service = BookingService::new(db.clone());

        // Space where the contract requires the T separator.
        let err = service
            .create_booking(route_id, user_id, "2030-04-30 12:00:00", false, 0, 0)
            .await
            .unwrap_err();
        assert_eq!(bad_request_message(err), INVALID_DATE_TIME);
        assert_eq!(available_seats(&db, route_id).await, 5);
    }

    #[tokio::test]
    async fn test_unknown_route_and_unknown_user() {
        let db = test_db().await;
        let route_id = seed_route(&db, 5).await;
        let user_id = seed_user(&db).await;
        let service = BookingService::new(db.clone());

        let err = service
            .create_booking(9000, user_id, "2030-04-30T12:00:00", false, 0, 0)
            .await
            .unwrap_err();
        assert_eq!(not_found_message(err), "Route with this ID not found.");

        let err = service
            .create_booking(route_id, 9000, "2030-04-30T12:00:00", false, 0, 0)
            .await
            .unwrap_err();
        assert_eq!(not_found_message(err), "User with this ID not found.");
    }

    #[tokio::test]
    async fn test_get_booking_embeds_route_and_user() {
        let db = test_db().await;
        let route_id = seed_route(&db, 5).await;
        let user_id = seed_user(&db).await;
        let service = BookingService::new(db.clone());

        let created = service
            .create_booking(route_id, user_id, "2030-04-30T12:00:00", true, 1, 0)
            .await
            .unwrap();

        let booking = service
            .get_booking(created.id_booking)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(booking.route.departure_city.city_name, "Moscow");
        assert_eq!(booking.route.arrival_city.city_name, "Saint Petersburg");
        assert_eq!(booking.user.login, "traveler");
        assert!(booking.with_baggage);
        assert_eq!(
            booking.booking_date_time,
            "2030-04-30T12:00:00".parse::<NaiveDateTime>().unwrap()
        );
    }

    #[tokio::test]
    async fn test_get_missing_booking_is_none() {
        let service = BookingService::new(test_db().await);
        assert!(service.get_booking(9000).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_missing_booking_is_not_found() {
        let service = BookingService::new(test_db().await);
        let err = service.delete_booking(9000).await.unwrap_err();
        assert_eq!(not_found_message(err), "Booking with this ID not found.");
    }

    #[tokio::test]
    async fn test_bookings_by_user() {
        let db = test_db().await;
        let route_id = seed_route(&db, 5).await;
        let user_id = seed_user(&db).await;
        let service = BookingService::new(db.clone());

        let err = service.get_bookings_by_user(9000).await.unwrap_err();
        assert_eq!(not_found_message(err), "User with this ID not found.");

        let none = service.get_bookings_by_user(user_id).await.unwrap();
        assert!(none.is_empty());

        service
            .create_booking(route_id, user_id, "2030-04-30T12:00:00", false, 0, 0)
            .await
            .unwrap();
        let bookings = service.get_bookings_by_user(user_id).await.unwrap();
        assert_eq!(bookings.len(), 1);
        assert_eq!(bookings[0].user.id_user, user_id);
    }
}
