use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::Row;
use sqlx::postgres::PgRow;
use uuid::Uuid;

use crate::application::ports::reservation_repository::ReservationRepository;
use crate::domain::reservations::reservation::{Reservation, ReservationStatus};
use crate::infrastructure::db::PgPool;

const RESERVATION_COLUMNS: &str = "id, user_id, concert_id, seat_id, seat_number, status, price, created_at, expires_at, confirmed_at";

pub struct SqlxReservationRepository {
    pub pool: PgPool,
}

impl SqlxReservationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn reservation_from_row(r: &PgRow) -> anyhow::Result<Reservation> {
    Ok(Reservation {
        id: r.get("id"),
        user_id: r.get("user_id"),
        concert_id: r.get("concert_id"),
        seat_id: r.get("seat_id"),
        seat_number: r.get("seat_number"),
        price: r.get("price"),
        status: r.get::<String, _>("status").parse()?,
        created_at: r.get("created_at"),
        expires_at: r.get("expires_at"),
        confirmed_at: r.get("confirmed_at"),
    })
}

#[async_trait]
impl ReservationRepository for SqlxReservationRepository {
    async fn insert(&self, reservation: &Reservation) -> anyhow::Result<()> {
        sqlx::query(
            r#"INSERT INTO reservations
                   (id, user_id, concert_id, seat_id, seat_number, status, price, created_at, expires_at, confirmed_at)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)"#,
        )
        .bind(reservation.id)
        .bind(&reservation.user_id)
        .bind(reservation.concert_id)
        .bind(reservation.seat_id)
        .bind(reservation.seat_number)
        .bind(reservation.status.as_str())
        .bind(reservation.price)
        .bind(reservation.created_at)
        .bind(reservation.expires_at)
        .bind(reservation.confirmed_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<Reservation>> {
        let row = sqlx::query(&format!(
            "SELECT {RESERVATION_COLUMNS} FROM reservations WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(reservation_from_row).transpose()
    }

    async fn update_if_status(
        &self,
        reservation: &Reservation,
        expected: ReservationStatus,
    ) -> anyhow::Result<bool> {
        let res = sqlx::query(
            r#"UPDATE reservations SET status = $2, confirmed_at = $3, expires_at = $4
               WHERE id = $1 AND status = $5"#,
        )
        .bind(reservation.id)
        .bind(reservation.status.as_str())
        .bind(reservation.confirmed_at)
        .bind(reservation.expires_at)
        .bind(expected.as_str())
        .execute(&self.pool)
        .await?;
        Ok(res.rows_affected() == 1)
    }

    async fn list_expired_holds(
        &self,
        now: DateTime<Utc>,
        limit: i64,
    ) -> anyhow::Result<Vec<Reservation>> {
        let rows = sqlx::query(&format!(
            r#"SELECT {RESERVATION_COLUMNS} FROM reservations
               WHERE status = 'TEMPORARILY_ASSIGNED' AND expires_at < $1
               ORDER BY expires_at
               LIMIT $2"#
        ))
        .bind(now)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(reservation_from_row).collect()
    }
}
