use async_trait::async_trait;
use sqlx::Row;
use sqlx::postgres::PgRow;

use crate::application::ports::seat_repository::SeatRepository;
use crate::domain::concerts::seat::{Seat, SeatStats, SeatStatus};
use crate::infrastructure::db::PgPool;

const SEAT_COLUMNS: &str =
    "id, concert_id, seat_number, price, status, assigned_user_id, assigned_until, reserved_at";

pub struct SqlxSeatRepository {
    pub pool: PgPool,
}

impl SqlxSeatRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn seat_from_row(r: &PgRow) -> anyhow::Result<Seat> {
    Ok(Seat {
        id: r.get("id"),
        concert_id: r.get("concert_id"),
        seat_number: r.get("seat_number"),
        price: r.get("price"),
        status: r.get::<String, _>("status").parse()?,
        assigned_user_id: r.get("assigned_user_id"),
        assigned_until: r.get("assigned_until"),
        reserved_at: r.get("reserved_at"),
    })
}

#[async_trait]
impl SeatRepository for SqlxSeatRepository {
    async fn find_by_id(&self, id: i64) -> anyhow::Result<Option<Seat>> {
        let row = sqlx::query(&format!("SELECT {SEAT_COLUMNS} FROM seats WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(seat_from_row).transpose()
    }

    async fn find_by_number(
        &self,
        concert_id: i64,
        seat_number: i32,
    ) -> anyhow::Result<Option<Seat>> {
        let row = sqlx::query(&format!(
            "SELECT {SEAT_COLUMNS} FROM seats WHERE concert_id = $1 AND seat_number = $2"
        ))
        .bind(concert_id)
        .bind(seat_number)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(seat_from_row).transpose()
    }

    async fn list_by_concert(&self, concert_id: i64) -> anyhow::Result<Vec<Seat>> {
        let rows = sqlx::query(&format!(
            "SELECT {SEAT_COLUMNS} FROM seats WHERE concert_id = $1 ORDER BY seat_number"
        ))
        .bind(concert_id)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(seat_from_row).collect()
    }

    async fn stats(&self, concert_ids: &[i64]) -> anyhow::Result<Vec<SeatStats>> {
        if concert_ids.is_empty() {
            return Ok(Vec::new());
        }
        let rows = sqlx::query(
            r#"SELECT concert_id,
                      COUNT(1) AS total,
                      COUNT(1) FILTER (WHERE status = 'AVAILABLE') AS available,
                      COUNT(1) FILTER (WHERE status = 'TEMPORARILY_ASSIGNED') AS temporarily_assigned,
                      COUNT(1) FILTER (WHERE status = 'RESERVED') AS reserved,
                      MIN(price) AS min_price,
                      MAX(price) AS max_price
               FROM seats
               WHERE concert_id = ANY($1)
               GROUP BY concert_id"#,
        )
        .bind(concert_ids)
        .fetch_all(&self.pool)
        .await?;
        let found: Vec<SeatStats> = rows
            .into_iter()
            .map(|r| SeatStats {
                concert_id: r.get("concert_id"),
                total: r.get("total"),
                available: r.get("available"),
                temporarily_assigned: r.get("temporarily_assigned"),
                reserved: r.get("reserved"),
                min_price: r.get("min_price"),
                max_price: r.get("max_price"),
            })
            .collect();
        Ok(concert_ids
            .iter()
            .map(|id| {
                found
                    .iter()
                    .find(|s| s.concert_id == *id)
                    .cloned()
                    .unwrap_or(SeatStats {
                        concert_id: *id,
                        ..SeatStats::default()
                    })
            })
            .collect())
    }

    async fn update_if_status(&self, seat: &Seat, expected: SeatStatus) -> anyhow::Result<bool> {
        let res = sqlx::query(
            r#"UPDATE seats SET
                    status = $2,
                    assigned_user_id = $3,
                    assigned_until = $4,
                    reserved_at = $5
                WHERE id = $1 AND status = $6"#,
        )
        .bind(seat.id)
        .bind(seat.status.as_str())
        .bind(&seat.assigned_user_id)
        .bind(seat.assigned_until)
        .bind(seat.reserved_at)
        .bind(expected.as_str())
        .execute(&self.pool)
        .await?;
        Ok(res.rows_affected() == 1)
    }
}
