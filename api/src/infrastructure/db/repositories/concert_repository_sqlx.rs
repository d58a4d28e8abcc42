use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::Row;
use sqlx::postgres::PgRow;

use crate::application::ports::concert_repository::ConcertRepository;
use crate::domain::concerts::concert::{Concert, NewConcert};
use crate::infrastructure::db::PgPool;

const CONCERT_COLUMNS: &str = "id, title, artist, venue, concert_date, concert_time, total_seats, booking_opened_at, sold_out_at, created_at";

pub struct SqlxConcertRepository {
    pub pool: PgPool,
}

impl SqlxConcertRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn concert_from_row(r: &PgRow) -> Concert {
    Concert {
        id: r.get("id"),
        title: r.get("title"),
        artist: r.get("artist"),
        venue: r.get("venue"),
        concert_date: r.get("concert_date"),
        concert_time: r.get("concert_time"),
        total_seats: r.get("total_seats"),
        booking_opened_at: r.get("booking_opened_at"),
        sold_out_at: r.get("sold_out_at"),
        created_at: r.get("created_at"),
    }
}

#[async_trait]
impl ConcertRepository for SqlxConcertRepository {
    async fn create(&self, concert: &NewConcert) -> anyhow::Result<Concert> {
        let mut tx = self.pool.begin().await?;
        let row = sqlx::query(&format!(
            r#"INSERT INTO concerts (title, artist, venue, concert_date, concert_time, total_seats)
               VALUES ($1, $2, $3, $4, $5, $6)
               RETURNING {CONCERT_COLUMNS}"#
        ))
        .bind(&concert.title)
        .bind(&concert.artist)
        .bind(&concert.venue)
        .bind(concert.concert_date)
        .bind(concert.concert_time)
        .bind(concert.total_seats)
        .fetch_one(&mut *tx)
        .await?;
        let created = concert_from_row(&row);

        sqlx::query(
            r#"INSERT INTO seats (concert_id, seat_number, price, status)
               SELECT $1, n, $2, 'AVAILABLE' FROM generate_series(1, $3) AS n"#,
        )
        .bind(created.id)
        .bind(concert.seat_price)
        .bind(concert.total_seats)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(created)
    }

    async fn find_by_id(&self, id: i64) -> anyhow::Result<Option<Concert>> {
        let row = sqlx::query(&format!(
            "SELECT {CONCERT_COLUMNS} FROM concerts WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.as_ref().map(concert_from_row))
    }

    async fn list_upcoming(
        &self,
        now: DateTime<Utc>,
        offset: i64,
        limit: i64,
    ) -> anyhow::Result<Vec<Concert>> {
        let rows = sqlx::query(&format!(
            r#"SELECT {CONCERT_COLUMNS} FROM concerts
               WHERE concert_date + concert_time > $1
               ORDER BY concert_date, concert_time, id
               OFFSET $2 LIMIT $3"#
        ))
        .bind(now.naive_utc())
        .bind(offset)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(concert_from_row).collect())
    }

    async fn count_upcoming(&self, now: DateTime<Utc>) -> anyhow::Result<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(1) FROM concerts WHERE concert_date + concert_time > $1",
        )
        .bind(now.naive_utc())
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    async fn list_by_date(&self, date: NaiveDate) -> anyhow::Result<Vec<Concert>> {
        let rows = sqlx::query(&format!(
            "SELECT {CONCERT_COLUMNS} FROM concerts WHERE concert_date = $1 ORDER BY concert_time, id"
        ))
        .bind(date)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(concert_from_row).collect())
    }

    async fn search_by_artist(&self, fragment: &str) -> anyhow::Result<Vec<Concert>> {
        let like = format!("%{}%", escape_like(fragment));
        let rows = sqlx::query(&format!(
            r#"SELECT {CONCERT_COLUMNS} FROM concerts
               WHERE artist ILIKE $1 ESCAPE '\'
               ORDER BY concert_date, concert_time, id
               LIMIT 100"#
        ))
        .bind(like)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(concert_from_row).collect())
    }

    async fn mark_booking_opened(&self, id: i64, at: DateTime<Utc>) -> anyhow::Result<()> {
        sqlx::query(
            "UPDATE concerts SET booking_opened_at = $2 WHERE id = $1 AND booking_opened_at IS NULL",
        )
        .bind(id)
        .bind(at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn mark_sold_out(&self, id: i64, at: DateTime<Utc>) -> anyhow::Result<bool> {
        let res = sqlx::query(
            "UPDATE concerts SET sold_out_at = $2 WHERE id = $1 AND sold_out_at IS NULL",
        )
        .bind(id)
        .bind(at)
        .execute(&self.pool)
        .await?;
        Ok(res.rows_affected() > 0)
    }
}

/// Escapes LIKE wildcards so the fragment matches literally.
fn escape_like(fragment: &str) -> String {
    let mut out = String::with_capacity(fragment.len());
    for ch in fragment.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}
