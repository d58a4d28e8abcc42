use chrono::Utc;

use crate::application::error::ServiceResult;
use crate::application::ports::ranking_store::RankingStore;
use crate::application::services::ranking::current_booking_speed;

pub struct GetBookingSpeed<'a, S: RankingStore + ?Sized> {
    pub store: &'a S,
}

impl<'a, S: RankingStore + ?Sized> GetBookingSpeed<'a, S> {
    /// Bookings per minute over the last five minutes.
    pub async fn execute(&self, concert_id: i64) -> ServiceResult<f64> {
        Ok(current_booking_speed(self.store, concert_id, Utc::now()).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::services::ranking::record_booking;
    use crate::application::test_support::MemoryRankingStore;

    #[tokio::test]
    async fn speed_counts_recent_bookings() {
        let store = MemoryRankingStore::default();
        let now = Utc::now();
        for i in 0..5 {
            record_booking(&store, 7, &format!("r-{i}"), now).await.unwrap();
        }
        let uc = GetBookingSpeed { store: &store };
        assert_eq!(uc.execute(7).await.unwrap(), 1.0);
        assert_eq!(uc.execute(8).await.unwrap(), 0.0);
    }
}
