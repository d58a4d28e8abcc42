use chrono::Utc;

use crate::application::dto::concerts::{ConcertOverviewDto, PageDto};
use crate::application::error::{ServiceError, ServiceResult};
use crate::application::ports::concert_repository::ConcertRepository;
use crate::application::ports::seat_repository::SeatRepository;
use crate::application::use_cases::concerts::with_stats;

pub const MAX_PAGE_SIZE: i64 = 100;

pub struct ListAvailableConcerts<'a, C, S>
where
    C: ConcertRepository + ?Sized,
    S: SeatRepository + ?Sized,
{
    pub concerts: &'a C,
    pub seats: &'a S,
}

impl<'a, C, S> ListAvailableConcerts<'a, C, S>
where
    C: ConcertRepository + ?Sized,
    S: SeatRepository + ?Sized,
{
    /// Zero-based `page`; `size` is clamped to 1..=100.
    pub async fn execute(&self, page: i64, size: i64) -> ServiceResult<PageDto<ConcertOverviewDto>> {
        let page = page.max(0);
        let size = size.clamp(1, MAX_PAGE_SIZE);
        let offset = page
            .checked_mul(size)
            .ok_or_else(|| ServiceError::InvalidArgument(format!("page {page} is out of range")))?;
        let now = Utc::now();
        let total = self.concerts.count_upcoming(now).await?;
        let rows = self.concerts.list_upcoming(now, offset, size).await?;
        let items = with_stats(self.seats, rows).await?;
        Ok(PageDto::new(items, page, size, total))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::test_support::MemoryStore;
    use chrono::Duration;

    #[tokio::test]
    async fn pages_upcoming_concerts_in_date_order() {
        let store = MemoryStore::default();
        let today = Utc::now().date_naive();
        store.add_concert(today - Duration::days(2), 1, 1000).await;
        let later = store.add_concert(today + Duration::days(9), 1, 1000).await;
        let sooner = store.add_concert(today + Duration::days(2), 1, 1000).await;
        let last = store.add_concert(today + Duration::days(20), 1, 1000).await;

        let uc = ListAvailableConcerts {
            concerts: &store,
            seats: &store,
        };
        let first = uc.execute(0, 2).await.unwrap();
        assert_eq!(first.total_elements, 3);
        assert_eq!(first.total_pages, 2);
        let ids: Vec<i64> = first.items.iter().map(|o| o.concert.id).collect();
        assert_eq!(ids, vec![sooner.id, later.id]);

        let second = uc.execute(1, 2).await.unwrap();
        assert_eq!(second.items.len(), 1);
        assert_eq!(second.items[0].concert.id, last.id);

        let clamped = uc.execute(-3, 0).await.unwrap();
        assert_eq!(clamped.page, 0);
        assert_eq!(clamped.size, 1);
    }

    #[tokio::test]
    async fn page_past_the_offset_range_is_rejected() {
        let store = MemoryStore::default();
        let uc = ListAvailableConcerts {
            concerts: &store,
            seats: &store,
        };
        assert!(matches!(
            uc.execute(i64::MAX / 10, MAX_PAGE_SIZE).await,
            Err(ServiceError::InvalidArgument(_))
        ));
        assert!(uc.execute(i64::MAX / MAX_PAGE_SIZE, MAX_PAGE_SIZE).await.is_ok());
    }
}
