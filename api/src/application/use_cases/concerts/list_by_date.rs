use chrono::NaiveDate;

use crate::application::dto::concerts::ConcertOverviewDto;
use crate::application::error::ServiceResult;
use crate::application::ports::concert_repository::ConcertRepository;
use crate::application::ports::seat_repository::SeatRepository;
use crate::application::use_cases::concerts::with_stats;

pub struct ListConcertsByDate<'a, C, S>
where
    C: ConcertRepository + ?Sized,
    S: SeatRepository + ?Sized,
{
    pub concerts: &'a C,
    pub seats: &'a S,
}

impl<'a, C, S> ListConcertsByDate<'a, C, S>
where
    C: ConcertRepository + ?Sized,
    S: SeatRepository + ?Sized,
{
    pub async fn execute(&self, date: NaiveDate) -> ServiceResult<Vec<ConcertOverviewDto>> {
        let rows = self.concerts.list_by_date(date).await?;
        Ok(with_stats(self.seats, rows).await?)
    }
}
