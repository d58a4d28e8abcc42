use crate::application::dto::concerts::ConcertOverviewDto;
use crate::application::error::{ServiceError, ServiceResult};
use crate::application::ports::concert_repository::ConcertRepository;
use crate::application::ports::seat_repository::SeatRepository;
use crate::application::use_cases::concerts::with_stats;

pub struct GetConcert<'a, C, S>
where
    C: ConcertRepository + ?Sized,
    S: SeatRepository + ?Sized,
{
    pub concerts: &'a C,
    pub seats: &'a S,
}

impl<'a, C, S> GetConcert<'a, C, S>
where
    C: ConcertRepository + ?Sized,
    S: SeatRepository + ?Sized,
{
    pub async fn execute(&self, id: i64) -> ServiceResult<ConcertOverviewDto> {
        let concert = self
            .concerts
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("concert", id))?;
        let mut rows = with_stats(self.seats, vec![concert]).await?;
        rows.pop()
            .ok_or_else(|| ServiceError::not_found("concert", id))
    }
}
