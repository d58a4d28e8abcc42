use crate::application::dto::concerts::ConcertOverviewDto;
use crate::application::error::{ServiceError, ServiceResult};
use crate::application::ports::concert_repository::ConcertRepository;
use crate::application::ports::seat_repository::SeatRepository;
use crate::application::use_cases::concerts::with_stats;

pub struct SearchConcertsByArtist<'a, C, S>
where
    C: ConcertRepository + ?Sized,
    S: SeatRepository + ?Sized,
{
    pub concerts: &'a C,
    pub seats: &'a S,
}

impl<'a, C, S> SearchConcertsByArtist<'a, C, S>
where
    C: ConcertRepository + ?Sized,
    S: SeatRepository + ?Sized,
{
    pub async fn execute(&self, artist: &str) -> ServiceResult<Vec<ConcertOverviewDto>> {
        let fragment = artist.trim();
        if fragment.is_empty() {
            return Err(ServiceError::InvalidArgument(
                "artist search term is required".into(),
            ));
        }
        let rows = self.concerts.search_by_artist(fragment).await?;
        Ok(with_stats(self.seats, rows).await?)
    }
}
