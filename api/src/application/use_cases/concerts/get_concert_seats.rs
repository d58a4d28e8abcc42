use crate::application::dto::concerts::ConcertSeatsDto;
use crate::application::error::{ServiceError, ServiceResult};
use crate::application::ports::concert_repository::ConcertRepository;
use crate::application::ports::seat_repository::SeatRepository;
use crate::domain::concerts::seat::SeatStats;

pub struct GetConcertSeats<'a, C, S>
where
    C: ConcertRepository + ?Sized,
    S: SeatRepository + ?Sized,
{
    pub concerts: &'a C,
    pub seats: &'a S,
}

impl<'a, C, S> GetConcertSeats<'a, C, S>
where
    C: ConcertRepository + ?Sized,
    S: SeatRepository + ?Sized,
{
    pub async fn execute(&self, concert_id: i64) -> ServiceResult<ConcertSeatsDto> {
        let concert = self
            .concerts
            .find_by_id(concert_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("concert", concert_id))?;
        let mut seats = self.seats.list_by_concert(concert_id).await?;
        seats.sort_by_key(|s| s.seat_number);
        let stats = SeatStats::from_seats(concert_id, &seats);
        Ok(ConcertSeatsDto {
            concert,
            seats,
            stats,
        })
    }
}
