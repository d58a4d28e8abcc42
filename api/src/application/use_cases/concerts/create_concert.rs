use chrono::Utc;

use crate::application::error::ServiceResult;
use crate::application::ports::concert_repository::ConcertRepository;
use crate::domain::concerts::concert::{Concert, NewConcert};

pub struct CreateConcert<'a, C: ConcertRepository + ?Sized> {
    pub concerts: &'a C,
}

impl<'a, C: ConcertRepository + ?Sized> CreateConcert<'a, C> {
    pub async fn execute(&self, concert: &NewConcert) -> ServiceResult<Concert> {
        concert.validate(Utc::now().date_naive())?;
        let created = self.concerts.create(concert).await?;
        tracing::info!(concert_id = created.id, seats = created.total_seats, "concert_created");
        Ok(created)
    }
}
