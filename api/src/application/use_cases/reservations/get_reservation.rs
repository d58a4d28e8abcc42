use uuid::Uuid;

use crate::application::error::{ServiceError, ServiceResult};
use crate::application::ports::reservation_repository::ReservationRepository;
use crate::domain::reservations::reservation::Reservation;

pub struct GetReservation<'a, R: ReservationRepository + ?Sized> {
    pub reservations: &'a R,
}

impl<'a, R: ReservationRepository + ?Sized> GetReservation<'a, R> {
    pub async fn execute(&self, id: Uuid) -> ServiceResult<Reservation> {
        self.reservations
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("reservation", id))
    }
}
