pub mod cancel_reservation;
pub mod get_reservation;
pub mod release_expired;
pub mod reserve_seat;
