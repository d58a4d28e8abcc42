pub mod balance;
pub mod concerts;
pub mod payments;
pub mod queue;
pub mod rankings;
pub mod reservations;
pub mod transfers;
