pub mod balance;
pub mod concerts;
pub mod error;
pub mod events;
pub mod payments;
pub mod queue;
pub mod ranking;
pub mod reservations;
pub mod transfers;
