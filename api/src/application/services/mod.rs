pub mod concerts;
pub mod events;
pub mod locking;
pub mod ranking;
pub mod transfers;
