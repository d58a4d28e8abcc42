pub mod concert;
pub mod seat;
