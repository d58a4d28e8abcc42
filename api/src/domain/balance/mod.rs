pub mod balance;
pub mod transaction;
