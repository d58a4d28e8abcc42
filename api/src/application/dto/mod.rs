pub mod concerts;
pub mod transfers;
