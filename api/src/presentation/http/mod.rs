pub mod balance;
pub mod concerts;
pub mod extract;
pub mod fingerprint;
pub mod health;
pub mod payments;
pub mod queue;
pub mod queue_token;
pub mod rankings;
pub mod reservations;
pub mod response;
#[cfg(test)]
pub mod test_app;
