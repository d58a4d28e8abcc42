pub mod balance_repository_sqlx;
pub mod concert_repository_sqlx;
pub mod failed_transfer_repository_sqlx;
pub mod payment_repository_sqlx;
pub mod reservation_repository_sqlx;
pub mod seat_repository_sqlx;
