pub mod balance_repository;
pub mod concert_repository;
pub mod data_platform;
pub mod distributed_lock;
pub mod event_bus;
pub mod failed_transfer_repository;
pub mod notifier;
pub mod payment_repository;
pub mod queue_store;
pub mod ranking_store;
pub mod reservation_repository;
pub mod seat_repository;
