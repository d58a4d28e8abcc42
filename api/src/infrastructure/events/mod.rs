pub mod broadcast_bus;
pub mod log_notifier;
