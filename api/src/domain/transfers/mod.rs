pub mod failed_transfer;
