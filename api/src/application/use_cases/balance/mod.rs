pub mod charge_balance;
pub mod get_balance;
pub mod list_transactions;
