pub mod retry_failed;
