pub mod app_context;
pub mod background;
pub mod config;
