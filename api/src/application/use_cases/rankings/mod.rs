pub mod get_booking_speed;
pub mod get_top_rankings;
