use crate::domain::concerts::concert::Concert;
use crate::domain::concerts::seat::{Seat, SeatStats};

#[derive(Debug, Clone)]
pub struct ConcertOverviewDto {
    pub concert: Concert,
    pub stats: SeatStats,
}

#[derive(Debug, Clone)]
pub struct ConcertSeatsDto {
    pub concert: Concert,
    pub seats: Vec<Seat>,
    pub stats: SeatStats,
}

#[derive(Debug, Clone)]
pub struct PageDto<T> {
    pub items: Vec<T>,
    pub page: i64,
    pub size: i64,
    pub total_elements: i64,
    pub total_pages: i64,
}

impl<T> PageDto<T> {
    pub fn new(items: Vec<T>, page: i64, size: i64, total_elements: i64) -> Self {
        let total_pages = if size > 0 {
            (total_elements + size - 1) / size
        } else {
            0
        };
        Self {
            items,
            page,
            size,
            total_elements,
            total_pages,
        }
    }
}
