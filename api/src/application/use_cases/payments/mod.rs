pub mod cancel_payment;
pub mod get_payment;
pub mod process_payment;
pub mod refund_payment;
pub mod retry_payment;

#[cfg(test)]
pub(crate) mod testing {
    use chrono::{Duration, Utc};

    use crate::application::test_support::{MemoryLock, MemoryStore, RecordingPublisher};
    use crate::application::use_cases::payments::process_payment::ProcessPayment;
    use crate::application::use_cases::reservations::reserve_seat::ReserveSeat;
    use crate::domain::concerts::concert::Concert;
    use crate::domain::reservations::reservation::Reservation;

    pub type Process<'a> = ProcessPayment<
        'a,
        MemoryStore,
        MemoryStore,
        MemoryStore,
        MemoryStore,
        MemoryStore,
        MemoryLock,
        RecordingPublisher,
    >;

    #[derive(Default)]
    pub struct Fixture {
        pub store: MemoryStore,
        pub lock: MemoryLock,
        pub events: RecordingPublisher,
    }

    impl Fixture {
        pub fn process(&self) -> Process<'_> {
            ProcessPayment {
                reservations: &self.store,
                seats: &self.store,
                concerts: &self.store,
                payments: &self.store,
                balances: &self.store,
                lock: &self.lock,
                events: &self.events,
            }
        }

        /// A concert with `seats` seats and seat 1 held by `user_id`.
        pub async fn held(&self, user_id: &str, seats: i32, price: i64) -> (Concert, Reservation) {
            let concert = self
                .store
                .add_concert(Utc::now().date_naive() + Duration::days(7), seats, price)
                .await;
            let reservation = ReserveSeat {
                concerts: &self.store,
                seats: &self.store,
                reservations: &self.store,
                lock: &self.lock,
                events: &self.events,
                hold_for: Duration::minutes(5),
            }
            .execute(user_id, concert.id, 1)
            .await
            .unwrap();
            (concert, reservation)
        }
    }
}
