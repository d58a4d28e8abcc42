//! In-memory port implementations for use-case tests.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use uuid::Uuid;

use crate::application::ports::balance_repository::{BalanceChange, BalanceRepository};
use crate::application::ports::concert_repository::ConcertRepository;
use crate::application::ports::data_platform::DataPlatformClient;
use crate::application::ports::distributed_lock::DistributedLock;
use crate::application::ports::event_bus::EventPublisher;
use crate::application::ports::failed_transfer_repository::FailedTransferRepository;
use crate::application::ports::notifier::Notifier;
use crate::application::ports::payment_repository::PaymentRepository;
use crate::application::ports::queue_store::QueueStore;
use crate::application::ports::ranking_store::RankingStore;
use crate::application::ports::reservation_repository::ReservationRepository;
use crate::application::ports::seat_repository::SeatRepository;
use crate::domain::balance::balance::Balance;
use crate::domain::balance::transaction::{BalanceTransaction, TransactionKind};
use crate::domain::concerts::concert::{Concert, NewConcert};
use crate::domain::concerts::seat::{Seat, SeatStats, SeatStatus};
use crate::domain::events::event::{DomainEvent, EventEnvelope};
use crate::domain::payments::payment::{Payment, PaymentStatus};
use crate::domain::queue::token::{QueueToken, SessionInfo};
use crate::domain::ranking::ranking::RankingType;
use crate::domain::reservations::reservation::{Reservation, ReservationStatus};
use crate::domain::transfers::failed_transfer::{
    FailedDataTransfer, ReservationData, TransferStatus,
};

#[derive(Default)]
struct StoreState {
    concerts: Vec<Concert>,
    seats: Vec<Seat>,
    reservations: HashMap<Uuid, Reservation>,
    payments: HashMap<Uuid, Payment>,
    balances: HashMap<String, Balance>,
    transactions: Vec<BalanceTransaction>,
    failed: Vec<FailedDataTransfer>,
    next_concert_id: i64,
    next_seat_id: i64,
    next_transfer_id: i64,
}

/// Backs every relational repository with one mutex-guarded state.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<StoreState>,
    debit_failing: AtomicBool,
}

impl MemoryStore {
    pub async fn add_concert(&self, date: NaiveDate, seats: i32, price: i64) -> Concert {
        self.create(&NewConcert {
            title: "Test Concert".into(),
            artist: "Test Artist".into(),
            venue: "Test Hall".into(),
            concert_date: date,
            concert_time: chrono::NaiveTime::from_hms_opt(19, 0, 0).unwrap(),
            total_seats: seats,
            seat_price: price,
        })
        .await
        .unwrap()
    }

    /// Makes every balance debit fail with a storage error.
    pub fn set_debit_failing(&self, failing: bool) {
        self.debit_failing.store(failing, Ordering::SeqCst);
    }

    pub fn seat(&self, concert_id: i64, seat_number: i32) -> Seat {
        let state = self.state.lock().unwrap();
        state
            .seats
            .iter()
            .find(|s| s.concert_id == concert_id && s.seat_number == seat_number)
            .cloned()
            .unwrap()
    }

    pub fn put_seat(&self, seat: Seat) {
        let mut state = self.state.lock().unwrap();
        if let Some(slot) = state.seats.iter_mut().find(|s| s.id == seat.id) {
            *slot = seat;
        }
    }

    pub fn concert(&self, id: i64) -> Concert {
        let state = self.state.lock().unwrap();
        state.concerts.iter().find(|c| c.id == id).cloned().unwrap()
    }

    pub fn reservation(&self, id: Uuid) -> Reservation {
        self.state.lock().unwrap().reservations[&id].clone()
    }

    pub fn put_reservation(&self, reservation: Reservation) {
        let mut state = self.state.lock().unwrap();
        state.reservations.insert(reservation.id, reservation);
    }

    pub fn payment(&self, id: Uuid) -> Payment {
        self.state.lock().unwrap().payments[&id].clone()
    }

    pub fn payments(&self) -> Vec<Payment> {
        self.state.lock().unwrap().payments.values().cloned().collect()
    }

    pub fn set_balance(&self, user_id: &str, amount: i64) {
        let now = Utc::now();
        let mut state = self.state.lock().unwrap();
        let entry = state
            .balances
            .entry(user_id.to_string())
            .or_insert_with(|| Balance::empty(user_id, now));
        entry.amount = amount;
    }

    pub fn balance_of(&self, user_id: &str) -> i64 {
        let state = self.state.lock().unwrap();
        state.balances.get(user_id).map(|b| b.amount).unwrap_or(0)
    }

    pub fn failed_transfers(&self) -> Vec<FailedDataTransfer> {
        self.state.lock().unwrap().failed.clone()
    }
}

#[async_trait]
impl ConcertRepository for MemoryStore {
    async fn create(&self, concert: &NewConcert) -> anyhow::Result<Concert> {
        let mut state = self.state.lock().unwrap();
        state.next_concert_id += 1;
        let created = Concert {
            id: state.next_concert_id,
            title: concert.title.clone(),
            artist: concert.artist.clone(),
            venue: concert.venue.clone(),
            concert_date: concert.concert_date,
            concert_time: concert.concert_time,
            total_seats: concert.total_seats,
            booking_opened_at: None,
            sold_out_at: None,
            created_at: Utc::now(),
        };
        for number in 1..=concert.total_seats {
            state.next_seat_id += 1;
            let id = state.next_seat_id;
            state.seats.push(Seat {
                id,
                concert_id: created.id,
                seat_number: number,
                price: concert.seat_price,
                status: SeatStatus::Available,
                assigned_user_id: None,
                assigned_until: None,
                reserved_at: None,
            });
        }
        state.concerts.push(created.clone());
        Ok(created)
    }

    async fn find_by_id(&self, id: i64) -> anyhow::Result<Option<Concert>> {
        let state = self.state.lock().unwrap();
        Ok(state.concerts.iter().find(|c| c.id == id).cloned())
    }

    async fn list_upcoming(
        &self,
        now: DateTime<Utc>,
        offset: i64,
        limit: i64,
    ) -> anyhow::Result<Vec<Concert>> {
        let state = self.state.lock().unwrap();
        let mut rows: Vec<Concert> = state
            .concerts
            .iter()
            .filter(|c| c.is_bookable(now))
            .cloned()
            .collect();
        rows.sort_by_key(|c| (c.starts_at(), c.id));
        Ok(rows
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }

    async fn count_upcoming(&self, now: DateTime<Utc>) -> anyhow::Result<i64> {
        let state = self.state.lock().unwrap();
        Ok(state.concerts.iter().filter(|c| c.is_bookable(now)).count() as i64)
    }

    async fn list_by_date(&self, date: NaiveDate) -> anyhow::Result<Vec<Concert>> {
        let state = self.state.lock().unwrap();
        let mut rows: Vec<Concert> = state
            .concerts
            .iter()
            .filter(|c| c.concert_date == date)
            .cloned()
            .collect();
        rows.sort_by_key(|c| (c.concert_time, c.id));
        Ok(rows)
    }

    async fn search_by_artist(&self, fragment: &str) -> anyhow::Result<Vec<Concert>> {
        let needle = fragment.to_lowercase();
        let state = self.state.lock().unwrap();
        Ok(state
            .concerts
            .iter()
            .filter(|c| c.artist.to_lowercase().contains(&needle))
            .cloned()
            .collect())
    }

    async fn mark_booking_opened(&self, id: i64, at: DateTime<Utc>) -> anyhow::Result<()> {
        let mut state = self.state.lock().unwrap();
        if let Some(c) = state.concerts.iter_mut().find(|c| c.id == id) {
            c.booking_opened_at.get_or_insert(at);
        }
        Ok(())
    }

    async fn mark_sold_out(&self, id: i64, at: DateTime<Utc>) -> anyhow::Result<bool> {
        let mut state = self.state.lock().unwrap();
        match state.concerts.iter_mut().find(|c| c.id == id) {
            Some(c) if c.sold_out_at.is_none() => {
                c.sold_out_at = Some(at);
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

#[async_trait]
impl SeatRepository for MemoryStore {
    async fn find_by_id(&self, id: i64) -> anyhow::Result<Option<Seat>> {
        let state = self.state.lock().unwrap();
        Ok(state.seats.iter().find(|s| s.id == id).cloned())
    }

    async fn find_by_number(
        &self,
        concert_id: i64,
        seat_number: i32,
    ) -> anyhow::Result<Option<Seat>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .seats
            .iter()
            .find(|s| s.concert_id == concert_id && s.seat_number == seat_number)
            .cloned())
    }

    async fn list_by_concert(&self, concert_id: i64) -> anyhow::Result<Vec<Seat>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .seats
            .iter()
            .filter(|s| s.concert_id == concert_id)
            .cloned()
            .collect())
    }

    async fn stats(&self, concert_ids: &[i64]) -> anyhow::Result<Vec<SeatStats>> {
        let state = self.state.lock().unwrap();
        Ok(concert_ids
            .iter()
            .map(|id| {
                let seats: Vec<Seat> = state
                    .seats
                    .iter()
                    .filter(|s| s.concert_id == *id)
                    .cloned()
                    .collect();
                SeatStats::from_seats(*id, &seats)
            })
            .collect())
    }

    async fn update_if_status(&self, seat: &Seat, expected: SeatStatus) -> anyhow::Result<bool> {
        let mut state = self.state.lock().unwrap();
        match state.seats.iter_mut().find(|s| s.id == seat.id) {
            Some(slot) if slot.status == expected => {
                *slot = seat.clone();
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

#[async_trait]
impl ReservationRepository for MemoryStore {
    async fn insert(&self, reservation: &Reservation) -> anyhow::Result<()> {
        let mut state = self.state.lock().unwrap();
        state
            .reservations
            .insert(reservation.id, reservation.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<Reservation>> {
        Ok(self.state.lock().unwrap().reservations.get(&id).cloned())
    }

    async fn update_if_status(
        &self,
        reservation: &Reservation,
        expected: ReservationStatus,
    ) -> anyhow::Result<bool> {
        let mut state = self.state.lock().unwrap();
        match state.reservations.get_mut(&reservation.id) {
            Some(slot) if slot.status == expected => {
                *slot = reservation.clone();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn list_expired_holds(
        &self,
        now: DateTime<Utc>,
        limit: i64,
    ) -> anyhow::Result<Vec<Reservation>> {
        let state = self.state.lock().unwrap();
        let mut rows: Vec<Reservation> = state
            .reservations
            .values()
            .filter(|r| r.status == ReservationStatus::TemporarilyAssigned && r.expires_at < now)
            .cloned()
            .collect();
        rows.sort_by_key(|r| r.expires_at);
        rows.truncate(limit as usize);
        Ok(rows)
    }
}

#[async_trait]
impl PaymentRepository for MemoryStore {
    async fn insert(&self, payment: &Payment) -> anyhow::Result<()> {
        let mut state = self.state.lock().unwrap();
        state.payments.insert(payment.id, payment.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<Payment>> {
        Ok(self.state.lock().unwrap().payments.get(&id).cloned())
    }

    async fn update_if_status(
        &self,
        payment: &Payment,
        expected: PaymentStatus,
    ) -> anyhow::Result<bool> {
        let mut state = self.state.lock().unwrap();
        match state.payments.get_mut(&payment.id) {
            Some(slot) if slot.status == expected => {
                *slot = payment.clone();
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

#[async_trait]
impl BalanceRepository for MemoryStore {
    async fn find(&self, user_id: &str) -> anyhow::Result<Option<Balance>> {
        Ok(self.state.lock().unwrap().balances.get(user_id).cloned())
    }

    async fn credit(
        &self,
        user_id: &str,
        amount: i64,
        kind: TransactionKind,
        description: String,
    ) -> anyhow::Result<BalanceChange> {
        let now = Utc::now();
        let mut state = self.state.lock().unwrap();
        let balance = state
            .balances
            .entry(user_id.to_string())
            .or_insert_with(|| Balance::empty(user_id, now));
        balance.amount += amount;
        balance.updated_at = now;
        let balance = balance.clone();
        let transaction =
            BalanceTransaction::record(user_id, kind, amount, balance.amount, Some(description), now)?;
        state.transactions.push(transaction.clone());
        Ok(BalanceChange {
            balance,
            transaction,
        })
    }

    async fn debit(
        &self,
        user_id: &str,
        amount: i64,
        description: String,
    ) -> anyhow::Result<Option<BalanceChange>> {
        if self.debit_failing.load(Ordering::SeqCst) {
            anyhow::bail!("balance store unavailable");
        }
        let now = Utc::now();
        let mut state = self.state.lock().unwrap();
        let Some(balance) = state.balances.get_mut(user_id) else {
            return Ok(None);
        };
        if balance.amount < amount {
            return Ok(None);
        }
        balance.amount -= amount;
        balance.updated_at = now;
        let balance = balance.clone();
        let transaction = BalanceTransaction::record(
            user_id,
            TransactionKind::Payment,
            amount,
            balance.amount,
            Some(description),
            now,
        )?;
        state.transactions.push(transaction.clone());
        Ok(Some(BalanceChange {
            balance,
            transaction,
        }))
    }

    async fn list_transactions(
        &self,
        user_id: &str,
        limit: i64,
    ) -> anyhow::Result<Vec<BalanceTransaction>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .transactions
            .iter()
            .rev()
            .filter(|t| t.user_id == user_id)
            .take(limit as usize)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl FailedTransferRepository for MemoryStore {
    async fn record_failure(
        &self,
        data: &ReservationData,
        error: &str,
        now: DateTime<Utc>,
    ) -> anyhow::Result<FailedDataTransfer> {
        let mut state = self.state.lock().unwrap();
        state.next_transfer_id += 1;
        let transfer = FailedDataTransfer {
            id: state.next_transfer_id,
            payload: data.clone(),
            failed_at: now,
            error_message: Some(error.to_string()),
            retry_count: 0,
            status: TransferStatus::Failed,
            last_retry_at: None,
        };
        state.failed.push(transfer.clone());
        Ok(transfer)
    }

    async fn list_retryable(
        &self,
        max_attempts: i32,
        limit: i64,
    ) -> anyhow::Result<Vec<FailedDataTransfer>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .failed
            .iter()
            .filter(|t| t.can_retry(max_attempts))
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn update(&self, transfer: &FailedDataTransfer) -> anyhow::Result<()> {
        let mut state = self.state.lock().unwrap();
        if let Some(slot) = state.failed.iter_mut().find(|t| t.id == transfer.id) {
            *slot = transfer.clone();
        }
        Ok(())
    }
}

#[derive(Default)]
struct QueueState {
    tokens: HashMap<String, QueueToken>,
    user_tokens: HashMap<String, String>,
    sessions: HashMap<String, SessionInfo>,
    devices: HashMap<String, String>,
    waiting: Vec<(i64, String)>,
    active: BTreeSet<String>,
    markers: HashSet<String>,
}

#[derive(Default)]
pub struct MemoryQueueStore {
    state: Mutex<QueueState>,
}

impl MemoryQueueStore {
    /// Simulates the per-user active marker running out.
    pub fn expire_marker(&self, user_id: &str) {
        self.state.lock().unwrap().markers.remove(user_id);
    }

    pub fn put_token(&self, token: QueueToken) {
        let mut state = self.state.lock().unwrap();
        state
            .user_tokens
            .insert(token.user_id.clone(), token.token.clone());
        state.tokens.insert(token.token.clone(), token);
    }

    pub fn has_session(&self, user_id: &str) -> bool {
        self.state.lock().unwrap().sessions.contains_key(user_id)
    }
}

#[async_trait]
impl QueueStore for MemoryQueueStore {
    async fn find_token(&self, token: &str) -> anyhow::Result<Option<QueueToken>> {
        Ok(self.state.lock().unwrap().tokens.get(token).cloned())
    }

    async fn save_token(&self, token: &QueueToken, _ttl: Duration) -> anyhow::Result<()> {
        self.put_token(token.clone());
        Ok(())
    }

    async fn token_for_user(&self, user_id: &str) -> anyhow::Result<Option<String>> {
        Ok(self.state.lock().unwrap().user_tokens.get(user_id).cloned())
    }

    async fn delete_token(&self, token: &QueueToken) -> anyhow::Result<()> {
        let mut state = self.state.lock().unwrap();
        state.tokens.remove(&token.token);
        if state.user_tokens.get(&token.user_id) == Some(&token.token) {
            state.user_tokens.remove(&token.user_id);
        }
        Ok(())
    }

    async fn find_session(&self, user_id: &str) -> anyhow::Result<Option<SessionInfo>> {
        Ok(self.state.lock().unwrap().sessions.get(user_id).cloned())
    }

    async fn save_session(
        &self,
        user_id: &str,
        session: &SessionInfo,
        _ttl: Duration,
    ) -> anyhow::Result<()> {
        let mut state = self.state.lock().unwrap();
        state.sessions.insert(user_id.to_string(), session.clone());
        Ok(())
    }

    async fn delete_session(&self, user_id: &str) -> anyhow::Result<()> {
        self.state.lock().unwrap().sessions.remove(user_id);
        Ok(())
    }

    async fn device_owner(&self, fingerprint: &str) -> anyhow::Result<Option<String>> {
        Ok(self.state.lock().unwrap().devices.get(fingerprint).cloned())
    }

    async fn bind_device(
        &self,
        fingerprint: &str,
        user_id: &str,
        _ttl: Duration,
    ) -> anyhow::Result<()> {
        let mut state = self.state.lock().unwrap();
        state
            .devices
            .insert(fingerprint.to_string(), user_id.to_string());
        Ok(())
    }

    async fn enqueue_waiting(&self, user_id: &str, score: i64) -> anyhow::Result<()> {
        let mut state = self.state.lock().unwrap();
        if !state.waiting.iter().any(|(_, u)| u == user_id) {
            state.waiting.push((score, user_id.to_string()));
            state.waiting.sort_by(|a, b| a.0.cmp(&b.0));
        }
        Ok(())
    }

    async fn waiting_rank(&self, user_id: &str) -> anyhow::Result<Option<i64>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .waiting
            .iter()
            .position(|(_, u)| u == user_id)
            .map(|p| p as i64))
    }

    async fn waiting_count(&self) -> anyhow::Result<i64> {
        Ok(self.state.lock().unwrap().waiting.len() as i64)
    }

    async fn pop_waiting(&self, count: usize) -> anyhow::Result<Vec<String>> {
        let mut state = self.state.lock().unwrap();
        let n = count.min(state.waiting.len());
        Ok(state.waiting.drain(..n).map(|(_, u)| u).collect())
    }

    async fn remove_waiting(&self, user_id: &str) -> anyhow::Result<()> {
        self.state
            .lock()
            .unwrap()
            .waiting
            .retain(|(_, u)| u != user_id);
        Ok(())
    }

    async fn activate(&self, user_id: &str, _ttl: Duration) -> anyhow::Result<()> {
        let mut state = self.state.lock().unwrap();
        state.active.insert(user_id.to_string());
        state.markers.insert(user_id.to_string());
        Ok(())
    }

    async fn deactivate(&self, user_id: &str) -> anyhow::Result<()> {
        let mut state = self.state.lock().unwrap();
        state.active.remove(user_id);
        state.markers.remove(user_id);
        Ok(())
    }

    async fn active_users(&self) -> anyhow::Result<Vec<String>> {
        Ok(self.state.lock().unwrap().active.iter().cloned().collect())
    }

    async fn active_count(&self) -> anyhow::Result<i64> {
        Ok(self.state.lock().unwrap().active.len() as i64)
    }

    async fn is_marked_active(&self, user_id: &str) -> anyhow::Result<bool> {
        Ok(self.state.lock().unwrap().markers.contains(user_id))
    }
}

#[derive(Default)]
pub struct MemoryLock {
    held: Mutex<HashMap<String, String>>,
}

impl MemoryLock {
    pub fn is_held(&self, key: &str) -> bool {
        self.held.lock().unwrap().contains_key(key)
    }

    pub fn hold(&self, key: &str, owner: &str) {
        self.held
            .lock()
            .unwrap()
            .insert(key.to_string(), owner.to_string());
    }
}

#[async_trait]
impl DistributedLock for MemoryLock {
    async fn try_acquire(
        &self,
        key: &str,
        owner: &str,
        _ttl: std::time::Duration,
    ) -> anyhow::Result<bool> {
        let mut held = self.held.lock().unwrap();
        if held.contains_key(key) {
            return Ok(false);
        }
        held.insert(key.to_string(), owner.to_string());
        Ok(true)
    }

    async fn release(&self, key: &str, owner: &str) -> anyhow::Result<bool> {
        let mut held = self.held.lock().unwrap();
        if held.get(key).map(|o| o == owner).unwrap_or(false) {
            held.remove(key);
            return Ok(true);
        }
        Ok(false)
    }
}

#[derive(Default)]
pub struct RecordingPublisher {
    published: Mutex<Vec<(String, EventEnvelope)>>,
}

impl RecordingPublisher {
    pub fn events(&self) -> Vec<DomainEvent> {
        self.published
            .lock()
            .unwrap()
            .iter()
            .map(|(_, e)| e.event.clone())
            .collect()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.events().iter().map(|e| e.name()).collect()
    }

    pub fn topics(&self) -> Vec<String> {
        self.published
            .lock()
            .unwrap()
            .iter()
            .map(|(t, _)| t.clone())
            .collect()
    }
}

#[async_trait]
impl EventPublisher for RecordingPublisher {
    async fn publish(&self, topic: &str, envelope: &EventEnvelope) -> anyhow::Result<()> {
        self.published
            .lock()
            .unwrap()
            .push((topic.to_string(), envelope.clone()));
        Ok(())
    }
}

#[derive(Default)]
struct RankingState {
    bookings: HashMap<i64, Vec<(String, i64)>>,
    scores: HashMap<RankingType, HashMap<i64, f64>>,
    stats: HashMap<i64, HashMap<String, String>>,
}

#[derive(Default)]
pub struct MemoryRankingStore {
    state: Mutex<RankingState>,
}

impl MemoryRankingStore {
    pub fn stats_for(&self, concert_id: i64) -> Option<HashMap<String, String>> {
        self.state.lock().unwrap().stats.get(&concert_id).cloned()
    }
}

#[async_trait]
impl RankingStore for MemoryRankingStore {
    async fn add_booking(
        &self,
        concert_id: i64,
        booking_id: &str,
        at_secs: i64,
        window_secs: i64,
    ) -> anyhow::Result<i64> {
        let mut state = self.state.lock().unwrap();
        let entries = state.bookings.entry(concert_id).or_default();
        if !entries.iter().any(|(id, _)| id == booking_id) {
            entries.push((booking_id.to_string(), at_secs));
        }
        entries.retain(|(_, at)| *at >= at_secs - window_secs);
        Ok(entries.len() as i64)
    }

    async fn count_bookings_since(
        &self,
        concert_id: i64,
        since_secs: i64,
    ) -> anyhow::Result<i64> {
        let state = self.state.lock().unwrap();
        Ok(state
            .bookings
            .get(&concert_id)
            .map(|e| e.iter().filter(|(_, at)| *at >= since_secs).count() as i64)
            .unwrap_or(0))
    }

    async fn set_score(
        &self,
        kind: RankingType,
        concert_id: i64,
        score: f64,
    ) -> anyhow::Result<()> {
        let mut state = self.state.lock().unwrap();
        state
            .scores
            .entry(kind)
            .or_default()
            .insert(concert_id, score);
        Ok(())
    }

    async fn score(&self, kind: RankingType, concert_id: i64) -> anyhow::Result<Option<f64>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .scores
            .get(&kind)
            .and_then(|m| m.get(&concert_id))
            .copied())
    }

    async fn top(&self, kind: RankingType, limit: usize) -> anyhow::Result<Vec<(i64, f64)>> {
        let state = self.state.lock().unwrap();
        let mut rows: Vec<(i64, f64)> = state
            .scores
            .get(&kind)
            .map(|m| m.iter().map(|(k, v)| (*k, *v)).collect())
            .unwrap_or_default();
        rows.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        rows.truncate(limit);
        Ok(rows)
    }

    async fn save_concert_stats(
        &self,
        concert_id: i64,
        stats: HashMap<String, String>,
    ) -> anyhow::Result<()> {
        self.state.lock().unwrap().stats.insert(concert_id, stats);
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeDataPlatform {
    failing: AtomicBool,
    sent: Mutex<Vec<ReservationData>>,
}

impl FakeDataPlatform {
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn sent(&self) -> Vec<ReservationData> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl DataPlatformClient for FakeDataPlatform {
    async fn send(&self, data: &ReservationData) -> anyhow::Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            anyhow::bail!("upstream returned status 503 Service Unavailable");
        }
        self.sent.lock().unwrap().push(data.clone());
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<(String, String)>>,
}

impl RecordingNotifier {
    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, user_id: &str, message: &str) -> anyhow::Result<()> {
        self.sent
            .lock()
            .unwrap()
            .push((user_id.to_string(), message.to_string()));
        Ok(())
    }
}
