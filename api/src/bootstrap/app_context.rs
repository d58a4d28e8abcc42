use std::sync::Arc;

use crate::application::ports::balance_repository::BalanceRepository;
use crate::application::ports::concert_repository::ConcertRepository;
use crate::application::ports::data_platform::DataPlatformClient;
use crate::application::ports::distributed_lock::DistributedLock;
use crate::application::ports::event_bus::{EventPublisher, EventSubscriber};
use crate::application::ports::failed_transfer_repository::FailedTransferRepository;
use crate::application::ports::notifier::Notifier;
use crate::application::ports::payment_repository::PaymentRepository;
use crate::application::ports::queue_store::QueueStore;
use crate::application::ports::ranking_store::RankingStore;
use crate::application::ports::reservation_repository::ReservationRepository;
use crate::application::ports::seat_repository::SeatRepository;
use crate::application::use_cases::queue::QueuePolicy;
use crate::bootstrap::config::Config;

#[derive(Clone)]
pub struct AppContext {
    pub cfg: Config,
    services: Arc<AppServices>,
}

#[derive(Clone)]
pub struct AppServices {
    concert_repo: Arc<dyn ConcertRepository>,
    seat_repo: Arc<dyn SeatRepository>,
    reservation_repo: Arc<dyn ReservationRepository>,
    payment_repo: Arc<dyn PaymentRepository>,
    balance_repo: Arc<dyn BalanceRepository>,
    failed_transfer_repo: Arc<dyn FailedTransferRepository>,
    queue_store: Arc<dyn QueueStore>,
    lock: Arc<dyn DistributedLock>,
    ranking_store: Arc<dyn RankingStore>,
    event_publisher: Arc<dyn EventPublisher>,
    event_subscriber: Arc<dyn EventSubscriber>,
    notifier: Arc<dyn Notifier>,
    data_platform: Option<Arc<dyn DataPlatformClient>>,
}

impl AppServices {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        concert_repo: Arc<dyn ConcertRepository>,
        seat_repo: Arc<dyn SeatRepository>,
        reservation_repo: Arc<dyn ReservationRepository>,
        payment_repo: Arc<dyn PaymentRepository>,
        balance_repo: Arc<dyn BalanceRepository>,
        failed_transfer_repo: Arc<dyn FailedTransferRepository>,
        queue_store: Arc<dyn QueueStore>,
        lock: Arc<dyn DistributedLock>,
        ranking_store: Arc<dyn RankingStore>,
        event_publisher: Arc<dyn EventPublisher>,
        event_subscriber: Arc<dyn EventSubscriber>,
        notifier: Arc<dyn Notifier>,
        data_platform: Option<Arc<dyn DataPlatformClient>>,
    ) -> Self {
        Self {
            concert_repo,
            seat_repo,
            reservation_repo,
            payment_repo,
            balance_repo,
            failed_transfer_repo,
            queue_store,
            lock,
            ranking_store,
            event_publisher,
            event_subscriber,
            notifier,
            data_platform,
        }
    }
}

impl AppContext {
    pub fn new(cfg: Config, services: AppServices) -> Self {
        Self {
            cfg,
            services: Arc::new(services),
        }
    }

    pub fn concert_repo(&self) -> Arc<dyn ConcertRepository> {
        self.services.concert_repo.clone()
    }

    pub fn seat_repo(&self) -> Arc<dyn SeatRepository> {
        self.services.seat_repo.clone()
    }

    pub fn reservation_repo(&self) -> Arc<dyn ReservationRepository> {
        self.services.reservation_repo.clone()
    }

    pub fn payment_repo(&self) -> Arc<dyn PaymentRepository> {
        self.services.payment_repo.clone()
    }

    pub fn balance_repo(&self) -> Arc<dyn BalanceRepository> {
        self.services.balance_repo.clone()
    }

    pub fn failed_transfer_repo(&self) -> Arc<dyn FailedTransferRepository> {
        self.services.failed_transfer_repo.clone()
    }

    pub fn queue_store(&self) -> Arc<dyn QueueStore> {
        self.services.queue_store.clone()
    }

    pub fn lock(&self) -> Arc<dyn DistributedLock> {
        self.services.lock.clone()
    }

    pub fn ranking_store(&self) -> Arc<dyn RankingStore> {
        self.services.ranking_store.clone()
    }

    pub fn event_publisher(&self) -> Arc<dyn EventPublisher> {
        self.services.event_publisher.clone()
    }

    pub fn event_subscriber(&self) -> Arc<dyn EventSubscriber> {
        self.services.event_subscriber.clone()
    }

    pub fn notifier(&self) -> Arc<dyn Notifier> {
        self.services.notifier.clone()
    }

    pub fn data_platform(&self) -> Option<Arc<dyn DataPlatformClient>> {
        self.services.data_platform.clone()
    }

    pub fn queue_policy(&self) -> QueuePolicy {
        self.cfg.queue_policy()
    }
}
