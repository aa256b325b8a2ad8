// ── Booking controller ──
//
// Cheaply cloneable facade over the store and the booking workflow.
// Commands go through an mpsc channel; the processor task spawns one
// worker per command, so bookings for different slots run concurrently
// and correctness rests on the stores' per-entry atomicity.

use std::future::Future;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use tokio::sync::{Mutex, broadcast, mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, info};

use crate::command::{Command, CommandEnvelope, CommandResult};
use crate::config::BookingConfig;
use crate::error::CoreError;
use crate::model::{BookingEvent, BookingRecord, EntityId, GroupSession, Package, WalletTransaction};
use crate::notify::{NoopNotifier, Notifier};
use crate::provision::{RoomProvisioner, Unconfigured};
use crate::store::{AvailableDays, DataStore, LocatedSlot};

const COMMAND_CHANNEL_SIZE: usize = 64;
const EVENT_CHANNEL_SIZE: usize = 256;

// ── ControllerState ──────────────────────────────────────────────

/// Lifecycle state observable by consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    Stopped,
    Running,
}

// ── Controller ───────────────────────────────────────────────────

/// The booking workflow entry point.
///
/// Cheaply cloneable via `Arc<ControllerInner>`. Owns the store, the
/// room provisioner and the notifier; routes every [`Command`] through
/// the workflow.
#[derive(Clone)]
pub struct Controller {
    pub(crate) inner: Arc<ControllerInner>,
}

pub(crate) struct ControllerInner {
    pub(crate) config: BookingConfig,
    pub(crate) store: Arc<DataStore>,
    pub(crate) provisioner: Arc<dyn RoomProvisioner>,
    pub(crate) notifier: Arc<dyn Notifier>,
    pub(crate) event_tx: broadcast::Sender<Arc<BookingEvent>>,
    state: watch::Sender<ControllerState>,
    command_tx: mpsc::Sender<CommandEnvelope>,
    command_rx: Mutex<Option<mpsc::Receiver<CommandEnvelope>>>,
    cancel: CancellationToken,
    workers: TaskTracker,
    task_handles: Mutex<Vec<JoinHandle<()>>>,
}

/// Assembles a [`Controller`] from its collaborators.
pub struct ControllerBuilder {
    config: BookingConfig,
    store: Option<Arc<DataStore>>,
    provisioner: Option<Arc<dyn RoomProvisioner>>,
    notifier: Option<Arc<dyn Notifier>>,
}

impl ControllerBuilder {
    pub fn store(mut self, store: Arc<DataStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn provisioner(mut self, provisioner: Arc<dyn RoomProvisioner>) -> Self {
        self.provisioner = Some(provisioner);
        self
    }

    pub fn notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn build(self) -> Result<Controller, CoreError> {
        self.config.validate()?;

        let (state, _) = watch::channel(ControllerState::Stopped);
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_SIZE);
        let (command_tx, command_rx) = mpsc::channel(COMMAND_CHANNEL_SIZE);

        Ok(Controller {
            inner: Arc::new(ControllerInner {
                config: self.config,
                store: self.store.unwrap_or_default(),
                provisioner: self.provisioner.unwrap_or_else(|| Arc::new(Unconfigured)),
                notifier: self.notifier.unwrap_or_else(|| Arc::new(NoopNotifier)),
                event_tx,
                state,
                command_tx,
                command_rx: Mutex::new(Some(command_rx)),
                cancel: CancellationToken::new(),
                workers: TaskTracker::new(),
                task_handles: Mutex::new(Vec::new()),
            }),
        })
    }
}

impl Controller {
    pub fn builder(config: BookingConfig) -> ControllerBuilder {
        ControllerBuilder {
            config,
            store: None,
            provisioner: None,
            notifier: None,
        }
    }

    /// Controller with an empty store, no room service and no notifier.
    pub fn new(config: BookingConfig) -> Result<Self, CoreError> {
        Self::builder(config).build()
    }

    pub fn config(&self) -> &BookingConfig {
        &self.inner.config
    }

    pub fn store(&self) -> &Arc<DataStore> {
        &self.inner.store
    }

    // ── Lifecycle ────────────────────────────────────────────────

    /// Spawn the command processor. Idempotent.
    pub async fn start(&self) {
        let mut handles = self.inner.task_handles.lock().await;
        if let Some(rx) = self.inner.command_rx.lock().await.take() {
            let ctrl = self.clone();
            handles.push(tokio::spawn(command_processor_task(ctrl, rx)));
            self.inner.state.send_replace(ControllerState::Running);
            info!("booking controller started");
        }
    }

    /// Stop accepting commands and wait for in-flight ones to finish.
    pub async fn shutdown(&self) {
        self.inner.cancel.cancel();

        let mut handles = self.inner.task_handles.lock().await;
        for handle in handles.drain(..) {
            let _ = handle.await;
        }

        self.inner.workers.close();
        self.inner.workers.wait().await;

        self.inner.state.send_replace(ControllerState::Stopped);
        debug!("booking controller stopped");
    }

    /// Subscribe to lifecycle state changes.
    pub fn state(&self) -> watch::Receiver<ControllerState> {
        self.inner.state.subscribe()
    }

    // ── Command execution ────────────────────────────────────────

    /// Execute a command.
    ///
    /// Sends the command through the internal channel to the command
    /// processor task and awaits the result.
    pub async fn execute(&self, cmd: Command) -> Result<CommandResult, CoreError> {
        if *self.inner.state.borrow() != ControllerState::Running {
            return Err(CoreError::ControllerStopped);
        }

        let (tx, rx) = tokio::sync::oneshot::channel();

        self.inner
            .command_tx
            .send(CommandEnvelope {
                command: cmd,
                response_tx: tx,
            })
            .await
            .map_err(|_| CoreError::ControllerStopped)?;

        rx.await.map_err(|_| CoreError::ControllerStopped)?
    }

    /// One-shot: start, run closure, shut down.
    pub async fn oneshot<F, Fut, T>(self, f: F) -> Result<T, CoreError>
    where
        F: FnOnce(Controller) -> Fut,
        Fut: Future<Output = Result<T, CoreError>>,
    {
        self.start().await;
        let result = f(self.clone()).await;
        self.shutdown().await;
        result
    }

    // ── Event observation ────────────────────────────────────────

    /// Subscribe to the booking event broadcast.
    pub fn events(&self) -> broadcast::Receiver<Arc<BookingEvent>> {
        self.inner.event_tx.subscribe()
    }

    /// Hand a committed event to the notifier and the broadcast channel.
    pub(crate) fn emit(&self, event: BookingEvent) {
        self.inner.notifier.emit(&event);
        let _ = self.inner.event_tx.send(Arc::new(event));
    }

    // ── Queries (delegate to DataStore) ──────────────────────────

    pub fn slot(&self, id: &EntityId) -> Option<LocatedSlot> {
        self.inner.store.slots().slot(id)
    }

    pub fn available_days(&self, provider: &EntityId, after: NaiveDate) -> AvailableDays<'_> {
        self.inner.store.slots().find_available(provider, after)
    }

    pub fn balance(&self, consumer: &EntityId) -> u64 {
        self.inner.store.ledger().balance(consumer)
    }

    pub fn packages_for_consumer(&self, consumer: &EntityId) -> Vec<Arc<Package>> {
        self.inner.store.packages().active_for_consumer(consumer)
    }

    pub fn packages_for_provider(&self, provider: &EntityId) -> Vec<Arc<Package>> {
        self.inner.store.packages().for_provider(provider)
    }

    pub fn records_for(&self, participant: &EntityId) -> Vec<Arc<BookingRecord>> {
        self.inner.store.records_for(participant)
    }

    pub fn records_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Vec<Arc<BookingRecord>> {
        self.inner.store.records_between(from, to)
    }

    pub fn transactions_for(&self, participant: &EntityId) -> Vec<Arc<WalletTransaction>> {
        self.inner.store.transactions_for(participant)
    }

    pub fn group_sessions_for(&self, provider: &EntityId) -> Vec<Arc<GroupSession>> {
        self.inner.store.groups().for_provider(provider)
    }
}

// ── Background tasks ─────────────────────────────────────────────

/// Receive envelopes until cancelled; each command runs on its own
/// tracked worker task.
async fn command_processor_task(controller: Controller, mut rx: mpsc::Receiver<CommandEnvelope>) {
    let cancel = controller.inner.cancel.clone();

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            envelope = rx.recv() => {
                let Some(envelope) = envelope else { break };
                let ctrl = controller.clone();
                controller.inner.workers.spawn(async move {
                    let result = route_command(&ctrl, envelope.command).await;
                    let _ = envelope.response_tx.send(result);
                });
            }
        }
    }
}

// ── Command routing ──────────────────────────────────────────────

async fn route_command(controller: &Controller, cmd: Command) -> Result<CommandResult, CoreError> {
    let store = &controller.inner.store;

    match cmd {
        // ── Schedule ─────────────────────────────────────────────

        Command::PublishSlots {
            provider,
            date,
            times,
        } => {
            let added = store.slots().publish(&provider, date, &times)?;
            Ok(CommandResult::Published { added })
        }

        Command::PublishSchedule { provider, days } => {
            let added = store.slots().publish_many(&provider, &days)?;
            Ok(CommandResult::Published { added })
        }

        Command::UpdateSlotNote { slot, note } => {
            store.slots().update_note(&slot, note)?;
            Ok(CommandResult::Ok)
        }

        Command::DeleteSlot { slot } => {
            let refunded = controller.delete_slot(&slot)?;
            Ok(CommandResult::SlotDeleted { slot, refunded })
        }

        // ── Booking workflow ─────────────────────────────────────

        Command::Book(intent) => controller.book(intent).await,

        Command::ConfirmSlot { slot } => {
            let record = controller.confirm_slot(&slot).await?;
            Ok(CommandResult::Confirmed(Box::new(record)))
        }

        Command::CancelSlot { slot } => {
            let refunded = controller.cancel_slot(&slot)?;
            Ok(CommandResult::Cancelled { slot, refunded })
        }

        // ── Ledger ───────────────────────────────────────────────

        Command::TopUp { consumer, amount } => {
            if consumer.is_blank() {
                return Err(CoreError::validation("consumer id is required"));
            }
            if amount == 0 {
                return Err(CoreError::validation("top-up amount must be greater than zero"));
            }
            let balance = store.ledger().credit(&consumer, amount);
            info!(%consumer, amount, balance, "balance topped up");
            Ok(CommandResult::Balance { consumer, balance })
        }

        // ── Price catalog ────────────────────────────────────────

        Command::SetPrice {
            provider,
            call_type,
            price_per_minute,
        } => {
            if provider.is_blank() {
                return Err(CoreError::validation("provider id is required"));
            }
            store.catalog().set(provider, call_type, price_per_minute);
            Ok(CommandResult::Ok)
        }

        // ── Packages ─────────────────────────────────────────────

        Command::CreatePackage(req) => {
            let package = req.into_package()?;
            store.packages().insert(package.clone());
            Ok(CommandResult::Package(Box::new(package)))
        }

        Command::UsePackage { package } => {
            let package = store.packages().consume(&package)?;
            Ok(CommandResult::Package(Box::new(package)))
        }

        Command::UpdatePackage { package, patch } => {
            let package = store.packages().update(&package, &patch)?;
            Ok(CommandResult::Package(Box::new(package)))
        }

        Command::DeletePackage { package } => {
            store.packages().delete(&package)?;
            Ok(CommandResult::Ok)
        }

        // ── Group sessions ───────────────────────────────────────

        Command::CreateGroupSession(req) => {
            let session = req.into_session()?;
            store.groups().insert(session.clone());
            info!(session = %session.id, provider = %session.provider, "group session created");
            Ok(CommandResult::GroupSession(Box::new(session)))
        }

        Command::UpdateGroupSession { session, patch } => {
            let session = controller.update_group_session(&session, patch)?;
            Ok(CommandResult::GroupSession(Box::new(session)))
        }

        Command::DeleteGroupSession { session } => {
            let refunded = controller.delete_group_session(&session)?;
            Ok(CommandResult::GroupSessionDeleted { session, refunded })
        }
    }
}
