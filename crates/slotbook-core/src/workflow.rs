// ── Booking workflow ──
//
// Multi-step booking operations on `Controller`. Each step that mutates
// state has an explicit inverse that runs if a later step fails:
//
//   debit    ↔ credit
//   reserve  ↔ restore (slot back to its pre-reservation state)
//   add seat ↔ (never needed: the seat is the last mutation)
//
// Whoever clears a slot's `charged` amount settles it: a refund on
// cancel or delete, the provider payout on confirm.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use tracing::{debug, error, info, warn};

use crate::command::{
    BookingIntent, BookingReceipt, CommandResult, GroupBooking, InstantBooking, Payment,
    SlotBooking,
};
use crate::controller::Controller;
use crate::error::CoreError;
use crate::model::{
    BookingEvent, BookingRecord, CallType, EntityId, GroupSession, GroupSessionPatch, GroupStatus,
    RecordStatus, RoomHandle, Slot, SlotStatus, Split, TransactionKind, TransactionStatus,
    WalletTransaction,
};
use crate::provision::{ProvisioningError, chat_room};
use crate::store::GroupStore;

const CONSISTENCY_TARGET: &str = "slotbook::consistency";

impl Controller {
    pub(crate) async fn book(&self, intent: BookingIntent) -> Result<CommandResult, CoreError> {
        intent.validate()?;
        debug!(consumer = %intent.consumer(), "booking intent accepted");
        match intent {
            BookingIntent::Slot(req) => {
                let receipt = self.book_slot(req).await?;
                Ok(CommandResult::Booked(Box::new(receipt)))
            }
            BookingIntent::Instant(req) => {
                let receipt = self.book_instant(req).await?;
                Ok(CommandResult::Booked(Box::new(receipt)))
            }
            BookingIntent::Group(req) => self.book_group(&req),
        }
    }

    // ── Slot booking ─────────────────────────────────────────────

    /// Price, charge, reserve, provision. A failure at any step leaves
    /// balance and slot exactly as they were.
    async fn book_slot(&self, req: SlotBooking) -> Result<BookingReceipt, CoreError> {
        let store = &self.inner.store;

        let located = store
            .slots()
            .slot(&req.slot)
            .ok_or_else(|| CoreError::not_found("slot", &req.slot))?;
        if located.provider != req.provider {
            return Err(CoreError::validation(format!(
                "slot {} is not published by provider {}",
                req.slot, req.provider
            )));
        }

        let total = store
            .catalog()
            .quote(&req.provider, req.call_type, req.duration_minutes)?;
        let balance = store.ledger().debit(&req.consumer, total)?;
        debug!(consumer = %req.consumer, total, "booking charged");

        let previous = match store.slots().reserve(
            &req.slot,
            &req.consumer,
            req.call_type,
            req.duration_minutes,
            total,
        ) {
            Ok(previous) => previous,
            Err(e) => {
                store.ledger().credit(&req.consumer, total);
                warn!(slot = %req.slot, consumer = %req.consumer, error = %e, "reserve refused; charge returned");
                return Err(e);
            }
        };

        let room = match self.provision_room(req.call_type, &req.provider).await {
            Ok(room) => room,
            Err(e) => {
                warn!(slot = %req.slot, consumer = %req.consumer, error = %e, "room provisioning failed; rolling back reservation");
                self.roll_back_reservation(&previous, &req.consumer, total)?;
                return Err(e);
            }
        };

        let attached = store.slots().update_slot(&req.slot, |slot| {
            if !slot.booked || slot.consumer.as_ref() != Some(&req.consumer) {
                return Err(CoreError::invalid_state("slot", &req.slot, slot.status, "attach room"));
            }
            // A confirm that won the race already stored its own room.
            if slot.room.is_none() {
                slot.room = Some(room.clone());
            }
            Ok(())
        });
        if let Err(e) = attached {
            // Cancel or delete already settled the charge.
            warn!(slot = %req.slot, consumer = %req.consumer, room_id = %room.room_id, "reservation changed during provisioning; room left unused");
            return Err(e);
        }

        info!(slot = %req.slot, consumer = %req.consumer, provider = %req.provider, "slot reserved");
        self.emit(BookingEvent::SlotReserved {
            slot: req.slot.clone(),
            consumer: req.consumer.clone(),
            provider: req.provider.clone(),
            room: room.clone(),
        });

        Ok(BookingReceipt {
            consumer: req.consumer,
            provider: req.provider,
            slot: Some(req.slot),
            call_type: req.call_type,
            duration_minutes: req.duration_minutes,
            charged: total,
            balance,
            room,
            record: None,
        })
    }

    fn roll_back_reservation(
        &self,
        previous: &Slot,
        consumer: &EntityId,
        amount: u64,
    ) -> Result<(), CoreError> {
        let store = &self.inner.store;
        if let Err(e) = store.slots().restore(previous, consumer) {
            // Someone else took the reservation over (cancel, delete or
            // confirm) and with it the refund decision.
            error!(target: CONSISTENCY_TARGET, slot = %previous.id, %consumer, amount, error = %e, "reservation could not be rolled back");
            return Err(e);
        }
        let balance = store.ledger().credit(consumer, amount);
        warn!(slot = %previous.id, %consumer, amount, balance, "booking compensated");
        Ok(())
    }

    // ── Confirmation ─────────────────────────────────────────────

    /// `pending → accepted`, producing the wallet entry and session
    /// record. The room provisioned at booking is reused; only a slot
    /// without one provisions here. A provisioning failure leaves the
    /// slot pending and writes nothing.
    pub(crate) async fn confirm_slot(&self, id: &EntityId) -> Result<BookingRecord, CoreError> {
        let store = &self.inner.store;

        let located = store
            .slots()
            .slot(id)
            .ok_or_else(|| CoreError::not_found("slot", id))?;
        let slot = &located.slot;
        if slot.status != SlotStatus::Pending {
            return Err(CoreError::invalid_state("slot", id, slot.status, "confirm"));
        }
        let (Some(consumer), Some(call_type), Some(duration)) =
            (slot.consumer.clone(), slot.call_type, slot.duration_minutes)
        else {
            error!(target: CONSISTENCY_TARGET, slot = %id, "pending slot is missing its booking details");
            return Err(CoreError::Consistency {
                message: format!("pending slot {id} has no consumer, call type or duration"),
            });
        };

        let total = store
            .catalog()
            .quote(&located.provider, call_type, duration)?;
        let (room, fresh) = match slot.room.clone() {
            Some(room) => (room, false),
            None => (self.provision_room(call_type, &located.provider).await?, true),
        };

        let confirmed = store.slots().update_slot(id, |current| {
            if current.status != SlotStatus::Pending || current.consumer.as_ref() != Some(&consumer)
            {
                return Err(CoreError::invalid_state("slot", id, current.status, "confirm"));
            }
            current.status = SlotStatus::Accepted;
            // The charge is now the provider's; nothing left to refund.
            current.charged = 0;
            current.room = Some(room.clone());
            Ok(())
        });
        if let Err(e) = confirmed {
            if fresh {
                warn!(slot = %id, room_id = %room.room_id, error = %e, "slot changed before confirmation; room left unused");
            }
            return Err(e);
        }

        let start = session_start(located.date, slot);
        let split = Split::of(total, self.inner.config.provider_share_percent);
        store.append_transaction(WalletTransaction {
            id: EntityId::generate(),
            consumer: consumer.clone(),
            provider: located.provider.clone(),
            slot: Some(id.clone()),
            amount: total,
            provider_share: split.provider,
            platform_share: split.platform,
            kind: TransactionKind::Credit,
            status: TransactionStatus::Confirmed,
            description: format!("Confirmed {call_type} session on {} {}", located.date, slot.time),
            created_at: Utc::now(),
        });

        let record = BookingRecord {
            id: EntityId::generate(),
            consumer,
            provider: located.provider.clone(),
            slot: Some(id.clone()),
            room,
            call_type,
            duration_minutes: duration,
            start,
            end: start + Duration::minutes(i64::from(duration)),
            status: RecordStatus::Pending,
        };
        store.append_record(record.clone());

        info!(slot = %id, record = %record.id, "slot confirmed");
        self.emit(BookingEvent::SlotConfirmed {
            record: record.clone(),
        });
        Ok(record)
    }

    // ── Cancellation ─────────────────────────────────────────────

    /// `pending → rejected`, refunding exactly what was charged for the
    /// slot. Returns the refunded amount.
    pub(crate) fn cancel_slot(&self, id: &EntityId) -> Result<u64, CoreError> {
        let store = &self.inner.store;

        let (consumer, refund) = store.slots().update_slot(id, |slot| match slot.status {
            SlotStatus::Open | SlotStatus::Accepted | SlotStatus::Rejected => {
                Err(CoreError::invalid_state("slot", id, slot.status, "cancel"))
            }
            SlotStatus::Pending => {
                let consumer = slot.consumer.take();
                let refund = std::mem::take(&mut slot.charged);
                slot.booked = false;
                slot.room = None;
                slot.status = SlotStatus::Rejected;
                Ok((consumer, refund))
            }
        })?;

        if let Some(consumer) = &consumer {
            if refund > 0 {
                let balance = store.ledger().credit(consumer, refund);
                info!(slot = %id, %consumer, refund, balance, "cancellation refunded");
            }
        }

        info!(slot = %id, "slot cancelled");
        self.emit(BookingEvent::SlotCancelled {
            slot: id.clone(),
            consumer,
            refunded: refund,
        });
        Ok(refund)
    }

    /// Hard-delete a slot. A pending reservation is refunded; an accepted
    /// one already paid the provider.
    pub(crate) fn delete_slot(&self, id: &EntityId) -> Result<u64, CoreError> {
        let store = &self.inner.store;
        let removed = store.slots().delete(id)?;
        let mut refunded = 0;
        if let Some(consumer) = &removed.consumer {
            if removed.status == SlotStatus::Pending && removed.charged > 0 {
                store.ledger().credit(consumer, removed.charged);
                refunded = removed.charged;
            }
        }
        info!(slot = %id, time = %removed.time, refunded, "slot deleted");
        Ok(refunded)
    }

    // ── Instant booking ──────────────────────────────────────────

    async fn book_instant(&self, req: InstantBooking) -> Result<BookingReceipt, CoreError> {
        let store = &self.inner.store;

        match &req.payment {
            Payment::Wallet => {
                let total = store
                    .catalog()
                    .quote(&req.provider, req.call_type, req.duration_minutes)?;
                let balance = store.ledger().debit(&req.consumer, total)?;

                let room = match self.provision_room(req.call_type, &req.provider).await {
                    Ok(room) => room,
                    Err(e) => {
                        store.ledger().credit(&req.consumer, total);
                        warn!(consumer = %req.consumer, total, error = %e, "room provisioning failed; charge returned");
                        return Err(e);
                    }
                };

                let record = self.finalize_instant(&req, room, total, "wallet");
                Ok(instant_receipt(req, record, total, balance))
            }
            Payment::Package { package } => {
                let current = store
                    .packages()
                    .get(package)
                    .ok_or_else(|| CoreError::not_found("package", package))?;
                if current.consumer != req.consumer || current.provider != req.provider {
                    return Err(CoreError::validation(format!(
                        "package {package} is not for this consumer and provider"
                    )));
                }
                if current.call_type != req.call_type {
                    return Err(CoreError::validation(format!(
                        "package {package} covers {} sessions, not {}",
                        current.call_type, req.call_type
                    )));
                }
                if !current.is_consumable() {
                    return Err(CoreError::Exhausted {
                        identifier: package.to_string(),
                    });
                }

                // Consume only once the room exists: a package has no
                // inverse for consumption.
                let room = self.provision_room(req.call_type, &req.provider).await?;
                let used = store.packages().consume(package)?;

                let record = self.finalize_instant(
                    &req,
                    room,
                    used.per_session_price(),
                    &format!("package {package}"),
                );
                let balance = store.ledger().balance(&req.consumer);
                Ok(instant_receipt(req, record, 0, balance))
            }
        }
    }

    fn finalize_instant(
        &self,
        req: &InstantBooking,
        room: RoomHandle,
        amount: u64,
        paid_with: &str,
    ) -> BookingRecord {
        let store = &self.inner.store;
        let now = Utc::now();

        let split = Split::of(amount, self.inner.config.provider_share_percent);
        store.append_transaction(WalletTransaction {
            id: EntityId::generate(),
            consumer: req.consumer.clone(),
            provider: req.provider.clone(),
            slot: None,
            amount,
            provider_share: split.provider,
            platform_share: split.platform,
            kind: TransactionKind::Debit,
            status: TransactionStatus::Confirmed,
            description: format!("Instant {} session paid with {paid_with}", req.call_type),
            created_at: now,
        });

        let record = BookingRecord {
            id: EntityId::generate(),
            consumer: req.consumer.clone(),
            provider: req.provider.clone(),
            slot: None,
            room,
            call_type: req.call_type,
            duration_minutes: req.duration_minutes,
            start: now,
            end: now + Duration::minutes(i64::from(req.duration_minutes)),
            status: RecordStatus::Pending,
        };
        store.append_record(record.clone());

        info!(record = %record.id, consumer = %req.consumer, provider = %req.provider, "instant booking finalized");
        self.emit(BookingEvent::InstantBooked {
            record: record.clone(),
        });
        record
    }

    // ── Group booking ────────────────────────────────────────────

    fn book_group(&self, req: &GroupBooking) -> Result<CommandResult, CoreError> {
        let store = &self.inner.store;

        let session = store
            .groups()
            .get(&req.session)
            .ok_or_else(|| CoreError::not_found("group session", &req.session))?;
        GroupStore::check_bookable(&session, &req.consumer)?;

        let price = session.price;
        let balance = store.ledger().debit(&req.consumer, price)?;

        let session = match store.groups().add_seat(&req.session, &req.consumer) {
            Ok(session) => session,
            Err(e) => {
                store.ledger().credit(&req.consumer, price);
                warn!(session = %req.session, consumer = %req.consumer, error = %e, "seat lost after charge; refunded");
                return Err(e);
            }
        };

        let split = Split::of(price, self.inner.config.provider_share_percent);
        store.append_transaction(WalletTransaction {
            id: EntityId::generate(),
            consumer: req.consumer.clone(),
            provider: session.provider.clone(),
            slot: None,
            amount: price,
            provider_share: split.provider,
            platform_share: split.platform,
            kind: TransactionKind::Debit,
            status: TransactionStatus::Confirmed,
            description: format!("Group session: {}", session.title),
            created_at: Utc::now(),
        });

        info!(session = %session.id, consumer = %req.consumer, seats_left = session.seats_left(), "group seat booked");
        self.emit(BookingEvent::GroupSeatBooked {
            session: session.id.clone(),
            consumer: req.consumer.clone(),
            provider: session.provider.clone(),
            join_link: session.join_link.clone(),
        });

        Ok(CommandResult::GroupBooked {
            session: Box::new(session),
            charged: price,
            balance,
        })
    }

    /// Apply a patch; cancelling a scheduled session refunds its seats.
    pub(crate) fn update_group_session(
        &self,
        id: &EntityId,
        patch: GroupSessionPatch,
    ) -> Result<GroupSession, CoreError> {
        let (session, released) = self.inner.store.groups().update(id, patch)?;
        if !released.is_empty() {
            self.refund_seats(&session, released);
        }
        Ok(session)
    }

    /// Remove a session. Seats of a still-scheduled session are refunded;
    /// returns the total refunded.
    pub(crate) fn delete_group_session(&self, id: &EntityId) -> Result<u64, CoreError> {
        let removed = self.inner.store.groups().delete(id)?;
        let refunded = if removed.status == GroupStatus::Scheduled
            && !removed.booked_consumers.is_empty()
        {
            self.refund_seats(&removed, removed.booked_consumers.clone())
        } else {
            0
        };
        info!(session = %id, refunded, "group session deleted");
        Ok(refunded)
    }

    fn refund_seats(&self, session: &GroupSession, consumers: Vec<EntityId>) -> u64 {
        let store = &self.inner.store;
        let split = Split::of(session.price, self.inner.config.provider_share_percent);
        let mut refunded = 0;
        for consumer in &consumers {
            let balance = store.ledger().credit(consumer, session.price);
            store.append_transaction(WalletTransaction {
                id: EntityId::generate(),
                consumer: consumer.clone(),
                provider: session.provider.clone(),
                slot: None,
                amount: session.price,
                provider_share: split.provider,
                platform_share: split.platform,
                kind: TransactionKind::Refund,
                status: TransactionStatus::Refunded,
                description: format!("Group session cancelled: {}", session.title),
                created_at: Utc::now(),
            });
            refunded += session.price;
            debug!(session = %session.id, %consumer, amount = session.price, balance, "seat refunded");
        }

        info!(session = %session.id, seats = consumers.len(), refunded, "group session seats refunded");
        self.emit(BookingEvent::GroupSessionCancelled {
            session: session.id.clone(),
            provider: session.provider.clone(),
            consumers,
            refunded,
        });
        refunded
    }

    // ── Room provisioning ────────────────────────────────────────

    async fn provision_room(
        &self,
        call_type: CallType,
        provider: &EntityId,
    ) -> Result<RoomHandle, CoreError> {
        let Some(kind) = call_type.room_kind() else {
            return Ok(chat_room(&self.inner.config, provider));
        };

        let timeout = self.inner.config.provisioning_timeout;
        match tokio::time::timeout(timeout, self.inner.provisioner.create_room(kind)).await {
            Ok(Ok(room)) => {
                debug!(room_id = %room.room_id, %kind, "room provisioned");
                Ok(room)
            }
            Ok(Err(e)) => Err(e.into()),
            Err(_) => Err(ProvisioningError::Timeout {
                timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
            }
            .into()),
        }
    }
}

/// Slot date plus its time label; falls back to now when the label is
/// not a clock time.
fn session_start(date: NaiveDate, slot: &Slot) -> DateTime<Utc> {
    if let Some(time) = slot.parsed_time() {
        date.and_time(time).and_utc()
    } else {
        warn!(slot = %slot.id, time = %slot.time, "unparseable slot time; session starts now");
        Utc::now()
    }
}

fn instant_receipt(
    req: InstantBooking,
    record: BookingRecord,
    charged: u64,
    balance: u64,
) -> BookingReceipt {
    BookingReceipt {
        consumer: req.consumer,
        provider: req.provider,
        slot: None,
        call_type: req.call_type,
        duration_minutes: req.duration_minutes,
        charged,
        balance,
        room: record.room.clone(),
        record: Some(record),
    }
}
