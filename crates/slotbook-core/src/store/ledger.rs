// ── Consumer balances ──
//
// One integer balance per consumer. Debit is a single read-modify-write
// under the consumer's shard lock, so a debit that would go negative is
// refused without ever touching the balance.

use dashmap::DashMap;
use tracing::debug;

use crate::error::CoreError;
use crate::model::EntityId;

#[derive(Default)]
pub struct Ledger {
    balances: DashMap<EntityId, u64>,
}

impl Ledger {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Current balance; consumers never seen before have 0.
    pub fn balance(&self, consumer: &EntityId) -> u64 {
        self.balances.get(consumer).map_or(0, |b| *b.value())
    }

    /// Take `amount` from `consumer`. Returns the new balance.
    pub fn debit(&self, consumer: &EntityId, amount: u64) -> Result<u64, CoreError> {
        if amount == 0 {
            return Ok(self.balance(consumer));
        }
        let insufficient = |balance| CoreError::InsufficientFunds {
            consumer: consumer.to_string(),
            balance,
            required: amount,
        };

        let Some(mut entry) = self.balances.get_mut(consumer) else {
            return Err(insufficient(0));
        };
        let balance = *entry.value();
        let next = balance.checked_sub(amount).ok_or_else(|| insufficient(balance))?;
        *entry.value_mut() = next;
        drop(entry);

        debug!(%consumer, amount, balance = next, "ledger debit");
        Ok(next)
    }

    /// Add `amount` to `consumer` (refunds, compensation, top-ups).
    /// Returns the new balance. Saturates at `u64::MAX`.
    pub fn credit(&self, consumer: &EntityId, amount: u64) -> u64 {
        let mut entry = self.balances.entry(consumer.clone()).or_insert(0);
        let next = entry.value().saturating_add(amount);
        *entry.value_mut() = next;
        drop(entry);

        debug!(%consumer, amount, balance = next, "ledger credit");
        next
    }

    /// Every known balance, ordered by consumer id.
    pub fn balances(&self) -> Vec<(EntityId, u64)> {
        let mut all: Vec<(EntityId, u64)> = self
            .balances
            .iter()
            .map(|r| (r.key().clone(), *r.value()))
            .collect();
        all.sort();
        all
    }

    pub(crate) fn set(&self, consumer: EntityId, balance: u64) {
        self.balances.insert(consumer, balance);
    }

    pub(crate) fn clear(&self) {
        self.balances.clear();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[test]
    fn unknown_consumer_has_zero_and_cannot_pay() {
        let ledger = Ledger::new();
        let who = EntityId::from("nobody");
        assert_eq!(ledger.balance(&who), 0);
        let err = ledger.debit(&who, 1).unwrap_err();
        assert!(matches!(
            err,
            CoreError::InsufficientFunds {
                balance: 0,
                required: 1,
                ..
            }
        ));
    }

    #[test]
    fn debits_sum_up_and_never_go_negative() {
        let ledger = Ledger::new();
        let who = EntityId::from("user-1");
        ledger.credit(&who, 100);

        assert_eq!(ledger.debit(&who, 30).unwrap(), 70);
        assert_eq!(ledger.debit(&who, 45).unwrap(), 25);
        assert!(ledger.debit(&who, 26).is_err());
        assert_eq!(ledger.balance(&who), 25);
        assert_eq!(ledger.debit(&who, 25).unwrap(), 0);
    }

    #[test]
    fn zero_debit_is_a_no_op() {
        let ledger = Ledger::new();
        let who = EntityId::from("user-1");
        assert_eq!(ledger.debit(&who, 0).unwrap(), 0);
        assert!(ledger.balances().is_empty());
    }

    #[test]
    fn concurrent_debits_never_overdraw() {
        let ledger = Arc::new(Ledger::new());
        let who = EntityId::from("user-1");
        ledger.credit(&who, 50);

        let handles: Vec<_> = (0..20)
            .map(|_| {
                let ledger = Arc::clone(&ledger);
                let who = who.clone();
                std::thread::spawn(move || ledger.debit(&who, 5).is_ok())
            })
            .collect();
        let successes = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|ok| *ok)
            .count();

        assert_eq!(successes, 10);
        assert_eq!(ledger.balance(&who), 0);
    }
}
