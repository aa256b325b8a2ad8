pub(crate) mod collection;
mod catalog;
mod data_store;
mod groups;
mod ledger;
mod packages;
mod slots;

pub use catalog::PriceCatalog;
pub use data_store::{BalanceEntry, DataStore, StoreSnapshot};
pub use groups::GroupStore;
pub use ledger::Ledger;
pub use packages::PackageStore;
pub use slots::{AvailableDays, LocatedSlot, SlotStore};
