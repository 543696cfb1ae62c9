pub mod persistence;
pub mod slots;

pub use persistence::{FileStore, PersistenceGateway};
pub use slots::{EntrySlotStore, SlotIndex};
