pub mod clock;
pub mod hold;
pub mod ledger;
pub mod memory;
pub mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use hold::{AppointmentHold, HoldStatus, SlotRange};
pub use ledger::{HoldLedger, HoldPolicy, SweepReport};
pub use memory::InMemoryHoldStore;
pub use store::{HoldStore, StoreError};

use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("Slot for barber {barber_id} is already held by {existing}")]
    Conflict { barber_id: String, existing: Uuid },
    #[error("Hold not found: {0}")]
    NotFound(Uuid),
    #[error("Persistence failure: {0}")]
    Persistence(#[source] StoreError),
}

pub type LedgerResult<T> = Result<T, LedgerError>;
