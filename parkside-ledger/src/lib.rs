pub mod allocation;
pub mod ledger;
pub mod models;
pub mod waitlist;

pub use ledger::{BookingLedger, CreateOutcome, LedgerError, Release};
pub use models::{Booking, BookingId, User};
pub use waitlist::Waitlist;
