use chrono::{DateTime, Utc};
use parkside_catalog::SlotId;
use serde::{Deserialize, Serialize};

pub type BookingId = u32;

/// The person a booking or waitlist entry belongs to.
///
/// No uniqueness is enforced; a User is owned exclusively by the Booking
/// or Waitlist entry that references it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub name: String,
    pub vehicle_number: String,
    pub contact: String,
}

impl User {
    pub fn new(
        name: impl Into<String>,
        vehicle_number: impl Into<String>,
        contact: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            vehicle_number: vehicle_number.into(),
            contact: contact.into(),
        }
    }

    pub fn details(&self) -> String {
        format!("{} ({})", self.name, self.vehicle_number)
    }
}

/// An active reservation binding a User to a Slot for an interval.
///
/// The fee is stored rather than derived so a load from persistence keeps
/// the fee it was saved with; the ledger recomputes it on every timestamp
/// mutation that bills differently.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: BookingId,
    pub user: User,
    pub slot_id: SlotId,
    pub entry_time: DateTime<Utc>,
    pub exit_time: DateTime<Utc>,
    pub fee: i64,
}

impl Booking {
    pub fn new(
        id: BookingId,
        user: User,
        slot_id: SlotId,
        entry_time: DateTime<Utc>,
        exit_time: DateTime<Utc>,
        fee: i64,
    ) -> Self {
        Self {
            id,
            user,
            slot_id,
            entry_time,
            exit_time,
            fee,
        }
    }
}
