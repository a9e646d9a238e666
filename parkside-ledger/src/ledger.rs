use crate::allocation;
use crate::models::{Booking, BookingId, User};
use crate::waitlist::Waitlist;
use chrono::{DateTime, Duration, Utc};
use parkside_catalog::{SlotId, SlotRegistry, Tariff, VehicleType};
use std::collections::BTreeMap;

/// Hours a promoted waitlist booking runs for by default.
pub const DEFAULT_PROMOTION_HOURS: i64 = 2;

/// Outcome of a booking request.
///
/// Capacity exhaustion is a routing decision, not an error: the caller
/// offers waitlist enrollment instead.
#[derive(Debug)]
pub enum CreateOutcome {
    Booked(Booking),
    NoCapacity,
}

/// Result of releasing a booking via cancel or early exit.
#[derive(Debug)]
pub struct Release {
    /// The booking that was removed from the ledger.
    pub booking: Booking,
    /// The booking created for the waitlist head, if anyone was waiting.
    pub promoted: Option<Booking>,
}

/// Owns all active bookings, the waitlist, and the id counter.
///
/// Bookings are keyed by id in a `BTreeMap`, so every scan (listing,
/// vehicle lookup) runs in ascending booking-id order. That order is the
/// tie-break for duplicate vehicle numbers.
pub struct BookingLedger {
    bookings: BTreeMap<BookingId, Booking>,
    waitlist: Waitlist,
    next_id: BookingId,
    tariff: Tariff,
    promotion_duration: Duration,
}

impl BookingLedger {
    pub fn new(tariff: Tariff, promotion_duration: Duration) -> Self {
        Self {
            bookings: BTreeMap::new(),
            waitlist: Waitlist::new(),
            next_id: 1,
            tariff,
            promotion_duration,
        }
    }

    /// Book a slot for `user`, choosing it via the allocation policy.
    ///
    /// An exit earlier than the entry does not block the booking: it is
    /// logged and recorded with a zero fee, matching the tariff contract.
    pub fn create(
        &mut self,
        registry: &mut SlotRegistry,
        user: User,
        entry_time: DateTime<Utc>,
        exit_time: DateTime<Utc>,
        vehicle_type: &VehicleType,
    ) -> CreateOutcome {
        let duration = exit_time - entry_time;
        let slot_id = match allocation::select_slot(registry, vehicle_type, duration) {
            Some(slot) => slot.id,
            None => {
                tracing::info!(%vehicle_type, "no capacity for booking request");
                return CreateOutcome::NoCapacity;
            }
        };

        registry.mark_booked(slot_id);
        let fee = self.quote_or_zero(entry_time, exit_time);
        let id = self.allocate_id();
        let booking = Booking::new(id, user, slot_id, entry_time, exit_time, fee);
        self.bookings.insert(id, booking.clone());

        tracing::info!(booking_id = id, slot_id, fee, "booking created");
        CreateOutcome::Booked(booking)
    }

    /// Cancel a booking, free its slot, and promote the waitlist head
    /// onto the just-freed slot if anyone is waiting.
    pub fn cancel(
        &mut self,
        registry: &mut SlotRegistry,
        id: BookingId,
    ) -> Result<Release, LedgerError> {
        let booking = self
            .bookings
            .remove(&id)
            .ok_or(LedgerError::NotFound(id))?;

        registry.mark_available(booking.slot_id);
        tracing::info!(booking_id = id, slot_id = booking.slot_id, "booking cancelled");

        let promoted = self.promote_into(registry, booking.slot_id, Utc::now());
        Ok(Release { booking, promoted })
    }

    /// Close a booking at `now`, keeping the originally scheduled fee.
    ///
    /// The fee deliberately does not shrink to the shorter actual stay;
    /// only `update_exit_time` rebills. The slot is freed and the same
    /// promotion step as `cancel` runs.
    pub fn early_exit(
        &mut self,
        registry: &mut SlotRegistry,
        id: BookingId,
        now: DateTime<Utc>,
    ) -> Result<Release, LedgerError> {
        let entry_time = self
            .bookings
            .get(&id)
            .ok_or(LedgerError::NotFound(id))?
            .entry_time;
        if now < entry_time {
            return Err(LedgerError::ExitBeforeEntry {
                entry: entry_time,
                exit: now,
            });
        }

        let mut booking = self
            .bookings
            .remove(&id)
            .ok_or(LedgerError::NotFound(id))?;
        booking.exit_time = now;

        registry.mark_available(booking.slot_id);
        tracing::info!(
            booking_id = id,
            slot_id = booking.slot_id,
            fee = booking.fee,
            "early exit, fee unchanged"
        );

        let promoted = self.promote_into(registry, booking.slot_id, now);
        Ok(Release { booking, promoted })
    }

    /// Correct the vehicle number on an existing booking. No fee impact.
    pub fn update_vehicle_number(
        &mut self,
        id: BookingId,
        vehicle_number: impl Into<String>,
    ) -> Result<(), LedgerError> {
        let booking = self
            .bookings
            .get_mut(&id)
            .ok_or(LedgerError::NotFound(id))?;
        booking.user.vehicle_number = vehicle_number.into();
        Ok(())
    }

    /// Move the exit time and rebill. Returns the recomputed fee.
    pub fn update_exit_time(
        &mut self,
        id: BookingId,
        new_exit: DateTime<Utc>,
    ) -> Result<i64, LedgerError> {
        let entry_time = self
            .bookings
            .get(&id)
            .ok_or(LedgerError::NotFound(id))?
            .entry_time;
        if new_exit < entry_time {
            return Err(LedgerError::ExitBeforeEntry {
                entry: entry_time,
                exit: new_exit,
            });
        }

        let fee = self.quote_or_zero(entry_time, new_exit);
        if let Some(booking) = self.bookings.get_mut(&id) {
            booking.exit_time = new_exit;
            booking.fee = fee;
        }
        Ok(fee)
    }

    /// First booking whose vehicle number matches, case-insensitively.
    /// Ties on duplicate numbers resolve to the lowest booking id.
    pub fn find_by_vehicle(&self, vehicle_number: &str) -> Option<&Booking> {
        let needle = vehicle_number.trim();
        self.bookings
            .values()
            .find(|b| b.user.vehicle_number.eq_ignore_ascii_case(needle))
    }

    pub fn get(&self, id: BookingId) -> Option<&Booking> {
        self.bookings.get(&id)
    }

    /// Active bookings in ascending id order.
    pub fn bookings(&self) -> impl Iterator<Item = &Booking> {
        self.bookings.values()
    }

    pub fn len(&self) -> usize {
        self.bookings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bookings.is_empty()
    }

    /// The id the next booking will receive.
    pub fn next_id(&self) -> BookingId {
        self.next_id
    }

    pub fn enqueue_waitlist(&mut self, user: User) {
        tracing::info!(user = %user.details(), "user joined the waitlist");
        self.waitlist.enqueue(user);
    }

    pub fn waitlist(&self) -> &Waitlist {
        &self.waitlist
    }

    /// Rebuild ledger state from persisted records.
    ///
    /// Each record whose slot still exists re-occupies that slot; records
    /// naming unknown slots are dropped with a warning. The id counter is
    /// advanced past the maximum loaded id so ids stay strictly
    /// increasing across reloads. Returns the number of records kept.
    pub fn restore(
        &mut self,
        records: impl IntoIterator<Item = Booking>,
        registry: &mut SlotRegistry,
    ) -> usize {
        let mut count = 0;
        for record in records {
            if registry.find(record.slot_id).is_none() {
                tracing::warn!(
                    booking_id = record.id,
                    slot_id = record.slot_id,
                    "persisted booking references unknown slot, dropping"
                );
                continue;
            }
            registry.mark_booked(record.slot_id);
            self.next_id = self.next_id.max(record.id + 1);
            self.bookings.insert(record.id, record);
            count += 1;
        }
        count
    }

    /// Rebuild the waitlist from persisted records, preserving order.
    pub fn restore_waitlist(&mut self, users: impl IntoIterator<Item = User>) -> usize {
        let mut count = 0;
        for user in users {
            self.waitlist.enqueue(user);
            count += 1;
        }
        count
    }

    /// Reassign a just-freed slot to the waitlist head, bypassing the
    /// allocation policy: the slot is pre-determined.
    fn promote_into(
        &mut self,
        registry: &mut SlotRegistry,
        slot_id: SlotId,
        now: DateTime<Utc>,
    ) -> Option<Booking> {
        let user = self.waitlist.dequeue()?;

        let exit_time = now + self.promotion_duration;
        let fee = self.quote_or_zero(now, exit_time);
        let id = self.allocate_id();
        let booking = Booking::new(id, user, slot_id, now, exit_time, fee);

        registry.mark_booked(slot_id);
        self.bookings.insert(id, booking.clone());

        tracing::info!(
            booking_id = id,
            slot_id,
            user = %booking.user.details(),
            "waitlisted user promoted into freed slot"
        );
        Some(booking)
    }

    fn allocate_id(&mut self) -> BookingId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn quote_or_zero(&self, entry: DateTime<Utc>, exit: DateTime<Utc>) -> i64 {
        match self.tariff.quote(entry, exit) {
            Ok(fee) => fee,
            Err(e) => {
                tracing::warn!("{e}; recording zero fee");
                0
            }
        }
    }
}

impl Default for BookingLedger {
    fn default() -> Self {
        Self::new(Tariff::default(), Duration::hours(DEFAULT_PROMOTION_HOURS))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("Booking {0} not found")]
    NotFound(BookingId),

    #[error("Exit time {exit} cannot be before entry time {entry}")]
    ExitBeforeEntry {
        entry: DateTime<Utc>,
        exit: DateTime<Utc>,
    },
}
