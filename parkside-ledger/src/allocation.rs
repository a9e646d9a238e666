use chrono::Duration;
use parkside_catalog::{Slot, SlotRegistry, VehicleType};

/// Stays longer than this are steered to the farthest matching slot.
const LONG_STAY_HOURS: i64 = 3;

/// Select a slot for a new booking, or `None` when capacity is exhausted.
///
/// Candidates are the available slots matching the vehicle type, ascending
/// by id. Requests longer than three hours take the last candidate (the
/// "farthest" slot); everything else takes the first (the "nearest").
/// This is a deliberate locality proxy, not a distance computation, and
/// its behavior is load-bearing for compatibility.
pub fn select_slot<'a>(
    registry: &'a SlotRegistry,
    vehicle_type: &VehicleType,
    duration: Duration,
) -> Option<&'a Slot> {
    let available = registry.list_available(vehicle_type);

    if duration.num_hours() > LONG_STAY_HOURS {
        available.last().copied()
    } else {
        available.first().copied()
    }
}
