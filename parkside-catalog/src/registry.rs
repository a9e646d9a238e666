use crate::slot::{Slot, SlotId, VehicleType};

/// Fixed inventory of parking slots.
///
/// Slots are created once at startup and never destroyed; only the
/// availability flag changes afterwards.
pub struct SlotRegistry {
    slots: Vec<Slot>,
}

impl SlotRegistry {
    pub fn new(slots: Vec<Slot>) -> Self {
        Self { slots }
    }

    /// The lot layout used when no custom layout is supplied:
    /// two car slots and two bike slots across two floors.
    pub fn default_layout() -> Self {
        Self::new(vec![
            Slot::new(101, 1, VehicleType::Car),
            Slot::new(102, 1, VehicleType::Bike),
            Slot::new(103, 2, VehicleType::Car),
            Slot::new(104, 2, VehicleType::Bike),
        ])
    }

    pub fn find(&self, id: SlotId) -> Option<&Slot> {
        self.slots.iter().find(|s| s.id == id)
    }

    fn find_mut(&mut self, id: SlotId) -> Option<&mut Slot> {
        self.slots.iter_mut().find(|s| s.id == id)
    }

    /// Available slots matching the vehicle type, ascending by id.
    pub fn list_available(&self, vehicle_type: &VehicleType) -> Vec<&Slot> {
        let mut matching: Vec<&Slot> = self
            .slots
            .iter()
            .filter(|s| s.is_available() && s.vehicle_type == *vehicle_type)
            .collect();
        matching.sort_by_key(|s| s.id);
        matching
    }

    /// Flip the slot to occupied. Idempotent; unknown ids are ignored.
    pub fn mark_booked(&mut self, id: SlotId) {
        if let Some(slot) = self.find_mut(id) {
            slot.mark_booked();
        }
    }

    /// Flip the slot back to available. Idempotent; unknown ids are ignored.
    pub fn mark_available(&mut self, id: SlotId) {
        if let Some(slot) = self.find_mut(id) {
            slot.mark_available();
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Slot> {
        self.slots.iter()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl Default for SlotRegistry {
    fn default() -> Self {
        Self::default_layout()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_available_filters_and_sorts() {
        let registry = SlotRegistry::default_layout();

        let cars = registry.list_available(&VehicleType::Car);
        let ids: Vec<SlotId> = cars.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![101, 103]);

        let bikes = registry.list_available(&VehicleType::Bike);
        let ids: Vec<SlotId> = bikes.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![102, 104]);
    }

    #[test]
    fn test_booked_slots_drop_out_of_availability() {
        let mut registry = SlotRegistry::default_layout();

        registry.mark_booked(101);
        let ids: Vec<SlotId> = registry
            .list_available(&VehicleType::Car)
            .iter()
            .map(|s| s.id)
            .collect();
        assert_eq!(ids, vec![103]);

        registry.mark_available(101);
        assert_eq!(registry.list_available(&VehicleType::Car).len(), 2);
    }

    #[test]
    fn test_mark_operations_are_idempotent() {
        let mut registry = SlotRegistry::default_layout();

        registry.mark_booked(101);
        registry.mark_booked(101);
        assert!(!registry.find(101).unwrap().is_available());

        registry.mark_available(101);
        registry.mark_available(101);
        assert!(registry.find(101).unwrap().is_available());

        // Unknown ids are a no-op, not a panic
        registry.mark_booked(999);
        assert!(registry.find(999).is_none());
    }
}
