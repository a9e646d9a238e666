pub mod registry;
pub mod slot;
pub mod tariff;

pub use registry::SlotRegistry;
pub use slot::{Slot, SlotId, VehicleType};
pub use tariff::{Tariff, TariffError};
