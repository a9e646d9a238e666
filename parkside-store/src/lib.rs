pub mod app_config;
pub mod flat_file;

pub use app_config::Config;
pub use flat_file::{BookingStore, FileStore, StoreError};
