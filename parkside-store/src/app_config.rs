use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub storage: StorageConfig,
    pub business_rules: BusinessRules,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    pub bookings_file: String,
    pub waitlist_file: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BusinessRules {
    /// Flat hourly rate, in currency units.
    pub rate_per_hour: i64,
    /// Stay length granted to a promoted waitlist user.
    pub default_promotion_hours: i64,
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let s = config::Config::builder()
            // Coded defaults so the binary runs with no config file at all
            .set_default("storage.bookings_file", "bookings.txt")?
            .set_default("storage.waitlist_file", "waitlist.txt")?
            .set_default("business_rules.rate_per_hour", 20_i64)?
            .set_default("business_rules.default_promotion_hours", 2_i64)?
            // Optional configuration file
            .add_source(config::File::with_name("config/parkside").required(false))
            // Environment overrides, e.g. PARKSIDE__BUSINESS_RULES__RATE_PER_HOUR=25
            .add_source(config::Environment::with_prefix("PARKSIDE").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
