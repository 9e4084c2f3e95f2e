use std::path::Path;
use std::sync::Arc;

use shared_config::{AppConfig, StoreBackend};

/// Configuration builder for tests that need a wired-up store.
pub struct TestConfig {
    pub backend: StoreBackend,
    pub data_dir: String,
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub appointment_id_prefix: String,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Memory,
            data_dir: "./target/test-data".to_string(),
            supabase_url: "http://localhost:54321".to_string(),
            supabase_anon_key: "test-anon-key".to_string(),
            appointment_id_prefix: "A".to_string(),
        }
    }
}

impl TestConfig {
    pub fn memory() -> Self {
        Self::default()
    }

    pub fn file(dir: &Path) -> Self {
        Self {
            backend: StoreBackend::File,
            data_dir: dir.display().to_string(),
            ..Self::default()
        }
    }

    pub fn supabase(url: &str) -> Self {
        Self {
            backend: StoreBackend::Supabase,
            supabase_url: url.to_string(),
            ..Self::default()
        }
    }

    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            store_backend: self.backend,
            data_dir: self.data_dir.clone().into(),
            supabase_url: self.supabase_url.clone(),
            supabase_anon_key: self.supabase_anon_key.clone(),
            bind_address: "127.0.0.1:0".to_string(),
            appointment_id_prefix: self.appointment_id_prefix.clone(),
        }
    }

    pub fn to_arc(&self) -> Arc<AppConfig> {
        Arc::new(self.to_app_config())
    }
}

/// A date in `d-M-yyyy` form known to fall on the given weekday.
///
/// Week of 2 June 2025: Monday the 2nd through Sunday the 8th.
pub fn date_on(weekday: &str) -> &'static str {
    match weekday.to_lowercase().as_str() {
        "monday" => "2-6-2025",
        "tuesday" => "3-6-2025",
        "wednesday" => "4-6-2025",
        "thursday" => "5-6-2025",
        "friday" => "6-6-2025",
        "saturday" => "7-6-2025",
        "sunday" => "8-6-2025",
        _ => "not-a-date",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_config_is_configured() {
        let config = TestConfig::memory().to_app_config();
        assert_eq!(config.store_backend, StoreBackend::Memory);
        assert!(config.is_configured());
    }

    #[test]
    fn test_date_on_known_weekdays() {
        assert_eq!(date_on("Monday"), "2-6-2025");
        assert_eq!(date_on("sunday"), "8-6-2025");
    }
}
