use std::env;
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Which durable list store backs the clinic records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreBackend {
    File,
    Memory,
    Supabase,
}

impl StoreBackend {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "file" | "json" => Some(StoreBackend::File),
            "memory" | "in_memory" => Some(StoreBackend::Memory),
            "supabase" => Some(StoreBackend::Supabase),
            _ => None,
        }
    }
}

impl fmt::Display for StoreBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreBackend::File => write!(f, "file"),
            StoreBackend::Memory => write!(f, "memory"),
            StoreBackend::Supabase => write!(f, "supabase"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub store_backend: StoreBackend,
    pub data_dir: PathBuf,
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub bind_address: String,
    pub appointment_id_prefix: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from any key lookup. `from_env` is this with
    /// the process environment plugged in.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let store_backend = match lookup("CLINIC_STORE_BACKEND") {
            Some(raw) => StoreBackend::parse(&raw).unwrap_or_else(|| {
                warn!("Unknown CLINIC_STORE_BACKEND '{}', using file store", raw);
                StoreBackend::File
            }),
            None => {
                warn!("CLINIC_STORE_BACKEND not set, using file store");
                StoreBackend::File
            }
        };

        let config = Self {
            store_backend,
            data_dir: lookup("CLINIC_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| {
                    warn!("CLINIC_DATA_DIR not set, using ./data");
                    PathBuf::from("./data")
                }),
            supabase_url: lookup("SUPABASE_URL")
                .unwrap_or_else(|| {
                    if store_backend == StoreBackend::Supabase {
                        warn!("SUPABASE_URL not set, using empty value");
                    }
                    String::new()
                }),
            supabase_anon_key: lookup("SUPABASE_ANON_PUBLIC_KEY")
                .unwrap_or_else(|| {
                    if store_backend == StoreBackend::Supabase {
                        warn!("SUPABASE_ANON_PUBLIC_KEY not set, using empty value");
                    }
                    String::new()
                }),
            bind_address: lookup("CLINIC_BIND_ADDRESS")
                .unwrap_or_else(|| {
                    warn!("CLINIC_BIND_ADDRESS not set, using default");
                    "0.0.0.0:3000".to_string()
                }),
            appointment_id_prefix: lookup("CLINIC_APPOINTMENT_PREFIX")
                .filter(|prefix| !prefix.trim().is_empty())
                .unwrap_or_else(|| "A".to_string()),
        };

        if !config.is_configured() {
            warn!("Application not fully configured for the {} store backend", config.store_backend);
        }

        config
    }

    /// A configuration that keeps everything in process memory.
    pub fn in_memory() -> Self {
        Self {
            store_backend: StoreBackend::Memory,
            data_dir: PathBuf::from("./data"),
            supabase_url: String::new(),
            supabase_anon_key: String::new(),
            bind_address: "127.0.0.1:0".to_string(),
            appointment_id_prefix: "A".to_string(),
        }
    }

    pub fn is_configured(&self) -> bool {
        match self.store_backend {
            StoreBackend::File => !self.data_dir.as_os_str().is_empty(),
            StoreBackend::Memory => true,
            StoreBackend::Supabase => {
                !self.supabase_url.is_empty() && !self.supabase_anon_key.is_empty()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_nothing_set() {
        let config = AppConfig::from_lookup(|_| None);

        assert_eq!(config.store_backend, StoreBackend::File);
        assert_eq!(config.data_dir, PathBuf::from("./data"));
        assert_eq!(config.bind_address, "0.0.0.0:3000");
        assert_eq!(config.appointment_id_prefix, "A");
        assert!(config.is_configured());
    }

    #[test]
    fn test_supabase_backend_requires_url_and_key() {
        let config = AppConfig::from_lookup(lookup_from(&[("CLINIC_STORE_BACKEND", "supabase")]));
        assert_eq!(config.store_backend, StoreBackend::Supabase);
        assert!(!config.is_configured());

        let config = AppConfig::from_lookup(lookup_from(&[
            ("CLINIC_STORE_BACKEND", "Supabase"),
            ("SUPABASE_URL", "http://localhost:54321"),
            ("SUPABASE_ANON_PUBLIC_KEY", "anon"),
        ]));
        assert!(config.is_configured());
    }

    #[test]
    fn test_unknown_backend_falls_back_to_file() {
        let config = AppConfig::from_lookup(lookup_from(&[("CLINIC_STORE_BACKEND", "postgres")]));
        assert_eq!(config.store_backend, StoreBackend::File);
    }

    #[test]
    fn test_blank_prefix_is_ignored() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("CLINIC_APPOINTMENT_PREFIX", "  "),
            ("CLINIC_DATA_DIR", "/var/lib/clinic"),
        ]));
        assert_eq!(config.appointment_id_prefix, "A");
        assert_eq!(config.data_dir, PathBuf::from("/var/lib/clinic"));
    }
}
