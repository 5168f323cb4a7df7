use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub database: DatabaseConfig,
    pub search: SearchConfig,
    pub media: MediaConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
    pub idle_timeout_secs: u64,
    pub enable_slow_query_warning: bool,
    pub slow_query_threshold_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    pub max_limit: i64,
    pub default_limit: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaConfig {
    pub api_base: String,
    pub api_key: String,
    pub cleanup_queue_depth: usize,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Database overrides
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_ACQUIRE_TIMEOUT_SECS") {
            self.database.acquire_timeout_secs = v.parse().unwrap_or(self.database.acquire_timeout_secs);
        }
        if let Ok(v) = env::var("DATABASE_IDLE_TIMEOUT_SECS") {
            self.database.idle_timeout_secs = v.parse().unwrap_or(self.database.idle_timeout_secs);
        }
        if let Ok(v) = env::var("DATABASE_SLOW_QUERY_THRESHOLD_MS") {
            self.database.slow_query_threshold_ms = v.parse().unwrap_or(self.database.slow_query_threshold_ms);
        }

        // Search overrides
        if let Ok(v) = env::var("SEARCH_MAX_LIMIT") {
            self.search.max_limit = v.parse().unwrap_or(self.search.max_limit);
        }
        if let Ok(v) = env::var("SEARCH_DEFAULT_LIMIT") {
            self.search.default_limit = v.parse().unwrap_or(self.search.default_limit);
        }

        // Media overrides
        if let Ok(v) = env::var("MEDIA_API_BASE") {
            self.media.api_base = v;
        }
        if let Ok(v) = env::var("MEDIA_API_KEY") {
            self.media.api_key = v;
        }
        if let Ok(v) = env::var("MEDIA_CLEANUP_QUEUE_DEPTH") {
            self.media.cleanup_queue_depth = v.parse().unwrap_or(self.media.cleanup_queue_depth);
        }

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            database: DatabaseConfig {
                max_connections: 10,
                acquire_timeout_secs: 30,
                idle_timeout_secs: 600,
                enable_slow_query_warning: true,
                slow_query_threshold_ms: 100,
            },
            search: SearchConfig {
                max_limit: 50,
                default_limit: 10,
            },
            media: MediaConfig {
                api_base: "http://localhost:9090/v1".to_string(),
                api_key: String::new(),
                cleanup_queue_depth: 64,
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            database: DatabaseConfig {
                max_connections: 20,
                acquire_timeout_secs: 10,
                idle_timeout_secs: 300,
                enable_slow_query_warning: true,
                slow_query_threshold_ms: 500,
            },
            search: SearchConfig {
                max_limit: 50,
                default_limit: 10,
            },
            media: MediaConfig {
                api_base: "https://media.staging.example.com/v1".to_string(),
                api_key: String::new(),
                cleanup_queue_depth: 256,
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            database: DatabaseConfig {
                max_connections: 50,
                acquire_timeout_secs: 5,
                idle_timeout_secs: 300,
                enable_slow_query_warning: true,
                slow_query_threshold_ms: 1000,
            },
            search: SearchConfig {
                max_limit: 50,
                default_limit: 10,
            },
            media: MediaConfig {
                api_base: "https://media.example.com/v1".to_string(),
                api_key: String::new(),
                cleanup_queue_depth: 256,
            },
        }
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_development_config() {
        let config = AppConfig::development();
        assert_eq!(config.database.max_connections, 10);
        assert_eq!(config.search.max_limit, 50);
        assert_eq!(config.search.default_limit, 10);
    }

    #[test]
    fn test_default_production_config() {
        let config = AppConfig::production();
        assert_eq!(config.database.max_connections, 50);
        assert_eq!(config.database.acquire_timeout_secs, 5);
        // The page-size cap is part of the API contract and does not vary by env
        assert_eq!(config.search.max_limit, 50);
    }
}
