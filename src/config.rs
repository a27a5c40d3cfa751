use std::path::PathBuf;

use anyhow::{bail, Context};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
    pub refresh_ttl_minutes: i64,
}

/// Where the `users`, `issues` and session records live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    Memory,
    File { dir: PathBuf },
    Postgres { database_url: String },
}

#[derive(Debug, Clone, Deserialize)]
pub struct PhotoStorageConfig {
    pub endpoint: String,
    pub bucket: String,
    pub access_key: String,
    pub secret_key: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub store: StoreBackend,
    pub jwt: JwtConfig,
    /// `None` disables photo upload.
    pub photos: Option<PhotoStorageConfig>,
    pub seed_demo_data: bool,
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

impl StoreBackend {
    fn from_env() -> anyhow::Result<Self> {
        let kind = std::env::var("STORE_BACKEND").unwrap_or_else(|_| "file".into());
        Ok(match kind.as_str() {
            "memory" => Self::Memory,
            "file" => Self::File {
                dir: std::env::var("DATA_DIR")
                    .unwrap_or_else(|_| "./data".into())
                    .into(),
            },
            "postgres" => Self::Postgres {
                database_url: std::env::var("DATABASE_URL")
                    .context("DATABASE_URL is required for STORE_BACKEND=postgres")?,
            },
            other => bail!("unknown STORE_BACKEND {other:?}, expected memory, file or postgres"),
        })
    }
}

impl PhotoStorageConfig {
    fn from_env() -> Option<Self> {
        Some(Self {
            endpoint: std::env::var("MINIO_ENDPOINT").ok()?,
            bucket: std::env::var("MINIO_BUCKET").ok()?,
            access_key: std::env::var("MINIO_ACCESS_KEY").ok()?,
            secret_key: std::env::var("MINIO_SECRET_KEY").ok()?,
        })
    }
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET").context("JWT_SECRET is required")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "civicpulse".into()),
            audience: std::env::var("JWT_AUDIENCE")
                .unwrap_or_else(|_| "civicpulse-users".into()),
            ttl_minutes: env_parse("JWT_TTL_MINUTES", 60),
            refresh_ttl_minutes: env_parse("JWT_REFRESH_TTL_MINUTES", 60 * 24 * 14),
        };
        Ok(Self {
            store: StoreBackend::from_env()?,
            jwt,
            photos: PhotoStorageConfig::from_env(),
            seed_demo_data: env_parse("SEED_DEMO_DATA", false),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_parse_falls_back_on_garbage() {
        std::env::set_var("CIVICPULSE_TEST_TTL", "not-a-number");
        assert_eq!(env_parse("CIVICPULSE_TEST_TTL", 60_i64), 60);
        std::env::set_var("CIVICPULSE_TEST_TTL", "15");
        assert_eq!(env_parse("CIVICPULSE_TEST_TTL", 60_i64), 15);
        assert!(!env_parse("CIVICPULSE_TEST_UNSET", false));
    }
}
