use std::fmt;
use std::str::FromStr;

use thiserror::Error;

const MIN_SECRET_LEN: usize = 16;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} has an invalid value: {reason}")]
    Invalid { name: &'static str, reason: String },
}

#[derive(Clone)]
pub struct CloudinaryConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub upload_preset: String,
    pub folder: Option<String>,
}

impl fmt::Debug for CloudinaryConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CloudinaryConfig")
            .field("cloud_name", &self.cloud_name)
            .field("api_key", &"<redacted>")
            .field("upload_preset", &self.upload_preset)
            .field("folder", &self.folder)
            .finish()
    }
}

/// Process configuration, read once at startup.
#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt_secret: String,
    pub token_ttl_secs: i64,
    pub host: String,
    pub port: u16,
    pub db_max_connections: u32,
    pub cors_allowed_origins: Vec<String>,
    pub cloudinary: CloudinaryConfig,
    pub max_upload_bytes: usize,
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("database_url", &"<redacted>")
            .field("jwt_secret", &"<redacted>")
            .field("token_ttl_secs", &self.token_ttl_secs)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("db_max_connections", &self.db_max_connections)
            .field("cors_allowed_origins", &self.cors_allowed_origins)
            .field("cloudinary", &self.cloudinary)
            .field("max_upload_bytes", &self.max_upload_bytes)
            .finish()
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let jwt_secret = required(&lookup, "JWT_SECRET")?;
        if jwt_secret.len() < MIN_SECRET_LEN {
            return Err(ConfigError::Invalid {
                name: "JWT_SECRET",
                reason: format!("must be at least {MIN_SECRET_LEN} characters"),
            });
        }

        let token_ttl_secs: i64 = parsed(&lookup, "TOKEN_TTL_SECS", 1800)?;
        if token_ttl_secs <= 0 {
            return Err(ConfigError::Invalid {
                name: "TOKEN_TTL_SECS",
                reason: "must be positive".to_string(),
            });
        }

        let cors_allowed_origins = optional(&lookup, "CORS_ALLOWED_ORIGINS")
            .map(|origins| {
                origins
                    .split(',')
                    .map(str::trim)
                    .filter(|origin| !origin.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            database_url: required(&lookup, "DATABASE_URL")?,
            jwt_secret,
            token_ttl_secs,
            host: optional(&lookup, "HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parsed(&lookup, "PORT", 3000)?,
            db_max_connections: parsed(&lookup, "DB_MAX_CONNECTIONS", 5)?,
            cors_allowed_origins,
            cloudinary: CloudinaryConfig {
                cloud_name: required(&lookup, "CLOUDINARY_CLOUD_NAME")?,
                api_key: required(&lookup, "CLOUDINARY_API_KEY")?,
                upload_preset: optional(&lookup, "CLOUDINARY_UPLOAD_PRESET")
                    .unwrap_or_else(|| "ml_default".to_string()),
                folder: optional(&lookup, "CLOUDINARY_FOLDER"),
            },
            max_upload_bytes: parsed(&lookup, "MAX_UPLOAD_BYTES", 5 * 1024 * 1024)?,
        })
    }

    pub fn bind_addr(&self) -> (String, u16) {
        (self.host.clone(), self.port)
    }
}

/// Blank values count as unset.
fn optional<F>(lookup: &F, name: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn required<F>(lookup: &F, name: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    optional(lookup, name).ok_or(ConfigError::Missing(name))
}

fn parsed<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: fmt::Display,
{
    match optional(lookup, name) {
        Some(raw) => raw.parse().map_err(|e: T::Err| ConfigError::Invalid {
            name,
            reason: e.to_string(),
        }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    const BASE: [(&str, &str); 4] = [
        ("DATABASE_URL", "postgres://shop:pw@localhost/shop"),
        ("JWT_SECRET", "0123456789abcdef-secret"),
        ("CLOUDINARY_CLOUD_NAME", "demo"),
        ("CLOUDINARY_API_KEY", "123456"),
    ];

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_lookup(lookup_from(&BASE)).unwrap();
        assert_eq!(config.token_ttl_secs, 1800);
        assert_eq!(config.bind_addr(), ("0.0.0.0".to_string(), 3000));
        assert_eq!(config.db_max_connections, 5);
        assert!(config.cors_allowed_origins.is_empty());
        assert_eq!(config.cloudinary.upload_preset, "ml_default");
        assert_eq!(config.cloudinary.folder, None);
        assert_eq!(config.max_upload_bytes, 5_242_880);
    }

    #[test]
    fn test_overrides() {
        let mut pairs = BASE.to_vec();
        pairs.extend([
            ("PORT", "8080"),
            ("TOKEN_TTL_SECS", "60"),
            ("CORS_ALLOWED_ORIGINS", "http://a.test, ,http://b.test"),
            ("CLOUDINARY_FOLDER", "products"),
        ]);
        let config = AppConfig::from_lookup(lookup_from(&pairs)).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.token_ttl_secs, 60);
        assert_eq!(
            config.cors_allowed_origins,
            vec!["http://a.test".to_string(), "http://b.test".to_string()]
        );
        assert_eq!(config.cloudinary.folder.as_deref(), Some("products"));
    }

    #[test]
    fn test_missing_required() {
        let pairs: Vec<_> = BASE
            .iter()
            .copied()
            .filter(|(k, _)| *k != "DATABASE_URL")
            .collect();
        assert_eq!(
            AppConfig::from_lookup(lookup_from(&pairs)).unwrap_err(),
            ConfigError::Missing("DATABASE_URL")
        );
    }

    #[test]
    fn test_short_secret_and_bad_port_rejected() {
        let mut pairs = BASE.to_vec();
        pairs.push(("JWT_SECRET", "short"));
        let err = AppConfig::from_lookup(lookup_from(&pairs)).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "JWT_SECRET", .. }));

        let mut pairs = BASE.to_vec();
        pairs.push(("PORT", "http"));
        let err = AppConfig::from_lookup(lookup_from(&pairs)).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "PORT", .. }));
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let config = AppConfig::from_lookup(lookup_from(&BASE)).unwrap();
        let printed = format!("{config:?}");
        assert!(!printed.contains("0123456789abcdef-secret"));
        assert!(!printed.contains("shop:pw"));
        assert!(!printed.contains("123456\""));
    }
}
