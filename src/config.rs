use anyhow::{ensure, Context, Result};
use std::env;

pub const API_TITLE: &str = "S3 File Gateway";
pub const API_DESCRIPTION: &str = "A lightweight file upload and download API";
pub const API_VERSION: &str = env!("CARGO_PKG_VERSION");

const DEFAULT_REGION: &str = "us-east-1";
const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;
const DEFAULT_ALLOWED_EXTENSIONS: &str = "txt,pdf,jpg,jpeg,png,gif";
const DEFAULT_PRESIGNED_URL_EXPIRATION: u64 = 3600;

/// Longest expiration S3 accepts for a presigned URL (7 days).
pub const MAX_PRESIGNED_URL_EXPIRATION: u64 = 7 * 24 * 60 * 60;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors_allowed_origins: Vec<String>,
}

/// Process-wide configuration snapshot.
///
/// Built once at startup and shared read-only; handlers and the storage
/// gateway receive it by injection rather than reading the environment.
#[derive(Clone)]
pub struct Settings {
    pub server: ServerConfig,
    pub aws_access_key_id: String,
    pub aws_secret_access_key: String,
    pub aws_region: String,
    pub aws_s3_bucket: String,
    pub s3_endpoint: Option<String>,
    pub max_file_size: u64,
    pub allowed_extensions: Vec<String>,
    pub presigned_url_expiration: u64,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Parse settings from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str, default: &str| lookup(name).unwrap_or_else(|| default.to_string());

        let presigned_url_expiration: u64 = var(
            "PRESIGNED_URL_EXPIRATION",
            &DEFAULT_PRESIGNED_URL_EXPIRATION.to_string(),
        )
        .trim()
        .parse()
        .context("PRESIGNED_URL_EXPIRATION must be a number of seconds")?;
        ensure!(
            (1..=MAX_PRESIGNED_URL_EXPIRATION).contains(&presigned_url_expiration),
            "PRESIGNED_URL_EXPIRATION must be between 1 and {} seconds",
            MAX_PRESIGNED_URL_EXPIRATION
        );

        Ok(Self {
            server: ServerConfig {
                host: var("HOST", "0.0.0.0"),
                port: var("PORT", "8000")
                    .trim()
                    .parse()
                    .context("PORT must be a valid port number")?,
                cors_allowed_origins: split_list(&var("ALLOWED_ORIGINS", "*")),
            },
            aws_access_key_id: var("AWS_ACCESS_KEY_ID", ""),
            aws_secret_access_key: var("AWS_SECRET_ACCESS_KEY", ""),
            aws_region: var("AWS_REGION", DEFAULT_REGION),
            aws_s3_bucket: var("AWS_S3_BUCKET", ""),
            s3_endpoint: lookup("S3_ENDPOINT").filter(|s| !s.trim().is_empty()),
            max_file_size: var("MAX_FILE_SIZE", &DEFAULT_MAX_FILE_SIZE.to_string())
                .trim()
                .parse()
                .context("MAX_FILE_SIZE must be a number of bytes")?,
            allowed_extensions: parse_extensions(&var(
                "ALLOWED_EXTENSIONS",
                DEFAULT_ALLOWED_EXTENSIONS,
            )),
            presigned_url_expiration,
        })
    }

    /// True when the credential pair and the bucket name are all set.
    pub fn is_valid(&self) -> bool {
        self.missing_fields().is_empty()
    }

    /// Names of the required variables that are empty, in a fixed order.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("AWS_ACCESS_KEY_ID", &self.aws_access_key_id),
            ("AWS_SECRET_ACCESS_KEY", &self.aws_secret_access_key),
            ("AWS_S3_BUCKET", &self.aws_s3_bucket),
        ]
        .into_iter()
        .filter(|(_, value)| value.is_empty())
        .map(|(name, _)| name)
        .collect()
    }

    pub fn max_file_size_mb(&self) -> f64 {
        self.max_file_size as f64 / BYTES_PER_MB
    }
}

// Credentials are kept out of Debug output so settings can be logged at startup.
impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings")
            .field("server", &self.server)
            .field("aws_access_key_id", &mask(&self.aws_access_key_id))
            .field("aws_secret_access_key", &mask(&self.aws_secret_access_key))
            .field("aws_region", &self.aws_region)
            .field("aws_s3_bucket", &self.aws_s3_bucket)
            .field("s3_endpoint", &self.s3_endpoint)
            .field("max_file_size", &self.max_file_size)
            .field("allowed_extensions", &self.allowed_extensions)
            .field("presigned_url_expiration", &self.presigned_url_expiration)
            .finish()
    }
}

fn mask(value: &str) -> &'static str {
    if value.is_empty() {
        "<unset>"
    } else {
        "<redacted>"
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn parse_extensions(raw: &str) -> Vec<String> {
    let mut extensions: Vec<String> = Vec::new();
    for ext in split_list(raw) {
        let ext = ext.trim_start_matches('.').to_lowercase();
        if !ext.is_empty() && !extensions.contains(&ext) {
            extensions.push(ext);
        }
    }
    extensions
}
