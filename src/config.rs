use std::{env, net::SocketAddr, str::FromStr, time::Duration};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingVar(String),
    #[error("Invalid environment variable format for {0}: {1}")]
    InvalidVar(String, String),
}

const DEFAULT_BODY_LIMIT: usize = 10 * 1024 * 1024;

#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub journal_bucket_name: String,
    pub journals_table: String,
    pub aws_region: String,
    // Optional endpoint for LocalStack
    pub localstack_endpoint: Option<String>,
    pub media_public_base_url: String,
    pub cors_origin: Option<String>,
    pub max_body_bytes: usize,
    pub upload_timeout: Duration,
    pub store_timeout: Duration,
}

impl Config {
    /// Loads configuration from a `.env` file (if any) and environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        match dotenvy::dotenv() {
            Ok(path) => tracing::info!(".env file loaded from path: {}", path.display()),
            Err(_) => tracing::debug!(".env file not found, relying on environment variables"),
        }
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let bind_address = parse_or(&var, "BIND_ADDRESS", SocketAddr::from(([0, 0, 0, 0], 3000)))?;

        let journal_bucket_name = var("JOURNAL_BUCKET_NAME")
            .ok_or_else(|| ConfigError::MissingVar("JOURNAL_BUCKET_NAME".into()))?;
        let journals_table = var("JOURNALS_TABLE").unwrap_or_else(|| "journals".to_string());
        let aws_region = var("AWS_DEFAULT_REGION").unwrap_or_else(|| "ca-central-1".to_string());
        let localstack_endpoint = var("AWS_ENDPOINT_URL");

        let media_public_base_url = var("MEDIA_PUBLIC_BASE_URL").unwrap_or_else(|| {
            default_public_base_url(&journal_bucket_name, &aws_region, localstack_endpoint.as_deref())
        });

        let cors_origin = var("CORS_ORIGIN");
        let max_body_bytes = parse_or(&var, "MAX_BODY_BYTES", DEFAULT_BODY_LIMIT)?;
        let upload_timeout = Duration::from_secs(parse_or(&var, "UPLOAD_TIMEOUT_SECS", 30)?);
        let store_timeout = Duration::from_secs(parse_or(&var, "STORE_TIMEOUT_SECS", 10)?);

        Ok(Config {
            bind_address,
            journal_bucket_name,
            journals_table,
            aws_region,
            localstack_endpoint,
            media_public_base_url: media_public_base_url.trim_end_matches('/').to_string(),
            cors_origin,
            max_body_bytes,
            upload_timeout,
            store_timeout,
        })
    }
}

fn parse_or<T, F>(var: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match var(key) {
        Some(raw) => T::from_str(raw.trim())
            .map_err(|e| ConfigError::InvalidVar(key.to_string(), e.to_string())),
        None => Ok(default),
    }
}

/// Where uploaded objects are publicly reachable when no base URL is configured.
fn default_public_base_url(bucket: &str, region: &str, endpoint: Option<&str>) -> String {
    match endpoint {
        // Path-style addressing, matching the S3 client configuration.
        Some(endpoint) => format!("{}/{}", endpoint.trim_end_matches('/'), bucket),
        None => format!("https://{}.s3.{}.amazonaws.com", bucket, region),
    }
}
