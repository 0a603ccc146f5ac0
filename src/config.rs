//! Configuration for the admin service
//!
//! CLI arguments and environment variable handling using clap.
//! `.env` is loaded by `main` before parsing.

use clap::Parser;
use std::net::SocketAddr;

/// Minimum accepted JWT secret length outside dev mode
pub const MIN_JWT_SECRET_LEN: usize = 32;

/// Preplens admin - question bank management service
#[derive(Parser, Debug, Clone)]
#[command(name = "preplens-admin")]
#[command(about = "Question bank admin service for exam preparation content")]
pub struct Args {
    /// Address to listen on
    #[arg(long, env = "LISTEN", default_value = "0.0.0.0:4000")]
    pub listen: SocketAddr,

    /// Enable development mode (disables the bearer-token guard, allows a dev JWT secret)
    #[arg(long, env = "DEV_MODE", default_value = "false")]
    pub dev_mode: bool,

    /// Keep questions in process memory instead of MongoDB
    #[arg(long, env = "MEMORY_STORE", default_value = "false")]
    pub memory_store: bool,

    /// MongoDB connection URI
    #[arg(long, env = "MONGODB_URI", default_value = "mongodb://localhost:27017")]
    pub mongodb_uri: String,

    /// MongoDB database name
    #[arg(long, env = "MONGODB_DB", default_value = "preplens")]
    pub mongodb_db: String,

    /// JWT secret for token signing (required in production)
    #[arg(long, env = "JWT_SECRET")]
    pub jwt_secret: Option<String>,

    /// JWT token expiry in seconds (one day)
    #[arg(long, env = "JWT_EXPIRY_SECONDS", default_value = "86400")]
    pub jwt_expiry_seconds: u64,

    /// The only email address accepted by /auth/login
    #[arg(long, env = "ADMIN_EMAIL", default_value = "admin@preplens.com")]
    pub admin_email: String,

    /// Expose POST /auth/register for creating the initial admin user
    #[arg(long, env = "ALLOW_REGISTRATION", default_value = "false")]
    pub allow_registration: bool,

    /// Phrase that must accompany any request deleting every question
    #[arg(long, env = "WIPE_CONFIRMATION", default_value = "DELETE-ALL-QUESTIONS")]
    pub wipe_confirmation: String,

    /// Maximum data rows accepted per bulk upload
    #[arg(long, env = "MAX_UPLOAD_ROWS", default_value = "50")]
    pub max_upload_rows: usize,

    /// Maximum request body size in bytes
    #[arg(long, env = "MAX_BODY_BYTES", default_value = "52428800")]
    pub max_body_bytes: usize,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Log output format (pretty, json)
    #[arg(long, env = "LOG_FORMAT", default_value = "pretty")]
    pub log_format: String,

    /// Object storage configuration
    #[command(flatten)]
    pub s3: S3Args,
}

/// S3 configuration for question images
#[derive(Parser, Debug, Clone, Default)]
pub struct S3Args {
    /// Bucket receiving uploaded images
    #[arg(long, env = "S3_BUCKET_NAME")]
    pub s3_bucket: Option<String>,

    /// AWS region of the bucket
    #[arg(long, env = "AWS_REGION", default_value = "us-east-1")]
    pub aws_region: String,

    /// Access key id
    #[arg(long, env = "AWS_ACCESS_KEY_ID")]
    pub aws_access_key_id: Option<String>,

    /// Secret access key
    #[arg(long, env = "AWS_SECRET_ACCESS_KEY", hide_env_values = true)]
    pub aws_secret_access_key: Option<String>,

    /// Custom endpoint for S3-compatible services (MinIO, R2)
    #[arg(long, env = "S3_ENDPOINT")]
    pub s3_endpoint: Option<String>,
}

impl S3Args {
    /// Whether enough settings are present to talk to a bucket
    pub fn is_configured(&self) -> bool {
        self.s3_bucket.as_deref().is_some_and(|b| !b.is_empty())
            && self.aws_access_key_id.is_some()
            && self.aws_secret_access_key.is_some()
    }
}

impl Args {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if !self.dev_mode {
            match &self.jwt_secret {
                None => return Err("JWT_SECRET is required in production mode".to_string()),
                Some(secret) if secret.len() < MIN_JWT_SECRET_LEN => {
                    return Err(format!(
                        "JWT_SECRET must be at least {} characters",
                        MIN_JWT_SECRET_LEN
                    ))
                }
                Some(_) => {}
            }
        }

        if self.max_upload_rows == 0 {
            return Err("MAX_UPLOAD_ROWS must be at least 1".to_string());
        }

        if self.wipe_confirmation.trim().is_empty() {
            return Err("WIPE_CONFIRMATION must not be empty".to_string());
        }

        if !matches!(self.log_format.as_str(), "pretty" | "json") {
            return Err("LOG_FORMAT must be 'pretty' or 'json'".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(extra: &[&str]) -> Args {
        let mut argv = vec!["preplens-admin"];
        argv.extend_from_slice(extra);
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_defaults() {
        let args = parse(&["--dev-mode"]);
        assert_eq!(args.listen.port(), 4000);
        assert_eq!(args.jwt_expiry_seconds, 86_400);
        assert_eq!(args.max_upload_rows, 50);
        assert_eq!(args.admin_email, "admin@preplens.com");
    }

    #[test]
    fn test_production_requires_strong_secret() {
        let args = parse(&["--jwt-secret", "short"]);
        assert!(args.validate().is_err());

        let args = parse(&["--jwt-secret", "a-secret-that-is-long-enough-for-hs256-use"]);
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_dev_mode_allows_missing_secret() {
        let args = parse(&["--dev-mode"]);
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_s3_configured_only_with_bucket_and_keys() {
        let mut s3 = S3Args::default();
        assert!(!s3.is_configured());
        s3.s3_bucket = Some("questions".into());
        s3.aws_access_key_id = Some("AKIA".into());
        assert!(!s3.is_configured());
        s3.aws_secret_access_key = Some("secret".into());
        assert!(s3.is_configured());
    }
}
