//! Application configuration loaded from environment variables.

use std::env;

use blogify_core::services::MailSettings;
use blogify_infra::JwtConfig;
use blogify_infra::database::DatabaseConfig;

const DEFAULT_JWT_SECRET: &str = "change-me-in-production";

/// Cloudinary credentials; all three variables must be present.
#[derive(Debug, Clone)]
pub struct CloudinarySettings {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
    /// `sha1` (account default) or `sha256`.
    pub signature_algorithm: String,
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database: Option<DatabaseConfig>,
    pub jwt: JwtConfig,
    /// Name of the cookie carrying the session token.
    pub session_cookie: String,
    pub cloudinary: Option<CloudinarySettings>,
    pub resend_api_key: Option<String>,
    pub mail: MailSettings,
    pub templates_dir: String,
    pub tinymce_api_key: String,
    pub scheduler_enabled: bool,
    pub json_logs: bool,
    pub production: bool,
}

fn var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn parsed<T: std::str::FromStr>(name: &str, default: T) -> T {
    var(name).and_then(|s| s.parse().ok()).unwrap_or(default)
}

fn flag(name: &str, default: bool) -> bool {
    var(name)
        .map(|v| v != "false" && v != "0")
        .unwrap_or(default)
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let database = var("DATABASE_URL").map(|url| DatabaseConfig {
            url,
            max_connections: parsed("DB_MAX_CONNECTIONS", 100),
            min_connections: parsed("DB_MIN_CONNECTIONS", 10),
        });

        let cloudinary = match (
            var("CLOUDINARY_CLOUD_NAME"),
            var("CLOUDINARY_API_KEY"),
            var("CLOUDINARY_API_SECRET"),
        ) {
            (Some(cloud_name), Some(api_key), Some(api_secret)) => Some(CloudinarySettings {
                cloud_name,
                api_key,
                api_secret,
                signature_algorithm: var("CLOUDINARY_SIGNATURE_ALGORITHM")
                    .unwrap_or_else(|| "sha1".to_string()),
            }),
            _ => None,
        };

        let mail_from =
            var("MAIL_FROM").unwrap_or_else(|| "Blogify Team <onboarding@resend.dev>".to_string());

        Self {
            host: var("HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port: parsed("PORT", 8080),
            database,
            jwt: JwtConfig {
                secret: var("JWT_SECRET").unwrap_or_else(|| DEFAULT_JWT_SECRET.to_string()),
                expiration_hours: parsed("JWT_EXPIRATION_HOURS", 24),
                issuer: var("JWT_ISSUER").unwrap_or_else(|| "blogify".to_string()),
            },
            session_cookie: var("SESSION_COOKIE").unwrap_or_else(|| "uid".to_string()),
            cloudinary,
            resend_api_key: var("RESEND_API_KEY"),
            mail: MailSettings {
                contact_inbox: var("CONTACT_INBOX").unwrap_or_else(|| mail_from.clone()),
                from: mail_from,
                base_url: var("BASE_URL").unwrap_or_else(|| "http://localhost:8000".to_string()),
            },
            templates_dir: var("TEMPLATES_DIR").unwrap_or_else(|| {
                concat!(env!("CARGO_MANIFEST_DIR"), "/templates").to_string()
            }),
            tinymce_api_key: var("TINYMCE_API_KEY").unwrap_or_else(|| "no-api-key".to_string()),
            scheduler_enabled: flag("SCHEDULER_ENABLED", true),
            json_logs: var("LOG_FORMAT")
                .map(|v| v.eq_ignore_ascii_case("json"))
                .unwrap_or(false),
            production: var("RUST_ENV")
                .map(|v| v == "production" || v == "prod")
                .unwrap_or(false),
        }
    }

    /// Warn about settings that are fine locally but not in production.
    pub fn log_warnings(&self) {
        if self.jwt.secret == DEFAULT_JWT_SECRET {
            if self.production {
                tracing::error!(
                    "SECURITY: Using default JWT secret in production! Set JWT_SECRET environment variable."
                );
            } else {
                tracing::warn!("Using default JWT secret. Set JWT_SECRET for production use.");
            }
        }
        if self.resend_api_key.is_none() {
            tracing::warn!("RESEND_API_KEY not set. Contact and subscribe will fail.");
        }
    }

    /// Glob handed to tera.
    pub fn templates_glob(&self) -> String {
        format!("{}/**/*.html", self.templates_dir.trim_end_matches('/'))
    }
}
