//! Environment-driven configuration, read once at startup.

use movequote_orders::ResolverOptions;

/// SMTP connection settings. Credentials are optional; some relays accept
/// unauthenticated submission from trusted networks.
#[derive(Debug, Clone)]
pub struct SmtpSettings {
    pub host: String,
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub port: u16,
    /// CORS allow-list; empty means permissive (dev default).
    pub allowed_origins: Vec<String>,
    pub email_from: String,
    pub operator_email: String,
    pub smtp: Option<SmtpSettings>,
    pub image_upload_url: Option<String>,
    pub image_upload_preset: Option<String>,
    pub database_url: Option<String>,
    pub use_persistent_stores: bool,
    pub merge_duplicate_selections: bool,
}

impl ApiConfig {
    pub fn from_env() -> Self {
        let port = env("PORT")
            .and_then(|p| p.parse().ok())
            .unwrap_or(5000);

        let allowed_origins: Vec<String> = env("ALLOWED_ORIGINS")
            .map(|v| {
                v.split(',')
                    .map(str::trim)
                    .filter(|o| !o.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();
        if allowed_origins.is_empty() {
            tracing::warn!("ALLOWED_ORIGINS not set; CORS is permissive");
        }

        let email_from = env("EMAIL_FROM").unwrap_or_else(|| {
            tracing::warn!("EMAIL_FROM not set; using dev default sender");
            "noreply@movequote.local".to_string()
        });
        let operator_email = env("OPERATOR_EMAIL").unwrap_or_else(|| {
            tracing::warn!("OPERATOR_EMAIL not set; using dev default operator address");
            "operator@movequote.local".to_string()
        });

        let smtp = env("SMTP_HOST").map(|host| SmtpSettings {
            host,
            username: env("SMTP_USER"),
            password: env("SMTP_PASS"),
        });

        Self {
            port,
            allowed_origins,
            email_from,
            operator_email,
            smtp,
            image_upload_url: env("IMAGE_UPLOAD_URL"),
            image_upload_preset: env("IMAGE_UPLOAD_PRESET"),
            database_url: env("DATABASE_URL"),
            use_persistent_stores: env_flag("USE_PERSISTENT_STORES"),
            merge_duplicate_selections: env_flag("MERGE_DUPLICATE_SELECTIONS"),
        }
    }

    pub fn resolver_options(&self) -> ResolverOptions {
        ResolverOptions {
            merge_duplicates: self.merge_duplicate_selections,
        }
    }
}

fn env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn env_flag(key: &str) -> bool {
    env(key).map(|v| v.parse().unwrap_or(false)).unwrap_or(false)
}
