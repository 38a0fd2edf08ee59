use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
}

/// Rules applied to a password chosen by a reseller for a customer.
#[derive(Debug, Clone, Deserialize)]
pub struct PasswordPolicyConfig {
    pub min_length: usize,
    pub strong: bool,
}

impl Default for PasswordPolicyConfig {
    fn default() -> Self {
        Self {
            min_length: 6,
            strong: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DaemonConfig {
    pub host: String,
    pub port: u16,
    pub version: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    /// Public URL of the panel, quoted in login-data emails.
    pub panel_base_url: String,
    pub password_policy: PasswordPolicyConfig,
    /// `None` means mails are only logged.
    pub smtp: Option<SmtpConfig>,
    pub daemon: DaemonConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "reseller-panel".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "reseller-panel-users".into()),
        };
        let panel_base_url =
            std::env::var("PANEL_BASE_URL").unwrap_or_else(|_| "http://localhost:8080".into());

        let defaults = PasswordPolicyConfig::default();
        let password_policy = PasswordPolicyConfig {
            min_length: std::env::var("PASSWORD_MIN_LENGTH")
                .ok()
                .and_then(|v| v.parse::<usize>().ok())
                .unwrap_or(defaults.min_length),
            strong: std::env::var("PASSWORD_STRONG")
                .ok()
                .map(|v| parse_flag(&v))
                .unwrap_or(defaults.strong),
        };

        let smtp = match std::env::var("SMTP_HOST") {
            Ok(host) if !host.trim().is_empty() => Some(SmtpConfig {
                host,
                port: std::env::var("SMTP_PORT")
                    .ok()
                    .and_then(|v| v.parse::<u16>().ok())
                    .unwrap_or(587),
                username: std::env::var("SMTP_USERNAME").ok(),
                password: std::env::var("SMTP_PASSWORD").ok(),
            }),
            _ => None,
        };

        let daemon = DaemonConfig {
            host: std::env::var("DAEMON_HOST").unwrap_or_else(|_| "127.0.0.1".into()),
            port: std::env::var("DAEMON_PORT")
                .ok()
                .and_then(|v| v.parse::<u16>().ok())
                .unwrap_or(9876),
            version: env!("CARGO_PKG_VERSION").to_string(),
        };

        Ok(Self {
            database_url,
            jwt,
            panel_base_url,
            password_policy,
            smtp,
            daemon,
        })
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_flag_accepts_common_truthy_values() {
        for v in ["1", "true", "YES", " on "] {
            assert!(parse_flag(v), "{v} should be truthy");
        }
        for v in ["0", "false", "no", ""] {
            assert!(!parse_flag(v), "{v} should be falsy");
        }
    }

    #[test]
    fn password_policy_defaults() {
        let p = PasswordPolicyConfig::default();
        assert_eq!(p.min_length, 6);
        assert!(p.strong);
    }
}
