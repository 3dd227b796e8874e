//! [`Config`]-related definitions.

use std::{path::PathBuf, time};

use config::{builder::DefaultState, ConfigBuilder, ConfigError};
use secrecy::{ExposeSecret as _, SecretString};
use serde::Deserialize;
use smart_default::SmartDefault;

/// Application configuration.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct Config {
    /// Server configuration.
    #[serde(default)]
    pub server: Server,

    /// Service configuration.
    #[serde(default)]
    pub service: Service,

    /// Postgres configuration.
    #[serde(default)]
    pub postgres: Postgres,

    /// SMTP configuration.
    #[serde(default)]
    pub smtp: Smtp,

    /// Log configuration.
    #[serde(default)]
    pub log: Log,
}

impl Config {
    /// Creates a new [`Config`] by:
    /// - loading it from the provided `path` (if any);
    /// - merging it with the `CONF_`-prefixed environment variables (if any);
    /// - overriding it with the [plain environment
    ///   variables](Config::apply_env_overrides) (if any);
    /// - using default values for missing fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn new(path: impl AsRef<str>) -> Result<Self, ConfigError> {
        let mut conf: Self = ConfigBuilder::<DefaultState>::default()
            .add_source(config::File::with_name(path.as_ref()).required(false))
            .add_source(config::Environment::with_prefix("CONF").separator("."))
            .build()?
            .try_deserialize()?;
        conf.apply_env_overrides(|name| std::env::var(name).ok())?;
        Ok(conf)
    }

    /// Overrides this [`Config`] with the values of the `SECRET_KEY`,
    /// `DATABASE_URL`, `SMTP_HOST`, `SMTP_PORT`, `SMTP_USERNAME`,
    /// `SMTP_PASSWORD` and `SMTP_FROM` variables returned by the provided
    /// `var` lookup.
    ///
    /// # Errors
    ///
    /// If `SMTP_PORT` is not a valid port number.
    pub fn apply_env_overrides(
        &mut self,
        var: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(key) = var("SECRET_KEY") {
            self.service.secret_key = key.into();
        }
        if let Some(url) = var("DATABASE_URL") {
            self.postgres.url = Some(url);
        }
        if let Some(host) = var("SMTP_HOST") {
            self.smtp.host = Some(host);
        }
        if let Some(port) = var("SMTP_PORT") {
            self.smtp.port = port.parse().map_err(|e| {
                ConfigError::Message(format!("invalid `SMTP_PORT`: {e}"))
            })?;
        }
        if let Some(username) = var("SMTP_USERNAME") {
            self.smtp.username = Some(username);
        }
        if let Some(password) = var("SMTP_PASSWORD") {
            self.smtp.password = password.into();
        }
        if let Some(from) = var("SMTP_FROM") {
            self.smtp.from = from;
        }
        Ok(())
    }

    /// Builds the [`service::Config`] out of this [`Config`].
    #[must_use]
    pub fn service(&self) -> service::Config {
        let Service {
            secret_key,
            session_ttl,
            tasks: Tasks { expire_reset_tokens },
        } = &self.service;
        let secret = secret_key.expose_secret().as_bytes();
        let base = self.server.public_url.trim_end_matches('/');

        service::Config {
            jwt_encoding_key: jsonwebtoken::EncodingKey::from_secret(secret),
            jwt_decoding_key: jsonwebtoken::DecodingKey::from_secret(secret),
            session_ttl: *session_ttl,
            links: service::Links {
                password_reset: format!("{base}/reset_password"),
                admin_users: format!("{base}/admin_users"),
            },
            expire_reset_tokens: service::task::expire_reset_tokens::Config {
                interval: expire_reset_tokens.interval,
                ttl: expire_reset_tokens.ttl,
            },
        }
    }
}

/// Server configuration.
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Server {
    /// Host to bind the server to.
    #[default("0.0.0.0".to_owned())]
    pub host: String,

    /// Port to bind the server to.
    #[default(8080)]
    pub port: u16,

    /// Public base URL of the server, used in the sent emails.
    #[default("http://localhost:8080".to_owned())]
    pub public_url: String,

    /// Directory of the templates served by the passthrough routes.
    #[default(PathBuf::from("templates"))]
    pub templates_dir: PathBuf,

    /// [CORS] configuration.
    ///
    /// [CORS]: https://developer.mozilla.org/en-US/docs/Web/HTTP/CORS
    pub cors: Cors,
}

/// [CORS] configuration.
///
/// [CORS]: https://developer.mozilla.org/en-US/docs/Web/HTTP/CORS
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Cors {
    /// List of allowed origins.
    #[default(vec!["*".to_owned()])]
    pub origins: Vec<String>,
}

/// Service configuration.
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Service {
    /// Secret key signing the [JWT] sessions and encrypting the cookies.
    ///
    /// [JWT]: https://wikipedia.org/wiki/JSON_Web_Token
    #[default(SecretString::from("secret"))]
    pub secret_key: SecretString,

    /// Duration a signed in session stays valid.
    #[default(time::Duration::from_secs(60 * 60 * 24))]
    #[serde(with = "humantime_serde")]
    pub session_ttl: time::Duration,

    /// Service tasks configuration.
    pub tasks: Tasks,
}

/// Service tasks configuration.
#[derive(Clone, Copy, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Tasks {
    /// `ExpireResetTokens` task configuration.
    pub expire_reset_tokens: Task,
}

/// Service task configuration.
#[derive(Clone, Copy, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Task {
    /// Task execution interval.
    #[default(time::Duration::from_secs(60 * 60))]
    #[serde(with = "humantime_serde")]
    pub interval: time::Duration,

    /// Age after which the password reset tokens are expired.
    #[default(time::Duration::from_secs(60 * 60))]
    #[serde(with = "humantime_serde")]
    pub ttl: time::Duration,
}

/// Postgres configuration.
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Postgres {
    /// Connection URL, taking precedence over the separate fields.
    pub url: Option<String>,

    /// Host to connect to.
    #[default("127.0.0.1".to_owned())]
    pub host: String,

    /// Port to connect to.
    #[default(5432)]
    pub port: u16,

    /// User to connect as.
    #[default("postgres".to_owned())]
    pub user: String,

    /// Password to connect with.
    #[default("postgres".to_owned())]
    pub password: String,

    /// Database name to connect to.
    #[default("click_and_buy".to_owned())]
    pub dbname: String,
}

impl From<Postgres> for service::infra::postgres::Config {
    fn from(value: Postgres) -> Self {
        let Postgres {
            url,
            host,
            port,
            user,
            password,
            dbname,
        } = value;

        if url.is_some() {
            return Self {
                url,
                ..Self::default()
            };
        }
        Self {
            host: Some(host),
            port: Some(port),
            user: Some(user),
            password: Some(password),
            dbname: Some(dbname),
            ..Self::default()
        }
    }
}

/// SMTP configuration.
///
/// Emails are not delivered unless the [`Smtp::host`] is set.
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Smtp {
    /// Host of the SMTP relay.
    pub host: Option<String>,

    /// Port of the SMTP relay.
    #[default(587)]
    pub port: u16,

    /// User to authenticate as.
    pub username: Option<String>,

    /// Password to authenticate with.
    #[default(SecretString::from(""))]
    pub password: SecretString,

    /// Address the emails are sent from.
    #[default("Click & Buy <noreply@localhost>".to_owned())]
    pub from: String,
}

impl Smtp {
    /// Returns the [`service::infra::mailer::smtp::Config`], if the relay is
    /// configured.
    #[must_use]
    pub fn to_service(&self) -> Option<service::infra::mailer::smtp::Config> {
        let host = self.host.clone()?;
        Some(service::infra::mailer::smtp::Config {
            host,
            port: self.port,
            username: self.username.clone(),
            password: self.password.clone(),
            from: self.from.clone(),
        })
    }
}

/// Log configuration.
#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Log {
    /// Log level.
    pub level: LogLevel,
}

/// Log level.
#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LogLevel {
    /// Designates very low priority, often extremely verbose, information.
    Trace,

    /// Designates lower priority information.
    Debug,

    /// Designates useful information.
    #[default]
    Info,

    /// Designates hazardous situations.
    Warn,

    /// Designates very serious errors.
    Error,
}

impl From<LogLevel> for tracing::Level {
    fn from(value: LogLevel) -> Self {
        match value {
            LogLevel::Trace => Self::TRACE,
            LogLevel::Debug => Self::DEBUG,
            LogLevel::Info => Self::INFO,
            LogLevel::Warn => Self::WARN,
            LogLevel::Error => Self::ERROR,
        }
    }
}

#[cfg(test)]
mod spec {
    use std::{collections::HashMap, time::Duration};

    use secrecy::ExposeSecret as _;

    use super::Config;

    fn env(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars = vars
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect::<HashMap<_, _>>();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn has_sane_defaults() {
        let conf = Config::default();

        assert_eq!(conf.server.port, 8080);
        assert_eq!(conf.service.session_ttl, Duration::from_secs(86_400));
        assert_eq!(
            conf.service.tasks.expire_reset_tokens.ttl,
            Duration::from_secs(3_600),
        );
        assert!(conf.postgres.url.is_none());
        assert!(conf.smtp.to_service().is_none());
    }

    #[test]
    fn plain_env_vars_override_values() {
        let mut conf = Config::default();

        conf.apply_env_overrides(env(&[
            ("SECRET_KEY", "s3cr3t"),
            ("DATABASE_URL", "postgres://u:p@db/app"),
            ("SMTP_HOST", "smtp.example.com"),
            ("SMTP_PORT", "2525"),
            ("SMTP_USERNAME", "mailer"),
            ("SMTP_PASSWORD", "pa55"),
            ("SMTP_FROM", "noreply@example.com"),
        ]))
        .unwrap();

        assert_eq!(conf.service.secret_key.expose_secret(), "s3cr3t");
        assert_eq!(conf.postgres.url.as_deref(), Some("postgres://u:p@db/app"));
        let smtp = conf.smtp.to_service().unwrap();
        assert_eq!(smtp.host, "smtp.example.com");
        assert_eq!(smtp.port, 2525);
        assert_eq!(smtp.username.as_deref(), Some("mailer"));
        assert_eq!(smtp.password.expose_secret(), "pa55");
        assert_eq!(smtp.from, "noreply@example.com");
    }

    #[test]
    fn rejects_invalid_smtp_port() {
        let mut conf = Config::default();

        assert!(conf
            .apply_env_overrides(env(&[("SMTP_PORT", "mail")]))
            .is_err());
    }

    #[test]
    fn url_takes_precedence_over_fields() {
        let mut conf = Config::default();
        conf.postgres.url = Some("postgres://db/app".to_owned());

        let pg = service::infra::postgres::Config::from(conf.postgres);

        assert_eq!(pg.url.as_deref(), Some("postgres://db/app"));
        assert!(pg.host.is_none());
    }

    #[test]
    fn builds_links_from_public_url() {
        let mut conf = Config::default();
        conf.server.public_url = "https://clickandbuy.example/".to_owned();

        let links = conf.service().links;

        assert_eq!(
            links.password_reset,
            "https://clickandbuy.example/reset_password",
        );
        assert_eq!(
            links.admin_users,
            "https://clickandbuy.example/admin_users",
        );
    }
}
