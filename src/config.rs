use anyhow::{Context, Result};
use clap::Parser;
use std::{env, path::PathBuf, str::FromStr, time::Duration};

/// Centralized application configuration.
/// Combines environment variables and CLI arguments.
#[derive(Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// SQLite URL. `None` keeps reservations in memory.
    pub database_url: Option<String>,
    pub admin_password: Option<String>,
    pub store_timeout: Duration,
    /// JSON file replacing the built-in room schedule.
    pub schedule_file: Option<PathBuf>,
    pub telegram: Option<TelegramConfig>,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database_url", &self.database_url)
            .field(
                "admin_password",
                &self.admin_password.as_ref().map(|_| "<redacted>"),
            )
            .field("store_timeout", &self.store_timeout)
            .field("schedule_file", &self.schedule_file)
            .field("telegram", &self.telegram)
            .finish()
    }
}

#[derive(Clone)]
pub struct TelegramConfig {
    pub bot_token: String,
    pub chat_id: i64,
}

impl std::fmt::Debug for TelegramConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramConfig")
            .field("bot_token", &"<redacted>")
            .field("chat_id", &self.chat_id)
            .finish()
    }
}

/// Command-line + environment configuration.
#[derive(Parser, Debug, Default)]
#[command(author, version, about = "Room reservation API")]
pub struct Args {
    /// Host to bind to (overrides ROOM_BOOKING_HOST)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to (overrides ROOM_BOOKING_PORT)
    #[arg(long)]
    pub port: Option<u16>,

    /// SQLite database URL; in-memory store when unset (overrides ROOM_BOOKING_DATABASE_URL)
    #[arg(long)]
    pub database_url: Option<String>,

    /// Administrator password (overrides ROOM_BOOKING_ADMIN_PASSWORD)
    #[arg(long)]
    pub admin_password: Option<String>,

    /// Deadline for each store call in milliseconds (overrides ROOM_BOOKING_STORE_TIMEOUT_MS)
    #[arg(long)]
    pub store_timeout_ms: Option<u64>,

    /// JSON room schedule (overrides ROOM_BOOKING_SCHEDULE_FILE)
    #[arg(long)]
    pub schedule_file: Option<PathBuf>,

    /// Telegram bot token for new-reservation messages (overrides TELEGRAM_BOT_TOKEN)
    #[arg(long)]
    pub telegram_bot_token: Option<String>,

    /// Telegram chat receiving the messages (overrides TELEGRAM_CHAT_ID)
    #[arg(long)]
    pub telegram_chat_id: Option<String>,

    /// Run migrations and exit
    #[arg(long)]
    pub migrate: bool,
}

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_STORE_TIMEOUT_MS: u64 = 5_000;

impl AppConfig {
    /// Parse environment variables + CLI args into AppConfig and migrate flag.
    pub fn from_env_and_args() -> Result<(Self, bool)> {
        // Parse CLI once
        let args = Args::parse();
        Self::resolve(args, |key| env::var(key).ok())
    }

    /// Merge parsed arguments over values looked up with `env`.
    ///
    /// Empty environment values count as unset.
    pub fn resolve(args: Args, env: impl Fn(&str) -> Option<String>) -> Result<(Self, bool)> {
        let lookup = |key: &str| env(key).filter(|v| !v.trim().is_empty());

        // --- Environment fallback ---
        let env_port = parse_var::<u16>(&lookup, "ROOM_BOOKING_PORT")?;
        let env_timeout = parse_var::<u64>(&lookup, "ROOM_BOOKING_STORE_TIMEOUT_MS")?;

        let telegram = match (
            args.telegram_bot_token.or_else(|| lookup("TELEGRAM_BOT_TOKEN")),
            args.telegram_chat_id.or_else(|| lookup("TELEGRAM_CHAT_ID")),
        ) {
            (Some(bot_token), Some(chat_id)) => Some(TelegramConfig {
                bot_token,
                chat_id: chat_id
                    .trim()
                    .parse()
                    .with_context(|| format!("parsing TELEGRAM_CHAT_ID value `{}`", chat_id))?,
            }),
            (None, None) => None,
            _ => {
                tracing::warn!("Telegram notifications need both bot token and chat id; disabled");
                None
            }
        };

        // --- Merge ---
        let cfg = Self {
            host: args
                .host
                .or_else(|| lookup("ROOM_BOOKING_HOST"))
                .unwrap_or_else(|| DEFAULT_HOST.into()),
            port: args.port.or(env_port).unwrap_or(DEFAULT_PORT),
            database_url: args
                .database_url
                .or_else(|| lookup("ROOM_BOOKING_DATABASE_URL")),
            admin_password: args
                .admin_password
                .or_else(|| lookup("ROOM_BOOKING_ADMIN_PASSWORD")),
            store_timeout: Duration::from_millis(
                args.store_timeout_ms
                    .or(env_timeout)
                    .unwrap_or(DEFAULT_STORE_TIMEOUT_MS),
            ),
            schedule_file: args
                .schedule_file
                .or_else(|| lookup("ROOM_BOOKING_SCHEDULE_FILE").map(PathBuf::from)),
            telegram,
        };

        Ok((cfg, args.migrate))
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_var<T>(lookup: impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    lookup(key)
        .map(|value| {
            value
                .trim()
                .parse::<T>()
                .with_context(|| format!("parsing {} value `{}`", key, value))
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_without_env_or_args() {
        let (cfg, migrate) = AppConfig::resolve(Args::default(), env_of(&[])).unwrap();
        assert!(!migrate);
        assert_eq!(cfg.addr(), "0.0.0.0:8080");
        assert!(cfg.database_url.is_none());
        assert_eq!(cfg.store_timeout, Duration::from_secs(5));
        assert!(cfg.telegram.is_none());
    }

    #[test]
    fn args_override_env() {
        let args = Args {
            port: Some(9000),
            database_url: Some("sqlite://cli.db".into()),
            ..Args::default()
        };
        let env = env_of(&[
            ("ROOM_BOOKING_PORT", "7000"),
            ("ROOM_BOOKING_HOST", "127.0.0.1"),
            ("ROOM_BOOKING_DATABASE_URL", "sqlite://env.db"),
            ("ROOM_BOOKING_STORE_TIMEOUT_MS", "250"),
        ]);
        let (cfg, _) = AppConfig::resolve(args, env).unwrap();
        assert_eq!(cfg.addr(), "127.0.0.1:9000");
        assert_eq!(cfg.database_url.as_deref(), Some("sqlite://cli.db"));
        assert_eq!(cfg.store_timeout, Duration::from_millis(250));
    }

    #[test]
    fn empty_env_counts_as_unset() {
        let env = env_of(&[("ROOM_BOOKING_DATABASE_URL", ""), ("ROOM_BOOKING_PORT", " ")]);
        let (cfg, _) = AppConfig::resolve(Args::default(), env).unwrap();
        assert!(cfg.database_url.is_none());
        assert_eq!(cfg.port, 8080);
    }

    #[test]
    fn malformed_port_is_an_error() {
        let err = AppConfig::resolve(Args::default(), env_of(&[("ROOM_BOOKING_PORT", "http")]))
            .unwrap_err();
        assert!(err.to_string().contains("ROOM_BOOKING_PORT"));
    }

    #[test]
    fn debug_output_hides_secrets() {
        let env = env_of(&[
            ("ROOM_BOOKING_ADMIN_PASSWORD", "s3cret-pw"),
            ("TELEGRAM_BOT_TOKEN", "123:bot-token"),
            ("TELEGRAM_CHAT_ID", "42"),
        ]);
        let (cfg, _) = AppConfig::resolve(Args::default(), env).unwrap();
        assert_eq!(cfg.admin_password.as_deref(), Some("s3cret-pw"));

        let shown = format!("{:?}", cfg);
        assert!(!shown.contains("s3cret-pw"));
        assert!(!shown.contains("bot-token"));
        assert!(shown.contains("<redacted>"));
        assert!(shown.contains("8080"));
    }

    #[test]
    fn telegram_needs_token_and_numeric_chat() {
        let env = env_of(&[("TELEGRAM_BOT_TOKEN", "t"), ("TELEGRAM_CHAT_ID", "-100123")]);
        let (cfg, _) = AppConfig::resolve(Args::default(), env).unwrap();
        assert_eq!(cfg.telegram.unwrap().chat_id, -100123);

        let env = env_of(&[("TELEGRAM_BOT_TOKEN", "t")]);
        let (cfg, _) = AppConfig::resolve(Args::default(), env).unwrap();
        assert!(cfg.telegram.is_none());

        let env = env_of(&[("TELEGRAM_BOT_TOKEN", "t"), ("TELEGRAM_CHAT_ID", "general")]);
        assert!(AppConfig::resolve(Args::default(), env).is_err());
    }
}
