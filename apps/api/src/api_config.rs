use std::env;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use ipnet::IpNet;
use pickadrive_core::AppError;
use pickadrive_domain::AdmissionPolicy;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdmissionStoreConfig {
    JsonFile(PathBuf),
    InMemory,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelegramRuntimeConfig {
    pub bot_token: String,
    pub chat_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderNotifierConfig {
    Console,
    Telegram(TelegramRuntimeConfig),
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub api_host: String,
    pub api_port: u16,
    pub admission_store: AdmissionStoreConfig,
    pub admission_policy: AdmissionPolicy,
    pub admission_purge_interval: Option<Duration>,
    pub trusted_proxies: Vec<IpNet>,
    pub order_notifier: OrderNotifierConfig,
}

impl ApiConfig {
    pub fn load() -> Result<Self, AppError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let optional = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty())
        };

        let api_host = optional("API_HOST").unwrap_or_else(|| "127.0.0.1".to_owned());
        let api_port = parse_or("API_PORT", optional("API_PORT"), 3000_u16)?;

        let admission_store = match optional("ADMISSION_STORE")
            .unwrap_or_else(|| "file".to_owned())
            .as_str()
        {
            "file" => AdmissionStoreConfig::JsonFile(PathBuf::from(
                optional("ADMISSION_STORE_PATH")
                    .unwrap_or_else(|| "rate_limit_data.json".to_owned()),
            )),
            "memory" => AdmissionStoreConfig::InMemory,
            other => {
                return Err(AppError::Validation(format!(
                    "ADMISSION_STORE must be either 'file' or 'memory', got '{other}'"
                )));
            }
        };

        let max_attempts = parse_or(
            "ADMISSION_MAX_ATTEMPTS",
            optional("ADMISSION_MAX_ATTEMPTS"),
            3_u32,
        )?;
        let window_seconds = parse_or(
            "ADMISSION_WINDOW_SECONDS",
            optional("ADMISSION_WINDOW_SECONDS"),
            86_400_u64,
        )?;
        let fail_open = parse_bool("ADMISSION_FAIL_OPEN", optional("ADMISSION_FAIL_OPEN"), true)?;
        let admission_policy =
            AdmissionPolicy::new(max_attempts, Duration::from_secs(window_seconds))?
                .with_fail_open(fail_open);

        let purge_seconds = parse_or(
            "ADMISSION_PURGE_INTERVAL_SECONDS",
            optional("ADMISSION_PURGE_INTERVAL_SECONDS"),
            3_600_u64,
        )?;
        let admission_purge_interval =
            (purge_seconds > 0).then(|| Duration::from_secs(purge_seconds));

        let trusted_proxies = optional("TRUSTED_PROXIES")
            .map(|value| parse_trusted_proxies(&value))
            .transpose()?
            .unwrap_or_default();

        let order_notifier = match optional("ORDER_NOTIFIER")
            .unwrap_or_else(|| "console".to_owned())
            .as_str()
        {
            "console" => OrderNotifierConfig::Console,
            "telegram" => {
                let bot_token = optional("TELEGRAM_BOT_TOKEN").ok_or_else(|| {
                    AppError::Validation(
                        "TELEGRAM_BOT_TOKEN is required when ORDER_NOTIFIER=telegram".to_owned(),
                    )
                })?;
                let chat_ids: Vec<String> = optional("TELEGRAM_CHAT_IDS")
                    .unwrap_or_default()
                    .split(',')
                    .map(str::trim)
                    .filter(|chat_id| !chat_id.is_empty())
                    .map(ToOwned::to_owned)
                    .collect();
                if chat_ids.is_empty() {
                    return Err(AppError::Validation(
                        "TELEGRAM_CHAT_IDS is required when ORDER_NOTIFIER=telegram".to_owned(),
                    ));
                }

                OrderNotifierConfig::Telegram(TelegramRuntimeConfig {
                    bot_token,
                    chat_ids,
                })
            }
            other => {
                return Err(AppError::Validation(format!(
                    "ORDER_NOTIFIER must be either 'console' or 'telegram', got '{other}'"
                )));
            }
        };

        Ok(Self {
            api_host,
            api_port,
            admission_store,
            admission_policy,
            admission_purge_interval,
            trusted_proxies,
            order_notifier,
        })
    }

    pub fn socket_address(&self) -> Result<SocketAddr, AppError> {
        let host = IpAddr::from_str(&self.api_host).map_err(|error| {
            AppError::Internal(format!("invalid API_HOST '{}': {error}", self.api_host))
        })?;
        Ok(SocketAddr::from((host, self.api_port)))
    }
}

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn parse_or<T>(name: &str, value: Option<String>, default: T) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value.map_or(Ok(default), |value| {
        value
            .parse::<T>()
            .map_err(|error| AppError::Validation(format!("invalid {name} '{value}': {error}")))
    })
}

fn parse_bool(name: &str, value: Option<String>, default: bool) -> Result<bool, AppError> {
    let Some(value) = value else {
        return Ok(default);
    };

    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(AppError::Validation(format!(
            "{name} must be 'true' or 'false', got '{value}'"
        ))),
    }
}

/// Parses comma-separated CIDRs. Bare addresses are treated as single-host networks.
fn parse_trusted_proxies(value: &str) -> Result<Vec<IpNet>, AppError> {
    value
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            entry
                .parse::<IpNet>()
                .or_else(|_| entry.parse::<IpAddr>().map(IpNet::from))
                .map_err(|error| {
                    AppError::Validation(format!("invalid TRUSTED_PROXIES entry '{entry}': {error}"))
                })
        })
        .collect()
}
