use std::{env, time::Duration};

use crate::error::ConfigError;

/// AppConfig
///
/// Holds the portal's entire configuration. It is loaded once at startup and
/// never mutated afterwards; the guard, the routing runtime, and the HTTP
/// layer all take their timing and policy knobs from here.
#[derive(Clone, Debug)]
pub struct AppConfig {
    // Runtime environment marker. Selects the log format and which variables are mandatory.
    pub env: Env,
    // Socket address the HTTP server binds to.
    pub bind_addr: String,
    // Fixed wait between showing a denial notice and applying its redirect.
    pub redirect_delay: Duration,
    // How long the display layer keeps a notice up.
    pub notice_duration: Duration,
    // Authentication entry point used when a protected screen is requested anonymously.
    pub auth_entry_path: String,
    // What happens to a pending notice redirect when the visitor navigates again first.
    pub stale_redirects: StaleRedirectPolicy,
    // Upper bound on immediate redirects followed for one navigation.
    pub max_redirect_hops: usize,
}

/// Env
///
/// Defines the runtime context.
#[derive(Clone, PartialEq, Debug)]
pub enum Env {
    Local,
    Production,
}

/// StaleRedirectPolicy
///
/// `Cancel` drops a pending notice redirect as soon as a newer navigation
/// starts. `Preserve` lets it fire anyway and override the newer navigation.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum StaleRedirectPolicy {
    #[default]
    Cancel,
    Preserve,
}

pub const DEFAULT_REDIRECT_DELAY_MS: u64 = 1500;
pub const DEFAULT_NOTICE_DURATION_MS: u64 = 3000;
pub const DEFAULT_AUTH_ENTRY_PATH: &str = "/auth";
pub const DEFAULT_MAX_REDIRECT_HOPS: usize = 10;

impl Default for AppConfig {
    /// default
    ///
    /// Provides a non-panicking AppConfig primarily used for test setup, with
    /// the same timings the portal ships with.
    fn default() -> Self {
        Self {
            env: Env::Local,
            bind_addr: "127.0.0.1:3000".to_string(),
            redirect_delay: Duration::from_millis(DEFAULT_REDIRECT_DELAY_MS),
            notice_duration: Duration::from_millis(DEFAULT_NOTICE_DURATION_MS),
            auth_entry_path: DEFAULT_AUTH_ENTRY_PATH.to_string(),
            stale_redirects: StaleRedirectPolicy::Cancel,
            max_redirect_hops: DEFAULT_MAX_REDIRECT_HOPS,
        }
    }
}

impl AppConfig {
    /// load
    ///
    /// Reads the configuration from environment variables. Production refuses
    /// to start without an explicit `BIND_ADDR`; every numeric or enumerated
    /// variable must parse when present.
    pub fn load() -> Result<Self, ConfigError> {
        let env_str = env::var("APP_ENV").unwrap_or_else(|_| "local".to_string());
        let env = match env_str.as_str() {
            "production" => Env::Production,
            _ => Env::Local,
        };

        let bind_addr = match env {
            Env::Production => env::var("BIND_ADDR").map_err(|_| ConfigError::Missing("BIND_ADDR"))?,
            Env::Local => env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string()),
        };

        let redirect_delay =
            Duration::from_millis(parse_var("REDIRECT_DELAY_MS", DEFAULT_REDIRECT_DELAY_MS)?);
        let notice_duration =
            Duration::from_millis(parse_var("NOTICE_DURATION_MS", DEFAULT_NOTICE_DURATION_MS)?);
        let max_redirect_hops = parse_var("MAX_REDIRECT_HOPS", DEFAULT_MAX_REDIRECT_HOPS)?;

        let auth_entry_path =
            env::var("AUTH_ENTRY_PATH").unwrap_or_else(|_| DEFAULT_AUTH_ENTRY_PATH.to_string());
        if !auth_entry_path.starts_with('/') {
            return Err(ConfigError::Invalid {
                var: "AUTH_ENTRY_PATH",
                value: auth_entry_path,
            });
        }

        let stale_redirects = match env::var("STALE_REDIRECTS") {
            Err(_) => StaleRedirectPolicy::default(),
            Ok(value) => match value.as_str() {
                "cancel" => StaleRedirectPolicy::Cancel,
                "preserve" => StaleRedirectPolicy::Preserve,
                _ => {
                    return Err(ConfigError::Invalid {
                        var: "STALE_REDIRECTS",
                        value,
                    });
                }
            },
        };

        Ok(Self {
            env,
            bind_addr,
            redirect_delay,
            notice_duration,
            auth_entry_path,
            stale_redirects,
            max_redirect_hops,
        })
    }
}

fn parse_var<T: std::str::FromStr>(var: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(var) {
        Err(_) => Ok(default),
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { var, value }),
    }
}
