use std::{env, path::PathBuf, time::Duration};

pub const DEFAULT_ALLOWED_ORIGINS: [&str; 2] = ["https://breeze.earth", "https://www.breeze.earth"];
pub const DEFAULT_POLLEN_API_BASE: &str = "https://pollen.googleapis.com/v1";
/// Checked in order; the last name is what the original Vite frontend used.
pub const POLLEN_API_KEY_VARS: [&str; 3] = [
    "POLLEN_API_KEY",
    "GOOGLE_POLLEN_API_KEY",
    "VITE_GOOGLE_POLLEN_API_KEY",
];

#[derive(Clone, Debug)]
pub struct Config {
    pub port: u16,
    pub trust_proxy: bool,
    pub tls_key_path: Option<PathBuf>,
    pub tls_cert_path: Option<PathBuf>,
    pub pollen_api_key: Option<String>,
    pub pollen_api_base: String,
    pub allowed_origins: Vec<String>,
    pub rate_limit: RateLimitSettings,
    pub upstream_timeout: Duration,
}

/// Fixed-window limits for the pollen endpoint. Defaults match the hosted
/// deployment; every field can be overridden from the environment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RateLimitSettings {
    pub window: Duration,
    pub max_requests: usize,
    pub sweep_threshold: usize,
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            window: Duration::from_millis(60_000),
            max_requests: 10,
            sweep_threshold: 1000,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 3000,
            trust_proxy: true,
            tls_key_path: None,
            tls_cert_path: None,
            pollen_api_key: None,
            pollen_api_base: DEFAULT_POLLEN_API_BASE.to_string(),
            allowed_origins: DEFAULT_ALLOWED_ORIGINS
                .iter()
                .map(ToString::to_string)
                .collect(),
            rate_limit: RateLimitSettings::default(),
            upstream_timeout: Duration::from_secs(5),
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let defaults = Self::default();
        let limits = defaults.rate_limit;

        let trust_proxy = match env::var("TRUST_PROXY") {
            Ok(value) => {
                let normalized = value.trim().to_lowercase();
                !matches!(normalized.as_str(), "false" | "0" | "off" | "no")
            }
            Err(_) => true,
        };

        let pollen_api_key = first_non_empty(POLLEN_API_KEY_VARS.map(|name| env::var(name).ok()));

        let pollen_api_base = env::var("POLLEN_API_BASE")
            .map(|value| value.trim().trim_end_matches('/').to_string())
            .ok()
            .filter(|value| !value.is_empty())
            .unwrap_or(defaults.pollen_api_base);

        if !pollen_api_base.starts_with("http://") && !pollen_api_base.starts_with("https://") {
            return Err(anyhow::anyhow!(
                "POLLEN_API_BASE must be an http(s) URL, got {pollen_api_base}"
            ));
        }

        let allowed_origins = env::var("ALLOWED_ORIGINS")
            .ok()
            .map(|value| parse_origins(&value))
            .unwrap_or(defaults.allowed_origins);

        Ok(Self {
            port: parse_u16(env::var("PORT").ok(), defaults.port),
            trust_proxy,
            tls_key_path: env::var("TLS_KEY_PATH").ok().map(PathBuf::from),
            tls_cert_path: env::var("TLS_CERT_PATH").ok().map(PathBuf::from),
            pollen_api_key,
            pollen_api_base,
            allowed_origins,
            rate_limit: RateLimitSettings {
                window: Duration::from_millis(parse_u64(
                    env::var("RATE_LIMIT_WINDOW_MS").ok(),
                    limits.window.as_millis() as u64,
                )),
                max_requests: parse_usize(
                    env::var("RATE_LIMIT_MAX_REQUESTS").ok(),
                    limits.max_requests,
                ),
                sweep_threshold: parse_usize(
                    env::var("RATE_LIMIT_SWEEP_THRESHOLD").ok(),
                    limits.sweep_threshold,
                ),
            },
            upstream_timeout: Duration::from_secs(parse_u64(
                env::var("UPSTREAM_TIMEOUT_SECS").ok(),
                defaults.upstream_timeout.as_secs(),
            )),
        })
    }
}

fn first_non_empty<I>(candidates: I) -> Option<String>
where
    I: IntoIterator<Item = Option<String>>,
{
    candidates
        .into_iter()
        .flatten()
        .map(|value| value.trim().to_string())
        .find(|value| !value.is_empty())
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|origin| origin.trim().trim_end_matches('/'))
        .filter(|origin| !origin.is_empty())
        .map(ToString::to_string)
        .collect()
}

fn parse_u16(value: Option<String>, fallback: u16) -> u16 {
    value
        .and_then(|v| v.trim().parse::<u16>().ok())
        .filter(|v| *v > 0)
        .unwrap_or(fallback)
}

fn parse_u64(value: Option<String>, fallback: u64) -> u64 {
    value
        .and_then(|v| v.trim().parse::<u64>().ok())
        .filter(|v| *v > 0)
        .unwrap_or(fallback)
}

fn parse_usize(value: Option<String>, fallback: usize) -> usize {
    value
        .and_then(|v| v.trim().parse::<usize>().ok())
        .filter(|v| *v > 0)
        .unwrap_or(fallback)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_hosted_deployment() {
        let config = Config::default();
        assert_eq!(config.rate_limit.window, Duration::from_secs(60));
        assert_eq!(config.rate_limit.max_requests, 10);
        assert_eq!(config.rate_limit.sweep_threshold, 1000);
        assert_eq!(
            config.allowed_origins,
            vec!["https://breeze.earth", "https://www.breeze.earth"]
        );
        assert!(config.pollen_api_key.is_none());
    }

    #[test]
    fn api_key_falls_back_through_legacy_names() {
        assert_eq!(POLLEN_API_KEY_VARS[2], "VITE_GOOGLE_POLLEN_API_KEY");

        let only_vite = [None, None, Some(" vite-key ".to_string())];
        assert_eq!(first_non_empty(only_vite), Some("vite-key".to_string()));

        let preferred = [
            Some("primary".to_string()),
            Some("google".to_string()),
            Some("vite".to_string()),
        ];
        assert_eq!(first_non_empty(preferred), Some("primary".to_string()));

        let blank_primary = [Some("  ".to_string()), None, Some("vite".to_string())];
        assert_eq!(first_non_empty(blank_primary), Some("vite".to_string()));

        assert_eq!(first_non_empty([None, None, None]), None);
    }

    #[test]
    fn origins_are_trimmed_and_empty_entries_dropped() {
        let origins = parse_origins(" https://a.example/ ,, https://b.example");
        assert_eq!(origins, vec!["https://a.example", "https://b.example"]);
    }

    #[test]
    fn numeric_overrides_fall_back_on_garbage_or_zero() {
        assert_eq!(parse_u16(Some("8080".into()), 3000), 8080);
        assert_eq!(parse_u16(Some("0".into()), 3000), 3000);
        assert_eq!(parse_u64(Some("abc".into()), 60_000), 60_000);
        assert_eq!(parse_usize(Some(" 25 ".into()), 10), 25);
        assert_eq!(parse_usize(None, 10), 10);
    }
}
