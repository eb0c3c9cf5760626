use crate::rate_limiter::RateLimitConfig;
use std::env;
use std::time::Duration;

/// Credentials for the completion-service deployment. All three values are
/// required to call the upstream API; requests fail with a configuration
/// error when any is absent.
#[derive(Debug, Clone)]
pub struct CompletionConfig {
    pub api_key: String,
    pub endpoint: String,
    pub deployment: String,
}

impl CompletionConfig {
    pub fn from_env() -> Option<Self> {
        let api_key = env::var("AZURE_OPENAI_API_KEY").ok()?;
        let endpoint = env::var("AZURE_OPENAI_ENDPOINT").ok()?;
        let deployment = env::var("AZURE_OPENAI_DEPLOYMENT").ok()?;

        if api_key.is_empty() || endpoint.is_empty() || deployment.is_empty() {
            return None;
        }

        Some(Self {
            api_key,
            endpoint,
            deployment,
        })
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub log_format: LogFormat,
    pub cors_origins: Vec<String>,
    pub rate_limit: RateLimitConfig,
    pub completion: Option<CompletionConfig>,
}

#[derive(Debug, Clone)]
pub enum LogFormat {
    Text,
    Json,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            log_level: "docgen_api=debug,tower_http=debug".to_string(),
            log_format: LogFormat::Json,
            cors_origins: vec!["*".to_string()],
            rate_limit: RateLimitConfig::default(),
            completion: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(host) = env::var("DOCGEN_HOST") {
            config.host = host;
        }

        if let Ok(port_str) = env::var("DOCGEN_PORT") {
            if let Ok(port) = port_str.parse::<u16>() {
                config.port = port;
            } else {
                eprintln!(
                    "Warning: Invalid DOCGEN_PORT value '{}', using default {}",
                    port_str, config.port
                );
            }
        } else if let Ok(port_str) = env::var("PORT") {
            if let Ok(port) = port_str.parse::<u16>() {
                config.port = port;
            }
        }

        if let Ok(log_level) = env::var("RUST_LOG") {
            config.log_level = log_level;
        } else if let Ok(log_level) = env::var("DOCGEN_LOG_LEVEL") {
            config.log_level = log_level;
        }

        if let Ok(log_format) = env::var("DOCGEN_LOG_FORMAT") {
            config.log_format = match log_format.to_lowercase().as_str() {
                "text" | "plain" => LogFormat::Text,
                "json" => LogFormat::Json,
                _ => {
                    eprintln!(
                        "Warning: Invalid DOCGEN_LOG_FORMAT value '{}', using default JSON",
                        log_format
                    );
                    LogFormat::Json
                }
            };
        }

        if let Ok(cors_origins) = env::var("DOCGEN_CORS_ORIGINS") {
            config.cors_origins = cors_origins
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        if let Ok(requests_str) = env::var("DOCGEN_RATE_LIMIT_MAX_REQUESTS") {
            if let Ok(requests) = requests_str.parse::<usize>() {
                config.rate_limit.max_requests = requests;
            } else {
                eprintln!(
                    "Warning: Invalid DOCGEN_RATE_LIMIT_MAX_REQUESTS value '{}', using default {}",
                    requests_str, config.rate_limit.max_requests
                );
            }
        }

        if let Ok(window_str) = env::var("DOCGEN_RATE_LIMIT_WINDOW_SECONDS") {
            if let Ok(window) = window_str.parse::<u64>() {
                config.rate_limit.window = Duration::from_secs(window);
            } else {
                eprintln!(
                    "Warning: Invalid DOCGEN_RATE_LIMIT_WINDOW_SECONDS value '{}', using default {}",
                    window_str,
                    config.rate_limit.window.as_secs()
                );
            }
        }

        if let Ok(sweep_str) = env::var("DOCGEN_RATE_LIMIT_SWEEP_INTERVAL_SECONDS") {
            if let Ok(sweep) = sweep_str.parse::<u64>() {
                config.rate_limit.sweep_interval = Duration::from_secs(sweep);
            } else {
                eprintln!(
                    "Warning: Invalid DOCGEN_RATE_LIMIT_SWEEP_INTERVAL_SECONDS value '{}', using default {}",
                    sweep_str,
                    config.rate_limit.sweep_interval.as_secs()
                );
            }
        }

        config.completion = CompletionConfig::from_env();

        config
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn server_url(&self) -> String {
        if self.port == 80 {
            format!("http://{}", self.host)
        } else if self.port == 443 {
            format!("https://{}", self.host)
        } else {
            format!("http://{}:{}", self.host, self.port)
        }
    }
}
