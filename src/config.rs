use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;
use crate::error::{AppError, Result};

#[derive(Clone)]
pub struct Config {
    pub server_addr: SocketAddr,
    /// Bound on each content-extraction fetch.
    pub fetch_timeout: Duration,
    /// Bound on the model call.
    pub llm_timeout: Duration,
    /// Skip TLS certificate verification on generic web fetches.
    ///
    /// Defaults to true, which maximizes extraction success across arbitrary
    /// third-party sites at the cost of transport security. Set
    /// DANGER_ACCEPT_INVALID_CERTS=false to verify certificates.
    pub danger_accept_invalid_certs: bool,
}

impl Config {
    pub fn load() -> Result<Self> {
        // Load environment variables from .env file if it exists
        dotenv::dotenv().ok();

        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("PORT").unwrap_or_else(|_| "3000".to_string());
        let port = port.parse::<u16>().map_err(|e| AppError::Config(format!("Invalid port: {}", e)))?;
        let ip = IpAddr::from_str(&host).map_err(|e| AppError::Config(format!("Invalid host address: {}", e)))?;

        let fetch_timeout = parse_secs("FETCH_TIMEOUT_SECS", 15)?;
        let llm_timeout = parse_secs("LLM_TIMEOUT_SECS", 60)?;

        let danger_accept_invalid_certs = match env::var("DANGER_ACCEPT_INVALID_CERTS") {
            Ok(v) => v.parse::<bool>().map_err(|e| {
                AppError::Config(format!("Invalid DANGER_ACCEPT_INVALID_CERTS: {}", e))
            })?,
            Err(_) => true,
        };

        Ok(Config {
            server_addr: SocketAddr::new(ip, port),
            fetch_timeout,
            llm_timeout,
            danger_accept_invalid_certs,
        })
    }
}

fn parse_secs(var: &str, default: u64) -> Result<Duration> {
    secs_or_default(env::var(var).ok().as_deref(), var, default)
}

fn secs_or_default(value: Option<&str>, var: &str, default: u64) -> Result<Duration> {
    let secs = match value {
        Some(v) => v
            .parse::<u64>()
            .map_err(|e| AppError::Config(format!("Invalid {}: {}", var, e)))?,
        None => default,
    };
    Ok(Duration::from_secs(secs))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_timeout_falls_back_to_default() {
        assert_eq!(
            secs_or_default(None, "FETCH_TIMEOUT_SECS", 15).unwrap(),
            Duration::from_secs(15)
        );
    }

    #[test]
    fn set_timeout_is_parsed() {
        assert_eq!(
            secs_or_default(Some("30"), "LLM_TIMEOUT_SECS", 60).unwrap(),
            Duration::from_secs(30)
        );
    }

    #[test]
    fn unparseable_timeout_is_a_config_error() {
        let err = secs_or_default(Some("soon"), "FETCH_TIMEOUT_SECS", 15).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
        assert!(err.to_string().contains("FETCH_TIMEOUT_SECS"));
    }
}
