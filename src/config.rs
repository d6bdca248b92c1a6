use std::env;
use std::net::{IpAddr, SocketAddr};

use crate::error::AppError;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub max_connections: u32,
    pub log_filter: String,
}

impl AppConfig {
    /// Reads settings from the process environment (and `.env` if present).
    pub fn new_from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://portal.db?mode=rwc".to_string());
        let host = env::var("PORTAL_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = parse_var("PORTAL_PORT", 3000)?;
        let max_connections = parse_var("PORTAL_MAX_CONNECTIONS", 5)?;
        let log_filter = env::var("RUST_LOG").unwrap_or_else(|_| "portal=debug".to_string());

        Ok(Self {
            database_url,
            host,
            port,
            max_connections,
            log_filter,
        })
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, AppError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|_| AppError::BadRequest(format!("PORTAL_HOST is not an IP address: {}", self.host)))?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

fn parse_var<T: std::str::FromStr>(name: &str, default: T) -> Result<T, AppError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| AppError::BadRequest(format!("{name} has an invalid value: {raw}"))),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(host: &str) -> AppConfig {
        AppConfig {
            database_url: "sqlite::memory:".to_string(),
            host: host.to_string(),
            port: 8080,
            max_connections: 1,
            log_filter: "info".to_string(),
        }
    }

    #[test]
    fn localhost_resolves_to_loopback() {
        let addr = config("localhost").socket_addr().unwrap();
        assert_eq!(addr, SocketAddr::from(([127, 0, 0, 1], 8080)));
    }

    #[test]
    fn bad_host_is_rejected() {
        assert!(matches!(
            config("not a host").socket_addr(),
            Err(AppError::BadRequest(_))
        ));
    }
}
