//! Server mode CLI logic
//!
//! Contains the core logic for running the HTTP server mode.

use crate::{
    config::{ConfigLoader, Settings},
    server::app,
    utils::version,
};
use anyhow::Result;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Arguments for server mode
#[derive(Debug, Default)]
pub struct ServerArgs {
    pub port: Option<u16>,
    pub host: Option<String>,
    pub config: Option<PathBuf>,
    pub verbose: bool,
}

/// Run server mode with the given arguments
pub async fn run_server_mode(args: ServerArgs) -> Result<()> {
    let settings = load_settings(&args)?;

    init_logging(&settings);

    tracing::info!(
        "Starting genspark2api v{} with {} cookie(s)",
        version::get_version(),
        settings.credentials.cookies.len()
    );
    if settings.credentials.cookies.is_empty() {
        tracing::warn!("No cookies configured; generation requests will fail");
    }

    let host = settings.server.host.clone();
    let port = settings.server.port;

    // Create the Axum application
    let app = app::create_app(settings)?;

    let addr = parse_and_bind_address(&host, port).await?;

    tracing::info!(
        "genspark2api v{} listening on {}",
        version::get_version(),
        addr
    );

    // Start the server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Load settings from file and environment, then apply CLI overrides
pub fn load_settings(args: &ServerArgs) -> Result<Settings> {
    let mut loader = ConfigLoader::new();
    if let Some(path) = Settings::default_config_path() {
        loader = loader.with_fallback_file(path);
    }
    let mut settings = loader.load(args.config.as_deref())?;

    if let Some(host) = &args.host {
        settings.server.host = host.clone();
    }
    if let Some(port) = args.port {
        settings.server.port = port;
    }
    if args.verbose {
        settings.logging.verbose = true;
    }

    Ok(settings)
}

/// Log filter: `--verbose` wins, then `RUST_LOG`, then the configured level
fn log_filter(settings: &Settings) -> EnvFilter {
    if settings.logging.verbose {
        return EnvFilter::new("debug");
    }
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&settings.logging.level))
}

fn init_logging(settings: &Settings) {
    // A subscriber may already be installed when embedded in tests
    let _ = tracing_subscriber::fmt()
        .with_env_filter(log_filter(settings))
        .try_init();
}

/// Parse host string and attempt to bind to the address
///
/// `::` is tried first; when the host has no IPv6 support the server falls
/// back to `0.0.0.0`.
pub async fn parse_and_bind_address(host: &str, port: u16) -> Result<std::net::SocketAddr> {
    use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};

    // Try to parse as IP address first
    if let Ok(ip) = host.parse::<IpAddr>() {
        let addr = SocketAddr::new(ip, port);
        tracing::debug!("Parsed address: {}", addr);
        return Ok(addr);
    }

    match host {
        "::" => {
            let addr = SocketAddr::new(IpAddr::V6(Ipv6Addr::UNSPECIFIED), port);
            tracing::debug!("Using IPv6 any address: {}", addr);

            match tokio::net::TcpListener::bind(addr).await {
                Ok(_) => Ok(addr),
                Err(e) => {
                    tracing::warn!(
                        "Could not listen on [::]:{} (Caused by {}), falling back to 0.0.0.0",
                        port,
                        e
                    );
                    Ok(SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), port))
                }
            }
        }
        _ => {
            anyhow::bail!(
                "Invalid host address: {}. Use an IP address such as '::' or '0.0.0.0'",
                host
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_parse_and_bind_ipv4_address() {
        let addr = parse_and_bind_address("127.0.0.1", 0).await.unwrap();
        assert_eq!(addr.ip(), IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1)));
    }

    #[tokio::test]
    async fn test_parse_and_bind_ipv4_any_address() {
        let addr = parse_and_bind_address("0.0.0.0", 7055).await.unwrap();
        assert_eq!(addr.ip(), IpAddr::V4(Ipv4Addr::UNSPECIFIED));
        assert_eq!(addr.port(), 7055);
    }

    #[tokio::test]
    async fn test_parse_and_bind_ipv6_any_fallback() {
        // Either IPv6 unspecified or the IPv4 fallback
        let addr = parse_and_bind_address("::", 0).await.unwrap();
        assert!(
            addr.ip() == IpAddr::V6(Ipv6Addr::UNSPECIFIED)
                || addr.ip() == IpAddr::V4(Ipv4Addr::UNSPECIFIED)
        );
    }

    #[tokio::test]
    async fn test_parse_and_bind_invalid_address() {
        let error = parse_and_bind_address("invalid-host", 8080)
            .await
            .unwrap_err();
        assert!(
            error
                .to_string()
                .contains("Invalid host address: invalid-host")
        );
        assert!(parse_and_bind_address("", 8080).await.is_err());
        assert!(parse_and_bind_address("localhost", 8080).await.is_err());
    }

    #[test]
    fn test_load_settings_applies_cli_overrides() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[server]\nhost = \"0.0.0.0\"\nport = 9000\n\n[credentials]\ncookies = [\"session=a\"]\n",
        )
        .unwrap();

        let args = ServerArgs {
            port: Some(9100),
            config: Some(path),
            verbose: true,
            ..Default::default()
        };
        let settings = load_settings(&args).unwrap();

        assert_eq!(settings.server.port, 9100);
        assert!(settings.logging.verbose);
        assert_eq!(settings.credentials.cookies.len(), 1);
    }

    #[test]
    fn test_log_filter_verbose() {
        let mut settings = Settings::default();
        settings.logging.verbose = true;
        assert!(log_filter(&settings).to_string().contains("debug"));
    }
}
