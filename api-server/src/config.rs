//! Server configuration read from the environment

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

const DEFAULT_DATA_DIR: &str = ".tarefas-data";
const DEFAULT_PORT: u16 = 8081;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Directory holding `tasks.json`
    pub data_dir: PathBuf,
    pub host: IpAddr,
    pub port: u16,
    /// Attach a permissive CORS layer
    pub cors: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
            cors: true,
        }
    }
}

impl ServerConfig {
    /// Read `TAREFAS_DATA_DIR`, `TAREFAS_HOST`, `TAREFAS_PORT` and `TAREFAS_CORS`
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build a config from any variable source; unparsable values keep the default
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let data_dir = lookup("TAREFAS_DATA_DIR")
            .filter(|raw| !raw.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or(defaults.data_dir);

        let host = parse_or("TAREFAS_HOST", lookup("TAREFAS_HOST"), defaults.host);
        let port = parse_or("TAREFAS_PORT", lookup("TAREFAS_PORT"), defaults.port);
        let cors = lookup("TAREFAS_CORS")
            .as_deref()
            .and_then(parse_flag)
            .unwrap_or(defaults.cors);

        Self {
            data_dir,
            host,
            port,
            cors,
        }
    }

    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

fn parse_or<T: std::str::FromStr>(name: &str, raw: Option<String>, default: T) -> T {
    match raw {
        Some(raw) => match raw.trim().parse() {
            Ok(value) => value,
            Err(_) => {
                tracing::warn!("Ignoring invalid {}={:?}", name, raw);
                default
            }
        },
        None => default,
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> ServerConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]);
        assert_eq!(config, ServerConfig::default());
        assert_eq!(config.addr().to_string(), "0.0.0.0:8081");
        assert_eq!(config.data_dir, PathBuf::from(".tarefas-data"));
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("TAREFAS_DATA_DIR", "/var/lib/tarefas"),
            ("TAREFAS_HOST", "127.0.0.1"),
            ("TAREFAS_PORT", "9000"),
            ("TAREFAS_CORS", "off"),
        ]);

        assert_eq!(config.data_dir, PathBuf::from("/var/lib/tarefas"));
        assert_eq!(config.addr().to_string(), "127.0.0.1:9000");
        assert!(!config.cors);
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let config = config_from(&[
            ("TAREFAS_PORT", "eighty"),
            ("TAREFAS_HOST", "not-an-ip"),
            ("TAREFAS_CORS", "maybe"),
            ("TAREFAS_DATA_DIR", "  "),
        ]);
        assert_eq!(config, ServerConfig::default());
    }
}
