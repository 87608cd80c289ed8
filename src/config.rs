use serde::Deserialize;
use std::net::SocketAddr;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub performance: PerformanceConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub access_log: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PerformanceConfig {
    pub keep_alive_timeout: u64,
    pub read_timeout: u64,
    pub write_timeout: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    /// TOML file holding the people table
    pub path: String,
}

impl Config {
    /// Load `<name>.toml` (optional), then `RESTEZ_*` environment variables, over defaults
    ///
    /// Nested keys use a double underscore: `RESTEZ_SERVER__PORT=9000`.
    pub fn load(name: &str) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("performance.keep_alive_timeout", 75)?
            .set_default("performance.read_timeout", 30)?
            .set_default("performance.write_timeout", 30)?
            .set_default("storage.path", "people.toml")?
            .add_source(config::File::with_name(name).required(false))
            .add_source(
                config::Environment::with_prefix("RESTEZ")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        settings.try_deserialize()
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_config_file() {
        let cfg = Config::load("does-not-exist/restez").unwrap();
        assert_eq!(cfg.server.port, 8080);
        assert_eq!(cfg.server.workers, None);
        assert_eq!(cfg.logging.level, "info");
        assert!(cfg.logging.access_log);
        assert_eq!(cfg.performance.read_timeout, 30);
        assert_eq!(cfg.storage.path, "people.toml");
    }

    #[test]
    fn test_config_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("restez");
        std::fs::write(
            base.with_extension("toml"),
            "[server]\nport = 9090\nworkers = 2\n\n[storage]\npath = \"/tmp/people.toml\"\n",
        )
        .unwrap();

        let cfg = Config::load(base.to_str().unwrap()).unwrap();
        assert_eq!(cfg.server.port, 9090);
        assert_eq!(cfg.server.workers, Some(2));
        assert_eq!(cfg.server.host, "127.0.0.1");
        assert_eq!(cfg.storage.path, "/tmp/people.toml");
    }

    #[test]
    fn test_socket_addr() {
        let mut cfg = Config::load("does-not-exist/restez").unwrap();
        assert_eq!(
            cfg.get_socket_addr().unwrap(),
            "127.0.0.1:8080".parse::<SocketAddr>().unwrap()
        );

        cfg.server.host = "not a host".to_string();
        assert!(cfg.get_socket_addr().unwrap_err().starts_with("Invalid address"));
    }
}
