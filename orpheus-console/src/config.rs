//! Console configuration
//!
//! Defines the bind address, datastore connection, and cluster access
//! settings. Everything is read from the environment.

use std::path::PathBuf;
use std::time::Duration;

use sqlx::postgres::PgConnectOptions;

/// Console configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Address the HTTP server binds to (e.g., "0.0.0.0:3000")
    pub bind_addr: String,

    /// PostgreSQL connection URL of the observed datastore; takes precedence
    /// over the individual `db_*` settings
    pub database_url: Option<String>,

    pub db_host: String,
    pub db_port: u16,
    pub db_user: String,
    /// Passed to the driver as-is, never spliced into a URL
    pub db_password: Option<String>,
    pub db_name: String,

    /// Upper bound of the datastore connection pool
    pub db_max_connections: u32,

    /// Explicit kubeconfig file; when absent the cluster config is inferred
    pub kubeconfig: Option<PathBuf>,

    /// Namespace every job is launched into and listed from
    pub namespace: String,

    /// Bound on a whole gateway call, connection included
    pub gateway_timeout: Duration,

    /// TCP connect timeout towards the API server
    pub connect_timeout: Duration,
}

impl Config {
    /// Creates configuration from environment variables
    ///
    /// Expected environment variables:
    /// - ORPHEUS_BIND_ADDR (optional, default: 0.0.0.0:3000)
    /// - DATABASE_URL (optional; wins over the DB_* parts)
    /// - DB_HOST, DB_PORT, DB_USER, DB_PASSWORD, DB_NAME (optional, default:
    ///   localhost, 5432, postgres, none, postgres)
    /// - DB_MAX_CONNECTIONS (optional, default: 10)
    /// - ORPHEUS_KUBECONFIG (optional)
    /// - ORPHEUS_NAMESPACE (optional, default: orpheus)
    /// - ORPHEUS_GATEWAY_TIMEOUT (optional, seconds, default: 30)
    /// - ORPHEUS_CONNECT_TIMEOUT (optional, seconds, default: 5)
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`Config::from_env`] with an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let bind_addr = lookup("ORPHEUS_BIND_ADDR").unwrap_or(defaults.bind_addr);

        let database_url = lookup("DATABASE_URL").filter(|url| !url.is_empty());

        let db_host = lookup("DB_HOST").unwrap_or(defaults.db_host);
        let db_port = parse_or(&lookup, "DB_PORT", defaults.db_port)?;
        let db_user = lookup("DB_USER").unwrap_or(defaults.db_user);
        let db_password = lookup("DB_PASSWORD").filter(|p| !p.is_empty());
        let db_name = lookup("DB_NAME").unwrap_or(defaults.db_name);

        let db_max_connections = parse_or(&lookup, "DB_MAX_CONNECTIONS", defaults.db_max_connections)?;

        let kubeconfig = lookup("ORPHEUS_KUBECONFIG")
            .filter(|path| !path.is_empty())
            .map(PathBuf::from);

        let namespace = lookup("ORPHEUS_NAMESPACE").unwrap_or(defaults.namespace);

        let gateway_timeout = Duration::from_secs(parse_or(
            &lookup,
            "ORPHEUS_GATEWAY_TIMEOUT",
            defaults.gateway_timeout.as_secs(),
        )?);

        let connect_timeout = Duration::from_secs(parse_or(
            &lookup,
            "ORPHEUS_CONNECT_TIMEOUT",
            defaults.connect_timeout.as_secs(),
        )?);

        Ok(Self {
            bind_addr,
            database_url,
            db_host,
            db_port,
            db_user,
            db_password,
            db_name,
            db_max_connections,
            kubeconfig,
            namespace,
            gateway_timeout,
            connect_timeout,
        })
    }

    /// Validates the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.bind_addr.is_empty() {
            anyhow::bail!("bind_addr cannot be empty");
        }

        if let Some(url) = &self.database_url {
            if !url.starts_with("postgres://") && !url.starts_with("postgresql://") {
                anyhow::bail!("database_url must start with postgres:// or postgresql://");
            }
        }

        if self.db_port == 0 {
            anyhow::bail!("db_port must be greater than 0");
        }

        self.connect_options()
            .map_err(|e| anyhow::anyhow!("invalid datastore connection settings: {}", e))?;

        if self.db_max_connections == 0 {
            anyhow::bail!("db_max_connections must be greater than 0");
        }

        if self.namespace.trim().is_empty() {
            anyhow::bail!("namespace cannot be empty");
        }

        if self.gateway_timeout.as_secs() == 0 {
            anyhow::bail!("gateway_timeout must be greater than 0");
        }

        if self.connect_timeout.as_secs() == 0 {
            anyhow::bail!("connect_timeout must be greater than 0");
        }

        Ok(())
    }

    /// Driver connection options for the datastore.
    ///
    /// `DATABASE_URL` is parsed when set. Otherwise the parts are handed to
    /// the driver one by one, so credentials containing `@`, `/`, `#` or `:`
    /// reach the server unchanged.
    pub fn connect_options(&self) -> Result<PgConnectOptions, sqlx::Error> {
        if let Some(url) = &self.database_url {
            return url.parse::<PgConnectOptions>();
        }

        let options = PgConnectOptions::new()
            .host(&self.db_host)
            .port(self.db_port)
            .username(&self.db_user)
            .database(&self.db_name);

        Ok(match &self.db_password {
            Some(password) => options.password(password),
            None => options,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:3000".to_string(),
            database_url: None,
            db_host: "localhost".to_string(),
            db_port: 5432,
            db_user: "postgres".to_string(),
            db_password: None,
            db_name: "postgres".to_string(),
            db_max_connections: 10,
            kubeconfig: None,
            namespace: "orpheus".to_string(),
            gateway_timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(5),
        }
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> anyhow::Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| anyhow::anyhow!("{} must be a non-negative integer, got {:?}", key, raw)),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.bind_addr, "0.0.0.0:3000");
        assert_eq!(config.namespace, "orpheus");
        assert_eq!(config.gateway_timeout, Duration::from_secs(30));
        assert!(config.kubeconfig.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_environment_uses_defaults() {
        let config = Config::from_lookup(lookup_from(&[])).unwrap();
        assert!(config.database_url.is_none());
        assert_eq!(config.db_host, "localhost");
        assert_eq!(config.db_port, 5432);
        assert_eq!(config.db_max_connections, 10);
        assert_eq!(config.connect_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_connect_options_from_parts() {
        let config = Config::from_lookup(lookup_from(&[
            ("DB_HOST", "db.internal"),
            ("DB_PORT", "6543"),
            ("DB_USER", "nexus"),
            ("DB_PASSWORD", "secret"),
            ("DB_NAME", "market"),
        ]))
        .unwrap();

        let options = config.connect_options().unwrap();
        assert_eq!(options.get_host(), "db.internal");
        assert_eq!(options.get_port(), 6543);
        assert_eq!(options.get_username(), "nexus");
        assert_eq!(options.get_database(), Some("market"));
    }

    #[test]
    fn test_reserved_characters_in_password_keep_other_parts() {
        let config = Config::from_lookup(lookup_from(&[
            ("DB_HOST", "db.internal"),
            ("DB_USER", "nexus"),
            ("DB_PASSWORD", "p@ss:w/rd#1?x"),
            ("DB_NAME", "market"),
        ]))
        .unwrap();
        assert!(config.validate().is_ok());

        let options = config.connect_options().unwrap();
        assert_eq!(options.get_host(), "db.internal");
        assert_eq!(options.get_port(), 5432);
        assert_eq!(options.get_username(), "nexus");
        assert_eq!(options.get_database(), Some("market"));
    }

    #[test]
    fn test_database_url_wins_over_parts() {
        let config = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://a@b:5433/c"),
            ("DB_HOST", "ignored"),
        ]))
        .unwrap();

        let options = config.connect_options().unwrap();
        assert_eq!(options.get_host(), "b");
        assert_eq!(options.get_port(), 5433);
        assert_eq!(options.get_username(), "a");
        assert_eq!(options.get_database(), Some("c"));
    }

    #[test]
    fn test_cluster_settings() {
        let config = Config::from_lookup(lookup_from(&[
            ("ORPHEUS_KUBECONFIG", "/etc/orpheus/kubeconfig"),
            ("ORPHEUS_NAMESPACE", "batch"),
            ("ORPHEUS_GATEWAY_TIMEOUT", "12"),
        ]))
        .unwrap();

        assert_eq!(config.kubeconfig, Some(PathBuf::from("/etc/orpheus/kubeconfig")));
        assert_eq!(config.namespace, "batch");
        assert_eq!(config.gateway_timeout, Duration::from_secs(12));
    }

    #[test]
    fn test_unparsable_number_is_an_error() {
        let result = Config::from_lookup(lookup_from(&[("DB_MAX_CONNECTIONS", "many")]));
        assert!(result.is_err());

        let result = Config::from_lookup(lookup_from(&[("DB_PORT", "70000")]));
        assert!(result.is_err());
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();
        assert!(config.validate().is_ok());

        config.database_url = Some("mysql://localhost/x".to_string());
        assert!(config.validate().is_err());
        config.database_url = Some("postgresql://localhost/x".to_string());
        assert!(config.validate().is_ok());
        config.database_url = None;

        config.db_port = 0;
        assert!(config.validate().is_err());
        config.db_port = 5432;

        config.gateway_timeout = Duration::from_secs(0);
        assert!(config.validate().is_err());
        config.gateway_timeout = Duration::from_secs(30);

        config.namespace = " ".to_string();
        assert!(config.validate().is_err());
    }
}
