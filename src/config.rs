//! Connection settings
//!
//! Settings come from an optional `KEY=value` file and are then overridden by
//! whatever was given on the command line (or through the `PG*` environment
//! variables clap reads for those flags).

use std::path::Path;

use crate::error::ReshapeError;

pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 5432;

/// Where and as whom to connect
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    pub host: String,
    pub port: u16,
    pub dbname: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            dbname: None,
            user: None,
            password: None,
        }
    }
}

/// Values supplied on the command line; `None` keeps the current setting
#[derive(Debug, Clone, Default)]
pub struct ConnectionOverrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub dbname: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
}

impl ConnectionConfig {
    /// Read a config file on top of the defaults.
    ///
    /// Keys are `host`, `port`, `dbname`, `user` and `password`, matched
    /// without regard to case. Unknown keys and unparsable ports are errors.
    pub fn load(path: &Path) -> Result<Self, ReshapeError> {
        let read_error = |source| ReshapeError::ConfigRead {
            path: path.to_path_buf(),
            source,
        };
        let invalid = |message: String| ReshapeError::InvalidConfig {
            path: path.to_path_buf(),
            message,
        };

        let mut config = Self::default();
        for item in dotenvy::from_path_iter(path).map_err(read_error)? {
            let (key, value) = item.map_err(read_error)?;
            match key.to_ascii_lowercase().as_str() {
                "host" => config.host = value,
                "port" => {
                    config.port = value
                        .trim()
                        .parse()
                        .map_err(|_| invalid(format!("port \"{}\" is not a number", value)))?
                }
                "dbname" => config.dbname = Some(value),
                "user" => config.user = Some(value),
                "password" => config.password = Some(value),
                _ => return Err(invalid(format!("unknown key \"{}\"", key))),
            }
        }
        Ok(config)
    }

    /// Apply command line values over the current settings
    pub fn apply(&mut self, overrides: ConnectionOverrides) {
        if let Some(host) = overrides.host {
            self.host = host;
        }
        if let Some(port) = overrides.port {
            self.port = port;
        }
        if overrides.dbname.is_some() {
            self.dbname = overrides.dbname;
        }
        if overrides.user.is_some() {
            self.user = overrides.user;
        }
        if overrides.password.is_some() {
            self.password = overrides.password;
        }
    }

    pub fn to_pg_config(&self) -> tokio_postgres::Config {
        let mut config = tokio_postgres::Config::new();
        config
            .host(&self.host)
            .port(self.port)
            .application_name(env!("CARGO_PKG_NAME"));
        if let Some(dbname) = &self.dbname {
            config.dbname(dbname);
        }
        if let Some(user) = &self.user {
            config.user(user);
        }
        if let Some(password) = &self.password {
            config.password(password);
        }
        config
    }

    /// `user@host:port/dbname` for log lines and errors. Never shows the password.
    pub fn display_target(&self) -> String {
        let mut target = String::new();
        if let Some(user) = &self.user {
            target.push_str(user);
            target.push('@');
        }
        target.push_str(&format!("{}:{}", self.host, self.port));
        if let Some(dbname) = &self.dbname {
            target.push('/');
            target.push_str(dbname);
        }
        target
    }
}
