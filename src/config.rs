use anyhow::{Context, Result, bail};
use clap::Parser;
use std::{env, fmt};

const DEFAULT_MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

/// Centralized application configuration.
/// Combines environment variables and CLI arguments.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub max_upload_bytes: usize,
    pub init_db: bool,
    pub mongo: Result<MongoSettings, MissingConfig>,
    pub s3: Result<S3Settings, MissingConfig>,
    pub mysql: Result<MySqlSettings, MissingConfig>,
}

/// Names of required variables that were absent or empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingConfig(pub Vec<&'static str>);

#[derive(Clone)]
pub struct MongoSettings {
    pub uri: String,
    pub database: String,
}

#[derive(Clone)]
pub struct S3Settings {
    pub region: String,
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: Option<String>,
    pub endpoint: Option<String>,
}

#[derive(Clone)]
pub struct MySqlSettings {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
    pub max_connections: u32,
}

/// Command-line + environment configuration.
#[derive(Parser, Debug, Default)]
#[command(author, version, about = "HTTP gateway for MongoDB, MySQL and S3")]
pub struct Args {
    /// Host to bind to (overrides HOST)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to (overrides PORT)
    #[arg(long)]
    pub port: Option<u16>,

    /// Create the product database and table, then exit
    #[arg(long)]
    pub init_db: bool,
}

impl AppConfig {
    /// Parse environment variables + CLI args into AppConfig.
    pub fn from_env_and_args() -> Result<Self> {
        let args = Args::parse();
        Self::resolve(args, |name| env::var(name).ok())
    }

    /// Merge CLI args over values produced by `lookup`.
    ///
    /// Empty values count as absent. Backends with missing required values
    /// are reported through `MissingConfig`; malformed values are errors.
    pub fn resolve(args: Args, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let env_host = get("HOST").unwrap_or_else(|| "0.0.0.0".into());
        let env_port = parse_or(&get, "PORT", 3000u16)?;
        let max_upload_bytes = parse_or(&get, "MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?;

        let mongo = {
            let mut missing = Vec::new();
            let uri = require(&get, "MONGODB_URI", &mut missing);
            match uri {
                Some(uri) => Ok(MongoSettings {
                    uri,
                    database: get("MONGODB_DATABASE").unwrap_or_else(|| "gateway".into()),
                }),
                None => Err(MissingConfig(missing)),
            }
        };

        let s3 = {
            let mut missing = Vec::new();
            let region = require(&get, "AWS_REGION", &mut missing);
            let key_id = require(&get, "AWS_ACCESS_KEY_ID", &mut missing);
            let secret = require(&get, "AWS_SECRET_ACCESS_KEY", &mut missing);
            match (region, key_id, secret) {
                (Some(region), Some(access_key_id), Some(secret_access_key)) => Ok(S3Settings {
                    region,
                    access_key_id,
                    secret_access_key,
                    session_token: get("AWS_SESSION_TOKEN"),
                    endpoint: get("S3_ENDPOINT"),
                }),
                _ => Err(MissingConfig(missing)),
            }
        };

        let mysql = {
            let mut missing = Vec::new();
            let host = require(&get, "DB_HOST", &mut missing);
            let user = require(&get, "DB_USER", &mut missing);
            let password = require(&get, "DB_PASSWORD", &mut missing);
            let database = require(&get, "DB_NAME", &mut missing);
            let port = parse_or(&get, "DB_PORT", 3306u16)?;
            let max_connections = parse_or(&get, "DB_MAX_CONNECTIONS", 10u32)?;
            match (host, user, password, database) {
                (Some(host), Some(user), Some(password), Some(database)) => {
                    if !is_valid_database_name(&database) {
                        bail!(
                            "DB_NAME `{}` must be 1-64 ASCII letters, digits or underscores",
                            database
                        );
                    }
                    Ok(MySqlSettings {
                        host,
                        port,
                        user,
                        password,
                        database,
                        max_connections: max_connections.max(1),
                    })
                }
                _ => Err(MissingConfig(missing)),
            }
        };

        Ok(Self {
            host: args.host.unwrap_or(env_host),
            port: args.port.unwrap_or(env_port),
            max_upload_bytes,
            init_db: args.init_db,
            mongo,
            s3,
            mysql,
        })
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn require(
    get: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    missing: &mut Vec<&'static str>,
) -> Option<String> {
    let value = get(name);
    if value.is_none() {
        missing.push(name);
    }
    value
}

fn parse_or<T>(get: &impl Fn(&str) -> Option<String>, name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match get(name) {
        Some(value) => value
            .trim()
            .parse::<T>()
            .with_context(|| format!("parsing {} value `{}`", name, value)),
        None => Ok(default),
    }
}

/// The database name is spliced into DDL as an identifier, so it is held to
/// a conservative character set.
pub fn is_valid_database_name(name: &str) -> bool {
    !name.is_empty()
        && name.len() <= 64
        && name.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_')
}

impl fmt::Debug for MongoSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // connection strings may embed credentials
        let uri = match self.uri.split_once('@') {
            Some((_, host)) => format!("<redacted>@{}", host),
            None => self.uri.clone(),
        };
        f.debug_struct("MongoSettings")
            .field("uri", &uri)
            .field("database", &self.database)
            .finish()
    }
}

impl fmt::Debug for S3Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("S3Settings")
            .field("region", &self.region)
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .field("session_token", &self.session_token.as_ref().map(|_| "<redacted>"))
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

impl fmt::Debug for MySqlSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MySqlSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("database", &self.database)
            .field("max_connections", &self.max_connections)
            .finish()
    }
}
