use clap::{Parser, ValueEnum};
use detour_telemetry::LogFormat;
use std::fmt::{Display, Formatter};
use std::net::SocketAddr;
use std::path::PathBuf;

pub const LISTEN_ADDR_ENV: &str = "DETOUR_LISTEN_ADDR";
pub const STORAGE_BACKEND_ENV: &str = "DETOUR_STORAGE_BACKEND";
pub const MYSQL_DSN_ENV: &str = "DETOUR_MYSQL_DSN";
pub const SOURCE_URI_PATH_PATTERN_ENV: &str = "DETOUR_SOURCE_URI_PATH_PATTERN";
pub const DEFAULT_STATUS_CODE_ENV: &str = "DETOUR_DEFAULT_STATUS_CODE";
pub const SHOW_HIT_COUNT_ENV: &str = "DETOUR_SHOW_HIT_COUNT";
pub const ACCOUNT_ENV: &str = "DETOUR_ACCOUNT";
pub const CSRF_TOKEN_ENV: &str = "DETOUR_CSRF_TOKEN";
pub const HOSTS_ENV: &str = "DETOUR_HOSTS";
pub const CATALOG_ENV: &str = "DETOUR_CATALOG";
pub const LOG_FORMAT_ENV: &str = "DETOUR_LOG_FORMAT";

pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:8080";
pub const DEFAULT_SOURCE_URI_PATH_PATTERN: &str = detour_admin::options::DEFAULT_SOURCE_URI_PATH_PATTERN;
pub const DEFAULT_STATUS_CODE: &str = "301";
pub const DEFAULT_LOG_FORMAT: &str = "text";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StorageBackendArg {
    #[value(name = "in-memory")]
    InMemory,
    #[value(name = "mysql")]
    Mysql,
}

impl Display for StorageBackendArg {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageBackendArg::InMemory => write!(f, "in-memory"),
            StorageBackendArg::Mysql => write!(f, "mysql"),
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "detour-gateway")]
pub struct CLI {
    #[arg(long, env = LISTEN_ADDR_ENV, default_value = DEFAULT_LISTEN_ADDR)]
    pub listen_addr: SocketAddr,

    #[arg(
        long,
        env = STORAGE_BACKEND_ENV,
        value_enum,
        default_value_t = StorageBackendArg::InMemory
    )]
    pub storage: StorageBackendArg,

    #[arg(long, env = MYSQL_DSN_ENV, required_if_eq("storage", "mysql"))]
    pub mysql_dsn: Option<String>,

    /// Regular expression every source uri path has to match.
    #[arg(
        long,
        env = SOURCE_URI_PATH_PATTERN_ENV,
        default_value = DEFAULT_SOURCE_URI_PATH_PATTERN
    )]
    pub source_uri_path_pattern: String,

    #[arg(long, env = DEFAULT_STATUS_CODE_ENV, default_value = DEFAULT_STATUS_CODE)]
    pub default_status_code: u16,

    #[arg(long, env = SHOW_HIT_COUNT_ENV)]
    pub show_hit_count: bool,

    /// Account recorded as creator of new redirects.
    #[arg(long, env = ACCOUNT_ENV)]
    pub account: Option<String>,

    /// Token mutations must send back; the check is off when unset.
    #[arg(long, env = CSRF_TOKEN_ENV)]
    pub csrf_token: Option<String>,

    /// Hosts offered in the redirect form.
    #[arg(long, env = HOSTS_ENV, value_delimiter = ',')]
    pub hosts: Vec<String>,

    /// JSON file of `id -> label` overriding the built-in messages.
    #[arg(long, env = CATALOG_ENV)]
    pub catalog: Option<PathBuf>,

    #[arg(long, env = LOG_FORMAT_ENV, default_value = DEFAULT_LOG_FORMAT)]
    pub log_format: LogFormat,
}
