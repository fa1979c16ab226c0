pub const APP_NAME: &str = "subresolve";
pub const CLI_HEADER_MSG: &str = "SubResolve - Bulk subdomain A record resolver";

pub const CONFIG_FILE: &str = "sr.toml";
pub const CURRENT_DIR: &str = ".";
pub const LOGFILE_NAME: &str = "sr.log";
pub const LOG_ENV_VAR: &str = "SR_LOG";

pub const LOGGING_JSON: bool = false;
pub const LOGGING_QUIET: bool = false;

// Resolver defaults (in milliseconds where applicable)
pub const QUERY_TIMEOUT: u64 = 5000;
pub const QUERY_ATTEMPTS: usize = 2;
pub const LOOKUP_TIMEOUT: u64 = 20000;
pub const CONCURRENCY_LIMIT: usize = 500;

pub const DNS_PORT: u16 = 53;

pub const IPS_SEPARATOR: &str = ",";
pub const PROGRESS_BAR_WIDTH: usize = 30;
