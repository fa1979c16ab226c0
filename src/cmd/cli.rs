use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tracing_appender::rolling;

use crate::core::common::{LoggingOptions, ResolveOptions, ResolverBackend};
use crate::core::config::Config;
use crate::core::konst::{
    APP_NAME, CLI_HEADER_MSG, CONCURRENCY_LIMIT, CONFIG_FILE, CURRENT_DIR, LOG_ENV_VAR, LOGFILE_NAME, LOGGING_JSON,
    LOGGING_QUIET, LOOKUP_TIMEOUT, QUERY_ATTEMPTS, QUERY_TIMEOUT,
};
use crate::dns::client::{ResolveClient, ResolveClientOptions};
use crate::util::parser::parse_ipaddr;

#[derive(Debug, Subcommand, PartialEq, Clone)]
pub enum ConfigCommand {
    /// Create configuration
    Create {
        /// Config filename.
        /// Search Path: $CWD/sr.toml
        #[clap(short, long, default_value = CONFIG_FILE)]
        file: String,

        /// Warning: Overwrites existing file if found in path.
        #[clap(long, default_value_t = false)]
        force: bool,
    },
}

#[derive(Debug, Subcommand, PartialEq, Clone)]
pub enum Command {
    /// Generate a SubResolve configuration
    Config {
        #[clap(subcommand)]
        command: ConfigCommand,
    },

    /// Resolve A records for a list of candidate subdomains
    #[command(after_help = format_examples(&[
        "sr resolve -f subdomains.txt                 # One hostname per line",
        "sr resolve -f records.json --valid-only      # JSON records, keep resolved only",
        "sr resolve -f subdomains.txt -n 1.1.1.1,8.8.8.8 -C 200",
        "cat subdomains.txt | sr resolve -f - -B system",
    ]))]
    Resolve {
        /// Candidate file (JSON array of records or one hostname per line), `-` for stdin
        #[clap(short = 'f', long, display_order = 1)]
        file: String,

        /// Nameservers to query (comma separated). Defaults to the system configuration.
        #[clap(short = 'n', long, value_delimiter = ',', display_order = 2)]
        nameservers: Vec<String>,

        /// Resolver backend
        #[clap(short = 'B', long, default_value_t = ResolverBackend::default(), display_order = 3)]
        backend: ResolverBackend,

        /// Maximum lookups in flight
        #[clap(short = 'C', long, default_value_t = CONCURRENCY_LIMIT, display_order = 4)]
        concurrency: usize,

        /// Per query timeout (in milliseconds)
        #[clap(short, long, default_value_t = QUERY_TIMEOUT, display_order = 5)]
        timeout: u64,

        /// Attempts per nameserver query
        #[clap(short, long, default_value_t = QUERY_ATTEMPTS, display_order = 6)]
        attempts: usize,

        /// Hard upper bound on a single lookup (in milliseconds)
        #[clap(short = 'L', long, default_value_t = LOOKUP_TIMEOUT, display_order = 7)]
        lookup_timeout: u64,

        /// Only print records that resolved
        #[clap(long, default_value_t = false, display_order = 8)]
        valid_only: bool,

        #[clap(flatten)]
        shared_options: SharedOptions,
    },
}

#[derive(Clone, Debug, Args, PartialEq)]
pub struct SharedOptions {
    /// Config filename.
    /// Search Path: $CWD/sr.toml
    #[clap(short, long, default_value = CONFIG_FILE, display_order = 129)]
    pub config: String,

    // Logging options
    // --------------
    /// Logging directory
    #[clap(long, default_value = CURRENT_DIR, display_order = 320)]
    pub dir: String,

    /// Logging filename
    #[clap(long, default_value = LOGFILE_NAME, display_order = 321)]
    pub log_file: String,

    /// Log to file in JSON format
    #[clap(long, default_value_t = false, display_order = 322)]
    pub json: bool,

    /// Silence progress and summary output
    #[clap(short, long, default_value_t = false, display_order = 324)]
    pub quiet: bool,
}

impl Default for SharedOptions {
    fn default() -> Self {
        Self {
            config: CONFIG_FILE.to_owned(),
            dir: CURRENT_DIR.to_owned(),
            log_file: LOGFILE_NAME.to_owned(),
            json: false,
            quiet: false,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "sr")]
#[command(bin_name = "sr")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "SubResolve - Bulk subdomain A record resolver", long_about = None)]
pub struct Cli {
    #[clap(subcommand)]
    command: Command,
}

impl Cli {
    pub fn init() -> Cli {
        Cli::parse()
    }

    pub async fn run(&self) -> Result<()> {
        // This pulls out the shared options from the nested CLI commands.
        let shared_options = match &self.command {
            Command::Config { .. } => SharedOptions::default(),
            Command::Resolve { shared_options, .. } => shared_options.clone(),
        };

        let config_file = shared_options.config.clone();
        let (config, config_found) = match Config::load(&config_file)? {
            Some(config) => (config, true),
            None => (Config::default(), false),
        };

        let logging_options = merge_logging_options(&config.logging_options, shared_options);

        if !logging_options.quiet {
            eprintln!("{CLI_HEADER_MSG}");
            eprintln!("{}", config_file_msg(&config_file, config_found));
        }

        let file_appender = rolling::never(&logging_options.dir, &logging_options.file);
        let (logfile, _guard) = tracing_appender::non_blocking(file_appender);

        let tracer = tracing_subscriber::fmt()
            .with_env_filter(std::env::var(LOG_ENV_VAR).unwrap_or_else(|_| format!("{APP_NAME}=info")))
            .with_writer(logfile)
            .with_ansi(false)
            .with_target(true);

        if logging_options.json {
            tracer.json().init()
        } else {
            tracer.init()
        }

        match self.command.clone() {
            Command::Config { command } => match command {
                ConfigCommand::Create { file, force } => {
                    Config::generate(&file, force)?;
                }
            },
            Command::Resolve {
                file,
                nameservers,
                backend,
                concurrency,
                timeout,
                attempts,
                lookup_timeout,
                valid_only,
                shared_options: _,
            } => {
                let nameservers = nameservers
                    .iter()
                    .map(|s| parse_ipaddr(s))
                    .collect::<Result<Vec<_>>>()?;

                let resolve_options = merge_resolve_options(
                    &config.resolve_options,
                    ResolveOptions {
                        nameservers,
                        query_timeout: timeout,
                        attempts,
                        lookup_timeout,
                        concurrency,
                        backend,
                    },
                );

                let resolve_client = ResolveClient {
                    client_options: ResolveClientOptions { input: file, valid_only },
                    resolve_options,
                    logging_options,
                };
                resolve_client.resolve().await?;
            }
        }

        Ok(())
    }
}

// CLI options should override config file options.
// If a CLI option is NOT the same as the default,
// the option was set from the CLI. Therefore we should
// use the CLI option. Otherwise use the config file option.
#[rustfmt::skip]
fn merge_logging_options(config: &LoggingOptions, cli: SharedOptions) -> LoggingOptions {
    LoggingOptions {
        dir: if cli.dir != CURRENT_DIR { cli.dir } else { config.dir.clone() },
        file: if cli.log_file != LOGFILE_NAME { cli.log_file } else { config.file.clone() },
        json: if cli.json != LOGGING_JSON { cli.json } else { config.json },
        quiet: if cli.quiet != LOGGING_QUIET { cli.quiet } else { config.quiet },
    }
}

/// Combine config file and CLI resolve options.
/// A CLI value wins when it differs from the built-in default.
#[rustfmt::skip]
fn merge_resolve_options(config: &ResolveOptions, cli: ResolveOptions) -> ResolveOptions {
    let default = ResolveOptions::default();
    ResolveOptions {
        nameservers: if cli.nameservers != default.nameservers { cli.nameservers } else { config.nameservers.clone() },
        query_timeout: if cli.query_timeout != default.query_timeout { cli.query_timeout } else { config.query_timeout },
        attempts: if cli.attempts != default.attempts { cli.attempts } else { config.attempts },
        lookup_timeout: if cli.lookup_timeout != default.lookup_timeout { cli.lookup_timeout } else { config.lookup_timeout },
        concurrency: if cli.concurrency != default.concurrency { cli.concurrency } else { config.concurrency },
        backend: if cli.backend != default.backend { cli.backend } else { config.backend },
    }
}

fn config_file_msg(filename: &str, found: bool) -> String {
    match found {
        true => format!("Using configuration file `{filename}`.\n"),
        false => format!("Configuration file `{filename}` not found. Using default configuration.\n"),
    }
}

/// Format example commands
fn format_examples(examples: &[&str]) -> String {
    let mut result = String::from("\x1B[1;4mExamples:\x1B[0m\n");
    for example in examples {
        result.push_str(&format!("  {}\n", example));
    }
    // Forces visible blank new line.
    // Otherwise, clap strips out raw trailing whitespace.
    result.push_str("\x1B[0m\n");
    result
}
