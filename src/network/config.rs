//! Server configuration from command-line flags and environment.
//!
//! Flags are applied first, then the environment: a non-empty `PORT`
//! replaces whatever port the flags selected.

use std::fmt;
use std::net::IpAddr;

/// Default listening port.
pub const DEFAULT_PORT: u16 = 8080;

/// Environment variable overriding the listening port.
pub const PORT_ENV: &str = "PORT";

/// Environment variable overriding the worker thread count.
pub const WORKERS_ENV: &str = "WIFI_QR_WORKERS";

/// Worker count used when the available parallelism can't be determined.
const FALLBACK_WORKERS: usize = 4;

/// HTTP server settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// IP address to bind to (`None` for 0.0.0.0).
    pub bind_addr: Option<IpAddr>,
    /// Port to listen on.
    pub port: u16,
    /// Number of request worker threads.
    pub workers: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        let workers = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(FALLBACK_WORKERS);
        Self {
            bind_addr: None,
            port: DEFAULT_PORT,
            workers,
        }
    }
}

/// Result of parsing the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliAction {
    /// Start the server with this configuration.
    Run(ServerConfig),
    /// Print usage and exit.
    Help,
}

impl ServerConfig {
    /// Build the configuration from the process arguments and environment.
    pub fn from_env() -> Result<CliAction, ArgsError> {
        let action = Self::parse_args(std::env::args().skip(1))?;
        match action {
            CliAction::Run(config) => Ok(CliAction::Run(
                config.apply_env(|key| std::env::var(key).ok())?,
            )),
            CliAction::Help => Ok(CliAction::Help),
        }
    }

    /// Parse flags (without the program name).
    pub fn parse_args<I, S>(args: I) -> Result<CliAction, ArgsError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut config = Self::default();
        let mut args = args.into_iter().map(Into::into);

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "-p" | "--port" => {
                    let value = args.next().ok_or(ArgsError::MissingValue(arg.clone()))?;
                    config.port = parse_port(&value)?;
                }
                "--bind" => {
                    let value = args.next().ok_or(ArgsError::MissingValue(arg.clone()))?;
                    config.bind_addr = Some(
                        value
                            .parse()
                            .map_err(|_| ArgsError::InvalidBindAddr(value.clone()))?,
                    );
                }
                "--workers" => {
                    let value = args.next().ok_or(ArgsError::MissingValue(arg.clone()))?;
                    config.workers = parse_workers(&value)?;
                }
                "-h" | "--help" => return Ok(CliAction::Help),
                _ => return Err(ArgsError::UnknownFlag(arg.clone())),
            }
        }

        Ok(CliAction::Run(config))
    }

    /// Apply environment overrides. Empty values are ignored.
    pub fn apply_env<F>(mut self, lookup: F) -> Result<Self, ArgsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = lookup(PORT_ENV).filter(|v| !v.is_empty()) {
            self.port = parse_port(&port)?;
        }
        if let Some(workers) = lookup(WORKERS_ENV).filter(|v| !v.is_empty()) {
            self.workers = parse_workers(&workers)?;
        }
        Ok(self)
    }

    /// Address string for binding (ip:port).
    pub fn address(&self) -> String {
        match self.bind_addr {
            Some(ip) => format!("{}:{}", ip, self.port),
            None => format!("0.0.0.0:{}", self.port),
        }
    }
}

/// Usage text for `--help`.
pub fn usage(program: &str) -> String {
    format!(
        "WiFi QR provisioning server\n\
         \n\
         Usage:\n  {program} [OPTIONS]\n\
         \n\
         Options:\n  \
         -p, --port <PORT>  Port to listen on (default {DEFAULT_PORT}, env {PORT_ENV})\n  \
         --bind <IP>        Address to bind to (default 0.0.0.0)\n  \
         --workers <N>      Request worker threads (env {WORKERS_ENV})\n  \
         -h, --help         Show this help"
    )
}

fn parse_port(value: &str) -> Result<u16, ArgsError> {
    value
        .parse()
        .map_err(|_| ArgsError::InvalidPort(value.to_string()))
}

fn parse_workers(value: &str) -> Result<usize, ArgsError> {
    match value.parse() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ArgsError::InvalidWorkers(value.to_string())),
    }
}

/// Errors parsing flags or environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgsError {
    /// Port is not a number in 0-65535.
    InvalidPort(String),
    /// Worker count is not a positive number.
    InvalidWorkers(String),
    /// Bind address is not an IP address.
    InvalidBindAddr(String),
    /// Flag given without its value.
    MissingValue(String),
    /// Unrecognized flag.
    UnknownFlag(String),
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidPort(v) => write!(f, "invalid port: {}", v),
            Self::InvalidWorkers(v) => write!(f, "invalid worker count: {}", v),
            Self::InvalidBindAddr(v) => write!(f, "invalid bind address: {}", v),
            Self::MissingValue(flag) => write!(f, "missing value for {}", flag),
            Self::UnknownFlag(flag) => write!(f, "unknown option: {}", flag),
        }
    }
}

impl std::error::Error for ArgsError {}
