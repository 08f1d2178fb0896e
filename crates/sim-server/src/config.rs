use std::{
    env, fmt,
    net::{AddrParseError, SocketAddr},
};

use sim_core::{SimConfig, SimConfigError};

const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8000";
const DEFAULT_MODE: RunMode = RunMode::Serve;
const DEFAULT_TAPE_PATH: &str = "data/tape.csv";
const DEFAULT_SESSION_OUTPUT_PATH: &str = "artifacts/session.csv";
const DEFAULT_INITIAL_CAPITAL: f64 = 10_000.0;
const DEFAULT_TRADE_QUANTITY: f64 = 100.0;
const DEFAULT_COMMISSION_RATE: f64 = 0.001;
const DEFAULT_HOLDING_HORIZON: u64 = 10;
const DEFAULT_STREAM_INTERVAL_MS: u64 = 1_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    Serve,
    Batch,
}

impl RunMode {
    fn parse(value: &str) -> Option<Self> {
        match value {
            "serve" => Some(Self::Serve),
            "batch" => Some(Self::Batch),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Serve => "serve",
            Self::Batch => "batch",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub listen_addr: SocketAddr,
    pub mode: RunMode,
    pub tape_path: String,
    pub session_output_path: String,
    pub initial_capital: f64,
    pub trade_quantity: f64,
    pub commission_rate: f64,
    pub holding_horizon: u64,
    pub stream_interval_ms: u64,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidListenAddr(AddrParseError),
    InvalidMode,
    InvalidTapePath,
    InvalidSessionOutputPath,
    InvalidInitialCapital,
    InvalidTradeQuantity,
    InvalidCommissionRate,
    InvalidHoldingHorizon,
    InvalidStreamInterval,
    NonUnicode(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidListenAddr(err) => {
                write!(f, "SIM_SERVER_ADDR is not a valid socket address: {err}")
            }
            Self::InvalidMode => {
                write!(f, "SIM_SERVER_MODE must be one of: serve, batch")
            }
            Self::InvalidTapePath => {
                write!(f, "SIM_TAPE_PATH must not be empty or whitespace")
            }
            Self::InvalidSessionOutputPath => {
                write!(f, "SIM_SESSION_OUTPUT must not be empty or whitespace")
            }
            Self::InvalidInitialCapital => {
                write!(f, "SIM_INITIAL_CAPITAL must be a finite number greater than zero")
            }
            Self::InvalidTradeQuantity => {
                write!(f, "SIM_TRADE_QUANTITY must be a finite number greater than zero")
            }
            Self::InvalidCommissionRate => {
                write!(
                    f,
                    "SIM_COMMISSION_RATE must be a finite rate of at least zero and below one"
                )
            }
            Self::InvalidHoldingHorizon => {
                write!(f, "SIM_HOLDING_HORIZON must be a whole number of at least one step")
            }
            Self::InvalidStreamInterval => {
                write!(f, "SIM_STREAM_INTERVAL_MS must be a whole number of milliseconds")
            }
            Self::NonUnicode(key) => {
                write!(f, "{key} contains non-unicode data")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidListenAddr(err) => Some(err),
            _ => None,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let listen_addr = match read_env("SIM_SERVER_ADDR")? {
            Some(value) => value.parse().map_err(ConfigError::InvalidListenAddr)?,
            None => DEFAULT_LISTEN_ADDR
                .parse()
                .expect("default listen address must be valid"),
        };

        let mode = match read_env("SIM_SERVER_MODE")? {
            Some(value) => RunMode::parse(value.as_str()).ok_or(ConfigError::InvalidMode)?,
            None => DEFAULT_MODE,
        };

        let tape_path = read_path_env("SIM_TAPE_PATH", DEFAULT_TAPE_PATH, ConfigError::InvalidTapePath)?;
        let session_output_path = read_path_env(
            "SIM_SESSION_OUTPUT",
            DEFAULT_SESSION_OUTPUT_PATH,
            ConfigError::InvalidSessionOutputPath,
        )?;

        let initial_capital = parse_positive_env(
            "SIM_INITIAL_CAPITAL",
            DEFAULT_INITIAL_CAPITAL,
            ConfigError::InvalidInitialCapital,
        )?;
        let trade_quantity = parse_positive_env(
            "SIM_TRADE_QUANTITY",
            DEFAULT_TRADE_QUANTITY,
            ConfigError::InvalidTradeQuantity,
        )?;

        let commission_rate = match read_env("SIM_COMMISSION_RATE")? {
            Some(value) => {
                let parsed: f64 = value
                    .parse()
                    .map_err(|_| ConfigError::InvalidCommissionRate)?;
                if !parsed.is_finite() || !(0.0..1.0).contains(&parsed) {
                    return Err(ConfigError::InvalidCommissionRate);
                }
                parsed
            }
            None => DEFAULT_COMMISSION_RATE,
        };

        let holding_horizon = match read_env("SIM_HOLDING_HORIZON")? {
            Some(value) => {
                let parsed: u64 = value
                    .parse()
                    .map_err(|_| ConfigError::InvalidHoldingHorizon)?;
                if parsed == 0 {
                    return Err(ConfigError::InvalidHoldingHorizon);
                }
                parsed
            }
            None => DEFAULT_HOLDING_HORIZON,
        };

        let stream_interval_ms = match read_env("SIM_STREAM_INTERVAL_MS")? {
            Some(value) => value
                .parse()
                .map_err(|_| ConfigError::InvalidStreamInterval)?,
            None => DEFAULT_STREAM_INTERVAL_MS,
        };

        Ok(Self {
            listen_addr,
            mode,
            tape_path,
            session_output_path,
            initial_capital,
            trade_quantity,
            commission_rate,
            holding_horizon,
            stream_interval_ms,
        })
    }

    pub fn sim_config(&self) -> Result<SimConfig, SimConfigError> {
        SimConfig::new(
            self.initial_capital,
            self.trade_quantity,
            self.commission_rate,
            self.holding_horizon,
        )
    }
}

fn read_env(key: &'static str) -> Result<Option<String>, ConfigError> {
    match env::var(key) {
        Ok(value) => Ok(Some(value)),
        Err(env::VarError::NotPresent) => Ok(None),
        Err(env::VarError::NotUnicode(_)) => Err(ConfigError::NonUnicode(key)),
    }
}

fn read_path_env(
    key: &'static str,
    default_value: &str,
    invalid_error: ConfigError,
) -> Result<String, ConfigError> {
    match read_env(key)? {
        Some(value) => {
            if value.trim().is_empty() {
                return Err(invalid_error);
            }
            Ok(value)
        }
        None => Ok(default_value.to_owned()),
    }
}

fn parse_positive_env(
    key: &'static str,
    default_value: f64,
    invalid_error: ConfigError,
) -> Result<f64, ConfigError> {
    match read_env(key)? {
        Some(value) => {
            let parsed = match value.parse::<f64>() {
                Ok(parsed) => parsed,
                Err(_) => return Err(invalid_error),
            };
            if !parsed.is_finite() || parsed <= 0.0 {
                return Err(invalid_error);
            }
            Ok(parsed)
        }
        None => Ok(default_value),
    }
}
