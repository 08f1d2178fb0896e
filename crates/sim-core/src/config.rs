use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimConfig {
    pub initial_capital: f64,
    pub trade_quantity: f64,
    pub commission_rate: f64,
    pub holding_horizon: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            initial_capital: 10_000.0,
            trade_quantity: 100.0,
            commission_rate: 0.001,
            holding_horizon: 10,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimConfigError {
    InvalidInitialCapital,
    InvalidTradeQuantity,
    InvalidCommissionRate,
    InvalidHoldingHorizon,
}

impl fmt::Display for SimConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidInitialCapital => {
                write!(f, "initial_capital must be finite and greater than zero")
            }
            Self::InvalidTradeQuantity => {
                write!(f, "trade_quantity must be finite and greater than zero")
            }
            Self::InvalidCommissionRate => {
                write!(f, "commission_rate must be finite, at least zero, and below one")
            }
            Self::InvalidHoldingHorizon => {
                write!(f, "holding_horizon must be at least one step")
            }
        }
    }
}

impl std::error::Error for SimConfigError {}

impl SimConfig {
    pub fn new(
        initial_capital: f64,
        trade_quantity: f64,
        commission_rate: f64,
        holding_horizon: u64,
    ) -> Result<Self, SimConfigError> {
        if !initial_capital.is_finite() || initial_capital <= 0.0 {
            return Err(SimConfigError::InvalidInitialCapital);
        }
        if !trade_quantity.is_finite() || trade_quantity <= 0.0 {
            return Err(SimConfigError::InvalidTradeQuantity);
        }
        if !commission_rate.is_finite() || !(0.0..1.0).contains(&commission_rate) {
            return Err(SimConfigError::InvalidCommissionRate);
        }
        if holding_horizon == 0 {
            return Err(SimConfigError::InvalidHoldingHorizon);
        }

        Ok(Self {
            initial_capital,
            trade_quantity,
            commission_rate,
            holding_horizon,
        })
    }
}
