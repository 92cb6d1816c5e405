use tally_broker::BrokerError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RunnerError {
    #[error("Broker error: {0}")]
    Broker(#[from] BrokerError),

    #[error("Target allocation names the cash account {0}")]
    CashTargeted(String),

    #[error("Target allocation names unknown account {0}")]
    UnknownTarget(String),

    #[error("Invalid runner configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, RunnerError>;
