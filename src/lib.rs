pub mod adapters;
pub mod commands;
pub mod config;
pub mod domain;
pub mod locks;
pub mod ports;

pub use commands::{Error, LedgerService};
pub use config::{AccountPolicy, LedgerConfig, ReadConsistency};
pub use domain::{PointHistory, TransactionType, UserId, UserPoint, MIN_CHARGE_AMOUNT};
