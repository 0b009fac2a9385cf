#[allow(clippy::module_inception)]
pub mod error;
pub mod ledger;

pub use error::CliError;
pub use ledger::{LedgerError, WalletError, GENERIC_FAILURE_REASON};
