pub mod api;
pub mod config;
pub mod error;
pub mod ledger;
pub mod portal;
pub mod session;
pub mod state;
pub mod submission;
pub mod sync;

#[cfg(test)]
mod testing;
