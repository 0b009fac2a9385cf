pub mod factory;
pub mod ledger;
pub mod wallet;
