pub mod gateway;
pub mod http_client;
pub mod memory;

pub use gateway::GatewayLedger;
pub use memory::{MemoryChain, MemoryLedger};
