//! Observable state changes shared across the portal components.

pub mod bus;
pub mod types;

pub use bus::EventBus;
pub use types::PortalEvent;
