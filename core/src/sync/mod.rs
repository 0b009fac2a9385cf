//! Client-side view of the wave log, fed by one history read and the live feed.

pub mod entry;
pub mod synchronizer;
pub mod view;

pub use entry::{EntryError, EntryKey, WaveEntry};
pub use synchronizer::EntrySynchronizer;
pub use view::EntryView;
