use std::collections::HashSet;

use super::entry::{EntryKey, WaveEntry};

/// Ordered list of entries shown to the user.
///
/// History comes first in the order the ledger returned it, live entries
/// follow in receipt order. Entries are never reordered or truncated.
#[derive(Debug, Clone, Default)]
pub struct EntryView {
    entries: Vec<WaveEntry>,
    /// Parallel to `entries`: the revision a live entry was appended at,
    /// `None` for entries that came from a history read.
    appended_at: Vec<Option<u64>>,
    keys: HashSet<EntryKey>,
    revision: u64,
}

impl EntryView {
    pub fn entries(&self) -> &[WaveEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Bumped on every change.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn contains(&self, entry: &WaveEntry) -> bool {
        self.keys.contains(&entry.key())
    }

    /// Replaces the view with a history read that started at revision `since`.
    ///
    /// Live entries appended after `since` may postdate the read, so those
    /// missing from `history` are carried over behind it. Returns how many
    /// were carried.
    pub(crate) fn replace(&mut self, history: Vec<WaveEntry>, since: u64) -> usize {
        let carried: Vec<WaveEntry> = self
            .entries
            .drain(..)
            .zip(self.appended_at.drain(..))
            .filter(|(_, at)| at.is_some_and(|at| at > since))
            .map(|(entry, _)| entry)
            .collect();

        self.revision += 1;
        self.keys = history.iter().map(WaveEntry::key).collect();
        self.appended_at = vec![None; history.len()];
        self.entries = history;

        let mut kept = 0;
        for entry in carried {
            if self.keys.insert(entry.key()) {
                self.entries.push(entry);
                self.appended_at.push(Some(self.revision));
                kept += 1;
            }
        }
        kept
    }

    /// Appends a live entry. With `dedupe`, an entry whose key is already
    /// present is refused and `false` is returned.
    pub(crate) fn append(&mut self, entry: WaveEntry, dedupe: bool) -> bool {
        let key = entry.key();
        if dedupe && self.keys.contains(&key) {
            return false;
        }
        self.revision += 1;
        self.keys.insert(key);
        self.entries.push(entry);
        self.appended_at.push(Some(self.revision));
        true
    }
}
