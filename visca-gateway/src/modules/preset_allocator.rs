use crate::modules::roster::{ClientKey, PresetRange, PresetRanges};
use std::collections::HashMap;

/// Round-robin preset counter per client, bounded by that client's configured range.
#[derive(Debug, Default)]
pub struct PresetAllocator {
    ranges: PresetRanges,
    current: HashMap<ClientKey, u16>,
}

impl PresetAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sync_ranges(&mut self, latest: &PresetRanges) {
        self.current.retain(|client, _| latest.contains_key(client));
        for (client, range) in latest {
            let current = self.current.entry(*client).or_insert(range.min);
            if !range.contains(*current) {
                *current = range.min;
            }
        }
        self.ranges = latest.clone();
    }

    /// Moves the client to its next preset, wrapping to `min` past `max`.
    ///
    /// Returns `None` for a client with no configured range.
    pub fn advance(&mut self, client: &ClientKey) -> Option<u16> {
        let range = *self.ranges.get(client)?;
        let current = self.current.entry(*client).or_insert(range.min);
        *current = next_in(range, *current);
        Some(*current)
    }

    pub fn current_of(&self, client: &ClientKey) -> Option<u16> {
        self.current.get(client).copied()
    }

    pub fn has_range(&self, client: &ClientKey) -> bool {
        self.ranges.contains_key(client)
    }
}

fn next_in(range: PresetRange, current: u16) -> u16 {
    match current.checked_add(1) {
        Some(next) if range.contains(next) => next,
        _ => range.min,
    }
}
