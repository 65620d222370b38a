//! Id-indexed ownership tables.

use std::collections::HashMap;

/// One table of GL objects addressed by externally-visible integer ids.
///
/// Ids are strictly monotonic per table starting at 0 and are never reused
/// within a session, so a handed-out id stays a stable reference for the
/// rest of the process. There is no removal: steady-state objects live until
/// the session is reset, and compile/link failures delete the native object
/// before an id is ever allocated.
#[derive(Debug, Default)]
pub struct ResourceTable<T> {
    next_id: u32,
    entries: HashMap<u32, T>,
}

impl<T> ResourceTable<T> {
    pub fn new() -> Self {
        Self {
            next_id: 0,
            entries: HashMap::new(),
        }
    }

    /// Stores `value` and returns its freshly allocated id.
    pub fn insert(&mut self, value: T) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        self.entries.insert(id, value);
        id
    }

    pub fn get(&self, id: u32) -> Option<&T> {
        self.entries.get(&id)
    }

    pub fn get_mut(&mut self, id: u32) -> Option<&mut T> {
        self.entries.get_mut(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The id the next successful insert will receive.
    pub fn next_id(&self) -> u32 {
        self.next_id
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, &T)> {
        self.entries.iter().map(|(id, value)| (*id, value))
    }
}
