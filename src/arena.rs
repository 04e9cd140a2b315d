//! Generational arena with typed keys.
//!
//! Slots are recycled through a free pool (LIFO, like component indices).
//! Every removal bumps the slot's generation, so a key that outlived its value
//! never resolves to whatever reuses the slot.

use std::fmt;
use std::marker::PhantomData;

/// Index + generation pair behind every typed key.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct RawKey {
    pub index: u32,
    pub generation: u32,
}

impl RawKey {
    /// Pack into a single word, generation in the high half.
    pub fn to_bits(self) -> u64 {
        ((self.generation as u64) << 32) | self.index as u64
    }

    pub fn from_bits(bits: u64) -> Self {
        Self {
            index: bits as u32,
            generation: (bits >> 32) as u32,
        }
    }
}

impl fmt::Debug for RawKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.index, self.generation)
    }
}

/// Trait for typed arena keys.
pub trait ArenaKey: Copy + Eq + fmt::Debug {
    fn from_raw(raw: RawKey) -> Self;
    fn raw(self) -> RawKey;
}

/// Declare a newtype key usable with [`Arena`].
macro_rules! arena_key {
    ($(#[$meta:meta])* $vis:vis struct $name:ident;) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash)]
        $vis struct $name($crate::arena::RawKey);

        impl $crate::arena::ArenaKey for $name {
            fn from_raw(raw: $crate::arena::RawKey) -> Self {
                Self(raw)
            }

            fn raw(self) -> $crate::arena::RawKey {
                self.0
            }
        }

        impl std::fmt::Debug for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}({:?})", stringify!($name), self.0)
            }
        }
    };
}

pub(crate) use arena_key;

struct Entry<V> {
    generation: u32,
    value: Option<V>,
}

/// A generational arena container with typed keys.
pub struct Arena<K: ArenaKey, V> {
    entries: Vec<Entry<V>>,
    free: Vec<u32>,
    len: usize,
    _marker: PhantomData<K>,
}

impl<K: ArenaKey, V> Default for Arena<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: ArenaKey, V> Arena<K, V> {
    /// Creates a new empty arena.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            free: Vec::new(),
            len: 0,
            _marker: PhantomData,
        }
    }

    /// Inserts a value and returns its key.
    pub fn insert(&mut self, value: V) -> K {
        self.len += 1;

        // Reuse free slot or append
        if let Some(index) = self.free.pop() {
            let entry = &mut self.entries[index as usize];
            entry.value = Some(value);
            return K::from_raw(RawKey {
                index,
                generation: entry.generation,
            });
        }

        let index = self.entries.len() as u32;
        self.entries.push(Entry {
            generation: 0,
            value: Some(value),
        });
        K::from_raw(RawKey {
            index,
            generation: 0,
        })
    }

    /// Gets a reference to a value by key. `None` for stale keys.
    pub fn get(&self, key: K) -> Option<&V> {
        let raw = key.raw();
        self.entries
            .get(raw.index as usize)
            .filter(|entry| entry.generation == raw.generation)
            .and_then(|entry| entry.value.as_ref())
    }

    /// Gets a mutable reference to a value by key. `None` for stale keys.
    pub fn get_mut(&mut self, key: K) -> Option<&mut V> {
        let raw = key.raw();
        self.entries
            .get_mut(raw.index as usize)
            .filter(|entry| entry.generation == raw.generation)
            .and_then(|entry| entry.value.as_mut())
    }

    /// Removes and returns the value. The key (and every copy of it) goes
    /// stale immediately.
    pub fn remove(&mut self, key: K) -> Option<V> {
        let raw = key.raw();
        let entry = self
            .entries
            .get_mut(raw.index as usize)
            .filter(|entry| entry.generation == raw.generation)?;
        let value = entry.value.take()?;

        entry.generation = entry.generation.wrapping_add(1);
        self.free.push(raw.index);
        self.len -= 1;
        Some(value)
    }

    /// Number of live values.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}
