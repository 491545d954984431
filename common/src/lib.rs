//! Shared vocabulary of the map-reduce workspace: key-value pairs, the
//! partitioning hash, map/reduce function signatures and the intermediate
//! shard format. Data moves between workers through files on a shared
//! directory, so everything here has to be deterministic across processes.

use std::fmt;
use std::fmt::Formatter;
use std::hash::Hasher;

pub mod shard;

/////////////////////////////////////////////////////////////////////////////
// MapReduce application types
/////////////////////////////////////////////////////////////////////////////

/// A map function takes the input file name and its full contents and
/// returns the intermediate key-value pairs, in no particular order.
pub type MapFn = fn(filename: &str, contents: &str) -> Vec<KeyValue>;

/// A reduce function takes a key and every value emitted for that key
/// across all map tasks, and returns a single output value.
pub type ReduceFn = fn(key: &str, values: &[String]) -> String;

/// A map reduce application.
#[derive(Copy, Clone)]
pub struct Workload {
    pub map_fn: MapFn,
    pub reduce_fn: ReduceFn,
}

/////////////////////////////////////////////////////////////////////////////
// Key-value pairs
/////////////////////////////////////////////////////////////////////////////

/// A single key-value pair.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct KeyValue {
    /// The key.
    pub key: String,

    /// The value.
    pub value: String,
}

impl KeyValue {
    /// Construct a new key-value pair from the given key and value.
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

impl fmt::Display for KeyValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.key, self.value)
    }
}

/////////////////////////////////////////////////////////////////////////////
// Partitioning
/////////////////////////////////////////////////////////////////////////////

/// Hashes an intermediate key. Compute a reduce bucket for a given key
/// by calculating `ihash(key) % n_reduce`.
pub fn ihash(key: &[u8]) -> u32 {
    let mut hasher = fnv::FnvHasher::with_key(0);
    hasher.write(key);
    (hasher.finish() & 0x7fffffff) as u32
}

/// The reduce partition a key belongs to. Map tasks use this to route a
/// pair into a shard; reduce tasks rely on the same computation when they
/// gather shards, so both sides must call this exact function.
pub fn bucket_of(key: &str, n_reduce: u32) -> u32 {
    ihash(key.as_bytes()) % n_reduce
}
