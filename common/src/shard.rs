//! Intermediate shard files.
//!
//! A map task writes the pairs destined for reduce partition `r` to
//! `mr-<map id>-<r>` (ids zero-padded to two digits); the reduce task for
//! partition `r` later reads that shard from every map task. Records are
//! plain `key,value` lines with no escaping, so keys containing a comma
//! are not supported by this format.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, warn};

use crate::KeyValue;

/// Name of the intermediate shard holding pairs from `map_id` for
/// partition `reduce_id`.
pub fn shard_name(map_id: u32, reduce_id: u32) -> String {
    format!("mr-{:02}-{:02}", map_id, reduce_id)
}

/// Name of the final output file of one reduce task.
pub fn output_name(reduce_id: u32) -> String {
    format!("mr-out-{}", reduce_id)
}

/// Path of an intermediate shard inside the shared working directory.
pub fn shard_path(dir: &Path, map_id: u32, reduce_id: u32) -> PathBuf {
    dir.join(shard_name(map_id, reduce_id))
}

/// Path of a reduce task's output file inside the shared working directory.
pub fn output_path(dir: &Path, reduce_id: u32) -> PathBuf {
    dir.join(output_name(reduce_id))
}

/// Write one shard. The file is created (or truncated) and holds one
/// `key,value` line per pair.
pub async fn write_shard(path: &Path, pairs: &[KeyValue]) -> Result<()> {
    let mut contents = String::new();
    for kv in pairs {
        contents.push_str(&kv.key);
        contents.push(',');
        contents.push_str(&kv.value);
        contents.push('\n');
    }
    tokio::fs::write(path, contents)
        .await
        .with_context(|| format!("failed to write shard {}", path.display()))
}

/// Read one shard back into pairs.
///
/// A missing shard is not an error: map tasks only write non-empty
/// buckets, so absence means no pairs were routed to this partition.
/// Malformed lines are logged and skipped; any other I/O failure is
/// surfaced to the caller.
pub async fn read_shard(path: &Path) -> Result<Vec<KeyValue>> {
    let contents = match tokio::fs::read_to_string(path).await {
        Ok(contents) => contents,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!("shard {} absent, treating as empty", path.display());
            return Ok(Vec::new());
        }
        Err(e) => {
            let e = anyhow::Error::new(e);
            return Err(e.context(format!("cannot read shard {}", path.display())));
        }
    };

    let mut pairs = Vec::new();
    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match line.split_once(',') {
            Some((key, value)) if !value.contains(',') => {
                pairs.push(KeyValue::new(key, value));
            }
            _ => warn!("skipping malformed record `{}` in {}", line, path.display()),
        }
    }
    Ok(pairs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shard_names_are_zero_padded() {
        assert_eq!(shard_name(3, 7), "mr-03-07");
        assert_eq!(shard_name(12, 0), "mr-12-00");
    }

    #[test]
    fn output_names_are_not_padded() {
        assert_eq!(output_name(0), "mr-out-0");
        assert_eq!(output_name(11), "mr-out-11");
    }

    #[tokio::test]
    async fn round_trips_pairs() {
        let dir = tempfile::tempdir().unwrap();
        let path = shard_path(dir.path(), 0, 1);
        let pairs = vec![KeyValue::new("a", "1"), KeyValue::new("b", "2")];

        write_shard(&path, &pairs).await.unwrap();
        assert_eq!(read_shard(&path).await.unwrap(), pairs);
    }

    #[tokio::test]
    async fn missing_shard_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let pairs = read_shard(&shard_path(dir.path(), 5, 5)).await.unwrap();
        assert!(pairs.is_empty());
    }

    #[tokio::test]
    async fn malformed_lines_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = shard_path(dir.path(), 1, 1);
        tokio::fs::write(&path, "good,1\nnocomma\ntoo,many,fields\n\nalso,2\n")
            .await
            .unwrap();

        let pairs = read_shard(&path).await.unwrap();
        assert_eq!(
            pairs,
            vec![KeyValue::new("good", "1"), KeyValue::new("also", "2")]
        );
    }
}
