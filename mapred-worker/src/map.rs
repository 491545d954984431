use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::info;

use common::shard::{shard_path, write_shard};
use common::{bucket_of, KeyValue, Workload};

use crate::core::TaskDescriptor;

/// Execute one map task: read the input file, run the user map function
/// over it and scatter the resulting pairs into one intermediate shard
/// per reduce partition.
///
/// An unreadable input is fatal to the worker; the coordinator's timeout
/// then picks the task up for someone else.
pub async fn perform_map(
    task: TaskDescriptor,
    _n_map: u32,
    n_reduce: u32,
    workload: Workload,
    dir: PathBuf,
) -> Result<()> {
    info!("starting map task {} on {}", task.task_id, task.input_file);

    let contents = tokio::fs::read_to_string(&task.input_file)
        .await
        .with_context(|| format!("cannot read input {}", task.input_file))?;

    let pairs = (workload.map_fn)(&task.input_file, &contents);

    // Only non-empty buckets become files; the reduce side treats an
    // absent shard as empty.
    for (bucket, pairs) in partition(pairs, n_reduce) {
        let path = shard_path(&dir, task.task_id, bucket);
        write_shard(&path, &pairs).await?;
    }

    Ok(())
}

/// Split the map output into reduce buckets by key hash.
fn partition(pairs: Vec<KeyValue>, n_reduce: u32) -> HashMap<u32, Vec<KeyValue>> {
    let mut buckets: HashMap<u32, Vec<KeyValue>> = HashMap::new();
    for kv in pairs {
        buckets
            .entry(bucket_of(&kv.key, n_reduce))
            .or_default()
            .push(kv);
    }
    buckets
}

#[cfg(test)]
mod tests {
    use super::*;

    use common::shard::read_shard;

    fn emit_words(_filename: &str, contents: &str) -> Vec<KeyValue> {
        contents
            .split_whitespace()
            .map(|w| KeyValue::new(w, "1"))
            .collect()
    }

    fn unreached(_key: &str, _values: &[String]) -> String {
        unreachable!("reduce must not run during the map phase")
    }

    const WORKLOAD: Workload = Workload {
        map_fn: emit_words,
        reduce_fn: unreached,
    };

    fn descriptor(task_id: u32, input_file: &str) -> TaskDescriptor {
        TaskDescriptor {
            task_id,
            worker_id: 1,
            input_file: input_file.to_string(),
            reduce_id: 0,
            done: false,
        }
    }

    #[test]
    fn partition_routes_every_pair_by_key_hash() {
        let pairs: Vec<KeyValue> = ["a", "b", "c", "d", "a"]
            .iter()
            .map(|k| KeyValue::new(*k, "1"))
            .collect();
        let buckets = partition(pairs.clone(), 3);

        let total: usize = buckets.values().map(Vec::len).sum();
        assert_eq!(total, pairs.len());
        for (bucket, pairs) in &buckets {
            assert!(*bucket < 3);
            for kv in pairs {
                assert_eq!(bucket_of(&kv.key, 3), *bucket);
            }
        }
    }

    #[tokio::test]
    async fn writes_shards_that_reduce_can_locate() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("input.txt");
        tokio::fs::write(&input, "pear plum pear").await.unwrap();

        let n_reduce = 2;
        perform_map(
            descriptor(0, input.to_str().unwrap()),
            1,
            n_reduce,
            WORKLOAD,
            dir.path().to_path_buf(),
        )
        .await
        .unwrap();

        let mut found = Vec::new();
        for bucket in 0..n_reduce {
            found.extend(read_shard(&shard_path(dir.path(), 0, bucket)).await.unwrap());
        }
        found.sort_by(|a, b| a.key.cmp(&b.key));
        assert_eq!(
            found,
            vec![
                KeyValue::new("pear", "1"),
                KeyValue::new("pear", "1"),
                KeyValue::new("plum", "1"),
            ]
        );
    }

    #[tokio::test]
    async fn missing_input_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = perform_map(
            descriptor(0, "no-such-input.txt"),
            1,
            2,
            WORKLOAD,
            dir.path().to_path_buf(),
        )
        .await;
        assert!(result.is_err());
    }
}
