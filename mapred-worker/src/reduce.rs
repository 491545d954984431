use std::fmt::Write as _;
use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::info;

use common::shard::{output_path, read_shard, shard_path};
use common::Workload;

use crate::core::TaskDescriptor;

/// Execute one reduce task: gather the shard written for this partition
/// by every map task, sort and group the pairs by key, run the user
/// reduce function once per distinct key and write the final output file.
///
/// The output file is rewritten from scratch on every execution, so
/// re-running the task after a timeout-driven reassignment produces the
/// identical file rather than appending to it.
pub async fn perform_reduce(
    task: TaskDescriptor,
    n_map: u32,
    _n_reduce: u32,
    workload: Workload,
    dir: PathBuf,
) -> Result<()> {
    let reduce_id = task.reduce_id;
    info!("starting reduce task {}", reduce_id);

    let mut pairs = Vec::new();
    for map_id in 0..n_map {
        pairs.extend(read_shard(&shard_path(&dir, map_id, reduce_id)).await?);
    }

    // Stable sort keeps values in shard order within a key.
    pairs.sort_by(|a, b| a.key.cmp(&b.key));

    let mut output = String::new();
    let mut start = 0;
    while start < pairs.len() {
        let mut end = start + 1;
        while end < pairs.len() && pairs[end].key == pairs[start].key {
            end += 1;
        }
        let values: Vec<String> = pairs[start..end].iter().map(|kv| kv.value.clone()).collect();
        let reduced = (workload.reduce_fn)(&pairs[start].key, &values);
        // One `key value` line per distinct key, already in sorted order.
        let _ = writeln!(output, "{} {}", pairs[start].key, reduced);
        start = end;
    }

    let path = output_path(&dir, reduce_id);
    tokio::fs::write(&path, output)
        .await
        .with_context(|| format!("failed to write output {}", path.display()))
}
