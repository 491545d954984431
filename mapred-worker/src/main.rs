mod args;

use std::path::Path;

use anyhow::anyhow;
use clap::Parser;
use tracing::info;

use args::Args;
use mapred_worker::core::{self, CoordinatorClient};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();

    let workload = workload::try_named(&args.workload)
        .ok_or_else(|| anyhow!("the workload `{}` is not a known workload", args.workload))?;

    // The process id doubles as the worker id; 0 is reserved for
    // "unassigned" on the coordinator side and pids are never 0.
    let worker_id = std::process::id();

    let mut client = CoordinatorClient::connect(args.address).await?;
    info!("worker {} joined, running workload `{}`", worker_id, args.workload);

    core::run(&mut client, worker_id, workload, Path::new(&args.dir)).await?;

    Ok(())
}
