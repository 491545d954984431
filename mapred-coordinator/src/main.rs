mod args;

use std::time::Duration;

use args::Args;
use clap::Parser;
use tonic::transport::Server;
use tracing::info;

use mapred_coordinator::core::{CoordinatorServer, MRCoordinator};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();

    let addr = format!("[::1]:{}", args.port).parse()?;
    info!("CoordinatorServer listening on {}", addr);

    let coordinator = MRCoordinator::new(
        args.inputs,
        args.n_reduce,
        Duration::from_secs(args.task_timeout),
    );

    // Keep handles on the task sets so we can watch for completion after
    // the coordinator moves into the server.
    let (map_tasks, reduce_tasks) = coordinator.task_sets();

    Server::builder()
        .add_service(CoordinatorServer::new(coordinator))
        .serve_with_shutdown(addr, async move {
            // Workers are told "done" on their next poll once both
            // phases complete; give the last of those polls a moment to
            // drain before the listener goes away.
            while !(map_tasks.is_done().await && reduce_tasks.is_done().await) {
                tokio::time::sleep(Duration::from_millis(500)).await;
            }
            info!("job complete, shutting down");
            tokio::time::sleep(Duration::from_secs(1)).await;
        })
        .await?;

    Ok(())
}
