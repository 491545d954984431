use clap::Parser;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// The address of the coordinator server
    #[arg(short = 'j', long = "join", default_value = "http://[::1]:8030")]
    pub address: String,

    /// Name of the workload to run (e.g. `wc`).
    #[arg(short, long)]
    pub workload: String,

    /// Shared working directory for inputs, shards and outputs.
    #[arg(short, long, default_value = ".")]
    pub dir: String,
}
