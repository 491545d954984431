use clap::Parser;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// The port for the server to run on.
    #[arg(short, long, default_value = "8030")]
    pub port: u16,

    /// Number of reduce tasks (and final output files).
    #[arg(short, long, default_value = "4")]
    pub n_reduce: u32,

    /// Seconds a worker may hold a task before it is reassigned.
    #[arg(short, long, default_value = "10")]
    pub task_timeout: u64,

    /// Input files, one map task each.
    #[arg(required = true)]
    pub inputs: Vec<String>,
}
