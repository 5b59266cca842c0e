use clap::Parser;
use memdis::server::{self, Config};
use memdis::Error;
use std::path::PathBuf;
use std::time::Duration;

const PORT: u16 = 6379;

#[derive(Parser, Debug)]
struct Args {
    /// The port to listen on
    #[arg(short, long, env = "MEMDIS_PORT", default_value_t = PORT)]
    port: u16,

    /// Where the snapshot file lives
    #[arg(long, env = "MEMDIS_SNAPSHOT_PATH", default_value = "dump.rdb")]
    snapshot_path: PathBuf,

    /// Seconds between periodic snapshots
    #[arg(long, env = "MEMDIS_SAVE_INTERVAL_SECS", default_value_t = 60)]
    save_interval_secs: u64,

    /// Seconds between expired-key sweeps
    #[arg(long, env = "MEMDIS_SWEEP_INTERVAL_SECS", default_value_t = 1)]
    sweep_interval_secs: u64,
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    let args = Args::parse();

    server::run(Config {
        port: args.port,
        snapshot_path: args.snapshot_path,
        save_interval: Duration::from_secs(args.save_interval_secs),
        sweep_interval: Duration::from_secs(args.sweep_interval_secs),
    })
    .await
}
