use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::net::{TcpListener, TcpStream};
use tokio::time::{interval, Duration};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

use crate::codec::Request;
use crate::commands::executable::Context;
use crate::commands::{error_reply, Command, CommandParserError};
use crate::connection::Connection;
use crate::persistence::Rdb;
use crate::store::Store;
use crate::Error;

pub struct Config {
    pub port: u16,
    pub snapshot_path: PathBuf,
    pub save_interval: Duration,
    pub sweep_interval: Duration,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            port: 6379,
            snapshot_path: PathBuf::from("dump.rdb"),
            save_interval: Duration::from_secs(60),
            sweep_interval: Duration::from_secs(1),
        }
    }
}

/// Uptime and traffic counters, shared across connections for INFO.
#[derive(Clone)]
pub struct Stats {
    inner: Arc<StatsInner>,
}

struct StatsInner {
    started: Instant,
    connections: AtomicU64,
    commands: AtomicU64,
}

impl Stats {
    pub fn new() -> Stats {
        Stats {
            inner: Arc::new(StatsInner {
                started: Instant::now(),
                connections: AtomicU64::new(0),
                commands: AtomicU64::new(0),
            }),
        }
    }

    pub fn connection_accepted(&self) {
        self.inner.connections.fetch_add(1, Ordering::Relaxed);
    }

    pub fn command_processed(&self) {
        self.inner.commands.fetch_add(1, Ordering::Relaxed);
    }

    pub fn uptime_secs(&self) -> u64 {
        self.inner.started.elapsed().as_secs()
    }

    pub fn connections(&self) -> u64 {
        self.inner.connections.load(Ordering::Relaxed)
    }

    pub fn commands(&self) -> u64 {
        self.inner.commands.load(Ordering::Relaxed)
    }
}

impl Default for Stats {
    fn default() -> Self {
        Self::new()
    }
}

pub async fn run(config: Config) -> Result<(), Error> {
    let _ = tracing_subscriber::fmt()
        .try_init()
        .map_err(|e| debug!("Failed to initialize global tracing: {}", e));

    let store = Store::new();
    let rdb = Rdb::new(config.snapshot_path);
    match rdb.load(&store) {
        Ok(true) => info!("Loaded snapshot from {:?}", rdb.path()),
        Ok(false) => info!("No snapshot at {:?}, starting empty", rdb.path()),
        Err(e) => warn!("Could not load snapshot: {}", e),
    }

    let stats = Stats::new();
    let ctx = Context {
        store: store.clone(),
        rdb: rdb.clone(),
        stats: stats.clone(),
    };

    let shutdown = CancellationToken::new();
    let sweeper = tokio::spawn(sweep_expired_keys(
        store.clone(),
        config.sweep_interval,
        shutdown.clone(),
    ));
    let saver = tokio::spawn(save_periodically(
        rdb.clone(),
        store.clone(),
        config.save_interval,
        shutdown.clone(),
    ));

    let listener = TcpListener::bind(("127.0.0.1", config.port)).await?;
    info!("Server listening on {}", listener.local_addr()?);

    loop {
        tokio::select! {
            accepted = listener.accept() => {
                let (socket, client_address) = match accepted {
                    Ok(accepted) => accepted,
                    Err(e) => {
                        error!("Accept failed: {}", e);
                        continue;
                    }
                };
                stats.connection_accepted();
                info!("Accepted connection from {:?}", client_address);

                let ctx = ctx.clone();
                tokio::spawn(async move {
                    if let Err(e) = handle_connection(socket, client_address, ctx).await {
                        error!("Connection error: {}", e);
                    }
                });
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    // Stop the background tasks first so nothing races the last snapshot.
    info!("Shutting down");
    shutdown.cancel();
    let _ = tokio::join!(sweeper, saver);
    if let Err(e) = rdb.save(&store) {
        error!("Final snapshot failed: {}", e);
    }

    Ok(())
}

/// Every accepted request gets exactly one reply. Malformed input is
/// answered with an error and the connection stays open; only socket-level
/// failures end it.
#[instrument(
    name = "connection",
    skip(stream, ctx),
    fields(connection_id, client_address)
)]
async fn handle_connection(
    stream: TcpStream,
    client_address: SocketAddr,
    ctx: Context,
) -> Result<(), Error> {
    let mut conn = Connection::new(stream, client_address);

    tracing::Span::current()
        .record("connection_id", conn.id.to_string())
        .record("client_address", client_address.to_string());

    while let Some(request) = conn.read_request().await? {
        ctx.stats.command_processed();

        let reply = match request {
            Request::Command(parts) => {
                debug!("Received command: {:?}", parts);
                match Command::try_from(parts) {
                    Ok(cmd) => cmd.execute(ctx.clone()),
                    Err(err) => error_reply(&err),
                }
            }
            Request::Invalid => error_reply(&CommandParserError::InvalidFormat.into()),
        };

        debug!("Sending reply: {:?}", reply);
        conn.write_frame(reply).await?;
    }

    debug!("Connection closed");
    Ok(())
}

async fn sweep_expired_keys(store: Store, every: Duration, shutdown: CancellationToken) {
    let mut ticker = interval(every);
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let removed = store.lock().sweep_expired();
                if removed > 0 {
                    debug!("Swept {} expired keys", removed);
                }
            }
            _ = shutdown.cancelled() => return,
        }
    }
}

async fn save_periodically(rdb: Rdb, store: Store, every: Duration, shutdown: CancellationToken) {
    let mut ticker = interval(every);
    // The first tick fires immediately; the first save should wait a full
    // period.
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let rdb = rdb.clone();
                let store = store.clone();
                match tokio::task::spawn_blocking(move || rdb.save(&store)).await {
                    Ok(Ok(())) => debug!("Periodic snapshot written"),
                    Ok(Err(e)) => warn!("Periodic snapshot failed: {}", e),
                    Err(e) => warn!("Periodic snapshot task failed: {}", e),
                }
            }
            _ = shutdown.cancelled() => return,
        }
    }
}
