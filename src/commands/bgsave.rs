use tracing::error;

use crate::commands::executable::{Context, Executable};
use crate::commands::CommandParser;
use crate::frame::Frame;
use crate::Error;

/// Kick off a snapshot in the background and reply immediately. Failures
/// are logged, not reported; callers who need the result use SAVE.
///
/// Ref: <https://redis.io/docs/latest/commands/bgsave/>
#[derive(Debug, PartialEq)]
pub struct Bgsave;

impl Executable for Bgsave {
    fn exec(self, ctx: Context) -> Result<Frame, Error> {
        tokio::task::spawn_blocking(move || {
            if let Err(err) = ctx.rdb.save(&ctx.store) {
                error!("Background save failed: {}", err);
            }
        });

        Ok(Frame::Simple("Background saving started".to_string()))
    }
}

impl TryFrom<&mut CommandParser> for Bgsave {
    type Error = Error;

    fn try_from(_parser: &mut CommandParser) -> Result<Self, Self::Error> {
        Ok(Self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{parts, Command};
    use crate::persistence::Rdb;
    use crate::server::Stats;
    use crate::store::Store;
    use tokio::time::{sleep, Duration};

    #[tokio::test(flavor = "multi_thread")]
    async fn replies_before_the_snapshot_lands() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dump.rdb");
        let ctx = Context {
            store: Store::new(),
            rdb: Rdb::new(path.clone()),
            stats: Stats::new(),
        };
        ctx.store
            .lock()
            .set("k".to_string(), "v".to_string(), None)
            .unwrap();

        let cmd = Command::try_from(parts(&["BGSAVE"])).unwrap();
        assert_eq!(
            cmd.execute(ctx),
            Frame::Simple("Background saving started".to_string())
        );

        for _ in 0..100 {
            if path.exists() {
                return;
            }
            sleep(Duration::from_millis(10)).await;
        }
        panic!("background save never wrote {path:?}");
    }
}
