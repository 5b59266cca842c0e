use crate::commands::executable::{Context, Executable};
use crate::commands::CommandParser;
use crate::frame::Frame;
use crate::Error;

/// Write a snapshot synchronously. Unlike the periodic save, a failure here
/// is reported to the caller.
///
/// Ref: <https://redis.io/docs/latest/commands/save/>
#[derive(Debug, PartialEq)]
pub struct Save;

impl Executable for Save {
    fn exec(self, ctx: Context) -> Result<Frame, Error> {
        ctx.rdb.save(&ctx.store)?;
        Ok(Frame::Simple("OK".to_string()))
    }
}

impl TryFrom<&mut CommandParser> for Save {
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

    #[test]
    fn writes_a_loadable_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = Context {
            store: Store::new(),
            rdb: Rdb::new(dir.path().join("dump.rdb")),
            stats: Stats::new(),
        };
        ctx.store
            .lock()
            .set("k".to_string(), "v".to_string(), None)
            .unwrap();

        let cmd = Command::try_from(parts(&["SAVE"])).unwrap();
        assert_eq!(cmd.execute(ctx.clone()), Frame::Simple("OK".to_string()));

        let fresh = Store::new();
        assert!(ctx.rdb.load(&fresh).unwrap());
        assert_eq!(fresh.lock().get("k").unwrap(), Some("v".to_string()));
    }

    #[test]
    fn reports_failure_to_the_caller() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = Context {
            store: Store::new(),
            rdb: Rdb::new(dir.path().join("no/such/dir/dump.rdb")),
            stats: Stats::new(),
        };

        let cmd = Command::try_from(parts(&["SAVE"])).unwrap();
        let Frame::Error(message) = cmd.execute(ctx) else {
            panic!("a failed SAVE must reply with an error");
        };
        assert!(message.starts_with("ERR "));
    }
}
