use crate::commands::executable::{Context, Executable};
use crate::commands::CommandParser;
use crate::frame::Frame;
use crate::Error;

/// Server, memory, stats and keyspace sections, assembled from the live
/// counters and store sizes.
///
/// Ref: <https://redis.io/docs/latest/commands/info/>
#[derive(Debug, PartialEq)]
pub struct Info;

impl Executable for Info {
    fn exec(self, ctx: Context) -> Result<Frame, Error> {
        let (strings, lists, used_memory) = {
            let state = ctx.store.lock();
            (state.strings_len(), state.lists_len(), state.estimated_bytes())
        };

        let sections = [
            (
                "server",
                format!(
                    "version:{}\r\nprocess_id:{}\r\nuptime_in_seconds:{}",
                    env!("CARGO_PKG_VERSION"),
                    std::process::id(),
                    ctx.stats.uptime_secs(),
                ),
            ),
            ("memory", format!("used_memory:{used_memory}")),
            (
                "stats",
                format!(
                    "total_connections:{}\r\ntotal_commands:{}",
                    ctx.stats.connections(),
                    ctx.stats.commands(),
                ),
            ),
            (
                "keyspace",
                format!(
                    "strings:{strings}\r\nlists:{lists}\r\ntotal:{}",
                    strings + lists
                ),
            ),
        ];

        let body = sections
            .iter()
            .map(|(section, data)| format!("# {section}\r\n{data}"))
            .collect::<Vec<_>>()
            .join("\r\n");

        Ok(Frame::bulk(body))
    }
}

impl TryFrom<&mut CommandParser> for Info {
    type Error = Error;

    fn try_from(_parser: &mut CommandParser) -> Result<Self, Self::Error> {
        Ok(Self)
    }
}
