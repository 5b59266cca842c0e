use crate::commands::executable::{Context, Executable};
use crate::commands::CommandParser;
use crate::frame::Frame;
use crate::Error;

/// Append a value to the list at `key`, creating the list if it does not
/// exist. Replies with the resulting length.
///
/// Ref: <https://redis.io/docs/latest/commands/rpush/>
#[derive(Debug, PartialEq)]
pub struct Rpush {
    pub key: String,
    pub value: String,
}

impl Executable for Rpush {
    fn exec(self, ctx: Context) -> Result<Frame, Error> {
        let length = ctx.store.lock().rpush(self.key, self.value)?;
        Ok(Frame::Integer(length as i64))
    }
}

impl TryFrom<&mut CommandParser> for Rpush {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_string()?;
        let value = parser.next_string()?;
        Ok(Self { key, value })
    }
}
