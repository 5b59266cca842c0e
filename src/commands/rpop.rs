use crate::commands::executable::{Context, Executable};
use crate::commands::CommandParser;
use crate::frame::Frame;
use crate::Error;

/// Remove and return the tail of the list at `key`; `nil` when there is no
/// list.
///
/// Ref: <https://redis.io/docs/latest/commands/rpop/>
#[derive(Debug, PartialEq)]
pub struct Rpop {
    pub key: String,
}

impl Executable for Rpop {
    fn exec(self, ctx: Context) -> Result<Frame, Error> {
        let popped = ctx.store.lock().rpop(&self.key)?;

        match popped {
            Some(value) => Ok(Frame::bulk(value)),
            None => Ok(Frame::Null),
        }
    }
}

impl TryFrom<&mut CommandParser> for Rpop {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_string()?;
        Ok(Self { key })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{parts, Command};
    use bytes::Bytes;

    #[test]
    fn pops_the_tail() {
        let ctx = Context::test();
        {
            let mut state = ctx.store.lock();
            state.rpush("l".to_string(), "a".to_string()).unwrap();
            state.rpush("l".to_string(), "b".to_string()).unwrap();
        }

        let cmd = Command::try_from(parts(&["RPOP", "l"])).unwrap();
        assert_eq!(cmd.execute(ctx), Frame::Bulk(Bytes::from("b")));
    }

    #[test]
    fn missing_list_is_nil() {
        let cmd = Command::try_from(parts(&["RPOP", "nothing"])).unwrap();
        assert_eq!(cmd.execute(Context::test()), Frame::Null);
    }
}
