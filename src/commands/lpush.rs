use crate::commands::executable::{Context, Executable};
use crate::commands::CommandParser;
use crate::frame::Frame;
use crate::Error;

/// Prepend a value to the list at `key`, creating the list if it does not
/// exist. Replies with the resulting length.
///
/// Ref: <https://redis.io/docs/latest/commands/lpush/>
#[derive(Debug, PartialEq)]
pub struct Lpush {
    pub key: String,
    pub value: String,
}

impl Executable for Lpush {
    fn exec(self, ctx: Context) -> Result<Frame, Error> {
        let length = ctx.store.lock().lpush(self.key, self.value)?;
        Ok(Frame::Integer(length as i64))
    }
}

impl TryFrom<&mut CommandParser> for Lpush {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_string()?;
        let value = parser.next_string()?;
        Ok(Self { key, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{parts, Command};
    use crate::store::StoreError;

    #[test]
    fn creates_and_prepends() {
        let ctx = Context::test();

        let cmd = Command::try_from(parts(&["LPUSH", "l", "b"])).unwrap();
        assert_eq!(cmd.execute(ctx.clone()), Frame::Integer(1));

        let cmd = Command::try_from(parts(&["LPUSH", "l", "a"])).unwrap();
        assert_eq!(cmd.execute(ctx.clone()), Frame::Integer(2));

        assert_eq!(
            ctx.store.lock().lrange("l", 0, -1).unwrap().unwrap(),
            vec!["a", "b"]
        );
    }

    #[test]
    fn string_key_is_a_type_conflict() {
        let ctx = Context::test();
        ctx.store
            .lock()
            .set("s".to_string(), "v".to_string(), None)
            .unwrap();

        let cmd = Command::try_from(parts(&["LPUSH", "s", "a"])).unwrap();
        assert_eq!(
            cmd.execute(ctx),
            Frame::Error(StoreError::WrongType.to_string())
        );
    }
}
