use crate::commands::executable::{Context, Executable};
use crate::commands::CommandParser;
use crate::frame::Frame;
use crate::Error;

/// Expiration-aware existence check; a live key of either type counts.
///
/// Ref: <https://redis.io/docs/latest/commands/exists/>
#[derive(Debug, PartialEq)]
pub struct Exists {
    pub key: String,
}

impl Executable for Exists {
    fn exec(self, ctx: Context) -> Result<Frame, Error> {
        let exists = ctx.store.lock().exists(&self.key);
        Ok(Frame::Integer(i64::from(exists)))
    }
}

impl TryFrom<&mut CommandParser> for Exists {
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

    #[test]
    fn reports_both_value_types() {
        let ctx = Context::test();
        {
            let mut state = ctx.store.lock();
            state.set("s".to_string(), "v".to_string(), None).unwrap();
            state.rpush("l".to_string(), "a".to_string()).unwrap();
        }

        for (key, expected) in [("s", 1), ("l", 1), ("missing", 0)] {
            let cmd = Command::try_from(parts(&["EXISTS", key])).unwrap();
            assert_eq!(cmd.execute(ctx.clone()), Frame::Integer(expected));
        }
    }
}
