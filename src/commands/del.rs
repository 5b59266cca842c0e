use crate::commands::executable::{Context, Executable};
use crate::commands::{CommandParser, CommandParserError};
use crate::frame::Frame;
use crate::Error;

// https://redis.io/commands/del
#[derive(Debug, PartialEq)]
pub struct Del {
    pub keys: Vec<String>,
}

impl Executable for Del {
    fn exec(self, ctx: Context) -> Result<Frame, Error> {
        // One lock hold for the whole batch.
        let count = ctx.store.lock().remove_many(&self.keys);
        Ok(Frame::Integer(count as i64))
    }
}

impl TryFrom<&mut CommandParser> for Del {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let mut keys = vec![];

        loop {
            match parser.next_string() {
                Ok(key) => keys.push(key),
                Err(CommandParserError::EndOfStream) if !keys.is_empty() => {
                    break;
                }
                Err(err) => return Err(err.into()),
            }
        }

        Ok(Self { keys })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{parts, Command};

    #[test]
    fn multiple_keys() {
        let cmd = Command::try_from(parts(&["DEL", "foo", "bar", "baz"])).unwrap();
        assert_eq!(
            cmd,
            Command::Del(Del {
                keys: vec!["foo".to_string(), "bar".to_string(), "baz".to_string()]
            })
        );

        let ctx = Context::test();
        {
            let mut state = ctx.store.lock();
            state.set("foo".to_string(), "1".to_string(), None).unwrap();
            state.rpush("bar".to_string(), "a".to_string()).unwrap();
        }

        // Two of the three exist, one as a string and one as a list.
        let result = cmd.execute(ctx);
        assert_eq!(result, Frame::Integer(2));
    }

    #[test]
    fn zero_keys() {
        let err = Command::try_from(parts(&["DEL"])).err().unwrap();
        let err = err.downcast_ref::<CommandParserError>().unwrap();

        assert_eq!(
            *err,
            CommandParserError::WrongNumberOfArguments {
                command: "del".to_string()
            }
        );
    }
}
