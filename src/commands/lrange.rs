use crate::commands::executable::{Context, Executable};
use crate::commands::CommandParser;
use crate::frame::Frame;
use crate::Error;

/// Inclusive range over the list at `key`. Negative indices count from the
/// end (`-1` is the last element). A missing key is a null array; an empty
/// range over an existing list is an empty array. The two are different
/// replies on the wire.
///
/// Ref: <https://redis.io/docs/latest/commands/lrange/>
#[derive(Debug, PartialEq)]
pub struct Lrange {
    pub key: String,
    pub start: i64,
    pub stop: i64,
}

impl Executable for Lrange {
    fn exec(self, ctx: Context) -> Result<Frame, Error> {
        let range = ctx.store.lock().lrange(&self.key, self.start, self.stop)?;

        match range {
            Some(elements) => Ok(Frame::array_of_bulks(elements)),
            None => Ok(Frame::NullArray),
        }
    }
}

impl TryFrom<&mut CommandParser> for Lrange {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_string()?;
        let start = parser.next_integer()?;
        let stop = parser.next_integer()?;
        Ok(Self { key, start, stop })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{parts, Command, CommandParserError};

    fn ctx_with_list(elements: &[&str]) -> Context {
        let ctx = Context::test();
        let mut state = ctx.store.lock();
        for element in elements {
            state.rpush("l".to_string(), element.to_string()).unwrap();
        }
        drop(state);
        ctx
    }

    #[test]
    fn whole_list_with_negative_stop() {
        let ctx = ctx_with_list(&["a", "b", "c", "d"]);

        let cmd = Command::try_from(parts(&["LRANGE", "l", "0", "-1"])).unwrap();
        assert_eq!(
            cmd.execute(ctx),
            Frame::array_of_bulks(["a", "b", "c", "d"])
        );
    }

    #[test]
    fn negative_start_counts_from_the_end() {
        let ctx = ctx_with_list(&["a", "b", "c", "d"]);

        let cmd = Command::try_from(parts(&["LRANGE", "l", "-2", "-1"])).unwrap();
        assert_eq!(cmd.execute(ctx), Frame::array_of_bulks(["c", "d"]));
    }

    #[test]
    fn out_of_bounds_range_is_empty_not_null() {
        let ctx = ctx_with_list(&["a", "b", "c", "d"]);

        let cmd = Command::try_from(parts(&["LRANGE", "l", "5", "10"])).unwrap();
        assert_eq!(cmd.execute(ctx), Frame::Array(vec![]));
    }

    #[test]
    fn missing_key_is_a_null_array() {
        let cmd = Command::try_from(parts(&["LRANGE", "missing", "0", "-1"])).unwrap();
        assert_eq!(cmd.execute(Context::test()), Frame::NullArray);
    }

    #[test]
    fn non_numeric_bounds_are_rejected_before_the_store() {
        let err = Command::try_from(parts(&["LRANGE", "l", "zero", "-1"]))
            .err()
            .unwrap();
        let err = err.downcast_ref::<CommandParserError>().unwrap();

        assert_eq!(*err, CommandParserError::NotAnInteger);
    }
}
