use crate::commands::executable::{Context, Executable};
use crate::commands::{CommandParser, CommandParserError};
use crate::frame::Frame;
use crate::Error;

/// Store a string value under a key, with an optional relative expiration.
///
/// `EX seconds` and `PX millis` are case-insensitive and mutually exclusive.
/// The expiration becomes an absolute timestamp at write time.
///
/// Ref: <https://redis.io/docs/latest/commands/set/>
#[derive(Debug, PartialEq)]
pub struct Set {
    pub key: String,
    pub value: String,
    pub ttl: Option<Ttl>,
}

#[derive(Debug, PartialEq)]
pub enum Ttl {
    Ex(u64),
    Px(u64),
}

impl Ttl {
    pub fn as_millis(&self) -> u64 {
        match self {
            Ttl::Ex(seconds) => seconds.saturating_mul(1000),
            Ttl::Px(millis) => *millis,
        }
    }
}

impl Executable for Set {
    fn exec(self, ctx: Context) -> Result<Frame, Error> {
        let ttl_millis = self.ttl.as_ref().map(Ttl::as_millis);
        ctx.store.lock().set(self.key, self.value, ttl_millis)?;

        Ok(Frame::Simple("OK".to_string()))
    }
}

impl TryFrom<&mut CommandParser> for Set {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_string()?;
        let value = parser.next_string()?;

        let mut ttl = None;

        loop {
            let option = match parser.next_string() {
                Ok(option) => option,
                Err(CommandParserError::EndOfStream) => break,
                Err(err) => return Err(err.into()),
            };

            match option.to_uppercase().as_str() {
                "EX" if ttl.is_none() => {
                    ttl = Some(Ttl::Ex(next_ttl_value(parser)?));
                }
                "PX" if ttl.is_none() => {
                    ttl = Some(Ttl::Px(next_ttl_value(parser)?));
                }
                // A repeated or unrecognized modifier is a syntax error.
                _ => return Err(CommandParserError::Syntax.into()),
            }
        }

        Ok(Self { key, value, ttl })
    }
}

/// A TTL must be a positive integer; zero, negative, and non-numeric values
/// are argument errors, reported before the store is touched.
fn next_ttl_value(parser: &mut CommandParser) -> Result<u64, Error> {
    // A missing value after EX/PX is a syntax error, not an arity error.
    let value = parser
        .next_integer()
        .map_err(|err| match err {
            CommandParserError::EndOfStream => CommandParserError::Syntax,
            err => err,
        })?;

    if value <= 0 {
        return Err(CommandParserError::NotAnInteger.into());
    }
    Ok(value as u64)
}
