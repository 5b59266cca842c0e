pub mod bgsave;
pub mod del;
pub mod echo;
pub mod executable;
pub mod exists;
pub mod get;
pub mod incr;
pub mod info;
pub mod lpop;
pub mod lpush;
pub mod lrange;
pub mod ping;
pub mod rpop;
pub mod rpush;
pub mod save;
pub mod set;

use std::vec;
use thiserror::Error as ThisError;

use crate::commands::executable::{Context, Executable};
use crate::frame::Frame;
use crate::Error;

use bgsave::Bgsave;
use del::Del;
use echo::Echo;
use exists::Exists;
use get::Get;
use incr::Incr;
use info::Info;
use lpop::Lpop;
use lpush::Lpush;
use lrange::Lrange;
use ping::Ping;
use rpop::Rpop;
use rpush::Rpush;
use save::Save;
use set::Set;

/// Every command the server understands, one variant per wire command.
/// Parsing validates the argument count before anything touches the store,
/// so a rejected command has no side effects.
#[derive(Debug, PartialEq)]
pub enum Command {
    Bgsave(Bgsave),
    Del(Del),
    Echo(Echo),
    Exists(Exists),
    Get(Get),
    Incr(Incr),
    Info(Info),
    Lpop(Lpop),
    Lpush(Lpush),
    Lrange(Lrange),
    Ping(Ping),
    Rpop(Rpop),
    Rpush(Rpush),
    Save(Save),
    Set(Set),
}

impl Executable for Command {
    fn exec(self, ctx: Context) -> Result<Frame, Error> {
        match self {
            Command::Bgsave(cmd) => cmd.exec(ctx),
            Command::Del(cmd) => cmd.exec(ctx),
            Command::Echo(cmd) => cmd.exec(ctx),
            Command::Exists(cmd) => cmd.exec(ctx),
            Command::Get(cmd) => cmd.exec(ctx),
            Command::Incr(cmd) => cmd.exec(ctx),
            Command::Info(cmd) => cmd.exec(ctx),
            Command::Lpop(cmd) => cmd.exec(ctx),
            Command::Lpush(cmd) => cmd.exec(ctx),
            Command::Lrange(cmd) => cmd.exec(ctx),
            Command::Ping(cmd) => cmd.exec(ctx),
            Command::Rpop(cmd) => cmd.exec(ctx),
            Command::Rpush(cmd) => cmd.exec(ctx),
            Command::Save(cmd) => cmd.exec(ctx),
            Command::Set(cmd) => cmd.exec(ctx),
        }
    }
}

impl Command {
    /// Run the command and turn any typed failure into its wire error, so
    /// every command produces exactly one reply.
    pub fn execute(self, ctx: Context) -> Frame {
        match self.exec(ctx) {
            Ok(frame) => frame,
            Err(err) => error_reply(&err),
        }
    }
}

/// Build an error reply from any failure. Known type tags pass through
/// untouched; everything else is downgraded to the generic `ERR` so clients
/// only ever see the closed vocabulary.
pub fn error_reply(err: &Error) -> Frame {
    let message = err.to_string();
    let tagged = ["ERR ", "WRONGTYPE ", "SYNTAX "]
        .iter()
        .any(|tag| message.starts_with(tag));

    if tagged {
        Frame::Error(message)
    } else {
        Frame::Error(format!("ERR {message}"))
    }
}

impl TryFrom<Vec<String>> for Command {
    type Error = Error;

    fn try_from(parts: Vec<String>) -> Result<Self, Self::Error> {
        let parser = &mut CommandParser {
            parts: parts.into_iter(),
        };

        let command_name = parser.parse_command_name()?;

        let command = match &command_name[..] {
            "bgsave" => Bgsave::try_from(&mut *parser).map(Command::Bgsave),
            "del" => Del::try_from(&mut *parser).map(Command::Del),
            "echo" => Echo::try_from(&mut *parser).map(Command::Echo),
            "exists" => Exists::try_from(&mut *parser).map(Command::Exists),
            "get" => Get::try_from(&mut *parser).map(Command::Get),
            "incr" => Incr::try_from(&mut *parser).map(Command::Incr),
            "info" => Info::try_from(&mut *parser).map(Command::Info),
            "lpop" => Lpop::try_from(&mut *parser).map(Command::Lpop),
            "lpush" => Lpush::try_from(&mut *parser).map(Command::Lpush),
            "lrange" => Lrange::try_from(&mut *parser).map(Command::Lrange),
            "ping" => Ping::try_from(&mut *parser).map(Command::Ping),
            "rpop" => Rpop::try_from(&mut *parser).map(Command::Rpop),
            "rpush" => Rpush::try_from(&mut *parser).map(Command::Rpush),
            "save" => Save::try_from(&mut *parser).map(Command::Save),
            "set" => Set::try_from(&mut *parser).map(Command::Set),
            _ => Err(CommandParserError::UnknownCommand {
                command: command_name.clone(),
            }
            .into()),
        }
        .map_err(|err| reject_missing_arguments(err, &command_name))?;

        // Surplus arguments are as wrong as missing ones.
        if parser.remaining() > 0 {
            return Err(CommandParserError::WrongNumberOfArguments {
                command: command_name,
            }
            .into());
        }

        Ok(command)
    }
}

/// Running out of arguments mid-parse is the caller passing too few, not a
/// protocol-level problem; report it as the arity error for this command.
fn reject_missing_arguments(err: Error, command: &str) -> Error {
    match err.downcast_ref::<CommandParserError>() {
        Some(CommandParserError::EndOfStream) => CommandParserError::WrongNumberOfArguments {
            command: command.to_string(),
        }
        .into(),
        _ => err,
    }
}

pub(crate) struct CommandParser {
    parts: vec::IntoIter<String>,
}

impl CommandParser {
    fn parse_command_name(&mut self) -> Result<String, CommandParserError> {
        self.parts
            .next()
            .map(|name| name.to_lowercase())
            .ok_or(CommandParserError::InvalidFormat)
    }

    pub(crate) fn next_string(&mut self) -> Result<String, CommandParserError> {
        self.parts.next().ok_or(CommandParserError::EndOfStream)
    }

    pub(crate) fn next_integer(&mut self) -> Result<i64, CommandParserError> {
        self.next_string()?
            .parse::<i64>()
            .map_err(|_| CommandParserError::NotAnInteger)
    }

    pub(crate) fn remaining(&self) -> usize {
        self.parts.len()
    }
}

#[derive(Debug, ThisError, PartialEq)]
pub enum CommandParserError {
    #[error("unknown command '{command}'")]
    UnknownCommand { command: String },
    #[error("wrong number of arguments for '{command}' command")]
    WrongNumberOfArguments { command: String },
    #[error("value is not an integer or out of range")]
    NotAnInteger,
    #[error("SYNTAX syntax error")]
    Syntax,
    #[error("protocol error; invalid frame format")]
    InvalidFormat,
    #[error("protocol error; attempting to extract a value failed due to the frame being fully consumed")]
    EndOfStream,
}

#[cfg(test)]
pub(crate) fn parts(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|part| part.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_is_case_insensitive() {
        let cmd = Command::try_from(parts(&["GeT", "foo"])).unwrap();
        assert_eq!(
            cmd,
            Command::Get(Get {
                key: String::from("foo")
            })
        );
    }

    #[test]
    fn unknown_command() {
        let err = Command::try_from(parts(&["FLUSHALL"])).err().unwrap();
        let err = err.downcast_ref::<CommandParserError>().unwrap();

        assert_eq!(
            *err,
            CommandParserError::UnknownCommand {
                command: "flushall".to_string()
            }
        );
    }

    #[test]
    fn missing_arguments_are_an_arity_error() {
        let err = Command::try_from(parts(&["GET"])).err().unwrap();
        let err = err.downcast_ref::<CommandParserError>().unwrap();

        assert_eq!(
            *err,
            CommandParserError::WrongNumberOfArguments {
                command: "get".to_string()
            }
        );
    }

    #[test]
    fn surplus_arguments_are_an_arity_error() {
        let err = Command::try_from(parts(&["GET", "key", "extra"])).err().unwrap();
        let err = err.downcast_ref::<CommandParserError>().unwrap();

        assert_eq!(
            *err,
            CommandParserError::WrongNumberOfArguments {
                command: "get".to_string()
            }
        );
    }

    #[test]
    fn empty_input_is_a_protocol_error() {
        let err = Command::try_from(Vec::new()).err().unwrap();
        let err = err.downcast_ref::<CommandParserError>().unwrap();

        assert_eq!(*err, CommandParserError::InvalidFormat);
    }

    #[test]
    fn error_reply_keeps_known_tags_and_downgrades_the_rest() {
        let wrongtype: Error =
            crate::store::StoreError::WrongType.into();
        assert_eq!(
            error_reply(&wrongtype),
            Frame::Error(
                "WRONGTYPE Operation against a key holding the wrong kind of value".to_string()
            )
        );

        let unknown: Error = "disk on fire".into();
        assert_eq!(
            error_reply(&unknown),
            Frame::Error("ERR disk on fire".to_string())
        );
    }
}
