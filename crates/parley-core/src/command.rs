//! Client commands
//!
//! One command per line. The verb is the first whitespace-separated token and
//! is matched exactly (no case folding).

/// A parsed command line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command<'a> {
    /// `list`
    List,
    /// `send <user> <message>`
    Send { target: &'a str, message: &'a str },
    /// `broadcast <message>`
    Broadcast { message: &'a str },
    /// `poll`
    Poll,
    /// `vote [n]`
    Vote { choice: Option<&'a str> },
    /// `close`
    Close,
    /// `commands`
    Commands,
    /// Unknown verb or wrong argument shape
    Invalid,
}

impl<'a> Command<'a> {
    /// Parse a command line (line terminator already stripped)
    pub fn parse(line: &'a str) -> Self {
        let line = line.trim_start();
        let (verb, rest) = match line.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest.trim_start()),
            None => (line, ""),
        };

        match verb {
            "list" => Self::List,
            "send" => {
                let Some((target, message)) = rest.split_once(char::is_whitespace) else {
                    return Self::Invalid;
                };
                let message = message.trim_start();
                if message.is_empty() {
                    return Self::Invalid;
                }
                Self::Send { target, message }
            }
            "broadcast" => {
                if rest.is_empty() {
                    return Self::Invalid;
                }
                Self::Broadcast { message: rest }
            }
            "poll" => Self::Poll,
            "vote" => Self::Vote {
                choice: rest.split_whitespace().next(),
            },
            "close" => Self::Close,
            "commands" => Self::Commands,
            _ => Self::Invalid,
        }
    }

    /// The verb this command was parsed from
    pub fn verb(&self) -> &'static str {
        match self {
            Self::List => "list",
            Self::Send { .. } => "send",
            Self::Broadcast { .. } => "broadcast",
            Self::Poll => "poll",
            Self::Vote { .. } => "vote",
            Self::Close => "close",
            Self::Commands => "commands",
            Self::Invalid => "invalid",
        }
    }
}

/// Reply for an unrecognised or malformed command
pub const INVALID_COMMAND: &str =
    "Invalid command. Type 'commands' for a list of available commands.";

/// Help text for the `commands` verb
pub const HELP_TEXT: &str = "Available commands:
list - List active users
send <user> <message> - Send a private message
broadcast <message> - Broadcast a message to all users
poll - Create a new poll
vote <option> - Vote on the current poll
close - Quit the chat";
