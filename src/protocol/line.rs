//! Command line definitions
//!
//! Represents a normalized request line from a client.

use std::fmt;

/// Command that ends a session without a response
pub const EXIT_COMMAND: &str = "exit";

/// How a normalized line is split into tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenMode {
    /// `command:arg1:arg2` split on the given delimiter
    Delimited(char),

    /// The whole line is the command token
    Whole,
}

impl Default for TokenMode {
    fn default() -> Self {
        TokenMode::Delimited(':')
    }
}

/// A parsed request line
///
/// The first token is the command, the rest are arguments. There is always
/// at least one token; an empty line has an empty command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    tokens: Vec<String>,
    mode: TokenMode,
}

impl CommandLine {
    /// Normalize (trim, lower-case) and tokenize a raw line
    pub fn parse(raw: &str, mode: TokenMode) -> Self {
        let line = raw.trim().to_lowercase();
        let tokens = match mode {
            TokenMode::Delimited(delimiter) => line.split(delimiter).map(str::to_string).collect(),
            TokenMode::Whole => vec![line],
        };

        Self { tokens, mode }
    }

    /// The command token (lookup key into the handler registry)
    pub fn command(&self) -> &str {
        &self.tokens[0]
    }

    /// Argument tokens following the command
    pub fn args(&self) -> &[String] {
        &self.tokens[1..]
    }

    /// All tokens, command first
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn is_exit(&self) -> bool {
        self.command() == EXIT_COMMAND
    }
}

/// Rejoins the tokens with the delimiter they were split on
impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.mode {
            TokenMode::Delimited(delimiter) => {
                let mut buf = [0u8; 4];
                f.write_str(&self.tokens.join(&*delimiter.encode_utf8(&mut buf)))
            }
            TokenMode::Whole => f.write_str(&self.tokens[0]),
        }
    }
}
