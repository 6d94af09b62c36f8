use crate::error::EnsurepipError;

/// How many `-v` repetitions are handed to pip.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Verbosity(u8);

impl Verbosity {
    pub const MAX: u8 = 3;

    pub fn new(level: u8) -> Result<Self, EnsurepipError> {
        if level > Self::MAX {
            return Err(EnsurepipError::InvalidVerbosity(level));
        }
        Ok(Self(level))
    }

    /// `-v`, `-vv` or `-vvv`; nothing at level 0.
    pub fn flag(self) -> Option<String> {
        if self.0 == 0 {
            None
        } else {
            Some(format!("-{}", "v".repeat(usize::from(self.0))))
        }
    }
}

/// Ordered pip arguments. Tokens can only be appended; once finished the
/// sequence is handed over by value.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct CommandLine {
    tokens: Vec<String>,
}

impl CommandLine {
    pub fn new(subcommand: &str) -> Self {
        Self {
            tokens: vec![subcommand.to_string()],
        }
    }

    pub fn arg(&mut self, token: impl Into<String>) -> &mut Self {
        self.tokens.push(token.into());
        self
    }

    pub fn arg_if(&mut self, condition: bool, token: &str) -> &mut Self {
        if condition {
            self.tokens.push(token.to_string());
        }
        self
    }

    pub fn verbosity(&mut self, verbosity: Verbosity) -> &mut Self {
        if let Some(flag) = verbosity.flag() {
            self.tokens.push(flag);
        }
        self
    }

    pub fn finish(self) -> Vec<String> {
        self.tokens
    }
}
