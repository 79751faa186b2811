//! Y. Hatanaka compression kernels, used to recover Compact RINEX content
use thiserror::Error;

mod numdiff;
mod textdiff;

pub use numdiff::{NumDiff, MAX_ORDER};
pub use textdiff::TextDiff;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("invalid differential order {0}")]
    InvalidOrder(usize),
    #[error("differential arc is not initialized")]
    UninitializedArc,
    #[error("malformed differential token \"{0}\"")]
    MalformedToken(String),
}

/// Numerical token found in Compact RINEX content
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Token {
    /// "N&literal": (re)initializes an arc of order N
    Init { order: usize, literal: i64 },
    /// Nth order difference, to accumulate into an existing arc
    Delta(i64),
}

impl Token {
    /// Parses a numerical token. Blank tokens mean "no data" and return None.
    pub fn parse(content: &str) -> Result<Option<Self>, Error> {
        let content = content.trim();
        if content.is_empty() {
            return Ok(None);
        }
        if let Some((order, literal)) = content.split_once('&') {
            let order = order
                .parse::<usize>()
                .map_err(|_| Error::MalformedToken(content.to_string()))?;
            let literal = literal
                .trim()
                .parse::<i64>()
                .map_err(|_| Error::MalformedToken(content.to_string()))?;
            Ok(Some(Self::Init { order, literal }))
        } else {
            let delta = content
                .parse::<i64>()
                .map_err(|_| Error::MalformedToken(content.to_string()))?;
            Ok(Some(Self::Delta(delta)))
        }
    }
}

/// A differential arc that may not have started yet
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiffArc {
    kernel: Option<NumDiff>,
}

impl DiffArc {
    /// Feeds a new token, returns the recovered value
    pub fn update(&mut self, token: Token) -> Result<i64, Error> {
        match token {
            Token::Init { order, literal } => {
                let kernel = NumDiff::new(order, literal)?;
                let value = kernel.value();
                self.kernel = Some(kernel);
                Ok(value)
            },
            Token::Delta(delta) => match &mut self.kernel {
                Some(kernel) => Ok(kernel.decompress(delta)),
                None => Err(Error::UninitializedArc),
            },
        }
    }

    /// Interrupts this arc: next value needs to be a new literal.
    pub fn reset(&mut self) {
        self.kernel = None;
    }

    /// True if this arc may accept differences
    pub fn is_initialized(&self) -> bool {
        self.kernel.is_some()
    }
}
