mod loop_directive;
mod pipeline;

use thiserror::Error;

use crate::config::Limits;
use crate::error::FailureKind;
use crate::lexer::{Lexer, CHAIN};

pub use loop_directive::{parse_statement, LOOP_KEYWORD};
pub use pipeline::parse_pipeline;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// `loop` followed by nothing, a non-number, or zero.
    #[error("malformed loop directive: {}", .token.as_deref().unwrap_or("<missing count>"))]
    MalformedLoop { token: Option<String> },

    #[error("too many {what}: limit is {limit}")]
    TooManyPieces { what: &'static str, limit: usize },
}

impl ParseError {
    pub fn kind(&self) -> FailureKind {
        match self {
            ParseError::MalformedLoop { .. } => FailureKind::MalformedLoop,
            ParseError::TooManyPieces { .. } => FailureKind::LimitExceeded,
        }
    }
}

/// Splits a raw line into its `;`-separated statements.
pub fn split_statements<'a>(line: &'a str, limits: &Limits) -> Result<Vec<&'a str>, ParseError> {
    let statements = Lexer::split(line, CHAIN);
    check_limit("statements", statements.len(), limits.max_statements)?;
    Ok(statements)
}

pub(crate) fn check_limit(
    what: &'static str,
    count: usize,
    limit: Option<usize>,
) -> Result<(), ParseError> {
    match limit {
        Some(limit) if count > limit => Err(ParseError::TooManyPieces { what, limit }),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_statement() {
        let stmts = split_statements("  /bin/ls -l  \n", &Limits::unbounded()).unwrap();
        assert_eq!(stmts, vec!["/bin/ls -l"]);
    }

    #[test]
    fn test_chained_statements() {
        let stmts = split_statements("pwd; loop 2 ls | wc ;cd /tmp", &Limits::unbounded()).unwrap();
        assert_eq!(stmts, vec!["pwd", "loop 2 ls | wc", "cd /tmp"]);
    }

    #[test]
    fn test_statement_limit() {
        let limits = Limits { max_statements: Some(2), ..Limits::unbounded() };
        assert!(split_statements("a; b", &limits).is_ok());
        assert_eq!(
            split_statements("a; b; c", &limits),
            Err(ParseError::TooManyPieces { what: "statements", limit: 2 })
        );
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(
            ParseError::MalformedLoop { token: Some("abc".into()) }.kind(),
            FailureKind::MalformedLoop
        );
        assert_eq!(
            ParseError::TooManyPieces { what: "stages", limit: 1 }.kind(),
            FailureKind::LimitExceeded
        );
    }
}
