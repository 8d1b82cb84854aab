use std::num::NonZeroUsize;

use crate::ast::{LoopDirective, Statement};
use crate::lexer::{Lexer, WHITESPACE};

use super::ParseError;

pub const LOOP_KEYWORD: &str = "loop";

/// Strips a leading `loop N` from `text`.
///
/// Without the keyword the statement comes back unchanged with a repeat
/// count of one. With it, the next word must be all decimal digits and
/// greater than zero; otherwise the whole statement is rejected.
pub fn parse_statement(text: &str) -> Result<Statement<'_>, ParseError> {
    let body = text.trim_start_matches(WHITESPACE);
    let rest = match Lexer::split_first(body) {
        Some((LOOP_KEYWORD, rest)) => rest,
        _ => {
            return Ok(Statement { directive: LoopDirective::once(), body });
        }
    };

    let Some((count, rest)) = Lexer::split_first(rest) else {
        return Err(ParseError::MalformedLoop { token: None });
    };
    let repeat_count = parse_count(count)
        .ok_or_else(|| ParseError::MalformedLoop { token: Some(count.to_string()) })?;

    Ok(Statement {
        directive: LoopDirective { repeat_count },
        body: rest,
    })
}

fn parse_count(word: &str) -> Option<NonZeroUsize> {
    if word.is_empty() || !word.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    word.parse::<NonZeroUsize>().ok()
}
