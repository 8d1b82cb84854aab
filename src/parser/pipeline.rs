use crate::ast::{Command, Pipeline};
use crate::config::Limits;
use crate::lexer::{Lexer, PIPE};

use super::{check_limit, ParseError};

/// Turns a statement body into a pipeline: split on `|`, tokenize each
/// stage, and pull a trailing `> path` off the last stage.
///
/// Returns `Ok(None)` when the body holds no command at all.
pub fn parse_pipeline(body: &str, limits: &Limits) -> Result<Option<Pipeline>, ParseError> {
    let pieces = Lexer::split(body, PIPE);
    check_limit("stages", pieces.len(), limits.max_stages)?;

    let mut stages = Vec::with_capacity(pieces.len());
    for piece in pieces {
        let argv = Lexer::tokenize(piece);
        check_limit("arguments", argv.len(), limits.max_args)?;
        // split() never yields blank pieces, so argv is non-empty here
        if let Some(command) = Command::new(argv) {
            stages.push(command);
        }
    }

    Ok(Pipeline::new(stages))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::RedirectionTarget;

    fn names(p: &Pipeline) -> Vec<&str> {
        p.stages().iter().map(Command::name).collect()
    }

    #[test]
    fn test_single_stage() {
        let p = parse_pipeline("/bin/ls -l", &Limits::unbounded()).unwrap().unwrap();
        assert_eq!(p.len(), 1);
        assert_eq!(p.stages()[0].args().len(), 1);
        assert!(p.redirect().is_none());
    }

    #[test]
    fn test_multi_stage() {
        let p = parse_pipeline("cat f | grep x |wc -l", &Limits::unbounded()).unwrap().unwrap();
        assert_eq!(names(&p), vec!["cat", "grep", "wc"]);
    }

    #[test]
    fn test_redirect_on_last_stage() {
        let p = parse_pipeline("ls | sort > out.txt", &Limits::unbounded()).unwrap().unwrap();
        assert_eq!(p.redirect(), Some(&RedirectionTarget::new("out.txt")));
        assert_eq!(p.stages()[1].len(), 1);
    }

    #[test]
    fn test_empty_pipes_are_dropped() {
        let p = parse_pipeline("ls || wc", &Limits::unbounded()).unwrap().unwrap();
        assert_eq!(names(&p), vec!["ls", "wc"]);
    }

    #[test]
    fn test_blank_body() {
        assert_eq!(parse_pipeline("", &Limits::unbounded()).unwrap(), None);
        assert_eq!(parse_pipeline(" | ", &Limits::unbounded()).unwrap(), None);
    }

    #[test]
    fn test_stage_limit() {
        let limits = Limits { max_stages: Some(2), ..Limits::unbounded() };
        assert!(parse_pipeline("a | b", &limits).is_ok());
        assert_eq!(
            parse_pipeline("a | b | c", &limits),
            Err(ParseError::TooManyPieces { what: "stages", limit: 2 })
        );
    }

    #[test]
    fn test_argument_limit() {
        let limits = Limits { max_args: Some(3), ..Limits::unbounded() };
        assert!(parse_pipeline("echo a b", &limits).is_ok());
        assert!(parse_pipeline("echo a b c", &limits).is_err());
    }
}
