use super::token::Token;

/// Characters that separate tokens and that are stripped from split pieces.
pub const WHITESPACE: &[char] = &[' ', '\t', '\n'];

/// Statement separator.
pub const CHAIN: char = ';';
/// Stage separator.
pub const PIPE: char = '|';

pub struct Lexer;

impl Lexer {
    /// Splits `line` into owned tokens on runs of space, tab and newline.
    ///
    /// The input is only borrowed; every token is a fresh allocation, so the
    /// caller's line stays intact for later use.
    pub fn tokenize(line: &str) -> Vec<Token> {
        line.split(WHITESPACE)
            .filter(|word| !word.is_empty())
            .map(Token::new)
            .collect()
    }

    /// Splits `line` on `delim`, keeping the pieces in order.
    ///
    /// Each piece is trimmed of surrounding whitespace; pieces that are empty
    /// afterwards are dropped rather than returned as empty statements or stages.
    pub fn split(line: &str, delim: char) -> Vec<&str> {
        line.split(delim)
            .map(|piece| piece.trim_matches(WHITESPACE))
            .filter(|piece| !piece.is_empty())
            .collect()
    }

    /// Returns the first token of `text` and the remainder after it, with
    /// leading whitespace removed from both.
    pub fn split_first(text: &str) -> Option<(&str, &str)> {
        let text = text.trim_start_matches(WHITESPACE);
        if text.is_empty() {
            return None;
        }
        match text.find(WHITESPACE) {
            Some(end) => Some((&text[..end], text[end..].trim_start_matches(WHITESPACE))),
            None => Some((text, "")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(tokens: &[Token]) -> Vec<&str> {
        tokens.iter().map(Token::as_str).collect()
    }

    #[test]
    fn test_tokenize_basic() {
        let tokens = Lexer::tokenize("/bin/ls -l /tmp");
        assert_eq!(words(&tokens), vec!["/bin/ls", "-l", "/tmp"]);
    }

    #[test]
    fn test_tokenize_collapses_whitespace_runs() {
        let tokens = Lexer::tokenize("  echo\t\thello \n  world\n");
        assert_eq!(words(&tokens), vec!["echo", "hello", "world"]);
    }

    #[test]
    fn test_tokenize_empty_input() {
        assert!(Lexer::tokenize("").is_empty());
        assert!(Lexer::tokenize(" \t\n ").is_empty());
    }

    #[test]
    fn test_tokenize_leaves_input_untouched() {
        let line = String::from("cat a b");
        let first = Lexer::tokenize(&line);
        let second = Lexer::tokenize(&line);
        assert_eq!(first, second);
        assert_eq!(line, "cat a b");
    }

    #[test]
    fn test_split_without_delimiter_yields_trimmed_line() {
        let pieces = Lexer::split("  /bin/echo hello world \n", CHAIN);
        assert_eq!(pieces, vec!["/bin/echo hello world"]);
    }

    #[test]
    fn test_split_drops_empty_pieces() {
        let pieces = Lexer::split("pwd;; \t;ls ;\n", CHAIN);
        assert_eq!(pieces, vec!["pwd", "ls"]);
    }

    #[test]
    fn test_split_keeps_order() {
        let pieces = Lexer::split("a | b | c", PIPE);
        assert_eq!(pieces, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_split_only_delimiters() {
        assert!(Lexer::split(";;;", CHAIN).is_empty());
        assert!(Lexer::split("\n", CHAIN).is_empty());
    }

    #[test]
    fn test_split_first() {
        assert_eq!(Lexer::split_first("  loop 3 ls"), Some(("loop", "3 ls")));
        assert_eq!(Lexer::split_first("loop"), Some(("loop", "")));
        assert_eq!(Lexer::split_first("loop  \t"), Some(("loop", "")));
        assert_eq!(Lexer::split_first("   "), None);
    }
}
