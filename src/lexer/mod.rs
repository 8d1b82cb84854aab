mod lexer;
mod token;

pub use lexer::{Lexer, CHAIN, PIPE, WHITESPACE};
pub use token::Token;
