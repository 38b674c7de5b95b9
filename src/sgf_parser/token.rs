use derive_more::Display;
use std::fmt;

// The different token types the tokenizer can emit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum TokenType {
    #[display(fmt = "left parenthesis")]
    LeftParen,
    #[display(fmt = "right parenthesis")]
    RightParen,
    #[display(fmt = "semicolon")]
    Semicolon,
    #[display(fmt = "tag")]
    Tag,
    #[display(fmt = "value")]
    Value,
    #[display(fmt = "end of file")]
    Eof,
}

// A single lexical token with its half-open offset span in the source stream
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub token_type: TokenType,
    pub value: String,
    pub start: usize,
    pub end: usize,
}

impl Token {
    pub fn new(token_type: TokenType, value: &str, start: usize, end: usize) -> Self {
        Token {
            token_type,
            value: value.to_string(),
            start,
            end,
        }
    }

    pub fn is_eof(&self) -> bool {
        self.token_type == TokenType::Eof
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.token_type {
            TokenType::LeftParen => write!(f, "("),
            TokenType::RightParen => write!(f, ")"),
            TokenType::Semicolon => write!(f, ";"),
            TokenType::Tag => write!(f, "{}", self.value),
            TokenType::Value => write!(f, "[{}]", self.value),
            TokenType::Eof => write!(f, "<eof>"),
        }
    }
}
