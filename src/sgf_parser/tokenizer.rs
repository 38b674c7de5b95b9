use crate::sgf_parser::input_stream::InputStream;
use crate::sgf_parser::parse_errors::SgfError;
use crate::sgf_parser::token::{Token, TokenType};

// Tokenizer options. The progress callback is invoked after every token that
// is not end-of-file, with the current stream offset and the caller-supplied
// total length. It has no effect on tokenizing.
pub struct Options<'a> {
    pub length: usize,
    pub progress: Box<dyn FnMut(usize, usize) + 'a>,
}

// The tokenizer reads the input stream and emits tokens that can be used by the parser
pub struct Tokenizer<'a> {
    pub stream: &'a mut InputStream,                        // SGF character input stream
    last_token: Token,                                      // Last token that was produced
    length: usize,                                          // Total length for progress reporting
    progress: Option<Box<dyn FnMut(usize, usize) + 'a>>,    // Optional progress callback
}

impl<'a> Tokenizer<'a> {
    pub fn new(stream: &'a mut InputStream, opts: Option<Options<'a>>) -> Self {
        let start = stream.tell();
        let (length, progress) = match opts {
            Some(opts) => (opts.length, Some(opts.progress)),
            None => (0, None),
        };

        Tokenizer {
            stream,
            last_token: Token::new(TokenType::Eof, "", start, start),
            length,
            progress,
        }
    }

    // Advances the stream and returns the next token, or Eof once the stream
    // is exhausted (repeated calls keep returning Eof)
    pub fn next_token(&mut self) -> Result<Token, SgfError> {
        let token = self.scan_token()?;

        if !token.is_eof() {
            if let Some(progress) = &mut self.progress {
                progress(self.stream.tell(), self.length);
            }
        }

        self.last_token = token.clone();
        Ok(token)
    }

    // Returns the last produced token without advancing
    pub fn current_token(&self) -> &Token {
        &self.last_token
    }

    fn scan_token(&mut self) -> Result<Token, SgfError> {
        loop {
            let c = match self.stream.read_char() {
                Some(c) => c,
                None => {
                    let offset = self.stream.tell();
                    return Ok(Token::new(TokenType::Eof, "", offset, offset));
                }
            };

            let start = self.stream.tell() - 1;
            match c {
                '(' => return Ok(Token::new(TokenType::LeftParen, "(", start, start + 1)),
                ')' => return Ok(Token::new(TokenType::RightParen, ")", start, start + 1)),
                ';' => return Ok(Token::new(TokenType::Semicolon, ";", start, start + 1)),
                '[' => return self.scan_value(start),
                c if is_tag_char(c) => return Ok(self.scan_tag(c, start)),
                c if c.is_ascii_whitespace() => continue,
                _ => return Err(SgfError::lexical("Invalid character", start, start + 1)),
            }
        }
    }

    // Scans a bracketed value. A backslash escapes the next character, which is
    // kept verbatim (including a literal closing bracket) and does not
    // terminate the value.
    fn scan_value(&mut self, start: usize) -> Result<Token, SgfError> {
        let mut value = String::new();
        let mut escape = false;

        loop {
            let c = match self.stream.read_char() {
                Some(c) => c,
                None => {
                    let offset = self.stream.tell();
                    return Err(SgfError::lexical("Unexpected end of file", offset, offset));
                }
            };

            if c == ']' && !escape {
                break;
            }
            if c == '\\' && !escape {
                value.push(c);
                escape = true;
                continue;
            }
            value.push(c);
            escape = false;
        }

        Ok(Token::new(TokenType::Value, &value, start, self.stream.tell()))
    }

    // Scans a maximal run of tag characters
    fn scan_tag(&mut self, first: char, start: usize) -> Token {
        let mut tag = String::new();
        tag.push(first);

        while let Some(c) = self.stream.look_ahead(0) {
            if !is_tag_char(c) {
                break;
            }
            tag.push(c);
            self.stream.read_char();
        }

        Token::new(TokenType::Tag, &tag, start, self.stream.tell())
    }
}

fn is_tag_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sgf_parser::parse_errors::ErrorKind;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn tokenize(input: &str) -> Result<Vec<Token>, SgfError> {
        let mut is = InputStream::new();
        is.read_from_str(input);

        let mut tknzr = Tokenizer::new(&mut is, None);
        let mut tokens = vec![];
        loop {
            let token = tknzr.next_token()?;
            if token.is_eof() {
                tokens.push(token);
                return Ok(tokens);
            }
            tokens.push(token);
        }
    }

    #[test]
    fn test_tokens() {
        let tokens = tokenize("(;B[1])").unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::new(TokenType::LeftParen, "(", 0, 1),
                Token::new(TokenType::Semicolon, ";", 1, 2),
                Token::new(TokenType::Tag, "B", 2, 3),
                Token::new(TokenType::Value, "1", 3, 6),
                Token::new(TokenType::RightParen, ")", 6, 7),
                Token::new(TokenType::Eof, "", 7, 7),
            ]
        );
    }

    #[test]
    fn test_whitespace() {
        let tokens = tokenize(" (\n;  B_2 [ab cd]\t)\r\n").unwrap();
        assert_eq!(tokens.len(), 6);
        assert_eq!(tokens[2], Token::new(TokenType::Tag, "B_2", 6, 9));
        assert_eq!(tokens[3], Token::new(TokenType::Value, "ab cd", 10, 17));
    }

    #[test]
    fn test_escaped_value() {
        let tokens = tokenize(r"[a\]b]").unwrap();
        assert_eq!(tokens[0], Token::new(TokenType::Value, r"a\]b", 0, 6));

        // an escaped backslash does not escape the closing bracket
        let tokens = tokenize(r"[a\\]").unwrap();
        assert_eq!(tokens[0], Token::new(TokenType::Value, r"a\\", 0, 5));
    }

    #[test]
    fn test_unterminated_value() {
        let e = tokenize("(;C[abc").unwrap_err();
        assert_eq!(e.kind, ErrorKind::Lexical);
        assert_eq!(e.message, "Unexpected end of file");
        assert_eq!(e.end, 7);

        // an escape right before the end of input does not terminate the value
        let e = tokenize(r"[abc\").unwrap_err();
        assert_eq!(e.kind, ErrorKind::Lexical);
        assert_eq!(e.end, 5);
    }

    #[test]
    fn test_invalid_character() {
        let e = tokenize("(;B[1]@)").unwrap_err();
        assert_eq!(e.kind, ErrorKind::Lexical);
        assert_eq!(e.message, "Invalid character");
        assert_eq!((e.start, e.end), (6, 7));
    }

    #[test]
    fn test_eof_idempotent() {
        let mut is = InputStream::new();
        is.read_from_str(";");

        let mut tknzr = Tokenizer::new(&mut is, None);
        assert_eq!(tknzr.next_token().unwrap().token_type, TokenType::Semicolon);
        assert_eq!(tknzr.next_token().unwrap().token_type, TokenType::Eof);
        assert_eq!(tknzr.next_token().unwrap().token_type, TokenType::Eof);
        assert_eq!(tknzr.current_token().token_type, TokenType::Eof);
    }

    #[test]
    fn test_current_token() {
        let mut is = InputStream::new();
        is.read_from_str("(;");

        let mut tknzr = Tokenizer::new(&mut is, None);
        tknzr.next_token().unwrap();
        assert_eq!(tknzr.current_token().token_type, TokenType::LeftParen);
        tknzr.next_token().unwrap();
        assert_eq!(tknzr.current_token().token_type, TokenType::Semicolon);
        assert_eq!(tknzr.current_token().token_type, TokenType::Semicolon);
    }

    #[test]
    fn test_progress_callback() {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let recorder = Rc::clone(&calls);

        let mut is = InputStream::new();
        is.read_from_str("(;B[1])");

        let mut tknzr = Tokenizer::new(
            &mut is,
            Some(Options {
                length: 7,
                progress: Box::new(move |offset, length| {
                    recorder.borrow_mut().push((offset, length));
                }),
            }),
        );

        loop {
            if tknzr.next_token().unwrap().is_eof() {
                break;
            }
        }
        // one call per non-eof token, none for the eof token
        assert_eq!(
            *calls.borrow(),
            vec![(1, 7), (2, 7), (3, 7), (6, 7), (7, 7)]
        );
    }
}
