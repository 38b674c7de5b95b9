use crate::sgf_parser::input_stream::InputStream;
use derive_more::Display;
use std::error::Error;
use std::fmt;

// How many characters of surrounding context are shown by detailed_message
const CONTEXT_CHARS: usize = 20;

// Terminal color escapes that delimit the offending span in detailed output
const MARK_START: &str = "\x1b[91m";
const MARK_END: &str = "\x1b[0m";

// The kinds of errors a parse can surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum ErrorKind {
    #[display(fmt = "lexical error")]
    Lexical,
    #[display(fmt = "structural error")]
    Structural,
    #[display(fmt = "malformed proof data")]
    MalformedData,
    #[display(fmt = "io error")]
    Io,
}

// Parse error carrying a message and the half-open [start,end) source span
#[derive(Debug, Clone, PartialEq)]
pub struct SgfError {
    pub kind: ErrorKind,
    pub message: String,
    pub start: usize,
    pub end: usize,
}

impl SgfError {
    pub fn lexical(message: &str, start: usize, end: usize) -> Self {
        SgfError {
            kind: ErrorKind::Lexical,
            message: message.to_string(),
            start,
            end,
        }
    }

    pub fn structural(message: &str, start: usize, end: usize) -> Self {
        SgfError {
            kind: ErrorKind::Structural,
            message: message.to_string(),
            start,
            end,
        }
    }

    pub fn malformed_data(message: &str, start: usize, end: usize) -> Self {
        SgfError {
            kind: ErrorKind::MalformedData,
            message: message.to_string(),
            start,
            end,
        }
    }

    pub fn io(message: &str) -> Self {
        SgfError {
            kind: ErrorKind::Io,
            message: message.to_string(),
            start: 0,
            end: 0,
        }
    }

    // Extends the plain message with an excerpt of the source around the span,
    // the offending span itself delimited by terminal color escapes
    pub fn detailed_message(&self, stream: &InputStream) -> String {
        let from = self.start.saturating_sub(CONTEXT_CHARS);
        let to = (self.end + CONTEXT_CHARS).min(stream.length);

        format!(
            "{}: {}{}{}{}{}",
            self,
            stream.slice(from, self.start),
            MARK_START,
            stream.slice(self.start, self.end),
            MARK_END,
            stream.slice(self.end, to),
        )
    }
}

impl fmt::Display for SgfError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}:{}", self.message, self.start, self.end)
    }
}

impl Error for SgfError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let e = SgfError::structural("Unexpected right parenthesis", 0, 1);
        assert_eq!(e.to_string(), "Unexpected right parenthesis at 0:1");
        assert_eq!(e.kind, ErrorKind::Structural);
        assert_eq!(ErrorKind::MalformedData.to_string(), "malformed proof data");
    }

    #[test]
    fn test_detailed_message() {
        let mut is = InputStream::new();
        is.read_from_str("(;B[1]))");

        let e = SgfError::structural("Unexpected right parenthesis", 7, 8);
        let detailed = e.detailed_message(&is);
        assert_eq!(
            detailed,
            "Unexpected right parenthesis at 7:8: (;B[1])\x1b[91m)\x1b[0m"
        );
    }

    #[test]
    fn test_detailed_message_empty_span() {
        let mut is = InputStream::new();
        is.read_from_str("(;C[abc");

        // unterminated value reports the current offset, which is the stream end
        let e = SgfError::lexical("Unexpected end of file", 7, 7);
        assert_eq!(
            e.detailed_message(&is),
            "Unexpected end of file at 7:7: (;C[abc\x1b[91m\x1b[0m"
        );
    }
}
