pub mod document;

use crate::sgf_parser::input_stream::InputStream;
use crate::sgf_parser::parse_errors::SgfError;
use crate::sgf_parser::parser::document::Document;
use crate::sgf_parser::token::TokenType;
use crate::sgf_parser::tokenizer::{Options, Tokenizer};

// Token kinds allowed for the next token, as a bitmask
const EXPECT_LEFT_PAREN: u8 = 1 << 0;
const EXPECT_RIGHT_PAREN: u8 = 1 << 1;
const EXPECT_SEMICOLON: u8 = 1 << 2;
const EXPECT_TAG: u8 = 1 << 3;
const EXPECT_VALUE: u8 = 1 << 4;
// a closed top-level document accepts nothing but end of input
const EXPECT_NOTHING: u8 = 0;

// Parse stack element: a pending open parenthesis with its source span, or the
// node that was the cursor when the element was pushed
enum StackEntry {
    Paren { start: usize, end: usize },
    Node(usize),
}

// The main parser object. Consumes tokens and builds nodes into the document,
// yielding each node as soon as it is fully known.
pub struct SgfParser<'a> {
    tokenizer: Tokenizer<'a>,           // tokenizer object
    document: &'a mut Document,         // the document that owns the parsed nodes
    stack: Vec<StackEntry>,             // parse stack
    sentinel: usize,                    // synthetic root anchoring the first real node
    current: usize,                     // the node currently accumulating properties
    next_state: u8,                     // token kinds allowed for the next token
    cache_tag: String,                  // tag waiting for its values
    cache_values: Vec<String>,          // values seen for the cached tag so far
    cache_start: usize,                 // source span of the pending property record
    cache_end: usize,
    finished: bool,                     // set once the sentinel root has been discarded
}

impl<'a> SgfParser<'a> {
    // Creates a new parser that builds nodes into the given document
    pub fn new(
        stream: &'a mut InputStream,
        document: &'a mut Document,
        opts: Option<Options<'a>>,
    ) -> Self {
        let sentinel = document.create_node();

        SgfParser {
            tokenizer: Tokenizer::new(stream, opts),
            document,
            stack: vec![],
            sentinel,
            current: sentinel,
            next_state: EXPECT_LEFT_PAREN,
            cache_tag: String::new(),
            cache_values: vec![],
            cache_start: 0,
            cache_end: 0,
            finished: false,
        }
    }

    // Returns the id of the next fully populated node in document order, or
    // None when the input is exhausted. A node is complete as soon as a
    // structural token stops its property accumulation.
    pub fn next_node(&mut self) -> Result<Option<usize>, SgfError> {
        loop {
            let token = self.tokenizer.next_token()?;

            match token.token_type {
                TokenType::Eof => {
                    let completed = self.commit_pending()?;

                    if !self.stack.is_empty() {
                        // pop down to the innermost unmatched '(' and report it
                        while let Some(entry) = self.stack.pop() {
                            if let StackEntry::Paren { start, end } = entry {
                                return Err(SgfError::structural(
                                    "Unmatched left parenthesis",
                                    start,
                                    end,
                                ));
                            }
                        }
                    }

                    if !self.finished {
                        self.finished = true;

                        // hand the parsed tree over: the sentinel's child becomes
                        // the document root and the sentinel itself is discarded
                        let root = self
                            .document
                            .get_node_by_id(self.sentinel)
                            .expect("sentinel not found")
                            .children
                            .first()
                            .copied();
                        if let Some(root) = root {
                            self.document.detach_node(root);
                        }
                        self.document.remove_node(self.sentinel);
                        self.document.root = root;
                    }

                    return Ok(completed);
                }
                TokenType::LeftParen => {
                    if self.next_state & EXPECT_LEFT_PAREN == 0 {
                        return Err(SgfError::structural(
                            "Unexpected left parenthesis",
                            token.start,
                            token.end,
                        ));
                    }

                    self.stack.push(StackEntry::Node(self.current));
                    self.stack.push(StackEntry::Paren {
                        start: token.start,
                        end: token.end,
                    });

                    self.next_state = EXPECT_SEMICOLON;
                }
                TokenType::RightParen => {
                    if self.next_state & EXPECT_RIGHT_PAREN == 0 {
                        return Err(SgfError::structural(
                            "Unexpected right parenthesis",
                            token.start,
                            token.end,
                        ));
                    }

                    let completed = self.commit_pending()?;

                    // pop down to and including the matching '(' marker
                    loop {
                        match self.stack.pop() {
                            Some(StackEntry::Paren { .. }) => break,
                            Some(StackEntry::Node(_)) => {}
                            None => {
                                return Err(SgfError::structural(
                                    "Unmatched right parenthesis",
                                    token.start,
                                    token.end,
                                ));
                            }
                        }
                    }

                    // restore the cursor that was active when the '(' was pushed
                    match self.stack.pop() {
                        Some(StackEntry::Node(node_id)) => self.current = node_id,
                        _ => {
                            return Err(SgfError::structural(
                                "Unmatched right parenthesis",
                                token.start,
                                token.end,
                            ));
                        }
                    }

                    self.next_state = if self.stack.is_empty() {
                        EXPECT_NOTHING
                    } else {
                        EXPECT_LEFT_PAREN | EXPECT_RIGHT_PAREN
                    };

                    if completed.is_some() {
                        return Ok(completed);
                    }
                }
                TokenType::Semicolon => {
                    if self.next_state & EXPECT_SEMICOLON == 0 {
                        return Err(SgfError::structural(
                            "Unexpected semicolon",
                            token.start,
                            token.end,
                        ));
                    }

                    let completed = self.commit_pending()?;

                    // create the next node and attach it as the last child of the cursor
                    self.stack.push(StackEntry::Node(self.current));
                    let node_id = self.document.create_node();
                    self.document.attach_node(self.current, node_id);
                    self.current = node_id;

                    self.next_state = EXPECT_TAG;

                    if completed.is_some() {
                        return Ok(completed);
                    }
                }
                TokenType::Tag => {
                    if self.next_state & EXPECT_TAG == 0 {
                        let message = format!("Unexpected tag {}", token.value);
                        return Err(SgfError::structural(&message, token.start, token.end));
                    }

                    // a new tag closes the previous pending record, but the node
                    // itself keeps accumulating
                    self.commit_pending()?;

                    self.cache_tag = token.value;
                    self.cache_start = token.start;
                    self.cache_end = token.end;

                    self.next_state = EXPECT_VALUE;
                }
                TokenType::Value => {
                    if self.next_state & EXPECT_VALUE == 0 {
                        let message = format!("Unexpected value {}", token.value);
                        return Err(SgfError::structural(&message, token.start, token.end));
                    }

                    self.cache_values.push(token.value);
                    self.cache_end = token.end;

                    self.next_state = EXPECT_LEFT_PAREN
                        | EXPECT_RIGHT_PAREN
                        | EXPECT_SEMICOLON
                        | EXPECT_TAG
                        | EXPECT_VALUE;
                }
            }
        }
    }

    // Commits the pending (tag, values) record onto the current node. Returns
    // the node id when a record was committed, which marks the node returnable.
    fn commit_pending(&mut self) -> Result<Option<usize>, SgfError> {
        if self.cache_values.is_empty() {
            return Ok(None);
        }

        let values = std::mem::take(&mut self.cache_values);
        let node = self
            .document
            .get_mut_node_by_id(self.current)
            .expect("current node not found");
        node.add_property(&self.cache_tag, values, self.cache_start, self.cache_end)?;

        Ok(Some(self.current))
    }
}
