use crate::sgf_parser::parse_errors::SgfError;
use derive_more::Display;
use lazy_static::lazy_static;
use phf::phf_map;
use regex::Regex;
use std::fmt;

// Node types for the alternating AND/OR semantics of a solved game tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum NodeType {
    #[display(fmt = "NONE")]
    None,
    #[display(fmt = "AND")]
    And,
    #[display(fmt = "OR")]
    Or,
}

// Move tags that determine the type of the node they appear on
static MOVE_TAGS: phf::Map<&'static str, NodeType> = phf_map! {
    "B" => NodeType::Or,
    "W" => NodeType::And,
};

lazy_static! {
    // Solver fields embedded in comment properties, one `key value` per line
    static ref SOLVER_STATUS_RE: Regex = Regex::new(r"solver_status: ([^\n]*)").unwrap();
    static ref MATCH_TT_RE: Regex = Regex::new(r"match_tt = ([^\n]*)").unwrap();
    static ref EQUAL_LOSS_RE: Regex = Regex::new(r"equal_loss = ([^\n]*)").unwrap();
}

// Returns the value of the given comment field, up to the end of the line.
// A trailing carriage return is not part of the value.
fn comment_field<'a>(comment: &'a str, re: &Regex) -> Option<&'a str> {
    let value = re.captures(comment)?.get(1)?.as_str();
    Some(value.strip_suffix('\r').unwrap_or(value))
}

#[derive(Debug)]
pub struct Node {
    pub id: usize,                      // ID of the node, assigned by the arena
    pub parent: Option<usize>,          // parent of the node, if any
    pub children: Vec<usize>,           // children of the node, in document order
    pub node_type: NodeType,            // AND/OR type as derived from the move tag
    pub tree_size: usize,               // number of nodes in the subtree, self included
    pub proof_tree_size: usize,         // number of nodes needed to certify the solved verdict
    pub solved: bool,                   // the solver reached a WIN or LOSS verdict here
    pub match_tt: bool,                 // solved verdict came from a transposition match
    pub pruned_by_rzone: bool,          // solved verdict came from refutation zone pruning
    pub properties: Vec<(String, Vec<String>)>, // raw properties in insertion order
}

impl Node {
    pub fn new() -> Self {
        Node {
            id: 0,
            parent: None,
            children: vec![],
            node_type: NodeType::None,
            tree_size: 0,
            proof_tree_size: 0,
            solved: false,
            match_tt: false,
            pruned_by_rzone: false,
            properties: vec![],
        }
    }

    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    // Interprets one committed property record. Move tags set the node type,
    // comment properties carry the solver verdict. Every record is also kept
    // verbatim in the property list.
    pub fn add_property(
        &mut self,
        tag: &str,
        values: Vec<String>,
        start: usize,
        end: usize,
    ) -> Result<(), SgfError> {
        if let Some(node_type) = MOVE_TAGS.get(tag) {
            if values.len() != 1 {
                let message = format!("Tag {} expects exactly one value", tag);
                return Err(SgfError::malformed_data(&message, start, end));
            }
            self.node_type = *node_type;
        }

        if tag == "C" {
            if values.len() != 1 {
                return Err(SgfError::malformed_data("Tag C expects exactly one value", start, end));
            }
            let comment = &values[0];

            if let Some(status) = comment_field(comment, &SOLVER_STATUS_RE) {
                if status == "WIN" || status == "LOSS" {
                    self.solved = true;
                }
            }

            self.match_tt = comment_field(comment, &MATCH_TT_RE) == Some("true");
            if self.match_tt && !self.solved {
                return Err(SgfError::malformed_data(
                    "match_tt flag set on an unsolved node",
                    start,
                    end,
                ));
            }

            self.pruned_by_rzone = match comment_field(comment, &EQUAL_LOSS_RE) {
                Some(value) => value != "-1",
                None => false,
            };
            if self.pruned_by_rzone && !self.solved {
                return Err(SgfError::malformed_data(
                    "equal_loss flag set on an unsolved node",
                    start,
                    end,
                ));
            }
        }

        self.properties.push((tag.to_string(), values));
        Ok(())
    }

    // Serializes the node and its properties. The comment property is re-emitted
    // with the derived solver metadata appended to the original text.
    pub fn to_sgf_string(&self) -> String {
        let mut out = String::from(";");

        for (tag, values) in &self.properties {
            out.push_str(tag);
            if tag == "C" {
                out.push_str(&format!(
                    "[{}\nid = {}\ntype = {}\ntree_size = {}\nproof_tree_size = {}\nsolved = {}\nmatch_tt = {}\npruned_by_rzone = {}]",
                    values[0],
                    self.id,
                    self.node_type,
                    self.tree_size,
                    self.proof_tree_size,
                    self.solved,
                    self.match_tt,
                    self.pruned_by_rzone,
                ));
            } else {
                for value in values {
                    out.push_str(&format!("[{}]", value));
                }
            }
        }

        out
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SgfNode(id={}, type={}, tree_size={}, proof_tree_size={}, solved={})",
            self.id, self.node_type, self.tree_size, self.proof_tree_size, self.solved
        )
    }
}
