use crate::sgf_parser::input_stream::InputStream;
use crate::sgf_parser::node::{Node, NodeType};
use crate::sgf_parser::node_arena::NodeArena;
use crate::sgf_parser::parse_errors::SgfError;
use crate::sgf_parser::parser::SgfParser;
use std::fs::File;

// A parsed SGF proof tree. The document owns every node through its arena and
// keeps track of the designated root.
#[derive(Debug)]
pub struct Document {
    arena: NodeArena,
    pub root: Option<usize>,
}

impl Document {
    // Creates a new empty document
    pub fn new() -> Self {
        Self {
            arena: NodeArena::new(),
            root: None,
        }
    }

    // Parses the given string into a document and runs the aggregation pass
    pub fn load_from_str(sgf: &str) -> Result<Document, SgfError> {
        let mut stream = InputStream::new();
        stream.read_from_str(sgf);
        Document::load_from_stream(&mut stream)
    }

    // Parses the file at the given path into a document. Fails with an io
    // error before any tokenizing when the path cannot be opened for reading.
    pub fn load_from_file(path: &str) -> Result<Document, SgfError> {
        let file = File::open(path)
            .map_err(|e| SgfError::io(&format!("Cannot open file {}: {}", path, e)))?;

        let mut stream = InputStream::new();
        stream
            .read_from_file(file)
            .map_err(|e| SgfError::io(&format!("Cannot read file {}: {}", path, e)))?;
        Document::load_from_stream(&mut stream)
    }

    // Consumes the whole stream into a document and runs the aggregation pass
    pub fn load_from_stream(stream: &mut InputStream) -> Result<Document, SgfError> {
        let mut document = Document::new();
        {
            let mut parser = SgfParser::new(stream, &mut document, None);
            while parser.next_node()?.is_some() {}
        }
        document.compute_sizes();
        Ok(document)
    }

    // Fetches a node by id or returns None when no node with this ID is found
    pub fn get_node_by_id(&self, node_id: usize) -> Option<&Node> {
        self.arena.get_node(node_id)
    }

    pub fn get_mut_node_by_id(&mut self, node_id: usize) -> Option<&mut Node> {
        self.arena.get_mut_node(node_id)
    }

    pub fn node_count(&self) -> usize {
        self.arena.node_count()
    }

    // Allocates a fresh node owned by this document
    pub fn create_node(&mut self) -> usize {
        self.arena.add_node(Node::new())
    }

    // Appends a node as the last child of the given parent
    pub fn attach_node(&mut self, parent_id: usize, node_id: usize) {
        self.arena.attach_node(parent_id, node_id);
    }

    pub fn detach_node(&mut self, node_id: usize) {
        self.arena.detach_node(node_id);
    }

    pub fn remove_node(&mut self, node_id: usize) {
        self.arena.remove_node(node_id);
    }

    // Single depth-first pass that fills tree_size and proof_tree_size bottom
    // up, children visited in chain order. Recursion depth equals tree depth.
    pub fn compute_sizes(&mut self) {
        if let Some(root) = self.root {
            self.compute_subtree(root);
        }
    }

    fn compute_subtree(&mut self, node_id: usize) {
        let (children, node_type, solved) = {
            let node = self.arena.get_node(node_id).expect("node not found");
            (node.children.clone(), node.node_type, node.solved)
        };

        if children.is_empty() {
            let node = self.arena.get_mut_node(node_id).expect("node not found");
            node.tree_size = 1;
            node.proof_tree_size = if solved { 1 } else { 0 };
            return;
        }

        let mut tree_size = 1;
        // AND nodes sum the proof sizes of their solved children, OR nodes take
        // the minimum. usize::MAX marks a minimum that never moved.
        let mut proof_tree_size = if node_type == NodeType::And { 0 } else { usize::MAX };

        for child_id in children {
            self.compute_subtree(child_id);

            let child = self.arena.get_node(child_id).expect("node not found");
            tree_size += child.tree_size;
            match node_type {
                NodeType::And if child.solved => proof_tree_size += child.proof_tree_size,
                NodeType::Or if child.solved => {
                    proof_tree_size = proof_tree_size.min(child.proof_tree_size)
                }
                _ => {}
            }
        }

        let node = self.arena.get_mut_node(node_id).expect("node not found");
        node.tree_size = tree_size;
        if !solved {
            node.proof_tree_size = 0;
        } else if proof_tree_size == usize::MAX {
            // solved without any solved child contribution: the verdict came
            // from a transposition match outside this subtree
            node.proof_tree_size = 1;
        } else {
            node.proof_tree_size = proof_tree_size + 1;
        }
    }

    // Serializes the whole tree. A node with a single child continues inline,
    // a node with several children wraps each sibling subtree in parentheses.
    pub fn to_sgf(&self) -> String {
        let mut out = String::from("(");
        if let Some(root) = self.root {
            self.serialize_subtree(root, &mut out);
        }
        out.push(')');
        out
    }

    fn serialize_subtree(&self, node_id: usize, out: &mut String) {
        let node = self.arena.get_node(node_id).expect("node not found");
        out.push_str(&node.to_sgf_string());

        if node.children.len() == 1 {
            self.serialize_subtree(node.children[0], out);
        } else {
            for &child_id in &node.children {
                out.push('(');
                self.serialize_subtree(child_id, out);
                out.push(')');
            }
        }
    }
}
