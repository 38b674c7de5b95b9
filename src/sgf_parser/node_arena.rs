use crate::sgf_parser::node::Node;
use std::collections::HashMap;

// Owns every node of a single parsed tree. Nodes are addressed by a stable id
// and links between nodes are id fields instead of pointers, so detaching and
// reattaching are plain id rewrites.
#[derive(Debug)]
pub struct NodeArena {
    nodes: HashMap<usize, Node>,        // Current nodes
    next_id: usize,                     // next id to use
}

impl NodeArena {
    pub fn new() -> Self {
        Self {
            nodes: HashMap::new(),
            next_id: 0,
        }
    }

    pub fn get_node(&self, node_id: usize) -> Option<&Node> {
        self.nodes.get(&node_id)
    }

    pub fn get_mut_node(&mut self, node_id: usize) -> Option<&mut Node> {
        self.nodes.get_mut(&node_id)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    // Registers a node and assigns the next id to it
    pub fn add_node(&mut self, mut node: Node) -> usize {
        let id = self.next_id;
        self.next_id += 1;

        node.id = id;
        self.nodes.insert(id, node);
        id
    }

    // Appends the node as the last child of the given parent. The node is
    // detached from its current parent first, so reattaching is always safe.
    pub fn attach_node(&mut self, parent_id: usize, node_id: usize) {
        self.detach_node(node_id);

        if let Some(parent_node) = self.nodes.get_mut(&parent_id) {
            parent_node.children.push(node_id);
        }
        if let Some(node) = self.nodes.get_mut(&node_id) {
            node.parent = Some(parent_id);
        }
    }

    // Removes the node from its parent's child list and clears its parent link.
    // Detaching an already detached node is a no-op.
    pub fn detach_node(&mut self, node_id: usize) {
        let parent_id = match self.nodes.get(&node_id) {
            Some(node) => node.parent,
            None => None,
        };

        if let Some(parent_id) = parent_id {
            if let Some(parent_node) = self.nodes.get_mut(&parent_id) {
                parent_node.children.retain(|&id| id != node_id);
            }
            if let Some(node) = self.nodes.get_mut(&node_id) {
                node.parent = None;
            }
        }
    }

    // Unregisters and destroys a node. Removing a node this arena does not own
    // is a programming error.
    pub fn remove_node(&mut self, node_id: usize) {
        self.detach_node(node_id);
        self.nodes.remove(&node_id).expect("node not owned by this arena");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_and_attach() {
        let mut arena = NodeArena::new();
        let parent = arena.add_node(Node::new());
        let child1 = arena.add_node(Node::new());
        let child2 = arena.add_node(Node::new());

        assert_eq!((parent, child1, child2), (0, 1, 2));
        assert_eq!(arena.node_count(), 3);

        arena.attach_node(parent, child1);
        arena.attach_node(parent, child2);

        let parent_node = arena.get_node(parent).unwrap();
        assert_eq!(parent_node.children, vec![child1, child2]);
        assert_eq!(parent_node.child_count(), 2);
        assert_eq!(arena.get_node(child1).unwrap().parent, Some(parent));
    }

    #[test]
    fn test_reattach() {
        let mut arena = NodeArena::new();
        let a = arena.add_node(Node::new());
        let b = arena.add_node(Node::new());
        let child = arena.add_node(Node::new());

        arena.attach_node(a, child);
        arena.attach_node(b, child);

        assert_eq!(arena.get_node(a).unwrap().children, Vec::<usize>::new());
        assert_eq!(arena.get_node(b).unwrap().children, vec![child]);
        assert_eq!(arena.get_node(child).unwrap().parent, Some(b));
    }

    #[test]
    fn test_detach() {
        let mut arena = NodeArena::new();
        let parent = arena.add_node(Node::new());
        let child1 = arena.add_node(Node::new());
        let child2 = arena.add_node(Node::new());
        arena.attach_node(parent, child1);
        arena.attach_node(parent, child2);

        // child2 is not the first child, the chain is walked to find it
        arena.detach_node(child2);
        assert_eq!(arena.get_node(parent).unwrap().children, vec![child1]);
        assert_eq!(arena.get_node(child2).unwrap().parent, None);

        // detaching an already detached node is a no-op
        arena.detach_node(child2);
        assert_eq!(arena.get_node(parent).unwrap().children, vec![child1]);
    }

    #[test]
    fn test_remove() {
        let mut arena = NodeArena::new();
        let parent = arena.add_node(Node::new());
        let child = arena.add_node(Node::new());
        arena.attach_node(parent, child);

        arena.remove_node(child);
        assert_eq!(arena.node_count(), 1);
        assert_eq!(arena.get_node(parent).unwrap().children, Vec::<usize>::new());
        assert!(arena.get_node(child).is_none());
    }

    #[test]
    #[should_panic(expected = "node not owned by this arena")]
    fn test_remove_unowned() {
        let mut arena = NodeArena::new();
        arena.remove_node(42);
    }
}
