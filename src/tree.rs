//! Hierarchical sub-command tree.
//!
//! One tree per trigger word. Nodes live in an arena owned by the tree;
//! children are held top-down by index and the parent link is a plain
//! index used only to rebuild a node's command path.

use crate::error::BindError;

/// Index of a node inside its [`CommandTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

impl NodeId {
    /// The root of every tree.
    pub const ROOT: NodeId = NodeId(0);
}

#[derive(Debug)]
struct CommandNode<T> {
    name: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    values: Vec<T>,
}

impl<T> CommandNode<T> {
    fn new(name: String, parent: Option<NodeId>) -> Self {
        Self {
            name,
            parent,
            children: Vec::new(),
            values: Vec::new(),
        }
    }
}

/// An n-ary tree keyed by sub-command tokens.
///
/// Each node may carry an ordered chain of values (triggers, in the
/// dispatcher). A node's chain is bound at most once.
#[derive(Debug)]
pub struct CommandTree<T> {
    nodes: Vec<CommandNode<T>>,
}

impl<T> Default for CommandTree<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> CommandTree<T> {
    /// Create a tree holding only an unnamed root.
    pub fn new() -> Self {
        Self {
            nodes: vec![CommandNode::new(String::new(), None)],
        }
    }

    /// Number of nodes, root included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false; the root always exists.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Name of a node. The root's name is empty.
    pub fn name(&self, id: NodeId) -> &str {
        &self.nodes[id.0].name
    }

    /// Chain bound to a node.
    pub fn values(&self, id: NodeId) -> &[T] {
        &self.nodes[id.0].values
    }

    /// Child of `parent` with exactly `name`.
    pub fn child(&self, parent: NodeId, name: &str) -> Option<NodeId> {
        self.nodes[parent.0]
            .children
            .iter()
            .copied()
            .find(|&c| self.nodes[c.0].name == name)
    }

    /// Insert a named child under `parent`.
    pub fn add_child(&mut self, parent: NodeId, name: &str) -> Result<NodeId, BindError> {
        if self.child(parent, name).is_some() {
            return Err(BindError::DuplicateChild(name.to_string()));
        }
        let id = NodeId(self.nodes.len());
        self.nodes.push(CommandNode::new(name.to_string(), Some(parent)));
        self.nodes[parent.0].children.push(id);
        Ok(id)
    }

    /// Walk down from `from`, one exact-match child per token.
    ///
    /// Stops at the last node reached when a token has no matching child or
    /// the tokens run out. Returns `from` itself when nothing matched, so
    /// callers compare ids to tell "stayed put" from "descended".
    pub fn match_path<S: AsRef<str>>(&self, from: NodeId, tokens: &[S]) -> NodeId {
        let mut node = from;
        for token in tokens {
            match self.child(node, token.as_ref()) {
                Some(next) => node = next,
                None => break,
            }
        }
        node
    }

    /// Names from the root down to `id`, root excluded.
    pub fn commands(&self, id: NodeId) -> Vec<String> {
        let mut path = Vec::new();
        let mut cursor = Some(id);
        while let Some(node) = cursor {
            let node = &self.nodes[node.0];
            if node.parent.is_none() {
                break;
            }
            path.push(node.name.clone());
            cursor = node.parent;
        }
        path.reverse();
        path
    }

    /// Depth of a node below the root.
    pub fn depth(&self, id: NodeId) -> usize {
        let mut depth = 0;
        let mut cursor = self.nodes[id.0].parent;
        while let Some(parent) = cursor {
            depth += 1;
            cursor = self.nodes[parent.0].parent;
        }
        depth
    }

    /// Bind a chain to a command path, creating missing nodes.
    ///
    /// `word` only labels the error. An empty path binds the root.
    pub fn bind<S: AsRef<str>>(
        &mut self,
        word: &str,
        path: &[S],
        values: Vec<T>,
    ) -> Result<NodeId, BindError> {
        let reached = self.match_path(NodeId::ROOT, path);
        let consumed = self.depth(reached);

        if consumed == path.len() && !self.values(reached).is_empty() {
            return Err(BindError::DuplicateBinding {
                word: word.to_string(),
                path: path
                    .iter()
                    .map(|s| s.as_ref())
                    .collect::<Vec<_>>()
                    .join(" "),
            });
        }

        let mut node = reached;
        for name in &path[consumed..] {
            node = self.add_child(node, name.as_ref())?;
        }
        self.nodes[node.0].values = values;
        Ok(node)
    }
}
