use std::{
    cmp::Ordering,
    ops::{Index, IndexMut},
};

use crate::{KvError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Color {
    Red,
    Black,
}

/// Stable handle of a node inside an [`Arena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct NodeId(usize);

/// Slot 0 of every arena. Stands for every empty child link and for the
/// parent of the root.
pub(crate) const NIL: NodeId = NodeId(0);

impl NodeId {
    pub(crate) fn is_nil(self) -> bool {
        self == NIL
    }
}

pub(crate) struct Node {
    pub(crate) key: Vec<u8>,
    pub(crate) value: Vec<u8>,
    pub(crate) left: NodeId,
    pub(crate) right: NodeId,
    // back-reference only, ownership lives in the arena
    pub(crate) parent: NodeId,
    pub(crate) color: Color,
}

impl Node {
    fn sentinel() -> Node {
        Node {
            key: Vec::new(),
            value: Vec::new(),
            left: NIL,
            right: NIL,
            parent: NIL,
            color: Color::Black,
        }
    }
}

/// Owns every node of one tree. Links between nodes are plain indices, so
/// parent pointers never create ownership cycles.
pub(crate) struct Arena {
    nodes: Vec<Node>,
    free: Vec<NodeId>,
    len: usize,
}

impl Arena {
    pub(crate) fn new() -> Arena {
        Arena {
            nodes: vec![Node::sentinel()],
            free: Vec::new(),
            len: 0,
        }
    }

    /// Number of live nodes, the sentinel excluded.
    pub(crate) fn len(&self) -> usize {
        self.len
    }

    pub(crate) fn alloc(&mut self, key: Vec<u8>, value: Vec<u8>, color: Color) -> NodeId {
        let node = Node {
            key,
            value,
            left: NIL,
            right: NIL,
            parent: NIL,
            color,
        };
        self.len += 1;

        match self.free.pop() {
            Some(id) => {
                self.nodes[id.0] = node;
                id
            }
            None => {
                self.nodes.push(node);
                NodeId(self.nodes.len() - 1)
            }
        }
    }

    /// Returns the slot to the free list. The caller must already have
    /// unlinked `id` from the tree.
    pub(crate) fn release(&mut self, id: NodeId) {
        debug_assert!(!id.is_nil(), "the sentinel is never released");

        let node = &mut self.nodes[id.0];
        node.key = Vec::new();
        node.value = Vec::new();
        node.left = NIL;
        node.right = NIL;
        node.parent = NIL;
        node.color = Color::Black;

        self.free.push(id);
        self.len -= 1;
    }

    /// Descends from `root` to the node holding exactly `key`, or NIL.
    pub(crate) fn find(&self, root: NodeId, key: &[u8]) -> NodeId {
        let mut cur = root;
        while !cur.is_nil() {
            let node = &self[cur];
            cur = match key.cmp(node.key.as_slice()) {
                Ordering::Equal => return cur,
                Ordering::Less => node.left,
                Ordering::Greater => node.right,
            };
        }
        NIL
    }

    pub(crate) fn minimum(&self, mut id: NodeId) -> NodeId {
        while !self[id].left.is_nil() {
            id = self[id].left;
        }
        id
    }

    /// Number of nodes on the longest root-to-leaf path.
    pub(crate) fn height(&self, root: NodeId) -> usize {
        let mut height = 0;
        let mut stack = vec![(root, 1)];
        while let Some((id, depth)) = stack.pop() {
            if id.is_nil() {
                continue;
            }
            height = height.max(depth);
            stack.push((self[id].left, depth + 1));
            stack.push((self[id].right, depth + 1));
        }
        height
    }

    /// Checks parent links, strict key order and the live node count of the
    /// tree hanging from `root`.
    pub(crate) fn check_structure(&self, root: NodeId) -> Result<()> {
        if !root.is_nil() && !self[root].parent.is_nil() {
            return Err(violation("root has a parent"));
        }

        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            if id.is_nil() {
                continue;
            }
            for child in [self[id].left, self[id].right] {
                if !child.is_nil() && self[child].parent != id {
                    return Err(violation(format!(
                        "node {:?} does not point back to its parent {:?}",
                        child, id
                    )));
                }
                stack.push(child);
            }
        }

        let mut count = 0;
        let mut prev: Option<&[u8]> = None;
        for (key, _) in Iter::new(self, root) {
            if let Some(prev) = prev {
                if prev >= key {
                    return Err(violation(format!(
                        "keys out of order: {:?} before {:?}",
                        String::from_utf8_lossy(prev),
                        String::from_utf8_lossy(key)
                    )));
                }
            }
            prev = Some(key);
            count += 1;
        }
        if count != self.len {
            return Err(violation(format!(
                "{} nodes reachable but {} allocated",
                count, self.len
            )));
        }

        Ok(())
    }
}

impl Index<NodeId> for Arena {
    type Output = Node;

    fn index(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }
}

impl IndexMut<NodeId> for Arena {
    fn index_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }
}

pub(crate) fn violation(msg: impl Into<String>) -> KvError {
    KvError::InvariantViolation(msg.into())
}

/// In-order iterator over the entries of a tree, smallest key first.
///
/// It borrows the tree, so a new walk is started simply by asking the tree
/// for another iterator.
pub struct Iter<'a> {
    arena: &'a Arena,
    stack: Vec<NodeId>,
}

impl<'a> Iter<'a> {
    pub(crate) fn new(arena: &'a Arena, root: NodeId) -> Iter<'a> {
        let mut iter = Iter {
            arena,
            stack: Vec::new(),
        };
        iter.push_left_spine(root);
        iter
    }

    fn push_left_spine(&mut self, mut id: NodeId) {
        while !id.is_nil() {
            self.stack.push(id);
            id = self.arena[id].left;
        }
    }
}

impl<'a> Iterator for Iter<'a> {
    type Item = (&'a [u8], &'a [u8]);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        let arena = self.arena;
        let node = &arena[id];
        self.push_left_spine(node.right);
        Some((node.key.as_slice(), node.value.as_slice()))
    }
}
