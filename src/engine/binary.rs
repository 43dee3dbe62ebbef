use std::cmp::Ordering;

use super::{
    node::{Arena, Color, Iter, NodeId, NIL},
    OrderedMap,
};
use crate::{KvError, Result};

/// Unbalanced binary search tree.
///
/// Nothing keeps its height in check, so inserting keys in sorted order
/// turns it into a linked list. Kept as a baseline next to [`RedBlackTree`].
///
/// [`RedBlackTree`]: super::RedBlackTree
pub struct BinaryTree {
    arena: Arena,
    root: NodeId,
}

impl Default for BinaryTree {
    fn default() -> Self {
        Self::new()
    }
}

impl BinaryTree {
    pub fn new() -> BinaryTree {
        BinaryTree {
            arena: Arena::new(),
            root: NIL,
        }
    }

    // Replaces the subtree rooted at `u` with the one rooted at `v`.
    fn transplant(&mut self, u: NodeId, v: NodeId) {
        let parent = self.arena[u].parent;
        if parent.is_nil() {
            self.root = v;
        } else if u == self.arena[parent].left {
            self.arena[parent].left = v;
        } else {
            self.arena[parent].right = v;
        }
        if !v.is_nil() {
            self.arena[v].parent = parent;
        }
    }
}

impl OrderedMap for BinaryTree {
    fn put(&mut self, key: Vec<u8>, value: Vec<u8>) -> Result<()> {
        let mut parent = NIL;
        let mut cur = self.root;
        let mut ord = Ordering::Equal;

        while !cur.is_nil() {
            parent = cur;
            ord = key.as_slice().cmp(self.arena[cur].key.as_slice());
            cur = match ord {
                Ordering::Equal => {
                    self.arena[cur].value = value;
                    return Ok(());
                }
                Ordering::Less => self.arena[cur].left,
                Ordering::Greater => self.arena[cur].right,
            };
        }

        // the color tag is unused by this strategy
        let id = self.arena.alloc(key, value, Color::Black);
        self.arena[id].parent = parent;
        if parent.is_nil() {
            self.root = id;
        } else if ord == Ordering::Less {
            self.arena[parent].left = id;
        } else {
            self.arena[parent].right = id;
        }

        Ok(())
    }

    fn get(&self, key: &[u8]) -> Result<&[u8]> {
        let id = self.arena.find(self.root, key);
        if id.is_nil() {
            return Err(KvError::KeyNotFound);
        }
        Ok(&self.arena[id].value)
    }

    fn delete(&mut self, key: &[u8]) -> Result<()> {
        let z = self.arena.find(self.root, key);
        if z.is_nil() {
            return Err(KvError::KeyNotFound);
        }

        let (left, right) = (self.arena[z].left, self.arena[z].right);
        if left.is_nil() {
            self.transplant(z, right);
        } else if right.is_nil() {
            self.transplant(z, left);
        } else {
            // two children: splice in the in-order successor
            let y = self.arena.minimum(right);
            if self.arena[y].parent != z {
                let y_right = self.arena[y].right;
                self.transplant(y, y_right);
                self.arena[y].right = right;
                self.arena[right].parent = y;
            }
            self.transplant(z, y);
            self.arena[y].left = left;
            self.arena[left].parent = y;
        }

        self.arena.release(z);
        Ok(())
    }

    fn iter(&self) -> Iter<'_> {
        Iter::new(&self.arena, self.root)
    }

    fn len(&self) -> usize {
        self.arena.len()
    }

    fn height(&self) -> usize {
        self.arena.height(self.root)
    }

    fn validate(&self) -> Result<()> {
        self.arena.check_structure(self.root)
    }
}
