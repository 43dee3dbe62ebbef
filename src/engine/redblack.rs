use std::cmp::Ordering;

use super::{
    node::{violation, Arena, Color, Iter, NodeId, NIL},
    OrderedMap,
};
use crate::{KvError, Result};

/// Red-black tree.
///
/// Rules kept after every `put` and `delete`:
/// 1. The root and the sentinel are black.
/// 2. A red node has only black children.
/// 3. Every path from a node down to the sentinel crosses the same number
///    of black nodes.
///
/// Together they bound the height by 2*log2(n+1).
pub struct RedBlackTree {
    arena: Arena,
    root: NodeId,
}

impl Default for RedBlackTree {
    fn default() -> Self {
        Self::new()
    }
}

impl RedBlackTree {
    pub fn new() -> RedBlackTree {
        RedBlackTree {
            arena: Arena::new(),
            root: NIL,
        }
    }

    fn color(&self, id: NodeId) -> Color {
        self.arena[id].color
    }

    fn set_color(&mut self, id: NodeId, color: Color) {
        self.arena[id].color = color;
    }

    fn parent(&self, id: NodeId) -> NodeId {
        self.arena[id].parent
    }

    fn left(&self, id: NodeId) -> NodeId {
        self.arena[id].left
    }

    fn right(&self, id: NodeId) -> NodeId {
        self.arena[id].right
    }

    //     x              y
    //    / \            / \
    //   a   y    =>    x   c
    //      / \        / \
    //     b   c      a   b
    fn left_rotate(&mut self, x: NodeId) {
        let y = self.right(x);
        let b = self.left(y);

        self.arena[x].right = b;
        if !b.is_nil() {
            self.arena[b].parent = x;
        }

        let p = self.parent(x);
        self.arena[y].parent = p;
        if p.is_nil() {
            self.root = y;
        } else if x == self.left(p) {
            self.arena[p].left = y;
        } else {
            self.arena[p].right = y;
        }

        self.arena[y].left = x;
        self.arena[x].parent = y;
    }

    //       y          x
    //      / \        / \
    //     x   c  =>  a   y
    //    / \            / \
    //   a   b          b   c
    fn right_rotate(&mut self, y: NodeId) {
        let x = self.left(y);
        let b = self.right(x);

        self.arena[y].left = b;
        if !b.is_nil() {
            self.arena[b].parent = y;
        }

        let p = self.parent(y);
        self.arena[x].parent = p;
        if p.is_nil() {
            self.root = x;
        } else if y == self.left(p) {
            self.arena[p].left = x;
        } else {
            self.arena[p].right = x;
        }

        self.arena[x].right = y;
        self.arena[y].parent = x;
    }

    fn insert_fixup(&mut self, mut z: NodeId) {
        while self.color(self.parent(z)) == Color::Red {
            let p = self.parent(z);
            let g = self.parent(p);

            if p == self.left(g) {
                let uncle = self.right(g);
                if self.color(uncle) == Color::Red {
                    self.set_color(p, Color::Black);
                    self.set_color(uncle, Color::Black);
                    self.set_color(g, Color::Red);
                    z = g;
                } else {
                    if z == self.right(p) {
                        // inner child, turn it into the outer case
                        z = p;
                        self.left_rotate(z);
                    }
                    let p = self.parent(z);
                    let g = self.parent(p);
                    self.set_color(p, Color::Black);
                    self.set_color(g, Color::Red);
                    self.right_rotate(g);
                }
            } else {
                let uncle = self.left(g);
                if self.color(uncle) == Color::Red {
                    self.set_color(p, Color::Black);
                    self.set_color(uncle, Color::Black);
                    self.set_color(g, Color::Red);
                    z = g;
                } else {
                    if z == self.left(p) {
                        z = p;
                        self.right_rotate(z);
                    }
                    let p = self.parent(z);
                    let g = self.parent(p);
                    self.set_color(p, Color::Black);
                    self.set_color(g, Color::Red);
                    self.left_rotate(g);
                }
            }
        }

        let root = self.root;
        self.set_color(root, Color::Black);
    }

    // Unlike the unbalanced tree, `v` may be the sentinel here and still gets
    // its parent set: delete_fixup climbs from it.
    fn transplant(&mut self, u: NodeId, v: NodeId) {
        let p = self.parent(u);
        if p.is_nil() {
            self.root = v;
        } else if u == self.left(p) {
            self.arena[p].left = v;
        } else {
            self.arena[p].right = v;
        }
        self.arena[v].parent = p;
    }

    // `x` carries an extra black. Push it up or absorb it with rotations.
    fn delete_fixup(&mut self, mut x: NodeId) {
        while x != self.root && self.color(x) == Color::Black {
            let p = self.parent(x);

            if x == self.left(p) {
                let mut w = self.right(p);
                if self.color(w) == Color::Red {
                    self.set_color(w, Color::Black);
                    self.set_color(p, Color::Red);
                    self.left_rotate(p);
                    w = self.right(p);
                }
                if self.color(self.left(w)) == Color::Black
                    && self.color(self.right(w)) == Color::Black
                {
                    self.set_color(w, Color::Red);
                    x = p;
                } else {
                    if self.color(self.right(w)) == Color::Black {
                        let wl = self.left(w);
                        self.set_color(wl, Color::Black);
                        self.set_color(w, Color::Red);
                        self.right_rotate(w);
                        w = self.right(p);
                    }
                    self.set_color(w, self.color(p));
                    self.set_color(p, Color::Black);
                    let wr = self.right(w);
                    self.set_color(wr, Color::Black);
                    self.left_rotate(p);
                    x = self.root;
                }
            } else {
                let mut w = self.left(p);
                if self.color(w) == Color::Red {
                    self.set_color(w, Color::Black);
                    self.set_color(p, Color::Red);
                    self.right_rotate(p);
                    w = self.left(p);
                }
                if self.color(self.right(w)) == Color::Black
                    && self.color(self.left(w)) == Color::Black
                {
                    self.set_color(w, Color::Red);
                    x = p;
                } else {
                    if self.color(self.left(w)) == Color::Black {
                        let wr = self.right(w);
                        self.set_color(wr, Color::Black);
                        self.set_color(w, Color::Red);
                        self.left_rotate(w);
                        w = self.left(p);
                    }
                    self.set_color(w, self.color(p));
                    self.set_color(p, Color::Black);
                    let wl = self.left(w);
                    self.set_color(wl, Color::Black);
                    self.right_rotate(p);
                    x = self.root;
                }
            }
        }

        self.set_color(x, Color::Black);
    }

    // Black nodes below `id` on every path to the sentinel, `id` included.
    fn black_height(&self, id: NodeId) -> Result<usize> {
        if id.is_nil() {
            return Ok(0);
        }

        let (left, right) = (self.left(id), self.right(id));
        if self.color(id) == Color::Red
            && (self.color(left) == Color::Red || self.color(right) == Color::Red)
        {
            return Err(violation(format!(
                "red node {:?} has a red child",
                String::from_utf8_lossy(&self.arena[id].key)
            )));
        }

        let lh = self.black_height(left)?;
        let rh = self.black_height(right)?;
        if lh != rh {
            return Err(violation(format!(
                "black height differs below {:?}: {} on the left, {} on the right",
                String::from_utf8_lossy(&self.arena[id].key),
                lh,
                rh
            )));
        }

        Ok(lh + usize::from(self.color(id) == Color::Black))
    }
}

impl OrderedMap for RedBlackTree {
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
                Ordering::Less => self.left(cur),
                Ordering::Greater => self.right(cur),
            };
        }

        let z = self.arena.alloc(key, value, Color::Red);
        self.arena[z].parent = parent;
        if parent.is_nil() {
            self.root = z;
        } else if ord == Ordering::Less {
            self.arena[parent].left = z;
        } else {
            self.arena[parent].right = z;
        }

        self.insert_fixup(z);
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

        let mut removed_color = self.color(z);
        let x;
        if self.left(z).is_nil() {
            x = self.right(z);
            self.transplant(z, x);
        } else if self.right(z).is_nil() {
            x = self.left(z);
            self.transplant(z, x);
        } else {
            let y = self.arena.minimum(self.right(z));
            removed_color = self.color(y);
            x = self.right(y);
            if self.parent(y) == z {
                self.arena[x].parent = y;
            } else {
                self.transplant(y, x);
                let zr = self.right(z);
                self.arena[y].right = zr;
                self.arena[zr].parent = y;
            }
            self.transplant(z, y);
            let zl = self.left(z);
            self.arena[y].left = zl;
            self.arena[zl].parent = y;
            self.set_color(y, self.color(z));
        }

        if removed_color == Color::Black {
            self.delete_fixup(x);
        }

        // the fixup may have parked a parent on the sentinel
        self.arena[NIL].parent = NIL;
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
        if self.color(NIL) != Color::Black {
            return Err(violation("sentinel is red"));
        }
        if self.color(self.root) != Color::Black {
            return Err(violation("root is red"));
        }
        self.arena.check_structure(self.root)?;
        self.black_height(self.root).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree_of(keys: &[&str]) -> RedBlackTree {
        let mut tree = RedBlackTree::new();
        for key in keys {
            tree.put(key.as_bytes().to_vec(), key.as_bytes().to_vec())
                .unwrap();
            tree.validate().unwrap();
        }
        tree
    }

    fn id_of(tree: &RedBlackTree, key: &str) -> NodeId {
        let id = tree.arena.find(tree.root, key.as_bytes());
        assert!(!id.is_nil(), "{} not in tree", key);
        id
    }

    fn key_of(tree: &RedBlackTree, id: NodeId) -> String {
        if id.is_nil() {
            return "-".to_owned();
        }
        String::from_utf8(tree.arena[id].key.clone()).unwrap()
    }

    // Pre-order dump of (node, left, right), enough to compare shapes.
    fn shape(tree: &RedBlackTree) -> Vec<(String, String, String)> {
        let mut out = Vec::new();
        let mut stack = vec![tree.root];
        while let Some(id) = stack.pop() {
            if id.is_nil() {
                continue;
            }
            out.push((
                key_of(tree, id),
                key_of(tree, tree.left(id)),
                key_of(tree, tree.right(id)),
            ));
            stack.push(tree.right(id));
            stack.push(tree.left(id));
        }
        out
    }

    #[test]
    fn sorted_inserts_stay_balanced() {
        let mut tree = RedBlackTree::new();
        for i in 0..1024u32 {
            tree.put(format!("{:05}", i).into_bytes(), Vec::new())
                .unwrap();
        }
        tree.validate().unwrap();
        // 2 * log2(1025) is just above 20
        assert!(tree.height() <= 20, "height {}", tree.height());
    }

    #[test]
    fn uncle_red_recolors() {
        let tree = tree_of(&["b", "a", "c", "d"]);
        // "d" forces a recolor of "a" and "c", the root stays black
        assert_eq!(key_of(&tree, tree.root), "b");
        assert_eq!(tree.color(id_of(&tree, "a")), Color::Black);
        assert_eq!(tree.color(id_of(&tree, "c")), Color::Black);
        assert_eq!(tree.color(id_of(&tree, "d")), Color::Red);
    }

    #[test]
    fn outer_child_rotates_once() {
        let tree = tree_of(&["a", "b", "c"]);
        assert_eq!(key_of(&tree, tree.root), "b");
        assert_eq!(tree.color(id_of(&tree, "a")), Color::Red);
        assert_eq!(tree.color(id_of(&tree, "c")), Color::Red);

        let tree = tree_of(&["c", "b", "a"]);
        assert_eq!(key_of(&tree, tree.root), "b");
    }

    #[test]
    fn inner_child_rotates_twice() {
        let tree = tree_of(&["a", "c", "b"]);
        assert_eq!(key_of(&tree, tree.root), "b");
        assert_eq!(shape(&tree)[0], ("b".to_owned(), "a".to_owned(), "c".to_owned()));

        let tree = tree_of(&["c", "a", "b"]);
        assert_eq!(shape(&tree)[0], ("b".to_owned(), "a".to_owned(), "c".to_owned()));
    }

    #[test]
    fn scenario_mixed_order_inserts() {
        let tree = tree_of(&["c", "a", "b", "d"]);
        let keys: Vec<&[u8]> = tree.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, [b"a", b"b", b"c", b"d"]);
        assert_eq!(tree.color(tree.root), Color::Black);
        tree.validate().unwrap();
    }

    #[test]
    fn rotations_are_inverse() {
        let mut tree = tree_of(&["d", "b", "f", "a", "c", "e", "g"]);
        let before = shape(&tree);

        let b = id_of(&tree, "b");
        tree.left_rotate(b);
        assert_ne!(shape(&tree), before);
        assert_eq!(tree.parent(b), id_of(&tree, "c"));
        tree.arena.check_structure(tree.root).unwrap();
        let c = id_of(&tree, "c");
        tree.right_rotate(c);
        assert_eq!(shape(&tree), before);

        let f = id_of(&tree, "f");
        tree.right_rotate(f);
        tree.arena.check_structure(tree.root).unwrap();
        let e = id_of(&tree, "e");
        tree.left_rotate(e);
        assert_eq!(shape(&tree), before);
    }

    #[test]
    fn rotating_the_root_moves_the_root() {
        let mut tree = tree_of(&["b", "a", "c"]);
        let root = tree.root;
        tree.left_rotate(root);
        assert_eq!(key_of(&tree, tree.root), "c");
        assert!(tree.parent(tree.root).is_nil());
        tree.arena.check_structure(tree.root).unwrap();

        let root = tree.root;
        tree.right_rotate(root);
        assert_eq!(key_of(&tree, tree.root), "b");
        tree.validate().unwrap();
    }

    #[test]
    fn delete_every_key_in_every_order_position() {
        let keys: Vec<String> = (0..64).map(|i| format!("{:03}", i * 7 % 64)).collect();
        let refs: Vec<&str> = keys.iter().map(String::as_str).collect();

        for victim in &refs {
            let mut tree = tree_of(&refs);
            tree.delete(victim.as_bytes()).unwrap();
            tree.validate().unwrap();
            assert_eq!(tree.len(), refs.len() - 1);
            assert!(matches!(
                tree.get(victim.as_bytes()),
                Err(KvError::KeyNotFound)
            ));
        }
    }

    #[test]
    fn delete_down_to_empty() {
        let keys: Vec<String> = (0..200).map(|i| format!("{:03}", i)).collect();
        let refs: Vec<&str> = keys.iter().map(String::as_str).collect();
        let mut tree = tree_of(&refs);

        // alternate between both ends to hit both mirror cases
        let (mut lo, mut hi) = (0, refs.len() - 1);
        while lo <= hi {
            tree.delete(refs[lo].as_bytes()).unwrap();
            tree.validate().unwrap();
            if lo != hi {
                tree.delete(refs[hi].as_bytes()).unwrap();
                tree.validate().unwrap();
            }
            lo += 1;
            if hi == 0 {
                break;
            }
            hi -= 1;
        }

        assert!(tree.is_empty());
        assert!(tree.root.is_nil());
        assert_eq!(tree.color(NIL), Color::Black);
    }

    #[test]
    fn freed_nodes_are_reused_after_delete() {
        let mut tree = tree_of(&["a", "b", "c"]);
        tree.delete(b"b").unwrap();
        tree.put(b"z".to_vec(), b"26".to_vec()).unwrap();
        tree.validate().unwrap();
        assert_eq!(tree.len(), 3);
        assert_eq!(tree.get(b"z").unwrap(), b"26");
    }

    #[test]
    fn validate_reports_broken_colors() {
        let mut tree = tree_of(&["b", "a", "c"]);
        let root = tree.root;
        tree.set_color(root, Color::Red);
        assert!(matches!(
            tree.validate(),
            Err(KvError::InvariantViolation(_))
        ));

        let mut tree = tree_of(&["b", "a", "c", "d"]);
        let c = id_of(&tree, "c");
        tree.set_color(c, Color::Red);
        assert!(matches!(
            tree.validate(),
            Err(KvError::InvariantViolation(_))
        ));

        let mut tree = tree_of(&["b", "a", "c"]);
        let a = id_of(&tree, "a");
        tree.set_color(a, Color::Black);
        assert!(matches!(
            tree.validate(),
            Err(KvError::InvariantViolation(_))
        ));
    }
}
