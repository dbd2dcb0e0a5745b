//! Breakpoint index: an arena-backed skip list of positions.
//!
//! Nodes live in a single `Vec` and link to each other through [`NodeId`]
//! indices instead of pointers, so unsplicing a node is a plain index rewrite
//! and removed slots are recycled through a free list. Slot 0 is the sentinel
//! head; its key is never compared.
//!
//! # Complexity
//!
//! Point operations (insert, remove, lookups) are expected O(log n).
//! Ordered enumeration walks level 0 and is O(k) in the number of keys visited.

use crate::segment::Position;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::fmt;

/// Maximum number of levels a node can participate in.
/// Supports around 2^32 keys before search paths degrade.
pub const MAX_LEVEL: usize = 32;

/// Probability that a node is promoted to the next level.
const PROMOTE_PROBABILITY: f64 = 0.5;

/// Arena slot of the sentinel head.
const HEAD: NodeId = NodeId(0);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct NodeId(usize);

#[derive(Debug, Clone)]
struct Node {
    key: Position,
    /// One forward link per level the node participates in.
    forward: Vec<Option<NodeId>>,
}

/// An ordered set of positions with expected logarithmic search.
///
/// Level selection draws from an injected random generator so the shape of
/// the list is reproducible when the generator is seeded.
pub struct SkipList<R = SmallRng> {
    nodes: Vec<Node>,
    free: Vec<NodeId>,
    /// Number of levels currently in use (at least 1).
    height: usize,
    len: usize,
    rng: R,
}

impl SkipList<SmallRng> {
    /// Create an empty list whose levels are drawn from an entropy-seeded generator.
    pub fn new() -> Self {
        Self::with_rng(SmallRng::from_entropy())
    }

    /// Create an empty list with a reproducible level sequence.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(SmallRng::seed_from_u64(seed))
    }
}

impl Default for SkipList<SmallRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> SkipList<R> {
    /// Create an empty list drawing levels from `rng`.
    pub fn with_rng(rng: R) -> Self {
        Self {
            nodes: vec![Node {
                key: Position::MIN,
                forward: vec![None; MAX_LEVEL],
            }],
            free: Vec::new(),
            height: 1,
            len: 0,
            rng,
        }
    }

    /// Number of keys in the list.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if the list holds no keys.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of levels currently in use.
    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Remove every key. The arena keeps its capacity.
    pub fn clear(&mut self) {
        self.nodes.truncate(1);
        self.nodes[HEAD.0].forward.fill(None);
        self.free.clear();
        self.height = 1;
        self.len = 0;
    }

    #[inline]
    fn next(&self, id: NodeId, level: usize) -> Option<NodeId> {
        self.nodes[id.0].forward[level]
    }

    #[inline]
    fn key(&self, id: NodeId) -> Position {
        self.nodes[id.0].key
    }

    /// Top-down descent that keeps moving right while `go_past` accepts the
    /// next key. Returns the node where level 0 stopped (possibly the head).
    #[inline]
    fn descend<F: Fn(Position) -> bool>(&self, go_past: F) -> NodeId {
        let mut current = HEAD;
        for level in (0..self.height).rev() {
            while let Some(next) = self.next(current, level) {
                if !go_past(self.key(next)) {
                    break;
                }
                current = next;
            }
        }
        current
    }

    /// For every level, the last node whose key is `< key`.
    fn find_predecessors(&self, key: Position) -> [NodeId; MAX_LEVEL] {
        let mut update = [HEAD; MAX_LEVEL];
        let mut current = HEAD;
        for level in (0..self.height).rev() {
            while let Some(next) = self.next(current, level) {
                if self.key(next) >= key {
                    break;
                }
                current = next;
            }
            update[level] = current;
        }
        update
    }

    fn random_level(&mut self) -> usize {
        let mut level = 1;
        while level < MAX_LEVEL && self.rng.gen_bool(PROMOTE_PROBABILITY) {
            level += 1;
        }
        level
    }

    fn alloc(&mut self, key: Position, levels: usize) -> NodeId {
        if let Some(id) = self.free.pop() {
            let node = &mut self.nodes[id.0];
            node.key = key;
            node.forward.clear();
            node.forward.resize(levels, None);
            id
        } else {
            self.nodes.push(Node {
                key,
                forward: vec![None; levels],
            });
            NodeId(self.nodes.len() - 1)
        }
    }

    /// Insert `key`. Returns `false` if it was already present.
    pub fn insert(&mut self, key: Position) -> bool {
        let update = self.find_predecessors(key);
        if let Some(next) = self.next(update[0], 0) {
            if self.key(next) == key {
                return false;
            }
        }

        // Levels above the current height keep HEAD as their predecessor.
        let levels = self.random_level();
        self.height = self.height.max(levels);

        let id = self.alloc(key, levels);
        for (level, &prev) in update.iter().enumerate().take(levels) {
            let next = self.next(prev, level);
            self.nodes[id.0].forward[level] = next;
            self.nodes[prev.0].forward[level] = Some(id);
        }
        self.len += 1;
        true
    }

    /// Remove `key`. Returns `false` if it was not present.
    pub fn remove(&mut self, key: Position) -> bool {
        let update = self.find_predecessors(key);
        let target = match self.next(update[0], 0) {
            Some(id) if self.key(id) == key => id,
            _ => return false,
        };

        let levels = self.nodes[target.0].forward.len();
        for (level, &prev) in update.iter().enumerate().take(levels) {
            if self.next(prev, level) != Some(target) {
                break;
            }
            let next = self.next(target, level);
            self.nodes[prev.0].forward[level] = next;
        }

        while self.height > 1 && self.next(HEAD, self.height - 1).is_none() {
            self.height -= 1;
        }

        self.nodes[target.0].forward.clear();
        self.free.push(target);
        self.len -= 1;
        true
    }

    /// Check if `key` is present.
    pub fn contains(&self, key: Position) -> bool {
        let below = self.descend(|k| k < key);
        self.next(below, 0).is_some_and(|id| self.key(id) == key)
    }

    /// Greatest key strictly less than `key`.
    pub fn predecessor(&self, key: Position) -> Option<Position> {
        let below = self.descend(|k| k < key);
        (below != HEAD).then(|| self.key(below))
    }

    /// Smallest key strictly greater than `key`.
    pub fn successor(&self, key: Position) -> Option<Position> {
        let at_most = self.descend(|k| k <= key);
        self.next(at_most, 0).map(|id| self.key(id))
    }

    /// Greatest key less than or equal to `key`.
    pub fn floor(&self, key: Position) -> Option<Position> {
        let at_most = self.descend(|k| k <= key);
        (at_most != HEAD).then(|| self.key(at_most))
    }

    /// Smallest key in the list.
    pub fn first(&self) -> Option<Position> {
        self.next(HEAD, 0).map(|id| self.key(id))
    }

    /// Largest key in the list.
    pub fn last(&self) -> Option<Position> {
        let last = self.descend(|_| true);
        (last != HEAD).then(|| self.key(last))
    }

    /// Keys touched by a range update over `[from, to)`, terminated by `to`.
    ///
    /// Walks level 0 from the last key `<= from` up to, but excluding, the
    /// last key `<= to`, then appends `to` unconditionally. Both `from` and
    /// `to` are expected to be present and `from <= to`; a key in the range
    /// that lies past a missing `to` is not reported.
    pub fn range_keys(&self, from: Position, to: Position) -> Vec<Position> {
        let mut current = self.descend(|k| k <= from);
        let end = self.descend(|k| k <= to);

        let mut keys = Vec::new();
        while current != end {
            if current != HEAD {
                keys.push(self.key(current));
            }
            match self.next(current, 0) {
                Some(next) => current = next,
                None => break,
            }
        }
        keys.push(to);
        keys
    }

    /// Iterate over all keys in increasing order.
    pub fn keys(&self) -> Keys<'_> {
        Keys {
            nodes: &self.nodes,
            cursor: self.next(HEAD, 0),
        }
    }

    /// Iterate in increasing order over keys `>= key`.
    pub fn keys_from(&self, key: Position) -> Keys<'_> {
        let below = self.descend(|k| k < key);
        Keys {
            nodes: &self.nodes,
            cursor: self.next(below, 0),
        }
    }
}

impl<R> fmt::Debug for SkipList<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let keys = Keys {
            nodes: &self.nodes,
            cursor: self.nodes[HEAD.0].forward[0],
        };
        f.debug_set().entries(keys).finish()
    }
}

/// Level-0 iterator over the keys of a [`SkipList`].
pub struct Keys<'a> {
    nodes: &'a [Node],
    cursor: Option<NodeId>,
}

impl Iterator for Keys<'_> {
    type Item = Position;

    #[inline]
    fn next(&mut self) -> Option<Position> {
        let id = self.cursor?;
        let node = &self.nodes[id.0];
        self.cursor = node.forward[0];
        Some(node.key)
    }
}
