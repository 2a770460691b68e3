//! Interval tree keyed by closed ranges.
//!
//! A plain binary search tree ordered by `(low, high)` and augmented with the
//! maximum `high` of every subtree, which prunes the overlap search. There is
//! no rebalancing: the shape, and therefore [`IntervalTree::depth`], follows
//! insertion order. Queries never depend on balance, only on the ordering
//! invariant, and every query walks the tree in order so results come back
//! sorted by `(low, high)` no matter how the entries were inserted.
//!
//! Equal keys are placed in the right subtree, so duplicates keep their
//! insertion order in every traversal.

use std::cmp::Ordering;

use crate::range::Interval;

/// How a stored interval `S` must relate to the query `q` to be returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchMode {
    /// `S.low <= q.high && S.high >= q.low`
    #[default]
    Overlap,
    /// `S.low == q.low && S.high == q.high`
    Exact,
    /// The stored interval lies inside the query: `S.low >= q.low && S.high <= q.high`.
    Contained,
    /// The stored interval covers the query: `S.low <= q.low && S.high >= q.high`.
    Containing,
}

struct Node<K: Interval, V> {
    key: K,
    value: V,
    max_high: K::Point,
    left: Option<Box<Node<K, V>>>,
    right: Option<Box<Node<K, V>>>,
}

impl<K: Interval, V> Node<K, V> {
    fn new(key: K, value: V) -> Self {
        let max_high = key.high();
        Self {
            key,
            value,
            max_high,
            left: None,
            right: None,
        }
    }
}

impl MatchMode {
    /// Whether `stored` satisfies this mode against `query`.
    pub fn accepts<K: Interval>(self, stored: &K, query: &K) -> bool {
        let (low, high) = (stored.low(), stored.high());
        let (q_low, q_high) = (query.low(), query.high());
        match self {
            MatchMode::Overlap => low <= q_high && high >= q_low,
            MatchMode::Exact => low == q_low && high == q_high,
            MatchMode::Contained => low >= q_low && high <= q_high,
            MatchMode::Containing => low <= q_low && high >= q_high,
        }
    }
}

fn key_order<K: Interval>(a: &K, b: &K) -> Ordering {
    (a.low(), a.high()).cmp(&(b.low(), b.high()))
}

fn max_high<K: Interval, V>(node: &Option<Box<Node<K, V>>>) -> Option<K::Point> {
    node.as_ref().map(|n| n.max_high)
}

/// An unbalanced, augmented interval tree holding `(key, value)` pairs.
pub struct IntervalTree<K: Interval, V> {
    root: Option<Box<Node<K, V>>>,
    len: usize,
    depth: usize,
}

impl<K: Interval, V> Default for IntervalTree<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Interval, V> IntervalTree<K, V> {
    pub fn new() -> Self {
        Self {
            root: None,
            len: 0,
            depth: 0,
        }
    }

    /// Number of stored entries, duplicates included.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Height of the tree as built. Informational only.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Insert an entry. Always succeeds; identical keys are allowed.
    pub fn insert(&mut self, key: K, value: V) {
        let high = key.high();
        let mut depth = 1;
        let mut slot = &mut self.root;

        while let Some(node) = slot {
            if node.max_high < high {
                node.max_high = high;
            }
            slot = if key_order(&key, &node.key) == Ordering::Less {
                &mut node.left
            } else {
                &mut node.right
            };
            depth += 1;
        }

        *slot = Some(Box::new(Node::new(key, value)));
        self.len += 1;
        self.depth = self.depth.max(depth);
    }

    /// All entries matching `query` under `mode`, ascending by `(low, high)`.
    ///
    /// An empty tree yields an empty list.
    pub fn find_all(&self, query: &K, mode: MatchMode) -> Vec<(&K, &V)> {
        let mut result = Vec::new();
        self.walk_query(query, mode, |node| {
            if mode.accepts(&node.key, query) {
                result.push((&node.key, &node.value));
            }
        });
        result
    }

    /// In-order walk of the nodes a `mode` query for `query` has to look at.
    fn walk_query<'a>(&'a self, query: &K, mode: MatchMode, visit: impl FnMut(&'a Node<K, V>)) {
        let (q_low, q_high) = (query.low(), query.high());
        self.walk(
            |node| match mode {
                MatchMode::Overlap => max_high(&node.left).is_some_and(|m| m >= q_low),
                MatchMode::Exact => key_order(query, &node.key) == Ordering::Less,
                MatchMode::Contained => node.key.low() >= q_low,
                MatchMode::Containing => max_high(&node.left).is_some_and(|m| m >= q_high),
            },
            // Right-subtree lows are never below `node.key.low()`.
            |node| match mode {
                MatchMode::Overlap => {
                    node.key.low() <= q_high && max_high(&node.right).is_some_and(|m| m >= q_low)
                }
                MatchMode::Exact => key_order(query, &node.key) != Ordering::Less,
                MatchMode::Contained => node.key.low() <= q_high,
                MatchMode::Containing => {
                    node.key.low() <= q_low && max_high(&node.right).is_some_and(|m| m >= q_high)
                }
            },
            visit,
        );
    }

    /// The value stored under exactly `key`, or `None` when the key is absent.
    ///
    /// With duplicate keys the entry closest to the root wins, which is the
    /// first one inserted.
    pub fn find_exact(&self, key: &K) -> Option<&V> {
        let mut cur = self.root.as_deref();
        while let Some(node) = cur {
            cur = match key_order(key, &node.key) {
                Ordering::Equal => return Some(&node.value),
                Ordering::Less => node.left.as_deref(),
                Ordering::Greater => node.right.as_deref(),
            };
        }
        None
    }

    /// Every entry from an in-order walk.
    pub fn node_list(&self) -> Vec<(&K, &V)> {
        self.iter().collect()
    }

    pub fn iter(&self) -> Iter<'_, K, V> {
        let mut iter = Iter { stack: Vec::new() };
        iter.push_left(self.root.as_deref());
        iter
    }

    /// In-order walk that only descends where the guards allow it.
    fn walk<'a>(
        &'a self,
        go_left: impl Fn(&Node<K, V>) -> bool,
        go_right: impl Fn(&Node<K, V>) -> bool,
        mut visit: impl FnMut(&'a Node<K, V>),
    ) {
        let mut stack: Vec<&'a Node<K, V>> = Vec::new();
        let mut cur = self.root.as_deref();

        loop {
            while let Some(node) = cur {
                stack.push(node);
                cur = if go_left(node) {
                    node.left.as_deref()
                } else {
                    None
                };
            }
            let Some(node) = stack.pop() else {
                break;
            };
            visit(node);
            cur = if go_right(node) {
                node.right.as_deref()
            } else {
                None
            };
        }
    }
}

impl<K: Interval, V> Drop for IntervalTree<K, V> {
    // Sorted input degrades the tree into a list; dropping it recursively
    // would use one stack frame per entry.
    fn drop(&mut self) {
        let mut stack: Vec<Box<Node<K, V>>> = self.root.take().into_iter().collect();
        while let Some(mut node) = stack.pop() {
            stack.extend(node.left.take());
            stack.extend(node.right.take());
        }
    }
}

impl<K: Interval, V> FromIterator<(K, V)> for IntervalTree<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut tree = Self::new();
        tree.extend(iter);
        tree
    }
}

impl<K: Interval, V> Extend<(K, V)> for IntervalTree<K, V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<K: Interval + std::fmt::Debug, V: std::fmt::Debug> std::fmt::Debug for IntervalTree<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

/// Borrowing in-order iterator over an [`IntervalTree`].
pub struct Iter<'a, K: Interval, V> {
    stack: Vec<&'a Node<K, V>>,
}

impl<'a, K: Interval, V> Iter<'a, K, V> {
    fn push_left(&mut self, mut cur: Option<&'a Node<K, V>>) {
        while let Some(node) = cur {
            self.stack.push(node);
            cur = node.left.as_deref();
        }
    }
}

impl<'a, K: Interval, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.push_left(node.right.as_deref());
        Some((&node.key, &node.value))
    }
}

impl<'a, K: Interval, V> IntoIterator for &'a IntervalTree<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
