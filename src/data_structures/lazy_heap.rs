use std::cmp::Ordering;
use std::collections::BinaryHeap;

use rustc_hash::FxHashMap;

/// Stale entries allowed in the heap before it gets compacted, relative to
/// the live ones.
const COMPACTION_RATIO: usize = 2usize;
/// Below this many entries compaction isn't worth the rebuild.
const COMPACTION_MIN_LEN: usize = 64usize;

/// A heap entry. Ranked by `(rank, seq)`, lowest first.
#[derive(Debug)]
struct HeapNode<K, R> {
    rank: R,
    /// Insertion sequence number. Breaks rank ties (older first) and tells
    /// live entries from stale ones.
    seq: u64,
    key: K,
}

impl<K, R: Ord> PartialEq for HeapNode<K, R> {
    #[inline(always)]
    fn eq(&self, other: &Self) -> bool {
        self.rank == other.rank && self.seq == other.seq
    }
}
impl<K, R: Ord> Eq for HeapNode<K, R> {}

impl<K, R: Ord> PartialOrd for HeapNode<K, R> {
    #[inline(always)]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
/// Reversed, `BinaryHeap` is a max-heap and we want the lowest rank on top.
impl<K, R: Ord> Ord for HeapNode<K, R> {
    #[inline(always)]
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .rank
            .cmp(&self.rank)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// A min-heap with updatable keys through lazy deletion.
///
/// Re-inserting a key doesn't search for its old entry, it only marks it as
/// stale. Stale entries are skipped when they reach the top, and the heap is
/// rebuilt once they outnumber the live ones.
///
/// Entries with equal rank pop in insertion order. A re-inserted key counts as
/// freshly inserted.
///
/// ```
/// use maze_search::data_structures::lazy_heap::LazyHeap;
///
/// let mut heap = LazyHeap::<char, u32>::new();
/// heap.push('a', 3);
/// heap.push('b', 1);
/// heap.push('a', 0);
/// assert_eq!(heap.pop(), Some(('a', 0)));
/// assert_eq!(heap.pop(), Some(('b', 1)));
/// assert_eq!(heap.pop(), None);
/// ```
#[derive(Debug)]
pub struct LazyHeap<K, R>
where
    K: Copy + Eq + std::hash::Hash,
    R: Copy + Ord,
{
    heap: BinaryHeap<HeapNode<K, R>>,
    /// The live entry of each key, as `(seq, rank)`.
    live: FxHashMap<K, (u64, R)>,
    next_seq: u64,
}

impl<K, R> LazyHeap<K, R>
where
    K: Copy + Eq + std::hash::Hash,
    R: Copy + Ord,
{
    #[must_use]
    pub fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
            live: FxHashMap::default(),
            next_seq: 0u64,
        }
    }

    /// Inserts `key`, invalidating its previous entry if any.
    pub fn push(&mut self, key: K, rank: R) {
        let seq = self.next_seq;
        self.next_seq += 1;

        if self.live.insert(key, (seq, rank)).is_some() {
            self.maybe_compact();
        }
        self.heap.push(HeapNode { rank, seq, key });
        self.verify();
    }

    /// Removes the live entry with the lowest rank.
    pub fn pop(&mut self) -> Option<(K, R)> {
        while let Some(node) = self.heap.pop() {
            match self.live.get(&node.key) {
                Some((seq, _)) if *seq == node.seq => {
                    self.live.remove(&node.key);
                    self.verify();
                    return Some((node.key, node.rank));
                }
                // Stale
                _ => continue,
            }
        }
        debug_assert!(self.live.is_empty());
        None
    }

    #[inline(always)]
    pub fn contains(&self, key: &K) -> bool {
        self.live.contains_key(key)
    }

    pub fn rank(&self, key: &K) -> Option<R> {
        self.live.get(key).map(|(_, r)| *r)
    }

    /// Live entries.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.live.len()
    }
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    /// Entries still in the heap that will be skipped.
    pub fn stale(&self) -> usize {
        self.heap.len() - self.live.len()
    }

    /// Live entries in pop order.
    pub fn sorted(&self) -> Vec<(K, R)> {
        let mut entries: Vec<(u64, R, K)> = self
            .live
            .iter()
            .map(|(k, (seq, r))| (*seq, *r, *k))
            .collect();
        entries.sort_unstable_by(|l, r| l.1.cmp(&r.1).then_with(|| l.0.cmp(&r.0)));
        entries.into_iter().map(|(_, r, k)| (k, r)).collect()
    }

    fn maybe_compact(&mut self) {
        let len = self.heap.len();
        if len < COMPACTION_MIN_LEN || self.stale() <= COMPACTION_RATIO * self.live.len() {
            return;
        }

        let live = &self.live;
        let nodes: Vec<HeapNode<K, R>> = std::mem::take(&mut self.heap)
            .into_vec()
            .into_iter()
            .filter(|n| live.get(&n.key).is_some_and(|(seq, _)| *seq == n.seq))
            .collect();
        self.heap = BinaryHeap::from(nodes);
        log::trace!("Compacted heap from {len} to {} entries", self.heap.len());
    }

    #[inline(always)]
    #[cfg(not(feature = "verify"))]
    pub(crate) fn verify(&self) {
        // All good... (hopefully)
    }
    #[inline(always)]
    #[cfg(feature = "verify")]
    pub(crate) fn verify(&self) {
        // Every live key has exactly one live entry in the heap.
        let mut found = FxHashMap::<K, usize>::default();
        for n in self.heap.iter() {
            if let Some((seq, rank)) = self.live.get(&n.key) {
                if *seq == n.seq {
                    debug_assert!(*rank == n.rank, "Live entry rank out of sync");
                    *found.entry(n.key).or_default() += 1;
                }
            }
        }
        debug_assert_eq!(found.len(), self.live.len(), "Live keys missing from the heap");
        debug_assert!(found.values().all(|c| *c == 1), "Duplicated live entries");
    }
}

impl<K, R> Default for LazyHeap<K, R>
where
    K: Copy + Eq + std::hash::Hash,
    R: Copy + Ord,
{
    #[inline(always)]
    fn default() -> Self {
        Self::new()
    }
}
