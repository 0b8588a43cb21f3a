use rustc_hash::FxHashMap;
use rustc_hash::FxHashSet;

use crate::algorithms::Frontier;
use crate::algorithms::NodeValues;
use crate::cost::Cost;
use crate::environment::Path;
use crate::environment::State;

/// Bookkeeping of a single search.
///
/// Owned by exactly one search for its whole lifetime.
#[derive(Debug)]
pub(crate) struct SearchState<St, C, F>
where
    St: State,
    C: Cost,
    F: Frontier<St, C>,
{
    pub(crate) frontier: F,

    /// Cells that are skipped when reached again. Closed (expanded) cells for
    /// informed strategies, visited (discovered) cells for uninformed ones.
    marked: FxHashSet<St>,
    /// `marked`, in insertion order.
    marked_order: Vec<St>,

    /// Where each cell was reached from. The start has no entry.
    parent: FxHashMap<St, St>,
    /// Last values recorded for each cell. Informed strategies only.
    values: FxHashMap<St, NodeValues<C>>,

    discovered_at: FxHashMap<St, usize>,
    /// Cells by discovery order.
    discovery_order: Vec<St>,
    expanded_at: FxHashMap<St, usize>,

    pub(crate) steps: usize,
}

impl<St, C, F> SearchState<St, C, F>
where
    St: State,
    C: Cost,
    F: Frontier<St, C>,
{
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            frontier: F::default(),
            marked: FxHashSet::default(),
            marked_order: Vec::with_capacity(256),
            parent: FxHashMap::default(),
            values: FxHashMap::default(),
            discovered_at: FxHashMap::default(),
            discovery_order: Vec::with_capacity(256),
            expanded_at: FxHashMap::default(),
            steps: 0usize,
        }
    }

    #[inline(always)]
    pub(crate) fn is_marked(&self, s: &St) -> bool {
        self.marked.contains(s)
    }
    #[inline(always)]
    pub(crate) fn mark(&mut self, s: St) {
        if self.marked.insert(s) {
            self.marked_order.push(s);
        }
    }
    pub(crate) fn marked(&self) -> &[St] {
        &self.marked_order
    }

    /// Records the first time `s` is reached. Later calls are ignored.
    pub(crate) fn discover(&mut self, s: St, step: usize) {
        if !self.discovered_at.contains_key(&s) {
            self.discovered_at.insert(s, step);
            self.discovery_order.push(s);
        }
    }

    pub(crate) fn expand(&mut self, s: St, step: usize) {
        debug_assert!(
            self.discovered_at.contains_key(&s),
            "Expanding {s:?}, which was never discovered"
        );
        let previous = self.expanded_at.insert(s, step);
        debug_assert!(previous.is_none(), "{s:?} was expanded twice");
    }

    /// Points `s` back to `parent`, overwriting any previous parent.
    pub(crate) fn reach(&mut self, s: St, parent: St) {
        debug_assert!(s != parent);
        self.parent.insert(s, parent);
    }

    pub(crate) fn record_values(&mut self, s: St, values: NodeValues<C>) {
        self.values.insert(s, values);
    }
    pub(crate) fn values(&self, s: &St) -> Option<NodeValues<C>> {
        self.values.get(s).copied()
    }
    #[inline(always)]
    pub(crate) fn g(&self, s: &St) -> Option<C> {
        self.values.get(s).map(|v| v.g)
    }

    /// Follows parents from `end` back to the start.
    #[must_use]
    pub(crate) fn path(&self, end: St) -> Path<St> {
        let mut path = Path::new_from_start(end);
        let mut s = end;
        while let Some(p) = self.parent.get(&s) {
            debug_assert!(
                !path.contains(p),
                "Parent pointers loop around {p:?}"
            );
            path.append(*p);
            s = *p;
            if path.len() > self.parent.len() + 1 {
                // Unreachable while parents stay acyclic.
                break;
            }
        }
        path.reverse();
        path
    }

    pub(crate) fn into_parts(self) -> SearchParts<St, C> {
        SearchParts {
            visited: self.discovery_order,
            discovered_at: self.discovered_at,
            expanded_at: self.expanded_at,
            values: self.values,
            steps: self.steps,
        }
    }

    #[inline(always)]
    #[cfg(not(feature = "verify"))]
    pub(crate) fn verify(&self, _start: &St) {
        // All good... (hopefully)
    }
    #[cfg(feature = "verify")]
    pub(crate) fn verify(&self, start: &St) {
        self.frontier.verify();
        debug_assert_eq!(self.discovered_at.get(start), Some(&0usize));
        debug_assert!(!self.parent.contains_key(start));
        for (s, expanded) in &self.expanded_at {
            let discovered = self.discovered_at.get(s);
            debug_assert!(
                discovered.is_some_and(|d| d <= expanded),
                "{s:?} expanded at {expanded} but discovered at {discovered:?}"
            );
            debug_assert!(*expanded <= self.steps);
        }
        for s in self.parent.keys() {
            debug_assert_eq!(self.path(*s).start(), Some(start));
        }
    }
}

/// What a finished search hands over to its result.
#[derive(Debug)]
pub(crate) struct SearchParts<St, C>
where
    St: State,
    C: Cost,
{
    pub(crate) visited: Vec<St>,
    pub(crate) discovered_at: FxHashMap<St, usize>,
    pub(crate) expanded_at: FxHashMap<St, usize>,
    pub(crate) values: FxHashMap<St, NodeValues<C>>,
    pub(crate) steps: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::bfs::QueueFrontier;

    type TestState = SearchState<i32, u32, QueueFrontier<i32>>;

    #[test]
    fn paths_follow_parents() {
        let mut state = TestState::new();
        state.discover(0, 0);
        for (s, p) in [(1, 0), (2, 1), (3, 2), (7, 1)] {
            state.discover(s, 1);
            state.reach(s, p);
        }
        assert_eq!(state.path(3).as_slice(), &[0, 1, 2, 3]);
        assert_eq!(state.path(7).as_slice(), &[0, 1, 7]);
        assert_eq!(state.path(0).as_slice(), &[0]);
    }

    #[test]
    fn discovery_is_first_write_wins() {
        let mut state = TestState::new();
        state.discover(0, 0);
        state.discover(5, 2);
        state.discover(5, 4);
        state.discover(0, 9);

        let parts = state.into_parts();
        assert_eq!(parts.discovered_at.get(&5), Some(&2));
        assert_eq!(parts.discovered_at.get(&0), Some(&0));
        assert_eq!(parts.visited, vec![0, 5]);
    }

    #[test]
    fn marks_keep_insertion_order() {
        let mut state = TestState::new();
        for s in [3, 1, 3, 2] {
            state.mark(s);
        }
        assert_eq!(state.marked(), &[3, 1, 2]);
        assert!(state.is_marked(&1));
        assert!(!state.is_marked(&4));
    }

    #[test]
    fn overwritten_parent() {
        let mut state = TestState::new();
        state.discover(0, 0);
        state.reach(1, 0);
        state.reach(2, 0);
        state.reach(2, 1);
        assert_eq!(state.path(2).as_slice(), &[0, 1, 2]);
    }
}
