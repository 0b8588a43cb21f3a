//! Breadth-First Search.
//!
//! Expands States in the order they were discovered, so on uniform-cost
//! Environments paths have the fewest possible moves. Step costs are never
//! consulted, with non-uniform costs paths are still hop-optimal only.

use std::collections::VecDeque;

use rustc_hash::FxHashSet;

use crate::algorithms::Candidate;
use crate::algorithms::Frontier;
use crate::algorithms::FrontierEntry;
use crate::algorithms::NodeValues;
use crate::algorithms::Priority;
use crate::algorithms::Strategy;
use crate::algorithms::StrategyKind;
use crate::cost::Cost;
use crate::environment::State;

/// A FIFO queue of States.
///
/// Pushing a State that's already queued keeps its place.
#[derive(Debug)]
pub struct QueueFrontier<St>
where
    St: State,
{
    queue: VecDeque<St>,
    members: FxHashSet<St>,
}

impl<St> Default for QueueFrontier<St>
where
    St: State,
{
    fn default() -> Self {
        Self {
            queue: VecDeque::with_capacity(64),
            members: FxHashSet::default(),
        }
    }
}

impl<St, C> Frontier<St, C> for QueueFrontier<St>
where
    St: State,
    C: Cost,
{
    fn push(&mut self, s: St, _values: NodeValues<C>) {
        if self.members.insert(s) {
            self.queue.push_back(s);
        }
        <Self as Frontier<St, C>>::verify(self);
    }

    fn pop(&mut self) -> Option<St> {
        let s = self.queue.pop_front()?;
        self.members.remove(&s);
        Some(s)
    }

    #[inline(always)]
    fn contains(&self, s: &St) -> bool {
        self.members.contains(s)
    }

    #[inline(always)]
    fn len(&self) -> usize {
        self.queue.len()
    }

    fn priority(_values: &NodeValues<C>) -> Priority<C> {
        Priority::Order
    }

    fn snapshot(&self) -> Vec<FrontierEntry<St, C>> {
        self.queue
            .iter()
            .map(|s| FrontierEntry {
                state: *s,
                priority: Priority::Order,
            })
            .collect()
    }

    #[cfg(feature = "verify")]
    fn verify(&self) {
        debug_assert_eq!(self.queue.len(), self.members.len());
        debug_assert!(self.queue.iter().all(|s| self.members.contains(s)));
    }
}

#[derive(Copy, Clone, Debug, Default)]
pub struct BreadthFirst;

impl<St, C> Strategy<St, C> for BreadthFirst
where
    St: State,
    C: Cost,
{
    type Frontier = QueueFrontier<St>;

    const KIND: StrategyKind = StrategyKind::BreadthFirst;
    const INFORMED: bool = false;

    /// Visited neighbours are skipped before asking, so the first discovery
    /// always wins.
    #[inline(always)]
    fn should_update(_candidate: &Candidate<C>) -> bool {
        true
    }

    fn evaluate(_g: C, _h: C) -> NodeValues<C> {
        NodeValues::unranked()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn queue_is_fifo() {
        let mut q = QueueFrontier::<i32>::default();
        for s in [4, 2, 7] {
            Frontier::<i32, u32>::push(&mut q, s, NodeValues::unranked());
        }
        assert!(Frontier::<i32, u32>::contains(&q, &2));
        assert_eq!(
            Frontier::<i32, u32>::snapshot(&q)
                .iter()
                .map(|e| e.state)
                .collect::<Vec<_>>(),
            vec![4, 2, 7]
        );
        assert_eq!(Frontier::<i32, u32>::pop(&mut q), Some(4));
        assert_eq!(Frontier::<i32, u32>::pop(&mut q), Some(2));
        assert!(!Frontier::<i32, u32>::contains(&q, &2));
        assert_eq!(Frontier::<i32, u32>::len(&q), 1);
    }

    #[test]
    fn queue_ignores_duplicates() {
        let mut q = QueueFrontier::<i32>::default();
        Frontier::<i32, u32>::push(&mut q, 1, NodeValues::unranked());
        Frontier::<i32, u32>::push(&mut q, 1, NodeValues::unranked());
        assert_eq!(Frontier::<i32, u32>::len(&q), 1);
    }
}
