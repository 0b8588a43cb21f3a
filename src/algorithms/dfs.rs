//! Depth-First Search.
//!
//! Dives through the most recently discovered State first. No optimality
//! guarantee, the path found depends entirely on the neighbour order.

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

/// A LIFO stack of States.
///
/// Pushing a State that's already stacked keeps its place.
#[derive(Debug)]
pub struct StackFrontier<St>
where
    St: State,
{
    stack: Vec<St>,
    members: FxHashSet<St>,
}

impl<St> Default for StackFrontier<St>
where
    St: State,
{
    fn default() -> Self {
        Self {
            stack: Vec::with_capacity(64),
            members: FxHashSet::default(),
        }
    }
}

impl<St, C> Frontier<St, C> for StackFrontier<St>
where
    St: State,
    C: Cost,
{
    fn push(&mut self, s: St, _values: NodeValues<C>) {
        if self.members.insert(s) {
            self.stack.push(s);
        }
    }

    fn pop(&mut self) -> Option<St> {
        let s = self.stack.pop()?;
        self.members.remove(&s);
        Some(s)
    }

    #[inline(always)]
    fn contains(&self, s: &St) -> bool {
        self.members.contains(s)
    }

    #[inline(always)]
    fn len(&self) -> usize {
        self.stack.len()
    }

    fn priority(_values: &NodeValues<C>) -> Priority<C> {
        Priority::Order
    }

    /// Top of the stack first.
    fn snapshot(&self) -> Vec<FrontierEntry<St, C>> {
        self.stack
            .iter()
            .rev()
            .map(|s| FrontierEntry {
                state: *s,
                priority: Priority::Order,
            })
            .collect()
    }

    #[cfg(feature = "verify")]
    fn verify(&self) {
        debug_assert_eq!(self.stack.len(), self.members.len());
    }
}

#[derive(Copy, Clone, Debug, Default)]
pub struct DepthFirst;

impl<St, C> Strategy<St, C> for DepthFirst
where
    St: State,
    C: Cost,
{
    type Frontier = StackFrontier<St>;

    const KIND: StrategyKind = StrategyKind::DepthFirst;
    const INFORMED: bool = false;

    #[inline(always)]
    fn should_update(_candidate: &Candidate<C>) -> bool {
        true
    }

    fn evaluate(_g: C, _h: C) -> NodeValues<C> {
        NodeValues::unranked()
    }
}
