//! Greedy Best-First Search.
//!
//! Always expands the State that looks closest to the goal, ignoring how much
//! it cost to get there. Closed States are never reopened, even when a cheaper
//! path to them shows up later.

use crate::algorithms::Candidate;
use crate::algorithms::HeapFrontier;
use crate::algorithms::NodeValues;
use crate::algorithms::Priority;
use crate::algorithms::Rank;
use crate::algorithms::Strategy;
use crate::algorithms::StrategyKind;
use crate::cost::Cost;
use crate::environment::State;

/// The ranking value for Greedy Best-First Search
///
/// We prefer lower h-values. `g` is tracked by the search, but never ranks.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct GreedyRank<C: Cost> {
    h: C,
}

impl<C> GreedyRank<C>
where
    C: Cost,
{
    pub fn h(&self) -> C {
        self.h
    }
}

impl<C> Rank<C> for GreedyRank<C>
where
    C: Cost,
{
    #[inline(always)]
    fn new(values: &NodeValues<C>) -> Self {
        Self { h: values.h }
    }

    fn priority(values: &NodeValues<C>) -> Priority<C> {
        Priority::Heuristic { h: values.h }
    }
}

pub type GreedyFrontier<St, C> = HeapFrontier<St, C, GreedyRank<C>>;

#[derive(Copy, Clone, Debug, Default)]
pub struct GreedyBestFirst;

impl<St, C> Strategy<St, C> for GreedyBestFirst
where
    St: State,
    C: Cost,
{
    type Frontier = GreedyFrontier<St, C>;

    const KIND: StrategyKind = StrategyKind::GreedyBestFirst;
    const INFORMED: bool = true;

    /// The first discovery wins while the State waits in the Frontier.
    #[inline(always)]
    fn should_update(candidate: &Candidate<C>) -> bool {
        !candidate.in_frontier
    }

    #[inline(always)]
    fn evaluate(g: C, h: C) -> NodeValues<C> {
        NodeValues::new(h, g, h)
    }
}
