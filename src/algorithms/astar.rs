//! A* Search.
//!
//! Expands States by their estimated total cost `f = g + h`. With an
//! admissible heuristic the first path popped to the goal is optimal.
//! Admissibility is up to the Environment, it isn't checked here.

use crate::algorithms::Candidate;
use crate::algorithms::HeapFrontier;
use crate::algorithms::NodeValues;
use crate::algorithms::Priority;
use crate::algorithms::Rank;
use crate::algorithms::Strategy;
use crate::algorithms::StrategyKind;
use crate::cost::Cost;
use crate::environment::State;

/// The ranking tuple for A*
///
/// We prefer better f-values, and tie break for lower h.
///
/// Among equal f-values a lower h is a higher g, so ties go to the deepest
/// State. Keeping the raw h value helps to avoid recomputing it later.
///
/// ```
/// use maze_search::algorithms::NodeValues;
/// use maze_search::algorithms::Rank;
/// use maze_search::algorithms::astar::AStarRank;
///
/// let deep = AStarRank::<u32>::new(&NodeValues::new(4, 3, 1));
/// let shallow = AStarRank::<u32>::new(&NodeValues::new(4, 1, 3));
/// assert!(deep < shallow);
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct AStarRank<C: Cost> {
    f: C,
    h: C,
}

impl<C> AStarRank<C>
where
    C: Cost,
{
    pub fn f(&self) -> C {
        self.f
    }
    pub fn h(&self) -> C {
        self.h
    }
}

impl<C> Rank<C> for AStarRank<C>
where
    C: Cost,
{
    #[inline(always)]
    fn new(values: &NodeValues<C>) -> Self {
        Self {
            f: values.f,
            h: values.h,
        }
    }

    fn priority(values: &NodeValues<C>) -> Priority<C> {
        Priority::Estimate {
            f: values.f,
            g: values.g,
            h: values.h,
        }
    }
}

pub type AStarFrontier<St, C> = HeapFrontier<St, C, AStarRank<C>>;

#[derive(Copy, Clone, Debug, Default)]
pub struct AStar;

impl<St, C> Strategy<St, C> for AStar
where
    St: State,
    C: Cost,
{
    type Frontier = AStarFrontier<St, C>;

    const KIND: StrategyKind = StrategyKind::AStar;
    const INFORMED: bool = true;

    /// New States, or open States reached through a strictly cheaper path.
    #[inline(always)]
    fn should_update(candidate: &Candidate<C>) -> bool {
        if !candidate.in_frontier {
            return true;
        }
        match candidate.recorded_g {
            Some(recorded_g) => candidate.g < recorded_g,
            None => true,
        }
    }

    #[inline(always)]
    fn evaluate(g: C, h: C) -> NodeValues<C> {
        NodeValues::new(g.saturating_add(&h), g, h)
    }
}
