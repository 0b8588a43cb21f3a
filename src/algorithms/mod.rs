//! Implementation of search strategies.
//!
//! Every strategy plugs a Frontier and an update rule into the shared search
//! loop in `crate::engine`.

pub mod astar;
pub mod bfs;
pub mod dfs;
pub mod greedy;

use derive_more::Display;
use rustc_hash::FxHashMap;

use crate::cost::Cost;
use crate::data_structures::lazy_heap::LazyHeap;
use crate::engine::SearchConfig;
use crate::environment::Environment;
use crate::environment::State;
use crate::result::SearchResult;

/// The values an informed search keeps for each State it reached.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct NodeValues<C>
where
    C: Cost,
{
    /// Ranking value. `g + h` for A*, `h` for greedy search.
    pub f: C,
    /// Best known cost from the start.
    pub g: C,
    /// Heuristic estimate to the goal.
    pub h: C,
}

impl<C> NodeValues<C>
where
    C: Cost,
{
    pub fn new(f: C, g: C, h: C) -> Self {
        Self { f, g, h }
    }
    /// Values for strategies that never look at costs.
    pub fn unranked() -> Self {
        Self::new(C::zero(), C::zero(), C::zero())
    }
}

/// What a Frontier orders its entries by.
#[derive(Copy, Clone, Debug, Display, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Priority<C>
where
    C: Cost,
{
    /// Pure insertion order (queues and stacks).
    #[display("-")]
    Order,
    #[display("h={h}")]
    Heuristic { h: C },
    #[display("f={f} (g={g}, h={h})")]
    Estimate { f: C, g: C, h: C },
}

/// A State waiting in a Frontier, with the key it's ranked by.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct FrontierEntry<St, C>
where
    St: State,
    C: Cost,
{
    pub state: St,
    pub priority: Priority<C>,
}

/// Discovered States waiting to be expanded.
pub trait Frontier<St, C>: std::fmt::Debug + Default
where
    St: State,
    C: Cost,
{
    /// Inserts `s`, replacing any entry it already had.
    fn push(&mut self, s: St, values: NodeValues<C>);
    /// Removes the next State to expand.
    fn pop(&mut self) -> Option<St>;
    fn contains(&self, s: &St) -> bool;
    fn len(&self) -> usize;
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The key entries with these values are ranked by.
    fn priority(values: &NodeValues<C>) -> Priority<C>;

    /// Current entries, in the order they would be popped.
    fn snapshot(&self) -> Vec<FrontierEntry<St, C>>;

    /// Checks internal invariants. Only does work with the "verify" feature.
    fn verify(&self) {}
}

/// How a heap-backed Frontier ranks its entries. Lower ranks pop first.
pub trait Rank<C>: Copy + std::fmt::Debug + Ord
where
    C: Cost,
{
    fn new(values: &NodeValues<C>) -> Self;
    fn priority(values: &NodeValues<C>) -> Priority<C>;
}

/// A priority Frontier ordered by `R`, ties broken by insertion order.
///
/// Pushing a State already in the Frontier replaces its entry, the old one
/// can never be popped.
#[derive(Debug)]
pub struct HeapFrontier<St, C, R>
where
    St: State,
    C: Cost,
    R: Rank<C>,
{
    heap: LazyHeap<St, R>,
    /// Values of the live entries, to describe them in snapshots.
    values: FxHashMap<St, NodeValues<C>>,
}

impl<St, C, R> Default for HeapFrontier<St, C, R>
where
    St: State,
    C: Cost,
    R: Rank<C>,
{
    fn default() -> Self {
        Self {
            heap: LazyHeap::new(),
            values: FxHashMap::default(),
        }
    }
}

impl<St, C, R> Frontier<St, C> for HeapFrontier<St, C, R>
where
    St: State,
    C: Cost,
    R: Rank<C>,
{
    fn push(&mut self, s: St, values: NodeValues<C>) {
        self.heap.push(s, R::new(&values));
        self.values.insert(s, values);
    }

    fn pop(&mut self) -> Option<St> {
        let (s, _rank) = self.heap.pop()?;
        self.values.remove(&s);
        Some(s)
    }

    #[inline(always)]
    fn contains(&self, s: &St) -> bool {
        self.heap.contains(s)
    }

    #[inline(always)]
    fn len(&self) -> usize {
        self.heap.len()
    }

    fn priority(values: &NodeValues<C>) -> Priority<C> {
        R::priority(values)
    }

    fn snapshot(&self) -> Vec<FrontierEntry<St, C>> {
        self.heap
            .sorted()
            .into_iter()
            .filter_map(|(s, _)| {
                self.values.get(&s).map(|v| FrontierEntry {
                    state: s,
                    priority: R::priority(v),
                })
            })
            .collect()
    }

    #[cfg(feature = "verify")]
    fn verify(&self) {
        self.heap.verify();
        debug_assert_eq!(self.heap.len(), self.values.len());
        debug_assert!(self.values.keys().all(|s| self.heap.contains(s)));
    }
}

/// A neighbour the search could reach through the State being expanded.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Candidate<C>
where
    C: Cost,
{
    /// Whether the neighbour is waiting in the Frontier already.
    pub in_frontier: bool,
    /// Cost of reaching the neighbour through the expanded State.
    pub g: C,
    /// Cost recorded the last time the neighbour was reached, if ever.
    pub recorded_g: Option<C>,
}

/// A search strategy.
///
/// Strategies are stateless, all the search state lives in the engine.
pub trait Strategy<St, C>: std::fmt::Debug
where
    St: State,
    C: Cost,
{
    type Frontier: Frontier<St, C>;

    const KIND: StrategyKind;

    /// Informed strategies pay for step costs and heuristics, and skip
    /// neighbours once they are closed (expanded) rather than once visited.
    const INFORMED: bool;

    /// Whether reaching a neighbour again should (re-)insert it.
    fn should_update(candidate: &Candidate<C>) -> bool;

    /// Computes the `f` value ranking a State.
    fn evaluate(g: C, h: C) -> NodeValues<C>;
}

#[derive(Copy, Clone, Debug, Display, PartialEq, Eq, Hash, clap::ValueEnum)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum StrategyKind {
    #[display("BreadthFirstSearch")]
    #[value(name = "bfs")]
    BreadthFirst,
    #[display("DepthFirstSearch")]
    #[value(name = "dfs")]
    DepthFirst,
    #[display("GreedyBestFirstSearch")]
    #[value(name = "greedy")]
    GreedyBestFirst,
    #[display("AStarSearch")]
    #[value(name = "astar")]
    AStar,
}

impl StrategyKind {
    pub const ALL: [StrategyKind; 4] = [
        StrategyKind::BreadthFirst,
        StrategyKind::DepthFirst,
        StrategyKind::GreedyBestFirst,
        StrategyKind::AStar,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            StrategyKind::BreadthFirst => "BreadthFirstSearch",
            StrategyKind::DepthFirst => "DepthFirstSearch",
            StrategyKind::GreedyBestFirst => "GreedyBestFirstSearch",
            StrategyKind::AStar => "AStarSearch",
        }
    }

    pub fn informed(&self) -> bool {
        matches!(self, StrategyKind::GreedyBestFirst | StrategyKind::AStar)
    }

    /// Runs this strategy from `start` to `goal`.
    pub fn run<E, St, C>(
        self,
        env: &E,
        start: St,
        goal: St,
        config: &SearchConfig,
    ) -> SearchResult<St, C>
    where
        E: Environment<St, C>,
        St: State,
        C: Cost,
    {
        use crate::engine::run;

        match self {
            StrategyKind::BreadthFirst => {
                run::<bfs::BreadthFirst, E, St, C>(env, start, goal, config)
            }
            StrategyKind::DepthFirst => run::<dfs::DepthFirst, E, St, C>(env, start, goal, config),
            StrategyKind::GreedyBestFirst => {
                run::<greedy::GreedyBestFirst, E, St, C>(env, start, goal, config)
            }
            StrategyKind::AStar => run::<astar::AStar, E, St, C>(env, start, goal, config),
        }
    }

    /// Runs this strategy on the Environment's own start and goal.
    pub fn solve<E, St, C>(self, env: &E, config: &SearchConfig) -> SearchResult<St, C>
    where
        E: Environment<St, C>,
        St: State,
        C: Cost,
    {
        let config = config.clone().or_step_limit(env.step_limit());
        self.run(env, env.start(), env.goal(), &config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_match_display() {
        for kind in StrategyKind::ALL {
            assert_eq!(kind.name(), kind.to_string());
        }
    }

    #[test]
    fn informed_strategies() {
        assert!(!StrategyKind::BreadthFirst.informed());
        assert!(!StrategyKind::DepthFirst.informed());
        assert!(StrategyKind::GreedyBestFirst.informed());
        assert!(StrategyKind::AStar.informed());
    }

    #[test]
    fn priorities_display() {
        assert_eq!(Priority::<u32>::Order.to_string(), "-");
        assert_eq!(Priority::Heuristic { h: 3u32 }.to_string(), "h=3");
        assert_eq!(
            Priority::Estimate { f: 5u32, g: 2, h: 3 }.to_string(),
            "f=5 (g=2, h=3)"
        );
    }
}
