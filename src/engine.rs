//! The search loop shared by every strategy.

use std::panic;
use std::panic::AssertUnwindSafe;
use std::time::Instant;

use log::debug;
use log::trace;
use log::warn;

use crate::algorithms::Candidate;
use crate::algorithms::Frontier;
use crate::algorithms::FrontierEntry;
use crate::algorithms::NodeValues;
use crate::algorithms::Strategy;
use crate::algorithms::StrategyKind;
use crate::cost::Cost;
use crate::environment::Environment;
use crate::environment::Path;
use crate::environment::State;
use crate::error::EnvironmentError;
use crate::result::SearchResult;
use crate::result::Termination;
use crate::search::SearchParts;
use crate::search::SearchState;
use crate::trace::Trace;
use crate::trace::TraceRecorder;
use crate::trace::TraceStep;

/// Knobs of a single search.
///
/// ```
/// use maze_search::engine::SearchConfig;
///
/// let config = SearchConfig::default().with_step_limit(100).with_trace(false);
/// assert_eq!(config.step_limit(), Some(100));
/// assert_eq!(SearchConfig::default().with_step_limit(0).step_limit(), None);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchConfig {
    /// Maximum number of expansions. `None` or `Some(0)` means unbounded.
    pub step_limit: Option<usize>,
    /// Whether to record a `TraceStep` per expansion.
    pub trace: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            step_limit: None,
            trace: true,
        }
    }
}

impl SearchConfig {
    #[must_use]
    pub fn with_step_limit(mut self, limit: usize) -> Self {
        self.step_limit = Some(limit);
        self
    }

    #[must_use]
    pub fn with_trace(mut self, trace: bool) -> Self {
        self.trace = trace;
        self
    }

    /// Falls back to `limit` when no limit was set.
    #[must_use]
    pub fn or_step_limit(mut self, limit: Option<usize>) -> Self {
        if self.step_limit().is_none() {
            self.step_limit = limit;
        }
        self
    }

    /// The effective step limit, zero meaning unbounded.
    pub fn step_limit(&self) -> Option<usize> {
        self.step_limit.filter(|l| *l > 0)
    }
}

/// Searches `env` from `start` to `goal` with the strategy `S`.
///
/// Never fails. Not finding the goal is a normal unsuccessful result, and
/// faults from the Environment (errors or panics inside its callbacks) become
/// an unsuccessful result with no steps that carries the fault.
pub fn run<S, E, St, C>(env: &E, start: St, goal: St, config: &SearchConfig) -> SearchResult<St, C>
where
    S: Strategy<St, C>,
    E: Environment<St, C>,
    St: State,
    C: Cost,
{
    debug!(
        "{}: searching {start:?} -> {goal:?} (step limit: {:?}, trace: {})",
        S::KIND,
        config.step_limit(),
        config.trace
    );

    let timer = Instant::now();
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        search::<S, E, St, C>(env, start, goal, config)
    }));
    let elapsed = timer.elapsed();

    let result = match outcome {
        Ok(Ok(outcome)) => SearchResult::finished(
            S::KIND,
            outcome.termination,
            outcome.path,
            outcome.parts,
            outcome.trace,
            elapsed,
        ),
        Ok(Err(fault)) => {
            warn!("{}: aborted by the environment: {fault}", S::KIND);
            SearchResult::faulted(S::KIND, fault, elapsed)
        }
        Err(payload) => {
            let fault = EnvironmentError::from_panic(payload);
            warn!("{}: aborted by the environment: {fault}", S::KIND);
            SearchResult::faulted(S::KIND, fault, elapsed)
        }
    };

    debug!(
        "{}: {} after {} steps, {} visited, in {:?}",
        S::KIND,
        result.termination(),
        result.steps(),
        result.visited_count(),
        elapsed
    );
    result
}

/// Runs every strategy on the Environment's own problem, in
/// `StrategyKind::ALL` order.
pub fn compare<E, St, C>(env: &E, config: &SearchConfig) -> Vec<SearchResult<St, C>>
where
    E: Environment<St, C>,
    St: State,
    C: Cost,
{
    StrategyKind::ALL
        .iter()
        .map(|kind| kind.solve(env, config))
        .collect()
}

/// What a search that wasn't aborted produced.
struct Outcome<St, C>
where
    St: State,
    C: Cost,
{
    termination: Termination,
    path: Option<Path<St>>,
    parts: SearchParts<St, C>,
    trace: Trace<St, C>,
}

fn search<S, E, St, C>(
    env: &E,
    start: St,
    goal: St,
    config: &SearchConfig,
) -> Result<Outcome<St, C>, EnvironmentError>
where
    S: Strategy<St, C>,
    E: Environment<St, C>,
    St: State,
    C: Cost,
{
    let mut state = SearchState::<St, C, S::Frontier>::new();
    let mut recorder = TraceRecorder::<St, C>::new(config.trace);
    let step_limit = config.step_limit();

    state.discover(start, 0);
    let start_values = if S::INFORMED {
        let values = S::evaluate(C::zero(), heuristic(env, &start, &goal)?);
        state.record_values(start, values);
        values
    } else {
        state.mark(start);
        NodeValues::unranked()
    };
    state.frontier.push(start, start_values);

    let termination = loop {
        if state.frontier.is_empty() {
            break Termination::FrontierExhausted;
        }
        if step_limit.is_some_and(|limit| state.steps >= limit) {
            break Termination::StepLimitReached;
        }
        let frontier_before = recorder.capture(|| state.frontier.snapshot());
        let Some(current) = state.frontier.pop() else {
            break Termination::FrontierExhausted;
        };
        state.steps += 1;
        let step = state.steps;
        state.expand(current, step);
        if S::INFORMED {
            state.mark(current);
        }
        trace!("{}: step {step}, expanding {current:?}", S::KIND);

        let mut inserted = Vec::new();
        if current != goal {
            for n in env.neighbours(&current)? {
                if state.is_marked(&n) {
                    continue;
                }
                let g = if S::INFORMED {
                    state
                        .g(&current)
                        .unwrap_or_else(C::zero)
                        .saturating_add(&step_cost(env, &current, &n)?)
                } else {
                    C::zero()
                };
                let candidate = Candidate {
                    in_frontier: state.frontier.contains(&n),
                    g,
                    recorded_g: state.g(&n),
                };
                if !S::should_update(&candidate) {
                    continue;
                }
                // Rejected candidates never ask for an estimate.
                let values = if S::INFORMED {
                    S::evaluate(g, heuristic(env, &n, &goal)?)
                } else {
                    NodeValues::unranked()
                };

                state.reach(n, current);
                state.discover(n, step);
                if S::INFORMED {
                    state.record_values(n, values);
                } else {
                    state.mark(n);
                }
                state.frontier.push(n, values);
                if recorder.enabled() {
                    inserted.push(FrontierEntry {
                        state: n,
                        priority: <S::Frontier as Frontier<St, C>>::priority(&values),
                    });
                }
            }
        }

        recorder.record(|| TraceStep {
            step,
            expanded: current,
            expanded_values: state.values(&current),
            inserted,
            frontier_before: frontier_before.unwrap_or_default(),
            frontier_after: state.frontier.snapshot(),
            partial_path: state.path(current),
            closed: state.marked().to_vec(),
        });

        if current == goal {
            break Termination::GoalFound;
        }
    };

    state.verify(&start);
    let path = (termination == Termination::GoalFound).then(|| state.path(goal));
    Ok(Outcome {
        termination,
        path,
        parts: state.into_parts(),
        trace: recorder.finish(),
    })
}

fn step_cost<E, St, C>(env: &E, from: &St, to: &St) -> Result<C, EnvironmentError>
where
    E: Environment<St, C>,
    St: State,
    C: Cost,
{
    let cost = env.step_cost(from, to)?;
    if !cost.valid_step() {
        return Err(EnvironmentError::InvalidStepCost {
            from: format!("{from:?}"),
            to: format!("{to:?}"),
            cost: cost.to_string(),
        });
    }
    Ok(cost)
}

fn heuristic<E, St, C>(env: &E, s: &St, goal: &St) -> Result<C, EnvironmentError>
where
    E: Environment<St, C>,
    St: State,
    C: Cost,
{
    let h = env.heuristic(s, goal)?;
    if !h.valid() {
        return Err(EnvironmentError::InvalidHeuristic {
            cell: format!("{s:?}"),
            h: h.to_string(),
        });
    }
    Ok(h)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::astar::AStar;
    use crate::algorithms::bfs::BreadthFirst;
    use crate::algorithms::dfs::DepthFirst;
    use crate::algorithms::Priority;
    use crate::algorithms::greedy::GreedyBestFirst;
    use crate::environment::Neighbours;

    /// A line 0 - 1 - ... - 9 where stepping right costs `right` and
    /// stepping left costs 1.
    #[derive(Debug)]
    struct Line {
        right: u32,
    }

    impl Environment<i32, u32> for Line {
        fn neighbours(&self, s: &i32) -> Result<Neighbours<i32>, EnvironmentError> {
            Ok([s - 1, s + 1]
                .into_iter()
                .filter(|n| (0..10).contains(n))
                .collect())
        }
        fn step_cost(&self, from: &i32, to: &i32) -> Result<u32, EnvironmentError> {
            Ok(if to > from { self.right } else { 1 })
        }
        fn heuristic(&self, s: &i32, goal: &i32) -> Result<u32, EnvironmentError> {
            Ok(s.abs_diff(*goal))
        }
        fn start(&self) -> i32 {
            0
        }
        fn goal(&self) -> i32 {
            9
        }
    }

    const LINE: Line = Line { right: 1 };

    #[test]
    fn every_strategy_walks_the_line() {
        for kind in StrategyKind::ALL {
            let r = kind.solve(&LINE, &SearchConfig::default());
            assert!(r.success(), "{kind}");
            assert_eq!(r.path().map(Path::len), Some(10), "{kind}");
            assert_eq!(r.steps(), 10, "{kind}");
            assert_eq!(r.trace().len(), 10, "{kind}");
            assert_eq!(r.termination(), Termination::GoalFound);
        }
    }

    #[test]
    fn start_is_discovered_at_step_zero() {
        let r = run::<BreadthFirst, _, _, _>(&LINE, 4, 9, &SearchConfig::default());
        assert_eq!(r.discovered_at(&4), Some(0));
        assert_eq!(r.expanded_at(&4), Some(1));
        assert_eq!(r.discovered_at(&3), Some(1));
        assert_eq!(r.discovered_at(&5), Some(1));
        assert_eq!(r.visited()[0], 4);
    }

    #[test]
    fn start_is_goal() {
        for kind in StrategyKind::ALL {
            let r = kind.run(&LINE, 3, 3, &SearchConfig::default().with_step_limit(1));
            assert!(r.success());
            assert_eq!(r.steps(), 1);
            assert_eq!(r.path().map(Path::as_slice), Some(&[3][..]));
            assert_eq!(r.trace().len(), 1);
            assert!(r.trace()[0].inserted.is_empty());
        }
    }

    #[test]
    fn step_limit() {
        for kind in StrategyKind::ALL {
            let r = kind.run(&LINE, 0, 9, &SearchConfig::default().with_step_limit(3));
            assert!(!r.success());
            assert_eq!(r.steps(), 3);
            assert_eq!(r.termination(), Termination::StepLimitReached);
            assert!(r.path().is_none());
        }
    }

    #[test]
    fn frontier_exhausted() {
        for kind in StrategyKind::ALL {
            let r = kind.run(&LINE, 0, 42, &SearchConfig::default());
            assert!(!r.success());
            assert_eq!(r.termination(), Termination::FrontierExhausted);
            assert_eq!(r.visited_count(), 10);
            assert_eq!(r.steps(), 10);
        }
    }

    #[test]
    fn no_trace_when_disabled() {
        let config = SearchConfig::default().with_trace(false);
        for kind in StrategyKind::ALL {
            let r = kind.solve(&LINE, &config);
            assert!(r.success());
            assert!(r.trace().is_empty());
        }
    }

    #[test]
    fn trace_snapshots() {
        let r = run::<DepthFirst, _, _, _>(&LINE, 5, 9, &SearchConfig::default());
        let first = &r.trace()[0];
        assert_eq!(first.step, 1);
        assert_eq!(first.expanded, 5);
        assert_eq!(first.frontier_before.len(), 1);
        assert_eq!(
            first.inserted.iter().map(|e| e.state).collect::<Vec<_>>(),
            vec![4, 6]
        );
        // Stack top first
        assert_eq!(
            first.frontier_after.iter().map(|e| e.state).collect::<Vec<_>>(),
            vec![6, 4]
        );
        assert_eq!(first.closed, vec![5, 4, 6]);
        assert_eq!(first.partial_path.as_slice(), &[5]);
        assert!(first.expanded_values.is_none());
    }

    #[test]
    fn informed_values_are_recorded() {
        let r = run::<AStar, _, _, _>(&LINE, 0, 9, &SearchConfig::default());
        assert_eq!(r.values_of(&0), Some(NodeValues::new(9, 0, 9)));
        assert_eq!(r.values_of(&9), Some(NodeValues::new(9, 9, 0)));
        assert_eq!(r.path_cost(), Some(9));
        assert_eq!(
            r.trace()[0].expanded_values,
            Some(NodeValues::new(9, 0, 9))
        );

        let r = run::<GreedyBestFirst, _, _, _>(&LINE, 0, 9, &SearchConfig::default());
        assert_eq!(r.values_of(&0), Some(NodeValues::new(9, 0, 9)));
        assert_eq!(r.values_of(&3), Some(NodeValues::new(6, 3, 6)));
    }

    /// A small directed graph where the direct edge 0 -> 1 is a trap:
    ///
    /// ```text
    /// 0 -10-> 1 -1-> 3
    /// 0 -1->  2 -1-> 1
    ///         2 -5-> 3
    /// ```
    ///
    /// The heuristic is always 0, and every cell it is asked about is logged.
    #[derive(Debug, Default)]
    struct Detour {
        estimated: std::cell::RefCell<Vec<i32>>,
    }

    impl Environment<i32, u32> for Detour {
        fn neighbours(&self, s: &i32) -> Result<Neighbours<i32>, EnvironmentError> {
            let next: &[i32] = match s {
                0 => &[1, 2],
                1 => &[3],
                2 => &[1, 3],
                _ => &[],
            };
            Ok(next.iter().copied().collect())
        }
        fn step_cost(&self, from: &i32, to: &i32) -> Result<u32, EnvironmentError> {
            match (from, to) {
                (0, 1) => Ok(10),
                (2, 3) => Ok(5),
                (0, 2) | (2, 1) | (1, 3) => Ok(1),
                _ => Err(EnvironmentError::not_adjacent(from, to)),
            }
        }
        fn heuristic(&self, s: &i32, _goal: &i32) -> Result<u32, EnvironmentError> {
            self.estimated.borrow_mut().push(*s);
            Ok(0)
        }
        fn start(&self) -> i32 {
            0
        }
        fn goal(&self) -> i32 {
            3
        }
    }

    #[test]
    fn astar_reopens_cheaper_paths() {
        let r = StrategyKind::AStar.solve(&Detour::default(), &SearchConfig::default());
        assert!(r.success());
        assert_eq!(r.path().map(Path::as_slice), Some(&[0, 2, 1, 3][..]));
        assert_eq!(r.path_cost(), Some(3));
        assert_eq!(r.steps(), 4);

        // Expanding 2 finds a cheaper way into 1 (and 3), and re-keys them.
        let second = &r.trace()[1];
        assert_eq!(second.expanded, 2);
        assert_eq!(
            second.inserted,
            vec![
                FrontierEntry {
                    state: 1,
                    priority: Priority::Estimate { f: 2, g: 2, h: 0 },
                },
                FrontierEntry {
                    state: 3,
                    priority: Priority::Estimate { f: 6, g: 6, h: 0 },
                },
            ]
        );
        // The stale g=10 entry for 1 is gone from the frontier.
        assert_eq!(
            second.frontier_after.iter().map(|e| e.state).collect::<Vec<_>>(),
            vec![1, 3]
        );

        assert_eq!(r.expansion_order(), vec![0, 2, 1, 3]);
        assert_eq!(r.expanded_at(&1), Some(3));
        assert_eq!(r.values_of(&1), Some(NodeValues::new(2, 2, 0)));
        assert_eq!(r.values_of(&3), Some(NodeValues::new(3, 3, 0)));
    }

    #[test]
    fn greedy_never_reopens() {
        let env = Detour::default();
        let r = StrategyKind::GreedyBestFirst.solve(&env, &SearchConfig::default());
        assert!(r.success());
        assert_eq!(r.path().map(Path::as_slice), Some(&[0, 1, 3][..]));
        assert_eq!(r.path_cost(), Some(11));
        assert_eq!(r.expansion_order(), vec![0, 1, 2, 3]);
        assert!(r.trace()[2].inserted.is_empty());

        // 3 is already waiting when 2 reaches it, so it is estimated once.
        assert_eq!(*env.estimated.borrow(), vec![0, 1, 2, 3]);
    }

    #[test]
    fn zero_step_costs_are_faults() {
        let env = Line { right: 0 };
        let r = run::<AStar, _, _, _>(&env, 0, 9, &SearchConfig::default());
        assert!(!r.success());
        assert_eq!(r.steps(), 0);
        assert_eq!(r.termination(), Termination::Fault);
        assert!(matches!(
            r.fault(),
            Some(EnvironmentError::InvalidStepCost { .. })
        ));
        assert!(r.trace().is_empty());

        // Uninformed strategies never ask for costs.
        let r = run::<BreadthFirst, _, _, _>(&env, 0, 9, &SearchConfig::default());
        assert!(r.success());
    }

    #[derive(Debug)]
    struct Panicky;

    impl Environment<i32, u32> for Panicky {
        fn neighbours(&self, s: &i32) -> Result<Neighbours<i32>, EnvironmentError> {
            if *s == 2 {
                panic!("cell 2 is cursed");
            }
            Ok([s + 1].into_iter().collect())
        }
        fn start(&self) -> i32 {
            0
        }
        fn goal(&self) -> i32 {
            5
        }
    }

    #[test]
    fn panics_are_faults() {
        for kind in StrategyKind::ALL {
            let r = kind.solve(&Panicky, &SearchConfig::default());
            assert!(!r.success());
            assert_eq!(r.steps(), 0);
            assert_eq!(
                r.fault(),
                Some(&EnvironmentError::Panicked("cell 2 is cursed".to_string()))
            );
        }
    }

    #[test]
    fn compare_runs_all_strategies() {
        let results = compare(&LINE, &SearchConfig::default().with_trace(false));
        assert_eq!(
            results.iter().map(|r| r.strategy()).collect::<Vec<_>>(),
            StrategyKind::ALL.to_vec()
        );
        assert!(results.iter().all(|r| r.success()));
    }

    #[test]
    fn config_limits() {
        let config = SearchConfig::default();
        assert_eq!(config.step_limit(), None);
        assert!(config.trace);
        assert_eq!(config.clone().or_step_limit(Some(7)).step_limit(), Some(7));
        assert_eq!(
            config.with_step_limit(3).or_step_limit(Some(7)).step_limit(),
            Some(3)
        );
    }
}
