//! The outcome of a search, and statistics derived from it.

use std::time::Duration;

use derive_more::Display;
use rustc_hash::FxHashMap;

use crate::algorithms::NodeValues;
use crate::algorithms::StrategyKind;
use crate::cost::Cost;
use crate::environment::Path;
use crate::environment::State;
use crate::error::EnvironmentError;
use crate::search::SearchParts;
use crate::trace::Trace;

/// Why a search stopped.
#[derive(Copy, Clone, Debug, Display, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Termination {
    #[display("goal found")]
    GoalFound,
    /// Every reachable cell was expanded without finding the goal.
    #[display("frontier exhausted")]
    FrontierExhausted,
    #[display("step limit reached")]
    StepLimitReached,
    /// The Environment failed, see `SearchResult::fault`.
    #[display("environment fault")]
    Fault,
}

/// Last f/g/h values recorded per cell by an informed strategy.
pub type InformedValues<St, C> = FxHashMap<St, NodeValues<C>>;

/// Immutable record of a finished search.
#[derive(Clone, Debug, PartialEq)]
pub struct SearchResult<St, C>
where
    St: State,
    C: Cost,
{
    strategy: StrategyKind,
    path: Option<Path<St>>,
    visited: Vec<St>,
    success: bool,
    steps: usize,
    duration: Duration,
    trace: Trace<St, C>,
    discovered_at: FxHashMap<St, usize>,
    expanded_at: FxHashMap<St, usize>,
    informed: Option<InformedValues<St, C>>,
    termination: Termination,
    fault: Option<EnvironmentError>,
}

impl<St, C> SearchResult<St, C>
where
    St: State,
    C: Cost,
{
    pub(crate) fn finished(
        strategy: StrategyKind,
        termination: Termination,
        path: Option<Path<St>>,
        parts: SearchParts<St, C>,
        trace: Trace<St, C>,
        duration: Duration,
    ) -> Self {
        debug_assert_eq!(path.is_some(), termination == Termination::GoalFound);
        Self {
            strategy,
            success: path.is_some(),
            path,
            visited: parts.visited,
            steps: parts.steps,
            duration,
            trace,
            discovered_at: parts.discovered_at,
            expanded_at: parts.expanded_at,
            informed: strategy.informed().then_some(parts.values),
            termination,
            fault: None,
        }
    }

    /// A failed result for a search the Environment broke.
    pub(crate) fn faulted(
        strategy: StrategyKind,
        fault: EnvironmentError,
        duration: Duration,
    ) -> Self {
        Self {
            strategy,
            path: None,
            visited: vec![],
            success: false,
            steps: 0,
            duration,
            trace: Trace::empty(),
            discovered_at: FxHashMap::default(),
            expanded_at: FxHashMap::default(),
            informed: None,
            termination: Termination::Fault,
            fault: Some(fault),
        }
    }

    pub fn strategy(&self) -> StrategyKind {
        self.strategy
    }
    pub fn name(&self) -> &'static str {
        self.strategy.name()
    }
    pub fn path(&self) -> Option<&Path<St>> {
        self.path.as_ref()
    }
    /// Every discovered cell, in discovery order.
    pub fn visited(&self) -> &[St] {
        &self.visited
    }
    pub fn success(&self) -> bool {
        self.success
    }
    pub fn steps(&self) -> usize {
        self.steps
    }
    pub fn duration(&self) -> Duration {
        self.duration
    }
    pub fn trace(&self) -> &Trace<St, C> {
        &self.trace
    }
    pub fn termination(&self) -> Termination {
        self.termination
    }
    pub fn fault(&self) -> Option<&EnvironmentError> {
        self.fault.as_ref()
    }

    /// Step at which `s` was first discovered. The start is discovered at 0.
    pub fn discovered_at(&self, s: &St) -> Option<usize> {
        self.discovered_at.get(s).copied()
    }
    /// Step at which `s` was expanded.
    pub fn expanded_at(&self, s: &St) -> Option<usize> {
        self.expanded_at.get(s).copied()
    }
    pub fn discoveries(&self) -> &FxHashMap<St, usize> {
        &self.discovered_at
    }
    pub fn expansions(&self) -> &FxHashMap<St, usize> {
        &self.expanded_at
    }
    /// Expanded cells in expansion order.
    pub fn expansion_order(&self) -> Vec<St> {
        let mut expanded: Vec<(usize, St)> =
            self.expanded_at.iter().map(|(s, step)| (*step, *s)).collect();
        expanded.sort_unstable_by_key(|(step, _)| *step);
        expanded.into_iter().map(|(_, s)| s).collect()
    }

    /// Last f/g/h values recorded per cell. Informed strategies only.
    pub fn informed_values(&self) -> Option<&InformedValues<St, C>> {
        self.informed.as_ref()
    }
    pub fn values_of(&self, s: &St) -> Option<NodeValues<C>> {
        self.informed.as_ref().and_then(|v| v.get(s).copied())
    }

    // Statistics
    // ----------

    /// Cells in the path, both ends included. 0 without a path.
    pub fn path_len(&self) -> usize {
        self.path.as_ref().map_or(0, Path::len)
    }

    /// Cost of the path found, as tracked by informed strategies.
    pub fn path_cost(&self) -> Option<C> {
        let end = self.path.as_ref()?.end()?;
        self.values_of(end).map(|v| v.g)
    }

    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }
    pub fn expanded_count(&self) -> usize {
        self.expanded_at.len()
    }

    /// New cells discovered per expanded cell, leaving out the start.
    pub fn avg_branching_factor(&self) -> f64 {
        let expanded = self.expanded_at.len();
        if expanded <= 1 {
            return 0.0;
        }
        let discovered = self.discovered_at.len().saturating_sub(1);
        discovered as f64 / expanded as f64
    }

    /// Path cells over visited cells.
    pub fn efficiency(&self) -> Option<f64> {
        let path = self.path.as_ref()?;
        if self.visited.is_empty() {
            return None;
        }
        Some(path.len() as f64 / self.visited.len() as f64)
    }

    pub fn nodes_per_step(&self) -> f64 {
        if self.steps == 0 {
            return 0.0;
        }
        self.visited.len() as f64 / self.steps as f64
    }

    pub fn discovery_to_expansion_ratio(&self) -> Option<f64> {
        if self.expanded_at.is_empty() {
            return None;
        }
        Some(self.discovered_at.len() as f64 / self.expanded_at.len() as f64)
    }

    pub fn avg_step_time(&self) -> Option<Duration> {
        let steps = u32::try_from(self.steps).ok().filter(|s| *s > 0)?;
        Some(self.duration / steps)
    }

    pub fn summary(&self) -> ResultSummary {
        ResultSummary {
            strategy: self.strategy,
            success: self.success,
            termination: self.termination,
            steps: self.steps,
            duration: self.duration,
            path_len: self.path.as_ref().map(Path::len),
            path_cost: self.path_cost().and_then(|c| c.to_f64()),
            visited: self.visited.len(),
            expanded: self.expanded_at.len(),
            efficiency: self.efficiency(),
            avg_branching_factor: self.avg_branching_factor(),
            discovery_to_expansion_ratio: self.discovery_to_expansion_ratio(),
            nodes_per_step: self.nodes_per_step(),
        }
    }
}

impl<St, C> SearchResult<St, C>
where
    St: State,
    C: Cost,
{
    /// Approximate memory held by the result, the trace being most of it.
    pub fn write_memory_stats<W: std::io::Write>(&self, mut out: W) -> std::io::Result<()> {
        use size::Size;
        use std::mem::size_of;
        use thousands::Separable;

        writeln!(out, "{} Stats:", self.name())?;
        let l = self.visited.len();
        writeln!(
            out,
            "  - |Visited|:  {} ({})",
            l.separate_with_commas(),
            Size::from_bytes(l * size_of::<St>())
        )?;

        let s = size_of::<(St, usize)>();
        let l = self.discovered_at.len() + self.expanded_at.len();
        writeln!(
            out,
            "  - |Steps|:    {} ({})",
            l.separate_with_commas(),
            Size::from_bytes(l * s)
        )?;

        if let Some(informed) = &self.informed {
            let s = size_of::<(St, NodeValues<C>)>();
            let l = informed.len();
            writeln!(
                out,
                "  - |Values|:   {} ({})",
                l.separate_with_commas(),
                Size::from_bytes(l * s)
            )?;
        }

        writeln!(
            out,
            "  - |Trace|:    {} ({})",
            self.trace.len().separate_with_commas(),
            Size::from_bytes(self.trace.footprint())
        )?;
        Ok(())
    }
}

impl<St, C> std::fmt::Display for SearchResult<St, C>
where
    St: State,
    C: Cost,
{
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let secs = self.duration.as_secs_f64();
        match &self.path {
            Some(path) => {
                writeln!(
                    f,
                    "{} succeeded in {} steps ({secs:.3}s)",
                    self.name(),
                    self.steps
                )?;
                write!(f, "  Path length: {} cells", path.len())?;
                if let Some(cost) = self.path_cost() {
                    write!(f, " (cost {cost})")?;
                }
                writeln!(f)?;
            }
            None => {
                writeln!(
                    f,
                    "{} failed after {} steps ({secs:.3}s): {}",
                    self.name(),
                    self.steps,
                    self.termination
                )?;
                if let Some(fault) = &self.fault {
                    writeln!(f, "  Fault: {fault}")?;
                }
            }
        }
        writeln!(
            f,
            "  Visited cells: {} ({:.2} cells/step)",
            self.visited.len(),
            self.nodes_per_step()
        )?;
        if let Some(efficiency) = self.efficiency() {
            writeln!(
                f,
                "  Efficiency: {:.1}% (path cells / visited cells)",
                efficiency * 100.0
            )?;
        }
        write!(
            f,
            "  Average branching factor: {:.2} neighbours/cell",
            self.avg_branching_factor()
        )?;
        if let Some(step_time) = self.avg_step_time() {
            write!(
                f,
                "\n  Average time per step: {:.3} ms",
                step_time.as_secs_f64() * 1000.0
            )?;
        }
        Ok(())
    }
}

/// Flat statistics of a `SearchResult`, for comparing strategies.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ResultSummary {
    pub strategy: StrategyKind,
    pub success: bool,
    pub termination: Termination,
    pub steps: usize,
    pub duration: Duration,
    pub path_len: Option<usize>,
    pub path_cost: Option<f64>,
    pub visited: usize,
    pub expanded: usize,
    pub efficiency: Option<f64>,
    pub avg_branching_factor: f64,
    pub discovery_to_expansion_ratio: Option<f64>,
    pub nodes_per_step: f64,
}

/// Per-cell maps are written as `(cell, value)` lists in discovery order so
/// the output is deterministic and keys need not be strings.
#[cfg(feature = "serde")]
impl<St, C> serde::Serialize for SearchResult<St, C>
where
    St: State + serde::Serialize,
    C: Cost + serde::Serialize,
{
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;

        let in_order = |map: &FxHashMap<St, usize>| -> Vec<(St, usize)> {
            self.visited
                .iter()
                .filter_map(|s| map.get(s).map(|v| (*s, *v)))
                .collect()
        };
        let informed: Option<Vec<(St, NodeValues<C>)>> = self.informed.as_ref().map(|values| {
            self.visited
                .iter()
                .filter_map(|s| values.get(s).map(|v| (*s, *v)))
                .collect()
        });

        let mut r = serializer.serialize_struct("SearchResult", 12)?;
        r.serialize_field("strategy", &self.strategy)?;
        r.serialize_field("success", &self.success)?;
        r.serialize_field("termination", &self.termination)?;
        r.serialize_field("steps", &self.steps)?;
        r.serialize_field("duration", &self.duration)?;
        r.serialize_field("path", &self.path)?;
        r.serialize_field("visited", &self.visited)?;
        r.serialize_field("discovered_at", &in_order(&self.discovered_at))?;
        r.serialize_field("expanded_at", &in_order(&self.expanded_at))?;
        r.serialize_field("informed", &informed)?;
        r.serialize_field("trace", &self.trace)?;
        r.serialize_field("fault", &self.fault)?;
        r.end()
    }
}
