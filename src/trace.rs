//! Step-by-step records of a search, for replaying it afterwards.

use std::mem::size_of;

use crate::algorithms::FrontierEntry;
use crate::algorithms::NodeValues;
use crate::cost::Cost;
use crate::environment::Path;
use crate::environment::State;

/// Everything a search did in one step.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct TraceStep<St, C>
where
    St: State,
    C: Cost,
{
    /// 1-based, matches `SearchResult::expanded_at`.
    pub step: usize,
    pub expanded: St,
    /// Values of the expanded State. Informed strategies only.
    pub expanded_values: Option<NodeValues<C>>,
    /// Neighbours inserted or updated in the Frontier this step, in the order
    /// it happened.
    pub inserted: Vec<FrontierEntry<St, C>>,
    /// The Frontier right before `expanded` was taken out, in pop order.
    pub frontier_before: Vec<FrontierEntry<St, C>>,
    /// The Frontier at the end of the step, in pop order.
    pub frontier_after: Vec<FrontierEntry<St, C>>,
    /// Path from the start to `expanded`.
    pub partial_path: Path<St>,
    /// The closed set (informed strategies) or the visited set (uninformed
    /// ones) at the end of the step, in insertion order.
    pub closed: Vec<St>,
}

impl<St, C> TraceStep<St, C>
where
    St: State,
    C: Cost,
{
    /// Approximate heap memory held by this step.
    pub fn footprint(&self) -> usize {
        let entry = size_of::<FrontierEntry<St, C>>();
        size_of::<Self>()
            + entry * (self.inserted.len() + self.frontier_before.len() + self.frontier_after.len())
            + size_of::<St>() * (self.partial_path.len() + self.closed.len())
    }
}

/// One-line commentary of the step.
impl<St, C> std::fmt::Display for TraceStep<St, C>
where
    St: State,
    C: Cost,
{
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "Step {}: expanding {:?}", self.step, self.expanded)?;
        if let Some(v) = &self.expanded_values {
            write!(f, " [f={} g={} h={}]", v.f, v.g, v.h)?;
        }
        if self.inserted.is_empty() {
            write!(f, "; no new neighbours")?;
        } else {
            write!(f, "; discovered")?;
            for (i, e) in self.inserted.iter().enumerate() {
                let sep = if i == 0 { " " } else { ", " };
                write!(f, "{sep}{:?} ({})", e.state, e.priority)?;
            }
        }
        write!(
            f,
            "; frontier {} -> {}, closed {}, path {}",
            self.frontier_before.len(),
            self.frontier_after.len(),
            self.closed.len(),
            self.partial_path.len()
        )
    }
}

/// The ordered sequence of steps of a search. Empty when tracing was off.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Trace<St, C>
where
    St: State,
    C: Cost,
{
    steps: Vec<TraceStep<St, C>>,
}

impl<St, C> Trace<St, C>
where
    St: State,
    C: Cost,
{
    pub fn empty() -> Self {
        Self { steps: vec![] }
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TraceStep<St, C>> {
        self.steps.iter()
    }
    pub fn get(&self, i: usize) -> Option<&TraceStep<St, C>> {
        self.steps.get(i)
    }
    pub fn last(&self) -> Option<&TraceStep<St, C>> {
        self.steps.last()
    }
    pub fn as_slice(&self) -> &[TraceStep<St, C>] {
        &self.steps
    }

    /// The step that expanded `s`, if any.
    pub fn expansion_of(&self, s: &St) -> Option<&TraceStep<St, C>> {
        self.steps.iter().find(|t| t.expanded == *s)
    }

    /// Approximate heap memory held by the whole trace.
    pub fn footprint(&self) -> usize {
        self.steps.iter().map(TraceStep::footprint).sum()
    }

    /// Writes the step commentary, one line per step.
    pub fn write_replay<W: std::io::Write>(&self, mut out: W) -> std::io::Result<()> {
        for step in &self.steps {
            writeln!(out, "{step}")?;
        }
        Ok(())
    }
}

impl<St, C> std::ops::Index<usize> for Trace<St, C>
where
    St: State,
    C: Cost,
{
    type Output = TraceStep<St, C>;

    fn index(&self, i: usize) -> &Self::Output {
        &self.steps[i]
    }
}

impl<'a, St, C> IntoIterator for &'a Trace<St, C>
where
    St: State,
    C: Cost,
{
    type Item = &'a TraceStep<St, C>;
    type IntoIter = std::slice::Iter<'a, TraceStep<St, C>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Collects `TraceStep`s while a search runs.
///
/// When disabled nothing is built at all, snapshots are only taken through
/// closures that never get called.
#[derive(Debug)]
pub(crate) struct TraceRecorder<St, C>
where
    St: State,
    C: Cost,
{
    enabled: bool,
    steps: Vec<TraceStep<St, C>>,
}

impl<St, C> TraceRecorder<St, C>
where
    St: State,
    C: Cost,
{
    pub(crate) fn new(enabled: bool) -> Self {
        Self {
            enabled,
            steps: vec![],
        }
    }

    #[inline(always)]
    pub(crate) fn enabled(&self) -> bool {
        self.enabled
    }

    /// Takes a snapshot only when recording.
    #[inline(always)]
    pub(crate) fn capture<T, F: FnOnce() -> T>(&self, f: F) -> Option<T> {
        self.enabled.then(f)
    }

    pub(crate) fn record<F: FnOnce() -> TraceStep<St, C>>(&mut self, f: F) {
        if self.enabled {
            let step = f();
            debug_assert!(
                self.steps.last().is_none_or(|last| last.step < step.step),
                "Steps must be recorded in order"
            );
            self.steps.push(step);
        }
    }

    pub(crate) fn finish(self) -> Trace<St, C> {
        Trace { steps: self.steps }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::Priority;

    fn step(n: usize) -> TraceStep<i32, u32> {
        TraceStep {
            step: n,
            expanded: n as i32,
            expanded_values: Some(NodeValues::new(3, 1, 2)),
            inserted: vec![FrontierEntry {
                state: 10 + n as i32,
                priority: Priority::Heuristic { h: 2 },
            }],
            frontier_before: vec![],
            frontier_after: vec![],
            partial_path: Path::new_from_start(0),
            closed: vec![0],
        }
    }

    #[test]
    fn disabled_recorder_never_snapshots() {
        let mut recorder = TraceRecorder::<i32, u32>::new(false);
        let snapshot = recorder.capture(|| -> Vec<i32> { panic!("Should not snapshot") });
        assert!(snapshot.is_none());
        recorder.record(|| panic!("Should not build steps"));
        assert!(recorder.finish().is_empty());
    }

    #[test]
    fn enabled_recorder_keeps_order() {
        let mut recorder = TraceRecorder::<i32, u32>::new(true);
        assert_eq!(recorder.capture(|| 7), Some(7));
        recorder.record(|| step(1));
        recorder.record(|| step(2));
        let trace = recorder.finish();
        assert_eq!(trace.len(), 2);
        assert_eq!(trace.expansion_of(&2).map(|t| t.step), Some(2));
        assert!(trace.expansion_of(&3).is_none());
        assert!(trace.footprint() > 0);
    }

    #[test]
    fn commentary() {
        assert_eq!(
            step(1).to_string(),
            "Step 1: expanding 1 [f=3 g=1 h=2]; discovered 11 (h=2); frontier 0 -> 0, closed 1, path 1"
        );

        let mut out = Vec::new();
        let mut recorder = TraceRecorder::<i32, u32>::new(true);
        recorder.record(|| step(1));
        recorder.finish().write_replay(&mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap().lines().count(), 1);
    }
}
