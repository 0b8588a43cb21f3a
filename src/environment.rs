use std::fmt::Debug;
use std::hash::Hash;

use rustc_hash::FxHashSet;
use smallvec::SmallVec;

use crate::cost::Cost;
use crate::error::EnvironmentError;

const MAX_ELEMENTS_DISPLAYED: usize = 20;

pub trait State: Copy + Clone + Debug + PartialEq + Eq + Hash {}

/// The neighbours of a State, in the order they must be considered.
///
/// Every strategy uses this order to break ties, so it must be deterministic.
pub type Neighbours<St> = SmallVec<[St; 8]>;

/// A read-only graph to search on.
///
/// Searches only borrow the Environment, so several searches may share one.
pub trait Environment<St, C>: Debug
where
    St: State,
    C: Cost,
{
    /// Expands a State
    fn neighbours(&self, s: &St) -> Result<Neighbours<St>, EnvironmentError>;

    /// Cost of stepping from `from` into its neighbour `to`. Must be positive.
    fn step_cost(&self, _from: &St, _to: &St) -> Result<C, EnvironmentError> {
        Ok(C::one())
    }

    /// Estimated cost from `s` to `goal`.
    ///
    /// A* only returns optimal paths when this never overestimates.
    fn heuristic(&self, _s: &St, _goal: &St) -> Result<C, EnvironmentError> {
        Ok(C::zero())
    }

    fn start(&self) -> St;
    fn goal(&self) -> St;

    /// Maximum number of expansions. `None` (or zero) means unbounded.
    fn step_limit(&self) -> Option<usize> {
        None
    }

    /// Checks that a Path only takes steps this Environment allows and never
    /// repeats a State.
    fn valid_path(&self, p: &Path<St>) -> bool {
        let mut seen = FxHashSet::<St>::default();
        for s in p.iter() {
            if !seen.insert(*s) {
                return false;
            }
        }
        p.states.windows(2).all(|w| match self.neighbours(&w[0]) {
            Ok(neighbours) => neighbours.contains(&w[1]),
            Err(_) => false,
        })
    }
}

/// A sequence of States, each one a neighbour of the previous one.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Path<St>
where
    St: State,
{
    states: Vec<St>,
}

impl<St> Path<St>
where
    St: State,
{
    #[inline(always)]
    pub fn new_from_start(start: St) -> Self {
        Self {
            states: vec![start],
        }
    }

    #[inline(always)]
    pub fn append(&mut self, s: St) {
        self.states.push(s);
    }

    /// Reverses the Path.
    ///
    /// Useful when naturally reconstructing paths in reverse.
    pub fn reverse(&mut self) {
        self.states.reverse();
    }

    pub fn start(&self) -> Option<&St> {
        self.states.first()
    }
    pub fn end(&self) -> Option<&St> {
        self.states.last()
    }

    /// Number of States, including both ends.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.states.len()
    }
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
    /// Number of steps taken, one less than the States visited.
    pub fn moves(&self) -> usize {
        self.states.len().saturating_sub(1)
    }

    pub fn contains(&self, s: &St) -> bool {
        self.states.contains(s)
    }
    pub fn iter(&self) -> std::slice::Iter<'_, St> {
        self.states.iter()
    }
    pub fn as_slice(&self) -> &[St] {
        &self.states
    }
}

impl<St> From<Vec<St>> for Path<St>
where
    St: State,
{
    fn from(states: Vec<St>) -> Self {
        Self { states }
    }
}

impl<'a, St> IntoIterator for &'a Path<St>
where
    St: State,
{
    type Item = &'a St;
    type IntoIter = std::slice::Iter<'a, St>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<St> std::fmt::Display for Path<St>
where
    St: State,
{
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match (self.start(), self.end()) {
            (Some(start), Some(end)) => {
                write!(
                    f,
                    "Path({} moves, {:?}:{:?}:{:?})",
                    self.moves(),
                    start,
                    self.states
                        .iter()
                        .take(MAX_ELEMENTS_DISPLAYED)
                        .collect::<Vec<_>>(),
                    end
                )
            }
            _ => write!(f, "Path()"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    impl State for i32 {}

    /// A line 0 - 1 - 2 - ... - 9
    #[derive(Debug)]
    struct Line;

    impl Environment<i32, u32> for Line {
        fn neighbours(&self, s: &i32) -> Result<Neighbours<i32>, EnvironmentError> {
            if !(0..10).contains(s) {
                return Err(EnvironmentError::unknown_cell(s));
            }
            Ok([s - 1, s + 1]
                .into_iter()
                .filter(|n| (0..10).contains(n))
                .collect())
        }
        fn start(&self) -> i32 {
            0
        }
        fn goal(&self) -> i32 {
            9
        }
    }

    #[test]
    fn path_ends() {
        let mut p = Path::new_from_start(3);
        p.append(2);
        p.append(1);
        assert_eq!(p.len(), 3);
        assert_eq!(p.moves(), 2);
        p.reverse();
        assert_eq!(p.start(), Some(&1));
        assert_eq!(p.end(), Some(&3));
    }

    #[test]
    fn valid_paths() {
        assert!(Line.valid_path(&Path::from(vec![0, 1, 2])));
        assert!(Line.valid_path(&Path::from(vec![4])));
        // Jumps
        assert!(!Line.valid_path(&Path::from(vec![0, 2])));
        // Repeats
        assert!(!Line.valid_path(&Path::from(vec![0, 1, 0])));
        // Leaves the environment
        assert!(!Line.valid_path(&Path::from(vec![10, 9])));
    }

    #[test]
    fn default_costs() {
        assert_eq!(Line.step_cost(&0, &1), Ok(1u32));
        assert_eq!(Line.heuristic(&0, &9), Ok(0u32));
        assert_eq!(Line.step_limit(), None);
    }
}
