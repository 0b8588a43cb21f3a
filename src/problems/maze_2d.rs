use std::collections::VecDeque;

use derive_more::Display;
use nonmax::NonMaxU32;
use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::environment::Environment;
use crate::environment::Neighbours;
use crate::environment::Path;
use crate::environment::State;
use crate::error::EnvironmentError;

const MAX_ELEMENTS_DISPLAYED: usize = 60;
const RANDOM_STATE_MAX_TRIES: usize = 10_000;

// Simple colours
const WHITE: [u8; 3] = [u8::MAX, u8::MAX, u8::MAX];
const BLACK: [u8; 3] = [u8::MIN, u8::MIN, u8::MIN];
const GREEN: [u8; 3] = [u8::MIN, u8::MAX, u8::MIN];
const BLUE: [u8; 3] = [u8::MIN, u8::MIN, u8::MAX];

pub(crate) type CoordIntrinsic = u32;
pub type Coord = NonMaxU32;

/// A cell of the maze. `x` is the column, `y` the row, with row 0 on top.
#[derive(Copy, Clone, Display, PartialEq, Eq, Hash)]
#[display("({x},{y})")]
pub struct Maze2DState {
    pub(crate) x: Coord,
    pub(crate) y: Coord,
}

impl Maze2DState {
    pub fn new(x: CoordIntrinsic, y: CoordIntrinsic) -> Option<Maze2DState> {
        Some(Maze2DState {
            x: Coord::new(x)?,
            y: Coord::new(y)?,
        })
    }
    pub fn new_from_usize(x: usize, y: usize) -> Option<Maze2DState> {
        let x = CoordIntrinsic::try_from(x).ok()?;
        let y = CoordIntrinsic::try_from(y).ok()?;
        Self::new(x, y)
    }

    pub fn x(&self) -> CoordIntrinsic {
        self.x.get()
    }
    pub fn y(&self) -> CoordIntrinsic {
        self.y.get()
    }

    /// The cell one step towards `direction`, if it has valid coordinates.
    #[inline(always)]
    pub fn step(&self, direction: Maze2DDirection) -> Option<Maze2DState> {
        let (x, y) = (self.x(), self.y());

        #[rustfmt::skip]
        let (x, y) = match direction {
            Maze2DDirection::Up    => (Some(x),          y.checked_sub(1)),
            Maze2DDirection::Right => (x.checked_add(1), Some(y)         ),
            Maze2DDirection::Down  => (Some(x),          y.checked_add(1)),
            Maze2DDirection::Left  => (x.checked_sub(1), Some(y)         ),
        };
        Self::new(x?, y?)
    }

    /// Number of orthogonal steps between two cells, ignoring walls.
    ///
    /// ```
    /// use maze_search::problems::maze_2d::Maze2DState;
    ///
    /// let a = Maze2DState::new(1, 1).unwrap();
    /// let b = Maze2DState::new(3, 4).unwrap();
    /// assert_eq!(a.manhattan(&b), 5);
    /// ```
    #[inline(always)]
    pub fn manhattan(&self, other: &Maze2DState) -> Maze2DCost {
        self.x().abs_diff(other.x()) + self.y().abs_diff(other.y())
    }
}
impl State for Maze2DState {}

impl std::fmt::Debug for Maze2DState {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "({},{})", self.x, self.y)
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Maze2DState {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serde::Serialize::serialize(&(self.x(), self.y()), serializer)
    }
}

/// The four ways out of a cell, in the order neighbours are listed.
#[derive(Copy, Clone, Debug, Display, PartialEq, Eq, PartialOrd, Ord)]
pub enum Maze2DDirection {
    #[display("↑")]
    Up = 0, // y--
    #[display("→")]
    Right = 1, // x++
    #[display("↓")]
    Down = 2, // y++
    #[display("←")]
    Left = 3, // x--
}

impl Maze2DDirection {
    pub const ALL: [Maze2DDirection; 4] = [
        Maze2DDirection::Up,
        Maze2DDirection::Right,
        Maze2DDirection::Down,
        Maze2DDirection::Left,
    ];
}

pub type Maze2DCost = CoordIntrinsic;

#[derive(Copy, Clone, Debug, Display, PartialEq, Eq)]
pub enum Maze2DCell {
    #[display("░")]
    Empty,
    #[display("█")]
    Wall,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum Maze2DCellParseError {
    #[error("Invalid character '{0}' found.")]
    InvalidCharacter(char),
}

impl std::convert::TryFrom<char> for Maze2DCell {
    type Error = Maze2DCellParseError;

    fn try_from(ch: char) -> Result<Self, Self::Error> {
        match ch {
            ' ' | '.' => Ok(Maze2DCell::Empty),
            '#' | '█' => Ok(Maze2DCell::Wall),
            ch => Err(Maze2DCellParseError::InvalidCharacter(ch)),
        }
    }
}

/// A rectangular grid of empty and wall cells.
#[derive(Clone, PartialEq, Eq)]
pub struct Maze2DSpace {
    pub(crate) map: Vec<Vec<Maze2DCell>>,
}

impl Maze2DSpace {
    /// Builds a space out of rows of cells. Rows must all have the same length.
    pub fn new_from_map(map: Vec<Vec<Maze2DCell>>) -> Option<Self> {
        let width = map.first().map(Vec::len)?;
        if width == 0 || map.iter().any(|row| row.len() != width) {
            return None;
        }
        Maze2DSpace::safe_dimensions(width, map.len()).then_some(Self { map })
    }
    pub(crate) fn new_empty_with_dimensions(x: usize, y: usize) -> Self {
        Self {
            map: vec![vec![Maze2DCell::Empty; x]; y],
        }
    }

    pub(crate) fn safe_dimensions(max_x: usize, max_y: usize) -> bool {
        (max_x < CoordIntrinsic::MAX as usize) && (max_y < CoordIntrinsic::MAX as usize)
    }

    /// Width and height.
    pub fn dimensions(&self) -> (usize, usize) {
        if self.map.is_empty() {
            return (0, 0);
        }
        (self.map[0].len(), self.map.len())
    }

    #[inline(always)]
    pub fn at(&self, state: &Maze2DState) -> Option<Maze2DCell> {
        self.map
            .get(state.y() as usize)
            .and_then(|row| row.get(state.x() as usize))
            .copied()
    }

    #[inline(always)]
    pub fn valid(&self, state: &Maze2DState) -> bool {
        self.at(state).is_some()
    }

    #[inline(always)]
    pub fn is_open(&self, state: &Maze2DState) -> bool {
        self.at(state) == Some(Maze2DCell::Empty)
    }

    /// Open cells one step away, in `Maze2DDirection::ALL` order.
    pub fn open_neighbours(&self, state: &Maze2DState) -> Neighbours<Maze2DState> {
        Maze2DDirection::ALL
            .into_iter()
            .filter_map(|d| state.step(d))
            .filter(|s| self.is_open(s))
            .collect()
    }

    pub fn open_cells(&self) -> usize {
        self.map
            .iter()
            .flatten()
            .filter(|c| **c == Maze2DCell::Empty)
            .count()
    }

    pub fn random_state<R: rand::Rng>(&self, r: &mut R) -> Option<Maze2DState> {
        let (max_x, max_y) = self.dimensions();
        if max_x == 0 || max_y == 0 {
            return None;
        }

        for _tries in 0..RANDOM_STATE_MAX_TRIES {
            let x = r.random_range(0..max_x);
            let y = r.random_range(0..max_y);
            if self.map[y][x] == Maze2DCell::Empty {
                return Maze2DState::new_from_usize(x, y);
            }
        }

        None
    }
}

impl std::fmt::Display for Maze2DSpace {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let d = self.dimensions();
        writeln!(f, "Maze2D({}x{}):", d.0, d.1)?;
        for line in self.map.iter().take(MAX_ELEMENTS_DISPLAYED) {
            for cell in line.iter().take(MAX_ELEMENTS_DISPLAYED) {
                write!(f, "{cell}")?;
            }
            writeln!(f)?;
        }

        Ok(())
    }
}

impl std::fmt::Debug for Maze2DSpace {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "Maze2D{:?}", self.dimensions())
    }
}

/// Distance estimates available on 2D mazes.
#[derive(Copy, Clone, Debug, Default, Display, PartialEq, Eq, clap::ValueEnum)]
pub enum Maze2DHeuristic {
    /// Orthogonal steps ignoring walls. Admissible.
    #[default]
    #[display("manhattan")]
    Manhattan,
    /// Always 0, turning A* into uniform-cost search.
    #[display("zero")]
    Zero,
}

impl Maze2DHeuristic {
    #[inline(always)]
    pub fn h(&self, a: &Maze2DState, b: &Maze2DState) -> Maze2DCost {
        match self {
            Maze2DHeuristic::Manhattan => a.manhattan(b),
            Maze2DHeuristic::Zero => 0,
        }
    }
}

/// A maze with a single start and a single goal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Maze2DProblem {
    space: Maze2DSpace,
    start: Maze2DState,
    goal: Maze2DState,
    heuristic: Maze2DHeuristic,
    step_limit: Option<usize>,
}

impl Maze2DProblem {
    /// Poses a problem on `space`. Both ends must be open cells.
    pub fn new(
        space: Maze2DSpace,
        start: Maze2DState,
        goal: Maze2DState,
    ) -> Result<Self, Maze2DProblemParseError> {
        for cell in [start, goal] {
            if !space.is_open(&cell) {
                return Err(Maze2DProblemParseError::BlockedEndpoint { cell });
            }
        }
        Ok(Self {
            space,
            start,
            goal,
            heuristic: Maze2DHeuristic::default(),
            step_limit: None,
        })
    }

    #[must_use]
    pub fn with_heuristic(mut self, heuristic: Maze2DHeuristic) -> Self {
        self.heuristic = heuristic;
        self
    }

    /// Caps searches on this problem. Zero means unbounded.
    #[must_use]
    pub fn with_step_limit(mut self, step_limit: usize) -> Self {
        self.step_limit = (step_limit > 0).then_some(step_limit);
        self
    }

    pub fn space(&self) -> &Maze2DSpace {
        &self.space
    }
    pub fn heuristic_kind(&self) -> Maze2DHeuristic {
        self.heuristic
    }

    /// Loads a problem from a PNG image or a text file, by extension.
    pub fn load(p: &std::path::Path) -> Result<Self, Maze2DProblemParseError> {
        let is_png = p
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("png"));
        if is_png {
            return Maze2DProblem::try_from(p);
        }
        let text = std::fs::read_to_string(p).map_err(|e| Maze2DProblemParseError::IOError {
            p: p.to_path_buf(),
            e,
        })?;
        Maze2DProblem::try_from(text.as_str())
    }

    /// Same maze with a random open start and a different random open goal.
    pub fn randomize<R: rand::Rng>(&self, r: &mut R) -> Option<Maze2DProblem> {
        let start = self.space.random_state(r)?;
        for _tries in 0..RANDOM_STATE_MAX_TRIES {
            let goal = self.space.random_state(r)?;
            if goal != start {
                return Some(Maze2DProblem {
                    start,
                    goal,
                    ..self.clone()
                });
            }
        }
        None
    }

    /// Fewest moves from start to goal, found by exhaustive breadth-first
    /// search. `None` when the goal is unreachable.
    pub fn shortest_hops(&self) -> Option<usize> {
        let mut distance = FxHashMap::<Maze2DState, usize>::default();
        let mut open = VecDeque::from([self.start]);
        distance.insert(self.start, 0);

        while let Some(s) = open.pop_front() {
            let d = distance.get(&s).copied()?;
            if s == self.goal {
                return Some(d);
            }
            for n in self.space.open_neighbours(&s) {
                if !distance.contains_key(&n) {
                    distance.insert(n, d + 1);
                    open.push_back(n);
                }
            }
        }
        None
    }

    /// Renders the maze with the visited cells and a path on top of it.
    pub fn render_with_path(
        &self,
        path: Option<&Path<Maze2DState>>,
        visited: &[Maze2DState],
    ) -> String {
        let (max_x, max_y) = self.space.dimensions();
        let mut canvas: Vec<Vec<char>> = self
            .space
            .map
            .iter()
            .map(|row| {
                row.iter()
                    .map(|c| match c {
                        Maze2DCell::Empty => ' ',
                        Maze2DCell::Wall => '█',
                    })
                    .collect()
            })
            .collect();
        let mut paint = |s: &Maze2DState, ch: char| {
            if let Some(cell) = canvas
                .get_mut(s.y() as usize)
                .and_then(|row| row.get_mut(s.x() as usize))
            {
                *cell = ch;
            }
        };

        for s in visited {
            paint(s, '·');
        }
        for s in path.into_iter().flatten() {
            paint(s, '*');
        }
        paint(&self.start, 'S');
        paint(&self.goal, 'G');

        let mut out = String::with_capacity((max_x + 1) * max_y);
        for row in canvas {
            out.extend(row);
            out.push('\n');
        }
        out
    }
}

#[derive(Copy, Clone, Debug, Display, PartialEq)]
pub enum Maze2DProblemCell {
    Cell(Maze2DCell),
    #[display("S")]
    Start,
    #[display("G")]
    Goal,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum Maze2DProblemCellParseError {
    #[error("Invalid cell {e}")]
    InvalidCell { e: Maze2DCellParseError },
}

impl std::convert::TryFrom<char> for Maze2DProblemCell {
    type Error = Maze2DProblemCellParseError;

    fn try_from(ch: char) -> Result<Self, Self::Error> {
        match ch {
            'S' => Ok(Maze2DProblemCell::Start),
            'G' => Ok(Maze2DProblemCell::Goal),
            ch => {
                let cell = Maze2DCell::try_from(ch)
                    .map_err(|e| Maze2DProblemCellParseError::InvalidCell { e })?;
                Ok(Maze2DProblemCell::Cell(cell))
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum Maze2DProblemParseError {
    #[error("Empty input")]
    EmptyInput,
    #[error("Maze too large ({x}x{y})")]
    TooLarge { x: usize, y: usize },
    #[error("Row {y} has {found} cells, expected {expected}")]
    RaggedRow {
        y: usize,
        expected: usize,
        found: usize,
    },
    #[error("Invalid cell {e} found at ({x},{y})")]
    InvalidCell {
        e: Maze2DProblemCellParseError,
        x: usize,
        y: usize,
    },
    #[error("No start found")]
    MissingStart,
    #[error("No goal found")]
    MissingGoal,
    #[error("Found a second start at {second}, after {first}")]
    MultipleStarts {
        first: Maze2DState,
        second: Maze2DState,
    },
    #[error("Found a second goal at {second}, after {first}")]
    MultipleGoals {
        first: Maze2DState,
        second: Maze2DState,
    },
    #[error("{cell} is not an open cell of the maze")]
    BlockedEndpoint { cell: Maze2DState },
    #[error("I/O error when loading '{p}': {e}")]
    IOError {
        p: std::path::PathBuf,
        e: std::io::Error,
    },
    #[error("Image error when loading '{p}': {e}")]
    ImageError {
        p: std::path::PathBuf,
        e: image::ImageError,
    },
}

/// Start and goal markers found while reading a maze.
#[derive(Debug, Default)]
struct Endpoints {
    start: Option<Maze2DState>,
    goal: Option<Maze2DState>,
}

impl Endpoints {
    fn start(&mut self, s: Maze2DState) -> Result<(), Maze2DProblemParseError> {
        match self.start.replace(s) {
            Some(first) => Err(Maze2DProblemParseError::MultipleStarts { first, second: s }),
            None => Ok(()),
        }
    }
    fn goal(&mut self, s: Maze2DState) -> Result<(), Maze2DProblemParseError> {
        match self.goal.replace(s) {
            Some(first) => Err(Maze2DProblemParseError::MultipleGoals { first, second: s }),
            None => Ok(()),
        }
    }
    fn into_problem(self, space: Maze2DSpace) -> Result<Maze2DProblem, Maze2DProblemParseError> {
        let start = self.start.ok_or(Maze2DProblemParseError::MissingStart)?;
        let goal = self.goal.ok_or(Maze2DProblemParseError::MissingGoal)?;
        Maze2DProblem::new(space, start, goal)
    }
}

impl std::convert::TryFrom<&str> for Maze2DProblem {
    type Error = Maze2DProblemParseError;

    /// Reads a maze drawn with `#` walls, blank cells, a single `S` and a
    /// single `G`.
    fn try_from(s: &str) -> Result<Self, Self::Error> {
        let lines: Vec<&str> = s.lines().collect();
        let max_x = lines.first().map_or(0, |l| l.chars().count());
        let max_y = lines.len();
        if max_x == 0 {
            return Err(Maze2DProblemParseError::EmptyInput);
        }
        if !Maze2DSpace::safe_dimensions(max_x, max_y) {
            return Err(Maze2DProblemParseError::TooLarge { x: max_x, y: max_y });
        }

        let mut space = Maze2DSpace::new_empty_with_dimensions(max_x, max_y);
        let mut endpoints = Endpoints::default();

        for (y, line) in lines.iter().enumerate() {
            let found = line.chars().count();
            if found != max_x {
                return Err(Maze2DProblemParseError::RaggedRow {
                    y,
                    expected: max_x,
                    found,
                });
            }
            for (x, ch) in line.chars().enumerate() {
                let cell = Maze2DProblemCell::try_from(ch)
                    .map_err(|e| Maze2DProblemParseError::InvalidCell { e, x, y })?;
                let here = Maze2DState::new_from_usize(x, y)
                    .ok_or(Maze2DProblemParseError::TooLarge { x: max_x, y: max_y })?;

                space.map[y][x] = match cell {
                    Maze2DProblemCell::Start => {
                        endpoints.start(here)?;
                        Maze2DCell::Empty
                    }
                    Maze2DProblemCell::Goal => {
                        endpoints.goal(here)?;
                        Maze2DCell::Empty
                    }
                    Maze2DProblemCell::Cell(c) => c,
                }
            }
        }

        endpoints.into_problem(space)
    }
}

impl std::convert::TryFrom<&std::path::Path> for Maze2DProblem {
    type Error = Maze2DProblemParseError;

    /// Reads a maze from an image. Black pixels are walls, the blue pixel is
    /// the start and the green one the goal. Any other colour is open.
    fn try_from(p: &std::path::Path) -> Result<Self, Self::Error> {
        use image::ImageReader;
        use image::Rgb;

        let img = ImageReader::open(p)
            .map_err(|e| Maze2DProblemParseError::IOError {
                p: p.to_path_buf(),
                e,
            })?
            .decode()
            .map_err(|e| Maze2DProblemParseError::ImageError {
                p: p.to_path_buf(),
                e,
            })?
            .into_rgb8();

        let max_x = img.width() as usize;
        let max_y = img.height() as usize;
        if max_x == 0 || max_y == 0 {
            return Err(Maze2DProblemParseError::EmptyInput);
        }
        if !Maze2DSpace::safe_dimensions(max_x, max_y) {
            return Err(Maze2DProblemParseError::TooLarge { x: max_x, y: max_y });
        }

        let mut space = Maze2DSpace::new_empty_with_dimensions(max_x, max_y);
        let mut endpoints = Endpoints::default();

        for (x, y, px) in img.enumerate_pixels() {
            let px: &Rgb<u8> = px;
            let here = Maze2DState::new(x, y)
                .ok_or(Maze2DProblemParseError::TooLarge { x: max_x, y: max_y })?;

            space.map[y as usize][x as usize] = match px.0 {
                BLACK => Maze2DCell::Wall,
                WHITE => Maze2DCell::Empty,
                GREEN => {
                    endpoints.goal(here)?;
                    Maze2DCell::Empty
                }
                BLUE => {
                    endpoints.start(here)?;
                    Maze2DCell::Empty
                }
                _ => Maze2DCell::Empty,
            }
        }

        endpoints.into_problem(space)
    }
}

impl std::fmt::Display for Maze2DProblem {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let d = self.space.dimensions();

        writeln!(
            f,
            "Maze2DProblem({}x{}) (s:{}, g:{}, h:{}):",
            d.0, d.1, self.start, self.goal, self.heuristic
        )?;
        let map = &self.space.map;
        for (y, line) in map.iter().enumerate().take(MAX_ELEMENTS_DISPLAYED) {
            for (x, cell) in line.iter().enumerate().take(MAX_ELEMENTS_DISPLAYED) {
                let s = Maze2DState::new_from_usize(x, y);
                let is_start = s == Some(self.start);
                let is_goal = s == Some(self.goal);

                match (is_start, is_goal) {
                    (true, true) => {
                        write!(f, "!")?;
                    }
                    (true, false) => {
                        write!(f, "S")?;
                    }
                    (false, true) => {
                        write!(f, "G")?;
                    }
                    (false, false) => {
                        write!(f, "{cell}")?;
                    }
                }
            }
            writeln!(f)?;
        }

        Ok(())
    }
}

impl Environment<Maze2DState, Maze2DCost> for Maze2DProblem {
    /// Open cells up, right, down and left of `s`.
    #[inline(always)]
    fn neighbours(&self, s: &Maze2DState) -> Result<Neighbours<Maze2DState>, EnvironmentError> {
        if !self.space.valid(s) {
            return Err(EnvironmentError::unknown_cell(s));
        }
        Ok(self.space.open_neighbours(s))
    }

    fn step_cost(
        &self,
        from: &Maze2DState,
        to: &Maze2DState,
    ) -> Result<Maze2DCost, EnvironmentError> {
        if from.manhattan(to) != 1 || !self.space.is_open(from) || !self.space.is_open(to) {
            return Err(EnvironmentError::not_adjacent(from, to));
        }
        Ok(1)
    }

    #[inline(always)]
    fn heuristic(
        &self,
        s: &Maze2DState,
        goal: &Maze2DState,
    ) -> Result<Maze2DCost, EnvironmentError> {
        Ok(self.heuristic.h(s, goal))
    }

    fn start(&self) -> Maze2DState {
        self.start
    }
    fn goal(&self) -> Maze2DState {
        self.goal
    }

    fn step_limit(&self) -> Option<usize> {
        self.step_limit
    }
}

#[cfg(test)]
mod tests {
    use indoc::indoc;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;

    fn cell(x: u32, y: u32) -> Maze2DState {
        Maze2DState::new(x, y).unwrap()
    }

    #[test]
    fn parse_problem() {
        let problem = Maze2DProblem::try_from(indoc! {"
            #####
            #S..#
            #.#.#
            #..G#
            #####
        "})
        .unwrap();

        assert_eq!(problem.space().dimensions(), (5, 5));
        assert_eq!(problem.start(), cell(1, 1));
        assert_eq!(problem.goal(), cell(3, 3));
        assert_eq!(problem.space().at(&cell(2, 2)), Some(Maze2DCell::Wall));
        assert_eq!(problem.space().open_cells(), 8);
        assert_eq!(problem.shortest_hops(), Some(4));
    }

    #[test]
    fn parse_errors() {
        assert!(matches!(
            Maze2DProblem::try_from(""),
            Err(Maze2DProblemParseError::EmptyInput)
        ));
        assert!(matches!(
            Maze2DProblem::try_from("S.G\n.."),
            Err(Maze2DProblemParseError::RaggedRow {
                y: 1,
                expected: 3,
                found: 2
            })
        ));
        assert!(matches!(
            Maze2DProblem::try_from("S.x.G"),
            Err(Maze2DProblemParseError::InvalidCell { x: 2, y: 0, .. })
        ));
        assert!(matches!(
            Maze2DProblem::try_from("..G"),
            Err(Maze2DProblemParseError::MissingStart)
        ));
        assert!(matches!(
            Maze2DProblem::try_from("S.."),
            Err(Maze2DProblemParseError::MissingGoal)
        ));
        assert!(matches!(
            Maze2DProblem::try_from("S.S.G"),
            Err(Maze2DProblemParseError::MultipleStarts { .. })
        ));
        assert!(matches!(
            Maze2DProblem::try_from("SG.G"),
            Err(Maze2DProblemParseError::MultipleGoals { .. })
        ));
    }

    #[test]
    fn block_walls_parse() {
        let problem = Maze2DProblem::try_from("S█G").unwrap();
        assert_eq!(problem.space().dimensions(), (3, 1));
        assert_eq!(problem.shortest_hops(), None);
    }

    #[test]
    fn neighbour_order() {
        let problem = Maze2DProblem::try_from(indoc! {"
            ...
            .S.
            ..G
        "})
        .unwrap();
        let n = problem.neighbours(&cell(1, 1)).unwrap();
        assert_eq!(
            n.as_slice(),
            &[cell(1, 0), cell(2, 1), cell(1, 2), cell(0, 1)]
        );

        // Corners stay inside the maze.
        let n = problem.neighbours(&cell(0, 0)).unwrap();
        assert_eq!(n.as_slice(), &[cell(1, 0), cell(0, 1)]);
    }

    #[test]
    fn walls_are_not_neighbours() {
        let problem = Maze2DProblem::try_from(indoc! {"
            .#.
            #S.
            .#G
        "})
        .unwrap();
        let n = problem.neighbours(&cell(1, 1)).unwrap();
        assert_eq!(n.as_slice(), &[cell(2, 1)]);
    }

    #[test]
    fn environment_faults() {
        let problem = Maze2DProblem::try_from("S.G").unwrap();
        assert_eq!(
            problem.neighbours(&cell(7, 7)),
            Err(EnvironmentError::unknown_cell(&cell(7, 7)))
        );
        assert_eq!(problem.step_cost(&cell(0, 0), &cell(1, 0)), Ok(1));
        assert!(problem.step_cost(&cell(0, 0), &cell(2, 0)).is_err());
    }

    #[test]
    fn heuristics() {
        let problem = Maze2DProblem::try_from("S...G").unwrap();
        assert_eq!(problem.heuristic(&cell(0, 0), &cell(4, 0)), Ok(4));
        let problem = problem.with_heuristic(Maze2DHeuristic::Zero);
        assert_eq!(problem.heuristic(&cell(0, 0), &cell(4, 0)), Ok(0));
    }

    #[test]
    fn blocked_endpoints() {
        let space =
            Maze2DSpace::new_from_map(vec![vec![Maze2DCell::Empty, Maze2DCell::Wall]]).unwrap();
        assert!(matches!(
            Maze2DProblem::new(space.clone(), cell(0, 0), cell(1, 0)),
            Err(Maze2DProblemParseError::BlockedEndpoint { .. })
        ));
        assert!(matches!(
            Maze2DProblem::new(space, cell(0, 0), cell(5, 0)),
            Err(Maze2DProblemParseError::BlockedEndpoint { .. })
        ));
    }

    #[test]
    fn ragged_maps_are_rejected() {
        assert!(Maze2DSpace::new_from_map(vec![]).is_none());
        assert!(
            Maze2DSpace::new_from_map(vec![vec![Maze2DCell::Empty], vec![]]).is_none()
        );
    }

    #[test]
    fn randomize_is_seeded() {
        let problem = Maze2DProblem::try_from(indoc! {"
            S....
            .###.
            ....G
        "})
        .unwrap();

        let a = problem.randomize(&mut ChaCha8Rng::seed_from_u64(7)).unwrap();
        let b = problem.randomize(&mut ChaCha8Rng::seed_from_u64(7)).unwrap();
        assert_eq!(a, b);
        assert_ne!(a.start(), a.goal());
        assert!(a.space().is_open(&a.start()));
        assert!(a.space().is_open(&a.goal()));
    }

    #[test]
    fn render() {
        let problem = Maze2DProblem::try_from("S.#\n..G").unwrap();
        let path = Path::from(vec![cell(0, 0), cell(0, 1), cell(1, 1), cell(2, 1)]);
        assert_eq!(
            problem.render_with_path(Some(&path), &[cell(1, 0)]),
            "S·█\n**G\n"
        );
    }

    #[test]
    fn display() {
        let problem = Maze2DProblem::try_from("S#G").unwrap();
        assert_eq!(
            problem.to_string(),
            "Maze2DProblem(3x1) (s:(0,0), g:(2,0), h:manhattan):\nS█G\n"
        );
        assert_eq!(format!("{:?}", cell(3, 4)), "(3,4)");
    }
}
