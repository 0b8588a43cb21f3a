use std::path::PathBuf;

use anstream::println;
use clap::ArgAction;
use clap::Parser;
use glob::glob;
use indoc::indoc;
use log::error;
use log::info;
use owo_colors::OwoColorize;
use rand_chacha::ChaCha8Rng;
use rand_chacha::rand_core::SeedableRng;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

use maze_search::SearchConfig;
use maze_search::SearchResult;
use maze_search::StrategyKind;
use maze_search::environment::Environment;
use maze_search::problems::maze_2d::Maze2DCost;
use maze_search::problems::maze_2d::Maze2DHeuristic;
use maze_search::problems::maze_2d::Maze2DProblem;
use maze_search::problems::maze_2d::Maze2DState;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

const DEMO_MAZE: &str = indoc! {"
    ##########
    #S   #   #
    # ## # # #
    #  #   # #
    ## ##### #
    #      #G#
    ##########
"};

/// Solves mazes with BFS, DFS, Greedy Best-First and A*, and compares them.
#[derive(Parser, Debug)]
#[clap(long_version = maze_search::build::CLAP_LONG_VERSION)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Maze files (text or PNG) or directories holding them. Solves a small
    /// built-in maze when empty.
    #[arg()]
    pub problems: Vec<PathBuf>,

    /// Strategies to run, all of them by default.
    #[arg(short, long, value_enum)]
    pub strategy: Vec<StrategyKind>,

    /// Maximum number of expansions per search, 0 for unbounded.
    #[arg(long, env = "MAZE_STEP_LIMIT", default_value_t = 0usize)]
    pub step_limit: usize,

    /// Record a trace of every step.
    #[arg(long, env = "MAZE_TRACE", default_value_t = true, action = ArgAction::Set)]
    pub trace: bool,

    #[arg(long, value_enum, default_value_t = Maze2DHeuristic::Manhattan)]
    pub heuristic: Maze2DHeuristic,

    /// Also solve this many random start/goal pairs on each maze.
    #[arg(long, default_value_t = 0u64)]
    pub random_instances: u64,

    /// Print the trace step by step.
    #[arg(long)]
    pub replay: bool,

    /// Draw the maze with the visited cells and the path found.
    #[arg(long)]
    pub show: bool,

    /// Print the memory held by each result.
    #[arg(long)]
    pub memory: bool,

    /// Write every result, trace included, as JSON.
    #[cfg(feature = "serde")]
    #[arg(long, env = "MAZE_JSON")]
    pub json: Option<PathBuf>,

    #[command(flatten)]
    color: colorchoice_clap::Color,
}

impl Args {
    fn strategies(&self) -> Vec<StrategyKind> {
        if self.strategy.is_empty() {
            StrategyKind::ALL.to_vec()
        } else {
            self.strategy.clone()
        }
    }

    fn config(&self) -> SearchConfig {
        SearchConfig::default()
            .with_step_limit(self.step_limit)
            .with_trace(self.trace || self.replay)
    }

    /// Maze files, with directories expanded into the mazes they hold.
    fn maze_files(&self) -> Vec<PathBuf> {
        let mut files = vec![];
        for p in &self.problems {
            if !p.is_dir() {
                files.push(p.clone());
                continue;
            }
            for ext in ["png", "txt"] {
                let pattern = p.join(format!("*.{ext}"));
                match glob(&pattern.to_string_lossy()) {
                    Ok(paths) => files.extend(paths.filter_map(Result::ok)),
                    Err(e) => error!("Bad maze directory {}: {e}", p.display()),
                }
            }
        }
        files.sort();
        files
    }
}

/// Results of every strategy on one problem.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
struct Report {
    maze: String,
    start: Maze2DState,
    goal: Maze2DState,
    shortest_hops: Option<usize>,
    results: Vec<SearchResult<Maze2DState, Maze2DCost>>,
}

fn solve(args: &Args, maze: &str, problem: &Maze2DProblem) -> std::io::Result<Report> {
    let config = args.config();
    let shortest_hops = problem.shortest_hops();
    println!(
        "{} {maze}: {} -> {} ({})",
        "Problem".bold(),
        problem.start().yellow(),
        problem.goal().yellow(),
        match shortest_hops {
            Some(hops) => format!("{hops} moves at best"),
            None => "unreachable".to_string(),
        }
    );
    if args.show {
        println!("{problem}");
    }

    let mut results = vec![];
    for kind in args.strategies() {
        let result = kind.solve(problem, &config);
        print_result(&result, shortest_hops);

        if args.replay {
            result.trace().write_replay(std::io::stdout().lock())?;
        }
        if args.show {
            println!("{}", problem.render_with_path(result.path(), result.visited()));
        }
        if args.memory {
            result.write_memory_stats(std::io::stdout().lock())?;
        }
        results.push(result);
    }
    print_table(&results);

    Ok(Report {
        maze: maze.to_string(),
        start: problem.start(),
        goal: problem.goal(),
        shortest_hops,
        results,
    })
}

fn print_result(result: &SearchResult<Maze2DState, Maze2DCost>, shortest_hops: Option<usize>) {
    if result.success() {
        println!("{}", result.green());
    } else {
        println!("{}", result.red());
    }
    if let (Some(path), Some(best)) = (result.path(), shortest_hops) {
        let extra = path.moves().saturating_sub(best);
        if extra == 0 {
            println!("  Optimal: {}", "yes".green());
        } else {
            println!("  Optimal: {} ({extra} extra moves)", "no".yellow());
        }
    }
}

fn print_table(results: &[SearchResult<Maze2DState, Maze2DCost>]) {
    println!(
        "{:<24} {:>8} {:>8} {:>8} {:>10} {:>10}",
        "Strategy".bold(),
        "Steps",
        "Visited",
        "Path",
        "Efficiency",
        "Branching"
    );
    for r in results {
        let summary = r.summary();
        println!(
            "{:<24} {:>8} {:>8} {:>8} {:>10} {:>10.2}",
            summary.strategy.to_string(),
            summary.steps,
            summary.visited,
            summary
                .path_len
                .map_or_else(|| "-".to_string(), |l| l.to_string()),
            summary
                .efficiency
                .map_or_else(|| "-".to_string(), |e| format!("{:.1}%", e * 100.0)),
            summary.avg_branching_factor,
        );
    }
    println!();
}

/// How one strategy did over every problem.
#[derive(Debug, Default, PartialEq, Eq)]
struct Totals {
    solved: usize,
    optimal: usize,
    steps: usize,
    visited: usize,
}

impl Totals {
    fn of(reports: &[Report], kind: StrategyKind) -> Self {
        let mut totals = Totals::default();
        for report in reports {
            for r in report.results.iter().filter(|r| r.strategy() == kind) {
                totals.solved += usize::from(r.success());
                totals.optimal += usize::from(
                    r.path().is_some_and(|p| Some(p.moves()) == report.shortest_hops),
                );
                totals.steps += r.steps();
                totals.visited += r.visited_count();
            }
        }
        totals
    }
}

fn print_totals(args: &Args, reports: &[Report]) {
    if reports.len() < 2 {
        return;
    }
    println!("{} over {} problems", "Totals".bold(), reports.len());
    println!(
        "{:<24} {:>8} {:>8} {:>10} {:>10}",
        "Strategy".bold(),
        "Solved",
        "Optimal",
        "Steps",
        "Visited"
    );
    for kind in args.strategies() {
        let totals = Totals::of(reports, kind);
        println!(
            "{:<24} {:>8} {:>8} {:>10} {:>10}",
            kind.to_string(),
            totals.solved,
            totals.optimal,
            totals.steps,
            totals.visited
        );
    }
    for report in reports.iter().filter(|r| r.shortest_hops.is_some()) {
        for r in report.results.iter().filter(|r| !r.success()) {
            println!(
                "  {} missed {} ({} -> {}): {}",
                r.strategy(),
                report.maze,
                report.start,
                report.goal,
                r.termination().yellow()
            );
        }
    }
}

fn solve_maze(args: &Args, name: &str, problem: Maze2DProblem) -> std::io::Result<Vec<Report>> {
    let problem = problem
        .with_heuristic(args.heuristic)
        .with_step_limit(args.step_limit);
    let mut reports = vec![solve(args, name, &problem)?];

    for instance in 0..args.random_instances {
        let mut rng = ChaCha8Rng::seed_from_u64(instance);
        match problem.randomize(&mut rng) {
            Some(random_problem) => {
                let name = format!("{name}:{instance}");
                reports.push(solve(args, &name, &random_problem)?);
            }
            None => error!("Failed to generate a random problem on {name} with seed {instance}"),
        }
    }
    Ok(reports)
}

fn main() -> std::io::Result<()> {
    let args = Args::parse();
    args.color.write_global();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .with_writer(std::io::stderr)
        .init();
    info!("maze_search {}", maze_search::build::PKG_VERSION);

    let mut reports = vec![];
    if args.problems.is_empty() {
        match Maze2DProblem::try_from(DEMO_MAZE) {
            Ok(problem) => reports.extend(solve_maze(&args, "demo", problem)?),
            Err(e) => error!("Broken demo maze: {e}"),
        }
    }
    for path in args.maze_files() {
        let name = path.display().to_string();
        match Maze2DProblem::load(&path) {
            Ok(problem) => reports.extend(solve_maze(&args, &name, problem)?),
            Err(e) => error!("Skipping {name}: {e}"),
        }
    }

    print_totals(&args, &reports);

    #[cfg(feature = "serde")]
    if let Some(json) = &args.json {
        let file = std::io::BufWriter::new(std::fs::File::create(json)?);
        serde_json::to_writer_pretty(file, &reports).map_err(std::io::Error::other)?;
        println!("Wrote {} reports to {}", reports.len(), json.display().yellow());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(maze: &str, step_limit: usize) -> Report {
        let problem = Maze2DProblem::try_from(maze).unwrap();
        let config = SearchConfig::default().with_step_limit(step_limit);
        Report {
            maze: "test".to_string(),
            start: problem.start(),
            goal: problem.goal(),
            shortest_hops: problem.shortest_hops(),
            results: maze_search::compare(&problem, &config),
        }
    }

    #[test]
    fn totals_add_up_every_problem() {
        let open = report(
            indoc! {"
                S..
                ...
                ..G
            "},
            0,
        );
        let limited = report(
            indoc! {"
                S....
                ....G
            "},
            2,
        );
        let reports = [open, limited];

        let bfs = Totals::of(&reports, StrategyKind::BreadthFirst);
        assert_eq!(bfs.solved, 1);
        assert_eq!(bfs.optimal, 1);
        assert_eq!(
            bfs.steps,
            reports
                .iter()
                .flat_map(|r| &r.results)
                .filter(|r| r.strategy() == StrategyKind::BreadthFirst)
                .map(SearchResult::steps)
                .sum::<usize>()
        );

        let astar = Totals::of(&reports, StrategyKind::AStar);
        assert_eq!(astar.solved, 1);
        assert_eq!(astar.optimal, 1);
        assert!(astar.visited <= bfs.visited);
    }

    #[test]
    fn no_totals_without_problems() {
        assert_eq!(Totals::of(&[], StrategyKind::AStar), Totals::default());
    }
}
