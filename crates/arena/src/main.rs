//! Tic-tac-toe arena for the UCB1 tree search.
//!
//! Builds and stores search trees from the empty board, prints stored trees,
//! and plays matches between random, search-based and human players.

mod config;
mod store;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::time::Instant;
use tracing::info;
use ucb_core::{GameState, Outcome};
use ucb_mcts::{
    games::{Cell, TicTacToe},
    play_game, ExternalStrategy, MctsStrategy, MoveStrategy, RandomPolicy, RandomStrategy,
    SearchEngine, Tree,
};

use crate::config::ArenaConfig;
use crate::store::TreeStore;

/// UCB1 tree search arena.
#[derive(Parser)]
#[command(name = "ucb-arena")]
#[command(about = "Build, inspect and play with UCB1 search trees for tic-tac-toe")]
struct Cli {
    /// TOML config file (defaults to $UCB_ARENA_CONFIG, then ./arena.toml).
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level when RUST_LOG is unset.
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a tree from the empty board and store it.
    Build {
        /// Number of simulations.
        #[arg(short, long)]
        simulations: Option<usize>,

        /// Random seed for rollouts.
        #[arg(long)]
        seed: Option<u64>,

        /// Output directory for tree files.
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Print the tree after building it.
        #[arg(long)]
        dump: bool,
    },

    /// Print a stored tree.
    Show {
        /// Simulation count the tree was built with (only its magnitude matters).
        #[arg(short, long)]
        simulations: Option<usize>,

        /// Directory holding tree files.
        #[arg(short, long)]
        dir: Option<PathBuf>,
    },

    /// Play matches between two players.
    Play {
        /// Player one (X).
        #[arg(short, long, value_enum, default_value = "mcts")]
        x: PlayerKind,

        /// Player two (O).
        #[arg(short, long, value_enum, default_value = "random")]
        o: PlayerKind,

        /// Number of games.
        #[arg(short, long, default_value = "1")]
        games: usize,

        /// Simulations per search move.
        #[arg(short, long)]
        simulations: Option<usize>,

        /// Random seed for reproducibility.
        #[arg(long)]
        seed: Option<u64>,
    },
}

/// Who picks the moves for one side.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum PlayerKind {
    Random,
    Mcts,
    Human,
}

fn init_tracing(level: &str) -> Result<()> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();

    Ok(())
}

fn engine(config: &ArenaConfig, seed: u64) -> SearchEngine<TicTacToe, RandomPolicy<ChaCha8Rng>> {
    let policy = RandomPolicy::new(ChaCha8Rng::seed_from_u64(seed));
    SearchEngine::new(config.search.clone(), policy)
}

fn print_move_stats(tree: &Tree<TicTacToe>) {
    println!("{:>6} {:>8} {:>9}", "move", "visits", "average");
    for stats in tree.root_move_stats() {
        let average = stats
            .average_value
            .map_or_else(|| "-".to_string(), |v| format!("{v:+.3}"));
        println!("{:>6} {:>8} {:>9}", stats.action, stats.visits, average);
    }
    match tree.best_move() {
        Ok(best) => println!("Best move: {best}"),
        Err(e) => println!("No best move: {e}"),
    }
}

/// Run the build command.
fn cmd_build(config: &ArenaConfig, dump: bool) -> Result<()> {
    let simulations = config.search.num_simulations;
    let store = TreeStore::new(&config.store_dir);

    println!(
        "Building tree with {} simulations (seed {})",
        simulations, config.seed
    );
    let start = Instant::now();

    let mut engine = engine(config, config.seed);
    engine
        .build_tree(TicTacToe::new(), simulations)
        .context("Tree search failed")?;
    let tree = engine
        .take_tree()
        .context("Search finished without a tree")?;

    let elapsed = start.elapsed();
    info!(
        nodes = tree.len(),
        elapsed_ms = elapsed.as_millis() as u64,
        "tree built"
    );

    if dump {
        print!("{}", tree.dump());
    }

    let path = store
        .save(&tree, simulations)
        .with_context(|| format!("Failed to store tree in {}", store.dir().display()))?;

    println!("\nCompleted in {:.2}s", elapsed.as_secs_f64());
    println!("Nodes: {}", tree.len());
    println!("Saved to: {}", path.display());
    print_move_stats(&tree);

    Ok(())
}

/// Run the show command.
fn cmd_show(config: &ArenaConfig) -> Result<()> {
    let simulations = config.search.num_simulations;
    let store = TreeStore::new(&config.store_dir);

    let tree: Tree<TicTacToe> = store.load(simulations).with_context(|| {
        format!(
            "Failed to load tree from {}",
            store.path_for(simulations).display()
        )
    })?;

    print!("{}", tree.dump());
    println!();
    println!("Nodes: {}", tree.len());
    print_move_stats(&tree);

    Ok(())
}

/// Parse one line of human input as a cell index.
fn parse_cell(line: &str) -> Option<Cell> {
    line.trim().parse::<u8>().ok().map(Cell)
}

/// Ask the terminal for a move until a legal one is entered.
///
/// Returns `None` when stdin is closed.
fn prompt_human(state: &TicTacToe) -> Option<Cell> {
    let legal = state.legal_moves();
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    println!("\n{state}");
    loop {
        print!("{} to move, enter a cell (0-8): ", state.current_player());
        io::stdout().flush().ok()?;

        let line = lines.next()?.ok()?;
        match parse_cell(&line) {
            Some(cell) if legal.contains(&cell) => return Some(cell),
            _ => println!("'{}' is not a free cell", line.trim()),
        }
    }
}

/// Prints every move its inner strategy makes, so a human opponent can follow.
struct Announced<T> {
    inner: T,
}

impl<T: MoveStrategy<TicTacToe>> MoveStrategy<TicTacToe> for Announced<T> {
    fn propose(&mut self, state: &TicTacToe) -> ucb_mcts::Result<Cell> {
        let mv = self.inner.propose(state)?;
        println!("{} plays {}", state.current_player(), mv);
        Ok(mv)
    }
}

fn make_player(
    kind: PlayerKind,
    config: &ArenaConfig,
    seed: u64,
    announce: bool,
) -> Box<dyn MoveStrategy<TicTacToe>> {
    let player: Box<dyn MoveStrategy<TicTacToe>> = match kind {
        PlayerKind::Random => Box::new(RandomStrategy::new(ChaCha8Rng::seed_from_u64(seed))),
        PlayerKind::Mcts => Box::new(MctsStrategy::new(engine(config, seed))),
        PlayerKind::Human => return Box::new(ExternalStrategy::new(prompt_human)),
    };
    if announce {
        Box::new(Announced { inner: player })
    } else {
        player
    }
}

/// Match results from player one's side.
#[derive(Debug, Default, PartialEq, Eq)]
struct Tally {
    x_wins: usize,
    o_wins: usize,
    draws: usize,
}

impl Tally {
    fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::PlayerOneWins => self.x_wins += 1,
            Outcome::PlayerTwoWins => self.o_wins += 1,
            Outcome::Draw => self.draws += 1,
        }
    }

    fn total(&self) -> usize {
        self.x_wins + self.o_wins + self.draws
    }

    fn percent(&self, count: usize) -> f32 {
        if self.total() == 0 {
            0.0
        } else {
            count as f32 / self.total() as f32 * 100.0
        }
    }
}

/// Run the play command.
fn cmd_play(config: &ArenaConfig, x: PlayerKind, o: PlayerKind, games: usize) -> Result<()> {
    let with_human = x == PlayerKind::Human || o == PlayerKind::Human;
    let mut tally = Tally::default();

    println!(
        "Playing {} games: X ({:?}) vs O ({:?}), {} simulations per search move",
        games, x, o, config.search.num_simulations
    );

    for i in 0..games {
        let game_seed = config.seed.wrapping_add(i as u64 * 1000);
        let mut first = make_player(x, config, game_seed, with_human);
        let mut second = make_player(o, config, game_seed.wrapping_add(1), with_human);

        let record = play_game(TicTacToe::new(), first.as_mut(), second.as_mut())
            .with_context(|| format!("Game {} aborted", i + 1))?;
        tally.record(record.outcome);

        info!(
            game = i + 1,
            moves = record.moves.len(),
            outcome = %record.outcome,
            score = record.outcome.sign(),
            "game finished"
        );
        if with_human {
            println!("\n{}\n{}", record.final_state, record.outcome);
        }

        if (i + 1) % 10 == 0 || i + 1 == games {
            println!(
                "Game {}/{}: X {} - {} O ({} draws)",
                i + 1,
                games,
                tally.x_wins,
                tally.o_wins,
                tally.draws
            );
        }
    }

    println!("\n================================================");
    println!("FINAL RESULTS");
    println!("================================================");
    println!("X wins: {} ({:.1}%)", tally.x_wins, tally.percent(tally.x_wins));
    println!("O wins: {} ({:.1}%)", tally.o_wins, tally.percent(tally.o_wins));
    println!("Draws:  {} ({:.1}%)", tally.draws, tally.percent(tally.draws));

    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(&cli.log_level)?;
    let mut config = config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Build {
            simulations,
            seed,
            out,
            dump,
        } => {
            if let Some(n) = simulations {
                config.search.num_simulations = n;
            }
            if let Some(s) = seed {
                config.seed = s;
            }
            if let Some(dir) = out {
                config.store_dir = dir;
            }
            config.validate()?;
            cmd_build(&config, dump)
        }

        Commands::Show { simulations, dir } => {
            if let Some(n) = simulations {
                config.search.num_simulations = n;
            }
            if let Some(dir) = dir {
                config.store_dir = dir;
            }
            cmd_show(&config)
        }

        Commands::Play {
            x,
            o,
            games,
            simulations,
            seed,
        } => {
            if let Some(n) = simulations {
                config.search.num_simulations = n;
            }
            if let Some(s) = seed {
                config.seed = s;
            }
            config.validate()?;
            cmd_play(&config, x, o, games)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_play_command() {
        let cli = Cli::parse_from([
            "ucb-arena", "play", "--x", "human", "--o", "mcts", "--games", "3", "-s", "200",
        ]);
        match cli.command {
            Commands::Play {
                x,
                o,
                games,
                simulations,
                seed,
            } => {
                assert_eq!(x, PlayerKind::Human);
                assert_eq!(o, PlayerKind::Mcts);
                assert_eq!(games, 3);
                assert_eq!(simulations, Some(200));
                assert_eq!(seed, None);
            }
            _ => panic!("expected play command"),
        }
    }

    #[test]
    fn test_parse_cell() {
        assert_eq!(parse_cell(" 4\n"), Some(Cell(4)));
        assert_eq!(parse_cell("x"), None);
        assert_eq!(parse_cell("-1"), None);
    }

    #[test]
    fn test_tally() {
        let mut tally = Tally::default();
        tally.record(Outcome::PlayerOneWins);
        tally.record(Outcome::PlayerOneWins);
        tally.record(Outcome::Draw);
        tally.record(Outcome::PlayerTwoWins);

        assert_eq!(
            tally,
            Tally {
                x_wins: 2,
                o_wins: 1,
                draws: 1
            }
        );
        assert!((tally.percent(tally.x_wins) - 50.0).abs() < 1e-4);
        assert_eq!(Tally::default().percent(0), 0.0);
    }

    #[test]
    fn test_announced_player_passes_moves_through() {
        let config = ArenaConfig::default();
        let state = TicTacToe::from_moves(&[4]).unwrap();

        let mut quiet = make_player(PlayerKind::Random, &config, 9, false);
        let mut loud = make_player(PlayerKind::Random, &config, 9, true);

        assert_eq!(quiet.propose(&state), loud.propose(&state));
    }

    #[test]
    fn test_build_then_show_from_store() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = ArenaConfig::default();
        config.search.num_simulations = 120;
        config.store_dir = dir.path().to_path_buf();

        cmd_build(&config, false).unwrap();
        assert!(dir.path().join("tree_1e2.msgpack").exists());
        cmd_show(&config).unwrap();
    }

    #[test]
    fn test_play_computer_players() {
        let mut config = ArenaConfig::default();
        config.search.num_simulations = 50;

        cmd_play(&config, PlayerKind::Mcts, PlayerKind::Random, 2).unwrap();
        cmd_play(&config, PlayerKind::Random, PlayerKind::Random, 3).unwrap();
    }
}
