use clap::Parser;
use mcts::board::Player;
use mcts::games::gomoku::{GomokuMove, GomokuState};
use mcts::{Error, GameState, SearchConfig, SearchStatistics, SelectionPolicy, MCTS};
use std::time::{Duration, Instant};
use tracing::{debug, info};

#[derive(Parser, Debug)]
#[command(author, version, about = "Plays two selection policies against each other", long_about = None)]
struct Args {
    /// Board size for Gomoku (default: 15)
    #[arg(long, default_value_t = 15)]
    board_size: usize,

    /// Stones in a row needed to win (default: 5)
    #[arg(long, default_value_t = 5)]
    line_size: usize,

    /// Number of games; colors alternate every game
    #[arg(long, default_value_t = 10)]
    games: u32,

    /// MCTS iterations per move
    #[arg(long, default_value_t = 2_000)]
    iterations: u32,

    /// Worker threads per engine (0 = all CPUs)
    #[arg(long, default_value_t = 0)]
    threads: usize,

    #[arg(long, default_value_t = 5.0)]
    exploration: f64,

    /// Policy of the first engine
    #[arg(long, default_value_t = SelectionPolicy::Heuristic)]
    first: SelectionPolicy,

    /// Policy of the second engine
    #[arg(long, default_value_t = SelectionPolicy::BasicUct)]
    second: SelectionPolicy,

    #[arg(long, default_value = "warn")]
    log_level: String,
}

/// Running totals for one engine.
#[derive(Debug, Default)]
struct Tally {
    wins: u32,
    search_time: Duration,
    playouts: u64,
    moves: u64,
}

impl Tally {
    fn record(&mut self, stats: &SearchStatistics<GomokuMove>) {
        self.search_time += stats.elapsed;
        self.playouts += stats.root_visits as u64;
        self.moves += 1;
    }

    fn sims_per_second(&self) -> f64 {
        let secs = self.search_time.as_secs_f64();
        if secs > 0.0 {
            self.playouts as f64 / secs
        } else {
            0.0
        }
    }
}

fn play_game(
    black: &MCTS<GomokuState>,
    white: &MCTS<GomokuState>,
    black_tally: &mut Tally,
    white_tally: &mut Tally,
    config: &SearchConfig,
) -> Result<Option<Player>, Error> {
    let mut state = config.new_game()?;
    while !state.is_game_over() {
        let (engine, tally) = match state.to_move() {
            Player::Black => (black, &mut *black_tally),
            Player::White => (white, &mut *white_tally),
        };
        let (mv, stats) = engine.search(&state)?;
        tally.record(&stats);
        state.make_move(&mv);
    }
    Ok(state.winner())
}

fn main() -> Result<(), Error> {
    let args = Args::parse();
    {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(std::io::stderr))
            .with(filter)
            .init();
    }

    let base = SearchConfig {
        board_size: args.board_size,
        win_length: args.line_size,
        iterations: args.iterations,
        exploration: args.exploration,
        num_threads: args.threads,
        ..SearchConfig::default()
    };
    let first: MCTS<GomokuState> = MCTS::new(&SearchConfig {
        policy: args.first,
        ..base.clone()
    })?;
    let second: MCTS<GomokuState> = MCTS::new(&SearchConfig {
        policy: args.second,
        ..base.clone()
    })?;

    println!("Parallel MCTS Gomoku - Policy Benchmark");
    println!("=======================================");
    println!(
        "Game: Gomoku ({}x{}, {} in a row)",
        args.board_size, args.board_size, args.line_size
    );
    println!("Games: {}", args.games);
    println!("Iterations per move: {}", args.iterations);
    println!(
        "First: {} ({} workers)",
        args.first,
        first.worker_count()
    );
    println!(
        "Second: {} ({} workers)",
        args.second,
        second.worker_count()
    );
    println!("---------------------------------------");

    #[cfg(debug_assertions)]
    println!("WARNING: Running in debug mode. Performance will be significantly lower.\nUse --release for accurate benchmarks.\n");

    let mut first_tally = Tally::default();
    let mut second_tally = Tally::default();
    let mut draws = 0;
    let start = Instant::now();

    for game in 0..args.games {
        let first_is_black = game % 2 == 0;
        let winner = if first_is_black {
            play_game(&first, &second, &mut first_tally, &mut second_tally, &base)?
        } else {
            play_game(&second, &first, &mut second_tally, &mut first_tally, &base)?
        };
        let first_color = if first_is_black { Player::Black } else { Player::White };
        let outcome = match winner {
            Some(player) if player == first_color => {
                first_tally.wins += 1;
                args.first.name()
            }
            Some(_) => {
                second_tally.wins += 1;
                args.second.name()
            }
            None => {
                draws += 1;
                "draw"
            }
        };
        info!(game = game + 1, first_color = %first_color, outcome, "game finished");
        println!("Game {:>3}: {}", game + 1, outcome);
    }

    let total = start.elapsed();
    let games = args.games.max(1) as f64;
    debug!(?first_tally, ?second_tally, "benchmark totals");

    println!("\nResults:");
    for (policy, tally) in [(args.first, &first_tally), (args.second, &second_tally)] {
        println!(
            "  {:<12} wins {:>5.1}%  moves {:>5}  {:.0} sims/sec",
            policy.name(),
            tally.wins as f64 / games * 100.0,
            tally.moves,
            tally.sims_per_second()
        );
    }
    println!("  {:<12} {:>10.1}%", "draws", draws as f64 / games * 100.0);
    println!("  Time: {:.3}s", total.as_secs_f64());
    Ok(())
}
