//! # Gomoku Play
//!
//! Plays one game of Gomoku in the terminal. Each side is an MCTS engine with its own selection
//! policy, the alpha-beta searcher, or a human typing `row,col` on stdin.
//!
//! ## Usage
//! ```text
//! play --black mcts --black-policy heuristic --white human -b 9 -l 4
//! RUST_LOG=mcts=debug play --black mcts --white alpha-beta --depth 3
//! ```

use clap::{Parser, ValueEnum};
use colored::Colorize;
use mcts::board::{Cell, Player};
use mcts::game_controller::{GameController, GameStatus, MoveResult, Opponent};
use mcts::games::gomoku::{GomokuMove, GomokuState};
use mcts::{AlphaBeta, Error, GameState, SearchConfig, SelectionPolicy, MCTS};
use std::io::{self, BufRead, Write};
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Side {
    Mcts,
    AlphaBeta,
    Human,
}

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value_t = 15)]
    board_size: usize,

    /// Stones in a row needed to win
    #[arg(short, long, default_value_t = 5)]
    line_size: usize,

    /// MCTS iterations per move, split across threads
    #[arg(short, long, default_value_t = 10_000)]
    iterations: u32,

    #[arg(short, long, default_value_t = 5.0)]
    exploration: f64,

    /// Worker threads (0 = all CPUs)
    #[arg(short, long, default_value_t = 0)]
    num_threads: usize,

    #[arg(long, value_enum, default_value_t = Side::Human)]
    black: Side,

    #[arg(long, value_enum, default_value_t = Side::Mcts)]
    white: Side,

    #[arg(long, default_value_t = SelectionPolicy::BasicUct)]
    black_policy: SelectionPolicy,

    #[arg(long, default_value_t = SelectionPolicy::BasicUct)]
    white_policy: SelectionPolicy,

    /// Look-ahead of the alpha-beta player in plies
    #[arg(short, long, default_value_t = 3)]
    depth: u32,

    /// Default log filter when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    log_level: String,
}

enum Seat {
    Engine(Box<dyn Opponent>),
    Human,
}

fn init_tracing(level: &str) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

fn seat(side: Side, policy: SelectionPolicy, base: &SearchConfig, depth: u32) -> Result<Seat, Error> {
    Ok(match side {
        Side::Mcts => {
            let config = SearchConfig {
                policy,
                ..base.clone()
            };
            let engine: MCTS<GomokuState> = MCTS::new(&config)?;
            Seat::Engine(Box::new(engine))
        }
        Side::AlphaBeta => Seat::Engine(Box::new(AlphaBeta::new(depth))),
        Side::Human => Seat::Human,
    })
}

fn render(state: &GomokuState, last: Option<GomokuMove>) {
    let size = state.board_size();
    print!("   ");
    for c in 0..size {
        print!("{:>3}", c);
    }
    println!();
    for r in 0..size {
        print!("{:>3}", r);
        for c in 0..size {
            let symbol = match state.cell(r, c) {
                Cell::Black => "X".red().bold(),
                Cell::White => "O".blue().bold(),
                Cell::Empty => ".".dimmed(),
            };
            if last == Some(GomokuMove(r, c)) {
                print!("  {}", symbol.on_yellow());
            } else {
                print!("  {}", symbol);
            }
        }
        println!();
    }
}

fn human_move(controller: &mut GameController) -> Result<MoveResult, Error> {
    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        print!("{} to move (row,col): ", controller.current_player());
        io::stdout().flush()?;
        line.clear();
        if stdin.lock().read_line(&mut line)? == 0 {
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "stdin closed").into());
        }
        let mv: GomokuMove = match line.trim().parse() {
            Ok(mv) => mv,
            Err(err) => {
                println!("{}", err.as_str().yellow());
                continue;
            }
        };
        match controller.try_make_move(mv) {
            MoveResult::Invalid { reason } => println!("{}", reason.to_string().as_str().yellow()),
            result => return Ok(result),
        }
    }
}

fn main() -> Result<(), Error> {
    let args = Args::parse();
    init_tracing(&args.log_level);

    let base = SearchConfig {
        board_size: args.board_size,
        win_length: args.line_size,
        iterations: args.iterations,
        exploration: args.exploration,
        num_threads: args.num_threads,
        ..SearchConfig::default()
    };
    base.validate()?;
    let black = seat(args.black, args.black_policy, &base, args.depth)?;
    let white = seat(args.white, args.white_policy, &base, args.depth)?;

    let mut controller = GameController::new(base.new_game()?);
    controller.subscribe(|change| {
        info!(row = change.row, col = change.col, player = %change.player, "stone placed");
    });

    for (name, occupant) in [("Black", &black), ("White", &white)] {
        match occupant {
            Seat::Engine(engine) => println!("{}: {}", name, engine.name()),
            Seat::Human => println!("{}: human", name),
        }
    }
    render(controller.state(), None);

    while !controller.is_game_over() {
        let occupant = match controller.current_player() {
            Player::Black => &black,
            Player::White => &white,
        };
        let result = match occupant {
            Seat::Engine(engine) => controller.play_opponent(&**engine)?,
            Seat::Human => human_move(&mut controller)?,
        };
        match result {
            MoveResult::Success {
                move_made, player, ..
            } => {
                println!("\n{} plays {}", player, move_made);
                render(controller.state(), Some(move_made));
            }
            MoveResult::Invalid { reason } => {
                warn!(%reason, "engine produced a rejected move");
                break;
            }
            MoveResult::GameOver => break,
        }
    }

    match controller.status() {
        GameStatus::Win(winner) => println!("\n{}", format!("{} wins!", winner).as_str().green().bold()),
        GameStatus::Draw => println!("\n{}", "Draw.".bold()),
        GameStatus::InProgress => {}
    }
    info!(
        moves = controller.move_count(),
        result = controller.state().result(),
        "game over"
    );
    println!("\n{}", controller.format_history());
    Ok(())
}
