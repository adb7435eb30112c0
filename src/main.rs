//! `strategik` command-line client
//!
//! `play` runs an interactive game against the AI service from the terminal,
//! writing the board and network views to SVG after every command. The other
//! subcommands call a single service endpoint and print the reply.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde_json::Value;
use shakmaty::Square;
use std::path::{Path, PathBuf};
use strategik::core::logging::init_tracing;
use strategik::core::settings::{ClientSettings, PlayerSide};
use strategik::game::history::STARTING_FEN;
use strategik::game::types::parse_square;
use strategik::game::{
    BoardController, MoveCandidate, NoDelay, Orchestrator, Orientation, SelectionOutcome,
    SessionConfig, TokioDelay,
};
use strategik::networking::client::{AiClient, HttpAiService};
use strategik::networking::protocol::TrainingParameters;
use strategik::rendering::NetworkVisualization;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "strategik", version, about = "Play chess against a DQN service")]
struct Cli {
    /// AI service base URL (overrides settings and STRATEGIK_SERVER_URL)
    #[arg(long, global = true)]
    server: Option<String>,

    /// Delay before each AI move in milliseconds
    #[arg(long, global = true)]
    delay_ms: Option<u64>,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Interactive game against the AI
    Play {
        /// Play black; the AI opens
        #[arg(long)]
        black: bool,
        /// Draw the board with black at the bottom
        #[arg(long)]
        flipped: bool,
        /// Start from this position instead of the initial one
        #[arg(long)]
        fen: Option<String>,
        #[arg(long, default_value = "board.svg")]
        board_svg: PathBuf,
        #[arg(long, default_value = "network.svg")]
        network_svg: PathBuf,
        /// Where to write the PGN when the game ends
        #[arg(long, default_value = "game.pgn")]
        pgn: PathBuf,
        /// Do not post finished games to the service
        #[arg(long)]
        no_save: bool,
    },
    /// Start a self-play training run
    Train {
        #[arg(long, default_value_t = 10)]
        games: u32,
        /// Training parameter update, repeatable (`--param epsilon=0.1`)
        #[arg(long = "param", value_parser = parse_param)]
        params: Vec<(String, Value)>,
    },
    /// Print aggregate training statistics
    Stats,
    /// Evaluate a position
    Evaluate {
        #[arg(long, default_value = STARTING_FEN)]
        fen: String,
    },
    /// Ask the service whether a position is terminal
    State {
        #[arg(long)]
        fen: String,
    },
    /// List legal destinations of one square
    Legal {
        #[arg(long)]
        fen: String,
        #[arg(long)]
        square: String,
    },
    /// Print the effective settings, optionally persisting them
    Config {
        #[arg(long)]
        save: bool,
    },
}

fn parse_param(raw: &str) -> std::result::Result<(String, Value), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{}'", raw))?;
    let key = key.trim();
    if key.is_empty() {
        return Err("empty parameter name".to_string());
    }
    let value = serde_json::from_str(value.trim())
        .unwrap_or_else(|_| Value::String(value.trim().to_string()));
    Ok((key.to_string(), value))
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut settings = ClientSettings::load();
    settings
        .apply_env()
        .context("invalid STRATEGIK_* environment variable")?;
    if let Some(server) = &cli.server {
        settings.server_url = server.clone();
    }
    if let Some(delay) = cli.delay_ms {
        settings.ai_move_delay_ms = delay;
    }
    info!("[SETTINGS] Using AI service at {}", settings.server_url);

    let command = cli.command.unwrap_or(Command::Play {
        black: false,
        flipped: false,
        fen: None,
        board_svg: PathBuf::from("board.svg"),
        network_svg: PathBuf::from("network.svg"),
        pgn: PathBuf::from("game.pgn"),
        no_save: false,
    });

    let mut client = AiClient::http(settings.server_url.clone());

    match command {
        Command::Play {
            black,
            flipped,
            fen,
            board_svg,
            network_svg,
            pgn,
            no_save,
        } => {
            if black {
                settings.player_color = PlayerSide::Black;
            }
            if flipped {
                settings.flipped = true;
            }
            if no_save {
                settings.save_games = false;
            }
            let paths = OutputPaths {
                board_svg,
                network_svg,
                pgn,
            };
            play(settings, client, fen, paths).await?;
        }
        Command::Train { games, params } => {
            let parameters: TrainingParameters = params.into_iter().collect();
            let reply = client.begin_training(games, &parameters).await;
            println!("{}", serde_json::to_string_pretty(&reply)?);
            if reply.is_error() {
                bail!(
                    "training failed: {}",
                    reply.message.unwrap_or_else(|| "unknown error".to_string())
                );
            }
        }
        Command::Stats => match client.fetch_training_stats().await {
            Some(stats) => {
                println!("Games played:   {}", stats.total_games);
                println!("White wins:     {:.1}%", stats.white_win_percentage);
                println!("Black wins:     {:.1}%", stats.black_win_percentage);
                println!("Draws:          {:.1}%", stats.draw_percentage);
                println!("Avg length:     {:.1}", stats.avg_game_length);
                println!("Avg reward:     {:.3}", stats.avg_reward);
                println!("Epsilon:        {:.3}", stats.epsilon);
            }
            None => bail!("training statistics unavailable"),
        },
        Command::Evaluate { fen } => match client.evaluate(&fen).await {
            Some(evaluation) => println!("{:+.3}", evaluation),
            None => bail!("evaluation unavailable"),
        },
        Command::State { fen } => match client.check_terminal(&fen).await {
            Some(reply) => println!("{}: {}", reply.state, reply.message),
            None => bail!("game state unavailable"),
        },
        Command::Legal { fen, square } => {
            let square = parse_square(&square)?;
            let destinations = client.legal_moves_for(&fen, square).await;
            let names: Vec<String> = destinations.iter().map(Square::to_string).collect();
            println!("{}", names.join(" "));
        }
        Command::Config { save } => {
            println!("{}", serde_json::to_string_pretty(&settings)?);
            if save {
                let path = settings.save()?;
                println!("Saved to {}", path.display());
            }
        }
    }

    Ok(())
}

struct OutputPaths {
    board_svg: PathBuf,
    network_svg: PathBuf,
    pgn: PathBuf,
}

async fn play(
    settings: ClientSettings,
    client: AiClient<HttpAiService>,
    fen: Option<String>,
    paths: OutputPaths,
) -> Result<()> {
    let board = BoardController::new(settings.board_size, Orientation::from_flipped(settings.flipped))
        .with_theme(settings.board_theme);
    let visualization = NetworkVisualization::new(
        settings.network_layers.clone(),
        settings.network_width as f32,
        settings.network_height as f32,
    );
    let delay: Box<dyn strategik::game::MoveDelay> = if settings.ai_move_delay_ms == 0 {
        Box::new(NoDelay)
    } else {
        Box::new(TokioDelay(settings.ai_move_delay()))
    };
    let config = SessionConfig {
        player_color: settings.player_color.color(),
        save_games: settings.save_games,
        player_name: settings.player_name.clone(),
        ai_name: settings.ai_name.clone(),
    };

    let mut session = Orchestrator::new(board, client, visualization, delay, config);
    match fen {
        Some(fen) => session.load_position(&fen).await?,
        None => session.start().await,
    }
    present(&session, &paths)?;
    print_help();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut pgn_written = false;

    while let Some(line) = lines.next_line().await? {
        let input = line.trim();
        let (word, rest) = input.split_once(' ').unwrap_or((input, ""));

        match word {
            "" => continue,
            "quit" | "exit" => break,
            "help" => print_help(),
            "flip" => session.flip(),
            "new" => {
                session.new_game().await;
                pgn_written = false;
            }
            "undo" => {
                if let Err(e) = session.undo().await {
                    println!("{}", e);
                }
                pgn_written = false;
            }
            "eval" => match session.evaluate().await {
                Some(evaluation) => println!("Evaluation: {:+.3}", evaluation),
                None => println!("Evaluation unavailable"),
            },
            "fen" if rest.is_empty() => println!("{}", session.board().fen()),
            "fen" => {
                if let Err(e) = session.load_position(rest).await {
                    println!("{}", e);
                }
                pgn_written = false;
            }
            "pgn" => println!("{}", session.board().pgn()),
            text if text.len() == 2 => match parse_square(text) {
                Ok(square) => match session.click(square).await {
                    SelectionOutcome::Selected { destinations, .. } => {
                        let names: Vec<String> =
                            destinations.iter().map(Square::to_string).collect();
                        println!("Selected {}: {}", square, names.join(" "));
                    }
                    SelectionOutcome::Rejected => println!("Illegal move"),
                    SelectionOutcome::Ignored => println!("No piece of yours on {}", square),
                    SelectionOutcome::Deselected | SelectionOutcome::Moved(_) => {}
                },
                Err(e) => println!("{}", e),
            },
            text => match text.parse::<MoveCandidate>() {
                Ok(candidate) => {
                    let candidate = if candidate.promotion.is_none() {
                        MoveCandidate::user(candidate.from, candidate.to)
                    } else {
                        candidate
                    };
                    if let Err(e) = session.play(candidate).await {
                        println!("{}", e);
                    }
                }
                Err(_) => println!("Unknown command '{}'; type 'help'", text),
            },
        }

        present(&session, &paths)?;

        if !session.is_in_progress() && !pgn_written {
            if let Some(outcome) = session.outcome() {
                write_pgn(&session, &outcome.result, &paths.pgn)?;
                pgn_written = true;
            }
        }
    }

    Ok(())
}

fn present(session: &Orchestrator<HttpAiService>, paths: &OutputPaths) -> Result<()> {
    let view = session.board().render();
    std::fs::write(&paths.board_svg, view.to_svg())
        .with_context(|| format!("writing {}", paths.board_svg.display()))?;
    std::fs::write(&paths.network_svg, session.visualization().to_svg())
        .with_context(|| format!("writing {}", paths.network_svg.display()))?;

    println!("\n{}\n", view.to_text());
    println!("{}", session.status_line());
    Ok(())
}

fn write_pgn(session: &Orchestrator<HttpAiService>, result: &str, path: &Path) -> Result<()> {
    let config = session.config();
    let (white, black) = match config.player_color {
        shakmaty::Color::White => (config.player_name.as_str(), config.ai_name.as_str()),
        shakmaty::Color::Black => (config.ai_name.as_str(), config.player_name.as_str()),
    };
    let date = chrono::Local::now().format("%Y.%m.%d").to_string();
    let headers = [
        ("Event", "Strategik game"),
        ("Site", "Local"),
        ("Date", date.as_str()),
        ("White", white),
        ("Black", black),
    ];
    let pgn = session
        .board()
        .engine()
        .history()
        .pgn_with_headers(&headers, result);

    match std::fs::write(path, pgn) {
        Ok(()) => println!("Game written to {}", path.display()),
        Err(e) => warn!("Failed to write {}: {}", path.display(), e),
    }
    Ok(())
}

fn print_help() {
    println!("Commands:");
    println!("  <square>        select a piece, then click a destination (e2, e4)");
    println!("  <uci>           play a move directly (e2e4, e7e8n)");
    println!("  undo | flip | new | eval | pgn");
    println!("  fen [FEN]       show or load a position");
    println!("  quit");
}
