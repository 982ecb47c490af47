use std::path::PathBuf;

use clap::Parser;
use clearfield_core::{BoardSize, Difficulty, GameSettings};
use clearfield_session::*;
use tokio::io::{AsyncBufReadExt, BufReader};

use command::{Command, HELP};

mod command;
mod render;

#[derive(Parser, Debug)]
#[command(version, about = "Clear the board without hitting a mine", long_about = None)]
struct Args {
    /// What log level to use
    #[command(flatten)]
    verbose: clap_verbosity_flag::Verbosity,

    /// Board size: small, medium or large
    #[arg(short, long, default_value_t = BoardSize::Small)]
    size: BoardSize,

    /// Mine density: easy, normal or hard
    #[arg(short, long, default_value_t = Difficulty::Easy)]
    difficulty: Difficulty,

    /// Force a seed instead of random
    #[arg(long)]
    seed: Option<u64>,

    /// Place mines when the game starts instead of after the first reveal
    #[arg(long)]
    eager: bool,

    /// Directory the leaderboard is kept in
    #[arg(long, default_value = ".clearfield")]
    data_dir: PathBuf,
}

type Session = GameSession<Offline, FileStore>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    env_logger::Builder::new()
        .filter_level(args.verbose.log_level_filter())
        .init();
    log::debug!("args: {:?}", args);

    let settings = GameSettings::new(args.size, args.difficulty);
    let generation = if args.eager {
        Generation::Eager
    } else {
        Generation::Deferred
    };
    let mut session = GameSession::new(
        settings,
        Commentator::new(Offline),
        Leaderboard::new(FileStore::new(&args.data_dir)),
    )
    .with_generation(generation);
    if let Some(seed) = args.seed {
        session = session.with_seed(seed);
    }

    session.new_game();
    println!("{HELP}\n");
    show(&session);

    let mut ticker = tokio::time::interval(TICK_INTERVAL);
    // the first tick fires immediately
    ticker.tick().await;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                session.tick();
                if session.poll_commentary() {
                    show_commentary(&session);
                }
            }
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                match line.parse::<Command>() {
                    Ok(Command::Quit) => break,
                    Ok(command) => apply(&mut session, command),
                    Err(err) => println!("{err:#}"),
                }
                for task in session.take_tasks() {
                    tokio::spawn(task);
                }
            }
        }
    }

    log::debug!("Bye after game {}", session.game_id());
    Ok(())
}

fn apply(session: &mut Session, command: Command) {
    let outcome = match command {
        Command::Reveal(coords) => session.reveal(coords),
        Command::Chord(coords) => session.chord(coords),
        Command::Flag(coords) => session.toggle_flag(coords),
        Command::NewGame(selection) => {
            session.new_game_with(selection.resolve(session.settings()));
            ActionOutcome::Updated
        }
        Command::SubmitWin(name) => {
            let category = session.settings();
            match session.submit_win(&name) {
                Some(entries) => {
                    let ranking: Vec<_> = entries
                        .into_iter()
                        .filter(|entry| entry.is_in(category.size, category.difficulty))
                        .collect();
                    print!("{}", render::leaderboard(category, &ranking));
                }
                None => println!("only a won game can be recorded"),
            }
            return;
        }
        Command::Leaderboard(selection) => {
            let category = selection.resolve(session.settings());
            let ranking = session.leaderboard_for(category.size, category.difficulty);
            print!("{}", render::leaderboard(category, &ranking));
            return;
        }
        Command::Help => {
            println!("{HELP}");
            return;
        }
        Command::Quit => return,
    };

    if !outcome.has_update() {
        println!("nothing happened");
        return;
    }
    show(session);
    if outcome == ActionOutcome::Won
        && let Some(best) = session.best_time()
    {
        println!("best so far: {}s by {}", best.time, best.player_name);
    }
}

fn show(session: &Session) {
    print!("{}", render::board(session.grid()));
    println!(
        "{}",
        render::status_line(session.status(), session.mines_left(), session.elapsed_secs())
    );
    show_commentary(session);
}

fn show_commentary(session: &Session) {
    if let Some(text) = session.commentary() {
        println!("\"{text}\"");
    }
}
