use std::str::FromStr;

use anyhow::{Context, anyhow, bail};
use clearfield_core::{BoardSize, Coord2, Difficulty, GameSettings};

pub const HELP: &str = "\
commands:
  r X Y    reveal a cell
  c X Y    chord around a revealed number
  f X Y    toggle a flag
  n [SIZE] [DIFFICULTY]
           new game, optionally switching size (small, medium, large)
           or difficulty (easy, normal, hard)
  w NAME   record a won game
  l [SIZE] [DIFFICULTY]
           best times, for the current settings unless given
  h        this help
  q        quit";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Reveal(Coord2),
    Chord(Coord2),
    Flag(Coord2),
    NewGame(Selection),
    SubmitWin(String),
    Leaderboard(Selection),
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = anyhow::Error;

    fn from_str(line: &str) -> anyhow::Result<Self> {
        let line = line.trim();
        let (verb, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));

        Ok(match verb {
            "r" | "reveal" => Command::Reveal(parse_coords(rest)?),
            "c" | "chord" => Command::Chord(parse_coords(rest)?),
            "f" | "flag" => Command::Flag(parse_coords(rest)?),
            "n" | "new" => Command::NewGame(rest.parse()?),
            "w" | "win" => Command::SubmitWin(rest.trim().to_owned()),
            "l" | "leaderboard" => Command::Leaderboard(rest.parse()?),
            "h" | "help" | "?" => Command::Help,
            "q" | "quit" => Command::Quit,
            "" => bail!("empty command"),
            other => bail!("unknown command {other:?}"),
        })
    }
}

/// Size and difficulty picked on the command line, missing parts keep the current settings.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Selection {
    pub size: Option<BoardSize>,
    pub difficulty: Option<Difficulty>,
}

impl Selection {
    pub fn resolve(self, current: GameSettings) -> GameSettings {
        GameSettings::new(
            self.size.unwrap_or(current.size),
            self.difficulty.unwrap_or(current.difficulty),
        )
    }
}

impl FromStr for Selection {
    type Err = anyhow::Error;

    /// Words in any order, each either a size or a difficulty.
    fn from_str(args: &str) -> anyhow::Result<Self> {
        let mut selection = Self::default();
        for word in args.split_whitespace() {
            if let Ok(size) = word.parse::<BoardSize>() {
                if selection.size.replace(size).is_some() {
                    bail!("board size given twice");
                }
            } else if let Ok(difficulty) = word.parse::<Difficulty>() {
                if selection.difficulty.replace(difficulty).is_some() {
                    bail!("difficulty given twice");
                }
            } else {
                bail!("{word:?} is neither a board size nor a difficulty");
            }
        }
        Ok(selection)
    }
}

fn parse_coords(args: &str) -> anyhow::Result<Coord2> {
    let mut parts = args.split_whitespace();
    let (Some(x), Some(y), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(anyhow!("expected two coordinates, got {args:?}"));
    };
    let x = x.parse().with_context(|| format!("bad x coordinate {x:?}"))?;
    let y = y.parse().with_context(|| format!("bad y coordinate {y:?}"))?;
    Ok((x, y))
}
