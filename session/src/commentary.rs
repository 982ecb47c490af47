use anyhow::anyhow;
use clearfield_core::{BoardSize, Difficulty};
use futures_util::future::{self, BoxFuture, FutureExt};

pub const VICTORY_FALLBACK: &str = "You're a minesweeping legend!";
pub const VICTORY_ERROR_FALLBACK: &str = "Outstanding performance! You've cleared the field.";
pub const LOSS_FALLBACK: &str = "Boom! That was unexpected. Give it another shot!";
pub const LOSS_ERROR_FALLBACK: &str = "Watch your step next time! The mines are tricky.";

/// Name used in the victory prompt, the real name is only known once the win is submitted.
pub const VICTORY_PLAYER: &str = "Champion";

/// Third-party text generation, free to fail in any way it likes.
pub trait TextGenerator: Send + Sync {
    fn generate(&self, prompt: String) -> BoxFuture<'static, anyhow::Result<String>>;
}

/// Generator for when no backend is configured, every request fails over to the fallback text.
#[derive(Copy, Clone, Debug, Default)]
pub struct Offline;

impl TextGenerator for Offline {
    fn generate(&self, _prompt: String) -> BoxFuture<'static, anyhow::Result<String>> {
        future::ready(Err(anyhow!("no text generation backend configured"))).boxed()
    }
}

/// Flavor text for wins and losses. The returned futures always resolve to something printable.
#[derive(Clone, Debug, Default)]
pub struct Commentator<G> {
    generator: G,
}

impl<G: TextGenerator> Commentator<G> {
    pub fn new(generator: G) -> Self {
        Self { generator }
    }

    pub fn victory_message(
        &self,
        player_name: &str,
        time_secs: u32,
        size: BoardSize,
        difficulty: Difficulty,
    ) -> BoxFuture<'static, String> {
        let prompt = format!(
            "Player {player_name} just won a Minesweeper game on {size} board with {difficulty} difficulty in \
             {time_secs} seconds. Write a short, encouraging, and witty 1-sentence victory message in the style of a \
             witty game commentator."
        );
        let request = self.generator.generate(prompt);
        async move { settle(request.await, VICTORY_FALLBACK, VICTORY_ERROR_FALLBACK, "victory") }.boxed()
    }

    pub fn loss_message(&self) -> BoxFuture<'static, String> {
        let prompt = "A player just hit a mine in Minesweeper and lost. Write a short, funny, 1-sentence supportive \
                      message encouraging them to try again."
            .to_owned();
        let request = self.generator.generate(prompt);
        async move { settle(request.await, LOSS_FALLBACK, LOSS_ERROR_FALLBACK, "loss") }.boxed()
    }
}

fn settle(result: anyhow::Result<String>, empty: &str, failed: &str, kind: &str) -> String {
    match result {
        Ok(text) if text.trim().is_empty() => empty.to_owned(),
        Ok(text) => text.trim().to_owned(),
        Err(err) => {
            log::error!("Could not generate {} message: {:#}", kind, err);
            failed.to_owned()
        }
    }
}
