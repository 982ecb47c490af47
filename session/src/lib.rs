//! Game orchestration around `clearfield-core`: the session state machine, elapsed time, flavor text and the
//! leaderboard.

pub use commentary::*;
pub use error::StoreError;
pub use leaderboard::*;
pub use session::*;
pub use stopwatch::*;
pub use store::*;

mod commentary;
mod error;
mod leaderboard;
mod session;
mod stopwatch;
mod store;
