//! Turn state machine and round logic.

mod input;
mod output;
mod round;
mod session;
mod types;

pub use input::{parse_die_index, parse_guess, parse_modulo, Command};
pub use output::{Control, Line, Output};
pub use round::{resolve_round, RoundOutcome};
pub use session::{PhaseKind, Session, SessionConfig};
pub use types::{Party, Scoreboard, Verdict};
