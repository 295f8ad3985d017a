//! The turn state machine.
//!
//! A [`Session`] owns all mutable game state. The driver feeds it one line
//! at a time through [`Session::handle_line`] and renders the returned
//! [`Output`]; every transition runs to completion synchronously.

use super::input::{parse_die_index, parse_guess, parse_modulo, Command};
use super::output::{Control, Output};
use super::round::{resolve_round, RoundOutcome};
use super::types::{Party, Scoreboard};
use crate::crypto::Commitment;
use crate::dice::{DieSet, ProbabilityMatrix};
use crate::MODULUS;
use rand::rngs::{OsRng, ThreadRng};
use rand::{CryptoRng, Rng, RngCore};
use std::collections::BTreeSet;
use std::num::NonZeroU32;
use tracing::{debug, info, trace};

/// Range of the first-player coin
const FIRST_PLAYER_RANGE: u32 = 2;

/// Session settings supplied by the driver
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SessionConfig {
    /// Stop after this many resolved rounds; `None` plays until `X`
    pub max_rounds: Option<NonZeroU32>,
}

/// Current phase, carrying exactly the state that is valid in it
#[derive(Debug)]
enum Phase {
    DeterminingFirstPlayer {
        commitment: Commitment,
    },
    SelectingDice {
        turn_owner: Party,
        used: BTreeSet<usize>,
        peer_die: Option<usize>,
    },
    AwaitingModuloReveal {
        turn_owner: Party,
        user_die: usize,
        peer_die: usize,
        commitment: Commitment,
    },
    Finished,
}

/// Data-free view of the current phase
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PhaseKind {
    DeterminingFirstPlayer,
    SelectingDice,
    AwaitingModuloReveal,
    Finished,
}

impl Phase {
    fn kind(&self) -> PhaseKind {
        match self {
            Phase::DeterminingFirstPlayer { .. } => PhaseKind::DeterminingFirstPlayer,
            Phase::SelectingDice { .. } => PhaseKind::SelectingDice,
            Phase::AwaitingModuloReveal { .. } => PhaseKind::AwaitingModuloReveal,
            Phase::Finished => PhaseKind::Finished,
        }
    }
}

/// A game session between the user and the peer.
///
/// Commitments draw from `C`, which must be a cryptographic source. The
/// peer's die picks are not committed and draw from `P`.
pub struct Session<C = OsRng, P = ThreadRng> {
    dice: DieSet,
    config: SessionConfig,
    phase: Phase,
    scoreboard: Scoreboard,
    last_round: Option<RoundOutcome>,
    commit_rng: C,
    pick_rng: P,
}

impl Session {
    /// Create a session backed by the OS entropy source
    pub fn new(dice: DieSet, config: SessionConfig) -> Self {
        Self::with_rngs(dice, config, OsRng, rand::thread_rng())
    }
}

impl<C, P> Session<C, P>
where
    C: RngCore + CryptoRng,
    P: Rng,
{
    /// Create a session with explicit randomness sources.
    ///
    /// The first-player commitment is made here, before any input is seen.
    pub fn with_rngs(dice: DieSet, config: SessionConfig, mut commit_rng: C, pick_rng: P) -> Self {
        let commitment = Commitment::commit(FIRST_PLAYER_RANGE, &mut commit_rng);
        trace!(digest = %commitment.digest(), "committed first-player value");
        Self {
            dice,
            config,
            phase: Phase::DeterminingFirstPlayer { commitment },
            scoreboard: Scoreboard::default(),
            last_round: None,
            commit_rng,
            pick_rng,
        }
    }

    /// Opening prompt for the first-player guess
    pub fn start(&self) -> Output {
        let mut out = Output::default();
        if let Phase::DeterminingFirstPlayer { commitment } = &self.phase {
            out.say("Let's determine who makes the first move.");
            out.say(format!(
                "I selected a random value in the range 0..1 (HMAC={}).",
                commitment.digest()
            ));
            out.say("Try to guess my selection.");
            out.say("0 - 0");
            out.say("1 - 1");
            push_menu_footer(&mut out);
        }
        out
    }

    /// Process one line of input
    pub fn handle_line(&mut self, line: &str) -> Output {
        let mut out = Output::default();
        if let Phase::Finished = self.phase {
            out.control = Control::Exit;
            return out;
        }

        match Command::parse(line.trim()) {
            Command::Exit => self.exit(&mut out),
            Command::Help => self.help(&mut out),
            Command::Value(input) => {
                let phase = std::mem::replace(&mut self.phase, Phase::Finished);
                self.phase = match phase {
                    Phase::DeterminingFirstPlayer { commitment } => {
                        self.on_guess(commitment, input, &mut out)
                    }
                    Phase::SelectingDice {
                        turn_owner,
                        used,
                        peer_die,
                    } => self.on_die_choice(turn_owner, used, peer_die, input, &mut out),
                    Phase::AwaitingModuloReveal {
                        turn_owner,
                        user_die,
                        peer_die,
                        commitment,
                    } => self.on_modulo(turn_owner, user_die, peer_die, commitment, input, &mut out),
                    Phase::Finished => Phase::Finished,
                };
                if let Phase::Finished = self.phase {
                    out.control = Control::Exit;
                }
            }
        }
        debug!(phase = ?self.phase.kind(), turn_owner = ?self.turn_owner(), "transition");
        out
    }

    pub fn phase(&self) -> PhaseKind {
        self.phase.kind()
    }

    /// Owner of the current round; `None` until the first player is known
    pub fn turn_owner(&self) -> Option<Party> {
        match &self.phase {
            Phase::SelectingDice { turn_owner, .. }
            | Phase::AwaitingModuloReveal { turn_owner, .. } => Some(*turn_owner),
            Phase::DeterminingFirstPlayer { .. } | Phase::Finished => None,
        }
    }

    /// Dice claimed in the current selection phase
    pub fn used_dice(&self) -> BTreeSet<usize> {
        match &self.phase {
            Phase::SelectingDice { used, .. } => used.clone(),
            Phase::AwaitingModuloReveal {
                user_die, peer_die, ..
            } => BTreeSet::from([*user_die, *peer_die]),
            Phase::DeterminingFirstPlayer { .. } | Phase::Finished => BTreeSet::new(),
        }
    }

    pub fn scoreboard(&self) -> Scoreboard {
        self.scoreboard
    }

    pub fn last_round(&self) -> Option<&RoundOutcome> {
        self.last_round.as_ref()
    }

    pub fn dice(&self) -> &DieSet {
        &self.dice
    }

    fn exit(&mut self, out: &mut Output) {
        out.say("Thanks for playing. Bye!");
        if self.scoreboard.rounds() > 0 {
            out.say(self.scoreboard.summary());
        }
        info!(rounds = self.scoreboard.rounds(), "session ended by user");
        self.phase = Phase::Finished;
        out.control = Control::Exit;
    }

    fn help(&self, out: &mut Output) {
        match &self.phase {
            Phase::DeterminingFirstPlayer { .. } => {
                out.say("Help: Try to guess the random value selected to determine who goes first.");
            }
            Phase::SelectingDice { .. } => {
                out.say("Probability of the win for the die in each row against the die in each column:");
                for line in ProbabilityMatrix::compute(&self.dice).render() {
                    out.say(line);
                }
            }
            Phase::AwaitingModuloReveal { .. } => {
                out.say(format!(
                    "Help: Enter a number between 0 and {}. It is added to my number modulo {} to pick the throw.",
                    MODULUS - 1,
                    MODULUS
                ));
            }
            Phase::Finished => {}
        }
    }

    fn on_guess(&mut self, commitment: Commitment, input: &str, out: &mut Output) -> Phase {
        let guess = match parse_guess(input) {
            Ok(guess) => guess,
            Err(e) => {
                out.reject(e.to_string());
                return Phase::DeterminingFirstPlayer { commitment };
            }
        };

        let digest = commitment.digest();
        let reveal = commitment.reveal();
        out.say(format!("My selection: {} (KEY={}).", reveal.value, reveal.key));

        let first = if guess == reveal.value {
            Party::User
        } else {
            Party::Peer
        };
        debug_assert!(reveal.verify(&digest));
        info!(guess, secret = reveal.value, first = %first, "first player determined");

        if first == Party::User {
            out.say("You make the first move.");
        }
        self.enter_selection(first, out)
    }

    fn enter_selection(&mut self, turn_owner: Party, out: &mut Output) -> Phase {
        let mut used = BTreeSet::new();
        let peer_die = if turn_owner == Party::Peer {
            let die = self.pick_unused(&mut used);
            out.say(format!(
                "I make the first move and choose the {} dice.",
                self.dice.all()[die]
            ));
            Some(die)
        } else {
            None
        };
        self.push_die_menu(&used, out);
        Phase::SelectingDice {
            turn_owner,
            used,
            peer_die,
        }
    }

    fn on_die_choice(
        &mut self,
        turn_owner: Party,
        mut used: BTreeSet<usize>,
        peer_die: Option<usize>,
        input: &str,
        out: &mut Output,
    ) -> Phase {
        let user_die = match parse_die_index(input, self.dice.len(), &used) {
            Ok(index) => index,
            Err(e) => {
                out.reject(e.to_string());
                return Phase::SelectingDice {
                    turn_owner,
                    used,
                    peer_die,
                };
            }
        };

        used.insert(user_die);
        out.say(format!("You chose the {} dice.", self.dice.all()[user_die]));

        let peer_die = match peer_die {
            Some(die) => die,
            None => {
                let die = self.pick_unused(&mut used);
                out.say(format!("I choose the {} dice.", self.dice.all()[die]));
                die
            }
        };
        debug!(user_die, peer_die, "dice selected");

        let commitment = Commitment::commit(MODULUS, &mut self.commit_rng);
        trace!(digest = %commitment.digest(), "committed modulo value");
        out.say(format!(
            "I selected a random value in the range 0..{} (HMAC={}).",
            MODULUS - 1,
            commitment.digest()
        ));
        out.say(format!("Add your number modulo {}.", MODULUS));
        for i in 0..MODULUS {
            out.say(format!("{} - {}", i, i));
        }
        push_menu_footer(out);

        Phase::AwaitingModuloReveal {
            turn_owner,
            user_die,
            peer_die,
            commitment,
        }
    }

    fn on_modulo(
        &mut self,
        turn_owner: Party,
        user_die: usize,
        peer_die: usize,
        commitment: Commitment,
        input: &str,
        out: &mut Output,
    ) -> Phase {
        let user_value = match parse_modulo(input) {
            Ok(value) => value,
            Err(e) => {
                out.reject(e.to_string());
                return Phase::AwaitingModuloReveal {
                    turn_owner,
                    user_die,
                    peer_die,
                    commitment,
                };
            }
        };

        let reveal = commitment.reveal();
        let outcome = resolve_round(&self.dice, user_die, peer_die, user_value, reveal.value);

        out.say(format!("Your selection: {}.", user_value));
        out.say(format!("My number is {} (KEY={}).", reveal.value, reveal.key));
        out.say(format!(
            "The result is {} + {} = {} (mod {}).",
            reveal.value, user_value, outcome.result, MODULUS
        ));
        out.say(format!("Your throw is {}.", outcome.user_face));
        out.say(format!("My throw is {}.", outcome.peer_face));
        out.say(outcome.verdict.as_str());

        info!(
            user_face = outcome.user_face,
            peer_face = outcome.peer_face,
            verdict = ?outcome.verdict,
            "round resolved"
        );
        self.scoreboard.record(outcome.verdict);
        self.last_round = Some(outcome);

        if let Some(max) = self.config.max_rounds {
            if self.scoreboard.rounds() >= max.get() {
                out.say("That was the last round.");
                out.say(self.scoreboard.summary());
                info!(rounds = max.get(), "round limit reached");
                return Phase::Finished;
            }
        }

        self.enter_selection(turn_owner.opponent(), out)
    }

    /// Rejection-sample an unused die and mark it used
    fn pick_unused(&mut self, used: &mut BTreeSet<usize>) -> usize {
        loop {
            let candidate = self.pick_rng.gen_range(0..self.dice.len());
            if used.insert(candidate) {
                return candidate;
            }
        }
    }

    fn push_die_menu(&self, used: &BTreeSet<usize>, out: &mut Output) {
        out.say("Choose your dice:");
        for (index, die) in self.dice.all().iter().enumerate() {
            if used.contains(&index) {
                out.say(format!("{} - {}: Selected by another player.", index, die));
            } else {
                out.say(format!("{} - {}", index, die));
            }
        }
        push_menu_footer(out);
    }
}

fn push_menu_footer(out: &mut Output) {
    out.say("X - exit");
    out.say("? - help");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::InputError;
    use crate::game::Verdict;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn classic() -> DieSet {
        DieSet::parse(&["2,2,4,4,9,9", "6,8,1,1,8,6", "7,5,3,7,5,3"]).unwrap()
    }

    fn session(seed: u64) -> Session<StdRng, StdRng> {
        Session::with_rngs(
            classic(),
            SessionConfig::default(),
            StdRng::seed_from_u64(seed),
            StdRng::seed_from_u64(seed.wrapping_add(1)),
        )
    }

    /// The value the session's first commitment hides, read from a cloned rng
    fn first_secret(seed: u64) -> u32 {
        let mut probe = StdRng::seed_from_u64(seed);
        Commitment::commit(FIRST_PLAYER_RANGE, &mut probe)
            .reveal()
            .value
    }

    fn winning_guess(seed: u64) -> &'static str {
        if first_secret(seed) == 0 {
            "0"
        } else {
            "1"
        }
    }

    fn losing_guess(seed: u64) -> &'static str {
        if first_secret(seed) == 0 {
            "1"
        } else {
            "0"
        }
    }

    #[test]
    fn test_start_shows_commitment() {
        let s = session(1);
        let text = s.start().stdout_text();

        assert!(text.contains("range 0..1 (HMAC="));
        assert!(text.contains("X - exit"));
        assert_eq!(s.phase(), PhaseKind::DeterminingFirstPlayer);
        assert_eq!(s.turn_owner(), None);
    }

    #[test]
    fn test_invalid_guess_keeps_phase() {
        let mut s = session(2);
        let out = s.handle_line("9");

        assert_eq!(out.stderr_text(), InputError::InvalidGuess.to_string());
        assert_eq!(out.control, Control::Continue);
        assert_eq!(s.phase(), PhaseKind::DeterminingFirstPlayer);
        assert!(s.used_dice().is_empty());
    }

    #[test]
    fn test_correct_guess_gives_user_first_move() {
        let seed = 3;
        let mut s = session(seed);
        let out = s.handle_line(winning_guess(seed));

        assert!(out.stdout_text().contains("You make the first move."));
        assert_eq!(s.turn_owner(), Some(Party::User));
        assert_eq!(s.phase(), PhaseKind::SelectingDice);
        assert!(s.used_dice().is_empty());
    }

    #[test]
    fn test_wrong_guess_lets_peer_pick_first() {
        let seed = 4;
        let mut s = session(seed);
        let out = s.handle_line(losing_guess(seed));

        assert!(out.stdout_text().contains("I make the first move and choose"));
        assert_eq!(s.turn_owner(), Some(Party::Peer));
        assert_eq!(s.used_dice().len(), 1);
        assert!(out.stdout_text().contains("Selected by another player."));
    }

    #[test]
    fn test_first_reveal_matches_commitment() {
        let seed = 5;
        let mut s = session(seed);
        let start = s.start().stdout_text();
        let out = s.handle_line("0").stdout_text();

        let hmac = start.split("HMAC=").nth(1).unwrap().split(')').next().unwrap();
        let reveal_line = out.lines().find(|l| l.starts_with("My selection:")).unwrap();
        let value: u32 = reveal_line["My selection: ".len()..]
            .split(' ')
            .next()
            .unwrap()
            .parse()
            .unwrap();
        let key_hex = reveal_line.split("KEY=").nth(1).unwrap().trim_end_matches(").");
        let key: [u8; 32] = hex::decode(key_hex).unwrap().try_into().unwrap();
        let digest: [u8; 32] = hex::decode(hmac).unwrap().try_into().unwrap();

        assert_eq!(value, first_secret(seed));
        assert!(crate::crypto::CommitmentDigest::from_bytes(digest)
            .verify(value, &crate::crypto::HmacKey::from_bytes(key)));
    }

    #[test]
    fn test_used_die_is_rejected() {
        let seed = 6;
        let mut s = session(seed);
        s.handle_line(losing_guess(seed));
        let taken = *s.used_dice().iter().next().unwrap();

        let out = s.handle_line(&taken.to_string());

        assert_eq!(
            out.stderr_text(),
            "This dice is unavailable. Please select another dice."
        );
        assert_eq!(s.phase(), PhaseKind::SelectingDice);
        assert_eq!(s.used_dice(), BTreeSet::from([taken]));
    }

    #[test]
    fn test_out_of_range_and_garbage_die_rejected() {
        let seed = 7;
        let mut s = session(seed);
        s.handle_line(winning_guess(seed));

        assert!(s.handle_line("3").has_errors());
        assert!(s.handle_line("one").has_errors());
        assert!(s.handle_line("-1").has_errors());
        assert_eq!(s.phase(), PhaseKind::SelectingDice);
        assert!(s.used_dice().is_empty());
    }

    #[test]
    fn test_user_first_then_peer_picks_other_die() {
        let seed = 8;
        let mut s = session(seed);
        s.handle_line(winning_guess(seed));

        let out = s.handle_line("0");
        let text = out.stdout_text();

        assert!(text.contains("You chose the [2,2,4,4,9,9] dice."));
        assert!(text.contains("I choose the"));
        assert!(text.contains("range 0..5 (HMAC="));
        assert_eq!(s.phase(), PhaseKind::AwaitingModuloReveal);
        let used = s.used_dice();
        assert_eq!(used.len(), 2);
        assert!(used.contains(&0));
    }

    #[test]
    fn test_invalid_modulo_keeps_phase() {
        let seed = 9;
        let mut s = session(seed);
        s.handle_line(winning_guess(seed));
        s.handle_line("0");

        for bad in ["6", "10", "a", ""] {
            let out = s.handle_line(bad);
            assert_eq!(out.stderr_text(), InputError::InvalidModulo.to_string());
        }
        assert_eq!(s.phase(), PhaseKind::AwaitingModuloReveal);
    }

    #[test]
    fn test_round_resolves_and_flips_turn() {
        let seed = 10;
        let mut s = session(seed);
        s.handle_line(winning_guess(seed));
        s.handle_line("0");

        let out = s.handle_line("3");
        let text = out.stdout_text();
        let round = s.last_round().unwrap().clone();

        assert_eq!(round.user_die, 0);
        assert!(round.peer_die == 1 || round.peer_die == 2);
        assert_eq!(round.user_value, 3);
        assert_eq!(round.result, (3 + round.peer_value) % MODULUS);
        assert_eq!(round.user_face, s.dice().face_at(0, round.result as usize));
        assert_eq!(
            round.peer_face,
            s.dice().face_at(round.peer_die, round.peer_value as usize)
        );
        assert_eq!(round.verdict, Verdict::judge(round.user_face, round.peer_face));
        assert!(text.contains(&format!("Your throw is {}.", round.user_face)));
        assert!(text.contains(&format!("My throw is {}.", round.peer_face)));
        assert!(text.contains(round.verdict.as_str()));

        // Next round belongs to the peer, who has already picked again.
        assert_eq!(s.turn_owner(), Some(Party::Peer));
        assert_eq!(s.phase(), PhaseKind::SelectingDice);
        assert_eq!(s.used_dice().len(), 1);
        assert_eq!(s.scoreboard().rounds(), 1);
    }

    #[test]
    fn test_help_does_not_change_state() {
        let seed = 11;
        let mut s = session(seed);

        assert!(s.handle_line("?").stdout_text().contains("guess"));
        assert_eq!(s.phase(), PhaseKind::DeterminingFirstPlayer);

        s.handle_line(winning_guess(seed));
        let table = s.handle_line("?").stdout_text();
        assert!(table.contains("Dice 2"));
        assert!(table.contains("0.3333"));
        assert_eq!(s.phase(), PhaseKind::SelectingDice);

        s.handle_line("1");
        assert!(s.handle_line("?").stdout_text().contains("between 0 and 5"));
        assert_eq!(s.phase(), PhaseKind::AwaitingModuloReveal);
    }

    #[test]
    fn test_exit_from_every_phase() {
        let seed = 12;
        for steps in 0..3 {
            let mut s = session(seed);
            let inputs = [winning_guess(seed), "2"];
            for input in &inputs[..steps] {
                s.handle_line(input);
            }

            let out = s.handle_line("X");
            assert!(out.is_exit());
            assert!(out.stdout_text().starts_with("Thanks for playing. Bye!"));
            assert_eq!(s.phase(), PhaseKind::Finished);

            let after = s.handle_line("0");
            assert!(after.is_exit());
            assert!(after.lines.is_empty());
        }
    }

    #[test]
    fn test_round_limit_finishes_session() {
        let seed = 13;
        let mut s = Session::with_rngs(
            classic(),
            SessionConfig {
                max_rounds: NonZeroU32::new(1),
            },
            StdRng::seed_from_u64(seed),
            StdRng::seed_from_u64(seed + 1),
        );
        s.handle_line(winning_guess(seed));
        s.handle_line("0");
        let out = s.handle_line("0");

        assert!(out.is_exit());
        assert!(out.stdout_text().contains("Score after 1 round(s)"));
        assert_eq!(s.phase(), PhaseKind::Finished);
    }
}
