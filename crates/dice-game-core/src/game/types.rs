//! Game types.

use std::fmt;

/// One side of the game
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Party {
    /// The person at the console
    User,
    /// The program
    Peer,
}

impl Party {
    /// Get the other side
    pub fn opponent(&self) -> Party {
        match self {
            Party::User => Party::Peer,
            Party::Peer => Party::User,
        }
    }
}

impl fmt::Display for Party {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Party::User => write!(f, "user"),
            Party::Peer => write!(f, "peer"),
        }
    }
}

/// Round verdict from the user's point of view
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    UserWins,
    PeerWins,
    Tie,
}

impl Verdict {
    /// Higher face wins, equal faces tie
    pub fn judge(user_face: u32, peer_face: u32) -> Self {
        match user_face.cmp(&peer_face) {
            std::cmp::Ordering::Greater => Verdict::UserWins,
            std::cmp::Ordering::Less => Verdict::PeerWins,
            std::cmp::Ordering::Equal => Verdict::Tie,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::UserWins => "You win this round!",
            Verdict::PeerWins => "I win this round!",
            Verdict::Tie => "It's a tie!",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Running tally of resolved rounds
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Scoreboard {
    pub user_wins: u32,
    pub peer_wins: u32,
    pub ties: u32,
}

impl Scoreboard {
    pub fn record(&mut self, verdict: Verdict) {
        match verdict {
            Verdict::UserWins => self.user_wins += 1,
            Verdict::PeerWins => self.peer_wins += 1,
            Verdict::Tie => self.ties += 1,
        }
    }

    pub fn rounds(&self) -> u32 {
        self.user_wins + self.peer_wins + self.ties
    }

    pub fn summary(&self) -> String {
        format!(
            "Score after {} round(s): you {}, me {}, ties {}.",
            self.rounds(),
            self.user_wins,
            self.peer_wins,
            self.ties
        )
    }
}
