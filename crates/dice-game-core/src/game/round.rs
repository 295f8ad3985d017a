//! Round resolution.

use super::types::Verdict;
use crate::dice::DieSet;
use crate::MODULUS;

/// Everything a resolved round shows the user
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoundOutcome {
    pub user_die: usize,
    pub peer_die: usize,
    pub user_value: u32,
    pub peer_value: u32,
    /// `(user_value + peer_value) mod MODULUS`
    pub result: u32,
    pub user_face: u32,
    pub peer_face: u32,
    pub verdict: Verdict,
}

/// Resolve a round from both contributions.
///
/// The user's face is looked up at the combined result while the peer's
/// face is looked up at the peer's own contribution. This asymmetry is
/// long-standing observed behaviour and is kept as is.
pub fn resolve_round(
    dice: &DieSet,
    user_die: usize,
    peer_die: usize,
    user_value: u32,
    peer_value: u32,
) -> RoundOutcome {
    let result = (user_value + peer_value) % MODULUS;
    let user_face = dice.face_at(user_die, result as usize);
    let peer_face = dice.face_at(peer_die, peer_value as usize);
    RoundOutcome {
        user_die,
        peer_die,
        user_value,
        peer_value,
        result,
        user_face,
        peer_face,
        verdict: Verdict::judge(user_face, peer_face),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classic() -> DieSet {
        DieSet::parse(&["2,2,4,4,9,9", "6,8,1,1,8,6", "7,5,3,7,5,3"]).unwrap()
    }

    #[test]
    fn test_result_wraps_modulo() {
        let outcome = resolve_round(&classic(), 0, 1, 3, 4);

        assert_eq!(outcome.result, 1);
        // user die 0 face 1 = 2, peer die 1 face 4 = 8
        assert_eq!(outcome.user_face, 2);
        assert_eq!(outcome.peer_face, 8);
        assert_eq!(outcome.verdict, Verdict::PeerWins);
    }

    #[test]
    fn test_peer_face_uses_own_contribution() {
        let dice = classic();
        let outcome = resolve_round(&dice, 0, 2, 5, 0);

        // result 5 indexes the user's die; the peer's die is indexed by 0
        assert_eq!(outcome.result, 5);
        assert_eq!(outcome.user_face, 9);
        assert_eq!(outcome.peer_face, 7);
        assert_eq!(outcome.verdict, Verdict::UserWins);
    }

    #[test]
    fn test_equal_faces_tie() {
        let dice = DieSet::parse(&["3,3,3,3,3,3", "3,3,3,3,3,3", "1,1,1,1,1,1"]).unwrap();
        for user in 0..MODULUS {
            for peer in 0..MODULUS {
                assert_eq!(resolve_round(&dice, 0, 1, user, peer).verdict, Verdict::Tie);
            }
        }
    }
}
