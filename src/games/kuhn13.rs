use std::fmt::{Display, Write};

use rand::seq::SliceRandom;
use rand::thread_rng;

use crate::game::Game;

/// Lowest rank in the 13-card deck. Ranks run 2..=14 with 14 == Ace.
const LOW_RANK: u8 = 2;
const HIGH_RANK: u8 = 14;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KuhnAction {
    Check,
    Bet,
    CallBet,
    Fold,
    Raise,
    CallRaise,
}

impl Display for KuhnAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let c = match self {
            KuhnAction::Check => 'c',
            KuhnAction::Bet => 'b',
            KuhnAction::CallBet => 'w',
            KuhnAction::Fold => 'f',
            KuhnAction::Raise => 'r',
            KuhnAction::CallRaise => 'l',
        };
        f.write_char(c)
    }
}

/// A 13-rank, single-raise Kuhn poker state for two players.
#[derive(Debug, Clone)]
pub struct Kuhn13State {
    hands: [u8; 2],
    history: Vec<KuhnAction>,
    pot: [u32; 2],
    cur_player: usize,
    terminal: bool,
    winner: Option<usize>,
}

impl Kuhn13State {
    pub fn new() -> Self {
        Self {
            hands: [0, 0],
            history: Vec::new(),
            pot: [1, 1],
            cur_player: 0,
            terminal: false,
            winner: None,
        }
    }

    fn higher_card_player(&self) -> usize {
        if self.hands[0] > self.hands[1] {
            0
        } else {
            1
        }
    }

    fn history_code(&self) -> String {
        let mut s = String::with_capacity(self.history.len());
        for a in &self.history {
            write!(s, "{}", a).expect("writing to String cannot fail");
        }
        s
    }
}

impl Default for Kuhn13State {
    fn default() -> Self {
        Self::new()
    }
}

impl Game for Kuhn13State {
    type Action = KuhnAction;

    fn begin_game(&mut self) {
        let mut ranks: Vec<u8> = (LOW_RANK..=HIGH_RANK).collect();
        ranks.shuffle(&mut thread_rng());
        self.hands = [ranks[0], ranks[1]];
        self.history.clear();
        self.pot = [1, 1];
        self.cur_player = 0;
        self.terminal = false;
        self.winner = None;
    }

    fn player_to_act(&self) -> usize {
        self.cur_player
    }

    fn actions(&self) -> Vec<KuhnAction> {
        if self.terminal {
            return Vec::new();
        }
        use KuhnAction::*;
        match self.history.last() {
            None => vec![Bet, Check],
            Some(Check) if self.history.len() == 1 => vec![Bet, Check],
            Some(Bet) => vec![CallBet, Fold, Raise],
            Some(Raise) => vec![CallRaise, Fold],
            _ => Vec::new(),
        }
    }

    fn make_move(&mut self, a: KuhnAction) {
        assert!(!self.terminal, "make move in terminal state");
        assert!(
            self.actions().contains(&a),
            "invalid action {:?} for history {:?}",
            a,
            self.history
        );
        use KuhnAction::*;
        match a {
            Bet => {
                self.pot[self.cur_player] += 1;
                self.history.push(Bet);
                self.cur_player = 1 - self.cur_player;
            }
            Check => {
                self.history.push(Check);
                if self.history.len() == 2 {
                    self.terminal = true;
                    self.winner = Some(self.higher_card_player());
                } else {
                    self.cur_player = 1 - self.cur_player;
                }
            }
            Fold => {
                self.history.push(Fold);
                self.terminal = true;
                self.winner = Some(1 - self.cur_player);
            }
            CallBet => {
                self.pot[self.cur_player] += 1;
                self.history.push(CallBet);
                self.terminal = true;
                self.winner = Some(self.higher_card_player());
            }
            CallRaise => {
                self.pot[self.cur_player] += 2;
                self.history.push(CallRaise);
                self.terminal = true;
                self.winner = Some(self.higher_card_player());
            }
            Raise => {
                self.pot[self.cur_player] += 3;
                self.history.push(Raise);
                self.cur_player = 1 - self.cur_player;
            }
        }
    }

    fn is_terminal(&self) -> bool {
        self.terminal
    }

    fn payout(&self) -> Vec<f64> {
        assert!(self.terminal, "payout on non-terminal state");
        let winner = self.winner.expect("terminal state without a winner");
        let loser = 1 - winner;
        let pot_total = (self.pot[0] + self.pot[1]) as f64;
        let mut out = vec![0.0; 2];
        out[winner] = pot_total - self.pot[winner] as f64;
        out[loser] = -(self.pot[loser] as f64);
        out
    }

    fn information_set(&self) -> String {
        format!("{}:{}", self.hands[self.cur_player], self.history_code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use KuhnAction::*;

    fn dealt(p0: u8, p1: u8) -> Kuhn13State {
        let mut s = Kuhn13State::new();
        s.begin_game();
        s.hands = [p0, p1];
        s
    }

    #[test]
    fn check_check_pays_higher_card() {
        let mut s = dealt(14, 2);
        s.make_move(Check);
        s.make_move(Check);
        assert!(s.is_terminal());
        assert_eq!(s.payout(), vec![1.0, -1.0]);
    }

    #[test]
    fn bet_call_pays_higher_card() {
        let mut s = dealt(2, 14);
        s.make_move(Bet);
        s.make_move(CallBet);
        assert!(s.is_terminal());
        assert_eq!(s.pot, [2, 2]);
        assert_eq!(s.payout(), vec![-2.0, 2.0]);
    }

    #[test]
    fn bet_raise_call_raise_pays_higher_card() {
        let mut s = dealt(13, 12);
        s.make_move(Bet);
        s.make_move(Raise);
        s.make_move(CallRaise);
        assert!(s.is_terminal());
        assert_eq!(s.pot, [4, 4]);
        assert_eq!(s.payout(), vec![4.0, -4.0]);
    }

    #[test]
    fn check_bet_fold_pays_opponent_of_folder() {
        // P0 checks, P1 bets, P0 folds: P1 wins regardless of card rank.
        let mut s = dealt(12, 13);
        s.make_move(Check);
        s.make_move(Bet);
        s.make_move(Fold);
        assert!(s.is_terminal());
        assert_eq!(s.pot, [1, 2]);
        assert_eq!(s.payout(), vec![-1.0, 1.0]);
    }

    #[test]
    fn actions_are_empty_iff_terminal() {
        let mut s = dealt(5, 6);
        assert!(!s.actions().is_empty());
        s.make_move(Check);
        s.make_move(Check);
        assert!(s.actions().is_empty());
    }

    #[test]
    fn deep_copies_agree_on_actions() {
        let mut s = dealt(9, 10);
        s.make_move(Bet);
        let copy = s.deep_copy();
        assert_eq!(s.actions(), copy.actions());
    }

    #[test]
    fn zero_sum_over_random_playouts() {
        let mut rng = thread_rng();
        for _ in 0..2000 {
            let mut s = Kuhn13State::new();
            s.begin_game();
            while !s.is_terminal() {
                let acts = s.actions();
                let a = *acts.choose(&mut rng).expect("non-terminal has actions");
                s.make_move(a);
            }
            let payout = s.payout();
            assert!((payout[0] + payout[1]).abs() < 1e-9);
        }
    }

    #[test]
    fn infoset_has_no_tab_or_newline() {
        let mut rng = thread_rng();
        for _ in 0..2000 {
            let mut s = Kuhn13State::new();
            s.begin_game();
            while !s.is_terminal() {
                let infoset = s.information_set();
                assert!(!infoset.contains('\t'));
                assert!(!infoset.contains('\n'));
                let acts = s.actions();
                let a = *acts.choose(&mut rng).expect("non-terminal has actions");
                s.make_move(a);
            }
        }
    }

    #[test]
    fn infosets_distinguish_hand_and_history() {
        let a = dealt(14, 2);
        let mut b = dealt(14, 2);
        b.make_move(Check);
        assert_ne!(a.information_set(), b.information_set());

        let c = dealt(13, 2);
        assert_ne!(a.information_set(), c.information_set());
    }

    /// Enumerates every reachable non-terminal state over every ordered pair
    /// of distinct ranks and every legal history prefix, grouping by the
    /// acting player's own card and the public history (the only two things
    /// it can observe). Two states sharing both must produce the same
    /// infoset string; two states differing in either must produce distinct
    /// strings, regardless of what the opponent holds.
    #[test]
    fn infoset_discipline_holds_under_full_enumeration() {
        use std::collections::HashMap;

        fn reachable_histories() -> Vec<Vec<KuhnAction>> {
            let mut out = vec![Vec::new()];
            let mut frontier = vec![Vec::new()];
            while let Some(h) = frontier.pop() {
                let mut s = Kuhn13State::new();
                s.begin_game();
                s.hands = [5, 6]; // arbitrary, actions() doesn't depend on hands
                for &a in &h {
                    s.make_move(a);
                }
                if s.is_terminal() {
                    continue;
                }
                for a in s.actions() {
                    let mut h2 = h.clone();
                    h2.push(a);
                    out.push(h2.clone());
                    frontier.push(h2);
                }
            }
            out
        }

        let mut by_key: HashMap<(u8, String), String> = HashMap::new();
        for p0 in LOW_RANK..=HIGH_RANK {
            for p1 in LOW_RANK..=HIGH_RANK {
                if p0 == p1 {
                    continue;
                }
                for history in reachable_histories() {
                    let mut s = Kuhn13State::new();
                    s.begin_game();
                    s.hands = [p0, p1];
                    let mut ok = true;
                    for &a in &history {
                        if s.is_terminal() || !s.actions().contains(&a) {
                            ok = false;
                            break;
                        }
                        s.make_move(a);
                    }
                    if !ok || s.is_terminal() {
                        continue;
                    }
                    let own_card = s.hands[s.cur_player];
                    let key = (own_card, s.history_code());
                    let infoset = s.information_set();
                    match by_key.get(&key) {
                        Some(seen) => assert_eq!(
                            *seen, infoset,
                            "same (own_card, history) produced different infosets"
                        ),
                        None => {
                            by_key.insert(key, infoset);
                        }
                    }
                }
            }
        }

        // Distinct keys must map to distinct infoset strings (the map
        // itself is injective on keys by construction, but check the
        // codomain side explicitly too).
        let mut seen_strings = std::collections::HashSet::new();
        for infoset in by_key.values() {
            assert!(
                seen_strings.insert(infoset.clone()),
                "distinct (own_card, history) pairs collided on infoset {infoset:?}"
            );
        }
    }
}
