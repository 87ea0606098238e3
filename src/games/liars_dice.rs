use std::fmt::Display;
use std::sync::OnceLock;

use dashmap::DashMap;
use rand::{thread_rng, Rng};

use crate::game::Game;

/// Maximum number of dice per hand.
const DICE_PER_HAND: usize = 5;
/// Faces on a die.
const FACES: u8 = 6;
/// Cap on the number of bids before only CHALLENGE/SPOT_ON remain legal.
const N_MAX: usize = 20;
/// Width of the sliding information-set window.
const WINDOW: usize = 3;

pub type Hand = [u8; DICE_PER_HAND];

/// Process-wide cache of (hand encoding, face) -> count of that face in the
/// hand. Built lazily; never invalidated, since it is a pure function of its
/// key.
fn face_count_cache() -> &'static DashMap<(u32, u8), u8> {
    static CACHE: OnceLock<DashMap<(u32, u8), u8>> = OnceLock::new();
    CACHE.get_or_init(DashMap::new)
}

fn encode_hand(hand: &Hand) -> u32 {
    hand.iter().fold(0u32, |acc, &d| acc * 10 + d as u32)
}

fn count_face(hand: &Hand, face: u8) -> u8 {
    let key = (encode_hand(hand), face);
    if let Some(count) = face_count_cache().get(&key) {
        return *count;
    }
    let count = hand.iter().filter(|&&d| d == face).count() as u8;
    face_count_cache().insert(key, count);
    count
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiarsDiceAction {
    Bid { count: u8, face: u8 },
    Challenge,
    SpotOn,
}

impl LiarsDiceAction {
    fn bid(count: u8, face: u8) -> Self {
        LiarsDiceAction::Bid { count, face }
    }

    fn as_bid(self) -> Option<(u8, u8)> {
        match self {
            LiarsDiceAction::Bid { count, face } => Some((count, face)),
            _ => None,
        }
    }
}

impl Display for LiarsDiceAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LiarsDiceAction::Bid { count, face } => write!(f, "{}{}", count, face),
            LiarsDiceAction::Challenge => write!(f, "CH"),
            LiarsDiceAction::SpotOn => write!(f, "SO"),
        }
    }
}

fn bid_greater_than(candidate: (u8, u8), last: (u8, u8)) -> bool {
    candidate.0 > last.0 || (candidate.0 == last.0 && candidate.1 > last.1)
}

fn all_bids() -> Vec<LiarsDiceAction> {
    let mut v = Vec::with_capacity((FACES as usize) * (FACES as usize));
    for count in 1..=FACES {
        for face in 1..=FACES {
            v.push(LiarsDiceAction::bid(count, face));
        }
    }
    v
}

/// Two-player, five-dice-per-hand Liar's Dice with a sliding three-bid
/// information-set window.
#[derive(Debug, Clone)]
pub struct LiarsDiceState {
    hands: [Hand; 2],
    last_bid: Option<(u8, u8)>,
    bid_count: usize,
    window: [Option<LiarsDiceAction>; WINDOW],
    cur_player: usize,
    terminal: bool,
    winner: Option<usize>,
}

impl LiarsDiceState {
    pub fn new() -> Self {
        Self {
            hands: [[0; DICE_PER_HAND]; 2],
            last_bid: None,
            bid_count: 0,
            window: [None; WINDOW],
            cur_player: 0,
            terminal: false,
            winner: None,
        }
    }

    fn shift_window(&mut self, a: LiarsDiceAction) {
        self.window = [Some(a), self.window[0], self.window[1]];
    }

    fn actual_count(&self, face: u8) -> u8 {
        count_face(&self.hands[0], face) + count_face(&self.hands[1], face)
    }

    fn window_code(slot: Option<LiarsDiceAction>) -> String {
        match slot {
            Some(a) => format!("{}", a),
            None => "00".to_string(),
        }
    }
}

impl Default for LiarsDiceState {
    fn default() -> Self {
        Self::new()
    }
}

impl Game for LiarsDiceState {
    type Action = LiarsDiceAction;

    fn begin_game(&mut self) {
        let mut rng = thread_rng();
        for hand in self.hands.iter_mut() {
            for die in hand.iter_mut() {
                *die = rng.gen_range(1..=FACES);
            }
            hand.sort_unstable_by(|a, b| b.cmp(a));
        }
        self.last_bid = None;
        self.bid_count = 0;
        self.window = [None; WINDOW];
        self.cur_player = 0;
        self.terminal = false;
        self.winner = None;
    }

    fn player_to_act(&self) -> usize {
        self.cur_player
    }

    fn actions(&self) -> Vec<LiarsDiceAction> {
        if self.terminal {
            return Vec::new();
        }
        if self.bid_count >= N_MAX {
            return vec![LiarsDiceAction::Challenge, LiarsDiceAction::SpotOn];
        }
        match self.last_bid {
            None => all_bids(),
            Some((c, f)) => {
                let own_count = count_face(&self.hands[self.cur_player], f);
                let cap = (self.num_players() - 1) * DICE_PER_HAND + own_count as usize;
                if c as usize > cap {
                    vec![LiarsDiceAction::Challenge]
                } else {
                    let mut v: Vec<LiarsDiceAction> = all_bids()
                        .into_iter()
                        .filter(|b| bid_greater_than(b.as_bid().unwrap(), (c, f)))
                        .collect();
                    v.push(LiarsDiceAction::Challenge);
                    v.push(LiarsDiceAction::SpotOn);
                    v
                }
            }
        }
    }

    fn make_move(&mut self, a: LiarsDiceAction) {
        assert!(!self.terminal, "make move in terminal state");
        assert!(
            self.actions().contains(&a),
            "invalid action {:?} for last_bid {:?}",
            a,
            self.last_bid
        );
        match a {
            LiarsDiceAction::Bid { count, face } => {
                self.last_bid = Some((count, face));
                self.bid_count += 1;
                self.shift_window(a);
                self.cur_player = 1 - self.cur_player;
            }
            LiarsDiceAction::Challenge => {
                let (c, f) = self.last_bid.expect("challenge without a prior bid");
                let actual = self.actual_count(f);
                let bidder = 1 - self.cur_player;
                self.winner = Some(if actual >= c as u8 { bidder } else { self.cur_player });
                self.shift_window(a);
                self.terminal = true;
            }
            LiarsDiceAction::SpotOn => {
                let (c, f) = self.last_bid.expect("spot-on without a prior bid");
                let actual = self.actual_count(f);
                let bidder = 1 - self.cur_player;
                self.winner = Some(if actual == c as u8 { self.cur_player } else { bidder });
                self.shift_window(a);
                self.terminal = true;
            }
        }
    }

    fn is_terminal(&self) -> bool {
        self.terminal
    }

    fn payout(&self) -> Vec<f64> {
        assert!(self.terminal, "payout on non-terminal state");
        let winner = self.winner.expect("terminal state without a winner");
        let mut out = vec![-1.0; 2];
        out[winner] = 1.0;
        out
    }

    fn information_set(&self) -> String {
        let hand = &self.hands[self.cur_player];
        let hand_str: String = hand.iter().map(|d| d.to_string()).collect();
        let limit_marker = if self.bid_count >= N_MAX { "L" } else { "N" };
        let window_str = self
            .window
            .iter()
            .map(|slot| Self::window_code(*slot))
            .collect::<Vec<_>>()
            .join("-");
        format!("{}:{}:{}", hand_str, limit_marker, window_str)
    }
}
