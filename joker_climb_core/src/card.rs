use rand::Rng;
use rand::prelude::SliceRandom;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::EngineError;

// --- 核心数据结构定义 ---

/// 一副牌的张数：52 张标准牌 + 2 张王
pub const DECK_SIZE: usize = 54;

/// 花色 (Suit)
/// 变体的顺序就是理牌时的花色顺序，派生的 `Ord` 直接可用
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Serialize, Deserialize)]
pub enum Suit {
    Spade,   // 黑桃 ♠
    Heart,   // 红心 ♥
    Diamond, // 方块 ♦
    Club,    // 梅花 ♣
    Joker,   // 王
}

/// 点数 (Rank)
/// 判别值就是牌力 (strength)：小王 1 < 2 < ... < A(14) < 大王 15。
/// 这个映射决定了所有比较，不能改动。
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Serialize, Deserialize)]
#[repr(u8)]
pub enum Rank {
    LowJoker = 1,
    Two = 2,
    Three,
    Four,
    Five,
    Six,
    Seven,
    Eight,
    Nine,
    Ten,
    Jack,
    Queen,
    King,
    Ace,
    HighJoker,
}

/// 单张牌 (Card)
/// 牌是不可变的值对象，身份就是 (花色, 点数)。
/// 派生的 `Ord` 先比花色再比点数，正好是理牌顺序。
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Card {
    suit: Suit,
    rank: Rank,
}

/// 牌的紧凑编号，0..54，按 `build_deck` 的顺序排列
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct CardId(u8);

const STANDARD_SUITS: [Suit; 4] = [Suit::Spade, Suit::Heart, Suit::Diamond, Suit::Club];

const STANDARD_RANKS: [Rank; 13] = [
    Rank::Two, Rank::Three, Rank::Four, Rank::Five, Rank::Six, Rank::Seven, Rank::Eight,
    Rank::Nine, Rank::Ten, Rank::Jack, Rank::Queen, Rank::King, Rank::Ace,
];

impl Suit {
    /// 红心和方块是红色
    pub fn is_red(self) -> bool {
        matches!(self, Suit::Heart | Suit::Diamond)
    }

    fn name(self) -> &'static str {
        match self {
            Suit::Spade => "spades",
            Suit::Heart => "hearts",
            Suit::Diamond => "diamonds",
            Suit::Club => "clubs",
            Suit::Joker => "joker",
        }
    }
}

impl Rank {
    /// 牌力，用于所有大小比较
    pub fn strength(self) -> u8 {
        self as u8
    }

    pub fn is_joker(self) -> bool {
        matches!(self, Rank::LowJoker | Rank::HighJoker)
    }

    fn label(self) -> &'static str {
        match self {
            Rank::LowJoker => "LOW",
            Rank::Two => "2",
            Rank::Three => "3",
            Rank::Four => "4",
            Rank::Five => "5",
            Rank::Six => "6",
            Rank::Seven => "7",
            Rank::Eight => "8",
            Rank::Nine => "9",
            Rank::Ten => "10",
            Rank::Jack => "J",
            Rank::Queen => "Q",
            Rank::King => "K",
            Rank::Ace => "A",
            Rank::HighJoker => "HIGH",
        }
    }
}

impl Card {
    pub const LOW_JOKER: Card = Card { suit: Suit::Joker, rank: Rank::LowJoker };
    pub const HIGH_JOKER: Card = Card { suit: Suit::Joker, rank: Rank::HighJoker };

    /// 构造一张牌。王只能配 `Suit::Joker`，标准点数只能配四种标准花色。
    ///
    /// # Panics
    /// 点数与花色不匹配时 panic。
    pub const fn new(rank: Rank, suit: Suit) -> Card {
        assert!(
            matches!(rank, Rank::LowJoker | Rank::HighJoker) == matches!(suit, Suit::Joker),
            "jokers and only jokers use Suit::Joker"
        );
        Card { suit, rank }
    }

    /// 不 panic 的构造
    pub fn try_new(rank: Rank, suit: Suit) -> Option<Card> {
        (rank.is_joker() == (suit == Suit::Joker)).then_some(Card { suit, rank })
    }

    pub fn suit(self) -> Suit {
        self.suit
    }

    pub fn rank(self) -> Rank {
        self.rank
    }

    pub fn strength(self) -> u8 {
        self.rank.strength()
    }

    pub fn id(self) -> CardId {
        let idx = match self.rank {
            Rank::LowJoker => 52,
            Rank::HighJoker => 53,
            rank => self.suit as u8 * 13 + (rank.strength() - 2),
        };
        CardId(idx)
    }

    /// 界面上显示的字样：标准牌为 "点数+花色符号"，王显示 HIGH / LOW
    pub fn glyph(self) -> String {
        let symbol = match self.suit {
            Suit::Spade => "♠",
            Suit::Heart => "♥",
            Suit::Diamond => "♦",
            Suit::Club => "♣",
            Suit::Joker => return self.rank.label().to_string(),
        };
        format!("{}{}", self.rank.label(), symbol)
    }
}

impl CardId {
    pub fn index(self) -> u8 {
        self.0
    }

    pub fn card(self) -> Card {
        match self.0 {
            52 => Card::LOW_JOKER,
            53 => Card::HIGH_JOKER,
            n => Card {
                suit: STANDARD_SUITS[(n / 13) as usize],
                rank: STANDARD_RANKS[(n % 13) as usize],
            },
        }
    }
}

impl TryFrom<u8> for CardId {
    type Error = EngineError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if (value as usize) < DECK_SIZE {
            Ok(CardId(value))
        } else {
            Err(EngineError::InvalidCardId(value.to_string()))
        }
    }
}

impl From<CardId> for u8 {
    fn from(id: CardId) -> Self {
        id.0
    }
}

// --- 文本编号 ---
// 形如 "10-hearts"、"A-spades"、"joker-high"、"joker-low"

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.rank {
            Rank::LowJoker => write!(f, "joker-low"),
            Rank::HighJoker => write!(f, "joker-high"),
            rank => write!(f, "{}-{}", rank.label(), self.suit.name()),
        }
    }
}

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.card())
    }
}

impl fmt::Display for Suit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for Card {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || EngineError::InvalidCardId(s.to_string());
        let lower = s.trim().to_ascii_lowercase();
        let (value, suit) = lower.split_once('-').ok_or_else(invalid)?;

        if value == "joker" {
            return match suit {
                "low" => Ok(Card::LOW_JOKER),
                "high" => Ok(Card::HIGH_JOKER),
                _ => Err(invalid()),
            };
        }

        let suit = match suit {
            "spades" | "spade" => Suit::Spade,
            "hearts" | "heart" => Suit::Heart,
            "diamonds" | "diamond" => Suit::Diamond,
            "clubs" | "club" => Suit::Club,
            _ => return Err(invalid()),
        };
        let rank = STANDARD_RANKS
            .iter()
            .copied()
            .find(|r| r.label().eq_ignore_ascii_case(value))
            .ok_or_else(invalid)?;
        Ok(Card { suit, rank })
    }
}

impl FromStr for CardId {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<Card>().map(Card::id)
    }
}

impl TryFrom<String> for Card {
    type Error = EngineError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Card> for String {
    fn from(card: Card) -> Self {
        card.to_string()
    }
}

// --- 牌组 ---

/// 创建一副完整的 54 张牌（四种花色各 13 张，加大小王）
pub fn build_deck() -> Vec<Card> {
    let mut deck = Vec::with_capacity(DECK_SIZE);
    for &suit in &STANDARD_SUITS {
        for &rank in &STANDARD_RANKS {
            deck.push(Card { suit, rank });
        }
    }
    deck.push(Card::LOW_JOKER);
    deck.push(Card::HIGH_JOKER);
    deck
}

/// 洗牌 (Fisher–Yates)，随机源由调用方提供，测试中可用固定种子
pub fn shuffle<R: Rng + ?Sized>(deck: &mut [Card], rng: &mut R) {
    deck.shuffle(rng);
}

/// 检查一组牌是否恰好是一副完整的牌（顺序任意）
pub fn is_full_deck(cards: &[Card]) -> bool {
    if cards.len() != DECK_SIZE {
        return false;
    }
    let mut seen = [false; DECK_SIZE];
    for card in cards {
        let idx = card.id().index() as usize;
        if seen[idx] {
            return false;
        }
        seen[idx] = true;
    }
    true
}

/// 发牌：从牌堆顶（Vec 末尾）一张一张轮流发，从 0 号座位开始，直到发完。
/// 牌数不能整除座位数时，多出的牌按同样的轮转落在靠前的座位上。
///
/// # Panics
/// `seat_count` 为 0 时 panic。
pub fn deal(mut deck: Vec<Card>, seat_count: usize) -> Vec<Vec<Card>> {
    assert!(seat_count > 0, "seat_count must be positive");

    let mut hands = vec![Vec::with_capacity(deck.len() / seat_count + 1); seat_count];
    let mut seat = 0;
    while let Some(card) = deck.pop() {
        hands[seat].push(card);
        seat = (seat + 1) % seat_count;
    }
    hands
}

/// 理牌：先按花色（♠ ♥ ♦ ♣ 王），再按牌力从小到大。
/// 只影响显示，不影响出牌是否合法。
pub fn sort_hand(cards: &mut [Card]) {
    cards.sort_by_key(|c| (c.suit, c.strength()));
}

// --- 单元测试 ---
