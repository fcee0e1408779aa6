use thiserror::Error;

use crate::card::CardId;
use crate::combo::ComboKind;
use crate::state::{GamePhase, SeatIndex};

/// 引擎拒绝一次操作的原因。
/// 所有规则错误都是可恢复的：返回错误时状态没有任何改变，由调用方决定如何展示。
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("还没轮到你")]
    NotYourTurn,
    #[error("不是合法的牌型")]
    InvalidCombination,
    #[error("必须出和上一手相同的牌型：需要 {expected}，实际是 {found}")]
    MustMatchLastType { expected: ComboKind, found: ComboKind },
    #[error("必须比上一手大")]
    MustBeHigher,
    #[error("你有牌可以出，不能过")]
    ForcedPlayAvailable,
    #[error("需要正好 3 名玩家，当前 {found} 名")]
    InsufficientPlayers { found: usize },
    #[error("座位已满")]
    TableFull,
    #[error("当前阶段 {actual:?} 不能执行该操作（需要 {expected:?}）")]
    WrongPhase { expected: GamePhase, actual: GamePhase },
    #[error("座位 {0} 不存在")]
    UnknownSeat(SeatIndex),
    #[error("手里没有这张牌：{0}")]
    CardNotInHand(CardId),
    #[error("同一张牌选了两次：{0}")]
    DuplicateCard(CardId),
    #[error("无法识别的牌：{0}")]
    InvalidCardId(String),
    #[error("给定的牌堆不是一副完整的 54 张牌")]
    DeckMismatch,
    #[error("无效的移动：{from} -> {to}")]
    InvalidMove { from: usize, to: usize },
}
