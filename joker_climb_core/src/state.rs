use crate::card::Card;
use crate::combo::{Combo, ComboKind};
use crate::config::GameConfig;
use crate::error::EngineError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type GameId = Uuid;
pub type SeatIndex = usize;

/// 座位数固定为 3
pub const SEAT_COUNT: usize = 3;

/// 引擎状态机。所有对手牌、桌面、轮次的修改都只能经过 `logic.rs` 中的操作，
/// 外部只能通过只读访问器和快照观察。
#[derive(Debug, Clone)]
pub struct GameState {
    pub(crate) game_id: Option<GameId>, // 每次开局重新生成
    pub(crate) config: GameConfig,
    pub(crate) seats: Vec<Seat>,
    pub(crate) phase: GamePhase,
    pub(crate) current_seat: Option<SeatIndex>,
    // 本局打出的所有牌，按出牌顺序
    pub(crate) table: Vec<Card>,
    pub(crate) plays: Vec<PlayRecord>,
    // 本轮最近一手被接受的牌；为 None 表示新一轮，任何牌型都可以出
    pub(crate) last_play: Option<PlayRecord>,
    pub(crate) winner: Option<SeatIndex>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Seat {
    pub name: String,
    pub hand: Vec<Card>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum GamePhase {
    Waiting,  // 等待玩家就座
    Dealing,  // 发牌中
    Playing,  // 出牌中
    Finished, // 有人出完了手牌
}

/// 一手被接受的出牌
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlayRecord {
    pub seat: SeatIndex,
    pub combo: Combo,
    pub cards: Vec<Card>,
}

/// 轮转的结果
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TurnAdvance {
    /// 轮到行动的座位
    pub next_seat: SeatIndex,
    /// 因无牌可出被自动跳过的座位，按轮转顺序
    pub skipped: Vec<SeatIndex>,
    /// 没有人能接上一手，本轮结束，下一位可以任意出牌
    pub round_reset: bool,
}

/// 一次成功出牌的结果
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum PlayOutcome {
    Won { winner: SeatIndex },
    NextTurn(TurnAdvance),
}

/// 提供给界面的状态快照
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameSnapshot {
    pub game_id: Option<GameId>,
    pub phase: GamePhase,
    pub seats: Vec<SeatView>,
    pub current_seat: Option<SeatIndex>,
    pub table: Vec<Card>,
    pub last_play_type: Option<ComboKind>,
    pub last_play: Option<PlayRecord>,
    pub winner: Option<SeatIndex>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SeatView {
    pub index: SeatIndex,
    pub name: String,
    pub hand_size: usize,
    // 对观察者隐藏的手牌为 None
    pub hand: Option<Vec<Card>>,
}

// --- GameState 的实现方法 ---

impl GameState {
    pub fn new(config: GameConfig) -> Self {
        let seats = config
            .seat_names
            .iter()
            .map(|name| Seat { name: name.clone(), hand: Vec::new() })
            .collect();
        GameState {
            game_id: None,
            config,
            seats,
            phase: GamePhase::Waiting,
            current_seat: None,
            table: Vec::new(),
            plays: Vec::new(),
            last_play: None,
            winner: None,
        }
    }

    pub fn game_id(&self) -> Option<GameId> {
        self.game_id
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn seat_count(&self) -> usize {
        self.seats.len()
    }

    pub fn seats(&self) -> &[Seat] {
        &self.seats
    }

    pub fn seat(&self, seat: SeatIndex) -> Result<&Seat, EngineError> {
        self.seats.get(seat).ok_or(EngineError::UnknownSeat(seat))
    }

    pub fn hand(&self, seat: SeatIndex) -> Result<&[Card], EngineError> {
        self.seat(seat).map(|s| s.hand.as_slice())
    }

    pub fn current_seat(&self) -> Option<SeatIndex> {
        self.current_seat
    }

    pub fn table(&self) -> &[Card] {
        &self.table
    }

    pub fn plays(&self) -> &[PlayRecord] {
        &self.plays
    }

    pub fn last_play(&self) -> Option<&PlayRecord> {
        self.last_play.as_ref()
    }

    pub fn last_play_type(&self) -> Option<ComboKind> {
        self.last_play.as_ref().map(|p| p.combo.kind)
    }

    pub(crate) fn last_combo(&self) -> Option<&Combo> {
        self.last_play.as_ref().map(|p| &p.combo)
    }

    pub fn winner(&self) -> Option<SeatIndex> {
        self.winner
    }

    /// 完整快照，包含所有人的手牌
    pub fn snapshot(&self) -> GameSnapshot {
        self.build_snapshot(|_| true)
    }

    /// 给某个观察者的快照：出牌阶段只能看到自己的手牌，结束后全部公开。
    /// `viewer` 为 None 时是旁观者视角。
    pub fn snapshot_for(&self, viewer: Option<SeatIndex>) -> GameSnapshot {
        let reveal_all = self.phase == GamePhase::Finished;
        self.build_snapshot(|idx| reveal_all || Some(idx) == viewer)
    }

    fn build_snapshot(&self, visible: impl Fn(SeatIndex) -> bool) -> GameSnapshot {
        let seats = self
            .seats
            .iter()
            .enumerate()
            .map(|(index, seat)| SeatView {
                index,
                name: seat.name.clone(),
                hand_size: seat.hand.len(),
                hand: visible(index).then(|| seat.hand.clone()),
            })
            .collect();

        GameSnapshot {
            game_id: self.game_id,
            phase: self.phase,
            seats,
            current_seat: self.current_seat,
            table: self.table.clone(),
            last_play_type: self.last_play_type(),
            last_play: self.last_play.clone(),
            winner: self.winner,
        }
    }
}

impl Default for GameState {
    fn default() -> Self {
        GameState::new(GameConfig::default())
    }
}
