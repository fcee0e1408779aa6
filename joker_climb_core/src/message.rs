use crate::card::{Card, CardId};
use crate::combo::{Combo, ComboKind};
use crate::error::EngineError;
use crate::state::{GameId, GameState, PlayOutcome, SeatIndex, TurnAdvance};
use rand::Rng;
use serde::{Deserialize, Serialize};

// --- 界面 -> 引擎 的指令 ---
// 界面把玩家的点击、拖动等操作翻译成这些指令。

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// 玩家就座
    AddSeat { name: String },
    /// 玩家离座
    RemoveSeat { seat: SeatIndex },
    /// 洗牌、发牌并开始出牌
    StartGame,
    /// 出牌
    Play { seat: SeatIndex, cards: Vec<CardId> },
    /// 过牌（只能在无牌可出时）
    Skip { seat: SeatIndex },
    /// 理牌
    SortHand { seat: SeatIndex },
    /// 拖动一张牌
    MoveCard { seat: SeatIndex, from: usize, to: usize },
    /// 请求出牌提示
    Hint { seat: SeatIndex },
    /// 重置牌局（确认由界面负责）
    Reset,
}

// --- 引擎 -> 界面 的事件 ---
// 每条指令执行成功后，引擎按发生顺序返回这些事件，界面据此更新显示。

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub enum GameEvent {
    SeatJoined { seat: SeatIndex, name: String },
    SeatLeft { seat: SeatIndex, name: String },

    /// 新的一局开始，手牌已发好
    GameStarted { game_id: GameId, hand_sizes: Vec<usize> },

    /// 一手牌被接受
    PlayAccepted { seat: SeatIndex, combo: Combo, cards: Vec<Card> },

    /// 玩家主动过牌
    TurnPassed { seat: SeatIndex },

    /// 玩家无牌可出，被自动跳过
    SeatSkipped { seat: SeatIndex },

    /// 无人能接，本轮结束
    RoundReset,

    /// 轮到下一个玩家行动
    NextToAct {
        seat: SeatIndex,
        /// 需要跟的牌型，None 表示可以任意出
        must_match: Option<ComboKind>,
    },

    GameWon { winner: SeatIndex, name: String },

    HandSorted { seat: SeatIndex, hand: Vec<Card> },
    CardMoved { seat: SeatIndex, from: usize, to: usize },

    /// 出牌提示，None 表示无牌可出
    Hint { seat: SeatIndex, cards: Option<Vec<Card>> },

    GameReset,
}

impl GameState {
    /// 执行一条指令，返回产生的事件。失败时状态不变。
    pub fn handle<R: Rng + ?Sized>(&mut self, command: Command, rng: &mut R) -> Result<Vec<GameEvent>, EngineError> {
        let events = match command {
            Command::AddSeat { name } => {
                let seat = self.add_seat(name.clone())?;
                vec![GameEvent::SeatJoined { seat, name }]
            }
            Command::RemoveSeat { seat } => {
                let removed = self.remove_seat(seat)?;
                vec![GameEvent::SeatLeft { seat, name: removed.name }]
            }
            Command::StartGame => {
                self.start_game(rng)?;
                self.game_started_events()
            }
            Command::Play { seat, cards } => match self.submit_play(seat, &cards)? {
                PlayOutcome::Won { winner } => {
                    let mut events = vec![self.play_accepted_event()];
                    events.push(GameEvent::GameWon { winner, name: self.seats[winner].name.clone() });
                    events
                }
                PlayOutcome::NextTurn(advance) => {
                    let mut events = vec![self.play_accepted_event()];
                    events.extend(self.turn_events(&advance));
                    events
                }
            },
            Command::Skip { seat } => {
                let advance = self.skip_turn(seat)?;
                let mut events = vec![GameEvent::TurnPassed { seat }];
                events.extend(self.turn_events(&advance));
                events
            }
            Command::SortHand { seat } => {
                let hand = self.sort_hand(seat)?.to_vec();
                vec![GameEvent::HandSorted { seat, hand }]
            }
            Command::MoveCard { seat, from, to } => {
                self.move_card(seat, from, to)?;
                vec![GameEvent::CardMoved { seat, from, to }]
            }
            Command::Hint { seat } => {
                let cards = self.suggest_play(seat)?;
                vec![GameEvent::Hint { seat, cards }]
            }
            Command::Reset => {
                self.reset_game();
                vec![GameEvent::GameReset]
            }
        };
        Ok(events)
    }

    /// 开局后的事件；用指定牌堆开局的调用方也可以用它通知界面
    pub fn game_started_events(&self) -> Vec<GameEvent> {
        let mut events = Vec::with_capacity(2);
        if let Some(game_id) = self.game_id {
            events.push(GameEvent::GameStarted {
                game_id,
                hand_sizes: self.seats.iter().map(|s| s.hand.len()).collect(),
            });
        }
        if let Some(seat) = self.current_seat {
            events.push(GameEvent::NextToAct { seat, must_match: None });
        }
        events
    }

    fn play_accepted_event(&self) -> GameEvent {
        // 出牌刚被接受，plays 的最后一条就是它
        match self.plays.last() {
            Some(record) => GameEvent::PlayAccepted {
                seat: record.seat,
                combo: record.combo,
                cards: record.cards.clone(),
            },
            None => unreachable!("play accepted without a record"),
        }
    }

    fn turn_events(&self, advance: &TurnAdvance) -> Vec<GameEvent> {
        let mut events: Vec<GameEvent> = advance.skipped.iter().map(|&seat| GameEvent::SeatSkipped { seat }).collect();
        if advance.round_reset {
            events.push(GameEvent::RoundReset);
        }
        events.push(GameEvent::NextToAct { seat: advance.next_seat, must_match: self.last_play_type() });
        events
    }
}
