use crate::card::*;
use crate::combo::{find_legal_play, has_legal_play, validate_play};
use crate::error::EngineError;
use crate::state::*;
use rand::Rng;
use std::collections::HashSet;
use tracing::{debug, info};
use uuid::Uuid;

// --- 就座 ---

impl GameState {
    /// 新玩家就座，返回座位号。只能在等待阶段进行。
    pub fn add_seat(&mut self, name: impl Into<String>) -> Result<SeatIndex, EngineError> {
        self.require_phase(GamePhase::Waiting)?;
        if self.seats.len() >= SEAT_COUNT {
            return Err(EngineError::TableFull);
        }
        self.seats.push(Seat { name: name.into(), hand: Vec::new() });
        Ok(self.seats.len() - 1)
    }

    /// 玩家离座，后面的座位号依次前移
    pub fn remove_seat(&mut self, seat: SeatIndex) -> Result<Seat, EngineError> {
        self.require_phase(GamePhase::Waiting)?;
        self.seat(seat)?;
        Ok(self.seats.remove(seat))
    }
}

// --- 核心游戏流程函数 ---

impl GameState {
    /// 开始新的一局
    ///
    /// - 需要正好 3 名玩家，且处于等待阶段。
    /// - 创建一副新牌并用调用方提供的随机源洗牌。
    /// - 轮流发牌，每人 18 张，牌堆发完。
    /// - 进入出牌阶段，0 号座位先出。
    pub fn start_game<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<(), EngineError> {
        self.check_can_start()?;
        let mut deck = build_deck();
        shuffle(&mut deck, rng);
        self.deal_and_begin(deck);
        Ok(())
    }

    /// 用给定的牌堆顺序开局，不洗牌。牌堆必须是完整的一副牌。
    pub fn start_game_with_deck(&mut self, deck: Vec<Card>) -> Result<(), EngineError> {
        self.check_can_start()?;
        if !is_full_deck(&deck) {
            return Err(EngineError::DeckMismatch);
        }
        self.deal_and_begin(deck);
        Ok(())
    }

    fn check_can_start(&self) -> Result<(), EngineError> {
        self.require_phase(GamePhase::Waiting)?;
        if self.seats.len() != SEAT_COUNT {
            return Err(EngineError::InsufficientPlayers { found: self.seats.len() });
        }
        Ok(())
    }

    fn deal_and_begin(&mut self, deck: Vec<Card>) {
        self.phase = GamePhase::Dealing;
        let game_id = Uuid::new_v4();
        self.game_id = Some(game_id);

        for (seat, mut hand) in self.seats.iter_mut().zip(deal(deck, SEAT_COUNT)) {
            if self.config.auto_sort {
                sort_hand(&mut hand);
            }
            seat.hand = hand;
        }

        self.table.clear();
        self.plays.clear();
        self.last_play = None;
        self.winner = None;
        self.current_seat = Some(0);
        self.phase = GamePhase::Playing;
        info!(%game_id, "发牌完成，开始出牌");
    }

    /// 处理一次出牌
    ///
    /// 依次检查：阶段、座位、是否轮到、所选的牌是否都在手里、牌型、能否压过上一手。
    /// 任何一步失败都直接返回错误，状态不变。
    /// 成功后把牌从手中移到桌面，记录为上一手；手牌出完则该玩家获胜，否则轮到下一位。
    pub fn submit_play(&mut self, seat: SeatIndex, card_ids: &[CardId]) -> Result<PlayOutcome, EngineError> {
        self.require_turn(seat)?;

        let hand = &self.seats[seat].hand;
        let mut picked = HashSet::with_capacity(card_ids.len());
        let mut cards = Vec::with_capacity(card_ids.len());
        for &id in card_ids {
            if !picked.insert(id) {
                return Err(EngineError::DuplicateCard(id));
            }
            let card = id.card();
            if !hand.contains(&card) {
                return Err(EngineError::CardNotInHand(id));
            }
            cards.push(card);
        }

        let combo = validate_play(&cards, self.last_combo()).inspect_err(|e| {
            debug!(game_id = ?self.game_id, seat, error = %e, "出牌被拒绝");
        })?;

        // --- 以下开始修改状态 ---
        self.seats[seat].hand.retain(|c| !picked.contains(&c.id()));
        self.table.extend_from_slice(&cards);
        let record = PlayRecord { seat, combo, cards };
        self.plays.push(record.clone());
        self.last_play = Some(record);
        debug!(game_id = ?self.game_id, seat, %combo, "出牌成功");

        if self.seats[seat].hand.is_empty() {
            self.phase = GamePhase::Finished;
            self.winner = Some(seat);
            self.current_seat = None;
            info!(game_id = ?self.game_id, seat, name = %self.seats[seat].name, "出完手牌，获胜");
            return Ok(PlayOutcome::Won { winner: seat });
        }

        Ok(PlayOutcome::NextTurn(self.advance_turn(seat)))
    }

    /// 过牌。只有在确实无牌可出时才允许，之后和出了一手空牌一样轮转。
    pub fn skip_turn(&mut self, seat: SeatIndex) -> Result<TurnAdvance, EngineError> {
        self.require_turn(seat)?;
        if has_legal_play(&self.seats[seat].hand, self.last_combo()) {
            return Err(EngineError::ForcedPlayAvailable);
        }
        debug!(game_id = ?self.game_id, seat, "过牌");
        Ok(self.advance_turn(seat))
    }

    /// 从 `from` 的下一位开始按座位顺序寻找能出牌的玩家，途中无牌可出的玩家被自动跳过。
    /// 转了一圈回到 `from` 仍没有人能接，本轮结束：清空上一手，由 `from` 的下一位任意出牌。
    pub(crate) fn advance_turn(&mut self, from: SeatIndex) -> TurnAdvance {
        let seat_count = self.seats.len();
        let mut skipped = Vec::new();

        for step in 1..seat_count {
            let seat = (from + step) % seat_count;
            if has_legal_play(&self.seats[seat].hand, self.last_combo()) {
                self.current_seat = Some(seat);
                return TurnAdvance { next_seat: seat, skipped, round_reset: false };
            }
            debug!(game_id = ?self.game_id, seat, "无牌可出，自动跳过");
            skipped.push(seat);
        }

        let next_seat = (from + 1) % seat_count;
        self.last_play = None;
        self.current_seat = Some(next_seat);
        info!(game_id = ?self.game_id, next_seat, "无人能接，本轮结束");
        TurnAdvance { next_seat, skipped, round_reset: true }
    }

    /// 给当前玩家的提示：能出的最小的一手牌
    pub fn suggest_play(&self, seat: SeatIndex) -> Result<Option<Vec<Card>>, EngineError> {
        self.require_turn(seat)?;
        Ok(find_legal_play(&self.seats[seat].hand, self.last_combo()))
    }

    /// 回到等待阶段：保留就座的玩家，清空手牌、桌面、轮次和上一手。
    /// 是否需要二次确认由调用方决定。
    pub fn reset_game(&mut self) {
        for seat in &mut self.seats {
            seat.hand.clear();
        }
        self.table.clear();
        self.plays.clear();
        self.last_play = None;
        self.winner = None;
        self.current_seat = None;
        self.phase = GamePhase::Waiting;
        let game_id = self.game_id.take();
        info!(?game_id, "牌局已重置");
    }
}

// --- 理牌 ---

impl GameState {
    /// 按花色和牌力整理某个座位的手牌，返回整理后的手牌
    pub fn sort_hand(&mut self, seat: SeatIndex) -> Result<&[Card], EngineError> {
        self.seat(seat)?;
        let hand = &mut self.seats[seat].hand;
        sort_hand(hand);
        Ok(hand.as_slice())
    }

    /// 拖动一张牌到新的位置
    pub fn move_card(&mut self, seat: SeatIndex, from: usize, to: usize) -> Result<(), EngineError> {
        self.seat(seat)?;
        let hand = &mut self.seats[seat].hand;
        if from >= hand.len() || to >= hand.len() {
            return Err(EngineError::InvalidMove { from, to });
        }
        let card = hand.remove(from);
        hand.insert(to, card);
        Ok(())
    }
}

// --- 辅助逻辑函数 ---

impl GameState {
    fn require_phase(&self, expected: GamePhase) -> Result<(), EngineError> {
        if self.phase != expected {
            return Err(EngineError::WrongPhase { expected, actual: self.phase });
        }
        Ok(())
    }

    fn require_turn(&self, seat: SeatIndex) -> Result<(), EngineError> {
        self.require_phase(GamePhase::Playing)?;
        self.seat(seat)?;
        if self.current_seat != Some(seat) {
            return Err(EngineError::NotYourTurn);
        }
        Ok(())
    }
}

// --- 单元测试 ---

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::{Rank, Suit};
    use crate::combo::{Combo, ComboKind};
    use crate::config::GameConfig;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use Rank::*;
    use Suit::*;

    fn card(rank: Rank, suit: Suit) -> Card {
        Card::new(rank, suit)
    }

    fn ids(cards: &[Card]) -> Vec<CardId> {
        cards.iter().map(|c| c.id()).collect()
    }

    // 辅助函数：直接摆好三家手牌和上一手，跳过发牌
    fn setup_playing(hands: [Vec<Card>; 3], current: SeatIndex, last: Option<PlayRecord>) -> GameState {
        let mut state = GameState::default();
        for (seat, hand) in state.seats.iter_mut().zip(hands) {
            seat.hand = hand;
        }
        state.phase = GamePhase::Playing;
        state.current_seat = Some(current);
        state.last_play = last;
        state
    }

    fn single_record(seat: SeatIndex, c: Card) -> PlayRecord {
        PlayRecord { seat, combo: Combo { kind: ComboKind::Single, strength: c.strength(), len: 1 }, cards: vec![c] }
    }

    #[test]
    fn test_start_game_deals_18_each() {
        let mut state = GameState::default();
        state.start_game(&mut StdRng::seed_from_u64(1)).unwrap();

        assert_eq!(state.phase(), GamePhase::Playing);
        assert_eq!(state.current_seat(), Some(0));
        assert!(state.game_id().is_some());
        assert!(state.seats().iter().all(|s| s.hand.len() == 18));
        let all: Vec<Card> = state.seats().iter().flat_map(|s| s.hand.iter().copied()).collect();
        assert!(is_full_deck(&all));
        assert!(state.table().is_empty());
        assert_eq!(state.last_play_type(), None);
    }

    #[test]
    fn test_start_game_requires_three_seats() {
        let mut state = GameState::new(GameConfig::empty_table());
        state.add_seat("a").unwrap();
        state.add_seat("b").unwrap();
        assert_eq!(
            state.start_game(&mut StdRng::seed_from_u64(1)),
            Err(EngineError::InsufficientPlayers { found: 2 })
        );
        assert_eq!(state.phase(), GamePhase::Waiting);

        assert_eq!(state.add_seat("c"), Ok(2));
        assert_eq!(state.add_seat("d"), Err(EngineError::TableFull));
        assert!(state.start_game(&mut StdRng::seed_from_u64(1)).is_ok());
    }

    #[test]
    fn test_seats_fixed_once_playing() {
        let mut state = GameState::default();
        state.start_game(&mut StdRng::seed_from_u64(2)).unwrap();
        assert!(matches!(state.remove_seat(0), Err(EngineError::WrongPhase { .. })));
        assert!(matches!(state.start_game(&mut StdRng::seed_from_u64(2)), Err(EngineError::WrongPhase { .. })));
    }

    #[test]
    fn test_remove_seat_shifts_later_seats() {
        let mut state = GameState::default();
        let removed = state.remove_seat(0).unwrap();
        assert_eq!(removed.name, "Player 1");
        assert_eq!(state.seat(0).unwrap().name, "Player 2");
        assert_eq!(state.remove_seat(5), Err(EngineError::UnknownSeat(5)));
    }

    #[test]
    fn test_start_game_with_bad_deck() {
        let mut state = GameState::default();
        let mut deck = build_deck();
        deck.pop();
        assert_eq!(state.start_game_with_deck(deck), Err(EngineError::DeckMismatch));
        assert_eq!(state.phase(), GamePhase::Waiting);
    }

    #[test]
    fn test_auto_sort_on_deal() {
        let config = GameConfig { auto_sort: true, ..GameConfig::default() };
        let mut state = GameState::new(config);
        state.start_game(&mut StdRng::seed_from_u64(3)).unwrap();
        for seat in state.seats() {
            let mut sorted = seat.hand.clone();
            sort_hand(&mut sorted);
            assert_eq!(seat.hand, sorted);
        }
    }

    #[test]
    fn test_play_moves_cards_to_table() {
        let mut state = setup_playing(
            [vec![card(Three, Spade), card(Nine, Heart)], vec![card(Four, Club), card(Five, Club)], vec![card(Six, Club), card(Seven, Club)]],
            0,
            None,
        );
        let outcome = state.submit_play(0, &ids(&[card(Three, Spade)])).unwrap();

        assert_eq!(outcome, PlayOutcome::NextTurn(TurnAdvance { next_seat: 1, skipped: vec![], round_reset: false }));
        assert_eq!(state.hand(0).unwrap(), &[card(Nine, Heart)]);
        assert_eq!(state.table(), &[card(Three, Spade)]);
        assert_eq!(state.last_play_type(), Some(ComboKind::Single));
        assert_eq!(state.plays().len(), 1);
    }

    #[test]
    fn test_rejections_leave_state_unchanged() {
        let mut state = setup_playing(
            [vec![card(Three, Spade), card(Nine, Heart)], vec![card(Four, Club)], vec![card(Six, Club)]],
            0,
            Some(single_record(2, card(Five, Diamond))),
        );
        let before = state.snapshot();

        assert_eq!(state.submit_play(1, &ids(&[card(Four, Club)])), Err(EngineError::NotYourTurn));
        assert_eq!(state.submit_play(7, &ids(&[card(Four, Club)])), Err(EngineError::UnknownSeat(7)));
        assert_eq!(state.submit_play(0, &ids(&[card(Four, Club)])), Err(EngineError::CardNotInHand(card(Four, Club).id())));
        assert_eq!(
            state.submit_play(0, &ids(&[card(Nine, Heart), card(Nine, Heart)])),
            Err(EngineError::DuplicateCard(card(Nine, Heart).id()))
        );
        assert_eq!(state.submit_play(0, &[]), Err(EngineError::InvalidCombination));
        assert_eq!(state.submit_play(0, &ids(&[card(Three, Spade), card(Nine, Heart)])), Err(EngineError::InvalidCombination));
        assert_eq!(state.submit_play(0, &ids(&[card(Three, Spade)])), Err(EngineError::MustBeHigher));

        assert_eq!(state.snapshot(), before);
    }

    #[test]
    fn test_auto_skip_seat_without_answer() {
        // 1 号只有 3，压不过 9，自动跳过
        let mut state = setup_playing(
            [vec![card(Nine, Heart), card(Two, Spade)], vec![card(Three, Club)], vec![card(King, Club), card(Four, Club)]],
            0,
            None,
        );
        let outcome = state.submit_play(0, &ids(&[card(Nine, Heart)])).unwrap();
        assert_eq!(outcome, PlayOutcome::NextTurn(TurnAdvance { next_seat: 2, skipped: vec![1], round_reset: false }));
        assert_eq!(state.current_seat(), Some(2));
        assert_eq!(state.last_play_type(), Some(ComboKind::Single));
    }

    #[test]
    fn test_round_resets_when_nobody_can_answer() {
        let mut state = setup_playing(
            [vec![Card::HIGH_JOKER, card(Two, Spade)], vec![card(Ace, Club)], vec![card(King, Club)]],
            0,
            None,
        );
        let outcome = state.submit_play(0, &ids(&[Card::HIGH_JOKER])).unwrap();
        assert_eq!(outcome, PlayOutcome::NextTurn(TurnAdvance { next_seat: 1, skipped: vec![1, 2], round_reset: true }));
        assert_eq!(state.last_play_type(), None);
        assert_eq!(state.current_seat(), Some(1));
        // 桌面记录保留
        assert_eq!(state.table(), &[Card::HIGH_JOKER]);
    }

    #[test]
    fn test_skip_turn_forced_play_rule() {
        let mut state = setup_playing(
            [vec![card(Two, Spade)], vec![card(Ace, Club), card(Three, Club)], vec![card(King, Club)]],
            1,
            Some(single_record(0, card(Queen, Heart))),
        );
        assert_eq!(state.skip_turn(0), Err(EngineError::NotYourTurn));
        assert_eq!(state.skip_turn(1), Err(EngineError::ForcedPlayAvailable));

        state.seats[1].hand = vec![card(Three, Club)];
        let advance = state.skip_turn(1).unwrap();
        // 2 号的 K 能压 Q
        assert_eq!(advance, TurnAdvance { next_seat: 2, skipped: vec![], round_reset: false });
    }

    #[test]
    fn test_winning_play_finishes_game() {
        let mut state = setup_playing(
            [vec![card(Five, Spade), card(Five, Heart)], vec![card(Ace, Club)], vec![card(King, Club)]],
            0,
            None,
        );
        let outcome = state.submit_play(0, &ids(&[card(Five, Spade), card(Five, Heart)])).unwrap();
        assert_eq!(outcome, PlayOutcome::Won { winner: 0 });
        assert_eq!(state.phase(), GamePhase::Finished);
        assert_eq!(state.winner(), Some(0));
        assert_eq!(state.current_seat(), None);
        assert!(matches!(state.submit_play(1, &ids(&[card(Ace, Club)])), Err(EngineError::WrongPhase { .. })));
        assert!(matches!(state.skip_turn(1), Err(EngineError::WrongPhase { .. })));
    }

    #[test]
    fn test_reset_keeps_seats() {
        let mut state = GameState::default();
        state.start_game(&mut StdRng::seed_from_u64(4)).unwrap();
        state.reset_game();

        assert_eq!(state.phase(), GamePhase::Waiting);
        assert_eq!(state.seat_count(), 3);
        assert!(state.seats().iter().all(|s| s.hand.is_empty()));
        assert_eq!(state.current_seat(), None);
        assert_eq!(state.game_id(), None);
        assert!(state.table().is_empty());
        assert!(state.start_game(&mut StdRng::seed_from_u64(5)).is_ok());
    }

    #[test]
    fn test_sort_and_move_card() {
        let mut state = setup_playing(
            [vec![Card::HIGH_JOKER, card(Two, Club), card(Ace, Spade)], vec![], vec![]],
            0,
            None,
        );
        assert_eq!(state.sort_hand(0).unwrap(), &[card(Ace, Spade), card(Two, Club), Card::HIGH_JOKER]);

        state.move_card(0, 2, 0).unwrap();
        assert_eq!(state.hand(0).unwrap(), &[Card::HIGH_JOKER, card(Ace, Spade), card(Two, Club)]);
        assert_eq!(state.move_card(0, 3, 0), Err(EngineError::InvalidMove { from: 3, to: 0 }));
        assert_eq!(state.sort_hand(9).unwrap_err(), EngineError::UnknownSeat(9));
    }

    #[test]
    fn test_suggest_play() {
        let state = setup_playing(
            [vec![card(Two, Spade), card(King, Heart), card(Ace, Heart)], vec![card(Three, Club)], vec![card(Four, Club)]],
            0,
            Some(single_record(2, card(Queen, Club))),
        );
        assert_eq!(state.suggest_play(0), Ok(Some(vec![card(King, Heart)])));
        assert_eq!(state.suggest_play(1), Err(EngineError::NotYourTurn));
    }

    #[test]
    fn test_snapshot_hides_other_hands_until_finished() {
        let mut state = setup_playing(
            [vec![card(Five, Spade)], vec![card(Ace, Club)], vec![card(King, Club)]],
            0,
            None,
        );
        let view = state.snapshot_for(Some(1));
        assert_eq!(view.seats[1].hand, Some(vec![card(Ace, Club)]));
        assert_eq!(view.seats[0].hand, None);
        assert_eq!(view.seats[0].hand_size, 1);

        state.submit_play(0, &ids(&[card(Five, Spade)])).unwrap();
        let view = state.snapshot_for(None);
        assert_eq!(view.winner, Some(0));
        assert!(view.seats.iter().all(|s| s.hand.is_some()));
    }
}
