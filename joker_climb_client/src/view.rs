use crossterm::style::{Color, Stylize, style};
use joker_climb_core::{Card, GameEvent, GamePhase, GameState};

/// 红色花色用红字，其余默认颜色
fn paint(card: &Card) -> String {
    if card.suit().is_red() {
        style(card.glyph()).with(Color::Red).to_string()
    } else {
        card.glyph()
    }
}

fn paint_all(cards: &[Card]) -> String {
    cards.iter().map(paint).collect::<Vec<_>>().join(" ")
}

fn seat_name(game: &GameState, seat: usize) -> String {
    game.seat(seat).map(|s| s.name.clone()).unwrap_or_else(|_| format!("座位{}", seat + 1))
}

pub fn prompt(game: &GameState) -> String {
    match game.current_seat() {
        Some(seat) => seat_name(game, seat),
        None => String::new(),
    }
}

/// 按阶段打印桌面：等待室、出牌区加当前玩家的手牌、或结算
pub fn print_table(game: &GameState) {
    // 同屏轮流操作，只展示当前行动玩家的手牌
    let snapshot = game.snapshot_for(game.current_seat());
    match snapshot.phase {
        GamePhase::Waiting | GamePhase::Dealing => {
            println!("== 等待玩家 {}/3 ==", snapshot.seats.len());
            for seat in &snapshot.seats {
                println!("  {}. {}", seat.index + 1, seat.name);
            }
        }
        GamePhase::Playing => {
            println!("== 出牌区 ==");
            match &snapshot.last_play {
                Some(play) => println!("  上一手: {} 出 {} [{}]", seat_name(game, play.seat), play.combo, paint_all(&play.cards)),
                None => println!("  新一轮，可以任意出牌"),
            }
            println!("  已出 {} 张", snapshot.table.len());
            for seat in &snapshot.seats {
                let marker = if Some(seat.index) == snapshot.current_seat { "▶" } else { " " };
                match &seat.hand {
                    Some(hand) => {
                        println!("{} {} ({} 张)", marker, seat.name, seat.hand_size);
                        let numbered: Vec<String> =
                            hand.iter().enumerate().map(|(i, c)| format!("{}:{}", i + 1, paint(c))).collect();
                        println!("    {}", numbered.join(" "));
                    }
                    None => println!("{} {} ({} 张)", marker, seat.name, seat.hand_size),
                }
            }
        }
        GamePhase::Finished => {
            if let Some(winner) = snapshot.winner {
                println!("== 游戏结束！获胜者: {} ==", seat_name(game, winner));
            }
            for seat in &snapshot.seats {
                let hand = seat.hand.as_deref().unwrap_or_default();
                println!("  {} 剩余: {}", seat.name, paint_all(hand));
            }
            println!("输入 reset 开始新的一局");
        }
    }
}

pub fn print_event(game: &GameState, event: &GameEvent) {
    match event {
        GameEvent::SeatJoined { seat, name } => println!("{} 在 {} 号座位就座", name, seat + 1),
        GameEvent::SeatLeft { name, .. } => println!("{} 离开了座位", name),
        GameEvent::GameStarted { hand_sizes, .. } => println!("发牌完成，每人 {:?} 张", hand_sizes),
        GameEvent::PlayAccepted { seat, combo, cards } => {
            println!("{} 出了 {} [{}]", seat_name(game, *seat), combo, paint_all(cards))
        }
        GameEvent::TurnPassed { seat } => println!("{} 过", seat_name(game, *seat)),
        GameEvent::SeatSkipped { seat } => println!("{} 无牌可出，自动跳过", seat_name(game, *seat)),
        GameEvent::RoundReset => println!("无人能接，本轮结束"),
        GameEvent::NextToAct { seat, must_match } => match must_match {
            Some(kind) => println!("轮到 {}，需要出更大的{}", seat_name(game, *seat), kind),
            None => println!("轮到 {}，可以任意出牌", seat_name(game, *seat)),
        },
        GameEvent::GameWon { name, .. } => println!("{} 出完了所有手牌！", name),
        GameEvent::HandSorted { .. } => println!("已理牌"),
        GameEvent::CardMoved { from, to, .. } => println!("第 {} 张移到了第 {} 张", from + 1, to + 1),
        GameEvent::Hint { cards, .. } => match cards {
            Some(cards) => println!("提示: {}", paint_all(cards)),
            None => println!("提示: 没有能出的牌，请输入 pass"),
        },
        GameEvent::GameReset => println!("牌局已重置"),
    }
}
