use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::card::{Card, Rank};
use crate::error::EngineError;

/// 牌型 (ComboKind)
/// 变体顺序即牌型高低：单张 < 对子 < 三条 < 同花顺 < 葫芦。
/// 出牌判定只接受同一牌型，这个顺序不参与合法性判断。
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Serialize, Deserialize)]
pub enum ComboKind {
    Single,        // 单张
    Pair,          // 对子
    Triple,        // 三条
    RoyalStraight, // 同花顺（至少 5 张）
    FullHouse,     // 葫芦 (3+2)
}

/// 一手牌的分类结果
/// - `strength`: 按牌型定义的比较值（单张/对子/三条取点数，葫芦取三条部分，同花顺取最大牌）
/// - `len`: 张数，同花顺的长度必须一致才可比较
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy, Serialize, Deserialize)]
pub struct Combo {
    pub kind: ComboKind,
    pub strength: u8,
    pub len: usize,
}

impl fmt::Display for ComboKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", match self {
            ComboKind::Single => "单张",
            ComboKind::Pair => "对子",
            ComboKind::Triple => "三条",
            ComboKind::RoyalStraight => "同花顺",
            ComboKind::FullHouse => "葫芦",
        })
    }
}

impl fmt::Display for Combo {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.kind {
            ComboKind::RoyalStraight => write!(f, "{}张{}(顶 {})", self.len, self.kind, self.strength),
            _ => write!(f, "{}({})", self.kind, self.strength),
        }
    }
}

// --- 牌型识别 ---

/// 识别一组牌的牌型，不合法时返回 `None`。
/// 纯函数，结果与牌的顺序无关。
pub fn classify(cards: &[Card]) -> Option<Combo> {
    let len = cards.len();
    if len == 0 {
        return None;
    }

    let mut counts: HashMap<Rank, u8> = HashMap::new();
    for card in cards {
        *counts.entry(card.rank()).or_insert(0) += 1;
    }
    let same_rank = counts.len() == 1;
    let strength = cards[0].strength();

    let kind = match len {
        1 => ComboKind::Single,
        2 if same_rank => ComboKind::Pair,
        3 if same_rank => ComboKind::Triple,
        _ => {
            if len == 5 {
                if let Some(triple_rank) = full_house_triple(&counts) {
                    return Some(Combo { kind: ComboKind::FullHouse, strength: triple_rank.strength(), len });
                }
            }
            if len >= 5 {
                if let Some(top) = straight_top(cards) {
                    return Some(Combo { kind: ComboKind::RoyalStraight, strength: top, len });
                }
            }
            return None;
        }
    };

    Some(Combo { kind, strength, len })
}

/// 点数计数恰好是 {3, 2} 时返回三条部分的点数
fn full_house_triple(counts: &HashMap<Rank, u8>) -> Option<Rank> {
    if counts.len() != 2 {
        return None;
    }
    let triple = counts.iter().find(|&(_, &n)| n == 3).map(|(&r, _)| r)?;
    counts.values().any(|&n| n == 2).then_some(triple)
}

/// 同一花色、按牌力排序后逐张 +1 时返回最大牌力。
/// 王没有特殊处理：大小王的牌力不相邻，所以不会组成顺子。
fn straight_top(cards: &[Card]) -> Option<u8> {
    let suit = cards[0].suit();
    if cards.iter().any(|c| c.suit() != suit) {
        return None;
    }
    let mut strengths: Vec<u8> = cards.iter().map(|c| c.strength()).collect();
    strengths.sort_unstable();
    strengths
        .windows(2)
        .all(|w| w[1] == w[0] + 1)
        .then(|| strengths[strengths.len() - 1])
}

// --- 出牌判定 ---

/// 检查一个已识别的牌型能否压过上一手牌。
/// 桌面为空（新一轮）时任何牌型都可以出。
pub fn check_play(candidate: &Combo, last: Option<&Combo>) -> Result<(), EngineError> {
    let Some(last) = last else {
        return Ok(());
    };
    if candidate.kind != last.kind || candidate.len != last.len {
        return Err(EngineError::MustMatchLastType { expected: last.kind, found: candidate.kind });
    }
    if candidate.strength <= last.strength {
        return Err(EngineError::MustBeHigher);
    }
    Ok(())
}

pub fn is_legal(candidate: &Combo, last: Option<&Combo>) -> bool {
    check_play(candidate, last).is_ok()
}

/// 识别并判定一组待出的牌，成功时返回其牌型
pub fn validate_play(cards: &[Card], last: Option<&Combo>) -> Result<Combo, EngineError> {
    let combo = classify(cards).ok_or(EngineError::InvalidCombination)?;
    check_play(&combo, last)?;
    Ok(combo)
}

// --- 能否出牌 ---

/// 在手牌中找出能压过上一手的、牌力最小的一手牌。
///
/// 桌面为空时返回牌力最小的单张。否则枚举手牌中所有与上一手张数相同的组合，
/// 取牌型相同且牌力更大的那些中最小的一个。手牌最多 18 张，直接枚举即可。
pub fn find_legal_play(hand: &[Card], last: Option<&Combo>) -> Option<Vec<Card>> {
    let Some(last) = last else {
        return hand.iter().min_by_key(|c| c.strength()).map(|&c| vec![c]);
    };
    if hand.len() < last.len {
        return None;
    }

    let mut best: Option<(u8, Vec<usize>)> = None;
    for_each_combination(hand.len(), last.len, |indices| {
        let picked: Vec<Card> = indices.iter().map(|&i| hand[i]).collect();
        if let Some(combo) = classify(&picked) {
            if is_legal(&combo, Some(last)) && best.as_ref().is_none_or(|(s, _)| combo.strength < *s) {
                best = Some((combo.strength, indices.to_vec()));
            }
        }
    });

    best.map(|(_, indices)| indices.into_iter().map(|i| hand[i]).collect())
}

/// 自动跳过时使用：手牌中是否存在任何能出的牌
pub fn has_legal_play(hand: &[Card], last: Option<&Combo>) -> bool {
    find_legal_play(hand, last).is_some()
}

/// 辅助函数：按字典序枚举 0..n 中所有大小为 k 的下标组合
fn for_each_combination(n: usize, k: usize, mut visit: impl FnMut(&[usize])) {
    if k == 0 || k > n {
        return;
    }
    let mut indices: Vec<usize> = (0..k).collect();
    loop {
        visit(&indices);

        // 找到最右边还能后移的位置
        let Some(i) = (0..k).rev().find(|&i| indices[i] < n - k + i) else {
            return;
        };
        indices[i] += 1;
        for j in i + 1..k {
            indices[j] = indices[j - 1] + 1;
        }
    }
}

// --- 单元测试 ---
