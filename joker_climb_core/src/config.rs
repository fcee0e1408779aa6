use serde::{Deserialize, Serialize};

/// 开局配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// 预先就座的玩家昵称，开局需要正好 3 位
    pub seat_names: Vec<String>,
    /// 发牌后自动理牌
    pub auto_sort: bool,
    /// 洗牌用的随机种子，None 时由调用方使用系统熵
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            seat_names: (1..=3).map(|i| format!("Player {}", i)).collect(),
            auto_sort: false,
            seed: None,
        }
    }
}

impl GameConfig {
    /// 没有预先就座玩家的配置，玩家之后通过 `add_seat` 加入
    pub fn empty_table() -> Self {
        GameConfig { seat_names: Vec::new(), ..GameConfig::default() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_seats() {
        let config = GameConfig::default();
        assert_eq!(config.seat_names, vec!["Player 1", "Player 2", "Player 3"]);
        assert!(!config.auto_sort);
        assert_eq!(config.seed, None);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let config: GameConfig = serde_json::from_str(r#"{"auto_sort": true}"#).unwrap();
        assert!(config.auto_sort);
        assert_eq!(config.seat_names.len(), 3);
    }
}
