//! # 三人爬牌游戏核心规则库
//!
//! 这个 `core` crate 包含了三人爬牌（一副牌加大小王，比大小出牌）的全部规则：
//! 牌组与发牌、牌型识别、出牌判定、轮转与自动跳过、胜负判定。
//! 它不做任何输入输出，界面通过 `GameState` 上的操作驱动游戏并读取快照，
//! 所有状态只由引擎自己修改。

mod card;
mod combo;
mod config;
mod error;
mod logic;
mod message;
mod state;

pub use card::*;

pub use combo::*;

pub use config::GameConfig;

pub use error::EngineError;

pub use message::*;

pub use state::*;
