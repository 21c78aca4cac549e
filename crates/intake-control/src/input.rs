//! 手动开合请求的边沿检测
//!
//! 输入源（手柄按键等）每个周期上报"按住"电平，这里只在按下的那一刻
//! 产生一次请求，按住不放不会重复触发。

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::tracker::Target;

/// 开合方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Open,
    Close,
}

impl Direction {
    /// 对应的目标边界
    pub fn target(self) -> Target {
        match self {
            Direction::Open => Target::Max,
            Direction::Close => Target::Min,
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Open => write!(f, "open"),
            Direction::Close => write!(f, "close"),
        }
    }
}

/// 上升沿检测
#[derive(Debug, Clone, Copy, Default)]
pub struct EdgeTrigger {
    held: bool,
}

impl EdgeTrigger {
    pub fn new() -> Self {
        Self::default()
    }

    /// 输入当前电平，返回是否为新按下
    pub fn update(&mut self, held: bool) -> bool {
        let pressed = held && !self.held;
        self.held = held;
        pressed
    }

    pub fn is_held(&self) -> bool {
        self.held
    }
}

/// 开 / 合两个按键的边沿检测
#[derive(Debug, Clone, Copy, Default)]
pub struct OverrideInput {
    open: EdgeTrigger,
    close: EdgeTrigger,
}

impl OverrideInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// 输入当前电平，返回新产生的请求
    ///
    /// 同一周期内两个方向同时新按下时视为冲突，不产生请求。
    pub fn poll(&mut self, open_held: bool, close_held: bool) -> Option<Direction> {
        let open = self.open.update(open_held);
        let close = self.close.update(close_held);
        match (open, close) {
            (true, false) => Some(Direction::Open),
            (false, true) => Some(Direction::Close),
            (true, true) => {
                debug!("Ignoring simultaneous open and close presses");
                None
            },
            (false, false) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edge_trigger_fires_once_per_press() {
        let mut trigger = EdgeTrigger::new();
        assert!(!trigger.update(false));
        assert!(trigger.update(true));
        assert!(!trigger.update(true));
        assert!(trigger.is_held());
        assert!(!trigger.update(false));
        assert!(trigger.update(true));
    }

    #[test]
    fn test_override_input() {
        let mut input = OverrideInput::new();
        assert_eq!(input.poll(false, false), None);
        assert_eq!(input.poll(true, false), Some(Direction::Open));
        assert_eq!(input.poll(true, false), None);
        // 按住打开的同时按下闭合
        assert_eq!(input.poll(true, true), Some(Direction::Close));
        assert_eq!(input.poll(false, false), None);
    }

    #[test]
    fn test_simultaneous_press_is_ignored() {
        let mut input = OverrideInput::new();
        assert_eq!(input.poll(true, true), None);
        assert_eq!(input.poll(true, true), None);
    }

    #[test]
    fn test_direction_targets() {
        assert_eq!(Direction::Open.target(), Target::Max);
        assert_eq!(Direction::Close.target(), Target::Min);
        assert_eq!(Direction::Close.to_string(), "close");
    }
}
