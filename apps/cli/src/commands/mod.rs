//! 命令定义和实现

pub mod config;
pub mod motion;

pub use config::ConfigCommand;
pub use motion::{CycleCommand, StatusCommand};
