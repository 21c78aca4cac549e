//! 运行模式
//!
//! - One-shot 模式：每个命令独立创建会话（见 `main.rs`）
//! - REPL 模式：交互式 Shell，会话在退出前一直保留

pub mod repl;
