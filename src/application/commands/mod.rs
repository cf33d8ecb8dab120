//! 应用层 - 命令（写操作）

mod episode_commands;

pub mod handlers;

pub use episode_commands::*;
