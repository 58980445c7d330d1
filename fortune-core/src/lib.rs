//! Engine for 碧娜的占卜屋, a daily fortune-draw and companion-chat app.
//!
//! This crate provides:
//! - A daily fortune-draw session with draw/reroll quotas and one accepted
//!   slip per day
//! - A two-persona conversation manager backed by a DeepSeek completion
//!   gateway
//! - History, memory-year summaries, and time-capsule letters
//! - Pluggable key-value persistence
//!
//! # Quick Start
//!
//! ```ignore
//! use fortune_core::{ChatConfig, ChatManager, DrawSession, FileStore, SystemClock};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = FileStore::open("bina.json")?;
//!     let mut draws = DrawSession::load(store.clone(), SystemClock);
//!
//!     if let Some(fortune) = draws.draw()? {
//!         println!("第{}签 {}", fortune.id, fortune.title);
//!         draws.accept(fortune.id)?;
//!     }
//!
//!     let gateway = deepseek::Deepseek::from_env()?;
//!     let mut chat = ChatManager::load(store, SystemClock, gateway, ChatConfig::default());
//!     chat.create_conversation(fortune_core::Agent::Xiaobi)?;
//!     chat.send("帮我解读今天的签文", draws.current_fortune()).await?;
//!     Ok(())
//! }
//! ```

pub mod catalog;
pub mod chat;
pub mod clock;
pub mod draw;
pub mod letters;
pub mod store;
pub mod testing;
pub mod years;

// Primary public API
pub use catalog::{Fortune, Level, Tier};
pub use chat::{Agent, ChatConfig, ChatManager, Conversation, Message, MessageRole, SendOutcome};
pub use clock::{Clock, FixedClock, SystemClock};
pub use draw::{DailyState, DrawSession, HistoryEntry, DAILY_DRAW_LIMIT, MAX_REROLLS};
pub use store::{FileStore, KvStore, MemoryStore, StoreError};
pub use testing::{MockGateway, TestHarness};
