pub mod blocks;
pub mod entities;
pub mod error;
pub mod slug;
pub mod types;
