//! Typed Spider API
//!
//! # 設計
//! - **表面（型付き）**: [`Spider`] - クロール対象の形ごとに 1 つの Rust 型
//! - **内部（dyn）**: [`SpiderFactory`] / [`CrawlTask`] - object-safe。registry に格納され、
//!   Job として渡される

pub mod codec;
pub mod handler;
pub mod registry;
pub mod task;

#[cfg(test)]
pub(crate) mod test_spiders;

pub use self::codec::{CodecError, RecordCodec};
pub use self::handler::{SpiderFactory, TypedFactory};
pub use self::registry::{HandlerRegistry, RegistryError, Resolved};
pub use self::task::{CrawlTask, Spider};
