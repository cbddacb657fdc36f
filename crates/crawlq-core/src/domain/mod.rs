//! Domain - ドメインモデル（レコード、ID、エラー）

pub mod errors;
pub mod ids;
pub mod url_node;

pub use self::errors::{CrawlError, ErrorKind, QueueError};
pub use self::ids::JobId;
pub use self::url_node::{PatternKey, UrlNode};
