//! Ports - 外部システムとの境界（抽象化レイヤー）
//!
//! キューは共有ストアと [`ListStore`] 経由でのみ話す。
//! ID と時刻も trait に切り出し、テストで固定できるようにしている。

pub mod clock;
pub mod id_generator;
pub mod store;

pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::id_generator::{IdGenerator, UlidGenerator};
pub use self::store::{ListStore, StoreError};
