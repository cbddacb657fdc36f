//! IDs - 型安全な識別子
//!
//! # ULID
//! - 生成時刻でソート可能
//! - どのワーカーでも調整なしに生成できる
//!
//! # Phantom marker
//! - ID の種類をコンパイル時に区別する（実行時コストなし）

use serde::{Deserialize, Serialize};
use std::fmt;
use std::marker::PhantomData;
use ulid::Ulid;

/// IdMarker は ID の種類ごとの表示用 prefix を与える
pub trait IdMarker: Send + Sync + 'static {
    fn prefix() -> &'static str;
}

#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Id<T: IdMarker> {
    ulid: Ulid,
    #[serde(skip)]
    _marker: PhantomData<T>,
}

impl<T: IdMarker> Id<T> {
    pub fn from_ulid(ulid: Ulid) -> Self {
        Self {
            ulid,
            _marker: PhantomData,
        }
    }

    pub fn as_ulid(&self) -> Ulid {
        self.ulid
    }
}

impl<T: IdMarker> From<Ulid> for Id<T> {
    fn from(ulid: Ulid) -> Self {
        Self::from_ulid(ulid)
    }
}

impl<T: IdMarker> fmt::Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", T::prefix(), self.ulid)
    }
}

/// dequeue で生成された Job 用の marker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Job {}

impl IdMarker for Job {
    fn prefix() -> &'static str {
        "job-"
    }
}

/// JobId は `dequeue` がワーカーに渡す Job の ID
pub type JobId = Id<Job>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn job_id_displays_with_prefix() {
        let ulid = Ulid::new();
        let job = JobId::from_ulid(ulid);
        assert_eq!(job.as_ulid(), ulid);
        assert_eq!(job.to_string(), format!("job-{ulid}"));
    }

    #[test]
    fn ulid_ids_are_sortable() {
        let id1 = JobId::from_ulid(Ulid::new());
        std::thread::sleep(std::time::Duration::from_millis(2));
        let id2 = JobId::from_ulid(Ulid::new());

        assert!(id1 < id2);
    }

    #[test]
    fn ulid_ids_can_be_serialized() {
        let job_id = JobId::from_ulid(Ulid::new());

        let serialized = serde_json::to_string(&job_id).unwrap();
        let deserialized: JobId = serde_json::from_str(&serialized).unwrap();

        assert_eq!(job_id, deserialized);
    }

    #[test]
    fn phantom_data_does_not_consume_memory() {
        assert_eq!(std::mem::size_of::<JobId>(), std::mem::size_of::<Ulid>());
    }
}
