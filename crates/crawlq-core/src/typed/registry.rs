//! HandlerRegistry - プロセスが実行できる spider factory の順序付き集合
//!
//! # 解決規則
//! - **登録順** の first-match: 同じレコードを 2 つの factory が受け付けるなら先に登録した方が勝つ
//! - より限定的な spider を先に登録すること
//! - 同じ登録コードでビルドされたプロセスは同じパターンを同じ spider に解決する

use std::sync::Arc;

use super::handler::{SpiderFactory, TypedFactory};
use super::task::{CrawlTask, Spider};
use crate::domain::UrlNode;

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("spider '{0}' is already registered")]
    AlreadyRegistered(String),
}

/// Resolved は registry 走査の成功結果
pub struct Resolved {
    pub factory: Arc<dyn SpiderFactory>,
    /// 勝った probe が作った task
    pub task: Box<dyn CrawlTask>,
}

#[derive(Default)]
pub struct HandlerRegistry {
    handlers: Vec<Arc<dyn SpiderFactory>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }

    /// 型付き spider を末尾に登録
    pub fn register<S: Spider>(&mut self) -> Result<(), RegistryError> {
        self.register_factory(Arc::new(TypedFactory::<S>::new()))
    }

    /// 手書きの factory を末尾に登録（名前は一意であること）
    pub fn register_factory(
        &mut self,
        factory: Arc<dyn SpiderFactory>,
    ) -> Result<(), RegistryError> {
        if self.get(factory.name()).is_some() {
            return Err(RegistryError::AlreadyRegistered(factory.name().to_string()));
        }
        self.handlers.push(factory);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn SpiderFactory>> {
        self.handlers.iter().find(|f| f.name() == name).cloned()
    }

    /// 登録順の factory 一覧
    pub fn handlers(&self) -> impl Iterator<Item = &Arc<dyn SpiderFactory>> {
        self.handlers.iter()
    }

    pub fn registered_names(&self) -> Vec<String> {
        self.handlers.iter().map(|f| f.name().to_string()).collect()
    }

    /// 登録順に probe し、最初に `node` を受け付けた factory を返す
    pub fn resolve(&self, node: &UrlNode) -> Option<Resolved> {
        self.handlers.iter().find_map(|factory| {
            factory.probe(node).map(|task| Resolved {
                factory: Arc::clone(factory),
                task,
            })
        })
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}
