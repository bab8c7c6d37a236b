// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use dashmap::DashMap;
use once_cell::sync::Lazy;
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tracing::debug;

use crate::domain::repositories::schedule_task_repository::{OwnerHandle, RepositoryError};

/// 进程级所有者类型注册表
static GLOBAL_REGISTRY: Lazy<Arc<OwnerRegistry>> = Lazy::new(|| Arc::new(OwnerRegistry::new()));

/// 所有者解析器特质
///
/// 每个所有者类型在启动时注册一个解析器，负责按主键取回自身实例。
/// 返回的句柄是类型擦除的，由调用方向下转型为具体所有者类型。
#[async_trait]
pub trait OwnerResolver: Send + Sync {
    /// 按主键取回所有者实例，行不存在时返回 `Ok(None)`
    async fn fetch_by_key(
        &self,
        db: &DatabaseConnection,
        key: i64,
    ) -> Result<Option<OwnerHandle>, RepositoryError>;
}

/// 所有者类型注册表
///
/// 将类型标签映射到解析器。关联表中的 discriminator 字段
/// 即以此处登记的标签为准；未登记的标签解析为"未找到"。
#[derive(Default)]
pub struct OwnerRegistry {
    /// 标签到解析器的映射
    resolvers: DashMap<String, Arc<dyn OwnerResolver>>,
}

impl OwnerRegistry {
    /// 创建空注册表，测试中用于隔离全局状态
    pub fn new() -> Self {
        Self {
            resolvers: DashMap::new(),
        }
    }

    /// 进程级共享实例
    pub fn global() -> Arc<OwnerRegistry> {
        GLOBAL_REGISTRY.clone()
    }

    /// 登记一个所有者类型
    ///
    /// 同名重复登记时后注册者生效。
    pub fn register(&self, discriminator: impl Into<String>, resolver: Arc<dyn OwnerResolver>) {
        self.resolvers.insert(discriminator.into(), resolver);
    }

    /// 查找解析器
    pub fn get(&self, discriminator: &str) -> Option<Arc<dyn OwnerResolver>> {
        self.resolvers.get(discriminator).map(|r| r.value().clone())
    }

    /// 解析所有者实例
    ///
    /// 标签未登记或行已不存在时返回 `Ok(None)`；
    /// 关联可以比所有者活得更久，这不是错误。
    pub async fn resolve(
        &self,
        db: &DatabaseConnection,
        discriminator: &str,
        key: i64,
    ) -> Result<Option<OwnerHandle>, RepositoryError> {
        match self.get(discriminator) {
            Some(resolver) => resolver.fetch_by_key(db, key).await,
            None => {
                debug!(discriminator, "owner type not registered");
                Ok(None)
            }
        }
    }
}
