// ==========================================
// 商品目录服务 - 商品仓储 Trait
// ==========================================
// 职责: 定义商品数据访问接口（不包含业务逻辑）
// 红线: Repository 不含业务规则，只做数据 CRUD
// ==========================================

use crate::domain::product::{ProductEntity, ProductFilter, ProductRecord};
use crate::repository::error::RepositoryResult;
use std::sync::Arc;

// ==========================================
// ProductWriter - 事务内写接口
// ==========================================
// 用途: 单行 upsert（查找 → 新增/更新）
// 生命周期: 仅在 ProductRepository::in_transaction 回调内有效
pub trait ProductWriter {
    /// 按 sku 查找
    fn find_by_sku(&self, sku: &str) -> RepositoryResult<Option<ProductEntity>>;

    /// 新增商品，返回主键
    fn insert(&self, record: &ProductRecord) -> RepositoryResult<i64>;

    /// 整体替换可变字段（sku 与主键不变）
    fn update(&self, id: i64, record: &ProductRecord) -> RepositoryResult<()>;
}

// ==========================================
// ProductRepository Trait
// ==========================================
// 实现者: ProductRepositoryImpl（rusqlite）
pub trait ProductRepository: Send + Sync {
    /// 在独立事务中执行写操作
    ///
    /// # 说明
    /// - 回调返回 Ok 时提交，返回 Err 时回滚
    /// - 连接在调用结束后释放
    fn in_transaction<T, F>(&self, work: F) -> RepositoryResult<T>
    where
        F: FnOnce(&dyn ProductWriter) -> RepositoryResult<T>;

    /// 统计满足条件的商品数量（忽略分页）
    fn count(&self, filter: &ProductFilter) -> RepositoryResult<i64>;

    /// 按条件分页查询，按主键（插入顺序）排序
    fn query_with_filters(
        &self,
        filter: &ProductFilter,
        offset: i64,
        limit: i64,
    ) -> RepositoryResult<Vec<ProductEntity>>;
}

// 共享仓储（导入与查询共用同一实例）
impl<R> ProductRepository for Arc<R>
where
    R: ProductRepository,
{
    fn in_transaction<T, F>(&self, work: F) -> RepositoryResult<T>
    where
        F: FnOnce(&dyn ProductWriter) -> RepositoryResult<T>,
    {
        (**self).in_transaction(work)
    }

    fn count(&self, filter: &ProductFilter) -> RepositoryResult<i64> {
        (**self).count(filter)
    }

    fn query_with_filters(
        &self,
        filter: &ProductFilter,
        offset: i64,
        limit: i64,
    ) -> RepositoryResult<Vec<ProductEntity>> {
        (**self).query_with_filters(filter, offset, limit)
    }
}

// ==========================================
// UpsertOutcome - upsert 结果
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted(i64),
    Updated(i64),
}

/// 按 sku upsert：存在则整体替换，不存在则新增
pub fn upsert_by_sku(
    writer: &dyn ProductWriter,
    record: &ProductRecord,
) -> RepositoryResult<UpsertOutcome> {
    match writer.find_by_sku(&record.sku)? {
        Some(existing) => {
            writer.update(existing.id, record)?;
            Ok(UpsertOutcome::Updated(existing.id))
        }
        None => writer.insert(record).map(UpsertOutcome::Inserted),
    }
}
