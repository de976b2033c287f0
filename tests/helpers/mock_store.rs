// ==========================================
// 内存商品仓储 - 用于集成测试
// ==========================================
// 职责: 按 sku 注入落库失败，验证单行失败隔离
// 事务: 回调在暂存副本上执行，Ok 时整体替换，Err 时丢弃
// ==========================================

use chrono::Utc;
use product_catalog::domain::{ProductEntity, ProductFilter, ProductRecord};
use product_catalog::repository::{
    ProductRepository, ProductWriter, RepositoryError, RepositoryResult,
};
use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::Mutex;

/// 注入的失败类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InjectedFailure {
    /// 模拟约束违反
    Integrity,
    /// 模拟其它后端故障
    Fault,
}

#[derive(Debug, Default, Clone)]
struct StoreState {
    products: Vec<ProductEntity>,
    next_id: i64,
}

#[derive(Default)]
pub struct InMemoryProductStore {
    state: Mutex<StoreState>,
    failures: HashMap<String, InjectedFailure>,
}

impl InMemoryProductStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 对指定 sku 的写入注入失败
    pub fn failing_on(mut self, sku: &str, failure: InjectedFailure) -> Self {
        self.failures.insert(sku.to_string(), failure);
        self
    }

    pub fn snapshot(&self) -> Vec<ProductEntity> {
        self.state.lock().unwrap().products.clone()
    }
}

impl ProductRepository for InMemoryProductStore {
    fn in_transaction<T, F>(&self, work: F) -> RepositoryResult<T>
    where
        F: FnOnce(&dyn ProductWriter) -> RepositoryResult<T>,
    {
        let mut state = self
            .state
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))?;

        let writer = StagingWriter {
            staged: RefCell::new(state.clone()),
            failures: &self.failures,
        };
        let result = work(&writer)?;

        *state = writer.staged.into_inner();
        Ok(result)
    }

    fn count(&self, filter: &ProductFilter) -> RepositoryResult<i64> {
        let state = self.state.lock().unwrap();
        Ok(state.products.iter().filter(|p| matches(p, filter)).count() as i64)
    }

    fn query_with_filters(
        &self,
        filter: &ProductFilter,
        offset: i64,
        limit: i64,
    ) -> RepositoryResult<Vec<ProductEntity>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .products
            .iter()
            .filter(|p| matches(p, filter))
            .skip(offset as usize)
            .take(limit as usize)
            .cloned()
            .collect())
    }
}

struct StagingWriter<'a> {
    staged: RefCell<StoreState>,
    failures: &'a HashMap<String, InjectedFailure>,
}

impl StagingWriter<'_> {
    fn check(&self, sku: &str) -> RepositoryResult<()> {
        match self.failures.get(sku) {
            Some(InjectedFailure::Integrity) => Err(RepositoryError::CheckConstraintViolation(
                format!("injected constraint failure for {}", sku),
            )),
            Some(InjectedFailure::Fault) => Err(RepositoryError::DatabaseQueryError(format!(
                "injected disk I/O error for {}",
                sku
            ))),
            None => Ok(()),
        }
    }
}

impl ProductWriter for StagingWriter<'_> {
    fn find_by_sku(&self, sku: &str) -> RepositoryResult<Option<ProductEntity>> {
        Ok(self
            .staged
            .borrow()
            .products
            .iter()
            .find(|p| p.sku == sku)
            .cloned())
    }

    fn insert(&self, record: &ProductRecord) -> RepositoryResult<i64> {
        self.check(&record.sku)?;
        let mut staged = self.staged.borrow_mut();
        staged.next_id += 1;
        let id = staged.next_id;
        staged.products.push(ProductEntity {
            id,
            sku: record.sku.clone(),
            name: record.name.clone(),
            brand: record.brand.clone(),
            color: record.color.clone(),
            size: record.size.clone(),
            mrp: record.mrp,
            price: record.price,
            quantity: record.quantity,
            created_at: Utc::now(),
        });
        Ok(id)
    }

    fn update(&self, id: i64, record: &ProductRecord) -> RepositoryResult<()> {
        self.check(&record.sku)?;
        let mut staged = self.staged.borrow_mut();
        let product = staged
            .products
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| RepositoryError::NotFound {
                entity: "Product".to_string(),
                id: id.to_string(),
            })?;
        product.name = record.name.clone();
        product.brand = record.brand.clone();
        product.color = record.color.clone();
        product.size = record.size.clone();
        product.mrp = record.mrp;
        product.price = record.price;
        product.quantity = record.quantity;
        Ok(())
    }
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

fn matches(product: &ProductEntity, filter: &ProductFilter) -> bool {
    filter.brand.as_deref().map_or(true, |b| contains_ci(&product.brand, b))
        && filter
            .color
            .as_deref()
            .map_or(true, |c| product.color.as_deref().map_or(false, |pc| contains_ci(pc, c)))
        && filter.min_price.map_or(true, |min| product.price >= min)
        && filter.max_price.map_or(true, |max| product.price <= max)
}
