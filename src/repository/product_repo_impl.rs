// ==========================================
// 商品目录服务 - 商品仓储 SQLite 实现
// ==========================================
// 对齐: db::ensure_schema 中的 products 表
// 约束: 所有查询使用参数化
// ==========================================

use crate::db::open_catalog_database;
use crate::domain::product::{ProductEntity, ProductFilter, ProductRecord};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::product_repo::{ProductRepository, ProductWriter};
use chrono::{DateTime, Utc};
use rusqlite::types::{Type, Value};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex, MutexGuard};

const SELECT_COLUMNS: &str =
    "id, sku, name, brand, color, size, mrp, price, quantity, created_at";

// ==========================================
// ProductRepositoryImpl
// ==========================================
pub struct ProductRepositoryImpl {
    conn: Arc<Mutex<Connection>>,
}

impl ProductRepositoryImpl {
    /// 创建新的 Repository 实例（必要时建表）
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_catalog_database(db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }
}

impl ProductRepository for ProductRepositoryImpl {
    fn in_transaction<T, F>(&self, work: F) -> RepositoryResult<T>
    where
        F: FnOnce(&dyn ProductWriter) -> RepositoryResult<T>,
    {
        let conn = self.get_conn()?;
        let tx = conn
            .unchecked_transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        // 出错时 tx 被 drop，自动回滚
        let writer = SqliteProductWriter { conn: &tx };
        let result = work(&writer as &dyn ProductWriter)?;

        tx.commit()?;
        Ok(result)
    }

    fn count(&self, filter: &ProductFilter) -> RepositoryResult<i64> {
        let (where_clause, values) = build_where_clause(filter);
        let sql = format!("SELECT COUNT(*) FROM products{}", where_clause);

        let conn = self.get_conn()?;
        let total = conn.query_row(&sql, params_from_iter(values.iter()), |row| row.get(0))?;
        Ok(total)
    }

    fn query_with_filters(
        &self,
        filter: &ProductFilter,
        offset: i64,
        limit: i64,
    ) -> RepositoryResult<Vec<ProductEntity>> {
        let (where_clause, mut values) = build_where_clause(filter);
        let sql = format!(
            "SELECT {} FROM products{} ORDER BY id LIMIT ? OFFSET ?",
            SELECT_COLUMNS, where_clause
        );
        values.push(Value::Integer(limit));
        values.push(Value::Integer(offset));

        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&sql)?;
        let products = stmt
            .query_map(params_from_iter(values.iter()), map_product_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(products)
    }
}

// ==========================================
// SqliteProductWriter - 事务内写实现
// ==========================================
struct SqliteProductWriter<'a> {
    conn: &'a Connection,
}

impl ProductWriter for SqliteProductWriter<'_> {
    fn find_by_sku(&self, sku: &str) -> RepositoryResult<Option<ProductEntity>> {
        let sql = format!("SELECT {} FROM products WHERE sku = ?1", SELECT_COLUMNS);
        let product = self
            .conn
            .query_row(&sql, params![sku], map_product_row)
            .optional()?;
        Ok(product)
    }

    fn insert(&self, record: &ProductRecord) -> RepositoryResult<i64> {
        self.conn.execute(
            r#"
            INSERT INTO products (
                sku, name, brand, color, size, mrp, price, quantity, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
            params![
                record.sku,
                record.name,
                record.brand,
                record.color,
                record.size,
                record.mrp,
                record.price,
                record.quantity,
                Utc::now().to_rfc3339(),
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn update(&self, id: i64, record: &ProductRecord) -> RepositoryResult<()> {
        let affected = self.conn.execute(
            r#"
            UPDATE products SET
                name = ?1, brand = ?2, color = ?3, size = ?4,
                mrp = ?5, price = ?6, quantity = ?7
            WHERE id = ?8
            "#,
            params![
                record.name,
                record.brand,
                record.color,
                record.size,
                record.mrp,
                record.price,
                record.quantity,
                id,
            ],
        )?;

        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "Product".to_string(),
                id: id.to_string(),
            });
        }
        Ok(())
    }
}

/// 构建 WHERE 子句及参数；子串匹配用 instr，避免 LIKE 通配符转义
fn build_where_clause(filter: &ProductFilter) -> (String, Vec<Value>) {
    let mut conditions = Vec::new();
    let mut values = Vec::new();

    if let Some(brand) = &filter.brand {
        conditions.push("instr(lower(brand), lower(?)) > 0");
        values.push(Value::Text(brand.clone()));
    }
    if let Some(color) = &filter.color {
        conditions.push("color IS NOT NULL AND instr(lower(color), lower(?)) > 0");
        values.push(Value::Text(color.clone()));
    }
    if let Some(min_price) = filter.min_price {
        conditions.push("price >= ?");
        values.push(Value::Real(min_price));
    }
    if let Some(max_price) = filter.max_price {
        conditions.push("price <= ?");
        values.push(Value::Real(max_price));
    }

    if conditions.is_empty() {
        (String::new(), values)
    } else {
        (format!(" WHERE {}", conditions.join(" AND ")), values)
    }
}

fn map_product_row(row: &Row<'_>) -> rusqlite::Result<ProductEntity> {
    Ok(ProductEntity {
        id: row.get(0)?,
        sku: row.get(1)?,
        name: row.get(2)?,
        brand: row.get(3)?,
        color: row.get(4)?,
        size: row.get(5)?,
        mrp: row.get(6)?,
        price: row.get(7)?,
        quantity: row.get(8)?,
        created_at: row
            .get::<_, String>(9)?
            .parse::<DateTime<Utc>>()
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(9, Type::Text, Box::new(e)))?,
    })
}
