// ==========================================
// 商品目录服务 - 商品查询 API
// ==========================================
// 职责: 分页列表 / 条件检索 / 查询参数校验
// 排序: 一律按主键（插入顺序）
// ==========================================

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::error::{ApiError, ApiResult};
use crate::domain::product::{ProductFilter, ProductPage};
use crate::repository::product_repo::ProductRepository;

pub const DEFAULT_PAGE: i64 = 1;

const MSG_PAGINATION_NOT_INTEGER: &str = "page and limit must be integers";
const MSG_PAGINATION_TOO_SMALL: &str = "page and limit must be >= 1";

// ==========================================
// 原始查询参数（HTTP 查询串）
// ==========================================

/// GET /products
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
}

/// GET /products/search
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchQuery {
    pub brand: Option<String>,
    pub color: Option<String>,
    #[serde(rename = "minPrice")]
    pub min_price: Option<String>,
    #[serde(rename = "maxPrice")]
    pub max_price: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

impl ListQuery {
    /// 从查询串键值对构建；重复参数取首次出现的值，未知参数忽略
    pub fn from_pairs(pairs: &[(String, String)]) -> Self {
        Self {
            page: first_value(pairs, "page"),
            limit: first_value(pairs, "limit"),
        }
    }
}

impl SearchQuery {
    /// 从查询串键值对构建；重复参数取首次出现的值，未知参数忽略
    pub fn from_pairs(pairs: &[(String, String)]) -> Self {
        Self {
            brand: first_value(pairs, "brand"),
            color: first_value(pairs, "color"),
            min_price: first_value(pairs, "minPrice"),
            max_price: first_value(pairs, "maxPrice"),
            page: first_value(pairs, "page"),
            limit: first_value(pairs, "limit"),
        }
    }

    /// 转换为检索条件；空串视为未提供
    pub fn to_filter(&self) -> ApiResult<ProductFilter> {
        Ok(ProductFilter {
            brand: non_empty(self.brand.as_deref()),
            color: non_empty(self.color.as_deref()),
            min_price: parse_price_bound(self.min_price.as_deref(), "minPrice")?,
            max_price: parse_price_bound(self.max_price.as_deref(), "maxPrice")?,
        })
    }
}

// ==========================================
// CatalogApi
// ==========================================
pub struct CatalogApi<R>
where
    R: ProductRepository,
{
    repo: Arc<R>,
    default_limit: i64,
}

impl<R> CatalogApi<R>
where
    R: ProductRepository,
{
    pub fn new(repo: Arc<R>, default_limit: i64) -> Self {
        Self {
            repo,
            default_limit,
        }
    }

    pub fn default_limit(&self) -> i64 {
        self.default_limit
    }

    /// 分页列出全部商品
    ///
    /// # 返回
    /// - total: 商品总数（忽略分页）
    /// - products: 第 page 页（每页 limit 条）
    pub fn list_products(&self, page: i64, limit: i64) -> ApiResult<ProductPage> {
        self.search_products(&ProductFilter::default(), page, limit)
    }

    /// 按条件检索（品牌/颜色子串 + 价格区间，AND 组合）
    ///
    /// 无匹配时返回空页
    pub fn search_products(
        &self,
        filter: &ProductFilter,
        page: i64,
        limit: i64,
    ) -> ApiResult<ProductPage> {
        validate_pagination(page, limit)?;

        let offset = (page - 1).saturating_mul(limit);
        let total = self.repo.count(filter)?;
        let products = self.repo.query_with_filters(filter, offset, limit)?;

        debug!(
            page,
            limit,
            total,
            returned = products.len(),
            filtered = !filter.is_empty(),
            "商品查询完成"
        );

        Ok(ProductPage {
            page,
            limit,
            total,
            products: products.iter().map(|p| p.to_view()).collect(),
        })
    }

    /// 处理原始列表查询参数
    pub fn list_from_query(&self, query: &ListQuery) -> ApiResult<ProductPage> {
        let (page, limit) = self.parse_pagination(query.page.as_deref(), query.limit.as_deref())?;
        self.list_products(page, limit)
    }

    /// 处理原始检索查询参数
    pub fn search_from_query(&self, query: &SearchQuery) -> ApiResult<ProductPage> {
        let (page, limit) = self.parse_pagination(query.page.as_deref(), query.limit.as_deref())?;
        let filter = query.to_filter()?;
        self.search_products(&filter, page, limit)
    }

    fn parse_pagination(&self, page: Option<&str>, limit: Option<&str>) -> ApiResult<(i64, i64)> {
        parse_pagination(page, limit, self.default_limit)
    }
}

/// 解析分页参数：缺省取默认值，出现但非整数则报错
pub fn parse_pagination(
    page: Option<&str>,
    limit: Option<&str>,
    default_limit: i64,
) -> ApiResult<(i64, i64)> {
    let parse = |raw: Option<&str>, default: i64| match raw {
        None => Ok(default),
        Some(v) => v
            .trim()
            .parse::<i64>()
            .map_err(|_| ApiError::InvalidInput(MSG_PAGINATION_NOT_INTEGER.to_string())),
    };

    let page = parse(page, DEFAULT_PAGE)?;
    let limit = parse(limit, default_limit)?;
    validate_pagination(page, limit)?;
    Ok((page, limit))
}

pub fn validate_pagination(page: i64, limit: i64) -> ApiResult<()> {
    if page < 1 || limit < 1 {
        return Err(ApiError::InvalidInput(MSG_PAGINATION_TOO_SMALL.to_string()));
    }
    Ok(())
}

/// 解析价格边界；空串视为未提供
pub fn parse_price_bound(raw: Option<&str>, name: &str) -> ApiResult<Option<f64>> {
    match non_empty(raw) {
        None => Ok(None),
        Some(v) => match v.parse::<f64>() {
            Ok(n) if n.is_finite() => Ok(Some(n)),
            _ => Err(ApiError::InvalidInput(format!("{} must be numeric", name))),
        },
    }
}

fn first_value(pairs: &[(String, String)], key: &str) -> Option<String> {
    pairs
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.clone())
}

fn non_empty(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::ensure_schema;
    use crate::domain::product::ProductRecord;
    use crate::repository::{upsert_by_sku, ProductRepositoryImpl};
    use rusqlite::Connection;
    use std::sync::Mutex;

    fn catalog_with(count: usize) -> CatalogApi<ProductRepositoryImpl> {
        let conn = Connection::open_in_memory().unwrap();
        ensure_schema(&conn).unwrap();
        let repo = Arc::new(ProductRepositoryImpl::from_connection(Arc::new(Mutex::new(conn))));

        for i in 1..=count {
            let record = ProductRecord {
                sku: format!("SKU-{}", i),
                name: format!("Item {}", i),
                brand: if i % 2 == 0 { "Acme".to_string() } else { "Zeta".to_string() },
                color: None,
                size: None,
                mrp: 100.0,
                price: (i * 5) as f64,
                quantity: 1,
            };
            repo.in_transaction(|w| upsert_by_sku(w, &record)).unwrap();
        }
        CatalogApi::new(repo, 10)
    }

    #[test]
    fn test_list_second_page() {
        let page = catalog_with(5).list_products(2, 2).unwrap();
        assert_eq!(page.total, 5);
        let skus: Vec<_> = page.products.iter().map(|p| p.sku.as_str()).collect();
        assert_eq!(skus, vec!["SKU-3", "SKU-4"]);
    }

    #[test]
    fn test_page_beyond_end_is_empty() {
        let page = catalog_with(3).list_products(9, 10).unwrap();
        assert_eq!(page.total, 3);
        assert!(page.products.is_empty());
    }

    #[test]
    fn test_search_with_raw_query() {
        let catalog = catalog_with(5);
        let query = SearchQuery {
            brand: Some("acme".to_string()),
            min_price: Some("10".to_string()),
            max_price: Some("20".to_string()),
            color: Some(String::new()),
            ..Default::default()
        };
        let page = catalog.search_from_query(&query).unwrap();
        let skus: Vec<_> = page.products.iter().map(|p| p.sku.as_str()).collect();
        assert_eq!(skus, vec!["SKU-2", "SKU-4"]);
        assert_eq!(page.total, 2);
        assert_eq!(page.limit, 10);
    }

    fn pairs(raw: &[(&str, &str)]) -> Vec<(String, String)> {
        raw.iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_repeated_parameters_take_first_value() {
        let query = ListQuery::from_pairs(&pairs(&[("page", "1"), ("page", "2"), ("sort", "x")]));
        assert_eq!(query.page.as_deref(), Some("1"));
        assert_eq!(query.limit, None);

        let query = SearchQuery::from_pairs(&pairs(&[
            ("brand", "acme"),
            ("minPrice", "10"),
            ("brand", "zeta"),
            ("minPrice", "oops"),
        ]));
        assert_eq!(query.brand.as_deref(), Some("acme"));
        assert_eq!(query.min_price.as_deref(), Some("10"));

        let page = catalog_with(5).search_from_query(&query).unwrap();
        assert_eq!(page.total, 2);
    }

    #[test]
    fn test_pagination_parsing() {
        assert_eq!(parse_pagination(None, None, 10).unwrap(), (1, 10));
        assert_eq!(parse_pagination(Some("3"), Some("7"), 10).unwrap(), (3, 7));

        let err = parse_pagination(Some("two"), None, 10).unwrap_err();
        assert_eq!(err.to_string(), "page and limit must be integers");

        let err = parse_pagination(Some("0"), None, 10).unwrap_err();
        assert_eq!(err.to_string(), "page and limit must be >= 1");

        let err = parse_pagination(None, Some("-1"), 10).unwrap_err();
        assert_eq!(err.to_string(), "page and limit must be >= 1");
    }

    #[test]
    fn test_price_bound_parsing() {
        assert_eq!(parse_price_bound(None, "minPrice").unwrap(), None);
        assert_eq!(parse_price_bound(Some(""), "minPrice").unwrap(), None);
        assert_eq!(parse_price_bound(Some("12.5"), "minPrice").unwrap(), Some(12.5));

        let err = parse_price_bound(Some("cheap"), "maxPrice").unwrap_err();
        assert_eq!(err.to_string(), "maxPrice must be numeric");
    }
}
