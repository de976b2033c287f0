// ==========================================
// 商品目录服务 - 商品领域模型
// ==========================================
// 职责: 商品实体 / 导入中间结构 / 导入结果 / 查询结果
// 红线: 不含数据访问逻辑
// ==========================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;

/// 导入文件声明的列（顺序即必填字段报告顺序）
pub const COLUMN_SKU: &str = "sku";
pub const COLUMN_NAME: &str = "name";
pub const COLUMN_BRAND: &str = "brand";
pub const COLUMN_COLOR: &str = "color";
pub const COLUMN_SIZE: &str = "size";
pub const COLUMN_MRP: &str = "mrp";
pub const COLUMN_PRICE: &str = "price";
pub const COLUMN_QUANTITY: &str = "quantity";

/// 必填列
pub const REQUIRED_COLUMNS: [&str; 5] = [
    COLUMN_SKU,
    COLUMN_NAME,
    COLUMN_BRAND,
    COLUMN_MRP,
    COLUMN_PRICE,
];

// ==========================================
// ProductRecord - 规范化后的商品记录
// ==========================================
// 用途: 校验通过的导入行，upsert 的写入载荷
// 不变量: price <= mrp, mrp >= 0, price >= 0, quantity >= 0
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub sku: String,           // 唯一键
    pub name: String,
    pub brand: String,
    pub color: Option<String>, // 空串规范化为 None
    pub size: Option<String>,
    pub mrp: f64,              // 最高零售价
    pub price: f64,
    pub quantity: i64,         // 缺省为 0
}

// ==========================================
// ProductEntity - 已持久化的商品
// ==========================================
// 对齐: products 表
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductEntity {
    pub id: i64, // 自增主键（插入顺序）
    pub sku: String,
    pub name: String,
    pub brand: String,
    pub color: Option<String>,
    pub size: Option<String>,
    pub mrp: f64,
    pub price: f64,
    pub quantity: i64,
    pub created_at: DateTime<Utc>, // 首次插入时间，更新时不变
}

impl ProductEntity {
    /// 对外可见视图（不含 id / created_at）
    pub fn to_view(&self) -> ProductView {
        ProductView {
            sku: self.sku.clone(),
            name: self.name.clone(),
            brand: self.brand.clone(),
            color: self.color.clone(),
            size: self.size.clone(),
            mrp: self.mrp,
            price: self.price,
            quantity: self.quantity,
        }
    }
}

// ==========================================
// ProductView - 对外输出的商品字典
// ==========================================
// 数值字段: 无小数部分时输出为整数，否则输出为小数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductView {
    pub sku: String,
    pub name: String,
    pub brand: String,
    pub color: Option<String>,
    pub size: Option<String>,
    #[serde(serialize_with = "serialize_compact_number")]
    pub mrp: f64,
    #[serde(serialize_with = "serialize_compact_number")]
    pub price: f64,
    pub quantity: i64,
}

/// 2^53，超过此值的 f64 无法无损转为整数
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

fn serialize_compact_number<S>(value: &f64, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    if value.fract() == 0.0 && value.abs() < MAX_EXACT_INTEGER {
        serializer.serialize_i64(*value as i64)
    } else {
        serializer.serialize_f64(*value)
    }
}

// ==========================================
// RawProductRow - 导入中间结构
// ==========================================
// 用途: 文件解析 → 此结构 → 行校验
// 生命周期: 仅在导入流程内
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawProductRow {
    pub sku: Option<String>,
    pub name: Option<String>,
    pub brand: Option<String>,
    pub color: Option<String>,
    pub size: Option<String>,
    pub mrp: Option<String>,
    pub price: Option<String>,
    pub quantity: Option<String>,

    /// 原始 列名 → 值（已 trim；短行缺失的单元格为 None）
    pub original: BTreeMap<String, Option<String>>,
}

impl RawProductRow {
    /// 从 (列名, 值) 序列构造，键和值均做 trim
    ///
    /// 同名列以后出现者为准
    pub fn from_cells<I, K>(cells: I) -> Self
    where
        I: IntoIterator<Item = (K, Option<String>)>,
        K: AsRef<str>,
    {
        let original: BTreeMap<String, Option<String>> = cells
            .into_iter()
            .map(|(key, value)| {
                (
                    key.as_ref().trim().to_string(),
                    value.map(|v| v.trim().to_string()),
                )
            })
            .collect();

        let column = |name: &str| original.get(name).cloned().flatten();

        Self {
            sku: column(COLUMN_SKU),
            name: column(COLUMN_NAME),
            brand: column(COLUMN_BRAND),
            color: column(COLUMN_COLOR),
            size: column(COLUMN_SIZE),
            mrp: column(COLUMN_MRP),
            price: column(COLUMN_PRICE),
            quantity: column(COLUMN_QUANTITY),
            original,
        }
    }

    /// 按列名取值（仅声明列）
    pub fn get(&self, column: &str) -> Option<&str> {
        let value = match column {
            COLUMN_SKU => &self.sku,
            COLUMN_NAME => &self.name,
            COLUMN_BRAND => &self.brand,
            COLUMN_COLOR => &self.color,
            COLUMN_SIZE => &self.size,
            COLUMN_MRP => &self.mrp,
            COLUMN_PRICE => &self.price,
            COLUMN_QUANTITY => &self.quantity,
            _ => return None,
        };
        value.as_deref()
    }

    /// 取非空值（空串视为缺失）
    pub fn non_empty(&self, column: &str) -> Option<&str> {
        self.get(column).filter(|v| !v.is_empty())
    }
}

// ==========================================
// FailureKind - 失败类别
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureKind {
    Validation, // 行校验失败
    Storage,    // 落库失败（已回滚）
}

// ==========================================
// RowError - 被拒绝的导入行
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowError {
    /// 行号（含表头，首个数据行为 2）
    #[serde(rename = "line")]
    pub line_number: usize,
    pub sku: Option<String>,
    pub errors: Vec<String>,
    #[serde(rename = "row")]
    pub raw_row: BTreeMap<String, Option<String>>,
    #[serde(skip, default = "default_failure_kind")]
    pub kind: FailureKind,
}

fn default_failure_kind() -> FailureKind {
    FailureKind::Validation
}

// ==========================================
// IngestSummary - 导入结果
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IngestSummary {
    pub stored: usize,          // 成功落库行数（新增 + 更新）
    pub failed: Vec<RowError>,  // 按原始行序
}

// ==========================================
// ProductFilter - 检索条件
// ==========================================
// 各条件 AND 组合，None 表示不约束
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductFilter {
    pub brand: Option<String>,  // 子串匹配，忽略大小写
    pub color: Option<String>,  // 子串匹配，忽略大小写
    pub min_price: Option<f64>, // 含边界
    pub max_price: Option<f64>, // 含边界
}

impl ProductFilter {
    pub fn is_empty(&self) -> bool {
        self.brand.is_none()
            && self.color.is_none()
            && self.min_price.is_none()
            && self.max_price.is_none()
    }
}

// ==========================================
// ProductPage - 分页结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductPage {
    pub page: i64,
    pub limit: i64,
    pub total: i64, // 忽略分页的匹配总数
    pub products: Vec<ProductView>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view(mrp: f64, price: f64) -> ProductView {
        ProductView {
            sku: "SKU-1".to_string(),
            name: "Tee".to_string(),
            brand: "Acme".to_string(),
            color: None,
            size: Some("M".to_string()),
            mrp,
            price,
            quantity: 3,
        }
    }

    #[test]
    fn test_view_renders_whole_numbers_as_integers() {
        let json = serde_json::to_value(view(100.0, 99.5)).unwrap();
        assert_eq!(json["mrp"], serde_json::json!(100));
        assert!(json["mrp"].is_i64());
        assert_eq!(json["price"], serde_json::json!(99.5));
        assert_eq!(json["color"], serde_json::Value::Null);
    }

    #[test]
    fn test_raw_row_trims_keys_and_values() {
        let row = RawProductRow::from_cells(vec![
            (" sku ", Some("  A1 ".to_string())),
            ("name", Some("Tee".to_string())),
            ("color", Some("   ".to_string())),
            ("price", None),
        ]);

        assert_eq!(row.sku.as_deref(), Some("A1"));
        assert_eq!(row.color.as_deref(), Some(""));
        assert_eq!(row.non_empty(COLUMN_COLOR), None);
        assert_eq!(row.price, None);
        assert_eq!(row.original.get("sku"), Some(&Some("A1".to_string())));
        assert_eq!(row.original.get("price"), Some(&None));
    }

    #[test]
    fn test_row_error_serializes_external_shape() {
        let err = RowError {
            line_number: 3,
            sku: None,
            errors: vec!["price must be <= mrp".to_string()],
            raw_row: BTreeMap::new(),
            kind: FailureKind::Storage,
        };
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["line"], 3);
        assert!(json.get("kind").is_none());
        assert!(json["row"].is_object());
    }
}
