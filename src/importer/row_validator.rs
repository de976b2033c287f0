// ==========================================
// 商品目录服务 - 行校验器
// ==========================================
// 职责: 单行 → ProductRecord 或 RowError
// 规则: 必填 → 数值解析 → 业务规则，错误全部收集，不短路
// 红线: 纯函数，无 I/O
// ==========================================

use crate::domain::product::{
    FailureKind, ProductRecord, RawProductRow, RowError, COLUMN_BRAND, COLUMN_COLOR, COLUMN_MRP,
    COLUMN_NAME, COLUMN_PRICE, COLUMN_QUANTITY, COLUMN_SIZE, COLUMN_SKU, REQUIRED_COLUMNS,
};

/// i64 可表示范围（f64 表示）
const I64_RANGE_F64: f64 = 9_223_372_036_854_775_808.0;

/// 解析数值
///
/// 不含小数点时先按整数解析，失败或含小数点时按浮点解析；
/// 非有限值（NaN / inf）视为非数值
pub fn parse_number(value: &str, field: &str) -> Result<f64, String> {
    let parsed = if value.contains('.') {
        value.parse::<f64>().ok()
    } else {
        value
            .parse::<i64>()
            .map(|v| v as f64)
            .ok()
            .or_else(|| value.parse::<f64>().ok())
    };

    match parsed {
        Some(v) if v.is_finite() => Ok(v),
        _ => Err(format!("{} must be numeric (got '{}')", field, value)),
    }
}

/// 解析数量（必须为整数值）
pub fn parse_quantity(value: &str) -> Result<i64, String> {
    if !value.contains('.') {
        if let Ok(v) = value.parse::<i64>() {
            return Ok(v);
        }
    }

    let number = parse_number(value, COLUMN_QUANTITY)?;
    if number.fract() != 0.0 || number.abs() >= I64_RANGE_F64 {
        return Err("quantity must be integer".to_string());
    }
    Ok(number as i64)
}

/// 校验单行
///
/// # 参数
/// - row: 已 trim 的原始行
/// - line_number: 行号（含表头，首个数据行为 2）
///
/// # 返回
/// - Ok(ProductRecord): 校验通过
/// - Err(RowError): 全部校验错误
pub fn validate_row(row: &RawProductRow, line_number: usize) -> Result<ProductRecord, RowError> {
    let mut errors = Vec::new();

    // ===== 必填字段 =====
    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|column| row.non_empty(column).is_none())
        .collect();
    if !missing.is_empty() {
        errors.push(format!("Missing required fields: {}", missing.join(", ")));
    }

    // ===== 数值解析 =====
    let mrp = collect(
        row.non_empty(COLUMN_MRP)
            .map(|v| parse_number(v, COLUMN_MRP)),
        &mut errors,
    );
    let price = collect(
        row.non_empty(COLUMN_PRICE)
            .map(|v| parse_number(v, COLUMN_PRICE)),
        &mut errors,
    );
    let quantity = collect(row.non_empty(COLUMN_QUANTITY).map(parse_quantity), &mut errors);

    // ===== 业务规则（仅对解析成功的字段）=====
    if matches!(mrp, Some(v) if v < 0.0) {
        errors.push("mrp must be >= 0".to_string());
    }
    if matches!(price, Some(v) if v < 0.0) {
        errors.push("price must be >= 0".to_string());
    }
    if let (Some(mrp), Some(price)) = (mrp, price) {
        if price > mrp {
            errors.push("price must be <= mrp".to_string());
        }
    }
    if matches!(quantity, Some(q) if q < 0) {
        errors.push("quantity must be >= 0".to_string());
    }

    // 必填缺失时 mrp/price 必然进入 errors，不会走到默认值分支
    match (errors.is_empty(), mrp, price) {
        (true, Some(mrp), Some(price)) => Ok(ProductRecord {
            sku: required(row.non_empty(COLUMN_SKU)),
            name: required(row.non_empty(COLUMN_NAME)),
            brand: required(row.non_empty(COLUMN_BRAND)),
            color: row.non_empty(COLUMN_COLOR).map(str::to_string),
            size: row.non_empty(COLUMN_SIZE).map(str::to_string),
            mrp,
            price,
            quantity: quantity.unwrap_or(0),
        }),
        _ => Err(RowError {
            line_number,
            sku: row.sku.clone(),
            errors,
            raw_row: row.original.clone(),
            kind: FailureKind::Validation,
        }),
    }
}

fn collect<T>(parsed: Option<Result<T, String>>, errors: &mut Vec<String>) -> Option<T> {
    match parsed {
        Some(Ok(value)) => Some(value),
        Some(Err(message)) => {
            errors.push(message);
            None
        }
        None => None,
    }
}

fn required(value: Option<&str>) -> String {
    value.unwrap_or_default().to_string()
}
