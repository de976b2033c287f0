// ==========================================
// 商品目录服务 - 领域模型层
// ==========================================
// 职责: 定义商品实体、导入中间结构与查询结果
// 红线: 不含数据访问逻辑
// ==========================================

pub mod product;

// 重导出核心类型
pub use product::{
    FailureKind, IngestSummary, ProductEntity, ProductFilter, ProductPage, ProductRecord,
    ProductView, RawProductRow, RowError, REQUIRED_COLUMNS,
};
