// ==========================================
// 商品目录服务 - 导入层
// ==========================================
// 职责: 上传文件 → 原始表 → 行校验 → 逐行 upsert
// 支持: CSV (UTF-8, 可带 BOM), Excel (首个工作表)
// ==========================================

// 模块声明
pub mod error;
pub mod file_parser;
pub mod product_importer;
pub mod row_validator;

// 重导出核心类型
pub use error::{ImportError, ImportResult};
pub use file_parser::{CsvParser, ExcelParser, FileParser, RawTable, UniversalFileParser};
pub use product_importer::ProductImporter;
pub use row_validator::validate_row;
