// ==========================================
// 商品目录服务 - 导入模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// 范围: 请求级错误（整批拒绝，不处理任何行）
// ==========================================

use thiserror::Error;

/// 导入模块错误类型
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 上传内容错误 =====
    #[error("No file part (field name must be 'file')")]
    MissingFilePart,

    #[error("No selected file")]
    EmptyFilename,

    #[error("上传内容超出上限: {size} > {limit} 字节")]
    PayloadTooLarge { size: usize, limit: usize },

    #[error("文件编码错误: {0}")]
    EncodingError(String),

    // ===== 文件解析错误 =====
    #[error("文件不存在: {0}")]
    FileNotFound(String),

    #[error("文件读取失败: {0}")]
    FileReadError(String),

    #[error("CSV 解析失败: {0}")]
    CsvParseError(String),

    #[error("Excel 解析失败: {0}")]
    ExcelParseError(String),
}

impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        ImportError::FileReadError(err.to_string())
    }
}

impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        ImportError::CsvParseError(err.to_string())
    }
}

impl From<calamine::Error> for ImportError {
    fn from(err: calamine::Error) -> Self {
        ImportError::ExcelParseError(err.to_string())
    }
}

/// Result 类型别名
pub type ImportResult<T> = Result<T, ImportError>;
