// ==========================================
// 商品目录服务 - 商品导入API
// ==========================================
// 职责: 上传内容的请求级检查（文件名/大小/编码），再交给导入器逐行处理
// 红线: 请求级错误整批拒绝，不处理任何行
// ==========================================

use std::path::Path;
use std::sync::Arc;

use tracing::{info, instrument};

use crate::api::error::{ApiError, ApiResult};
use crate::domain::product::IngestSummary;
use crate::importer::error::ImportError;
use crate::importer::file_parser::UniversalFileParser;
use crate::importer::product_importer::ProductImporter;
use crate::repository::product_repo::ProductRepository;

/// 导入API
pub struct ImportApi<R>
where
    R: ProductRepository,
{
    importer: ProductImporter<Arc<R>>,
    parser: UniversalFileParser,
    max_upload_bytes: usize,
}

impl<R> ImportApi<R>
where
    R: ProductRepository,
{
    /// 创建新的ImportApi实例
    ///
    /// # 参数
    /// - repo: 商品仓储（与查询 API 共享）
    /// - max_upload_bytes: 单次上传的字节上限
    pub fn new(repo: Arc<R>, max_upload_bytes: usize) -> Self {
        Self {
            importer: ProductImporter::new(repo),
            parser: UniversalFileParser,
            max_upload_bytes,
        }
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_bytes
    }

    /// 导入一次上传
    ///
    /// # 参数
    /// - filename: 上传时携带的文件名（决定 CSV / Excel）
    /// - content: 文件全部内容
    ///
    /// # 返回
    /// - Ok(IngestSummary): 成功数 + 失败行明细
    /// - Err(ApiError): 文件名为空 / 超限 / 无法解码
    #[instrument(skip(self, content), fields(size = content.len()))]
    pub fn import_upload(&self, filename: &str, content: &[u8]) -> ApiResult<IngestSummary> {
        if filename.is_empty() {
            return Err(ImportError::EmptyFilename.into());
        }
        self.check_size(content.len())?;

        let table = self.parser.parse(filename, content)?;
        let summary = self.importer.ingest(&table);

        info!(
            stored = summary.stored,
            failed = summary.failed.len(),
            "上传导入完成"
        );
        Ok(summary)
    }

    /// 导入本地文件（命令行入口使用）
    pub fn import_file<P: AsRef<Path>>(&self, path: P) -> ApiResult<IngestSummary> {
        let path = path.as_ref();
        let table = self.parser.parse_file(path)?;
        Ok(self.importer.ingest(&table))
    }

    /// 上传大小检查
    pub fn check_size(&self, size: usize) -> ApiResult<()> {
        if size > self.max_upload_bytes {
            return Err(ApiError::from(ImportError::PayloadTooLarge {
                size,
                limit: self.max_upload_bytes,
            }));
        }
        Ok(())
    }
}
