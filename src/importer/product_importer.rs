// ==========================================
// 商品目录服务 - 商品导入器
// ==========================================
// 职责: 逐行驱动 行校验 → upsert，汇总成功数与失败明细
// 流程: 规范化(trim) → 校验 → 单行事务 upsert → 分类失败
// 红线: 单行失败不终止批次；每行独立提交，不并行
// ==========================================

use crate::domain::product::{FailureKind, IngestSummary, RawProductRow, RowError};
use crate::importer::file_parser::RawTable;
use crate::importer::row_validator::validate_row;
use crate::repository::error::RepositoryError;
use crate::repository::product_repo::{upsert_by_sku, ProductRepository, UpsertOutcome};
use std::time::Instant;
use tracing::{debug, info, info_span, warn};
use uuid::Uuid;

/// 首个数据行的行号（第 1 行为表头）
pub const FIRST_DATA_LINE: usize = 2;

/// 落库失败的标记（区别于校验错误）
pub const INTEGRITY_ERROR_TAG: &str = "database integrity error";
pub const UNEXPECTED_ERROR_TAG: &str = "unexpected error saving row";

// ==========================================
// ProductImporter - 商品导入器
// ==========================================
pub struct ProductImporter<R>
where
    R: ProductRepository,
{
    // 数据访问层（外部注入）
    repo: R,
}

impl<R> ProductImporter<R>
where
    R: ProductRepository,
{
    /// 创建新的 ProductImporter 实例
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// 访问底层仓储
    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// 导入已解析的表
    ///
    /// # 返回
    /// - IngestSummary: stored = 成功落库行数；failed = 校验失败 + 落库失败（按原始行序）
    pub fn ingest(&self, table: &RawTable) -> IngestSummary {
        let batch_id = Uuid::new_v4().to_string();
        let span = info_span!("ingest", batch_id = %batch_id);
        let _guard = span.enter();

        let start_time = Instant::now();
        info!(total_rows = table.len(), "开始导入商品数据");

        let mut summary = IngestSummary::default();
        let mut inserted = 0usize;
        let mut updated = 0usize;

        for (idx, cells) in table.rows().enumerate() {
            let line_number = idx + FIRST_DATA_LINE;
            let row = RawProductRow::from_cells(cells);

            match self.ingest_row(&row, line_number) {
                Ok(UpsertOutcome::Inserted(id)) => {
                    debug!(line = line_number, id, "新增商品");
                    inserted += 1;
                    summary.stored += 1;
                }
                Ok(UpsertOutcome::Updated(id)) => {
                    debug!(line = line_number, id, "更新商品");
                    updated += 1;
                    summary.stored += 1;
                }
                Err(row_error) => summary.failed.push(row_error),
            }
        }

        info!(
            stored = summary.stored,
            inserted,
            updated,
            failed = summary.failed.len(),
            elapsed_ms = start_time.elapsed().as_millis() as u64,
            "商品数据导入完成"
        );

        summary
    }

    /// 处理单行：校验失败或落库失败都归为 RowError
    fn ingest_row(&self, row: &RawProductRow, line_number: usize) -> Result<UpsertOutcome, RowError> {
        let record = validate_row(row, line_number).map_err(|row_error| {
            warn!(
                line = line_number,
                sku = ?row_error.sku,
                errors = ?row_error.errors,
                "行校验失败"
            );
            row_error
        })?;

        self.repo
            .in_transaction(|writer| upsert_by_sku(writer, &record))
            .map_err(|e| {
                warn!(line = line_number, sku = %record.sku, error = %e, "落库失败，已回滚");
                RowError {
                    line_number,
                    sku: Some(record.sku.clone()),
                    errors: storage_error_messages(&e),
                    raw_row: row.original.clone(),
                    kind: FailureKind::Storage,
                }
            })
    }
}

/// 落库失败的错误描述：[分类标记, 底层描述]
pub fn storage_error_messages(err: &RepositoryError) -> Vec<String> {
    let tag = if err.is_integrity_violation() {
        INTEGRITY_ERROR_TAG
    } else {
        UNEXPECTED_ERROR_TAG
    };
    vec![tag.to_string(), err.detail()]
}
