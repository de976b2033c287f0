// ==========================================
// 商品目录服务 - HTTP 处理函数
// ==========================================
// 职责: 解析请求 → 调用 API 层 → 序列化响应
// 约束: 数据库操作放到阻塞线程池执行
// ==========================================

use crate::api::{ApiError, ApiResult, ListQuery, SearchQuery};
use crate::app::AppState;
use crate::importer::ImportError;
use actix_multipart::Multipart;
use actix_web::http::header;
use actix_web::{web, HttpRequest, HttpResponse};
use futures::StreamExt;

/// 上传文件所在的 multipart 字段名
pub const FILE_FIELD: &str = "file";

/// 健康检查
pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

/// POST /upload
///
/// 将 `file` 字段完整读入内存（受上传大小上限约束），
/// 再在阻塞线程中逐行导入
pub async fn upload_products(
    req: HttpRequest,
    state: web::Data<AppState>,
    mut payload: Multipart,
) -> ApiResult<HttpResponse> {
    if !is_multipart(&req) {
        return Err(ImportError::MissingFilePart.into());
    }

    let limit = state.import_api.max_upload_bytes();
    let mut upload: Option<(String, Vec<u8>)> = None;

    while let Some(item) = payload.next().await {
        let mut field = item.map_err(multipart_error)?;

        let disposition = field.content_disposition();
        let is_file_part = upload.is_none()
            && disposition.and_then(|cd| cd.get_name()) == Some(FILE_FIELD)
            && disposition.and_then(|cd| cd.get_filename()).is_some();
        let filename = disposition
            .and_then(|cd| cd.get_filename())
            .unwrap_or_default()
            .to_string();

        let mut content = Vec::new();
        while let Some(chunk) = field.next().await {
            let chunk = chunk.map_err(multipart_error)?;
            if !is_file_part {
                continue;
            }
            if content.len() + chunk.len() > limit {
                return Err(ImportError::PayloadTooLarge {
                    size: content.len() + chunk.len(),
                    limit,
                }
                .into());
            }
            content.extend_from_slice(&chunk);
        }

        if is_file_part {
            upload = Some((filename, content));
        }
    }

    let (filename, content) = upload.ok_or(ImportError::MissingFilePart)?;
    tracing::info!(filename = %filename, size = content.len(), "收到上传文件");

    let import_api = state.import_api.clone();
    let summary =
        run_blocking(move || import_api.import_upload(&filename, &content)).await?;

    Ok(HttpResponse::Ok().json(summary))
}

/// GET /products?page=&limit=
pub async fn list_products(
    req: HttpRequest,
    state: web::Data<AppState>,
) -> ApiResult<HttpResponse> {
    let catalog_api = state.catalog_api.clone();
    let query = ListQuery::from_pairs(&query_pairs(&req)?);
    let page = run_blocking(move || catalog_api.list_from_query(&query)).await?;
    Ok(HttpResponse::Ok().json(page))
}

/// GET /products/search?brand=&color=&minPrice=&maxPrice=&page=&limit=
pub async fn search_products(
    req: HttpRequest,
    state: web::Data<AppState>,
) -> ApiResult<HttpResponse> {
    let catalog_api = state.catalog_api.clone();
    let query = SearchQuery::from_pairs(&query_pairs(&req)?);
    let page = run_blocking(move || catalog_api.search_from_query(&query)).await?;
    Ok(HttpResponse::Ok().json(page))
}

/// 在阻塞线程池中执行同步的数据库操作
async fn run_blocking<T, F>(work: F) -> ApiResult<T>
where
    F: FnOnce() -> ApiResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| ApiError::InternalError(format!("blocking task failed: {}", e)))?
}

// 查询串解码为有序键值对（允许重复键）
fn query_pairs(req: &HttpRequest) -> ApiResult<Vec<(String, String)>> {
    web::Query::<Vec<(String, String)>>::from_query(req.query_string())
        .map(web::Query::into_inner)
        .map_err(|e| ApiError::InvalidInput(format!("invalid query string: {}", e)))
}

fn is_multipart(req: &HttpRequest) -> bool {
    req.headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.trim().to_ascii_lowercase().starts_with("multipart/form-data"))
        .unwrap_or(false)
}

fn multipart_error(err: actix_multipart::MultipartError) -> ApiError {
    ApiError::InvalidInput(format!("invalid multipart payload: {}", err))
}
