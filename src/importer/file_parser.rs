// ==========================================
// 商品目录服务 - 文件解析器实现
// ==========================================
// 阶段 0: 上传内容 → 表头 + 原始行
// 支持: CSV (.csv 及其他文本) / Excel (.xlsx/.xls)
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use calamine::{open_workbook_auto_from_rs, Data, Reader};
use csv::ReaderBuilder;
use std::io::Cursor;
use std::path::Path;

// ==========================================
// RawTable - 解析结果
// ==========================================
// 未做 trim，规范化在导入器中进行
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    /// 表头（首行）
    pub headers: Vec<String>,
    /// 数据行，与表头按列对齐；短行缺失的单元格为 None，超出表头的单元格丢弃
    pub records: Vec<Vec<Option<String>>>,
}

impl RawTable {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// 按行返回 (列名, 值) 对
    pub fn rows(&self) -> impl Iterator<Item = Vec<(&str, Option<String>)>> + '_ {
        self.records.iter().map(move |record| {
            self.headers
                .iter()
                .map(String::as_str)
                .zip(record.iter().cloned())
                .collect()
        })
    }

    fn push_aligned<I>(&mut self, cells: I)
    where
        I: IntoIterator<Item = String>,
    {
        let mut record: Vec<Option<String>> =
            cells.into_iter().take(self.headers.len()).map(Some).collect();
        record.resize(self.headers.len(), None);
        self.records.push(record);
    }
}

// ==========================================
// FileParser Trait
// ==========================================
// 实现者: CsvParser, ExcelParser
pub trait FileParser: Send + Sync {
    /// 解析内存中的上传内容
    fn parse_bytes(&self, content: &[u8]) -> ImportResult<RawTable>;
}

// ==========================================
// CSV Parser 实现
// ==========================================
pub struct CsvParser;

impl FileParser for CsvParser {
    fn parse_bytes(&self, content: &[u8]) -> ImportResult<RawTable> {
        let text = std::str::from_utf8(content)
            .map_err(|e| ImportError::EncodingError(format!("内容不是有效的 UTF-8: {}", e)))?;
        // 兼容 Excel 导出的 UTF-8 BOM
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);

        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true) // 允许行长度不一致
            .from_reader(text.as_bytes());

        let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();

        let mut table = RawTable {
            headers,
            records: Vec::new(),
        };

        // 空行由 csv 读取器跳过
        for result in reader.records() {
            let record = result?;
            table.push_aligned(record.iter().map(str::to_string));
        }

        Ok(table)
    }
}

// ==========================================
// Excel Parser 实现
// ==========================================
// 只读取第一个工作表
pub struct ExcelParser;

impl FileParser for ExcelParser {
    fn parse_bytes(&self, content: &[u8]) -> ImportResult<RawTable> {
        let mut workbook = open_workbook_auto_from_rs(Cursor::new(content.to_vec()))?;

        let sheet_name = match workbook.sheet_names().first() {
            Some(name) => name.clone(),
            None => {
                return Err(ImportError::ExcelParseError(
                    "Excel 文件无工作表".to_string(),
                ))
            }
        };

        let range = workbook.worksheet_range(&sheet_name)?;

        let mut rows = range.rows();
        let headers: Vec<String> = match rows.next() {
            Some(header_row) => header_row.iter().map(cell_to_string).collect(),
            None => return Ok(RawTable::default()),
        };

        let mut table = RawTable {
            headers,
            records: Vec::new(),
        };

        for data_row in rows {
            // 与 CSV 空行一致：跳过完全空白的行
            if data_row.iter().all(|c| matches!(c, Data::Empty)) {
                continue;
            }
            table.push_aligned(data_row.iter().map(cell_to_string));
        }

        Ok(table)
    }
}

/// 单元格转文本；整数值浮点输出为整数形式
fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
        Data::Float(f) => f.to_string(),
        Data::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}

// ==========================================
// 通用文件解析器（根据文件名自动选择）
// ==========================================
pub struct UniversalFileParser;

impl UniversalFileParser {
    /// 根据文件名选择解析器；非 Excel 扩展名一律按 CSV 文本处理
    pub fn parse(&self, filename: &str, content: &[u8]) -> ImportResult<RawTable> {
        let ext = Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        match ext.as_str() {
            "xlsx" | "xls" => ExcelParser.parse_bytes(content),
            _ => CsvParser.parse_bytes(content),
        }
    }

    /// 读取本地文件并解析
    pub fn parse_file<P: AsRef<Path>>(&self, file_path: P) -> ImportResult<RawTable> {
        let path = file_path.as_ref();
        if !path.exists() {
            return Err(ImportError::FileNotFound(path.display().to_string()));
        }

        let content = std::fs::read(path)?;
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default();
        self.parse(filename, &content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_csv_parser_aligns_short_and_long_rows() {
        let content = b"sku,name,price\nA1,Tee\nA2,Cap,5,extra\n";
        let table = CsvParser.parse_bytes(content).unwrap();

        assert_eq!(table.headers, vec!["sku", "name", "price"]);
        assert_eq!(table.len(), 2);
        assert_eq!(
            table.records[0],
            vec![Some("A1".to_string()), Some("Tee".to_string()), None]
        );
        assert_eq!(table.records[1].len(), 3);
    }

    #[test]
    fn test_csv_parser_strips_bom_and_skips_blank_lines() {
        let content = "\u{feff}sku,name\nA1,Tee\n\nA2,Cap\n".as_bytes();
        let table = CsvParser.parse_bytes(content).unwrap();

        assert_eq!(table.headers[0], "sku");
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_csv_parser_keeps_all_empty_rows() {
        let table = CsvParser.parse_bytes(b"sku,name\n,\nA1,Tee\n").unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.records[0], vec![Some(String::new()), Some(String::new())]);
    }

    #[test]
    fn test_csv_parser_rejects_invalid_utf8() {
        let result = CsvParser.parse_bytes(&[0x73, 0x6b, 0x75, 0x0a, 0xff, 0xfe]);
        assert!(matches!(result, Err(ImportError::EncodingError(_))));
    }

    #[test]
    fn test_csv_parser_empty_content() {
        let table = CsvParser.parse_bytes(b"").unwrap();
        assert!(table.is_empty());
    }

    #[test]
    fn test_rows_pairs_headers_with_cells() {
        let table = CsvParser.parse_bytes(b" sku , name\nA1, Tee \n").unwrap();
        let rows: Vec<_> = table.rows().collect();
        assert_eq!(rows[0][0], (" sku ", Some("A1".to_string())));
        assert_eq!(rows[0][1], (" name", Some(" Tee ".to_string())));
    }

    #[test]
    fn test_universal_parser_file_not_found() {
        let result = UniversalFileParser.parse_file("non_existent.csv");
        assert!(matches!(result, Err(ImportError::FileNotFound(_))));
    }

    #[test]
    fn test_universal_parser_reads_local_csv() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "sku,name,brand,mrp,price").unwrap();
        writeln!(temp_file, "A1,Tee,Acme,10,8").unwrap();

        let table = UniversalFileParser.parse_file(temp_file.path()).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.headers.len(), 5);
    }

    #[test]
    fn test_excel_parser_rejects_garbage() {
        let result = UniversalFileParser.parse("products.xlsx", b"not a workbook");
        assert!(result.is_err());
    }
}
