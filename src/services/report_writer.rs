//! 报表写入服务 - 业务能力层
//!
//! 负责把记录整理成报表行，写出 xlsx 报表（可选再写一份 JSON），以及记录单文档通知

use crate::error::{AppError, AppResult, FileError};
use crate::extraction::eob_parser::{CURRENCY_FIELDS, DATE_OF_SERVICE, PAYER_CLAIM_NUMBER};
use crate::models::{ExtractionRecord, FieldValue, NOT_AVAILABLE};
use crate::orchestrator::DocumentNotice;
use chrono::NaiveDate;
use rust_xlsxwriter::{Color, Format, FormatBorder, Workbook, Worksheet, XlsxError};
use std::fs::OpenOptions;
use std::io::Write;
use tracing::debug;

const DATE_FORMAT: &str = "%m/%d/%Y";

/// 报表工作表名
pub const SHEET_NAME: &str = "Sheet1";

/// 报表写入服务
pub struct ReportWriter {
    output_path: String,
    json_path: Option<String>,
    notice_path: String,
}

impl ReportWriter {
    pub fn new(output_path: impl Into<String>, notice_path: impl Into<String>) -> Self {
        Self {
            output_path: output_path.into(),
            json_path: None,
            notice_path: notice_path.into(),
        }
    }

    /// 同时输出一份 JSON 报表
    pub fn json_output(mut self, json_path: Option<String>) -> Self {
        self.json_path = json_path;
        self
    }

    pub fn output_path(&self) -> &str {
        &self.output_path
    }

    /// 整理记录并写入报表
    ///
    /// # 返回
    /// 写入的行数（不含表头）
    pub fn write_report(&self, records: Vec<ExtractionRecord>) -> AppResult<usize> {
        let rows = prepare_rows(records);

        write_workbook(&rows, &self.output_path).map_err(|source| FileError::SpreadsheetFailed {
            path: self.output_path.clone(),
            source,
        })?;
        debug!("写入报表 {} 行: {}", rows.len(), self.output_path);

        if let Some(json_path) = &self.json_path {
            let json = serde_json::to_string_pretty(&rows)?;
            std::fs::write(json_path, json).map_err(|e| AppError::file_write_failed(json_path, e))?;
            debug!("写入 JSON 报表: {}", json_path);
        }

        Ok(rows.len())
    }

    /// 追加单文档通知，每条一行
    pub fn write_notices(&self, notices: &[DocumentNotice]) -> AppResult<()> {
        if notices.is_empty() {
            return Ok(());
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.notice_path)
            .map_err(|e| AppError::file_write_failed(&self.notice_path, e))?;

        for notice in notices {
            writeln!(file, "{}", notice)
                .map_err(|e| AppError::file_write_failed(&self.notice_path, e))?;
        }

        Ok(())
    }
}

/// 写出单工作表的 xlsx 文件，列顺序取第一条记录的字段顺序
fn write_workbook(rows: &[ExtractionRecord], path: &str) -> Result<(), XlsxError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME)?;
    write_sheet(worksheet, rows)?;
    workbook.save(path)
}

fn write_sheet(worksheet: &mut Worksheet, rows: &[ExtractionRecord]) -> Result<(), XlsxError> {
    let header_format = Format::new()
        .set_bold()
        .set_background_color(Color::RGB(0xCCFFCC))
        .set_border(FormatBorder::Thin);

    let columns: Vec<&str> = rows
        .first()
        .map(|row| row.fields().map(|(name, _)| name).collect())
        .unwrap_or_default();

    for (col, name) in (0u16..).zip(&columns) {
        worksheet.write_string_with_format(0, col, *name, &header_format)?;
    }

    for (row_index, row) in (1u32..).zip(rows) {
        for (col, name) in (0u16..).zip(&columns) {
            match row.get(name) {
                Some(FieldValue::Text(text)) if text.is_empty() => {}
                Some(FieldValue::Text(text)) => {
                    worksheet.write_string(row_index, col, text.as_str())?;
                }
                Some(FieldValue::Number(n)) => {
                    worksheet.write_number(row_index, col, *n)?;
                }
                Some(FieldValue::NotAvailable) => {
                    worksheet.write_string(row_index, col, NOT_AVAILABLE)?;
                }
                None => {}
            }
        }
    }

    Ok(())
}

/// 整理报表行
///
/// - 按服务日期升序排序，日期缺失或无法解析的排在最后
/// - 服务日期转为 `YYYY-MM-DD`，缺失或无法解析时留空
/// - 货币列格式化为文本
/// - 理赔编号去掉前导零
pub fn prepare_rows(mut records: Vec<ExtractionRecord>) -> Vec<ExtractionRecord> {
    records.sort_by_key(|record| {
        let date = service_date(record);
        (date.is_none(), date)
    });

    for record in &mut records {
        let iso_date = service_date(record)
            .map(|date| date.format("%Y-%m-%d").to_string())
            .unwrap_or_default();
        if let Some(value) = record.get_mut(DATE_OF_SERVICE) {
            *value = FieldValue::Text(iso_date);
        }

        for field in CURRENCY_FIELDS {
            if let Some(value) = record.get_mut(field) {
                if let FieldValue::Number(n) = *value {
                    *value = FieldValue::Text(format_currency(n));
                }
            }
        }

        if let Some(FieldValue::Text(claim)) = record.get_mut(PAYER_CLAIM_NUMBER) {
            if let Ok(n) = claim.parse::<u128>() {
                *claim = n.to_string();
            }
        }
    }

    records
}

fn service_date(record: &ExtractionRecord) -> Option<NaiveDate> {
    record
        .get(DATE_OF_SERVICE)
        .and_then(FieldValue::as_text)
        .and_then(|s| NaiveDate::parse_from_str(s, DATE_FORMAT).ok())
}

/// 金额大于 0 时带 `$`，否则只保留两位小数；都带千分位
pub fn format_currency(value: f64) -> String {
    if value > 0.0 {
        format!("${}", group_thousands(value))
    } else {
        group_thousands(value)
    }
}

fn group_thousands(value: f64) -> String {
    let formatted = format!("{:.2}", value.abs());
    let (int_part, frac_part) = formatted.split_once('.').unwrap_or((formatted.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if value < 0.0 && formatted != "0.00" { "-" } else { "" };
    format!("{}{}.{}", sign, grouped, frac_part)
}
