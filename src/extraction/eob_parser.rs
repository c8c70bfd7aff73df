//! EOB 字段解析规则
//!
//! 只依赖文本，不关心文本来自哪个引擎。所有正则在 `EobParser::new` 中编译一次。

use crate::error::{AppResult, ExtractionError};
use crate::models::{ExtractionRecord, FieldValue, NOT_AVAILABLE};
use regex::Regex;
use tracing::warn;

// ========== 报表字段名 ==========

pub const PATIENT_NAME: &str = "Patient Name";
pub const DATE_OF_SERVICE: &str = "Date of Service";
pub const LINE_CHARGE: &str = "Line Charge";
pub const ALLOWED: &str = "Allowed";
pub const CONTRACTUAL: &str = "Contractual";
pub const COPAY: &str = "Copay";
pub const DEDUCTIBLE: &str = "Deductible";
pub const COINSURANCE: &str = "Coinsurance";
pub const PAID: &str = "Paid";
pub const TOTAL_PTR: &str = "Total PTR";
pub const CHECK_EFT_NUMBER: &str = "Check/EFT Number";
pub const EFT_AMOUNT: &str = "EFT Amount";
pub const EFT_DATE: &str = "EFT Date";
pub const PROCESSED_DENIAL_DATE: &str = "Processed/Denial Date";
pub const PAYER_CLAIM_NUMBER: &str = "Payer Claim Number";

/// Grand Totals 表头中的 12 个金额类别，顺序与金额列一致
pub const GRAND_TOTAL_CATEGORIES: [&str; 12] = [
    "Line Charge",
    "Allowed",
    "QPA",
    "Contractual",
    "Payer Initiated",
    "OA",
    "Copay",
    "Deductible",
    "Coinsurance",
    "Responsibility",
    "Withhold",
    "Paid",
];

/// 报表中的货币列
pub const CURRENCY_FIELDS: [&str; 9] = [
    LINE_CHARGE,
    ALLOWED,
    CONTRACTUAL,
    COPAY,
    DEDUCTIBLE,
    COINSURANCE,
    PAID,
    TOTAL_PTR,
    EFT_AMOUNT,
];

/// 付款信息
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentInfo {
    pub eft_number: FieldValue,
    pub eft_date: FieldValue,
    pub eft_amount: FieldValue,
}

/// Grand Totals 各类别金额
#[derive(Debug, Clone, PartialEq)]
pub struct GrandTotals {
    amounts: [f64; 12],
    /// 文档中是否找到了 Grand Totals 区块
    pub found: bool,
}

impl GrandTotals {
    pub fn get(&self, category: &str) -> f64 {
        GRAND_TOTAL_CATEGORIES
            .iter()
            .position(|c| *c == category)
            .map(|i| self.amounts[i])
            .unwrap_or(0.0)
    }
}

/// EOB 文本解析器
pub struct EobParser {
    claim_number: Regex,
    grand_totals: Regex,
    payment: Regex,
    patient_name: Regex,
    date_of_service: Regex,
}

impl EobParser {
    pub fn new() -> AppResult<Self> {
        let amount = r"(\$\d+\.\d{2})";
        let grand_totals = format!(
            r"Grand Totals:\s*Other Patient\s*Line Charge\s*Allowed\s*QPA\s*Contractual\s*Payer Initiated\s*OA\s*Copay\s*Deductible\s*Coinsurance\s*Responsibility\s*Withhold\s*Paid{}",
            format!(r"\s*{}", amount).repeat(12)
        );

        Ok(Self {
            claim_number: Regex::new(r"(?s)Claim Number\s*.*?(\d+)")?,
            grand_totals: Regex::new(&grand_totals)?,
            payment: Regex::new(
                r"(?is)EFT\s*NUMBER[:\s]*([A-Z0-9\-]+).*?EFT\s*DATE[:\s]*([0-9/]+).*?EFT\s*AMOUNT[:\s]*\$?([0-9,]+\.[0-9]{2})",
            )?,
            patient_name: Regex::new(r"Corrected Patient Name:\s+([A-Za-z, \t]+)")?,
            date_of_service: Regex::new(r"(\d{2}/\d{2}/\d{4})\s+(\d{2}/\d{2}/\d{4})-")?,
        })
    }

    /// 理赔编号：`Claim Number` 之后的第一串数字
    pub fn claim_number(&self, text: &str) -> Option<String> {
        self.claim_number
            .captures(text)
            .map(|caps| caps[1].to_string())
    }

    /// Grand Totals 区块；找不到时全部为 0
    pub fn grand_totals(&self, text: &str) -> AppResult<GrandTotals> {
        let Some(caps) = self.grand_totals.captures(text) else {
            return Ok(GrandTotals {
                amounts: [0.0; 12],
                found: false,
            });
        };

        let mut amounts = [0.0; 12];
        for (i, category) in GRAND_TOTAL_CATEGORIES.iter().enumerate() {
            amounts[i] = parse_amount(category, &caps[i + 1])?;
        }

        Ok(GrandTotals {
            amounts,
            found: true,
        })
    }

    /// 付款信息
    ///
    /// - 实付金额为 0：不适用，编号和日期为 "N/A"，金额为 0
    /// - 实付金额大于 0 但找不到 EFT 区块：三项均缺失
    pub fn payment_info(&self, text: &str, paid: f64) -> AppResult<PaymentInfo> {
        if paid <= 0.0 {
            return Ok(PaymentInfo {
                eft_number: FieldValue::text(NOT_AVAILABLE),
                eft_date: FieldValue::text(NOT_AVAILABLE),
                eft_amount: FieldValue::Number(0.0),
            });
        }

        match self.payment.captures(text) {
            Some(caps) => Ok(PaymentInfo {
                eft_number: FieldValue::text(caps[1].trim()),
                eft_date: FieldValue::text(caps[2].trim()),
                eft_amount: FieldValue::Number(parse_amount(EFT_AMOUNT, &caps[3])?),
            }),
            None => Ok(PaymentInfo {
                eft_number: FieldValue::NotAvailable,
                eft_date: FieldValue::NotAvailable,
                eft_amount: FieldValue::NotAvailable,
            }),
        }
    }

    /// 更正后的患者姓名（只取同一行内容）
    pub fn corrected_patient_name(&self, text: &str) -> Option<String> {
        self.patient_name
            .captures(text)
            .map(|caps| caps[1].trim().to_string())
            .filter(|name| !name.is_empty())
    }

    /// 服务日期：取第一组 `起始日期 结束日期-` 中的起始日期
    pub fn date_of_service(&self, text: &str) -> Option<String> {
        self.date_of_service
            .captures(text)
            .map(|caps| caps[1].to_string())
    }

    /// 解析整份文档，生成报表记录
    pub fn parse(&self, text: &str) -> AppResult<ExtractionRecord> {
        let totals = self.grand_totals(text)?;
        let copay = totals.get(COPAY);
        let coinsurance = totals.get(COINSURANCE);
        let deductible = totals.get(DEDUCTIBLE);
        let paid = totals.get(PAID);
        let payment = self.payment_info(text, paid)?;

        let optional_text = |value: Option<String>| match value {
            Some(v) => FieldValue::Text(v),
            None => FieldValue::NotAvailable,
        };

        let record = ExtractionRecord::new()
            .with(PATIENT_NAME, optional_text(self.corrected_patient_name(text)))
            .with(DATE_OF_SERVICE, optional_text(self.date_of_service(text)))
            .with(LINE_CHARGE, FieldValue::Number(totals.get(LINE_CHARGE)))
            .with(ALLOWED, FieldValue::Number(totals.get(ALLOWED)))
            .with(CONTRACTUAL, FieldValue::Number(totals.get(CONTRACTUAL)))
            .with(COPAY, FieldValue::Number(copay))
            .with(DEDUCTIBLE, FieldValue::Number(deductible))
            .with(COINSURANCE, FieldValue::Number(coinsurance))
            .with(PAID, FieldValue::Number(paid))
            .with(TOTAL_PTR, FieldValue::Number(copay + coinsurance + deductible))
            .with(CHECK_EFT_NUMBER, payment.eft_number)
            .with(EFT_AMOUNT, payment.eft_amount)
            .with(EFT_DATE, payment.eft_date.clone())
            .with(PROCESSED_DENIAL_DATE, payment.eft_date)
            .with(PAYER_CLAIM_NUMBER, optional_text(self.claim_number(text)));

        if !totals.found {
            warn!("未找到 Grand Totals 区块，金额按 0 计");
        }

        Ok(record)
    }
}

/// 解析 `$1,234.56` / `1234.56` 形式的金额
pub fn parse_amount(field: &str, raw: &str) -> AppResult<f64> {
    let cleaned: String = raw
        .trim()
        .trim_start_matches('$')
        .chars()
        .filter(|c| *c != ',')
        .collect();
    cleaned.parse::<f64>().map_err(|_| {
        ExtractionError::InvalidAmount {
            field: field.to_string(),
            value: raw.to_string(),
        }
        .into()
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// 一份完整的 EOB 文本样例
    pub(crate) const SAMPLE_EOB: &str = "\
Corrected Patient Name: DOE, JANE
Claim Number
Payer ref 884512001
Service Dates 03/14/2024  03/14/2024-03/14/2024
Grand Totals: Other Patient Line Charge Allowed QPA Contractual Payer Initiated OA Copay Deductible Coinsurance Responsibility Withhold Paid
$450.00 $300.00 $0.00 $150.00 $0.00 $0.00 $25.00 $50.00 $15.00 $90.00 $0.00 $210.00
EFT NUMBER: TRN-000912
EFT DATE: 03/29/2024
EFT AMOUNT: $1,210.00
";

    fn parser() -> EobParser {
        EobParser::new().unwrap()
    }

    #[test]
    fn test_claim_number_spans_lines() {
        assert_eq!(parser().claim_number(SAMPLE_EOB).as_deref(), Some("884512001"));
        assert_eq!(parser().claim_number("no claim here"), None);
    }

    #[test]
    fn test_grand_totals() {
        let totals = parser().grand_totals(SAMPLE_EOB).unwrap();
        assert!(totals.found);
        assert_eq!(totals.get("Line Charge"), 450.0);
        assert_eq!(totals.get("Contractual"), 150.0);
        assert_eq!(totals.get("Copay"), 25.0);
        assert_eq!(totals.get("Paid"), 210.0);
    }

    #[test]
    fn test_grand_totals_missing_defaults_to_zero() {
        let totals = parser().grand_totals("nothing useful").unwrap();
        assert!(!totals.found);
        for category in GRAND_TOTAL_CATEGORIES {
            assert_eq!(totals.get(category), 0.0);
        }
    }

    #[test]
    fn test_payment_info_matched() {
        let info = parser().payment_info(SAMPLE_EOB, 210.0).unwrap();
        assert_eq!(info.eft_number, FieldValue::text("TRN-000912"));
        assert_eq!(info.eft_date, FieldValue::text("03/29/2024"));
        assert_eq!(info.eft_amount, FieldValue::Number(1210.0));
    }

    #[test]
    fn test_payment_info_case_insensitive() {
        let text = "eft number: abc1\nsomething\neft date 01/02/2024\neft amount 12.50";
        let info = parser().payment_info(text, 1.0).unwrap();
        assert_eq!(info.eft_number, FieldValue::text("abc1"));
        assert_eq!(info.eft_amount, FieldValue::Number(12.5));
    }

    #[test]
    fn test_payment_info_zero_paid_is_not_applicable() {
        let info = parser().payment_info(SAMPLE_EOB, 0.0).unwrap();
        assert_eq!(info.eft_number, FieldValue::text("N/A"));
        assert_eq!(info.eft_date, FieldValue::text("N/A"));
        assert_eq!(info.eft_amount, FieldValue::Number(0.0));
    }

    #[test]
    fn test_payment_info_paid_without_eft_block_is_missing() {
        let info = parser().payment_info("Paid but no EFT block", 10.0).unwrap();
        assert_eq!(info.eft_number, FieldValue::NotAvailable);
        assert_eq!(info.eft_date, FieldValue::NotAvailable);
        assert_eq!(info.eft_amount, FieldValue::NotAvailable);
    }

    #[test]
    fn test_patient_name_stays_on_one_line() {
        assert_eq!(
            parser().corrected_patient_name(SAMPLE_EOB).as_deref(),
            Some("DOE, JANE")
        );
        assert_eq!(parser().corrected_patient_name("Patient: X"), None);
    }

    #[test]
    fn test_date_of_service() {
        assert_eq!(
            parser().date_of_service(SAMPLE_EOB).as_deref(),
            Some("03/14/2024")
        );
    }

    #[test]
    fn test_parse_full_record() {
        let record = parser().parse(SAMPLE_EOB).unwrap();

        let names: Vec<_> = record.fields().map(|(k, _)| k).collect();
        assert_eq!(
            names,
            vec![
                PATIENT_NAME,
                DATE_OF_SERVICE,
                LINE_CHARGE,
                ALLOWED,
                CONTRACTUAL,
                COPAY,
                DEDUCTIBLE,
                COINSURANCE,
                PAID,
                TOTAL_PTR,
                CHECK_EFT_NUMBER,
                EFT_AMOUNT,
                EFT_DATE,
                PROCESSED_DENIAL_DATE,
                PAYER_CLAIM_NUMBER,
            ]
        );
        assert_eq!(record.get(TOTAL_PTR), Some(&FieldValue::Number(90.0)));
        assert_eq!(
            record.get(PROCESSED_DENIAL_DATE),
            record.get(EFT_DATE)
        );
        assert!(record.missing_fields().is_empty());
    }

    #[test]
    fn test_parse_unrecognised_text_marks_missing() {
        let record = parser().parse("just some letter text").unwrap();
        assert_eq!(
            record.missing_fields(),
            vec![PATIENT_NAME, DATE_OF_SERVICE, PAYER_CLAIM_NUMBER]
        );
        assert_eq!(record.get(PAID), Some(&FieldValue::Number(0.0)));
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("x", "$1,234.56").unwrap(), 1234.56);
        assert_eq!(parse_amount("x", "0.00").unwrap(), 0.0);
        assert!(parse_amount("x", "abc").is_err());
    }
}
