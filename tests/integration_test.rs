use calamine::{open_workbook, Data, Reader, Xlsx};
use eob_batch::orchestrator::NoProgress;
use eob_batch::utils::logging;
use eob_batch::{App, AppError, Config, DocumentHandle, TextEngine};
use std::path::Path;

const VALID_EOB: &str = "Corrected Patient Name: SMITH, JOHN
Claim Number
0042
02/10/2024  02/10/2024-02/10/2024
Grand Totals: Other Patient Line Charge Allowed QPA Contractual Payer Initiated OA Copay Deductible Coinsurance Responsibility Withhold Paid
$1200.00 $800.00 $0.00 $400.00 $0.00 $0.00 $20.00 $100.00 $30.00 $150.00 $0.00 $650.00
EFT NUMBER: 77120 EFT DATE: 02/28/2024 EFT AMOUNT: $1,650.00
";

const UNPAID_EOB: &str = "Corrected Patient Name: ROE, RICHARD
Claim Number 515
01/05/2024  01/05/2024-01/05/2024
Grand Totals: Other Patient Line Charge Allowed QPA Contractual Payer Initiated OA Copay Deductible Coinsurance Responsibility Withhold Paid
$90.00 $0.00 $0.00 $90.00 $0.00 $0.00 $0.00 $0.00 $0.00 $0.00 $0.00 $0.00
";

/// 在临时目录里准备一份纯文本引擎的配置
fn text_config(root: &Path) -> Config {
    Config {
        max_workers: Some(2),
        input_folder: root.join("input").display().to_string(),
        output_file: root.join("processed_data.xlsx").display().to_string(),
        json_output_file: Some(root.join("processed_data.json").display().to_string()),
        notice_file: root.join("warn.txt").display().to_string(),
        output_log_file: root.join("output.txt").display().to_string(),
        text_engine: TextEngine::PlainText,
        ..Config::default()
    }
}

#[tokio::test]
async fn test_run_writes_report_and_notices() {
    logging::init();

    let dir = tempfile::tempdir().unwrap();
    let config = text_config(dir.path());
    let input = Path::new(&config.input_folder);
    std::fs::create_dir_all(input).unwrap();
    std::fs::write(input.join("valid.txt"), VALID_EOB).unwrap();
    std::fs::write(input.join("unpaid.txt"), UNPAID_EOB).unwrap();
    std::fs::write(input.join("blank.txt"), "\n  \n").unwrap();
    std::fs::write(input.join("corrupted.txt"), [0xc3u8, 0x28, 0xa0, 0xa1]).unwrap();
    // 扩展名不匹配，不参与处理
    std::fs::write(input.join("ignored.pdf"), VALID_EOB).unwrap();

    let app = App::initialize(config.clone()).unwrap();
    let outcome = tokio_test::assert_ok!(app.run().await);

    assert_eq!(outcome.total, 4);
    assert_eq!(outcome.records.len(), 2);
    assert_eq!(outcome.warnings().count(), 1);
    assert_eq!(outcome.errors().count(), 1);

    // 报表按服务日期排序，货币与日期已格式化
    let mut workbook: Xlsx<_> = open_workbook(&config.output_file).unwrap();
    let sheet = workbook.worksheet_range("Sheet1").unwrap();
    assert_eq!(sheet.height(), 3);
    assert_eq!(sheet.width(), 15);
    let cell = |row: u32, col: u32| match sheet.get_value((row, col)) {
        Some(Data::String(s)) => s.clone(),
        other => format!("{:?}", other),
    };
    assert_eq!(cell(0, 0), "Patient Name");
    assert_eq!(cell(0, 1), "Date of Service");
    assert_eq!(cell(0, 14), "Payer Claim Number");
    assert_eq!(cell(1, 0), "ROE, RICHARD");
    assert_eq!(cell(2, 0), "SMITH, JOHN");

    let report: serde_json::Value = serde_json::from_str(
        &std::fs::read_to_string(config.json_output_file.as_ref().unwrap()).unwrap(),
    )
    .unwrap();
    let rows = report.as_array().unwrap();
    assert_eq!(rows.len(), 2);

    assert_eq!(rows[0]["Patient Name"], "ROE, RICHARD");
    assert_eq!(rows[0]["Date of Service"], "2024-01-05");
    assert_eq!(rows[0]["Paid"], "0.00");
    assert_eq!(rows[0]["Check/EFT Number"], "N/A");
    assert_eq!(rows[0]["EFT Amount"], "0.00");

    assert_eq!(rows[1]["Patient Name"], "SMITH, JOHN");
    assert_eq!(rows[1]["Date of Service"], "2024-02-10");
    assert_eq!(rows[1]["Paid"], "$650.00");
    assert_eq!(rows[1]["Total PTR"], "$150.00");
    assert_eq!(rows[1]["Check/EFT Number"], "77120");
    assert_eq!(rows[1]["EFT Amount"], "$1,650.00");
    assert_eq!(rows[1]["Payer Claim Number"], "42");

    let notices = std::fs::read_to_string(&config.notice_file).unwrap();
    assert!(notices.contains("No data extracted from blank.txt"));
    assert!(notices.contains("Error processing corrupted.txt"));

    let log = std::fs::read_to_string(&config.output_log_file).unwrap();
    assert!(log.contains("EOB 处理日志"));
    assert!(log.contains("文本引擎: text"));
    assert!(log.contains("工作池: 2"));
}

#[tokio::test]
async fn test_run_with_empty_folder_is_not_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let config = text_config(dir.path());
    std::fs::create_dir_all(&config.input_folder).unwrap();

    let app = App::initialize(config.clone()).unwrap();
    let outcome = app.run().await.unwrap();

    assert_eq!(outcome.total, 0);
    assert!(outcome.records.is_empty());
    assert!(!Path::new(&config.output_file).exists());
}

#[tokio::test]
async fn test_run_with_missing_folder_fails() {
    let dir = tempfile::tempdir().unwrap();
    let config = text_config(dir.path());

    let app = App::initialize(config).unwrap();
    assert!(app.run().await.is_err());
}

#[tokio::test]
async fn test_process_without_valid_records_reports_no_valid_data() {
    let dir = tempfile::tempdir().unwrap();
    let config = text_config(dir.path());
    let app = App::initialize(config.clone()).unwrap();

    let documents = vec![
        DocumentHandle::new("blank.txt", "   "),
        DocumentHandle::new("bad.txt", vec![0xffu8, 0xfe]),
    ];
    let err = app.process(&documents, &NoProgress).await.unwrap_err();

    assert!(matches!(
        err.downcast_ref::<AppError>(),
        Some(AppError::NoValidData)
    ));
    assert_eq!(err.to_string(), "No valid data extracted from PDFs");
    assert!(!Path::new(&config.output_file).exists());

    // 通知依然写入
    let notices = std::fs::read_to_string(&config.notice_file).unwrap();
    assert_eq!(notices.lines().count(), 2);
}
