//! Loader Module
//!
//! アップロードされた日程表ファイル（CSV / XLSX）を`ItineraryTable`に
//! 変換するモジュール。CSVはcsvクレート、Excelはcalamineに解析を委譲し、
//! このモジュールは形式判定とセル値の正規化のみを行います。
//! 入力ストリームは1回だけ読み込まれ、解析失敗は単一のエラーとして
//! 報告されます（部分的な復旧は行いません）。

use calamine::{open_workbook_auto_from_rs, Data, Reader};
use chrono::{Duration, NaiveDate};
use std::io::Cursor;

use crate::error::DayTabError;
use crate::types::{CellValue, ItineraryTable};

/// アップロードファイルの最大サイズ（バイト）
///
/// この上限を超える入力は解析前に拒否されます。
pub const MAX_UPLOAD_BYTES: usize = 52_428_800; // 50MB

/// 入力ファイルの形式
///
/// ファイル名の拡張子による許可リストで判定されます。
/// 許可リスト外の拡張子はパーサーに到達する前に拒否されます。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    /// カンマ区切りテキスト（.csv）
    Csv,

    /// Excelスプレッドシート（.xlsx）
    Xlsx,
}

impl InputFormat {
    /// ファイル名から形式を判定する
    ///
    /// 拡張子の比較は大文字小文字を区別しません。
    ///
    /// # 戻り値
    ///
    /// * `Ok(InputFormat)` - 拡張子が許可リスト（.csv / .xlsx）に含まれる場合
    /// * `Err(DayTabError::UnsupportedFormat)` - それ以外のファイル名
    ///
    /// # 使用例
    ///
    /// ```rust
    /// use daytab::InputFormat;
    ///
    /// assert_eq!(InputFormat::from_filename("trip.csv").unwrap(), InputFormat::Csv);
    /// assert_eq!(InputFormat::from_filename("TRIP.XLSX").unwrap(), InputFormat::Xlsx);
    /// assert!(InputFormat::from_filename("trip.txt").is_err());
    /// ```
    pub fn from_filename(filename: &str) -> Result<Self, DayTabError> {
        let lower = filename.to_ascii_lowercase();
        if lower.ends_with(".csv") {
            Ok(InputFormat::Csv)
        } else if lower.ends_with(".xlsx") {
            Ok(InputFormat::Xlsx)
        } else {
            Err(DayTabError::UnsupportedFormat(filename.to_string()))
        }
    }
}

/// 日程表ファイルを解析して`ItineraryTable`を生成する
///
/// 先頭行をヘッダーとして扱い、残りの行をデータとして読み込みます。
/// すべての行はヘッダーの列数に揃えられます（Excelの場合、calamineの
/// `Range`が矩形を保証します）。
///
/// # 引数
///
/// * `bytes` - ファイルの内容
/// * `format` - `InputFormat::from_filename`で判定済みの形式
///
/// # 戻り値
///
/// * `Ok(ItineraryTable)` - 解析に成功した場合
/// * `Err(DayTabError)` - 解析に失敗した場合（呼び出し元で単一の
///   ユーザー向けメッセージとして報告される）
pub fn load_itinerary(bytes: &[u8], format: InputFormat) -> Result<ItineraryTable, DayTabError> {
    if bytes.len() > MAX_UPLOAD_BYTES {
        return Err(DayTabError::Upload(format!(
            "File size exceeds maximum: {} bytes (max: {} bytes)",
            bytes.len(),
            MAX_UPLOAD_BYTES
        )));
    }

    match format {
        InputFormat::Csv => load_csv(bytes),
        InputFormat::Xlsx => load_xlsx(bytes),
    }
}

/// CSVデータを解析する
///
/// 行ごとの列数の不一致はエラーにせず、ヘッダーの列数に正規化します
/// （足りないセルは空セルで埋め、余分なセルは切り捨てる）。
fn load_csv(bytes: &[u8]) -> Result<ItineraryTable, DayTabError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(bytes);

    let columns: Vec<String> = reader
        .headers()?
        .iter()
        .enumerate()
        .map(|(idx, name)| normalize_header(name, idx))
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let mut row: Vec<CellValue> = record.iter().map(parse_csv_field).collect();
        // 列数をヘッダーに揃える
        row.resize(columns.len(), CellValue::Empty);
        rows.push(row);
    }

    Ok(ItineraryTable::new(columns, rows))
}

/// CSVフィールドをセル値に変換する
///
/// 空文字列は空セルとして、数値として解釈できる文字列は数値として
/// 扱います。それ以外はそのまま文字列になります。
fn parse_csv_field(field: &str) -> CellValue {
    if field.is_empty() {
        CellValue::Empty
    } else if let Ok(n) = field.parse::<f64>() {
        CellValue::Number(n)
    } else {
        CellValue::Text(field.to_string())
    }
}

/// Excelデータを解析する
///
/// 最初のシートのみを読み込みます。シートが存在しない場合はエラーです。
fn load_xlsx(bytes: &[u8]) -> Result<ItineraryTable, DayTabError> {
    let mut workbook =
        open_workbook_auto_from_rs(Cursor::new(bytes.to_vec())).map_err(DayTabError::Parse)?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or(DayTabError::Parse(calamine::Error::Msg(
            "Workbook contains no sheets",
        )))?;

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(DayTabError::Parse)?;

    let mut row_iter = range.rows();

    let columns: Vec<String> = match row_iter.next() {
        Some(header_row) => header_row
            .iter()
            .enumerate()
            .map(|(idx, cell)| normalize_header(&data_to_cell(cell).display(), idx))
            .collect(),
        None => return Ok(ItineraryTable::new(vec![], vec![])),
    };

    let mut rows = Vec::new();
    for raw_row in row_iter {
        let row: Vec<CellValue> = raw_row.iter().map(data_to_cell).collect();
        rows.push(row);
    }

    Ok(ItineraryTable::new(columns, rows))
}

/// calamineのセルデータをセル値に変換する
fn data_to_cell(data: &Data) -> CellValue {
    match data {
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Float(f) => CellValue::Number(*f),
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => {
            // calamineのSheets経由では1904年エポック判定を取得できないため、
            // 常に1900年システムとして変換する
            match excel_serial_to_text(dt.as_f64(), false) {
                Ok(text) => CellValue::Text(text),
                Err(_) => CellValue::Number(dt.as_f64()),
            }
        }
        Data::DateTimeIso(s) => CellValue::Text(s.clone()),
        Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(e) => CellValue::Text(e.to_string()),
        Data::Empty => CellValue::Empty,
    }
}

/// ヘッダー名を正規化する
///
/// 空のヘッダーにはExcel形式の列名（A, B, C, ...）を割り当てます。
fn normalize_header(name: &str, index: usize) -> String {
    if name.is_empty() {
        col_index_to_letter(index as u32)
    } else {
        name.to_string()
    }
}

/// 列インデックスをExcel列名（A, B, C, ...）に変換
fn col_index_to_letter(mut col: u32) -> String {
    let mut result = String::new();
    loop {
        result.insert(0, (b'A' + (col % 26) as u8) as char);
        if col < 26 {
            break;
        }
        col = col / 26 - 1;
    }
    result
}

/// Excelのシリアル日付値をISO 8601形式の文字列に変換する
///
/// # 引数
///
/// * `serial` - Excelのシリアル日付値（整数部が日数、小数部が時刻）
/// * `is_1904` - 1904年エポックを使用するか
///
/// # エポック
///
/// - 1900年システム（デフォルト）: 1899年12月30日起算
///   （シリアル値1で1900-01-01になる。Excelの1900年うるう年バグを考慮）
/// - 1904年システム: 1904年1月1日起算
///
/// # 戻り値
///
/// * `Ok(String)` - 時刻部分がない場合は`YYYY-MM-DD`、ある場合は
///   `YYYY-MM-DD HH:MM:SS`
/// * `Err(DayTabError::Config)` - 日付計算がオーバーフローした場合
fn excel_serial_to_text(serial: f64, is_1904: bool) -> Result<String, DayTabError> {
    let epoch = if is_1904 {
        NaiveDate::from_ymd_opt(1904, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(1899, 12, 30)
    }
    .ok_or_else(|| DayTabError::Config("Failed to create date epoch".to_string()))?;

    let mut days = serial.floor() as i64;
    let mut secs = ((serial - serial.floor()) * 86_400.0).round() as u32;
    if secs >= 86_400 {
        days += 1;
        secs = 0;
    }

    let date = epoch
        .checked_add_signed(Duration::days(days))
        .ok_or_else(|| {
            DayTabError::Config(format!(
                "Date calculation overflow: serial={}, is_1904={}",
                serial, is_1904
            ))
        })?;

    if secs == 0 {
        Ok(date.format("%Y-%m-%d").to_string())
    } else {
        let time = date
            .and_hms_opt(secs / 3600, (secs % 3600) / 60, secs % 60)
            .ok_or_else(|| {
                DayTabError::Config(format!("Invalid time fraction: serial={}", serial))
            })?;
        Ok(time.format("%Y-%m-%d %H:%M:%S").to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // InputFormat のテスト
    #[test]
    fn test_from_filename_csv() {
        assert_eq!(
            InputFormat::from_filename("trip.csv").unwrap(),
            InputFormat::Csv
        );
        assert_eq!(
            InputFormat::from_filename("제주일정.CSV").unwrap(),
            InputFormat::Csv
        );
    }

    #[test]
    fn test_from_filename_xlsx() {
        assert_eq!(
            InputFormat::from_filename("trip.xlsx").unwrap(),
            InputFormat::Xlsx
        );
        assert_eq!(
            InputFormat::from_filename("TRIP.XLSX").unwrap(),
            InputFormat::Xlsx
        );
    }

    #[test]
    fn test_from_filename_rejected() {
        // 許可リスト外の拡張子は境界で拒否される
        assert!(InputFormat::from_filename("trip.txt").is_err());
        assert!(InputFormat::from_filename("trip.xls").is_err());
        assert!(InputFormat::from_filename("trip").is_err());
        assert!(InputFormat::from_filename("").is_err());

        match InputFormat::from_filename("trip.txt") {
            Err(DayTabError::UnsupportedFormat(name)) => assert_eq!(name, "trip.txt"),
            _ => panic!("Expected UnsupportedFormat error"),
        }
    }

    // CSV読み込みのテスト
    #[test]
    fn test_load_csv_basic() {
        let csv = "1일차,장소,시간\n1일차,우진해장국,09:00\n2일차,순천미향,12:00\n";
        let table = load_itinerary(csv.as_bytes(), InputFormat::Csv).unwrap();

        assert_eq!(
            table.columns,
            vec!["1일차".to_string(), "장소".to_string(), "시간".to_string()]
        );
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.rows[0][1], CellValue::Text("우진해장국".to_string()));
    }

    #[test]
    fn test_load_csv_numbers_and_empties() {
        let csv = "Day,비용\n1,25000\n2,\n";
        let table = load_itinerary(csv.as_bytes(), InputFormat::Csv).unwrap();

        assert_eq!(table.rows[0][0], CellValue::Number(1.0));
        assert_eq!(table.rows[0][1], CellValue::Number(25000.0));
        assert_eq!(table.rows[1][1], CellValue::Empty);
    }

    #[test]
    fn test_load_csv_ragged_rows_normalized() {
        // 足りないセルは空セルで埋められ、余分なセルは切り捨てられる
        let csv = "a,b\n1\n1,2,3\n";
        let table = load_itinerary(csv.as_bytes(), InputFormat::Csv).unwrap();

        assert_eq!(
            table.rows[0],
            vec![CellValue::Number(1.0), CellValue::Empty]
        );
        assert_eq!(
            table.rows[1],
            vec![CellValue::Number(1.0), CellValue::Number(2.0)]
        );
    }

    #[test]
    fn test_load_csv_empty_input() {
        let table = load_itinerary(b"", InputFormat::Csv).unwrap();
        assert_eq!(table.column_count(), 0);
        assert_eq!(table.row_count(), 0);
    }

    #[test]
    fn test_load_csv_headers_only() {
        let csv = "1일차,장소\n";
        let table = load_itinerary(csv.as_bytes(), InputFormat::Csv).unwrap();
        assert_eq!(table.column_count(), 2);
        assert_eq!(table.row_count(), 0);
    }

    #[test]
    fn test_load_xlsx_invalid_bytes() {
        // 不正なバイト列は単一の解析エラーになる
        let result = load_itinerary(b"not an excel file", InputFormat::Xlsx);
        assert!(result.is_err());
    }

    #[test]
    fn test_upload_size_limit() {
        let oversized = vec![b'a'; MAX_UPLOAD_BYTES + 1];
        let result = load_itinerary(&oversized, InputFormat::Csv);

        match result {
            Err(DayTabError::Upload(msg)) => {
                assert!(msg.contains("exceeds maximum"));
            }
            _ => panic!("Expected Upload error"),
        }
    }

    // セル変換のテスト
    #[test]
    fn test_parse_csv_field() {
        assert_eq!(parse_csv_field(""), CellValue::Empty);
        assert_eq!(parse_csv_field("42"), CellValue::Number(42.0));
        assert_eq!(parse_csv_field("42.5"), CellValue::Number(42.5));
        assert_eq!(
            parse_csv_field("1일차"),
            CellValue::Text("1일차".to_string())
        );
        // 前後の空白は保持される（正規化しない）
        assert_eq!(
            parse_csv_field("1일차 "),
            CellValue::Text("1일차 ".to_string())
        );
    }

    #[test]
    fn test_data_to_cell() {
        assert_eq!(data_to_cell(&Data::Int(3)), CellValue::Number(3.0));
        assert_eq!(data_to_cell(&Data::Float(1.5)), CellValue::Number(1.5));
        assert_eq!(
            data_to_cell(&Data::String("장소".to_string())),
            CellValue::Text("장소".to_string())
        );
        assert_eq!(data_to_cell(&Data::Bool(false)), CellValue::Bool(false));
        assert_eq!(data_to_cell(&Data::Empty), CellValue::Empty);
    }

    // ヘッダー正規化のテスト
    #[test]
    fn test_normalize_header() {
        assert_eq!(normalize_header("장소", 1), "장소");
        assert_eq!(normalize_header("", 0), "A");
        assert_eq!(normalize_header("", 2), "C");
    }

    #[test]
    fn test_col_index_to_letter() {
        assert_eq!(col_index_to_letter(0), "A");
        assert_eq!(col_index_to_letter(25), "Z");
        assert_eq!(col_index_to_letter(26), "AA");
        assert_eq!(col_index_to_letter(51), "AZ");
        assert_eq!(col_index_to_letter(52), "BA");
        assert_eq!(col_index_to_letter(701), "ZZ");
    }

    // シリアル日付変換のテスト
    #[test]
    fn test_excel_serial_to_text_1900_system() {
        // シリアル値1（1900年システム） = 1900-01-01
        assert_eq!(excel_serial_to_text(1.0, false).unwrap(), "1900-01-01");
        // エポック1899-12-30 + 45658日 = 2025-01-02
        assert_eq!(excel_serial_to_text(45658.0, false).unwrap(), "2025-01-02");
    }

    #[test]
    fn test_excel_serial_to_text_1904_system() {
        assert_eq!(excel_serial_to_text(0.0, true).unwrap(), "1904-01-01");
        assert_eq!(excel_serial_to_text(1.0, true).unwrap(), "1904-01-02");
    }

    #[test]
    fn test_excel_serial_to_text_with_time() {
        // 0.5 = 正午
        assert_eq!(
            excel_serial_to_text(45658.5, false).unwrap(),
            "2025-01-02 12:00:00"
        );
        // 0.375 = 09:00
        assert_eq!(
            excel_serial_to_text(45658.375, false).unwrap(),
            "2025-01-02 09:00:00"
        );
    }

    #[test]
    fn test_excel_serial_to_text_time_rollover() {
        // 秒の丸めで86400に達した場合は翌日に繰り上げる
        let result = excel_serial_to_text(45658.9999999, false).unwrap();
        assert_eq!(result, "2025-01-03");
    }

    #[test]
    fn test_excel_serial_monotonicity() {
        let d1 = excel_serial_to_text(100.0, false).unwrap();
        let d2 = excel_serial_to_text(200.0, false).unwrap();
        assert!(d1 < d2);
    }
}
