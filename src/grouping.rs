//! Grouping Module
//!
//! 日程表を日キー列で分割するモジュール。列検出ヒューリスティックは
//! レンダリング層から独立してテストできるよう、純粋関数として実装する。

use crate::types::{CellValue, DayGroup, GroupedItinerary, ItineraryTable};

/// 日キー列の検出に使用するマーカートークン
///
/// 列名にこれらのいずれかが部分文字列として含まれる最初の列が
/// 日キー列として選択されます。
const DAY_MARKERS: [&str; 2] = ["일차", "Day"];

/// 日キー列未検出時のフォールバックグループのラベル
pub const FALLBACK_DAY_LABEL: &str = "전체 일정";

/// 列名のリストから日キー列を検出する
///
/// 列を既存の順序でスキャンし、名前に「일차」または「Day」を含む最初の
/// 列のインデックスを返します。複数の候補がある場合は最初の一致が
/// 優先されます。これはスキーマではなくヒューリスティックであり、
/// 認識できない命名規則の場合は検出に失敗します（`None`）。
///
/// # 使用例
///
/// ```rust
/// use daytab::detect_day_column;
///
/// let columns = vec!["1일차".to_string(), "장소".to_string(), "시간".to_string()];
/// assert_eq!(detect_day_column(&columns), Some(0));
///
/// let columns = vec!["장소".to_string(), "시간".to_string()];
/// assert_eq!(detect_day_column(&columns), None);
/// ```
pub fn detect_day_column(columns: &[String]) -> Option<usize> {
    columns
        .iter()
        .position(|name| DAY_MARKERS.iter().any(|marker| name.contains(marker)))
}

/// 日程表を日ごとのグループに分割する
///
/// 日キー列が検出できた場合、その列の値（表示文字列）が等しい行を
/// 1つのグループにまとめます。等価判定は厳密な文字列一致で行い、
/// 空白の除去や大文字小文字の正規化は行いません（"1일차"と"1일차 "は
/// 別のグループになります）。グループは日キー値の初出順に並びます。
///
/// 分割の不変条件: すべての行はちょうど1つのグループに属します。
/// 行が重複することも、脱落することもありません。
///
/// 日キー列が検出できなかった場合は、全行を含む単一のグループ
/// （ラベル: `FALLBACK_DAY_LABEL`、列の除外なし）を返します。
/// 行が0件の表で日キー列が検出された場合、グループは0件になります。
pub fn group_by_day(table: &ItineraryTable) -> GroupedItinerary {
    let day_index = match detect_day_column(&table.columns) {
        Some(index) => index,
        None => {
            // 検出失敗はエラーではない: 表全体を未分割で表示する
            return GroupedItinerary {
                day_column: None,
                groups: vec![DayGroup {
                    day: FALLBACK_DAY_LABEL.to_string(),
                    columns: table.columns.clone(),
                    rows: table.rows.clone(),
                }],
            };
        }
    };

    // 初出順を維持しながら行を分割する
    let mut day_order: Vec<String> = Vec::new();
    let mut buckets: Vec<Vec<Vec<CellValue>>> = Vec::new();

    for row in &table.rows {
        let day_value = row
            .get(day_index)
            .map(CellValue::display)
            .unwrap_or_default();

        match day_order.iter().position(|day| *day == day_value) {
            Some(bucket_index) => buckets[bucket_index].push(row.clone()),
            None => {
                day_order.push(day_value);
                buckets.push(vec![row.clone()]);
            }
        }
    }

    let groups = day_order
        .into_iter()
        .zip(buckets)
        .map(|(day, rows)| build_day_group(day, &table.columns, rows))
        .collect();

    GroupedItinerary {
        day_column: Some(table.columns[day_index].clone()),
        groups,
    }
}

/// 1日分のグループを構築する
///
/// グループ内で完全に空の列を表示から除外します。除外判定は
/// `CellValue::Empty`のみを対象とし、空文字列のセルは空とみなしません。
fn build_day_group(day: String, columns: &[String], rows: Vec<Vec<CellValue>>) -> DayGroup {
    let kept_indices: Vec<usize> = (0..columns.len())
        .filter(|&col| {
            rows.iter()
                .any(|row| row.get(col).is_some_and(|cell| !cell.is_empty()))
        })
        .collect();

    let kept_columns = kept_indices
        .iter()
        .map(|&col| columns[col].clone())
        .collect();

    let kept_rows = rows
        .iter()
        .map(|row| {
            kept_indices
                .iter()
                .map(|&col| row.get(col).cloned().unwrap_or(CellValue::Empty))
                .collect()
        })
        .collect();

    DayGroup {
        day,
        columns: kept_columns,
        rows: kept_rows,
    }
}
