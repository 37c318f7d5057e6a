//! Types Module
//!
//! クレート全体で使用する共通データ型を定義するモジュール。

use serde::{Deserialize, Serialize};

/// セルの値を表す列挙型
///
/// JSONへのシリアライズは`untagged`で行い、数値はJSON数値、文字列は
/// JSON文字列、空セルは`null`として表現されます。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    /// 数値（f64）
    Number(f64),

    /// 論理値
    Bool(bool),

    /// 文字列
    Text(String),

    /// 空セル
    Empty,
}

impl CellValue {
    /// 値が空かどうかを判定
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// 値を表示用の文字列として取得
    ///
    /// 整数値として表現できる数値は小数点なしで出力します
    /// （例: `1.0` -> `"1"`、`1.5` -> `"1.5"`）。空セルは空文字列になります。
    pub fn display(&self) -> String {
        match self {
            CellValue::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    format!("{}", *n as i64)
                } else {
                    n.to_string()
                }
            }
            CellValue::Bool(b) => b.to_string(),
            CellValue::Text(s) => s.clone(),
            CellValue::Empty => String::new(),
        }
    }
}

/// アップロードされた日程表全体
///
/// 列名の順序付きリストと、行ごとのセル値を保持します。
/// 各行の長さは必ず`columns.len()`に一致します（ローダーが保証）。
/// 読み込み後は不変として扱われます。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItineraryTable {
    /// 列名（ファイル内の出現順）
    pub columns: Vec<String>,

    /// 行データ（ファイル内の出現順）
    pub rows: Vec<Vec<CellValue>>,
}

impl ItineraryTable {
    /// 新しい日程表を生成
    pub fn new(columns: Vec<String>, rows: Vec<Vec<CellValue>>) -> Self {
        Self { columns, rows }
    }

    /// 行数を取得
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// 列数を取得
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }
}

/// 1日分の行グループ
///
/// 日キー列の値が等しい行の部分集合です。グループ内で完全に空の列は
/// 表示用に除外されています。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayGroup {
    /// 日キー列の値（例: "1일차"）
    pub day: String,

    /// このグループで表示される列名（空列除外後）
    pub columns: Vec<String>,

    /// このグループに属する行（元の順序を維持）
    pub rows: Vec<Vec<CellValue>>,
}

impl DayGroup {
    /// タブに表示するラベルを取得（例: "📅 1일차"）
    pub fn tab_label(&self) -> String {
        format!("📅 {}", self.day)
    }
}

/// 日ごとにグループ化された日程表
///
/// 日キー列が検出できた場合は`day_column`にその列名が入り、`groups`が
/// 出現順のグループを保持します。検出できなかった場合は`day_column`が
/// `None`となり、`groups`は全行を含む単一のグループになります。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupedItinerary {
    /// 検出された日キー列の名前（未検出の場合はNone）
    pub day_column: Option<String>,

    /// 日ごとのグループ（日キー値の初出順）
    pub groups: Vec<DayGroup>,
}

impl GroupedItinerary {
    /// 日キー列が検出されたかどうかを判定
    pub fn is_partitioned(&self) -> bool {
        self.day_column.is_some()
    }
}
