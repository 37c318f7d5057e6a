//! Render Module
//!
//! 1日分のグループをプレーンテキストの表として描画するモジュール。
//! 出力はガイド生成プロンプトに埋め込むための整形済みテキストで、
//! 列幅はunicode-widthによる表示幅（全角文字は幅2）で揃えられます。

use unicode_width::UnicodeWidthStr;

use crate::types::DayGroup;

/// グループをテキスト表として描画する
///
/// ヘッダー行の後にデータ行が続きます。各列は左揃えで、列間は
/// 2個の空白で区切られます。行も列もない場合は空文字列を返します。
///
/// # 出力例
///
/// ```text
/// 일차    장소        시간
/// 1일차   우진해장국  09:00
/// 1일차   성산일출봉  11:00
/// ```
pub fn render_text_grid(group: &DayGroup) -> String {
    if group.columns.is_empty() {
        return String::new();
    }

    // 各行を表示文字列に変換
    let display_rows: Vec<Vec<String>> = group
        .rows
        .iter()
        .map(|row| row.iter().map(|cell| cell.display()).collect())
        .collect();

    // 列ごとの表示幅を計算（ヘッダーを含む）
    let widths: Vec<usize> = group
        .columns
        .iter()
        .enumerate()
        .map(|(col, name)| {
            let header_width = name.width();
            let data_width = display_rows
                .iter()
                .filter_map(|row| row.get(col))
                .map(|text| text.width())
                .max()
                .unwrap_or(0);
            header_width.max(data_width)
        })
        .collect();

    let mut output = String::new();
    render_line(&mut output, &group.columns, &widths);
    for row in &display_rows {
        render_line(&mut output, row, &widths);
    }

    output
}

/// 1行分を幅揃えで出力する
fn render_line<S: AsRef<str>>(output: &mut String, cells: &[S], widths: &[usize]) {
    let last = cells.len().saturating_sub(1);
    for (col, cell) in cells.iter().enumerate() {
        let text = cell.as_ref();
        output.push_str(text);
        if col < last {
            // 表示幅ベースで左揃えにする（ASCIIのlen()では全角がずれる）。
            // 行のセル数が列数を超えていても（クライアント入力由来の
            // 不揃いなデータ）範囲外参照にはしない
            let padding = widths.get(col).copied().unwrap_or(0).saturating_sub(text.width()) + 2;
            for _ in 0..padding {
                output.push(' ');
            }
        }
    }
    output.push('\n');
}
