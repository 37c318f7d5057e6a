//! Error Types Module
//!
//! クレート全体で使用する構造化エラー型を定義するモジュール。
//! `thiserror`を使用して、エラーの自動変換とメッセージフォーマットを実現する。

use thiserror::Error;

/// daytabクレート全体で使用するエラー型
///
/// このエラー型は、日程表ファイルの読み込み、解析、グループ化、および
/// ガイド生成APIの呼び出し中に発生するすべてのエラーを統一的に扱うために
/// 使用されます。
///
/// # エラーの種類
///
/// - `Io`: I/O操作中に発生したエラー（ファイル読み込み失敗など）
/// - `Parse`: Excelファイルの解析中に発生したエラー（calamine由来）
/// - `Csv`: CSVファイルの解析中に発生したエラー（csvクレート由来）
/// - `UnsupportedFormat`: 許可リスト外のファイル形式が指定されたエラー
/// - `Config`: 設定の検証に失敗したエラー（必須の認証情報の欠落など）
/// - `Upload`: アップロードされたマルチパートデータの読み取りエラー
/// - `Http`: ガイド生成APIへのHTTPリクエストが失敗したエラー
/// - `Guide`: ガイド生成APIが不正な応答を返したエラー
#[derive(Error, Debug)]
pub enum DayTabError {
    /// I/O操作中に発生したエラー
    ///
    /// `#[from]`属性により、`std::io::Error`から自動的に変換されます。
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Excelファイルの解析中に発生したエラー
    ///
    /// calamineクレートがExcelファイルを解析する際に発生したエラーです。
    /// ファイル形式が不正、破損したファイルなどが原因となります。
    #[error("Failed to parse spreadsheet: {0}")]
    Parse(#[from] calamine::Error),

    /// CSVファイルの解析中に発生したエラー
    ///
    /// 不正なUTF-8シーケンスや引用符の崩れなど、csvクレート由来のエラーです。
    #[error("Failed to parse CSV: {0}")]
    Csv(#[from] csv::Error),

    /// 許可リスト外のファイル形式が指定されたエラー
    ///
    /// アップロード境界で拡張子の許可リスト（.csv / .xlsx）を適用した結果、
    /// 対象外のファイル名が検出された場合に発生します。パーサーには到達しません。
    #[error("Unsupported file format: '{0}' (expected .csv or .xlsx)")]
    UnsupportedFormat(String),

    /// 設定の検証に失敗したエラー
    ///
    /// 起動時に必須の認証情報が欠落している場合など、設定読み込み時に
    /// 発生します。このエラーのみがプロセスを停止させます。
    #[error("Configuration error: {0}")]
    Config(String),

    /// アップロードされたマルチパートデータの読み取りエラー
    #[error("Upload error: {0}")]
    Upload(String),

    /// ガイド生成APIへのHTTPリクエストが失敗したエラー
    ///
    /// ネットワーク障害、接続拒否など、reqwest由来のエラーです。
    /// `#[from]`属性により、`reqwest::Error`から自動的に変換されます。
    #[error("Guide request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// ガイド生成APIが不正な応答を返したエラー
    ///
    /// HTTPステータスが成功以外の場合や、応答にテキスト候補が
    /// 含まれていない場合に発生します。
    #[error("Guide generation failed: {0}")]
    Guide(String),
}
