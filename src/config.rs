//! Config Module
//!
//! 起動時に1回だけ読み込まれるアプリケーション設定。読み込み後は
//! 不変の値としてルーターの状態に注入され、グローバルには保持しません。

use std::env;

use crate::error::DayTabError;

/// 必須の認証情報の環境変数名
pub const API_KEY_VAR: &str = "GEMINI_API_KEY";

/// デフォルトのモデル識別子
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// デフォルトの待ち受けポート
const DEFAULT_PORT: u16 = 3000;

/// アプリケーション設定
///
/// `GEMINI_API_KEY`は必須で、欠落している場合は起動前に
/// `DayTabError::Config`で停止します（どの値が欠けているかを報告）。
/// `DAYTAB_MODEL`と`PORT`は省略可能です。
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// テキスト生成APIの認証情報
    pub api_key: String,

    /// モデル識別子
    pub model: String,

    /// サーバーの待ち受けポート
    pub port: u16,
}

impl AppConfig {
    /// プロセスの環境変数から設定を読み込む
    ///
    /// # 戻り値
    ///
    /// * `Ok(AppConfig)` - 必須の値がすべて存在する場合
    /// * `Err(DayTabError::Config)` - `GEMINI_API_KEY`が未設定または空の場合
    pub fn from_env() -> Result<Self, DayTabError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// 任意の検索関数から設定を読み込む（環境変数の変更なしでテスト可能）
    fn from_lookup<F>(lookup: F) -> Result<Self, DayTabError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup(API_KEY_VAR)
            .filter(|key| !key.is_empty())
            .ok_or_else(|| {
                DayTabError::Config(format!("environment variable '{}' is not set", API_KEY_VAR))
            })?;

        let model = lookup("DAYTAB_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let port = lookup("PORT")
            .and_then(|value| value.parse().ok())
            .unwrap_or(DEFAULT_PORT);

        Ok(Self {
            api_key,
            model,
            port,
        })
    }
}
