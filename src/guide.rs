//! Guide Module
//!
//! 1日分の日程からガイド生成プロンプトを構築し、テキスト生成API
//! （Gemini `generateContent`）を呼び出すモジュール。
//!
//! APIはブラックボックスとして扱います: リクエストごとに1回の呼び出し
//! のみを行い、タイムアウト調整・リトライ・ストリーミングは実装しません。
//! 応答テキストは後処理なしでそのまま返されます。結果はキャッシュ
//! されないため、同じ日のガイドを再度要求すると新しい呼び出しが
//! 発生します。

use serde::{Deserialize, Serialize};

use crate::error::DayTabError;
use crate::render::render_text_grid;
use crate::types::DayGroup;

/// Gemini APIのベースURL
const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// 1日分のグループからガイド生成プロンプトを構築する
///
/// プロンプトは以下で構成されます:
///
/// 1. 固定のペルソナ指示（専門の旅行ガイドとして振る舞う）
/// 2. 3つの固定の分析依頼（経路効率の分析、データ中の場所への
///    簡単なチップ、友人同士の旅行に合う明るいトーン）
/// 3. グループ内の全セルのテキスト表描画
pub fn build_guide_prompt(group: &DayGroup) -> String {
    let context = render_text_grid(group);
    format!(
        "당신은 전문 여행 가이드입니다. 아래의 {day} 여행 일정을 보고:\n\
         1. 이동 경로가 효율적인지 분석하고\n\
         2. 해당 일차에 방문하는 '우진해장국'이나 '순천미향' 같은 장소에 대한 간단한 팁을 알려줘.\n\
         3. 친구들과 함께하는 여행에 어울리는 밝은 톤으로 말해줘.\n\
         \n\
         일정 데이터:\n\
         {context}",
        day = group.day,
        context = context
    )
}

/// `generateContent`リクエストのボディ
#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    text: String,
}

/// `generateContent`応答のボディ（必要なフィールドのみ）
#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Content,
}

/// テキスト生成APIのクライアント
///
/// モデル識別子と単一のプロンプト文字列で外部サービスを呼び出し、
/// 単一のテキスト応答を受け取ります。レイテンシ、レート制限、障害は
/// このシステムの制御外であり、リトライは行いません。
#[derive(Debug, Clone)]
pub struct GuideClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GuideClient {
    /// 新しいクライアントを生成する
    ///
    /// # 引数
    ///
    /// * `api_key` - 起動時に設定ストアから読み込まれた認証情報
    /// * `model` - モデル識別子（例: "gemini-2.5-flash"）
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: api_key.into(),
            model: model.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// ベースURLを差し替える（テスト用）
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// モデル識別子を取得
    pub fn model(&self) -> &str {
        &self.model
    }

    /// プロンプトを送信してガイドテキストを生成する
    ///
    /// ボタン押下1回につき外部呼び出しを1回だけ行います。
    ///
    /// # 戻り値
    ///
    /// * `Ok(String)` - 応答の最初の候補の全テキストパートを連結した
    ///   文字列（後処理なし）
    /// * `Err(DayTabError::Http)` - ネットワークレベルの失敗
    /// * `Err(DayTabError::Guide)` - APIがエラーステータスまたは
    ///   テキストを含まない応答を返した場合
    pub async fn generate(&self, prompt: &str) -> Result<String, DayTabError> {
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        );

        let body = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
        };

        let response = self.http.post(&url).json(&body).send().await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(DayTabError::Guide(format!(
                "API returned {}: {}",
                status,
                truncate(&detail, 200)
            )));
        }

        let payload: GenerateContentResponse = response.json().await?;

        response_text(payload)
            .ok_or_else(|| DayTabError::Guide("response contained no text".to_string()))
    }
}

/// 応答の最初の候補から全テキストパートを連結して取り出す
///
/// 候補が複数のパートに分かれている場合もすべて結合します。
/// 候補がない、またはパートが空の場合は`None`を返します。
fn response_text(payload: GenerateContentResponse) -> Option<String> {
    let candidate = payload.candidates.into_iter().next()?;
    if candidate.content.parts.is_empty() {
        return None;
    }
    Some(
        candidate
            .content
            .parts
            .into_iter()
            .map(|part| part.text)
            .collect(),
    )
}

/// エラー詳細を表示用に切り詰める
fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        text.chars().take(max_chars).collect()
    }
}
