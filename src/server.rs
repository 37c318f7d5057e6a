//! Server Module
//!
//! axumによるシングルページアプリケーションのサーバー。ファイル
//! アップロード、日ごとのタブデータ、ガイド生成の各エンドポイントを
//! 提供します。
//!
//! サーバー側には解析済みの表を保持しません: アップロード応答が
//! グループ化済みのデータをすべて返し、ガイド生成時はクライアントが
//! 表示中の行データをコマンドとして送り返します。リクエスト間で
//! 共有される可変状態はありません。

use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    response::{Html, Json},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::error::DayTabError;
use crate::grouping::group_by_day;
use crate::guide::{build_guide_prompt, GuideClient};
use crate::loader::{load_itinerary, InputFormat, MAX_UPLOAD_BYTES};
use crate::types::{CellValue, DayGroup, GroupedItinerary};

/// 日キー列が検出できなかった場合の警告メッセージ
pub const WARNING_NO_DAY_COLUMN: &str =
    "시트에서 '일차' 정보를 찾을 수 없습니다. 데이터 형식을 확인해 주세요.";

/// アプリケーション状態
///
/// ガイド生成クライアントのみを保持します。設定は起動時に注入され、
/// 以後変更されません。
#[derive(Clone)]
pub struct AppState {
    /// テキスト生成APIのクライアント
    pub guide: Arc<GuideClient>,
}

impl AppState {
    /// 設定からアプリケーション状態を構築する
    pub fn new(config: &AppConfig) -> Self {
        Self {
            guide: Arc::new(GuideClient::new(
                config.api_key.clone(),
                config.model.clone(),
            )),
        }
    }

    /// 既存のクライアントから状態を構築する（テスト用）
    pub fn with_client(client: GuideClient) -> Self {
        Self {
            guide: Arc::new(client),
        }
    }
}

/// APIレスポンスの共通エンベロープ
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    /// 成功レスポンスを生成
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    /// 失敗レスポンスを生成
    pub fn err(message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message),
        }
    }
}

/// アップロード応答: グループ化済みの日程表
#[derive(Debug, Serialize, Deserialize)]
pub struct ItineraryView {
    /// 検出された日キー列の名前（未検出の場合はnull）
    pub day_column: Option<String>,

    /// 日キー列が検出できなかった場合の警告（それ以外はnull）
    pub warning: Option<String>,

    /// 日ごとのタブ（未検出時は全体を含む単一タブ）
    pub tabs: Vec<DayTabView>,
}

/// 1つのタブの表示データ
#[derive(Debug, Serialize, Deserialize)]
pub struct DayTabView {
    /// 日キー値（例: "1일차"）
    pub day: String,

    /// タブのラベル（例: "📅 1일차"）
    pub label: String,

    /// 表示する列名（グループ内の空列除外後）
    pub columns: Vec<String>,

    /// 表示する行データ
    pub rows: Vec<Vec<CellValue>>,
}

impl ItineraryView {
    /// グループ化結果から応答を構築する
    pub fn from_grouped(grouped: GroupedItinerary) -> Self {
        let warning = if grouped.is_partitioned() {
            None
        } else {
            Some(WARNING_NO_DAY_COLUMN.to_string())
        };
        let partitioned = grouped.is_partitioned();

        let tabs = grouped
            .groups
            .into_iter()
            .map(|group| DayTabView {
                label: if partitioned {
                    group.tab_label()
                } else {
                    group.day.clone()
                },
                day: group.day,
                columns: group.columns,
                rows: group.rows,
            })
            .collect();

        Self {
            day_column: grouped.day_column,
            warning,
            tabs,
        }
    }
}

/// ガイド生成コマンド
///
/// クライアントが表示中のタブの可視データをそのまま送り返します。
#[derive(Debug, Serialize, Deserialize)]
pub struct GuideCommand {
    /// 日キー値
    pub day: String,

    /// 表示中の列名
    pub columns: Vec<String>,

    /// 表示中の行データ
    pub rows: Vec<Vec<CellValue>>,
}

/// ガイド生成応答
#[derive(Debug, Serialize, Deserialize)]
pub struct GuideView {
    /// APIが返したテキスト（後処理なし）
    pub text: String,
}

/// ルーターを構築する
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(serve_index))
        .route("/api/health", get(health_check))
        .route("/api/itinerary", post(upload_itinerary))
        .route("/api/guide", post(request_guide))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES + 1024))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods(Any)
                        .allow_headers(Any),
                ),
        )
        .with_state(state)
}

/// シングルページUIを返す
async fn serve_index() -> Html<&'static str> {
    Html(include_str!("../static/index.html"))
}

/// ヘルスチェック
async fn health_check() -> Json<ApiResponse<String>> {
    Json(ApiResponse::ok("OK".to_string()))
}

/// アップロードされたファイルを解析し、日ごとにグループ化して返す
///
/// 解析失敗は単一のユーザー向けメッセージとしてエンベロープに入れて
/// 返します。ページは新しいアップロードのために使用可能なままです。
async fn upload_itinerary(mut multipart: Multipart) -> Json<ApiResponse<ItineraryView>> {
    match process_upload(&mut multipart).await {
        Ok(view) => {
            if view.warning.is_some() {
                warn!("day column not detected; showing unpartitioned table");
            } else {
                info!(
                    day_column = view.day_column.as_deref().unwrap_or(""),
                    tabs = view.tabs.len(),
                    "itinerary grouped"
                );
            }
            Json(ApiResponse::ok(view))
        }
        Err(e) => {
            warn!(error = %e, "failed to process upload");
            Json(ApiResponse::err(e.to_string()))
        }
    }
}

/// マルチパートからファイルを読み取り、解析とグループ化を行う
async fn process_upload(multipart: &mut Multipart) -> Result<ItineraryView, DayTabError> {
    let (filename, bytes) = read_file_field(multipart).await?;

    // 境界での許可リスト適用: パーサーには到達しない
    let format = InputFormat::from_filename(&filename)?;
    let table = load_itinerary(&bytes, format)?;
    let grouped = group_by_day(&table);

    Ok(ItineraryView::from_grouped(grouped))
}

/// マルチパートから"file"フィールドを読み取る
async fn read_file_field(multipart: &mut Multipart) -> Result<(String, Vec<u8>), DayTabError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| DayTabError::Upload(e.to_string()))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field
            .file_name()
            .ok_or_else(|| DayTabError::Upload("file field has no filename".to_string()))?
            .to_string();

        let bytes = field
            .bytes()
            .await
            .map_err(|e| DayTabError::Upload(e.to_string()))?;

        return Ok((filename, bytes.to_vec()));
    }

    Err(DayTabError::Upload(
        "multipart request has no 'file' field".to_string(),
    ))
}

/// 1日分のガイドを生成する
///
/// ボタン押下1回につき外部呼び出しを1回行います。失敗はそのタブの
/// インラインエラーとしてエンベロープに入れて返し、他のタブや表の
/// 表示には影響しません。
async fn request_guide(
    State(state): State<AppState>,
    Json(command): Json<GuideCommand>,
) -> Json<ApiResponse<GuideView>> {
    let group = DayGroup {
        day: command.day,
        columns: command.columns,
        rows: command.rows,
    };

    let prompt = build_guide_prompt(&group);
    info!(day = %group.day, model = state.guide.model(), "requesting day guide");

    match state.guide.generate(&prompt).await {
        Ok(text) => Json(ApiResponse::ok(GuideView { text })),
        Err(e) => {
            warn!(day = %group.day, error = %e, "guide generation failed");
            Json(ApiResponse::err(e.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ItineraryTable;

    fn text(s: &str) -> CellValue {
        CellValue::Text(s.to_string())
    }

    #[test]
    fn test_api_response_ok() {
        let response = ApiResponse::ok("data".to_string());
        assert!(response.success);
        assert_eq!(response.data, Some("data".to_string()));
        assert!(response.error.is_none());
    }

    #[test]
    fn test_api_response_err() {
        let response: ApiResponse<String> = ApiResponse::err("boom".to_string());
        assert!(!response.success);
        assert!(response.data.is_none());
        assert_eq!(response.error, Some("boom".to_string()));
    }

    #[test]
    fn test_itinerary_view_partitioned() {
        let table = ItineraryTable::new(
            vec!["일차".to_string(), "장소".to_string()],
            vec![
                vec![text("1일차"), text("A")],
                vec![text("2일차"), text("B")],
            ],
        );
        let view = ItineraryView::from_grouped(group_by_day(&table));

        assert_eq!(view.day_column, Some("일차".to_string()));
        assert!(view.warning.is_none());
        assert_eq!(view.tabs.len(), 2);
        assert_eq!(view.tabs[0].label, "📅 1일차");
        assert_eq!(view.tabs[1].label, "📅 2일차");
    }

    #[test]
    fn test_itinerary_view_fallback() {
        let table = ItineraryTable::new(
            vec!["장소".to_string()],
            vec![vec![text("A")]],
        );
        let view = ItineraryView::from_grouped(group_by_day(&table));

        assert!(view.day_column.is_none());
        assert_eq!(view.warning, Some(WARNING_NO_DAY_COLUMN.to_string()));
        assert_eq!(view.tabs.len(), 1);
        // フォールバックタブには絵文字ラベルを付けない
        assert!(!view.tabs[0].label.starts_with("📅"));
    }

    #[test]
    fn test_guide_command_deserialization() {
        let json = r#"{"day":"1일차","columns":["장소"],"rows":[["우진해장국"]]}"#;
        let command: GuideCommand = serde_json::from_str(json).unwrap();

        assert_eq!(command.day, "1일차");
        assert_eq!(command.columns, vec!["장소".to_string()]);
        assert_eq!(command.rows[0][0], text("우진해장국"));
    }
}
