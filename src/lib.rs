//! daytab - Itinerary spreadsheet viewer with per-day AI travel guides
//!
//! This crate parses an uploaded itinerary spreadsheet (CSV / XLSX), groups
//! its rows by a day-identifying column, and serves one tab per day through
//! a small web UI. For each day, a natural-language tip summary can be
//! requested from a text-generation API (Gemini `generateContent`).
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use daytab::{group_by_day, load_itinerary, InputFormat};
//!
//! fn main() -> Result<(), daytab::DayTabError> {
//!     let bytes = std::fs::read("trip.csv")?;
//!     let format = InputFormat::from_filename("trip.csv")?;
//!     let table = load_itinerary(&bytes, format)?;
//!
//!     let grouped = group_by_day(&table);
//!     for group in &grouped.groups {
//!         println!("{} ({} rows)", group.tab_label(), group.rows.len());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Guide generation
//!
//! ```rust,no_run
//! use daytab::{build_guide_prompt, DayGroup, GuideClient};
//!
//! # async fn example(group: DayGroup) -> Result<(), daytab::DayTabError> {
//! let client = GuideClient::new("api-key", "gemini-2.5-flash");
//! let prompt = build_guide_prompt(&group);
//! let text = client.generate(&prompt).await?;
//! println!("{}", text);
//! # Ok(())
//! # }
//! ```

mod config;
mod error;
mod grouping;
mod guide;
mod loader;
mod render;
mod server;
mod types;

// 公開API
pub use config::{AppConfig, API_KEY_VAR, DEFAULT_MODEL};
pub use error::DayTabError;
pub use grouping::{detect_day_column, group_by_day, FALLBACK_DAY_LABEL};
pub use guide::{build_guide_prompt, GuideClient};
pub use loader::{load_itinerary, InputFormat, MAX_UPLOAD_BYTES};
pub use render::render_text_grid;
pub use server::{
    create_router, ApiResponse, AppState, DayTabView, GuideCommand, GuideView, ItineraryView,
    WARNING_NO_DAY_COLUMN,
};
pub use types::{CellValue, DayGroup, GroupedItinerary, ItineraryTable};
