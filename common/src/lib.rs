//! Coffee AI Common Library
//!
//! CLIと将来のフロントエンドで共有される型と純粋ロジック

pub mod types;
pub mod error;
pub mod score;
pub mod schema;
pub mod prompts;
pub mod parser;
pub mod grid;
pub mod location;
pub mod session;

pub use types::{
    AnalysisResult, DailyPlan, Diagnosis, GeoLocation, HistoryRecord, Priority, RiskFactors,
    Severity,
};
pub use error::{Error, Result};
pub use score::{calculate_health_score, score_from_parts};
pub use schema::analysis_schema;
pub use prompts::{ANALYSIS_FAILED_MESSAGE, DIAGNOSIS_PROMPT, LOADING_MESSAGES};
pub use parser::{extract_json, parse_analysis_response, parse_diagnosis_response};
pub use grid::{aggregate_grid, filter_recent, GridCell, HealthBand, GRID_SIZE};
pub use location::{resolve_location, CaptureSource, LocationSource, DEFAULT_LOCATION};
pub use session::{LoadingTicker, Session, View};
