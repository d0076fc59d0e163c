//! Inspection AI Common Library
//!
//! 電動工具安全検査の状態モデル（CLIと将来のGUIで共有）

pub mod error;
pub mod fallback;
pub mod flow;
pub mod parser;
pub mod reducer;
pub mod store;
pub mod summary;
pub mod toggle;
pub mod types;

pub use error::{Error, Result};
pub use fallback::fallback_document;
pub use flow::{Action, FlowController, Step};
pub use parser::{extract_json, parse_analysis_response};
pub use reducer::{answer_question, mark_measured, measurement_display};
pub use store::{Change, DocumentStore, StoreEvent, SubscriptionId};
pub use summary::{summarize, InspectionSummary, SectionStatus};
pub use toggle::toggle;
pub use types::{
    Answer, ApplianceClassification, InspectionDocument, InspectionItem, Limit, OrderKey,
    SectionKey, TechnicalData, TestSection, Tests, YesNo,
};
