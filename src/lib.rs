//! Daily progress engine for a school Ramadan observance log.
//!
//! Participants submit one report per calendar day; the engine gates optional
//! activities through time-window and one-time-only rules, scores the
//! effective selection into an XP breakdown, upserts the day's report and
//! recomputes lifetime totals and the fasting streak from the full history.
//! Badge state is derived fresh from an aggregate snapshot on every query.

pub mod badges;
pub mod catalog;
pub mod config;
pub mod eligibility;
pub mod engine;
pub mod error;
pub mod hijri;
pub mod report;
pub mod scoring;
pub mod stats;
pub mod store;

pub use catalog::{Mission, MissionCatalog, MissionCategory};
pub use config::EngineConfig;
pub use engine::{ProgressEngine, SubmissionOutcome, UserProgress};
pub use error::{EngineError, StoreError};
pub use report::{DailyReport, Submission, SubmitRequest};
pub use stats::RankContext;
pub use store::{MemoryStore, ReportStore};
