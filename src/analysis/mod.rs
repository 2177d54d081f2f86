//! Analysis module: blur scoring, grouping, and scan orchestration.
//!
//! - [`blur`]: Laplacian-variance / edge-density blur scoring
//! - [`grouping`]: duplicate partitioning and pairwise similarity
//! - [`engine`]: the scan orchestrator tying the stages together
//! - [`model`]: the immutable result data model

pub mod blur;
pub mod engine;
pub mod grouping;
pub mod model;

pub use engine::{EngineError, ScanEngine, ScanPhase};
pub use grouping::similarity_from_distance;
pub use model::{
    AnalysisResult, BlurFinding, ErrorFinding, FileGroup, GroupEntry, GroupKind, ProgressEvent,
    ScanRequest, Thresholds,
};
