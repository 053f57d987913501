// Core logic exports
pub mod assembly;
pub mod extract;
pub mod parse;
pub mod prompt;
pub mod scoring;

pub use assembly::{AssemblyError, AssemblyStore, TeamAssembly};
pub use extract::{ExtractionError, ProfileExtractor, SourceKind};
pub use parse::{extract_object, JsonExtractError};
pub use prompt::{build_extraction_prompt, build_match_prompt, format_list};
pub use scoring::{DegradeReason, ScoreOutcome, ScoringEngine, DEGRADED_SCORE};
