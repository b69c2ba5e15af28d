//! policyrag-advisor
//!
//! Turns retrieved policy chunks into tier-specific, cited retention
//! recommendations.

#![deny(dead_code)]
#![deny(unused_variables)]
#![deny(unused_imports)]

pub mod advisor;
pub mod assembler;
pub mod classifier;
pub mod parser;
pub mod query;
pub mod selector;
mod text;

pub use advisor::{Advisor, CustomerAdvice};
pub use assembler::{dedup_citations, format_recommended_text, tier_message, NO_EVIDENCE_TEXT};
pub use classifier::{Feature, LogisticClassifier, LogisticModel};
pub use parser::{clean_policy_text, parse_actions};
pub use query::synthesize_query;
pub use selector::ChunkSelector;
