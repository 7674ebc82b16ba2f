//! Receipt extraction pipeline components.

pub mod correction;
pub mod extractor;
pub mod layout;
pub mod pipeline;
pub mod registry;
pub mod rules;
pub mod scorer;
pub mod standardizer;
pub mod validator;

pub use correction::TextCorrector;
pub use extractor::{FieldExtractor, RawFieldMap};
pub use layout::{Layout, LayoutClassifier, LayoutModel};
pub use pipeline::{ExtractionOutcome, Pipeline};
pub use registry::{ExtractionRule, LayoutRuleRegistry, LayoutRuleSet, MatchPick};
pub use scorer::ConfidenceScorer;
pub use standardizer::Standardizer;
pub use validator::Validator;
