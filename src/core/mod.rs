pub mod base_classifier;
pub mod constants;
pub mod error;
pub mod event_relations;
pub mod pipeline;
pub mod token_groups;
pub mod utils;
