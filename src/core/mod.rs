pub mod context_aggregator;
pub mod path_classifier;
pub mod pipeline;
pub mod prompt_builder;
pub mod tree_renderer;
