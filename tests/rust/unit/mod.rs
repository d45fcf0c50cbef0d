//! Unit tests - public API of individual modules, no cross-module pipelines

mod entity_model_tests;
mod type_mapping_tests;
