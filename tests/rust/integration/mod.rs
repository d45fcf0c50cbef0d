//! Integration tests - entity model, select context and translator working together
//!
//! These tests verify the full pipeline from a YAML entity model to translated SQL trees.

mod custom_provider_tests;
mod translation_pipeline_tests;
