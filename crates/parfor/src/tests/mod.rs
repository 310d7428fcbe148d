//! Unit tests for the `parfor` pipeline.

mod pipeline_tests;
