//! Unit tests for `parfor_core` types.

mod apply_tests;
mod edit_tests;
mod template_tests;
