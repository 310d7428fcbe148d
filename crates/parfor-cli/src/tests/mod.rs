//! Tests for the CLI runtime.

mod behaviour;
mod support;
