//! Integration tests for the change-tracking registry

mod change_detection;
mod config_integration;
mod duplicate_names;
