//! Command workflows behind the `semantic-changelog` binary

pub mod orchestration;
