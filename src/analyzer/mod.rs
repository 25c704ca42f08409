//! Analysis engine: change severity and next version calculation

pub mod severity;
pub mod version_calculator;

pub use severity::{max_severity, SeverityClassifier, TypeConstraint};
pub use version_calculator::VersionCalculator;
