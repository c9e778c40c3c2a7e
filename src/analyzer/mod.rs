/*!
# Modernity Analyzer Module

Classification pipeline: the annotator stamps every node with its language
level range, the counters and the visitor fold the stamps into a weighted
tuple, and the engine drives the pipeline for code, files and directories.
Package sets are scored version by version on top of directory analysis.
*/

pub mod annotator;
pub mod counters;
pub mod engine;
pub mod modernity_visitor;
pub mod packages;

#[cfg(test)]
mod engine_test;

pub use annotator::Annotator;
pub use counters::{NodeCounter, SubNodeCounter};
pub use engine::{DirectoryAnalysis, FileEntry, Modernity};
pub use modernity_visitor::ModernityVisitor;
pub use packages::{discover_packages, score_packages, PackageResult, PackageVersion};
