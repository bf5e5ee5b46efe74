pub mod diagnostics;
pub mod matcher;
pub mod normalize;
pub mod report;
pub mod scoring;
pub mod similarity;
pub mod verdict;
pub mod word_spans;
