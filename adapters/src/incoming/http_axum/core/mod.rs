pub mod archive;
pub mod extractors;
