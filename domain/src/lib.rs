pub mod cache_key;
pub mod color;
pub mod coords;
pub mod dataset;
pub mod error;
pub mod fetch_spec;
pub mod geometry;
pub mod job;
pub mod poster;
pub mod tags;
pub mod theme;
