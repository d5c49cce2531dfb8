pub mod pipeline;
pub mod request;
pub mod service;
