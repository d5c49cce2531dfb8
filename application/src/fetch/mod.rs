pub mod coordinator;
pub mod gateway;
