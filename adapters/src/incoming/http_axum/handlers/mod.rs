// keep public for OpenAPI docs
pub mod files;
pub mod health;
pub mod posters;
pub mod themes;
