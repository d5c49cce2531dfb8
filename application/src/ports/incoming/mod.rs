pub mod posters;
pub mod themes;
