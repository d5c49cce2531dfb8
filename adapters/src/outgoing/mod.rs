pub mod artifacts_fs;
pub mod fs_cache;
pub mod osm_http;
pub mod render;
pub mod theme_fs;
pub mod tokio_spawn;
