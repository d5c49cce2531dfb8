pub mod artifact_store;
pub mod blocking_task;
pub mod dataset_cache;
pub mod geo_provider;
pub mod progress;
pub mod renderer;
pub mod sleeper;
pub mod task_spawn;
pub mod theme_store;
