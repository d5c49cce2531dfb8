pub mod json_dir;
