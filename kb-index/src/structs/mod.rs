pub mod kb_index_config;
pub mod knowledge;
