pub mod kb_index_error;
