pub mod collection_store;
pub mod entities;
