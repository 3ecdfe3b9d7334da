pub mod alias;
pub mod cluster;
pub mod error;
pub mod index_facade;
pub mod index_name;
pub mod index_repository;
pub mod reindex;
pub mod template;

#[cfg(test)]
pub mod fake_cluster;
