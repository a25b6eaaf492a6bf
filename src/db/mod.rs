pub mod credential_store;
pub mod memory_store;
#[cfg(test)]
pub mod mock_db;
