pub mod schema;
pub mod connection;
pub mod repositories;
pub mod rows;
pub mod store;

pub use connection::{Database, DbPool};
pub use rows::TableRow;
pub use store::{SeedStore, SqliteStore};
