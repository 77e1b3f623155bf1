mod db;
mod local;
mod types;

pub use db::Database;
pub use local::{LocalStore, CATEGORIES_SLOT};
pub use types::{Card, Category, StoreChange};
