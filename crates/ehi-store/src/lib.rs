pub mod error;
pub mod load;
pub mod lookup;
pub mod schema;
pub mod store;

pub use error::{Result, StoreError};
pub use load::read_table;
pub use lookup::lookup_name;
pub use schema::{ColumnInfo, ColumnType, SchemaCatalog, TableSchema};
pub use store::{TableStore, list_table_files};
