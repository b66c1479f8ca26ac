pub mod record;
pub mod schema;
pub mod table_def;

pub use record::{ID_FIELD, Record};
pub use schema::Schema;
pub use table_def::Table;
