mod catalog_error;
mod storage_error;
mod tollgate_error;

pub use catalog_error::CatalogError;
pub use storage_error::StorageError;
pub use tollgate_error::{TollgateError, TollgateResult};
