use std::fmt::{Debug, Display};

use kernel::Report;

/// Boundary to the record table and the blob store.
///
/// Record and blob operations live on the same seam because every REST
/// operation that touches a file also touches the owning record.
pub trait Storage {
    type Err: Debug + Display;

    fn new_database(&self) -> Result<(), Self::Err>;

    fn get_reports(&mut self) -> Result<Vec<Report>, Self::Err>;

    fn get_report(&mut self, id: &str) -> Result<Report, Self::Err>;

    fn insert_report(&mut self, report: &Report) -> Result<(), Self::Err>;

    /// Replaces all scalar fields and the file reference wholesale.
    fn update_report(&mut self, report: &Report) -> Result<usize, Self::Err>;

    fn delete_report(&mut self, id: &str) -> Result<usize, Self::Err>;

    /// Stores a blob under the given key, overwriting any existing blob
    /// with that key.
    fn put_blob(&mut self, key: &str, content_type: &str, data: Vec<u8>) -> Result<usize, Self::Err>;

    fn get_blob(&self, key: &str) -> Result<(String, Vec<u8>), Self::Err>;

    fn delete_blob(&mut self, key: &str) -> Result<usize, Self::Err>;
}
