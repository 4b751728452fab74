pub mod csv_source;
pub mod memory_source;

pub use csv_source::{read_listings, write_listings, CsvListingSource};
pub use memory_source::InMemorySource;
