pub mod nc;
pub mod types;
pub mod utils;

pub use nc::NcReader;
pub use types::{FileType, GridReader, GridSubset, ReadError};
pub use utils::reader_from_filetype;

use std::path::Path;

pub fn create_reader(file_name: &Path, variable: &str) -> Result<Box<dyn GridReader>, ReadError> {
    match reader_from_filetype(file_name)? {
        FileType::NetCDF => Ok(Box::new(NcReader {
            file_name: file_name.to_path_buf(),
            variable: variable.to_string(),
        })),
    }
}
