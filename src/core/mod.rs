/*!
# Core Module

Core functionality shared by every layer: typed errors, source positions
and file system helpers.
*/

pub mod errors;
pub mod position;
pub mod fs_utils;

pub use errors::{ModernityError, ParseError, Result, TaxonomyError};
pub use position::Position;
pub use fs_utils::{collect_php_files, has_extension, read_php_file};
