//! Trace output sink

use log::info;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::domain::SetupError;

/// Open the sink records are written to
///
/// Standard output when `path` is `None`, otherwise the file is created (or
/// truncated). The renderer flushes after every record.
///
/// # Errors
/// Returns [`SetupError::SinkCreateFailed`] if the file cannot be created
pub fn open_sink(path: Option<&Path>) -> Result<Box<dyn Write>, SetupError> {
    match path {
        None => Ok(Box::new(io::stdout())),
        Some(path) => {
            let file = File::create(path).map_err(|source| SetupError::SinkCreateFailed {
                path: path.to_path_buf(),
                source,
            })?;
            info!("Writing trace output to {}", path.display());
            Ok(Box::new(BufWriter::new(file)))
        }
    }
}
