//! CLI command implementations.

pub mod decode;
pub mod inspect;

use std::path::Path;

use color_eyre::eyre::{Result, WrapErr};

/// Reads an envelope file, or stdin when `path` is `-`.
pub fn read_envelope(path: &Path) -> Result<Vec<u8>> {
    if path == Path::new("-") {
        let mut bytes = Vec::new();
        std::io::Read::read_to_end(&mut std::io::stdin().lock(), &mut bytes)
            .wrap_err("failed to read envelope from stdin")?;
        return Ok(bytes);
    }
    std::fs::read(path).wrap_err_with(|| format!("failed to read {}", path.display()))
}
