use data_error::{DataError, Result};

use std::fs;
use std::path::Path;

/// Write `data` to a temporary file in the destination's directory,
/// then rename it over the destination.
///
/// The rename stays within one directory, so readers opening `dest`
/// concurrently see either the old contents or the new contents in full,
/// never a partially written file.
pub fn temp_and_move(data: &[u8], dest: impl AsRef<Path>) -> Result<()> {
    let dest = dest.as_ref();
    let dir = dest.parent().ok_or_else(|| {
        DataError::InvalidArgument(format!(
            "Destination has no parent directory: {}",
            dest.display()
        ))
    })?;

    let suffix: String = std::iter::repeat_with(fastrand::alphanumeric)
        .take(10)
        .collect();
    let tmp = dir.join(format!(".tmp-{}", suffix));

    fs::write(&tmp, data)?;
    if let Err(e) = fs::rename(&tmp, dest) {
        let _ = fs::remove_file(&tmp);
        return Err(e.into());
    }

    Ok(())
}
