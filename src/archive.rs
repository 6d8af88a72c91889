use std::fs::File;
use std::io::Read;
use std::path::Path;

use tracing::{info, warn};
use zip::ZipArchive;

use crate::error::{Error, Result};

/// Open a KMZ archive and return the decompressed bytes of its KML document.
///
/// The first entry whose name ends in `.kml` wins. Archives written by
/// different tools list entries in different orders, so a multi-document
/// archive is flagged with a warning.
pub fn read_kml_bytes(path: &Path) -> Result<Vec<u8>> {
    let file = File::open(path)?;
    let mut archive = ZipArchive::new(file)?;

    let mut chosen: Option<usize> = None;
    for i in 0..archive.len() {
        let entry = archive.by_index(i)?;
        if !entry.is_file() || !entry.name().ends_with(".kml") {
            continue;
        }
        match chosen {
            None => chosen = Some(i),
            Some(_) => warn!(
                "ignoring extra .kml entry {:?} in {}",
                entry.name(),
                path.display()
            ),
        }
    }

    let index = chosen.ok_or_else(|| Error::MissingDocument(path.to_path_buf()))?;
    let mut entry = archive.by_index(index)?;
    info!("reading {:?} from {}", entry.name(), path.display());

    let mut bytes = Vec::with_capacity(entry.size() as usize);
    entry.read_to_end(&mut bytes)?;
    Ok(bytes)
}
