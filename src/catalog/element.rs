use crate::io::configuration::{DEFAULT_ELEMENT_WEIGHT, DNA_DELIMITER, DNA_OPTION_PREFIX};
use crate::io::error::{GenerationError, Result, file_system};
use std::path::{Path, PathBuf};

/// One selectable trait value within a layer
///
/// The `id` is assigned once, from the element's position in the sorted
/// listing, and is what DNA tokens refer to. Filtered candidate views never
/// renumber it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// Zero-based position in the layer's load order
    pub id: usize,
    /// Trait value shown in metadata and matched by rules
    pub name: String,
    /// File name as found on disk, including weight and extension
    pub filename: String,
    /// Location of the renderable content
    pub path: PathBuf,
    /// Relative selection weight, always at least 1
    pub weight: u32,
}

/// File name without its final extension
pub fn file_stem(filename: &str) -> &str {
    filename
        .rsplit_once('.')
        .map_or(filename, |(stem, _extension)| stem)
}

/// Rarity weight encoded in a file name such as `Blue#20.png`
///
/// Missing, non-numeric and zero weights all fall back to the default.
pub fn rarity_weight(filename: &str, rarity_delimiter: &str) -> u32 {
    file_stem(filename)
        .rsplit(rarity_delimiter)
        .next()
        .and_then(|segment| segment.parse::<u32>().ok())
        .filter(|&weight| weight > 0)
        .unwrap_or(DEFAULT_ELEMENT_WEIGHT)
}

/// Trait name encoded in a file name, i.e. the stem before the rarity weight
pub fn clean_name<'a>(filename: &'a str, rarity_delimiter: &str) -> &'a str {
    let stem = file_stem(filename);
    stem.split(rarity_delimiter).next().unwrap_or(stem)
}

/// Entries starting with a dot are editor or OS artifacts, never traits
pub fn is_hidden(filename: &str) -> bool {
    filename.starts_with('.')
}

/// Build elements from a directory listing, preserving listing order
///
/// # Errors
///
/// Returns an error if a visible entry contains the DNA delimiter or the
/// option prefix
pub fn elements_from_listing<I, S>(
    directory: &Path,
    listing: I,
    rarity_delimiter: &str,
) -> Result<Vec<Element>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut elements = Vec::new();
    for entry in listing {
        let filename = entry.as_ref();
        if is_hidden(filename) {
            continue;
        }
        if let Some(delimiter) = [DNA_DELIMITER, DNA_OPTION_PREFIX]
            .into_iter()
            .find(|reserved| filename.contains(reserved))
        {
            return Err(GenerationError::InvalidName {
                name: filename.to_string(),
                delimiter,
            });
        }
        elements.push(Element {
            id: elements.len(),
            name: clean_name(filename, rarity_delimiter).to_string(),
            filename: filename.to_string(),
            path: directory.join(filename),
            weight: rarity_weight(filename, rarity_delimiter),
        });
    }
    Ok(elements)
}

/// Read a layer directory into elements
///
/// Files are sorted by name so ids are stable across runs on the same
/// directory. Sub-directories are ignored.
///
/// # Errors
///
/// Returns an error if the directory cannot be read or an entry name is invalid
pub fn load_elements(directory: &Path, rarity_delimiter: &str) -> Result<Vec<Element>> {
    let mut names = Vec::new();
    for entry in std::fs::read_dir(directory).map_err(file_system(directory, "read layer"))? {
        let entry = entry.map_err(file_system(directory, "read layer entry"))?;
        let is_file = entry
            .file_type()
            .map_err(file_system(entry.path(), "inspect layer entry"))?
            .is_file();
        if is_file {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    names.sort();
    elements_from_listing(directory, names, rarity_delimiter)
}
