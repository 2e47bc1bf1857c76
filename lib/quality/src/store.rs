//! Access to the serialized per-record graph documents produced by the harvest.

use crate::QualityError;
use oxrdfio::RdfFormat;
use std::fs::{self, File};
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Returns the file name a harvested record is stored under.
///
/// Europeana record identifiers look like `/2021672/resource_document_mauritshuis_670`. The
/// leading slash is dropped and every other slash becomes an underscore.
///
/// ```
/// use edm_quality::store::fragment_file_name;
///
/// assert_eq!(fragment_file_name("/2021672/item_670"), "2021672_item_670.rdf");
/// ```
pub fn fragment_file_name(record_id: &str) -> String {
    format!("{}.rdf", record_id.trim_start_matches('/').replace('/', "_"))
}

/// Where the bytes of a [Fragment] come from.
#[derive(Clone, Debug)]
pub enum FragmentSource {
    File(PathBuf),
    Bytes(Vec<u8>),
}

/// One serialized graph document describing a single harvested record.
#[derive(Clone, Debug)]
pub struct Fragment {
    pub name: String,
    pub format: RdfFormat,
    pub source: FragmentSource,
}

/// The file extensions harvested fragments are stored with.
const FRAGMENT_EXTENSIONS: [(&str, RdfFormat); 3] = [
    ("rdf", RdfFormat::RdfXml),
    ("ttl", RdfFormat::Turtle),
    ("nt", RdfFormat::NTriples),
];

fn fragment_format(extension: &str) -> Option<RdfFormat> {
    FRAGMENT_EXTENSIONS
        .iter()
        .find(|(candidate, _)| candidate.eq_ignore_ascii_case(extension))
        .map(|(_, format)| *format)
}

impl Fragment {
    /// Creates a fragment from a file, deriving the format from its extension.
    ///
    /// Returns `None` unless the extension is `rdf` (RDF/XML), `ttl` (Turtle) or `nt` (N-Triples).
    pub fn from_path(path: impl Into<PathBuf>) -> Option<Self> {
        let path = path.into();
        let format = fragment_format(path.extension()?.to_str()?)?;
        let name = path.file_name()?.to_string_lossy().into_owned();
        Some(Self {
            name,
            format,
            source: FragmentSource::File(path),
        })
    }

    /// Creates an in-memory fragment.
    pub fn from_bytes(
        name: impl Into<String>,
        format: RdfFormat,
        bytes: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            name: name.into(),
            format,
            source: FragmentSource::Bytes(bytes.into()),
        }
    }

    pub(crate) fn open(&self) -> io::Result<Box<dyn Read + '_>> {
        Ok(match &self.source {
            FragmentSource::File(path) => Box::new(BufReader::new(File::open(path)?)),
            FragmentSource::Bytes(bytes) => Box::new(bytes.as_slice()),
        })
    }
}

/// A directory of harvested fragments.
#[derive(Clone, Debug)]
pub struct FragmentStore {
    directory: PathBuf,
    fragments: Vec<Fragment>,
}

impl FragmentStore {
    /// Lists the fragments in `directory`, sorted by file name.
    ///
    /// Files with any other extension than those accepted by [Fragment::from_path] are ignored.
    pub fn open(directory: impl AsRef<Path>) -> Result<Self, QualityError> {
        let directory = directory.as_ref().to_path_buf();
        let mut fragments = Vec::new();
        for entry in fs::read_dir(&directory).map_err(QualityError::path(&directory))? {
            let path = entry.map_err(QualityError::path(&directory))?.path();
            if !path.is_file() {
                continue;
            }
            match Fragment::from_path(&path) {
                Some(fragment) => fragments.push(fragment),
                None => debug!("Ignoring {} which is not an RDF file", path.display()),
            }
        }
        fragments.sort_by(|a, b| a.name.cmp(&b.name));
        debug!(
            "Found {} fragments in {}",
            fragments.len(),
            directory.display()
        );
        Ok(Self {
            directory,
            fragments,
        })
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn fragments(&self) -> &[Fragment] {
        &self.fragments
    }

    pub fn len(&self) -> usize {
        self.fragments.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::prelude::*;
    use assert_fs::TempDir;

    #[test]
    fn file_names_replace_slashes() {
        assert_eq!(
            fragment_file_name("/9200397/BibliographicResource_3000126284212"),
            "9200397_BibliographicResource_3000126284212.rdf"
        );
        assert_eq!(fragment_file_name("a/b"), "a_b.rdf");
    }

    #[test]
    fn store_lists_rdf_files_sorted() -> Result<(), Box<dyn std::error::Error>> {
        let dir = TempDir::new()?;
        dir.child("b.rdf").write_str("")?;
        dir.child("a.ttl").write_str("")?;
        dir.child("c.NT").write_str("")?;
        dir.child("nested").create_dir_all()?;

        let store = FragmentStore::open(dir.path())?;
        let names: Vec<_> = store.fragments().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["a.ttl", "b.rdf", "c.NT"]);
        assert_eq!(store.fragments()[1].format, RdfFormat::RdfXml);
        assert_eq!(store.fragments()[2].format, RdfFormat::NTriples);
        Ok(())
    }

    #[test]
    fn store_ignores_id_lists_and_other_files() -> Result<(), Box<dyn std::error::Error>> {
        let dir = TempDir::new()?;
        dir.child("record.rdf").write_str("")?;
        dir.child("ids.txt").write_str("/2021672/item_670\n")?;
        dir.child("record.xml").write_str("")?;
        dir.child("record.jsonld").write_str("")?;
        dir.child("README").write_str("")?;

        let store = FragmentStore::open(dir.path())?;
        assert_eq!(store.len(), 1);
        assert_eq!(store.fragments()[0].name, "record.rdf");
        assert!(Fragment::from_path("ids.txt").is_none());
        Ok(())
    }

    #[test]
    fn missing_directory_is_an_error() {
        let result = FragmentStore::open("/this/directory/does/not/exist");
        assert!(matches!(result, Err(QualityError::Path { .. })));
    }
}
