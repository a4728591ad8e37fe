use crate::analyzer::Analyzer;
use crate::dictionary::Dictionary;
use crate::error::{IrError, Result};
use crate::store::DocumentStore;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs::{create_dir_all, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

pub const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetaFile {
    pub version: u32,
    pub created_at: String,
    pub num_docs: u32,
    pub num_terms: u32,
    pub analyzer: Analyzer,
}

pub struct IndexPaths {
    pub root: PathBuf,
}

impl IndexPaths {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self { root: root.as_ref().to_path_buf() }
    }
    fn dictionary(&self) -> PathBuf { self.root.join("dictionary.bin") }
    fn documents(&self) -> PathBuf { self.root.join("documents.bin") }
    fn meta(&self) -> PathBuf { self.root.join("meta.json") }

    /// True when all index files are present.
    pub fn exists(&self) -> bool {
        self.dictionary().is_file() && self.documents().is_file() && self.meta().is_file()
    }
}

/// Everything needed to answer queries after a restart.
#[derive(Debug, Clone, Default)]
pub struct IndexSnapshot {
    pub dictionary: Dictionary,
    pub documents: DocumentStore,
    pub analyzer: Analyzer,
}

pub fn save_index(paths: &IndexPaths, snapshot: &IndexSnapshot) -> Result<MetaFile> {
    create_dir_all(&paths.root)?;
    write_bincode(&paths.dictionary(), &snapshot.dictionary)?;
    write_bincode(&paths.documents(), &snapshot.documents)?;
    let meta = MetaFile {
        version: FORMAT_VERSION,
        created_at: now_rfc3339(),
        num_docs: snapshot.documents.len() as u32,
        num_terms: snapshot.dictionary.len() as u32,
        analyzer: snapshot.analyzer.clone(),
    };
    save_meta(paths, &meta)?;
    tracing::info!(
        root = %paths.root.display(),
        docs = meta.num_docs,
        terms = meta.num_terms,
        "index saved"
    );
    Ok(meta)
}

/// Load and validate a saved index.
pub fn load_index(paths: &IndexPaths) -> Result<(IndexSnapshot, MetaFile)> {
    let meta = load_meta(paths)?;
    if meta.version != FORMAT_VERSION {
        return Err(IrError::UnsupportedVersion { found: meta.version, expected: FORMAT_VERSION });
    }
    let dictionary: Dictionary = read_bincode(&paths.dictionary())?;
    dictionary.validate()?;
    let documents: DocumentStore = read_bincode(&paths.documents())?;
    if !documents.is_dense() {
        return Err(IrError::CorruptIndex("document ids are not dense from 1".into()));
    }
    if documents.len() != meta.num_docs as usize || dictionary.len() != meta.num_terms as usize {
        return Err(IrError::CorruptIndex("metadata counts do not match index contents".into()));
    }
    let snapshot = IndexSnapshot { dictionary, documents, analyzer: meta.analyzer.clone() };
    Ok((snapshot, meta))
}

pub fn save_meta(paths: &IndexPaths, meta: &MetaFile) -> Result<()> {
    create_dir_all(&paths.root)?;
    let mut f = File::create(paths.meta())?;
    let json = serde_json::to_string_pretty(meta)?;
    f.write_all(json.as_bytes())?;
    Ok(())
}

pub fn load_meta(paths: &IndexPaths) -> Result<MetaFile> {
    let f = File::open(paths.meta())?;
    let meta: MetaFile = serde_json::from_reader(BufReader::new(f))?;
    Ok(meta)
}

fn write_bincode<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let mut w = BufWriter::new(File::create(path)?);
    bincode::serialize_into(&mut w, value)?;
    w.flush()?;
    Ok(())
}

fn read_bincode<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let f = File::open(path)?;
    Ok(bincode::deserialize_from(BufReader::new(f))?)
}

fn now_rfc3339() -> String {
    time::OffsetDateTime::now_utc()
        .format(&time::format_description::well_known::Rfc3339)
        .unwrap_or_default()
}
