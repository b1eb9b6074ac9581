use crate::error::{Result, SearchError};
use crate::index::IndexSnapshot;
use serde::{Deserialize, Serialize};
use std::fs::{self, create_dir_all, File};
use std::io::{BufReader, BufWriter, Cursor, Read, Write};
use std::path::{Path, PathBuf};

pub const INDEX_MAGIC: [u8; 4] = *b"SSIX";
pub const FORMAT_VERSION: u32 = 1;
pub const DEFAULT_INDEX_FILE: &str = "search_index.bin";

/// Header written after the 4-byte magic and ahead of the snapshot body.
/// `format_version` leads so it can be checked before anything else is decoded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexHeader {
    pub format_version: u32,
    pub created_at: String,
    pub built: bool,
    pub num_docs: u32,
    pub num_features: u32,
}

impl IndexHeader {
    fn for_snapshot(snapshot: &IndexSnapshot) -> Self {
        Self {
            format_version: FORMAT_VERSION,
            created_at: time::OffsetDateTime::now_utc()
                .format(&time::format_description::well_known::Rfc3339)
                .unwrap_or_else(|_| "".into()),
            built: true,
            num_docs: snapshot.num_docs() as u32,
            num_features: snapshot.num_features() as u32,
        }
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Write header and snapshot to `path`. The file is written beside the target and
/// renamed into place, so readers never see a half-written index.
pub fn save_snapshot(path: &Path, snapshot: &IndexSnapshot) -> Result<IndexHeader> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        create_dir_all(parent)?;
    }
    let header = IndexHeader::for_snapshot(snapshot);
    let tmp = tmp_path(path);
    {
        let mut w = BufWriter::new(File::create(&tmp)?);
        w.write_all(&INDEX_MAGIC)?;
        bincode::serialize_into(&mut w, &header)?;
        bincode::serialize_into(&mut w, snapshot)?;
        w.flush()?;
    }
    fs::rename(&tmp, path)?;
    Ok(header)
}

pub fn read_header(path: &Path) -> Result<IndexHeader> {
    let mut r = open(path)?;
    read_header_from(&mut r)
}

pub fn load_snapshot(path: &Path) -> Result<(IndexHeader, IndexSnapshot)> {
    let mut r = open(path)?;
    let header = read_header_from(&mut r)?;
    let snapshot: IndexSnapshot = bincode::deserialize_from(&mut r)?;
    snapshot.check_consistency().map_err(SearchError::Corrupt)?;
    if header.num_docs as usize != snapshot.num_docs() || header.num_features as usize != snapshot.num_features() {
        return Err(SearchError::Corrupt(format!(
            "header declares {} documents and {} features, snapshot has {} and {}",
            header.num_docs,
            header.num_features,
            snapshot.num_docs(),
            snapshot.num_features()
        )));
    }
    Ok((header, snapshot))
}

fn read_header_from<R: Read>(r: &mut R) -> Result<IndexHeader> {
    let mut preamble = [0u8; 8];
    r.read_exact(&mut preamble).map_err(|_| SearchError::BadMagic)?;
    if preamble[..4] != INDEX_MAGIC {
        return Err(SearchError::BadMagic);
    }
    let version = [preamble[4], preamble[5], preamble[6], preamble[7]];
    let found = u32::from_le_bytes(version);
    if found != FORMAT_VERSION {
        return Err(SearchError::IncompatibleFormat { expected: FORMAT_VERSION, found });
    }
    let header: IndexHeader = bincode::deserialize_from(Cursor::new(version).chain(r))?;
    Ok(header)
}

fn open(path: &Path) -> Result<BufReader<File>> {
    if !path.exists() {
        return Err(SearchError::IndexNotFound(path.to_path_buf()));
    }
    Ok(BufReader::new(File::open(path)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::{MaterialRecord, MaterialType};
    use crate::vectorizer::VectorizerConfig;
    use tempfile::tempdir;

    fn snapshot() -> IndexSnapshot {
        let materials = vec![
            MaterialRecord::new(1, "Graph Theory", "Trees and paths", "graphs", "Mathematics", MaterialType::Text),
            MaterialRecord::new(2, "Cell Biology", "Membranes", "cells", "Biology", MaterialType::Link),
        ];
        IndexSnapshot::build(&materials, VectorizerConfig::default(), None).unwrap()
    }

    #[test]
    fn header_round_trips() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join(DEFAULT_INDEX_FILE);
        let written = save_snapshot(&path, &snapshot()).unwrap();
        assert_eq!(read_header(&path).unwrap(), written);
        assert_eq!(written.num_docs, 2);
        assert!(!tmp_path(&path).exists());
    }

    #[test]
    fn rejects_future_version() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("idx.bin");
        let mut header = IndexHeader::for_snapshot(&snapshot());
        header.format_version = FORMAT_VERSION + 1;
        let mut f = File::create(&path).unwrap();
        f.write_all(&INDEX_MAGIC).unwrap();
        f.write_all(&bincode::serialize(&header).unwrap()).unwrap();
        let err = load_snapshot(&path).unwrap_err();
        assert!(matches!(err, SearchError::IncompatibleFormat { found, .. } if found == FORMAT_VERSION + 1));
    }

    #[test]
    fn header_counts_must_match_body() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("idx.bin");
        let snap = snapshot();
        let mut header = IndexHeader::for_snapshot(&snap);
        header.num_docs += 1;
        let mut f = File::create(&path).unwrap();
        f.write_all(&INDEX_MAGIC).unwrap();
        bincode::serialize_into(&mut f, &header).unwrap();
        bincode::serialize_into(&mut f, &snap).unwrap();
        drop(f);
        assert!(matches!(load_snapshot(&path).unwrap_err(), SearchError::Corrupt(_)));
    }

    #[test]
    fn rejects_foreign_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        fs::write(&path, b"hello, this is not an index").unwrap();
        assert!(matches!(load_snapshot(&path).unwrap_err(), SearchError::BadMagic));
    }

    #[test]
    fn missing_file_is_reported() {
        let dir = tempdir().unwrap();
        let err = load_snapshot(&dir.path().join("absent.bin")).unwrap_err();
        assert!(matches!(err, SearchError::IndexNotFound(_)));
    }
}
