use crate::material::MaterialRecord;
use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Load material records from a `.json` file (array or single object), a `.jsonl`
/// file, or a directory containing either.
pub fn load_materials<P: AsRef<Path>>(path: P) -> Result<Vec<MaterialRecord>> {
    let path = path.as_ref();
    let mut files: Vec<PathBuf> = Vec::new();
    if path.is_dir() {
        for entry in WalkDir::new(path).sort_by_file_name().into_iter().filter_map(|e| e.ok()) {
            let p = entry.path();
            if p.is_file() && matches!(extension(p), Some("json" | "jsonl")) {
                files.push(p.to_path_buf());
            }
        }
    } else if path.is_file() {
        files.push(path.to_path_buf());
    } else {
        anyhow::bail!("catalog path does not exist: {}", path.display());
    }

    let mut materials = Vec::new();
    for file in files {
        if extension(&file) == Some("jsonl") {
            read_jsonl(&file, &mut materials)?;
        } else {
            read_json(&file, &mut materials)?;
        }
    }
    tracing::debug!(count = materials.len(), path = %path.display(), "catalog loaded");
    Ok(materials)
}

fn extension(p: &Path) -> Option<&str> {
    p.extension().and_then(|s| s.to_str())
}

fn read_jsonl(file: &Path, out: &mut Vec<MaterialRecord>) -> Result<()> {
    let reader = BufReader::new(File::open(file)?);
    for (lineno, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() { continue; }
        let m: MaterialRecord = serde_json::from_str(&line)
            .with_context(|| format!("{}:{}", file.display(), lineno + 1))?;
        out.push(m);
    }
    Ok(())
}

fn read_json(file: &Path, out: &mut Vec<MaterialRecord>) -> Result<()> {
    let reader = BufReader::new(File::open(file)?);
    let json: serde_json::Value = serde_json::from_reader(reader)
        .with_context(|| format!("parsing {}", file.display()))?;
    match json {
        serde_json::Value::Array(arr) => {
            for v in arr {
                out.push(serde_json::from_value(v)?);
            }
        }
        serde_json::Value::Object(_) => out.push(serde_json::from_value(json)?),
        _ => {}
    }
    Ok(())
}
