use crate::engine::CancelToken;
use crate::error::{Result, SearchError};
use crate::material::{MaterialId, MaterialRecord};
use crate::prepare::prepare_documents;
use crate::vectorizer::{SparseVector, Vectorizer, VectorizerConfig};
use serde::{Deserialize, Serialize};

pub type RowId = u32;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Posting {
    pub row: RowId,
    pub weight: f32, // normalized tf-idf weight
}

/// An immutable, fully built index. The document-term matrix is stored column-wise:
/// `postings[term_id]` lists the non-zero rows of that term, sorted by row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexSnapshot {
    pub vectorizer: Vectorizer,
    pub postings: Vec<Vec<Posting>>,
    /// Material id of every matrix row, in build input order.
    pub document_ids: Vec<MaterialId>,
    /// Prepared text of every matrix row.
    pub documents: Vec<String>,
}

impl IndexSnapshot {
    pub fn build(
        materials: &[MaterialRecord],
        config: VectorizerConfig,
        cancel: Option<&CancelToken>,
    ) -> Result<Self> {
        if materials.is_empty() {
            return Err(SearchError::EmptyCorpus);
        }
        let documents = prepare_documents(materials);
        let (vectorizer, rows) = Vectorizer::fit_transform(config, &documents, cancel)?;
        let postings = transpose(&rows, vectorizer.num_features());
        Ok(Self {
            vectorizer,
            postings,
            document_ids: materials.iter().map(|m| m.id).collect(),
            documents,
        })
    }

    pub fn num_docs(&self) -> usize { self.document_ids.len() }

    pub fn num_features(&self) -> usize { self.vectorizer.num_features() }

    /// Cosine similarity of `query` against every row, indexed by row.
    pub fn similarities(&self, query: &str) -> Vec<f32> {
        let q = self.vectorizer.transform(query);
        let mut scores = vec![0.0f32; self.num_docs()];
        for (tid, q_w) in q {
            for p in &self.postings[tid as usize] {
                scores[p.row as usize] += p.weight * q_w; // cosine since both sides are normalized
            }
        }
        scores
    }

    /// Invariants a loaded snapshot must satisfy before it can be searched: one id and
    /// one prepared document per row, one posting list per vocabulary column, vocabulary
    /// ids that are distinct columns, finite positive idf weights, and postings that point
    /// at existing rows with finite weights.
    pub fn check_consistency(&self) -> std::result::Result<(), String> {
        let rows = self.num_docs();
        if self.documents.len() != rows {
            return Err(format!("{} documents for {} rows", self.documents.len(), rows));
        }
        if self.postings.len() != self.num_features() || self.vectorizer.vocabulary.len() != self.num_features() {
            return Err(format!(
                "{} posting lists, {} vocabulary terms, {} idf weights",
                self.postings.len(),
                self.vectorizer.vocabulary.len(),
                self.num_features()
            ));
        }
        let mut seen = vec![false; self.num_features()];
        for (term, &tid) in &self.vectorizer.vocabulary {
            match seen.get_mut(tid as usize) {
                None => return Err(format!("term {term:?} maps to column {tid} of {}", self.num_features())),
                Some(true) => return Err(format!("column {tid} is assigned to more than one term")),
                Some(slot) => *slot = true,
            }
        }
        if let Some((tid, w)) = self.vectorizer.idf.iter().enumerate().find(|(_, w)| !(w.is_finite() && **w > 0.0)) {
            return Err(format!("idf weight {w} for column {tid}"));
        }
        if let Some(p) = self.postings.iter().flatten().find(|p| p.row as usize >= rows) {
            return Err(format!("posting references row {} of {}", p.row, rows));
        }
        if let Some(p) = self.postings.iter().flatten().find(|p| !p.weight.is_finite()) {
            return Err(format!("posting weight {} in row {}", p.weight, p.row));
        }
        Ok(())
    }
}

fn transpose(rows: &[SparseVector], num_features: usize) -> Vec<Vec<Posting>> {
    let mut postings: Vec<Vec<Posting>> = vec![Vec::new(); num_features];
    for (row, vector) in rows.iter().enumerate() {
        for &(tid, weight) in vector {
            postings[tid as usize].push(Posting { row: row as RowId, weight });
        }
    }
    postings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::MaterialType;
    use crate::vectorizer::TermId;

    fn row(snap: &IndexSnapshot, row: RowId) -> SparseVector {
        let mut out = SparseVector::new();
        for (tid, plist) in snap.postings.iter().enumerate() {
            if let Ok(i) = plist.binary_search_by_key(&row, |p| p.row) {
                out.push((tid as TermId, plist[i].weight));
            }
        }
        out
    }

    fn corpus() -> Vec<MaterialRecord> {
        vec![
            MaterialRecord::new(10, "Organic Chemistry", "Carbon compounds", "chemistry", "Chemistry", MaterialType::Pdf),
            MaterialRecord::new(20, "World History", "Ancient empires", "history", "History", MaterialType::Video),
        ]
    }

    #[test]
    fn shape_matches_inputs() {
        let snap = IndexSnapshot::build(&corpus(), VectorizerConfig::default(), None).unwrap();
        assert_eq!(snap.document_ids, vec![10, 20]);
        assert_eq!(snap.documents.len(), 2);
        assert_eq!(snap.postings.len(), snap.num_features());
        assert!(snap.check_consistency().is_ok());
    }

    #[test]
    fn rows_are_unit_length() {
        let snap = IndexSnapshot::build(&corpus(), VectorizerConfig::default(), None).unwrap();
        for r in 0..2 {
            let norm: f32 = row(&snap, r).iter().map(|(_, w)| w * w).sum::<f32>().sqrt();
            assert!((norm - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn out_of_range_vocabulary_is_inconsistent() {
        let mut snap = IndexSnapshot::build(&corpus(), VectorizerConfig::default(), None).unwrap();
        let bad = (snap.num_features() + 100) as TermId;
        snap.vectorizer.vocabulary.insert("carbon".into(), bad);
        assert!(snap.check_consistency().unwrap_err().contains("carbon"));
    }

    #[test]
    fn shared_columns_and_bad_idf_are_inconsistent() {
        let clean = IndexSnapshot::build(&corpus(), VectorizerConfig::default(), None).unwrap();

        let mut shared = clean.clone();
        let carbon = shared.vectorizer.vocabulary["carbon"];
        shared.vectorizer.vocabulary.insert("ancient".into(), carbon);
        assert!(shared.check_consistency().is_err());

        let mut nan = clean;
        nan.vectorizer.idf[0] = f32::NAN;
        assert!(nan.check_consistency().is_err());
    }

    #[test]
    fn similarity_prefers_matching_row() {
        let snap = IndexSnapshot::build(&corpus(), VectorizerConfig::default(), None).unwrap();
        let sims = snap.similarities("ancient empires");
        assert!(sims[1] > 0.0);
        assert_eq!(sims[0], 0.0);
    }

    #[test]
    fn empty_materials_rejected() {
        let err = IndexSnapshot::build(&[], VectorizerConfig::default(), None).unwrap_err();
        assert!(matches!(err, SearchError::EmptyCorpus));
    }
}
