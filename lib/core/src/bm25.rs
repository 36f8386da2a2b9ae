// BM25 keyword index over point payload text
use crate::PointId;
use ahash::AHashMap;

const K1: f32 = 1.5;
const B: f32 = 0.75;

#[derive(Debug, Clone, Default)]
struct DocStats {
    len: u32,
    term_freqs: AHashMap<String, u32>,
}

/// Inverted index scoring documents with Okapi BM25.
///
/// Documents are keyed by point id; re-inserting an id replaces its text.
#[derive(Debug, Clone, Default)]
pub struct Bm25Index {
    // term -> (doc -> term frequency)
    postings: AHashMap<String, AHashMap<PointId, u32>>,
    docs: AHashMap<PointId, DocStats>,
    total_len: u64,
}

impl Bm25Index {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Lowercased alphanumeric runs of at least two characters.
    pub fn tokenize(text: &str) -> Vec<String> {
        text.to_lowercase()
            .split(|c: char| !c.is_alphanumeric())
            .filter(|s| s.chars().count() > 1)
            .map(str::to_string)
            .collect()
    }

    pub fn insert_doc(&mut self, id: &PointId, text: &str) {
        self.delete_doc(id);

        let tokens = Self::tokenize(text);
        if tokens.is_empty() {
            return;
        }

        let mut term_freqs: AHashMap<String, u32> = AHashMap::new();
        for token in tokens.iter() {
            *term_freqs.entry(token.clone()).or_insert(0) += 1;
        }
        for (term, &tf) in &term_freqs {
            self.postings
                .entry(term.clone())
                .or_default()
                .insert(id.clone(), tf);
        }

        let len = tokens.len() as u32;
        self.total_len += u64::from(len);
        self.docs.insert(id.clone(), DocStats { len, term_freqs });
    }

    pub fn delete_doc(&mut self, id: &PointId) {
        let Some(stats) = self.docs.remove(id) else {
            return;
        };
        self.total_len -= u64::from(stats.len);
        for term in stats.term_freqs.keys() {
            if let Some(docs) = self.postings.get_mut(term) {
                docs.remove(id);
                if docs.is_empty() {
                    self.postings.remove(term);
                }
            }
        }
    }

    /// Documents sharing at least one term with `query`, best first.
    ///
    /// Equal scores are ordered by ascending id.
    pub fn search(&self, query: &str, limit: usize) -> Vec<(PointId, f32)> {
        if self.docs.is_empty() || limit == 0 {
            return Vec::new();
        }

        let total_docs = self.docs.len() as f32;
        let avgdl = self.total_len as f32 / total_docs;

        let mut query_terms = Self::tokenize(query);
        query_terms.sort();
        query_terms.dedup();

        let mut scores: AHashMap<&PointId, f32> = AHashMap::new();
        for term in &query_terms {
            let Some(docs) = self.postings.get(term) else {
                continue;
            };
            let df = docs.len() as f32;
            // Lucene's variant; stays positive when a term is in most documents.
            let idf = (1.0 + (total_docs - df + 0.5) / (df + 0.5)).ln();

            for (id, &tf) in docs {
                let doc_len = self.docs.get(id).map_or(0, |d| d.len) as f32;
                let tf = tf as f32;
                let norm = tf + K1 * (1.0 - B + B * doc_len / avgdl);
                *scores.entry(id).or_insert(0.0) += idf * tf * (K1 + 1.0) / norm;
            }
        }

        let mut results: Vec<(PointId, f32)> = scores
            .into_iter()
            .map(|(id, score)| (id.clone(), score))
            .collect();
        results.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        results.truncate(limit);
        results
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.docs.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }
}
