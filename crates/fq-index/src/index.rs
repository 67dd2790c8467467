//! In-memory inverted index.

use std::{
    collections::{BTreeMap, HashMap},
    path::Path,
};

use fq_query::{DocSet, FieldLookup, LookupError};
use serde::Serialize;
use tracing::{info, warn};

use crate::{
    IndexError,
    analyzer::analyze,
    corpus::{Record, load_corpus},
};

/// Maps a field code to the record keys it searches.
pub type FieldMap = BTreeMap<String, Vec<String>>;

/// Term postings of one field code.
#[derive(Debug, Default)]
struct FieldPostings {
    /// Record keys the field draws text from.
    keys: Vec<String>,
    /// Documents containing each term.
    terms: HashMap<String, DocSet>,
}

/// An inverted index from field code and term to documents.
#[derive(Debug, Default)]
pub struct MemoryIndex {
    /// Postings per field code.
    fields: BTreeMap<String, FieldPostings>,
    /// Every indexed document.
    documents: DocSet,
}

/// Per-field index statistics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldStats {
    /// Field code.
    pub code: String,
    /// Record keys indexed under the code.
    pub keys: Vec<String>,
    /// Number of distinct terms.
    pub terms: usize,
}

/// Summary of an index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexStats {
    /// Number of documents.
    pub documents: usize,
    /// Statistics for each field code, in code order.
    pub fields: Vec<FieldStats>,
}

impl MemoryIndex {
    /// Builds an index over `records` for the given field codes.
    pub fn build(records: &[Record], fields: &FieldMap) -> Self {
        let mut index = Self {
            fields: fields
                .iter()
                .map(|(code, keys)| {
                    (
                        code.clone(),
                        FieldPostings {
                            keys: keys.clone(),
                            terms: HashMap::new(),
                        },
                    )
                })
                .collect(),
            documents: DocSet::new(),
        };
        for record in records {
            index.add(record);
        }
        info!(
            documents = index.documents.len(),
            fields = index.fields.len(),
            "built index"
        );
        index
    }

    /// Loads a corpus from `path` and indexes it.
    pub fn open(path: &Path, fields: &FieldMap) -> Result<Self, IndexError> {
        let records = load_corpus(path)?;
        Ok(Self::build(&records, fields))
    }

    /// Adds one record to every field's postings.
    pub fn add(&mut self, record: &Record) {
        if !self.documents.insert(record.id) {
            warn!(id = record.id, "duplicate document id, merging terms");
        }
        for postings in self.fields.values_mut() {
            for key in &postings.keys {
                for text in record.texts(key) {
                    for term in analyze(&text) {
                        postings.terms.entry(term).or_default().insert(record.id);
                    }
                }
            }
        }
    }

    /// Number of indexed documents.
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// True if no document has been indexed.
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Returns document and term counts.
    pub fn stats(&self) -> IndexStats {
        IndexStats {
            documents: self.documents.len(),
            fields: self
                .fields
                .iter()
                .map(|(code, postings)| FieldStats {
                    code: code.clone(),
                    keys: postings.keys.clone(),
                    terms: postings.terms.len(),
                })
                .collect(),
        }
    }
}

impl FieldLookup for MemoryIndex {
    /// Returns the documents containing every term of `value` in `field`.
    fn lookup(&self, field: &str, value: &str) -> Result<DocSet, LookupError> {
        let postings = self
            .fields
            .get(field)
            .ok_or_else(|| LookupError::UnknownField(field.to_string()))?;

        let mut sets = Vec::new();
        for term in analyze(value) {
            match postings.terms.get(&term) {
                Some(docs) => sets.push(docs),
                None => return Ok(DocSet::new()),
            }
        }
        sets.sort_by_key(|docs| docs.len());

        let mut sets = sets.into_iter();
        let Some(smallest) = sets.next() else {
            return Ok(DocSet::new());
        };
        let mut result = smallest.clone();
        for docs in sets {
            result.retain(|id| docs.contains(id));
        }
        Ok(result)
    }
}
