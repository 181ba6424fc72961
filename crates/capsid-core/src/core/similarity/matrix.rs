use super::SimilarityError;
use nalgebra::DMatrix;
use serde::ser::{Serialize, SerializeStruct, Serializer};
use std::collections::HashMap;

/// Symmetric pairwise structural similarity over structure-bearing entries.
///
/// Scores lie in `[0, 1]` with a unit diagonal. Pairs that were never
/// measured stay `None`; they are never silently read as zero.
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarityMatrix {
    ids: Vec<String>,
    index: HashMap<String, usize>,
    scores: DMatrix<Option<f64>>,
}

impl SimilarityMatrix {
    /// Creates a matrix with a unit diagonal and every off-diagonal pair missing.
    pub fn new(ids: Vec<String>) -> Result<Self, SimilarityError> {
        let mut index = HashMap::with_capacity(ids.len());
        for (i, id) in ids.iter().enumerate() {
            if index.insert(id.clone(), i).is_some() {
                return Err(SimilarityError::DuplicateId(id.clone()));
            }
        }
        let n = ids.len();
        let scores = DMatrix::from_fn(n, n, |i, j| (i == j).then_some(1.0));
        Ok(Self { ids, index, scores })
    }

    /// Builds a matrix from externally supplied `(a, b, score)` triples.
    /// Pairs absent from `scores` are missing.
    pub fn from_scores<I>(ids: Vec<String>, scores: I) -> Result<Self, SimilarityError>
    where
        I: IntoIterator<Item = (String, String, f64)>,
    {
        let mut matrix = Self::new(ids)?;
        for (a, b, score) in scores {
            matrix.set(&a, &b, score)?;
        }
        Ok(matrix)
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let (i, j) = (self.index_of(a)?, self.index_of(b)?);
        self.scores[(i, j)]
    }

    #[inline]
    pub fn get_by_index(&self, i: usize, j: usize) -> Option<f64> {
        self.scores[(i, j)]
    }

    pub fn set(&mut self, a: &str, b: &str, score: f64) -> Result<(), SimilarityError> {
        let (i, j) = self.pair_indices(a, b)?;
        if !(0.0..=1.0).contains(&score) {
            return Err(SimilarityError::ScoreOutOfRange {
                a: a.to_string(),
                b: b.to_string(),
                score,
            });
        }
        if i == j {
            return Ok(());
        }
        self.scores[(i, j)] = Some(score);
        self.scores[(j, i)] = Some(score);
        Ok(())
    }

    pub fn mark_missing(&mut self, a: &str, b: &str) -> Result<(), SimilarityError> {
        let (i, j) = self.pair_indices(a, b)?;
        if i != j {
            self.scores[(i, j)] = None;
            self.scores[(j, i)] = None;
        }
        Ok(())
    }

    pub(crate) fn set_by_index(&mut self, i: usize, j: usize, score: f64) {
        self.scores[(i, j)] = Some(score);
        self.scores[(j, i)] = Some(score);
    }

    /// Number of unordered off-diagonal pairs without a score.
    pub fn missing_pairs(&self) -> usize {
        let n = self.len();
        (0..n)
            .flat_map(|i| (i + 1..n).map(move |j| (i, j)))
            .filter(|&(i, j)| self.scores[(i, j)].is_none())
            .count()
    }

    pub fn rows(&self) -> Vec<Vec<Option<f64>>> {
        self.scores
            .row_iter()
            .map(|row| row.iter().copied().collect())
            .collect()
    }

    fn pair_indices(&self, a: &str, b: &str) -> Result<(usize, usize), SimilarityError> {
        let i = self
            .index_of(a)
            .ok_or_else(|| SimilarityError::UnknownId(a.to_string()))?;
        let j = self
            .index_of(b)
            .ok_or_else(|| SimilarityError::UnknownId(b.to_string()))?;
        Ok((i, j))
    }
}

impl Serialize for SimilarityMatrix {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("SimilarityMatrix", 2)?;
        state.serialize_field("ids", &self.ids)?;
        state.serialize_field("scores", &self.rows())?;
        state.end()
    }
}
