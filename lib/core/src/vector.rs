use serde::{Deserialize, Serialize};

/// A dense vector of `f32` components
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct Vector {
    data: Vec<f32>,
}

impl Vector {
    #[inline]
    #[must_use]
    pub fn new(data: Vec<f32>) -> Self {
        Self { data }
    }

    #[inline]
    #[must_use]
    pub fn dim(&self) -> usize {
        self.data.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    #[inline]
    pub fn dot(&self, other: &Vector) -> f32 {
        self.data
            .iter()
            .zip(other.data.iter())
            .map(|(a, b)| a * b)
            .sum()
    }

    #[inline]
    pub fn norm(&self) -> f32 {
        self.dot(self).sqrt()
    }

    /// Cosine similarity in `[-1, 1]`.
    ///
    /// Mismatched dimensions and zero-norm vectors score `0.0`; callers that
    /// need a hard failure check dimensions first.
    #[inline]
    pub fn cosine_similarity(&self, other: &Vector) -> f32 {
        if self.dim() != other.dim() {
            return 0.0;
        }

        let norm_a = self.norm();
        let norm_b = other.norm();
        if norm_a == 0.0 || norm_b == 0.0 {
            return 0.0;
        }

        self.dot(other) / (norm_a * norm_b)
    }
}

impl From<Vec<f32>> for Vector {
    fn from(data: Vec<f32>) -> Self {
        Self::new(data)
    }
}
