//! Request checks that run before any engine call.

use crate::error::{ShardError, ShardResult};
use crate::models::Key;

pub const MISSING_ARGUMENTS: &str = "request empty or missing arguments";

/// Stateless request checks for a fixed dimensionality
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestValidator {
    dimensions: usize,
}

impl RequestValidator {
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions }
    }

    /// Unwrap a required message field.
    pub fn require<T>(&self, field: Option<T>) -> ShardResult<T> {
        field.ok_or_else(|| ShardError::Validation(MISSING_ARGUMENTS.to_string()))
    }

    pub fn vector(&self, vector: &[f32]) -> ShardResult<()> {
        if vector.len() != self.dimensions {
            return Err(ShardError::Validation(format!(
                "expected {} dimensions, got {}",
                self.dimensions,
                vector.len()
            )));
        }
        Ok(())
    }

    /// Equal, non-empty key/vector lists; the first wrong-sized vector is reported.
    pub fn batch<V: AsRef<[f32]>>(&self, keys: &[Key], vectors: &[V]) -> ShardResult<()> {
        if keys.len() != vectors.len() {
            return Err(ShardError::Validation(
                "keys and vectors must have the same length".to_string(),
            ));
        }
        if keys.is_empty() {
            return Err(ShardError::Validation("no data provided".to_string()));
        }
        for (i, vector) in vectors.iter().enumerate() {
            let len = vector.as_ref().len();
            if len != self.dimensions {
                return Err(ShardError::Validation(format!(
                    "vector {}, expected {} dimensions, got {}",
                    i, self.dimensions, len
                )));
            }
        }
        Ok(())
    }

    pub fn count(&self, count: i64) -> ShardResult<usize> {
        if count <= 0 {
            return Err(ShardError::Validation(
                "count must be greater than 0".to_string(),
            ));
        }
        usize::try_from(count)
            .map_err(|_| ShardError::Validation(format!("count {} is too large", count)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(err: ShardError) -> String {
        match err {
            ShardError::Validation(msg) => msg,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_require() {
        let validator = RequestValidator::new(4);
        assert_eq!(validator.require(Some(1)).unwrap(), 1);
        assert_eq!(
            message(validator.require::<u8>(None).unwrap_err()),
            MISSING_ARGUMENTS
        );
    }

    #[test]
    fn test_vector_dimensions() {
        let validator = RequestValidator::new(128);
        assert!(validator.vector(&[0.0; 128]).is_ok());
        assert_eq!(
            message(validator.vector(&[1.0, 2.0, 3.0]).unwrap_err()),
            "expected 128 dimensions, got 3"
        );
    }

    #[test]
    fn test_batch_shape() {
        let validator = RequestValidator::new(2);

        let err = validator.batch(&[1, 2], &[vec![0.0, 0.0]]).unwrap_err();
        assert_eq!(message(err), "keys and vectors must have the same length");

        let err = validator.batch::<Vec<f32>>(&[], &[]).unwrap_err();
        assert_eq!(message(err), "no data provided");
    }

    #[test]
    fn test_batch_reports_first_bad_vector() {
        let validator = RequestValidator::new(2);
        let vectors = vec![vec![0.0, 0.0], vec![1.0], vec![1.0, 2.0, 3.0]];

        let err = validator.batch(&[1, 2, 3], &vectors).unwrap_err();
        assert_eq!(message(err), "vector 1, expected 2 dimensions, got 1");
    }

    #[test]
    fn test_count() {
        let validator = RequestValidator::new(2);
        assert_eq!(validator.count(3).unwrap(), 3);
        assert_eq!(
            message(validator.count(0).unwrap_err()),
            "count must be greater than 0"
        );
        assert!(validator.count(-1).is_err());
    }
}
