use std::collections::HashMap;
use std::error;
use std::fmt;
use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};

use sst_text::lexicon::fold_key;

use crate::vector::{TextVectorCell, VectorCell, VectorData};

/// Result of fitting a review's feature cells against a model.
#[derive(Clone, Debug)]
pub struct MachineResult {
    /// Estimated probability that the review is positive.
    pub probability: f64,
    /// L2 norm of the applied weights.
    pub normalization: f64,
    pub vector: VectorData,
}

/// Inference contract of an already-trained sentiment model. Callers never
/// ask whether a model is the null variant; a zero-length vector already
/// means "no correction".
pub trait MachineSentiment: Send + Sync {
    fn get_vector(&self, cells: &[TextVectorCell]) -> MachineResult;
}

/// Trained linear model: one weight per named feature plus a bias term.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LinearModel {
    rho: f64,
    weights: HashMap<String, f64>,
}

impl LinearModel {
    pub fn new(rho: f64, weights: HashMap<String, f64>) -> Self {
        let weights = weights
            .into_iter()
            .map(|(name, weight)| (fold_key(&name), weight))
            .collect();

        LinearModel {
            rho,
            weights,
        }
    }

    pub fn rho(&self) -> f64 {
        self.rho
    }

    /// Loads a model from its JSON weight file.
    pub fn load<P>(path: P) -> Result<Self, ModelError>
    where
        P: AsRef<Path>,
    {
        let contents = fs::read_to_string(path)?;
        let model: LinearModel = serde_json::from_str(&contents)?;
        Ok(LinearModel::new(model.rho, model.weights))
    }

    fn weight(&self, name: &str) -> Option<f64> {
        self.weights.get(&fold_key(name)).copied()
    }
}

impl MachineSentiment for LinearModel {
    fn get_vector(&self, cells: &[TextVectorCell]) -> MachineResult {
        let mut fitted = Vec::new();
        let mut sum = self.rho;
        let mut norm = 0.0;

        for cell in cells {
            let theta = match self.weight(&cell.name) {
                Some(theta) => theta,
                None => continue,
            };

            let calculated = theta * cell.value;
            sum += calculated;
            norm += theta * theta;

            fitted.push(VectorCell {
                theta,
                calculated,
                cell: cell.clone(),
            });
        }

        MachineResult {
            probability: sigmoid(sum),
            normalization: norm.sqrt(),
            vector: VectorData {
                rho: self.rho,
                cells: fitted,
            },
        }
    }
}

/// Untrained model: defers every rating to the raw lexicon calculation by
/// returning an empty vector.
pub struct NullMachineSentiment;

impl MachineSentiment for NullMachineSentiment {
    fn get_vector(&self, _cells: &[TextVectorCell]) -> MachineResult {
        MachineResult {
            probability: 0.5,
            normalization: 0.0,
            vector: VectorData::default(),
        }
    }
}

fn sigmoid(value: f64) -> f64 {
    1.0 / (1.0 + (-value).exp())
}

#[derive(Debug)]
pub enum ModelError {
    Io(Box<io::Error>),
    Format(Box<serde_json::Error>),
}

impl fmt::Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => err.fmt(f),
            Self::Format(err) => write!(f, "invalid model file: {}", err),
        }
    }
}

impl error::Error for ModelError {}

impl From<io::Error> for ModelError {
    fn from(err: io::Error) -> Self {
        ModelError::Io(Box::new(err))
    }
}

impl From<serde_json::Error> for ModelError {
    fn from(err: serde_json::Error) -> Self {
        ModelError::Format(Box::new(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model() -> LinearModel {
        let mut weights = HashMap::new();
        weights.insert("good".to_owned(), 2.0);
        weights.insert("bad".to_owned(), -1.0);
        LinearModel::new(0.5, weights)
    }

    #[test]
    fn test_linear_model_fits_known_cells() {
        let cells = [
            TextVectorCell::for_word(0, "good", 1.0),
            TextVectorCell::for_word(1, "strange", -1.0),
        ];

        let result = model().get_vector(&cells);
        assert_eq!(result.vector.len(), 1);
        assert_eq!(result.vector.rho, 0.5);

        let fitted = &result.vector.cells[0];
        assert_eq!(fitted.theta, 2.0);
        assert_eq!(fitted.calculated, 2.0);
        assert_eq!(fitted.cell.item, Some(0));

        // rho + theta * value = 2.5
        assert!((result.probability - sigmoid(2.5)).abs() < 1e-12);
        assert_eq!(result.normalization, 2.0);
    }

    #[test]
    fn test_linear_model_is_case_insensitive() {
        let cells = [TextVectorCell::for_word(0, "Good", 1.0)];
        let result = model().get_vector(&cells);
        assert_eq!(result.vector.len(), 1);
    }

    #[test]
    fn test_unknown_cells_yield_empty_vector() {
        let cells = [TextVectorCell::for_word(0, "strange", 1.0)];
        let result = model().get_vector(&cells);
        assert!(result.vector.is_empty());
    }

    #[test]
    fn test_null_model_never_corrects() {
        let cells = [TextVectorCell::for_word(0, "good", 1.0)];
        let result = NullMachineSentiment.get_vector(&cells);
        assert!(result.vector.is_empty());
        assert_eq!(result.probability, 0.5);
    }

    #[test]
    fn test_model_deserializes_from_json() {
        let model: LinearModel =
            serde_json::from_str(r#"{"rho":0.25,"weights":{"good":2.0,"bad":-1.5}}"#).unwrap();
        assert_eq!(model.rho(), 0.25);
        assert_eq!(model.weight("bad"), Some(-1.5));
    }
}
