use super::ModelError;
use serde::Deserialize;

/// Linear regressor exported as coefficients plus intercept.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LinearRegressor {
    pub coefficients: Vec<f64>,
    #[serde(default)]
    pub intercept: f64,
}

impl LinearRegressor {
    pub fn predict(&self, row: &[f64]) -> Result<f64, ModelError> {
        if self.coefficients.len() != row.len() {
            return Err(ModelError::ShapeMismatch {
                component: "regressor",
                expected: self.coefficients.len(),
                actual: row.len(),
            });
        }

        let prediction = dot(&self.coefficients, row) + self.intercept;
        if prediction.is_finite() {
            Ok(prediction)
        } else {
            Err(ModelError::NonFiniteOutput)
        }
    }
}

/// One linear decision function per class; the highest score wins, earliest class on ties.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LinearClassifier {
    pub coefficients: Vec<Vec<f64>>,
    pub intercepts: Vec<f64>,
}

impl LinearClassifier {
    pub fn predict(&self, row: &[f64]) -> Result<usize, ModelError> {
        if self.coefficients.is_empty() || self.coefficients.len() != self.intercepts.len() {
            return Err(ModelError::ShapeMismatch {
                component: "classifier intercepts",
                expected: self.coefficients.len(),
                actual: self.intercepts.len(),
            });
        }

        let mut best: Option<(usize, f64)> = None;
        let rows = self.coefficients.iter().zip(&self.intercepts);
        for (class, (weights, intercept)) in rows.enumerate() {
            if weights.len() != row.len() {
                return Err(ModelError::ShapeMismatch {
                    component: "classifier",
                    expected: weights.len(),
                    actual: row.len(),
                });
            }

            let score = dot(weights, row) + intercept;
            if !score.is_finite() {
                return Err(ModelError::NonFiniteOutput);
            }
            if best.map_or(true, |(_, top)| score > top) {
                best = Some((class, score));
            }
        }

        best.map(|(class, _)| class).ok_or(ModelError::NonFiniteOutput)
    }
}

fn dot(weights: &[f64], row: &[f64]) -> f64 {
    weights.iter().zip(row).map(|(w, x)| w * x).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn regressor_checks_feature_count() {
        let regressor = LinearRegressor {
            coefficients: vec![1.0, 2.0],
            intercept: 0.5,
        };
        assert_eq!(regressor.predict(&[1.0, 1.0]), Ok(3.5));
        assert_eq!(
            regressor.predict(&[1.0, 1.0, 1.0]),
            Err(ModelError::ShapeMismatch {
                component: "regressor",
                expected: 2,
                actual: 3,
            })
        );
    }

    #[test]
    fn classifier_prefers_first_class_on_ties() {
        let classifier = LinearClassifier {
            coefficients: vec![vec![1.0], vec![1.0], vec![-1.0]],
            intercepts: vec![0.0, 0.0, 0.0],
        };
        assert_eq!(classifier.predict(&[2.0]), Ok(0));
        assert_eq!(classifier.predict(&[-2.0]), Ok(2));
    }

    #[test]
    fn classifier_rejects_inconsistent_intercepts() {
        let classifier = LinearClassifier {
            coefficients: vec![vec![1.0]],
            intercepts: vec![],
        };
        assert!(matches!(
            classifier.predict(&[1.0]),
            Err(ModelError::ShapeMismatch { .. })
        ));
    }
}
