//! Pairwise Pearson correlation matrix over the available numeric fields.

use serde::Serialize;

use crate::derive::Observation;
use crate::domain::Field;
use crate::math::pearson;

/// Symmetric correlation matrix.
///
/// Each cell uses only the records where both fields are present. A cell is
/// `None` when fewer than two such records exist or either side is constant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    pub fields: Vec<Field>,
    pub values: Vec<Vec<Option<f64>>>,
}

impl CorrelationMatrix {
    pub fn get(&self, a: Field, b: Field) -> Option<f64> {
        let i = self.fields.iter().position(|&f| f == a)?;
        let j = self.fields.iter().position(|&f| f == b)?;
        self.values[i][j]
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

pub fn correlation_matrix(observations: &[Observation], fields: &[Field]) -> CorrelationMatrix {
    let n = fields.len();
    let mut values = vec![vec![None; n]; n];

    for i in 0..n {
        for j in i..n {
            let (x, y): (Vec<f64>, Vec<f64>) = observations
                .iter()
                .filter_map(|o| Some((o.value(fields[i])?, o.value(fields[j])?)))
                .unzip();
            let r = pearson(&x, &y);
            values[i][j] = r;
            values[j][i] = r;
        }
    }

    CorrelationMatrix {
        fields: fields.to_vec(),
        values,
    }
}
