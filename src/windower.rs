
// imports
use crate::error::{CbowError, Result};
use crate::vocab::Vocabulary;

use ndarray::{Array1, Array2};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;


/// One training pair: the ids around a center token and the center's id.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Example {
    pub context: Vec<usize>,
    pub target: usize,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dataset {
    window_radius: usize,
    examples: Vec<Example>,
}

/// A slice of the dataset laid out for the model, contexts are `(rows, 2 * radius)`.
#[derive(Clone, Debug, PartialEq)]
pub struct Batch {
    pub contexts: Array2<usize>,
    pub targets: Array1<usize>,
}

impl Batch {
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}


impl Dataset {

    pub fn window_radius(&self) -> usize {
        self.window_radius
    }

    pub fn examples(&self) -> &[Example] {
        &self.examples
    }

    pub fn len(&self) -> usize {
        self.examples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.examples.is_empty()
    }

    pub fn context_width(&self) -> usize {
        2 * self.window_radius
    }

    fn to_batch(&self, indexes: &[usize]) -> Result<Batch> {

        let width = self.context_width();
        let mut flat = Vec::with_capacity(indexes.len() * width);
        let mut targets = Vec::with_capacity(indexes.len());
        for &i in indexes {
            let example = &self.examples[i];
            flat.extend_from_slice(&example.context);
            targets.push(example.target);
        }

        Ok(Batch {
            contexts: Array2::from_shape_vec((indexes.len(), width), flat)?,
            targets: Array1::from_vec(targets),
        })
    }

    /// Splits the dataset into batches of `batch_size` examples, the last one may be shorter.
    ///
    /// With a seed, the example order is permuted first; the same seed always gives the same batches.
    pub fn batches(&self, batch_size: usize, shuffle_seed: Option<u64>) -> Result<Vec<Batch>> {

        if batch_size == 0 {
            return Err(CbowError::InvalidBatchSize);
        }

        let mut order = (0..self.examples.len()).collect::<Vec<usize>>();
        if let Some(seed) = shuffle_seed {
            order.shuffle(&mut StdRng::seed_from_u64(seed));
        }

        order
            .chunks(batch_size)
            .map(|chunk_indexes| self.to_batch(chunk_indexes))
            .collect()
    }
}


pub fn make_examples<S: AsRef<str>>(
    filtered_text: &[S],
    vocabulary: &Vocabulary,
    window_radius: usize) -> Result<Dataset> {

    if window_radius == 0 {
        return Err(CbowError::InvalidWindowRadius);
    }

    // written so that no radius can overflow: at least `radius` tokens on each side of one center
    let n = filtered_text.len();
    if window_radius >= n || n - window_radius <= window_radius {
        return Err(CbowError::InsufficientData { len: n, window_radius });
    }

    // every token must map, nothing is produced otherwise
    let ids = vocabulary.ids(filtered_text)?;

    // the centers are independent, each worker takes a range of them and the collect keeps center order
    let examples: Vec<Example> = (window_radius..n - window_radius)
        .into_par_iter()
        .map(|i| {
            let mut context = Vec::with_capacity(2 * window_radius);
            context.extend_from_slice(&ids[i - window_radius..i]);
            context.extend_from_slice(&ids[i + 1..=i + window_radius]);
            Example { context, target: ids[i] }
        })
        .collect();

    debug!(examples = examples.len(), window_radius, "made examples");
    Ok(Dataset { window_radius, examples })
}
