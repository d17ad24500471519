
// imports
use crate::error::{CbowError, Result};

use ndarray::prelude::*;
use ndarray::Array;
use ndarray_rand::RandomExt;
use ndarray_rand::rand_distr::Uniform;
use ndarray_stats::QuantileExt;
use rand::rngs::StdRng;
use rand::SeedableRng;


/// What the training loop needs from a model.
///
/// `predict` gives one probability distribution over the vocabulary per row of
/// context ids. `update` takes a gradient step on a batch and returns the mean
/// negative log-likelihood of the targets before the step.
pub trait TrainableModel {

    fn vocab_size(&self) -> usize;

    fn predict(&self, contexts: ArrayView2<usize>) -> Result<Array2<f32>>;

    fn update(&mut self, contexts: ArrayView2<usize>, targets: ArrayView1<usize>) -> Result<f32>;

    /// Fraction of rows whose most likely id is the target.
    fn accuracy(&self, contexts: ArrayView2<usize>, targets: ArrayView1<usize>) -> Result<f32> {

        let probs = self.predict(contexts)?;
        if targets.is_empty() {
            return Ok(0.0);
        }

        let mut hits = 0;
        for (row, target) in probs.axis_iter(Axis(0)).zip(targets.iter()) {
            if row.argmax().ok() == Some(*target) {
                hits += 1;
            }
        }
        Ok(hits as f32 / targets.len() as f32)
    }
}


pub struct Cbow {
    embeddings: Array2<f32>, // (vocab_size, embedding_dim)
    w_out: Array2<f32>,      // (embedding_dim, vocab_size)
    b_out: Array1<f32>,      // (vocab_size)
    learning_rate: f32,
}

impl Cbow {

    pub fn new(vocab_size: usize, embedding_dim: usize, learning_rate: f32, seed: u64) -> Cbow {

        let mut rng = StdRng::seed_from_u64(seed);
        let dist = Uniform::new(-0.5, 0.5);
        let scale = embedding_dim.max(1) as f32;

        Self {
            embeddings: Array::random_using((vocab_size, embedding_dim), dist, &mut rng) / scale,
            w_out: Array::random_using((embedding_dim, vocab_size), dist, &mut rng) / scale,
            b_out: Array1::zeros(vocab_size),
            learning_rate,
        }
    }

    /// The learned word vectors, one row per vocabulary id.
    pub fn embeddings(&self) -> &Array2<f32> {
        &self.embeddings
    }

    pub fn embedding_dim(&self) -> usize {
        self.embeddings.dim().1
    }

    fn check_ids<'a>(&self, ids: impl IntoIterator<Item = &'a usize>) -> Result<()> {
        let vocab_size = self.vocab_size();
        match ids.into_iter().find(|&&id| id >= vocab_size) {
            Some(&id) => Err(CbowError::IdOutOfRange { id, vocab_size }),
            None => Ok(()),
        }
    }

    // sum of the context embeddings, (batch, embedding_dim)
    fn hidden(&self, contexts: &ArrayView2<usize>) -> Array2<f32> {
        let mut h = Array2::zeros((contexts.nrows(), self.embedding_dim()));
        for (mut h_row, ctx) in h.axis_iter_mut(Axis(0)).zip(contexts.axis_iter(Axis(0))) {
            for &id in ctx.iter() {
                h_row += &self.embeddings.row(id);
            }
        }
        h
    }

    // log-softmax over the vocabulary for every row, (batch, vocab_size)
    fn log_probs(&self, h: &Array2<f32>) -> Array2<f32> {
        let mut logits = h.dot(&self.w_out) + &self.b_out;
        for mut row in logits.axis_iter_mut(Axis(0)) {
            let max = row.fold(f32::NEG_INFINITY, |m, &x| m.max(x));
            let log_sum = row.mapv(|x| (x - max).exp()).sum().ln() + max;
            row.mapv_inplace(|x| x - log_sum);
        }
        logits
    }
}

impl TrainableModel for Cbow {

    fn vocab_size(&self) -> usize {
        self.embeddings.dim().0
    }

    fn predict(&self, contexts: ArrayView2<usize>) -> Result<Array2<f32>> {
        self.check_ids(contexts.iter())?;
        let h = self.hidden(&contexts);
        Ok(self.log_probs(&h).mapv(f32::exp))
    }

    fn update(&mut self, contexts: ArrayView2<usize>, targets: ArrayView1<usize>) -> Result<f32> {

        self.check_ids(contexts.iter())?;
        self.check_ids(targets.iter())?;

        let batch = targets.len();
        if batch == 0 {
            return Ok(0.0);
        }

        // forward
        let h = self.hidden(&contexts);
        let log_probs = self.log_probs(&h);
        let loss = -targets.iter().enumerate().map(|(b, &t)| log_probs[[b, t]]).sum::<f32>() / batch as f32;

        // d loss / d logits = (softmax - one_hot) / batch
        let mut d_logits = log_probs.mapv(f32::exp);
        for (b, &t) in targets.iter().enumerate() {
            d_logits[[b, t]] -= 1.0;
        }
        d_logits /= batch as f32;

        // gradients, all computed before any parameter moves
        let d_w_out: Array2<f32> = h.t().dot(&d_logits);
        let d_b_out: Array1<f32> = d_logits.sum_axis(Axis(0));
        let d_h: Array2<f32> = d_logits.dot(&self.w_out.t());

        // sgd step
        let lr = self.learning_rate;
        self.w_out.scaled_add(-lr, &d_w_out);
        self.b_out.scaled_add(-lr, &d_b_out);

        // every context row received the same hidden gradient, ids repeated in a row are updated once per occurrence
        for (ctx, grad) in contexts.axis_iter(Axis(0)).zip(d_h.axis_iter(Axis(0))) {
            for &id in ctx.iter() {
                self.embeddings.row_mut(id).scaled_add(-lr, &grad);
            }
        }

        Ok(loss)
    }
}
