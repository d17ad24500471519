
use crate::config::JsonTrain;
use crate::error::Result;
use crate::model::TrainableModel;
use crate::windower::Dataset;

use std::time::Instant;
use tracing::info;


struct DisplayProgress {
    epoch_loss: f32,       // sum of the per-example losses in this epoch
    n_seen: usize,         // examples seen in this epoch
    n_batches: usize,      // the number of batches the dataset is divided to
    progress_every: usize, // batches between progress lines, 0 disables them
}

impl DisplayProgress {

    fn new(progress_every: usize) -> Self {
        Self {
            epoch_loss: 0.0,
            n_seen: 0,
            n_batches: 0,
            progress_every,
        }
    }

    fn start_epoch(&mut self, n_batches: usize) {
        self.epoch_loss = 0.0;
        self.n_seen = 0;
        self.n_batches = n_batches;
    }

    // `loss` is the mean over a batch of `batch_len` examples
    fn record(&mut self, epoch: usize, batch_i: usize, loss: f32, batch_len: usize) {
        self.epoch_loss += loss * batch_len as f32;
        self.n_seen += batch_len;
        if self.progress_every > 0 && batch_i > 0 && batch_i % self.progress_every == 0 {
            let progress = ((batch_i as f32 / self.n_batches as f32) * 100.0).floor();
            info!(epoch, progress, loss = self.mean_loss(), "training");
        }
    }

    fn mean_loss(&self) -> f32 {
        if self.n_seen == 0 { 0.0 } else { self.epoch_loss / self.n_seen as f32 }
    }
}


pub struct Train {}

impl Train {

    /// Trains `model` on `dataset` for `max_iter` epochs and returns the mean per-example loss of each epoch.
    ///
    /// The batch order of epoch `e` is shuffled with seed `seed + e`, so a run is reproducible.
    pub fn run<M: TrainableModel>(dataset: &Dataset, train_params: &JsonTrain, model: &mut M) -> Result<Vec<f32>> {

        let progress_every = if train_params.progress_verbose { train_params.progress_every } else { 0 };
        let mut progress = DisplayProgress::new(progress_every);
        let mut losses = Vec::with_capacity(train_params.max_iter);

        for epoch in 0..train_params.max_iter {

            let timer = Instant::now();
            let batches = dataset.batches(train_params.batch_size, Some(train_params.seed.wrapping_add(epoch as u64)))?;
            progress.start_epoch(batches.len());

            let mut hits = 0.0;
            for (batch_i, batch) in batches.iter().enumerate() {
                let loss = model.update(batch.contexts.view(), batch.targets.view())?;
                progress.record(epoch, batch_i, loss, batch.len());
                if train_params.progress_verbose {
                    hits += model.accuracy(batch.contexts.view(), batch.targets.view())? * batch.len() as f32;
                }
            }

            let loss = progress.mean_loss();
            if train_params.progress_verbose && !dataset.is_empty() {
                info!(epoch, loss, accuracy = hits / dataset.len() as f32, seconds = timer.elapsed().as_secs_f32(), "finished epoch");
            } else {
                info!(epoch, loss, seconds = timer.elapsed().as_secs_f32(), "finished epoch");
            }
            losses.push(loss);
        }

        Ok(losses)
    }
}
