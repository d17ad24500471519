use cbow_trainer::{Config, Pipeline};

use std::env;
use std::error::Error;
use tracing::info;
use tracing_subscriber::EnvFilter;


fn main() -> Result<(), Box<dyn Error>> {

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("cbow_trainer=info")))
        .init();

    info!("entering program...");
    let args: Vec<String> = env::args().collect();

    info!("building parameters...");
    let params = Config::new(&args)?.get_params();

    let summary = Pipeline::run(&params)?;
    info!(
        vocab = summary.vocab_size,
        examples = summary.n_examples,
        final_loss = summary.epoch_losses.last().copied().unwrap_or_default(),
        "done"
    );

    Ok(())
}
