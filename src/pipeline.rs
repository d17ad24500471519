
// imports
use crate::config::{files_handling, JsonTypes};
use crate::corpus::Corpus;
use crate::error::Result;
use crate::model::Cbow;
use crate::train::Train;
use crate::vocab::{build_vocabulary, filter_tokens, Vocabulary};
use crate::windower::{make_examples, Dataset};

use std::time::Instant;
use rayon::ThreadPoolBuilder;
use tracing::{info, warn};


#[derive(Clone, Debug, PartialEq)]
pub struct Summary {
    pub vocab_size: usize,
    pub n_examples: usize,
    pub epoch_losses: Vec<f32>,
}

pub struct Pipeline {}

impl Pipeline {

    // corpus -> vocabulary -> filtered text -> examples, no training
    pub fn prepare(tokens: &[String], params: &JsonTypes) -> Result<(Vocabulary, Dataset)> {

        let vocab = build_vocabulary(tokens, params.json_train.vocab_size)?;
        if vocab.len() < params.json_train.vocab_size {
            warn!(found = vocab.len(), requested = params.json_train.vocab_size, "fewer distinct tokens than the vocabulary size");
        }

        let filtered = filter_tokens(tokens, &vocab);
        info!(tokens = tokens.len(), kept = filtered.len(), "filtered out-of-vocabulary tokens");

        let dataset = make_examples(&filtered, &vocab, params.window_radius)?;
        Ok((vocab, dataset))
    }

    // runs the main procedure of 3 steps -
    // -> corpus loading and example windowing
    // -> training
    // -> saving vectors and vocabulary
    pub fn run(params: &JsonTypes) -> Result<Summary> {

        info!("{}", params);

        // the global pool can only be set up once per process, later runs keep the first one
        if let Err(e) = ThreadPoolBuilder::new().num_threads(params.num_threads).build_global() {
            warn!("keeping existing thread pool: {}", e);
        }

        let timer = Instant::now();
        let corpus = Corpus::load(&params.corpus_file)?;
        for (label, count) in corpus.label_counts() {
            info!(label = label.as_str(), documents = count, "corpus label");
        }

        let tokens = corpus.tokens()?;
        let (vocab, dataset) = Pipeline::prepare(&tokens, params)?;
        info!(vocab = vocab.len(), examples = dataset.len(), seconds = timer.elapsed().as_secs_f32(), "prepared dataset");

        if params.save_examples {
            files_handling::save_output(&params.output_dir, "examples", &dataset)?;
        }

        // train
        let timer = Instant::now();
        let train_params = &params.json_train;
        let mut model = Cbow::new(vocab.len(), train_params.embedding_dim, train_params.learning_rate, train_params.seed);
        let epoch_losses = Train::run(&dataset, train_params, &mut model)?;
        info!(seconds = timer.elapsed().as_secs_f32(), "finished training");

        // save the weights and tokens
        files_handling::save_output(&params.output_dir, "vecs", model.embeddings())?;
        files_handling::save_output(&params.output_dir, "words", &vocab)?;
        info!(output_dir = params.output_dir.as_str(), "saved vecs and words");

        Ok(Summary {
            vocab_size: vocab.len(),
            n_examples: dataset.len(),
            epoch_losses,
        })
    }

}


#[cfg(test)]
mod tests {

    use super::*;
    use crate::config::JsonTrain;
    use crate::config::files_handling::read_input;
    use crate::error::CbowError;
    use crate::similarity::Similarity;
    use ndarray::Array2;
    use std::fs;
    use std::path::Path;
    use tempfile::tempdir;

    fn params(dir: &Path, vocab_size: usize, window_radius: usize) -> JsonTypes {
        JsonTypes {
            corpus_file: dir.join("reviews.txt").to_str().unwrap().to_string(),
            output_dir: dir.join("out").to_str().unwrap().to_string(),
            window_radius,
            num_threads: 1,
            save_examples: true,
            json_train: JsonTrain {
                vocab_size,
                max_iter: 5,
                embedding_dim: 8,
                learning_rate: 0.1,
                batch_size: 4,
                seed: 3,
                progress_verbose: false,
                progress_every: 1000,
            },
        }
    }

    const REVIEWS: &str = "pos\tA wonderful film, with wonderful acting and a great story.\n\
                           neg\tA dull film with dull acting and a weak story!\n\
                           pos\tGreat music, great acting; a wonderful story.\n\
                           neg\tWeak plot and weak music, a dull film.\n";

    #[test]
    fn run_writes_vectors_and_words() {

        let dir = tempdir().unwrap();
        fs::write(dir.path().join("reviews.txt"), REVIEWS).unwrap();
        let params = params(dir.path(), 12, 2);

        let summary = Pipeline::run(&params).unwrap();
        assert_eq!(summary.vocab_size, 12);
        assert_eq!(summary.epoch_losses.len(), 5);

        let out = &params.output_dir;
        let w: Array2<f32> = read_input(&format!("{}/vecs", out)).unwrap();
        let words: Vocabulary = read_input(&format!("{}/words", out)).unwrap();
        let examples: Dataset = read_input(&format!("{}/examples", out)).unwrap();

        assert_eq!(w.dim(), (12, 8));
        assert_eq!(words.len(), 12);
        assert_eq!(words.id("a"), Some(0));
        assert_eq!(examples.len(), summary.n_examples);

        let sim = Similarity::new(w, words).unwrap();
        assert_eq!(sim.most_similar("film", 3).unwrap().len(), 3);
    }

    #[test]
    fn prepare_is_deterministic() {

        let dir = tempdir().unwrap();
        fs::write(dir.path().join("reviews.txt"), REVIEWS).unwrap();
        let params = params(dir.path(), 10, 2);

        let tokens = Corpus::load(&params.corpus_file).unwrap().tokens().unwrap();
        let (vocab_a, dataset_a) = Pipeline::prepare(&tokens, &params).unwrap();
        let (vocab_b, dataset_b) = Pipeline::prepare(&tokens, &params).unwrap();
        assert_eq!(vocab_a, vocab_b);
        assert_eq!(dataset_a, dataset_b);
    }

    #[test]
    fn tiny_corpus_is_insufficient() {

        let dir = tempdir().unwrap();
        fs::write(dir.path().join("reviews.txt"), "pos\tgood film\n").unwrap();
        let params = params(dir.path(), 10, 2);

        assert!(matches!(Pipeline::run(&params), Err(CbowError::InsufficientData { len: 2, window_radius: 2 })));
    }
}
