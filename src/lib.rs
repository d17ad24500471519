
mod config;
mod corpus;
mod error;
mod model;
mod pipeline;
mod similarity;
mod train;
mod vocab;
mod windower;

pub use config::{files_handling, Config, JsonTrain, JsonTypes};
pub use corpus::{Corpus, Document, Normalizer, Tokenizer, WhitespaceTokenizer};
pub use error::{CbowError, Result};
pub use model::{Cbow, TrainableModel};
pub use pipeline::{Pipeline, Summary};
pub use similarity::Similarity;
pub use train::Train;
pub use vocab::{build_vocabulary, filter_tokens, Vocabulary};
pub use windower::{make_examples, Batch, Dataset, Example};
