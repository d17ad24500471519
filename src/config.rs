
use crate::error::{CbowError, Result};

use serde_json::Value;
use std::fmt::Display;


#[derive(Clone, Debug, PartialEq)]
pub struct JsonTrain {
    pub vocab_size: usize,
    pub max_iter: usize,
    pub embedding_dim: usize,
    pub learning_rate: f32,
    pub batch_size: usize,
    pub seed: u64,
    pub progress_verbose: bool,
    pub progress_every: usize,
}


impl Display for JsonTrain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "training hyper parameters:
        vocab_size: {},
        max_iter: {},
        embedding_dim: {},
        learning_rate: {},
        batch_size: {},
        seed: {},
        progress_verbose: {},
        progress_every: {}",
        self.vocab_size, self.max_iter, self.embedding_dim, self.learning_rate, self.batch_size, self.seed, self.progress_verbose, self.progress_every
        )
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct JsonTypes {
    pub corpus_file: String,
    pub output_dir: String,
    pub window_radius: usize,
    pub num_threads: usize,
    pub save_examples: bool,
    pub json_train: JsonTrain,
}


impl Display for JsonTypes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "using hyper-params:
        corpus_file: {}
        output_dir: {}
        window_radius: {}
        num_threads: {}
        save_examples: {},
        Using training hyper-params: {}",
        self.corpus_file, self.output_dir, self.window_radius, self.num_threads, self.save_examples, self.json_train)
    }
}


pub struct Config {
    params: JsonTypes
}

impl Config {

    pub fn get_params(&self) -> JsonTypes {
        self.params.clone()
    }

    fn required_str<'a>(json: &'a Value, key: &str) -> Result<&'a str> {
        json.get(key)
            .ok_or_else(|| CbowError::Config(format!("{} was not supplied through json", key)))?
            .as_str()
            .ok_or_else(|| CbowError::Config(format!("{} should be a string", key)))
    }

    // positive integer with a default, zero is rejected since every count here sizes something
    fn positive(json: &Value, key: &str, default: u64) -> Result<u64> {
        let value = match json.get(key) {
            Some(value) => value.as_u64().ok_or_else(|| CbowError::Config(format!("given {} is not a non-negative integer", key)))?,
            None => default,
        };
        if value == 0 {
            return Err(CbowError::Config(format!("{} must be positive", key)));
        }
        Ok(value)
    }

    fn flag(json: &Value, key: &str) -> Result<bool> {
        match json.get(key) {
            Some(value) => value.as_bool().ok_or_else(|| CbowError::Config(format!("given {} is not a boolean", key))),
            None => Ok(false),
        }
    }

    pub fn from_json(json: &Value) -> Result<Config> {

        // validate input and output in json
        let corpus_file = Config::required_str(json, "corpus_file")?;
        let output_dir = Config::required_str(json, "output_dir")?;

        // handle default vs input parameters
        let learning_rate = match json.get("learning_rate") {
            Some(learning_rate) => learning_rate.as_f64().ok_or_else(|| CbowError::Config("given learning_rate is not numeric".to_string()))?,
            None => 0.05
        };
        if learning_rate.is_nan() || learning_rate <= 0.0 {
            return Err(CbowError::Config("learning_rate must be positive".to_string()));
        }

        let seed = match json.get("seed") {
            Some(seed) => seed.as_u64().ok_or_else(|| CbowError::Config("given seed is not a non-negative integer".to_string()))?,
            None => 42
        };

        let params = JsonTypes {
            corpus_file: corpus_file.to_owned(),
            output_dir: output_dir.to_owned(),
            window_radius: Config::positive(json, "window_radius", 2)? as usize,
            num_threads: Config::positive(json, "num_threads", 1)? as usize,
            save_examples: Config::flag(json, "save_examples")?,
            json_train: JsonTrain {
                vocab_size: Config::positive(json, "vocab_size", 1000)? as usize,
                max_iter: Config::positive(json, "max_iter", 10)? as usize,
                embedding_dim: Config::positive(json, "embedding_dim", 100)? as usize,
                learning_rate: learning_rate as f32,
                batch_size: Config::positive(json, "batch_size", 64)? as usize,
                seed,
                progress_verbose: Config::flag(json, "progress_verbose")?,
                progress_every: Config::positive(json, "progress_every", 1000)? as usize,
            }
        };

        Ok(Self { params })
    }

    pub fn new(args: &[String]) -> Result<Config> {

        if args.len() != 2 {
            return Err(CbowError::Config("input should be a path to json file only".to_string()));
        }

        // parse input json
        let f = std::fs::File::open(&args[1])?;
        let json: Value = serde_json::from_reader(f)?;
        Config::from_json(&json)
    }

}


pub mod files_handling {

    use crate::error::Result;
    use crate::vocab::Vocabulary;
    use crate::windower::Dataset;

    use ndarray::Array2;
    use ndarray_npy::{read_npy, write_npy};
    use std::fs::{self, File};
    use std::io::{BufReader, BufWriter, Write};
    use flate2::Compression;
    use flate2::read::GzDecoder;
    use flate2::write::GzEncoder;


    pub fn read_input<R: ReadFile>(file_path: &str) -> Result<R> {
        R::read_file(file_path)
    }

    pub fn save_output<S: SaveFile>(output_dir: &str, file_name: &str, item: &S) -> Result<()> {

        // create output folder
        fs::create_dir_all(output_dir)?;
        item.save_file(output_dir, file_name)
    }

    // each type knows its own extension, a path may be given with or without it
    fn with_extension(file_path: &str, extension: &str) -> String {
        if file_path.ends_with(extension) {
            file_path.to_string()
        } else {
            file_path.to_string() + extension
        }
    }

    pub trait ReadFile: Sized {
        fn read_file(file_path: &str) -> Result<Self>;
    }

    pub trait SaveFile {
        fn save_file(&self, output_dir: &str, file_name: &str) -> Result<()>;
    }


    impl SaveFile for Array2<f32> {
        fn save_file(&self, output_dir: &str, file_name: &str) -> Result<()> {
            let out = output_dir.to_string() + "/" + file_name + ".npy";
            write_npy(out, self)?;
            Ok(())
        }
    }

    impl ReadFile for Array2<f32> {
        fn read_file(file_path: &str) -> Result<Self> {
            let in_file = with_extension(file_path, ".npy");
            Ok(read_npy(in_file)?)
        }
    }


    impl SaveFile for Vocabulary {
        fn save_file(&self, output_dir: &str, file_name: &str) -> Result<()> {
            let out = output_dir.to_string() + "/" + file_name + ".json";
            let mut f = BufWriter::new(File::create(out)?);
            serde_json::to_writer(&mut f, self)?;
            f.flush()?;
            Ok(())
        }
    }

    impl ReadFile for Vocabulary {
        fn read_file(file_path: &str) -> Result<Self> {
            let in_file = with_extension(file_path, ".json");
            let f = BufReader::new(File::open(in_file)?);
            Ok(serde_json::from_reader(f)?)
        }
    }


    // bincode inside gzip, the dataset is the bulkiest thing written
    impl SaveFile for Dataset {
        fn save_file(&self, output_dir: &str, file_name: &str) -> Result<()> {
            let out = output_dir.to_string() + "/" + file_name + ".bin.gz";
            let f = BufWriter::new(File::create(out)?);
            let mut writer = GzEncoder::new(f, Compression::default());
            bincode::serialize_into(&mut writer, self)?;
            writer.finish()?.flush()?;
            Ok(())
        }
    }

    impl ReadFile for Dataset {
        fn read_file(file_path: &str) -> Result<Self> {
            let in_file = with_extension(file_path, ".bin.gz");
            let reader = GzDecoder::new(BufReader::new(File::open(in_file)?));
            Ok(bincode::deserialize_from(reader)?)
        }
    }
}


#[cfg(test)]
mod tests {

    use super::*;
    use serde_json::json;

    #[test]
    fn defaults_fill_missing_keys() {

        let params = Config::from_json(&json!({
            "corpus_file": "Input/reviews.txt",
            "output_dir": "Output"
        })).unwrap().get_params();

        assert_eq!(params.window_radius, 2);
        assert_eq!(params.num_threads, 1);
        assert!(!params.save_examples);
        assert_eq!(params.json_train, JsonTrain {
            vocab_size: 1000,
            max_iter: 10,
            embedding_dim: 100,
            learning_rate: 0.05,
            batch_size: 64,
            seed: 42,
            progress_verbose: false,
            progress_every: 1000,
        });
    }

    #[test]
    fn given_values_override_defaults() {

        let params = Config::from_json(&json!({
            "corpus_file": "c.txt",
            "output_dir": "out",
            "vocab_size": 50,
            "window_radius": 3,
            "learning_rate": 0.1,
            "seed": 7,
            "save_examples": true,
            "progress_every": 50
        })).unwrap().get_params();

        assert_eq!(params.json_train.vocab_size, 50);
        assert_eq!(params.window_radius, 3);
        assert_eq!(params.json_train.learning_rate, 0.1);
        assert_eq!(params.json_train.seed, 7);
        assert!(params.save_examples);
        assert_eq!(params.json_train.progress_every, 50);
    }

    #[test]
    fn bad_values_are_config_errors() {

        let missing_output = json!({ "corpus_file": "c.txt" });
        assert!(matches!(Config::from_json(&missing_output), Err(CbowError::Config(_))));

        let zero_vocab = json!({ "corpus_file": "c.txt", "output_dir": "out", "vocab_size": 0 });
        assert!(matches!(Config::from_json(&zero_vocab), Err(CbowError::Config(_))));

        let text_window = json!({ "corpus_file": "c.txt", "output_dir": "out", "window_radius": "two" });
        assert!(matches!(Config::from_json(&text_window), Err(CbowError::Config(_))));

        let negative_rate = json!({ "corpus_file": "c.txt", "output_dir": "out", "learning_rate": -1.0 });
        assert!(matches!(Config::from_json(&negative_rate), Err(CbowError::Config(_))));
    }

    #[test]
    fn files_read_with_or_without_extension() {

        use files_handling::{read_input, save_output};
        use crate::vocab::{build_vocabulary, Vocabulary};
        use ndarray::{array, Array2};

        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().to_str().unwrap();

        let tokens = vec!["good".to_string(), "film".to_string(), "good".to_string()];
        let vocab = build_vocabulary(&tokens, 2).unwrap();
        let w: Array2<f32> = array![[1.0, 2.0], [3.0, 4.0]];
        save_output(out, "words", &vocab).unwrap();
        save_output(out, "vecs", &w).unwrap();

        let bare: Vocabulary = read_input(&format!("{}/words", out)).unwrap();
        let full: Vocabulary = read_input(&format!("{}/words.json", out)).unwrap();
        assert_eq!(bare, vocab);
        assert_eq!(full, vocab);

        let bare: Array2<f32> = read_input(&format!("{}/vecs", out)).unwrap();
        let full: Array2<f32> = read_input(&format!("{}/vecs.npy", out)).unwrap();
        assert_eq!(bare, w);
        assert_eq!(full, w);
    }

    #[test]
    fn needs_exactly_one_argument() {
        let args = vec!["cbow_trainer".to_string()];
        assert!(matches!(Config::new(&args), Err(CbowError::Config(_))));
    }
}
