use cbow_trainer::files_handling::read_input;
use cbow_trainer::{CbowError, Similarity, Vocabulary};

use ndarray::Array2;
use std::{env, error::Error, fs::File, io::{self, BufRead}};
use tracing_subscriber::EnvFilter;


// inspects trained vectors:
// the K most similar words to a given word,
// the K best answers to an analogy a : b :: c : ?
// treated as a binary executable so it can be run independently from training

fn main() -> Result<(), Box<dyn Error>> {

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("cbow_trainer=info")))
        .init();

    // arguments to this executable should be:
    // a letter selector: "a" for analogies, "b" for word similarity
    // path to input based on selector (quads or singles)
    // path to trained vecs and to tokens, the .npy and .json extensions may be left out
    // example: ... a Input/analogies.txt Output/vecs.npy Output/words.json
    let args: Vec<String> = env::args().collect();
    if args.len() != 5 {
        return Err("usage: similar <a|b> <queries file> <vecs.npy> <words.json>".into());
    }
    let selector = args[1].as_str();

    // read inputs file
    let lines = io::BufReader::new(File::open(&args[2])?)
        .lines()
        .collect::<Result<Vec<String>, io::Error>>()?;

    // read in trained vecs and tokens
    let w: Array2<f32> = read_input(&args[3])?;
    let vocabulary: Vocabulary = read_input(&args[4])?;
    let sim_obj = Similarity::new(w, vocabulary)?;

    match selector {
        "a" => {
            // each line holds quartets separated by spaces, for example:
            // king queen man woman
            let inputs = lines
                .iter()
                .filter(|line| !line.trim().is_empty())
                .map(|line| line.split_whitespace().map(str::to_string).collect::<Vec<String>>())
                .collect::<Vec<Vec<String>>>();
            run_analogies(&inputs, 10, &sim_obj)?;
        },
        "b" => {
            // one token per line
            let inputs = lines
                .iter()
                .map(|line| line.trim().to_string())
                .filter(|line| !line.is_empty())
                .collect::<Vec<String>>();
            run_similarity(&inputs, 10, &sim_obj)?;
        },
        _ => return Err(format!("unrecognized pattern in first argument {}", selector).into()),
    }

    Ok(())
}


fn run_analogies(inputs: &[Vec<String>], k: usize, similarity_object: &Similarity) -> Result<(), Box<dyn Error>> {

    // a is to b as like c is to ?
    // translates to b - a + c : ?
    for input in inputs {

        if input.len() != 4 {
            return Err(format!("expected four words per analogy line, got {:?}", input).into());
        }

        let source = [input[0].as_str(), input[1].as_str(), input[2].as_str()];
        let target = input[3].as_str();

        let analogies = match similarity_object.analogy(source, k) {
            Ok(analogies) => analogies,
            Err(CbowError::UnknownToken(token)) => {
                println!("skipping {:?}, '{}' is not in the vocabulary\n", input, token);
                continue;
            },
            Err(e) => return Err(e.into()),
        };

        let mut found_target = false;
        for (i, (analogy, score)) in analogies.iter().enumerate() {
            println!("{} : {} - {} + {} ? {} = {}", i, source[1], source[0], source[2], analogy, score);
            if analogy == target {
                found_target = true;
                println!("found target '{}' analogy in place {}", target, 1 + i);
            }
        }

        if !found_target {
            println!("target '{}' was not found within the first {} analogies", target, k);
        }

        println!();
    }
    Ok(())
}

fn run_similarity(inputs: &[String], k: usize, similarity_object: &Similarity) -> Result<(), Box<dyn Error>> {

    // finding the k most similar words to each of the input tokens
    for token in inputs {

        println!("searching {} most similar words to {}", k, token);
        let similarities = match similarity_object.most_similar(token, k) {
            Ok(similarities) => similarities,
            Err(CbowError::UnknownToken(_)) => {
                println!("'{}' is not in the vocabulary\n", token);
                continue;
            },
            Err(e) => return Err(e.into()),
        };

        for (i, (similar_token, score)) in similarities.iter().enumerate() {
            println!("{} : {} ? {} = {}", i, token, similar_token, score);
        }
        println!();
    }

    Ok(())
}
