
// imports
use crate::error::Result;

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use regex::Regex;
use tracing::{debug, info};


#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Document {
    pub label: Option<String>,
    pub text: String,
}

#[derive(Clone, Debug, Default)]
pub struct Corpus {
    documents: Vec<Document>,
}


// defines the behavior needed for tokenizing a normalized document
pub trait Tokenizer {
    fn tokenize(sequence: &str) -> Vec<String>;
}

pub struct WhitespaceTokenizer;

impl Tokenizer for WhitespaceTokenizer {
    // simple tokenizer by splitting on runs of whitespace
    fn tokenize(sequence: &str) -> Vec<String> {
        sequence.split_whitespace().map(|x| x.to_string()).collect()
    }
}


pub struct Normalizer {
    punct: Regex,
}

impl Normalizer {

    pub fn new() -> Result<Self> {
        Ok(Self { punct: Regex::new(r"[[:punct:]]")? })
    }

    // lower case and strip punctuation, whitespace is left for the tokenizer
    pub fn normalize(&self, text: &str) -> String {
        let lowered = text.to_lowercase();
        self.punct.replace_all(&lowered, "").into_owned()
    }
}


impl Corpus {

    pub fn new(documents: Vec<Document>) -> Self {
        Self { documents }
    }

    fn read_file(file_path: &str) -> Result<Lines<BufReader<File>>> {
        let f = File::open(file_path)?;
        Ok(BufReader::new(f).lines())
    }

    fn parse_line(line: &str) -> Option<Document> {

        // a line is either `label<TAB>text` or plain text, empty lines hold no document
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        match line.split_once('\t') {
            Some((label, text)) => Some(Document {
                label: Some(label.trim().to_string()),
                text: text.to_string(),
            }),
            None => Some(Document { label: None, text: line.to_string() }),
        }
    }

    pub fn load(file_path: &str) -> Result<Self> {

        let mut documents = Vec::new();
        for line in Corpus::read_file(file_path)? {
            if let Some(document) = Corpus::parse_line(&line?) {
                documents.push(document);
            }
        }

        info!(file = file_path, documents = documents.len(), "loaded corpus");
        Ok(Self { documents })
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn label_counts(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for label in self.documents.iter().filter_map(|d| d.label.as_ref()) {
            *counts.entry(label.to_owned()).or_insert(0) += 1;
        }
        counts
    }

    /// Concatenated token stream of every document, in file order.
    pub fn tokens(&self) -> Result<Vec<String>> {
        self.tokens_with::<WhitespaceTokenizer>()
    }

    pub fn tokens_with<T: Tokenizer>(&self) -> Result<Vec<String>> {

        let normalizer = Normalizer::new()?;
        let mut tokens = Vec::new();
        for document in &self.documents {
            let normalized = normalizer.normalize(&document.text);
            tokens.extend(T::tokenize(&normalized));
        }

        debug!(tokens = tokens.len(), "tokenized corpus");
        Ok(tokens)
    }
}
