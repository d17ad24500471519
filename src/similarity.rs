use crate::error::{CbowError, Result};
use crate::vocab::Vocabulary;

use ndarray::prelude::*;


/// Cosine similarity queries over trained word vectors.
///
/// Rows are scaled to unit length once, so a dot product is the cosine.
pub struct Similarity {
    w: Array2<f32>,
    vocabulary: Vocabulary,
}

impl Similarity {

    pub fn new(mut w: Array2<f32>, vocabulary: Vocabulary) -> Result<Similarity> {

        if w.dim().0 != vocabulary.len() {
            return Err(CbowError::Mismatch { vectors: w.dim().0, tokens: vocabulary.len() });
        }

        // normalize w so each row has l2 norm 1, all-zero rows stay zero
        for mut row in w.axis_iter_mut(Axis(0)) {
            let norm = row.dot(&row).sqrt();
            if norm > 0.0 {
                row.mapv_inplace(|a| a / norm);
            }
        }

        Ok(Self { w, vocabulary })
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    /// The unit-length vector of `token`.
    pub fn vector(&self, token: &str) -> Result<Array1<f32>> {
        match self.vocabulary.id(token) {
            Some(i) => Ok(self.w.row(i).to_owned()),
            None => Err(CbowError::UnknownToken(token.to_string())),
        }
    }

    pub fn cosine(&self, a: &str, b: &str) -> Result<f32> {
        Ok(self.vector(a)?.dot(&self.vector(b)?))
    }

    fn ranked(&self, vec: &Array1<f32>, k: usize, exclude: &[usize]) -> Vec<(String, f32)> {

        // scale the query too, so the scores stay cosines
        let norm = vec.dot(vec).sqrt();
        let scores = if norm > 0.0 { self.w.dot(vec) / norm } else { self.w.dot(vec) };

        let mut indexed_scores: Vec<(usize, f32)> = scores
            .iter()
            .copied()
            .enumerate()
            .filter(|(i, _)| !exclude.contains(i))
            .collect();

        // sort by most similar in descending order, ids break ties
        indexed_scores.sort_by(|(i, s), (j, t)| t.total_cmp(s).then(i.cmp(j)));
        indexed_scores.truncate(k);

        indexed_scores
            .into_iter()
            .filter_map(|(i, score)| self.vocabulary.token(i).map(|t| (t.to_string(), score)))
            .collect()
    }

    pub fn most_similar_to_vector(&self, vec: &Array1<f32>, k: usize) -> Vec<(String, f32)> {
        self.ranked(vec, k, &[])
    }

    /// The `k` tokens closest to `token`, the token itself left out.
    pub fn most_similar(&self, token: &str, k: usize) -> Result<Vec<(String, f32)>> {
        let vec = self.vector(token)?;
        let exclude = self.vocabulary.ids(&[token])?;
        Ok(self.ranked(&vec, k, &exclude))
    }

    /// a is to b as c is to ?, answered with the neighbours of `b - a + c`.
    pub fn analogy(&self, inputs: [&str; 3], k: usize) -> Result<Vec<(String, f32)>> {

        let [a, b, c] = inputs;
        let analogy = self.vector(b)? - self.vector(a)? + self.vector(c)?;
        let exclude = self.vocabulary.ids(&inputs)?;
        Ok(self.ranked(&analogy, k, &exclude))
    }

}


#[cfg(test)]
mod tests {

    use super::*;
    use crate::vocab::build_vocabulary;
    use ndarray::array;

    fn similarity() -> Similarity {
        // ids follow first appearance since every token is seen once
        let tokens: Vec<String> = ["king", "queen", "man", "woman", "film"].iter().map(|t| t.to_string()).collect();
        let vocab = build_vocabulary(&tokens, 5).unwrap();
        let w = array![
            [1.0, 1.0, 0.0],
            [1.0, 0.0, 1.0],
            [0.0, 2.0, 0.0],
            [0.0, 1.0, 1.0],
            [0.0, 0.0, -3.0],
        ];
        Similarity::new(w, vocab).unwrap()
    }

    #[test]
    fn vectors_are_unit_length() {
        let sim = similarity();
        for token in ["king", "man", "film"] {
            let v = sim.vector(token).unwrap();
            assert!((v.dot(&v) - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn cosine_values() {
        let sim = similarity();
        assert!((sim.cosine("king", "king").unwrap() - 1.0).abs() < 1e-6);
        assert!((sim.cosine("king", "man").unwrap() - 0.5f32.sqrt()).abs() < 1e-6);
        assert!((sim.cosine("queen", "film").unwrap() + 0.5f32.sqrt()).abs() < 1e-6);
    }

    #[test]
    fn most_similar_excludes_query_and_is_sorted() {

        let sim = similarity();
        let neighbours = sim.most_similar("king", 10).unwrap();

        assert_eq!(neighbours.len(), 4);
        assert!(neighbours.iter().all(|(t, _)| t != "king"));
        assert!(neighbours.windows(2).all(|p| p[0].1 >= p[1].1));
        assert_eq!(neighbours.last().unwrap().0, "film");
    }

    #[test]
    fn nearest_to_raw_vector() {

        let sim = similarity();
        // not unit length, scores should still be cosines
        let query = array![0.0, 5.0, 0.0];

        let all = sim.most_similar_to_vector(&query, 10);
        assert_eq!(all.len(), 5);
        assert_eq!(all[0].0, "man");
        assert!((all[0].1 - 1.0).abs() < 1e-6);
        // king and woman tie, the smaller id comes first
        assert_eq!(all[1].0, "king");
        assert_eq!(all[2].0, "woman");
        assert!((all[1].1 - 0.5f32.sqrt()).abs() < 1e-6);
        assert!((all[2].1 - 0.5f32.sqrt()).abs() < 1e-6);

        let top = sim.most_similar_to_vector(&query, 2);
        assert_eq!(top.iter().map(|(t, _)| t.as_str()).collect::<Vec<&str>>(), vec!["man", "king"]);
    }

    #[test]
    fn analogy_finds_the_fourth_word() {
        // queen - king + man is about (0, 0.29, 0.71), closest remaining is woman
        let sim = similarity();
        let answers = sim.analogy(["king", "queen", "man"], 1).unwrap();
        assert_eq!(answers[0].0, "woman");
    }

    #[test]
    fn unknown_tokens_fail() {
        let sim = similarity();
        assert!(matches!(sim.most_similar("dragon", 3), Err(CbowError::UnknownToken(_))));
        assert!(matches!(sim.analogy(["king", "dragon", "man"], 3), Err(CbowError::UnknownToken(_))));
    }

    #[test]
    fn mismatched_rows_are_rejected() {
        let tokens = vec!["a".to_string(), "b".to_string()];
        let vocab = build_vocabulary(&tokens, 2).unwrap();
        assert!(matches!(
            Similarity::new(Array2::zeros((3, 2)), vocab),
            Err(CbowError::Mismatch { vectors: 3, tokens: 2 })
        ));
    }
}
