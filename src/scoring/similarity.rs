use ndarray::Array1;

/// Cosine similarity in [-1, 1]; zero when either vector has no magnitude
/// or the lengths differ.
pub fn cosine_similarity(a: &Array1<f32>, b: &Array1<f32>) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let norm_a = a.dot(a).sqrt();
    let norm_b = b.dot(b).sqrt();
    if norm_a <= f32::EPSILON || norm_b <= f32::EPSILON {
        return 0.0;
    }
    (a.dot(b) / (norm_a * norm_b)).clamp(-1.0, 1.0)
}

/// Highest similarity between any candidate and any reference, or `None`
/// when either side is empty.
pub fn best_similarity(candidates: &[Array1<f32>], references: &[Array1<f32>]) -> Option<f32> {
    candidates
        .iter()
        .flat_map(|candidate| {
            references
                .iter()
                .map(move |reference| cosine_similarity(candidate, reference))
        })
        .reduce(f32::max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    fn orthogonal_and_parallel_vectors() {
        let x = array![1.0_f32, 0.0];
        let y = array![0.0_f32, 2.0];
        assert_relative_eq!(cosine_similarity(&x, &y), 0.0);
        assert_relative_eq!(cosine_similarity(&x, &(&x * 3.0)), 1.0, epsilon = 1e-6);
        assert_relative_eq!(cosine_similarity(&x, &(&x * -1.0)), -1.0, epsilon = 1e-6);
    }

    #[test]
    fn degenerate_inputs_score_zero() {
        let zero = Array1::<f32>::zeros(2);
        let x = array![1.0_f32, 0.0];
        assert_eq!(cosine_similarity(&zero, &x), 0.0);
        assert_eq!(cosine_similarity(&x, &array![1.0_f32, 0.0, 0.0]), 0.0);
    }

    #[test]
    fn best_similarity_takes_the_maximum_pair() {
        let candidates = vec![array![1.0_f32, 0.0], array![0.6_f32, 0.8]];
        let references = vec![array![0.0_f32, 1.0]];
        assert_relative_eq!(
            best_similarity(&candidates, &references).unwrap(),
            0.8,
            epsilon = 1e-6
        );
        assert!(best_similarity(&[], &references).is_none());
    }
}
