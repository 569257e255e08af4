/// L2-normalised identity embedding for one detected face.
#[derive(Clone, Debug, PartialEq)]
pub struct FaceDescriptor {
    values: Vec<f32>,
}

impl FaceDescriptor {
    /// Builds a descriptor, normalising `values` to unit length.
    pub fn new(mut values: Vec<f32>) -> Self {
        l2_normalize(&mut values);
        Self { values }
    }

    pub fn values(&self) -> &[f32] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Cosine distance `1 - cos(a, b)` in `[0, 2]`; 0 means same direction.
    ///
    /// Descriptors of different lengths are maximally distant.
    pub fn distance(&self, other: &FaceDescriptor) -> f64 {
        if self.values.len() != other.values.len() || self.values.is_empty() {
            return 2.0;
        }
        let similarity: f64 = self
            .values
            .iter()
            .zip(other.values.iter())
            .map(|(a, b)| (*a as f64) * (*b as f64))
            .sum();
        (1.0 - similarity).clamp(0.0, 2.0)
    }
}

pub fn l2_normalize(v: &mut [f32]) {
    let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in v.iter_mut() {
            *x /= norm;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_new_normalises() {
        let d = FaceDescriptor::new(vec![3.0, 4.0]);
        assert_relative_eq!(d.values()[0], 0.6, epsilon = 1e-6);
        assert_relative_eq!(d.values()[1], 0.8, epsilon = 1e-6);
    }

    #[test]
    fn test_zero_vector_stays_zero() {
        let mut v = vec![0.0, 0.0, 0.0];
        l2_normalize(&mut v);
        assert_eq!(v, vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_distance_identical_is_zero() {
        let a = FaceDescriptor::new(vec![1.0, 2.0, 3.0]);
        assert_relative_eq!(a.distance(&a), 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_distance_orthogonal_is_one() {
        let a = FaceDescriptor::new(vec![1.0, 0.0]);
        let b = FaceDescriptor::new(vec![0.0, 1.0]);
        assert_relative_eq!(a.distance(&b), 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_distance_opposite_is_two() {
        let a = FaceDescriptor::new(vec![1.0, 0.0]);
        let b = FaceDescriptor::new(vec![-1.0, 0.0]);
        assert_relative_eq!(a.distance(&b), 2.0, epsilon = 1e-6);
    }

    #[test]
    fn test_distance_is_symmetric() {
        let a = FaceDescriptor::new(vec![0.2, 0.9, 0.1]);
        let b = FaceDescriptor::new(vec![0.7, 0.1, 0.4]);
        assert_relative_eq!(a.distance(&b), b.distance(&a), epsilon = 1e-9);
    }

    #[test]
    fn test_length_mismatch_is_max_distance() {
        let a = FaceDescriptor::new(vec![1.0, 0.0]);
        let b = FaceDescriptor::new(vec![1.0, 0.0, 0.0]);
        assert_relative_eq!(a.distance(&b), 2.0);
    }
}
