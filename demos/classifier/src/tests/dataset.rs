use nalgebra::DMatrix;

use crate::prelude::*;

#[test]
fn test_blobs_are_balanced_and_ordered_by_class() {
    let dataset = Dataset::blobs(10, 3, 11).unwrap();
    assert_eq!(dataset.len(), 30);
    assert_eq!(dataset.n_features(), 2);
    for class in 0..3 {
        assert!(dataset.labels[class * 10..(class + 1) * 10]
            .iter()
            .all(|&label| label == class));
    }
}

#[test]
fn test_blobs_are_reproducible() {
    let a = Dataset::blobs(8, 4, 99).unwrap();
    let b = Dataset::blobs(8, 4, 99).unwrap();
    let c = Dataset::blobs(8, 4, 100).unwrap();
    assert_eq!(a, b);
    assert_ne!(a.features, c.features);
}

#[test]
fn test_blob_samples_sit_near_their_center() {
    let dataset = Dataset::blobs(200, 2, 4).unwrap();
    // class 0 is centered at (3, 0), class 1 at (-3, 0)
    let mean_x = |class: usize| {
        dataset
            .labels
            .iter()
            .enumerate()
            .filter(|(_, label)| **label == class)
            .map(|(i, _)| dataset.features[(i, 0)])
            .sum::<f64>()
            / 200.0
    };
    assert!((mean_x(0) - 3.0).abs() < 0.3);
    assert!((mean_x(1) + 3.0).abs() < 0.3);
}

#[test]
fn test_rejects_empty_requests() {
    assert!(Dataset::blobs(0, 3, 0).is_err());
    assert!(Dataset::blobs(5, 0, 0).is_err());
}

#[test]
fn test_new_checks_label_count() {
    let features: DMatrix<f64> = DMatrix::zeros(3, 2);
    assert!(Dataset::new(features.clone(), vec![0, 1]).is_err());
    assert!(Dataset::new(features, vec![0, 1, 1]).is_ok());
}
