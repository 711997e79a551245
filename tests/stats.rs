use kira_neurovoice::math::stats::{
    clamp, index_slope, linear_slope, logistic, mean, pearson, population_std, round_to,
    safe_div, spearman_brown,
};

#[test]
fn mean_and_std() {
    assert_eq!(mean(&[]), 0.0);
    assert!((mean(&[1.0, 2.0, 3.0]) - 2.0).abs() < 1e-12);
    assert_eq!(population_std(&[]), 0.0);
    assert!((population_std(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]) - 2.0).abs() < 1e-12);
}

#[test]
fn slopes() {
    assert_eq!(linear_slope(&[1.0], &[1.0]), 0.0);
    assert_eq!(linear_slope(&[1.0, 1.0], &[1.0, 5.0]), 0.0);
    assert!((linear_slope(&[0.0, 1.0, 2.0], &[1.0, 3.0, 5.0]) - 2.0).abs() < 1e-12);
    assert!((index_slope(&[0.0, -0.1, -0.2, -0.3]) + 0.1).abs() < 1e-12);
}

#[test]
fn correlation() {
    let x = [1.0, 2.0, 3.0, 4.0];
    let y = [2.0, 4.0, 6.0, 8.0];
    assert!((pearson(&x, &y) - 1.0).abs() < 1e-12);
    let flat = [1.0, 1.0, 1.0, 1.0];
    assert_eq!(pearson(&x, &flat), 0.0);
    assert!((spearman_brown(0.5) - 2.0 / 3.0).abs() < 1e-12);
    assert_eq!(spearman_brown(-1.0), -1.0);
}

#[test]
fn guards() {
    assert_eq!(safe_div(1.0, 0.0, 7.0), 7.0);
    assert_eq!(safe_div(1.0, f64::NAN, 7.0), 7.0);
    assert_eq!(round_to(1.23456, 2), 1.23);
    assert_eq!(clamp(f64::NAN, 0.0, 1.0), 0.0);
    assert_eq!(clamp(2.0, 0.0, 1.0), 1.0);
    assert!((logistic(0.25, 0.25, 6.0) - 0.5).abs() < 1e-12);
}
