use inferrs::distributions::Distribution;
use inferrs::regression;

/// 切片列付きの単回帰用計画行列を作成
fn design_with_intercept(x: &[f64]) -> Vec<Vec<f64>> {
    x.iter().map(|&v| vec![1.0, v]).collect()
}

#[test]
fn test_noiseless_round_trip_recovers_coefficients_exactly() {
    // y = β₀ + β₁x（σ = 0）では係数が厳密に復元され、R² = 1、RSS = 0になるはず
    let beta0 = 3.5;
    let beta1 = -1.25;
    let x: Vec<f64> = (0..20).map(|i| i as f64).collect();
    let y: Vec<f64> = x.iter().map(|&v| beta0 + beta1 * v).collect();

    let model = regression::fit(&design_with_intercept(&x), &y).unwrap();

    assert!((model.coefficients[0] - beta0).abs() < 1e-8);
    assert!((model.coefficients[1] - beta1).abs() < 1e-8);
    assert!((model.r_squared - 1.0).abs() < 1e-8);
    assert!(model.rss < 1e-8);
}

#[test]
fn test_noisy_fit_recovers_coefficients_approximately() {
    // ノイズ付きデータでは真の係数が信頼区間に入るはず
    let beta0 = 10.0;
    let beta1 = 2.0;
    let x: Vec<f64> = (0..100).map(|i| i as f64 / 10.0).collect();
    let noise = Distribution::normal(0.0, 0.5)
        .unwrap()
        .sample(100, 42)
        .unwrap();
    let y: Vec<f64> = x
        .iter()
        .zip(noise.iter())
        .map(|(&v, &e)| beta0 + beta1 * v + e)
        .collect();

    let model = regression::fit(&design_with_intercept(&x), &y).unwrap();

    let ci = model.conf_intervals(0.01).unwrap();
    assert!(
        ci[0].0 <= beta0 && beta0 <= ci[0].1,
        "切片の99%区間{:?}が真値{}を外しました",
        ci[0],
        beta0
    );
    assert!(
        ci[1].0 <= beta1 && beta1 <= ci[1].1,
        "傾きの99%区間{:?}が真値{}を外しました",
        ci[1],
        beta1
    );
    assert!(model.r_squared > 0.95);
}

#[test]
fn test_rse_estimates_noise_standard_deviation() {
    // 残差標準誤差はノイズの標準偏差の推定量
    let sigma = 2.0;
    let x: Vec<f64> = (0..200).map(|i| i as f64 / 20.0).collect();
    let noise = Distribution::normal(0.0, sigma)
        .unwrap()
        .sample(200, 77)
        .unwrap();
    let y: Vec<f64> = x
        .iter()
        .zip(noise.iter())
        .map(|(&v, &e)| 1.0 + 3.0 * v + e)
        .collect();

    let model = regression::fit(&design_with_intercept(&x), &y).unwrap();

    assert!(
        (model.rse - sigma).abs() < 0.5,
        "RSE = {}がσ = {}から外れています",
        model.rse,
        sigma
    );
}

#[test]
fn test_covariance_matrix_rebuilds_intervals_without_refit() {
    // 共分散行列から任意の信頼水準の区間を再構成できる
    let x: Vec<f64> = (0..30).map(|i| i as f64).collect();
    let noise = Distribution::normal(0.0, 1.0)
        .unwrap()
        .sample(30, 5)
        .unwrap();
    let y: Vec<f64> = x
        .iter()
        .zip(noise.iter())
        .map(|(&v, &e)| 2.0 + 0.5 * v + e)
        .collect();

    let model = regression::fit(&design_with_intercept(&x), &y).unwrap();

    let t_crit = Distribution::t(model.df as f64)
        .unwrap()
        .quantile_of(0.975)
        .unwrap();
    let ci = model.conf_intervals(0.05).unwrap();

    for j in 0..model.p {
        let se = model.covariance[j][j].sqrt();
        let lower = model.coefficients[j] - t_crit * se;
        let upper = model.coefficients[j] + t_crit * se;
        assert!((ci[j].0 - lower).abs() < 1e-9);
        assert!((ci[j].1 - upper).abs() < 1e-9);
    }
}

#[test]
fn test_refit_produces_independent_model() {
    // モデルは不変：再当てはめは新しい値を生成し、元のモデルは変わらない
    let x = vec![1.0, 2.0, 3.0, 4.0, 5.0];
    let y1 = vec![2.0, 4.0, 6.0, 8.0, 10.0];
    let y2 = vec![3.0, 5.0, 7.0, 9.0, 11.0];

    let design = design_with_intercept(&x);
    let model1 = regression::fit(&design, &y1).unwrap();
    let slope_before = model1.coefficients[1];

    let model2 = regression::fit(&design, &y2).unwrap();

    assert_eq!(model1.coefficients[1], slope_before);
    assert!((model2.coefficients[0] - model1.coefficients[0] - 1.0).abs() < 1e-8);
}

#[test]
fn test_model_serializes_to_json() {
    // 構造化レポートとして外部の描画側に渡せる
    let x = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
    let y = vec![1.9, 4.1, 6.0, 8.2, 9.8, 12.1];

    let model = regression::fit(&design_with_intercept(&x), &y).unwrap();
    let json = serde_json::to_value(&model).unwrap();

    assert!(json.get("coefficients").is_some());
    assert!(json.get("r_squared").is_some());
    assert!(json.get("covariance").is_some());
    assert_eq!(json["n"], 6);
    assert_eq!(json["p"], 2);
}
