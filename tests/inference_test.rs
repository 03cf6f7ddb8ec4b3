use inferrs::correction::{self, CorrectionMethod};
use inferrs::distributions::Distribution;
use inferrs::inference;

#[test]
fn test_ttest_detects_true_mean_shift() {
    // 平均が3離れた2つの正規分布からの標本では差が検出されるはず
    let group1 = Distribution::normal(10.0, 2.0).unwrap().sample(40, 1).unwrap();
    let group2 = Distribution::normal(13.0, 2.0).unwrap().sample(40, 2).unwrap();

    let result = inference::ttest(&group1, &group2, 0.05, false).unwrap();

    assert!(result.significant, "p = {}", result.pvalue);
    assert!(result.statistic < 0.0);
}

#[test]
fn test_ttest_type_one_error_rate_under_null() {
    // 同一分布からの標本の対では、5%水準での棄却率は名目水準近傍のはず
    let population = Distribution::normal(50.0, 10.0).unwrap();
    let trials = 400;
    let mut rejections = 0;

    for trial in 0..trials {
        let group1 = population.sample(25, 10_000 + trial).unwrap();
        let group2 = population.sample(25, 30_000 + trial).unwrap();
        let result = inference::ttest(&group1, &group2, 0.05, true).unwrap();
        if result.significant {
            rejections += 1;
        }
    }

    let rate = rejections as f64 / trials as f64;
    assert!(
        rate <= 0.10,
        "帰無仮説下の棄却率が名目水準を大きく超えています: {}",
        rate
    );
}

#[test]
fn test_correction_controls_family_wise_significance() {
    // 多数のt検定のp値を一括補正するワークフロー：
    // 帰無仮説が真の検定群では補正後にほとんど有意が残らないはず
    let population = Distribution::normal(0.0, 1.0).unwrap();
    let mut p_values = Vec::new();

    for trial in 0..50 {
        let group1 = population.sample(20, 70_000 + trial).unwrap();
        let group2 = population.sample(20, 90_000 + trial).unwrap();
        p_values.push(inference::ttest(&group1, &group2, 0.05, true).unwrap().pvalue);
    }

    let bonf = correction::adjust(&p_values, CorrectionMethod::Bonferroni).unwrap();
    let bh = correction::adjust(&p_values, CorrectionMethod::BenjaminiHochberg).unwrap();

    let bonf_hits = bonf.iter().filter(|&&p| p < 0.05).count();
    let bh_hits = bh.iter().filter(|&&p| p < 0.05).count();

    assert!(bonf_hits <= 1, "Bonferroni補正後も{}件が有意のままです", bonf_hits);
    assert!(bh_hits <= 2, "BH補正後も{}件が有意のままです", bh_hits);

    // Bonferroniは各要素でBH以上に保守的
    for (b, f) in bonf.iter().zip(bh.iter()) {
        assert!(b >= f);
    }
}

#[test]
fn test_quantile_inverts_cumulative_for_normal() {
    let dist = Distribution::normal(5.0, 2.0).unwrap();
    for &p in &[0.01, 0.25, 0.5, 0.75, 0.99] {
        let x = dist.quantile_of(p).unwrap();
        let roundtrip = dist.cumulative(x, false);
        assert!(
            (roundtrip - p).abs() < 1e-8,
            "p = {}: cumulative(quantile_of(p)) = {}",
            p,
            roundtrip
        );
    }
}

#[test]
fn test_quantile_inverts_cumulative_for_t_and_chi_squared() {
    let t = Distribution::t(7.0).unwrap();
    let chi = Distribution::chi_squared(3.0).unwrap();
    for &p in &[0.05, 0.5, 0.95] {
        for dist in [&t, &chi] {
            let x = dist.quantile_of(p).unwrap();
            assert!((dist.cumulative(x, false) - p).abs() < 1e-7);
        }
    }
}

#[test]
fn test_upper_and_lower_tails_are_complementary() {
    let dist = Distribution::f(4.0, 9.0).unwrap();
    for &x in &[0.5, 1.0, 2.5, 6.0] {
        let lower = dist.cumulative(x, false);
        let upper = dist.cumulative(x, true);
        assert!((lower + upper - 1.0).abs() < 1e-12);
    }
}

#[test]
fn test_sampling_matches_distribution_moments() {
    // 大標本では標本平均・標本分散が母数に近づくはず
    let dist = Distribution::poisson(4.0).unwrap();
    let sample = dist.sample(20_000, 99).unwrap();

    let mean = sample.iter().sum::<f64>() / sample.len() as f64;
    let var = sample.iter().map(|&x| (x - mean).powi(2)).sum::<f64>()
        / (sample.len() - 1) as f64;

    assert!((mean - 4.0).abs() < 0.1, "標本平均 = {}", mean);
    assert!((var - 4.0).abs() < 0.3, "標本分散 = {}", var);
}

#[test]
fn test_ttest_result_serializes_to_json() {
    let group1 = vec![1.0, 2.0, 3.0, 4.0, 5.0];
    let group2 = vec![2.0, 3.0, 4.0, 5.0, 6.0];
    let result = inference::ttest(&group1, &group2, 0.05, true).unwrap();

    let json = serde_json::to_value(&result).unwrap();
    assert!(json.get("statistic").is_some());
    assert!(json.get("pvalue").is_some());
    assert!(json.get("df").is_some());
}
