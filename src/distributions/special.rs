// 特殊関数モジュール
//
// 分布計算で共有される特殊関数（誤差関数、対数ガンマ関数、
// 正則化不完全ベータ/ガンマ関数）の純Rust実装。

/// 標準正規分布の密度定数 1/sqrt(2π)
pub(crate) const INV_SQRT_2PI: f64 = 0.3989422804014327;

/// 誤差関数の近似計算（Abramowitz and Stegun 7.1.26、精度は約1.5e-7）
pub(crate) fn erf(x: f64) -> f64 {
    const A1: f64 = 0.254829592;
    const A2: f64 = -0.284496736;
    const A3: f64 = 1.421413741;
    const A4: f64 = -1.453152027;
    const A5: f64 = 1.061405429;
    const P: f64 = 0.3275911;

    let sign = if x < 0.0 { -1.0 } else { 1.0 };
    let x = x.abs();

    let t = 1.0 / (1.0 + P * x);
    let y = 1.0 - (((((A5 * t + A4) * t) + A3) * t + A2) * t + A1) * t * (-x * x).exp();

    sign * y
}

/// 標準正規分布のCDF（累積分布関数）
pub(crate) fn norm_cdf(z: f64) -> f64 {
    0.5 * (1.0 + erf(z / std::f64::consts::SQRT_2))
}

/// 標準正規分布のPDF（確率密度関数）
pub(crate) fn norm_pdf(z: f64) -> f64 {
    INV_SQRT_2PI * (-0.5 * z * z).exp()
}

/// 標準正規分布の分位関数（逆CDF）
///
/// Abramowitz and Stegun 26.2.23の有理近似を初期値として、
/// ニュートン法で自己無撞着になるまで磨き上げます。
pub(crate) fn norm_ppf(p: f64) -> f64 {
    if p <= 0.0 {
        return f64::NEG_INFINITY;
    }
    if p >= 1.0 {
        return f64::INFINITY;
    }

    // p = 0.5を中心とした対称性を利用
    let (p_adj, sign) = if p < 0.5 { (p, -1.0) } else { (1.0 - p, 1.0) };

    let t = (-2.0 * p_adj.ln()).sqrt();

    const C0: f64 = 2.515517;
    const C1: f64 = 0.802853;
    const C2: f64 = 0.010328;
    const D1: f64 = 1.432788;
    const D2: f64 = 0.189269;
    const D3: f64 = 0.001308;

    let mut z =
        sign * (t - (C0 + C1 * t + C2 * t * t) / (1.0 + D1 * t + D2 * t * t + D3 * t * t * t));

    // ニュートン法による補正（CDFとの整合を取る）
    for _ in 0..3 {
        let err = norm_cdf(z) - p;
        let pdf = norm_pdf(z);
        if pdf <= f64::MIN_POSITIVE {
            break;
        }
        z -= err / pdf;
    }

    z
}

/// 対数ガンマ関数 ln(Γ(x))（Lanczos近似、g=7）
pub(crate) fn ln_gamma(x: f64) -> f64 {
    const COEFFICIENTS: [f64; 9] = [
        0.99999999999980993,
        676.5203681218851,
        -1259.1392167224028,
        771.32342877765313,
        -176.61502916214059,
        12.507343278686905,
        -0.13857109526572012,
        9.9843695780195716e-6,
        1.5056327351493116e-7,
    ];

    if x < 0.5 {
        // 反射公式
        let pi = std::f64::consts::PI;
        return (pi / (pi * x).sin()).ln() - ln_gamma(1.0 - x);
    }

    let x = x - 1.0;
    let mut acc = COEFFICIENTS[0];
    let t = x + 7.5; // g + 0.5

    for (i, &coef) in COEFFICIENTS.iter().enumerate().skip(1) {
        acc += coef / (x + i as f64);
    }

    0.5 * (2.0 * std::f64::consts::PI).ln() + t.ln() * (x + 0.5) - t + acc.ln()
}

/// 正則化不完全ベータ関数 I_x(a, b)
pub(crate) fn betainc(a: f64, b: f64, x: f64) -> f64 {
    if x <= 0.0 {
        return 0.0;
    }
    if x >= 1.0 {
        return 1.0;
    }

    let bt = (ln_gamma(a + b) - ln_gamma(a) - ln_gamma(b) + a * x.ln() + b * (1.0 - x).ln()).exp();

    // 連分数が速く収束する側を選ぶ
    if x < (a + 1.0) / (a + b + 2.0) {
        (bt * beta_cf(a, b, x) / a).clamp(0.0, 1.0)
    } else {
        (1.0 - bt * beta_cf(b, a, 1.0 - x) / b).clamp(0.0, 1.0)
    }
}

/// 不完全ベータ関数の連分数展開（修正Lentz法）
fn beta_cf(a: f64, b: f64, x: f64) -> f64 {
    const MAX_ITERS: usize = 300;
    const EPS: f64 = 1.0e-12;
    const FPMIN: f64 = 1.0e-30;

    let qab = a + b;
    let qap = a + 1.0;
    let qam = a - 1.0;

    let mut c = 1.0;
    let mut d = 1.0 - qab * x / qap;
    if d.abs() < FPMIN {
        d = FPMIN;
    }
    d = 1.0 / d;
    let mut h = d;

    for m in 1..=MAX_ITERS {
        let m_f = m as f64;
        let m2 = 2.0 * m_f;

        let aa = m_f * (b - m_f) * x / ((qam + m2) * (a + m2));
        d = 1.0 + aa * d;
        if d.abs() < FPMIN {
            d = FPMIN;
        }
        c = 1.0 + aa / c;
        if c.abs() < FPMIN {
            c = FPMIN;
        }
        d = 1.0 / d;
        h *= d * c;

        let aa = -(a + m_f) * (qab + m_f) * x / ((a + m2) * (qap + m2));
        d = 1.0 + aa * d;
        if d.abs() < FPMIN {
            d = FPMIN;
        }
        c = 1.0 + aa / c;
        if c.abs() < FPMIN {
            c = FPMIN;
        }
        d = 1.0 / d;
        let delta = d * c;
        h *= delta;

        if (delta - 1.0).abs() < EPS {
            break;
        }
    }

    h
}

/// 正則化下側不完全ガンマ関数 P(a, x) = γ(a, x) / Γ(a)
pub(crate) fn gamma_p(a: f64, x: f64) -> f64 {
    if x <= 0.0 || a <= 0.0 {
        return 0.0;
    }

    // x < a + 1 では級数展開、それ以外は連分数が収束しやすい
    if x < a + 1.0 {
        gamma_series(a, x)
    } else {
        1.0 - gamma_cf(a, x)
    }
}

/// 正則化上側不完全ガンマ関数 Q(a, x) = 1 - P(a, x)
pub(crate) fn gamma_q(a: f64, x: f64) -> f64 {
    if x <= 0.0 || a <= 0.0 {
        return 1.0;
    }

    if x < a + 1.0 {
        1.0 - gamma_series(a, x)
    } else {
        gamma_cf(a, x)
    }
}

/// 不完全ガンマ関数の級数展開
fn gamma_series(a: f64, x: f64) -> f64 {
    let ln_ga = ln_gamma(a);
    let mut sum = 1.0 / a;
    let mut term = sum;

    for n in 1..300 {
        term *= x / (a + n as f64);
        sum += term;
        if term.abs() < sum.abs() * 1.0e-15 {
            break;
        }
    }

    (sum * (-x + a * x.ln() - ln_ga).exp()).clamp(0.0, 1.0)
}

/// 上側不完全ガンマ関数の連分数展開（修正Lentz法）
fn gamma_cf(a: f64, x: f64) -> f64 {
    const TINY: f64 = 1.0e-30;
    const EPS: f64 = 1.0e-14;

    let ln_ga = ln_gamma(a);

    let mut b = x + 1.0 - a;
    let mut c = 1.0 / TINY;
    let mut d = 1.0 / b;
    let mut h = d;

    for i in 1..=300 {
        let an = -(i as f64) * (i as f64 - a);
        b += 2.0;
        d = an * d + b;
        if d.abs() < TINY {
            d = TINY;
        }
        c = b + an / c;
        if c.abs() < TINY {
            c = TINY;
        }
        d = 1.0 / d;
        let delta = d * c;
        h *= delta;
        if (delta - 1.0).abs() <= EPS {
            break;
        }
    }

    (h * (-x + a * x.ln() - ln_ga).exp()).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_erf_known_values() {
        // erf(0) = 0、erf(∞) → 1
        assert!(erf(0.0).abs() < 1e-10);
        assert!((erf(5.0) - 1.0).abs() < 1e-7);
        // 対称性
        assert!((erf(1.0) + erf(-1.0)).abs() < 1e-12);
        // erf(1) ≈ 0.8427007929
        assert!((erf(1.0) - 0.8427007929).abs() < 1e-6);
    }

    #[test]
    fn test_norm_cdf() {
        assert!((norm_cdf(0.0) - 0.5).abs() < 1e-10);
        assert!((norm_cdf(1.96) - 0.975).abs() < 1e-4);
        assert!((norm_cdf(-1.96) - 0.025).abs() < 1e-4);
    }

    #[test]
    fn test_norm_ppf_roundtrip() {
        for p in [0.01, 0.1, 0.25, 0.5, 0.75, 0.9, 0.99] {
            let z = norm_ppf(p);
            assert!(
                (norm_cdf(z) - p).abs() < 1e-9,
                "p={}, cdf(ppf(p))={}",
                p,
                norm_cdf(z)
            );
        }
        assert_eq!(norm_ppf(0.0), f64::NEG_INFINITY);
        assert_eq!(norm_ppf(1.0), f64::INFINITY);
    }

    #[test]
    fn test_ln_gamma() {
        // Γ(1) = 1, Γ(2) = 1, Γ(5) = 24
        assert!(ln_gamma(1.0).abs() < 1e-10);
        assert!(ln_gamma(2.0).abs() < 1e-10);
        assert!((ln_gamma(5.0) - 24.0_f64.ln()).abs() < 1e-10);
        // Γ(0.5) = sqrt(π)
        assert!((ln_gamma(0.5) - std::f64::consts::PI.sqrt().ln()).abs() < 1e-10);
    }

    #[test]
    fn test_betainc_limits() {
        assert_eq!(betainc(2.0, 3.0, 0.0), 0.0);
        assert_eq!(betainc(2.0, 3.0, 1.0), 1.0);
        // I_x(1, 1) = x（一様分布のCDF）
        assert!((betainc(1.0, 1.0, 0.3) - 0.3).abs() < 1e-10);
        // 対称性 I_x(a, b) = 1 - I_{1-x}(b, a)
        let lhs = betainc(2.5, 1.5, 0.4);
        let rhs = 1.0 - betainc(1.5, 2.5, 0.6);
        assert!((lhs - rhs).abs() < 1e-10);
    }

    #[test]
    fn test_gamma_p_q() {
        // P + Q = 1
        for &(a, x) in &[(0.5, 0.3), (2.0, 1.0), (5.0, 10.0)] {
            assert!((gamma_p(a, x) + gamma_q(a, x) - 1.0).abs() < 1e-12);
        }
        // P(1, x) = 1 - e^{-x}（指数分布のCDF）
        assert!((gamma_p(1.0, 2.0) - (1.0 - (-2.0_f64).exp())).abs() < 1e-12);
        assert_eq!(gamma_p(2.0, 0.0), 0.0);
    }
}
