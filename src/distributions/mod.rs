// 確率分布モジュール
//
// 正規、t、二項、ポアソン、F、カイ二乗分布の密度・累積分布・分位関数と
// シード付き乱数生成を提供します。分布記述子は構築時に検証され、
// 構築後は不変です。

mod special;

pub(crate) use special::{ln_gamma, norm_cdf, norm_ppf};

use crate::error::{Error, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// 反復法（二分法・ステップ探索）の打ち切り回数
const MAX_ITERATIONS: usize = 200;

/// 分位関数の二分法の絶対許容誤差
const QUANTILE_TOLERANCE: f64 = 1.0e-10;

/// 分布記述子
///
/// # 説明
/// パラメータ付きの確率分布を表す列挙型です。コンストラクタで
/// パラメータを検証するため、構築済みの値は常に妥当です。
///
/// # 例
/// ```rust
/// use inferrs::distributions::Distribution;
///
/// let normal = Distribution::normal(0.0, 1.0).unwrap();
/// assert!((normal.cumulative(0.0, false) - 0.5).abs() < 1e-10);
///
/// // 不正なパラメータは構築時に拒否される
/// assert!(Distribution::normal(0.0, -1.0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Distribution {
    /// 正規分布 N(mean, sd²)
    Normal { mean: f64, sd: f64 },
    /// t分布（自由度df）
    T { df: f64 },
    /// 二項分布 B(n, p)
    Binomial { n: u64, p: f64 },
    /// ポアソン分布 Po(lambda)
    Poisson { lambda: f64 },
    /// F分布（自由度df1, df2）
    F { df1: f64, df2: f64 },
    /// カイ二乗分布（自由度df）
    ChiSquared { df: f64 },
}

impl Distribution {
    /// 正規分布を構築（sd > 0）
    pub fn normal(mean: f64, sd: f64) -> Result<Self> {
        if !mean.is_finite() {
            return Err(Error::InvalidParameter("正規分布の平均は有限値である必要があります".into()));
        }
        if !sd.is_finite() || sd <= 0.0 {
            return Err(Error::InvalidParameter("正規分布の標準偏差は正の値である必要があります".into()));
        }
        Ok(Distribution::Normal { mean, sd })
    }

    /// t分布を構築（df > 0）
    pub fn t(df: f64) -> Result<Self> {
        if !df.is_finite() || df <= 0.0 {
            return Err(Error::InvalidParameter("t分布の自由度は正の値である必要があります".into()));
        }
        Ok(Distribution::T { df })
    }

    /// 二項分布を構築（0 ≤ p ≤ 1）
    pub fn binomial(n: u64, p: f64) -> Result<Self> {
        if !p.is_finite() || !(0.0..=1.0).contains(&p) {
            return Err(Error::InvalidParameter("二項分布の成功確率は[0, 1]の範囲である必要があります".into()));
        }
        Ok(Distribution::Binomial { n, p })
    }

    /// ポアソン分布を構築（lambda > 0）
    pub fn poisson(lambda: f64) -> Result<Self> {
        if !lambda.is_finite() || lambda <= 0.0 {
            return Err(Error::InvalidParameter("ポアソン分布の強度は正の値である必要があります".into()));
        }
        Ok(Distribution::Poisson { lambda })
    }

    /// F分布を構築（df1 > 0, df2 > 0）
    pub fn f(df1: f64, df2: f64) -> Result<Self> {
        if !df1.is_finite() || df1 <= 0.0 || !df2.is_finite() || df2 <= 0.0 {
            return Err(Error::InvalidParameter("F分布の自由度は正の値である必要があります".into()));
        }
        Ok(Distribution::F { df1, df2 })
    }

    /// カイ二乗分布を構築（df > 0）
    pub fn chi_squared(df: f64) -> Result<Self> {
        if !df.is_finite() || df <= 0.0 {
            return Err(Error::InvalidParameter("カイ二乗分布の自由度は正の値である必要があります".into()));
        }
        Ok(Distribution::ChiSquared { df })
    }

    /// 確率密度関数（離散分布では確率質量関数）の値を計算
    ///
    /// # エラー
    /// `x`が分布の台の外にある場合は`Error::Domain`を返します
    /// （例：ポアソン分布に負の値や非整数を渡した場合）。
    pub fn density(&self, x: f64) -> Result<f64> {
        if !x.is_finite() {
            return Err(Error::Domain("密度関数の引数は有限値である必要があります".into()));
        }

        match *self {
            Distribution::Normal { mean, sd } => {
                let z = (x - mean) / sd;
                Ok(special::INV_SQRT_2PI * (-0.5 * z * z).exp() / sd)
            }
            Distribution::T { df } => {
                let ln_coef = ln_gamma((df + 1.0) / 2.0)
                    - ln_gamma(df / 2.0)
                    - 0.5 * (df * std::f64::consts::PI).ln();
                Ok((ln_coef - (df + 1.0) / 2.0 * (1.0 + x * x / df).ln()).exp())
            }
            Distribution::Binomial { n, p } => {
                let k = integer_support_value(x, "二項分布")?;
                if k > n {
                    return Err(Error::Domain("二項分布の台は0からnまでの整数です".into()));
                }
                Ok(binomial_pmf(n, p, k))
            }
            Distribution::Poisson { lambda } => {
                let k = integer_support_value(x, "ポアソン分布")?;
                Ok(poisson_pmf(lambda, k))
            }
            Distribution::F { df1, df2 } => {
                if x < 0.0 {
                    return Err(Error::Domain("F分布の台は非負の実数です".into()));
                }
                if x == 0.0 {
                    // x → 0での極限値
                    return Ok(match df1 {
                        d if d < 2.0 => f64::INFINITY,
                        d if d == 2.0 => 1.0,
                        _ => 0.0,
                    });
                }
                let a = df1 / 2.0;
                let b = df2 / 2.0;
                let ln_coef = ln_gamma(a + b) - ln_gamma(a) - ln_gamma(b)
                    + a * (df1 / df2).ln();
                Ok((ln_coef + (a - 1.0) * x.ln() - (a + b) * (1.0 + df1 * x / df2).ln()).exp())
            }
            Distribution::ChiSquared { df } => {
                if x < 0.0 {
                    return Err(Error::Domain("カイ二乗分布の台は非負の実数です".into()));
                }
                if x == 0.0 {
                    return Ok(match df {
                        d if d < 2.0 => f64::INFINITY,
                        d if d == 2.0 => 0.5,
                        _ => 0.0,
                    });
                }
                let a = df / 2.0;
                Ok(((a - 1.0) * x.ln() - x / 2.0 - a * 2.0_f64.ln() - ln_gamma(a)).exp())
            }
        }
    }

    /// 累積分布関数 P(X ≤ x) を計算
    ///
    /// `upper_tail`が真の場合は P(X > x) を返します。遠い裾での精度を保つため、
    /// 上側確率は 1 - CDF の引き算ではなく相補的な特殊関数で直接計算します。
    pub fn cumulative(&self, x: f64, upper_tail: bool) -> f64 {
        match *self {
            Distribution::Normal { mean, sd } => {
                let z = (x - mean) / sd;
                if upper_tail {
                    norm_cdf(-z)
                } else {
                    norm_cdf(z)
                }
            }
            Distribution::T { df } => {
                // 対称性により上側確率は符号反転で直接求まる
                let x = if upper_tail { -x } else { x };
                t_cdf(x, df)
            }
            Distribution::Binomial { n, p } => {
                if x < 0.0 {
                    return if upper_tail { 1.0 } else { 0.0 };
                }
                let k = (x.floor() as u64).min(n);
                if upper_tail {
                    // P(X > k)を上側から直接加算
                    (k + 1..=n).map(|j| binomial_pmf(n, p, j)).sum()
                } else {
                    (0..=k).map(|j| binomial_pmf(n, p, j)).sum()
                }
            }
            Distribution::Poisson { lambda } => {
                if x < 0.0 {
                    return if upper_tail { 1.0 } else { 0.0 };
                }
                let k = x.floor();
                // P(X ≤ k) = Q(k+1, λ)（不完全ガンマ関数の恒等式）
                if upper_tail {
                    special::gamma_p(k + 1.0, lambda)
                } else {
                    special::gamma_q(k + 1.0, lambda)
                }
            }
            Distribution::F { df1, df2 } => {
                if x <= 0.0 {
                    return if upper_tail { 1.0 } else { 0.0 };
                }
                if upper_tail {
                    special::betainc(df2 / 2.0, df1 / 2.0, df2 / (df1 * x + df2))
                } else {
                    special::betainc(df1 / 2.0, df2 / 2.0, df1 * x / (df1 * x + df2))
                }
            }
            Distribution::ChiSquared { df } => {
                if x <= 0.0 {
                    return if upper_tail { 1.0 } else { 0.0 };
                }
                if upper_tail {
                    special::gamma_q(df / 2.0, x / 2.0)
                } else {
                    special::gamma_p(df / 2.0, x / 2.0)
                }
            }
        }
    }

    /// 分位関数（逆CDF）を計算
    ///
    /// # 説明
    /// 正規分布は有理近似による閉形式、連続分布は単調なCDFに対する二分法
    /// （絶対許容誤差1e-10、反復上限あり）、離散分布はステップ探索で求めます。
    ///
    /// # エラー
    /// - `p`が[0, 1]の外の場合は`Error::Domain`
    /// - 反復上限を超えた場合は`Error::Convergence`
    pub fn quantile_of(&self, p: f64) -> Result<f64> {
        if !p.is_finite() || !(0.0..=1.0).contains(&p) {
            return Err(Error::Domain("確率は[0, 1]の範囲である必要があります".into()));
        }

        match *self {
            Distribution::Normal { mean, sd } => Ok(mean + sd * norm_ppf(p)),
            Distribution::T { .. } => {
                if p == 0.0 {
                    return Ok(f64::NEG_INFINITY);
                }
                if p == 1.0 {
                    return Ok(f64::INFINITY);
                }
                if p == 0.5 {
                    return Ok(0.0);
                }
                // 対称な台：中心から両側に区間を拡張してから二分法
                let mut hi = 1.0;
                let mut iterations = 0;
                while self.cumulative(hi, false) < p.max(1.0 - p) {
                    hi *= 2.0;
                    iterations += 1;
                    if iterations > MAX_ITERATIONS {
                        return Err(Error::Convergence("t分布の分位点の探索範囲が確定しませんでした".into()));
                    }
                }
                self.bisect_quantile(-hi, hi, p)
            }
            Distribution::F { .. } | Distribution::ChiSquared { .. } => {
                if p == 0.0 {
                    return Ok(0.0);
                }
                if p == 1.0 {
                    return Ok(f64::INFINITY);
                }
                let mut hi = 1.0;
                let mut iterations = 0;
                while self.cumulative(hi, false) < p {
                    hi *= 2.0;
                    iterations += 1;
                    if iterations > MAX_ITERATIONS {
                        return Err(Error::Convergence("分位点の探索範囲が確定しませんでした".into()));
                    }
                }
                self.bisect_quantile(0.0, hi, p)
            }
            Distribution::Binomial { n, .. } => {
                if p == 1.0 {
                    return Ok(n as f64);
                }
                // CDF(k) ≥ pとなる最小の整数k
                let mut cumulative = 0.0;
                for k in 0..=n {
                    cumulative += self.density(k as f64)?;
                    if cumulative >= p {
                        return Ok(k as f64);
                    }
                }
                Ok(n as f64)
            }
            Distribution::Poisson { lambda } => {
                if p == 1.0 {
                    return Ok(f64::INFINITY);
                }
                // 台が非有界のためλに応じた上限でステップ探索を打ち切る
                let cap = (lambda + 20.0 * lambda.sqrt() + 100.0) as u64;
                let mut cumulative = 0.0;
                for k in 0..=cap {
                    cumulative += self.density(k as f64)?;
                    if cumulative >= p {
                        return Ok(k as f64);
                    }
                }
                Err(Error::Convergence("ポアソン分布の分位点探索が上限に達しました".into()))
            }
        }
    }

    /// 独立な乱数標本をn個生成
    ///
    /// # 説明
    /// シード付きの`StdRng`による逆関数法で生成します。同じシードからは
    /// 同一の系列が得られるため、テストの再現性が保証されます。
    pub fn sample(&self, n: usize, rng_seed: u64) -> Result<Vec<f64>> {
        let mut rng = StdRng::seed_from_u64(rng_seed);
        let mut values = Vec::with_capacity(n);

        for _ in 0..n {
            // 一様乱数を開区間(0, 1)に収めてから逆CDFを適用
            let u: f64 = rng.random::<f64>().max(f64::MIN_POSITIVE);
            values.push(self.quantile_of(u)?);
        }

        Ok(values)
    }

    /// [lo, hi]区間での二分法による分位点の求解
    fn bisect_quantile(&self, mut lo: f64, mut hi: f64, p: f64) -> Result<f64> {
        for _ in 0..MAX_ITERATIONS {
            let mid = 0.5 * (lo + hi);
            if self.cumulative(mid, false) < p {
                lo = mid;
            } else {
                hi = mid;
            }
            if hi - lo < QUANTILE_TOLERANCE {
                return Ok(0.5 * (lo + hi));
            }
        }
        Err(Error::Convergence("分位点の二分法が許容誤差内に収束しませんでした".into()))
    }
}

/// t分布のCDF（正則化不完全ベータ関数による厳密計算）
fn t_cdf(x: f64, df: f64) -> f64 {
    if x == 0.0 {
        return 0.5;
    }
    let tail = 0.5 * special::betainc(df / 2.0, 0.5, df / (df + x * x));
    if x > 0.0 {
        1.0 - tail
    } else {
        tail
    }
}

/// 台の検証：非負整数値のみ許可
fn integer_support_value(x: f64, name: &str) -> Result<u64> {
    if x < 0.0 || x.fract() != 0.0 {
        return Err(Error::Domain(format!("{}の台は非負の整数です", name)));
    }
    Ok(x as u64)
}

/// 二項分布の確率質量関数
fn binomial_pmf(n: u64, p: f64, k: u64) -> f64 {
    // p = 0, 1の縁では対数が取れないため直接処理
    if p == 0.0 {
        return if k == 0 { 1.0 } else { 0.0 };
    }
    if p == 1.0 {
        return if k == n { 1.0 } else { 0.0 };
    }

    let n_f = n as f64;
    let k_f = k as f64;
    let ln_choose = ln_gamma(n_f + 1.0) - ln_gamma(k_f + 1.0) - ln_gamma(n_f - k_f + 1.0);
    (ln_choose + k_f * p.ln() + (n_f - k_f) * (1.0 - p).ln()).exp()
}

/// ポアソン分布の確率質量関数
fn poisson_pmf(lambda: f64, k: u64) -> f64 {
    let k_f = k as f64;
    (-lambda + k_f * lambda.ln() - ln_gamma(k_f + 1.0)).exp()
}
