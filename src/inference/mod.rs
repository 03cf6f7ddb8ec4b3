// 推測統計・仮説検定モジュール
//
// 2標本のt検定（等分散プーリングとWelch法）を提供します。
// p値は正規近似ではなくt分布の厳密なCDFから計算します。

use crate::distributions::Distribution;
use crate::error::{Error, Result};
use serde::Serialize;

/// tテストの結果
#[derive(Debug, Clone, Serialize)]
pub struct TTestResult {
    /// t統計量
    pub statistic: f64,
    /// 両側p値
    pub pvalue: f64,
    /// 有意水準で有意か
    pub significant: bool,
    /// 自由度（Welch法ではSatterthwaite近似による非整数値）
    pub df: f64,
}

/// 2標本のt検定を実行
///
/// # 説明
/// 2つの独立した標本の平均値に有意差があるかを検定します。
/// `equal_var`が真の場合はプールした分散を使い、偽の場合は
/// Welchのt検定（等分散を仮定しない）を行います。
///
/// # 例
/// ```rust
/// use inferrs::inference;
///
/// let sample1 = vec![1.0, 2.0, 3.0, 4.0, 5.0];
/// let sample2 = vec![11.0, 12.0, 13.0, 14.0, 15.0];
/// let result = inference::ttest(&sample1, &sample2, 0.05, false).unwrap();
/// assert!(result.significant);
/// ```
pub fn ttest<T: AsRef<[f64]>, U: AsRef<[f64]>>(
    sample1: T,
    sample2: U,
    alpha: f64,
    equal_var: bool,
) -> Result<TTestResult> {
    let sample1 = sample1.as_ref();
    let sample2 = sample2.as_ref();

    if !alpha.is_finite() || alpha <= 0.0 || alpha >= 1.0 {
        return Err(Error::InvalidParameter("有意水準は(0, 1)の範囲である必要があります".into()));
    }

    let n1 = sample1.len();
    let n2 = sample2.len();

    if n1 < 2 || n2 < 2 {
        return Err(Error::InsufficientData("t検定には各グループに少なくとも2つのデータが必要です".into()));
    }

    let mean1 = sample1.iter().sum::<f64>() / n1 as f64;
    let mean2 = sample2.iter().sum::<f64>() / n2 as f64;

    let var1 = sample1.iter().map(|&x| (x - mean1).powi(2)).sum::<f64>() / (n1 - 1) as f64;
    let var2 = sample2.iter().map(|&x| (x - mean2).powi(2)).sum::<f64>() / (n2 - 1) as f64;

    let (t_stat, df) = if equal_var {
        // 等分散を仮定したプールされた分散
        let pooled_var =
            ((n1 - 1) as f64 * var1 + (n2 - 1) as f64 * var2) / (n1 + n2 - 2) as f64;
        let std_err = (pooled_var * (1.0 / n1 as f64 + 1.0 / n2 as f64)).sqrt();
        ((mean1 - mean2) / std_err, (n1 + n2 - 2) as f64)
    } else {
        // Welchのt検定：Welch-Satterthwaite近似の自由度は非整数のまま使う
        let se1 = var1 / n1 as f64;
        let se2 = var2 / n2 as f64;
        let std_err = (se1 + se2).sqrt();
        let df = (se1 + se2).powi(2)
            / (se1.powi(2) / (n1 - 1) as f64 + se2.powi(2) / (n2 - 1) as f64);
        ((mean1 - mean2) / std_err, df)
    };

    // 両側p値：t分布の上側確率を直接2倍する
    let t_dist = Distribution::t(df)?;
    let p_value = 2.0 * t_dist.cumulative(t_stat.abs(), true);

    Ok(TTestResult {
        statistic: t_stat,
        pvalue: p_value,
        significant: p_value < alpha,
        df,
    })
}
