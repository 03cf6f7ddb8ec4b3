// 記述統計モジュール
//
// 平均、中央値、分散（不偏推定量）、標準偏差、分位数（type-7線形補間）、
// 四分位範囲などの基本統計量を計算します。すべて入力を変更しない純関数です。

use crate::error::{Error, Result};
use serde::Serialize;

/// 記述統計量の結果を保持する構造体
#[derive(Debug, Clone, Serialize)]
pub struct DescriptiveStats {
    /// データの件数
    pub count: usize,
    /// 平均値
    pub mean: f64,
    /// 標準偏差（不偏推定量）
    pub std: f64,
    /// 最小値
    pub min: f64,
    /// 25%分位点
    pub q1: f64,
    /// 中央値（50%分位点）
    pub median: f64,
    /// 75%分位点
    pub q3: f64,
    /// 最大値
    pub max: f64,
}

/// 平均値を計算
///
/// # 例
/// ```rust
/// use inferrs::descriptive;
///
/// let data = vec![1.0, 2.0, 3.0, 4.0, 5.0];
/// assert_eq!(descriptive::mean(&data).unwrap(), 3.0);
/// ```
pub fn mean<T: AsRef<[f64]>>(data: T) -> Result<f64> {
    let data = data.as_ref();
    if data.is_empty() {
        return Err(Error::InsufficientData("平均値の計算には少なくとも1つのデータが必要です".into()));
    }
    Ok(data.iter().sum::<f64>() / data.len() as f64)
}

/// 中央値を計算
pub fn median<T: AsRef<[f64]>>(data: T) -> Result<f64> {
    let data = data.as_ref();
    if data.is_empty() {
        return Err(Error::InsufficientData("中央値の計算には少なくとも1つのデータが必要です".into()));
    }
    let sorted = sorted_copy(data);
    Ok(quantile_sorted(&sorted, 0.5))
}

/// 分散（不偏推定量、n-1で割る）を計算
pub fn variance<T: AsRef<[f64]>>(data: T) -> Result<f64> {
    let data = data.as_ref();
    if data.len() < 2 {
        return Err(Error::InsufficientData("分散の計算には少なくとも2つのデータが必要です".into()));
    }

    let m = data.iter().sum::<f64>() / data.len() as f64;
    let sum_squared_diff = data.iter().map(|&x| (x - m).powi(2)).sum::<f64>();
    Ok(sum_squared_diff / (data.len() - 1) as f64)
}

/// 標準偏差（不偏分散の平方根）を計算
pub fn stddev<T: AsRef<[f64]>>(data: T) -> Result<f64> {
    Ok(variance(data)?.sqrt())
}

/// 分位数を計算（type-7: 線形補間）
///
/// # 説明
/// ソート済みデータ長nに対して位置 1 + p(n-1) を取り、前後のインデックス間で
/// 線形補間します（R・NumPyのデフォルトと同じ規約）。
///
/// # エラー
/// - データが空の場合は`Error::InsufficientData`
/// - 確率が[0, 1]の外の場合は`Error::Domain`
pub fn quantile<T: AsRef<[f64]>>(data: T, probabilities: &[f64]) -> Result<Vec<f64>> {
    let data = data.as_ref();
    if data.is_empty() {
        return Err(Error::InsufficientData("分位数の計算には少なくとも1つのデータが必要です".into()));
    }

    for &p in probabilities {
        if !p.is_finite() || !(0.0..=1.0).contains(&p) {
            return Err(Error::Domain("分位数の確率は[0, 1]の範囲である必要があります".into()));
        }
    }

    let sorted = sorted_copy(data);
    Ok(probabilities.iter().map(|&p| quantile_sorted(&sorted, p)).collect())
}

/// 四分位範囲（Q3 - Q1）を計算
pub fn iqr<T: AsRef<[f64]>>(data: T) -> Result<f64> {
    let q = quantile(data, &[0.25, 0.75])?;
    Ok(q[1] - q[0])
}

/// 共分散を計算
pub fn covariance<T: AsRef<[f64]>, U: AsRef<[f64]>>(x: T, y: U) -> Result<f64> {
    let x = x.as_ref();
    let y = y.as_ref();

    if x.len() != y.len() {
        return Err(Error::DimensionMismatch(format!(
            "共分散の計算には同じ長さの系列が必要です: {} と {}",
            x.len(),
            y.len()
        )));
    }
    if x.len() < 2 {
        return Err(Error::InsufficientData("共分散の計算には少なくとも2つのデータが必要です".into()));
    }

    let mean_x = x.iter().sum::<f64>() / x.len() as f64;
    let mean_y = y.iter().sum::<f64>() / y.len() as f64;

    let sum = x
        .iter()
        .zip(y.iter())
        .map(|(&a, &b)| (a - mean_x) * (b - mean_y))
        .sum::<f64>();

    Ok(sum / (x.len() - 1) as f64)
}

/// ピアソン相関係数を計算
pub fn correlation<T: AsRef<[f64]>, U: AsRef<[f64]>>(x: T, y: U) -> Result<f64> {
    let x = x.as_ref();
    let y = y.as_ref();

    let cov = covariance(x, y)?;
    let sd_x = stddev(x)?;
    let sd_y = stddev(y)?;

    if sd_x == 0.0 || sd_y == 0.0 {
        return Err(Error::DegenerateResponse("相関係数は定数系列に対して定義されません".into()));
    }

    Ok(cov / (sd_x * sd_y))
}

/// データの基本統計量をまとめて計算
pub fn describe<T: AsRef<[f64]>>(data: T) -> Result<DescriptiveStats> {
    let data = data.as_ref();
    if data.len() < 2 {
        return Err(Error::InsufficientData("基本統計量の計算には少なくとも2つのデータが必要です".into()));
    }

    let sorted = sorted_copy(data);

    Ok(DescriptiveStats {
        count: data.len(),
        mean: mean(data)?,
        std: stddev(data)?,
        min: sorted[0],
        q1: quantile_sorted(&sorted, 0.25),
        median: quantile_sorted(&sorted, 0.5),
        q3: quantile_sorted(&sorted, 0.75),
        max: sorted[sorted.len() - 1],
    })
}

/// ソート済みコピーを作成（NaNは末尾に寄せられる）
fn sorted_copy(data: &[f64]) -> Vec<f64> {
    let mut sorted = data.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    sorted
}

/// ソート済みデータからtype-7分位数を取得
pub(crate) fn quantile_sorted(sorted: &[f64], p: f64) -> f64 {
    let n = sorted.len();
    if n == 1 {
        return sorted[0];
    }

    let position = p * (n - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let weight = position - lower as f64;

    sorted[lower] * (1.0 - weight) + sorted[upper] * weight
}
