// 回帰分析モジュール
//
// 最小二乗法による線形モデルの当てはめと、それに付随する推測統計量
// （標準誤差、t検定、信頼区間、決定係数）を提供します。計画行列は
// 呼び出し側が行単位で渡し、切片が必要な場合は1.0の列を自分で含めます
// （エンジンは自動では挿入しません）。

use crate::distributions::Distribution;
use crate::error::{Error, Result};
use serde::Serialize;

/// ガウス・ジョルダン法でのピボット消失の判定閾値
const PIVOT_TOLERANCE: f64 = 1.0e-10;

/// 当てはめ済み線形モデル
///
/// 一度の`fit`呼び出しで生成され、以後変更されません。
/// 再当てはめは新しいモデルを生成します。
#[derive(Debug, Clone, Serialize)]
pub struct LinearModel {
    /// 観測数（計画行列の行数）
    pub n: usize,
    /// 説明変数の数（計画行列の列数、切片列を含む）
    pub p: usize,
    /// 回帰係数（計画行列の列順）
    pub coefficients: Vec<f64>,
    /// 当てはめ値 ŷ
    pub fitted_values: Vec<f64>,
    /// 残差 y - ŷ
    pub residuals: Vec<f64>,
    /// 残差平方和 Σ(y - ŷ)²
    pub rss: f64,
    /// 総平方和 Σ(y - ȳ)²
    pub tss: f64,
    /// 残差標準誤差 sqrt(RSS / (n - p))
    pub rse: f64,
    /// 決定係数 R² = 1 - RSS/TSS
    pub r_squared: f64,
    /// 調整済み決定係数
    pub adj_r_squared: f64,
    /// 残差自由度 n - p
    pub df: usize,
    /// 各係数の標準誤差
    pub std_errors: Vec<f64>,
    /// 各係数のt統計量
    pub t_values: Vec<f64>,
    /// 各係数の両側p値（自由度n-pのt分布）
    pub p_values: Vec<f64>,
    /// 係数の共分散行列 RSE² · (XᵀX)⁻¹
    ///
    /// 任意の信頼水準の区間を再当てはめなしで構成できるよう、
    /// 完全な形で保持します。
    pub covariance: Vec<Vec<f64>>,
}

impl LinearModel {
    /// 信頼水準(1 - alpha)での各係数の信頼区間を計算
    ///
    /// β̂ⱼ ± t_{α/2, n-p} · SEⱼ。モデルの再当てはめは不要です。
    pub fn conf_intervals(&self, alpha: f64) -> Result<Vec<(f64, f64)>> {
        if !alpha.is_finite() || alpha <= 0.0 || alpha >= 1.0 {
            return Err(Error::InvalidParameter("有意水準は(0, 1)の範囲である必要があります".into()));
        }

        let t_dist = Distribution::t(self.df as f64)?;
        let t_crit = t_dist.quantile_of(1.0 - alpha / 2.0)?;

        Ok(self
            .coefficients
            .iter()
            .zip(self.std_errors.iter())
            .map(|(&b, &se)| (b - t_crit * se, b + t_crit * se))
            .collect())
    }
}

/// 最小二乗法で線形モデルを当てはめる
///
/// # 説明
/// `design`はn行p列の計画行列（行単位）、`response`は長さnの目的変数です。
/// 正規方程式 (XᵀX)β = Xᵀy をガウス・ジョルダン法で解きます。
///
/// # エラー
/// - 行の長さが不揃い、`response`の長さがnと異なる、またはn ≤ pの場合は
///   `Error::DimensionMismatch`
/// - 計画行列が列フルランクでない場合は`Error::SingularMatrix`
///   （消去過程でのピボット消失として検出）
/// - 目的変数が定数（TSS = 0）の場合は`Error::DegenerateResponse`
///
/// # 例
/// ```rust
/// use inferrs::regression;
///
/// // y = 1 + 2x（切片列は呼び出し側が渡す）
/// let design: Vec<Vec<f64>> = (1..=5).map(|x| vec![1.0, x as f64]).collect();
/// let response: Vec<f64> = (1..=5).map(|x| 1.0 + 2.0 * x as f64).collect();
///
/// let model = regression::fit(&design, &response).unwrap();
/// assert!((model.coefficients[0] - 1.0).abs() < 1e-8);
/// assert!((model.coefficients[1] - 2.0).abs() < 1e-8);
/// assert!((model.r_squared - 1.0).abs() < 1e-8);
/// ```
pub fn fit(design: &[Vec<f64>], response: &[f64]) -> Result<LinearModel> {
    let n = design.len();
    if n == 0 {
        return Err(Error::EmptyData("回帰分析には計画行列が必要です".into()));
    }

    let p = design[0].len();
    if p == 0 {
        return Err(Error::DimensionMismatch("計画行列には少なくとも1列が必要です".into()));
    }
    for (i, row) in design.iter().enumerate() {
        if row.len() != p {
            return Err(Error::DimensionMismatch(format!(
                "計画行列の行の長さが不揃いです: 行0は{}列、行{}は{}列",
                p,
                i,
                row.len()
            )));
        }
    }
    if response.len() != n {
        return Err(Error::DimensionMismatch(format!(
            "目的変数の長さが一致しません: 計画行列は{}行、目的変数は{}個",
            n,
            response.len()
        )));
    }
    if n <= p {
        return Err(Error::DimensionMismatch(format!(
            "観測数は説明変数の数より多い必要があります: n = {}, p = {}",
            n, p
        )));
    }

    // XᵀX と Xᵀy の計算
    let mut xt_x = vec![vec![0.0; p]; p];
    let mut xt_y = vec![0.0; p];
    for (row, &y) in design.iter().zip(response.iter()) {
        for j in 0..p {
            xt_y[j] += row[j] * y;
            for k in j..p {
                xt_x[j][k] += row[j] * row[k];
            }
        }
    }
    // 対称性で下三角を埋める
    for j in 0..p {
        for k in 0..j {
            xt_x[j][k] = xt_x[k][j];
        }
    }

    let xt_x_inv = matrix_inverse(&xt_x)?;

    // β = (XᵀX)⁻¹ Xᵀy
    let coefficients: Vec<f64> = (0..p)
        .map(|i| (0..p).map(|j| xt_x_inv[i][j] * xt_y[j]).sum())
        .collect();

    let fitted_values: Vec<f64> = design
        .iter()
        .map(|row| row.iter().zip(coefficients.iter()).map(|(&x, &b)| x * b).sum())
        .collect();

    let residuals: Vec<f64> = response
        .iter()
        .zip(fitted_values.iter())
        .map(|(&y, &y_hat)| y - y_hat)
        .collect();

    let rss = residuals.iter().map(|&r| r * r).sum::<f64>();

    let y_mean = response.iter().sum::<f64>() / n as f64;
    let tss = response.iter().map(|&y| (y - y_mean).powi(2)).sum::<f64>();

    if tss == 0.0 {
        return Err(Error::DegenerateResponse("目的変数が定数のため決定係数が定義されません".into()));
    }

    let df = n - p;
    let rse = (rss / df as f64).sqrt();
    let r_squared = 1.0 - rss / tss;
    let adj_r_squared = 1.0 - (1.0 - r_squared) * (n - 1) as f64 / df as f64;

    // 係数の共分散行列と標準誤差
    let sigma2 = rse * rse;
    let covariance: Vec<Vec<f64>> = xt_x_inv
        .iter()
        .map(|row| row.iter().map(|&v| sigma2 * v).collect())
        .collect();

    let std_errors: Vec<f64> = (0..p).map(|j| covariance[j][j].sqrt()).collect();

    let t_dist = Distribution::t(df as f64)?;
    let mut t_values = Vec::with_capacity(p);
    let mut p_values = Vec::with_capacity(p);
    for j in 0..p {
        let t = coefficients[j] / std_errors[j];
        t_values.push(t);
        // 両側p値：上側確率を直接2倍する
        p_values.push(2.0 * t_dist.cumulative(t.abs(), true));
    }

    Ok(LinearModel {
        n,
        p,
        coefficients,
        fitted_values,
        residuals,
        rss,
        tss,
        rse,
        r_squared,
        adj_r_squared,
        df,
        std_errors,
        t_values,
        p_values,
        covariance,
    })
}

/// 行列の逆行列を計算（ガウス・ジョルダン法、部分ピボット選択）
///
/// ピボットの消失はランク落ちの証拠として`Error::SingularMatrix`を返します。
fn matrix_inverse(matrix: &[Vec<f64>]) -> Result<Vec<Vec<f64>>> {
    let n = matrix.len();

    // 拡張行列 [A | I] を作成
    let mut augmented = Vec::with_capacity(n);
    for i in 0..n {
        let mut row = Vec::with_capacity(2 * n);
        row.extend_from_slice(&matrix[i]);
        for j in 0..n {
            row.push(if i == j { 1.0 } else { 0.0 });
        }
        augmented.push(row);
    }

    for i in 0..n {
        // ピボット選択
        let mut max_row = i;
        let mut max_val = augmented[i][i].abs();
        for j in i + 1..n {
            let abs_val = augmented[j][i].abs();
            if abs_val > max_val {
                max_row = j;
                max_val = abs_val;
            }
        }

        if max_val < PIVOT_TOLERANCE {
            return Err(Error::SingularMatrix("計画行列が列フルランクではありません".into()));
        }

        if max_row != i {
            augmented.swap(i, max_row);
        }

        // ピボット要素を1にする
        let pivot = augmented[i][i];
        for j in 0..2 * n {
            augmented[i][j] /= pivot;
        }

        // 他の行を消去
        for j in 0..n {
            if j != i {
                let factor = augmented[j][i];
                for k in 0..2 * n {
                    augmented[j][k] -= factor * augmented[i][k];
                }
            }
        }
    }

    // 右半分が逆行列
    Ok(augmented
        .into_iter()
        .map(|row| row[n..].to_vec())
        .collect())
}
