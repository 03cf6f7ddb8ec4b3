// 多重検定補正モジュール
//
// p値の列に対するBonferroni補正とBenjamini-Hochberg法（FDR制御）を
// 提供します。出力は入力と同じ順序で、調整済みp値は[0, 1]に収められます。

use crate::error::{Error, Result};
use serde::Serialize;

/// 補正方法
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CorrectionMethod {
    /// Bonferroni補正: adjusted_i = min(1, p_i · m)
    Bonferroni,
    /// Benjamini-Hochberg法（FDR制御、ステップアップ手続き）
    BenjaminiHochberg,
}

/// p値の列を多重検定用に調整
///
/// # 説明
/// Benjamini-Hochberg法では昇順ソートした上で
/// adjusted_(k) = min_{j ≥ k} (p_(j) · m / j) を計算し、元の順序に
/// 戻して返します（ソート順での単調性が保証されます）。ランク付けは
/// 内部的なもので、出力の順序は入力と一致します。
///
/// # エラー
/// - 入力が空の場合は`Error::EmptyData`
/// - p値が[0, 1]の外の場合は`Error::Domain`
///
/// # 例
/// ```rust
/// use inferrs::correction::{adjust, CorrectionMethod};
///
/// let p_values = vec![0.01, 0.02, 0.03, 0.04, 0.50];
/// let adjusted = adjust(&p_values, CorrectionMethod::Bonferroni).unwrap();
/// assert_eq!(adjusted, vec![0.05, 0.10, 0.15, 0.20, 1.00]);
/// ```
pub fn adjust(p_values: &[f64], method: CorrectionMethod) -> Result<Vec<f64>> {
    if p_values.is_empty() {
        return Err(Error::EmptyData("補正には少なくとも1つのp値が必要です".into()));
    }
    for &p in p_values {
        if !p.is_finite() || !(0.0..=1.0).contains(&p) {
            return Err(Error::Domain(format!("p値は[0, 1]の範囲である必要があります: {}", p)));
        }
    }

    let m = p_values.len() as f64;

    match method {
        CorrectionMethod::Bonferroni => {
            Ok(p_values.iter().map(|&p| (p * m).min(1.0)).collect())
        }
        CorrectionMethod::BenjaminiHochberg => {
            // 元のインデックスを保持したまま昇順ソート
            let mut indexed: Vec<(usize, f64)> =
                p_values.iter().copied().enumerate().collect();
            indexed.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));

            // 大きい側から累積最小値を取ることで単調性を強制する
            let mut adjusted_sorted = vec![0.0; indexed.len()];
            let mut running_min = 1.0_f64;
            for k in (0..indexed.len()).rev() {
                let rank = (k + 1) as f64;
                running_min = running_min.min(indexed[k].1 * m / rank);
                adjusted_sorted[k] = running_min.clamp(0.0, 1.0);
            }

            // 元の順序に戻す
            let mut adjusted = vec![0.0; indexed.len()];
            for (k, &(original_index, _)) in indexed.iter().enumerate() {
                adjusted[original_index] = adjusted_sorted[k];
            }
            Ok(adjusted)
        }
    }
}
