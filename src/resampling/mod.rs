// リサンプリング推測モジュール
//
// ブートストラップ信頼区間（復元抽出）と並べ替え検定（非復元抽出・
// ラベルシャッフル）を提供します。レプリケートごとに独立なシードを
// 決定的に導出するため、並列実行しても結果はワーカー数や
// スケジューリングに依存しません。

use crate::descriptive;
use crate::error::{Error, Result};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::Serialize;

/// リサンプリング結果
///
/// レプリケートごとの統計量の系列と、その生成条件のメタデータを保持します。
/// 一度生成された後は変更されません。
#[derive(Debug, Clone, Serialize)]
pub struct ResamplingResult {
    /// レプリケートごとの統計量
    pub replicates: Vec<f64>,
    /// レプリケート数
    pub replicate_count: usize,
    /// 復元抽出かどうか（ブートストラップ: true、並べ替え: false）
    pub with_replacement: bool,
}

/// ブートストラップ信頼区間の結果
#[derive(Debug, Clone, Serialize)]
pub struct BootstrapCi {
    /// 信頼区間の下限
    pub lower: f64,
    /// 信頼区間の上限
    pub upper: f64,
    /// 下側パーセンタイル（例: 2.5）
    pub lower_percentile: f64,
    /// 上側パーセンタイル（例: 97.5）
    pub upper_percentile: f64,
    /// レプリケート分布
    pub result: ResamplingResult,
}

/// 並べ替え検定（平均値の差、両側）の結果
#[derive(Debug, Clone, Serialize)]
pub struct PermutationTest {
    /// 観測された平均値の差（treatment - control）
    pub observed_diff: f64,
    /// カウントに基づくp値（0になり得る）
    ///
    /// 並べ替え分布の中で観測値以上に極端なレプリケートが1つもない場合、
    /// この値は厳密に0になります。その場合の真のp値の下限は
    /// `p_value_floor`（1/レプリケート数）です。
    pub p_value: f64,
    /// p値の下限 1/レプリケート数
    pub p_value_floor: f64,
    /// |並べ替え差| ≥ |観測差| となったレプリケート数
    pub extreme_count: usize,
    /// 両側検定であることの明示（常にtrue）
    pub two_sided: bool,
    /// レプリケート分布（並べ替えごとの平均値の差）
    pub result: ResamplingResult,
}

/// ブートストラップ信頼区間を計算（既定の95%区間: 2.5/97.5パーセンタイル)
///
/// # 説明
/// 元データと同じサイズの復元抽出を`replicate_count`回繰り返し、
/// 各リサンプルに統計量関数を適用した経験分布のパーセンタイル区間を返します。
///
/// シードを省略した場合はOSの乱数から基底シードを取るため、結果は
/// 再現できません。再現性が必要な場合（テストなど）は必ずシードを渡します。
///
/// # 例
/// ```rust
/// use inferrs::resampling;
/// use inferrs::descriptive;
///
/// let data = vec![12.0, 15.0, 11.0, 14.0, 13.0, 16.0, 12.5, 14.5];
/// let ci = resampling::bootstrap_ci(
///     &data,
///     |resample| descriptive::mean(resample).unwrap(),
///     1000,
///     Some(42),
/// )
/// .unwrap();
/// assert!(ci.lower < ci.upper);
/// ```
pub fn bootstrap_ci<T, F>(
    data: T,
    statistic: F,
    replicate_count: usize,
    seed: Option<u64>,
) -> Result<BootstrapCi>
where
    T: AsRef<[f64]>,
    F: Fn(&[f64]) -> f64 + Sync,
{
    bootstrap_ci_with_percentiles(data, statistic, replicate_count, 2.5, 97.5, seed)
}

/// 任意のパーセンタイルでブートストラップ信頼区間を計算
pub fn bootstrap_ci_with_percentiles<T, F>(
    data: T,
    statistic: F,
    replicate_count: usize,
    lower_percentile: f64,
    upper_percentile: f64,
    seed: Option<u64>,
) -> Result<BootstrapCi>
where
    T: AsRef<[f64]>,
    F: Fn(&[f64]) -> f64 + Sync,
{
    let data = data.as_ref();

    if data.is_empty() {
        return Err(Error::InsufficientData("ブートストラップには少なくとも1つのデータが必要です".into()));
    }
    if replicate_count == 0 {
        return Err(Error::InvalidParameter("レプリケート数は正の値である必要があります".into()));
    }
    if !(0.0..=100.0).contains(&lower_percentile)
        || !(0.0..=100.0).contains(&upper_percentile)
        || lower_percentile >= upper_percentile
    {
        return Err(Error::InvalidParameter("パーセンタイルは 0 ≤ 下側 < 上側 ≤ 100 を満たす必要があります".into()));
    }

    let base_seed = resolve_seed(seed);
    let n = data.len();

    // レプリケートは互いに独立なので並列化できる。シードはレプリケート番号から
    // 決定的に導出されるため、実行順序に関わらず結果は同一になる。
    let replicates: Vec<f64> = (0..replicate_count)
        .into_par_iter()
        .map(|i| {
            let mut rng = StdRng::seed_from_u64(replicate_seed(base_seed, i as u64));
            let resample: Vec<f64> = (0..n).map(|_| data[rng.random_range(0..n)]).collect();
            statistic(&resample)
        })
        .collect();

    let mut sorted = replicates.clone();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let lower = descriptive::quantile_sorted(&sorted, lower_percentile / 100.0);
    let upper = descriptive::quantile_sorted(&sorted, upper_percentile / 100.0);

    Ok(BootstrapCi {
        lower,
        upper,
        lower_percentile,
        upper_percentile,
        result: ResamplingResult {
            replicates,
            replicate_count,
            with_replacement: true,
        },
    })
}

/// 平均値の差に対する並べ替え検定（両側）を実行
///
/// # 説明
/// 2標本をプールし、元のグループサイズを保ったままラベルを
/// `replicate_count`回シャッフルして帰無分布を構成します。p値は
/// |並べ替え差| ≥ |観測差| となる割合です（「観測値と同等か、
/// それ以上に極端」の両側定義）。
///
/// 極端なレプリケートが1つもない場合、`p_value`は厳密に0として報告され、
/// `p_value_floor`（1/レプリケート数）が真のp値の下限を与えます。
pub fn permutation_test<T, U>(
    treatment: T,
    control: U,
    replicate_count: usize,
    seed: Option<u64>,
) -> Result<PermutationTest>
where
    T: AsRef<[f64]>,
    U: AsRef<[f64]>,
{
    let treatment = treatment.as_ref();
    let control = control.as_ref();

    if treatment.is_empty() || control.is_empty() {
        return Err(Error::InsufficientData("並べ替え検定には両グループにデータが必要です".into()));
    }
    if replicate_count == 0 {
        return Err(Error::InvalidParameter("レプリケート数は正の値である必要があります".into()));
    }

    let n1 = treatment.len();
    let mean_t = treatment.iter().sum::<f64>() / n1 as f64;
    let mean_c = control.iter().sum::<f64>() / control.len() as f64;
    let observed_diff = mean_t - mean_c;

    let mut pooled = Vec::with_capacity(treatment.len() + control.len());
    pooled.extend_from_slice(treatment);
    pooled.extend_from_slice(control);

    let base_seed = resolve_seed(seed);

    let replicates: Vec<f64> = (0..replicate_count)
        .into_par_iter()
        .map(|i| {
            let mut rng = StdRng::seed_from_u64(replicate_seed(base_seed, i as u64));
            let mut shuffled = pooled.clone();
            // 非復元抽出：ラベルの再割り当てはプール全体のシャッフルと等価
            shuffled.shuffle(&mut rng);
            let perm_mean_t = shuffled[..n1].iter().sum::<f64>() / n1 as f64;
            let perm_mean_c =
                shuffled[n1..].iter().sum::<f64>() / (shuffled.len() - n1) as f64;
            perm_mean_t - perm_mean_c
        })
        .collect();

    let extreme_count = replicates
        .iter()
        .filter(|&&diff| diff.abs() >= observed_diff.abs())
        .count();

    let p_value = extreme_count as f64 / replicate_count as f64;
    let p_value_floor = 1.0 / replicate_count as f64;

    if extreme_count == 0 {
        log::warn!(
            "並べ替え検定のp値が0になりました。真のp値の下限は 1/{} = {} です",
            replicate_count,
            p_value_floor
        );
    }

    Ok(PermutationTest {
        observed_diff,
        p_value,
        p_value_floor,
        extreme_count,
        two_sided: true,
        result: ResamplingResult {
            replicates,
            replicate_count,
            with_replacement: false,
        },
    })
}

/// 基底シードを決定：省略時はOS乱数（再現性なし）
fn resolve_seed(seed: Option<u64>) -> u64 {
    seed.unwrap_or_else(|| rand::rng().random())
}

/// レプリケート番号からサブシードを導出（SplitMix64）
///
/// 単純な加算ではなくステートレスなハッシュを使うことで、
/// 連続するシード間の相関を避けます。
fn replicate_seed(base_seed: u64, counter: u64) -> u64 {
    let mut z = base_seed.wrapping_add(counter.wrapping_mul(0x9e3779b97f4a7c15));
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58476d1ce4e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d049bb133111eb);
    z ^ (z >> 31)
}
