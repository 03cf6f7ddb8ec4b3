// inferrs 統計推測エンジン
//
// このクレートは、リサンプリングに基づく推定（ブートストラップ信頼区間、
// 並べ替え検定）、古典的なパラメトリック推測（t検定、多重検定補正）、
// および最小二乗法による線形回帰を提供します。
//
// エンジンの境界はインプロセスの呼び出しインターフェースのみです。
// 数値の系列と構造化されたパラメータを受け取り、数値の結果と構造化された
// レポートを返します。ファイルの読み込み、プロットの描画、環境の管理は
// 行いません（それらは外部の呼び出し側の責務です）。

// 特定の警告を無効化
#![allow(clippy::needless_return)]
#![allow(clippy::redundant_closure)]
#![allow(clippy::manual_range_contains)]

pub mod correction;
pub mod descriptive;
pub mod distributions;
pub mod error;
pub mod inference;
pub mod regression;
pub mod resampling;

// Re-export commonly used types
pub use correction::CorrectionMethod;
pub use descriptive::DescriptiveStats;
pub use distributions::Distribution;
pub use error::{Error, Result};
pub use inference::TTestResult;
pub use regression::LinearModel;
pub use resampling::{BootstrapCi, PermutationTest, ResamplingResult};

// Export version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
