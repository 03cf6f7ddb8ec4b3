use thiserror::Error;

/// エラー型の定義
///
/// 統計計算は決定的な入力エラーのみを返します。
/// リトライや暗黙のフォールバックは行わず、呼び出し側が入力を修正します。
#[derive(Error, Debug)]
pub enum Error {
    #[error("データ不足エラー: {0}")]
    InsufficientData(String),

    #[error("無効なパラメータです: {0}")]
    InvalidParameter(String),

    #[error("定義域エラー: {0}")]
    Domain(String),

    #[error("収束エラー: {0}")]
    Convergence(String),

    #[error("次元不一致エラー: {0}")]
    DimensionMismatch(String),

    #[error("特異行列エラー: {0}")]
    SingularMatrix(String),

    #[error("目的変数が退化しています: {0}")]
    DegenerateResponse(String),

    #[error("空データエラー: {0}")]
    EmptyData(String),
}

/// Resultの型エイリアス
pub type Result<T> = std::result::Result<T, Error>;
