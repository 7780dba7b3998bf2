use serde::{Deserialize, Serialize};

use super::LoanId;

/// コマンド：ISBNで指定した書籍を貸し出す
///
/// 貸出日はコマンドに含めない。ワークフローが当日の日付を設定する。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanBook {
    pub isbn: String,
    pub customer: String,
}

/// コマンド：貸出の返却状態を更新する
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnBook {
    pub loan_id: LoanId,
    pub returned: bool,
}
