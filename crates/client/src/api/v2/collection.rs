use common::ids::UNIQUE_ID_LEN;
use serde::{Deserialize, Serialize};

use crate::api::{ApiRequest, Operation};

/// Move funds from a dealer account to the corporate account
///
/// `UNIQUE_ID` is the caller's idempotency key; keep it to query the
/// transaction later with a payment status inquiry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, clap::Args)]
pub struct DealerCollectionRequest {
    /// Corporate id
    #[arg(long)]
    #[serde(rename = "CORPID")]
    pub corp_id: String,

    /// Corporate user id
    #[arg(long)]
    #[serde(rename = "USERID")]
    pub user_id: String,

    /// Dealer account to debit
    #[arg(long)]
    #[serde(rename = "DEBITACCT")]
    pub debit_acct: String,

    /// Account to credit
    #[arg(long)]
    #[serde(rename = "CREDITACCT")]
    pub credit_acct: String,

    /// Amount, as the counterparty expects it (e.g. `1` or `10.50`)
    #[arg(long)]
    #[serde(rename = "TXN_AMOUNT")]
    pub txn_amount: String,

    #[arg(long, default_value = "INR")]
    #[serde(rename = "TXN_CURRENCY")]
    pub txn_currency: String,

    /// Unique reference number
    #[arg(long)]
    #[serde(rename = "URN")]
    pub urn: String,

    /// Aggregator id
    #[arg(long)]
    #[serde(rename = "AGGR_ID")]
    pub aggr_id: String,

    /// Idempotency key (random alphanumeric if omitted)
    #[arg(long, default_value_t = common::ids::unique_id(UNIQUE_ID_LEN), hide_default_value = true)]
    #[serde(rename = "UNIQUE_ID")]
    pub unique_id: String,

    /// Aggregator name
    #[arg(long)]
    #[serde(rename = "AGGR_NAME")]
    pub aggr_name: String,
}

/// Outcome of a collection or a status inquiry
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionResponse {
    #[serde(rename = "REQID", default)]
    pub req_id: Option<String>,
    #[serde(rename = "STATUS", default)]
    pub status: Option<String>,
    #[serde(rename = "UNIQUEID", default)]
    pub unique_id: Option<String>,
    #[serde(rename = "URN", default)]
    pub urn: Option<String>,
    #[serde(rename = "RESPONSE", default)]
    pub response: Option<String>,
}

impl TransactionResponse {
    pub fn is_success(&self) -> bool {
        self.status
            .as_deref()
            .is_some_and(|status| status.eq_ignore_ascii_case("SUCCESS"))
    }
}

impl ApiRequest for DealerCollectionRequest {
    const OPERATION: Operation = Operation::DealerCollection;
    type Response = TransactionResponse;
}
