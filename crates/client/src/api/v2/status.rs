use serde::{Deserialize, Serialize};

use super::collection::TransactionResponse;
use crate::api::{ApiRequest, Operation};

/// Look up a collection by the unique id it was sent with
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, clap::Args)]
pub struct PaymentStatusInquiryRequest {
    /// Aggregator id
    #[arg(long)]
    #[serde(rename = "AGGRID")]
    pub aggr_id: String,

    /// Corporate id
    #[arg(long)]
    #[serde(rename = "CORPID")]
    pub corp_id: String,

    /// Corporate user id
    #[arg(long)]
    #[serde(rename = "USERID")]
    pub user_id: String,

    /// `UNIQUE_ID` of the original dealer collection
    #[arg(long)]
    #[serde(rename = "UNIQUEID")]
    pub unique_id: String,

    /// Unique reference number
    #[arg(long)]
    #[serde(rename = "URN")]
    pub urn: String,
}

impl ApiRequest for PaymentStatusInquiryRequest {
    const OPERATION: Operation = Operation::PaymentStatusInquiry;
    type Response = TransactionResponse;
}
