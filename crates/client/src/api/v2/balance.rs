use serde::{Deserialize, Serialize};
use serde_with::{serde_as, OneOrMany};

use crate::api::{ApiRequest, Operation};

/// Balances of the dealer accounts mapped to a corporate user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, clap::Args)]
pub struct DealerBalanceCheckRequest {
    /// Corporate id
    #[arg(long)]
    #[serde(rename = "CORPID")]
    pub corp_id: String,

    /// Corporate user id
    #[arg(long)]
    #[serde(rename = "USERID")]
    pub user_id: String,

    /// Aggregator id
    #[arg(long)]
    #[serde(rename = "AGGRID")]
    pub aggr_id: String,

    /// Aggregator name
    #[arg(long)]
    #[serde(rename = "AGGRNAME")]
    pub aggr_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceRecord {
    #[serde(rename = "AccName", default)]
    pub acc_name: Option<String>,
    #[serde(rename = "NickName", default)]
    pub nick_name: Option<String>,
    #[serde(rename = "AccNum", default)]
    pub acc_num: Option<String>,
    #[serde(rename = "Currency", default)]
    pub currency: Option<String>,
    #[serde(rename = "Balance", default)]
    pub balance: Option<String>,
    #[serde(rename = "AvailableBalance", default)]
    pub available_balance: Option<String>,
}

/// `Record` is a single object for one account and a list for several
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DealerBalanceCheckResponse {
    #[serde_as(as = "OneOrMany<_>")]
    #[serde(rename = "Record", default)]
    pub records: Vec<BalanceRecord>,
    #[serde(rename = "Response", default)]
    pub response: Option<String>,
}

impl ApiRequest for DealerBalanceCheckRequest {
    const OPERATION: Operation = Operation::DealerBalanceCheck;
    type Response = DealerBalanceCheckResponse;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::from_payload;
    use common::prelude::Payload;

    fn record(acc_num: &str) -> Payload {
        [
            ("AccName", "dcd"),
            ("NickName", "smallletters"),
            ("AccNum", acc_num),
            ("Currency", ""),
            ("Balance", "0.00"),
            ("AvailableBalance", "0.00"),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_single_record() {
        let payload: Payload = [("Record", record("ENCR2777")), ("Response", "Success".into())]
            .into_iter()
            .collect();

        let response: DealerBalanceCheckResponse = from_payload(&payload).unwrap();
        assert_eq!(response.records.len(), 1);
        assert_eq!(response.records[0].acc_num.as_deref(), Some("ENCR2777"));
        assert_eq!(response.records[0].currency.as_deref(), Some(""));
        assert_eq!(response.response.as_deref(), Some("Success"));
    }

    #[test]
    fn test_many_records() {
        let records = Payload::List(vec![record("ENCR2777"), record("ENCR2778")]);
        let payload: Payload = [("Record", records)].into_iter().collect();

        let response: DealerBalanceCheckResponse = from_payload(&payload).unwrap();
        let numbers: Vec<_> = response
            .records
            .iter()
            .filter_map(|r| r.acc_num.as_deref())
            .collect();
        assert_eq!(numbers, vec!["ENCR2777", "ENCR2778"]);
        assert_eq!(response.response, None);
    }

    #[test]
    fn test_no_records() {
        let payload: Payload = [("Response", "Failure")].into_iter().collect();
        let response: DealerBalanceCheckResponse = from_payload(&payload).unwrap();
        assert!(response.records.is_empty());
    }
}
