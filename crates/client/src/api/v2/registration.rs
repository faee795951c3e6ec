use serde::{Deserialize, Serialize};

use crate::api::{ApiRequest, Operation};

/// Register a corporate user under an aggregator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, clap::Args)]
pub struct CibRegistrationRequest {
    /// Aggregator name
    #[arg(long)]
    #[serde(rename = "AGGRNAME")]
    pub aggr_name: String,

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

    /// Unique reference number
    #[arg(long)]
    #[serde(rename = "URN")]
    pub urn: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CibRegistrationResponse {
    #[serde(rename = "Message", default)]
    pub message: Option<String>,
    #[serde(rename = "Response", default)]
    pub response: Option<String>,
    #[serde(rename = "CORP_ID", default)]
    pub corp_id: Option<String>,
    #[serde(rename = "USER_ID", default)]
    pub user_id: Option<String>,
    #[serde(rename = "AGGR_ID", default)]
    pub aggr_id: Option<String>,
    #[serde(rename = "AGGR_NAME", default)]
    pub aggr_name: Option<String>,
    #[serde(rename = "URN", default)]
    pub urn: Option<String>,
}

impl ApiRequest for CibRegistrationRequest {
    const OPERATION: Operation = Operation::CibRegistration;
    type Response = CibRegistrationResponse;
}
