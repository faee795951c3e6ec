use std::fmt;
use std::str::FromStr;

use url::Url;

use super::error::UnknownOperation;
use crate::config::Environment;

pub const SANDBOX_BASE_URL: &str =
    "https://uat-onprem-dmz-hybrid.icicibank.com/apibanking/live/corpapi/v2/cib/";
pub const LIVE_BASE_URL: &str = "https://igateway.icicibank.com/apibanking/live/corpapi/v2/cib/";

/// The fixed set of counterparty operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    CibRegistration,
    DealerBalanceCheck,
    PaymentStatusInquiry,
    DealerCollection,
}

impl Operation {
    pub const ALL: [Operation; 4] = [
        Operation::CibRegistration,
        Operation::DealerBalanceCheck,
        Operation::PaymentStatusInquiry,
        Operation::DealerCollection,
    ];

    /// Name the counterparty documents the operation under
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::CibRegistration => "CIBRegistration",
            Operation::DealerBalanceCheck => "DealerBalanceCheck",
            Operation::PaymentStatusInquiry => "PaymentStatusInquiry",
            Operation::DealerCollection => "DealerCollection",
        }
    }

    /// Path relative to the environment's API base
    pub fn path_suffix(&self) -> &'static str {
        match self {
            Operation::CibRegistration => "Registration",
            Operation::DealerBalanceCheck => "DealerBalanceCheck",
            Operation::PaymentStatusInquiry => "transaction/status",
            Operation::DealerCollection => "DealerCollection",
        }
    }

    pub fn endpoint(&self, environment: Environment) -> Url {
        Endpoints::for_environment(environment).resolve(*self)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operation {
    type Err = UnknownOperation;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Operation::ALL
            .into_iter()
            .find(|op| op.as_str() == s)
            .ok_or_else(|| UnknownOperation(s.to_string()))
    }
}

/// Endpoint URL for an operation given by name
pub fn endpoint(operation: &str, environment: Environment) -> Result<Url, UnknownOperation> {
    Ok(operation.parse::<Operation>()?.endpoint(environment))
}

/// Base URL every operation path is joined onto
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    base: Url,
}

impl Endpoints {
    pub fn for_environment(environment: Environment) -> Self {
        let base = match environment {
            Environment::Sandbox => SANDBOX_BASE_URL,
            Environment::Live => LIVE_BASE_URL,
        };
        Self {
            base: Url::parse(base).expect("hardcoded URL must parse"),
        }
    }

    /// Custom API base (a gateway or a test server)
    ///
    /// Returns `None` for URLs that cannot carry a path. A missing trailing
    /// slash is added so the last path segment survives joining.
    pub fn with_base(mut base: Url) -> Option<Self> {
        if base.cannot_be_a_base() {
            return None;
        }
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Some(Self { base })
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    pub fn resolve(&self, operation: Operation) -> Url {
        self.base
            .join(operation.path_suffix())
            .expect("operation path must join onto a base URL")
    }
}
