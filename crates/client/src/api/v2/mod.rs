//! Typed requests for the v2 CIB operations
//!
//! Field names on the wire are the counterparty's own (`CORPID`,
//! `TXN_AMOUNT`, ...). Every value travels as a string.

pub mod balance;
pub mod collection;
pub mod registration;
pub mod status;

pub use balance::{BalanceRecord, DealerBalanceCheckRequest, DealerBalanceCheckResponse};
pub use collection::{DealerCollectionRequest, TransactionResponse};
pub use registration::{CibRegistrationRequest, CibRegistrationResponse};
pub use status::PaymentStatusInquiryRequest;
