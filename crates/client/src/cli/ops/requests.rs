use serde::Serialize;

use cib_client::api::v2::{
    CibRegistrationRequest, DealerBalanceCheckRequest, DealerCollectionRequest,
    PaymentStatusInquiryRequest,
};
use cib_client::api::{ApiError, ApiRequest};

use crate::cli::op::{ContextError, Op, OpContext};

#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    #[error(transparent)]
    Context(#[from] ContextError),
    #[error("API error: {0}")]
    Api(#[from] ApiError),
    #[error("failed to render response: {0}")]
    Render(#[from] serde_json::Error),
}

fn send<R>(request: &R, ctx: &OpContext) -> Result<String, RequestError>
where
    R: ApiRequest,
    R::Response: Serialize,
{
    let client = ctx.client()?;
    let response = client.call(request)?;
    Ok(serde_json::to_string_pretty(&response)?)
}

macro_rules! request_op {
    ($($request:ty),* $(,)?) => {
        $(
            impl Op for $request {
                type Error = RequestError;
                type Output = String;

                fn execute(&self, ctx: &OpContext) -> Result<Self::Output, Self::Error> {
                    send(self, ctx)
                }
            }
        )*
    };
}

request_op!(
    CibRegistrationRequest,
    DealerBalanceCheckRequest,
    DealerCollectionRequest,
    PaymentStatusInquiryRequest,
);
