use clap::Args;

use cib_client::api::{self, Operation};
use cib_client::config::ConfigError;

/// List the endpoint URL of every operation
#[derive(Args, Debug, Clone)]
pub struct Endpoints;

#[derive(Debug, thiserror::Error)]
pub enum EndpointsError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
}

impl crate::cli::op::Op for Endpoints {
    type Error = EndpointsError;
    type Output = String;

    fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        // A missing config is fine here; a broken one is not
        let config = match ctx.config() {
            Ok(config) => Some(config),
            Err(ConfigError::NotInitialized(_)) => None,
            Err(e) => return Err(e.into()),
        };

        let environment = ctx
            .environment
            .or(config.as_ref().map(|c| c.environment))
            .unwrap_or_default();
        let base_url = config
            .as_ref()
            .and_then(|c| c.profile(environment))
            .and_then(|p| p.base_url.clone());

        let endpoints = match base_url {
            Some(base) => api::Endpoints::with_base(base.clone())
                .ok_or(ConfigError::InvalidBaseUrl(base))?,
            None => api::Endpoints::for_environment(environment),
        };

        let mut lines = vec![format!("{}:", environment)];
        for operation in Operation::ALL {
            lines.push(format!(
                "  {:<22} {}",
                operation.as_str(),
                endpoints.resolve(operation)
            ));
        }
        Ok(lines.join("\n"))
    }
}
