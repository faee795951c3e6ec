use std::path::PathBuf;

use clap::Args;

use cib_client::config::{ClientConfig, ClientSecret, ConfigError, EnvironmentProfile};

/// Write a template config to fill in
#[derive(Args, Debug, Clone)]
pub struct Init;

#[derive(Debug, thiserror::Error)]
pub enum InitError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
}

fn template_profile(config_dir: &std::path::Path, name: &str) -> EnvironmentProfile {
    EnvironmentProfile {
        client_id: "your-client-id".to_string(),
        client_secret: ClientSecret::from("your-client-secret"),
        public_key_path: config_dir.join(format!("{}_public.cer", name)),
        ca_cert_path: None,
        base_url: None,
    }
}

impl crate::cli::op::Op for Init {
    type Error = InitError;
    type Output = String;

    fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let config_dir: PathBuf = ClientConfig::config_dir(ctx.config_path.clone())?;

        let config = ClientConfig {
            environment: ctx.environment.unwrap_or_default(),
            sandbox: Some(template_profile(&config_dir, "sandbox")),
            live: Some(template_profile(&config_dir, "live")),
            ..ClientConfig::default()
        };
        let path = config.init(Some(config_dir))?;

        Ok(format!(
            "Initialized config at {}\nFill in the credentials and place the counterparty keys next to it.",
            path.display()
        ))
    }
}
