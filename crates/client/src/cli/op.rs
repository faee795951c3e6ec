use std::error::Error;
use std::path::PathBuf;

use cib_client::api::{ApiClient, TransportError};
use cib_client::config::{BoundConfig, ClientConfig, ConfigError, Environment};

#[derive(Debug, thiserror::Error)]
pub enum ContextError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("failed to set up transport: {0}")]
    Transport(#[from] TransportError),
}

#[derive(Debug, Clone)]
pub struct OpContext {
    /// Optional custom config path (defaults to ~/.cib)
    pub config_path: Option<PathBuf>,
    /// Overrides the environment named in the config
    pub environment: Option<Environment>,
}

impl OpContext {
    pub fn new(config_path: Option<PathBuf>, environment: Option<Environment>) -> Self {
        Self {
            config_path,
            environment,
        }
    }

    pub fn config(&self) -> Result<ClientConfig, ConfigError> {
        ClientConfig::load(self.config_path.clone())
    }

    pub fn bind(&self) -> Result<BoundConfig, ConfigError> {
        self.config()?.bind(self.environment)
    }

    /// Client for the bound environment; only ops that talk to the
    /// counterparty build one
    pub fn client(&self) -> Result<ApiClient, ContextError> {
        Ok(ApiClient::new(self.bind()?)?)
    }
}

pub trait Op: Send + Sync {
    type Error: Error + Send + Sync + 'static;
    type Output;

    fn execute(&self, ctx: &OpContext) -> Result<Self::Output, Self::Error>;
}

#[macro_export]
macro_rules! command_enum {
    ($(($variant:ident, $type:ty)),* $(,)?) => {
        #[derive(Subcommand, Debug, Clone)]
        pub enum Command {
            $($variant($type),)*
        }

        #[derive(Debug)]
        pub enum OpOutput {
            $($variant(<$type as $crate::cli::op::Op>::Output),)*
        }

        #[derive(Debug, thiserror::Error)]
        pub enum OpError {
            $(
                #[error(transparent)]
                $variant(<$type as $crate::cli::op::Op>::Error),
            )*
        }

        impl $crate::cli::op::Op for Command {
            type Output = OpOutput;
            type Error = OpError;

            fn execute(&self, ctx: &$crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
                match self {
                    $(
                        Command::$variant(op) => {
                            op.execute(ctx)
                                .map(OpOutput::$variant)
                                .map_err(OpError::$variant)
                        },
                    )*
                }
            }
        }

        impl std::fmt::Display for OpOutput {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(
                        OpOutput::$variant(output) => write!(f, "{}", output),
                    )*
                }
            }
        }
    };
}
