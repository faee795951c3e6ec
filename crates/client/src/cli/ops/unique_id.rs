use clap::Args;

use common::prelude::{unique_id, UNIQUE_ID_LEN};

/// Print a random alphanumeric id, e.g. for a collection's UNIQUE_ID
#[derive(Args, Debug, Clone)]
pub struct UniqueId {
    #[arg(long, default_value_t = UNIQUE_ID_LEN)]
    pub length: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum UniqueIdError {
    #[error("length must be between 1 and {}, got {}", UNIQUE_ID_LEN, .0)]
    InvalidLength(usize),
}

impl crate::cli::op::Op for UniqueId {
    type Error = UniqueIdError;
    type Output = String;

    fn execute(&self, _ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        if self.length == 0 || self.length > UNIQUE_ID_LEN {
            return Err(UniqueIdError::InvalidLength(self.length));
        }
        Ok(unique_id(self.length))
    }
}
