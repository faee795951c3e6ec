mod cli;

use cib_client::api::v2::{
    CibRegistrationRequest, DealerBalanceCheckRequest, DealerCollectionRequest,
    PaymentStatusInquiryRequest,
};
use clap::{Parser, Subcommand};
use cli::{args::Args, op::Op, Call, Endpoints, Init, UniqueId, Version};

command_enum! {
    (Init, Init),
    (Call, Call),
    (CibRegistration, CibRegistrationRequest),
    (DealerBalanceCheck, DealerBalanceCheckRequest),
    (DealerCollection, DealerCollectionRequest),
    (PaymentStatusInquiry, PaymentStatusInquiryRequest),
    (Endpoints, Endpoints),
    (UniqueId, UniqueId),
    (Version, Version),
}

fn main() {
    let args = Args::parse();

    let guards = cib_client::logging::init_logging(args.log_level, args.log_dir.as_deref());

    let ctx = cli::op::OpContext::new(args.config_path, args.environment);

    let code = match args.command.execute(&ctx) {
        Ok(output) => {
            println!("{}", output);
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    };

    // flush buffered log writers before exiting
    drop(guards);
    std::process::exit(code);
}
