//! Follow service entry point (spec §6): CLI wiring, backend config, and
//! client-pool construction for its two peers (Uniquepair, Account).

use std::process::ExitCode;
use std::sync::Arc;

use buzzblog_follow::peer_account::PeerAccountClient;
use buzzblog_follow::FollowHandler;
use buzzblog_rpc::exec::Executor;
use buzzblog_rpc::server::ServerConfig;
use buzzblog_rpc::ClientConfig;
use buzzblog_substrate::{rpc_pool, BackendConfig, CommonArgs, Fanout, MicroservicePoolArgs};
use buzzblog_uniquepair::UniquepairClient;
use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "buzzblog-follow", about = "BuzzBlog Follow service")]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,

    #[command(flatten)]
    microservice_pool: MicroservicePoolArgs,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let _log_guards = buzzblog_substrate::logging::init("follow", cli.common.logging_enabled());
    buzzblog_substrate::shutdown::install("follow");

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "follow service failed to start");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = BackendConfig::load(&cli.common.backend_filepath)?;

    let pool_config = buzzblog_pool::PoolConfig {
        min_size: cli.microservice_pool.min_size,
        max_size: cli.microservice_pool.max_size,
        allow_ephemeral: cli.microservice_pool.allow_ephemeral,
    };

    let uniquepair_endpoints = config.service_endpoints("uniquepair")?;
    let uniquepair_pool = rpc_pool(
        "follow-uniquepair",
        uniquepair_endpoints,
        pool_config.clone(),
        ClientConfig::default(),
    );
    let uniquepair = UniquepairClient::new(uniquepair_pool);

    let account_endpoints = config.service_endpoints("account")?;
    let account_pool = rpc_pool("follow-account", account_endpoints, pool_config, ClientConfig::default());
    let account = PeerAccountClient::new(account_pool);

    let fanout = Arc::new(Fanout::new(Arc::new(Executor::new(cli.common.threads))));

    let handler = FollowHandler::new(uniquepair, account, fanout);
    let server_config = ServerConfig {
        host: cli.common.host,
        port: cli.common.port,
        threads: cli.common.threads,
        accept_backlog: cli.common.accept_backlog,
        concurrent_client_limit: cli.common.threads,
    };

    tracing::info!(
        host = %server_config.host,
        port = server_config.port,
        "starting follow service"
    );
    buzzblog_rpc::server::serve(server_config, handler)?;
    Ok(())
}
