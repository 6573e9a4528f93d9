//! Account service entry point (spec §6): CLI wiring, backend config,
//! Postgres pool for its own table, client pools for its three peers
//! (Follow, Like, Post), and the blocking RPC server loop.

use std::process::ExitCode;
use std::sync::Arc;

use buzzblog_account::AccountHandler;
use buzzblog_follow::FollowClient;
use buzzblog_like::LikeClient;
use buzzblog_post::PostClient;
use buzzblog_rpc::exec::Executor;
use buzzblog_rpc::server::ServerConfig;
use buzzblog_rpc::ClientConfig;
use buzzblog_substrate::{db_pool, rpc_pool, BackendConfig, CommonArgs, Fanout, MicroservicePoolArgs, PostgresPoolArgs};
use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "buzzblog-account", about = "BuzzBlog Account service")]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,

    #[command(flatten)]
    postgres: PostgresPoolArgs,

    #[command(flatten)]
    microservice_pool: MicroservicePoolArgs,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let _log_guards = buzzblog_substrate::logging::init("account", cli.common.logging_enabled());
    buzzblog_substrate::shutdown::install("account");

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "account service failed to start");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = BackendConfig::load(&cli.common.backend_filepath)?;

    let db_endpoint = config.database_endpoint("account")?;
    let db = db_pool(
        "account-db",
        db_endpoint,
        buzzblog_pool::PoolConfig {
            min_size: cli.postgres.min_size,
            max_size: cli.postgres.max_size,
            allow_ephemeral: cli.postgres.allow_ephemeral,
        },
        "buzzblog_account",
        cli.postgres.user,
        cli.postgres.password,
    );

    let pool_config = buzzblog_pool::PoolConfig {
        min_size: cli.microservice_pool.min_size,
        max_size: cli.microservice_pool.max_size,
        allow_ephemeral: cli.microservice_pool.allow_ephemeral,
    };

    let follow_endpoints = config.service_endpoints("follow")?;
    let follow_pool = rpc_pool("account-follow", follow_endpoints, pool_config, ClientConfig::default());
    let follow = FollowClient::new(follow_pool);

    let like_endpoints = config.service_endpoints("like")?;
    let like_pool = rpc_pool("account-like", like_endpoints, pool_config, ClientConfig::default());
    let like = LikeClient::new(like_pool);

    let post_endpoints = config.service_endpoints("post")?;
    let post_pool = rpc_pool("account-post", post_endpoints, pool_config, ClientConfig::default());
    let post = PostClient::new(post_pool);

    let fanout = Arc::new(Fanout::new(Arc::new(Executor::new(cli.common.threads))));

    let handler = AccountHandler::new(db, follow, like, post, fanout);
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
        "starting account service"
    );
    buzzblog_rpc::server::serve(server_config, handler)?;
    Ok(())
}
