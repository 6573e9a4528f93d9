//! Wordfilter service entry point (spec §6): no backend config, no pools —
//! only the CLI and the blocking RPC server loop.

use std::process::ExitCode;

use buzzblog_rpc::server::ServerConfig;
use buzzblog_substrate::CommonArgs;
use buzzblog_wordfilter::WordfilterHandler;
use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "buzzblog-wordfilter", about = "BuzzBlog Wordfilter service")]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,

    /// 0 = empty filter (every word is valid).
    #[arg(long, default_value_t = 0)]
    n_invalid_words: usize,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let _log_guards = buzzblog_substrate::logging::init("wordfilter", cli.common.logging_enabled());
    buzzblog_substrate::shutdown::install("wordfilter");

    let handler = WordfilterHandler::new(cli.n_invalid_words);
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
        n_invalid_words = cli.n_invalid_words,
        "starting wordfilter service"
    );
    if let Err(e) = buzzblog_rpc::server::serve(server_config, handler) {
        tracing::error!(error = %e, "wordfilter service failed to start");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
