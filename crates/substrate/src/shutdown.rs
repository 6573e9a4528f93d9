//! Graceful shutdown on SIGINT/SIGTERM (supplemented feature, `SPEC_FULL.md`
//! §3 — present in the original's `main()`, dropped by the distillation).

/// Installs a handler that logs the signal and exits with status 0, so the
/// "exit code 0 on clean shutdown" contract (spec §6) is reachable rather
/// than only describable. The blocking accept loop has no in-flight request
/// to drain cleanly, so there is nothing more graceful to do than log and
/// exit.
pub fn install(service_name: &'static str) {
    let service_name = service_name.to_string();
    let result = ctrlc::set_handler(move || {
        tracing::info!(service = %service_name, "received shutdown signal");
        std::process::exit(0);
    });
    if let Err(e) = result {
        tracing::warn!(error = %e, "failed to install signal handler");
    }
}
