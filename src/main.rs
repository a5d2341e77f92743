use awsputlogs::core;
use awsputlogs::status::ExitStatus;

/// Entry point - collects the argument vector and hands it to core::run()
///
/// Returns ExitStatus directly, which implements std::process::Termination.
fn main() -> ExitStatus {
    let args: Vec<String> = std::env::args().collect();
    core::run(args)
}
