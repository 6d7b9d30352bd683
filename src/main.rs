// Purpose: Binary entry for the jspm-resolve command line.
// Inputs/Outputs: Reads process args and returns process exit code from the CLI dispatcher.
// Invariants: Main must not bypass centralized CLI argument/diagnostic handling.

fn main() {
    jspm_resolve::cli::init_logging();
    let code = jspm_resolve::cli::run_cli(std::env::args().skip(1));
    std::process::exit(code);
}
