use std::process::ExitCode;

fn main() -> ExitCode {
    ocfl_audit::cli::run()
}
