use std::process::ExitCode;

fn main() -> ExitCode {
    match rdispatch::cli::run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
