use std::process::ExitCode;

fn main() -> ExitCode {
    match crumbtrail_cli::run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(2)
        }
    }
}
