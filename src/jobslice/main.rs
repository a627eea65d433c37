//! The binary only invokes `cli::run()` and turns errors into an exit code.
//! Everything the user sees is produced in `cli/`.

mod cli;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
