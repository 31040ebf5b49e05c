use std::process::ExitCode;

use cage_core::init_logging;

mod app;
mod commands;

fn main() -> ExitCode {
    let app = app::build_cli();
    let matches = app.get_matches();

    // Quiet unless -v/--verbose is given
    let verbose = matches.get_flag("verbose");
    init_logging(!verbose);

    match commands::run_command(&matches) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
