use std::{env, fs, process::ExitCode};

use kyro::{RunFailure, Runner, StdPrint};

/// Exit code for an unhandled guest exception.
const EXIT_GUEST_EXCEPTION: u8 = 1;
/// Exit code for loader and engine faults.
const EXIT_ENGINE_ERROR: u8 = 2;

fn main() -> ExitCode {
    let args: Vec<String> = env::args().collect();
    let Some(file_path) = args.get(1) else {
        eprintln!("usage: kyro <module.kyc>");
        return ExitCode::from(EXIT_ENGINE_ERROR);
    };

    let image = match fs::read(file_path) {
        Ok(image) => image,
        Err(err) => {
            eprintln!("error reading {file_path}: {err}");
            return ExitCode::from(EXIT_ENGINE_ERROR);
        }
    };

    let runner = match Runner::load(&image) {
        Ok(runner) => runner,
        Err(err) => {
            eprintln!("error loading {file_path}: {err}");
            return ExitCode::from(EXIT_ENGINE_ERROR);
        }
    };

    match runner.run(&mut StdPrint) {
        Ok(()) => ExitCode::SUCCESS,
        Err(RunFailure::Exception(exc)) => {
            eprintln!("{exc}");
            ExitCode::from(EXIT_GUEST_EXCEPTION)
        }
        Err(RunFailure::Fatal(fault)) => {
            eprintln!("{fault}");
            ExitCode::from(EXIT_ENGINE_ERROR)
        }
    }
}
