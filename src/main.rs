use hangman::cli::{CliInterface, parse_cli};
use hangman::logging::{default_log_path, init_logging};
use hangman::tui::TuiInterface;
use hangman::{
    GameInterface, GameStateMachine, RandomPicker, Result, WordBank, game_loop,
    load_wordbank_from_file,
};
use std::io;
use std::process::ExitCode;

fn run() -> Result<()> {
    let cli = parse_cli();

    let log_path = cli
        .log_file
        .clone()
        .or_else(|| cli.verbose.then(default_log_path).flatten());
    if let Some(path) = &log_path {
        init_logging(path)?;
    }

    let bank = match &cli.wordbank_path {
        Some(path) => {
            log::info!("Loading word bank from {}", path.display());
            load_wordbank_from_file(path)?
        }
        None => WordBank::embedded()?,
    };
    log::info!("Word bank categories: {:?}", bank.categories());

    let picker = match cli.seed {
        Some(seed) => RandomPicker::seeded(seed),
        None => RandomPicker::from_entropy(),
    };
    let mut machine = GameStateMachine::with_picker(bank, picker);
    if let Some(category) = &cli.category {
        machine.select_category(&category.to_lowercase())?;
    }

    let mut interface: Box<dyn GameInterface> = if cli.plain {
        Box::new(CliInterface::new(io::stdin().lock()))
    } else {
        Box::new(TuiInterface::new()?)
    };

    let result = game_loop(&mut machine, interface.as_mut());
    // Restore the terminal before anything is printed.
    drop(interface);

    let session = machine.session();
    log::info!("Session ended: score {}, lives {}", session.score, session.lives);
    println!("Final score: {}", session.score);
    result
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
