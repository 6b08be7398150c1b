use crate::error::{AppError, AppResult};
use crate::manager::ThemeManager;
use crate::theme::ThemeMode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Show,
    Toggle,
    Set(ThemeMode),
}

impl Command {
    pub fn parse<I, S>(args: I) -> AppResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let args: Vec<String> = args
            .into_iter()
            .map(|arg| arg.as_ref().to_string())
            .collect();
        let usage = |reason: &str| AppError::Usage {
            reason: reason.to_string(),
        };
        match args.as_slice() {
            [] => Ok(Command::Show),
            [command] if command == "show" => Ok(Command::Show),
            [command] if command == "toggle" => Ok(Command::Toggle),
            [command] if command == "set" => Err(usage("missing mode")),
            [command, mode] if command == "set" => Ok(Command::Set(mode.parse()?)),
            [command, ..] => Err(usage(&format!("unknown command {command:?}"))),
        }
    }
}

/// Runs `command` against `manager` and returns the resulting mode.
pub fn execute(manager: &ThemeManager, command: Command) -> ThemeMode {
    tracing::debug!(?command, "execute command");
    match command {
        Command::Show => {}
        Command::Toggle => manager.toggle(),
        Command::Set(mode) => manager.apply_mode(mode),
    }
    manager.mode()
}
