//! Terminal setup/teardown shared by the interactive views.

use std::io::{self, Stdout};

use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::prelude::*;

use crate::error::TellerError;

pub fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>, TellerError> {
    enable_raw_mode().map_err(|_| TellerError::Terminal("failed to enable raw mode".into()))?;
    io::stdout()
        .execute(EnterAlternateScreen)
        .map_err(|_| TellerError::Terminal("failed to enter alternate screen".into()))?;
    Terminal::new(CrosstermBackend::new(io::stdout()))
        .map_err(|_| TellerError::Terminal("failed to create terminal".into()))
}

/// Restore terminal to normal mode.
pub fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) {
    let _ = terminal.show_cursor();
    let _ = disable_raw_mode();
    let _ = io::stdout().execute(LeaveAlternateScreen);
}
