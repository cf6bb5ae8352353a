//! Plain stdout output used outside the TUI

use colored::Colorize;

use crate::AppResult;

/// Usage text printed by `parrot manual`
pub fn manual_text() -> Vec<String> {
    vec![
        "Usage: parrot [manual]".to_string(),
        String::new(),
        "Keyboard shortcuts:".to_string(),
        "  Ctrl+T           Create new terminal".to_string(),
        "  Ctrl+W           Close current terminal".to_string(),
        "  Alt+1..9         Switch to terminal 1-9".to_string(),
        "  Alt+= / Alt+-    Next / previous terminal".to_string(),
        "  Alt+H / Alt+V    Split horizontally / vertically".to_string(),
        "  Alt+Arrows       Switch between split panes".to_string(),
        "  Up / Down        Scroll terminal history".to_string(),
        "  Shift+Up/Down    Navigate command history".to_string(),
        "  Ctrl+C / Ctrl+D  Quit".to_string(),
        String::new(),
        "Built-in commands:".to_string(),
        "  stop             Interrupt the running command".to_string(),
        "  manual           Show usage inside a session".to_string(),
        "  exit             Quit Parrot Terminal".to_string(),
        String::new(),
        "Commands typed while another one runs are queued (10 max).".to_string(),
    ]
}

/// Print the usage page with a colored heading
pub fn print_manual() -> AppResult<()> {
    println!(
        "{}",
        format!("Parrot Terminal {}", env!("CARGO_PKG_VERSION"))
            .bright_cyan()
            .bold()
    );
    println!("{}", "=".repeat(40).bright_black());
    for line in manual_text() {
        println!("{}", line);
    }
    Ok(())
}

/// Report an unrecognised positional argument
pub fn print_unknown_command(command: &str) -> AppResult<()> {
    println!("{} {}", "Unknown command:".yellow(), command);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_mentions_builtins() {
        let text = manual_text().join("\n");
        for builtin in ["stop", "manual", "exit"] {
            assert!(text.contains(builtin), "missing {builtin}");
        }
    }
}
