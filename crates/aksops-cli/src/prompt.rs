use std::io::{BufRead, Write};

/// Ask for an explicit typed confirmation on stdin.
///
/// Returns true only when the answer is exactly `yes` — anything else,
/// including EOF, declines. Destructive phases hang off this as their sole
/// safety mechanism, so there is no shorthand `y`.
pub fn confirm(question: &str) -> std::io::Result<bool> {
    print!("{question} [yes/NO]: ");
    std::io::stdout().flush()?;
    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim() == "yes")
}
