use std::io::{self, BufRead, Write};

use hudpack_core::UpdateDecision;

/// Asks whether to apply the update described by `decision`. Anything other
/// than an explicit yes, including end of input, counts as no.
pub(crate) fn prompt_for_update<R: BufRead, W: Write>(
    subject: &str,
    decision: &UpdateDecision,
    input: &mut R,
    output: &mut W,
) -> io::Result<bool> {
    writeln!(output, "An update is available for {subject}.")?;
    writeln!(output, "Current version: {}", decision.current)?;
    writeln!(output, "Latest version: {}", decision.latest)?;
    write!(output, "Install the update? [y/N] ")?;
    output.flush()?;

    let mut answer = String::new();
    if input.read_line(&mut answer)? == 0 {
        writeln!(output)?;
        return Ok(false);
    }
    Ok(parse_yes(&answer))
}

pub(crate) fn parse_yes(answer: &str) -> bool {
    matches!(
        answer.trim().to_ascii_lowercase().as_str(),
        "y" | "yes"
    )
}

/// Decision callback used by the update commands: `--yes` skips the prompt,
/// otherwise the question goes to the terminal.
pub(crate) fn confirm_on_terminal(subject: &str, assume_yes: bool, decision: &UpdateDecision) -> bool {
    if assume_yes {
        return true;
    }

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut output = io::stdout();
    match prompt_for_update(subject, decision, &mut input, &mut output) {
        Ok(answer) => answer,
        Err(err) => {
            tracing::warn!(error = %err, "could not read confirmation; treating as no");
            false
        }
    }
}
