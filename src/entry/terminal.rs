use std::io::Write;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};

use crate::domain::transaction::{TransactionTable, TransactionType};
use crate::errors::{ErrorPolicy, PipelineError};
use crate::messaging::Publisher;

use super::session::EntrySession;
use super::state::{EntryEvent, EntryState};

/// One line of user input, interpreted for the current screen.
#[derive(Debug, Clone, PartialEq)]
pub enum Input {
    Event(EntryEvent),
    Quit,
    Help,
}

/// Leaves the form from either screen. The prefix keeps it apart from any
/// account number.
pub const QUIT_COMMAND: &str = ":quit";

const HELP: &str = "Commands: deposit <amount>, withdraw <amount>, back, :quit";

pub fn parse_input(state: &EntryState, line: &str) -> Input {
    let line = line.trim_end_matches(['\r', '\n']);

    if line.trim() == QUIT_COMMAND {
        return Input::Quit;
    }

    match state {
        // The account number is taken verbatim.
        EntryState::AccountSelection => Input::Event(EntryEvent::SelectAccount(line.to_string())),
        EntryState::TransactionEntry { .. } => {
            let mut parts = line.trim().splitn(2, char::is_whitespace);
            let command = parts.next().unwrap_or_default();
            let amount = parts.next().unwrap_or_default().trim().to_string();

            match command {
                "back" | "b" => Input::Event(EntryEvent::Back),
                "deposit" | "d" => Input::Event(EntryEvent::Submit {
                    direction: TransactionType::Deposit,
                    amount,
                }),
                "withdraw" | "withdrawal" | "w" => Input::Event(EntryEvent::Submit {
                    direction: TransactionType::Withdrawal,
                    amount,
                }),
                _ => Input::Help,
            }
        }
    }
}

pub fn render(state: &EntryState, table: &TransactionTable) -> String {
    match state {
        EntryState::AccountSelection => format!(
            "\n== Account Connection ==\nAccount Number Available : {:?}\nEnter Account Number ({} to leave) :",
            table.accounts(),
            QUIT_COMMAND
        ),
        EntryState::TransactionEntry { account, balance } => format!(
            "\n== Make Transaction ==\nAccount Number : \"{}\"\nCurrent Balance -->> \"{}\"\n\
             Enter Transaction Amount (deposit <amount> | withdraw <amount> | back) :",
            account, balance
        ),
    }
}

/// Drive `session` from stdin until `:quit` or end of input.
pub async fn run_terminal<P: Publisher>(session: &mut EntrySession<P>) -> anyhow::Result<()> {
    run_form(session, BufReader::new(tokio::io::stdin()), std::io::stdout()).await
}

/// Line loop behind `run_terminal`. Only a lost connection ends the form; a
/// submission that fails to send leaves the screen as it was.
pub async fn run_form<P, R, W>(session: &mut EntrySession<P>, input: R, mut output: W) -> anyhow::Result<()>
where
    P: Publisher,
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut lines = input.lines();

    loop {
        writeln!(output, "{}", render(session.state(), session.table()))?;
        output.flush()?;

        let Some(line) = lines.next_line().await? else {
            tracing::info!("Input closed, leaving entry form");
            return Ok(());
        };

        let event = match parse_input(session.state(), &line) {
            Input::Quit => return Ok(()),
            Input::Help => {
                writeln!(output, "{}", HELP)?;
                continue;
            }
            Input::Event(event) => event,
        };

        if let Err(e) = session.dispatch(event).await {
            match e.policy() {
                ErrorPolicy::Ignore => {
                    tracing::debug!(error = %e, "Ignoring input");
                }
                ErrorPolicy::LogAndContinue => {
                    tracing::warn!(error = %e, "Entry step failed");
                }
                ErrorPolicy::Abort if matches!(e, PipelineError::Connectivity(_)) => return Err(e.into()),
                ErrorPolicy::Abort => {
                    tracing::error!(error = %e, "Transaction aborted, nothing was stored");
                    writeln!(output, "Transaction not sent: {}", e)?;
                }
            }
        }
    }
}
