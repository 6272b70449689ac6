//! Interactive chat loop over stdin/stdout.

use std::cell::Cell;
use std::io::Write as _;

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::warn;

use qachat_ai::session::export_transcript;
use qachat_ai::{ChatClient, Session};

const WELCOME: &str = "Hello! I'm your Gemini AI assistant. How can I help you today?";

const HELP: &str = "\
Commands:
  /clear           discard the transcript and start over
  /export [path]   write the transcript to a file
  /stats           show session statistics
  /help            show this help
  /quit            exit";

/// One parsed line of user input.
#[derive(Debug, PartialEq, Eq)]
enum Command {
    Quit,
    Clear,
    Export(Option<String>),
    Stats,
    Help,
    Submit(String),
}

/// Classify a line of input. Blank lines are ignored entirely.
fn parse_command(line: &str) -> Option<Command> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    let (head, rest) = match line.split_once(char::is_whitespace) {
        Some((head, rest)) => (head, rest.trim()),
        None => (line, ""),
    };
    match head {
        "/quit" | "/exit" => Some(Command::Quit),
        "/clear" => Some(Command::Clear),
        "/stats" => Some(Command::Stats),
        "/help" => Some(Command::Help),
        "/export" => Some(Command::Export(
            (!rest.is_empty()).then(|| rest.to_string()),
        )),
        _ => Some(Command::Submit(line.to_string())),
    }
}

fn default_export_path() -> String {
    format!("qachat_{}.txt", chrono::Local::now().format("%Y%m%d_%H%M%S"))
}

fn prompt() {
    print!("you> ");
    let _ = std::io::stdout().flush();
}

/// Run the chat loop until EOF or `/quit`.
pub async fn run(session: &mut Session, client: &dyn ChatClient) -> std::io::Result<()> {
    println!("{WELCOME}");
    println!("Type /help for commands.\n");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    prompt();

    while let Some(line) = lines.next_line().await? {
        match parse_command(&line) {
            None => {}
            Some(Command::Quit) => break,
            Some(Command::Clear) => {
                session.reset();
                println!("Transcript cleared.");
            }
            Some(Command::Stats) => {
                println!(
                    "{} messages, {} AI responses, {} minutes this session",
                    session.transcript().len(),
                    session.assistant_count(),
                    session.elapsed().num_minutes()
                );
            }
            Some(Command::Help) => println!("{HELP}"),
            Some(Command::Export(path)) => {
                if session.transcript().is_empty() {
                    println!("No chat history to export.");
                } else {
                    let path = path.unwrap_or_else(default_export_path);
                    match std::fs::write(&path, export_transcript(session.transcript())) {
                        Ok(()) => println!("Transcript written to {path}"),
                        Err(e) => {
                            warn!("Export failed: {e}");
                            println!("Could not write {path}: {e}");
                        }
                    }
                }
            }
            Some(Command::Submit(text)) => {
                print!("bot> ");
                let _ = std::io::stdout().flush();

                let streamed = Cell::new(false);
                let reply = session
                    .chat_streaming(client, &text, |piece| {
                        streamed.set(true);
                        print!("{piece}");
                        let _ = std::io::stdout().flush();
                    })
                    .await;

                match reply {
                    Ok(reply) => {
                        // Degraded replies (fallback or error notice) never
                        // pass through the chunk callback; print them whole.
                        if streamed.get() {
                            println!();
                        } else {
                            println!("{reply}");
                        }
                    }
                    Err(e) => println!("({e})"),
                }
            }
        }
        prompt();
    }

    println!("\nGoodbye!");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_lines_are_ignored() {
        assert_eq!(parse_command(""), None);
        assert_eq!(parse_command("   \t"), None);
    }

    #[test]
    fn commands_are_recognized() {
        assert_eq!(parse_command("/quit"), Some(Command::Quit));
        assert_eq!(parse_command("/exit"), Some(Command::Quit));
        assert_eq!(parse_command("/clear"), Some(Command::Clear));
        assert_eq!(parse_command("/stats"), Some(Command::Stats));
        assert_eq!(parse_command("/help"), Some(Command::Help));
    }

    #[test]
    fn export_takes_an_optional_path() {
        assert_eq!(parse_command("/export"), Some(Command::Export(None)));
        assert_eq!(
            parse_command("/export chat.txt"),
            Some(Command::Export(Some("chat.txt".to_string())))
        );
    }

    #[test]
    fn anything_else_is_a_submission() {
        assert_eq!(
            parse_command("  what is rust?  "),
            Some(Command::Submit("what is rust?".to_string()))
        );
        // Unknown slash-prefixed words go to the model rather than erroring.
        assert_eq!(
            parse_command("/weather"),
            Some(Command::Submit("/weather".to_string()))
        );
    }
}
