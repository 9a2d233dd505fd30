use parlor::prelude::*;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// Prints chat to stdout. Logs go to stderr so the two don't interleave.
struct Terminal;

impl RenderSink for Terminal {
    fn display_message(&mut self, text: &str, is_self: bool) {
        if is_self {
            println!("  you> {text}");
        } else {
            println!("      {text}");
        }
    }

    fn display_client_id(&mut self, id: &ClientId) {
        println!("* connected as {id}");
        println!("* /join <room>, /rooms, /quit; anything else is sent to the room");
    }

    fn display_error(&mut self, message: &str) {
        println!("! {message}");
    }

    fn display_rooms(&mut self, rooms: &[RoomSummary]) {
        if rooms.is_empty() {
            println!("* no rooms yet");
        }
        for room in rooms {
            println!("* {} ({})", room.name, room.id);
        }
    }
}

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

fn parse_line(line: &str) -> UserAction {
    let line = line.trim_end_matches(['\r', '\n']);
    match line.split_once(' ') {
        Some(("/join", name)) => UserAction::SubmitRoomName(name.to_string()),
        _ => match line {
            "/join" => UserAction::SubmitRoomName(String::new()),
            "/rooms" => UserAction::ListRooms,
            "/quit" => UserAction::Quit,
            text => UserAction::SubmitMessage(text.to_string()),
        },
    }
}

async fn read_stdin(actions: mpsc::Sender<UserAction>) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let action = match lines.next_line().await {
            Ok(Some(line)) => parse_line(&line),
            Ok(None) => UserAction::Quit,
            Err(e) => {
                tracing::warn!(error = %e, "stdin read failed");
                UserAction::Quit
            }
        };
        let quit = action == UserAction::Quit;
        if actions.send(action).await.is_err() || quit {
            break;
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = ClientConfig::from_env()?;
    eprintln!("connecting to {}", config.ws_url);

    let client = ChatClientBuilder::new().config(config).build(Terminal)?;
    let (actions, actions_rx) = mpsc::channel(32);
    tokio::spawn(read_stdin(actions));

    client.run(actions_rx).await?;
    Ok(())
}
