//! Terminal chat client. Talks only to the proxy, never to the upstream API.
//!
//! Commands: `/new`, `/list`, `/select <n>`, `/quit`. Any other line is sent.

use chat_relay::chat::{sidebar, transcript, ProxyClient, SendOutcome, SessionStore, TranscriptView};
use chat_relay::{telemetry, ClientConfig};
use tokio::io::{AsyncBufReadExt, BufReader};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    telemetry::init_logging("warn,chat_relay=warn")?;

    let config = ClientConfig::from_env()?;
    tracing::debug!("Client configuration: {:?}", config);

    let store = SessionStore::shared();
    let view = TranscriptView::new(ProxyClient::new(&config), store.clone());

    println!("Chat client using proxy {}", config.proxy_url);
    println!("Commands: /new, /list, /select <n>, /quit");
    println!("{}", view.render_selected().await);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim_end();
        match line.split_once(' ').map_or((line, ""), |(cmd, rest)| (cmd, rest.trim())) {
            ("/quit", _) => break,
            ("/new", _) => {
                sidebar::create_session(&mut *store.write().await);
                print!("{}", sidebar::render(&*store.read().await));
            }
            ("/list", _) => print!("{}", sidebar::render(&*store.read().await)),
            ("/select", arg) => {
                let entries = sidebar::entries(&*store.read().await);
                let picked = arg
                    .parse::<usize>()
                    .ok()
                    .and_then(|n| n.checked_sub(1))
                    .and_then(|i| entries.get(i));
                match picked {
                    Some(entry) => {
                        sidebar::select_session(&mut *store.write().await, &entry.id);
                        print!("{}", view.render_selected().await);
                    }
                    None => println!("No chat numbered {:?}", arg),
                }
            }
            _ => {
                view.set_input(line).await;
                match view.send_message().await {
                    SendOutcome::Rejected(reason) => tracing::debug!("Send rejected: {:?}", reason),
                    SendOutcome::Failed => tracing::debug!("Send failed, transcript unchanged"),
                    SendOutcome::Replied => {}
                }
                let store = store.read().await;
                print!("{}", transcript::render(store.selected(), view.is_loading()));
            }
        }
    }

    Ok(())
}
