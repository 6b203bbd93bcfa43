//! Console harness for the chat widget messaging core.
//!
//! Stands in for the presentation layer: reads lines from stdin, forwards
//! them through the client, and re-renders from the conversation store on
//! every change notification.

use tokio::io::AsyncBufReadExt;
use tracing_subscriber::EnvFilter;

use widget::{ChatClient, ChatEvent, ClientConfig, Sender};

#[tokio::main]
async fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("widget=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    let config = ClientConfig::from_env();
    tracing::info!(base_url = %config.base_url, "Starting chat widget console");

    let (events_tx, events_rx) = async_channel::unbounded();
    let client = ChatClient::new(config, events_tx);
    client.open();

    let render_client = client.clone();
    tokio::spawn(async move {
        while let Ok(event) = events_rx.recv().await {
            match event {
                ChatEvent::ConversationUpdated => {
                    let messages = render_client.conversation().messages();
                    if let Some(message) = messages.last() {
                        let who = match message.sender {
                            Sender::User => "you",
                            Sender::Assistant => "aiden",
                        };
                        println!("[{}] {}", who, message.text);
                    }
                }
                ChatEvent::ConnectionChanged(state) => {
                    println!("-- connection: {:?}", state);
                }
                ChatEvent::Composing(true) => println!("-- aiden is typing..."),
                ChatEvent::Composing(false) => {}
            }
        }
    });

    println!("Type a message and press enter. /reset starts over, /quit exits.");

    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let mut lines = stdin.lines();
    while let Ok(Some(line)) = lines.next_line().await {
        match line.trim() {
            "" => continue,
            "/quit" => break,
            "/reset" => client.reset().await,
            text => client.send(text, None).await,
        }
    }

    client.close();
}
