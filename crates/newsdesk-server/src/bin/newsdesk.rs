//! Interactive console for the newsdesk presenter.
//!
//! Reads questions from stdin, has the avatar answer them, and prints what
//! it says. Requires a running `newsdesk-server` for avatar access tokens.

use newsdesk_auth::{AuthError, Credentials};
use newsdesk_chat::ChatError;
use newsdesk_server::console::{Command, Session, HELP};
use newsdesk_server::{config, telemetry};
use newsdesk_voice::VoiceError;
use std::fmt::Display;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

type Input = Lines<BufReader<Stdin>>;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let (config_path, config_source) = config::resolve_config_path(std::env::args().nth(1));
    let config = config::load_config(Some(config_path.as_str()))?;

    telemetry::init_tracing(&config.logging);
    tracing::info!(
        source = config_source,
        path = %config_path,
        "resolved startup configuration path"
    );

    let session = Session::from_config(&config, newsdesk_voice::default_microphone())?;
    spawn_avatar_watchers(&session);

    println!("{HELP}");
    let mut input = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = input.next_line().await? {
        match Command::parse(&line) {
            Command::Empty => {}
            Command::Ask(text) => ask(&session, text),
            Command::Mic => toggle_mic(&session),
            Command::Interrupt => {
                if let Err(e) = session.avatar.interrupt().await {
                    debug_line(&e);
                }
            }
            Command::End => {
                if let Err(e) = session.avatar.end_session().await {
                    debug_line(&e);
                }
            }
            Command::Login => match prompt_credentials(&mut input).await? {
                Some(credentials) => {
                    session.tokens.set_credentials(credentials);
                    println!("credentials set");
                }
                None => println!("login cancelled"),
            },
            Command::Logout => {
                session.tokens.clear_credentials();
                if let Err(e) = session.tokens.invalidate() {
                    debug_line(&e);
                }
                println!("logged out");
            }
            Command::Reset => {
                session.orchestrator.reset_history();
                println!("history cleared");
            }
            Command::Help => println!("{HELP}"),
            Command::Quit => break,
            Command::Unknown(name) => println!("unknown command /{name}, try /help"),
        }
    }

    session.voice.cancel();
    if session.avatar.is_active() {
        if let Err(e) = session.avatar.end_session().await {
            debug_line(&e);
        }
    }
    Ok(())
}

fn ask(session: &Session, text: String) {
    let orchestrator = session.orchestrator.clone();
    tokio::spawn(async move {
        match orchestrator.ask(&text).await {
            Ok(utterance) => println!("presenter: {}", utterance.text),
            Err(e) => report_chat_error(&e),
        }
    });
}

fn toggle_mic(session: &Session) {
    if !session.voice.is_recording() {
        match session.voice.begin() {
            Ok(()) => println!("recording, /mic again to send"),
            Err(e) => debug_line(&e),
        }
        return;
    }

    let voice = session.voice.clone();
    tokio::spawn(async move {
        match voice.complete().await {
            Ok(utterance) => println!("presenter: {}", utterance.text),
            Err(VoiceError::Chat(e)) => report_chat_error(&e),
            Err(e) => debug_line(&e),
        }
    });
}

fn report_chat_error(error: &ChatError) {
    match error {
        ChatError::EmptyMessage | ChatError::Superseded { .. } => {
            tracing::debug!(error = %error, "turn dropped");
        }
        ChatError::Auth(AuthError::CredentialsRequired) => {
            println!("debug: not logged in, use /login");
        }
        other => debug_line(other),
    }
}

fn debug_line(error: &dyn Display) {
    tracing::warn!(error = %error, "request failed");
    println!("debug: {error}");
}

async fn prompt_credentials(input: &mut Input) -> std::io::Result<Option<Credentials>> {
    println!("email:");
    let Some(email) = input.next_line().await? else {
        return Ok(None);
    };
    println!("password:");
    let Some(password) = input.next_line().await? else {
        return Ok(None);
    };

    let (email, password) = (email.trim(), password.trim());
    if email.is_empty() || password.is_empty() {
        return Ok(None);
    }
    Ok(Some(Credentials::new(email, password)))
}

fn spawn_avatar_watchers(session: &Session) {
    let mut events = session.avatar.subscribe();
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => tracing::info!(event = event.name(), "avatar event"),
                Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::debug!(skipped, "avatar event watcher lagged");
                }
                Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
            }
        }
    });

    let mut streams = session.avatar.watch_stream();
    tokio::spawn(async move {
        while streams.changed().await.is_ok() {
            let current = streams.borrow_and_update().clone();
            match current.as_ref().and_then(|stream| stream.endpoint()) {
                Some(endpoint) => println!("stream ready: {}", endpoint.url),
                None => println!("stream closed"),
            }
        }
    });
}
