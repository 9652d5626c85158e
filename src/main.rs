use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use gemini_chat::ai::DataUri;
use gemini_chat::app::App;
use gemini_chat::client::api::DEFAULT_SERVER_URL;
use gemini_chat::client::{
    ChatSession, FilePreferenceStore, PlaybackAction, ProxyClient, ThemeSettings, VoicePlayback,
};
use gemini_chat::models::Config;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "gemini-chat")]
#[command(about = "Gemini chat proxy with text-to-speech replies")]
struct CliArgs {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Start the proxy server (default)
    Serve {
        /// Override listen host
        #[arg(long)]
        host: Option<String>,
        /// Override listen port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Chat with a running proxy from the terminal
    Chat {
        /// Proxy base URL
        #[arg(long, default_value = DEFAULT_SERVER_URL)]
        server: String,
        /// Preference file holding the theme choice
        #[arg(long, default_value = "preferences.json")]
        prefs: PathBuf,
        /// Where `/say` writes synthesized audio
        #[arg(long, default_value = "reply.mp3")]
        audio_out: PathBuf,
    },
}

/// One line of terminal input.
#[derive(Debug, PartialEq, Eq)]
enum ChatInput {
    Message(String),
    /// 1-based index into the sample questions; `None` lists them.
    Sample(Option<usize>),
    Image(PathBuf),
    ClearImage,
    Theme,
    Say,
    Stop,
    Quit,
}

fn parse_chat_input(line: &str) -> std::result::Result<ChatInput, String> {
    let line = line.trim();
    let Some(command) = line.strip_prefix('/') else {
        return Ok(ChatInput::Message(line.to_string()));
    };

    let (name, arg) = match command.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (command, ""),
    };

    match name {
        "image" if arg.is_empty() => Err("Usage: /image <path>".to_string()),
        "image" => Ok(ChatInput::Image(PathBuf::from(arg))),
        "sample" if arg.is_empty() => Ok(ChatInput::Sample(None)),
        "sample" => match arg.parse::<usize>() {
            Ok(n) if n > 0 => Ok(ChatInput::Sample(Some(n))),
            _ => Err("Usage: /sample [number]".to_string()),
        },
        "clear-image" => Ok(ChatInput::ClearImage),
        "theme" => Ok(ChatInput::Theme),
        "say" => Ok(ChatInput::Say),
        "stop" => Ok(ChatInput::Stop),
        "quit" | "exit" => Ok(ChatInput::Quit),
        other => Err(format!(
            "Unknown command '/{}'. Try /sample, /image, /clear-image, /theme, /say, /stop or /quit",
            other
        )),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gemini_chat=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = CliArgs::parse();

    match args.command.unwrap_or(Command::Serve {
        host: None,
        port: None,
    }) {
        Command::Serve { host, port } => serve(host, port).await,
        Command::Chat {
            server,
            prefs,
            audio_out,
        } => chat(server, prefs, audio_out).await,
    }
}

async fn serve(host: Option<String>, port: Option<u16>) -> Result<()> {
    let mut config = Config::from_env().context("Failed to load configuration")?;

    if let Some(host) = host {
        config.host = host;
    }
    if let Some(port) = port {
        config.port = port;
    }

    info!("Starting gemini-chat");

    if let Err(e) = App::from_config(config).run().await {
        error!("Server failed: {}", e);
        std::process::exit(1);
    }
    Ok(())
}

async fn chat(server: String, prefs: PathBuf, audio_out: PathBuf) -> Result<()> {
    let client = ProxyClient::new(server);
    let mut session = ChatSession::new();
    let mut theme = ThemeSettings::load(FilePreferenceStore::new(prefs));
    let mut playback = VoicePlayback::new();

    println!(
        "Connected to {} ({} theme). Type a message, or /quit to exit.",
        client.base_url(),
        theme.theme().name.as_str()
    );

    print_samples(&session);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let input = match parse_chat_input(&line) {
            Ok(input) => input,
            Err(usage) => {
                println!("{}", usage);
                continue;
            }
        };

        match input {
            ChatInput::Quit => break,
            ChatInput::Message(text) => {
                session.set_input(text);
                println!("…");
                // Failures are logged by the session; the conversation just gets no reply.
                if let Ok(Some(reply)) = session.submit(&client).await {
                    println!("{}", reply);
                }
            }
            ChatInput::Sample(None) => print_samples(&session),
            ChatInput::Sample(Some(n)) => {
                let Some(question) = session.sample_questions().get(n - 1).copied() else {
                    println!("No sample question {}.", n);
                    continue;
                };
                println!("> {}", question);
                if let Ok(Some(reply)) = session.submit_sample(&client, n - 1).await {
                    println!("{}", reply);
                }
            }
            ChatInput::Image(path) => match tokio::fs::read(&path).await {
                Ok(bytes) => {
                    let uri = DataUri::from_image_bytes(bytes);
                    println!("Attached {} ({})", path.display(), uri.mime_type);
                    session.attach_image(uri.to_uri());
                }
                Err(e) => error!("Could not read image {}: {}", path.display(), e),
            },
            ChatInput::ClearImage => session.clear_image(),
            ChatInput::Theme => match theme.toggle() {
                Ok(current) => println!("Theme: {}", current.name.as_str()),
                Err(e) => error!("Could not save theme preference: {}", e),
            },
            ChatInput::Say => {
                let Some(reply) = session.last_reply().map(|m| m.content.clone()) else {
                    println!("No reply to read yet.");
                    continue;
                };
                match playback.toggle(&client, &reply).await {
                    PlaybackAction::Play(audio) => match tokio::fs::write(&audio_out, &audio).await
                    {
                        Ok(()) => println!("Saved {} bytes of audio to {}", audio.len(), audio_out.display()),
                        Err(e) => {
                            error!("Could not write audio to {}: {}", audio_out.display(), e);
                            playback.finished();
                        }
                    },
                    PlaybackAction::Pause => println!("Playback stopped."),
                    PlaybackAction::Failed => {}
                }
            }
            ChatInput::Stop => playback.finished(),
        }
    }

    Ok(())
}

fn print_samples(session: &ChatSession) {
    let samples = session.sample_questions();
    if samples.is_empty() {
        return;
    }
    println!("Try a sample question with /sample <number>:");
    for (i, question) in samples.iter().enumerate() {
        println!("  {}. {}", i + 1, question);
    }
}
