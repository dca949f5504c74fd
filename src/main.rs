use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "talkwire", about = "Live microphone transcription")]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Input device name, overriding the configured one
    #[arg(short, long)]
    device: Option<String>,

    /// List available input devices and exit
    #[arg(long)]
    list_devices: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = talkwire_core::AppConfig::load_from_file(&cli.config)
        .with_context(|| format!("failed to load config from {:?}", cli.config))?;

    let env_filter = EnvFilter::try_new(&config.general.log_level)
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = tracing_subscriber::Registry::default()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(false),
        );

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    tracing::info!("talkwire starting");

    let device_manager = talkwire_audio::DeviceManager::new();

    if cli.list_devices {
        for (name, _) in device_manager
            .list_input_devices()
            .context("failed to enumerate input devices")?
        {
            println!("{name}");
        }
        return Ok(());
    }

    let device_name = cli
        .device
        .as_deref()
        .unwrap_or(config.general.device.as_str())
        .to_string();

    tracing::info!("using input device: {}", device_name);
    let input_device = device_manager
        .get_input_device(&device_name)
        .with_context(|| format!("failed to get input device: {}", device_name))?;

    let registry = talkwire_engine::EngineRegistry::new();
    let provider = talkwire_audio::provider_for(&config.model);

    let mut transcriber = talkwire_audio::Transcriber::new(config, registry, provider)
        .context("failed to create transcriber")?;
    transcriber.set_source(input_device);

    let mut events = transcriber
        .take_event_receiver()
        .context("event receiver already taken")?;

    transcriber
        .start()
        .await
        .context("failed to start transcription")?;

    tracing::info!("listening, press Ctrl-C to stop");

    loop {
        tokio::select! {
            event = events.recv() => {
                match event {
                    Some(talkwire_core::TranscriberEvent::Message { text, is_endpoint }) => {
                        if !text.is_empty() {
                            print!("{text}");
                            use std::io::Write;
                            let _ = std::io::stdout().flush();
                        }
                        if is_endpoint {
                            println!();
                        }
                    }
                    Some(talkwire_core::TranscriberEvent::Sentence { text }) => {
                        tracing::info!("sentence: {}", text);
                    }
                    None => {
                        tracing::warn!("transcription pipeline ended");
                        break;
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => {
                break;
            }
        }
    }

    tracing::info!("shutting down");
    transcriber.stop();
    transcriber.destroy();

    Ok(())
}
