pub mod audio;
pub mod clients;
pub mod config;
pub mod error;
pub mod logging;
pub mod recording;

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use log::{info, warn};
use voiceiq_playback::AudioOutput;

use audio::AudioPlayer;
use clients::VoiceClient;
use config::{ApiConfig, Environment};
use recording::{RecordingNamer, VoicePayload};

pub use error::{format_error_message, Error};

const USAGE: &str = "usage: voiceiq health | ask <file.wav>... [--save-dir <dir>] | play-hex <file>";

/// A parsed command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Health,
    Ask {
        files: Vec<PathBuf>,
        save_dir: Option<PathBuf>,
    },
    PlayHex {
        file: PathBuf,
    },
}

impl Command {
    pub fn parse(args: &[String]) -> Result<Self, Error> {
        let usage = || Error::Usage(USAGE.to_string());
        let (name, rest) = args.split_first().ok_or_else(usage)?;

        match name.as_str() {
            "health" if rest.is_empty() => Ok(Command::Health),
            "ask" => {
                let mut files = Vec::new();
                let mut save_dir = None;
                let mut iter = rest.iter();
                while let Some(arg) = iter.next() {
                    if arg == "--save-dir" {
                        save_dir = Some(PathBuf::from(iter.next().ok_or_else(usage)?));
                    } else {
                        files.push(PathBuf::from(arg));
                    }
                }
                if files.is_empty() {
                    return Err(usage());
                }
                Ok(Command::Ask { files, save_dir })
            }
            "play-hex" if rest.len() == 1 => Ok(Command::PlayHex {
                file: PathBuf::from(&rest[0]),
            }),
            _ => Err(usage()),
        }
    }
}

/// `VOICEIQ_ENV` when set and valid, otherwise derived from the backend host
pub fn environment_from_env(config: &ApiConfig) -> Environment {
    std::env::var("VOICEIQ_ENV")
        .ok()
        .and_then(|value| Environment::from_str(value.trim()).ok())
        .unwrap_or_else(|| Environment::from_url(&config.base_url))
}

#[cfg(feature = "speaker")]
fn default_output() -> Arc<dyn AudioOutput> {
    Arc::new(voiceiq_playback::DeviceOutput)
}

#[cfg(not(feature = "speaker"))]
fn default_output() -> Arc<dyn AudioOutput> {
    Arc::new(voiceiq_playback::DecodeOnlyOutput)
}

/// Entry point for the `voiceiq` binary. `args` excludes the program name.
pub async fn run(args: Vec<String>) -> Result<(), Error> {
    let command = Command::parse(&args)?;

    let config = ApiConfig::from_env();
    let environment = environment_from_env(&config);
    logging::init(environment);
    info!("Using backend {} ({})", config.base_url, environment);

    let client = VoiceClient::new(config);
    let player = AudioPlayer::new(default_output());

    // Ctrl-C silences playback instead of killing the process mid-answer
    {
        let player = player.clone();
        tokio::spawn(async move {
            while tokio::signal::ctrl_c().await.is_ok() {
                player.stop_all();
            }
        });
    }

    match command {
        Command::Health => {
            health(&client).await?;
            println!("Backend is healthy");
            Ok(())
        }
        Command::Ask { files, save_dir } => {
            let mut namer = RecordingNamer::new();
            for file in &files {
                ask(&client, &player, file).await?;
                if let Some(dir) = &save_dir {
                    archive_recording(&mut namer, file, dir)?;
                }
            }
            Ok(())
        }
        Command::PlayHex { file } => {
            let hex = std::fs::read_to_string(&file)?;
            let outcome = player.play_from_hex(hex.trim()).await?;
            println!("Playback {}", outcome.to_string().to_lowercase());
            Ok(())
        }
    }
}

async fn health(client: &VoiceClient) -> Result<(), Error> {
    if client.check_health().await {
        Ok(())
    } else {
        Err(Error::Unhealthy(client.config().base_url.clone()))
    }
}

async fn ask(client: &VoiceClient, player: &AudioPlayer, file: &Path) -> Result<(), Error> {
    let payload = VoicePayload::from_path(file)?;
    let answer = client.ask_voice(payload.bytes()).await?;

    println!("Q: {}", answer.question_voice_text);
    for (model, text) in &answer.answers_text {
        println!("[{}] {}", model, text);
    }

    for (model, hex) in answer.audio_answers() {
        println!("Playing answer from {}", model);
        let result = player
            .play_from_hex_with(hex, |e| warn!("Answer from {} not played: {}", model, e.user_message()))
            .await;
        if let Ok(audio::PlaybackOutcome::Stopped) = result {
            break;
        }
    }

    Ok(())
}

fn archive_recording(namer: &mut RecordingNamer, file: &Path, dir: &Path) -> Result<(), Error> {
    std::fs::create_dir_all(dir)?;
    let label = file.file_stem().and_then(|s| s.to_str());
    let target = dir.join(namer.next_file_name(label));
    std::fs::copy(file, &target)?;
    info!("Saved recording to {:?}", target);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(Command::parse(&args(&["health"])).unwrap(), Command::Health);
        assert_eq!(
            Command::parse(&args(&["ask", "a.wav", "--save-dir", "out", "b.wav"])).unwrap(),
            Command::Ask {
                files: vec![PathBuf::from("a.wav"), PathBuf::from("b.wav")],
                save_dir: Some(PathBuf::from("out")),
            }
        );
        assert_eq!(
            Command::parse(&args(&["play-hex", "answer.hex"])).unwrap(),
            Command::PlayHex {
                file: PathBuf::from("answer.hex")
            }
        );
    }

    #[test]
    fn test_parse_rejects_bad_usage() {
        let test_cases = vec![
            ("no command", args(&[])),
            ("unknown command", args(&["record"])),
            ("ask without files", args(&["ask"])),
            ("save-dir without value", args(&["ask", "a.wav", "--save-dir"])),
            ("health with extra args", args(&["health", "now"])),
            ("play-hex without file", args(&["play-hex"])),
        ];

        for (description, input) in test_cases {
            assert!(
                matches!(Command::parse(&input), Err(Error::Usage(_))),
                "{}",
                description
            );
        }
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_unhealthy() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        drop(listener);
        let client = VoiceClient::new(ApiConfig::with_base_url(base_url.clone()));

        let result = health(&client).await;

        assert!(matches!(result, Err(Error::Unhealthy(url)) if url == base_url));
    }

    #[test]
    fn test_archive_recording_uses_numbered_names() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("question.wav");
        std::fs::write(&source, b"RIFF").unwrap();
        let archive = dir.path().join("archive");

        let mut namer = RecordingNamer::new();
        archive_recording(&mut namer, &source, &archive).unwrap();
        archive_recording(&mut namer, &source, &archive).unwrap();

        let mut names: Vec<_> = std::fs::read_dir(&archive)
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        names.sort();
        assert_eq!(names.len(), 2);
        assert!(names[0].starts_with("question_1_"));
        assert!(names[1].starts_with("question_2_"));
    }
}
