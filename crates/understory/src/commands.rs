//! CLI command implementations

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use forage::{AssetStore, AudioFetcher, GenerationClient};
use glade::{
    AudioOutput, AuditionDeck, Cue, CueEngine, CuePlan, EngineConfig, NullOutput, OutputStream,
    RodioOutput, SessionState,
};
use owo_colors::OwoColorize;
use packrat::{pack_items, variation_file_name, ExportItem, ExportQueue};
use tokio::io::{AsyncBufReadExt, BufReader};
use underconf::UnderstoryConfig;
use underproto::{AudioEvent, SessionManifest};

use crate::{media, render};

/// Load the session manifest or explain how to create one.
pub fn load_manifest(path: &Path) -> Result<SessionManifest> {
    if !path.exists() {
        bail!(
            "no session at {}\n\nRun `understory generate --video <file> --prompt <text>` first.",
            path.display()
        );
    }
    Ok(SessionManifest::load(path)?)
}

/// Audio output for the sound-producing commands. The returned stream must
/// stay alive for as long as anything should be audible.
pub fn make_output(mute: bool) -> Result<(Arc<dyn AudioOutput>, Option<OutputStream>)> {
    if mute {
        Ok((Arc::new(NullOutput), None))
    } else {
        let (output, stream) =
            RodioOutput::open().context("could not open an audio output device")?;
        Ok((Arc::new(output), Some(stream)))
    }
}

fn find_event<'a>(manifest: &'a SessionManifest, name: &str) -> Result<&'a AudioEvent> {
    manifest.event(name).with_context(|| {
        let known: Vec<&str> = manifest.events.iter().map(|e| e.name.as_str()).collect();
        format!(
            "no event named '{}'. Events in this session: {}",
            name,
            known.join(", ")
        )
    })
}

fn variation_url(event: &AudioEvent, index: usize) -> Result<String> {
    event
        .variation(index)
        .map(str::to_string)
        .with_context(|| {
            format!(
                "event '{}' has {} variations, asked for variation {}",
                event.name,
                event.variations.len(),
                index + 1
            )
        })
}

fn engine_config(config: &UnderstoryConfig) -> EngineConfig {
    EngineConfig {
        loop_period: Duration::from_secs_f64(config.playback.loop_period_secs),
    }
}

fn print_completeness(manifest: &SessionManifest) {
    if manifest.all_selected() {
        println!(
            "{}",
            "All events have a selection, the pack is ready to export.".dimmed()
        );
    } else {
        let missing = manifest.selections.missing(&manifest.events);
        println!(
            "{}",
            format!("Still unselected: {}", missing.join(", ")).yellow()
        );
    }
}

/// Poll `stop_now` until it says stop, or until the user presses Enter or
/// Ctrl-C. Closed stdin means "no keyboard", not a stop request.
async fn wait_for_stop(mut stop_now: impl FnMut() -> bool) {
    let mut input = BufReader::new(tokio::io::stdin());
    let mut line = String::new();
    let enter = input.read_line(&mut line);
    tokio::pin!(enter);

    let mut poll = tokio::time::interval(Duration::from_millis(200));
    let mut stdin_done = false;
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            n = &mut enter, if !stdin_done => {
                match n {
                    Ok(0) => stdin_done = true,
                    _ => break,
                }
            }
            _ = poll.tick() => {
                if stop_now() {
                    break;
                }
            }
        }
    }
}

/// Upload a video, run generation, start a session.
pub async fn generate(
    config: &UnderstoryConfig,
    session_path: &Path,
    video: &Path,
    prompt: &str,
) -> Result<()> {
    if prompt.trim().is_empty() {
        bail!("Please provide both a video and a prompt");
    }
    if !video.is_file() {
        bail!("video file not found: {}", video.display());
    }

    let duration_secs = media::probe_duration_secs(video);

    let pb = render::spinner("Uploading video...");
    let store = AssetStore::new(&config.assets.store_url);
    let video_url = store.upload_video(video).await.context("upload failed")?;

    pb.set_message("Generating asset pack...");
    let client = GenerationClient::with_timeout(
        &config.service.generation_url,
        Duration::from_secs(config.service.timeout_secs),
    );
    let events = client
        .request_asset_pack(&video_url, prompt)
        .await
        .context("error processing video")?;
    pb.finish_and_clear();

    let mut manifest = SessionManifest::new(video_url, prompt.to_string(), events);
    manifest.video_path = Some(video.to_path_buf());
    manifest.video_duration_secs = duration_secs;
    manifest.save(session_path)?;

    if manifest.events.is_empty() {
        println!(
            "{}",
            "The service returned no audio events for this video and prompt.".yellow()
        );
    } else {
        println!(
            "{} {} events, first variation of each pre-selected",
            "Generated".bright_green().bold(),
            manifest.events.len()
        );
        println!();
        render::event_table(&manifest);
    }
    println!("\nSession: {}", session_path.display());
    Ok(())
}

/// Print the event table for the current session.
pub fn events(session_path: &Path) -> Result<()> {
    let manifest = load_manifest(session_path)?;
    render::event_table(&manifest);
    Ok(())
}

/// Choose a variation (1-based) for an event.
pub fn select(session_path: &Path, event_name: &str, variation: usize) -> Result<()> {
    let mut manifest = load_manifest(session_path)?;
    let event = find_event(&manifest, event_name)?.clone();
    if variation == 0 {
        bail!("variation numbers start at 1");
    }
    manifest.selections.select(&event, variation - 1)?;
    manifest.save(session_path)?;

    println!(
        "{} variation {} for {}",
        "Selected".bright_green(),
        variation,
        event.name.bright_white()
    );
    print_completeness(&manifest);
    Ok(())
}

/// Clear an event's selection.
pub fn deselect(session_path: &Path, event_name: &str) -> Result<()> {
    let mut manifest = load_manifest(session_path)?;
    find_event(&manifest, event_name)?;
    let removed = manifest.selections.deselect(event_name);
    manifest.save(session_path)?;

    if removed {
        println!("{} {}", "Deselected".yellow(), event_name);
    } else {
        println!("{} had no selection", event_name);
    }
    print_completeness(&manifest);
    Ok(())
}

/// Play one variation on its own, to its natural end or until stopped.
pub async fn audition(
    session_path: &Path,
    event_name: &str,
    variation: Option<usize>,
    mute: bool,
) -> Result<()> {
    let manifest = load_manifest(session_path)?;
    let event = find_event(&manifest, event_name)?.clone();

    let index = match variation {
        Some(0) => bail!("variation numbers start at 1"),
        Some(n) => n - 1,
        None => manifest.selections.chosen_index(&event).with_context(|| {
            format!(
                "'{}' has no selected variation; pass a variation number or run `understory select`",
                event.name
            )
        })?,
    };
    let url = variation_url(&event, index)?;

    let pb = render::spinner("Fetching audio...");
    let audio = AudioFetcher::new()
        .fetch(&url)
        .await
        .context("could not fetch the variation")?;
    pb.finish_and_clear();

    let (output, _stream) = make_output(mute)?;
    let mut deck = AuditionDeck::new(output);
    deck.toggle(&event.name, index, audio)?;

    println!(
        "{} {} variation {} {}",
        "▶".bright_green(),
        event.name.bright_white().bold(),
        index + 1,
        "(Enter or Ctrl-C to stop)".dimmed()
    );
    wait_for_stop(|| deck.playing().is_none()).await;
    deck.stop();
    Ok(())
}

/// The workspace Preview button: the event's chosen audio against the
/// transport window starting at the event's offset.
pub async fn preview(
    config: &UnderstoryConfig,
    session_path: &Path,
    event_name: &str,
    mute: bool,
) -> Result<()> {
    let manifest = load_manifest(session_path)?;
    let event = find_event(&manifest, event_name)?.clone();
    let url = manifest
        .selections
        .chosen(&event.name)
        .context("Please select a variation for this event first")?
        .to_string();

    let pb = render::spinner("Fetching audio...");
    let audio = AudioFetcher::new()
        .fetch(&url)
        .await
        .context("could not fetch the variation")?;
    pb.finish_and_clear();

    let (output, _stream) = make_output(mute)?;
    let engine = CueEngine::new(output, engine_config(config));
    let cue = Cue::for_event(&event, audio);
    let window = cue.duration;
    engine.preview(cue)?;

    println!(
        "{} Preview {} at {:.1}s for {:.1}s {}",
        "▶".bright_green(),
        event.name.bright_white().bold(),
        event.timing.start,
        window.as_secs_f64(),
        "(Enter or Ctrl-C to stop)".dimmed()
    );
    wait_for_stop(|| engine.state() == SessionState::Idle).await;
    engine.stop();
    Ok(())
}

/// The play experience: every cue armed against the transport, loops
/// retriggering, stop on natural end or by hand.
pub async fn play(config: &UnderstoryConfig, session_path: &Path, mute: bool) -> Result<()> {
    let manifest = load_manifest(session_path)?;
    if manifest.events.is_empty() {
        bail!("this session has no audio events; run `understory generate` again");
    }
    if !manifest.all_selected() {
        let missing = manifest.selections.missing(&manifest.events);
        bail!(
            "Please select one variation for each event\n\nStill unselected: {}",
            missing.join(", ")
        );
    }

    // Arm every cue up front so cue timing never waits on the network.
    let fetcher = AudioFetcher::new();
    let pb = render::spinner("Arming cues...");
    let mut cues = Vec::with_capacity(manifest.events.len());
    for event in &manifest.events {
        if let Some(url) = manifest.selections.chosen(&event.name) {
            pb.set_message(format!("Arming {}...", event.name));
            let audio = fetcher
                .fetch(url)
                .await
                .with_context(|| format!("could not fetch audio for '{}'", event.name))?;
            cues.push(Cue::for_event(event, audio));
        }
    }
    pb.finish_and_clear();

    for cue in &cues {
        if cue.kind.is_loop() {
            println!(
                "  🔁 {} from {:.1}s, retriggers every {:.0}s",
                cue.name.bright_white(),
                cue.start.as_secs_f64(),
                config.playback.loop_period_secs
            );
        } else {
            println!(
                "  💥 {} at {:.1}s",
                cue.name.bright_white(),
                cue.start.as_secs_f64()
            );
        }
    }

    let video_duration = manifest.video_duration_secs.map(Duration::from_secs_f64);
    let (output, _stream) = make_output(mute)?;
    let engine = CueEngine::new(output, engine_config(config));
    engine.play(CuePlan {
        cues,
        video_duration,
    })?;

    println!(
        "{} {}",
        "▶ Playing".bright_green().bold(),
        "(Enter or Ctrl-C to stop)".dimmed()
    );

    let bar = render::transport_bar(video_duration.map(|d| d.as_secs()));
    wait_for_stop(|| {
        if engine.state() == SessionState::Idle {
            return true;
        }
        bar.set_position(engine.position().as_secs());
        let active = engine.active_cues();
        if active.is_empty() {
            bar.set_message("");
        } else {
            bar.set_message(active.join(" + "));
        }
        false
    })
    .await;

    let stopped_at = engine.position();
    let natural = engine.state() == SessionState::Idle;
    engine.stop();
    bar.finish_and_clear();

    if natural {
        println!("{}", "⏹ Reached the end of the video".bright_cyan());
    } else {
        println!(
            "{} at {:.1}s",
            "⏹ Stopped".bright_cyan(),
            stopped_at.as_secs_f64()
        );
    }
    Ok(())
}

/// Export every selected variation as a .wav pack.
pub async fn export(
    config: &UnderstoryConfig,
    session_path: &Path,
    out: Option<&Path>,
) -> Result<()> {
    let manifest = load_manifest(session_path)?;
    if manifest.events.is_empty() {
        bail!("this session has no audio events to export");
    }
    if !manifest.all_selected() {
        let missing = manifest.selections.missing(&manifest.events);
        bail!(
            "the pack needs one selected variation per event\n\nStill unselected: {}",
            missing.join(", ")
        );
    }

    let dest = out
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(&config.export.output_dir));
    let items = pack_items(&manifest.events, &manifest.selections);
    let total = items.len();

    let queue = ExportQueue::new(
        AudioFetcher::new(),
        Duration::from_millis(config.export.item_delay_ms),
    );
    let pb = render::pack_bar(total as u64);
    let report = queue
        .run_with(items, &dest, |position, item| {
            pb.set_position(position as u64);
            pb.set_message(item.file_name.clone());
        })
        .await?;
    pb.finish_and_clear();

    for path in &report.saved {
        println!("  {} {}", "✓".bright_green(), path.display());
    }
    for failure in &report.failures {
        println!(
            "  {} {} {}",
            "✗".bright_red(),
            failure.file_name,
            failure.reason.dimmed()
        );
    }

    if report.is_clean() {
        println!(
            "\n{} {} files in {}",
            "📦 Pack ready:".bright_green().bold(),
            report.saved.len(),
            dest.display()
        );
        Ok(())
    } else {
        bail!(
            "{} of {} files failed to export",
            report.failures.len(),
            total
        );
    }
}

/// Download a single variation. No selection gate; any variation goes.
/// One-item run through the export queue, so naming and directory handling
/// match the pack.
pub async fn download(
    config: &UnderstoryConfig,
    session_path: &Path,
    event_name: &str,
    variation: usize,
    out: Option<&Path>,
) -> Result<()> {
    let manifest = load_manifest(session_path)?;
    let event = find_event(&manifest, event_name)?.clone();
    if variation == 0 {
        bail!("variation numbers start at 1");
    }
    let index = variation - 1;
    let url = variation_url(&event, index)?;

    let dest = out
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(&config.export.output_dir));
    let item = ExportItem {
        file_name: variation_file_name(&event.name, index),
        url,
    };

    let pb = render::spinner("Downloading...");
    let queue = ExportQueue::new(AudioFetcher::new(), Duration::ZERO);
    let report = queue.run(vec![item], &dest).await?;
    pb.finish_and_clear();

    if let Some(failure) = report.failures.first() {
        bail!("failed to download audio file: {}", failure.reason);
    }
    for path in &report.saved {
        println!("{} {}", "⬇ Saved".bright_green(), path.display());
    }
    Ok(())
}
