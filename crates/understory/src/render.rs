//! Terminal output: the landing banner, the event table, progress bars.

use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use underproto::SessionManifest;

const TICK_STRINGS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// The no-subcommand screen.
pub fn landing() {
    println!(
        "{}",
        "🌲 Understory - Game Audio Asset Pack Generator"
            .bright_cyan()
            .bold()
    );
    println!("{}", "━".repeat(60).bright_black());
    println!();
    println!("Transform your environment videos into professional audio asset");
    println!("packs for game development. Describe your game environment, upload");
    println!("a reference video, and generate high-quality loops and emitters");
    println!("with multiple variations. Export complete audio packs ready for");
    println!("Unity, Unreal, or any game engine.");
    println!();
    println!("  🎮 {}", "Game-Ready Assets".bright_white());
    println!("  🎵 {}", "Multiple Variations".bright_white());
    println!("  📦 {}", "Export Audio Packs".bright_white());
    println!();
    println!("{}", "QUICKSTART:".bright_white());
    println!(
        "  {} {}",
        "understory generate".bright_green(),
        "--video clip.mp4 --prompt \"Mystical forest with wind and birds\"".dimmed()
    );
    println!(
        "  {} {}",
        "understory workspace".bright_green(),
        "audition variations, pick favorites".dimmed()
    );
    println!(
        "  {} {}",
        "understory play".bright_green(),
        "hear the whole pack against the timeline".dimmed()
    );
    println!(
        "  {} {}",
        "understory export".bright_green(),
        "write the chosen .wav files to disk".dimmed()
    );
    println!();
    println!("Run {} for all commands.", "understory --help".bright_yellow());
}

/// The `events` listing: every event, its timing, and what is selected.
pub fn event_table(manifest: &SessionManifest) {
    println!("{}", "Audio Events".bright_cyan().bold());
    println!("{}", "━".repeat(60).bright_black());

    for event in &manifest.events {
        let marker = if event.kind.is_loop() { "🔁" } else { "💥" };
        println!(
            "\n{} {} {}",
            marker,
            event.name.bright_green().bold(),
            event.kind.as_str().dimmed()
        );
        println!(
            "   Start: {:.1}s | Duration: {:.1}s",
            event.timing.start,
            event.timing.duration_or_default()
        );
        match manifest.selections.chosen_index(event) {
            Some(index) => println!(
                "   {} variations, {} {}",
                event.variations.len(),
                "✓ selected:".bright_green(),
                format!("variation {}", index + 1).bright_white()
            ),
            None => println!(
                "   {} variations, {}",
                event.variations.len(),
                "no selection".yellow()
            ),
        }
    }

    let chosen = manifest
        .events
        .iter()
        .filter(|event| manifest.selections.chosen_index(event).is_some())
        .count();
    println!();
    if manifest.all_selected() {
        println!(
            "Selections: {}/{} {}",
            chosen,
            manifest.events.len(),
            "✓ ready to export".bright_green()
        );
    } else {
        println!(
            "Selections: {}/{} {}",
            chosen,
            manifest.events.len(),
            "(pack export needs one per event)".yellow()
        );
    }
}

/// Indeterminate spinner for uploads and service calls.
pub fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap()
            .tick_strings(TICK_STRINGS),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(80));
    pb
}

/// Per-item bar for pack export.
pub fn pack_bar(total: u64) -> ProgressBar {
    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.cyan} [{bar:40.green/dim}] {pos}/{len} {msg:.dim}")
            .unwrap()
            .progress_chars("█▓▒░ ")
            .tick_strings(TICK_STRINGS),
    );
    pb.enable_steady_tick(std::time::Duration::from_millis(80));
    pb
}

/// Transport readout for `play`. With a known video length this is a bar in
/// seconds; without one it degrades to elapsed-only.
pub fn transport_bar(total_secs: Option<u64>) -> ProgressBar {
    match total_secs {
        Some(total) => {
            let pb = ProgressBar::new(total);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("{spinner:.cyan} [{bar:40.green/dim}] {pos}s/{len}s {msg:.dim}")
                    .unwrap()
                    .progress_chars("█▓▒░ ")
                    .tick_strings(TICK_STRINGS),
            );
            pb.enable_steady_tick(std::time::Duration::from_millis(80));
            pb
        }
        None => {
            let pb = ProgressBar::new_spinner();
            pb.set_style(
                ProgressStyle::default_spinner()
                    .template("{spinner:.cyan} {pos}s {msg:.dim}")
                    .unwrap()
                    .tick_strings(TICK_STRINGS),
            );
            pb.enable_steady_tick(std::time::Duration::from_millis(80));
            pb
        }
    }
}
