//! The interactive workspace: browse events, audition variations, build the
//! selection set, then export or play from the top menu.
//!
//! Every action catches its own failure and prints it; nothing short of a
//! missing session file ends the loop.

use std::path::Path;

use anyhow::{Context, Result};
use dialoguer::{theme::ColorfulTheme, Select};
use forage::AudioFetcher;
use glade::{Audition, AuditionDeck};
use owo_colors::OwoColorize;
use underconf::UnderstoryConfig;
use underproto::SessionManifest;

use crate::commands;

pub async fn run(config: &UnderstoryConfig, session_path: &Path, mute: bool) -> Result<()> {
    let mut manifest = commands::load_manifest(session_path)?;
    let (output, _stream) = commands::make_output(mute)?;
    let mut deck = AuditionDeck::new(output);
    let fetcher = AudioFetcher::new();

    println!("{}", "🌲 Understory Workspace".bright_cyan().bold());
    println!("{}", "━".repeat(60).bright_black());

    loop {
        let chosen = manifest
            .events
            .iter()
            .filter(|event| manifest.selections.chosen_index(event).is_some())
            .count();

        let mut items: Vec<String> = manifest
            .events
            .iter()
            .map(|event| {
                let state = match manifest.selections.chosen_index(event) {
                    Some(index) => format!("variation {}", index + 1),
                    None => "no selection".to_string(),
                };
                format!("{} [{}] - {}", event.name, event.kind.as_str(), state)
            })
            .collect();
        let export_row = items.len();
        items.push(format!("📦 Export pack ({chosen} selected)"));
        let play_row = items.len();
        items.push("🎮 Play experience".to_string());
        let quit_row = items.len();
        items.push("Quit".to_string());

        let pick = Select::with_theme(&ColorfulTheme::default())
            .with_prompt("Audio events")
            .items(&items)
            .default(0)
            .interact()?;

        if pick == quit_row {
            deck.stop();
            return Ok(());
        }
        if pick == export_row {
            deck.stop();
            if let Err(e) = commands::export(config, session_path, None).await {
                eprintln!("{} {:#}", "Error:".bright_red(), e);
            }
            continue;
        }
        if pick == play_row {
            deck.stop();
            if let Err(e) = commands::play(config, session_path, mute).await {
                eprintln!("{} {:#}", "Error:".bright_red(), e);
            }
            continue;
        }

        let name = manifest.events[pick].name.clone();
        event_screen(
            config,
            session_path,
            &mut manifest,
            &mut deck,
            &fetcher,
            &name,
        )
        .await?;
    }
}

/// One event's variations: audition (toggle), select, download.
async fn event_screen(
    config: &UnderstoryConfig,
    session_path: &Path,
    manifest: &mut SessionManifest,
    deck: &mut AuditionDeck,
    fetcher: &AudioFetcher,
    name: &str,
) -> Result<()> {
    loop {
        let event = match manifest.event(name) {
            Some(event) => event.clone(),
            None => return Ok(()),
        };
        let playing = deck.playing().map(|(n, i)| (n.to_string(), i));

        let mut rows: Vec<String> = (0..event.variations.len())
            .map(|index| {
                let mut row = format!("Variation {}", index + 1);
                if manifest.selections.chosen_index(&event) == Some(index) {
                    row.push_str(" ✓ selected");
                }
                if playing
                    .as_ref()
                    .map(|(n, i)| (n.as_str(), *i))
                    == Some((name, index))
                {
                    row.push_str(" ▶ playing");
                }
                row
            })
            .collect();
        let back_row = rows.len();
        rows.push("⬅ Back".to_string());

        let pick = Select::with_theme(&ColorfulTheme::default())
            .with_prompt(format!(
                "{} [{}] Start: {:.1}s | Duration: {:.1}s",
                event.name,
                event.kind.as_str(),
                event.timing.start,
                event.timing.duration_or_default()
            ))
            .items(&rows)
            .default(0)
            .interact()?;
        if pick == back_row {
            return Ok(());
        }

        let actions = ["▶ Audition (toggle)", "✓ Select", "⬇ Download", "⬅ Back"];
        let action = Select::with_theme(&ColorfulTheme::default())
            .with_prompt(format!("Variation {}", pick + 1))
            .items(&actions)
            .default(0)
            .interact()?;

        match action {
            0 => {
                let url = event
                    .variation(pick)
                    .context("variation disappeared from the event")?
                    .to_string();
                match fetcher.fetch(&url).await {
                    Ok(audio) => match deck.toggle(&event.name, pick, audio) {
                        Ok(Audition::Started) => {
                            println!("{} Variation {}", "▶".bright_green(), pick + 1)
                        }
                        Ok(Audition::Stopped) => {
                            println!("{} Variation {}", "⏸".yellow(), pick + 1)
                        }
                        Err(e) => eprintln!("{} {}", "Error:".bright_red(), e),
                    },
                    Err(e) => eprintln!("{} {}", "Error:".bright_red(), e),
                }
            }
            1 => {
                manifest.selections.select(&event, pick)?;
                manifest.save(session_path)?;
                println!(
                    "{} variation {} for {}",
                    "Selected".bright_green(),
                    pick + 1,
                    event.name
                );
            }
            2 => {
                if let Err(e) =
                    commands::download(config, session_path, &event.name, pick + 1, None).await
                {
                    eprintln!("{} {:#}", "Error:".bright_red(), e);
                }
            }
            _ => {}
        }
    }
}
