use anyhow::{Context, Result};
use infinite_adventure::save::NoopSaveStore;
use infinite_adventure::{
    Achievement, OpenAiTurnSource, Projection, RestSaveStore, SaveStore, SessionController,
    TurnOutcome, TurnSource, logging,
    settings::Settings,
};
use std::io::{self, BufRead, Write};
use std::sync::Arc;
use strum::IntoEnumIterator;

/// Pure render-layer variation: one state machine underneath, the theme only
/// picks glyphs.
struct Theme {
    heading: &'static str,
    prompt: &'static str,
    flash: &'static str,
    hp_fill: char,
    hp_empty: char,
}

const NEON: Theme = Theme {
    heading: ">>",
    prompt: "»",
    flash: "[!]",
    hp_fill: '█',
    hp_empty: '░',
};

const PARCHMENT: Theme = Theme {
    heading: "##",
    prompt: ">",
    flash: "(!)",
    hp_fill: '#',
    hp_empty: '-',
};

impl Theme {
    fn named(name: &str) -> &'static Theme {
        match name {
            "parchment" => &PARCHMENT,
            _ => &NEON,
        }
    }
}

fn health_bar(hp: u8, theme: &Theme) -> String {
    let filled = (hp as usize).div_ceil(5);
    let bar: String = (0..20)
        .map(|cell| {
            if cell < filled {
                theme.hp_fill
            } else {
                theme.hp_empty
            }
        })
        .collect();
    format!("HP {hp:>3}/100 {bar}")
}

fn render(controller: &SessionController, theme: &Theme) {
    let state = controller.state();
    let Projection::Settled(content) = controller.projection() else {
        return;
    };

    println!();
    println!("{} {}", theme.heading, content.location_name);
    println!("{}", health_bar(state.hp, theme));
    println!(
        "Turn {} | {} achievement(s)",
        state.turn_count,
        state.achievements.len()
    );
    if let Some(reason) = &content.hp_change_reason {
        println!("{} {}", theme.flash, reason);
    }
    if !state.inventory.is_empty() {
        let items: Vec<String> = state
            .inventory
            .iter()
            .enumerate()
            .map(|(i, item)| format!("{}:{item}", i + 1))
            .collect();
        println!("Inventory (use <n>): {}", items.join("  "));
    }
    if !content.choices.is_empty() {
        println!();
        for (i, choice) in content.choices.iter().enumerate() {
            println!("  {}. {} [{}]", i + 1, choice.label, choice.risk);
        }
    }
}

fn render_achievements(controller: &SessionController) {
    for achievement in Achievement::iter() {
        let unlocked = controller.state().achievements.contains(&achievement);
        let marker = if unlocked { "x" } else { " " };
        println!("  [{marker}] {achievement} ({})", achievement.hint());
    }
}

/// Pumps the in-flight turn, streaming the description to the terminal as it
/// arrives and marking damage pulses the moment they fire.
async fn run_turn(controller: &mut SessionController, theme: &Theme) -> Result<()> {
    let mut printed = 0usize;
    let outcome = controller
        .resolve_turn(|update| {
            if update.flashed {
                print!(" {} ", theme.flash);
            }
            if let Some(description) = update.snapshot.description.as_deref() {
                if let Some(suffix) = description.get(printed..) {
                    if !suffix.is_empty() {
                        print!("{suffix}");
                        printed = description.len();
                    }
                }
            }
            io::stdout().flush().ok();
        })
        .await?;
    println!();

    if outcome == TurnOutcome::Failed {
        println!("The connection dropped mid-turn. Type 'retry' to resend your action.");
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = logging::init();

    let settings =
        Settings::load_settings_from_file(Settings::default_path()).unwrap_or_default();
    let api_key = settings
        .openai_api_key
        .clone()
        .or_else(|| std::env::var("OPENAI_API_KEY").ok())
        .context("no OpenAI API key: set OPENAI_API_KEY or add one to settings.json")?;
    if !Settings::validate_api_key(&api_key).await {
        println!("Warning: the API key could not be validated; turns may fail.");
    }

    let source: Arc<dyn TurnSource> = Arc::new(OpenAiTurnSource::new(&api_key, settings.model));
    let store: Arc<dyn SaveStore> = match (&settings.save_store_url, &settings.save_store_key) {
        (Some(url), Some(key)) => Arc::new(RestSaveStore::new(url, key)),
        _ => {
            log::info!("no save store configured, autosave disabled");
            Arc::new(NoopSaveStore)
        }
    };
    let theme = Theme::named(&settings.theme);
    let mut controller = SessionController::new(source, store);

    println!("{} INFINITE ADVENTURE", theme.heading);
    println!(
        "Press Enter to begin. Commands: a choice number, use <n>, achievements, retry, restart, quit."
    );

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    // First Enter starts the story.
    if lines.next().is_none() {
        return Ok(());
    }
    if controller.start().is_ok() {
        run_turn(&mut controller, theme).await?;
    }

    loop {
        render(&controller, theme);

        if controller.is_dead() {
            println!();
            println!("{} TERMINATED. Type 'restart' to play again or 'quit'.", theme.flash);
        }

        print!("{} ", theme.prompt);
        io::stdout().flush()?;
        let Some(line) = lines.next() else {
            return Ok(());
        };
        let input = line?.trim().to_lowercase();

        let submitted = match input.as_str() {
            "quit" | "q" => return Ok(()),
            "achievements" => {
                render_achievements(&controller);
                continue;
            }
            "restart" => {
                controller.restart();
                println!("Memory wiped. A new session begins.");
                controller.start()
            }
            "retry" => controller.retry(),
            _ => {
                if let Some(rest) = input.strip_prefix("use ") {
                    let item = match rest.trim().parse::<usize>() {
                        Ok(n) => n
                            .checked_sub(1)
                            .and_then(|i| controller.state().inventory.get(i).cloned()),
                        Err(_) => Some(rest.trim().to_string()),
                    };
                    match item {
                        Some(item) => controller.use_item(&item),
                        None => {
                            println!("No such item.");
                            continue;
                        }
                    }
                } else if let Ok(n) = input.parse::<usize>() {
                    let label = match controller.projection() {
                        Projection::Settled(content) => content
                            .choices
                            .get(n.wrapping_sub(1))
                            .map(|choice| choice.label.clone()),
                        _ => None,
                    };
                    match label {
                        Some(label) => controller.submit_action(label),
                        None => {
                            println!("No such choice.");
                            continue;
                        }
                    }
                } else {
                    println!("Unrecognized command.");
                    continue;
                }
            }
        };

        match submitted {
            Ok(()) => run_turn(&mut controller, theme).await?,
            Err(e) => println!("{e}"),
        }
    }
}
