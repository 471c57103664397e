//! `shurahub history` -- list logged debates.

use anyhow::{Result, bail};
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;

use shurahub_core::repository::debate::DebateRepository;
use shurahub_types::debate::DebateRecord;

use crate::state::Storage;

const PROMPT_PREVIEW_CHARS: usize = 48;

pub async fn history(storage: &Storage, limit: i64, user: Option<&str>, json: bool) -> Result<()> {
    if limit < 1 {
        bail!("--limit must be at least 1");
    }

    let debates = storage.debates.list_debates(user, limit).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&debates)?);
        return Ok(());
    }

    if debates.is_empty() {
        println!();
        println!(
            "  {} No debates logged yet. Start one with: {}",
            style("i").blue().bold(),
            style("shurahub ask \"...\"").yellow()
        );
        println!();
        return Ok(());
    }

    println!();
    println!("{}", render_table(&debates));
    println!();
    println!(
        "  {} debate{}",
        style(debates.len()).bold(),
        if debates.len() == 1 { "" } else { "s" }
    );
    println!();

    Ok(())
}

fn render_table(debates: &[DebateRecord]) -> Table {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(vec![
        Cell::new("When").fg(Color::White),
        Cell::new("Who").fg(Color::White),
        Cell::new("Question").fg(Color::White),
        Cell::new("Verdict by").fg(Color::White),
        Cell::new("Ratings").fg(Color::White),
    ]);

    for debate in debates {
        table.add_row(vec![
            Cell::new(debate.timestamp.format("%Y-%m-%d %H:%M").to_string()).fg(Color::DarkGrey),
            Cell::new(debate.user_id.as_deref().unwrap_or("-")).fg(Color::Cyan),
            Cell::new(preview(&debate.user_prompt, PROMPT_PREVIEW_CHARS)),
            Cell::new(&debate.synthesizer.model),
            Cell::new(format_ratings(debate)),
        ]);
    }

    table
}

fn preview(text: &str, max_chars: usize) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    match flat.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &flat[..idx]),
        None => flat,
    }
}

fn format_ratings(debate: &DebateRecord) -> String {
    let show = |r: Option<i64>| r.map_or_else(|| "-".to_string(), |v| v.to_string());
    format!(
        "opener {} / final {}",
        show(debate.opener_rating),
        show(debate.final_rating)
    )
}
