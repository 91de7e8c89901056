use std::{
    io,
    path::{Path, PathBuf},
};

use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use itertools::Itertools;

use crate::{
    constants::{BLOCK_STYLE, DAY_NAMES},
    domain::{Block, BlockDraft, BlockId, GroupId, WeekState},
    layout::{BlockLayout, GridConfig, lay_out_day},
    report::{self, WeekSummary},
    storage,
    timecode::{self, Minute},
};

#[derive(Parser, Debug)]
#[command(name = "trellis")]
#[command(about = "Weekly schedule planner with overlap-aware layout", long_about = None)]
pub enum Cli {
    #[command(about = "Add a block to one or more days")]
    Add {
        #[arg(help = "Block title")]
        title: String,

        #[arg(long, short, help = "Existing category name")]
        category: Option<String>,

        #[arg(
            long,
            help = "Create a category as NAME=HEXCOLOR and use it",
            value_name = "NAME=COLOR"
        )]
        new_category: Option<String>,

        #[arg(
            long,
            short,
            required = true,
            help = "Day of week, 0=Mon .. 6=Sun (repeatable)",
            value_parser = clap::value_parser!(u8).range(0..=6)
        )]
        day: Vec<u8>,

        #[arg(long, help = "Start time HH:MM")]
        start: String,

        #[arg(long, help = "End time HH:MM (24:00 allowed)")]
        end: String,

        #[arg(long, help = "Count toward the core work subtotal")]
        core_work: bool,

        #[arg(long, help = "Count toward the alt focus subtotal")]
        alt_focus: bool,

        #[arg(long, help = "Replace every block of this group id")]
        replace: Option<String>,
    },

    #[command(about = "Remove a block or a whole group")]
    Remove {
        #[arg(help = "Block id")]
        id: Option<String>,

        #[arg(long, help = "Remove every block sharing this group id", conflicts_with = "id")]
        group: Option<String>,
    },

    #[command(about = "List blocks")]
    List {
        #[arg(
            long,
            short,
            help = "Limit to one day, 0=Mon .. 6=Sun",
            value_parser = clap::value_parser!(u8).range(0..=6)
        )]
        day: Option<u8>,
    },

    #[command(about = "Render one day's layout as text lanes")]
    Grid {
        #[arg(
            help = "Day of week, 0=Mon .. 6=Sun",
            value_parser = clap::value_parser!(u8).range(0..=6)
        )]
        day: u8,
    },

    #[command(about = "Show weekly hours per category")]
    Summary {
        #[arg(long, value_enum, default_value = "table", help = "Output format")]
        format: SummaryFormat,

        #[arg(long, short, help = "Output path (defaults to stdout)")]
        out: Option<PathBuf>,
    },

    #[command(about = "Manage categories")]
    Categories {
        #[command(subcommand)]
        action: Option<CategoryAction>,
    },

    #[command(about = "Show or change grid settings")]
    Config {
        #[arg(long, help = "First visible hour, 0-23")]
        start_hour: Option<u8>,

        #[arg(long, help = "Last visible hour, 1-24")]
        end_hour: Option<u8>,

        #[arg(long, help = "Weekly work target in hours")]
        work_target: Option<f64>,

        #[arg(long, help = "Vertical zoom in pixels per minute")]
        minute_px: Option<f64>,
    },

    #[command(about = "Export the week state as JSON")]
    Export {
        #[arg(long, short, help = "Output path (defaults to stdout)")]
        out: Option<PathBuf>,
    },

    #[command(about = "Import a week state JSON, replacing the current one")]
    Import {
        #[arg(help = "Input path")]
        path: PathBuf,
    },

    #[command(about = "Delete every block")]
    Clear {
        #[arg(long, help = "Confirm deleting all blocks")]
        yes: bool,
    },

    #[command(about = "Generate shell completions")]
    Completions {
        #[arg(help = "Shell type (bash, zsh, fish)")]
        shell: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum CategoryAction {
    #[command(about = "Add a category")]
    Add {
        name: String,
        #[arg(long, default_value = "#3b82f6", help = "Hex display color")]
        color: String,
    },

    #[command(about = "Remove a category (its blocks keep their label)")]
    Remove { name: String },

    #[command(about = "Change a category color")]
    Recolor { name: String, color: String },
}

#[derive(Debug, Clone, ValueEnum)]
pub enum SummaryFormat {
    Table,
    Csv,
}

#[allow(clippy::too_many_arguments)]
pub fn add_block(
    title: String,
    category: Option<String>,
    new_category: Option<String>,
    days: Vec<u8>,
    start: String,
    end: String,
    core_work: bool,
    alt_focus: bool,
    replace: Option<String>,
) -> Result<(), String> {
    let path = storage::week_path();
    let mut state = storage::load_week(&path);

    let category = resolve_category(&mut state, category, new_category)?;
    let draft = BlockDraft {
        title,
        category,
        days,
        start,
        end,
        core_work,
        alt_focus,
    };

    let replace_group = replace.map(GroupId);
    let count = state
        .apply_draft(&draft, replace_group.as_ref())
        .map_err(|e| e.to_string())?;

    storage::save_week(&path, &state)?;

    match replace_group {
        Some(group) => println!("Replaced group '{}' with {} block(s)", group.0, count),
        None => println!("Added {} block(s) in category '{}'", count, draft.category),
    }
    Ok(())
}

fn resolve_category(
    state: &mut WeekState,
    category: Option<String>,
    new_category: Option<String>,
) -> Result<String, String> {
    if let Some(raw) = new_category {
        let (name, color) = match raw.split_once('=') {
            Some((name, color)) => (name.to_string(), color.to_string()),
            None => (raw, "#3b82f6".to_string()),
        };
        // an existing name (any casing) is simply reused
        state.add_category(&name, &color);
        return Ok(name);
    }

    if let Some(name) = category {
        if !state.category_exists(&name) {
            return Err(format!(
                "Unknown category '{}' (create it with --new-category)",
                name
            ));
        }
        return Ok(name);
    }

    Ok(state
        .categories
        .first()
        .map(|c| c.name.clone())
        .unwrap_or_else(|| "Work".to_string()))
}

pub fn remove(id: Option<String>, group: Option<String>) -> Result<(), String> {
    let path = storage::week_path();
    let mut state = storage::load_week(&path);

    if let Some(raw) = group {
        let group = GroupId(raw);
        let removed = state.remove_group(&group);
        if removed == 0 {
            return Err(format!("No blocks share group '{}'", group.0));
        }
        storage::save_week(&path, &state)?;
        println!("Removed {} block(s)", removed);
        return Ok(());
    }

    let Some(raw) = id else {
        return Err("Pass a block id or --group".to_string());
    };
    let id = BlockId(raw);
    if !state.remove_block(&id) {
        return Err(format!("No block with id '{}'", id.0));
    }
    storage::save_week(&path, &state)?;
    println!("Removed block '{}'", id.0);
    Ok(())
}

pub fn list_blocks(day: Option<u8>) -> Result<(), String> {
    let state = storage::load_week(&storage::week_path());

    let blocks: Vec<&Block> = state
        .blocks
        .iter()
        .filter(|b| day.map_or(true, |d| b.day == d))
        .sorted_by_key(|b| (b.day, b.interval.start, b.id.0.clone()))
        .collect();

    if blocks.is_empty() {
        println!("No blocks.");
        return Ok(());
    }

    let mut current_day = None;
    for block in blocks {
        if current_day != Some(block.day) {
            current_day = Some(block.day);
            println!("{}", DAY_NAMES[block.day as usize]);
        }
        println!("  {}  {}", block.id.0, describe_block(block));
    }
    Ok(())
}

fn describe_block(block: &Block) -> String {
    let title = if block.title.is_empty() {
        &block.category
    } else {
        &block.title
    };
    format!(
        "{}-{}  {} · {}{}{}",
        timecode::format_hhmm(block.interval.start as i32),
        timecode::format_hhmm(block.interval.end as i32),
        title,
        block.category,
        if block.core_work { " · core" } else { "" },
        if block.alt_focus { " · alt" } else { "" },
    )
}

pub fn show_grid(day: u8) -> Result<(), String> {
    let state = storage::load_week(&storage::week_path());
    let day_blocks: Vec<Block> = state.blocks_for_day(day).into_iter().cloned().collect();

    let config = GridConfig::new(
        state.minute_px,
        state.grid_start_minute(),
        BLOCK_STYLE.min_height_px,
    )
    .map_err(|e| e.to_string())?;
    let layouts = lay_out_day(&day_blocks, &config);

    println!("{}", DAY_NAMES[day as usize]);
    for line in render_lanes(
        &day_blocks,
        &layouts,
        state.grid_start_minute(),
        state.grid_end_minute(),
    ) {
        println!("{}", line);
    }

    if day_blocks.is_empty() {
        println!("(no blocks)");
        return Ok(());
    }

    println!();
    for block in day_blocks
        .iter()
        .sorted_by_key(|b| (b.interval.start, b.id.0.clone()))
    {
        let lane = layouts
            .iter()
            .find(|l| l.block_id == block.id)
            .map(|l| format!("lane {}/{}", l.column + 1, l.column_count))
            .unwrap_or_default();
        println!("  {}  {} ({})", block.id.0, describe_block(block), lane);
    }
    Ok(())
}

const LANE_WIDTH: usize = 60;
const SLOT_MINUTES: Minute = 30;

/// Draws half-hour rows; each block occupies the character span its
/// layout fraction maps to, titled on its first row and shaded below.
fn render_lanes(
    day_blocks: &[Block],
    layouts: &[BlockLayout],
    grid_start: Minute,
    grid_end: Minute,
) -> Vec<String> {
    let mut lines = Vec::new();
    let mut slot = grid_start;

    while slot < grid_end {
        let slot_end = (slot + SLOT_MINUTES).min(grid_end);
        let mut row = vec![' '; LANE_WIDTH];

        for block in day_blocks {
            let Some(layout) = layouts.iter().find(|l| l.block_id == block.id) else {
                continue;
            };
            if block.interval.start >= slot_end || block.interval.end <= slot {
                continue;
            }

            let cell_start =
                ((layout.left * LANE_WIDTH as f64).round() as usize).min(LANE_WIDTH - 1);
            let cell_width = ((layout.width * LANE_WIDTH as f64).round() as usize).max(1);
            let cell_end = (cell_start + cell_width).min(LANE_WIDTH);

            if block.interval.start >= slot {
                let title = if block.title.is_empty() {
                    &block.category
                } else {
                    &block.title
                };
                let label = truncate_label(title, cell_end - cell_start);
                let label_len = label.chars().count();
                for (i, ch) in label.chars().enumerate() {
                    row[cell_start + i] = ch;
                }
                for cell in row.iter_mut().take(cell_end).skip(cell_start + label_len) {
                    *cell = '─';
                }
            } else {
                for cell in row.iter_mut().take(cell_end).skip(cell_start) {
                    *cell = '░';
                }
            }
        }

        lines.push(format!(
            "{} │{}│",
            timecode::format_hhmm(slot as i32),
            row.iter().collect::<String>()
        ));
        slot += SLOT_MINUTES;
    }

    lines
}

fn truncate_label(value: &str, max_chars: usize) -> String {
    let count = value.chars().count();
    if count <= max_chars {
        return value.to_string();
    }

    if max_chars <= 3 {
        return value.chars().take(max_chars).collect();
    }

    let prefix: String = value.chars().take(max_chars - 3).collect();
    format!("{}...", prefix)
}

pub fn summary(format: SummaryFormat, out: Option<PathBuf>) -> Result<(), String> {
    let state = storage::load_week(&storage::week_path());
    let summary = report::build_week_summary(&state.blocks);

    match format {
        SummaryFormat::Table => {
            print_summary_table(&state, &summary);
            Ok(())
        }
        SummaryFormat::Csv => match out {
            Some(path) => {
                let writer = csv::Writer::from_path(&path).map_err(|e| e.to_string())?;
                write_summary_csv(writer, &summary)?;
                println!("Wrote {}", path.display());
                Ok(())
            }
            None => write_summary_csv(csv::Writer::from_writer(io::stdout()), &summary),
        },
    }
}

fn format_hours(minutes: u32) -> String {
    format!("{:.1}", minutes as f64 / 60.0)
}

fn print_summary_table(state: &WeekState, summary: &WeekSummary) {
    let name_width = summary
        .rows
        .iter()
        .map(|row| row.category.chars().count())
        .max()
        .unwrap_or(8)
        .max(8);
    let line_width = name_width + 6 * 7 + 7;

    print!("{:<name_width$}", "Category");
    for day in DAY_NAMES {
        print!("{:>6}", day);
    }
    println!("{:>7}", "Week");
    println!("{}", "-".repeat(line_width));

    for row in &summary.rows {
        print!("{:<name_width$}", row.category);
        for minutes in row.minutes_by_day {
            print!("{:>6}", format_hours(minutes));
        }
        println!("{:>7}", format_hours(row.week_minutes));
    }

    println!("{}", "-".repeat(line_width));
    println!(
        "Core work {} h · Alt focus {} h",
        format_hours(summary.core_work_minutes),
        format_hours(summary.alt_focus_minutes)
    );

    let ratio = report::work_completion_ratio(summary.work_minutes, state.work_target_hours);
    println!(
        "Work {} h of {:.1} h target ({:.0}% met)",
        format_hours(summary.work_minutes),
        state.work_target(),
        ratio * 100.0
    );
}

fn write_summary_csv<W: io::Write>(
    mut writer: csv::Writer<W>,
    summary: &WeekSummary,
) -> Result<(), String> {
    let mut header = vec!["Category".to_string()];
    header.extend(DAY_NAMES.iter().map(|d| d.to_string()));
    header.push("Week".to_string());
    writer.write_record(&header).map_err(|e| e.to_string())?;

    for row in &summary.rows {
        let mut record = vec![row.category.clone()];
        record.extend(row.minutes_by_day.iter().map(|&m| format_hours(m)));
        record.push(format_hours(row.week_minutes));
        writer.write_record(&record).map_err(|e| e.to_string())?;
    }

    writer.flush().map_err(|e| e.to_string())
}

pub fn categories(action: Option<CategoryAction>) -> Result<(), String> {
    let path = storage::week_path();
    let mut state = storage::load_week(&path);

    match action {
        None => {
            for category in &state.categories {
                let in_use = state
                    .blocks
                    .iter()
                    .filter(|b| b.category == category.name)
                    .count();
                println!("{}  {}  ({} block(s))", category.color, category.name, in_use);
            }
            Ok(())
        }
        Some(CategoryAction::Add { name, color }) => {
            if !state.add_category(&name, &color) {
                return Err(format!("Category '{}' already exists", name));
            }
            storage::save_week(&path, &state)?;
            println!("Added category '{}'", name);
            Ok(())
        }
        Some(CategoryAction::Remove { name }) => {
            if !state.delete_category(&name) {
                return Err(format!("Category '{}' not found", name));
            }
            storage::save_week(&path, &state)?;
            println!("Removed category '{}' (blocks keep their label)", name);
            Ok(())
        }
        Some(CategoryAction::Recolor { name, color }) => {
            if !state.recolor_category(&name, &color) {
                return Err(format!("Category '{}' not found", name));
            }
            storage::save_week(&path, &state)?;
            println!("Recolored category '{}'", name);
            Ok(())
        }
    }
}

pub fn config(
    start_hour: Option<u8>,
    end_hour: Option<u8>,
    work_target: Option<f64>,
    minute_px: Option<f64>,
) -> Result<(), String> {
    let path = storage::week_path();
    let mut state = storage::load_week(&path);
    let mut changed = false;

    if start_hour.is_some() || end_hour.is_some() {
        let sh = start_hour.unwrap_or(state.start_hour);
        let eh = end_hour.unwrap_or(state.end_hour);
        state.set_hours(sh, eh).map_err(|e| e.to_string())?;
        changed = true;
    }
    if let Some(target) = work_target {
        if target <= 0.0 {
            return Err("Work target must be positive".to_string());
        }
        state.work_target_hours = target;
        changed = true;
    }
    if let Some(px) = minute_px {
        state.set_minute_px(px).map_err(|e| e.to_string())?;
        changed = true;
    }

    if changed {
        storage::save_week(&path, &state)?;
    }

    println!("hours        {:02}:00-{:02}:00", state.start_hour, state.end_hour);
    println!("work target  {:.1} h", state.work_target());
    println!("zoom         {} px/min", state.minute_px);
    Ok(())
}

pub fn export(out: Option<PathBuf>) -> Result<(), String> {
    let state = storage::load_week(&storage::week_path());
    let json = serde_json::to_string_pretty(&storage::week_to_file(&state))
        .map_err(|e| e.to_string())?;

    match out {
        Some(path) => {
            storage::write_text_file(&path, &json)?;
            println!("Exported to {}", path.display());
        }
        None => println!("{}", json),
    }
    Ok(())
}

pub fn import(from: &Path) -> Result<(), String> {
    let state = storage::import_week(from)?;
    let path = storage::week_path();
    storage::save_week(&path, &state)?;
    println!(
        "Imported {} block(s) and {} categor(ies)",
        state.blocks.len(),
        state.categories.len()
    );
    Ok(())
}

pub fn clear(yes: bool) -> Result<(), String> {
    if !yes {
        return Err("This deletes every block; pass --yes to confirm".to_string());
    }
    let path = storage::week_path();
    let mut state = storage::load_week(&path);
    let count = state.blocks.len();
    state.clear_blocks();
    storage::save_week(&path, &state)?;
    println!("Cleared {} block(s)", count);
    Ok(())
}

pub fn print_completions(shell: &str) -> Result<(), String> {
    use clap_complete::Shell;
    match shell {
        "bash" => {
            clap_complete::generate(
                Shell::Bash,
                &mut Cli::command(),
                "trellis",
                &mut io::stdout(),
            );
        }
        "zsh" => {
            clap_complete::generate(Shell::Zsh, &mut Cli::command(), "trellis", &mut io::stdout());
        }
        "fish" => {
            clap_complete::generate(
                Shell::Fish,
                &mut Cli::command(),
                "trellis",
                &mut io::stdout(),
            );
        }
        _ => {
            return Err(format!(
                "Unsupported shell: {}. Use bash, zsh, or fish.",
                shell
            ));
        }
    }
    Ok(())
}

pub fn run_cli() {
    let cli = Cli::parse();
    let result = match cli {
        Cli::Add {
            title,
            category,
            new_category,
            day,
            start,
            end,
            core_work,
            alt_focus,
            replace,
        } => add_block(
            title,
            category,
            new_category,
            day,
            start,
            end,
            core_work,
            alt_focus,
            replace,
        ),
        Cli::Remove { id, group } => remove(id, group),
        Cli::List { day } => list_blocks(day),
        Cli::Grid { day } => show_grid(day),
        Cli::Summary { format, out } => summary(format, out),
        Cli::Categories { action } => categories(action),
        Cli::Config {
            start_hour,
            end_hour,
            work_target,
            minute_px,
        } => config(start_hour, end_hour, work_target, minute_px),
        Cli::Export { out } => export(out),
        Cli::Import { path } => import(&path),
        Cli::Clear { yes } => clear(yes),
        Cli::Completions { shell } => print_completions(&shell),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
