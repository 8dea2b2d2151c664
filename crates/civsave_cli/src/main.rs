use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use civsave_core::core_api::{Engine, Session};
use civsave_core::{ParseOptions, PlayerStatus, Variant};
use civsave_render::{
    FieldSelection, JsonStyle, layout_report, render_json_full, render_json_selected,
    render_layout_json, render_layout_text, render_text_summary, selected_pairs,
};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde_json::Value as JsonValue;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum VariantArg {
    Civ5,
    Civbe,
}

impl From<VariantArg> for Variant {
    fn from(arg: VariantArg) -> Self {
        match arg {
            VariantArg::Civ5 => Variant::Civ5,
            VariantArg::Civbe => Variant::BeyondEarth,
        }
    }
}

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
    #[arg(value_name = "SAVE")]
    path: Option<PathBuf>,
    #[command(flatten)]
    open: OpenArgs,
    #[arg(short, long, global = true)]
    verbose: bool,
    #[arg(long = "show-variant")]
    show_variant: bool,
    #[arg(long = "save-version")]
    save_version: bool,
    #[arg(long = "game-version")]
    game_version: bool,
    #[arg(long = "build-label")]
    build_label: bool,
    #[arg(long)]
    turn: bool,
    #[arg(long = "starting-civ")]
    starting_civilization: bool,
    #[arg(long)]
    handicap: bool,
    #[arg(long = "initial-era")]
    initial_era: bool,
    #[arg(long = "current-era")]
    current_era: bool,
    #[arg(long = "game-speed")]
    game_speed: bool,
    #[arg(long = "world-size")]
    world_size: bool,
    #[arg(long = "map-script")]
    map_script: bool,
    #[arg(long)]
    mods: bool,
    #[arg(long)]
    players: bool,
    #[arg(long = "active-player")]
    active_player: bool,
    #[arg(long)]
    barbarians: bool,
    #[arg(long)]
    json: bool,
    #[arg(long = "set-status", value_name = "SLOT=STATUS", value_parser = parse_status_edit)]
    set_status: Vec<(usize, PlayerStatus)>,
    #[arg(long = "set-name", value_name = "SLOT=TEXT", value_parser = parse_text_edit)]
    set_name: Vec<(usize, String)>,
    #[arg(long = "set-password", value_name = "SLOT=TEXT", value_parser = parse_text_edit)]
    set_password: Vec<(usize, String)>,
    #[arg(long = "set-active-player", value_name = "SLOT")]
    set_active_player: Option<usize>,
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Clone, Args)]
struct OpenArgs {
    /// Fail unless the save is of this variant.
    #[arg(long, value_enum)]
    variant: Option<VariantArg>,
    /// Accept saves whose two status tables disagree.
    #[arg(long = "no-validate")]
    no_validate: bool,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Inspect the raw structure of a save.
    Debug {
        #[command(subcommand)]
        command: DebugCommand,
    },
}

#[derive(Debug, Subcommand)]
enum DebugCommand {
    /// List every chunk with its offset, length and role.
    Layout {
        #[arg(value_name = "SAVE")]
        path: PathBuf,
        #[command(flatten)]
        open: OpenArgs,
        #[arg(long)]
        json: bool,
    },
}

impl Cli {
    fn field_selection(&self) -> FieldSelection {
        FieldSelection {
            variant: self.show_variant,
            save_version: self.save_version,
            game_version: self.game_version,
            build_label: self.build_label,
            turn: self.turn,
            starting_civilization: self.starting_civilization,
            handicap: self.handicap,
            initial_era: self.initial_era,
            current_era: self.current_era,
            game_speed: self.game_speed,
            world_size: self.world_size,
            map_script: self.map_script,
            mods: self.mods,
            players: self.players,
            active_player: self.active_player,
            barbarians: self.barbarians,
        }
    }

    fn has_edits(&self) -> bool {
        !self.set_status.is_empty()
            || !self.set_name.is_empty()
            || !self.set_password.is_empty()
            || self.set_active_player.is_some()
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Some(Command::Debug { command }) = &cli.command {
        run_debug(command);
        return;
    }

    let Some(path) = cli.path.as_deref() else {
        eprintln!("a SAVE path is required");
        process::exit(2);
    };

    let fields = cli.field_selection();
    let has_edits = cli.has_edits();
    if has_edits && cli.output.is_none() {
        eprintln!("--set-* flags require --output <PATH>");
        process::exit(2);
    }
    if !has_edits && cli.output.is_some() {
        eprintln!("--output requires at least one --set-* flag");
        process::exit(2);
    }

    let mut session = open_session(path, &cli.open);

    for &(slot, status) in &cli.set_status {
        session.set_player_status(slot, status).unwrap_or_else(|e| {
            eprintln!("Error applying status edit: {e}");
            process::exit(1);
        });
    }
    for (slot, name) in &cli.set_name {
        session.set_player_display_name(*slot, name).unwrap_or_else(|e| {
            eprintln!("Error applying name edit: {e}");
            process::exit(1);
        });
    }
    for (slot, password) in &cli.set_password {
        session.set_player_password(*slot, password).unwrap_or_else(|e| {
            eprintln!("Error applying password edit: {e}");
            process::exit(1);
        });
    }
    if let Some(slot) = cli.set_active_player {
        session.set_active_player(slot).unwrap_or_else(|e| {
            eprintln!("Error applying active player edit: {e}");
            process::exit(1);
        });
    }

    if let Some(out_path) = cli.output.as_deref() {
        let edited_bytes = session.to_bytes_modified();
        fs::write(out_path, &edited_bytes).unwrap_or_else(|e| {
            eprintln!("Error writing {}: {e}", out_path.display());
            process::exit(1);
        });
        debug!(path = %out_path.display(), len = edited_bytes.len(), "wrote edited save");
    }

    if cli.json {
        let json = if fields.is_any_selected() {
            render_json_selected(&session, &fields, JsonStyle::CanonicalV1)
        } else {
            render_json_full(&session, JsonStyle::CanonicalV1)
        };
        print_json(&json);
        return;
    }

    if fields.is_any_selected() {
        for (key, value) in selected_pairs(&session, &fields) {
            println!("{key}={value}");
        }
        return;
    }

    if let Some(out_path) = cli.output.as_deref() {
        println!("Wrote edited save to {}", out_path.display());
        return;
    }

    match render_text_summary(&session) {
        Ok(summary) => print!("{summary}"),
        Err(e) => {
            eprintln!("Error rendering summary: {e}");
            process::exit(1);
        }
    }
}

fn run_debug(command: &DebugCommand) {
    match command {
        DebugCommand::Layout { path, open, json } => {
            let session = open_session(path, open);
            let report = layout_report(&session);
            if *json {
                print_json(&render_layout_json(&report));
            } else {
                print!("{}", render_layout_text(&report));
            }
        }
    }
}

fn open_session(path: &Path, open: &OpenArgs) -> Session {
    let bytes = fs::read(path).unwrap_or_else(|e| {
        eprintln!("Error reading {}: {e}", path.display());
        process::exit(1);
    });

    let options = if open.no_validate {
        ParseOptions::unvalidated()
    } else {
        ParseOptions::default()
    };

    Engine::with_options(options)
        .open_bytes(bytes, open.variant.map(Variant::from))
        .unwrap_or_else(|e| {
            eprintln!("Error parsing save file: {}", path.display());
            eprintln!("  {e}");
            process::exit(1);
        })
}

fn print_json(json: &JsonValue) {
    let rendered = serde_json::to_string_pretty(json).unwrap_or_else(|e| {
        eprintln!("Error rendering JSON output: {e}");
        process::exit(1);
    });
    println!("{rendered}");
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn split_slot(value: &str) -> Result<(usize, &str), String> {
    let (slot, rest) = value
        .split_once('=')
        .ok_or_else(|| format!("expected SLOT=VALUE, got '{value}'"))?;
    let slot = slot
        .trim()
        .parse::<usize>()
        .map_err(|e| format!("invalid slot index '{slot}': {e}"))?;
    Ok((slot, rest))
}

fn parse_text_edit(value: &str) -> Result<(usize, String), String> {
    let (slot, text) = split_slot(value)?;
    Ok((slot, text.to_string()))
}

fn parse_status_edit(value: &str) -> Result<(usize, PlayerStatus), String> {
    let (slot, status) = split_slot(value)?;
    let status = match status.trim().to_ascii_lowercase().as_str() {
        "alive" | "ai" => PlayerStatus::Alive,
        "dead" => PlayerStatus::Dead,
        "human" => PlayerStatus::Human,
        "absent" => PlayerStatus::Absent,
        other => other
            .parse::<u32>()
            .map(PlayerStatus::from_raw)
            .map_err(|_| {
                format!("invalid status '{other}', expected alive|dead|human|absent or a number")
            })?,
    };
    Ok((slot, status))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_named_and_numeric_status() {
        assert_eq!(parse_status_edit("2=Human"), Ok((2, PlayerStatus::Human)));
        assert_eq!(parse_status_edit("0=ai"), Ok((0, PlayerStatus::Alive)));
        assert_eq!(parse_status_edit("5=9"), Ok((5, PlayerStatus::Unknown(9))));
        assert!(parse_status_edit("x=dead").is_err());
        assert!(parse_status_edit("1=sleeping").is_err());
    }

    #[test]
    fn text_edit_keeps_everything_after_first_equals() {
        assert_eq!(
            parse_text_edit("1=a=b"),
            Ok((1, "a=b".to_string()))
        );
        assert_eq!(parse_text_edit("3="), Ok((3, String::new())));
        assert!(parse_text_edit("nope").is_err());
    }
}
