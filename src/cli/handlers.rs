use std::path::{Path, PathBuf};

use tracing::debug;

use crate::cli::commands::{
    AddArgs, Cli, ColorArgs, Commands, LabelArgs, NewArgs, PathArg, RmArgs, SearchArgs,
};
use crate::cli::output;
use crate::io::config_io::load_config_or_default;
use crate::io::document_io::{self, DocError};
use crate::model::document::Checklist;
use crate::ops::item_ops::{self, OpError};
use crate::ops::search;
use crate::session::editor::Session;
use crate::session::events::DirtyEvent;
use crate::tree::path::{PathError, TreePath};

/// Error type for CLI command handling
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Doc(#[from] DocError),
    #[error(transparent)]
    Op(#[from] OpError),
    #[error(transparent)]
    Path(#[from] PathError),
    #[error("invalid search pattern: {0}")]
    Pattern(#[from] regex::Error),
    #[error("document already exists: {0} (delete it first)")]
    AlreadyExists(PathBuf),
}

const DEFAULT_FILE: &str = "checklist.json";
const CONFIG_FILE: &str = "trellis.toml";

pub fn dispatch(cli: Cli) -> Result<(), CliError> {
    let file = cli.file.unwrap_or_else(|| PathBuf::from(DEFAULT_FILE));
    match cli.command {
        Commands::New(args) => cmd_new(&file, args, cli.force),
        Commands::Show => cmd_show(&file, cli.json),
        Commands::Add(args) => edit(&file, cli.force, |session| cmd_add(session, args)),
        Commands::Dup(args) => edit(&file, cli.force, |session| {
            select(session, &args.path)?;
            let at = item_ops::duplicate(session)?;
            println!("duplicated into {at}");
            Ok(())
        }),
        Commands::Rm(args) => edit(&file, cli.force, |session| cmd_rm(session, args)),
        Commands::Indent(args) => edit(&file, cli.force, |session| {
            moved(&args, item_ops::move_down_level(reselect(session, &args)?)?)
        }),
        Commands::Outdent(args) => edit(&file, cli.force, |session| {
            moved(&args, item_ops::move_up_level(reselect(session, &args)?)?)
        }),
        Commands::Up(args) => edit(&file, cli.force, |session| {
            moved(&args, item_ops::move_alt_up(reselect(session, &args)?)?)
        }),
        Commands::Down(args) => edit(&file, cli.force, |session| {
            moved(&args, item_ops::move_alt_down(reselect(session, &args)?)?)
        }),
        Commands::Done(args) => edit(&file, cli.force, |session| {
            select(session, &args.path)?;
            let done = item_ops::toggle_done(session)?;
            println!("{} {}", args.path, if done { "done" } else { "not done" });
            Ok(())
        }),
        Commands::Label(args) => edit(&file, cli.force, |session| cmd_label(session, args)),
        Commands::Color(args) => edit(&file, cli.force, |session| cmd_color(session, args)),
        Commands::Search(args) => cmd_search(&file, args, cli.json),
    }
}

// ---------------------------------------------------------------------------
// Session plumbing
// ---------------------------------------------------------------------------

fn open_session(file: &Path) -> Result<Session, CliError> {
    let mut doc = document_io::load_document(file)?;
    let repairs = document_io::migrate(&mut doc);
    let config = load_config_or_default(Path::new(CONFIG_FILE));
    let mut session = Session::new(doc, config);
    if repairs > 0 {
        session.mark_dirty(DirtyEvent::MigrationApplied);
    }
    session.mark_dirty(DirtyEvent::LoadComplete);
    Ok(session)
}

/// Load, edit, and save back if the edit dirtied the document. A failed
/// save leaves the file untouched; the edit was in-memory only and the
/// user retries (with --force after a conflict).
fn edit(
    file: &Path,
    force: bool,
    f: impl FnOnce(&mut Session) -> Result<(), CliError>,
) -> Result<(), CliError> {
    let mut session = open_session(file)?;
    f(&mut session)?;
    if session.is_dirty() {
        document_io::save_document(file, &mut session.doc, force)?;
        session.clear_dirty();
    } else {
        debug!("no changes to save");
    }
    Ok(())
}

fn select<'a>(session: &'a mut Session, path: &str) -> Result<&'a mut Session, CliError> {
    let target: TreePath = path.parse()?;
    session.select(&target)?;
    Ok(session)
}

fn reselect<'a>(session: &'a mut Session, args: &PathArg) -> Result<&'a mut Session, CliError> {
    select(session, &args.path)
}

fn moved(args: &PathArg, now_at: TreePath) -> Result<(), CliError> {
    if args.path == now_at.to_string() {
        println!("{} unchanged", args.path);
    } else {
        println!("{} -> {now_at}", args.path);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

fn cmd_new(file: &Path, args: NewArgs, force: bool) -> Result<(), CliError> {
    if file.exists() && !force {
        return Err(CliError::AlreadyExists(file.to_path_buf()));
    }
    let mut doc = Checklist::new(args.list_type);
    document_io::migrate(&mut doc);
    document_io::save_document(file, &mut doc, true)?;
    println!("created {}", file.display());
    Ok(())
}

fn cmd_show(file: &Path, json: bool) -> Result<(), CliError> {
    let mut session = open_session(file)?;
    session.mark_dirty(DirtyEvent::RefreshView);
    if json {
        let outline = output::OutlineJson::from_doc(&session.doc);
        println!(
            "{}",
            serde_json::to_string_pretty(&outline).map_err(DocError::Serialize)?
        );
    } else {
        print!(
            "{}",
            output::render_outline(&session.doc, session.config.ui.show_done)
        );
    }
    Ok(())
}

fn cmd_add(session: &mut Session, args: AddArgs) -> Result<(), CliError> {
    let at = if args.chapter {
        item_ops::new_chapter(session, &args.label)?
    } else {
        match &args.at {
            Some(path) => {
                select(session, path)?;
                if args.sub {
                    item_ops::add_sub_level(session, &args.label)?
                } else {
                    item_ops::add_same_level(session, &args.label)?
                }
            }
            None => item_ops::new_item(session, &args.label)?,
        }
    };
    println!("added {at}");
    Ok(())
}

fn cmd_rm(session: &mut Session, args: RmArgs) -> Result<(), CliError> {
    select(session, &args.path)?;
    item_ops::delete(session, args.yes)?;
    println!("deleted {}", args.path);
    Ok(())
}

fn cmd_label(session: &mut Session, args: LabelArgs) -> Result<(), CliError> {
    select(session, &args.path)?;
    item_ops::rename(session, &args.text)?;
    Ok(())
}

fn cmd_color(session: &mut Session, args: ColorArgs) -> Result<(), CliError> {
    select(session, &args.path)?;
    item_ops::set_color(session, args.color)?;
    Ok(())
}

fn cmd_search(file: &Path, args: SearchArgs, json: bool) -> Result<(), CliError> {
    let mut session = open_session(file)?;
    if args.select {
        match search::select_first_match(&mut session, &args.pattern)? {
            Some(path) => println!("{path}"),
            None => println!("no match"),
        }
        return Ok(());
    }
    let hits = search::search(&session.doc, &args.pattern)?;
    if json {
        let hits: Vec<output::HitJson> = hits.iter().map(output::HitJson::from_hit).collect();
        println!(
            "{}",
            serde_json::to_string_pretty(&hits).map_err(DocError::Serialize)?
        );
    } else {
        print!("{}", output::render_hits(&hits));
    }
    Ok(())
}
