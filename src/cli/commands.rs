use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "tre", about = concat!("trellis v", env!("CARGO_PKG_VERSION"), " - hierarchical checklists as plain JSON"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Checklist document to operate on
    #[arg(short = 'f', long = "file", global = true)]
    pub file: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Overwrite even if the document changed on disk since load
    #[arg(long, global = true)]
    pub force: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a new empty checklist document
    New(NewArgs),
    /// Print the outline
    Show,
    /// Add an item (sibling after --at, child with --sub, or appended at root)
    Add(AddArgs),
    /// Duplicate the item at a path, clone inserted right after it
    Dup(PathArg),
    /// Delete the item at a path (asks for --yes unless config disables confirmation)
    Rm(RmArgs),
    /// Indent: re-parent the item under its preceding sibling
    Indent(PathArg),
    /// Outdent: re-parent the item after its current parent
    Outdent(PathArg),
    /// Swap the item with its previous sibling
    Up(PathArg),
    /// Swap the item with its next sibling
    Down(PathArg),
    /// Toggle the done flag
    Done(PathArg),
    /// Change an item's label
    Label(LabelArgs),
    /// Set or clear an item's color
    Color(ColorArgs),
    /// Search labels and custom fields by regex
    Search(SearchArgs),
}

// ---------------------------------------------------------------------------
// Command args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct NewArgs {
    /// Document list type
    #[arg(long, default_value = "checklist")]
    pub list_type: String,
}

#[derive(Args)]
pub struct AddArgs {
    /// Label for the new item
    pub label: String,
    /// Path of the reference item (e.g. "1.2")
    #[arg(long)]
    pub at: Option<String>,
    /// Add as last child of --at instead of as its next sibling
    #[arg(long, requires = "at")]
    pub sub: bool,
    /// Add as a chapter row (bold, root level)
    #[arg(long, conflicts_with_all = ["at", "sub"])]
    pub chapter: bool,
}

#[derive(Args)]
pub struct PathArg {
    /// Path of the item (e.g. "1.2")
    pub path: String,
}

#[derive(Args)]
pub struct RmArgs {
    /// Path of the item to delete
    pub path: String,
    /// Confirm the deletion
    #[arg(long)]
    pub yes: bool,
}

#[derive(Args)]
pub struct LabelArgs {
    /// Path of the item
    pub path: String,
    /// New label text
    pub text: String,
}

#[derive(Args)]
pub struct ColorArgs {
    /// Path of the item
    pub path: String,
    /// Color name; omit to clear
    pub color: Option<String>,
}

#[derive(Args)]
pub struct SearchArgs {
    /// Regex pattern (case-insensitive)
    pub pattern: String,
    /// Select the first match (prints its path)
    #[arg(long)]
    pub select: bool,
}
