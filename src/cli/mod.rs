//! CLI definitions using clap.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

pub mod commands;

/// Rentvault - encrypted local store for rental hunting
#[derive(Parser, Debug)]
#[command(name = "rv", author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Directory holding user stores (default: ~/.rentvault/data)
    #[arg(long, global = true, env = "RENTVAULT_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Email of the signed-in user; selects the store file
    #[arg(long, global = true, env = "RV_EMAIL")]
    pub email: Option<String>,

    /// User id; combined with the email to derive the store password
    #[arg(long, global = true, env = "RV_USER_ID")]
    pub user_id: Option<String>,

    /// Explicit store password (overrides the derived one)
    #[arg(long, global = true, env = "RV_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Increase logging verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (no output except errors)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create (or unlock) the user's encrypted store
    Init,

    /// Show diagnostics about the store file
    Info,

    /// Permanently delete the user's store
    Destroy {
        /// Skip the confirmation requirement
        #[arg(long)]
        yes: bool,
    },

    /// Show version information
    Version,

    /// Rental listings
    Listing {
        #[command(subcommand)]
        command: ListingCommands,
    },

    /// Stored documents
    Document {
        #[command(subcommand)]
        command: DocumentCommands,
    },

    /// Application checklist
    Task {
        #[command(subcommand)]
        command: TaskCommands,
    },

    /// Renter profile
    Profile {
        #[command(subcommand)]
        command: ProfileCommands,
    },

    /// Income sources
    Income {
        #[command(subcommand)]
        command: IncomeCommands,
    },

    /// Additional profile information
    Extra {
        #[command(subcommand)]
        command: ExtraCommands,
    },

    /// Combine a base PDF with stored documents
    Pdf(PdfArgs),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Supported shells for completions.
#[derive(clap::ValueEnum, Clone, Debug)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

// ============================================================================
// Listing Commands
// ============================================================================

/// Optional listing fields shared by `add` and `update`.
#[derive(Args, Debug, Default, Clone)]
pub struct ListingFields {
    /// Number of bedrooms
    #[arg(long)]
    pub bedrooms: Option<u32>,

    /// Number of bathrooms (e.g. 1.5)
    #[arg(long)]
    pub bathrooms: Option<f64>,

    /// Square footage
    #[arg(long = "sqft")]
    pub square_footage: Option<u32>,

    #[arg(long)]
    pub contact_email: Option<String>,

    #[arg(long)]
    pub contact_phone: Option<String>,

    #[arg(long)]
    pub contact_other: Option<String>,

    /// Apartment, house, condo...
    #[arg(long)]
    pub housing_type: Option<String>,

    /// Lease type (month-to-month, annual)
    #[arg(long)]
    pub lease_type: Option<String>,

    /// Upfront fees (deposit, first month...)
    #[arg(long)]
    pub upfront_fees: Option<f64>,

    /// Included utility (repeatable)
    #[arg(long = "utility")]
    pub utilities: Vec<String>,

    /// Amenity (repeatable)
    #[arg(long = "amenity")]
    pub amenities: Vec<String>,

    /// Minimum credit score (300-850)
    #[arg(long)]
    pub credit_score_min: Option<u16>,

    /// Minimum income required
    #[arg(long)]
    pub minimum_income: Option<f64>,

    /// Whether references are required (true/false)
    #[arg(long)]
    pub references_required: Option<bool>,

    /// Referenced document id (repeatable)
    #[arg(long = "doc")]
    pub documents: Vec<i64>,

    /// Layout description
    #[arg(long = "layout")]
    pub layout_description: Option<String>,

    #[arg(long)]
    pub pet_policy: Option<String>,

    /// Furnishing (furnished, unfurnished, semi-furnished)
    #[arg(long)]
    pub furnishing: Option<String>,

    #[arg(long)]
    pub notes: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum ListingCommands {
    /// Bookmark a listing
    Add {
        /// Address: "Street, City, State, Zip"
        address: String,

        /// Link to the original posting
        link: String,

        /// Monthly rent
        rent: f64,

        #[command(flatten)]
        fields: ListingFields,

        /// Mark as favorite
        #[arg(long)]
        favorite: bool,
    },

    /// List listings (favorites first)
    List {
        /// Only favorites
        #[arg(long)]
        favorites: bool,
    },

    /// Show one listing with its referenced documents
    Show {
        id: i64,
    },

    /// Update a listing
    Update {
        id: i64,

        #[arg(long)]
        address: Option<String>,

        #[arg(long)]
        link: Option<String>,

        #[arg(long)]
        rent: Option<f64>,

        #[command(flatten)]
        fields: ListingFields,

        /// Clear an optional field (repeatable), e.g. --clear notes
        #[arg(long)]
        clear: Vec<String>,
    },

    /// Toggle the favorite flag
    Favorite {
        id: i64,
    },

    /// Delete a listing
    Delete {
        id: i64,
    },
}

// ============================================================================
// Document Commands
// ============================================================================

#[derive(Subcommand, Debug)]
pub enum DocumentCommands {
    /// Store a local file
    Add {
        /// File to upload
        path: PathBuf,

        /// Display name (defaults to the file name)
        #[arg(long)]
        name: Option<String>,

        /// Category (personal, listing, general, other)
        #[arg(short = 't', long = "type", default_value = "general")]
        document_type: String,

        /// Reminder date (YYYY-MM-DD)
        #[arg(long)]
        reminder: Option<String>,
    },

    /// List documents (metadata only)
    List {
        /// Filter by category
        #[arg(short = 't', long = "type")]
        document_type: Option<String>,
    },

    /// Show a document
    Show {
        id: i64,

        /// Write the content to this path
        #[arg(long)]
        out: Option<PathBuf>,

        /// Print a data: URL of the content
        #[arg(long)]
        data_url: bool,
    },

    /// Update a document
    Update {
        id: i64,

        #[arg(long)]
        name: Option<String>,

        #[arg(short = 't', long = "type")]
        document_type: Option<String>,

        /// Reminder date (YYYY-MM-DD)
        #[arg(long, conflicts_with = "clear_reminder")]
        reminder: Option<String>,

        #[arg(long)]
        clear_reminder: bool,

        /// Replace the content with this file
        #[arg(long)]
        file: Option<PathBuf>,
    },

    /// Delete a document
    Delete {
        id: i64,
    },
}

// ============================================================================
// Checklist Commands
// ============================================================================

/// Attachments of a checklist task.
#[derive(Args, Debug, Default, Clone)]
pub struct TaskAttachments {
    /// Attach a stored document by id (repeatable)
    #[arg(long = "doc")]
    pub documents: Vec<i64>,

    /// Attach a link as NAME=URL (repeatable)
    #[arg(long = "link")]
    pub links: Vec<String>,
}

#[derive(Subcommand, Debug)]
pub enum TaskCommands {
    /// Add a checklist task
    Add {
        /// Task description
        name: String,

        /// Create already checked
        #[arg(long)]
        checked: bool,

        #[command(flatten)]
        attachments: TaskAttachments,

        /// Reminder date (YYYY-MM-DD)
        #[arg(long)]
        reminder: Option<String>,
    },

    /// List checklist tasks
    List,

    /// Show a task
    Show {
        id: i64,
    },

    /// Update a task
    Update {
        id: i64,

        #[arg(long)]
        name: Option<String>,

        /// Set the checked state (true/false)
        #[arg(long)]
        checked: Option<bool>,

        /// Replace all attachments with these
        #[command(flatten)]
        attachments: TaskAttachments,

        /// Remove all attachments
        #[arg(long)]
        clear_attachments: bool,

        /// Reminder date (YYYY-MM-DD)
        #[arg(long, conflicts_with = "clear_reminder")]
        reminder: Option<String>,

        #[arg(long)]
        clear_reminder: bool,
    },

    /// Toggle completion
    Toggle {
        id: i64,
    },

    /// Delete a task
    Delete {
        id: i64,
    },
}

// ============================================================================
// Profile Commands
// ============================================================================

/// Optional profile fields.
#[derive(Args, Debug, Default, Clone)]
pub struct ProfileArgs {
    /// Date of birth (YYYY-MM-DD)
    #[arg(long)]
    pub dob: Option<String>,

    #[arg(long)]
    pub gender: Option<String>,

    #[arg(long)]
    pub phone: Option<String>,

    /// Contact email on the profile
    #[arg(long = "contact-email")]
    pub contact_email: Option<String>,

    #[arg(long)]
    pub address: Option<String>,

    /// Monthly income
    #[arg(long)]
    pub income: Option<f64>,
}

#[derive(Subcommand, Debug)]
pub enum ProfileCommands {
    /// Create or replace the profile
    Save {
        /// Full name
        fullname: String,

        #[command(flatten)]
        fields: ProfileArgs,
    },

    /// Show the profile
    Show,

    /// Update profile fields
    Update {
        #[arg(long)]
        fullname: Option<String>,

        #[command(flatten)]
        fields: ProfileArgs,

        /// Clear an optional field (repeatable), e.g. --clear phone
        #[arg(long)]
        clear: Vec<String>,
    },

    /// Show or set the monthly income
    MonthlyIncome {
        /// New amount; omit to show the current value
        amount: Option<f64>,
    },

    /// Delete the profile
    Delete,
}

/// Optional income source fields.
#[derive(Args, Debug, Default, Clone)]
pub struct IncomeArgs {
    #[arg(long)]
    pub employer: Option<String>,

    /// Job title
    #[arg(long)]
    pub title: Option<String>,

    /// Employment length (free text, e.g. "2 years")
    #[arg(long)]
    pub length: Option<String>,

    /// Employer contact
    #[arg(long)]
    pub contact: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum IncomeCommands {
    /// Add an income source
    Add {
        /// Source (employment, self-employed, other)
        source: String,

        #[command(flatten)]
        fields: IncomeArgs,
    },

    /// List income sources
    List,

    /// Show an income source
    Show {
        id: i64,
    },

    /// Update an income source
    Update {
        id: i64,

        #[arg(long)]
        source: Option<String>,

        #[command(flatten)]
        fields: IncomeArgs,

        /// Clear an optional field (repeatable), e.g. --clear employer
        #[arg(long)]
        clear: Vec<String>,
    },

    /// Delete an income source
    Delete {
        id: i64,
    },
}

#[derive(Subcommand, Debug)]
pub enum ExtraCommands {
    /// Add a label/value entry
    Add {
        label: String,
        value: String,

        #[arg(long)]
        icon: Option<String>,
    },

    /// Insert or replace an entry by id
    Set {
        /// Entry id; a new one is assigned when omitted
        #[arg(long)]
        id: Option<i64>,

        label: String,
        value: String,

        #[arg(long)]
        icon: Option<String>,
    },

    /// List entries
    List,

    /// Show an entry
    Show {
        id: i64,
    },

    /// Update an entry
    Update {
        id: i64,

        #[arg(long)]
        label: Option<String>,

        #[arg(long)]
        value: Option<String>,

        #[arg(long, conflicts_with = "clear_icon")]
        icon: Option<String>,

        #[arg(long)]
        clear_icon: bool,
    },

    /// Delete an entry
    Delete {
        id: i64,
    },
}

// ============================================================================
// PDF
// ============================================================================

#[derive(Args, Debug)]
pub struct PdfArgs {
    /// Base PDF (e.g. the filled application form)
    pub base: PathBuf,

    /// Stored document to append, in order (repeatable)
    #[arg(long = "doc")]
    pub documents: Vec<i64>,

    /// Where to write the combined PDF
    #[arg(short, long)]
    pub out: PathBuf,

    /// Bearer token for the combination service
    #[arg(long, env = "RV_PDF_TOKEN", hide_env_values = true)]
    pub token: String,

    /// Combination service endpoint
    #[arg(long, env = "RENTVAULT_PDF_API")]
    pub endpoint: Option<String>,
}
