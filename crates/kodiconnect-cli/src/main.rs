//! Kodiconnect - maintenance commands for a Kodi library sync addon.
//!
//! Runs the core library's reset and config editors outside the host, with
//! prompts on the terminal.

mod console;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use kodiconnect_core::{
    AddonConfig, DbKind, InMemoryPropertyStore, LoggingConfig, PasswordsOutcome, PlaylistOutcome,
    RealFileSystem, ResetContext, ResetOutcome, Result, SpecialPaths, XmlSettingsStore, delete_nodes,
    delete_playlists, logging, normalize_nodes, normalize_string, passwords_xml, playlist_xsp,
    reset, sources_xml,
};
use tracing::{error, info};

use console::{ConsoleDialog, ConsoleHost};

#[derive(Debug, Parser)]
#[command(name = "kodiconnect", version, about)]
struct Cli {
    /// Configuration file (defaults to the user config directory).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Kodi home directory, overriding the configured special paths.
    #[arg(long, global = true)]
    home: Option<PathBuf>,

    /// Kodi build version, overriding the configured one.
    #[arg(long, global = true)]
    build_version: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Wipe the local library and addon database.
    Reset,
    /// Register the dummy network sources in sources.xml.
    Sources,
    /// Add, modify or remove network credentials in passwords.xml.
    Passwords,
    /// Create or delete the smart playlist for a tag.
    Playlist {
        /// Media type, e.g. movies, tvshows, homevideos.
        #[arg(long)]
        mediatype: String,
        /// Tag the playlist filters on.
        #[arg(long)]
        tag: String,
        /// View type; "mixed" puts the media type in the name.
        #[arg(long, default_value = "")]
        viewtype: String,
        /// Delete the playlist if it exists.
        #[arg(long)]
        delete: bool,
    },
    /// Remove generated playlists and library nodes.
    Clean,
    /// Print the file-name-safe form of a title.
    Normalize {
        /// Text to normalize.
        text: String,
        /// Keep parentheses.
        #[arg(long)]
        keep_parens: bool,
    },
    /// Print the path of a database.
    DbPath {
        /// Which database.
        #[arg(value_enum, default_value_t = DbArg::Video)]
        kind: DbArg,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum DbArg {
    Video,
    Music,
    Texture,
    Emby,
}

impl From<DbArg> for DbKind {
    fn from(arg: DbArg) -> Self {
        match arg {
            DbArg::Video => Self::Video,
            DbArg::Music => Self::Music,
            DbArg::Texture => Self::Texture,
            DbArg::Emby => Self::Emby,
        }
    }
}

fn load_config(cli: &Cli) -> Result<AddonConfig> {
    let mut config = match &cli.config {
        Some(path) => AddonConfig::load_from(path)?,
        None => AddonConfig::load()?,
    };
    if let Some(home) = &cli.home {
        config.special = SpecialPaths::from_home(home);
    }
    if let Some(version) = &cli.build_version {
        config.build_version.clone_from(version);
    }
    Ok(config)
}

fn run(cli: &Cli) -> Result<()> {
    let config = load_config(cli)?;
    let fs = RealFileSystem::new();
    let dialog = ConsoleDialog::stdio();
    let host = ConsoleHost::new(config.build_version.clone());
    let settings = XmlSettingsStore::new(Arc::new(RealFileSystem::new()), config.settings_file());

    match &cli.command {
        Command::Reset => {
            let properties = InMemoryPropertyStore::new();
            let ctx = ResetContext {
                config: &config,
                fs: &fs,
                properties: &properties,
                settings: &settings,
                dialog: &dialog,
                host: &host,
            };
            match reset(&ctx)? {
                ResetOutcome::Declined => info!("Reset cancelled"),
                ResetOutcome::SyncStillRunning => error!("Library sync is still running"),
                ResetOutcome::Completed { settings_deleted } => {
                    info!("Reset completed (settings deleted: {})", settings_deleted);
                }
            }
        }
        Command::Sources => {
            let added = sources_xml(&fs, &config.special.sources_xml())?;
            println!("Added {added} sources");
        }
        Command::Passwords => match passwords_xml(&config, &fs, &dialog, &settings, &host)? {
            PasswordsOutcome::Cancelled => info!("No changes made"),
            PasswordsOutcome::NotFound { server } => {
                info!("{} was not in passwords.xml", server);
            }
            PasswordsOutcome::Removed { server }
            | PasswordsOutcome::Added { server }
            | PasswordsOutcome::Updated { server } => info!("Updated credentials for {}", server),
        },
        Command::Playlist {
            mediatype,
            tag,
            viewtype,
            delete,
        } => {
            let dir = config.special.video_playlists();
            match playlist_xsp(&fs, &dir, mediatype, tag, viewtype, *delete)? {
                PlaylistOutcome::Created(path) => println!("Created {}", path.display()),
                PlaylistOutcome::AlreadyExists(path) => println!("Exists {}", path.display()),
                PlaylistOutcome::Removed(path) => println!("Removed {}", path.display()),
                PlaylistOutcome::WriteFailed(path) => {
                    error!("Could not write {}", path.display());
                }
            }
        }
        Command::Clean => {
            let playlists = delete_playlists(&fs, &config.special.video_playlists())?;
            let nodes = delete_nodes(&fs, &config.special.video_nodes())?;
            println!(
                "Removed {} playlists, {} node directories and {} node files",
                playlists.files_removed, nodes.directories_removed, nodes.files_removed
            );
        }
        Command::Normalize { text, keep_parens } => {
            let normalized = if *keep_parens {
                normalize_string(text)
            } else {
                normalize_nodes(text)
            };
            println!("{normalized}");
        }
        Command::DbPath { kind } => {
            let kind = DbKind::from(*kind);
            println!(
                "{}",
                kind.path(&config.special.database, &config.build_version)
                    .display()
            );
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let _guard = match logging::init(&LoggingConfig::auto()) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("Logging disabled: {e}");
            None
        }
    };

    info!("Starting kodiconnect");
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
