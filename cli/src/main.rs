use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use board::capture::{CaptureError, CaptureSession, StillImageCamera, image_data_url};
use board::doc::{DoodleKind, NoteColor, ObjectKind, Point, SongRef, StickerKind, StrokeColor};
use board::notice::{Notice, NoticeVariant};
use board::store::FileStore;
use board::{BoardController, BoardDocument, BoardError};
use clap::{Args, Parser, Subcommand};
use serde::Deserialize;
use tracing_subscriber::EnvFilter;

const HTTP_TIMEOUT_SECS: u64 = 30;
const URL_PREVIEW_CHARS: usize = 48;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Board(#[from] BoardError),
    #[error("image read failed: {0}")]
    Image(#[from] CaptureError),
    #[error("file read failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid server URL: {0}")]
    InvalidBaseUrl(String),
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server returned HTTP {status}: {message}")]
    ServerError { status: u16, message: String },
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "scrapbook", about = "Digital scrapbook board CLI")]
struct Cli {
    /// Directory holding `scrapbookData.json`.
    #[arg(long, env = "SCRAPBOOK_DIR", default_value = ".")]
    dir: PathBuf,

    /// Base URL of the audio proxy server.
    #[arg(long, env = "SCRAPBOOK_SERVER", default_value = "http://127.0.0.1:3000")]
    server: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone)]
struct CliContext {
    dir: PathBuf,
    server: String,
}

/// Top-level commands: network commands talk to the proxy, board commands
/// only touch the local board file.
#[derive(Subcommand, Debug)]
enum Command {
    /// Check that the proxy server is up.
    Ping,
    Song(SongCommand),
    #[command(flatten)]
    Board(BoardCommand),
}

#[derive(Subcommand, Debug)]
enum BoardCommand {
    /// Print the board.
    Show {
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    Note(NoteCommand),
    Sticker(StickerCommand),
    Doodle(DoodleCommand),
    Photo(PhotoCommand),
    /// Move an object and bring it to the front of its kind.
    Move {
        kind: ObjectKind,
        id: String,
        #[arg(allow_negative_numbers = true)]
        x: f64,
        #[arg(allow_negative_numbers = true)]
        y: f64,
    },
    /// Rotate an object by DELTA degrees.
    Rotate {
        kind: ObjectKind,
        id: String,
        #[arg(allow_negative_numbers = true)]
        delta: f64,
    },
    /// Set an object's scale.
    Scale { kind: ObjectKind, id: String, scale: f64 },
    Delete { kind: ObjectKind, id: String },
    /// Toggle the hidden message.
    Unlock,
    /// Remove every note, photo, sticker and doodle.
    Clear,
}

#[derive(Args, Debug)]
struct NoteCommand {
    #[command(subcommand)]
    command: NoteSubcommand,
}

#[derive(Subcommand, Debug)]
enum NoteSubcommand {
    Add {
        #[arg(long, default_value = "yellow")]
        color: NoteColor,
    },
    Edit {
        id: String,
        content: String,
    },
}

#[derive(Args, Debug)]
struct StickerCommand {
    #[command(subcommand)]
    command: StickerSubcommand,
}

#[derive(Subcommand, Debug)]
enum StickerSubcommand {
    Add {
        kind: StickerKind,
    },
    /// Add a sticker from an image file, an http(s) URL, or a data URL.
    Custom {
        source: String,
    },
}

#[derive(Args, Debug)]
struct DoodleCommand {
    #[command(subcommand)]
    command: DoodleSubcommand,
}

#[derive(Subcommand, Debug)]
enum DoodleSubcommand {
    Add {
        kind: DoodleKind,
        #[arg(long)]
        stroke: Option<StrokeColor>,
    },
}

#[derive(Args, Debug)]
struct PhotoCommand {
    #[command(subcommand)]
    command: PhotoSubcommand,
}

#[derive(Subcommand, Debug)]
enum PhotoSubcommand {
    /// Pin an image file as a photo.
    Import { path: PathBuf },
}

#[derive(Args, Debug)]
struct SongCommand {
    #[command(subcommand)]
    command: SongSubcommand,
}

#[derive(Subcommand, Debug)]
enum SongSubcommand {
    Set {
        #[arg(long)]
        url: String,
        #[arg(long)]
        title: String,
        #[arg(long)]
        artist: String,
    },
    Clear,
    /// Look a video up on the proxy server and use its audio as the song.
    Fetch { video_id: String },
}

/// Title and artist as returned by the server's `/details` endpoint.
#[derive(Debug, Deserialize)]
struct SongDetails {
    title: String,
    artist: String,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let ctx = CliContext { dir: cli.dir, server: cli.server };

    match cli.command {
        Command::Ping => run_ping(&ctx).await,
        Command::Song(song) => run_song(&ctx, song).await,
        Command::Board(command) => run_board(&ctx, command),
    }
}

async fn run_ping(ctx: &CliContext) -> Result<(), CliError> {
    let url = format!("{}/healthz", base_url(&ctx.server));
    let response = http_client()?.get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(CliError::ServerError { status: status.as_u16(), message: "health check failed".to_owned() });
    }
    println!("ok");
    Ok(())
}

fn open_board(ctx: &CliContext) -> Result<BoardController<FileStore>, CliError> {
    tracing::debug!(dir = %ctx.dir.display(), "opening board");
    Ok(BoardController::open(FileStore::new(&ctx.dir))?)
}

fn run_board(ctx: &CliContext, command: BoardCommand) -> Result<(), CliError> {
    let mut board = open_board(ctx)?;
    match command {
        BoardCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(board.document())?);
            } else {
                print!("{}", render_board(board.document()));
            }
        }
        BoardCommand::Note(note) => match note.command {
            NoteSubcommand::Add { color } => println!("{}", board.add_note(color)?),
            NoteSubcommand::Edit { id, content } => board.edit_note(&id, content)?,
        },
        BoardCommand::Sticker(sticker) => match sticker.command {
            StickerSubcommand::Add { kind } => println!("{}", board.add_sticker(kind)?),
            StickerSubcommand::Custom { source } => {
                let (id, notice) = board.add_custom_sticker(sticker_source(&source)?)?;
                print_notice(&notice);
                println!("{id}");
            }
        },
        BoardCommand::Doodle(doodle) => match doodle.command {
            DoodleSubcommand::Add { kind, stroke } => println!("{}", board.add_doodle(kind, stroke)?),
        },
        BoardCommand::Photo(photo) => match photo.command {
            PhotoSubcommand::Import { path } => println!("{}", import_photo(&mut board, path)?),
        },
        BoardCommand::Move { kind, id, x, y } => board.move_to(kind, &id, Point::new(x, y))?,
        BoardCommand::Rotate { kind, id, delta } => board.rotate(kind, &id, delta)?,
        BoardCommand::Scale { kind, id, scale } => board.scale(kind, &id, scale)?,
        BoardCommand::Delete { kind, id } => board.delete(kind, &id)?,
        BoardCommand::Unlock => {
            let unlocked = board.toggle_unlock()?;
            println!("{}", if unlocked { "unlocked" } else { "locked" });
        }
        BoardCommand::Clear => print_notice(&board.clear_all()?),
    }
    Ok(())
}

async fn run_song(ctx: &CliContext, song: SongCommand) -> Result<(), CliError> {
    let song_ref = match song.command {
        SongSubcommand::Set { url, title, artist } => SongRef { url, title, artist },
        SongSubcommand::Clear => {
            open_board(ctx)?.clear_song()?;
            return Ok(());
        }
        SongSubcommand::Fetch { video_id } => fetch_song(ctx, &video_id).await?,
    };
    let notice = open_board(ctx)?.set_song(song_ref)?;
    print_notice(&notice);
    Ok(())
}

/// Resolve `video_id` through the proxy and build a song that streams from it.
async fn fetch_song(ctx: &CliContext, video_id: &str) -> Result<SongRef, CliError> {
    let url = proxy_url(&ctx.server, "details", video_id)?;
    let response = http_client()?.get(url).send().await?;
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        return Err(CliError::ServerError { status: status.as_u16(), message: body });
    }
    let details: SongDetails = serde_json::from_str(&body)?;
    tracing::info!(%video_id, title = %details.title, "song details fetched");
    Ok(SongRef { url: proxy_url(&ctx.server, "audio", video_id)?, title: details.title, artist: details.artist })
}

fn import_photo(board: &mut BoardController<FileStore>, path: PathBuf) -> Result<String, CliError> {
    let mut session = CaptureSession::new(StillImageCamera::new(path));
    if let Err(e) = session.start() {
        let err = BoardError::from(e);
        print_notice(&Notice::from(&err));
        return Err(err.into());
    }
    Ok(board.capture_photo(&mut session)?)
}

/// URLs pass through; anything else is read as an image file.
fn sticker_source(source: &str) -> Result<String, CliError> {
    let lower = source.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") || lower.starts_with("data:") {
        return Ok(source.to_owned());
    }
    let bytes = fs::read(source)?;
    Ok(image_data_url(&bytes)?)
}

fn http_client() -> Result<reqwest::Client, CliError> {
    Ok(reqwest::Client::builder()
        .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
        .build()?)
}

fn base_url(server: &str) -> &str {
    server.trim_end_matches('/')
}

/// `<server>/<endpoint>?id=<video_id>` with the id query-encoded.
fn proxy_url(server: &str, endpoint: &str, video_id: &str) -> Result<String, CliError> {
    let raw = format!("{}/{endpoint}", base_url(server));
    reqwest::Url::parse_with_params(&raw, &[("id", video_id)])
        .map(String::from)
        .map_err(|e| CliError::InvalidBaseUrl(format!("{server}: {e}")))
}

fn print_notice(notice: &Notice) {
    match notice.variant {
        NoticeVariant::Default => eprintln!("{}: {}", notice.title, notice.description),
        NoticeVariant::Destructive => eprintln!("error: {}: {}", notice.title, notice.description),
    }
}

/// Human-readable listing, one section per kind in draw order.
fn render_board(doc: &BoardDocument) -> String {
    let (title, artist) = doc.song_label();
    let mut lines = vec![
        format!("song: {title} - {artist}"),
        format!("hidden message: {}", if doc.unlocked { "unlocked" } else { "locked" }),
    ];
    for kind in ObjectKind::ALL {
        let pool = doc.draw_order(*kind);
        lines.push(format!("{kind}s ({})", pool.len()));
        for p in pool {
            lines.push(format!(
                "  {}  z={} at ({:.0}, {:.0}) rot={:.1} scale={:.2}{}",
                p.id,
                p.z_index,
                p.position.x,
                p.position.y,
                p.rotation,
                p.scale,
                describe(doc, *kind, &p.id)
            ));
        }
    }
    let mut out = lines.join("\n");
    out.push('\n');
    out
}

fn describe(doc: &BoardDocument, kind: ObjectKind, id: &str) -> String {
    match kind {
        ObjectKind::Note => doc
            .note(id)
            .map(|n| format!("  [{}] {:?}", n.color, n.content))
            .unwrap_or_default(),
        ObjectKind::Photo => doc
            .photos
            .iter()
            .find(|p| p.placement.id == id)
            .map(|p| format!("  {} bytes", p.image_data.len()))
            .unwrap_or_default(),
        ObjectKind::Sticker => doc
            .stickers
            .iter()
            .find(|s| s.placement.id == id)
            .map(|s| match &s.image_url {
                Some(url) if url.chars().count() > URL_PREVIEW_CHARS => {
                    format!("  {} {}…", s.kind, url.chars().take(URL_PREVIEW_CHARS).collect::<String>())
                }
                Some(url) => format!("  {} {url}", s.kind),
                None => format!("  {}", s.kind),
            })
            .unwrap_or_default(),
        ObjectKind::Doodle => doc
            .doodles
            .iter()
            .find(|d| d.placement.id == id)
            .map(|d| format!("  {} ({})", d.kind, d.stroke_color))
            .unwrap_or_default(),
    }
}

#[cfg(test)]
#[path = "main_test.rs"]
mod tests;
