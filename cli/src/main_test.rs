use super::*;

fn scratch_ctx() -> CliContext {
    let dir = std::env::temp_dir().join(format!("scrapbook-cli-{}", uuid::Uuid::new_v4()));
    CliContext { dir, server: "http://127.0.0.1:3000".into() }
}

fn board_command(args: &[&str]) -> BoardCommand {
    let argv = std::iter::once("scrapbook").chain(args.iter().copied());
    match Cli::try_parse_from(argv).unwrap().command {
        Command::Board(command) => command,
        other => panic!("not a board command: {other:?}"),
    }
}

fn run(ctx: &CliContext, args: &[&str]) -> Result<(), CliError> {
    run_board(ctx, board_command(args))
}

fn reload(ctx: &CliContext) -> BoardDocument {
    open_board(ctx).unwrap().document().clone()
}

// =============================================================
// Argument parsing
// =============================================================

#[test]
fn move_accepts_negative_coordinates() {
    match board_command(&["move", "sticker", "sticker-1", "-20", "-5.5"]) {
        BoardCommand::Move { kind, id, x, y } => {
            assert_eq!(kind, ObjectKind::Sticker);
            assert_eq!(id, "sticker-1");
            assert!((x + 20.0).abs() < f64::EPSILON);
            assert!((y + 5.5).abs() < f64::EPSILON);
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn unknown_kind_is_rejected() {
    assert!(Cli::try_parse_from(["scrapbook", "delete", "hexagon", "x"]).is_err());
    assert!(Cli::try_parse_from(["scrapbook", "note", "add", "--color", "teal"]).is_err());
}

#[test]
fn note_color_defaults_to_yellow() {
    let cli = Cli::try_parse_from(["scrapbook", "--dir", "/tmp/x", "note", "add"]).unwrap();
    assert_eq!(cli.dir, PathBuf::from("/tmp/x"));
    assert!(matches!(
        cli.command,
        Command::Board(BoardCommand::Note(NoteCommand { command: NoteSubcommand::Add { color: NoteColor::Yellow } }))
    ));
}

#[test]
fn doodle_stroke_is_optional() {
    assert!(matches!(
        board_command(&["doodle", "add", "spiral", "--stroke", "red"]),
        BoardCommand::Doodle(DoodleCommand { command: DoodleSubcommand::Add { kind: DoodleKind::Spiral, stroke: Some(StrokeColor::Red) } })
    ));
}

#[test]
fn ping_and_song_are_network_commands() {
    let cli = Cli::try_parse_from(["scrapbook", "ping"]).unwrap();
    assert!(matches!(cli.command, Command::Ping));
    let cli = Cli::try_parse_from(["scrapbook", "song", "fetch", "dQw4w9WgXcQ"]).unwrap();
    assert!(matches!(cli.command, Command::Song(SongCommand { command: SongSubcommand::Fetch { .. } })));
}

// =============================================================
// Helpers
// =============================================================

#[test]
fn proxy_url_encodes_id_and_trims_slash() {
    let url = proxy_url("http://127.0.0.1:3000/", "audio", "a b&c").unwrap();
    assert_eq!(url, "http://127.0.0.1:3000/audio?id=a+b%26c");
}

#[test]
fn proxy_url_rejects_bad_server() {
    assert!(matches!(proxy_url("not a url", "details", "x"), Err(CliError::InvalidBaseUrl(_))));
}

#[test]
fn sticker_source_passes_urls_through() {
    assert_eq!(sticker_source("https://example.test/cat.png").unwrap(), "https://example.test/cat.png");
    assert_eq!(sticker_source("data:image/gif;base64,R0lG").unwrap(), "data:image/gif;base64,R0lG");
}

#[test]
fn sticker_source_rejects_non_image_file() {
    let path = std::env::temp_dir().join(format!("scrapbook-cli-{}.txt", uuid::Uuid::new_v4()));
    fs::write(&path, "just text").unwrap();
    let result = sticker_source(path.to_str().unwrap());
    fs::remove_file(&path).unwrap();
    assert!(matches!(result, Err(CliError::Image(CaptureError::UnsupportedType(_)))));
}

#[test]
fn render_empty_board_shows_placeholders() {
    let text = render_board(&BoardDocument::new());
    assert!(text.starts_with("song: Add your favorite song - Artist name\n"));
    assert!(text.contains("hidden message: locked"));
    assert!(text.contains("notes (0)"));
    assert!(text.contains("doodles (0)"));
}

// =============================================================
// Board commands against a scratch directory
// =============================================================

#[test]
fn first_show_seeds_board_file() {
    let ctx = scratch_ctx();
    run(&ctx, &["show"]).unwrap();
    assert!(ctx.dir.join("scrapbookData.json").exists());
    assert_eq!(reload(&ctx).doodles.len(), 5);
    fs::remove_dir_all(&ctx.dir).unwrap();
}

#[test]
fn note_edit_and_delete_persist() {
    let ctx = scratch_ctx();
    run(&ctx, &["note", "add", "--color", "pink"]).unwrap();
    let id = reload(&ctx).notes[0].placement.id.clone();

    run(&ctx, &["note", "edit", &id, "Hello"]).unwrap();
    assert_eq!(reload(&ctx).note(&id).unwrap().content, "Hello");

    run(&ctx, &["rotate", "note", &id, "-15"]).unwrap();
    run(&ctx, &["delete", "note", &id]).unwrap();
    assert!(reload(&ctx).notes.is_empty());
    fs::remove_dir_all(&ctx.dir).unwrap();
}

#[test]
fn unknown_id_reports_not_found() {
    let ctx = scratch_ctx();
    let err = run(&ctx, &["scale", "photo", "selfie-ghost", "2"]).unwrap_err();
    assert_eq!(err.to_string(), "photo not found: selfie-ghost");
    fs::remove_dir_all(&ctx.dir).unwrap();
}

#[test]
fn non_finite_numbers_are_rejected_without_losing_the_board() {
    let ctx = scratch_ctx();
    run(&ctx, &["note", "add"]).unwrap();
    let id = reload(&ctx).notes[0].placement.id.clone();

    assert!(matches!(run(&ctx, &["rotate", "note", &id, "NaN"]), Err(CliError::Board(BoardError::NonFinite { .. }))));
    assert!(matches!(run(&ctx, &["move", "note", &id, "inf", "0"]), Err(CliError::Board(BoardError::NonFinite { .. }))));

    let doc = reload(&ctx);
    assert_eq!(doc.notes.len(), 1);
    assert_eq!(doc.doodles.len(), 5);
    fs::remove_dir_all(&ctx.dir).unwrap();
}

#[test]
fn clear_keeps_unlock_flag() {
    let ctx = scratch_ctx();
    run(&ctx, &["unlock"]).unwrap();
    run(&ctx, &["clear"]).unwrap();
    let doc = reload(&ctx);
    assert!(doc.is_empty());
    assert!(doc.unlocked);
    fs::remove_dir_all(&ctx.dir).unwrap();
}

#[test]
fn photo_import_of_missing_file_is_camera_error() {
    let ctx = scratch_ctx();
    let mut board = open_board(&ctx).unwrap();
    let err = import_photo(&mut board, ctx.dir.join("missing.png")).unwrap_err();
    assert!(matches!(err, CliError::Board(BoardError::Capture(CaptureError::Unavailable(_)))));
    assert!(board.document().photos.is_empty());
    fs::remove_dir_all(&ctx.dir).unwrap();
}
