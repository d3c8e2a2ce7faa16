mod display;

use std::collections::HashMap;
use std::io::{stdout, BufWriter, Write};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::Context;
use crossterm::{
    cursor,
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers, KeyboardEnhancementFlags, MouseEventKind, PopKeyboardEnhancementFlags,
        PushKeyboardEnhancementFlags,
    },
    style::{self, Color, Print},
    terminal, ExecutableCommand, QueueableCommand,
};
use rand::thread_rng;
use tracing::{info, warn};

use lane_shooter::config::VariantConfig;
use lane_shooter::input::{InputEvent, Key, KeyState};
use lane_shooter::session::Session;

const FRAME: Duration = Duration::from_millis(16); // ≈60 FPS

/// A key is considered "held" if its last press/repeat event arrived within
/// this many frames.  Covers terminals that don't emit key-release events:
/// the OS key-repeat rate is ≥ 15 Hz, so a window of 5 frames (≈80 ms) is
/// refreshed before expiry.
const HOLD_WINDOW: u64 = 5;

const TRACKED: [Key; 5] = [Key::Forward, Key::Backward, Key::Left, Key::Right, Key::Fire];

/// Name a terminal key the way the input module expects.
fn key_name(code: &KeyCode) -> Option<String> {
    match code {
        KeyCode::Char(c) => Some(c.to_string()),
        KeyCode::Up => Some(String::from("ArrowUp")),
        KeyCode::Down => Some(String::from("ArrowDown")),
        KeyCode::Left => Some(String::from("ArrowLeft")),
        KeyCode::Right => Some(String::from("ArrowRight")),
        _ => None,
    }
}

// ── Menu ──────────────────────────────────────────────────────────────────────

enum MenuResult {
    Start(VariantConfig),
    Quit,
}

fn show_menu<W: Write>(out: &mut W, rx: &mpsc::Receiver<Event>) -> anyhow::Result<MenuResult> {
    out.queue(terminal::Clear(terminal::ClearType::All))?;

    let (width, height) = terminal::size()?;
    let cx = width / 2;
    let cy = height / 2;

    let title = "★  LANE  SHOOTER  ★";
    out.queue(cursor::MoveTo(
        cx.saturating_sub(title.chars().count() as u16 / 2),
        cy.saturating_sub(5),
    ))?;
    out.queue(style::SetForegroundColor(Color::Cyan))?;
    out.queue(Print(title))?;

    out.queue(cursor::MoveTo(cx.saturating_sub(12), cy.saturating_sub(3)))?;
    out.queue(style::SetForegroundColor(Color::White))?;
    out.queue(Print("Select variant:"))?;

    let options: &[(&str, &str, Color, &str)] = &[
        ("1", "Hover  ", Color::Green, "Helicopter over a quiet floor"),
        ("2", "Runner ", Color::Yellow, "Drive the obstacle lane"),
        ("3", "Shooter", Color::Red, "Endless lane, enemies, health"),
    ];
    for (i, (key, label, color, desc)) in options.iter().enumerate() {
        let row = cy.saturating_sub(1) + i as u16;
        out.queue(cursor::MoveTo(cx.saturating_sub(12), row))?;
        out.queue(style::SetForegroundColor(Color::DarkGrey))?;
        out.queue(Print(format!("[{}] ", key)))?;
        out.queue(style::SetForegroundColor(*color))?;
        out.queue(Print(format!("{:<8}", label)))?;
        out.queue(style::SetForegroundColor(Color::DarkGrey))?;
        out.queue(Print(format!(" — {}", desc)))?;
    }

    out.queue(cursor::MoveTo(cx.saturating_sub(12), cy + 3))?;
    out.queue(style::SetForegroundColor(Color::DarkGrey))?;
    out.queue(Print("Q : Quit"))?;
    out.queue(style::ResetColor)?;
    out.flush()?;

    // Block until the user makes a choice
    loop {
        let event = rx.recv().context("input thread stopped")?;
        if let Event::Key(KeyEvent {
            code,
            kind: KeyEventKind::Press,
            ..
        }) = event
        {
            match code {
                KeyCode::Char('1') => return Ok(MenuResult::Start(VariantConfig::hover())),
                KeyCode::Char('2') => return Ok(MenuResult::Start(VariantConfig::runner())),
                KeyCode::Char('3') => return Ok(MenuResult::Start(VariantConfig::shooter())),
                KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                    return Ok(MenuResult::Quit);
                }
                _ => {}
            }
        }
    }
}

// ── Game loop ─────────────────────────────────────────────────────────────────

/// Returns `true` → quit program,  `false` → play again.
///
/// Input model: a `key_frame` map records the frame number of the last
/// press/repeat event for every tracked key.  Each frame the keys that are
/// still "fresh" (within `HOLD_WINDOW` frames) make up the `KeyState` the
/// session sees, so Space and A/D can be held together.  Terminals with
/// keyboard enhancement report releases and drop keys immediately.
fn game_loop<W: Write>(
    out: &mut W,
    config: VariantConfig,
    rx: &mpsc::Receiver<Event>,
) -> anyhow::Result<bool> {
    let mut rng = thread_rng();
    let clock = Instant::now();
    let mut session = Session::start(config, clock.elapsed(), &mut rng)?;

    let mut key_frame: HashMap<Key, u64> = HashMap::new();
    let mut keys = KeyState::new();
    let mut frame: u64 = 0;

    loop {
        let frame_start = Instant::now();
        frame += 1;

        // ── Drain all pending input events (non-blocking) ─────────────────────
        while let Ok(event) = rx.try_recv() {
            match event {
                Event::Key(KeyEvent {
                    code,
                    kind,
                    modifiers,
                    ..
                }) => {
                    match code {
                        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc
                            if kind == KeyEventKind::Press =>
                        {
                            return Ok(true);
                        }
                        KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                            return Ok(true);
                        }
                        KeyCode::Char('r') | KeyCode::Char('R')
                            if kind == KeyEventKind::Press && session.is_over() =>
                        {
                            return Ok(false);
                        }
                        _ => {}
                    }
                    let Some(key) = key_name(&code).as_deref().and_then(Key::from_name) else {
                        continue;
                    };
                    match kind {
                        KeyEventKind::Press | KeyEventKind::Repeat => {
                            key_frame.insert(key, frame);
                        }
                        KeyEventKind::Release => {
                            key_frame.remove(&key);
                        }
                    }
                }
                Event::Mouse(mouse) if matches!(mouse.kind, MouseEventKind::Down(_)) => {
                    keys.process_event(&InputEvent::PointerDown);
                }
                _ => {}
            }
        }

        for key in TRACKED {
            let held = key_frame
                .get(&key)
                .map(|&last| frame.saturating_sub(last) <= HOLD_WINDOW)
                .unwrap_or(false);
            keys.set(key, held);
        }

        let report = session.frame(&mut keys, clock.elapsed(), &mut rng);
        if report.game_over {
            info!(score = session.world().score, "session finished");
        }

        display::render(out, session.world())?;

        let elapsed = frame_start.elapsed();
        if elapsed < FRAME {
            thread::sleep(FRAME - elapsed);
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> anyhow::Result<()> {
    lane_shooter::logging::init()?;

    // Optional first argument skips the menu: a preset name or a JSON file.
    let file_config = match std::env::args().nth(1) {
        Some(arg) => match VariantConfig::preset(&arg) {
            Some(config) => Some(config),
            None => Some(VariantConfig::from_json_file(&arg)?),
        },
        None => None,
    };

    let mut out = BufWriter::new(stdout());

    restore_terminal_on_panic();
    terminal::enable_raw_mode()?;
    out.execute(terminal::EnterAlternateScreen)?;
    out.execute(cursor::Hide)?;
    out.execute(EnableMouseCapture)?;

    // Request key-release (and key-repeat) events from the terminal.
    // Kitty-protocol terminals support this; others fall back gracefully.
    let keyboard_enhanced = out
        .execute(PushKeyboardEnhancementFlags(
            KeyboardEnhancementFlags::REPORT_EVENT_TYPES,
        ))
        .is_ok();

    // Dedicate a thread exclusively to blocking event reads, sending them
    // through a channel so the game loop never has to block on I/O.
    let (tx, rx) = mpsc::channel::<Event>();
    thread::spawn(move || loop {
        match event::read() {
            Ok(ev) => {
                if tx.send(ev).is_err() {
                    break; // receiver dropped → program exiting
                }
            }
            Err(err) => {
                warn!(error = %err, "terminal input failed");
                break;
            }
        }
    });

    let result = run(&mut out, &rx, file_config);

    // Always restore the terminal
    if keyboard_enhanced {
        let _ = out.execute(PopKeyboardEnhancementFlags);
    }
    let _ = out.execute(DisableMouseCapture);
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();

    result
}

/// Leave raw mode before the panic report is printed, otherwise it lands
/// on the alternate screen and vanishes.
fn restore_terminal_on_panic() {
    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let mut err = std::io::stderr();
        let _ = err.execute(PopKeyboardEnhancementFlags);
        let _ = err.execute(DisableMouseCapture);
        let _ = err.execute(cursor::Show);
        let _ = err.execute(terminal::LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
        previous(info);
    }));
}

fn run<W: Write>(
    out: &mut W,
    rx: &mpsc::Receiver<Event>,
    file_config: Option<VariantConfig>,
) -> anyhow::Result<()> {
    loop {
        let config = match &file_config {
            Some(config) => config.clone(),
            None => match show_menu(out, rx)? {
                MenuResult::Quit => break,
                MenuResult::Start(config) => config,
            },
        };
        // Every round is a fresh session; nothing carries over.
        if game_loop(out, config, rx)? {
            break;
        }
    }
    Ok(())
}
