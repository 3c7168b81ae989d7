mod app;
mod baud;
mod cli;
mod device;
mod error;
mod escape;
mod fields;
mod layout;
mod render;
mod status;

use std::io::stdout;
use std::panic;
use std::process;
use std::time::Instant;

use anyhow::Result;
use crossterm::{
    cursor::Show,
    execute,
    terminal::{
        disable_raw_mode, enable_raw_mode, size as terminal_size, EnterAlternateScreen,
        LeaveAlternateScreen,
    },
};

use crate::app::App;
use crate::cli::DebugTimer;
use crate::layout::Layout;

fn setup_terminal() -> Result<(u16, u16)> {
    let (cols, rows) = terminal_size()?;
    enable_raw_mode()?;
    execute!(stdout(), EnterAlternateScreen)?;
    Ok((cols, rows))
}

fn restore_terminal() -> Result<()> {
    disable_raw_mode()?;
    execute!(stdout(), LeaveAlternateScreen, Show)?;
    Ok(())
}

fn setup_panic_handler() {
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(stdout(), LeaveAlternateScreen, Show);
        original_hook(panic_info);
    }));
}

fn main() -> Result<()> {
    let args = cli::parse_args();
    if args.help {
        print!("{}", cli::USAGE);
        return Ok(());
    }

    let timer = DebugTimer::new(args.profile);
    timer.log("args parsed");

    setup_panic_handler();

    let begin = Instant::now();
    let (cols, rows) = setup_terminal()?;
    timer.duration("setup terminal", begin.elapsed());

    let layout = match Layout::new(cols, rows) {
        Ok(layout) => layout,
        Err(err) => {
            // The input fields cannot fit at all; nothing to recover into
            restore_terminal()?;
            eprintln!("{}", err);
            process::exit(1);
        }
    };

    let begin = Instant::now();
    let mut app = App::new(layout, &args);
    timer.duration("App::new", begin.elapsed());

    timer.log("Starting main loop");
    let mut out = stdout();
    let result = app.init(&args, &mut out).and_then(|()| app.run());

    restore_terminal()?;

    // Dump the startup trace after terminal restore, where it stays visible
    timer.dump();

    result
}
