//! Line-driven browse session.
//!
//! Typed lines become search text and go through the same debounce as
//! keystrokes would; `:`-prefixed lines are commands.

use std::io::Write;

use anyhow::Result;
use gutenshelf_api::CatalogService;
use gutenshelf_runtime::screen::browse::{BrowseController, Message, PageChange};
use gutenshelf_runtime::Driver;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::print;

const HELP: &str = "\
Type to search. Commands:
  :n          next page
  :p          previous page
  :g [GENRE]  filter by genre (no argument clears)
  :w ID       toggle wishlist membership
  :r          retry the last request
  :h          this help
  :q          quit";

#[derive(Debug)]
enum Input {
    Send(Message),
    Help,
    Quit,
    Invalid(String),
}

fn parse(line: &str) -> Input {
    let line = line.trim_end_matches(['\r', '\n']);
    let Some(command) = line.strip_prefix(':') else {
        return Input::Send(Message::SearchTextChanged(line.to_string()));
    };
    let (name, arg) = match command.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (command, ""),
    };
    match name {
        "q" => Input::Quit,
        "h" => Input::Help,
        "n" => Input::Send(Message::PageChanged(PageChange::Next)),
        "p" => Input::Send(Message::PageChanged(PageChange::Previous)),
        "r" => Input::Send(Message::Retry),
        "g" if arg.is_empty() => Input::Send(Message::GenreSelected(None)),
        "g" => Input::Send(Message::GenreSelected(Some(arg.to_string()))),
        "w" => match arg.parse() {
            Ok(id) => Input::Send(Message::WishlistToggled(id)),
            Err(_) => Input::Invalid(format!("not a book id: {arg:?}")),
        },
        other => Input::Invalid(format!("unknown command :{other} (try :h)")),
    }
}

/// Run until `:q` or end of input and hand the screen back for saving.
pub async fn run<C: CatalogService + 'static>(
    mut driver: Driver<BrowseController<C>>,
    out: &mut impl Write,
) -> Result<BrowseController<C>> {
    writeln!(out, "{HELP}")?;
    print::paint_all(out, &driver.dispatch(Message::Load))?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    // End of input: let in-flight work land before leaving.
                    print::paint_all(out, &driver.settle().await)?;
                    break;
                };
                match parse(&line) {
                    Input::Quit => break,
                    Input::Help => writeln!(out, "{HELP}")?,
                    Input::Invalid(reason) => writeln!(out, "{reason}")?,
                    Input::Send(message) => print::paint_all(out, &driver.dispatch(message))?,
                }
            }
            Some(message) = driver.next_message(), if !driver.is_idle() => {
                print::paint_all(out, &driver.dispatch(message))?;
            }
        }
    }

    tracing::debug!("browse session ended");
    Ok(driver.into_screen())
}
