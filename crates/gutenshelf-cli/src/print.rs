//! Terminal painter for driver frames.

use std::io::{self, Write};

use gutenshelf_runtime::view::{Card, DetailView, Pager, Patch, Render};
use gutenshelf_runtime::Frame;

pub fn paint(out: &mut impl Write, frame: &Frame) -> io::Result<()> {
    match frame {
        Frame::Full(renders) => {
            for render in renders {
                paint_render(out, render)?;
            }
        }
        Frame::Patch(patches) => {
            for Patch::Indicator { id, indicator } in patches {
                writeln!(out, "{} #{id}", indicator.glyph())?;
            }
        }
    }
    out.flush()
}

pub fn paint_all(out: &mut impl Write, frames: &[Frame]) -> io::Result<()> {
    frames.iter().try_for_each(|frame| paint(out, frame))
}

fn paint_render(out: &mut impl Write, render: &Render) -> io::Result<()> {
    match render {
        Render::SearchBox { text } if text.is_empty() => Ok(()),
        Render::SearchBox { text } => writeln!(out, "Search: {text}"),
        Render::GenreFilter { options, .. } if options.is_empty() => Ok(()),
        Render::GenreFilter { options, selected } => {
            let all = if selected.is_none() { "[All]" } else { "All" };
            let labels: Vec<String> = options
                .iter()
                .map(|o| {
                    if selected.as_ref() == Some(o) {
                        format!("[{o}]")
                    } else {
                        o.clone()
                    }
                })
                .collect();
            writeln!(out, "Genres: {all} | {}", labels.join(" | "))
        }
        Render::Skeleton => writeln!(out, "Loading..."),
        Render::Banner(message) => writeln!(out, "! {message}"),
        Render::Empty(message) => writeln!(out, "{message}"),
        Render::Grid(cards) => cards.iter().try_for_each(|card| paint_card(out, card)),
        Render::Pager(pager) => writeln!(out, "{}", pager_line(pager)),
        Render::Detail(detail) => paint_detail(out, detail),
    }
}

fn paint_card(out: &mut impl Write, card: &Card) -> io::Result<()> {
    writeln!(out, "{} {:>6}  {}", card.indicator.glyph(), card.id, card.title)?;
    writeln!(out, "          {}", or_unknown(&card.authors))?;
    if let Some(ref genres) = card.genres {
        writeln!(out, "          Genres: {genres}")?;
    }
    Ok(())
}

fn paint_detail(out: &mut impl Write, detail: &DetailView) -> io::Result<()> {
    writeln!(out, "{}", detail.page_title)?;
    writeln!(out)?;
    writeln!(out, "Authors:   {}", or_unknown(&detail.authors))?;
    writeln!(out, "Genres:    {}", detail.genres)?;
    writeln!(out, "Languages: {}", detail.languages)?;
    writeln!(out, "Downloads: {}", detail.download_count)?;
    writeln!(out, "Copyright: {}", detail.copyright)?;
    if let Some(ref cover) = detail.cover_url {
        writeln!(out, "Cover:     {cover}")?;
    }
    writeln!(out)?;
    writeln!(out, "{}", detail.description)?;
    if !detail.links.is_empty() {
        writeln!(out)?;
        writeln!(out, "Formats:")?;
        for link in &detail.links {
            writeln!(out, "  {}: {}", link.label, link.url)?;
        }
    }
    writeln!(out)?;
    writeln!(out, "{}", detail.indicator.detail_label())
}

fn pager_line(pager: &Pager) -> String {
    let prev = if pager.prev_enabled { "< prev" } else { "      " };
    let next = if pager.next_enabled { "next >" } else { "      " };
    format!("{prev}  Page {} of {}  {next}", pager.page, pager.total_pages)
}

fn or_unknown(s: &str) -> &str {
    if s.is_empty() {
        "Unknown"
    } else {
        s
    }
}
