//! Host-side simulator for the label synchronizer.
//!
//! Examples:
//!   rating-sync page.json
//!   rating-sync page.json 0=8 0=0
//!   rating-sync --config sync.json page.json 1=3
//!
//! Each `<slider>=<value>` is one drag tick on the slider at that position
//! (document order). The resulting page is printed as JSON on stdout.
//! Set `RUST_LOG=debug` to see skipped sliders.

use std::path::PathBuf;
use std::process;

use rating_sync::config::SyncConfig;
use rating_sync::error::DocumentError;
use rating_sync::events::Page;
use rating_sync::fixture;
use rating_sync::query::{self, Selector};
use rating_sync::sync;
use tracing_subscriber::EnvFilter;

struct Args {
    config: Option<PathBuf>,
    page: PathBuf,
    drags: Vec<(usize, String)>,
}

fn usage() -> ! {
    eprintln!("usage: rating-sync [--config <sync.json>] <page.json> [<slider>=<value> ...]");
    process::exit(2);
}

fn parse_args() -> Args {
    let mut args: Vec<String> = std::env::args().skip(1).collect();

    let mut config = None;
    if args.len() >= 2 && args[0] == "--config" {
        config = Some(PathBuf::from(&args[1]));
        args.drain(0..2);
    }
    if args.is_empty() || args[0].starts_with('-') {
        usage();
    }

    let page = PathBuf::from(args.remove(0));
    let drags = args
        .iter()
        .map(|a| parse_drag(a).unwrap_or_else(|| usage()))
        .collect();

    Args {
        config,
        page,
        drags,
    }
}

fn parse_drag(arg: &str) -> Option<(usize, String)> {
    let (idx, value) = arg.split_once('=')?;
    Some((idx.trim().parse().ok()?, value.to_string()))
}

/// Apply each `(slider index, value)` drag in order. Indices past the last
/// slider are logged and skipped. Returns the number of drags applied.
fn apply_drags(page: &mut Page, drags: &[(usize, String)]) -> Result<usize, DocumentError> {
    let root = page.document().root();
    let sliders = query::query_all(page.document(), root, &Selector::Slider);
    let mut applied = 0;
    for (idx, value) in drags {
        let Some(&slider) = sliders.get(*idx) else {
            tracing::warn!(idx, found = sliders.len(), "no such slider; drag ignored");
            continue;
        };
        page.drag(slider, value)?;
        applied += 1;
    }
    Ok(applied)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = parse_args();

    let config = match &args.config {
        Some(path) => fixture::load_config(path)?,
        None => SyncConfig::default(),
    };
    let doc = fixture::load_document(&args.page)?;

    let mut page = Page::new(doc);
    let installed = sync::install(&mut page, config);
    page.finish_parsing();
    tracing::info!(
        subscriptions = installed.subscriptions().len(),
        "page ready"
    );

    apply_drags(&mut page, &args.drags)?;
    page.finish_loading();

    println!("{}", fixture::document_to_json(page.document())?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rating_sync::document::{Document, ElementBuilder};

    #[test]
    fn drag_arguments() {
        assert_eq!(parse_drag("0=8"), Some((0, "8".to_string())));
        assert_eq!(parse_drag(" 2 =0"), Some((2, "0".to_string())));
        assert_eq!(parse_drag("1="), Some((1, String::new())));
        assert_eq!(parse_drag("x=1"), None);
        assert_eq!(parse_drag("-1=1"), None);
        assert_eq!(parse_drag("8"), None);
    }

    #[test]
    fn value_may_contain_equals() {
        assert_eq!(parse_drag("3=a=b"), Some((3, "a=b".to_string())));
    }

    #[test]
    fn drags_address_sliders_in_document_order() {
        let mut form = ElementBuilder::new("form");
        for _ in 0..2 {
            form = form.child(
                ElementBuilder::new("div")
                    .child(ElementBuilder::range("5"))
                    .child(ElementBuilder::new("span").class("rating-value").text("5")),
            );
        }
        let mut page = Page::new(Document::from_tree(&form.into()).unwrap());
        let installed = sync::install(&mut page, SyncConfig::default());
        page.finish_parsing();

        let drags = vec![(1, "9".to_string()), (7, "1".to_string()), (0, "0".to_string())];
        assert_eq!(apply_drags(&mut page, &drags).unwrap(), 2);

        let subs = installed.subscriptions();
        let doc = page.document();
        assert_eq!(doc.text_content(subs[0].label), "0");
        assert_eq!(doc.text_content(subs[1].label), "9");
    }
}
