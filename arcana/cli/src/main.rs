//! Arcana Reader - Command-Line Interpretation Client
//!
//! Asks the reading server to interpret one card of a spread, or the whole
//! spread's closing summary, and streams the answer to stdout as it arrives.
//!
//! # Usage
//!
//! ```bash
//! # Interpret the third card of a three-card spread (`r` = reversed)
//! arcana-read --cards 0,16r,40 --index 2
//!
//! # Closing summary for a love reading
//! arcana-read --cards 0,16r,40 --summary --category love --situation "Will it last?"
//!
//! # Sanitized HTML instead of raw markdown
//! arcana-read --cards 21 --html
//!
//! # Verbose logging (to stderr)
//! RUST_LOG=debug arcana-read --cards 21
//! ```

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, info};

use arcana_core::config::{load_config_from_path, ConfigOverrides};
use arcana_core::{
    CardId, Category, HttpBackend, InterpretationBackend, InterpretationRequest, Orientation,
    Selection, SpreadPosition, StreamState,
};

/// Arcana Reader - stream a tarot interpretation to the terminal
#[derive(Parser, Debug)]
#[command(name = "arcana-read")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Spread in order: card ids, `r` suffix for reversed, `u` for upright
    #[arg(
        short = 'C',
        long,
        required = true,
        value_delimiter = ',',
        value_parser = parse_card_arg,
        value_name = "ID[r|u],..."
    )]
    cards: Vec<CardArg>,

    /// Spread position to interpret (0-based)
    #[arg(short = 'i', long, default_value_t = 0, conflicts_with = "summary")]
    index: usize,

    /// Ask for the closing summary of the whole spread
    #[arg(short = 's', long)]
    summary: bool,

    /// Reading topic (love, job, business, money, study)
    #[arg(long, value_name = "ID")]
    category: Option<String>,

    /// What the querent wants to know
    #[arg(long, default_value = "")]
    situation: String,

    /// Print sanitized HTML once the stream finishes
    #[arg(long)]
    html: bool,

    /// Reading server base URL
    #[arg(long, value_name = "URL")]
    api_url: Option<String>,

    /// Request timeout in seconds
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Configuration file path
    #[arg(short = 'c', long, env = "ARCANA_CONFIG", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short = 'l', long, env = "ARCANA_LOG_LEVEL", default_value = "warn")]
    log_level: String,
}

/// One card on the command line
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct CardArg {
    id: CardId,
    /// `None` draws the orientation
    orientation: Option<Orientation>,
}

fn parse_card_arg(raw: &str) -> Result<CardArg, String> {
    let raw = raw.trim();
    let (digits, orientation) = match raw.char_indices().last() {
        Some((i, 'r' | 'R')) => (&raw[..i], Some(Orientation::Reversed)),
        Some((i, 'u' | 'U')) => (&raw[..i], Some(Orientation::Upright)),
        _ => (raw, None),
    };
    let id = digits
        .parse::<CardId>()
        .map_err(|_| format!("invalid card `{raw}`: expected an id like 16 or 16r"))?;
    Ok(CardArg { id, orientation })
}

/// Initialize logging on stderr; stdout carries the reading
fn init_logging(level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(format!("arcana_read={level},arcana_core={level}"))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

/// Resolve the command-line spread against the deck
fn build_selection(args: &[CardArg], deck: &arcana_core::Deck) -> Result<Selection> {
    let mut selection = Selection::new();
    let mut rng = rand::thread_rng();
    for arg in args {
        let card = deck
            .find(arg.id)
            .with_context(|| format!("Card {} is not in the deck", arg.id))?;
        if selection.contains(card.id) {
            anyhow::bail!("Card {} appears twice in the spread", card.id);
        }
        let orientation = arg
            .orientation
            .unwrap_or_else(|| Orientation::draw(&mut rng));
        selection.toggle_with(card, orientation)?;
    }
    Ok(selection)
}

fn heading(selection: &Selection, request: &InterpretationRequest) -> String {
    if request.is_summary() {
        return format!("── Summary of {} cards ──", selection.len());
    }
    let title = SpreadPosition::from_index(request.card_index).map_or("", SpreadPosition::title);
    match selection.get(request.card_index) {
        Some(picked) => {
            let reversed = if picked.is_reversed() { " (reversed)" } else { "" };
            format!(
                "── {}. {title}: {}{reversed} ──",
                request.card_index + 1,
                picked.card.name
            )
        }
        None => String::new(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args.log_level);

    let mut config = load_config_from_path(args.config.clone())?;
    let mut overrides = ConfigOverrides::new();
    if let Some(url) = &args.api_url {
        overrides = overrides.with_api_url(url.clone());
    }
    if let Some(secs) = args.timeout {
        overrides = overrides.with_timeout_secs(secs);
    }
    overrides.apply(&mut config)?;
    info!(url = %config.api.url, source = %config.source(), "Configuration loaded");

    let category = match args.category.as_deref() {
        Some(id) => Some(Category::by_id(id).with_context(|| {
            let known: Vec<_> = Category::presets().into_iter().filter_map(|c| c.id).collect();
            format!("Unknown category `{id}` (expected one of: {})", known.join(", "))
        })?),
        None => None,
    };

    let backend = HttpBackend::from_config(&config.api)?;
    let deck = backend.deck_or_standard().await;
    let selection = build_selection(&args.cards, &deck)?;

    let request = if args.summary {
        InterpretationRequest::final_summary(selection.as_slice(), category.as_ref(), &args.situation)
    } else {
        InterpretationRequest::for_card(
            selection.as_slice(),
            args.index,
            category.as_ref(),
            &args.situation,
        )
    }
    .with_context(|| {
        format!(
            "Index {} is outside the {}-card spread",
            args.index,
            selection.len()
        )
    })?;
    debug!(card_index = request.card_index, cards = request.all_cards.len(), "Request built");

    let mut stdout = std::io::stdout().lock();
    if !args.html {
        writeln!(stdout, "{}\n", heading(&selection, &request))?;
    }

    let mut live = backend.open_session(&request).await;
    let mut printed = 0;
    loop {
        if !args.html {
            let text = live.text();
            stdout.write_all(&text.as_bytes()[printed..])?;
            stdout.flush()?;
            printed = text.len();
        }
        if live.next().await.is_none() {
            break;
        }
    }

    if args.html {
        writeln!(stdout, "{}", live.html())?;
    } else {
        writeln!(stdout)?;
    }

    if live.session().state() == StreamState::Failed {
        anyhow::bail!(
            "Interpretation failed: {}",
            live.session().error().unwrap_or("unknown error")
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use arcana_core::Deck;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_card_arg() {
        assert_eq!(
            parse_card_arg("16r"),
            Ok(CardArg {
                id: 16,
                orientation: Some(Orientation::Reversed)
            })
        );
        assert_eq!(
            parse_card_arg(" 3U "),
            Ok(CardArg {
                id: 3,
                orientation: Some(Orientation::Upright)
            })
        );
        assert_eq!(
            parse_card_arg("77"),
            Ok(CardArg {
                id: 77,
                orientation: None
            })
        );
        assert!(parse_card_arg("r").is_err());
        assert!(parse_card_arg("tower").is_err());
        assert!(parse_card_arg("-1").is_err());
    }

    #[test]
    fn test_args_parse_spread() {
        let args = Args::try_parse_from(["arcana-read", "--cards", "0,16r,40u", "--index", "1"])
            .unwrap();
        assert_eq!(args.cards.len(), 3);
        assert_eq!(args.cards[1].orientation, Some(Orientation::Reversed));
        assert_eq!(args.index, 1);
        assert!(!args.summary);
    }

    #[test]
    fn test_summary_conflicts_with_index() {
        let result =
            Args::try_parse_from(["arcana-read", "--cards", "0", "--summary", "--index", "2"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_build_selection_rejects_duplicates_and_unknown_ids() {
        let deck = Deck::standard();
        let twice = [parse_card_arg("5").unwrap(), parse_card_arg("5r").unwrap()];
        assert!(build_selection(&twice, &deck).is_err());

        let unknown = [parse_card_arg("999").unwrap()];
        assert!(build_selection(&unknown, &deck).is_err());

        let eleven: Vec<_> = (0..11).map(|id| CardArg { id, orientation: None }).collect();
        assert!(build_selection(&eleven, &deck).is_err());
    }

    #[test]
    fn test_heading_names_position() {
        let deck = Deck::standard();
        let picks = [parse_card_arg("0").unwrap(), parse_card_arg("16r").unwrap()];
        let selection = build_selection(&picks, &deck).unwrap();

        let request = InterpretationRequest::for_card(selection.as_slice(), 1, None, "").unwrap();
        assert_eq!(heading(&selection, &request), "── 2. Challenge: The Tower (reversed) ──");

        let summary = InterpretationRequest::final_summary(selection.as_slice(), None, "").unwrap();
        assert_eq!(heading(&selection, &summary), "── Summary of 2 cards ──");
    }
}
