//! Replay host events through an active-section session.
//!
//! Reads one JSON event per line from stdin and prints one JSON result per
//! line on stdout. Every section is mounted at startup, as on page load.
//!
//! ```text
//! {"type":"intersect","section":"Services","ratio":0.8,"ts":0}
//! {"type":"click","section":"Contact","ts":0}
//! {"type":"frame","ts":1200,"samples":[{"section":"About Us","ratio":0.9}]}
//! ```

use std::io::{self, BufRead};

use anyhow::Result;
use serde::Deserialize;
use serde_json::json;

use scrollspy::clock::{Clock, ManualClock};
use scrollspy::config::Config;
use scrollspy::logging::{log, obj, v_str, Domain, Level};
use scrollspy::navigation::NavigationView;
use scrollspy::reconciler::Activation;
use scrollspy::sections::{SectionId, SectionRegistry};
use scrollspy::session::Session;
use scrollspy::visibility::{Rect, Threshold};

#[derive(Debug, Deserialize)]
struct Sample {
    section: String,
    ratio: f64,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum InputEvent {
    Mount {
        section: String,
        threshold: Option<f64>,
    },
    Unmount {
        section: String,
    },
    Intersect {
        section: String,
        ratio: f64,
        ts: u64,
    },
    Layout {
        section: String,
        element: Rect,
        viewport: Rect,
        ts: u64,
    },
    Frame {
        samples: Vec<Sample>,
        ts: u64,
    },
    Click {
        section: String,
        ts: u64,
    },
}

fn resolve(registry: &SectionRegistry, name: &str) -> Option<SectionId> {
    let id = registry.lookup(name);
    if id.is_none() {
        log(
            Level::Error,
            Domain::System,
            "unknown_section",
            obj(&[("section", v_str(name))]),
        );
    }
    id
}

fn parse_event(line: &str) -> Option<InputEvent> {
    match serde_json::from_str(line) {
        Ok(evt) => Some(evt),
        Err(err) => {
            log(
                Level::Warn,
                Domain::System,
                "bad_event",
                obj(&[("error", v_str(&err.to_string()))]),
            );
            None
        }
    }
}

fn outcome_str(outcome: Option<Activation>) -> &'static str {
    outcome.map(|o| o.as_str()).unwrap_or("no_change")
}

fn main() -> Result<()> {
    let cfg = Config::from_env();
    let registry = cfg.registry()?;
    let clock = ManualClock::new(0);
    let mut session = Session::with_config(registry, clock.clone(), cfg.reconciler());
    session.mount_all();
    let mut nav = NavigationView::new(&session);

    log(
        Level::Info,
        Domain::System,
        "startup",
        obj(&[
            ("sections", json!(session.registry().len())),
            ("suppression_window_ms", json!(cfg.suppression_window_ms)),
        ]),
    );

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let Some(evt) = parse_event(&line) else { continue };

        let mut scroll_to = None;
        let outcome = match evt {
            InputEvent::Mount { section, threshold } => {
                let Some(id) = resolve(session.registry(), &section) else { continue };
                match threshold.map(Threshold::new).transpose() {
                    Ok(Some(t)) => session.mount_with_threshold(id, t),
                    Ok(None) => session.mount(id),
                    Err(err) => {
                        log(
                            Level::Warn,
                            Domain::System,
                            "bad_threshold",
                            obj(&[("section", v_str(&section)), ("error", v_str(&err.to_string()))]),
                        );
                        continue;
                    }
                };
                "mounted"
            }
            InputEvent::Unmount { section } => {
                let Some(id) = resolve(session.registry(), &section) else { continue };
                if session.unmount(id) { "unmounted" } else { "not_mounted" }
            }
            InputEvent::Intersect { section, ratio, ts } => {
                let Some(id) = resolve(session.registry(), &section) else { continue };
                clock.set(ts);
                outcome_str(session.on_intersection(id, ratio))
            }
            InputEvent::Layout { section, element, viewport, ts } => {
                let Some(id) = resolve(session.registry(), &section) else { continue };
                clock.set(ts);
                outcome_str(session.on_layout(id, &element, &viewport))
            }
            InputEvent::Frame { samples, ts } => {
                let resolved: Vec<(SectionId, f64)> = samples
                    .iter()
                    .filter_map(|s| resolve(session.registry(), &s.section).map(|id| (id, s.ratio)))
                    .collect();
                clock.set(ts);
                outcome_str(session.on_frame(&resolved))
            }
            InputEvent::Click { section, ts } => {
                let Some(id) = resolve(session.registry(), &section) else { continue };
                clock.set(ts);
                scroll_to = nav.click(&mut session, id).map(|req| req.anchor);
                "clicked"
            }
        };

        let rerender = nav.refresh();
        println!(
            "{}",
            json!({
                "ts": clock.now_ms(),
                "outcome": outcome,
                "active": session.active_name(),
                "rerender": rerender,
                "scroll_to": scroll_to,
                "nav": nav.render_line(session.registry()),
            })
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_event() {
        assert!(matches!(
            parse_event(r#"{"type":"click","section":"Contact","ts":5}"#),
            Some(InputEvent::Click { ts: 5, .. })
        ));
        assert!(matches!(
            parse_event(r#"{"type":"frame","ts":0,"samples":[{"section":"Home","ratio":0.6}]}"#),
            Some(InputEvent::Frame { .. })
        ));
        assert!(parse_event("{not json").is_none());
        assert!(parse_event(r#"{"type":"scroll","ts":0}"#).is_none());
    }
}
