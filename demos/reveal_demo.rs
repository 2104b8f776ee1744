//! Reveal Demo: the typewriter engine without a server.
//!
//! A feeder thread plays the part of the story server, sending chunks in
//! bursts the way a language model does. The reveal engine smooths them
//! out to a steady pace on stdout, then the final text and its choices are
//! printed once the animation has caught up.
//!
//! Usage: `cargo run --example reveal_demo [tick_ms]`

use crossbeam_channel::{select, unbounded};
use std::cell::Cell;
use std::io::Write;
use std::rc::Rc;
use std::thread;
use std::time::{Duration, Instant};
use storyteller::{extract_choices, RevealConfig, RevealEngine, StoryEvent};

const STORY: &str = "The lantern gutters as you step into the vault. Dust hangs \
in the air like a held breath, and somewhere below, water drips onto stone with \
the patience of a clock.\n\nA door of black iron waits at the far end.\n\n\
1. Try the iron door\n2. Follow the sound of water\n3. Go back up the stairs\n";

fn main() {
    let tick_ms = std::env::args()
        .nth(1)
        .and_then(|arg| arg.parse().ok())
        .unwrap_or(14);
    let config = RevealConfig::with_period_ms(tick_ms);

    println!("Storyteller Reveal Demo");
    println!("=======================");
    println!(
        "tick {}ms, {} chars per tick\n",
        tick_ms,
        config.chars_per_tick()
    );

    // Bursty feed: a handful of words at a time, then a pause.
    let (feed_tx, feed_rx) = unbounded::<StoryEvent>();
    let feeder = thread::spawn(move || {
        let words: Vec<&str> = STORY.split_inclusive(' ').collect();
        for burst in words.chunks(6) {
            let text = burst.concat();
            if feed_tx.send(StoryEvent::Chunk { text }).is_err() {
                return;
            }
            thread::sleep(Duration::from_millis(120));
        }
        let _ = feed_tx.send(StoryEvent::Final {
            story: STORY.to_string(),
        });
    });

    let printed = Rc::new(Cell::new(0usize));
    let sink_printed = Rc::clone(&printed);
    let mut engine = RevealEngine::new(config);
    engine.start("", move |frame: &str| {
        let from = sink_printed.get();
        print!("{}", &frame[from..]);
        let _ = std::io::stdout().flush();
        sink_printed.set(frame.len());
    });

    let started = Instant::now();
    let mut feed = Some(feed_rx);
    let completion = loop {
        let ticks = engine.ticks();
        let events = feed.clone().unwrap_or_else(crossbeam_channel::never);
        select! {
            recv(ticks) -> _ => {
                if let Some(done) = engine.tick() {
                    break done;
                }
            }
            recv(events) -> event => match event {
                Ok(StoryEvent::Chunk { text }) => {
                    engine.enqueue(&text);
                }
                Ok(StoryEvent::Final { story }) => {
                    if let Some(done) = engine.finalize(story) {
                        break done;
                    }
                }
                Ok(StoryEvent::Error { message }) => {
                    eprintln!("\nerror: {message}");
                    return;
                }
                Err(_) => feed = None,
            },
        }
    };

    let _ = feeder.join();

    let page = extract_choices(&completion.story);
    println!("\n\n--- {} chars in {:?} ---", completion.revealed_chars, started.elapsed());
    for (i, choice) in page.choices.iter().enumerate() {
        println!("  [{}] {choice}", i + 1);
    }
}
