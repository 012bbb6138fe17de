//! Request supersession and read/write discipline under concurrency.

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use keysuggest::dictionary::ContactsProvider;
use keysuggest::prelude::*;
use parking_lot::Mutex;

/// A contact directory whose first lookup blocks until released, pinning
/// one computation mid-flight so a second request can supersede it
/// deterministically.
struct GatedContacts {
    gate: Mutex<Option<Receiver<()>>>,
    names: Vec<String>,
}

impl GatedContacts {
    fn new(names: &[&str]) -> (Arc<Self>, Sender<()>) {
        let (tx, rx) = mpsc::channel();
        let provider = Arc::new(GatedContacts {
            gate: Mutex::new(Some(rx)),
            names: names.iter().map(|n| n.to_string()).collect(),
        });
        (provider, tx)
    }
}

impl ContactsProvider for GatedContacts {
    fn names_with_prefix(&self, prefix: &str) -> Vec<String> {
        if let Some(gate) = self.gate.lock().take() {
            // Hold the first caller until the test releases it.
            let _ = gate.recv_timeout(Duration::from_secs(10));
        }
        self.names
            .iter()
            .filter(|name| {
                name.split_whitespace()
                    .any(|part| part.to_lowercase().starts_with(prefix))
            })
            .cloned()
            .collect()
    }
}

fn gated_suggestor(names: &[&str]) -> (Suggestor, Sender<()>) {
    let (provider, release) = GatedContacts::new(names);
    let config = SuggestorConfig {
        include_contacts: true,
        ..SuggestorConfig::default()
    };
    let suggestor = Suggestor::builder()
        .word_store(Arc::new(MemoryWordStore::with_words([
            ("gabble", 500u32),
            ("gabbles", 100),
        ])))
        .contacts(provider)
        .config(config)
        .build();
    suggestor.load_now();
    (suggestor, release)
}

#[test]
fn rapid_requests_deliver_only_the_newest() {
    let (suggestor, release) = gated_suggestor(&["Gabriella Hart"]);

    let (first_tx, first_rx) = mpsc::channel();
    suggestor.find_suggestions_async(TypingContext::composing("gabri"), move |result| {
        let _ = first_tx.send(result.words().join(","));
    });

    let (second_tx, second_rx) = mpsc::channel();
    suggestor.find_suggestions_async(TypingContext::composing("gabrie"), move |result| {
        let _ = second_tx.send(result.composing().to_string());
    });

    // Unblock whichever computation is parked in the directory lookup.
    drop(release);

    let delivered = second_rx
        .recv_timeout(Duration::from_secs(5))
        .expect("the newest request must be delivered");
    assert_eq!(delivered, "gabrie");

    // The superseded request must never reach its listener.
    assert!(first_rx.recv_timeout(Duration::from_millis(300)).is_err());
}

#[test]
fn synchronous_request_superseded_mid_flight_reports_expiry() {
    let (suggestor, release) = gated_suggestor(&["Gabriella Hart"]);

    let worker = {
        let suggestor = suggestor.clone();
        thread::spawn(move || suggestor.find_suggestions(TypingContext::composing("gabri")))
    };

    // Give the blocked computation time to reach the directory gate, then
    // supersede it.
    thread::sleep(Duration::from_millis(100));
    suggestor.find_suggestions_async(TypingContext::composing("gabrie"), |_| {});
    drop(release);

    let result = worker.join().unwrap();
    assert_eq!(result.unwrap_err(), SuggestError::Expired);
}

#[test]
fn searches_and_learning_interleave_safely() {
    let words: Vec<(String, u32)> = (0..100)
        .map(|i| (format!("prefix{i:02}"), 50 + i))
        .collect();
    let suggestor = Suggestor::builder()
        .word_store(Arc::new(MemoryWordStore::with_words(words)))
        .build();
    suggestor.load_now();

    let writer = {
        let language = suggestor.language_dictionary();
        thread::spawn(move || {
            for i in 0..200 {
                language.learn(&format!("prefix{:02}", i % 100));
            }
        })
    };

    let reader = {
        let suggestor = suggestor.clone();
        thread::spawn(move || {
            let mut nonempty = 0;
            for _ in 0..50 {
                let result = suggestor
                    .find_suggestions(TypingContext::composing("prefix"))
                    .expect("single sequential caller is never superseded");
                if !result.is_empty() {
                    nonempty += 1;
                }
            }
            nonempty
        })
    };

    writer.join().unwrap();
    let nonempty = reader.join().unwrap();
    assert_eq!(nonempty, 50);
}

#[test]
fn language_switch_discards_stale_vocabulary() {
    let suggestor = Suggestor::builder()
        .word_store(Arc::new(MemoryWordStore::with_words([("hello", 100u32)])))
        .build();
    suggestor.load_now();
    assert!(suggestor.contains_ignore_case("hello"));

    suggestor.set_language(
        Arc::new(AccentFolding),
        Arc::new(QwertyLayout),
        Arc::new(MemoryWordStore::with_words([("hallo", 100u32)])),
        Arc::new(MemoryNgramStore::new()),
    );
    suggestor.load_now();

    assert!(suggestor.contains_ignore_case("hallo"));
    assert!(!suggestor.contains_ignore_case("hello"));
}
