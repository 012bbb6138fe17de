//! The suggestion engine: source invocation, merge, ranking, default
//! selection, and the asynchronous request pipeline.
//!
//! [`Suggestor`] is an explicit handle constructed once at startup via
//! [`SuggestorBuilder`] and shared by reference; there is no process-wide
//! singleton. One suggestion computation runs per keystroke: creating a
//! new request synchronously expires the previous one, superseded
//! computations abort at their next cancellation check, and results are
//! delivered through a single-consumer sink so the keyboard never sees
//! them out of order or after expiry.

mod pool;

use std::sync::{Arc, LazyLock};

use parking_lot::{Mutex, RwLock};
use regex::Regex;
use tracing::debug;

use crate::casing::{is_all_caps, is_mixed_case, match_case};
use crate::collate::{AccentFolding, KeyCollator, KeyboardAdjacency, LanguageRules, QwertyLayout};
use crate::config::SuggestorConfig;
use crate::dictionary::{
    ContactsDictionary, ContactsProvider, Dictionary, LanguageDictionary, LearningDictionary,
    LookAheadDictionary, NumberDictionary, ShortcutDictionary,
};
use crate::error::{Result, SuggestError};
use crate::store::{MemoryNgramStore, MemoryWordStore, NgramStore, WordStore};
use crate::suggest::{
    CancelToken, RankedSuggestions, Suggestion, SuggestionKind, SuggestionsRequest, TypingContext,
};
use pool::{Delivery, DeliverySink, WorkerPool};

/// Callback receiving the result of one asynchronous request.
///
/// Invoked at most once, from the delivery thread, and never for an
/// expired request.
pub type SuggestionsListener = Box<dyn FnOnce(FinalSuggestions) + Send + 'static>;

static SENTENCES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[.?!\n]").expect("sentence pattern"));
static WORD_BREAKS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-zA-Z0-9'-]+").expect("word break pattern"));
static HAS_LETTER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[a-zA-Z'-]").expect("letter pattern"));

/// The assembled, ranked, deduplicated suggestion list for one request.
#[derive(Debug, Clone)]
pub struct FinalSuggestions {
    composing: String,
    items: Vec<Suggestion>,
    default_index: Option<usize>,
}

impl FinalSuggestions {
    /// The composing text the request matched.
    pub fn composing(&self) -> &str {
        &self.composing
    }

    /// The ranked suggestions.
    pub fn suggestions(&self) -> &[Suggestion] {
        &self.items
    }

    /// Iterate the ranked suggestions.
    pub fn iter(&self) -> impl Iterator<Item = &Suggestion> {
        self.items.iter()
    }

    /// The suggested words, in rank order.
    pub fn words(&self) -> Vec<&str> {
        self.items.iter().map(Suggestion::word).collect()
    }

    /// Number of suggestions.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True if the list is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Index of the auto-commit candidate, or `None` when nothing should
    /// be committed silently.
    pub fn default_index(&self) -> Option<usize> {
        self.default_index
    }

    /// The auto-commit candidate itself, if any.
    pub fn default_suggestion(&self) -> Option<&Suggestion> {
        self.default_index.and_then(|i| self.items.get(i))
    }
}

#[derive(Clone)]
struct ActiveLanguage {
    collator: Arc<KeyCollator>,
    language: Arc<LanguageDictionary>,
    lookahead: Arc<LookAheadDictionary>,
}

struct SuggestorInner {
    config: RwLock<SuggestorConfig>,
    active: RwLock<ActiveLanguage>,
    shortcuts: Arc<ShortcutDictionary>,
    number: NumberDictionary,
    contacts: Option<ContactsDictionary>,
    pending: Mutex<Option<CancelToken>>,
    pool: WorkerPool,
    sink: DeliverySink,
}

/// Builder for a [`Suggestor`].
pub struct SuggestorBuilder {
    rules: Arc<dyn LanguageRules>,
    layout: Arc<dyn KeyboardAdjacency>,
    word_store: Arc<dyn WordStore>,
    ngram_store: Arc<dyn NgramStore>,
    contacts: Option<Arc<dyn ContactsProvider>>,
    shortcuts: Vec<(String, String)>,
    config: SuggestorConfig,
}

impl Default for SuggestorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SuggestorBuilder {
    /// Start from accent-folding rules, a QWERTY layout, empty in-memory
    /// stores, and the default configuration.
    pub fn new() -> Self {
        SuggestorBuilder {
            rules: Arc::new(AccentFolding),
            layout: Arc::new(QwertyLayout),
            word_store: Arc::new(MemoryWordStore::new()),
            ngram_store: Arc::new(MemoryNgramStore::new()),
            contacts: None,
            shortcuts: Vec::new(),
            config: SuggestorConfig::default(),
        }
    }

    /// Language character-equivalence rules.
    pub fn rules(mut self, rules: Arc<dyn LanguageRules>) -> Self {
        self.rules = rules;
        self
    }

    /// Keyboard layout adjacency.
    pub fn layout(mut self, layout: Arc<dyn KeyboardAdjacency>) -> Self {
        self.layout = layout;
        self
    }

    /// Persistent vocabulary store for the active language.
    pub fn word_store(mut self, store: Arc<dyn WordStore>) -> Self {
        self.word_store = store;
        self
    }

    /// Persistent trigram store for the active language.
    pub fn ngram_store(mut self, store: Arc<dyn NgramStore>) -> Self {
        self.ngram_store = store;
        self
    }

    /// Contact directory provider.
    pub fn contacts(mut self, provider: Arc<dyn ContactsProvider>) -> Self {
        self.contacts = Some(provider);
        self
    }

    /// Initial keystroke shortcuts.
    pub fn shortcuts<I, K, V>(mut self, shortcuts: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.shortcuts
            .extend(shortcuts.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Engine configuration.
    pub fn config(mut self, config: SuggestorConfig) -> Self {
        self.config = config;
        self
    }

    /// Build the suggestor and start loading the dictionaries in the
    /// background.
    pub fn build(self) -> Suggestor {
        let collator = Arc::new(KeyCollator::new(self.rules, self.layout));
        let language = Arc::new(LanguageDictionary::new(
            Arc::clone(&collator),
            self.word_store,
            &self.config,
        ));
        let lookahead = Arc::new(LookAheadDictionary::new(
            Arc::clone(&collator),
            self.ngram_store,
            &self.config,
        ));
        let contacts = self
            .contacts
            .map(|provider| ContactsDictionary::new(provider, self.config.contact_min_prefix));

        let suggestor = Suggestor {
            inner: Arc::new(SuggestorInner {
                config: RwLock::new(self.config),
                active: RwLock::new(ActiveLanguage {
                    collator,
                    language,
                    lookahead,
                }),
                shortcuts: Arc::new(ShortcutDictionary::with_shortcuts(self.shortcuts)),
                number: NumberDictionary::new(),
                contacts,
                pending: Mutex::new(None),
                pool: WorkerPool::new(),
                sink: DeliverySink::new(),
            }),
        };
        suggestor.load_in_background();
        suggestor
    }
}

/// The suggestion engine handle.
///
/// Cheap to clone; clones share the same dictionaries, worker pool, and
/// pending-request state.
#[derive(Clone)]
pub struct Suggestor {
    inner: Arc<SuggestorInner>,
}

impl Suggestor {
    /// Start building a suggestor.
    pub fn builder() -> SuggestorBuilder {
        SuggestorBuilder::new()
    }

    /// Compute suggestions for `context` on a worker thread and hand the
    /// result to `listener`.
    ///
    /// Fire-and-forget: the listener runs at most once, on the delivery
    /// thread, and not at all if a newer request supersedes this one
    /// first.
    pub fn find_suggestions_async<L>(&self, context: TypingContext, listener: L)
    where
        L: FnOnce(FinalSuggestions) + Send + 'static,
    {
        let request = self.begin_request(context);
        let token = request.token().clone();
        let listener: SuggestionsListener = Box::new(listener);
        let inner = Arc::clone(&self.inner);
        self.inner.pool.run(move || {
            match compute(&inner, &request) {
                Ok(suggestions) => inner.sink.deliver(Delivery {
                    token,
                    listener,
                    suggestions,
                }),
                Err(SuggestError::Expired) => {
                    debug!(composing = %request.composing(), "suggestions expired");
                }
            }
        });
    }

    /// Compute suggestions synchronously on the calling thread.
    ///
    /// Fails with [`SuggestError::Expired`] if a concurrent request
    /// supersedes this one mid-computation.
    pub fn find_suggestions(&self, context: TypingContext) -> Result<FinalSuggestions> {
        let request = self.begin_request(context);
        compute(&self.inner, &request)
    }

    /// Learn the words and trigrams of committed `text` on a worker
    /// thread.
    pub fn learn(&self, text: impl Into<String>) {
        let text = text.into();
        let inner = Arc::clone(&self.inner);
        self.inner.pool.run(move || learn_text(&inner, &text));
    }

    /// Forget the word behind `suggestion`, if it came from the learnable
    /// vocabulary and is not too established to drop.
    pub fn forget(&self, suggestion: &Suggestion) -> bool {
        match suggestion.kind() {
            SuggestionKind::Language { .. } | SuggestionKind::Composing => {
                self.active().language.forget(suggestion.word())
            }
            _ => false,
        }
    }

    /// Explicitly keep a composing word the user accepted. Returns false
    /// if the word is already remembered.
    pub fn remember(&self, word: &str) -> bool {
        self.active().language.remember(word)
    }

    /// True if any enabled source knows `word`, ignoring case.
    pub fn contains_ignore_case(&self, word: &str) -> bool {
        if self.active().language.contains_ignore_case(word) {
            return true;
        }
        if self.inner.number.contains(word) {
            return true;
        }
        let include_contacts = self.inner.config.read().include_contacts;
        if include_contacts {
            if let Some(contacts) = &self.inner.contacts {
                return contacts.contains(word);
            }
        }
        false
    }

    /// Replace the engine configuration.
    ///
    /// Source toggles apply to the next request. Costs and learning
    /// thresholds are captured per language; call
    /// [`set_language`](Self::set_language) to rebuild with new ones.
    pub fn apply_settings(&self, config: SuggestorConfig) {
        *self.inner.config.write() = config;
    }

    /// Switch the active language: new collation, new stores, and a fresh
    /// background load. In-flight searches finish against the old
    /// dictionaries and die with their expired requests.
    pub fn set_language(
        &self,
        rules: Arc<dyn LanguageRules>,
        layout: Arc<dyn KeyboardAdjacency>,
        word_store: Arc<dyn WordStore>,
        ngram_store: Arc<dyn NgramStore>,
    ) {
        let config = self.inner.config.read().clone();
        let collator = Arc::new(KeyCollator::new(rules, layout));
        let language = Arc::new(LanguageDictionary::new(
            Arc::clone(&collator),
            word_store,
            &config,
        ));
        let lookahead = Arc::new(LookAheadDictionary::new(
            Arc::clone(&collator),
            ngram_store,
            &config,
        ));

        {
            let mut active = self.inner.active.write();
            active.language.cancel_load();
            active.lookahead.cancel_load();
            *active = ActiveLanguage {
                collator,
                language,
                lookahead,
            };
        }
        self.load_in_background();
    }

    /// Load both dictionaries synchronously. Intended for tests and
    /// spell-check style callers that need a populated engine now.
    pub fn load_now(&self) {
        let active = self.active();
        active.language.load();
        active.lookahead.load();
    }

    /// Load both dictionaries on a worker thread.
    pub fn load_in_background(&self) {
        let active = self.active();
        self.inner.pool.run(move || {
            active.language.load();
            active.lookahead.load();
        });
    }

    /// Add or replace a keystroke shortcut.
    pub fn set_shortcut(&self, keystroke: &str, expansion: impl Into<String>) {
        self.inner.shortcuts.set(keystroke, expansion);
    }

    /// Remove a keystroke shortcut.
    pub fn remove_shortcut(&self, keystroke: &str) {
        self.inner.shortcuts.remove(keystroke);
    }

    /// The active language dictionary.
    pub fn language_dictionary(&self) -> Arc<LanguageDictionary> {
        self.active().language
    }

    /// The active look-ahead dictionary.
    pub fn lookahead_dictionary(&self) -> Arc<LookAheadDictionary> {
        self.active().lookahead
    }

    fn active(&self) -> ActiveLanguage {
        self.inner.active.read().clone()
    }

    fn begin_request(&self, context: TypingContext) -> SuggestionsRequest {
        let request = SuggestionsRequest::new(context);
        let mut pending = self.inner.pending.lock();
        if let Some(previous) = pending.replace(request.token().clone()) {
            previous.expire();
        }
        request
    }
}

fn compute(inner: &SuggestorInner, request: &SuggestionsRequest) -> Result<FinalSuggestions> {
    let token = request.token();
    token.check()?;

    let config = inner.config.read().clone();
    let active = inner.active.read().clone();
    let composing = request.composing().to_string();

    // Look-ahead runs even with nothing composed; prediction is exactly
    // what an empty fragment needs.
    let look_list = if config.predict_next_word {
        Some(active.lookahead.suggestions(request)?)
    } else {
        None
    };

    let mut ranked = RankedSuggestions::new(config.max_suggestions, token.clone());

    if composing.is_empty() {
        if let Some(list) = look_list {
            ranked.offer_all(list.into_vec())?;
        }
        let mut items = ranked.into_vec();
        apply_case(&mut items, "", request.context());
        let (items, _) = dedup(items, None);
        return Ok(FinalSuggestions {
            composing,
            items,
            default_index: None,
        });
    }

    let shortcut_list = inner.shortcuts.suggestions(request)?;
    let number_list = inner.number.suggestions(request)?;
    let contact_list = match (&inner.contacts, config.include_contacts) {
        (Some(contacts), true) => Some(contacts.suggestions(request)?),
        _ => None,
    };
    let language_list = active.language.suggestions(request)?;

    token.check()?;
    ranked.offer_all(shortcut_list.into_vec())?;
    ranked.offer_all(number_list.into_vec())?;
    if let Some(list) = contact_list {
        ranked.offer_all(list.into_vec())?;
    }
    if let Some(list) = look_list {
        ranked.offer_all(list.into_vec())?;
    }
    ranked.offer_all(language_list.into_vec())?;

    let mut items = ranked.into_vec();
    token.check()?;

    apply_case(&mut items, &composing, request.context());
    place_composing(&mut items, &composing, &active.collator);
    bound_list(&mut items, &composing, config.max_suggestions);
    let default_index = assign_default(&items, &composing, &active.collator, &config);
    let (items, default_index) = dedup(items, default_index);
    let default_index = default_index.filter(|&index| index < items.len());

    token.check()?;
    Ok(FinalSuggestions {
        composing,
        items,
        default_index,
    })
}

/// Match every suggestion's case to the typed text, or to the shift and
/// caps-lock state when nothing is typed. Shortcut expansions keep their
/// own casing.
fn apply_case(items: &mut [Suggestion], reference: &str, context: &TypingContext) {
    for suggestion in items.iter_mut() {
        if matches!(suggestion.kind(), SuggestionKind::Shortcut) {
            continue;
        }
        let adjusted = match_case(
            reference,
            suggestion.word(),
            context.shift,
            context.caps_lock,
        );
        if adjusted != suggestion.word() {
            suggestion.set_word(adjusted);
        }
    }
}

/// Promote the best equivalent match to the front, and make sure the
/// literal composing text is present somewhere in the list.
fn place_composing(items: &mut Vec<Suggestion>, composing: &str, collator: &KeyCollator) {
    if let Some(index) = items
        .iter()
        .position(|s| collator.compare_words(composing, s.word()))
    {
        if index > 0 {
            let promoted = items.remove(index);
            items.insert(0, promoted);
        }
    }

    match items.iter().position(|s| s.word() == composing) {
        Some(index) if index > 0 => {
            // A literal match buried behind a promoted near-match becomes
            // the composing entry at the front.
            let literal = items.remove(index);
            items.insert(0, literal.into_composing());
        }
        Some(_) => {}
        None => items.push(Suggestion::composing(composing)),
    }
}

/// Cap the list length without ever cutting the literal composing entry,
/// which [`place_composing`] may have appended past the cap.
fn bound_list(items: &mut Vec<Suggestion>, composing: &str, cap: usize) {
    if items.len() <= cap {
        return;
    }
    match items.iter().position(|s| s.word() == composing) {
        Some(index) if index >= cap => {
            let literal = items.remove(index);
            items.truncate(cap.saturating_sub(1));
            items.push(literal);
        }
        _ => items.truncate(cap),
    }
}

/// Choose the auto-commit candidate: the first shortcut, language, or
/// look-ahead suggestion. No candidate qualifies if committing it would
/// silently rewrite a single keystroke, or if its score marks the match
/// as too weak to trust.
fn assign_default(
    items: &[Suggestion],
    composing: &str,
    collator: &KeyCollator,
    config: &SuggestorConfig,
) -> Option<usize> {
    let index = items.iter().position(Suggestion::is_defaultable)?;
    if index > 0
        && composing.chars().count() == 1
        && !collator.compare_words(composing, items[index].word())
    {
        return None;
    }
    if items[index].score() >= config.default_score_ceiling {
        return None;
    }
    Some(index)
}

/// Drop duplicate words, keeping the earliest occurrence and repairing
/// the default index as entries shift or collapse.
fn dedup(items: Vec<Suggestion>, default_index: Option<usize>) -> (Vec<Suggestion>, Option<usize>) {
    let mut kept: Vec<Suggestion> = Vec::with_capacity(items.len());
    let mut new_default = None;
    for (index, suggestion) in items.into_iter().enumerate() {
        match kept.iter().position(|k| k.word() == suggestion.word()) {
            Some(existing) => {
                if default_index == Some(index) {
                    new_default = Some(existing);
                }
            }
            None => {
                if default_index == Some(index) {
                    new_default = Some(kept.len());
                }
                kept.push(suggestion);
            }
        }
    }
    (kept, new_default)
}

fn learn_text(inner: &SuggestorInner, text: &str) {
    if text.is_empty() {
        return;
    }
    let config = inner.config.read().clone();
    let active = inner.active.read().clone();

    for sentence in SENTENCES.split(text) {
        let sentence = sentence.trim();
        if sentence.is_empty() {
            continue;
        }

        // The keyboard capitalized the sentence lead, not the user; undo
        // that before counting, unless the casing looks intentional.
        let sentence = if config.auto_caps && !is_all_caps(sentence) && !is_mixed_case(sentence) {
            decapitalize(sentence)
        } else {
            sentence.to_string()
        };

        let words: Vec<&str> = WORD_BREAKS
            .split(&sentence)
            .filter(|word| !word.is_empty())
            .collect();

        for word in &words {
            active.language.learn(word);
        }

        for window in words.windows(3) {
            if window.iter().all(|word| HAS_LETTER.is_match(word)) {
                active.lookahead.learn(&window.join(" "));
            }
        }
    }
}

fn decapitalize(sentence: &str) -> String {
    let mut chars = sentence.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dedup_keeps_earliest_and_repairs_default() {
        let items = vec![
            Suggestion::composing("the"),
            Suggestion::language("thee", 10, 1_000, 1.0),
            Suggestion::language("the", 500, 1_000, 0.0),
            Suggestion::language("then", 50, 1_000, 1.0),
        ];
        // Default pointed at the duplicate "the".
        let (kept, default) = dedup(items, Some(2));
        let words: Vec<&str> = kept.iter().map(Suggestion::word).collect();
        assert_eq!(words, vec!["the", "thee", "then"]);
        // Repaired to the surviving first occurrence.
        assert_eq!(default, Some(0));

        let items = vec![
            Suggestion::language("aa", 10, 1_000, 0.0),
            Suggestion::language("aa", 10, 1_000, 0.0),
            Suggestion::language("bb", 10, 1_000, 0.0),
        ];
        let (kept, default) = dedup(items, Some(2));
        assert_eq!(kept.len(), 2);
        assert_eq!(default, Some(1));
    }

    #[test]
    fn bound_list_never_cuts_the_literal() {
        let mut items: Vec<Suggestion> = (0..5)
            .map(|i| Suggestion::language(format!("word{i}"), 100, 1_000, 0.0))
            .collect();
        items.push(Suggestion::composing("wor"));
        bound_list(&mut items, "wor", 4);
        assert_eq!(items.len(), 4);
        assert_eq!(items.last().unwrap().word(), "wor");

        let mut short = vec![Suggestion::composing("ok")];
        bound_list(&mut short, "ok", 4);
        assert_eq!(short.len(), 1);
    }

    #[test]
    fn decapitalize_only_touches_the_lead() {
        assert_eq!(decapitalize("Hello there"), "hello there");
        assert_eq!(decapitalize(""), "");
    }

    #[test]
    fn place_composing_appends_literal_when_absent() {
        let collator = KeyCollator::new(Arc::new(AccentFolding), Arc::new(QwertyLayout));
        let mut items = vec![Suggestion::language("the", 500, 1_000, 1.0)];
        place_composing(&mut items, "teh", &collator);
        let words: Vec<&str> = items.iter().map(Suggestion::word).collect();
        assert_eq!(words, vec!["the", "teh"]);
        assert!(matches!(
            items[1].kind(),
            SuggestionKind::Composing
        ));
    }

    #[test]
    fn place_composing_promotes_equivalent_match() {
        let collator = KeyCollator::new(Arc::new(AccentFolding), Arc::new(QwertyLayout));
        let mut items = vec![
            Suggestion::language("they", 900, 1_000, 1.0),
            Suggestion::language("The", 500, 1_000, 0.0),
        ];
        place_composing(&mut items, "the", &collator);
        let words: Vec<&str> = items.iter().map(Suggestion::word).collect();
        // "The" is equivalent to the composing text and moves up front;
        // the literal "the" is still guaranteed present.
        assert_eq!(words, vec!["The", "they", "the"]);
    }
}
