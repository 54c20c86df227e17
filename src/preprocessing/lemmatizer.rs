//! Dictionary and suffix-rule lemmatizer
//!
//! Irregular forms are looked up in an exception table; regular plurals and
//! the safe subset of `-ing`/`-ed` verb forms are reduced by suffix rules.
//! Reduction is repeated until the word stops changing, so every lemma is a
//! fixed point of [`Lemmatizer::lemmatize`].

use std::collections::HashMap;

/// Irregular or rule-resistant forms and their base form. A word mapped to
/// itself is protected from the suffix rules.
const EXCEPTIONS: &[(&str, &str)] = &[
    // irregular verbs
    ("went", "go"),
    ("gone", "go"),
    ("goes", "go"),
    ("going", "go"),
    ("got", "get"),
    ("gotten", "get"),
    ("getting", "get"),
    ("gave", "give"),
    ("given", "give"),
    ("giving", "give"),
    ("took", "take"),
    ("taken", "take"),
    ("taking", "take"),
    ("made", "make"),
    ("making", "make"),
    ("came", "come"),
    ("coming", "come"),
    ("paid", "pay"),
    ("bought", "buy"),
    ("sent", "send"),
    ("spent", "spend"),
    ("lost", "lose"),
    ("losing", "lose"),
    ("kept", "keep"),
    ("left", "leave"),
    ("leaving", "leave"),
    ("told", "tell"),
    ("said", "say"),
    ("saw", "see"),
    ("seen", "see"),
    ("found", "find"),
    ("thought", "think"),
    ("felt", "feel"),
    ("knew", "know"),
    ("known", "know"),
    ("ran", "run"),
    ("running", "run"),
    ("stuck", "stick"),
    ("froze", "freeze"),
    ("frozen", "freeze"),
    ("freezing", "freeze"),
    ("wrote", "write"),
    ("written", "write"),
    ("writing", "write"),
    ("chose", "choose"),
    ("chosen", "choose"),
    ("understood", "understand"),
    ("forgot", "forget"),
    ("forgotten", "forget"),
    ("broke", "break"),
    ("broken", "break"),
    ("began", "begin"),
    ("begun", "begin"),
    ("brought", "bring"),
    ("built", "build"),
    ("held", "hold"),
    ("met", "meet"),
    ("read", "read"),
    ("led", "lead"),
    ("fell", "fall"),
    ("won", "win"),
    ("used", "use"),
    ("using", "use"),
    ("uses", "use"),
    // e-final verbs the rules cannot restore
    ("loading", "load"),
    ("loaded", "load"),
    ("updated", "update"),
    ("updating", "update"),
    ("closed", "close"),
    ("closing", "close"),
    ("charged", "charge"),
    ("charging", "charge"),
    ("changed", "change"),
    ("changing", "change"),
    ("solved", "solve"),
    ("solving", "solve"),
    ("improved", "improve"),
    ("improving", "improve"),
    ("released", "release"),
    ("required", "require"),
    ("requiring", "require"),
    ("registered", "register"),
    ("registering", "register"),
    ("wasted", "waste"),
    ("wasting", "waste"),
    ("saved", "save"),
    ("saving", "save"),
    ("received", "receive"),
    ("receiving", "receive"),
    ("declined", "decline"),
    ("hated", "hate"),
    ("loved", "love"),
    ("loving", "love"),
    ("liked", "like"),
    ("disappointed", "disappoint"),
    ("disappointing", "disappoint"),
    ("responded", "respond"),
    ("needed", "need"),
    ("needing", "need"),
    ("opened", "open"),
    ("opening", "open"),
    ("happened", "happen"),
    ("happening", "happen"),
    ("entered", "enter"),
    ("entering", "enter"),
    ("reset", "reset"),
    ("login", "login"),
    // irregular nouns
    ("children", "child"),
    ("people", "person"),
    ("men", "man"),
    ("women", "woman"),
    ("feet", "foot"),
    ("teeth", "tooth"),
    ("mice", "mouse"),
    ("lives", "life"),
    ("wives", "wife"),
    ("knives", "knife"),
    ("movies", "movie"),
    ("cookies", "cookie"),
    ("buses", "bus"),
    ("data", "datum"),
    ("criteria", "criterion"),
    // comparatives
    ("better", "well"),
    ("best", "well"),
    ("worse", "bad"),
    ("worst", "bad"),
    // protected forms
    ("banking", "banking"),
    ("morning", "morning"),
    ("evening", "evening"),
    ("interesting", "interesting"),
    ("amazing", "amazing"),
    ("annoying", "annoying"),
    ("boring", "boring"),
    ("news", "news"),
    ("series", "series"),
    ("status", "status"),
    ("bonus", "bonus"),
    ("atlas", "atlas"),
    ("canvas", "canvas"),
    ("alias", "alias"),
    ("bias", "bias"),
    ("always", "always"),
    ("perhaps", "perhaps"),
    ("sometimes", "sometimes"),
    ("thanks", "thank"),
];

/// Final consonants after which a stripped `-ing`/`-ed` stem is a complete word.
/// `r` and `s` are left out: after another consonant (str-ing, hundr-ed,
/// nurs-ed) they never close an English base form.
const CLEAN_STEM_ENDINGS: &str = "kdtpmnhwx";

/// Dictionary and suffix-rule lemmatizer
#[derive(Debug, Clone)]
pub struct Lemmatizer {
    exceptions: HashMap<&'static str, &'static str>,
}

impl Lemmatizer {
    /// Create a lemmatizer with the built-in English exception table
    pub fn new() -> Self {
        Self {
            exceptions: EXCEPTIONS.iter().copied().collect(),
        }
    }

    /// Reduce a lower-case alphabetic word to its base form
    pub fn lemmatize(&self, word: &str) -> String {
        let mut current = word.to_string();
        // each rule shortens the word and exceptions map to fixed points,
        // so the loop settles within len + 1 rounds
        for _ in 0..=word.len() {
            let next = self.reduce_once(&current);
            if next == current {
                break;
            }
            current = next;
        }
        current
    }

    fn reduce_once(&self, word: &str) -> String {
        if let Some(base) = self.exceptions.get(word) {
            return (*base).to_string();
        }
        if !word.is_ascii() {
            return word.to_string();
        }

        let len = word.len();

        // plurals
        if len > 4 && word.ends_with("ies") {
            return format!("{}y", &word[..len - 3]);
        }
        if word.ends_with("sses") {
            return word[..len - 2].to_string();
        }
        if len > 4 && (word.ends_with("ches") || word.ends_with("shes") || word.ends_with("xes")) {
            return word[..len - 2].to_string();
        }
        if len > 3
            && word.ends_with('s')
            && !word.ends_with("ss")
            && !word.ends_with("us")
            && !word.ends_with("is")
        {
            return word[..len - 1].to_string();
        }

        // verb forms
        for suffix in ["ing", "ed"] {
            if let Some(stem) = word.strip_suffix(suffix) {
                if let Some(base) = verb_stem(stem) {
                    return base;
                }
            }
        }

        word.to_string()
    }
}

impl Default for Lemmatizer {
    fn default() -> Self {
        Self::new()
    }
}

fn is_vowel(c: u8) -> bool {
    matches!(c, b'a' | b'e' | b'i' | b'o' | b'u')
}

/// Accept a stripped verb stem only when it cannot be missing a final `e`
fn verb_stem(stem: &str) -> Option<String> {
    let bytes = stem.as_bytes();
    if bytes.len() < 3 {
        return None;
    }
    let last = bytes[bytes.len() - 1];
    let prev = bytes[bytes.len() - 2];

    // play-ed, delay-ed, enjoy-ing
    if last == b'y' && is_vowel(prev) {
        return Some(stem.to_string());
    }
    if is_vowel(last) || is_vowel(prev) || last == b'y' || prev == b'y' {
        return None;
    }
    if last == prev {
        // call-ed, pass-ed keep the double letter; stopp-ed, transferr-ed drop one
        return if matches!(last, b'l' | b's' | b'f' | b'z') {
            Some(stem.to_string())
        } else if bytes.len() > 3 {
            Some(stem[..stem.len() - 1].to_string())
        } else {
            None
        };
    }
    // curl-ed, but not handl-ed
    if last == b'l' {
        return (prev == b'r').then(|| stem.to_string());
    }
    if CLEAN_STEM_ENDINGS.as_bytes().contains(&last) {
        Some(stem.to_string())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plural_reduction() {
        let lemmatizer = Lemmatizer::new();
        assert_eq!(lemmatizer.lemmatize("apps"), "app");
        assert_eq!(lemmatizer.lemmatize("transactions"), "transaction");
        assert_eq!(lemmatizer.lemmatize("replies"), "reply");
        assert_eq!(lemmatizer.lemmatize("crashes"), "crash");
        assert_eq!(lemmatizer.lemmatize("issues"), "issue");
        assert_eq!(lemmatizer.lemmatize("access"), "access");
    }

    #[test]
    fn test_verb_reduction() {
        let lemmatizer = Lemmatizer::new();
        assert_eq!(lemmatizer.lemmatize("working"), "work");
        assert_eq!(lemmatizer.lemmatize("crashed"), "crash");
        assert_eq!(lemmatizer.lemmatize("stopped"), "stop");
        assert_eq!(lemmatizer.lemmatize("transferred"), "transfer");
        assert_eq!(lemmatizer.lemmatize("installed"), "install");
        assert_eq!(lemmatizer.lemmatize("curled"), "curl");
        assert_eq!(lemmatizer.lemmatize("handled"), "handled");
        assert_eq!(lemmatizer.lemmatize("delayed"), "delay");
        assert_eq!(lemmatizer.lemmatize("updating"), "update");
        assert_eq!(lemmatizer.lemmatize("paid"), "pay");
    }

    #[test]
    fn test_short_words_untouched() {
        let lemmatizer = Lemmatizer::new();
        assert_eq!(lemmatizer.lemmatize("red"), "red");
        assert_eq!(lemmatizer.lemmatize("bus"), "bus");
        assert_eq!(lemmatizer.lemmatize("speed"), "speed");
        assert_eq!(lemmatizer.lemmatize("thing"), "thing");
        assert_eq!(lemmatizer.lemmatize("string"), "string");
        assert_eq!(lemmatizer.lemmatize("spring"), "spring");
        assert_eq!(lemmatizer.lemmatize("hundred"), "hundred");
        assert_eq!(lemmatizer.lemmatize("sacred"), "sacred");
        assert_eq!(lemmatizer.lemmatize("movies"), "movie");
        assert_eq!(lemmatizer.lemmatize("buses"), "bus");
        assert_eq!(lemmatizer.lemmatize("atlas"), "atlas");
    }

    #[test]
    fn test_exception_values_are_fixed_points() {
        let lemmatizer = Lemmatizer::new();
        for (_, base) in EXCEPTIONS {
            assert_eq!(lemmatizer.lemmatize(base), *base, "{} is not a fixed point", base);
        }
    }

    #[test]
    fn test_lemmatize_is_idempotent() {
        let lemmatizer = Lemmatizer::new();
        for word in [
            "accounts", "childrens", "glasses", "boxes", "processing", "focused", "bugged",
            "helped", "checked", "sending", "banks", "features", "services",
        ] {
            let once = lemmatizer.lemmatize(word);
            assert_eq!(lemmatizer.lemmatize(&once), once, "{} -> {}", word, once);
        }
    }
}
