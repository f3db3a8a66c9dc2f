//! Markdown to speakable text.

use regex::Regex;
use std::sync::LazyLock;

struct Rule {
    pattern: Regex,
    replacement: &'static str,
}

fn rule(pattern: &str, replacement: &'static str) -> Rule {
    Rule {
        pattern: Regex::new(pattern).expect("valid markdown rule"),
        replacement,
    }
}

// Order matters: details blocks go before generic tag stripping, otherwise
// their contents would survive.
static RULES: LazyLock<Vec<Rule>> = LazyLock::new(|| {
    vec![
        rule(r"(?s)<details>.*?</details>", ""),
        rule(r"(?m)^#+\s*", ""),
        rule(r"\*\*([^*]+)\*\*", "$1"),
        rule(r"\*([^*]+)\*", "$1"),
        rule(r"`([^`]+)`", "$1"),
        rule(r"\[([^\]]+)\]\([^)]+\)", "$1"),
        rule(r"<[^>]+>", ""),
        rule(r"(?m)^>\s*", ""),
        rule(r"(?m)^-{3,}$", ""),
        rule(r"\n{3,}", "\n\n"),
    ]
});

fn clean_once(text: &str) -> String {
    let mut out = text.to_string();
    for rule in RULES.iter() {
        out = rule.pattern.replace_all(&out, rule.replacement).into_owned();
    }
    out.trim().to_string()
}

/// Strip markdown syntax so a TTS engine reads only prose.
///
/// Idempotent: every rule only ever shortens the text, so repeating the pass
/// until nothing changes always terminates.
pub fn clean_markdown(text: &str) -> String {
    let mut current = clean_once(text);
    loop {
        let next = clean_once(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}
