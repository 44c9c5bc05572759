//! Expected-command matching
//!
//! One canonical algorithm for deciding whether a typed line satisfies
//! a step's expected command. A pattern is tokenized into command words
//! and positionals (in order) plus a flag set. A line matches when its
//! words equal the pattern's and it carries at least the pattern's
//! flags. Extra flags on the input are allowed, which is why a step can
//! list both `docker ps` and `docker ps -a`: the input `docker ps -a`
//! matches both, and the most specific (most tokens) pattern is the one
//! credited.

use crate::shell::tokenize;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// One accepted command form for a step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandPattern {
    /// Canonical command line, e.g. `systemctl restart apache2`.
    pub pattern: String,
    /// Compare non-flag arguments as a set instead of a sequence.
    #[serde(default)]
    pub any_arg_order: bool,
}

impl CommandPattern {
    pub fn new(pattern: &str) -> Self {
        Self {
            pattern: pattern.to_string(),
            any_arg_order: false,
        }
    }

    pub fn any_order(pattern: &str) -> Self {
        Self {
            pattern: pattern.to_string(),
            any_arg_order: true,
        }
    }

    /// How constrained this pattern is. More tokens win ties.
    pub fn specificity(&self) -> usize {
        tokenize(&self.pattern).len()
    }

    /// Does `line` satisfy this pattern? Case-insensitive throughout.
    pub fn matches(&self, line: &str) -> bool {
        let (pat_words, pat_flags) = decompose(&self.pattern);
        let (line_words, line_flags) = decompose(line);

        if pat_words.is_empty() {
            return false;
        }
        let words_match = if self.any_arg_order {
            // the command word itself stays anchored first
            pat_words.first() == line_words.first() && {
                let mut a: Vec<_> = pat_words[1..].to_vec();
                let mut b: Vec<_> = line_words[1..].to_vec();
                a.sort();
                b.sort();
                a == b
            }
        } else {
            pat_words == line_words
        };

        words_match && pat_flags.is_subset(&line_flags)
    }
}

/// Split a line into lowercase non-flag words and an expanded flag set.
/// Short-flag clusters split per letter (`-sh` → `-s`, `-h`) so that
/// `du -s -h` and `du -sh` match the same pattern; long flags
/// (`--replicas=2`) stay whole.
fn decompose(line: &str) -> (Vec<String>, BTreeSet<String>) {
    let mut words = Vec::new();
    let mut flags = BTreeSet::new();
    for token in tokenize(line) {
        let token = token.to_lowercase();
        if let Some(rest) = token.strip_prefix("--") {
            if rest.is_empty() {
                continue;
            }
            flags.insert(token);
        } else if let Some(rest) = token.strip_prefix('-') {
            if rest.is_empty() || rest.chars().any(|c| c.is_ascii_digit()) {
                // `-9` and friends are operands, not flags
                words.push(token);
                continue;
            }
            for c in rest.chars() {
                flags.insert(format!("-{}", c));
            }
        } else {
            words.push(token);
        }
    }
    (words, flags)
}

/// Index of the most specific matching pattern, if any. Ties go to the
/// earliest declaration.
pub fn best_match(patterns: &[CommandPattern], line: &str) -> Option<usize> {
    patterns
        .iter()
        .enumerate()
        .filter(|(_, p)| p.matches(line))
        .max_by_key(|(i, p)| (p.specificity(), std::cmp::Reverse(*i)))
        .map(|(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_match_is_case_and_spacing_insensitive() {
        let p = CommandPattern::new("systemctl restart apache2");
        assert!(p.matches("systemctl restart apache2"));
        assert!(p.matches("  SYSTEMCTL   Restart   apache2 "));
        assert!(!p.matches("systemctl restart nginx"));
        assert!(!p.matches("systemctl restart"));
    }

    #[test]
    fn pattern_flags_must_be_present_in_input() {
        let p = CommandPattern::new("docker ps -a");
        assert!(p.matches("docker ps -a"));
        assert!(p.matches("docker ps --all -a"));
        assert!(!p.matches("docker ps"));
    }

    #[test]
    fn extra_input_flags_are_tolerated() {
        let p = CommandPattern::new("du /var/log");
        assert!(p.matches("du -sh /var/log"));
        assert!(p.matches("du -s -h /var/log"));
    }

    #[test]
    fn short_flag_clusters_expand() {
        let p = CommandPattern::new("du -sh /var/log");
        assert!(p.matches("du -s -h /var/log"));
        assert!(p.matches("du -hs /var/log"));
        assert!(!p.matches("du -s /var/log"));
    }

    #[test]
    fn dash_number_is_an_operand_not_a_flag() {
        let p = CommandPattern::new("kill -9 5678");
        assert!(p.matches("kill -9 5678"));
        assert!(!p.matches("kill 5678"));
    }

    #[test]
    fn any_order_compares_positionals_as_a_set() {
        let p = CommandPattern::any_order("cp /a /b");
        assert!(p.matches("cp /b /a"));
        let strict = CommandPattern::new("cp /a /b");
        assert!(!strict.matches("cp /b /a"));
    }

    #[test]
    fn best_match_prefers_the_most_specific_pattern() {
        let patterns = vec![
            CommandPattern::new("docker ps"),
            CommandPattern::new("docker ps -a"),
        ];
        // the bare listing matches only the bare pattern
        assert_eq!(best_match(&patterns, "docker ps"), Some(0));
        // the -a listing matches both, the constrained one is credited
        assert_eq!(best_match(&patterns, "docker ps -a"), Some(1));
        assert_eq!(best_match(&patterns, "docker logs x"), None);
    }

    #[test]
    fn best_match_tie_goes_to_first_declaration() {
        let patterns = vec![
            CommandPattern::new("ps aux"),
            CommandPattern::any_order("ps aux"),
        ];
        assert_eq!(best_match(&patterns, "ps aux"), Some(0));
    }
}
