// src/analyzer.rs
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::generators::SYMBOLS;

// Exact-match blocklist, compared against the lowercased password
const COMMON_PASSWORDS: [&str; 10] = [
    "password",
    "123456",
    "password123",
    "admin",
    "qwerty",
    "letmein",
    "welcome",
    "monkey",
    "dragon",
    "master",
];

// Every 3-char window of these is a banned run ("890" included)
const DIGIT_RUNS: &str = "01234567890";
const LETTER_RUNS: &str = "abcdefghijklmnopqrstuvwxyz";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StrengthLabel {
    #[serde(rename = "Very Weak")]
    VeryWeak,
    Weak,
    Medium,
    Strong,
    #[serde(rename = "Very Strong")]
    VeryStrong,
}

impl StrengthLabel {
    pub fn from_score(score: u8) -> Self {
        match score {
            s if s >= 80 => StrengthLabel::VeryStrong,
            s if s >= 60 => StrengthLabel::Strong,
            s if s >= 40 => StrengthLabel::Medium,
            s if s >= 20 => StrengthLabel::Weak,
            _ => StrengthLabel::VeryWeak,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StrengthLabel::VeryWeak => "Very Weak",
            StrengthLabel::Weak => "Weak",
            StrengthLabel::Medium => "Medium",
            StrengthLabel::Strong => "Strong",
            StrengthLabel::VeryStrong => "Very Strong",
        }
    }
}

impl fmt::Display for StrengthLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub score: u8,
    pub strength: StrengthLabel,
    pub feedback: Vec<String>,
    pub length: usize,
    pub has_lowercase: bool,
    pub has_uppercase: bool,
    pub has_digit: bool,
    pub has_symbol: bool,
}

/// Scores passwords on an additive 0-100 scale: bonuses for length and
/// character variety, penalties for repeats, sequential runs, blocklisted
/// passwords and bare dictionary-looking words. Pure and infallible; any
/// input is accepted, lengths are counted in characters.
#[derive(Debug, Clone, Copy, Default)]
pub struct StrengthAnalyzer;

impl StrengthAnalyzer {
    pub fn new() -> Self {
        StrengthAnalyzer
    }

    pub fn analyze(&self, password: &str) -> AnalysisResult {
        let mut score: i32 = 0;
        let mut feedback = Vec::new();

        let length = password.chars().count();
        let lowered = password.to_lowercase();

        if length >= 16 {
            score += 35;
            feedback.push("Excellent length (16+ characters)".to_string());
        } else if length >= 12 {
            score += 30;
            feedback.push("Good length (12+ characters)".to_string());
        } else if length >= 8 {
            score += 20;
            feedback.push("Adequate length (8+ characters)".to_string());
        } else {
            feedback.push("Too short - use at least 8 characters".to_string());
        }

        let has_lowercase = password.chars().any(|c| c.is_ascii_lowercase());
        let has_uppercase = password.chars().any(|c| c.is_ascii_uppercase());
        let has_digit = password.chars().any(|c| c.is_ascii_digit());
        let has_symbol = password.chars().any(is_symbol);

        let variety = [has_lowercase, has_uppercase, has_digit, has_symbol]
            .iter()
            .filter(|present| **present)
            .count();

        match variety {
            4 => {
                score += 35;
                feedback.push("Excellent character variety".to_string());
            }
            3 => {
                score += 25;
                feedback.push("Good character variety".to_string());
            }
            2 => {
                score += 15;
                feedback.push("Limited character variety".to_string());
            }
            _ => {
                feedback.push("Poor character variety - mix letters, numbers, symbols".to_string());
            }
        }

        if has_repeated_run(password) {
            score -= 10;
            feedback.push("Avoid repeating characters".to_string());
        }

        if has_sequential_run(password, DIGIT_RUNS) {
            score -= 15;
            feedback.push("Avoid sequential numbers".to_string());
        }

        if has_sequential_run(&lowered, LETTER_RUNS) {
            score -= 15;
            feedback.push("Avoid sequential letters".to_string());
        }

        if COMMON_PASSWORDS.contains(&lowered.as_str()) {
            score -= 30;
            feedback.push("This is a commonly used password".to_string());
        }

        if length > 4 && password.chars().all(char::is_alphabetic) {
            score -= 10;
            feedback.push("Avoid using dictionary words".to_string());
        }

        let score = score.clamp(0, 100) as u8;

        AnalysisResult {
            score,
            strength: StrengthLabel::from_score(score),
            feedback,
            length,
            has_lowercase,
            has_uppercase,
            has_digit,
            has_symbol,
        }
    }

    /// Turns an analysis into actionable advice, most impactful first.
    pub fn improvement_suggestions(&self, analysis: &AnalysisResult) -> Vec<String> {
        let mut suggestions = Vec::new();

        if analysis.length < 8 {
            suggestions.push("Increase length to at least 8 characters".to_string());
        } else if analysis.length < 12 {
            suggestions.push("Consider using 12+ characters for better security".to_string());
        }

        if !analysis.has_uppercase {
            suggestions.push("Add uppercase letters (A-Z)".to_string());
        }
        if !analysis.has_lowercase {
            suggestions.push("Add lowercase letters (a-z)".to_string());
        }
        if !analysis.has_digit {
            suggestions.push("Add numbers (0-9)".to_string());
        }
        if !analysis.has_symbol {
            suggestions.push("Add special characters (!@#$%^&*)".to_string());
        }

        if analysis.score < 60 {
            suggestions.push("Consider using a password generator for better security".to_string());
        }

        suggestions
    }
}

fn is_symbol(c: char) -> bool {
    c.is_ascii() && SYMBOLS.contains(&(c as u8))
}

// Any character appearing 3+ times in a row
fn has_repeated_run(password: &str) -> bool {
    let chars: Vec<char> = password.chars().collect();
    chars.windows(3).any(|w| w[0] == w[1] && w[1] == w[2])
}

// True when any 3-char window of `sequence` occurs in `candidate`
fn has_sequential_run(candidate: &str, sequence: &str) -> bool {
    sequence
        .as_bytes()
        .windows(3)
        .filter_map(|w| std::str::from_utf8(w).ok())
        .any(|run| candidate.contains(run))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analyze(password: &str) -> AnalysisResult {
        StrengthAnalyzer::new().analyze(password)
    }

    #[test]
    fn test_score_stays_in_bounds() {
        let corpus = [
            "",
            "a",
            "abc",
            "password",
            "aaa111",
            "aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa",
            "Tr0ub4dor&3",
            "X9#mQ2$vL7@pR4!wZ8%dN3^fB6&kT1*h",
            "проверка пароля",
            "🔒🔑🔒🔑",
        ];
        for password in corpus {
            let result = analyze(password);
            assert!(result.score <= 100, "{password:?} scored {}", result.score);
        }
    }

    #[test]
    fn test_empty_password_scores_zero() {
        let result = analyze("");
        assert_eq!(result.score, 0);
        assert_eq!(result.strength, StrengthLabel::VeryWeak);
        assert_eq!(result.length, 0);
        assert!(!result.has_lowercase && !result.has_uppercase);
        assert!(!result.has_digit && !result.has_symbol);
        assert_eq!(
            result.feedback,
            vec![
                "Too short - use at least 8 characters".to_string(),
                "Poor character variety - mix letters, numbers, symbols".to_string(),
            ]
        );
    }

    #[test]
    fn test_four_classes_without_patterns_is_strong() {
        // 13 chars (+30), four classes (+35), nothing penalized
        let result = analyze("Passw0rd!9317");
        assert_eq!(result.score, 65);
        assert_eq!(result.strength, StrengthLabel::Strong);
        assert!(result.has_lowercase && result.has_uppercase);
        assert!(result.has_digit && result.has_symbol);
    }

    #[test]
    fn test_sequential_digits_penalized() {
        // Same shape as above but the tail digits form ascending runs
        let result = analyze("Passw0rd!2345");
        assert_eq!(result.score, 50);
        assert_eq!(result.strength, StrengthLabel::Medium);
        assert!(result
            .feedback
            .contains(&"Avoid sequential numbers".to_string()));
    }

    #[test]
    fn test_digit_run_wraps_through_zero() {
        // "890" is part of the banned run table
        assert!(analyze("pass890word")
            .feedback
            .contains(&"Avoid sequential numbers".to_string()));
        // descending digits are not
        assert!(!analyze("pass975word")
            .feedback
            .contains(&"Avoid sequential numbers".to_string()));
    }

    #[test]
    fn test_repeat_and_sequence_penalties_stack() {
        // "aaa" repeats, "111" repeats, and "123"-style runs are absent;
        // 6 chars -> no length bonus, 2 classes -> +15, -10 repeat = 5
        let result = analyze("aaa111");
        assert!(result
            .feedback
            .contains(&"Avoid repeating characters".to_string()));
        assert_eq!(result.score, 5);

        // with an actual ascending run both penalties apply
        let result = analyze("aaa123");
        assert!(result
            .feedback
            .contains(&"Avoid repeating characters".to_string()));
        assert!(result
            .feedback
            .contains(&"Avoid sequential numbers".to_string()));
        assert_eq!(result.score, 0);
    }

    #[test]
    fn test_common_password_floors_to_zero() {
        // +20 length, +0 variety, -30 common, -10 dictionary -> clamped to 0
        let result = analyze("password");
        assert!(result
            .feedback
            .contains(&"This is a commonly used password".to_string()));
        assert_eq!(result.score, 0);
        assert_eq!(result.strength, StrengthLabel::VeryWeak);

        // case-insensitive match
        assert!(analyze("QWERTY")
            .feedback
            .contains(&"This is a commonly used password".to_string()));
    }

    #[test]
    fn test_sequential_letters_case_insensitive() {
        let result = analyze("xAbCdx");
        assert!(result
            .feedback
            .contains(&"Avoid sequential letters".to_string()));
    }

    #[test]
    fn test_dictionary_heuristic_is_length_gated() {
        assert!(analyze("horse")
            .feedback
            .contains(&"Avoid using dictionary words".to_string()));
        // four letters or fewer pass the heuristic
        assert!(!analyze("cats")
            .feedback
            .contains(&"Avoid using dictionary words".to_string()));
        // any non-letter defeats it
        assert!(!analyze("horse1")
            .feedback
            .contains(&"Avoid using dictionary words".to_string()));
    }

    #[test]
    fn test_length_band_bonuses() {
        // single class keeps variety at +0 so the score isolates length;
        // long single-char runs would add the repeat penalty, so vary chars
        assert_eq!(analyze("hoexm").score, 0); // 5 chars, dictionary -10
        assert_eq!(analyze("hoexmqtw").score, 10); // +20 -10 dictionary
        assert_eq!(analyze("hoexmqtwlypd").score, 20); // +30 -10
        assert_eq!(analyze("hoexmqtwlypdnsrk").score, 25); // +35 -10
    }

    #[test]
    fn test_strength_label_bands() {
        assert_eq!(StrengthLabel::from_score(100), StrengthLabel::VeryStrong);
        assert_eq!(StrengthLabel::from_score(80), StrengthLabel::VeryStrong);
        assert_eq!(StrengthLabel::from_score(79), StrengthLabel::Strong);
        assert_eq!(StrengthLabel::from_score(60), StrengthLabel::Strong);
        assert_eq!(StrengthLabel::from_score(59), StrengthLabel::Medium);
        assert_eq!(StrengthLabel::from_score(40), StrengthLabel::Medium);
        assert_eq!(StrengthLabel::from_score(39), StrengthLabel::Weak);
        assert_eq!(StrengthLabel::from_score(20), StrengthLabel::Weak);
        assert_eq!(StrengthLabel::from_score(19), StrengthLabel::VeryWeak);
        assert_eq!(StrengthLabel::from_score(0), StrengthLabel::VeryWeak);
    }

    #[test]
    fn test_unicode_length_counts_characters() {
        // 16 code points of cyrillic: length band applies, all-alphabetic
        // dictionary penalty applies, ascii classes all absent
        let result = analyze("парольбезопасный");
        assert_eq!(result.length, 16);
        assert_eq!(result.score, 25); // +35 length, -10 dictionary
        assert!(!result.has_lowercase);
    }

    #[test]
    fn test_suggestions_for_weak_password() {
        let analyzer = StrengthAnalyzer::new();
        let analysis = analyzer.analyze("abc");
        let suggestions = analyzer.improvement_suggestions(&analysis);
        assert_eq!(
            suggestions,
            vec![
                "Increase length to at least 8 characters".to_string(),
                "Add uppercase letters (A-Z)".to_string(),
                "Add numbers (0-9)".to_string(),
                "Add special characters (!@#$%^&*)".to_string(),
                "Consider using a password generator for better security".to_string(),
            ]
        );
    }

    #[test]
    fn test_suggestions_mid_length_band() {
        let analyzer = StrengthAnalyzer::new();
        let analysis = analyzer.analyze("Abcdefgh1!"); // 10 chars, 4 classes
        let suggestions = analyzer.improvement_suggestions(&analysis);
        assert_eq!(
            suggestions.first(),
            Some(&"Consider using 12+ characters for better security".to_string())
        );
    }

    #[test]
    fn test_strong_password_needs_no_suggestions() {
        let analyzer = StrengthAnalyzer::new();
        // 16+ chars, four classes, no runs: both bonuses, no penalties
        let analysis = analyzer.analyze("Vb7!Qm2@Xr9%Kd4&");
        assert_eq!(analysis.score, 70);
        assert_eq!(analysis.strength, StrengthLabel::Strong);
        assert!(analyzer.improvement_suggestions(&analysis).is_empty());
    }
}
