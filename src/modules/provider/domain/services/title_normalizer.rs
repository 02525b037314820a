use crate::modules::provider::domain::entities::slug_from_path;
use crate::shared::errors::{AppError, AppResult};
use regex::Regex;
use std::collections::HashSet;

pub const DEFAULT_SITE_NAME: &str = "jut.su";

/// Transformation that can be applied to a title
///
/// Each transformation is composable and testable in isolation.
pub trait TitleTransformation: Send + Sync {
    fn transform(&self, title: &str) -> String;
    fn name(&self) -> &'static str;
}

/// Replaces every match of a set of patterns, in order
#[derive(Debug, Clone)]
pub struct RegexRemoveTransform {
    name: &'static str,
    patterns: Vec<Regex>,
    replacement: &'static str,
}

impl RegexRemoveTransform {
    pub fn new(name: &'static str, patterns: &[String], replacement: &'static str) -> AppResult<Self> {
        let patterns = patterns
            .iter()
            .map(|p| Regex::new(p))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| AppError::ConfigError(format!("Invalid title pattern: {}", e)))?;
        Ok(Self {
            name,
            patterns,
            replacement,
        })
    }
}

impl TitleTransformation for RegexRemoveTransform {
    fn transform(&self, title: &str) -> String {
        self.patterns.iter().fold(title.to_string(), |acc, re| {
            re.replace_all(&acc, self.replacement).into_owned()
        })
    }

    fn name(&self) -> &'static str {
        self.name
    }
}

/// Normalizes whitespace (collapses multiple spaces, trims)
#[derive(Debug, Clone)]
pub struct NormalizeWhitespaceTransform;

impl TitleTransformation for NormalizeWhitespaceTransform {
    fn transform(&self, title: &str) -> String {
        title.split_whitespace().collect::<Vec<&str>>().join(" ")
    }

    fn name(&self) -> &'static str {
        "NormalizeWhitespace"
    }
}

/// Phonetic Cyrillic -> Latin, character by character, lowercased
#[derive(Debug, Clone)]
pub struct TransliterateTransform;

impl TransliterateTransform {
    fn map_char(c: char) -> Option<&'static str> {
        let mapped = match c {
            'а' => "a",
            'б' => "b",
            'в' => "v",
            'г' => "g",
            'д' => "d",
            'е' => "e",
            'ё' => "yo",
            'ж' => "zh",
            'з' => "z",
            'и' => "i",
            'й' => "y",
            'к' => "k",
            'л' => "l",
            'м' => "m",
            'н' => "n",
            'о' => "o",
            'п' => "p",
            'р' => "r",
            'с' => "s",
            'т' => "t",
            'у' => "u",
            'ф' => "f",
            'х' => "kh",
            'ц' => "ts",
            'ч' => "ch",
            'ш' => "sh",
            'щ' => "shch",
            'ъ' => "",
            'ы' => "y",
            'ь' => "",
            'э' => "e",
            'ю' => "yu",
            'я' => "ya",
            'і' => "i",
            'ї' => "yi",
            'є' => "ye",
            'ґ' => "g",
            _ => return None,
        };
        Some(mapped)
    }
}

impl TitleTransformation for TransliterateTransform {
    fn transform(&self, title: &str) -> String {
        let mut out = String::with_capacity(title.len());
        for c in title.to_lowercase().chars() {
            match Self::map_char(c) {
                Some(latin) => out.push_str(latin),
                None => out.push(c),
            }
        }
        NormalizeWhitespaceTransform.transform(&out)
    }

    fn name(&self) -> &'static str {
        "Transliterate"
    }
}

pub fn contains_cyrillic(value: &str) -> bool {
    value.chars().any(|c| ('\u{0400}'..='\u{04FF}').contains(&c))
}

/// True when a letter outside the Latin blocks is present.
pub fn contains_non_latin(value: &str) -> bool {
    value.chars().any(|c| {
        c.is_alphabetic()
            && !(c.is_ascii()
                || ('\u{00C0}'..='\u{024F}').contains(&c)
                || ('\u{1E00}'..='\u{1EFF}').contains(&c))
    })
}

/// Ordered, deduplicated set of candidate strings
#[derive(Debug, Default)]
struct CandidateSet {
    seen: HashSet<String>,
    items: Vec<String>,
}

impl CandidateSet {
    fn add(&mut self, value: &str) {
        let normalized = NormalizeWhitespaceTransform.transform(value);
        if normalized.is_empty() || !self.seen.insert(normalized.clone()) {
            return;
        }
        self.items.push(normalized);
    }
}

/// Produces the ranked title guesses a provider search is tried with
///
/// Transformations are grouped into two pipelines: boilerplate cleaning and
/// trailing episode-marker removal.
pub struct TitleNormalizer {
    watch_prefix: Regex,
    cleaning: Vec<Box<dyn TitleTransformation>>,
    episode_markers: Vec<Box<dyn TitleTransformation>>,
}

impl TitleNormalizer {
    /// Build a normalizer whose boilerplate rules target `site_name`.
    pub fn for_site(site_name: &str) -> AppResult<Self> {
        let site = regex::escape(site_name);

        let watch_prefix = Regex::new(r"(?i)^\s*смотреть\s+")
            .map_err(|e| AppError::ConfigError(e.to_string()))?;

        let boilerplate = RegexRemoveTransform::new(
            "RemoveBoilerplate",
            &[
                r"(?i)^\s*смотреть\s+".to_string(),
                format!(r"(?i)\s+на\s+{}\s*$", site),
                format!(r"(?i)\s*\({}\)\s*$", site),
                r"(?i)\s+(на\s+)?русском\s*$".to_string(),
                r"(?i)\s*-\s*anime\s*$".to_string(),
            ],
            "",
        )?;
        let bracketed = RegexRemoveTransform::new(
            "RemoveBracketed",
            &[r"\s*\[.*?\]\s*".to_string(), r"\s*\(.*?\)\s*".to_string()],
            " ",
        )?;
        let markers = RegexRemoveTransform::new(
            "RemoveEpisodeMarkers",
            &[
                // otherwise "2 Episode 5" is taken by the numeric rule below
                r"(?i)\s+season\s+\d+\s+episode\s+\d+\s*$".to_string(),
                r"(?i)\s+(\d+)\s+(серия|серии|серий|епизод|эпизод|episode|episode\s*\d+)\s*$"
                    .to_string(),
                r"(?i)\s+(season\s+\d+\s+)?episode\s+\d+\s*$".to_string(),
                r"(?i)\s+(серия|эпизод)\s+\d+\s*$".to_string(),
                r"(?i)\s+part\s+\d+\s*$".to_string(),
            ],
            "",
        )?;

        Ok(Self {
            watch_prefix,
            cleaning: vec![
                Box::new(boilerplate),
                Box::new(bracketed),
                Box::new(NormalizeWhitespaceTransform),
            ],
            episode_markers: vec![Box::new(markers), Box::new(NormalizeWhitespaceTransform)],
        })
    }

    fn apply(pipeline: &[Box<dyn TitleTransformation>], title: &str) -> String {
        let mut result = title.to_string();
        for transformation in pipeline {
            result = transformation.transform(&result);
            log::trace!("After {}: '{}'", transformation.name(), result);
        }
        result
    }

    /// Raw title with boilerplate and bracketed segments removed.
    pub fn clean(&self, raw_title: &str) -> String {
        Self::apply(&self.cleaning, raw_title)
    }

    /// Cleaned title without a trailing episode/season/part marker.
    pub fn strip_episode_marker(&self, cleaned: &str) -> String {
        Self::apply(&self.episode_markers, cleaned)
    }

    fn strip_watch_prefix(&self, value: &str) -> String {
        self.watch_prefix.replace(value, "").trim().to_string()
    }

    fn without_episode_number(&self, raw_title: &str, episode: u32) -> String {
        let pattern = format!(r"(?i)\b{}\b\s*(серия|серии|серий|епизод|episode)?", episode);
        let removed = match Regex::new(&pattern) {
            Ok(re) => re.replace(raw_title, "").into_owned(),
            Err(_) => raw_title.to_string(),
        };
        self.strip_watch_prefix(&removed)
    }

    /// Candidate titles in the order they should be searched.
    ///
    /// Empty when `raw_title` is missing or blank, or when nothing
    /// Latin-representable survives.
    pub fn generate_candidates(
        &self,
        raw_title: Option<&str>,
        episode: Option<u32>,
        page_path: Option<&str>,
    ) -> Vec<String> {
        let raw = match raw_title.map(str::trim) {
            Some(raw) if !raw.is_empty() => raw,
            _ => return Vec::new(),
        };

        let mut candidates = CandidateSet::default();

        if let Some(path) = page_path {
            candidates.add(&slug_from_path(path));
        }

        candidates.add(raw);

        let cleaned = self.clean(raw);
        candidates.add(&cleaned);

        let cleaned = self.strip_episode_marker(&cleaned);
        candidates.add(&cleaned);

        if let Some(episode) = episode {
            candidates.add(&self.without_episode_number(raw, episode));
        }

        let words: Vec<&str> = raw.split_whitespace().collect();
        if words.len() > 2 {
            candidates.add(&self.strip_watch_prefix(&words[..3].join(" ")));
        }

        if contains_cyrillic(&cleaned) {
            candidates.add(&TransliterateTransform.transform(&cleaned));
        }
        if contains_cyrillic(raw) {
            candidates.add(&TransliterateTransform.transform(raw));
        }

        let filtered: Vec<String> = candidates
            .items
            .into_iter()
            .filter(|c| !contains_non_latin(c))
            .collect();

        log::debug!(
            "Title variants for '{}': {} candidate(s) {:?}",
            raw,
            filtered.len(),
            filtered
        );
        filtered
    }
}
