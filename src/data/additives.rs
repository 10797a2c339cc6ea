use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;
use std::sync::OnceLock;
use thiserror::Error;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

const BUNDLED_ADDITIVES_JSON: &str = include_str!("../../assets/additives_local.json");

#[derive(Debug, Error)]
pub enum AdditiveError {
    #[error("additive table read failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("additive table is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Additive {
    pub code: String,
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub name_fi: Option<String>,
    #[serde(default)]
    pub name_en: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

impl Additive {
    /// Explicit category, else the E-number range fallback.
    pub fn category(&self) -> String {
        self.category.clone().unwrap_or_else(|| category_for(&self.code).to_string())
    }
}

/// Immutable additive reference data. Built once and handed to whoever needs it.
#[derive(Debug, Clone, Default)]
pub struct AdditiveTable {
    entries: Vec<Additive>,
}

impl AdditiveTable {
    pub fn new(entries: Vec<Additive>) -> Self {
        Self { entries }
    }

    pub fn from_json(raw: &str) -> Result<Self, AdditiveError> {
        Ok(Self::new(serde_json::from_str(raw)?))
    }

    pub fn load(path: &Path) -> Result<Self, AdditiveError> {
        Self::from_json(&std::fs::read_to_string(path)?)
    }

    /// The table shipped inside the binary, parsed on first use.
    pub fn bundled() -> &'static AdditiveTable {
        static TABLE: OnceLock<AdditiveTable> = OnceLock::new();
        TABLE.get_or_init(|| {
            Self::from_json(BUNDLED_ADDITIVES_JSON).unwrap_or_else(|e| {
                log::warn!("bundled additive table unusable: {e}");
                Self::default()
            })
        })
    }

    pub fn entries(&self) -> &[Additive] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, code: &str) -> Option<&Additive> {
        let wanted = normalize_e(code);
        self.entries.iter().find(|a| normalize_e(&a.code) == wanted)
    }

    /// Sorted, de-duplicated category labels.
    pub fn categories(&self) -> Vec<String> {
        self.entries
            .iter()
            .map(Additive::category)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Case-insensitive substring match on code and names, optionally narrowed
    /// to one category.
    pub fn search(&self, query: &str, category: Option<&str>) -> Vec<&Additive> {
        let q = query.trim().to_lowercase();
        self.entries
            .iter()
            .filter(|a| {
                let matches_query = q.is_empty()
                    || a.code.to_lowercase().contains(&q)
                    || a.name_fi.as_deref().unwrap_or("").to_lowercase().contains(&q)
                    || a.name_en.as_deref().unwrap_or("").to_lowercase().contains(&q);
                let matches_cat = category.map_or(true, |c| a.category() == c);
                matches_query && matches_cat
            })
            .collect()
    }

    /// E-codes mentioned in free-form ingredient text, either written out
    /// (`E330`, `e 330`, `E-150d`) or named by one of the table's aliases.
    pub fn detect_ecodes(&self, text: &str) -> Vec<String> {
        if text.trim().is_empty() {
            return Vec::new();
        }
        let mut found = BTreeSet::new();

        for cap in raw_ecode_regex().captures_iter(text) {
            found.insert(normalize_e(&format!("E{}", &cap[1])));
        }

        let norm_text = normalize(text);
        for additive in &self.entries {
            let hit = additive.aliases.iter().any(|alias| {
                let norm_alias = normalize(alias);
                !norm_alias.is_empty() && alias_matches(&norm_text, &norm_alias)
            });
            if hit {
                found.insert(normalize_e(&additive.code));
            }
        }

        found.into_iter().collect()
    }
}

fn raw_ecode_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b[eE]\s*-?\s*(\d{3,4}[a-dA-D]?)\b").expect("static regex"))
}

fn ecode_tag_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)^e\d{3,4}[a-z]?$").expect("static regex"))
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_lowercase() || c.is_ascii_digit()
}

/// Short aliases (three chars or fewer) must stand alone. Longer ones may
/// carry up to four trailing letters to tolerate inflected forms.
fn alias_matches(text: &str, alias: &str) -> bool {
    let allow_suffix = alias.chars().count() > 3;
    for (start, _) in text.match_indices(alias) {
        if text[..start].chars().next_back().is_some_and(is_word_char) {
            continue;
        }
        let mut rest = text[start + alias.len()..].chars().peekable();
        if allow_suffix {
            let mut letters = 0;
            while rest.peek().is_some_and(|c| c.is_ascii_lowercase()) && letters < 5 {
                rest.next();
                letters += 1;
            }
            if letters > 4 {
                continue;
            }
        }
        if !rest.peek().copied().is_some_and(is_word_char) {
            return true;
        }
    }
    false
}

fn unify_dash(c: char) -> char {
    match c {
        '\u{00AD}' | '\u{2010}'..='\u{2014}' => '-',
        other => other,
    }
}

/// Lowercase, strip accents, unify dashes, collapse whitespace.
pub fn normalize(s: &str) -> String {
    let lowered: String = s
        .to_lowercase()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .map(unify_dash)
        .collect();
    lowered.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// `e150d` -> `E150`; anything that is not an E-number is only upper-cased.
pub fn normalize_e(code: &str) -> String {
    let upper = code.trim().to_uppercase();
    let Some(rest) = upper.strip_prefix('E') else {
        return upper;
    };
    let digits = rest.trim_end_matches(['A', 'B', 'C', 'D']);
    let suffix_len = rest.len() - digits.len();
    if (3..=4).contains(&digits.len()) && digits.bytes().all(|b| b.is_ascii_digit()) && suffix_len <= 1 {
        format!("E{digits}")
    } else {
        upper
    }
}

/// Broad functional class from the E-number hundreds.
pub fn category_for(code: &str) -> &'static str {
    let Some(n) = code.get(1..).and_then(|s| s.parse::<u32>().ok()) else {
        return "Additive";
    };
    match n {
        100..=199 => "Värit / Colours",
        200..=299 => "Säilöntäaineet / Preservatives",
        300..=399 => "Hapettumisenesto / Antioxidants",
        400..=499 => "Paksunn./Stabilizers",
        500..=599 => "Happamuuden säätö / Acidity",
        600..=699 => "Makuvoim./Enhancers",
        700..=799 => "Antibiotics (historic)",
        900..=999 => "Makeut./Glazing/Propellants",
        _ => "Other",
    }
}

/// Display title and subtitle for an additive tag such as `en:e330` or `en:nitrites`.
pub fn pretty_additive(raw: &str) -> (String, String) {
    let slug = raw.rsplit(':').next().unwrap_or(raw).trim().replace('_', "-");
    let compact: String = slug.chars().filter(|c| *c != ' ').collect();
    if ecode_tag_regex().is_match(&compact) {
        return (format!("E {}", compact[1..].to_uppercase()), "Food additive code".to_string());
    }

    let title = slug
        .split(['-', '_'])
        .filter(|w| !w.trim().is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ");
    (title, String::new())
}
