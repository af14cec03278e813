use std::sync::LazyLock;

use serde_json::Value;

use super::coerce::value_text;
use super::types::{Priority, Profile};

/// Immutable vocabulary mapping free-form model output onto a closed set.
///
/// Written as `const` tables; lookups run against a [`VocabularyIndex`]
/// built once from it.
#[derive(Debug, Clone, Copy)]
pub struct Vocabulary<T: Copy + 'static> {
    pub canonical: &'static [(&'static str, T)],
    pub aliases: &'static [(&'static str, T)],
    pub prefixes: &'static [(&'static str, T)],
    pub alias_prefixes: bool,
    /// Rewrite Latin `o` to Cyrillic `о` before matching.
    pub fold_latin_o: bool,
    pub fallback: T,
}

/// Minimum input length (chars) for matching the input as a prefix of a key.
const MIN_PARTIAL_KEY_LEN: usize = 3;

impl<T: Copy + 'static> Vocabulary<T> {
    /// Fold every key once.
    pub fn index(&self) -> VocabularyIndex<T> {
        let fold_table = |table: &[(&str, T)]| -> Vec<(String, T)> {
            table
                .iter()
                .map(|(k, v)| (fold(k, self.fold_latin_o), *v))
                .collect()
        };
        VocabularyIndex {
            canonical: fold_table(self.canonical),
            aliases: fold_table(self.aliases),
            prefixes: fold_table(self.prefixes),
            alias_prefixes: self.alias_prefixes,
            fold_latin_o: self.fold_latin_o,
            fallback: self.fallback,
        }
    }
}

/// A [`Vocabulary`] with pre-folded keys.
///
/// Resolution order: canonical labels, exact aliases, explicit prefixes,
/// then (when `alias_prefixes` is set) matching against the keys of
/// multi-word or truncated input, then `fallback`.
#[derive(Debug, Clone)]
pub struct VocabularyIndex<T> {
    canonical: Vec<(String, T)>,
    aliases: Vec<(String, T)>,
    prefixes: Vec<(String, T)>,
    alias_prefixes: bool,
    fold_latin_o: bool,
    fallback: T,
}

impl<T: Copy> VocabularyIndex<T> {
    pub fn resolve(&self, raw: &str) -> T {
        let needle = fold(raw, self.fold_latin_o);
        if needle.is_empty() {
            return self.fallback;
        }

        self.exact(&needle)
            .or_else(|| find(&self.prefixes, |k| needle.starts_with(k)))
            .or_else(|| self.match_keys(&needle))
            .unwrap_or(self.fallback)
    }

    fn exact(&self, needle: &str) -> Option<T> {
        find(&self.canonical, |k| k == needle).or_else(|| find(&self.aliases, |k| k == needle))
    }

    fn keys(&self) -> impl Iterator<Item = &(String, T)> {
        self.canonical.iter().chain(self.aliases.iter())
    }

    /// Longest key the input starts with, then any word of the input that
    /// is itself a key, then input of at least 3 chars that begins a key.
    fn match_keys(&self, needle: &str) -> Option<T> {
        if !self.alias_prefixes {
            return None;
        }

        let mut longest: Option<(usize, T)> = None;
        for (key, value) in self.keys() {
            if needle.starts_with(key.as_str()) && longest.map_or(true, |(len, _)| key.len() > len) {
                longest = Some((key.len(), *value));
            }
        }
        if let Some((_, value)) = longest {
            return Some(value);
        }

        let by_word = needle
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .find_map(|w| self.exact(w));
        if by_word.is_some() {
            return by_word;
        }

        if needle.chars().count() >= MIN_PARTIAL_KEY_LEN {
            return self
                .keys()
                .find(|(k, _)| k.starts_with(needle))
                .map(|(_, v)| *v);
        }
        None
    }
}

fn find<T: Copy>(table: &[(String, T)], matches: impl Fn(&str) -> bool) -> Option<T> {
    table.iter().find(|(k, _)| matches(k)).map(|(_, v)| *v)
}

fn fold(text: &str, latin_o: bool) -> String {
    let lower = text.trim().to_lowercase();
    if latin_o {
        lower.replace('o', "о")
    } else {
        lower
    }
}

pub const PRIORITY_CANONICAL: &[(&str, Priority)] = &[
    ("критично срочно", Priority::CriticalUrgent),
    ("срочно", Priority::Urgent),
    ("планово", Priority::Routine),
];

pub const PRIORITY_ALIASES: &[(&str, Priority)] = &[
    // critical-urgent
    ("критично", Priority::CriticalUrgent),
    ("критично-срочно", Priority::CriticalUrgent),
    ("критично_срочно", Priority::CriticalUrgent),
    ("критический", Priority::CriticalUrgent),
    ("критическое", Priority::CriticalUrgent),
    ("критичный", Priority::CriticalUrgent),
    ("экстренно", Priority::CriticalUrgent),
    ("экстренный", Priority::CriticalUrgent),
    ("экстренная", Priority::CriticalUrgent),
    ("неотложно", Priority::CriticalUrgent),
    ("неотложный", Priority::CriticalUrgent),
    ("немедленно", Priority::CriticalUrgent),
    ("реанимация", Priority::CriticalUrgent),
    ("critical", Priority::CriticalUrgent),
    ("critical-urgent", Priority::CriticalUrgent),
    ("critical urgent", Priority::CriticalUrgent),
    ("critical_urgent", Priority::CriticalUrgent),
    ("critically urgent", Priority::CriticalUrgent),
    ("emergency", Priority::CriticalUrgent),
    ("emergent", Priority::CriticalUrgent),
    ("immediate", Priority::CriticalUrgent),
    ("resuscitation", Priority::CriticalUrgent),
    ("stat", Priority::CriticalUrgent),
    ("red", Priority::CriticalUrgent),
    ("kritichno", Priority::CriticalUrgent),
    ("kritichno srochno", Priority::CriticalUrgent),
    // urgent
    ("срочный", Priority::Urgent),
    ("срочная", Priority::Urgent),
    ("срочное", Priority::Urgent),
    ("в ближайшее время", Priority::Urgent),
    ("urgent", Priority::Urgent),
    ("urgently", Priority::Urgent),
    ("soon", Priority::Urgent),
    ("semi-urgent", Priority::Urgent),
    ("high", Priority::Urgent),
    ("yellow", Priority::Urgent),
    ("orange", Priority::Urgent),
    ("srochno", Priority::Urgent),
    // routine
    ("плановый", Priority::Routine),
    ("плановая", Priority::Routine),
    ("плановое", Priority::Routine),
    ("несрочно", Priority::Routine),
    ("не срочно", Priority::Routine),
    ("routine", Priority::Routine),
    ("plan", Priority::Routine),
    ("planned", Priority::Routine),
    ("plano", Priority::Routine),
    ("planovo", Priority::Routine),
    ("non-urgent", Priority::Routine),
    ("non urgent", Priority::Routine),
    ("nonurgent", Priority::Routine),
    ("not urgent", Priority::Routine),
    ("elective", Priority::Routine),
    ("low", Priority::Routine),
    ("green", Priority::Routine),
    ("stable", Priority::Routine),
];

pub const PRIORITY_PREFIXES: &[(&str, Priority)] = &[
    ("крит", Priority::CriticalUrgent),
    ("сроч", Priority::Urgent),
    ("план", Priority::Routine),
];

/// Unrecognized priority is treated as moderately urgent.
pub const PRIORITY_VOCABULARY: Vocabulary<Priority> = Vocabulary {
    canonical: PRIORITY_CANONICAL,
    aliases: PRIORITY_ALIASES,
    prefixes: PRIORITY_PREFIXES,
    alias_prefixes: false,
    fold_latin_o: true,
    fallback: Priority::Urgent,
};

pub const PROFILE_CANONICAL: &[(&str, Profile)] = &[
    ("therapy", Profile::Therapy),
    ("surgery", Profile::Surgery),
    ("pediatrics", Profile::Pediatrics),
    ("trauma", Profile::Trauma),
    ("neurology", Profile::Neurology),
    ("other", Profile::Other),
];

pub const PROFILE_ALIASES: &[(&str, Profile)] = &[
    // therapy
    ("терапия", Profile::Therapy),
    ("терапевт", Profile::Therapy),
    ("терапевтическое", Profile::Therapy),
    ("терапевтический", Profile::Therapy),
    ("кардиология", Profile::Therapy),
    ("general medicine", Profile::Therapy),
    ("general practice", Profile::Therapy),
    ("internal medicine", Profile::Therapy),
    ("cardiology", Profile::Therapy),
    // surgery
    ("хирургия", Profile::Surgery),
    ("хирург", Profile::Surgery),
    ("хирургическое", Profile::Surgery),
    ("хирургический", Profile::Surgery),
    ("surg", Profile::Surgery),
    ("surgical", Profile::Surgery),
    // pediatrics
    ("педиатрия", Profile::Pediatrics),
    ("педиатр", Profile::Pediatrics),
    ("детский", Profile::Pediatrics),
    ("дети", Profile::Pediatrics),
    ("peds", Profile::Pediatrics),
    ("paediatrics", Profile::Pediatrics),
    ("pediatric", Profile::Pediatrics),
    ("paediatric", Profile::Pediatrics),
    // trauma
    ("травма", Profile::Trauma),
    ("травма/хирургия", Profile::Trauma),
    ("травматология", Profile::Trauma),
    ("травматолог", Profile::Trauma),
    ("травмпункт", Profile::Trauma),
    ("ортопедия", Profile::Trauma),
    ("traum", Profile::Trauma),
    ("traumatology", Profile::Trauma),
    ("ortho", Profile::Trauma),
    ("injury", Profile::Trauma),
    // neurology
    ("неврология", Profile::Neurology),
    ("невролог", Profile::Neurology),
    ("неврологическое", Profile::Neurology),
    ("нейро", Profile::Neurology),
    ("инсульт", Profile::Neurology),
    ("neuro", Profile::Neurology),
    ("neurological", Profile::Neurology),
    ("stroke", Profile::Neurology),
    // other
    ("другое", Profile::Other),
    ("другой", Profile::Other),
    ("прочее", Profile::Other),
    ("иное", Profile::Other),
    ("others", Profile::Other),
    ("misc", Profile::Other),
];

/// Unrecognized department falls back to general therapy.
pub const PROFILE_VOCABULARY: Vocabulary<Profile> = Vocabulary {
    canonical: PROFILE_CANONICAL,
    aliases: PROFILE_ALIASES,
    prefixes: &[],
    alias_prefixes: true,
    fold_latin_o: false,
    fallback: Profile::Therapy,
};

static PRIORITY_INDEX: LazyLock<VocabularyIndex<Priority>> =
    LazyLock::new(|| PRIORITY_VOCABULARY.index());

static PROFILE_INDEX: LazyLock<VocabularyIndex<Profile>> =
    LazyLock::new(|| PROFILE_VOCABULARY.index());

/// Map any model-provided priority onto the three canonical levels.
pub fn normalize_priority(value: Option<&Value>) -> Priority {
    normalize_priority_with(value, &PRIORITY_INDEX)
}

pub fn normalize_priority_with(value: Option<&Value>, index: &VocabularyIndex<Priority>) -> Priority {
    index.resolve(&value.map(value_text).unwrap_or_default())
}

/// Map any model-provided department onto the six canonical profiles.
pub fn normalize_profile(value: Option<&Value>) -> Profile {
    normalize_profile_with(value, &PROFILE_INDEX)
}

pub fn normalize_profile_with(value: Option<&Value>, index: &VocabularyIndex<Profile>) -> Profile {
    index.resolve(&value.map(value_text).unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn priority(s: &str) -> Priority {
        normalize_priority(Some(&json!(s)))
    }

    fn profile(s: &str) -> Profile {
        normalize_profile(Some(&json!(s)))
    }

    #[test]
    fn canonical_priorities() {
        assert_eq!(priority("критично срочно"), Priority::CriticalUrgent);
        assert_eq!(priority("срочно"), Priority::Urgent);
        assert_eq!(priority("  Планово "), Priority::Routine);
    }

    #[test]
    fn english_aliases() {
        assert_eq!(priority("CRITICAL"), Priority::CriticalUrgent);
        assert_eq!(priority("stat"), Priority::CriticalUrgent);
        assert_eq!(priority("Urgent"), Priority::Urgent);
        assert_eq!(priority("soon"), Priority::Urgent);
        assert_eq!(priority("non-urgent"), Priority::Routine);
        assert_eq!(priority("plan"), Priority::Routine);
        assert_eq!(priority("plano"), Priority::Routine);
    }

    #[test]
    fn russian_aliases() {
        assert_eq!(priority("экстренно"), Priority::CriticalUrgent);
        assert_eq!(priority("не срочно"), Priority::Routine);
    }

    #[test]
    fn latin_o_inside_cyrillic_word() {
        // "срочно" typed with Latin 'o' characters
        assert_eq!(priority("срoчнo"), Priority::Urgent);
        assert_eq!(priority("планoвo"), Priority::Routine);
        assert_eq!(priority("критичнo срoчнo"), Priority::CriticalUrgent);
    }

    #[test]
    fn prefix_matches() {
        assert_eq!(priority("плановый"), Priority::Routine);
        assert_eq!(priority("планово, наблюдение"), Priority::Routine);
        assert_eq!(priority("критическая ситуация"), Priority::CriticalUrgent);
        assert_eq!(priority("срочность высокая"), Priority::Urgent);
    }

    #[test]
    fn unknown_priority_defaults_to_urgent() {
        assert_eq!(priority("unknown-xyz"), Priority::Urgent);
        assert_eq!(priority(""), Priority::Urgent);
        assert_eq!(normalize_priority(None), Priority::Urgent);
        assert_eq!(normalize_priority(Some(&Value::Null)), Priority::Urgent);
        assert_eq!(normalize_priority(Some(&json!([1, 2]))), Priority::Urgent);
        assert_eq!(normalize_priority(Some(&json!(3))), Priority::Urgent);
    }

    #[test]
    fn canonical_profiles() {
        for p in Profile::ALL {
            assert_eq!(profile(p.as_str()), p);
        }
        assert_eq!(profile(" Surgery "), Profile::Surgery);
    }

    #[test]
    fn russian_profiles() {
        assert_eq!(profile("Хирургия"), Profile::Surgery);
        assert_eq!(profile("педиатрия"), Profile::Pediatrics);
        assert_eq!(profile("Травма/Хирургия"), Profile::Trauma);
        assert_eq!(profile("неврология"), Profile::Neurology);
        assert_eq!(profile("прочее"), Profile::Other);
    }

    #[test]
    fn profile_prefixes() {
        assert_eq!(profile("хирургическое отделение"), Profile::Surgery);
        assert_eq!(profile("травматологическое"), Profile::Trauma);
        assert_eq!(profile("neurosurgery"), Profile::Neurology);
        assert_eq!(profile("нев"), Profile::Neurology);
        assert_eq!(profile("pediatrics ward"), Profile::Pediatrics);
    }

    #[test]
    fn profile_does_not_fold_script() {
        // Cyrillic 'о' in "other" does not equal the Latin word
        assert_eq!(profile("оther"), Profile::Therapy);
    }

    #[test]
    fn unknown_profile_defaults_to_therapy() {
        assert_eq!(profile("кардиохирургия-2"), Profile::Therapy);
        assert_eq!(profile("xy"), Profile::Therapy);
        assert_eq!(normalize_profile(None), Profile::Therapy);
    }

    #[test]
    fn custom_vocabulary_is_honored() {
        const STRICT: Vocabulary<Priority> = Vocabulary {
            canonical: PRIORITY_CANONICAL,
            aliases: &[],
            prefixes: &[],
            alias_prefixes: false,
            fold_latin_o: false,
            fallback: Priority::CriticalUrgent,
        };
        let strict = STRICT.index();
        assert_eq!(
            normalize_priority_with(Some(&json!("critical")), &strict),
            Priority::CriticalUrgent
        );
        assert_eq!(normalize_priority_with(Some(&json!("soon")), &strict), Priority::CriticalUrgent);
        assert_eq!(normalize_priority_with(Some(&json!("срочно")), &strict), Priority::Urgent);
    }

    #[test]
    fn multi_word_departments_route_by_their_department_word() {
        assert_eq!(profile("general surgery"), Profile::Surgery);
        assert_eq!(profile("cardiothoracic surgery"), Profile::Surgery);
        assert_eq!(profile("internal injury"), Profile::Trauma);
        assert_eq!(profile("medicine/trauma"), Profile::Trauma);
        assert_eq!(profile("отделение неврологии, инсульт"), Profile::Neurology);
    }

    #[test]
    fn full_phrase_aliases_still_match() {
        assert_eq!(profile("internal medicine"), Profile::Therapy);
        assert_eq!(profile("General Medicine ward"), Profile::Therapy);
        assert_eq!(profile("cardiology"), Profile::Therapy);
    }

    #[test]
    fn longest_key_wins_among_prefixes() {
        assert_eq!(profile("pediatrics/other"), Profile::Pediatrics);
        assert_eq!(profile("травматологическое отделение"), Profile::Trauma);
    }

    #[test]
    fn truncated_english_names_complete_to_a_key() {
        assert_eq!(profile("ther"), Profile::Therapy);
        assert_eq!(profile("ped"), Profile::Pediatrics);
        assert_eq!(profile("sur"), Profile::Surgery);
    }

    #[test]
    fn index_folds_keys_once() {
        let index = PRIORITY_VOCABULARY.index();
        assert!(index.aliases.iter().all(|(k, _)| !k.contains('o')));
        assert_eq!(index.resolve("NON-URGENT"), Priority::Routine);
    }
}
