//! Static Bulgarian domain vocabulary.
//!
//! Everything in here is fixed at compile time; nothing is learned or updated
//! at runtime. Iteration order of the tables is significant: the intent table
//! breaks classification ties, and the product-type map returns its first
//! containment match.

use crate::intent::Intent;
use lazy_static::lazy_static;

/// Trigger words per intent, in definition order (ties go to the earlier entry).
pub const INTENT_KEYWORDS: &[(Intent, &[&str])] = &[
    (
        Intent::Summary,
        &[
            "обобщение",
            "резюме",
            "справка",
            "информация",
            "статистика",
            "данни",
        ],
    ),
    (Intent::Client, &["клиент", "фирма", "компания", "марка"]),
    (
        Intent::Product,
        &["продукт", "артикул", "модел", "изделие", "стока"],
    ),
    (
        Intent::Production,
        &[
            "производство",
            "изработка",
            "изплетено",
            "изработено",
            "конфекционирано",
        ],
    ),
    (
        Intent::MachineType,
        &["файн", "машини", "машина", "гейдж", "гейч"],
    ),
    (
        Intent::Planning,
        &["планиране", "план", "график", "прогноза", "очаквано"],
    ),
    // Bare relative-day words ("днес", "утре") are extraction input, not
    // intent triggers; a date alone should fall through to the summary view.
    (Intent::Date, &["дата", "седмица", "месец"]),
    (
        Intent::Quantity,
        &["количество", "бройки", "брой", "бр"],
    ),
    (Intent::Color, &["цвят", "цветове"]),
    (Intent::Type, &["вид", "тип", "видове"]),
    (
        Intent::Factory,
        &["цех", "работилница", "фабрика", "етаж"],
    ),
];

/// Free-text product phrase -> canonical code as it appears in the workbook.
/// Scanned in order, first containment match wins. The order is pinned
/// behavior: "жилетка" precedes its multi-word variants and shadows them, so
/// "жилетка с цип" resolves to the plain code.
pub const PRODUCT_TYPE_MAP: &[(&str, &str)] = &[
    ("пуловер", "пуловер"),
    ("жилетка", "жилетка"),
    ("жилетка с копчета", "жил с коп"),
    ("жилетка с цип", "жил с цип"),
    ("риза", "риза"),
    ("риза с копчета", "риза с к-та"),
    ("троер", "троер"),
    ("елек", "елек"),
    ("рокля", "рокля"),
    ("пола", "пола"),
    ("шал", "шал"),
    ("шапка", "шапка"),
];

/// Month name -> month number.
pub const MONTH_NAMES: &[(&str, u32)] = &[
    ("януари", 1),
    ("февруари", 2),
    ("март", 3),
    ("април", 4),
    ("май", 5),
    ("юни", 6),
    ("юли", 7),
    ("август", 8),
    ("септември", 9),
    ("октомври", 10),
    ("ноември", 11),
    ("декември", 12),
];

/// Display name for a month number.
pub fn month_name(month: u32) -> Option<&'static str> {
    MONTH_NAMES
        .iter()
        .find(|(_, num)| *num == month)
        .map(|(name, _)| *name)
}

/// Ordinal day words, standard and colloquial spellings (1-31).
pub const ORDINAL_DAY_WORDS: &[(&str, u32)] = &[
    ("първи", 1),
    ("втори", 2),
    ("трети", 3),
    ("четвърти", 4),
    ("пети", 5),
    ("шести", 6),
    ("седми", 7),
    ("осми", 8),
    ("девети", 9),
    ("десети", 10),
    ("единадесети", 11),
    ("единайсти", 11),
    ("дванадесети", 12),
    ("дванайсти", 12),
    ("тринадесети", 13),
    ("тринайсти", 13),
    ("четиринадесети", 14),
    ("четиринайсти", 14),
    ("петнайсти", 15),
    ("петнадесети", 15),
    ("шестнадесети", 16),
    ("шестнайсти", 16),
    ("седемнадесети", 17),
    ("седемнайсти", 17),
    ("осемнайсти", 18),
    ("осемнадесети", 18),
    ("деветнадесети", 19),
    ("деветнайсти", 19),
    ("двадесети", 20),
    ("двайсти", 20),
    ("двадесет и първи", 21),
    ("двайсет и първи", 21),
    ("двайспърви", 21),
    ("двадесет и втори", 22),
    ("двайсет и втори", 22),
    ("двайсвтори", 22),
    ("двайстрети", 23),
    ("двайсет и трети", 23),
    ("двадесет и трети", 23),
    ("двайсет и четвърти", 24),
    ("двадесет и четвърти", 24),
    ("двайсчетвърти", 24),
    ("двадесет и пети", 25),
    ("двайсет и пети", 25),
    ("двайспети", 25),
    ("двадесет и шести", 26),
    ("двайсет и шести", 26),
    ("двайсшести", 26),
    ("двадесет и седми", 27),
    ("двайсет и седми", 27),
    ("двайсседми", 27),
    ("двадесет и осми", 28),
    ("двайсет и осми", 28),
    ("двайсосми", 28),
    ("двадесет и девети", 29),
    ("двайсет и девети", 29),
    ("двайсдевети", 29),
    ("тридесети", 30),
    ("трийсти", 30),
    ("тридесет и първи", 31),
    ("трийсет и първи", 31),
    ("трийспърви", 31),
];

lazy_static! {
    /// Ordinal day words ordered longest first, so "двадесет и първи" is
    /// tried before the "първи" it contains.
    pub static ref ORDINAL_DAY_WORDS_BY_LENGTH: Vec<(&'static str, u32)> = {
        let mut words = ORDINAL_DAY_WORDS.to_vec();
        words.sort_by(|a, b| b.0.chars().count().cmp(&a.0.chars().count()));
        words
    };
}

/// Well-known client name fragments, used only when a client marker word
/// appears without an explicit name after it.
pub const COMMON_CLIENTS: &[&str] = &[
    "matinique",
    "lebek",
    "матеник",
    "лебек",
    "robert tod",
    "робърт тод",
    "zerbi",
    "зерби",
];

/// Words that mark a repeated header row inside the data, and that are never
/// valid entity names.
pub const HEADER_MARKERS: &[&str] = &["фирма", "company", "производство"];

/// Characters stripped from candidates before product-model comparison.
pub const PUNCT_CHARS: &[char] = &[' ', ',', '-', ';', '.', ':', 'и'];

/// Strip the product punctuation set and lowercase.
pub fn clean_for_match(s: &str) -> String {
    s.to_lowercase()
        .chars()
        .filter(|c| !PUNCT_CHARS.contains(c))
        .collect()
}

/// Containment check for a product phrase, tolerant of inflection: when the
/// phrase ends in "а"/"я", its stem (final vowel dropped) also counts, so
/// "жилетки" matches "жилетка". Stems shorter than four characters are too
/// ambiguous and only match exactly.
pub fn product_phrase_matches(message: &str, phrase: &str) -> bool {
    if message.contains(phrase) {
        return true;
    }
    if let Some(stem) = phrase.strip_suffix('а').or_else(|| phrase.strip_suffix('я')) {
        if stem.chars().count() >= 4 {
            return message.contains(stem);
        }
    }
    false
}
