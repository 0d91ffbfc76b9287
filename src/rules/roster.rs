use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use std::cmp::Ordering;

/// A student record as the front end stores it. Fields this module does not
/// read ride along in `extra` and come back unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: String,
    pub name: String,
    pub class_id: String,
    #[serde(default)]
    pub student_code: String,
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RosterOrder {
    /// Input order.
    #[default]
    Default,
    Asc,
    Desc,
}

// Base letters in Vietnamese alphabetical order; f, j, w, z sit where the
// Latin alphabet puts them.
const ALPHABET: &str = "aăâbcdđeêfghijklmnoôơpqrstuưvwxyz";

// Each vowel with its tones: level, grave, hook, tilde, acute, dot.
const TONED_VOWELS: [&str; 12] = [
    "aàảãáạ", "ăằẳẵắặ", "âầẩẫấậ", "eèẻẽéẹ", "êềểễếệ", "iìỉĩíị",
    "oòỏõóọ", "ôồổỗốộ", "ơờởỡớợ", "uùủũúụ", "ưừửữứự", "yỳỷỹýỵ",
];

/// Collation key for one name part: letters first, tones only break ties.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
struct CollationKey {
    letters: Vec<u32>,
    tones: Vec<u8>,
}

fn collation_key(text: &str) -> CollationKey {
    let mut letters = Vec::new();
    let mut tones = Vec::new();
    for c in text.chars().flat_map(char::to_lowercase) {
        let (base, tone) = TONED_VOWELS
            .iter()
            .find_map(|row| {
                row.chars()
                    .position(|v| v == c)
                    .and_then(|tone| row.chars().next().map(|base| (base, tone as u8)))
            })
            .unwrap_or((c, 0));
        let rank = ALPHABET
            .chars()
            .position(|l| l == base)
            .map(|p| p as u32)
            .unwrap_or(ALPHABET.len() as u32 + u32::from(base));
        letters.push(rank);
        tones.push(tone);
    }
    CollationKey { letters, tones }
}

/// Splits a full name into (given name, family and middle names). The given
/// name is the last word.
fn name_parts(full: &str) -> (&str, String) {
    let mut words: Vec<&str> = full.split_whitespace().collect();
    let given = words.pop().unwrap_or("");
    (given, words.join(" "))
}

fn compare_names(a: &str, b: &str) -> Ordering {
    let (given_a, family_a) = name_parts(a);
    let (given_b, family_b) = name_parts(b);
    collation_key(given_a)
        .cmp(&collation_key(given_b))
        .then_with(|| collation_key(&family_a).cmp(&collation_key(&family_b)))
}

/// Students of one class matching `search`, in the requested order.
///
/// `search` matches case-insensitively against the name or the student code;
/// blank matches everyone. Sorting is by given name, then family name, and
/// is stable, so equal names keep their input order in both directions.
pub fn class_roster<'a>(
    students: &'a [Student],
    class_id: &str,
    search: Option<&str>,
    order: RosterOrder,
) -> Vec<&'a Student> {
    let term = search
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty());

    let mut roster: Vec<&Student> = students
        .iter()
        .filter(|s| s.class_id == class_id)
        .filter(|s| match &term {
            Some(t) => {
                s.name.to_lowercase().contains(t.as_str())
                    || s.student_code.to_lowercase().contains(t.as_str())
            }
            None => true,
        })
        .collect();

    match order {
        RosterOrder::Default => {}
        RosterOrder::Asc => roster.sort_by(|a, b| compare_names(&a.name, &b.name)),
        RosterOrder::Desc => roster.sort_by(|a, b| compare_names(&b.name, &a.name)),
    }
    roster
}
