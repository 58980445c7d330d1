//! Time-capsule letters.
//!
//! A small pool of letters "from the past"; opening the capsule composes one
//! at random and stitches in a random year's reflection. Letters the user
//! chooses to keep are logged under `saved-letters` and surface on the
//! calendar for their save date.

use crate::clock::Clock;
use crate::store::{self, keys, KvStore, StoreError};
use crate::years::YEAR_SUMMARIES;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// A letter the user chose to keep.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedLetter {
    /// Date key the letter was saved on.
    pub date: String,
    pub content: String,
}

/// The letter templates.
static CAPSULE_LETTERS: &[&str] = &[
    "亲爱的碧娜，\n\n如果此刻你正被什么事困扰着，请先深呼吸三次。\n\n然后想一想——过去那些你觉得过不去的坎，是不是都已经变成了故事？\n\n你一直都很好，只是有时候忘了而已。",
    "Dear 碧娜，\n\n你好呀，远方的我。\n\n不知道你现在在哪里，在做什么。但我知道，不管你正经历什么，你都没有忘记最初的那个自己。\n\n谢谢你一直在坚持。谢谢你偶尔脆弱但从不放弃。",
    "碧娜碧娜，\n\n别急着长大好不好？\n\n慢慢来，一步一步，你已经走了很远了。回头看看——那个哭着说「我不行」的女孩，现在多厉害啊。\n\n未来的你一定会感谢现在的你。",
    "嘿，碧娜，\n\n记得那年你说「连这猪圈都住了，我做什么事都会成功的」吗？\n\n看，你果然成功了。不是因为运气，而是因为你从来都是那个不会被打倒的人。",
];

/// Compose a capsule letter: a random template plus a random year's
/// reflection as a postscript.
pub fn compose_letter(rng: &mut impl Rng) -> String {
    let base = CAPSULE_LETTERS
        .choose(rng)
        .expect("letter pool is never empty");

    match YEAR_SUMMARIES.choose(rng) {
        Some(summary) => format!(
            "{base}\n\n——{}年的碧娜曾说：「{}」",
            summary.year, summary.reflection
        ),
        None => (*base).to_string(),
    }
}

/// All saved letters, oldest first. Corrupt data reads as empty.
pub fn saved_letters(store: &impl KvStore) -> Vec<SavedLetter> {
    store::read_json(store, keys::SAVED_LETTERS).unwrap_or_default()
}

/// Letters saved on a given date.
pub fn letters_for_date(store: &impl KvStore, date: &str) -> Vec<SavedLetter> {
    saved_letters(store)
        .into_iter()
        .filter(|l| l.date == date)
        .collect()
}

/// Keep a letter, stamped with today's date.
///
/// Saving the same content twice on the same day is a no-op.
pub fn save_letter(
    store: &impl KvStore,
    clock: &impl Clock,
    content: &str,
) -> Result<(), StoreError> {
    let today = clock.date_key();
    let mut letters = saved_letters(store);

    if letters
        .iter()
        .any(|l| l.date == today && l.content == content)
    {
        return Ok(());
    }

    letters.push(SavedLetter {
        date: today,
        content: content.to_string(),
    });
    store::write_json(store, keys::SAVED_LETTERS, &letters)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::store::MemoryStore;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_compose_letter_quotes_a_reflection() {
        let mut rng = StdRng::seed_from_u64(0);
        let letter = compose_letter(&mut rng);
        assert!(letter.contains("碧娜"));
        assert!(letter.contains("年的碧娜曾说"));
    }

    #[test]
    fn test_save_letter_dedupes_per_day() {
        let store = MemoryStore::new();
        let clock = FixedClock::new("2026-01-15");

        save_letter(&store, &clock, "信的内容").unwrap();
        save_letter(&store, &clock, "信的内容").unwrap();
        save_letter(&store, &clock, "另一封信").unwrap();

        assert_eq!(saved_letters(&store).len(), 2);
    }

    #[test]
    fn test_letters_for_date() {
        let store = MemoryStore::new();
        save_letter(&store, &FixedClock::new("2026-01-15"), "一月的信").unwrap();
        save_letter(&store, &FixedClock::new("2026-02-01"), "二月的信").unwrap();

        let letters = letters_for_date(&store, "2026-01-15");
        assert_eq!(letters.len(), 1);
        assert_eq!(letters[0].content, "一月的信");
        assert!(letters_for_date(&store, "2026-03-01").is_empty());
    }
}
