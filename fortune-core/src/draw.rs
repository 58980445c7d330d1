//! The daily fortune-draw session.
//!
//! Enforces a per-calendar-day quota on draws and rerolls, and exactly one
//! accepted slip per day. All quota checks are advisory: a call past a limit
//! is a safe no-op (`Ok(None)`), never an error, because the surface is
//! expected to disable the action first. Only storage failures propagate.

use crate::catalog::{self, Fortune, Level};
use crate::clock::Clock;
use crate::store::{self, keys, KvStore, StoreError};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Quota-consuming draws allowed per calendar day.
pub const DAILY_DRAW_LIMIT: u32 = 3;

/// Discard-and-redraw actions allowed per calendar day.
pub const MAX_REROLLS: u32 = 2;

/// How long the jar shakes before the drawn slip is chosen. Cosmetic.
pub const SHAKE_DURATION: Duration = Duration::from_millis(1200);

/// Pause between choosing the slip and revealing it. Cosmetic.
pub const REVEAL_DELAY: Duration = Duration::from_millis(300);

/// One day of draw-session state. Field names match the original persisted
/// JSON so existing data round-trips.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyState {
    pub date: String,
    pub draws: u32,
    pub rerolls: u32,
    pub accepted: bool,
    pub accepted_fortune_id: u32,
}

impl DailyState {
    /// A zeroed record for the given date.
    fn fresh(date: String) -> Self {
        Self {
            date,
            draws: 0,
            rerolls: 0,
            accepted: false,
            accepted_fortune_id: 0,
        }
    }

    pub fn remaining_draws(&self) -> u32 {
        DAILY_DRAW_LIMIT.saturating_sub(self.draws)
    }

    pub fn remaining_rerolls(&self) -> u32 {
        MAX_REROLLS.saturating_sub(self.rerolls)
    }
}

/// One history entry per date. `fortune_id` is zero until a slip is
/// accepted that day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub date: String,
    pub fortune_id: u32,
    pub accepted: bool,
}

/// Aggregate counters for the calendar stats row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryStats {
    pub total: usize,
    pub auspicious: usize,
}

/// The daily draw session.
///
/// Owns today's quota state plus the session-local exclusion list of slips
/// already seen. The exclusion list deliberately does not persist: reloading
/// mid-day keeps the counters but forgets which slips were shown.
pub struct DrawSession<S: KvStore, C: Clock> {
    store: S,
    clock: C,
    state: DailyState,
    drawn_ids: Vec<u32>,
    current: Option<u32>,
}

impl<S: KvStore, C: Clock> DrawSession<S, C> {
    /// Load today's session from the store.
    ///
    /// A stored record for an earlier date (or a corrupt one) reads as a
    /// fresh day; storage is only written on the next state-changing action.
    pub fn load(store: S, clock: C) -> Self {
        let state = read_today(&store, &clock);
        let current = state.accepted.then_some(state.accepted_fortune_id);
        Self {
            store,
            clock,
            state,
            drawn_ids: Vec::new(),
            current,
        }
    }

    /// Today's state.
    pub fn state(&self) -> &DailyState {
        &self.state
    }

    /// Re-read today's state, picking up a date rollover while the session
    /// is open. Session-local exclusions reset with the day.
    pub fn load_today(&mut self) -> &DailyState {
        let state = read_today(&self.store, &self.clock);
        if state.date != self.state.date {
            self.drawn_ids.clear();
            self.current = state.accepted.then_some(state.accepted_fortune_id);
        }
        self.state = state;
        &self.state
    }

    /// The slip currently displayed, if any.
    pub fn current_fortune(&self) -> Option<&'static Fortune> {
        self.current.and_then(catalog::fortune_by_id)
    }

    pub fn is_accepted(&self) -> bool {
        self.state.accepted
    }

    /// Draw a slip. No-op once the daily limit is reached or today's slip
    /// is already accepted.
    ///
    /// The surface plays the shake cue for [`SHAKE_DURATION`] before calling
    /// this, then waits [`REVEAL_DELAY`] before showing the result.
    pub fn draw(&mut self) -> Result<Option<&'static Fortune>, StoreError> {
        if self.state.draws >= DAILY_DRAW_LIMIT || self.state.accepted {
            return Ok(None);
        }

        let fortune = catalog::random_fortune(&self.drawn_ids, &mut rand::thread_rng());
        self.drawn_ids.push(fortune.id);
        self.current = Some(fortune.id);
        self.state.draws += 1;
        self.state.date = self.clock.date_key();
        self.persist()?;
        Ok(Some(fortune))
    }

    /// Discard the displayed slip and draw a replacement. No-op when the
    /// reroll quota is spent, nothing is displayed, or today's slip is
    /// already accepted.
    pub fn reroll(&mut self) -> Result<Option<&'static Fortune>, StoreError> {
        if self.state.rerolls >= MAX_REROLLS || self.current.is_none() || self.state.accepted {
            return Ok(None);
        }

        let fortune = catalog::random_fortune(&self.drawn_ids, &mut rand::thread_rng());
        self.drawn_ids.push(fortune.id);
        self.current = Some(fortune.id);
        self.state.rerolls += 1;
        self.persist()?;
        Ok(Some(fortune))
    }

    /// Lock in a slip for the day and record it to history.
    ///
    /// An id not in the catalog is ignored (the surface only ever passes ids
    /// it was handed). Repeating the call rewrites the same history entry.
    pub fn accept(&mut self, fortune_id: u32) -> Result<(), StoreError> {
        if catalog::fortune_by_id(fortune_id).is_none() {
            log::warn!("ignoring accept of unknown slip {fortune_id}");
            return Ok(());
        }

        self.state.accepted = true;
        self.state.accepted_fortune_id = fortune_id;
        self.current = Some(fortune_id);
        self.persist()
    }

    /// Erase everything: session state, history, conversations, letters,
    /// prompt overrides, visited flag. Irreversible; the surface gates this
    /// behind a sustained-press confirmation.
    pub fn clear_all(&mut self) -> Result<(), StoreError> {
        store::wipe(&self.store)?;
        self.state = DailyState::fresh(self.clock.date_key());
        self.drawn_ids.clear();
        self.current = None;
        Ok(())
    }

    /// Write state and upsert today's history entry.
    fn persist(&self) -> Result<(), StoreError> {
        store::write_json(&self.store, keys::DRAW_STATE, &self.state)?;

        let mut entries = history(&self.store);
        let entry = HistoryEntry {
            date: self.state.date.clone(),
            fortune_id: self.state.accepted_fortune_id,
            accepted: self.state.accepted,
        };
        match entries.iter_mut().find(|e| e.date == self.state.date) {
            Some(existing) => *existing = entry,
            None if self.state.accepted => entries.push(entry),
            None => {}
        }
        store::write_json(&self.store, keys::FORTUNE_HISTORY, &entries)
    }
}

fn read_today(store: &impl KvStore, clock: &impl Clock) -> DailyState {
    let today = clock.date_key();
    match store::read_json::<DailyState>(store, keys::DRAW_STATE) {
        Some(state) if state.date == today => state,
        _ => DailyState::fresh(today),
    }
}

/// All history entries, oldest first. Corrupt data reads as empty.
pub fn history(store: &impl KvStore) -> Vec<HistoryEntry> {
    store::read_json(store, keys::FORTUNE_HISTORY).unwrap_or_default()
}

/// The accepted slip for a date, if one was recorded.
pub fn fortune_for_date(store: &impl KvStore, date: &str) -> Option<&'static Fortune> {
    history(store)
        .iter()
        .find(|e| e.date == date)
        .and_then(|e| catalog::fortune_by_id(e.fortune_id))
}

/// Totals for the calendar stats row.
pub fn history_stats(store: &impl KvStore) -> HistoryStats {
    let entries = history(store);
    let auspicious = entries
        .iter()
        .filter_map(|e| catalog::fortune_by_id(e.fortune_id))
        .filter(|f| f.level() == Level::Auspicious)
        .count();
    HistoryStats {
        total: entries.len(),
        auspicious,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::store::MemoryStore;

    fn session(store: &MemoryStore, date: &str) -> DrawSession<MemoryStore, FixedClock> {
        DrawSession::load(store.clone(), FixedClock::new(date))
    }

    #[test]
    fn test_fresh_state_on_first_load() {
        let store = MemoryStore::new();
        let s = session(&store, "2026-01-15");

        assert_eq!(s.state().draws, 0);
        assert!(!s.state().accepted);
        assert_eq!(s.state().date, "2026-01-15");
        // load alone must not write anything
        assert!(store.get(keys::DRAW_STATE).is_none());
    }

    #[test]
    fn test_draw_excludes_already_seen_slips() {
        let store = MemoryStore::new();
        let mut s = session(&store, "2026-01-15");

        let a = s.draw().unwrap().unwrap().id;
        let b = s.reroll().unwrap().unwrap().id;
        let c = s.reroll().unwrap().unwrap().id;

        assert_ne!(a, b);
        assert_ne!(b, c);
        assert_ne!(a, c);
    }

    #[test]
    fn test_reroll_requires_a_displayed_slip() {
        let store = MemoryStore::new();
        let mut s = session(&store, "2026-01-15");

        assert!(s.reroll().unwrap().is_none());
        assert_eq!(s.state().rerolls, 0);
    }

    #[test]
    fn test_accept_unknown_slip_is_noop() {
        let store = MemoryStore::new();
        let mut s = session(&store, "2026-01-15");
        s.draw().unwrap();

        s.accept(999).unwrap();
        assert!(!s.is_accepted());
    }

    #[test]
    fn test_history_entry_only_written_once_accepted() {
        let store = MemoryStore::new();
        let mut s = session(&store, "2026-01-15");

        let id = s.draw().unwrap().unwrap().id;
        assert!(history(&store).is_empty());

        s.accept(id).unwrap();
        let entries = history(&store);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].fortune_id, id);
        assert!(entries[0].accepted);
    }

    #[test]
    fn test_load_today_picks_up_rollover() {
        let store = MemoryStore::new();
        let mut s = session(&store, "2026-01-15");
        let id = s.draw().unwrap().unwrap().id;
        s.accept(id).unwrap();

        // same session object, new day via a fresh load
        let mut next = session(&store, "2026-01-16");
        assert_eq!(next.load_today().draws, 0);
        assert!(!next.is_accepted());
        assert!(next.current_fortune().is_none());
    }

    #[test]
    fn test_current_fortune_restored_after_accept() {
        let store = MemoryStore::new();
        let mut s = session(&store, "2026-01-15");
        let id = s.draw().unwrap().unwrap().id;
        s.accept(id).unwrap();

        // reload same day: the accepted slip is pinned
        let s = session(&store, "2026-01-15");
        assert_eq!(s.current_fortune().unwrap().id, id);
    }

    #[test]
    fn test_history_stats() {
        let store = MemoryStore::new();
        let entries = vec![
            HistoryEntry {
                date: "2026-01-14".into(),
                fortune_id: 1, // 上上 -> 吉
                accepted: true,
            },
            HistoryEntry {
                date: "2026-01-15".into(),
                fortune_id: 24, // 下签 -> 凶
                accepted: true,
            },
        ];
        store::write_json(&store, keys::FORTUNE_HISTORY, &entries).unwrap();

        let stats = history_stats(&store);
        assert_eq!(stats.total, 2);
        assert_eq!(stats.auspicious, 1);
    }

    #[test]
    fn test_fortune_for_date() {
        let store = MemoryStore::new();
        let mut s = session(&store, "2026-01-15");
        let id = s.draw().unwrap().unwrap().id;
        s.accept(id).unwrap();

        assert_eq!(fortune_for_date(&store, "2026-01-15").unwrap().id, id);
        assert!(fortune_for_date(&store, "2026-01-16").is_none());
    }
}
