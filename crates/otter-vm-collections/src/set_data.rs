//! Backing storage for Set (ES2023 §24.2).
//!
//! Uses SameValueZero semantics via `SetKey` and insertion-ordered storage
//! with tombstone-based deletion for live iteration.

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use std::sync::Arc;

use crate::intrinsics_impl::helpers::SetKey;
use crate::value::Value;

/// Tuning knobs for tombstone compaction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SetDataConfig {
    /// Never compact storage holding fewer slots than this (default: 32)
    pub compaction_min_slots: usize,
    /// Compact once tombstones exceed this fraction of all slots (default: 0.5)
    pub compaction_ratio: f64,
}

impl Default for SetDataConfig {
    fn default() -> Self {
        Self {
            compaction_min_slots: 32,
            compaction_ratio: 0.5,
        }
    }
}

/// Internal storage for a JavaScript `Set`.
///
/// Values are stored in a `Vec` in insertion order. Deleted values become
/// `None` (tombstones) so that live cursors correctly skip them and still
/// see values appended after cursor creation.
///
/// A separate `FxHashMap` provides O(1) value→slot lookup. It never points at
/// a tombstone.
///
/// Slot positions only shift during compaction, and compaction only runs
/// while no [`SetCursor`] is attached.
pub struct SetData {
    inner: RwLock<SetDataInner>,
    config: SetDataConfig,
}

struct SetDataInner {
    /// Insertion-ordered slots. `None` = tombstone (deleted).
    entries: Vec<Option<SetKey>>,
    /// Value → index in `entries` for O(1) lookup.
    index: FxHashMap<SetKey, usize>,
    /// Count of live (non-None) slots.
    size: usize,
    /// Cursors currently positioned in `entries`.
    cursors: usize,
}

impl SetDataInner {
    fn tombstones(&self) -> usize {
        self.entries.len() - self.size
    }

    fn should_compact(&self, config: &SetDataConfig) -> bool {
        self.cursors == 0
            && self.entries.len() >= config.compaction_min_slots
            && self.tombstones() as f64 > self.entries.len() as f64 * config.compaction_ratio
    }

    fn compact(&mut self) {
        let before = self.entries.len();
        self.entries.retain(Option::is_some);
        self.index.clear();
        for (idx, key) in self.entries.iter().flatten().enumerate() {
            self.index.insert(key.clone(), idx);
        }
        tracing::debug!(
            slots_before = before,
            slots_after = self.entries.len(),
            "compacted set storage"
        );
    }
}

impl Default for SetData {
    fn default() -> Self {
        Self::new()
    }
}

impl SetData {
    /// Create an empty SetData with default compaction settings.
    pub fn new() -> Self {
        Self::with_config(SetDataConfig::default())
    }

    /// Create an empty SetData.
    pub fn with_config(config: SetDataConfig) -> Self {
        Self {
            inner: RwLock::new(SetDataInner {
                entries: Vec::new(),
                index: FxHashMap::default(),
                size: 0,
                cursors: 0,
            }),
            config,
        }
    }

    /// Number of live values.
    pub fn size(&self) -> usize {
        self.inner.read().size
    }

    /// Returns `true` if a SameValueZero-equal value is present.
    pub fn has(&self, value: &Value) -> bool {
        self.inner
            .read()
            .index
            .contains_key(&SetKey::new(value.clone()))
    }

    /// Add a value (`-0` is stored as `+0`). Returns `true` if it was newly
    /// inserted, `false` if an equal value was already present.
    pub fn add(&self, value: Value) -> bool {
        let key = SetKey::new(value);
        let mut inner = self.inner.write();
        if inner.index.contains_key(&key) {
            return false;
        }
        let idx = inner.entries.len();
        inner.index.insert(key.clone(), idx);
        inner.entries.push(Some(key));
        inner.size += 1;
        true
    }

    /// Remove `value`. Returns `true` if it was present.
    pub fn remove(&self, value: &Value) -> bool {
        let mut inner = self.inner.write();
        let Some(idx) = inner.index.remove(&SetKey::new(value.clone())) else {
            return false;
        };
        inner.entries[idx] = None;
        inner.size -= 1;
        if inner.should_compact(&self.config) {
            inner.compact();
        }
        true
    }

    /// Remove all values.
    ///
    /// Without attached cursors the slots are dropped outright; otherwise
    /// every slot is tombstoned so in-flight cursor positions stay valid.
    pub fn clear(&self) {
        let mut inner = self.inner.write();
        if inner.cursors == 0 {
            inner.entries = Vec::new();
        } else {
            tracing::debug!(
                cursors = inner.cursors,
                slots = inner.entries.len(),
                "tombstoning set storage on clear"
            );
            for entry in inner.entries.iter_mut() {
                *entry = None;
            }
        }
        inner.index.clear();
        inner.size = 0;
    }

    /// Read the slot at `position`: the value if live, `None` if tombstoned
    /// or out of range.
    pub fn entry_at(&self, position: usize) -> Option<Value> {
        match self.inner.read().entries.get(position) {
            Some(Some(key)) => Some(key.value().clone()),
            _ => None,
        }
    }

    /// First live slot at or after `position`, with its index.
    pub fn next_live_from(&self, position: usize) -> Option<(usize, Value)> {
        let inner = self.inner.read();
        inner
            .entries
            .iter()
            .enumerate()
            .skip(position)
            .find_map(|(idx, slot)| slot.as_ref().map(|key| (idx, key.value().clone())))
    }

    /// Current length of the slot vector (including tombstones).
    pub fn slot_count(&self) -> usize {
        self.inner.read().entries.len()
    }

    /// Number of tombstoned slots.
    pub fn tombstone_count(&self) -> usize {
        self.inner.read().tombstones()
    }

    /// Number of attached cursors.
    pub fn attached_cursors(&self) -> usize {
        self.inner.read().cursors
    }

    /// Snapshot of the live values in iteration order.
    pub fn values(&self) -> Vec<Value> {
        let inner = self.inner.read();
        let mut result = Vec::with_capacity(inner.size);
        for key in inner.entries.iter().flatten() {
            result.push(key.value().clone());
        }
        result
    }

    fn attach_cursor(&self) {
        self.inner.write().cursors += 1;
    }

    fn detach_cursor(&self) {
        let mut inner = self.inner.write();
        inner.cursors = inner.cursors.saturating_sub(1);
        if inner.should_compact(&self.config) {
            inner.compact();
        }
    }
}

impl std::fmt::Debug for SetData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.read();
        write!(
            f,
            "SetData(size={}, slots={})",
            inner.size,
            inner.entries.len()
        )
    }
}

/// A live, single-pass position in a [`SetData`].
///
/// The cursor re-reads the slot vector on every step, so values appended
/// before it reaches the end are visited and tombstoned values are skipped.
/// It keeps storage from compacting until it is exhausted or dropped.
pub struct SetCursor {
    data: Arc<SetData>,
    position: usize,
    attached: bool,
}

impl SetCursor {
    /// Attach a new cursor at the first slot.
    pub fn new(data: Arc<SetData>) -> Self {
        data.attach_cursor();
        Self {
            data,
            position: 0,
            attached: true,
        }
    }

    /// Next live value, or `None` once exhausted. Exhaustion is terminal.
    pub fn next_value(&mut self) -> Option<Value> {
        if !self.attached {
            return None;
        }
        match self.data.next_live_from(self.position) {
            Some((idx, value)) => {
                self.position = idx + 1;
                Some(value)
            }
            None => {
                tracing::trace!(position = self.position, "set cursor exhausted");
                self.detach();
                None
            }
        }
    }

    /// Has the cursor run off the end
    pub fn is_done(&self) -> bool {
        !self.attached
    }

    fn detach(&mut self) {
        if self.attached {
            self.attached = false;
            self.data.detach_cursor();
        }
    }
}

impl Drop for SetCursor {
    fn drop(&mut self) {
        self.detach();
    }
}

impl std::fmt::Debug for SetCursor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SetCursor")
            .field("position", &self.position)
            .field("done", &!self.attached)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ints(values: &[i32]) -> Vec<Value> {
        values.iter().map(|&n| Value::int32(n)).collect()
    }

    #[test]
    fn test_add_is_idempotent() {
        let data = SetData::new();
        assert!(data.add(Value::int32(1)));
        assert!(!data.add(Value::int32(1)));
        assert_eq!(data.size(), 1);
        assert_eq!(data.slot_count(), 1);
        assert_eq!(data.values(), ints(&[1]));
    }

    #[test]
    fn test_same_value_zero_membership() {
        let data = SetData::new();
        data.add(Value::number(-0.0));
        assert!(data.has(&Value::number(0.0)));
        assert!(data.has(&Value::number(-0.0)));
        assert!(!data.values()[0].is_negative_zero());

        data.add(Value::number(f64::NAN));
        assert!(data.has(&Value::number(f64::NAN)));
        assert!(!data.add(Value::number(f64::NAN)));
        assert_eq!(data.size(), 2);
    }

    #[test]
    fn test_readd_moves_to_end() {
        let data = SetData::new();
        for n in 1..=3 {
            data.add(Value::int32(n));
        }
        assert!(data.remove(&Value::int32(2)));
        data.add(Value::int32(2));
        assert_eq!(data.values(), ints(&[1, 3, 2]));
        assert_eq!(data.tombstone_count(), 1);
    }

    #[test]
    fn test_remove_missing_is_noop() {
        let data = SetData::new();
        data.add(Value::int32(1));
        assert!(!data.remove(&Value::int32(2)));
        assert_eq!(data.size(), 1);
        assert_eq!(data.tombstone_count(), 0);
    }

    #[test]
    fn test_entry_at_and_next_live_from() {
        let data = SetData::new();
        data.add(Value::from("a"));
        data.add(Value::from("b"));
        data.add(Value::from("c"));
        data.remove(&Value::from("b"));

        assert_eq!(data.entry_at(0), Some(Value::from("a")));
        assert_eq!(data.entry_at(1), None);
        assert_eq!(data.entry_at(9), None);
        assert_eq!(data.next_live_from(1), Some((2, Value::from("c"))));
        assert_eq!(data.next_live_from(3), None);
    }

    #[test]
    fn test_clear_without_cursor_drops_slots() {
        let data = SetData::new();
        data.add(Value::int32(1));
        data.add(Value::int32(2));
        data.clear();
        assert_eq!(data.size(), 0);
        assert_eq!(data.slot_count(), 0);
        assert!(!data.has(&Value::int32(1)));
    }

    #[test]
    fn test_clear_with_cursor_tombstones() {
        let data = Arc::new(SetData::new());
        data.add(Value::int32(1));
        data.add(Value::int32(2));
        let mut cursor = SetCursor::new(data.clone());
        assert_eq!(cursor.next_value(), Some(Value::int32(1)));

        data.clear();
        assert_eq!(data.slot_count(), 2);
        assert_eq!(data.size(), 0);

        data.add(Value::int32(3));
        assert_eq!(cursor.next_value(), Some(Value::int32(3)));
        assert_eq!(cursor.next_value(), None);
        assert!(cursor.is_done());
    }

    #[test]
    fn test_cursor_sees_appended_values() {
        let data = Arc::new(SetData::new());
        data.add(Value::from("A"));
        let mut cursor = SetCursor::new(data.clone());
        assert_eq!(cursor.next_value(), Some(Value::from("A")));
        data.add(Value::from("B"));
        assert_eq!(cursor.next_value(), Some(Value::from("B")));
        assert_eq!(cursor.next_value(), None);

        // exhaustion is terminal
        data.add(Value::from("C"));
        assert_eq!(cursor.next_value(), None);
    }

    #[test]
    fn test_cursor_skips_removed_values() {
        let data = Arc::new(SetData::new());
        for n in 1..=3 {
            data.add(Value::int32(n));
        }
        let mut cursor = SetCursor::new(data.clone());
        assert_eq!(cursor.next_value(), Some(Value::int32(1)));
        data.remove(&Value::int32(2));
        assert_eq!(cursor.next_value(), Some(Value::int32(3)));
        assert_eq!(cursor.next_value(), None);
    }

    #[test]
    fn test_compaction_after_removals() {
        let data = SetData::with_config(SetDataConfig {
            compaction_min_slots: 4,
            compaction_ratio: 0.5,
        });
        for n in 0..8 {
            data.add(Value::int32(n));
        }
        for n in 0..5 {
            data.remove(&Value::int32(n));
        }
        assert_eq!(data.tombstone_count(), 0);
        assert_eq!(data.slot_count(), 3);
        assert_eq!(data.values(), ints(&[5, 6, 7]));
        assert!(data.has(&Value::int32(6)));
        assert!(data.remove(&Value::int32(6)));
        assert_eq!(data.values(), ints(&[5, 7]));
    }

    #[test]
    fn test_no_compaction_while_cursor_attached() {
        let data = Arc::new(SetData::with_config(SetDataConfig {
            compaction_min_slots: 4,
            compaction_ratio: 0.25,
        }));
        for n in 0..8 {
            data.add(Value::int32(n));
        }
        let mut cursor = SetCursor::new(data.clone());
        assert_eq!(cursor.next_value(), Some(Value::int32(0)));
        for n in 0..6 {
            data.remove(&Value::int32(n));
        }
        assert_eq!(data.slot_count(), 8);
        assert_eq!(data.attached_cursors(), 1);
        assert_eq!(cursor.next_value(), Some(Value::int32(6)));

        drop(cursor);
        assert_eq!(data.attached_cursors(), 0);
        assert_eq!(data.slot_count(), 2);
        assert_eq!(data.values(), ints(&[6, 7]));
    }

    #[test]
    fn test_independent_cursors() {
        let data = Arc::new(SetData::new());
        data.add(Value::int32(1));
        data.add(Value::int32(2));
        let mut a = SetCursor::new(data.clone());
        let mut b = SetCursor::new(data.clone());
        assert_eq!(a.next_value(), Some(Value::int32(1)));
        assert_eq!(a.next_value(), Some(Value::int32(2)));
        assert_eq!(b.next_value(), Some(Value::int32(1)));
        assert_eq!(a.next_value(), None);
        assert_eq!(data.attached_cursors(), 1);
        assert_eq!(b.next_value(), Some(Value::int32(2)));
    }
}
