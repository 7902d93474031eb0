//! Discrete-event turn scheduler.
//!
//! The scheduler owns the battle clock and an ordered queue of [`TurnItem`]s.
//! Items are ordered by due time, then by insertion order, so units due at
//! the same instant act first-come first-served. Advancing to a later item
//! moves the clock and notifies every subscribed unit before the item is
//! handed out.

use std::collections::BTreeMap;

use crate::state::{Tick, UnitId};

/// What a scheduled item stands for.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TurnKind {
    /// The unit gets to try its next ready skill.
    Act,
    /// A finite status of the unit runs out.
    Expire(String),
}

/// A scheduled event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TurnItem {
    pub unit: UnitId,
    pub due: Tick,
    /// Due time moves with the owner's total stun duration.
    pub stun_sensitive: bool,
    pub kind: TurnKind,
}

/// Ordering key: due time, then insertion sequence.
type TurnKey = (Tick, u64);

#[derive(Clone, Debug, Default)]
pub struct TurnScheduler {
    clock: Tick,
    queue: BTreeMap<TurnKey, TurnItem>,
    next_seq: u64,
    subscribers: Vec<UnitId>,
}

impl TurnScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current timeline clock value.
    pub fn clock(&self) -> Tick {
        self.clock
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Queues an action for `unit`. Due times in the past are clamped to now.
    pub fn schedule(&mut self, unit: UnitId, due: Tick, stun_sensitive: bool) {
        self.insert(TurnItem {
            unit,
            due,
            stun_sensitive,
            kind: TurnKind::Act,
        });
    }

    /// Registers (or moves) the expiry of `unit`'s status `name`.
    pub fn set_expiry(&mut self, unit: UnitId, name: &str, due: Tick) {
        self.cancel_expiry(unit, name);
        self.insert(TurnItem {
            unit,
            due,
            stun_sensitive: false,
            kind: TurnKind::Expire(name.to_string()),
        });
    }

    /// Drops the expiry item of `unit`'s status `name`, if any.
    pub fn cancel_expiry(&mut self, unit: UnitId, name: &str) -> bool {
        let before = self.queue.len();
        self.queue.retain(|_, item| {
            !(item.unit == unit && matches!(&item.kind, TurnKind::Expire(n) if n == name))
        });
        before != self.queue.len()
    }

    /// Drops every pending action of `unit`, keeping its expiries.
    pub fn cancel_actions(&mut self, unit: UnitId) -> usize {
        let before = self.queue.len();
        self.queue
            .retain(|_, item| !(item.unit == unit && item.kind == TurnKind::Act));
        before - self.queue.len()
    }

    /// Drops every item of `unit`.
    pub fn remove_unit(&mut self, unit: UnitId) -> usize {
        let before = self.queue.len();
        self.queue.retain(|_, item| item.unit != unit);
        before - self.queue.len()
    }

    /// Moves every stun-sensitive item of `unit` by `delta`, never before now.
    pub fn shift_unit(&mut self, unit: UnitId, delta: i64) -> usize {
        if delta == 0 {
            return 0;
        }
        let keys: Vec<TurnKey> = self
            .queue
            .iter()
            .filter(|(_, item)| item.unit == unit && item.stun_sensitive)
            .map(|(key, _)| *key)
            .collect();

        for key in &keys {
            if let Some(mut item) = self.queue.remove(key) {
                item.due = item.due.offset(delta, self.clock);
                self.queue.insert((item.due, key.1), item);
            }
        }
        tracing::trace!(%unit, delta, moved = keys.len(), "stun shift");
        keys.len()
    }

    /// Due time of the earliest item.
    pub fn peek_due(&self) -> Option<Tick> {
        self.queue.keys().next().map(|(due, _)| *due)
    }

    /// Earliest due time strictly after `tick`.
    pub fn next_due_after(&self, tick: Tick) -> Option<Tick> {
        self.queue
            .keys()
            .map(|(due, _)| *due)
            .find(|due| *due > tick)
    }

    /// Pops the earliest item.
    ///
    /// When the item lies in the future the clock jumps to it and `notify` is
    /// called once per subscriber with the new clock, in subscription order,
    /// before the item is returned.
    pub fn advance(&mut self, mut notify: impl FnMut(UnitId, Tick)) -> Option<TurnItem> {
        let (_, item) = self.queue.pop_first()?;
        if item.due > self.clock {
            self.clock = item.due;
            for &unit in &self.subscribers {
                notify(unit, self.clock);
            }
        }
        Some(item)
    }

    pub fn has_action(&self, unit: UnitId) -> bool {
        self.queue
            .values()
            .any(|item| item.unit == unit && item.kind == TurnKind::Act)
    }

    /// Pending items in pop order.
    pub fn items(&self) -> impl Iterator<Item = &TurnItem> + '_ {
        self.queue.values()
    }

    /// Pending items of `unit` in pop order.
    pub fn items_of(&self, unit: UnitId) -> impl Iterator<Item = &TurnItem> + '_ {
        self.queue.values().filter(move |item| item.unit == unit)
    }

    /// Adds `unit` to the notification list. Idempotent.
    pub fn subscribe(&mut self, unit: UnitId) {
        if !self.subscribers.contains(&unit) {
            self.subscribers.push(unit);
        }
    }

    /// Removes `unit` from the notification list. No-op if absent.
    pub fn unsubscribe(&mut self, unit: UnitId) {
        self.subscribers.retain(|&u| u != unit);
    }

    pub fn is_subscribed(&self, unit: UnitId) -> bool {
        self.subscribers.contains(&unit)
    }

    fn insert(&mut self, mut item: TurnItem) {
        item.due = item.due.max(self.clock);
        let seq = self.next_seq;
        self.next_seq += 1;
        self.queue.insert((item.due, seq), item);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: UnitId = UnitId(1);
    const B: UnitId = UnitId(2);

    fn dues(scheduler: &TurnScheduler) -> Vec<u64> {
        scheduler.items().map(|i| i.due.0).collect()
    }

    #[test]
    fn pops_in_due_order_and_moves_clock() {
        let mut scheduler = TurnScheduler::new();
        scheduler.schedule(A, Tick(50), true);
        scheduler.schedule(A, Tick(10), true);
        scheduler.schedule(A, Tick(30), true);

        let popped: Vec<u64> = std::iter::from_fn(|| scheduler.advance(|_, _| {}))
            .map(|item| item.due.0)
            .collect();

        assert_eq!(popped, vec![10, 30, 50]);
        assert_eq!(scheduler.clock(), Tick(50));
        assert!(scheduler.advance(|_, _| {}).is_none());
    }

    #[test]
    fn equal_due_times_are_first_come_first_served() {
        let mut scheduler = TurnScheduler::new();
        scheduler.schedule(B, Tick(5), true);
        scheduler.schedule(A, Tick(5), true);

        assert_eq!(scheduler.advance(|_, _| {}).unwrap().unit, B);
        assert_eq!(scheduler.advance(|_, _| {}).unwrap().unit, A);
    }

    #[test]
    fn subscribers_are_notified_only_when_clock_moves() {
        let mut scheduler = TurnScheduler::new();
        scheduler.subscribe(A);
        scheduler.subscribe(A);
        scheduler.subscribe(B);
        scheduler.schedule(A, Tick(20), true);
        scheduler.schedule(B, Tick(20), true);

        let mut calls = Vec::new();
        scheduler.advance(|unit, now| calls.push((unit, now)));
        scheduler.advance(|unit, now| calls.push((unit, now)));

        assert_eq!(calls, vec![(A, Tick(20)), (B, Tick(20))]);

        scheduler.unsubscribe(B);
        scheduler.unsubscribe(B);
        assert!(!scheduler.is_subscribed(B));
    }

    #[test]
    fn shift_moves_only_stun_sensitive_items_of_the_unit() {
        let mut scheduler = TurnScheduler::new();
        scheduler.schedule(A, Tick(100), true);
        scheduler.schedule(B, Tick(100), true);
        scheduler.set_expiry(A, "Stun", Tick(80));

        assert_eq!(scheduler.shift_unit(A, 250), 1);
        let a_items: Vec<_> = scheduler.items_of(A).map(|i| (i.due.0, i.kind.clone())).collect();
        assert_eq!(
            a_items,
            vec![(80, TurnKind::Expire("Stun".into())), (350, TurnKind::Act)]
        );
        assert_eq!(scheduler.items_of(B).next().unwrap().due, Tick(100));
    }

    #[test]
    fn negative_shift_never_goes_before_now() {
        let mut scheduler = TurnScheduler::new();
        scheduler.schedule(B, Tick(40), true);
        scheduler.schedule(A, Tick(60), true);
        scheduler.advance(|_, _| {});

        scheduler.shift_unit(A, -500);
        assert_eq!(dues(&scheduler), vec![40]);
    }

    #[test]
    fn expiry_is_replaced_not_duplicated() {
        let mut scheduler = TurnScheduler::new();
        scheduler.set_expiry(A, "Guard", Tick(2000));
        scheduler.set_expiry(A, "Guard", Tick(5000));

        assert_eq!(dues(&scheduler), vec![5000]);
        assert!(scheduler.cancel_expiry(A, "Guard"));
        assert!(scheduler.is_empty());
    }

    #[test]
    fn removing_a_unit_drops_all_its_items() {
        let mut scheduler = TurnScheduler::new();
        scheduler.schedule(A, Tick(10), true);
        scheduler.set_expiry(A, "Burn", Tick(20));
        scheduler.schedule(B, Tick(15), true);

        assert_eq!(scheduler.remove_unit(A), 2);
        assert!(!scheduler.has_action(A));
        assert_eq!(scheduler.next_due_after(Tick(0)), Some(Tick(15)));
    }
}
