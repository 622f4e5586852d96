//! Selection state shared with the host, and the click/brush policies that edit it.

use std::hash::Hash;

use indexmap::IndexSet;

/// Mutation API the engine uses on a host-owned selection.
pub trait SelectionModel<T> {
    fn select(&mut self, items: &[T]);
    fn deselect(&mut self, items: &[T]);
    fn clear(&mut self);
    fn is_selected(&self, item: &T) -> bool;
    fn selected(&self) -> Vec<T>;

    fn toggle(&mut self, item: &T) {
        let items = std::slice::from_ref(item);
        if self.is_selected(item) {
            self.deselect(items);
        } else {
            self.select(items);
        }
    }

    fn len(&self) -> usize {
        self.selected().len()
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Insertion-ordered selection. `revision` increases on every change that alters the set.
#[derive(Debug, Clone)]
pub struct Selection<T: Eq + Hash> {
    items: IndexSet<T>,
    revision: u64,
}

impl<T: Eq + Hash> Default for Selection<T> {
    fn default() -> Self {
        Self {
            items: IndexSet::new(),
            revision: 0,
        }
    }
}

impl<T: Eq + Hash> Selection<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }

    fn bump(&mut self, changed: bool) {
        if changed {
            self.revision += 1;
        }
    }
}

impl<T: Eq + Hash + Clone> SelectionModel<T> for Selection<T> {
    fn select(&mut self, items: &[T]) {
        let mut changed = false;
        for item in items {
            changed |= self.items.insert(item.clone());
        }
        self.bump(changed);
    }

    fn deselect(&mut self, items: &[T]) {
        let mut changed = false;
        for item in items {
            changed |= self.items.shift_remove(item);
        }
        self.bump(changed);
    }

    fn clear(&mut self) {
        let changed = !self.items.is_empty();
        self.items.clear();
        self.bump(changed);
    }

    fn is_selected(&self, item: &T) -> bool {
        self.items.contains(item)
    }

    fn selected(&self) -> Vec<T> {
        self.items.iter().cloned().collect()
    }

    fn len(&self) -> usize {
        self.items.len()
    }
}

/// What a click landed on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickTarget<T> {
    Item(T),
    /// Inside the data domain but between two items.
    Gap,
    OutsideDomain,
}

/// Click policy: multi-select toggles the item, a plain click makes it the only selection.
/// Gaps change nothing and clicks outside the domain clear the selection.
pub fn apply_click<T, S>(selection: &mut S, target: ClickTarget<T>, multi: bool)
where
    S: SelectionModel<T> + ?Sized,
{
    match target {
        ClickTarget::Item(item) => {
            if multi {
                selection.toggle(&item);
            } else if selection.len() != 1 || !selection.is_selected(&item) {
                selection.clear();
                selection.select(std::slice::from_ref(&item));
            }
        }
        ClickTarget::Gap => {}
        ClickTarget::OutsideDomain => selection.clear(),
    }
}

/// Brush policy: replaces the selection with `items`, or adds to it under multi-select.
pub fn apply_brush<T, S>(selection: &mut S, items: &[T], multi: bool)
where
    S: SelectionModel<T> + ?Sized,
{
    if !multi {
        selection.clear();
    }
    selection.select(items);
}

/// Axis tick policy: selects a whole row or column, or deselects it when its first item is
/// already selected.
pub fn apply_group_click<T, S>(selection: &mut S, items: &[T], multi: bool)
where
    S: SelectionModel<T> + ?Sized,
{
    if !multi {
        selection.clear();
    }
    match items.first() {
        Some(first) if selection.is_selected(first) => selection.deselect(items),
        Some(_) => selection.select(items),
        None => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_click_on_sole_selection_is_a_no_op() {
        let mut s = Selection::<i32>::new();
        apply_click(&mut s, ClickTarget::Item(3), false);
        let rev = s.revision();
        apply_click(&mut s, ClickTarget::Item(3), false);
        assert_eq!(s.revision(), rev);
        assert_eq!(s.selected(), vec![3]);
    }

    #[test]
    fn multi_click_toggles() {
        let mut s = Selection::<i32>::new();
        apply_click(&mut s, ClickTarget::Item(1), true);
        apply_click(&mut s, ClickTarget::Item(2), true);
        apply_click(&mut s, ClickTarget::Item(1), true);
        assert_eq!(s.selected(), vec![2]);
        apply_click(&mut s, ClickTarget::Gap, false);
        assert_eq!(s.len(), 1);
        apply_click(&mut s, ClickTarget::OutsideDomain, true);
        assert!(s.is_empty());
    }
}
