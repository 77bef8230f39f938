use std::collections::BTreeSet;

use super::model::{Dataset, Dimension, Record};

// ---------------------------------------------------------------------------
// Filter predicate: which values are selected per dimension
// ---------------------------------------------------------------------------

/// Selected regions and genders. An empty set selects nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSelection {
    pub regions: BTreeSet<String>,
    pub genders: BTreeSet<String>,
}

impl FilterSelection {
    /// Every observed value selected (i.e., show everything).
    pub fn all(dataset: &Dataset) -> Self {
        FilterSelection {
            regions: dataset.values_of(Dimension::Region).clone(),
            genders: dataset.values_of(Dimension::Gender).clone(),
        }
    }

    pub fn selected(&self, dim: Dimension) -> &BTreeSet<String> {
        match dim {
            Dimension::Region => &self.regions,
            Dimension::Gender => &self.genders,
        }
    }

    pub fn selected_mut(&mut self, dim: Dimension) -> &mut BTreeSet<String> {
        match dim {
            Dimension::Region => &mut self.regions,
            Dimension::Gender => &mut self.genders,
        }
    }

    /// Add `value` if absent, remove it if present.
    pub fn toggle(&mut self, dim: Dimension, value: &str) {
        let selected = self.selected_mut(dim);
        if !selected.remove(value) {
            selected.insert(value.to_string());
        }
    }

    pub fn select_all(&mut self, dim: Dimension, dataset: &Dataset) {
        *self.selected_mut(dim) = dataset.values_of(dim).clone();
    }

    pub fn select_none(&mut self, dim: Dimension) {
        self.selected_mut(dim).clear();
    }

    /// A record passes when its value is selected in every dimension.
    pub fn matches(&self, record: &Record) -> bool {
        Dimension::ALL
            .iter()
            .all(|dim| self.selected(*dim).contains(dim.value_of(record)))
    }
}

// ---------------------------------------------------------------------------
// FilteredView – borrowed subsequence of the dataset
// ---------------------------------------------------------------------------

/// The rows of a [`Dataset`] matching a selection, in original order.
#[derive(Debug, Clone)]
pub struct FilteredView<'a> {
    dataset: &'a Dataset,
    indices: Vec<usize>,
}

impl<'a> FilteredView<'a> {
    /// A view over every row.
    #[cfg(test)]
    pub fn all(dataset: &'a Dataset) -> Self {
        FilteredView {
            dataset,
            indices: (0..dataset.len()).collect(),
        }
    }

    /// Dataset row indices, ascending.
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a Record> + '_ {
        let records = &self.dataset.records;
        self.indices.iter().map(move |&i| &records[i])
    }

    /// First `n` row indices of the view.
    pub fn head(&self, n: usize) -> &[usize] {
        &self.indices[..n.min(self.indices.len())]
    }
}

/// Return the view of records that pass `selection`.
pub fn filter<'a>(dataset: &'a Dataset, selection: &FilterSelection) -> FilteredView<'a> {
    let indices = dataset
        .records
        .iter()
        .enumerate()
        .filter(|(_, rec)| selection.matches(rec))
        .map(|(i, _)| i)
        .collect();
    FilteredView { dataset, indices }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::fixtures::{dataset, record};

    fn sample() -> Dataset {
        dataset(vec![
            record("North", "Female"),
            record("South", "Male"),
            record("North", "Male"),
            record("East", "Female"),
            record("South", "Female"),
        ])
    }

    fn set(values: &[&str]) -> BTreeSet<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn keeps_only_matching_rows_in_order() {
        let ds = sample();
        let selection = FilterSelection {
            regions: set(&["North", "South"]),
            genders: set(&["Female"]),
        };
        let view = filter(&ds, &selection);
        assert_eq!(view.indices(), &[0, 4]);
        for rec in view.iter() {
            assert!(selection.regions.contains(&rec.region));
            assert!(selection.genders.contains(&rec.gender));
        }
    }

    #[test]
    fn selecting_everything_returns_every_row() {
        let ds = sample();
        let view = filter(&ds, &FilterSelection::all(&ds));
        assert_eq!(view.len(), ds.len());
        assert_eq!(view.indices(), FilteredView::all(&ds).indices());
    }

    #[test]
    fn empty_dimension_matches_nothing() {
        let ds = sample();
        let mut selection = FilterSelection::all(&ds);
        selection.select_none(Dimension::Region);
        assert!(filter(&ds, &selection).is_empty());

        let mut selection = FilterSelection::all(&ds);
        selection.select_none(Dimension::Gender);
        assert!(filter(&ds, &selection).is_empty());
    }

    #[test]
    fn toggle_and_select_all() {
        let ds = sample();
        let mut selection = FilterSelection::all(&ds);
        selection.toggle(Dimension::Region, "North");
        assert!(!selection.regions.contains("North"));
        assert_eq!(filter(&ds, &selection).indices(), &[1, 3, 4]);

        selection.toggle(Dimension::Region, "North");
        assert!(selection.regions.contains("North"));

        selection.select_none(Dimension::Gender);
        selection.select_all(Dimension::Gender, &ds);
        assert_eq!(selection, FilterSelection::all(&ds));
    }

    #[test]
    fn head_is_clamped_to_view_length() {
        let ds = sample();
        let view = FilteredView::all(&ds);
        assert_eq!(view.head(2), &[0, 1]);
        assert_eq!(view.head(20).len(), 5);
    }
}
