//! Grouped running sums for charts and reports.

/// Ordered mapping from group label to accumulated total.
///
/// Groups appear in the order their first member was seen.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Aggregate {
    groups: Vec<(String, f64)>,
}

impl Aggregate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `value` to `key`, creating the group at the end if it is new.
    pub fn accumulate(&mut self, key: impl Into<String>, value: f64) {
        let key = key.into();
        match self.groups.iter_mut().find(|(existing, _)| *existing == key) {
            Some((_, total)) => *total += value,
            None => self.groups.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<f64> {
        self.groups
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, total)| *total)
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Sum over every group.
    pub fn total(&self) -> f64 {
        self.groups.iter().map(|(_, total)| total).sum()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(|(key, _)| key.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.groups.iter().map(|(key, total)| (key.as_str(), *total))
    }
}

#[cfg(test)]
mod tests {
    use super::Aggregate;

    #[test]
    fn keeps_first_occurrence_order() {
        let mut aggregate = Aggregate::new();
        aggregate.accumulate("Rent", 500.0);
        aggregate.accumulate("Food", 10.0);
        aggregate.accumulate("Rent", 20.0);

        assert_eq!(aggregate.keys().collect::<Vec<_>>(), vec!["Rent", "Food"]);
        assert_eq!(aggregate.get("Rent"), Some(520.0));
        assert_eq!(aggregate.total(), 530.0);
        assert_eq!(aggregate.get("Travel"), None);
    }
}
