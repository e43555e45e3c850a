use std::collections::BTreeMap;

/// Occurrence counts of candidate values for one cell
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BarcodeValue {
    values: BTreeMap<u32, u32>,
}

impl BarcodeValue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one occurrence of `value`
    pub fn set_value(&mut self, value: u32) {
        *self.values.entry(value).or_insert(0) += 1;
    }

    /// Values sharing the highest occurrence count, ascending.
    ///
    /// Empty means no votes, more than one entry means a tie.
    pub fn value(&self) -> Vec<u32> {
        let max = self.values.values().copied().max().unwrap_or(0);
        self.values
            .iter()
            .filter(|&(_, &count)| count == max && max > 0)
            .map(|(&value, _)| value)
            .collect()
    }

    /// Occurrences recorded for `value`
    pub fn confidence(&self, value: u32) -> u32 {
        self.values.get(&value).copied().unwrap_or(0)
    }

    /// Forget every vote and keep only `value`
    pub fn replace(&mut self, value: u32) {
        self.values.clear();
        self.values.insert(value, 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_voting() {
        let mut cell = BarcodeValue::new();
        assert!(cell.value().is_empty());

        cell.set_value(12);
        cell.set_value(7);
        assert_eq!(cell.value(), vec![7, 12]);

        cell.set_value(12);
        assert_eq!(cell.value(), vec![12]);
        assert_eq!(cell.confidence(12), 2);
        assert_eq!(cell.confidence(7), 1);
        assert_eq!(cell.confidence(3), 0);

        cell.replace(3);
        assert_eq!(cell.value(), vec![3]);
    }
}
