use super::SampleSeries;

/// Device series keyed by label, in polling order.
///
/// The order is kept all the way to encoding so that a pass always produces
/// its points in the same order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeriesSet {
    series: Vec<SampleSeries>,
}

impl SeriesSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a series, replacing in place any series with the same label.
    pub fn insert(&mut self, series: SampleSeries) {
        match self
            .series
            .iter_mut()
            .find(|existing| existing.label() == series.label())
        {
            Some(existing) => *existing = series,
            None => self.series.push(series),
        }
    }

    pub fn get(&self, label: &str) -> Option<&SampleSeries> {
        self.series.iter().find(|series| series.label() == label)
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SampleSeries> {
        self.series.iter()
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.series.iter().map(SampleSeries::label)
    }
}

impl FromIterator<SampleSeries> for SeriesSet {
    fn from_iter<T: IntoIterator<Item = SampleSeries>>(iter: T) -> Self {
        let mut set = SeriesSet::new();
        for series in iter {
            set.insert(series);
        }
        set
    }
}

impl IntoIterator for SeriesSet {
    type Item = SampleSeries;
    type IntoIter = std::vec::IntoIter<SampleSeries>;

    fn into_iter(self) -> Self::IntoIter {
        self.series.into_iter()
    }
}

impl<'a> IntoIterator for &'a SeriesSet {
    type Item = &'a SampleSeries;
    type IntoIter = std::slice::Iter<'a, SampleSeries>;

    fn into_iter(self) -> Self::IntoIter {
        self.series.iter()
    }
}
