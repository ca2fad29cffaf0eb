/// Min/max of one channel, shown in the chart legends.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ChannelSummary {
    pub min: f64,
    pub max: f64,
}

/// Folds a channel down to its extremes. NaN values are excluded rather than
/// allowed to poison the fold; a sequence with no finite-comparable value
/// yields `None`, as does an empty one.
pub fn min_max(values: impl IntoIterator<Item = f64>) -> Option<ChannelSummary> {
    let mut summary: Option<ChannelSummary> = None;
    for value in values {
        if value.is_nan() {
            continue;
        }
        summary = Some(match summary {
            None => ChannelSummary {
                min: value,
                max: value,
            },
            Some(s) => ChannelSummary {
                min: s.min.min(value),
                max: s.max.max(value),
            },
        });
    }
    summary
}
