use mentionwatch_core::Topic;

/// Marker phrases for each classifiable topic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicMarkers {
    entries: Vec<(Topic, Vec<String>)>,
}

impl TopicMarkers {
    /// Build from explicit `(topic, markers)` pairs. Markers are lower-cased;
    /// `General` entries are ignored since it is the fallback, not a candidate.
    #[must_use]
    pub fn new<I, M, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (Topic, M)>,
        M: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let entries = entries
            .into_iter()
            .filter(|(topic, _)| *topic != Topic::General)
            .map(|(topic, markers)| {
                let markers = markers
                    .into_iter()
                    .map(|m| m.as_ref().to_lowercase())
                    .filter(|m| !m.is_empty())
                    .collect();
                (topic, markers)
            })
            .collect();
        Self { entries }
    }

    /// Count, per topic, how many of its markers occur in `lowered` as substrings.
    fn counts<'a>(&'a self, lowered: &'a str) -> impl Iterator<Item = (Topic, usize)> + 'a {
        self.entries.iter().map(move |(topic, markers)| {
            let hits = markers.iter().filter(|m| lowered.contains(m.as_str())).count();
            (*topic, hits)
        })
    }

    /// The topic with the strictly highest marker count. Ties at the top and
    /// texts with no markers at all resolve to [`Topic::General`].
    #[must_use]
    pub fn classify(&self, text: &str) -> Topic {
        let lowered = text.to_lowercase();
        let mut best: Option<(Topic, usize)> = None;
        let mut tied = false;

        for (topic, hits) in self.counts(&lowered) {
            if hits == 0 {
                continue;
            }
            match best {
                Some((_, top)) if hits < top => {}
                Some((_, top)) if hits == top => tied = true,
                _ => {
                    best = Some((topic, hits));
                    tied = false;
                }
            }
        }

        match best {
            Some((topic, _)) if !tied => topic,
            _ => Topic::General,
        }
    }
}

impl Default for TopicMarkers {
    fn default() -> Self {
        Self::new([
            (
                Topic::Product,
                vec![
                    "product",
                    "feature",
                    "quality",
                    "performance",
                    "design",
                    "innovative",
                ],
            ),
            (
                Topic::CustomerService,
                vec![
                    "support",
                    "service",
                    "help",
                    "representative",
                    "response",
                    "assistance",
                ],
            ),
            (
                Topic::Pricing,
                vec![
                    "price",
                    "cost",
                    "expensive",
                    "cheap",
                    "value",
                    "discount",
                    "affordable",
                ],
            ),
            (
                Topic::Innovation,
                vec![
                    "innovative",
                    "technology",
                    "advanced",
                    "breakthrough",
                    "revolutionary",
                ],
            ),
            (
                Topic::Competition,
                vec![
                    "competitor",
                    "versus",
                    "alternative",
                    "better than",
                    "compared to",
                ],
            ),
        ])
    }
}
