use super::engine::{ScoredProgram, ViableResult};

/// Text fields a search query is matched against.
pub trait SearchFields {
    fn name(&self) -> &str;
    fn campus(&self) -> &str;
    fn schedule(&self) -> &str;
}

impl SearchFields for ViableResult {
    fn name(&self) -> &str {
        &self.name
    }

    fn campus(&self) -> &str {
        &self.campus
    }

    fn schedule(&self) -> &str {
        &self.schedule
    }
}

impl SearchFields for ScoredProgram {
    fn name(&self) -> &str {
        &self.name
    }

    fn campus(&self) -> &str {
        &self.campus
    }

    fn schedule(&self) -> &str {
        &self.schedule
    }
}

/// Keep the items whose name, campus or schedule contains `query`,
/// ignoring case. An empty query keeps everything. Order is preserved.
pub fn filter_matching<'a, T: SearchFields>(items: &'a [T], query: &str) -> Vec<&'a T> {
    if query.is_empty() {
        return items.iter().collect();
    }

    let needle = query.to_lowercase();
    items
        .iter()
        .filter(|item| {
            [item.name(), item.campus(), item.schedule()]
                .iter()
                .any(|field| field.to_lowercase().contains(&needle))
        })
        .collect()
}
