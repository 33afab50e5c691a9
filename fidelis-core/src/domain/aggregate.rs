// fidelis-core/src/domain/aggregate.rs

use serde::Serialize;

use crate::domain::dimension::{DimensionKey, DimensionRegistry};
use crate::domain::evaluation::QualityCheckResult;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DimensionSummary {
    pub dimension: DimensionKey,
    /// Mean of the column scores of this dimension.
    pub score: f64,
    pub results: Vec<QualityCheckResult>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregatedReport {
    pub overall_score: f64,
    pub by_dimension: Vec<DimensionSummary>,
}

pub struct ResultAggregator<'a> {
    registry: &'a DimensionRegistry,
}

fn mean<'r>(results: impl IntoIterator<Item = &'r QualityCheckResult>) -> f64 {
    let (sum, count) = results
        .into_iter()
        .fold((0.0, 0usize), |(sum, count), r| (sum + r.score(), count + 1));
    if count == 0 { 0.0 } else { sum / count as f64 }
}

impl<'a> ResultAggregator<'a> {
    pub fn new(registry: &'a DimensionRegistry) -> Self {
        Self { registry }
    }

    /// Groups results by dimension in registry order. Dimensions the registry
    /// does not know are appended in first-seen order.
    pub fn aggregate(&self, results: Vec<QualityCheckResult>) -> AggregatedReport {
        let overall_score = mean(&results);

        let mut groups: Vec<(DimensionKey, Vec<QualityCheckResult>)> = Vec::new();
        for result in results {
            match groups.iter_mut().find(|(key, _)| key == result.dimension()) {
                Some((_, bucket)) => bucket.push(result),
                None => groups.push((result.dimension().clone(), vec![result])),
            }
        }

        // Stable sort keeps first-seen order among unregistered keys
        groups.sort_by_key(|(key, _)| self.registry.position(key).unwrap_or(usize::MAX));

        let by_dimension = groups
            .into_iter()
            .map(|(dimension, results)| DimensionSummary {
                score: mean(&results),
                dimension,
                results,
            })
            .collect();

        AggregatedReport {
            overall_score,
            by_dimension,
        }
    }
}
