//! Initial Strategies
//!
//! Independent Bernoulli draw per node.

use coop_events::Strategy;
use rand::Rng;

use crate::components::{Graph, StrategyAssignment};
use crate::error::{check_probability, SimError};

/// Assigns every node `Cooperate` with probability `p`, `Defect` otherwise.
///
/// Draws one uniform sample per node in index order.
pub fn coin_flip<R: Rng>(
    graph: &Graph,
    p: f64,
    rng: &mut R,
) -> Result<StrategyAssignment, SimError> {
    let p = check_probability("initial cooperation probability", p)?;
    Ok(graph
        .nodes()
        .map(|_| {
            if rng.gen::<f64>() < p {
                Strategy::Cooperate
            } else {
                Strategy::Defect
            }
        })
        .collect())
}
