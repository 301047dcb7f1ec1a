//! Bundling of equal-maturity positions into a single contract.
//!
//! Discounted expectation is linear, so the weighted sum of payoffs of several
//! contracts sharing a maturity can be priced from one simulation. The
//! composite built here is only ever created by [`super::Portfolio`].

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use crate::core::PricingError;
use crate::instruments::{Contract, Instrument};
use crate::market::MarketSimulation;

use super::Position;

/// Quantity-weighted sum of contracts that share one maturity.
#[derive(Debug, Clone)]
pub(crate) struct MaturityGroupingComposite {
    maturity: f64,
    constituents: Vec<(f64, Arc<dyn Contract>)>,
}

impl MaturityGroupingComposite {
    fn new(maturity: f64) -> Self {
        Self {
            maturity,
            constituents: Vec::new(),
        }
    }

    fn push(&mut self, weight: f64, contract: Arc<dyn Contract>) {
        debug_assert!(contract.maturity() == self.maturity);
        self.constituents.push((weight, contract));
    }

    pub(crate) fn len(&self) -> usize {
        self.constituents.len()
    }
}

impl Instrument for MaturityGroupingComposite {
    fn instrument_type(&self) -> &str {
        "MaturityGroupingComposite"
    }
}

impl Contract for MaturityGroupingComposite {
    fn maturity(&self) -> f64 {
        self.maturity
    }

    fn underlyings(&self) -> BTreeSet<String> {
        self.constituents
            .iter()
            .flat_map(|(_, contract)| contract.underlyings())
            .collect()
    }

    fn payoff(&self, simulation: &MarketSimulation) -> Result<Vec<f64>, PricingError> {
        let mut total = vec![0.0; simulation.n_paths()];
        for (weight, contract) in &self.constituents {
            let payoff = contract.payoff(simulation)?;
            if payoff.len() != total.len() {
                return Err(PricingError::dimension(
                    format!("{} payoff vector", contract.instrument_type()),
                    total.len(),
                    payoff.len(),
                ));
            }
            for (acc, p) in total.iter_mut().zip(payoff) {
                *acc += weight * p;
            }
        }
        Ok(total)
    }

    fn is_path_dependent(&self) -> bool {
        self.constituents
            .iter()
            .any(|(_, contract)| contract.is_path_dependent())
    }

    fn validate(&self) -> Result<(), PricingError> {
        self.constituents
            .iter()
            .try_for_each(|(_, contract)| contract.validate())
    }
}

impl fmt::Display for MaturityGroupingComposite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} contracts maturing at {}",
            self.constituents.len(),
            self.maturity
        )
    }
}

/// Partitions positions by exact maturity, in ascending maturity order.
///
/// Maturities are compared with `==`: two positions share a group only when
/// their maturities are the same `f64`.
pub(crate) fn group_by_maturity(positions: &[Position]) -> Vec<MaturityGroupingComposite> {
    let mut groups: Vec<MaturityGroupingComposite> = Vec::new();
    for position in positions {
        let maturity = position.contract.maturity();
        let contract = Arc::clone(&position.contract);
        match groups.iter_mut().find(|group| group.maturity == maturity) {
            Some(group) => group.push(position.quantity, contract),
            None => {
                let mut group = MaturityGroupingComposite::new(maturity);
                group.push(position.quantity, contract);
                groups.push(group);
            }
        }
    }
    groups.sort_by(|a, b| a.maturity.total_cmp(&b.maturity));
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instruments::{KnockoutOption, MargrabeOption, VanillaOption};
    use nalgebra::DMatrix;
    use std::collections::BTreeMap;

    fn position(quantity: f64, contract: impl Contract + 'static) -> Position {
        Position {
            quantity,
            contract: Arc::new(contract),
        }
    }

    #[test]
    fn close_but_distinct_maturities_stay_apart() {
        let positions = vec![
            position(1.0, VanillaOption::european_call("Acme", 100.0, 1.5)),
            position(1.0, VanillaOption::european_call("Acme", 100.0, 1.0)),
            position(2.0, VanillaOption::european_put("Acme", 100.0, 1.0)),
            position(1.0, VanillaOption::european_put("Acme", 100.0, 1.0 + 1e-12)),
        ];
        let groups = group_by_maturity(&positions);
        let summary: Vec<(f64, usize)> = groups.iter().map(|g| (g.maturity(), g.len())).collect();
        assert_eq!(summary, vec![(1.0, 2), (1.0 + 1e-12, 1), (1.5, 1)]);
    }

    #[test]
    fn composite_payoff_is_weighted_sum() {
        let mut paths = BTreeMap::new();
        paths.insert(
            "A".to_string(),
            DMatrix::from_row_slice(2, 2, &[100.0, 120.0, 100.0, 90.0]),
        );
        paths.insert(
            "B".to_string(),
            DMatrix::from_row_slice(2, 2, &[100.0, 100.0, 100.0, 80.0]),
        );
        let sim = MarketSimulation::new(0.0, 1.0, paths).unwrap();

        let positions = vec![
            position(2.0, VanillaOption::european_call("A", 100.0, 1.0)),
            position(-1.0, VanillaOption::european_put("A", 100.0, 1.0)),
            position(0.5, MargrabeOption::new("A", "B", 1.0)),
        ];
        let groups = group_by_maturity(&positions);
        assert_eq!(groups.len(), 1);
        let composite = &groups[0];

        // path 0: 2*20 - 0 + 0.5*20; path 1: 0 - 10 + 0.5*10
        assert_eq!(composite.payoff(&sim).unwrap(), vec![50.0, -5.0]);
        assert_eq!(
            composite.underlyings(),
            BTreeSet::from(["A".to_string(), "B".to_string()])
        );
        assert!(!composite.is_path_dependent());
    }

    #[test]
    fn composite_validation_checks_every_constituent() {
        let positions = vec![
            position(1.0, VanillaOption::european_call("A", 100.0, 1.0)),
            position(1.0, MargrabeOption::new("B", "B", 1.0)),
        ];
        let groups = group_by_maturity(&positions);
        assert!(matches!(groups[0].validate(), Err(PricingError::InvalidInput(_))));

        let valid = group_by_maturity(&positions[..1]);
        assert!(valid[0].validate().is_ok());
    }

    #[test]
    fn composite_is_path_dependent_if_any_constituent_is() {
        let knockout = KnockoutOption::builder()
            .stock("A")
            .call()
            .strike(100.0)
            .maturity(1.0)
            .up_and_out(150.0)
            .build()
            .unwrap();
        let positions = vec![
            position(1.0, VanillaOption::european_call("A", 100.0, 1.0)),
            position(1.0, knockout),
        ];
        let groups = group_by_maturity(&positions);
        assert!(groups[0].is_path_dependent());
        assert_eq!(groups[0].to_string(), "2 contracts maturing at 1");
    }
}
