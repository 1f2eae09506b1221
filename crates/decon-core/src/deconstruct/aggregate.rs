use std::collections::HashMap;

use tracing::debug;

use crate::deconstruct::outcome::{AggregationKey, CustomerSummary, DeconstructedRecord};
use crate::error::DeconError;

/// Running minimum per aggregation key.
///
/// Records are pushed one at a time; only the current winner of each group
/// is held, so memory grows with the number of distinct configurations and
/// not with the number of rows.
#[derive(Debug, Default)]
pub struct ResultAggregator {
    slots: HashMap<AggregationKey, usize>,
    winners: Vec<(u64, DeconstructedRecord)>,
    next_seq: u64,
}

impl ResultAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Offer a record to its group. Returns true when it became the group's
    /// current winner. Ties keep the earlier record.
    pub fn push(&mut self, record: DeconstructedRecord) -> bool {
        let seq = self.next_seq;
        self.next_seq += 1;

        let key = record.aggregation_key();
        match self.slots.get(&key) {
            Some(&slot) => {
                let (held_seq, held) = &mut self.winners[slot];
                if record.base_cost < held.base_cost {
                    debug!(
                        customer = %record.customer,
                        row = record.row_index,
                        replaced = held.row_index,
                        base_cost = %record.base_cost,
                        "new minimum for configuration"
                    );
                    *held_seq = seq;
                    *held = record;
                    true
                } else {
                    false
                }
            }
            None => {
                self.slots.insert(key, self.winners.len());
                self.winners.push((seq, record));
                true
            }
        }
    }

    /// Number of distinct configurations seen so far.
    pub fn len(&self) -> usize {
        self.winners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.winners.is_empty()
    }

    /// One record per configuration, in the input order of the winners.
    pub fn finish(self) -> Vec<DeconstructedRecord> {
        let mut winners = self.winners;
        winners.sort_by_key(|(seq, _)| *seq);
        winners.into_iter().map(|(_, record)| record).collect()
    }
}

/// Keep the cheapest record per configuration.
///
/// Fails with `EmptyResult` when there is nothing to aggregate.
pub fn aggregate<I>(records: I) -> Result<Vec<DeconstructedRecord>, DeconError>
where
    I: IntoIterator<Item = DeconstructedRecord>,
{
    let mut aggregator = ResultAggregator::new();
    for record in records {
        aggregator.push(record);
    }
    if aggregator.is_empty() {
        return Err(DeconError::EmptyResult { skipped: vec![] });
    }
    Ok(aggregator.finish())
}

/// Lowest base cost per customer, in order of first appearance.
pub fn summarize(records: &[DeconstructedRecord]) -> Vec<CustomerSummary> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut summary: Vec<CustomerSummary> = Vec::new();

    for record in records {
        match index.get(record.customer.as_str()) {
            Some(&i) => {
                let entry = &mut summary[i];
                entry.configurations += 1;
                if record.base_cost < entry.lowest_base_cost {
                    entry.lowest_base_cost = record.base_cost;
                    entry.process = record.process.clone();
                    entry.step_process = record.step_process.clone();
                    entry.coating = record.coating.clone();
                }
            }
            None => {
                index.insert(record.customer.as_str(), summary.len());
                summary.push(CustomerSummary {
                    customer: record.customer.clone(),
                    lowest_base_cost: record.base_cost,
                    configurations: 1,
                    process: record.process.clone(),
                    step_process: record.step_process.clone(),
                    coating: record.coating.clone(),
                });
            }
        }
    }

    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn rec(row: usize, customer: &str, colour: &str, price: Decimal, cost: Decimal) -> DeconstructedRecord {
        DeconstructedRecord {
            row_index: row,
            customer: customer.into(),
            customer_internal_id: "Unknown".into(),
            frame: format!("F{row}"),
            item_internal_id: "Unknown".into(),
            sale_price: price,
            process: "Milled".into(),
            step_process: "Single".into(),
            coating: "None".into(),
            foil_material: "X".into(),
            foil_thickness: "Y".into(),
            colour: colour.into(),
            attribute_cost: cost,
            base_cost: price - cost,
        }
    }

    #[test]
    fn test_minimum_base_cost_kept() {
        let out = aggregate(vec![
            rec(0, "A", "Z", dec!(100), dec!(10)),
            rec(1, "A", "Z", dec!(90), dec!(10)),
        ])
        .unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].base_cost, dec!(80));
        assert_eq!(out[0].row_index, 1);
    }

    #[test]
    fn test_tie_keeps_first() {
        let out = aggregate(vec![
            rec(0, "A", "Z", dec!(50), dec!(10)),
            rec(1, "A", "Z", dec!(50), dec!(10)),
        ])
        .unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].row_index, 0);
    }

    #[test]
    fn test_order_follows_winning_record() {
        // Group "Red" is first seen at row 0 but its winner arrives at row 2.
        let out = aggregate(vec![
            rec(0, "A", "Red", dec!(100), dec!(0)),
            rec(1, "A", "Blue", dec!(100), dec!(0)),
            rec(2, "A", "Red", dec!(60), dec!(0)),
            rec(3, "B", "Red", dec!(70), dec!(0)),
        ])
        .unwrap();
        let rows: Vec<usize> = out.iter().map(|r| r.row_index).collect();
        assert_eq!(rows, vec![1, 2, 3]);
    }

    #[test]
    fn test_sale_price_not_part_of_key() {
        let mut agg = ResultAggregator::new();
        assert!(agg.push(rec(0, "A", "Z", dec!(100), dec!(10))));
        assert!(!agg.push(rec(1, "A", "Z", dec!(120), dec!(10))));
        assert_eq!(agg.len(), 1);
    }

    #[test]
    fn test_empty_input_fails() {
        assert!(matches!(
            aggregate(Vec::new()),
            Err(DeconError::EmptyResult { .. })
        ));
    }

    #[test]
    fn test_summary_per_customer() {
        let records = vec![
            rec(0, "A", "Red", dec!(100), dec!(10)),
            rec(1, "B", "Red", dec!(40), dec!(0)),
            rec(2, "A", "Blue", dec!(60), dec!(10)),
        ];
        let summary = summarize(&records);
        assert_eq!(summary.len(), 2);
        assert_eq!(summary[0].customer, "A");
        assert_eq!(summary[0].lowest_base_cost, dec!(50));
        assert_eq!(summary[0].configurations, 2);
        assert_eq!(summary[1].customer, "B");
        assert_eq!(summary[1].lowest_base_cost, dec!(40));
    }
}
