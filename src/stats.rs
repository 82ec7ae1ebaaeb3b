//! Per-sequence coverage statistics for one assembly.

use crate::align_report::{CategoryBuckets, OutcomeType};
use crate::interval::{covered_length, merge_intervals, Interval};
use crate::inventory::Inventory;
use crate::natural_sort::natural_sort;
use log::{debug, warn};
use std::ops::AddAssign;

/// Options controlling how buckets are turned into coverage.
#[derive(Debug, Clone, Copy)]
pub struct AggregateOptions {
    /// Merge no-hit intervals like the other categories; otherwise keep them as parsed
    pub merge_no_hit: bool,
}

impl Default for AggregateOptions {
    fn default() -> Self {
        Self { merge_no_hit: true }
    }
}

/// Intervals and covered length of one sequence in one category.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryCoverage {
    pub intervals: Vec<Interval>,
    pub length: u64,
}

impl CategoryCoverage {
    pub fn from_merged(intervals: Vec<Interval>) -> Self {
        let length = covered_length(&intervals);
        Self { intervals, length }
    }

    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverageRecord {
    pub sequence: String,
    /// Sum of the gapped no-hit lengths reported for this sequence
    pub no_hit_gapped: u64,
    /// Sum of the ungapped no-hit lengths reported for this sequence
    pub no_hit_ungapped: u64,
    categories: [CategoryCoverage; 5],
}

impl CoverageRecord {
    pub fn empty(sequence: &str) -> Self {
        Self {
            sequence: sequence.to_string(),
            no_hit_gapped: 0,
            no_hit_ungapped: 0,
            categories: Default::default(),
        }
    }

    pub fn coverage(&self, outcome: OutcomeType) -> &CategoryCoverage {
        &self.categories[outcome.index()]
    }

    pub fn length(&self, outcome: OutcomeType) -> u64 {
        self.coverage(outcome).length
    }

    pub fn intervals(&self, outcome: OutcomeType) -> &[Interval] {
        &self.coverage(outcome).intervals
    }

    /// Table columns in output order: no-hit, ungapped no-hit, collapse, expansion, inversion, mix.
    pub fn columns(&self) -> [u64; 6] {
        [
            self.no_hit_gapped,
            self.no_hit_ungapped,
            self.length(OutcomeType::Collapse),
            self.length(OutcomeType::Expansion),
            self.length(OutcomeType::Inversion),
            self.length(OutcomeType::Mix),
        ]
    }
}

/// Column sums over every record of an assembly.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CoverageTotals {
    pub no_hit_gapped: u64,
    pub no_hit_ungapped: u64,
    pub collapse: u64,
    pub expansion: u64,
    pub inversion: u64,
    pub mix: u64,
}

impl CoverageTotals {
    pub fn columns(&self) -> [u64; 6] {
        [
            self.no_hit_gapped,
            self.no_hit_ungapped,
            self.collapse,
            self.expansion,
            self.inversion,
            self.mix,
        ]
    }
}

impl AddAssign<&CoverageRecord> for CoverageTotals {
    fn add_assign(&mut self, record: &CoverageRecord) {
        self.no_hit_gapped += record.no_hit_gapped;
        self.no_hit_ungapped += record.no_hit_ungapped;
        self.collapse += record.length(OutcomeType::Collapse);
        self.expansion += record.length(OutcomeType::Expansion);
        self.inversion += record.length(OutcomeType::Inversion);
        self.mix += record.length(OutcomeType::Mix);
    }
}

/// Coverage of every inventory sequence of one assembly, in natural order.
#[derive(Debug, Clone)]
pub struct AssemblyStats {
    pub assembly: String,
    pub records: Vec<CoverageRecord>,
    pub totals: CoverageTotals,
}

impl AssemblyStats {
    pub fn get(&self, sequence: &str) -> Option<&CoverageRecord> {
        self.records.iter().find(|r| r.sequence == sequence)
    }
}

/// Combine parsed buckets with the inventory.
///
/// Every inventory sequence gets a record; sequences without rows in a category get
/// an empty, zero-length coverage for it.
pub fn aggregate(
    inventory: &Inventory,
    buckets: &CategoryBuckets,
    options: AggregateOptions,
) -> AssemblyStats {
    for seq in buckets.sequences() {
        if !inventory.contains(seq) {
            warn!(
                "{}: sequence {} is in the alignment report but not in the sequence report",
                inventory.assembly, seq
            );
        }
    }

    let mut names: Vec<&str> = inventory.names().collect();
    natural_sort(&mut names);

    let mut totals = CoverageTotals::default();
    let records: Vec<CoverageRecord> = names
        .into_iter()
        .map(|seq| {
            let record = coverage_for(&inventory.assembly, seq, buckets, options);
            totals += &record;
            record
        })
        .collect();

    AssemblyStats {
        assembly: inventory.assembly.clone(),
        records,
        totals,
    }
}

fn coverage_for(
    assembly: &str,
    seq: &str,
    buckets: &CategoryBuckets,
    options: AggregateOptions,
) -> CoverageRecord {
    let mut record = CoverageRecord::empty(seq);
    (record.no_hit_gapped, record.no_hit_ungapped) = buckets.no_hit_totals(seq);

    for outcome in OutcomeType::ALL {
        let locations = buckets.locations(outcome, seq);
        if locations.is_empty() {
            debug!("Seq has no {} data {}: {}", outcome, assembly, seq);
            continue;
        }

        let intervals: Vec<Interval> = locations.iter().map(|loc| loc.interval).collect();
        record.categories[outcome.index()] =
            if outcome == OutcomeType::NoHit && !options.merge_no_hit {
                let mut intervals = intervals;
                intervals.sort_unstable();
                CategoryCoverage {
                    length: intervals.iter().map(Interval::len).sum(),
                    intervals,
                }
            } else {
                CategoryCoverage::from_merged(merge_intervals(intervals))
            };
    }

    record
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interval::Location;
    use crate::inventory::{SequenceEntity, SequenceRole};

    fn inventory(names: &[&str]) -> Inventory {
        let mut inventory = Inventory::new("GRCh38.p2", "GCF_000001405.28");
        for name in names {
            inventory.insert(
                SequenceEntity {
                    assembly: "GRCh38.p2".to_string(),
                    name: name.to_string(),
                    ref_acc: "GCF_000001405.28".to_string(),
                    length: 1_000_000,
                    role: SequenceRole::AssembledMolecule,
                    assembly_unit: "Primary Assembly".to_string(),
                },
                false,
            );
        }
        inventory
    }

    fn buckets() -> CategoryBuckets {
        let mut buckets = CategoryBuckets::new();
        buckets.push(OutcomeType::Collapse, Location::new("1", 0, 100));
        buckets.push(OutcomeType::Collapse, Location::new("1", 49, 150));
        buckets.push(OutcomeType::Collapse, Location::new("1", 200, 210));
        buckets.push(OutcomeType::Inversion, Location::new("2", 10, 20));
        buckets.push(OutcomeType::NoHit, Location::new("2", 500, 600));
        buckets.push(OutcomeType::NoHit, Location::new("2", 550, 650));
        buckets.add_no_hit("2", 100, 90);
        buckets.add_no_hit("2", 100, 80);
        buckets.push(OutcomeType::Mix, Location::new("chrUn_1", 0, 5));
        buckets
    }

    #[test]
    fn test_aggregate() {
        let stats = aggregate(&inventory(&["X", "10", "2", "1"]), &buckets(), AggregateOptions::default());

        let order: Vec<&str> = stats.records.iter().map(|r| r.sequence.as_str()).collect();
        assert_eq!(order, vec!["1", "2", "10", "X"]);

        let one = stats.get("1").unwrap();
        assert_eq!(
            one.intervals(OutcomeType::Collapse),
            &[Interval::new(0, 150), Interval::new(200, 210)]
        );
        assert_eq!(one.length(OutcomeType::Collapse), 160);
        assert_eq!(one.columns(), [0, 0, 160, 0, 0, 0]);

        let two = stats.get("2").unwrap();
        assert_eq!(two.no_hit_gapped, 200);
        assert_eq!(two.no_hit_ungapped, 170);
        assert_eq!(two.intervals(OutcomeType::NoHit), &[Interval::new(500, 650)]);
        assert_eq!(two.length(OutcomeType::NoHit), 150);
        assert_eq!(two.length(OutcomeType::Inversion), 10);

        assert_eq!(stats.totals.columns(), [200, 170, 160, 0, 10, 0]);
    }

    #[test]
    fn test_sequence_without_rows_gets_zero_record() {
        let stats = aggregate(&inventory(&["1", "2", "10", "X"]), &buckets(), AggregateOptions::default());
        assert_eq!(stats.records.len(), 4);

        for seq in ["10", "X"] {
            let record = stats.get(seq).unwrap();
            assert_eq!(record, &CoverageRecord::empty(seq));
            for outcome in OutcomeType::ALL {
                assert_eq!(record.length(outcome), 0);
                assert!(record.intervals(outcome).is_empty());
            }
        }
    }

    #[test]
    fn test_unmerged_no_hit() {
        let stats = aggregate(
            &inventory(&["2"]),
            &buckets(),
            AggregateOptions { merge_no_hit: false },
        );
        let two = stats.get("2").unwrap();
        assert_eq!(
            two.intervals(OutcomeType::NoHit),
            &[Interval::new(500, 600), Interval::new(550, 650)]
        );
        // Table columns come from the reported lengths either way
        assert_eq!(two.columns()[0], 200);
    }

    #[test]
    fn test_sequences_missing_from_inventory_are_ignored() {
        let stats = aggregate(&inventory(&["1"]), &buckets(), AggregateOptions::default());
        assert_eq!(stats.records.len(), 1);
        assert!(stats.get("chrUn_1").is_none());
        assert_eq!(stats.totals.mix, 0);
    }
}
