use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::operation::{Operation, OperationKind};
use super::record::{Island, Penguin, PenguinPatch, Predicate, Sex, Species};
use super::spec::WorkloadSpec;

const STUDY_NAMES: [&str; 3] = ["PAL0708", "PAL0809", "PAL0910"];

/// Typical measurements per species, used as the centre of generated values.
struct Profile {
    culmen_length_mm: f64,
    culmen_depth_mm: f64,
    flipper_length_mm: u32,
    body_mass_g: u32,
}

fn profile(species: Species) -> Profile {
    match species {
        Species::Adelie => Profile {
            culmen_length_mm: 38.8,
            culmen_depth_mm: 18.3,
            flipper_length_mm: 190,
            body_mass_g: 3700,
        },
        Species::Chinstrap => Profile {
            culmen_length_mm: 48.8,
            culmen_depth_mm: 18.4,
            flipper_length_mm: 196,
            body_mass_g: 3733,
        },
        Species::Gentoo => Profile {
            culmen_length_mm: 47.5,
            culmen_depth_mm: 15.0,
            flipper_length_mm: 217,
            body_mass_g: 5076,
        },
    }
}

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

/// Lazy, finite operation sequence expanded from a [`WorkloadSpec`].
///
/// The generator owns its RNG, so two sequences built from the same spec and
/// seed are identical. Cloning yields an independent cursor at the same
/// position.
#[derive(Clone)]
pub struct Operations<'a> {
    spec: &'a WorkloadSpec,
    rng: StdRng,
    phase: usize,
    emitted: usize,
    remaining: usize,
    inserted: u32,
    key_space: u32,
}

impl<'a> Operations<'a> {
    pub(super) fn new(spec: &'a WorkloadSpec, seed: u64) -> Self {
        let inserts = spec.count_of(OperationKind::Insert);
        Self {
            spec,
            rng: StdRng::seed_from_u64(seed),
            phase: 0,
            emitted: 0,
            remaining: spec.total_operations(),
            inserted: 0,
            key_space: u32::try_from(inserts).unwrap_or(u32::MAX).max(1),
        }
    }

    fn random_key(&mut self) -> u32 {
        self.spec.key_offset + self.rng.gen_range(0..self.key_space)
    }

    fn penguin(&mut self, key: u32) -> Penguin {
        let species = Species::for_key(key);
        let p = profile(species);
        let island = match species {
            Species::Adelie => Island::ALL[self.rng.gen_range(0..Island::ALL.len())],
            Species::Chinstrap => Island::Dream,
            Species::Gentoo => Island::Biscoe,
        };
        Penguin {
            sample_number: key,
            study_name: STUDY_NAMES[self.rng.gen_range(0..STUDY_NAMES.len())].to_string(),
            species,
            island,
            culmen_length_mm: round1(p.culmen_length_mm + self.rng.gen_range(-4.0..4.0)),
            culmen_depth_mm: round1(p.culmen_depth_mm + self.rng.gen_range(-1.5..1.5)),
            flipper_length_mm: p.flipper_length_mm - 10 + self.rng.gen_range(0..=20),
            body_mass_g: p.body_mass_g - 600 + self.rng.gen_range(0..=1200),
            sex: if self.rng.gen_bool(0.5) {
                Sex::Male
            } else {
                Sex::Female
            },
        }
    }

    fn predicate(&mut self) -> Predicate {
        let species = Species::ALL[self.rng.gen_range(0..Species::ALL.len())];
        let body_mass_g = if self.rng.gen_bool(0.5) {
            let centre = profile(species).body_mass_g;
            let min = centre - self.rng.gen_range(0..=600);
            Some((min, min + self.rng.gen_range(200..=1200)))
        } else {
            None
        };
        Predicate {
            species,
            body_mass_g,
        }
    }

    fn next_operation(&mut self, kind: OperationKind) -> Operation {
        match kind {
            OperationKind::Insert => {
                let key = self.spec.key_offset + self.inserted;
                self.inserted += 1;
                Operation::Insert(self.penguin(key))
            }
            OperationKind::PointQuery => Operation::PointQuery(self.random_key()),
            OperationKind::FilterQuery => Operation::FilterQuery(self.predicate()),
            OperationKind::Update => {
                let key = self.random_key();
                let p = profile(Species::for_key(key));
                let patch = PenguinPatch {
                    flipper_length_mm: p.flipper_length_mm - 10 + self.rng.gen_range(0..=20),
                    body_mass_g: p.body_mass_g - 600 + self.rng.gen_range(0..=1200),
                };
                Operation::Update(key, patch)
            }
            OperationKind::Delete => Operation::Delete(self.random_key()),
            OperationKind::Scan => Operation::Scan,
        }
    }
}

impl Iterator for Operations<'_> {
    type Item = Operation;

    fn next(&mut self) -> Option<Operation> {
        loop {
            let phase = self.spec.phases.get(self.phase)?;
            if self.emitted < phase.count {
                let kind = phase.kind;
                self.emitted += 1;
                self.remaining -= 1;
                return Some(self.next_operation(kind));
            }
            self.phase += 1;
            self.emitted = 0;
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for Operations<'_> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workload::Phase;

    fn mixed_spec() -> WorkloadSpec {
        WorkloadSpec::new(
            vec![
                Phase::new(OperationKind::Insert, 20),
                Phase::new(OperationKind::PointQuery, 10),
                Phase::new(OperationKind::FilterQuery, 10),
                Phase::new(OperationKind::Update, 5),
                Phase::new(OperationKind::Delete, 5),
                Phase::new(OperationKind::Scan, 2),
            ],
            42,
        )
    }

    #[test]
    fn test_same_seed_same_sequence() {
        let spec = mixed_spec();
        let first: Vec<Operation> = spec.operations().unwrap().collect();
        let second: Vec<Operation> = spec.operations().unwrap().collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_different_seed_different_records() {
        let spec = mixed_spec();
        let a: Vec<Operation> = spec.generate(1).unwrap().collect();
        let b: Vec<Operation> = spec.generate(2).unwrap().collect();
        assert_ne!(a, b);
    }

    #[test]
    fn test_phases_in_order() {
        let spec = mixed_spec();
        let kinds: Vec<OperationKind> = spec.operations().unwrap().map(|op| op.kind()).collect();
        assert_eq!(kinds.len(), 52);
        assert!(kinds[..20].iter().all(|k| *k == OperationKind::Insert));
        assert!(kinds[20..30].iter().all(|k| *k == OperationKind::PointQuery));
        assert_eq!(kinds[51], OperationKind::Scan);
    }

    #[test]
    fn test_inserted_keys_are_sequential_and_queries_target_them() {
        let spec = mixed_spec();
        let ops: Vec<Operation> = spec.operations().unwrap().collect();
        for (i, op) in ops[..20].iter().enumerate() {
            match op {
                Operation::Insert(p) => {
                    assert_eq!(p.sample_number, 1_000_000 + i as u32);
                    assert_eq!(p.species, Species::for_key(p.sample_number));
                }
                other => panic!("expected insert, got {other:?}"),
            }
        }
        for op in &ops[20..30] {
            match op {
                Operation::PointQuery(key) => assert!((1_000_000..1_000_020).contains(key)),
                other => panic!("expected point query, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_generated_values_in_plausible_ranges() {
        let spec = WorkloadSpec::new(vec![Phase::new(OperationKind::Insert, 500)], 9);
        for op in spec.operations().unwrap() {
            let Operation::Insert(p) = op else {
                panic!("expected insert");
            };
            assert!((32.0..=60.0).contains(&p.culmen_length_mm));
            assert!((13.0..=22.0).contains(&p.culmen_depth_mm));
            assert!((170..=232).contains(&p.flipper_length_mm));
            assert!((2700..=6300).contains(&p.body_mass_g));
        }
    }

    #[test]
    fn test_exact_size() {
        let spec = mixed_spec();
        let mut ops = spec.operations().unwrap();
        assert_eq!(ops.len(), 52);
        ops.next();
        assert_eq!(ops.len(), 51);
    }
}
