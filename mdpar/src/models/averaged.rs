//! The sparse averaged perceptron model.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use rayon::prelude::*;

use features::FeatureValue;
use models::{FeaturesList, TransitionModel};
use ParserError;
use Result;

/// The version tag of serialized models.
pub const MODEL_VERSION: u32 = 1;

/// One weight cell with its averaging bookkeeping.
///
/// `total` accumulates `current` over generations lazily: whenever a
/// cell is touched, the time since the last touch is settled in one
/// step. This keeps averaging out of the per-update cost.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct AveragedWeight {
    current: i64,
    total: i64,
    last_generation: i64,
}

impl AveragedWeight {
    /// Settle `total` up to `generation`. Must be called exactly once
    /// before a change at that generation.
    fn advance(&mut self, generation: i64) {
        debug_assert!(generation >= self.last_generation);
        self.total = self
            .total
            .saturating_add(self.current.saturating_mul(generation - self.last_generation));
        self.last_generation = generation;
    }

    fn add(&mut self, generation: i64, amount: i64) {
        self.advance(generation);
        self.current = self.current.saturating_add(amount);
    }

    fn integrate(&mut self, generation: i64) {
        self.advance(generation);
        if generation > 0 {
            // Integer division; ties round toward zero.
            self.current = self.total / generation;
        }
    }

    pub fn current(&self) -> i64 {
        self.current
    }
}

/// One feature-template shard of the matrix: a sparse mapping from
/// feature values to per-transition weight rows.
#[derive(Clone, Debug, Default)]
struct AveragedSparse {
    rows: HashMap<FeatureValue, Vec<AveragedWeight>>,
}

impl AveragedSparse {
    fn value(&self, transition: usize, feature: &FeatureValue) -> i64 {
        self.rows
            .get(feature)
            .and_then(|row| row.get(transition))
            .map(|weight| weight.current)
            .unwrap_or(0)
    }

    fn add(
        &mut self,
        generation: i64,
        transition: usize,
        feature: &FeatureValue,
        amount: i64,
        n_transitions: usize,
    ) {
        let row = self
            .rows
            .entry(*feature)
            .or_insert_with(|| vec![AveragedWeight::default(); n_transitions]);
        if row.len() <= transition {
            row.resize(transition + 1, AveragedWeight::default());
        }

        row[transition].add(generation, amount);
    }

    fn set_scores(&self, feature: &FeatureValue, scores: &mut [i64]) {
        if let Some(row) = self.rows.get(feature) {
            for (transition, weight) in row.iter().enumerate().take(scores.len()) {
                scores[transition] += weight.current;
            }
        }
    }

    fn integrate(&mut self, generation: i64) {
        for row in self.rows.values_mut() {
            for weight in row {
                weight.integrate(generation);
            }
        }
    }

    fn sorted_rows(&self) -> Vec<(FeatureValue, Vec<AveragedWeight>)> {
        let mut rows: Vec<_> = self
            .rows
            .iter()
            .map(|(feature, row)| (*feature, row.clone()))
            .collect();
        rows.sort_by_key(|&(feature, _)| feature);
        rows
    }
}

/// The sparse averaged weight matrix.
///
/// The matrix has one shard per feature template; within a shard,
/// weight rows are indexed by feature value and transition number. A
/// global generation counter advances once per training example and
/// drives the lazy averaging of every cell.
///
/// Updates fan out over the template shards. Shards are disjoint, so
/// the fan-out needs no locking and produces weights identical to
/// sequential execution. The matrix deliberately does not implement
/// `Clone`: averaging state is tied to the generation counter, and a
/// copy would silently share its history.
#[derive(Debug)]
pub struct AveragedMatrix {
    mat: Vec<AveragedSparse>,
    n_transitions: usize,
    generation: i64,
    descriptors: Vec<String>,
    concurrent: bool,
    update_cap: Option<usize>,
    integrated: bool,
}

impl AveragedMatrix {
    /// Create a zero matrix for `n_features` templates and
    /// `n_transitions` transition numbers.
    pub fn new(n_features: usize, n_transitions: usize, descriptors: Vec<String>) -> Self {
        assert!(
            descriptors.is_empty() || descriptors.len() == n_features,
            "descriptor count does not match the feature count"
        );

        AveragedMatrix {
            mat: vec![AveragedSparse::default(); n_features],
            n_transitions: n_transitions,
            generation: 0,
            descriptors: descriptors,
            concurrent: false,
            update_cap: None,
            integrated: false,
        }
    }

    pub fn feature_count(&self) -> usize {
        self.mat.len()
    }

    pub fn n_transitions(&self) -> usize {
        self.n_transitions
    }

    pub fn generation(&self) -> i64 {
        self.generation
    }

    pub fn descriptors(&self) -> &[String] {
        &self.descriptors
    }

    pub fn is_integrated(&self) -> bool {
        self.integrated
    }

    /// Enable or disable the parallel template fan-out during updates.
    /// Both modes produce bit-identical weights.
    pub fn set_concurrent(&mut self, concurrent: bool) {
        self.concurrent = concurrent;
    }

    /// Drop updates for transition numbers at or above `cap`.
    ///
    /// Off by default.
    pub fn set_update_cap(&mut self, cap: Option<usize>) {
        self.update_cap = cap;
    }

    /// The cumulative score of a feature history: the sum of the
    /// transition scores of all nodes. The empty history scores 0.
    pub fn score(&self, features: Option<&Rc<FeaturesList>>) -> i64 {
        let mut score = 0i64;

        let mut node = features;
        while let Some(list) = node {
            score += self.transition_score(list.transition, &list.features);
            node = list.previous.as_ref();
        }

        score
    }

    /// Add every `(template, transition, feature)` along the history.
    pub fn add(&mut self, features: &Rc<FeaturesList>) {
        self.apply_list(Some(features), 1);
    }

    /// Subtract every `(template, transition, feature)` along the
    /// history.
    pub fn subtract(&mut self, features: &Rc<FeaturesList>) {
        self.apply_list(Some(features), -1);
    }

    /// Apply a symmetric perceptron update: `+amount` along the gold
    /// history and `-amount` along the decoded history, pairwise from
    /// the leaves back. The shared prefix of the two histories is left
    /// untouched.
    pub fn add_subtract(
        &mut self,
        gold: Option<&Rc<FeaturesList>>,
        decoded: Option<&Rc<FeaturesList>>,
        amount: i64,
    ) {
        match (gold, decoded) {
            (Some(gold), Some(decoded)) => {
                if Rc::ptr_eq(gold, decoded) {
                    return;
                }

                self.add_subtract(gold.previous.as_ref(), decoded.previous.as_ref(), amount);
                self.apply_node(gold, amount);
                self.apply_node(decoded, -amount);
            }
            (Some(gold), None) => {
                self.add_subtract(gold.previous.as_ref(), None, amount);
                self.apply_node(gold, amount);
            }
            (None, Some(decoded)) => {
                self.add_subtract(None, decoded.previous.as_ref(), amount);
                self.apply_node(decoded, -amount);
            }
            (None, None) => {}
        }
    }

    fn apply_list(&mut self, features: Option<&Rc<FeaturesList>>, amount: i64) {
        if let Some(list) = features {
            self.apply_list(list.previous.as_ref(), amount);
            self.apply_node(list, amount);
        }
    }

    fn apply_node(&mut self, node: &FeaturesList, amount: i64) {
        assert!(!self.integrated, "update on an integrated matrix");

        if let Some(cap) = self.update_cap {
            if node.transition >= cap {
                return;
            }
        }

        let generation = self.generation;
        let transition = node.transition;
        let n_transitions = self.n_transitions;

        if self.concurrent {
            self.mat
                .par_iter_mut()
                .zip(node.features.par_iter())
                .for_each(|(shard, feature)| {
                    if let Some(ref feature) = *feature {
                        shard.add(generation, transition, feature, amount, n_transitions);
                    }
                });
        } else {
            for (shard, feature) in self.mat.iter_mut().zip(&node.features) {
                if let Some(ref feature) = *feature {
                    shard.add(generation, transition, feature, amount, n_transitions);
                }
            }
        }
    }

    /// Advance the generation counter. Called once per training
    /// example.
    pub fn increment_generation(&mut self) {
        assert!(!self.integrated, "generation bump on an integrated matrix");
        self.generation += 1;
    }

    fn set_generation(&mut self, generation: i64) {
        self.generation = generation;
    }

    /// Replace every weight by its time average over the generations.
    /// Afterwards the matrix is read-only.
    pub fn integrate(&mut self) {
        assert!(!self.integrated, "matrix is already integrated");

        let generation = self.generation;
        for shard in &mut self.mat {
            shard.integrate(generation);
        }

        self.integrated = true;
    }

    pub fn serialize(&self) -> AveragedMatrixSerialized {
        let mat = self
            .mat
            .iter()
            .map(|shard| {
                if self.integrated {
                    ShardData::Integrated(
                        shard
                            .sorted_rows()
                            .into_iter()
                            .map(|(feature, row)| {
                                (feature, row.into_iter().map(|w| w.current).collect())
                            }).collect(),
                    )
                } else {
                    ShardData::Averaged(shard.sorted_rows())
                }
            }).collect();

        AveragedMatrixSerialized {
            version: MODEL_VERSION,
            generation: self.generation,
            n_transitions: self.n_transitions,
            descriptors: self.descriptors.clone(),
            mat: mat,
        }
    }

    pub fn deserialize(data: AveragedMatrixSerialized) -> Result<AveragedMatrix> {
        if data.version != MODEL_VERSION {
            return Err(ParserError::UnsupportedModelVersion(data.version).into());
        }

        let generation = data.generation;
        let mut integrated = false;
        let mat = data
            .mat
            .into_iter()
            .map(|shard| match shard {
                ShardData::Averaged(rows) => AveragedSparse {
                    rows: rows.into_iter().collect(),
                },
                ShardData::Integrated(rows) => {
                    integrated = true;
                    AveragedSparse {
                        rows: rows
                            .into_iter()
                            .map(|(feature, row)| {
                                let row = row
                                    .into_iter()
                                    .map(|current| AveragedWeight {
                                        current: current,
                                        total: 0,
                                        last_generation: generation,
                                    }).collect();
                                (feature, row)
                            }).collect(),
                    }
                }
            }).collect();

        Ok(AveragedMatrix {
            mat: mat,
            n_transitions: data.n_transitions,
            generation: generation,
            descriptors: data.descriptors,
            concurrent: false,
            update_cap: None,
            integrated: integrated,
        })
    }
}

impl TransitionModel for AveragedMatrix {
    fn transition_score(&self, transition: usize, features: &[Option<FeatureValue>]) -> i64 {
        assert!(
            features.len() <= self.mat.len(),
            "got more features than known matrix features"
        );

        let mut score = 0i64;
        for (shard, feature) in self.mat.iter().zip(features) {
            if let Some(ref feature) = *feature {
                score += shard.value(transition, feature);
            }
        }

        score
    }

    fn set_transition_scores(&self, features: &[Option<FeatureValue>], scores: &mut Vec<i64>) {
        scores.clear();
        scores.resize(self.n_transitions, 0);

        for (shard, feature) in self.mat.iter().zip(features) {
            if let Some(ref feature) = *feature {
                shard.set_scores(feature, scores);
            }
        }
    }
}

impl fmt::Display for AveragedMatrix {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (i, shard) in self.mat.iter().enumerate() {
            match self.descriptors.get(i) {
                Some(descriptor) => writeln!(f, "{}", descriptor)?,
                None => writeln!(f, "template {}", i)?,
            }

            for (feature, row) in shard.sorted_rows() {
                let weights: Vec<String> = row
                    .iter()
                    .enumerate()
                    .filter(|&(_, w)| w.current != 0)
                    .map(|(t, w)| format!("{}:{}", t, w.current))
                    .collect();
                if !weights.is_empty() {
                    writeln!(f, "\t{:?}\t{}", feature, weights.join(" "))?;
                }
            }
        }

        Ok(())
    }
}

/// The version-tagged serialized form of an averaged matrix.
///
/// Rows are sorted by feature value, so serialization is deterministic.
/// Integrated matrices store only the final weights.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct AveragedMatrixSerialized {
    version: u32,
    generation: i64,
    n_transitions: usize,
    descriptors: Vec<String>,
    mat: Vec<ShardData>,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
enum ShardData {
    Averaged(Vec<(FeatureValue, Vec<AveragedWeight>)>),
    Integrated(Vec<(FeatureValue, Vec<i64>)>),
}

/// The averaging strategy of the trainer.
///
/// The strategy advances the model generation once per training
/// example; at the end of training it stretches the generation horizon
/// to `iterations * examples` and integrates the weights.
pub struct AveragedStrategy {
    p: i64,
    n: i64,
}

impl AveragedStrategy {
    pub fn new(iterations: usize) -> Self {
        AveragedStrategy {
            p: iterations as i64,
            n: 0,
        }
    }

    pub fn update(&mut self, model: &mut AveragedMatrix) {
        model.increment_generation();
        self.n += 1;
    }

    pub fn finalize(&mut self, model: &mut AveragedMatrix) {
        model.set_generation(self.p * self.n);
        model.integrate();
    }
}
