use features::FeatureExtractor;
use models::{AveragedMatrix, AveragedStrategy};
use parse::Deterministic;
use system::{GoldGraph, TransitionSystem};
use ParserError;
use Result;

/// The early-update averaged perceptron trainer.
///
/// For every pass over the training set, each instance is decoded with
/// the model and the oracle in lockstep. When the decoded path diverges
/// from the oracle path, the model receives a symmetric update over the
/// divergent suffix of the two feature histories. The model generation
/// advances once per decoded instance; after the final pass the weights
/// are integrated into their time averages.
///
/// Instances on which the oracle fails (non-projective trees, lattices
/// without a gold path) are skipped and counted, unless the decoder is
/// configured not to recover.
pub struct PerceptronTrainer<'s, S, E>
where
    S: TransitionSystem + 's,
    E: FeatureExtractor + 's,
{
    decoder: Deterministic<'s, S, E>,
    iterations: usize,
    failed_training: usize,
}

impl<'s, S, E> PerceptronTrainer<'s, S, E>
where
    S: TransitionSystem,
    E: FeatureExtractor,
{
    pub fn new(decoder: Deterministic<'s, S, E>, iterations: usize) -> Self {
        assert!(iterations > 0, "training requires at least one iteration");

        PerceptronTrainer {
            decoder: decoder,
            iterations: iterations,
            failed_training: 0,
        }
    }

    /// The number of instances skipped because the oracle failed.
    pub fn failed_training(&self) -> usize {
        self.failed_training
    }

    /// Train the model on a set of gold instances. The model is
    /// integrated when training finishes and is read-only afterwards.
    pub fn train(&mut self, instances: &[GoldGraph], model: &mut AveragedMatrix) -> Result<()> {
        let mut strategy = AveragedStrategy::new(self.iterations);

        for pass in 0..self.iterations {
            let mut updates = 0;

            for (index, gold) in instances.iter().enumerate() {
                if index > 0 && index % 100 == 0 {
                    debug!("pass {}: at instance {}", pass, index);
                }

                let outcome = match self.decoder.parse_oracle_early_update(gold, &*model) {
                    Ok(outcome) => outcome,
                    Err(error) => {
                        let recoverable = error
                            .downcast_ref::<ParserError>()
                            .map(ParserError::is_recoverable)
                            .unwrap_or(false);
                        if recoverable && !self.decoder.no_recover {
                            self.failed_training += 1;
                            continue;
                        }

                        return Err(error);
                    }
                };

                if outcome.divergence.is_some() {
                    model.add_subtract(
                        outcome.gold_features.as_ref(),
                        outcome.predicted_features.as_ref(),
                        1,
                    );
                    updates += 1;
                }

                strategy.update(model);
            }

            info!(
                "pass {}: {} updates, {} failed instances so far",
                pass, updates, self.failed_training
            );
        }

        strategy.finalize(model);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use models::{AveragedMatrix, TransitionModel};
    use features::FeatureExtractor;
    use parse::Deterministic;
    use system::{Transitions, TransitionSystem};
    use testdata::{extractor, nonprojective_gold, system_for, two_token_gold, OBJ_REL};

    use super::PerceptronTrainer;

    #[test]
    fn single_example_training_separates_gold_from_prediction() {
        let gold = two_token_gold();
        let system = system_for(&gold);
        let extractor = extractor();
        let mut model = AveragedMatrix::new(
            extractor.feature_count(),
            system.transitions().len(),
            extractor.descriptors(),
        );

        let decoder = Deterministic::new(&system, &extractor);
        let mut trainer = PerceptronTrainer::new(decoder, 1);
        trainer
            .train(&[gold.clone()], &mut model)
            .unwrap();
        assert_eq!(trainer.failed_training(), 0);
        assert!(model.is_integrated());

        // Score the configuration at which training diverged: the gold
        // right-arc must now outscore the shift the zero model chose.
        let decoder = Deterministic::new(&system, &extractor);
        let outcome = decoder.parse_oracle_early_update(&gold, &model).unwrap();
        assert_eq!(outcome.divergence, None);

        let ra = system.transitions().right_arc(OBJ_REL);
        let list = outcome.predicted_features.unwrap();
        let mut node = Some(&list);
        let mut ra_features = None;
        while let Some(current) = node {
            if current.transition == ra {
                ra_features = Some(current.features.clone());
                break;
            }
            node = current.previous.as_ref();
        }

        let features = ra_features.expect("right-arc not on the decoded path");
        assert!(
            model.transition_score(ra, &features)
                > model.transition_score(Transitions::SHIFT, &features)
        );
    }

    #[test]
    fn trained_model_parses_the_training_example() {
        let gold = two_token_gold();
        let system = system_for(&gold);
        let extractor = extractor();
        let mut model = AveragedMatrix::new(
            extractor.feature_count(),
            system.transitions().len(),
            extractor.descriptors(),
        );

        let decoder = Deterministic::new(&system, &extractor);
        let mut trainer = PerceptronTrainer::new(decoder, 5);
        trainer.train(&[gold.clone()], &mut model).unwrap();

        let decoder = Deterministic::new(&system, &extractor);
        let outcome = decoder.parse(&gold.sentence, &model).unwrap();
        assert_eq!(outcome.dependencies(), gold.dependencies);
    }

    #[test]
    fn nonprojective_instances_are_counted_and_skipped() {
        let projective = two_token_gold();
        let nonprojective = nonprojective_gold();
        let system = system_for(&nonprojective);
        let extractor = extractor();
        let mut model = AveragedMatrix::new(
            extractor.feature_count(),
            system.transitions().len(),
            extractor.descriptors(),
        );

        let decoder = Deterministic::new(&system, &extractor);
        let mut trainer = PerceptronTrainer::new(decoder, 2);
        trainer
            .train(&[projective, nonprojective], &mut model)
            .unwrap();

        // Skipped once per pass.
        assert_eq!(trainer.failed_training(), 2);
    }

    #[test]
    fn nonprojective_instances_abort_training_without_recovery() {
        let nonprojective = nonprojective_gold();
        let system = system_for(&nonprojective);
        let extractor = extractor();
        let mut model = AveragedMatrix::new(
            extractor.feature_count(),
            system.transitions().len(),
            extractor.descriptors(),
        );

        let mut decoder = Deterministic::new(&system, &extractor);
        decoder.no_recover = true;
        let mut trainer = PerceptronTrainer::new(decoder, 1);
        assert!(trainer.train(&[nonprojective], &mut model).is_err());
    }

    #[test]
    fn concurrent_and_sequential_training_agree() {
        let gold = two_token_gold();
        let system = system_for(&gold);
        let extractor = extractor();

        let mut matrices = Vec::new();
        for concurrent in vec![false, true] {
            let mut model = AveragedMatrix::new(
                extractor.feature_count(),
                system.transitions().len(),
                extractor.descriptors(),
            );
            model.set_concurrent(concurrent);

            let decoder = Deterministic::new(&system, &extractor);
            let mut trainer = PerceptronTrainer::new(decoder, 3);
            trainer.train(&[gold.clone()], &mut model).unwrap();
            matrices.push(model.serialize());
        }

        assert_eq!(matrices[0], matrices[1]);
    }
}
