//! Greedy deterministic decoding.

use std::rc::Rc;

use features::FeatureExtractor;
use guide::Guide;
use lattice::LatticeSentence;
use models::{FeaturesList, TransitionModel};
use system::{DependencySet, GoldGraph, ParserState, Transition, TransitionSystem};
use ParserError;
use Result;

/// The result of a parse.
#[derive(Debug)]
pub struct ParseOutcome<'a> {
    /// The terminal state.
    pub state: Rc<ParserState<'a>>,

    /// The feature history of the decoded path, when requested.
    pub model_value: Option<Rc<FeaturesList>>,

    /// The transition sequence, when requested.
    pub sequence: Option<Vec<usize>>,
}

impl<'a> ParseOutcome<'a> {
    pub fn dependencies(&self) -> DependencySet {
        self.state.dependencies()
    }
}

/// The result of an early-update oracle parse.
pub struct EarlyUpdateOutcome<'a> {
    /// The state reached along the predicted path.
    pub state: Rc<ParserState<'a>>,

    /// The index of the first transition where the prediction diverged
    /// from the oracle, or `None` when the paths agree throughout.
    pub divergence: Option<usize>,

    /// The gold feature history up to and including the divergent
    /// transition. Only present on divergence; shares its prefix with
    /// the predicted history.
    pub gold_features: Option<Rc<FeaturesList>>,

    /// The predicted feature history.
    pub predicted_features: Option<Rc<FeaturesList>>,

    /// The number of transitions taken along the predicted path.
    pub steps: usize,
}

/// A classifier that picks the best-scoring applicable transition.
///
/// The classifier carries the cumulative score of the path decoded so
/// far and the reversed feature history backing that score. Candidates
/// are scored as the cumulative score plus the transition score of the
/// candidate in the resulting configuration; the first candidate with
/// the maximum score wins.
pub struct TransitionClassifier<'c, S, E, M>
where
    S: TransitionSystem + 'c,
    E: FeatureExtractor + 'c,
    M: TransitionModel + 'c,
{
    system: &'c S,
    extractor: &'c E,
    model: &'c M,
    score: i64,
    features_list: Option<Rc<FeaturesList>>,
    show_considerations: bool,
}

impl<'c, S, E, M> TransitionClassifier<'c, S, E, M>
where
    S: TransitionSystem,
    E: FeatureExtractor,
    M: TransitionModel,
{
    pub fn new(system: &'c S, extractor: &'c E, model: &'c M) -> Self {
        TransitionClassifier {
            system: system,
            extractor: extractor,
            model: model,
            score: 0,
            features_list: None,
            show_considerations: false,
        }
    }

    pub fn set_show_considerations(&mut self, show: bool) {
        self.show_considerations = show;
    }

    pub fn score(&self) -> i64 {
        self.score
    }

    pub fn features_list(&self) -> Option<&Rc<FeaturesList>> {
        self.features_list.as_ref()
    }

    /// Record a transition that was chosen externally (e.g. by an
    /// oracle): extend the feature history with the state it produced
    /// and update the cumulative score.
    pub fn increment<'a>(&mut self, state: &Rc<ParserState<'a>>) {
        let features = self.extractor.features(state);
        self.score += self
            .model
            .transition_score(state.last_transition(), &features);
        self.features_list = Some(FeaturesList::extend(
            self.features_list.take(),
            features,
            state.last_transition(),
        ));
    }

    /// Choose and apply the best transition, returning the successor
    /// state and the dense number of the transition.
    pub fn transition_with_state<'a>(
        &mut self,
        state: &Rc<ParserState<'a>>,
    ) -> Result<(Rc<ParserState<'a>>, usize)> {
        let mut best: Option<(i64, Rc<ParserState<'a>>, usize, Vec<_>)> = None;
        let mut previous_score = None;

        for transition in self.system.applicable(state) {
            let number = self.system.number(&transition);
            let next = ParserState::advance(state, &transition, number);
            let features = self.extractor.features(&next);
            let score = self.score + self.model.transition_score(number, &features);

            if self.show_considerations && previous_score != Some(score) {
                debug!("considering transition {} with score {}", number, score);
            }

            let better = match best {
                Some((best_score, _, _, _)) => score > best_score,
                None => true,
            };
            if better {
                best = Some((score, next, number, features));
            }

            previous_score = Some(score);
        }

        match best {
            Some((score, next, number, features)) => {
                if self.show_considerations {
                    debug!("chose transition {} with score {}", number, score);
                }

                self.features_list =
                    Some(FeaturesList::extend(self.features_list.take(), features, number));
                self.score = score;
                Ok((next, number))
            }
            None => Err(ParserError::ExhaustedTransitions.into()),
        }
    }
}

impl<'c, S, E, M> Guide for TransitionClassifier<'c, S, E, M>
where
    S: TransitionSystem,
    E: FeatureExtractor,
    M: TransitionModel,
{
    type Transition = S::Transition;

    fn best_transition(&mut self, state: &ParserState) -> Result<Self::Transition> {
        let state = Rc::new(state.clone());
        let (_, number) = self.transition_with_state(&state)?;
        self.system
            .transition(number)
            .ok_or_else(|| ParserError::ExhaustedTransitions.into())
    }
}

/// The greedy deterministic decoder.
pub struct Deterministic<'s, S, E>
where
    S: TransitionSystem + 's,
    E: FeatureExtractor + 's,
{
    system: &'s S,
    extractor: &'s E,

    /// Retain the feature history on parse outcomes.
    pub return_model_value: bool,

    /// Retain the transition sequence on parse outcomes.
    pub return_sequence: bool,

    /// Log every candidate-scoring event.
    pub show_considerations: bool,

    /// Disable the fault boundary around oracle parses.
    pub no_recover: bool,
}

impl<'s, S, E> Deterministic<'s, S, E>
where
    S: TransitionSystem,
    E: FeatureExtractor,
{
    pub fn new(system: &'s S, extractor: &'s E) -> Self {
        Deterministic {
            system: system,
            extractor: extractor,
            return_model_value: false,
            return_sequence: false,
            show_considerations: false,
            no_recover: false,
        }
    }

    pub fn system(&self) -> &'s S {
        self.system
    }

    /// Parse a sentence with a model, driving the classifier from the
    /// initial state to a terminal state.
    pub fn parse<'a, M>(&self, sentence: &'a LatticeSentence, model: &M) -> Result<ParseOutcome<'a>>
    where
        M: TransitionModel,
    {
        let mut classifier = TransitionClassifier::new(self.system, self.extractor, model);
        classifier.set_show_considerations(self.show_considerations);

        let mut state = Rc::new(ParserState::new(sentence));
        while !S::is_terminal(&state) {
            let (next, _) = classifier.transition_with_state(&state)?;
            state = next;
        }

        Ok(self.outcome(state, classifier.features_list().cloned()))
    }

    /// Parse the sentence of a gold analysis by following the oracle,
    /// recording the feature history under the model.
    ///
    /// Oracle failures (non-projective gold, a lattice without a gold
    /// path) are recovered into `Ok(None)` unless `no_recover` is set.
    pub fn parse_oracle<'a, M>(
        &self,
        gold: &'a GoldGraph,
        model: &M,
    ) -> Result<Option<ParseOutcome<'a>>>
    where
        M: TransitionModel,
    {
        match self.parse_oracle_unguarded(gold, model) {
            Ok(outcome) => Ok(Some(outcome)),
            Err(error) => {
                let recoverable = error
                    .downcast_ref::<ParserError>()
                    .map(ParserError::is_recoverable)
                    .unwrap_or(false);
                if recoverable && !self.no_recover {
                    debug!("recovered from oracle failure: {}", error);
                    Ok(None)
                } else {
                    Err(error)
                }
            }
        }
    }

    fn parse_oracle_unguarded<'a, M>(
        &self,
        gold: &'a GoldGraph,
        model: &M,
    ) -> Result<ParseOutcome<'a>>
    where
        M: TransitionModel,
    {
        let mut classifier = TransitionClassifier::new(self.system, self.extractor, model);
        let mut oracle = S::oracle(gold);

        let mut state = Rc::new(ParserState::new(&gold.sentence));
        while !S::is_terminal(&state) {
            let transition = oracle.best_transition(&state)?;
            if !transition.is_possible(&state) {
                return Err(ParserError::OracleUnreachable(
                    "oracle chose an impossible transition".to_owned(),
                ).into());
            }

            let number = self.system.number(&transition);
            state = ParserState::advance(&state, &transition, number);
            classifier.increment(&state);
        }

        Ok(self.outcome(state, classifier.features_list().cloned()))
    }

    /// Decode with the model and the oracle in lockstep, stopping at
    /// the first divergence.
    ///
    /// On divergence, the gold feature history carries the gold
    /// transition appended to the agreed prefix, and the predicted
    /// history carries the predicted transition; both share that
    /// prefix. Without divergence, the predicted path equals the gold
    /// path.
    pub fn parse_oracle_early_update<'a, M>(
        &self,
        gold: &'a GoldGraph,
        model: &M,
    ) -> Result<EarlyUpdateOutcome<'a>>
    where
        M: TransitionModel,
    {
        let mut classifier = TransitionClassifier::new(self.system, self.extractor, model);
        classifier.set_show_considerations(self.show_considerations);
        let mut oracle = S::oracle(gold);

        let mut state = Rc::new(ParserState::new(&gold.sentence));
        let mut agreed = 0;
        let mut steps = 0;
        let mut divergence = None;
        let mut gold_features = None;

        while !S::is_terminal(&state) {
            let gold_transition = oracle.best_transition(&state)?;
            let gold_number = self.system.number(&gold_transition);

            let (next, predicted_number) = classifier.transition_with_state(&state)?;
            steps += 1;

            if predicted_number != gold_number {
                let gold_state = ParserState::advance(&state, &gold_transition, gold_number);
                let shared_prefix = classifier
                    .features_list()
                    .and_then(|list| list.previous.clone());
                gold_features = Some(FeaturesList::extend(
                    shared_prefix,
                    self.extractor.features(&gold_state),
                    gold_number,
                ));
                divergence = Some(agreed);
                state = next;
                break;
            }

            agreed += 1;
            state = next;
        }

        Ok(EarlyUpdateOutcome {
            state: state,
            divergence: divergence,
            gold_features: gold_features,
            predicted_features: classifier.features_list().cloned(),
            steps: steps,
        })
    }

    fn outcome<'a>(
        &self,
        state: Rc<ParserState<'a>>,
        features: Option<Rc<FeaturesList>>,
    ) -> ParseOutcome<'a> {
        let sequence = if self.return_sequence {
            Some(state.transition_sequence())
        } else {
            None
        };

        ParseOutcome {
            model_value: if self.return_model_value {
                features
            } else {
                None
            },
            sequence: sequence,
            state: state,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use lattice::{LatticeSentence, Morpheme};
    use models::{AveragedMatrix, FeaturesList};
    use features::FeatureExtractor;
    use system::{ParserState, Transitions, TransitionSystem};
    use systems::ArcEagerMorphTransition;
    use testdata::{
        ambiguous_gold, empty_gold, extractor, nonprojective_gold, system_for, two_token_gold,
        OBJ_REL,
    };
    use ParserError;

    use super::Deterministic;

    fn zero_model(system: &::systems::ArcEagerMorphSystem) -> AveragedMatrix {
        AveragedMatrix::new(
            extractor().feature_count(),
            system.transitions().len(),
            extractor().descriptors(),
        )
    }

    #[test]
    fn empty_sentence_parses_to_the_empty_tree() {
        let gold = empty_gold();
        let system = system_for(&gold);
        let extractor = extractor();
        let model = zero_model(&system);

        let mut decoder = Deterministic::new(&system, &extractor);
        decoder.return_model_value = true;
        decoder.return_sequence = true;

        let outcome = decoder.parse(&gold.sentence, &model).unwrap();
        assert!(outcome.state.is_terminal());
        assert!(outcome.dependencies().is_empty());
        assert_eq!(outcome.sequence, Some(Vec::new()));
        assert_eq!(outcome.model_value, None);
        assert_eq!(model.score(outcome.model_value.as_ref()), 0);
    }

    #[test]
    fn greedy_decoding_always_reaches_a_terminal_tree() {
        let gold = two_token_gold();
        let system = system_for(&gold);
        let extractor = extractor();
        let model = zero_model(&system);

        let decoder = Deterministic::new(&system, &extractor);
        let outcome = decoder.parse(&gold.sentence, &model).unwrap();

        assert!(outcome.state.is_terminal());
        // Every materialized node has exactly one head.
        let dependencies = outcome.dependencies();
        assert_eq!(dependencies.len(), 2);
        for node in 1..3 {
            assert_eq!(
                dependencies.iter().filter(|d| d.dependent == node).count(),
                1
            );
        }
    }

    #[test]
    fn oracle_parse_reproduces_projective_gold() {
        let gold = two_token_gold();
        let system = system_for(&gold);
        let extractor = extractor();
        let model = zero_model(&system);

        let mut decoder = Deterministic::new(&system, &extractor);
        decoder.return_sequence = true;

        let outcome = decoder.parse_oracle(&gold, &model).unwrap().unwrap();
        assert_eq!(outcome.dependencies(), gold.dependencies);

        let transitions = system.transitions();
        assert_eq!(
            outcome.sequence,
            Some(vec![
                Transitions::SHIFT,
                transitions.right_arc(OBJ_REL),
                Transitions::REDUCE,
                Transitions::POP_ROOT,
            ])
        );
    }

    #[test]
    fn oracle_parse_selects_the_gold_lattice_path() {
        let gold = ambiguous_gold();
        let system = system_for(&gold);
        let extractor = extractor();
        let model = zero_model(&system);

        let decoder = Deterministic::new(&system, &extractor);
        let outcome = decoder.parse_oracle(&gold, &model).unwrap().unwrap();

        assert_eq!(outcome.state.n_materialized(), gold.morphemes.len());
        assert_eq!(outcome.dependencies(), gold.dependencies);
    }

    #[test]
    fn oracle_failures_are_recovered_unless_disabled() {
        let gold = nonprojective_gold();
        let system = system_for(&gold);
        let extractor = extractor();
        let model = zero_model(&system);

        let decoder = Deterministic::new(&system, &extractor);
        assert!(decoder.parse_oracle(&gold, &model).unwrap().is_none());

        let mut decoder = Deterministic::new(&system, &extractor);
        decoder.no_recover = true;
        let err = decoder.parse_oracle(&gold, &model).unwrap_err();
        assert!(err.downcast_ref::<ParserError>().is_some());
    }

    #[test]
    fn early_update_stops_at_the_first_divergence() {
        let gold = two_token_gold();
        let system = system_for(&gold);
        let extractor = extractor();
        let model = zero_model(&system);

        let decoder = Deterministic::new(&system, &extractor);
        let outcome = decoder.parse_oracle_early_update(&gold, &model).unwrap();

        // The first transition is forced; on the second, the zero
        // model prefers shift over the gold right-arc.
        assert_eq!(outcome.divergence, Some(1));
        assert_eq!(outcome.steps, 2);

        let predicted = outcome.predicted_features.unwrap();
        let gold_list = outcome.gold_features.unwrap();
        assert_eq!(predicted.transition, Transitions::SHIFT);
        assert_eq!(
            gold_list.transition,
            system.transitions().right_arc(OBJ_REL)
        );

        // Both histories share the agreed prefix.
        match (&predicted.previous, &gold_list.previous) {
            (&Some(ref p), &Some(ref g)) => assert!(Rc::ptr_eq(p, g)),
            other => panic!("histories do not share a prefix: {:?}", other),
        }
        assert_eq!(predicted.previous.as_ref().unwrap().transition, Transitions::SHIFT);
    }

    #[test]
    fn early_update_reports_agreement() {
        let gold = two_token_gold();
        let system = system_for(&gold);
        let extractor = extractor();
        let mut model = zero_model(&system);

        // Boost the gold right-arc for the configuration in which it
        // applies, so the classifier follows the oracle throughout.
        let state = Rc::new(ParserState::new(&gold.sentence));
        let state =
            ParserState::advance(&state, &ArcEagerMorphTransition::Shift, Transitions::SHIFT);
        let ra = ArcEagerMorphTransition::RightArc(OBJ_REL);
        let ra_number = system.number(&ra);
        let state = ParserState::advance(&state, &ra, ra_number);
        let features = extractor.features(&state);
        model.add(&FeaturesList::extend(None, features, ra_number));

        let decoder = Deterministic::new(&system, &extractor);
        let outcome = decoder.parse_oracle_early_update(&gold, &model).unwrap();

        assert_eq!(outcome.divergence, None);
        assert!(outcome.gold_features.is_none());
        assert_eq!(outcome.steps, 4);
        assert!(outcome.state.is_terminal());
        assert_eq!(outcome.state.dependencies(), gold.dependencies);
    }

    #[test]
    fn dead_end_lattices_exhaust_the_transition_set() {
        // A malformed lattice with an unreachable sink.
        let mut sentence = LatticeSentence::new(3);
        sentence.add_edge(0, 1, 0, vec![Morpheme::new(2, 1, 2)]);

        let gold = two_token_gold();
        let system = system_for(&gold);
        let extractor = extractor();
        let model = zero_model(&system);

        let decoder = Deterministic::new(&system, &extractor);
        let err = decoder.parse(&sentence, &model).unwrap_err();
        match err.downcast_ref::<ParserError>() {
            Some(&ParserError::ExhaustedTransitions) => {}
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
