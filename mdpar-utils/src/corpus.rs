use conllx::Sentence;

use mdpar::features::{Layer, LayerLookups};
use mdpar::lattice::{LatticeSentence, Morpheme};
use mdpar::system::{Dependency, DependencySet, GoldGraph};

use Result;

/// Convert a CoNLL-X sentence with gold heads into a training
/// instance. The tokens become the morphemes of an unambiguous
/// lattice; words, tags, and relation labels are interned into the
/// registry.
pub fn gold_from_conll(sentence: &Sentence, lookups: &mut LayerLookups) -> Result<GoldGraph> {
    let mut morphemes = Vec::new();
    let mut dependencies = DependencySet::new();

    for (index, token) in sentence.iter().enumerate() {
        let node = index + 1;
        morphemes.push(intern_token(token.form(), token.pos(), lookups));

        let head = token
            .head()
            .ok_or_else(|| format_err!("token {} has no head", node))?;
        let relation = if head == 0 {
            // Arcs from the virtual root use the root relation.
            0
        } else {
            let relation = token
                .head_rel()
                .ok_or_else(|| format_err!("token {} has no head relation", node))?;
            lookups
                .layer_lookup_mut(Layer::DepRel)
                .add(relation.to_owned())
        };

        dependencies.insert(Dependency {
            head: head,
            relation: relation,
            dependent: node,
        });
    }

    Ok(GoldGraph::new(
        LatticeSentence::unambiguous(morphemes.clone()),
        morphemes,
        dependencies,
    ))
}

fn intern_token(form: &str, pos: Option<&str>, lookups: &mut LayerLookups) -> Morpheme {
    let pos = pos.unwrap_or("_");
    let word_pos = format!("{} {}", form, pos);

    Morpheme::new(
        lookups.layer_lookup_mut(Layer::Word).add(form.to_owned()),
        lookups.layer_lookup_mut(Layer::Pos).add(pos.to_owned()),
        lookups.layer_lookup_mut(Layer::WordPos).add(word_pos),
    )
}

/// Convert a CoNLL-X sentence into a lattice for parsing. Strings that
/// were not seen in training map to the unknown marker.
pub fn lattice_from_conll(sentence: &Sentence, lookups: &LayerLookups) -> LatticeSentence {
    let morphemes = sentence
        .iter()
        .map(|token| {
            let pos = token.pos().unwrap_or("_");
            let word_pos = format!("{} {}", token.form(), pos);

            Morpheme::new(
                lookups.number_or_unknown(Layer::Word, token.form()),
                lookups.number_or_unknown(Layer::Pos, pos),
                lookups.number_or_unknown(Layer::WordPos, &word_pos),
            )
        }).collect();

    LatticeSentence::unambiguous(morphemes)
}

/// Write a dependency set into the head fields of a CoNLL-X sentence.
pub fn set_heads(
    sentence: &mut Sentence,
    dependencies: &DependencySet,
    lookups: &LayerLookups,
) -> Result<()> {
    for dependency in dependencies {
        let relation = lookups
            .layer_lookup(Layer::DepRel)
            .value(dependency.relation)
            .ok_or_else(|| format_err!("unknown relation number: {}", dependency.relation))?
            .clone();

        let token = &mut sentence[dependency.dependent - 1];
        token.set_head(Some(dependency.head));
        token.set_head_rel(Some(relation));
    }

    Ok(())
}
