extern crate conllx;
extern crate getopts;
extern crate mdpar;
#[macro_use]
extern crate mdpar_utils;

use std::env::args;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::process;

use conllx::{HeadProjectivizer, Projectivize, ReadSentence};
use getopts::Options;
use mdpar::features::{AddressedExtractor, FeatureExtractor, Layer, LayerLookups};
use mdpar::models::AveragedMatrix;
use mdpar::parse::Deterministic;
use mdpar::system::{GoldGraph, TransitionSystem};
use mdpar::systems::ArcEagerMorphSystem;
use mdpar::train::PerceptronTrainer;
use mdpar_utils::{gold_from_conll, CborWrite, Config, OrExit, SystemDescriptor, TomlRead};

fn print_usage(program: &str, opts: Options) {
    let brief = format!("Usage: {} [options] CONFIG TRAIN_DATA", program);
    print!("{}", opts.usage(&brief));
}

fn main() {
    let args: Vec<String> = args().collect();
    let program = args[0].clone();

    let mut opts = Options::new();
    opts.optflag("h", "help", "print this help menu");
    let matches = opts.parse(&args[1..]).or_exit();

    if matches.opt_present("h") {
        print_usage(&program, opts);
        return;
    }

    if matches.free.len() != 2 {
        print_usage(&program, opts);
        return;
    }

    let config_file = File::open(&matches.free[0]).or_exit();
    let mut config = Config::from_toml_read(config_file).or_exit();
    config.relativize_paths(&matches.free[0]).or_exit();

    if config.parser.system != "arceagermorph" {
        stderr!("Unsupported transition system: {}", config.parser.system);
        process::exit(1);
    }

    let input_file = File::open(&matches.free[1]).or_exit();
    let reader = conllx::Reader::new(BufReader::new(input_file));

    eprintln!("Reading training data...");
    let (instances, lookups) = read_instances(&config, reader).or_exit();
    eprintln!("Read {} training instances", instances.len());

    let mut system = ArcEagerMorphSystem::new(lookups.layer_lookup(Layer::DepRel).len());
    for instance in &instances {
        if let Some(choice) = instance.sentence.max_choice() {
            system.transitions_mut().observe_choice(choice);
        }
    }

    let extractor = AddressedExtractor::parse(&config.features.templates).or_exit();

    let mut model = AveragedMatrix::new(
        extractor.feature_count(),
        system.transitions().len(),
        extractor.descriptors(),
    );
    model.set_concurrent(config.parser.concurrent_updates);

    let mut decoder = Deterministic::new(&system, &extractor);
    decoder.no_recover = config.parser.no_recover;
    decoder.show_considerations = config.parser.show_considerations;
    decoder.return_model_value = config.parser.return_model_value;
    decoder.return_sequence = config.parser.return_sequence;

    let mut trainer = PerceptronTrainer::new(decoder, config.parser.iterations);
    eprintln!("Training {} iteration(s)...", config.parser.iterations);
    trainer.train(&instances, &mut model).or_exit();
    if trainer.failed_training() > 0 {
        eprintln!("Failed training instances: {}", trainer.failed_training());
    }

    let mut parameters_file = File::create(&config.model.parameters).or_exit();
    model.serialize().to_cbor_write(&mut parameters_file).or_exit();

    let descriptor = SystemDescriptor {
        transitions: system.transitions().clone(),
        lookups: lookups,
        templates: config.features.templates.clone(),
    };
    let mut transitions_file = File::create(&config.model.transitions).or_exit();
    descriptor.to_cbor_write(&mut transitions_file).or_exit();
}

fn read_instances<R>(
    config: &Config,
    reader: conllx::Reader<R>,
) -> mdpar_utils::Result<(Vec<GoldGraph>, LayerLookups)>
where
    R: BufRead,
{
    let projectivizer = HeadProjectivizer::new();
    let mut lookups = LayerLookups::new();
    let mut instances = Vec::new();

    for sentence in reader.sentences() {
        let sentence = sentence?;
        let sentence = if config.parser.pproj {
            projectivizer.projectivize(&sentence)?
        } else {
            sentence
        };

        instances.push(gold_from_conll(&sentence, &mut lookups)?);
    }

    Ok((instances, lookups))
}
