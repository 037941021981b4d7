extern crate conllx;
extern crate getopts;
extern crate mdpar;
#[macro_use]
extern crate mdpar_utils;
extern crate stdinout;

use std::env::args;
use std::fs::File;
use std::process;

use conllx::{ReadSentence, WriteSentence};
use getopts::Options;
use mdpar::features::{AddressedExtractor, FeatureExtractor};
use mdpar::models::{AveragedMatrix, AveragedMatrixSerialized};
use mdpar::parse::Deterministic;
use mdpar::systems::ArcEagerMorphSystem;
use mdpar_utils::{
    lattice_from_conll, set_heads, CborRead, Config, OrExit, SystemDescriptor, TomlRead,
};
use stdinout::{Input, Output};

fn print_usage(program: &str, opts: Options) {
    let brief = format!("Usage: {} [options] CONFIG [INPUT] [OUTPUT]", program);
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

    if matches.free.is_empty() || matches.free.len() > 3 {
        print_usage(&program, opts);
        return;
    }

    let config_file = File::open(&matches.free[0]).or_exit();
    let mut config = Config::from_toml_read(config_file).or_exit();
    config.relativize_paths(&matches.free[0]).or_exit();

    let parameters_file = File::open(&config.model.parameters).or_exit();
    let serialized = AveragedMatrixSerialized::from_cbor_read(parameters_file).or_exit();
    let model = AveragedMatrix::deserialize(serialized).or_exit();

    let transitions_file = File::open(&config.model.transitions).or_exit();
    let descriptor: SystemDescriptor = SystemDescriptor::from_cbor_read(transitions_file).or_exit();

    let system = ArcEagerMorphSystem::from_transitions(descriptor.transitions.clone());
    let extractor = AddressedExtractor::parse(&descriptor.templates).or_exit();

    if model.descriptors() != extractor.descriptors().as_slice() {
        stderr!("Model parameters and feature templates do not match");
        process::exit(1);
    }

    let decoder = Deterministic::new(&system, &extractor);

    let input = Input::from(matches.free.get(1));
    let reader = conllx::Reader::new(input.buf_read().or_exit());

    let output = Output::from(matches.free.get(2));
    let mut writer = conllx::Writer::new(output.write().or_exit());

    for sentence in reader.sentences() {
        let mut sentence = sentence.or_exit();
        let lattice = lattice_from_conll(&sentence, &descriptor.lookups);
        let outcome = decoder.parse(&lattice, &model).or_exit();
        set_heads(&mut sentence, &outcome.dependencies(), &descriptor.lookups).or_exit();
        writer.write_sentence(&sentence).or_exit();
    }
}
