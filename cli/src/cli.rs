use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum, ValueHint};
use edm_quality::shapes::Inference;
use std::path::PathBuf;

#[derive(Parser)]
#[command(about, version, name = "edm-quality")]
/// Merges harvested Europeana records and assesses their metadata quality
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Merge the harvested record fragments into one Turtle graph
    Merge {
        /// Directory containing one RDF document per record
        #[arg(short, long, value_hint = ValueHint::DirPath)]
        fragments: PathBuf,
        /// File to write the merged graph to
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        output: PathBuf,
        /// Skip fragments with invalid IRIs instead of repairing them
        #[arg(long)]
        strict: bool,
    },
    /// Score the completeness of every description record in a merged graph
    Score {
        /// The merged Turtle graph
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        graph: PathBuf,
        #[command(flatten)]
        schema: SchemaArgs,
        /// File to write the CSV report to
        ///
        /// If no file is given, stdout is written.
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        output: Option<PathBuf>,
    },
    /// Compute the SPARQL quality metrics of a merged graph
    Metrics {
        /// The merged Turtle graph
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        graph: PathBuf,
        /// File to write the CSV report to
        ///
        /// If no file is given, stdout is written.
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        output: Option<PathBuf>,
    },
    /// Validate a merged graph against SHACL shapes with an external validator
    Validate {
        /// The merged Turtle graph
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        graph: PathBuf,
        #[command(flatten)]
        shapes: ShapeArgs,
    },
    /// Merge, score, compute metrics and optionally validate in one run
    Assess {
        /// Directory containing one RDF document per record
        #[arg(short, long, value_hint = ValueHint::DirPath)]
        fragments: PathBuf,
        /// File to write the merged graph to
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        merged: PathBuf,
        /// Directory to write the CSV reports to
        #[arg(short, long, value_hint = ValueHint::DirPath)]
        reports: PathBuf,
        /// SHACL shapes to validate the merged graph against
        ///
        /// Shape validation is skipped if no shapes are given.
        #[arg(long, value_hint = ValueHint::FilePath)]
        shapes: Option<PathBuf>,
        /// The external validator program
        #[arg(long, default_value = "pyshacl", value_hint = ValueHint::CommandName)]
        validator: PathBuf,
        /// Inference applied by the validator
        #[arg(long, value_enum, default_value_t = InferenceArg::Rdfs)]
        inference: InferenceArg,
        #[command(flatten)]
        schema: SchemaArgs,
    },
}

#[derive(ClapArgs)]
pub struct SchemaArgs {
    /// JSON document replacing the built-in EDM field schema
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub schema: Option<PathBuf>,
}

#[derive(ClapArgs)]
pub struct ShapeArgs {
    /// The SHACL shapes graph in Turtle
    #[arg(short, long, value_hint = ValueHint::FilePath)]
    pub shapes: PathBuf,
    /// The external validator program
    #[arg(long, default_value = "pyshacl", value_hint = ValueHint::CommandName)]
    pub validator: PathBuf,
    /// Inference applied by the validator
    #[arg(long, value_enum, default_value_t = InferenceArg::Rdfs)]
    pub inference: InferenceArg,
    /// Fail on informational results
    #[arg(long)]
    pub deny_infos: bool,
    /// Fail on warnings
    #[arg(long)]
    pub deny_warnings: bool,
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, ValueEnum)]
pub enum InferenceArg {
    /// Validates the data as it is.
    None,
    /// Adds class and property subsumption.
    Rdfs,
    /// Adds OWL 2 RL entailments.
    Owlrl,
}

impl From<InferenceArg> for Inference {
    fn from(value: InferenceArg) -> Self {
        match value {
            InferenceArg::None => Self::None,
            InferenceArg::Rdfs => Self::Rdfs,
            InferenceArg::Owlrl => Self::Owlrl,
        }
    }
}
