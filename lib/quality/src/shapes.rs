//! The seam to an external SHACL validation engine.

use crate::QualityError;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, info};

/// The inference applied by the validator before checking the shapes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Inference {
    None,
    /// Class and property subsumption.
    #[default]
    Rdfs,
    Owlrl,
}

impl Inference {
    /// The name the validator expects on its command line.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Rdfs => "rdfs",
            Self::Owlrl => "owlrl",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ShapeValidationOptions {
    pub inference: Inference,
    /// Informational results do not make the data non-conforming.
    pub allow_infos: bool,
    /// Warnings do not make the data non-conforming.
    pub allow_warnings: bool,
}

impl Default for ShapeValidationOptions {
    fn default() -> Self {
        Self {
            inference: Inference::Rdfs,
            allow_infos: true,
            allow_warnings: true,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShapeValidationReport {
    pub conforms: bool,
    /// The validation report as produced by the validator.
    pub report_text: String,
}

/// Validates a Turtle data graph against a Turtle shapes graph.
pub trait ShapeValidator {
    fn validate(
        &self,
        data: &Path,
        shapes: &Path,
        options: &ShapeValidationOptions,
    ) -> Result<ShapeValidationReport, QualityError>;
}

/// Runs a `pyshacl` compatible command line validator.
///
/// Exit code 0 means the data conforms, 1 means it does not. Any other outcome is an error.
#[derive(Clone, Debug)]
pub struct CommandValidator {
    program: PathBuf,
}

impl Default for CommandValidator {
    fn default() -> Self {
        Self::new("pyshacl")
    }
}

impl CommandValidator {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    fn command(&self, data: &Path, shapes: &Path, options: &ShapeValidationOptions) -> Command {
        let mut command = Command::new(&self.program);
        command
            .arg("-s")
            .arg(shapes)
            .arg("-i")
            .arg(options.inference.as_str());
        if options.allow_infos {
            command.arg("--allow-infos");
        }
        if options.allow_warnings {
            command.arg("--allow-warnings");
        }
        command.arg("-f").arg("turtle").arg(data);
        command
    }
}

impl ShapeValidator for CommandValidator {
    fn validate(
        &self,
        data: &Path,
        shapes: &Path,
        options: &ShapeValidationOptions,
    ) -> Result<ShapeValidationReport, QualityError> {
        let mut command = self.command(data, shapes, options);
        debug!("Running {command:?}");
        let output = command.output().map_err(|e| {
            QualityError::ShapeValidation(format!(
                "could not run {}: {e}",
                self.program.display()
            ))
        })?;
        let conforms = match output.status.code() {
            Some(0) => true,
            Some(1) => false,
            _ => {
                return Err(QualityError::ShapeValidation(format!(
                    "{} exited with {}: {}",
                    self.program.display(),
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                )))
            }
        };
        info!("Shape validation finished, conforms: {conforms}");
        Ok(ShapeValidationReport {
            conforms,
            report_text: String::from_utf8_lossy(&output.stdout).into_owned(),
        })
    }
}
