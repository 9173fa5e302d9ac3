//! Environment-keyed list of webservices to generate.
//!
//! ```toml
//! [environments.default.webservices.calculator]
//! wsdl = "calculator.wsdl"
//! output = "generated"
//! output_bases = "generated/base"
//! namespace = "Calc"
//! namespace_bases = "CalcBase"
//! ```

use indexmap::IndexMap;
use serde::Deserialize;
use std::{
    fs, io,
    path::{Path, PathBuf},
};
use structopt::StructOpt;
use thiserror::Error;
use url::Url;
use wsdlc_codegen::OutputDirs;
use wsdlc_interpreter::Options;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Unable to read {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Invalid configuration")]
    Parse(#[from] toml::de::Error),

    #[error("Environment {0:?} is not configured")]
    UnknownEnvironment(String),
}

#[derive(Debug, Default, Deserialize, PartialEq, Eq)]
pub struct Config {
    #[serde(default)]
    pub environments: IndexMap<String, Environment>,
}

/// Webservices in the order the file lists them.
#[derive(Debug, Default, Deserialize, PartialEq, Eq)]
pub struct Environment {
    #[serde(default)]
    pub webservices: IndexMap<String, Webservice>,
}

/// One WSDL document and where its sources go.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq, StructOpt)]
pub struct Webservice {
    /// URL or path of the WSDL document
    pub wsdl: String,

    /// Directory of derived classes, never overwritten
    #[structopt(long, parse(from_os_str))]
    pub output: PathBuf,

    /// Directory of base classes, regenerated on every run
    #[structopt(long, parse(from_os_str))]
    pub output_bases: PathBuf,

    /// Prefix of derived class names
    #[structopt(long)]
    pub namespace: String,

    /// Prefix of base class names
    #[structopt(long)]
    pub namespace_bases: String,

    /// Parent of base classes without an explicit parent
    #[structopt(long)]
    pub parent_class: Option<String>,

    /// Transport class of generated services
    #[structopt(long)]
    pub parent_soap_class: Option<String>,
}

impl Config {
    /// Reads a configuration file. Relative paths in it are taken relative to
    /// the file's directory.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|source| Error::Read {
            path: path.to_owned(),
            source,
        })?;

        let mut config = Self::parse(&source)?;

        if let Some(dir) = path.parent() {
            for environment in config.environments.values_mut() {
                for webservice in environment.webservices.values_mut() {
                    webservice.rebase(dir);
                }
            }
        }

        Ok(config)
    }

    pub fn parse(source: &str) -> Result<Self, Error> {
        Ok(toml::from_str(source)?)
    }

    pub fn environment(&self, name: &str) -> Result<&Environment, Error> {
        self.environments
            .get(name)
            .ok_or_else(|| Error::UnknownEnvironment(name.to_owned()))
    }
}

impl Webservice {
    pub fn options(&self) -> Options {
        let mut options = Options::new(&self.namespace, &self.namespace_bases);

        if let Some(parent_class) = &self.parent_class {
            options = options.with_root_class(parent_class);
        }

        if let Some(parent_soap_class) = &self.parent_soap_class {
            options = options.with_transport_class(parent_soap_class);
        }

        options
    }

    pub fn output_dirs(&self) -> OutputDirs {
        OutputDirs {
            output: self.output.clone(),
            bases: self.output_bases.clone(),
        }
    }

    fn rebase(&mut self, dir: &Path) {
        if Url::parse(&self.wsdl).is_err() && Path::new(&self.wsdl).is_relative() {
            self.wsdl = dir.join(&self.wsdl).to_string_lossy().into_owned();
        }

        self.output = dir.join(&self.output);
        self.output_bases = dir.join(&self.output_bases);
    }
}
