use std::path::PathBuf;

use structopt::StructOpt;
use thiserror::Error;
use tracing::{error, info, info_span};

use wsdlc_codegen::{self as codegen, Emitter, RustEmitter};
use wsdlc_interpreter::{self as interpreter, WsdlTransform};
use wsdlc_wsdl::{self as wsdl, UrlLoader};

mod config;
mod logging;

use config::{Config, Webservice};

#[derive(Debug, Error)]
enum Error {
    #[error("I/O error")]
    Io(#[from] std::io::Error),

    #[error("Invalid log level")]
    LogLevel(#[from] tracing_subscriber::filter::ParseError),

    #[error("Unable to install logger")]
    Logger(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("Error loading configuration")]
    Config(#[from] config::Error),

    #[error("Invalid WSDL location")]
    Location(#[from] wsdl::error::Error),

    #[error("Error interpreting WSDL")]
    Interpret(#[from] interpreter::Error),

    #[error("Error generating sources")]
    Codegen(#[from] codegen::Error),

    #[error("{0} webservice(s) failed")]
    Failed(usize),
}

#[derive(StructOpt)]
#[structopt(name = "wsdlc", about = "Generates Rust sources from WSDL documents")]
struct Args {
    /// Configuration file listing the webservices of each environment
    #[structopt(short, long, parse(from_os_str), default_value = "wsdlc.toml")]
    config: PathBuf,

    /// Environment whose webservices are generated
    #[structopt(short, long, default_value = "default")]
    env: String,

    /// Log filter, overridden by RUST_LOG
    #[structopt(long, default_value = "info")]
    log_level: String,

    #[structopt(subcommand)]
    command: Option<Command>,
}

#[derive(StructOpt)]
enum Command {
    /// Generates the sources of a single WSDL document
    Generate(Webservice),
}

fn generate<E: Emitter>(name: &str, webservice: &Webservice, emitter: E) -> Result<(), Error> {
    let _span = info_span!("webservice", name).entered();

    let url = wsdl::resolve_url(&webservice.wsdl)?;
    let context = interpreter::interpret(url, webservice.options(), UrlLoader, &WsdlTransform)?;
    let report = codegen::write(&context, &emitter, &webservice.output_dirs())?;

    info!(
        classes = context.classes.len(),
        services = context.services.len(),
        written = report.written.len(),
        preserved = report.preserved.len(),
        skipped = report.skipped.len(),
        "generated webservice"
    );

    Ok(())
}

#[paw::main]
fn main(args: Args) -> Result<(), Error> {
    logging::init(&args.log_level)?;

    if let Some(Command::Generate(webservice)) = args.command {
        return generate("generate", &webservice, RustEmitter::new());
    }

    let config = Config::from_file(&args.config)?;
    let environment = config.environment(&args.env)?;

    let mut failed = 0;
    for (name, webservice) in &environment.webservices {
        // Each run gets its own emitter, rendered content is cached by name.
        if let Err(err) = generate(name, webservice, RustEmitter::new()) {
            error!(webservice = %name, "{}", chain(&err));
            failed += 1;
        }
    }

    match failed {
        0 => Ok(()),
        failed => Err(Error::Failed(failed)),
    }
}

fn chain(error: &dyn std::error::Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();

    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }

    message
}
