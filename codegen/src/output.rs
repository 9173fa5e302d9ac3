//! Writing rendered entities to disk.
//!
//! Derived entities are meant to be edited and are only written when their
//! file does not exist yet. Base entities are always regenerated.

use std::{
    collections::HashSet,
    fs,
    path::{Path, PathBuf},
};
use tracing::{debug, info, warn};
use wsdlc_interpreter::{model::Entry, InterpretationContext};

use super::{error::Error, Emitter, Entity};

const EXTENSION: &str = "rs";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputDirs {
    /// Directory of derived entities and the root class.
    pub output: PathBuf,
    /// Directory of base entities, emptied before every run.
    pub bases: PathBuf,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Report {
    pub written: Vec<PathBuf>,
    /// Existing derived files that were left untouched.
    pub preserved: Vec<PathBuf>,
    /// Entities without a usable file of their own.
    pub skipped: Vec<String>,
}

enum Policy {
    Once,
    Always,
}

/// Creates both directories and removes stale files from the bases directory.
pub fn prepare_directories(dirs: &OutputDirs) -> Result<(), Error> {
    for dir in [&dirs.output, &dirs.bases] {
        fs::create_dir_all(dir).map_err(Error::io(dir))?;
    }

    if dirs.bases == dirs.output {
        warn!(dir = %dirs.bases.display(), "bases share the output directory, not cleaning");
        return Ok(());
    }

    for entry in fs::read_dir(&dirs.bases).map_err(Error::io(&dirs.bases))? {
        let path = entry.map_err(Error::io(&dirs.bases))?.path();

        if path.is_file() {
            fs::remove_file(&path).map_err(Error::io(&path))?;
            debug!(path = %path.display(), "removed stale base file");
        }
    }

    Ok(())
}

/// Writes every entity of `context` along with its root class.
pub fn write<E: Emitter + ?Sized>(
    context: &InterpretationContext,
    emitter: &E,
    dirs: &OutputDirs,
) -> Result<Report, Error> {
    prepare_directories(dirs)?;

    let mut writer = Writer {
        emitter,
        report: Report::default(),
        claimed: HashSet::new(),
    };

    let root_class = context.options.root_class.as_str();
    writer.write(&dirs.output, root_class, Entity::RootClass(root_class), Policy::Once)?;

    for (_, entry) in context.classes.iter() {
        match entry {
            Entry::Derived(class) => {
                writer.write(&dirs.output, &class.file_name, Entity::DerivedClass(class), Policy::Once)?
            }
            Entry::Base(class) => {
                writer.write(&dirs.bases, &class.file_name, Entity::BaseClass(class), Policy::Always)?
            }
        }
    }

    for (_, entry) in context.services.iter() {
        match entry {
            Entry::Derived(service) => writer.write(
                &dirs.output,
                &service.file_name,
                Entity::DerivedService(service),
                Policy::Once,
            )?,
            Entry::Base(service) => writer.write(
                &dirs.bases,
                &service.file_name,
                Entity::BaseService(service),
                Policy::Always,
            )?,
        }
    }

    info!(
        written = writer.report.written.len(),
        preserved = writer.report.preserved.len(),
        skipped = writer.report.skipped.len(),
        "wrote generated files"
    );

    Ok(writer.report)
}

struct Writer<'e, E: ?Sized> {
    emitter: &'e E,
    report: Report,
    /// Paths already written or preserved by this run.
    claimed: HashSet<PathBuf>,
}

impl<E: Emitter + ?Sized> Writer<'_, E> {
    fn write(&mut self, dir: &Path, file_name: &str, entity: Entity<'_>, policy: Policy) -> Result<(), Error> {
        if file_name.is_empty() {
            warn!(entity = entity.name(), "no file name left after normalization, skipping");
            self.report.skipped.push(entity.name().to_owned());
            return Ok(());
        }

        let path = dir.join(file_name).with_extension(EXTENSION);

        if self.claimed.contains(&path) {
            warn!(path = %path.display(), entity = entity.name(), "file already claimed by another entity, skipping");
            self.report.skipped.push(entity.name().to_owned());
            return Ok(());
        }
        self.claimed.insert(path.clone());

        if let Policy::Once = policy {
            if path.exists() {
                debug!(path = %path.display(), "keeping existing file");
                self.report.preserved.push(path);
                return Ok(());
            }
        }

        let content = self.emitter.render(entity)?;
        fs::write(&path, content).map_err(Error::io(&path))?;

        debug!(path = %path.display(), "wrote file");
        self.report.written.push(path);
        Ok(())
    }
}
