//! Step and target plan definitions

use crate::cache::StepKey;
use crate::install::TemplateInstaller;
use std::fmt;
use std::path::PathBuf;

/// One idempotent unit of provisioning work
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Run an external command inside the target directory
    RunCommand { argv: Vec<String> },
    /// Copy `templates/<target>/<subdir>/<template or destination>` to
    /// `<target>/<subdir>/<destination>`
    InstallFile {
        subdir: PathBuf,
        destination: String,
        template: Option<String>,
    },
    /// Make sure a directory exists inside the target
    EnsureDirectory { path: PathBuf },
}

impl Step {
    pub fn run<I, S>(argv: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::RunCommand {
            argv: argv.into_iter().map(Into::into).collect(),
        }
    }

    pub fn install(subdir: impl Into<PathBuf>, destination: impl Into<String>) -> Self {
        Self::InstallFile {
            subdir: subdir.into(),
            destination: destination.into(),
            template: None,
        }
    }

    /// Install from a template whose file name differs from the destination
    pub fn install_as(
        subdir: impl Into<PathBuf>,
        destination: impl Into<String>,
        template: impl Into<String>,
    ) -> Self {
        Self::InstallFile {
            subdir: subdir.into(),
            destination: destination.into(),
            template: Some(template.into()),
        }
    }

    pub fn directory(path: impl Into<PathBuf>) -> Self {
        Self::EnsureDirectory { path: path.into() }
    }

    /// Cache key for this step
    pub fn key(&self) -> StepKey {
        match self {
            Self::RunCommand { argv } => StepKey::command(argv.as_slice()),
            Self::InstallFile {
                subdir,
                destination,
                ..
            } => StepKey::file(TemplateInstaller::relative_destination(subdir, destination)),
            Self::EnsureDirectory { path } => StepKey::directory(path),
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RunCommand { argv } => write!(f, "run `{}`", argv.join(" ")),
            Self::InstallFile {
                subdir,
                destination,
                ..
            } => write!(
                f,
                "install {}",
                TemplateInstaller::relative_destination(subdir, destination).display()
            ),
            Self::EnsureDirectory { path } => write!(f, "create {}/", path.display()),
        }
    }
}

/// The ordered step list for one target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetPlan {
    /// Target name; also the directory name under the workspace root
    pub name: String,
    /// Subdirectory of the template root holding this target's templates
    pub template_set: String,
    pub steps: Vec<Step>,
}

impl TargetPlan {
    pub fn new(name: impl Into<String>, steps: Vec<Step>) -> Self {
        let name = name.into();
        Self {
            template_set: name.clone(),
            name,
            steps,
        }
    }

    /// Read templates from a set other than the target name
    pub fn with_template_set(mut self, set: impl Into<String>) -> Self {
        self.template_set = set.into();
        self
    }
}
