use std::{
    ffi::OsStr,
    path::{Path, PathBuf},
    process::Command,
};

use crate::args::{stringify, tokenize, tokenize_all};

/// An external editor and the arguments it is launched with.
///
/// The file to edit always goes last, after the user's own arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorCommand {
    program: PathBuf,
    args: Vec<String>,
}

impl EditorCommand {
    /// Build from the raw argument string a user typed into the host settings.
    pub fn new(program: impl Into<PathBuf>, cmd_args: &str) -> Self {
        Self {
            program: program.into(),
            args: tokenize(cmd_args),
        }
    }

    /// Build from arguments that were stored already split.
    pub fn from_args<I, S>(program: impl Into<PathBuf>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            program: program.into(),
            args: tokenize_all(args),
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// The arguments as one string, suitable for saving back into settings.
    pub fn args_string(&self) -> String {
        stringify(&self.args)
    }

    /// A ready-to-spawn command opening `file`.
    pub fn command_for(&self, file: impl AsRef<OsStr>) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args).arg(file);
        cmd
    }
}
