// src/exec/commands.rs

//! Command lines understood by the external upload tool.
//!
//! Argument order matters to the tool, so every command line is built here
//! and nowhere else.

use std::path::{Path, PathBuf};

/// Host platform, resolved once at startup and passed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Windows,
    Unix,
}

impl Platform {
    pub fn current() -> Self {
        if cfg!(windows) {
            Platform::Windows
        } else {
            Platform::Unix
        }
    }

    /// Name of the Python interpreter executable on this platform.
    pub fn python_executable(self) -> &'static str {
        match self {
            Platform::Windows => "python.exe",
            Platform::Unix => "python3",
        }
    }
}

/// Everything needed to build the tool's command lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCommands {
    python: String,
    script: PathBuf,
    adegen: PathBuf,
    password_file: PathBuf,
    identity: String,
}

impl ToolCommands {
    pub fn new(
        python: impl Into<String>,
        script: impl Into<PathBuf>,
        adegen: impl Into<PathBuf>,
        password_file: impl Into<PathBuf>,
        identity: impl Into<String>,
    ) -> Self {
        Self {
            python: python.into(),
            script: script.into(),
            adegen: adegen.into(),
            password_file: password_file.into(),
            identity: identity.into(),
        }
    }

    pub fn python(&self) -> &str {
        &self.python
    }

    pub fn identity(&self) -> &str {
        &self.identity
    }

    fn script_command(&self, args: &[&str]) -> Vec<String> {
        let mut argv = vec![self.python.clone(), path_arg(&self.script)];
        argv.extend(args.iter().map(|a| a.to_string()));
        argv
    }

    /// `<python> --version`
    pub fn version(&self) -> Vec<String> {
        vec![self.python.clone(), "--version".to_string()]
    }

    /// `<python> <script> login -u <identity> -pf <password-file>`
    pub fn login(&self) -> Vec<String> {
        self.script_command(&[
            "login",
            "-u",
            &self.identity,
            "-pf",
            &path_arg(&self.password_file),
        ])
    }

    /// `<python> <script> logout`
    pub fn logout(&self) -> Vec<String> {
        self.script_command(&["logout"])
    }

    /// `<python> <script> userInfo`
    pub fn user_info(&self) -> Vec<String> {
        self.script_command(&["userInfo"])
    }

    /// `<python> <script> pipeline --list`
    pub fn pipeline_list(&self) -> Vec<String> {
        self.script_command(&["pipeline", "--list"])
    }

    /// `<python> <adegen> <run-dir> -o <ade-json> -p <pipeline> -c`
    ///
    /// `-c` pre-confirms the generator's interactive question.
    pub fn prepare_run(&self, run_dir: &Path, ade_json: &Path, pipeline: u32) -> Vec<String> {
        vec![
            self.python.clone(),
            path_arg(&self.adegen),
            path_arg(run_dir),
            "-o".to_string(),
            path_arg(ade_json),
            "-p".to_string(),
            pipeline.to_string(),
            "-c".to_string(),
        ]
    }

    /// `<python> <script> new -j <ade-json>`
    pub fn create_run(&self, ade_json: &Path) -> Vec<String> {
        self.script_command(&["new", "-j", &path_arg(ade_json)])
    }
}

fn path_arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}
