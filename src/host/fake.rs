//! In-memory host for tests
//!
//! Interprets the argv vectors the steps emit (useradd, mkdir, tee, ln, ...)
//! against an in-memory model of accounts, files and links, so whole
//! pipeline runs can be checked without touching the real system.

use provision::{CommandLine, CommandOutput, Error, Filesystem, ProcessRunner, Result};
use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

#[derive(Default)]
struct State {
    users: BTreeSet<String>,
    /// Entries answered by `getent passwd`: user -> home
    passwd: BTreeMap<String, PathBuf>,
    files: BTreeMap<PathBuf, String>,
    dirs: BTreeSet<PathBuf>,
    symlinks: BTreeMap<PathBuf, PathBuf>,
    /// Commands as received, privilege wrapper included
    calls: Vec<CommandLine>,
    fail_program: Option<String>,
    php_version: String,
}

pub struct FakeHost {
    state: RefCell<State>,
}

impl FakeHost {
    pub fn new() -> Self {
        Self {
            state: RefCell::new(State {
                php_version: "8.2".to_string(),
                ..State::default()
            }),
        }
    }

    pub fn add_user(&self, name: &str) {
        self.state.borrow_mut().users.insert(name.to_string());
    }

    pub fn add_passwd(&self, user: &str, home: impl AsRef<Path>) {
        self.state
            .borrow_mut()
            .passwd
            .insert(user.to_string(), home.as_ref().to_path_buf());
    }

    pub fn add_file(&self, path: impl AsRef<Path>, content: &str) {
        self.state
            .borrow_mut()
            .files
            .insert(path.as_ref().to_path_buf(), content.to_string());
    }

    pub fn add_symlink(&self, link: impl AsRef<Path>, target: impl AsRef<Path>) {
        self.state
            .borrow_mut()
            .symlinks
            .insert(link.as_ref().to_path_buf(), target.as_ref().to_path_buf());
    }

    pub fn set_php_version(&self, version: &str) {
        self.state.borrow_mut().php_version = version.to_string();
    }

    /// Make every command running `program` exit with status 1
    pub fn fail_program(&self, program: &str) {
        self.state.borrow_mut().fail_program = Some(program.to_string());
    }

    pub fn has_user(&self, name: &str) -> bool {
        self.state.borrow().users.contains(name)
    }

    pub fn file(&self, path: impl AsRef<Path>) -> Option<String> {
        self.state.borrow().files.get(path.as_ref()).cloned()
    }

    pub fn has_dir(&self, path: impl AsRef<Path>) -> bool {
        self.state.borrow().dirs.contains(path.as_ref())
    }

    pub fn symlink_target(&self, link: impl AsRef<Path>) -> Option<PathBuf> {
        self.state.borrow().symlinks.get(link.as_ref()).cloned()
    }

    /// All commands received, as built
    pub fn commands(&self) -> Vec<CommandLine> {
        self.state.borrow().calls.clone()
    }

    /// All commands received, rendered as strings
    pub fn calls(&self) -> Vec<String> {
        self.state
            .borrow()
            .calls
            .iter()
            .map(ToString::to_string)
            .collect()
    }

    /// Number of commands that ran `program` (ignoring the privilege wrapper)
    pub fn count(&self, program: &str) -> usize {
        self.state
            .borrow()
            .calls
            .iter()
            .filter(|c| unwrap_privilege(c).0 == program)
            .count()
    }

    /// Number of commands that could have changed the host
    pub fn mutations(&self) -> usize {
        const READ_ONLY: &[&str] = &["id", "getent", "php"];
        self.state
            .borrow()
            .calls
            .iter()
            .filter(|c| !READ_ONLY.contains(&unwrap_privilege(c).0))
            .count()
    }

    fn interpret(&self, program: &str, args: &[String], stdin: Option<&[u8]>) -> CommandOutput {
        let mut state = self.state.borrow_mut();

        if state.fail_program.as_deref() == Some(program) {
            return CommandOutput::failed(1, format!("{program}: operation not permitted\n"));
        }

        let last = args.last().map(String::as_str).unwrap_or_default();
        match program {
            "id" => {
                if state.users.contains(last) {
                    CommandOutput::ok("1001\n")
                } else {
                    CommandOutput::failed(1, format!("id: '{last}': no such user\n"))
                }
            }
            "useradd" => {
                if state.users.contains(last) {
                    return CommandOutput::failed(
                        9,
                        format!("useradd: user '{last}' already exists\n"),
                    );
                }
                state.users.insert(last.to_string());
                if let Some(pos) = args.iter().position(|a| a == "--home-dir") {
                    if let Some(home) = args.get(pos + 1) {
                        add_dir_all(&mut state.dirs, Path::new(home));
                    }
                }
                CommandOutput::ok("")
            }
            "getent" => match state.passwd.get(last) {
                Some(home) => CommandOutput::ok(format!(
                    "{last}:x:1000:1000:{last}:{}:/bin/bash\n",
                    home.display()
                )),
                None => CommandOutput::failed(2, ""),
            },
            "php" => CommandOutput::ok(state.php_version.clone()),
            "mkdir" => {
                add_dir_all(&mut state.dirs, Path::new(last));
                CommandOutput::ok("")
            }
            "tee" => {
                let content = String::from_utf8_lossy(stdin.unwrap_or_default()).to_string();
                state.files.insert(PathBuf::from(last), content.clone());
                CommandOutput::ok(content)
            }
            "mv" => {
                let from = PathBuf::from(&args[args.len() - 2]);
                match state.files.remove(&from) {
                    Some(content) => {
                        state.files.insert(PathBuf::from(last), content);
                        CommandOutput::ok("")
                    }
                    None => {
                        CommandOutput::failed(1, format!("mv: cannot stat '{}'\n", from.display()))
                    }
                }
            }
            "cp" => {
                let from = PathBuf::from(&args[args.len() - 2]);
                match state.files.get(&from).cloned() {
                    Some(content) => {
                        state.files.insert(PathBuf::from(last), content);
                        CommandOutput::ok("")
                    }
                    None => {
                        CommandOutput::failed(1, format!("cp: cannot stat '{}'\n", from.display()))
                    }
                }
            }
            "ln" => {
                let link = PathBuf::from(last);
                if state.symlinks.contains_key(&link) || state.files.contains_key(&link) {
                    return CommandOutput::failed(
                        1,
                        format!("ln: failed to create symbolic link '{last}': File exists\n"),
                    );
                }
                let target = PathBuf::from(&args[args.len() - 2]);
                state.symlinks.insert(link, target);
                CommandOutput::ok("")
            }
            _ => CommandOutput::ok(""),
        }
    }
}

impl Default for FakeHost {
    fn default() -> Self {
        Self::new()
    }
}

fn add_dir_all(dirs: &mut BTreeSet<PathBuf>, path: &Path) {
    for ancestor in path.ancestors() {
        if ancestor.as_os_str().is_empty() {
            break;
        }
        dirs.insert(ancestor.to_path_buf());
    }
}

/// Program and arguments with a leading `sudo`/`doas` removed
fn unwrap_privilege(cmd: &CommandLine) -> (&str, &[String]) {
    if matches!(cmd.program.as_str(), "sudo" | "doas") && !cmd.args.is_empty() {
        (cmd.args[0].as_str(), &cmd.args[1..])
    } else {
        (cmd.program.as_str(), &cmd.args)
    }
}

impl ProcessRunner for FakeHost {
    fn run(&self, cmd: &CommandLine) -> Result<CommandOutput> {
        self.state.borrow_mut().calls.push(cmd.clone());
        let (program, args) = unwrap_privilege(cmd);
        let mut output = self.interpret(program, args, cmd.stdin.as_deref());
        if cmd.discard_stdout {
            output.stdout.clear();
        }
        Ok(output)
    }
}

impl Filesystem for FakeHost {
    fn exists(&self, path: &Path) -> bool {
        let state = self.state.borrow();
        if let Some(target) = state.symlinks.get(path) {
            return state.files.contains_key(target) || state.dirs.contains(target);
        }
        state.files.contains_key(path) || state.dirs.contains(path)
    }

    fn is_symlink(&self, path: &Path) -> bool {
        self.state.borrow().symlinks.contains_key(path)
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        self.file(path).ok_or_else(|| Error::Io {
            path: path.to_path_buf(),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        })
    }
}
