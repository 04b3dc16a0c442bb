// ABOUTME: Structured command lines for local and remote execution.
// ABOUTME: Programs carry an explicit argument vector; shell strings are an explicit opt-in.

use std::fmt;

/// A command to execute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandLine {
    /// A program and its arguments. Never passed through a shell locally;
    /// each argument is quoted when rendered for a remote shell.
    Program { program: String, args: Vec<String> },
    /// A string handed to the shell as-is. Pipes and redirection work, so
    /// never build one from untrusted input.
    Shell(String),
}

impl CommandLine {
    pub fn program(program: impl Into<String>) -> Self {
        CommandLine::Program {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn shell(script: impl Into<String>) -> Self {
        CommandLine::Shell(script.into())
    }

    /// Append one argument. No-op on shell commands.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        if let CommandLine::Program { args, .. } = &mut self {
            args.push(arg.into());
        }
        self
    }

    pub fn args<I, S>(mut self, new_args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if let CommandLine::Program { args, .. } = &mut self {
            args.extend(new_args.into_iter().map(Into::into));
        }
        self
    }

    /// Build from a CLI-style word list: the first word is the program.
    pub fn from_words(words: &[String]) -> Option<Self> {
        let (program, args) = words.split_first()?;
        Some(CommandLine::Program {
            program: program.clone(),
            args: args.to_vec(),
        })
    }

    /// Name of the executable this command starts, for diagnostics.
    pub fn executable(&self) -> &str {
        match self {
            CommandLine::Program { program, .. } => program,
            CommandLine::Shell(script) => script
                .split_whitespace()
                .find(|word| !is_assignment(word))
                .unwrap_or(""),
        }
    }

    /// Render for a POSIX shell on the remote side.
    pub fn to_remote_string(&self) -> String {
        match self {
            CommandLine::Program { program, args } => std::iter::once(program)
                .chain(args)
                .map(|word| quote_shell_argument(word))
                .collect::<Vec<_>>()
                .join(" "),
            CommandLine::Shell(script) => script.clone(),
        }
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_remote_string())
    }
}

/// `NAME=value` prefix that sets a variable for the command after it.
fn is_assignment(word: &str) -> bool {
    match word.split_once('=') {
        Some((name, _)) => {
            !name.is_empty()
                && !name.starts_with(|c: char| c.is_ascii_digit())
                && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        None => false,
    }
}

fn quote_shell_argument(arg: &str) -> String {
    if arg.is_empty() {
        return "''".to_string();
    }

    if arg
        .chars()
        .all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '_' | '-' | '.' | '/' | ':' | '@' | '=' | ','))
    {
        return arg.to_string();
    }

    format!("'{}'", arg.replace('\'', "'\"'\"'"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_arguments_are_not_quoted() {
        let cmd = CommandLine::program("ls").args(["-l", "/var/log"]);
        assert_eq!(cmd.to_remote_string(), "ls -l /var/log");
    }

    #[test]
    fn metacharacters_are_quoted() {
        let cmd = CommandLine::program("cat").arg("/tmp/a b; rm -rf /");
        assert_eq!(cmd.to_remote_string(), "cat '/tmp/a b; rm -rf /'");
    }

    #[test]
    fn single_quotes_are_escaped() {
        let cmd = CommandLine::program("echo").arg("it's");
        assert_eq!(cmd.to_remote_string(), r#"echo 'it'"'"'s'"#);
    }

    #[test]
    fn empty_argument_is_preserved() {
        let cmd = CommandLine::program("printf").arg("");
        assert_eq!(cmd.to_remote_string(), "printf ''");
    }

    #[test]
    fn shell_is_passed_through() {
        let cmd = CommandLine::shell("top -bn1 | head -n 10");
        assert_eq!(cmd.to_remote_string(), "top -bn1 | head -n 10");
        assert_eq!(cmd.executable(), "top");
    }

    #[test]
    fn arg_is_ignored_for_shell() {
        let cmd = CommandLine::shell("uptime").arg("-p");
        assert_eq!(cmd, CommandLine::shell("uptime"));
    }

    #[test]
    fn from_words_splits_program() {
        let words = vec!["kubectl".to_string(), "get".to_string(), "pods".to_string()];
        let cmd = CommandLine::from_words(&words).unwrap();
        assert_eq!(cmd.executable(), "kubectl");
        assert_eq!(cmd.to_remote_string(), "kubectl get pods");
        assert!(CommandLine::from_words(&[]).is_none());
    }

    #[test]
    fn executable_skips_variable_assignments() {
        let cmd = CommandLine::shell("LANG=C KUBECONFIG=/etc/k.conf kubectl get pods");
        assert_eq!(cmd.executable(), "kubectl");
        assert_eq!(CommandLine::shell("grep a=b file").executable(), "grep");
        assert_eq!(CommandLine::shell("1X=2 ls").executable(), "1X=2");
    }
}
