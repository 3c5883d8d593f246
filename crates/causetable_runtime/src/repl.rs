//! The interactive query REPL.
//!
//! Each line is one command that refines or inspects the current query:
//!
//! ```text
//! ?> given hard=yes
//! ?> do study=lots
//! ?> infer
//! grade: fail=0.1000 good=0.6000 pass=0.3000
//! ...
//! ```

use std::io::{self, Write};

use causetable_engine::{Dag, InferenceConfig, Query};
use causetable_foundation::{Error, Result, Value};

use crate::editor::{LineEditor, ReadResult, RustylineEditor};
use crate::render::{RenderOptions, query_to_dot};

const COMMANDS: [&str; 11] = [
    "given", "do", "infer", "table", "sample", "paths", "dot", "reset", "help", "quit", "exit",
];

const HELP: &str = "\
given k=v ...     add evidence
do k=v ...        add interventions
infer             marginal of every variable
table             full posterior table
sample N          draw N rows from the posterior
paths a b [z ..]  active paths between a and b given z
dot               Graphviz rendering of the current query
reset             drop all evidence and interventions
help              this text
quit              leave";

/// What the REPL should do after a command.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Reply {
    /// Print this text.
    Text(String),
    /// Nothing to print.
    Empty,
    /// Leave the loop.
    Quit,
}

/// The interactive REPL.
pub struct Repl<E: LineEditor = RustylineEditor> {
    /// The line editor for input.
    editor: E,

    /// Graph that `reset` returns to.
    dag: Dag,

    /// The query being built.
    query: Query,

    /// Whether to show the welcome banner.
    show_banner: bool,

    /// Primary prompt.
    prompt: String,
}

impl Repl<RustylineEditor> {
    /// Creates a new REPL with the default rustyline editor.
    ///
    /// # Errors
    ///
    /// Returns an error if the editor fails to initialize.
    pub fn new(dag: Dag) -> Result<Self> {
        let editor = RustylineEditor::new()?;
        Ok(Self::with_editor(editor, dag))
    }
}

impl<E: LineEditor> Repl<E> {
    /// Creates a new REPL with the given editor.
    pub fn with_editor(mut editor: E, dag: Dag) -> Self {
        let keywords = COMMANDS
            .iter()
            .map(|c| (*c).to_string())
            .chain(dag.nodes().map(String::from))
            .collect();
        editor.set_keywords(keywords);
        Self {
            editor,
            query: Query::new(dag.clone()),
            dag,
            show_banner: true,
            prompt: "?> ".to_string(),
        }
    }

    /// Uses `config` for every query of this session.
    #[must_use]
    pub fn with_config(mut self, config: InferenceConfig) -> Self {
        self.query = self.query.with_config(config);
        self
    }

    /// Starts from an existing query instead of an empty one.
    #[must_use]
    pub fn with_query(mut self, query: Query) -> Self {
        self.query = query;
        self
    }

    /// Disables the welcome banner.
    #[must_use]
    pub const fn without_banner(mut self) -> Self {
        self.show_banner = false;
        self
    }

    /// Sets the primary prompt.
    #[must_use]
    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    /// Returns the current query.
    #[must_use]
    pub const fn query(&self) -> &Query {
        &self.query
    }

    /// Runs the REPL loop.
    ///
    /// # Errors
    ///
    /// Returns an error if reading input fails.
    pub fn run(&mut self) -> Result<()> {
        if self.show_banner {
            self.print_banner();
        }

        while self.read_eval_print()? {}

        println!("\nGoodbye!");
        Ok(())
    }

    /// Executes one read-eval-print iteration.
    ///
    /// Returns `Ok(true)` to continue, `Ok(false)` to exit.
    fn read_eval_print(&mut self) -> Result<bool> {
        let input = match self.editor.read_line(&self.prompt)? {
            ReadResult::Line(line) => line,
            ReadResult::Interrupted => {
                println!();
                return Ok(true);
            }
            ReadResult::Eof => return Ok(false),
        };

        if input.trim().is_empty() {
            return Ok(true);
        }
        self.editor.add_history(&input);

        match self.eval(&input) {
            Ok(Reply::Text(text)) => println!("{}", text.trim_end()),
            Ok(Reply::Empty) => {}
            Ok(Reply::Quit) => return Ok(false),
            Err(e) => {
                tracing::debug!(input = %input.trim(), error = %e, "repl command failed");
                self.print_error(&e);
            }
        }
        Ok(true)
    }

    /// Evaluates one command line.
    ///
    /// A failed command leaves the current query unchanged.
    ///
    /// # Errors
    ///
    /// Returns an error for unknown commands, malformed arguments, or a
    /// failing query.
    pub fn eval(&mut self, input: &str) -> Result<Reply> {
        let mut words = input.split_whitespace();
        let Some(command) = words.next() else {
            return Ok(Reply::Empty);
        };
        let args: Vec<&str> = words.collect();

        match command {
            "given" => {
                self.query = self.query.given(parse_pairs(&args)?)?;
                Ok(Reply::Empty)
            }
            "do" => {
                self.query = self.query.intervene(parse_pairs(&args)?)?;
                Ok(Reply::Empty)
            }
            "infer" => Ok(Reply::Text(self.query.infer()?.to_string())),
            "table" => Ok(Reply::Text(self.query.infer_table()?.to_string())),
            "sample" => {
                let [n] = args.as_slice() else {
                    return Err(usage("sample N"));
                };
                let n = n.parse().map_err(|_| usage("sample N"))?;
                Ok(Reply::Text(self.query.sample(n)?.to_string()))
            }
            "paths" => self.paths(&args),
            "dot" => Ok(Reply::Text(query_to_dot(
                &self.query,
                &RenderOptions::default().with_emphasized_interventions(true),
            ))),
            "reset" => {
                self.query = Query::new(self.dag.clone()).with_config(self.query.config().clone());
                Ok(Reply::Empty)
            }
            "help" => Ok(Reply::Text(HELP.to_string())),
            "quit" | "exit" => Ok(Reply::Quit),
            other => Err(Error::parse(format!("unknown command '{other}', try 'help'"), 1)),
        }
    }

    fn paths(&self, args: &[&str]) -> Result<Reply> {
        let [a, b, given @ ..] = args else {
            return Err(usage("paths a b [z ..]"));
        };
        let active = self.query.dag().active_paths(a, b, given)?;
        if active.is_empty() {
            return Ok(Reply::Text(format!("{a} and {b} are independent")));
        }
        let lines: Vec<String> = active.iter().map(ToString::to_string).collect();
        Ok(Reply::Text(lines.join("\n")))
    }

    /// Prints an error message.
    #[allow(clippy::unused_self)]
    fn print_error(&self, error: &Error) {
        eprintln!("\x1b[31mError: {error}\x1b[0m");
    }

    /// Prints the welcome banner.
    fn print_banner(&self) {
        println!("\x1b[1;36mcausetable\x1b[0m v{}", env!("CARGO_PKG_VERSION"));
        println!(
            "{} variables, {} edges. Type 'help' for commands, Ctrl+D to exit.\n",
            self.dag.nodes().count(),
            self.dag.edge_count()
        );
        let _ = io::stdout().flush();
    }
}

fn usage(form: &str) -> Error {
    Error::parse(format!("usage: {form}"), 1)
}

/// Parses `k=v` words into an assignment.
fn parse_pairs<'a>(args: &[&'a str]) -> Result<Vec<(&'a str, Value)>> {
    if args.is_empty() {
        return Err(usage("given|do k=v ..."));
    }
    args.iter()
        .map(|&arg| {
            arg.split_once('=')
                .filter(|(k, v)| !k.is_empty() && !v.is_empty())
                .map(|(k, v)| (k, Value::parse_token(v)))
                .ok_or_else(|| Error::parse(format!("expected k=v, got '{arg}'"), 1))
        })
        .collect()
}
