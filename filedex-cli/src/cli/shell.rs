// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! The interactive query shell and the synchronous crawl loop
//!
//! A bare line at the prompt starts a new collection from that
//! constraint; `and`/`not`/`or` extend it; `ls` prints a report of the
//! current collection. The prompt shows collection and catalog sizes:
//! `filedex (12|340)>` means 12 of 340 resources match, `\` instead of
//! `|` means a limit is binding, and brackets replace parens when a sort
//! is set.

use colored::Colorize;
use rustyline::completion::Completer;
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::Validator;
use rustyline::{CompletionType, Config, Context, EditMode, Editor, Helper};
use std::path::Path;
use std::thread;
use std::time::Duration;

use filedex::{
    crawl_once, Collection, Combinator, Connection, Database, FileRecord, Index, Resource,
};

use super::output::render_table;

const COMMANDS: &[&str] = &[
    "and",
    "clear",
    "constraints",
    "crawl",
    "exit",
    "fields",
    "help",
    "indices",
    "limit",
    "ls",
    "not",
    "or",
    "quit",
    "sort",
    "unlimit",
    "unsort",
];

/// Run the crawler synchronously until the process is interrupted.
pub fn handle_crawl(db: &Database) -> Result<(), Box<dyn std::error::Error>> {
    let mut conn: Connection<FileRecord> = db.connect()?;
    println!(
        "{}",
        format!("Crawling {} (interrupt to stop)", conn.catalog().root()).green()
    );
    loop {
        if let Err(err) = crawl_once(&mut conn) {
            eprintln!("{}", format!("crawl pass failed: {}", err).red());
        }
        thread::sleep(Duration::from_millis(100));
    }
}

/// Enter the interactive shell.
pub fn handle_shell(db: &Database) -> Result<(), Box<dyn std::error::Error>> {
    let conn: Connection<FileRecord> = db.connect()?;

    println!("{}", "Filedex".bold().green());
    println!("Cataloging {}", conn.catalog().root().cyan());
    println!("Type 'help' for commands, 'quit' or 'q' to exit\n");

    let mut shell = Shell::new(conn);

    let config = Config::builder()
        .edit_mode(EditMode::Emacs)
        .history_ignore_space(true)
        .completion_type(CompletionType::List)
        .auto_add_history(false)
        .build();
    let mut rl: Editor<ShellHelper, DefaultHistory> = Editor::with_config(config)?;
    rl.set_helper(Some(shell.helper()));

    let history_path = ".filedex/.history.txt";
    if let Some(parent) = Path::new(history_path).parent() {
        std::fs::create_dir_all(parent)?;
    }
    let _ = rl.load_history(history_path);

    loop {
        let line = match rl.readline(shell.prompt()) {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(err) => {
                eprintln!("{}", format!("Error: {:?}", err).red());
                break;
            }
        };
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let _ = rl.add_history_entry(trimmed);
        if !shell.dispatch(trimmed) {
            break;
        }
    }

    let _ = rl.save_history(history_path);
    Ok(())
}

struct Shell {
    conn: Connection<FileRecord>,
    collection: Option<Collection>,
    /// Total resources in the catalog.
    nresources: usize,
    /// Backing-set size of the current collection, ignoring the limit.
    nmatched: Option<usize>,
    fields_listing: String,
    indices_listing: String,
    index_names: Vec<String>,
    prompt: String,
}

impl Shell {
    fn new(conn: Connection<FileRecord>) -> Self {
        let mut shell = Shell {
            conn,
            collection: None,
            nresources: 0,
            nmatched: None,
            fields_listing: String::new(),
            indices_listing: String::new(),
            index_names: Vec::new(),
            prompt: String::new(),
        };
        shell.update();
        shell
    }

    fn helper(&self) -> ShellHelper {
        let mut words: Vec<String> = COMMANDS.iter().map(|c| c.to_string()).collect();
        words.extend(self.index_names.iter().cloned());
        words.extend(FileRecord::fields().iter().map(|f| f.to_string()));
        words.sort();
        words.dedup();
        ShellHelper { words }
    }

    fn prompt(&self) -> &str {
        &self.prompt
    }

    /// Re-read catalog-derived state: sizes and the precomputed field
    /// and index listings. Drops the current collection.
    fn update(&mut self) {
        self.nresources = self.conn.catalog().len();
        self.collection = None;
        self.nmatched = None;

        self.fields_listing = FileRecord::fields()
            .iter()
            .map(|field| format!(" {}", field))
            .collect::<Vec<_>>()
            .join("\n");

        let mut entries: Vec<(String, &'static str)> = self
            .conn
            .catalog()
            .indices()
            .map(|(name, index)| (name.to_string(), index.kind()))
            .collect();
        entries.sort();
        let longest = entries.iter().map(|(name, _)| name.len()).max().unwrap_or(0);
        self.indices_listing = entries
            .iter()
            .map(|(name, kind)| format!(" {:<width$}  {}", name, kind, width = longest))
            .collect::<Vec<_>>()
            .join("\n");
        self.index_names = entries.into_iter().map(|(name, _)| name).collect();

        self.set_prompt();
    }

    /// Refresh the current collection against the catalog.
    fn update_collection(&mut self) {
        if let Some(collection) = &mut self.collection {
            match collection.matched(self.conn.catalog()) {
                Ok(matched) => self.nmatched = Some(matched),
                Err(err) => {
                    println!("{}", err);
                    self.nmatched = None;
                }
            }
        }
        self.set_prompt();
    }

    fn set_prompt(&mut self) {
        let right = self.nresources.to_string();
        let (lbrace, left, sep, rbrace) = match (&self.collection, self.nmatched) {
            (Some(collection), Some(matched)) => {
                let (shown, sep) = match collection.limit() {
                    None => (matched, '|'),
                    Some(limit) if matched > limit => (limit, '\\'),
                    Some(_) => (matched, '/'),
                };
                let braces = if collection.sort().is_none() {
                    ('(', ')')
                } else {
                    ('[', ']')
                };
                (
                    braces.0,
                    format!("{:>width$}", shown, width = right.len()),
                    sep,
                    braces.1,
                )
            }
            _ => ('(', " ".repeat(right.len()), ' ', ')'),
        };
        self.prompt = format!("filedex {}{}{}{}{}> ", lbrace, left, sep, right, rbrace);
    }

    /// Handle one input line; false means leave the shell.
    fn dispatch(&mut self, line: &str) -> bool {
        let (word, rest) = split_first_word(line);
        match word.to_lowercase().as_str() {
            "quit" | "q" | "exit" => return false,
            "help" => self.help(),
            "and" | "not" | "or" => self.constrain(&word.to_uppercase(), rest),
            "clear" => self.clear(rest),
            "constraints" => self.show_constraints(),
            "crawl" => self.crawl(),
            "fields" => println!("{}", self.fields_listing),
            "indices" => println!("{}", self.indices_listing),
            "limit" => self.limit_cmd(rest),
            "unlimit" => self.unlimit(),
            "sort" => self.sort_cmd(rest),
            "unsort" => self.unsort(),
            "ls" => self.ls(rest),
            _ => self.collect(line),
        }
        true
    }

    fn help(&self) {
        println!("Start a new collection by typing a constraint, e.g.:");
        println!("  name startswith draft");
        println!("  path below {}{} 0:2", std::path::MAIN_SEPARATOR, "some");
        println!();
        println!("Commands:");
        println!("  and/not/or <constraint>  refine the collection");
        println!("  constraints              show the constraint structure");
        println!("  ls [field ...]           report on the collection");
        println!("  sort <index> / unsort    order by an index");
        println!("  limit <n> / unlimit      cap the report size");
        println!("  fields / indices         show what's available");
        println!("  crawl                    sync the catalog once");
        println!("  clear [catalog]          drop the collection [or catalog]");
        println!("  quit                     leave");
    }

    /// Start a new collection from a bare constraint line.
    fn collect(&mut self, line: &str) {
        match Collection::new(self.conn.catalog(), Some(line)) {
            Ok(collection) => {
                self.collection = Some(collection);
                self.update_collection();
            }
            Err(err) => println!("{}", err),
        }
    }

    /// Add a constraint to the current collection.
    ///
    /// Two normalizations keep the structure minimal: a redundant bare
    /// `or` on a match-all grouping is skipped, and `and` against a
    /// match-all grouping is rewritten as `or` with the universe seed
    /// trimmed.
    fn constrain(&mut self, operator: &str, constraint: &str) {
        if constraint.is_empty() && operator != "OR" {
            println!("non-OR constraints require an explicit term");
            return;
        }

        if self.collection.is_none() {
            match Collection::new(self.conn.catalog(), None) {
                Ok(collection) => self.collection = Some(collection),
                Err(err) => {
                    println!("{}", err);
                    return;
                }
            }
        }

        let mut operator = operator;
        let Some(collection) = self.collection.as_mut() else {
            return;
        };
        if collection.last_grouping_is_match_all() {
            if operator == "OR" && constraint.is_empty() {
                self.update_collection();
                return;
            }
            if operator == "AND" {
                collection.retract_universe_grouping();
                operator = "OR";
            }
        }

        let catalog = self.conn.catalog();
        let result = match operator {
            "AND" => collection.and(catalog, constraint),
            "NOT" => collection.not(catalog, constraint),
            "OR" => {
                let constraint = (!constraint.is_empty()).then_some(constraint);
                collection.or(catalog, constraint)
            }
            other => {
                println!("unknown operator: '{}'", other);
                return;
            }
        };
        if let Err(err) = result {
            println!("{}", err);
            return;
        }
        self.update_collection();
    }

    /// Clear the collection (default) or the entire catalog.
    fn clear(&mut self, what: &str) {
        if what == "catalog" {
            self.conn.catalog_mut().reset();
            if let Err(err) = self.conn.commit() {
                eprintln!("{}", format!("{}", err).red());
                let _ = self.conn.abort();
            }
            self.update();
        } else {
            self.collection = None;
            self.nmatched = None;
            self.set_prompt();
        }
    }

    fn show_constraints(&self) {
        let Some(collection) = &self.collection else {
            return;
        };
        let mut out = String::new();
        for (i, grouping) in collection.groupings().iter().enumerate() {
            let first = &grouping[0];
            match &first.query {
                None => out.push_str("OR"),
                Some(query) => {
                    if i > 0 {
                        out.push_str("OR ");
                    }
                    out.push_str(&query.to_string());
                }
            }
            out.push('\n');
            for term in &grouping[1..] {
                let op = match term.combinator {
                    Combinator::Intersect => "AND",
                    Combinator::Difference => "NOT",
                    Combinator::Seed => "OR",
                };
                match &term.query {
                    Some(query) => out.push_str(&format!(" {} {}\n", op, query)),
                    None => out.push_str(&format!(" {}\n", op)),
                }
            }
        }
        print!("{}", out);
    }

    /// Perform one catalog crawl.
    fn crawl(&mut self) {
        if let Err(err) = crawl_once(&mut self.conn) {
            eprintln!("{}", format!("{}", err).red());
        }
        self.update();
    }

    fn limit_cmd(&mut self, arg: &str) {
        let Some(collection) = &mut self.collection else {
            println!("no collection to limit");
            return;
        };
        if arg.is_empty() {
            match collection.limit() {
                Some(limit) => println!("{}", limit),
                None => println!("no limit"),
            }
        } else if let Err(err) = collection.set_limit_str(arg) {
            println!("{}", err);
        }
        self.set_prompt();
    }

    fn unlimit(&mut self) {
        match &mut self.collection {
            None => println!("no collection to unlimit"),
            Some(collection) => collection.clear_limit(),
        }
        self.set_prompt();
    }

    fn sort_cmd(&mut self, arg: &str) {
        let Some(collection) = self.collection.as_mut() else {
            println!("no collection to sort");
            return;
        };
        if arg.is_empty() {
            match collection.sort() {
                Some(sort) => println!("{}", sort),
                None => println!("no sort"),
            }
        } else if let Err(err) = collection.set_sort(self.conn.catalog(), arg) {
            println!("{}", err);
        }
        self.set_prompt();
    }

    fn unsort(&mut self) {
        match &mut self.collection {
            None => println!("no collection to unsort"),
            Some(collection) => collection.clear_sort(),
        }
        self.set_prompt();
    }

    /// Print a report of the collection, one column per field.
    fn ls(&mut self, args: &str) {
        let Some(collection) = &mut self.collection else {
            return;
        };
        let fields: Vec<&str> = if args.is_empty() {
            FileRecord::fields().to_vec()
        } else {
            args.split_whitespace().collect()
        };
        match collection.resources(self.conn.catalog()) {
            Ok(resources) => println!("{}", render_table(&fields, &resources)),
            Err(err) => println!("{}", err),
        }
    }
}

fn split_first_word(line: &str) -> (&str, &str) {
    match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    }
}

/// Completion over shell commands, index names and report fields.
struct ShellHelper {
    words: Vec<String>,
}

impl Completer for ShellHelper {
    type Candidate = String;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<String>)> {
        let upto = &line[..pos];
        let start = upto
            .rfind(char::is_whitespace)
            .map(|i| i + 1)
            .unwrap_or(0);
        let word = &upto[start..];
        let matches = self
            .words
            .iter()
            .filter(|candidate| candidate.starts_with(word))
            .cloned()
            .collect();
        Ok((start, matches))
    }
}

impl Hinter for ShellHelper {
    type Hint = String;
}

impl Highlighter for ShellHelper {}

impl Validator for ShellHelper {}

impl Helper for ShellHelper {}
