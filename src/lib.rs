#![cfg_attr(not(feature = "std"), no_std)]
extern crate alloc;

#[cfg(not(feature = "std"))]
mod std;

#[cfg(feature = "debug")]
use log::debug;

#[cfg(not(feature = "debug"))]
macro_rules! debug {
    ($($arg:tt)+) => {};
}

mod usage;
mod value;

#[cfg(feature = "derive")]
use serde::{Deserialize, Serialize};

use std::convert::TryFrom;
use std::fmt::{self, Write};
use std::string::String;
use std::vec::Vec;

use crate::value::coerce;
pub use crate::value::{Value, ValueKind};

// starting size of both definition tables
const INITIAL_CAPACITY: usize = 16;

/// Errors caused by the command line a user typed. All of them end the parse.
#[derive(PartialEq, Debug, Clone)]
pub enum Error {
    TooFewArguments { required: usize, supplied: usize },
    EmptyOption,
    UnknownOption(String),
    DuplicateOption(String),
    MissingOptionValue(String),
    // only produced with `Schema::strict_values(true)`
    InvalidValue(String, ValueKind),
    WrongValueType(Value),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::TooFewArguments { .. } => f.write_str("Not enough arguments were supplied"),
            Error::EmptyOption => f.write_str("Empty option"),
            Error::UnknownOption(opt) => write!(f, "Unknown option `{}`", opt),
            Error::DuplicateOption(opt) => write!(f, "Option `{}` already supplied", opt),
            Error::MissingOptionValue(opt) => write!(f, "Option `{}` without value", opt),
            Error::InvalidValue(raw, kind) => write!(f, "Invalid {} value `{}`", kind, raw),
            Error::WrongValueType(value) => write!(f, "Value {:?} has the wrong type", value),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

/// A failed parse. Carries the usage text since the schema it was rendered from is gone by the time the
/// caller sees this.
#[derive(PartialEq, Debug, Clone)]
pub struct ParseError {
    pub error: Error,
    pub usage: String,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.error, f)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ParseError {}

#[cfg(feature = "std")]
impl ParseError {
    /// Prints the diagnostic and the usage text, then terminates the process.
    pub fn exit(&self) -> ! {
        eprintln!("{}", self.error);
        print!("{}", self.usage);
        std::process::exit(-1)
    }
}

/// Mistakes made while declaring a schema.
#[derive(PartialEq, Debug, Clone)]
pub enum DefinitionError {
    MissingLongName,
    // holds the long name of the definition we collided with
    Conflict(String),
}

impl fmt::Display for DefinitionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefinitionError::MissingLongName => {
                f.write_str("option with no long name specified (long name is mandatory)")
            }
            DefinitionError::Conflict(name) => write!(f, "conflicting option definition found ({})", name),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for DefinitionError {}

#[derive(Debug, PartialEq, Clone)]
pub struct PositionalDef {
    pub name: String,
    pub description: Option<String>,
    pub value_kind: ValueKind,
    pub required: bool,
}

#[derive(Debug, PartialEq, Clone)]
pub struct OptionDef {
    // matched without the leading dash, e.g "v" for -v
    pub short_name: Option<String>,
    // matched without the leading dashes, e.g "verbose" for --verbose
    pub long_name: String,
    pub description: Option<String>,
    pub value_kind: ValueKind,
    pub needs_value: bool,
    // set once the option is seen, a second sighting is an error
    matched: bool,
}

/// The set of positionals and options a command line is matched against.
///
/// A schema is consumed by [`Schema::parse`]; build a fresh one for every parse.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "derive", derive(Deserialize), serde(try_from = "SchemaDefinition"))]
pub struct Schema {
    positionals: Vec<PositionalDef>,
    options: Vec<OptionDef>,
    required_count: usize,
    prog_name: Option<String>,
    prog_description: Option<String>,
    strict: bool,
}

impl Default for Schema {
    fn default() -> Self {
        Schema::new()
    }
}

/// Declarative form of a positional, see [`SchemaDefinition`].
#[derive(Debug, PartialEq, Clone, Default)]
#[cfg_attr(feature = "derive", derive(Deserialize), serde(default))]
pub struct PositionalSpec {
    pub name: Option<String>,
    pub description: Option<String>,
    pub value_kind: ValueKind,
    pub required: bool,
}

/// Declarative form of an option, see [`SchemaDefinition`].
#[derive(Debug, PartialEq, Clone, Default)]
#[cfg_attr(feature = "derive", derive(Deserialize), serde(default))]
pub struct OptionSpec {
    pub short_name: Option<String>,
    pub long_name: Option<String>,
    pub description: Option<String>,
    pub value_kind: ValueKind,
    pub needs_value: bool,
}

/// Everything needed to build a [`Schema`] in one go. Unlike the builder methods, converting this reports
/// bad option definitions as a [`DefinitionError`] instead of panicking.
#[derive(Debug, PartialEq, Clone, Default)]
#[cfg_attr(feature = "derive", derive(Deserialize), serde(default))]
pub struct SchemaDefinition {
    pub name: Option<String>,
    pub description: Option<String>,
    pub positionals: Vec<PositionalSpec>,
    pub options: Vec<OptionSpec>,
    pub strict_values: bool,
}

impl TryFrom<SchemaDefinition> for Schema {
    type Error = DefinitionError;

    fn try_from(def: SchemaDefinition) -> Result<Self, Self::Error> {
        let mut schema = Schema::new();
        schema.program_info(def.name.as_deref(), def.description.as_deref());
        schema.strict_values(def.strict_values);
        for pos in &def.positionals {
            schema.add_positional(pos.name.as_deref(), pos.description.as_deref(), pos.value_kind, pos.required);
        }
        for opt in &def.options {
            schema.try_add_option(
                opt.short_name.as_deref(),
                opt.long_name.as_deref(),
                opt.description.as_deref(),
                opt.value_kind,
                opt.needs_value,
            )?;
        }
        Ok(schema)
    }
}

#[derive(Debug, PartialEq, Clone)]
#[cfg_attr(feature = "derive", derive(Serialize, Deserialize))]
pub struct ParsedPositional {
    // None when the token landed past the last defined positional
    pub name: Option<String>,
    pub value: Value,
}

impl ParsedPositional {
    pub fn value_kind(&self) -> ValueKind {
        self.value.kind()
    }
}

#[derive(Debug, PartialEq, Clone)]
#[cfg_attr(feature = "derive", derive(Serialize, Deserialize))]
pub struct ParsedOption {
    // whichever form was typed, the other one stays None
    pub short_name: Option<String>,
    pub long_name: Option<String>,
    pub value_kind: ValueKind,
    pub value: Option<Value>,
}

/// Everything a parse found, in command line order.
///
/// With the `derive` feature this serializes, but formats without non-finite floats (JSON among them)
/// write `nan`/`inf` values as `null` and can't read them back.
#[derive(Debug, PartialEq, Clone, Default)]
#[cfg_attr(feature = "derive", derive(Serialize, Deserialize))]
pub struct ParseResult {
    pub positional: Vec<ParsedPositional>,
    pub options: Vec<ParsedOption>,
}

fn same_name(recorded: Option<&str>, wanted: Option<&str>) -> bool {
    matches!((recorded, wanted), (Some(a), Some(b)) if a == b)
}

impl ParseResult {
    /// Finds the option whose typed short or long form matches one of the given names.
    ///
    /// Only the form that appeared on the command line is recorded, so pass both names to find an option
    /// regardless of how it was spelt.
    pub fn get_option(&self, short_name: Option<&str>, long_name: Option<&str>) -> Option<&ParsedOption> {
        self.options.iter().find(|opt| {
            same_name(opt.long_name.as_deref(), long_name) || same_name(opt.short_name.as_deref(), short_name)
        })
    }

    pub fn get_positional(&self, index: usize) -> Option<&ParsedPositional> {
        self.positional.get(index)
    }
}

pub trait IntoStr {
    fn into(&self) -> &str;
}

impl IntoStr for &str {
    fn into(&self) -> &str {
        self
    }
}

impl IntoStr for String {
    fn into(&self) -> &str {
        self.as_str()
    }
}

impl Schema {
    pub fn new() -> Self {
        Schema {
            positionals: Vec::with_capacity(INITIAL_CAPACITY),
            options: Vec::with_capacity(INITIAL_CAPACITY),
            required_count: 0,
            prog_name: None,
            prog_description: None,
            strict: false,
        }
    }

    /// Overrides the program name and/or description shown in the usage text. `None` keeps whatever was
    /// set before.
    pub fn program_info(&mut self, name: Option<&str>, description: Option<&str>) {
        if let Some(name) = name {
            self.prog_name = Some(String::from(name));
        }
        if let Some(description) = description {
            self.prog_description = Some(String::from(description));
        }
    }

    /// Rejects numeric tokens that don't parse completely instead of falling back to their numeric prefix
    /// (or zero).
    pub fn strict_values(&mut self, strict: bool) {
        self.strict = strict;
    }

    /// Appends a positional. Unnamed positionals are labelled `arg<N>`, N being their 1-based position.
    pub fn add_positional(
        &mut self,
        name: Option<&str>,
        description: Option<&str>,
        value_kind: ValueKind,
        required: bool,
    ) {
        let name = match name {
            Some(name) => String::from(name),
            None => {
                let mut label = String::new();
                let _ = write!(label, "arg{}", self.positionals.len() + 1);
                label
            }
        };
        debug!("adding positional {} (required: {})", name, required);
        if required {
            self.required_count += 1;
        }
        self.positionals.push(PositionalDef {
            name,
            description: description.map(String::from),
            value_kind,
            required,
        });
    }

    /// Appends an option.
    ///
    /// # Panics
    ///
    /// When `long_name` is missing or either name is already taken. Use [`Schema::try_add_option`] for
    /// definitions that don't come from code.
    pub fn add_option(
        &mut self,
        short_name: Option<&str>,
        long_name: Option<&str>,
        description: Option<&str>,
        value_kind: ValueKind,
        needs_value: bool,
    ) {
        if let Err(e) = self.try_add_option(short_name, long_name, description, value_kind, needs_value) {
            panic!("definition error: {}", e);
        }
    }

    pub fn try_add_option(
        &mut self,
        short_name: Option<&str>,
        long_name: Option<&str>,
        description: Option<&str>,
        value_kind: ValueKind,
        needs_value: bool,
    ) -> Result<(), DefinitionError> {
        let long_name = long_name.ok_or(DefinitionError::MissingLongName)?;
        if let Some(same) = self
            .options
            .iter()
            .find(|o| o.long_name == long_name || same_name(o.short_name.as_deref(), short_name))
        {
            debug!("option {} collides with {}", long_name, same.long_name);
            return Err(DefinitionError::Conflict(same.long_name.clone()));
        }
        debug!("adding option {:?}/{} (needs value: {})", short_name, long_name, needs_value);
        self.options.push(OptionDef {
            short_name: short_name.map(String::from),
            long_name: String::from(long_name),
            description: description.map(String::from),
            value_kind,
            needs_value,
            matched: false,
        });
        Ok(())
    }

    pub fn positionals(&self) -> &[PositionalDef] {
        &self.positionals
    }

    pub fn options(&self) -> &[OptionDef] {
        &self.options
    }

    pub fn required_count(&self) -> usize {
        self.required_count
    }

    pub fn program_name(&self) -> Option<&str> {
        self.prog_name.as_deref()
    }

    pub fn program_description(&self) -> Option<&str> {
        self.prog_description.as_deref()
    }

    /// Parses `args`, the first of which is the program name.
    ///
    /// The schema is consumed: the match state of its options only lives for one parse.
    pub fn parse<S: IntoStr, T: IntoIterator<Item = S>>(mut self, args: T) -> Result<ParseResult, ParseError> {
        debug!("starting arg parsing");
        let args: Vec<S> = args.into_iter().collect();
        self.apply(&args).map_err(|error| {
            debug!("parse failed: {:?}", error);
            let prog_name = self.display_name(args.first().map(<S as IntoStr>::into));
            ParseError {
                usage: self.usage(&prog_name),
                error,
            }
        })
    }

    /// Parses OS strings, replacing anything that isn't valid unicode with U+FFFD.
    #[cfg(feature = "std")]
    pub fn parse_os<T: IntoIterator<Item = std::ffi::OsString>>(self, args: T) -> Result<ParseResult, ParseError> {
        self.parse(args.into_iter().map(|a| a.to_string_lossy().into_owned()))
    }

    /// Parses the process arguments, printing usage and exiting on failure.
    #[cfg(feature = "std")]
    pub fn parse_env(self) -> ParseResult {
        match self.parse_os(std::env::args_os()) {
            Ok(results) => results,
            Err(e) => e.exit(),
        }
    }

    fn apply<S: IntoStr>(&mut self, args: &[S]) -> Result<ParseResult, Error> {
        let supplied = args.len().saturating_sub(1);
        if args.is_empty() || supplied < self.required_count {
            debug!("{} tokens supplied, {} positionals required", supplied, self.required_count);
            return Err(Error::TooFewArguments {
                required: self.required_count,
                supplied,
            });
        }

        let mut results = ParseResult {
            positional: Vec::with_capacity(supplied),
            options: Vec::with_capacity(supplied),
        };
        let mut tokens = args[1..].iter().map(<S as IntoStr>::into);
        let mut cursor = 0;
        while let Some(token) = tokens.next() {
            if token.starts_with('-') {
                debug!("found option {}", token);
                let option = self.match_option(token, &mut tokens)?;
                results.options.push(option);
            } else {
                debug!("found positional {}", token);
                let parsed = match self.positionals.get(cursor) {
                    Some(def) => ParsedPositional {
                        name: Some(def.name.clone()),
                        value: coerce(def.value_kind, token, self.strict)?,
                    },
                    None => {
                        debug!("no definition left for {}, keeping it as a string", token);
                        ParsedPositional {
                            name: None,
                            value: Value::from(token),
                        }
                    }
                };
                cursor += 1;
                results.positional.push(parsed);
            }
        }

        debug!("finished looping through args, found {} positionals", results.positional.len());
        if results.positional.len() < self.required_count {
            return Err(Error::TooFewArguments {
                required: self.required_count,
                supplied: results.positional.len(),
            });
        }
        Ok(results)
    }

    fn match_option<'t, I: Iterator<Item = &'t str>>(
        &mut self,
        token: &str,
        tokens: &mut I,
    ) -> Result<ParsedOption, Error> {
        let name = &token[1..];
        if name.is_empty() || name == "-" {
            return Err(Error::EmptyOption);
        }
        let strict = self.strict;
        let (short, long) = match name.strip_prefix('-') {
            Some(long) => (None, Some(long)),
            None => (Some(name), None),
        };
        debug!("looking up short {:?} long {:?}", short, long);
        let def = match long {
            Some(long) => self.options.iter_mut().find(|o| o.long_name == long),
            None => self.options.iter_mut().find(|o| same_name(o.short_name.as_deref(), short)),
        }
        .ok_or_else(|| Error::UnknownOption(String::from(token)))?;

        if def.matched {
            return Err(Error::DuplicateOption(String::from(token)));
        }
        def.matched = true;

        let mut parsed = ParsedOption {
            short_name: short.map(String::from),
            long_name: long.map(String::from),
            value_kind: def.value_kind,
            value: None,
        };
        if !def.needs_value {
            return Ok(parsed);
        }
        // the next token is the value, even when it looks like an option
        let raw = tokens
            .next()
            .ok_or_else(|| Error::MissingOptionValue(String::from(token)))?;
        debug!("found value {} for {}", raw, token);
        parsed.value = Some(coerce(def.value_kind, raw, strict)?);
        Ok(parsed)
    }
}
