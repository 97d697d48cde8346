// Flag registry
// Named, string-settable values. Parsing goes through clap; lookups and sets go by name.

use clap::parser::ValueSource;
use clap::{Arg, ArgAction, ArgMatches, Command};
use std::any::TypeId;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fmt;
use std::rc::Rc;
use std::str::FromStr;
use thiserror::Error;

const HELP_NAMES: [&str; 2] = ["h", "help"];

/// Error produced by a [`FlagValue`] that rejects its input.
pub type ValueError = Box<dyn std::error::Error + Send + Sync>;

/// A value that can be bound to a flag name.
pub trait FlagValue {
    /// Parse `value` and store it, or reject it.
    fn set(&mut self, value: &str) -> Result<(), ValueError>;

    /// Current value in the textual form `set` accepts.
    fn render(&self) -> String;

    /// Short tag shown as the value placeholder in help output.
    fn type_name(&self) -> &'static str;

    /// Bool flags may be given without a value (`--flag` means `--flag=true`).
    fn is_bool_flag(&self) -> bool {
        false
    }
}

#[derive(Debug, Error)]
pub enum FlagError {
    #[error("flag redefined: {0}")]
    Redefined(String),

    #[error("no such flag -{0}")]
    NotFound(String),

    #[error("invalid value \"{value}\" for flag -{name}")]
    InvalidValue {
        name: String,
        value: String,
        #[source]
        source: ValueError,
    },

    #[error(transparent)]
    Parse(#[from] clap::Error),
}

pub struct Flag {
    name: String,
    usage: String,
    default_value: String,
    value: Box<dyn FlagValue>,
}

impl Flag {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn usage(&self) -> &str {
        &self.usage
    }

    /// Rendered value at registration time.
    pub fn default_value(&self) -> &str {
        &self.default_value
    }

    pub fn value(&self) -> &dyn FlagValue {
        self.value.as_ref()
    }

    fn help_text(&self) -> String {
        if self.default_value.is_empty() {
            self.usage.clone()
        } else {
            format!("{} (default {})", self.usage, self.default_value)
        }
    }

    fn arg(&self) -> Arg {
        let mut arg = Arg::new(self.name.clone())
            .long(self.name.clone())
            .value_name(self.value.type_name())
            .value_parser(clap::value_parser!(String))
            .action(ArgAction::Set)
            .help(self.help_text());

        let mut chars = self.name.chars();
        if let (Some(short), None) = (chars.next(), chars.next()) {
            arg = arg.short(short);
        }

        if self.value.is_bool_flag() {
            arg = arg.num_args(0..=1).default_missing_value("true");
        }

        arg
    }
}

impl fmt::Debug for Flag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Flag")
            .field("name", &self.name)
            .field("value", &self.value.render())
            .field("type", &self.value.type_name())
            .finish()
    }
}

/// A set of named flags, owned by the caller.
#[derive(Debug, Default)]
pub struct FlagSet {
    name: String,
    flags: BTreeMap<String, Flag>,
}

impl FlagSet {
    pub fn new(name: impl Into<String>) -> Self {
        FlagSet {
            name: name.into(),
            flags: BTreeMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Register `value` under `name`. The current value becomes the flag's default.
    pub fn var<V>(&mut self, value: V, name: &str, usage: &str) -> Result<(), FlagError>
    where
        V: FlagValue + 'static,
    {
        if self.flags.contains_key(name) {
            return Err(FlagError::Redefined(name.to_string()));
        }

        let flag = Flag {
            name: name.to_string(),
            usage: usage.to_string(),
            default_value: value.render(),
            value: Box::new(value),
        };
        self.flags.insert(name.to_string(), flag);

        Ok(())
    }

    pub fn lookup(&self, name: &str) -> Option<&Flag> {
        self.flags.get(name)
    }

    pub fn set(&mut self, name: &str, value: &str) -> Result<(), FlagError> {
        let flag = self
            .flags
            .get_mut(name)
            .ok_or_else(|| FlagError::NotFound(name.to_string()))?;

        flag.value
            .set(value)
            .map_err(|source| FlagError::InvalidValue {
                name: name.to_string(),
                value: value.to_string(),
                source,
            })
    }

    /// All flags in lexical order of their names.
    pub fn iter(&self) -> impl Iterator<Item = &Flag> {
        self.flags.values()
    }

    pub fn len(&self) -> usize {
        self.flags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }

    /// Add every flag of this set to an existing clap command. A repeated flag keeps
    /// its last value, and a flag named `h` or `help` replaces clap's help flag.
    pub fn augment(&self, cmd: Command) -> Command {
        let cmd = cmd.args_override_self(true);
        let cmd = if HELP_NAMES.iter().any(|name| self.flags.contains_key(*name)) {
            cmd.disable_help_flag(true)
        } else {
            cmd
        };

        self.flags.values().fold(cmd, |cmd, flag| cmd.arg(flag.arg()))
    }

    /// A clap command carrying exactly the flags of this set.
    pub fn command(&self) -> Command {
        self.augment(Command::new(self.name.clone()))
    }

    /// Store every flag the command line set explicitly. Unset flags keep their values.
    pub fn apply_matches(&mut self, matches: &ArgMatches) -> Result<(), FlagError> {
        for (name, flag) in self.flags.iter_mut() {
            if matches.value_source(name) != Some(ValueSource::CommandLine) {
                continue;
            }

            let Some(value) = matches.get_one::<String>(name) else {
                continue;
            };

            flag.value
                .set(value)
                .map_err(|source| FlagError::InvalidValue {
                    name: name.clone(),
                    value: value.clone(),
                    source,
                })?;
        }

        Ok(())
    }

    /// Parse `args` (binary name first) and apply them.
    pub fn parse<I, T>(&mut self, args: I) -> Result<(), FlagError>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let matches = self.command().try_get_matches_from(args)?;
        self.apply_matches(&matches)
    }
}

/// A shared, typed flag value. Clones observe the same storage, so the caller keeps a
/// handle after registering one with a [`FlagSet`].
pub struct Value<T> {
    cell: Rc<RefCell<T>>,
    type_name: &'static str,
}

impl<T> Clone for Value<T> {
    fn clone(&self) -> Self {
        Value {
            cell: Rc::clone(&self.cell),
            type_name: self.type_name,
        }
    }
}

impl<T> Value<T> {
    pub fn new(initial: T, type_name: &'static str) -> Self {
        Value {
            cell: Rc::new(RefCell::new(initial)),
            type_name,
        }
    }

    pub fn get(&self) -> T
    where
        T: Clone,
    {
        self.cell.borrow().clone()
    }

    pub fn replace(&self, value: T) -> T {
        self.cell.replace(value)
    }
}

impl Value<i64> {
    pub fn int(initial: i64) -> Self {
        Value::new(initial, "int")
    }
}

impl Value<String> {
    pub fn string(initial: impl Into<String>) -> Self {
        Value::new(initial.into(), "string")
    }
}

impl Value<bool> {
    pub fn bool(initial: bool) -> Self {
        Value::new(initial, "bool")
    }
}

impl<T> FlagValue for Value<T>
where
    T: FromStr + fmt::Display + 'static,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    fn set(&mut self, value: &str) -> Result<(), ValueError> {
        let parsed = value.parse::<T>()?;
        *self.cell.borrow_mut() = parsed;
        Ok(())
    }

    fn render(&self) -> String {
        self.cell.borrow().to_string()
    }

    fn type_name(&self) -> &'static str {
        self.type_name
    }

    fn is_bool_flag(&self) -> bool {
        TypeId::of::<T>() == TypeId::of::<bool>()
    }
}
