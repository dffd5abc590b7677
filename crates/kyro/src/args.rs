//! Call argument packaging.

use crate::exception_private::{ExcType, RunResult};
use crate::intern::StringId;
use crate::value::Value;

/// Arguments for one call.
///
/// Uses dedicated variants for the common 0-2 positional-argument shapes
/// so most calls avoid a Vec allocation; the general shape carries both
/// positionals and keywords.
#[derive(Debug)]
pub(crate) enum ArgValues {
    Empty,
    One(Value),
    Two(Value, Value),
    ArgsKargs {
        args: Vec<Value>,
        kwargs: Vec<(StringId, Value)>,
    },
}

impl ArgValues {
    /// Builds the cheapest shape for a positional-only call.
    pub fn positional(mut args: Vec<Value>) -> Self {
        match args.len() {
            0 => Self::Empty,
            1 => Self::One(args.pop().expect("length checked")),
            2 => {
                let second = args.pop().expect("length checked");
                let first = args.pop().expect("length checked");
                Self::Two(first, second)
            }
            _ => Self::ArgsKargs {
                args,
                kwargs: Vec::new(),
            },
        }
    }

    /// Number of positional arguments.
    pub fn count(&self) -> usize {
        match self {
            Self::Empty => 0,
            Self::One(_) => 1,
            Self::Two(..) => 2,
            Self::ArgsKargs { args, .. } => args.len(),
        }
    }

    /// Splits into positional arguments and keyword arguments.
    pub fn into_parts(self) -> (Vec<Value>, Vec<(StringId, Value)>) {
        match self {
            Self::Empty => (Vec::new(), Vec::new()),
            Self::One(a) => (vec![a], Vec::new()),
            Self::Two(a, b) => (vec![a, b], Vec::new()),
            Self::ArgsKargs { args, kwargs } => (args, kwargs),
        }
    }

    /// Prepends a receiver, turning method arguments into function
    /// arguments.
    #[must_use]
    pub fn with_receiver(self, receiver: Value) -> Self {
        match self {
            Self::Empty => Self::One(receiver),
            Self::One(a) => Self::Two(receiver, a),
            Self::Two(a, b) => Self::ArgsKargs {
                args: vec![receiver, a, b],
                kwargs: Vec::new(),
            },
            Self::ArgsKargs { mut args, kwargs } => {
                args.insert(0, receiver);
                Self::ArgsKargs { args, kwargs }
            }
        }
    }

    /// Checks that zero arguments were passed.
    pub fn check_zero_args(self, name: &str) -> RunResult<()> {
        match self {
            Self::Empty => Ok(()),
            other => Err(ExcType::type_error(format!(
                "{name}() takes no arguments ({} given)",
                other.count()
            ))),
        }
    }

    /// Checks that exactly one positional argument was passed, returning it.
    pub fn get_one_arg(self, name: &str) -> RunResult<Value> {
        match self {
            Self::One(a) => Ok(a),
            Self::ArgsKargs { mut args, kwargs } if args.len() == 1 && kwargs.is_empty() => {
                Ok(args.pop().expect("length checked"))
            }
            other => Err(ExcType::type_error_arg_count(name, 1, other.count())),
        }
    }

    /// Checks that exactly two positional arguments were passed.
    pub fn get_two_args(self, name: &str) -> RunResult<(Value, Value)> {
        match self {
            Self::Two(a, b) => Ok((a, b)),
            Self::ArgsKargs { mut args, kwargs } if args.len() == 2 && kwargs.is_empty() => {
                let second = args.pop().expect("length checked");
                let first = args.pop().expect("length checked");
                Ok((first, second))
            }
            other => Err(ExcType::type_error_arg_count(name, 2, other.count())),
        }
    }

    /// Checks that one or two positional arguments were passed.
    pub fn get_one_two_args(self, name: &str) -> RunResult<(Value, Option<Value>)> {
        match self {
            Self::One(a) => Ok((a, None)),
            Self::Two(a, b) => Ok((a, Some(b))),
            Self::ArgsKargs { args, kwargs } if kwargs.is_empty() && (1..=2).contains(&args.len()) => {
                let mut iter = args.into_iter();
                let first = iter.next().expect("length checked");
                Ok((first, iter.next()))
            }
            other => {
                let count = other.count();
                if count == 0 {
                    Err(ExcType::type_error_at_least(name, 1, count))
                } else {
                    Err(ExcType::type_error_at_most(name, 2, count))
                }
            }
        }
    }
}
