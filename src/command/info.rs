//! Registration metadata for commands

use crate::dispatch::error::UsageError;

/// Help groups a command (or topic node) can be listed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Group {
    Auth,
    Resource,
    SubResource,
    Plugin,
    Shorthands,
}

impl Group {
    /// Heading used when rendering this group in help output.
    pub fn label(&self) -> &'static str {
        match self {
            Group::Auth => "Auth commands:",
            Group::Resource => "Manage resources:",
            Group::SubResource => "Manage sub-resources:",
            Group::Plugin => "Plugins:",
            Group::Shorthands => "Shorthand commands:",
        }
    }

    /// Group assigned to a tree node created at the given depth
    /// (1 = directly under the root).
    pub fn for_depth(depth: usize) -> Group {
        if depth <= 1 {
            Group::Resource
        } else {
            Group::SubResource
        }
    }
}

/// Immutable-after-registration metadata describing a command.
///
/// `name` is the dash-joined flat name (`target-add`); the tree builder
/// derives the hierarchical path from it. `usage` holds only the argument
/// template (`<label> <url>`); help rendering prefixes the program name and
/// invocation path. Argument bounds use `None` as the "arbitrary" sentinel.
#[derive(Debug, Clone, Default)]
pub struct CommandInfo {
    pub name: String,
    pub usage: String,
    pub desc: String,
    pub min_args: Option<usize>,
    pub max_args: Option<usize>,
    pub disabled: bool,
    pub hidden: bool,
    pub only_append_on_root: bool,
    pub group: Option<Group>,
    pub disable_flag_parsing: bool,
    pub parse_first_flags_only: bool,
    pub silence_usage: bool,
}

impl CommandInfo {
    pub fn new(name: impl Into<String>, desc: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            desc: desc.into(),
            ..Default::default()
        }
    }

    /// Argument template shown after the invocation path in usage lines.
    pub fn usage(mut self, usage: impl Into<String>) -> Self {
        self.usage = usage.into();
        self
    }

    /// Bounds on positional argument count. `min >= max` means "at least
    /// `min`" (open-ended maximum); leave unset for arbitrary arguments.
    pub fn args(mut self, min: usize, max: usize) -> Self {
        self.min_args = Some(min);
        self.max_args = Some(max);
        self
    }

    pub fn at_least(mut self, min: usize) -> Self {
        self.min_args = Some(min);
        self.max_args = None;
        self
    }

    pub fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    pub fn only_append_on_root(mut self) -> Self {
        self.only_append_on_root = true;
        self
    }

    pub fn group(mut self, group: Group) -> Self {
        self.group = Some(group);
        self
    }

    pub fn disable_flag_parsing(mut self) -> Self {
        self.disable_flag_parsing = true;
        self
    }

    pub fn parse_first_flags_only(mut self) -> Self {
        self.parse_first_flags_only = true;
        self
    }

    pub fn silence_usage(mut self) -> Self {
        self.silence_usage = true;
        self
    }

    /// First line of the description, used as the short summary.
    pub fn short_desc(&self) -> &str {
        self.desc.lines().next().unwrap_or("").trim()
    }
}

/// Argument-count enforcement derived from [`CommandInfo`] bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgPolicy {
    /// No counting at all.
    Arbitrary,
    /// Open-ended minimum: any count `>= min` is accepted.
    AtLeast(usize),
    /// Inclusive range.
    Range(usize, usize),
}

impl ArgPolicy {
    pub fn from_info(info: &CommandInfo) -> Self {
        match (info.min_args, info.max_args) {
            (None, _) => ArgPolicy::Arbitrary,
            (Some(min), Some(max)) if max > min => ArgPolicy::Range(min, max),
            (Some(min), _) => ArgPolicy::AtLeast(min),
        }
    }

    pub fn validate(&self, count: usize) -> Result<(), UsageError> {
        match *self {
            ArgPolicy::Arbitrary => Ok(()),
            ArgPolicy::AtLeast(min) if count < min => Err(UsageError::new(format!(
                "requires at least {min} argument(s), received {count}"
            ))),
            ArgPolicy::AtLeast(_) => Ok(()),
            ArgPolicy::Range(min, max) if count < min || count > max => {
                Err(UsageError::new(format!(
                    "accepts between {min} and {max} argument(s), received {count}"
                )))
            }
            ArgPolicy::Range(..) => Ok(()),
        }
    }
}

impl Default for ArgPolicy {
    fn default() -> Self {
        ArgPolicy::Arbitrary
    }
}
