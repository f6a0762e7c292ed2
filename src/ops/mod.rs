//! The operation catalogue
//!
//! Registers every built-in command with the dispatcher. Remote-API
//! commands (app lifecycle, service binding, ...) live behind the same
//! [`Command`](crate::command::Command) contract and are registered here
//! as they are ported.

mod auth;
mod plugin_cmd;
mod target;
mod version;

pub use auth::{Login, Logout};
pub use plugin_cmd::{PluginList, PluginRun};
pub use target::{target_label_completion, TargetAdd, TargetList, TargetRemove, TargetSet};
pub use version::Version;

use std::collections::HashMap;
use std::sync::Arc;

use crate::dispatch::{CompletionFn, Dispatcher};
use crate::storage::ConfigStore;

/// Registers topics, commands, wrappers and completions.
pub fn register_all(dispatcher: &mut Dispatcher, store: Arc<ConfigStore>) {
    dispatcher.register_topic(
        "target",
        "Manage named API targets.\n\n\
         A target is a labelled Cirrus API endpoint; every remote command\n\
         runs against the current target.",
    );
    dispatcher.register_topic(
        "plugin",
        "Manage and run cirrus plugins.\n\n\
         Plugins are cirrus-<name> executables discovered from the plugins\n\
         directory and $PATH.",
    );

    let version: Arc<dyn crate::command::Command> = Arc::new(Version);
    dispatcher.register_arc(version.clone());
    dispatcher.register_shorthand(version, "v");

    dispatcher.register(TargetAdd::new(store.clone()));
    dispatcher.register(TargetList::new(store.clone()));
    // `target-select` was the original spelling; keep it alive with a
    // deprecation warning.
    dispatcher.register_deprecated(
        Arc::new(TargetSet::new(store.clone())),
        "target-select",
    );
    dispatcher.register(TargetRemove::new(store.clone()));

    dispatcher.register(Login::new(store.clone()));
    dispatcher.register(Logout::new(store.clone()));

    dispatcher.register(PluginList::new(store.clone()));
    dispatcher.register(PluginRun::new(store.clone()));

    let mut completions: HashMap<String, CompletionFn> = HashMap::new();
    completions.insert("target".to_string(), target_label_completion(store));
    dispatcher.set_completions(completions);
}
