//! Console front-end
//!
//! A [`CommandSender`] for the terminal, the bundled command set and the
//! line loop that feeds stdin into a [`Dispatcher`].

use crate::command::{
    prefix_matches, Action, Argument, ArgumentResult, CommandContext, CommandDescriptor,
    CommandResult, CommandSender, CommandSet, Dispatcher,
};
use crate::error::{CommandError, ConfigError, ConfigResult, DispatchResult, RdispatchError};
use colored::Colorize;
use globset::{Glob, GlobSet, GlobSetBuilder};
use parking_lot::RwLock;
use std::io::{BufRead, Write};
use std::sync::Arc;
use tracing::debug;

/// Sender for lines typed on the console.
///
/// Permission-gated actions are allowed when `command` (for a main
/// action) or `command.action` matches one of the granted glob patterns,
/// for any alias of the command.
pub struct ConsoleSender {
    permissions: GlobSet,
}

impl ConsoleSender {
    pub fn new(patterns: &[String]) -> ConfigResult<Self> {
        let mut builder = GlobSetBuilder::new();
        for pattern in patterns {
            let glob = Glob::new(pattern).map_err(|e| {
                ConfigError::Invalid(format!("Invalid permission pattern '{}': {}", pattern, e))
            })?;
            builder.add(glob);
        }
        let permissions = builder
            .build()
            .map_err(|e| ConfigError::Invalid(format!("Invalid permissions: {}", e)))?;
        Ok(ConsoleSender { permissions })
    }

    /// Whether the granted patterns cover a command or one of its actions
    pub fn allows(&self, command: &str, action: Option<&str>) -> bool {
        if self.permissions.is_match(command) {
            return true;
        }
        match action {
            Some(action) => self.permissions.is_match(format!("{}.{}", command, action)),
            None => false,
        }
    }
}

impl CommandSender for ConsoleSender {
    fn send_message(&self, message: &str) {
        println!("{}", message);
    }

    fn has_permission(&self, descriptor: &CommandDescriptor) -> bool {
        let action = (!descriptor.is_main()).then(|| descriptor.action_name());
        descriptor
            .command_names()
            .iter()
            .any(|name| self.allows(name, action))
    }
}

/// A named area, looked up among the known regions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region(pub String);

/// Register the commands available on the console: `echo`, `sum` and
/// `region` (alias `rg`).
pub fn register_builtin_commands(dispatcher: &Dispatcher) -> DispatchResult<()> {
    let echo = CommandSet::new().action(Action::main("echo").rest::<String>().handler(
        |sender, args| {
            let words: Vec<&str> = args.values::<String>(0).into_iter().map(String::as_str).collect();
            sender.send_message(&words.join(" "));
            Ok(())
        },
    ));
    dispatcher.register(&echo, &["echo"])?;

    let sum = CommandSet::new().action(Action::main("sum").rest::<i64>().handler(
        |sender, args| {
            let total: i64 = args.values::<i64>(0).into_iter().sum();
            sender.send_message(&total.to_string());
            Ok(())
        },
    ));
    dispatcher.register(&sum, &["sum"])?;

    let regions = Arc::new(RwLock::new(vec!["home".to_string(), "spawn".to_string()]));
    bind_region_type(dispatcher, &regions);
    dispatcher.register(&region_commands(&regions), &["region", "rg"])?;

    Ok(())
}

fn bind_region_type(dispatcher: &Dispatcher, regions: &Arc<RwLock<Vec<String>>>) {
    let known = Arc::clone(regions);
    dispatcher.bind_parser::<Region, _>(
        move |_: &CommandContext, _: usize, text: Option<&str>| -> Option<Argument<Region>> {
            let name = text.filter(|t| !t.is_empty())?;
            let argument = if known.read().iter().any(|r| r == name) {
                Argument::success(Region(name.to_string()))
            } else {
                Argument::fail()
            };
            Some(argument)
        },
    );

    let known = Arc::clone(regions);
    dispatcher.bind_completer::<Region, _>(move |_: &CommandContext, partial: &str| {
        prefix_matches(known.read().iter(), partial)
    });
}

fn region_commands(regions: &Arc<RwLock<Vec<String>>>) -> CommandSet {
    let list = Arc::clone(regions);
    let create = Arc::clone(regions);
    let delete = Arc::clone(regions);

    CommandSet::new()
        .action(Action::main("info").param::<Region>().handler(|sender, args| {
            match args.get::<Region>(0) {
                Some(region) => {
                    sender.send_message(&format!("Region {}", region.0));
                    Ok(true)
                }
                None => Ok(false),
            }
        }))
        .action(Action::new("list").handler(move |sender, _| {
            for region in list.read().iter() {
                sender.send_message(region);
            }
            Ok(())
        }))
        .action(Action::new("create").param::<String>().handler(move |sender, args| {
            let Some(name) = args.get::<String>(0) else {
                return Ok(false);
            };
            let mut regions = create.write();
            if regions.contains(name) {
                sender.send_message(&format!("Region {} already exists", name));
                return Ok(false);
            }
            regions.push(name.clone());
            sender.send_message(&format!("Created region {}", name));
            Ok(true)
        }))
        .action(
            Action::new("delete")
                .permission()
                .param::<Region>()
                .handler(move |sender, args| {
                    let Some(region) = args.get::<Region>(0) else {
                        return Ok(false);
                    };
                    delete.write().retain(|r| r != &region.0);
                    sender.send_message(&format!("Deleted region {}", region.0));
                    Ok(true)
                }),
        )
}

/// Dispatch one line and report anything the handler did not
pub fn execute_line(
    dispatcher: &Dispatcher,
    sender: &dyn CommandSender,
    line: &str,
) -> DispatchResult<CommandResult> {
    let outcome = dispatcher.call(sender, line);
    match &outcome {
        Ok(result) if !result.is_success() => sender.send_message(&describe_failure(result)),
        Err(CommandError::NotFound) => {
            sender.send_message(&format!("Unknown command: {}", line.trim()).red().to_string())
        }
        Err(e) => sender.send_message(&e.to_string().red().to_string()),
        Ok(_) => {}
    }
    outcome
}

fn describe_failure(result: &CommandResult) -> String {
    let message = match result.first_failure() {
        Some(argument) => match (argument.result(), argument.text()) {
            (ArgumentResult::Absent, None) | (ArgumentResult::Fail, None) => {
                "Missing argument".to_string()
            }
            (_, Some(text)) => format!("Invalid argument: {}", text),
            (ArgumentResult::Success, None) => "Command failed".to_string(),
        },
        None => "Command failed".to_string(),
    };
    message.yellow().to_string()
}

/// Feed every line of `reader` to the dispatcher until end of input.
///
/// Returns the number of lines dispatched. Errors from individual lines
/// are reported to the sender and do not stop the loop.
pub fn run_console<R: BufRead>(
    dispatcher: &Dispatcher,
    sender: &dyn CommandSender,
    reader: R,
    prompt: Option<&str>,
) -> Result<usize, RdispatchError> {
    let mut dispatched = 0;
    show_prompt(prompt)?;

    for line in reader.lines() {
        let line = line?;
        if !line.trim().is_empty() {
            if let Err(e) = execute_line(dispatcher, sender, &line) {
                debug!(error = %e, "line failed");
            }
            dispatched += 1;
        }
        show_prompt(prompt)?;
    }

    Ok(dispatched)
}

fn show_prompt(prompt: Option<&str>) -> std::io::Result<()> {
    if let Some(prompt) = prompt {
        let mut stdout = std::io::stdout();
        write!(stdout, "{}", prompt)?;
        stdout.flush()?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    #[derive(Default)]
    struct Recorder {
        messages: Mutex<Vec<String>>,
        admin: bool,
    }

    impl CommandSender for Recorder {
        fn send_message(&self, message: &str) {
            self.messages.lock().push(message.to_string());
        }

        fn has_permission(&self, _descriptor: &CommandDescriptor) -> bool {
            self.admin
        }
    }

    fn dispatcher() -> Dispatcher {
        let dispatcher = Dispatcher::new();
        register_builtin_commands(&dispatcher).unwrap();
        dispatcher
    }

    #[test]
    fn test_console_permissions() {
        let sender = ConsoleSender::new(&["region.*".to_string(), "sum".to_string()]).unwrap();
        assert!(sender.allows("region", Some("delete")));
        assert!(!sender.allows("region", None));
        assert!(sender.allows("sum", None));
        assert!(sender.allows("sum", Some("any")));
        assert!(!sender.allows("echo", None));
    }

    #[test]
    fn test_console_permission_on_alias() {
        let dispatcher = dispatcher();
        let sender = ConsoleSender::new(&["rg.*".to_string()]).unwrap();

        let result = dispatcher.call(&sender, "/region delete home").unwrap();
        assert!(result.is_success());
        assert_eq!(dispatcher.complete(&sender, "/region de"), vec!["delete"]);
    }

    #[test]
    fn test_invalid_permission_pattern() {
        assert!(ConsoleSender::new(&["[".to_string()]).is_err());
    }

    #[test]
    fn test_echo_and_sum() {
        let dispatcher = dispatcher();
        let sender = Recorder::default();

        assert!(execute_line(&dispatcher, &sender, "/echo hello  world").unwrap().is_success());
        assert!(execute_line(&dispatcher, &sender, "sum 1 2 39").unwrap().is_success());
        assert_eq!(*sender.messages.lock(), vec!["hello world", "42"]);
    }

    #[test]
    fn test_sum_with_bad_number_fails() {
        let dispatcher = dispatcher();
        let sender = Recorder::default();

        let result = execute_line(&dispatcher, &sender, "sum 1 x").unwrap();
        assert!(!result.is_success());
        assert!(sender.messages.lock()[1].contains("Invalid argument: x"));
    }

    #[test]
    fn test_region_lifecycle() {
        let dispatcher = dispatcher();
        let admin = Recorder {
            admin: true,
            ..Recorder::default()
        };

        assert!(execute_line(&dispatcher, &admin, "/rg create spb").unwrap().is_success());
        assert!(execute_line(&dispatcher, &admin, "/region spb").unwrap().is_success());
        assert!(execute_line(&dispatcher, &admin, "/region delete spb").unwrap().is_success());
        assert!(!execute_line(&dispatcher, &admin, "/region spb").unwrap().is_success());
    }

    #[test]
    fn test_region_delete_requires_permission() {
        let dispatcher = dispatcher();
        let sender = Recorder::default();

        let result = execute_line(&dispatcher, &sender, "/region delete home");
        assert!(matches!(result, Err(CommandError::Access)));
    }

    #[test]
    fn test_region_completion() {
        let dispatcher = dispatcher();
        let sender = Recorder::default();

        assert_eq!(dispatcher.complete(&sender, "/region sp"), vec!["spawn"]);
        assert_eq!(dispatcher.complete(&sender, "/region l"), vec!["list"]);
        assert_eq!(dispatcher.complete(&sender, "/r"), vec!["region", "rg"]);
    }

    #[test]
    fn test_run_console_counts_lines() {
        let dispatcher = dispatcher();
        let sender = Recorder::default();
        let input = "echo a\n\nmissing\nsum 2 2\n";

        let count = run_console(&dispatcher, &sender, input.as_bytes(), None).unwrap();
        assert_eq!(count, 3);
        let messages = sender.messages.lock();
        assert_eq!(messages[0], "a");
        assert!(messages[1].contains("Unknown command: missing"));
        assert_eq!(messages[2], "4");
    }
}
