//! Common test fixtures

#![allow(dead_code)]

use parking_lot::Mutex;
use rdispatch::command::{
    prefix_matches, Action, Argument, ArgumentParser, CommandContext, CommandDescriptor,
    CommandSender, CommandSet, Completer, Dispatcher, EnumArgumentParser,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Sender that records messages and answers permission checks with a fixed value
#[derive(Default)]
pub struct SimpleSender {
    pub messages: Mutex<Vec<String>>,
    pub allowed: bool,
}

impl SimpleSender {
    pub fn admin() -> Self {
        SimpleSender {
            allowed: true,
            ..SimpleSender::default()
        }
    }
}

impl CommandSender for SimpleSender {
    fn send_message(&self, message: &str) {
        self.messages.lock().push(message.to_string());
    }

    fn has_permission(&self, _descriptor: &CommandDescriptor) -> bool {
        self.allowed
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimpleEnum {
    Hello,
    World,
}

pub fn simple_enum_parser() -> EnumArgumentParser<SimpleEnum> {
    EnumArgumentParser::new([("hello", SimpleEnum::Hello), ("world", SimpleEnum::World)])
}

/// What the simple command handlers observed
#[derive(Debug, Default)]
pub struct SimpleState {
    pub test: bool,
    pub hello: bool,
    pub integer: i32,
    pub string: Option<String>,
    pub strings: Vec<String>,
    pub argument: Option<Argument>,
    pub argument2: Option<Argument>,
    pub enumm: Option<SimpleEnum>,
}

/// A main action plus one sub-action per kind of parameter
pub fn simple_command(state: &Arc<Mutex<SimpleState>>) -> CommandSet {
    let (s1, s2, s3, s4, s5, s6, s7, s8) = (
        Arc::clone(state),
        Arc::clone(state),
        Arc::clone(state),
        Arc::clone(state),
        Arc::clone(state),
        Arc::clone(state),
        Arc::clone(state),
        Arc::clone(state),
    );

    CommandSet::new()
        .action(Action::main("test").handler(move |_, _| {
            s1.lock().test = true;
            Ok(true)
        }))
        .action(Action::new("hello").handler(move |_, _| {
            s2.lock().hello = true;
            Ok(false)
        }))
        .action(Action::new("integer").param::<i32>().handler(move |_, args| {
            if let Some(value) = args.get::<i32>(0) {
                s3.lock().integer = *value;
            }
            Ok(true)
        }))
        .action(Action::new("string").param::<String>().handler(move |_, args| {
            s4.lock().string = args.get::<String>(0).cloned();
            Ok(())
        }))
        .action(Action::new("collection").rest::<String>().handler(move |_, args| {
            s5.lock().strings = args.values::<String>(0).into_iter().cloned().collect();
            Ok(())
        }))
        .action(Action::new("argument").param::<String>().handler(move |_, args| {
            s6.lock().argument = args.argument(0).cloned();
            Ok(())
        }))
        .action(Action::new("argument2").param::<String>().handler(move |_, args| {
            s7.lock().argument2 = args.argument(0).cloned();
            Ok(())
        }))
        .action(Action::new("enumm").param::<SimpleEnum>().handler(move |_, args| {
            s8.lock().enumm = args.get::<SimpleEnum>(0).copied();
            Ok(())
        }))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
    pub name: String,
}

/// Looks regions up by name; an empty or missing token yields nothing
pub struct RegionArgumentParser;

impl ArgumentParser<Region> for RegionArgumentParser {
    fn parse_argument(
        &self,
        _context: &CommandContext,
        _index: usize,
        text: Option<&str>,
    ) -> Option<Argument<Region>> {
        let name = text.filter(|t| !t.is_empty())?;
        Some(Argument::success(Region {
            name: name.to_string(),
        }))
    }
}

pub const REGIONS: [&str; 4] = ["home", "spawn", "spawn123", "spb"];

pub struct RegionCompleter;

impl Completer for RegionCompleter {
    fn complete(&self, _context: &CommandContext, partial: &str) -> Vec<String> {
        prefix_matches(REGIONS, partial)
    }
}

/// What the region handlers observed
#[derive(Debug, Default)]
pub struct RegionState {
    pub name: Option<String>,
    pub list: Vec<Region>,
}

pub fn region_command(state: &Arc<Mutex<RegionState>>) -> CommandSet {
    let main = Arc::clone(state);
    let list = Arc::clone(state);

    CommandSet::new()
        .action(Action::main("region").param::<Region>().handler(move |_, args| {
            main.lock().name = args.get::<Region>(0).map(|r| r.name.clone());
            Ok(())
        }))
        .action(Action::new("list").rest::<Region>().handler(move |_, args| {
            list.lock().list = args.values::<Region>(0).into_iter().cloned().collect();
            Ok(())
        }))
}

/// Sub-actions only, no main action
pub fn actions_command() -> CommandSet {
    CommandSet::new()
        .action(Action::new("add").handler(|_, _| Ok(())))
        .action(Action::new("addMember").handler(|_, _| Ok(())))
        .action(Action::new("view").handler(|_, _| Ok(())))
        .action(Action::new("list").handler(|_, _| Ok(())))
}

/// Dispatcher with the enum and region types bound
pub fn dispatcher() -> Dispatcher {
    let dispatcher = Dispatcher::new();
    dispatcher.bind_parser::<SimpleEnum, _>(simple_enum_parser());
    dispatcher.bind_parser::<Region, _>(RegionArgumentParser);
    dispatcher.bind_completer::<Region, _>(RegionCompleter);
    dispatcher
}

/// Argument parser that counts how often it ran
pub struct CountingParser(pub Arc<AtomicUsize>);

impl ArgumentParser<u8> for CountingParser {
    fn parse_argument(
        &self,
        _context: &CommandContext,
        _index: usize,
        text: Option<&str>,
    ) -> Option<Argument<u8>> {
        self.0.fetch_add(1, Ordering::SeqCst);
        text.and_then(|t| t.parse().ok()).map(Argument::success)
    }
}

pub fn call(dispatcher: &Dispatcher, line: &str) -> bool {
    dispatcher
        .call(&SimpleSender::default(), line)
        .unwrap()
        .is_success()
}
