//! Class attribute helpers
//!
//! Every mutation here is a no-op when the target is absent (`None`, or a
//! handle the arena does not know).

use crate::arena::DomArena;
use crate::types::NodeId;
use ahash::{AHashMap, AHashSet};
use std::collections::HashMap;
use std::hash::BuildHasher;

/// One argument to [`class_names`]
///
/// Strings contribute their whitespace-separated tokens, lists flatten,
/// maps contribute the keys whose flag is `true`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ClassArg {
    #[default]
    Empty,
    Token(String),
    List(Vec<ClassArg>),
    Map(Vec<(String, bool)>),
}

impl ClassArg {
    /// Normalized tokens, in argument order
    pub fn tokens(&self) -> Vec<String> {
        self.partition().0
    }

    // Map iteration order is unspecified; sort for stable output
    fn from_entries(map: impl IntoIterator<Item = (String, bool)>) -> Self {
        let mut entries: Vec<(String, bool)> = map.into_iter().collect();
        entries.sort();
        ClassArg::Map(entries)
    }

    /// Tokens switched on, and map keys explicitly switched off
    fn partition(&self) -> (Vec<String>, Vec<String>) {
        let mut on = Vec::new();
        let mut off = Vec::new();
        let mut stack = vec![self];
        while let Some(arg) = stack.pop() {
            match arg {
                ClassArg::Empty => {}
                ClassArg::Token(value) => {
                    on.extend(value.split_whitespace().map(str::to_string));
                }
                ClassArg::List(items) => stack.extend(items.iter().rev()),
                ClassArg::Map(entries) => {
                    for (name, flag) in entries {
                        let tokens = name.split_whitespace().map(str::to_string);
                        if *flag {
                            on.extend(tokens);
                        } else {
                            off.extend(tokens);
                        }
                    }
                }
            }
        }
        (on, off)
    }
}

impl From<&str> for ClassArg {
    fn from(value: &str) -> Self {
        ClassArg::Token(value.to_string())
    }
}

impl From<String> for ClassArg {
    fn from(value: String) -> Self {
        ClassArg::Token(value)
    }
}

impl From<&String> for ClassArg {
    fn from(value: &String) -> Self {
        ClassArg::Token(value.clone())
    }
}

impl<T: Into<ClassArg>> From<Option<T>> for ClassArg {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or_default()
    }
}

impl From<(&str, bool)> for ClassArg {
    fn from((name, on): (&str, bool)) -> Self {
        ClassArg::Map(vec![(name.to_string(), on)])
    }
}

impl<T: Into<ClassArg>> From<Vec<T>> for ClassArg {
    fn from(items: Vec<T>) -> Self {
        ClassArg::List(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<ClassArg>, const N: usize> From<[T; N]> for ClassArg {
    fn from(items: [T; N]) -> Self {
        ClassArg::List(items.into_iter().map(Into::into).collect())
    }
}

impl<S: BuildHasher> From<HashMap<String, bool, S>> for ClassArg {
    fn from(map: HashMap<String, bool, S>) -> Self {
        ClassArg::from_entries(map)
    }
}

impl From<AHashMap<String, bool>> for ClassArg {
    fn from(map: AHashMap<String, bool>) -> Self {
        ClassArg::from_entries(map)
    }
}

/// Build a [`ClassArg::List`] from heterogeneous arguments
///
/// ```
/// let arg = dom::classes!["a", [("b", true), ("c", false)], None::<&str>];
/// assert_eq!(dom::class_names([arg]), "a b");
/// ```
#[macro_export]
macro_rules! classes {
    ($($arg:expr),* $(,)?) => {
        $crate::ClassArg::List(vec![$($crate::ClassArg::from($arg)),*])
    };
}

/// Join truthy entries into one space-separated class string
pub fn class_names<I>(args: I) -> String
where
    I: IntoIterator<Item = ClassArg>,
{
    args.into_iter()
        .flat_map(|arg| arg.tokens())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Either a flag applied to a whole class list, or a per-class flag map
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Toggle {
    Flag(bool, ClassArg),
    Map(Vec<(String, bool)>),
}

impl Toggle {
    pub fn on(classes: impl Into<ClassArg>) -> Self {
        Toggle::Flag(true, classes.into())
    }

    pub fn off(classes: impl Into<ClassArg>) -> Self {
        Toggle::Flag(false, classes.into())
    }

    pub fn map<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, bool)>,
        S: Into<String>,
    {
        Toggle::Map(
            entries
                .into_iter()
                .map(|(name, on)| (name.into(), on))
                .collect(),
        )
    }
}

/// Replace the whole class attribute
pub fn set_class(arena: &mut DomArena, node: Option<NodeId>, classes: impl Into<ClassArg>) {
    let value = class_names([classes.into()]);
    write_tokens(arena, node, |tokens| {
        *tokens = value.split_whitespace().map(str::to_string).collect();
    });
}

/// Add each normalized token not already present
///
/// Map keys flagged `false` are taken off, so the result does not depend
/// on the classes the node started with.
pub fn add_class(arena: &mut DomArena, node: Option<NodeId>, classes: impl Into<ClassArg>) {
    let (wanted, unwanted) = classes.into().partition();
    let unwanted: AHashSet<String> = unwanted.into_iter().collect();
    write_tokens(arena, node, |tokens| {
        tokens.retain(|token| !unwanted.contains(token));
        let mut present: AHashSet<String> = tokens.iter().cloned().collect();
        for token in wanted {
            if present.insert(token.clone()) {
                tokens.push(token);
            }
        }
    });
}

/// Remove every occurrence of each normalized token
pub fn remove_class(arena: &mut DomArena, node: Option<NodeId>, classes: impl Into<ClassArg>) {
    let unwanted: AHashSet<String> = classes.into().tokens().into_iter().collect();
    write_tokens(arena, node, |tokens| {
        tokens.retain(|token| !unwanted.contains(token));
    });
}

pub fn toggle_class(arena: &mut DomArena, node: Option<NodeId>, toggle: Toggle) {
    match toggle {
        Toggle::Flag(true, classes) => add_class(arena, node, classes),
        Toggle::Flag(false, classes) => remove_class(arena, node, classes),
        Toggle::Map(entries) => {
            for (name, on) in entries {
                if on {
                    add_class(arena, node, name);
                } else {
                    remove_class(arena, node, name);
                }
            }
        }
    }
}

pub fn has_class(arena: &DomArena, node: Option<NodeId>, token: &str) -> bool {
    node.and_then(|id| arena.get(id).ok())
        .is_some_and(|n| n.class_list().any(|class| class == token))
}

fn write_tokens<F>(arena: &mut DomArena, node: Option<NodeId>, edit: F)
where
    F: FnOnce(&mut Vec<String>),
{
    let Some(target) = node.and_then(|id| arena.get_mut(id).ok()) else {
        tracing::trace!(?node, "class update skipped, no target");
        return;
    };

    let mut tokens: Vec<String> = target.class_list().map(str::to_string).collect();
    edit(&mut tokens);
    target
        .attributes
        .insert("class".to_string(), tokens.join(" "));
}
