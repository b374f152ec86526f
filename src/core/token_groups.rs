use indexmap::IndexMap;

use crate::types::TransferEvent;

/// Transfer events grouped by token address.
///
/// Tokens keep the order in which they first appear and every group keeps the
/// input order of its events, so `first`/`last` reflect log-index order when
/// the input is ordered. Groups are only created for observed events and are
/// never empty.
#[derive(Clone, Debug, Default)]
pub struct TokenGroups<'a> {
    groups: IndexMap<&'a str, Vec<&'a TransferEvent>>,
}

impl<'a> TokenGroups<'a> {
    pub fn new(events: impl IntoIterator<Item = &'a TransferEvent>) -> Self {
        let mut groups: IndexMap<&'a str, Vec<&'a TransferEvent>> = IndexMap::new();
        for event in events {
            groups.entry(event.token_address()).or_default().push(event);
        }
        Self { groups }
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn get(&self, token: &str) -> Option<&[&'a TransferEvent]> {
        self.groups.get(token).map(Vec::as_slice)
    }

    pub fn contains(&self, token: &str) -> bool {
        self.groups.contains_key(token)
    }

    pub fn tokens(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.groups.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'a str, &[&'a TransferEvent])> + '_ {
        self.groups
            .iter()
            .map(|(token, events)| (*token, events.as_slice()))
    }
}
