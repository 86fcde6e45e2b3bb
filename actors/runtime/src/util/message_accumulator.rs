// Copyright 2019-2022 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use std::{cell::RefCell, rc::Rc};

/// Accumulates a sequence of messages (e.g. validation failures).
#[derive(Debug, Default)]
pub struct MessageAccumulator {
    /// Accumulated messages.
    /// This is a `Rc<RefCell>` so accumulators derived from `with_prefix()`
    /// accumulate to the same underlying collection.
    msgs: Rc<RefCell<Vec<String>>>,
    /// Optional prefix to all new messages, e.g. describing higher level context.
    prefix: String,
}

impl MessageAccumulator {
    /// Returns a new accumulator backed by the same collection, prefixing each
    /// new message with a formatted string.
    pub fn with_prefix<S: AsRef<str>>(&self, prefix: S) -> Self {
        MessageAccumulator {
            msgs: self.msgs.clone(),
            prefix: self.prefix.to_owned() + prefix.as_ref(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.msgs.borrow().is_empty()
    }

    pub fn messages(&self) -> Vec<String> {
        self.msgs.borrow().to_owned()
    }

    /// Returns the number of accumulated messages.
    pub fn len(&self) -> usize {
        self.msgs.borrow().len()
    }

    /// Adds a message to the accumulator.
    pub fn add<S: AsRef<str>>(&self, msg: S) {
        self.msgs
            .borrow_mut()
            .push(format!("{}{}", self.prefix, msg.as_ref()));
    }

    /// Adds a message if the predicate is false.
    pub fn require<S: AsRef<str>>(&self, predicate: bool, msg: S) {
        if !predicate {
            self.add(msg);
        }
    }

    /// Panics unless the accumulator is empty, with the accumulated messages
    /// in the panic message.
    #[track_caller]
    pub fn assert_empty(&self) {
        assert!(self.is_empty(), "{}", self.messages().join("\n"))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn adds_on_predicate() {
        let acc = MessageAccumulator::default();
        acc.require(true, "balance underflow");
        assert!(acc.is_empty());

        acc.require(false, "tally mismatch");
        assert_eq!(acc.len(), 1);
        assert_eq!(acc.messages(), vec!["tally mismatch"]);
    }

    #[test]
    fn prefixes_share_the_collection() {
        let acc = MessageAccumulator::default();
        acc.add("stale slot");

        let scoped = acc.with_prefix("record a: ");
        scoped.add("missing owner");

        assert_eq!(acc.messages(), vec!["stale slot", "record a: missing owner"]);
        assert_eq!(scoped.len(), 2);
    }
}
