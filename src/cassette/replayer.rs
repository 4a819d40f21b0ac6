//! Serves recorded interactions back in order.

use std::collections::{BTreeMap, VecDeque};

use super::format::{Cassette, Interaction};

/// Interactions of one cassette, queued per `(port, method)`.
///
/// Calls to different methods may interleave freely; calls to the same
/// method are answered in recording order.
pub struct CassetteReplayer {
    queues: BTreeMap<(String, String), VecDeque<Interaction>>,
}

impl CassetteReplayer {
    /// Queues every interaction of `cassette`.
    #[must_use]
    pub fn new(cassette: &Cassette) -> Self {
        let mut queues: BTreeMap<(String, String), VecDeque<Interaction>> = BTreeMap::new();
        for interaction in &cassette.interactions {
            queues
                .entry((interaction.port.clone(), interaction.method.clone()))
                .or_default()
                .push_back(interaction.clone());
        }
        Self { queues }
    }

    /// Number of interactions not yet served.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.queues.values().map(VecDeque::len).sum()
    }

    /// `port::method` pairs that still have unserved interactions.
    #[must_use]
    pub fn unconsumed(&self) -> Vec<String> {
        self.queues
            .iter()
            .filter(|(_, queue)| !queue.is_empty())
            .map(|((port, method), queue)| format!("{port}::{method} ({})", queue.len()))
            .collect()
    }

    /// Takes the next interaction recorded for `port` and `method`.
    ///
    /// # Panics
    ///
    /// Panics with a message starting "Cassette exhausted" when the cassette
    /// holds no further interaction for the pair, listing what remains.
    pub fn next_interaction(&mut self, port: &str, method: &str) -> Interaction {
        let key = (port.to_string(), method.to_string());
        if let Some(next) = self.queues.get_mut(&key).and_then(VecDeque::pop_front) {
            return next;
        }
        let recorded = self.queues.contains_key(&key);
        let left = self.unconsumed();
        panic!(
            "Cassette exhausted: {} for port={port:?} method={method:?}. Still queued: [{}]",
            if recorded { "every recorded call was already served" } else { "no interactions recorded" },
            left.join(", ")
        );
    }
}
