/*! Deterministic finite automata built with the subset construction.

Each state in the DFA corresponds to a set of NFA states. The identity of a
DFA state is the set of NFA states it represents: two DFA states are the
same if and only if they represent the same set. Sets of NFA states are
represented by [`StateSet`], a bitmap with one bit per NFA state, which is
a canonical encoding that can be used directly as a hash map key.

Only the states reachable from the start state are created. The resulting
automaton is not minimized.
*/

use std::collections::VecDeque;
use std::fmt::{Display, Formatter};

use bitvec::vec::BitVec;
use rustc_hash::FxHashMap;

use crate::re::nfa::{Nfa, StateId};

/// A set of NFA states.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct StateSet(BitVec);

impl StateSet {
    /// Creates an empty set for an NFA with `num_states` states.
    pub fn new(num_states: usize) -> Self {
        Self(BitVec::repeat(false, num_states))
    }

    /// Adds a state to the set.
    ///
    /// Returns `true` if the state didn't exist in the set and was added,
    /// and `false` if it already existed.
    #[inline]
    pub fn insert(&mut self, state: StateId) -> bool {
        !self.0.replace(state.index(), true)
    }

    #[inline]
    pub fn contains(&self, state: StateId) -> bool {
        self.0.get(state.index()).map(|bit| *bit).unwrap_or(false)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.not_any()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.count_ones()
    }

    /// Returns the states in the set in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = StateId> + '_ {
        self.0.iter_ones().map(StateId::from)
    }
}

/// Returns the epsilon closure of `states`.
///
/// The epsilon closure is the smallest superset of `states` that contains
/// every state reachable from `states` by following epsilon transitions
/// only.
pub fn epsilon_closure(nfa: &Nfa, states: &StateSet) -> StateSet {
    let mut closure = states.clone();
    let mut stack: Vec<StateId> = states.iter().collect();

    while let Some(state) = stack.pop() {
        for next in nfa.epsilon_transitions(state) {
            if closure.insert(next) {
                stack.push(next);
            }
        }
    }

    closure
}

/// Returns the set of states reachable from any of the states in `states`
/// by a transition that consumes `symbol`.
pub fn move_on(nfa: &Nfa, states: &StateSet, symbol: char) -> StateSet {
    let mut result = StateSet::new(nfa.num_states());
    for state in states.iter() {
        for next in nfa.transitions(state, symbol) {
            result.insert(next);
        }
    }
    result
}

/// Identifies a state in a [`Dfa`].
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct DfaStateId(u32);

impl DfaStateId {
    #[inline]
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

impl From<usize> for DfaStateId {
    fn from(value: usize) -> Self {
        Self(value.try_into().expect("too many DFA states"))
    }
}

impl Display for DfaStateId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "d{}", self.0)
    }
}

#[derive(Debug, Clone)]
struct DfaState {
    subset: StateSet,
    accepting: bool,
    transitions: FxHashMap<char, DfaStateId>,
}

/// A deterministic finite automaton.
///
/// The transition table is partial: a missing transition means that the
/// input is rejected from that state. The start state is always the first
/// one, and the rest are numbered in the order they were discovered, which
/// is deterministic for a given NFA.
#[derive(Debug, Clone)]
pub struct Dfa {
    states: Vec<DfaState>,
    alphabet: Vec<char>,
}

impl Dfa {
    /// The start state.
    #[inline]
    pub fn start(&self) -> DfaStateId {
        DfaStateId(0)
    }

    /// Returns the state reached from `state` after consuming `symbol`, or
    /// `None` if there is no such transition.
    #[inline]
    pub fn step(&self, state: DfaStateId, symbol: char) -> Option<DfaStateId> {
        self.states[state.index()].transitions.get(&symbol).copied()
    }

    /// Returns true if `state` is an accepting state.
    #[inline]
    pub fn is_accepting(&self, state: DfaStateId) -> bool {
        self.states[state.index()].accepting
    }

    /// Number of states in the automaton.
    #[inline]
    pub fn num_states(&self) -> usize {
        self.states.len()
    }

    /// Symbols that appear in the source NFA, in ascending order.
    #[inline]
    pub fn alphabet(&self) -> &[char] {
        self.alphabet.as_slice()
    }

    /// Returns the accepting states in ascending order.
    pub fn accepting_states(&self) -> impl Iterator<Item = DfaStateId> + '_ {
        self.states
            .iter()
            .enumerate()
            .filter(|(_, state)| state.accepting)
            .map(|(i, _)| DfaStateId::from(i))
    }

    /// Returns the NFA states represented by `state`.
    pub fn subset(&self, state: DfaStateId) -> &StateSet {
        &self.states[state.index()].subset
    }

    /// Returns the transitions leaving `state`, sorted by symbol.
    pub fn transitions(&self, state: DfaStateId) -> Vec<(char, DfaStateId)> {
        let mut transitions: Vec<_> = self.states[state.index()]
            .transitions
            .iter()
            .map(|(symbol, dst)| (*symbol, *dst))
            .collect();
        transitions.sort_unstable();
        transitions
    }

    /// Total number of transitions in the automaton.
    pub fn num_transitions(&self) -> usize {
        self.states.iter().map(|state| state.transitions.len()).sum()
    }
}

/// Converts a NFA into a DFA using the subset construction.
pub fn nfa_to_dfa(nfa: &Nfa) -> Dfa {
    let alphabet: Vec<char> = nfa.alphabet().into_iter().collect();

    let mut start = StateSet::new(nfa.num_states());
    start.insert(nfa.start());

    let mut states: Vec<DfaState> = Vec::new();
    let mut ids: FxHashMap<StateSet, DfaStateId> = FxHashMap::default();
    let mut unmarked: VecDeque<DfaStateId> = VecDeque::new();

    let mut add_state = |subset: StateSet,
                         states: &mut Vec<DfaState>,
                         unmarked: &mut VecDeque<DfaStateId>|
     -> DfaStateId {
        if let Some(id) = ids.get(&subset) {
            return *id;
        }
        let id = DfaStateId::from(states.len());
        ids.insert(subset.clone(), id);
        states.push(DfaState {
            accepting: subset.contains(nfa.accept()),
            subset,
            transitions: FxHashMap::default(),
        });
        unmarked.push_back(id);
        id
    };

    add_state(epsilon_closure(nfa, &start), &mut states, &mut unmarked);

    while let Some(current) = unmarked.pop_front() {
        for symbol in alphabet.iter().copied() {
            let next = epsilon_closure(
                nfa,
                &move_on(nfa, &states[current.index()].subset, symbol),
            );
            // An empty set means that `symbol` is rejected from the current
            // state, no transition is recorded.
            if next.is_empty() {
                continue;
            }
            let next = add_state(next, &mut states, &mut unmarked);
            states[current.index()].transitions.insert(symbol, next);
        }
    }

    Dfa { states, alphabet }
}
