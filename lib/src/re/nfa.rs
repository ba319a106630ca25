/*! Non-deterministic finite automata built with Thompson's construction.

States live in an arena (a `Vec` inside [`Nfa`]) and are referenced by
[`StateId`] handles. Transitions are stored in the source state and point to
their destinations by handle, which allows cycles (like the ones produced by
`*`) without any kind of shared ownership.
*/

use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};

use crate::re::postfix::to_postfix;
use crate::re::tokenizer::Token;
use crate::re::Error;

/// Identifies a state in a [`Nfa`].
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct StateId(u32);

impl StateId {
    #[inline]
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

impl From<usize> for StateId {
    fn from(value: usize) -> Self {
        Self(value.try_into().expect("too many NFA states"))
    }
}

impl Display for StateId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "s{}", self.0)
    }
}

/// The label of a transition in the NFA.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum Label {
    /// Transition that doesn't consume any symbol.
    Epsilon,
    /// Transition that consumes the given symbol.
    Symbol(char),
}

#[derive(Debug, Default, Clone)]
struct State {
    epsilon: Vec<StateId>,
    symbols: Vec<(char, StateId)>,
}

/// A non-deterministic finite automaton with epsilon transitions.
///
/// The automaton has a single start state and a single accepting state. It
/// is immutable once built.
#[derive(Debug, Clone)]
pub struct Nfa {
    start: StateId,
    accept: StateId,
    states: Vec<State>,
}

impl Nfa {
    /// Builds the NFA for the given tokens, which must be in postfix order.
    ///
    /// See [`crate::re::postfix::to_postfix`].
    pub fn from_postfix(postfix: &[Token]) -> Result<Self, Error> {
        let mut builder = Builder::new();
        for token in postfix {
            builder.push(token)?;
        }
        builder.finish()
    }

    /// The start state.
    #[inline]
    pub fn start(&self) -> StateId {
        self.start
    }

    /// The accepting state.
    #[inline]
    pub fn accept(&self) -> StateId {
        self.accept
    }

    /// Number of states in the automaton. State handles go from 0 to
    /// `num_states() - 1`.
    #[inline]
    pub fn num_states(&self) -> usize {
        self.states.len()
    }

    /// Returns the destinations of the epsilon transitions leaving `state`.
    #[inline]
    pub fn epsilon_transitions(
        &self,
        state: StateId,
    ) -> impl Iterator<Item = StateId> + '_ {
        self.states[state.index()].epsilon.iter().copied()
    }

    /// Returns the destinations of the transitions leaving `state` that
    /// consume `symbol`.
    #[inline]
    pub fn transitions(
        &self,
        state: StateId,
        symbol: char,
    ) -> impl Iterator<Item = StateId> + '_ {
        self.states[state.index()]
            .symbols
            .iter()
            .filter_map(move |(c, dst)| (*c == symbol).then_some(*dst))
    }

    /// Returns the destinations of the transitions leaving `state` with the
    /// given label.
    pub fn transitions_with(
        &self,
        state: StateId,
        label: Label,
    ) -> Vec<StateId> {
        match label {
            Label::Epsilon => self.epsilon_transitions(state).collect(),
            Label::Symbol(c) => self.transitions(state, c).collect(),
        }
    }

    /// Returns all the symbols that appear in some transition of the
    /// automaton, in ascending order. Epsilon is not a symbol.
    pub fn alphabet(&self) -> BTreeSet<char> {
        self.states
            .iter()
            .flat_map(|state| state.symbols.iter().map(|(c, _)| *c))
            .collect()
    }

    /// Total number of transitions, including epsilon transitions.
    pub fn num_transitions(&self) -> usize {
        self.states
            .iter()
            .map(|state| state.epsilon.len() + state.symbols.len())
            .sum()
    }
}

/// Builds the NFA for a pattern.
pub fn regex_to_nfa(pattern: &str) -> Result<Nfa, Error> {
    Nfa::from_postfix(to_postfix(pattern)?.as_slice())
}

/// A partially built automaton, identified by its start and accepting
/// states.
#[derive(Debug, Clone, Copy)]
struct Fragment {
    start: StateId,
    accept: StateId,
}

/// Thompson's construction.
///
/// Each token in the postfix expression either pushes a new fragment into
/// the stack (literals), or pops one or two fragments and pushes a new one
/// that combines them (operators).
struct Builder {
    states: Vec<State>,
    stack: Vec<Fragment>,
}

impl Builder {
    fn new() -> Self {
        Self { states: Vec::new(), stack: Vec::new() }
    }

    fn new_state(&mut self) -> StateId {
        let id = StateId::from(self.states.len());
        self.states.push(State::default());
        id
    }

    fn add_transition(&mut self, src: StateId, label: Label, dst: StateId) {
        let state = &mut self.states[src.index()];
        match label {
            Label::Epsilon => {
                if !state.epsilon.contains(&dst) {
                    state.epsilon.push(dst);
                }
            }
            Label::Symbol(c) => {
                if !state.symbols.contains(&(c, dst)) {
                    state.symbols.push((c, dst));
                }
            }
        }
    }

    /// Pops the `n` topmost fragments from the stack, returning an error if
    /// there are not enough fragments for `operator`.
    fn pop_operands<const N: usize>(
        &mut self,
        operator: char,
    ) -> Result<[Fragment; N], Error> {
        if self.stack.len() < N {
            return Err(Error::OperatorArity {
                operator,
                expected: N,
                found: self.stack.len(),
            });
        }
        let operands = self.stack.split_off(self.stack.len() - N);
        // The length of `operands` is exactly N at this point.
        Ok(std::array::from_fn(|i| operands[i]))
    }

    fn push(&mut self, token: &Token) -> Result<(), Error> {
        let fragment = match token {
            Token::Literal { symbol, .. } => {
                let start = self.new_state();
                let accept = self.new_state();
                self.add_transition(start, Label::Symbol(*symbol), accept);
                Fragment { start, accept }
            }
            Token::Concat => {
                let [f1, f2] = self.pop_operands('.')?;
                self.add_transition(f1.accept, Label::Epsilon, f2.start);
                Fragment { start: f1.start, accept: f2.accept }
            }
            Token::Union => {
                let [f1, f2] = self.pop_operands('|')?;
                let start = self.new_state();
                let accept = self.new_state();
                self.add_transition(start, Label::Epsilon, f1.start);
                self.add_transition(start, Label::Epsilon, f2.start);
                self.add_transition(f1.accept, Label::Epsilon, accept);
                self.add_transition(f2.accept, Label::Epsilon, accept);
                Fragment { start, accept }
            }
            Token::Star => {
                let [f] = self.pop_operands('*')?;
                let start = self.new_state();
                let accept = self.new_state();
                // Enter the body.
                self.add_transition(start, Label::Epsilon, f.start);
                // Zero repetitions.
                self.add_transition(start, Label::Epsilon, accept);
                // Repeat.
                self.add_transition(f.accept, Label::Epsilon, f.start);
                // Exit.
                self.add_transition(f.accept, Label::Epsilon, accept);
                Fragment { start, accept }
            }
            // Parentheses are removed by the postfix conversion, they can't
            // appear in a well-formed postfix expression.
            Token::LeftParen | Token::RightParen => {
                return Err(Error::UnbalancedParentheses)
            }
        };

        self.stack.push(fragment);
        Ok(())
    }

    fn finish(mut self) -> Result<Nfa, Error> {
        if self.stack.len() != 1 {
            return Err(Error::MalformedExpression {
                fragments: self.stack.len(),
            });
        }
        let Fragment { start, accept } = self.stack.remove(0);
        Ok(Nfa { start, accept, states: self.states })
    }
}
