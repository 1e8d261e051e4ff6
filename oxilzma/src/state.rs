//! LZMA state machine.
//!
//! Twelve states summarize the kinds of the last few symbols. They select
//! which probability slots the next decisions use and whether a literal is
//! decoded in matched mode.

/// Number of states in the LZMA state machine.
pub const NUM_STATES: usize = 12;

/// Recent-history state. Names read oldest to newest; `Rep` is a long rep,
/// `ShortRep` a one-byte rep0 copy and `NonLit` any non-literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum State {
    /// Two or more literals.
    #[default]
    LitLit = 0,
    /// Match, literal, literal.
    MatchLitLit = 1,
    /// Rep, literal, literal.
    RepLitLit = 2,
    /// Short rep, literal, literal.
    ShortRepLitLit = 3,
    /// Match, literal.
    MatchLit = 4,
    /// Rep, literal.
    RepLit = 5,
    /// Short rep, literal.
    ShortRepLit = 6,
    /// Literal, match.
    LitMatch = 7,
    /// Literal, long rep.
    LitLongRep = 8,
    /// Literal, short rep.
    LitShortRep = 9,
    /// Non-literal, match.
    NonLitMatch = 10,
    /// Non-literal, rep.
    NonLitRep = 11,
}

/// The kind of symbol that drives a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// A literal byte.
    Literal,
    /// A match with an explicit distance.
    Match,
    /// A long repeat of one of the four recent distances.
    Rep,
    /// A one-byte repeat of the most recent distance.
    ShortRep,
}

impl State {
    /// Every state in index order.
    pub const ALL: [State; NUM_STATES] = [
        State::LitLit,
        State::MatchLitLit,
        State::RepLitLit,
        State::ShortRepLitLit,
        State::MatchLit,
        State::RepLit,
        State::ShortRepLit,
        State::LitMatch,
        State::LitLongRep,
        State::LitShortRep,
        State::NonLitMatch,
        State::NonLitRep,
    ];

    /// Index into per-state probability tables.
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Whether the most recent symbol was a literal.
    #[inline]
    pub fn is_literal(self) -> bool {
        (self as u8) < 7
    }

    /// State after a literal.
    #[inline]
    pub fn after_literal(self) -> Self {
        match self {
            State::LitLit | State::MatchLitLit | State::RepLitLit | State::ShortRepLitLit => {
                State::LitLit
            }
            State::MatchLit => State::MatchLitLit,
            State::RepLit => State::RepLitLit,
            State::ShortRepLit => State::ShortRepLitLit,
            State::LitMatch | State::NonLitMatch => State::MatchLit,
            State::LitLongRep | State::NonLitRep => State::RepLit,
            State::LitShortRep => State::ShortRepLit,
        }
    }

    /// State after a match.
    #[inline]
    pub fn after_match(self) -> Self {
        if self.is_literal() {
            State::LitMatch
        } else {
            State::NonLitMatch
        }
    }

    /// State after a long rep.
    #[inline]
    pub fn after_rep(self) -> Self {
        if self.is_literal() {
            State::LitLongRep
        } else {
            State::NonLitRep
        }
    }

    /// State after a short rep.
    #[inline]
    pub fn after_short_rep(self) -> Self {
        if self.is_literal() {
            State::LitShortRep
        } else {
            State::NonLitRep
        }
    }

    /// State after a symbol of the given kind.
    pub fn next(self, transition: Transition) -> Self {
        match transition {
            Transition::Literal => self.after_literal(),
            Transition::Match => self.after_match(),
            Transition::Rep => self.after_rep(),
            Transition::ShortRep => self.after_short_rep(),
        }
    }
}
