//! # Signatures
//!
//! A [`Signature`] is an ordered tuple of [`Kind`]s, optionally followed by a
//! name used by named registries. A call matches a signature when it has the
//! same arity and each argument's kind is a subkind of the kind in the same
//! position.
//!
//! ## Ordering
//!
//! Signatures are totally ordered so they can key a
//! [`PriorityChain`](crate::chain::PriorityChain): higher total specificity
//! (the sum of kind depths) sorts first, then kind paths lexicographically,
//! then name. When one signature is componentwise more specific than another
//! it always has the higher total, so chain iteration visits specific
//! signatures before generic ones.
//!
//! ## Resolution
//!
//! [`resolve`] keeps the matching signatures that no other matching signature
//! dominates. Exactly one survivor is the answer; several survivors are
//! reported as [`LookupError::Ambiguous`] rather than broken arbitrarily.

use std::cmp::Ordering;
use std::fmt;
use thiserror::Error;

use crate::kind::Kind;

/// Trailing selector for lookups in named registries.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Lookup {
    /// Only signatures registered under this exact name.
    Name(String),
    /// Every named signature, whatever its name.
    All,
}

impl Lookup {
    #[must_use]
    pub fn name(name: impl Into<String>) -> Self {
        Lookup::Name(name.into())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("no component registered for {args}")]
    NotFound { args: String },
    #[error("ambiguous lookup for {args}: {candidates:?} are equally specific")]
    Ambiguous {
        args: String,
        candidates: Vec<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Signature {
    kinds: Vec<&'static Kind>,
    name: Option<String>,
}

impl Signature {
    #[must_use]
    pub fn new(kinds: impl IntoIterator<Item = &'static Kind>) -> Self {
        Self {
            kinds: kinds.into_iter().collect(),
            name: None,
        }
    }

    #[must_use]
    pub fn named(kinds: impl IntoIterator<Item = &'static Kind>, name: impl Into<String>) -> Self {
        Self {
            kinds: kinds.into_iter().collect(),
            name: Some(name.into()),
        }
    }

    #[must_use]
    pub fn kinds(&self) -> &[&'static Kind] {
        &self.kinds
    }

    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    #[must_use]
    pub fn arity(&self) -> usize {
        self.kinds.len()
    }

    /// Sum of the depths of every positional kind.
    #[must_use]
    pub fn specificity(&self) -> usize {
        self.kinds.iter().map(|k| k.depth()).sum()
    }

    /// Does a call with these argument kinds and selector land on this signature?
    #[must_use]
    pub fn matches(&self, args: &[&'static Kind], lookup: Option<&Lookup>) -> bool {
        let name_ok = match (&self.name, lookup) {
            (None, None) => true,
            (Some(_), Some(Lookup::All)) => true,
            (Some(own), Some(Lookup::Name(wanted))) => own == wanted,
            _ => false,
        };
        name_ok
            && args.len() == self.kinds.len()
            && args
                .iter()
                .zip(&self.kinds)
                .all(|(arg, kind)| arg.is_subkind_of(kind))
    }

    /// `self` is strictly more specific than `other` in every position.
    #[must_use]
    pub fn dominates(&self, other: &Signature) -> bool {
        self.kinds.len() == other.kinds.len()
            && self.kinds != other.kinds
            && self
                .kinds
                .iter()
                .zip(&other.kinds)
                .all(|(mine, theirs)| mine.is_subkind_of(theirs))
    }

    fn sort_key(&self) -> (std::cmp::Reverse<usize>, Vec<String>, Option<&str>) {
        (
            std::cmp::Reverse(self.specificity()),
            self.kinds.iter().map(|k| k.path()).collect(),
            self.name.as_deref(),
        )
    }
}

impl Ord for Signature {
    fn cmp(&self, other: &Self) -> Ordering {
        self.sort_key().cmp(&other.sort_key())
    }
}

impl PartialOrd for Signature {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, kind) in self.kinds.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{kind}")?;
        }
        write!(f, ")")?;
        if let Some(name) = &self.name {
            write!(f, "[{name:?}]")?;
        }
        Ok(())
    }
}

pub(crate) fn describe_call(args: &[&'static Kind], lookup: Option<&Lookup>) -> String {
    let kinds: Vec<&str> = args.iter().map(|k| k.name()).collect();
    match lookup {
        None => format!("({})", kinds.join(", ")),
        Some(Lookup::All) => format!("({})[*]", kinds.join(", ")),
        Some(Lookup::Name(name)) => format!("({})[{name:?}]", kinds.join(", ")),
    }
}

/// Pick the single most specific signature matching the call.
pub fn resolve<'a>(
    signatures: impl IntoIterator<Item = &'a Signature>,
    args: &[&'static Kind],
    lookup: Option<&Lookup>,
) -> Result<&'a Signature, LookupError> {
    let candidates: Vec<&Signature> = signatures
        .into_iter()
        .filter(|s| s.matches(args, lookup))
        .collect();

    let winners: Vec<&Signature> = candidates
        .iter()
        .filter(|c| !candidates.iter().any(|other| other.dominates(c)))
        .copied()
        .collect();

    match winners.as_slice() {
        [] => Err(LookupError::NotFound {
            args: describe_call(args, lookup),
        }),
        [one] => Ok(*one),
        many => Err(LookupError::Ambiguous {
            args: describe_call(args, lookup),
            candidates: many.iter().map(|s| s.to_string()).collect(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kind::OBJECT;

    static NUMBER: Kind = Kind::derive("number", &OBJECT);
    static INT: Kind = Kind::derive("int", &NUMBER);
    static TEXT: Kind = Kind::derive("text", &OBJECT);
    static FLOAT: Kind = Kind::derive("float", &NUMBER);

    #[test]
    fn test_exact_kind_wins() {
        let sigs = [Signature::new([&INT]), Signature::new([&TEXT])];
        assert_eq!(resolve(&sigs, &[&TEXT], None).unwrap(), &sigs[1]);
        assert_eq!(resolve(&sigs, &[&INT], None).unwrap(), &sigs[0]);
    }

    #[test]
    fn test_unrelated_kind_is_not_found() {
        let sigs = [Signature::new([&INT]), Signature::new([&TEXT])];
        assert!(matches!(
            resolve(&sigs, &[&FLOAT], None),
            Err(LookupError::NotFound { .. })
        ));
    }

    #[test]
    fn test_most_specific_wins_over_generic() {
        let sigs = [Signature::new([&OBJECT]), Signature::new([&NUMBER])];
        assert_eq!(resolve(&sigs, &[&INT], None).unwrap(), &sigs[1]);
        assert_eq!(resolve(&sigs, &[&TEXT], None).unwrap(), &sigs[0]);
    }

    #[test]
    fn test_crossed_signatures_are_ambiguous() {
        let sigs = [
            Signature::new([&INT, &OBJECT]),
            Signature::new([&OBJECT, &INT]),
        ];
        let err = resolve(&sigs, &[&INT, &INT], None).unwrap_err();
        assert!(matches!(err, LookupError::Ambiguous { ref candidates, .. } if candidates.len() == 2));
    }

    #[test]
    fn test_named_matching() {
        let sig = Signature::named([&OBJECT], "header");
        assert!(sig.matches(&[&INT], Some(&Lookup::name("header"))));
        assert!(sig.matches(&[&INT], Some(&Lookup::All)));
        assert!(!sig.matches(&[&INT], Some(&Lookup::name("footer"))));
        assert!(!sig.matches(&[&INT], None));
        assert!(!Signature::new([&OBJECT]).matches(&[&INT], Some(&Lookup::All)));
    }

    #[test]
    fn test_arity_must_agree() {
        let sig = Signature::new([&OBJECT, &OBJECT]);
        assert!(!sig.matches(&[&INT], None));
        assert!(sig.matches(&[&INT, &TEXT], None));
    }

    #[test]
    fn test_order_puts_specific_first() {
        let mut sigs = vec![
            Signature::new([&OBJECT]),
            Signature::new([&INT]),
            Signature::new([&NUMBER]),
        ];
        sigs.sort();
        let names: Vec<String> = sigs.iter().map(|s| s.to_string()).collect();
        assert_eq!(names, ["(int)", "(number)", "(object)"]);
    }

    #[test]
    fn test_display() {
        assert_eq!(
            Signature::named([&INT, &TEXT], "x").to_string(),
            "(int, text)[\"x\"]"
        );
    }
}
