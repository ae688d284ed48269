//! Token slices as a nom input.

use std::iter::Enumerate;
use std::ops::{Range, RangeFrom, RangeFull, RangeTo};
use std::slice::Iter;

use nom::{InputIter, InputLength, InputTake, Needed, Slice, UnspecializedInput};

/// A borrowed run of lexical tokens. Implements the traits needed to
/// act as a [nom](https://crates.io/crates/nom) [custom input
/// type](https://github.com/rust-bakery/nom/blob/main/doc/custom_input_types.md).
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Tokens<'a, T> {
    pub tok: &'a [T],
}

impl<'a, T> Tokens<'a, T> {
    pub fn new(tok: &'a [T]) -> Self {
        Tokens { tok }
    }

    pub fn is_empty(&self) -> bool {
        self.tok.is_empty()
    }

    pub fn first(&self) -> Option<&'a T> {
        self.tok.first()
    }
}

impl<'a, T> InputLength for Tokens<'a, T> {
    #[inline]
    fn input_len(&self) -> usize {
        self.tok.len()
    }
}

impl<'a, T> InputTake for Tokens<'a, T> {
    #[inline]
    fn take(&self, count: usize) -> Self {
        Tokens::new(&self.tok[..count])
    }

    #[inline]
    fn take_split(&self, count: usize) -> (Self, Self) {
        let (prefix, suffix) = self.tok.split_at(count);
        (Tokens::new(suffix), Tokens::new(prefix))
    }
}

impl<'a, T> Slice<Range<usize>> for Tokens<'a, T> {
    #[inline]
    fn slice(&self, range: Range<usize>) -> Self {
        Tokens::new(&self.tok[range])
    }
}

impl<'a, T> Slice<RangeTo<usize>> for Tokens<'a, T> {
    #[inline]
    fn slice(&self, range: RangeTo<usize>) -> Self {
        Tokens::new(&self.tok[range])
    }
}

impl<'a, T> Slice<RangeFrom<usize>> for Tokens<'a, T> {
    #[inline]
    fn slice(&self, range: RangeFrom<usize>) -> Self {
        Tokens::new(&self.tok[range])
    }
}

impl<'a, T> Slice<RangeFull> for Tokens<'a, T> {
    #[inline]
    fn slice(&self, _: RangeFull) -> Self {
        Tokens::new(self.tok)
    }
}

impl<'a, T> InputIter for Tokens<'a, T> {
    type Item = &'a T;
    type Iter = Enumerate<Iter<'a, T>>;
    type IterElem = Iter<'a, T>;

    #[inline]
    fn iter_indices(&self) -> Self::Iter {
        self.tok.iter().enumerate()
    }

    #[inline]
    fn iter_elements(&self) -> Self::IterElem {
        self.tok.iter()
    }

    #[inline]
    fn position<P>(&self, predicate: P) -> Option<usize>
    where
        P: Fn(Self::Item) -> bool,
    {
        self.tok.iter().position(predicate)
    }

    #[inline]
    fn slice_index(&self, count: usize) -> Result<usize, Needed> {
        if self.tok.len() >= count {
            Ok(count)
        } else {
            Err(Needed::new(count - self.tok.len()))
        }
    }
}

impl<'a, T> UnspecializedInput for Tokens<'a, T> {}

#[cfg(test)]
mod test {
    use nom::bytes::complete::take;
    use nom::IResult;

    use super::*;

    #[test]
    fn take_tokens() {
        let toks = [1, 2, 3];
        let input = Tokens::new(&toks);
        let r: IResult<Tokens<i32>, Tokens<i32>> = take(2_usize)(input);
        let (rest, taken) = r.expect("two tokens");
        assert_eq!(taken.tok, &[1, 2], "taken");
        assert_eq!(rest.first(), Some(&3), "rest");
        assert!(!rest.is_empty(), "not exhausted");
    }

    #[test]
    fn slice_owned_tokens() {
        let toks = [String::from("a"), String::from("b")];
        let input = Tokens::new(&toks);
        assert_eq!(input.slice(..), input, "whole");
        assert_eq!(input.slice(1..).first(), Some(&toks[1]), "suffix");
    }
}
