//! # Scope Resolution
//!
//! Maps a program counter to the chain of function and inlined-call scopes
//! that enclose it.
//!
//! ## Search order
//!
//! The tree is searched depth-first and children are visited before their
//! parent, so the deepest (most specific) scope is found first:
//!
//! 1. Children are searched in order. The first child that matches ends the
//!    search at this level; later siblings are not visited.
//! 2. A function or inlined-call scope matches if a descendant matched or if
//!    its own address ranges contain the address. A scope whose ranges cannot
//!    be read only matches through its descendants.
//! 3. Any other scope (lexical blocks, namespaces, the unit itself) never
//!    appears in the result, but its children are still searched.
//!
//! The result is innermost first: index 0 is the inlined call (or function)
//! that actually contains the address, the last entry is the outermost
//! function.

use std::fmt;

use smallvec::SmallVec;

use crate::error::Result;

/// Coarse classification of a scope for resolution purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind
{
    /// A concrete function body (`DW_TAG_subprogram`).
    Function,
    /// A function body inlined into its caller (`DW_TAG_inlined_subroutine`).
    InlinedCall,
    /// Anything else; transparent to matching.
    Other,
}

impl ScopeKind
{
    /// Whether scopes of this kind can appear in an [`InlineStack`].
    pub fn is_callable(self) -> bool
    {
        matches!(self, ScopeKind::Function | ScopeKind::InlinedCall)
    }
}

/// Half-open address range `[begin, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddressRange
{
    pub begin: u64,
    pub end: u64,
}

impl AddressRange
{
    pub fn new(begin: u64, end: u64) -> Self
    {
        Self { begin, end }
    }

    pub fn contains(&self, address: u64) -> bool
    {
        self.begin <= address && address < self.end
    }
}

impl fmt::Display for AddressRange
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(f, "[{:#x}, {:#x})", self.begin, self.end)
    }
}

/// Why a scope could not report its address ranges.
///
/// Both variants mean the same thing to the resolver: the scope has no
/// usable range of its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeUnavailable
{
    /// The scope has no range attributes.
    Absent,
    /// Range attributes exist but could not be decoded.
    TypeMismatch,
}

/// A node in a debug-information scope tree.
///
/// Implementations are cheap handles (offsets plus borrowed context), which
/// is why `children` hands them out by value.
pub trait Scope: Sized
{
    /// Classification of this scope.
    fn kind(&self) -> ScopeKind;

    /// Address ranges covered by this scope itself.
    ///
    /// ## Errors
    ///
    /// Returns [`RangeUnavailable`] when the scope declares no range or the
    /// range cannot be decoded.
    fn address_ranges(&self) -> std::result::Result<Vec<AddressRange>, RangeUnavailable>;

    /// Direct children, in tree order.
    ///
    /// ## Errors
    ///
    /// A tree that cannot be walked is malformed debug information and aborts
    /// the search.
    fn children(&self) -> Result<Vec<Self>>;

    /// Whether this scope's own ranges contain `address`.
    ///
    /// An unavailable range never contains anything.
    fn contains(&self, address: u64) -> bool
    {
        self.address_ranges()
            .map(|ranges| ranges.iter().any(|range| range.contains(address)))
            .unwrap_or(false)
    }
}

/// Scopes enclosing an address, innermost first.
#[derive(Debug, Clone)]
pub struct InlineStack<S>
{
    scopes: SmallVec<[S; 4]>,
}

impl<S> InlineStack<S>
{
    fn new() -> Self
    {
        Self { scopes: SmallVec::new() }
    }

    /// The most specific scope containing the address.
    pub fn innermost(&self) -> Option<&S>
    {
        self.scopes.first()
    }

    /// The outermost enclosing function.
    pub fn outermost(&self) -> Option<&S>
    {
        self.scopes.last()
    }

    pub fn len(&self) -> usize
    {
        self.scopes.len()
    }

    pub fn is_empty(&self) -> bool
    {
        self.scopes.is_empty()
    }

    /// Scopes from innermost to outermost.
    pub fn iter(&self) -> std::slice::Iter<'_, S>
    {
        self.scopes.iter()
    }

    pub fn as_slice(&self) -> &[S]
    {
        &self.scopes
    }
}

impl<'a, S> IntoIterator for &'a InlineStack<S>
{
    type Item = &'a S;
    type IntoIter = std::slice::Iter<'a, S>;

    fn into_iter(self) -> Self::IntoIter
    {
        self.iter()
    }
}

enum Search<S>
{
    Matched(InlineStack<S>),
    NotMatched,
}

/// Find every function or inlined-call scope under `root` that contains `address`.
///
/// Returns an empty stack when nothing contains the address; that is a
/// normal outcome, not an error.
///
/// ## Errors
///
/// Propagates errors from [`Scope::children`].
pub fn find_containing<S>(root: &S, address: u64) -> Result<InlineStack<S>>
where
    S: Scope + Clone,
{
    match search(root.clone(), address)? {
        Search::Matched(stack) => Ok(stack),
        Search::NotMatched => Ok(InlineStack::new()),
    }
}

fn search<S: Scope>(scope: S, address: u64) -> Result<Search<S>>
{
    let mut found = None;
    for child in scope.children()? {
        if let Search::Matched(stack) = search(child, address)? {
            found = Some(stack);
            break;
        }
    }

    if !scope.kind().is_callable() {
        return Ok(found.map_or(Search::NotMatched, Search::Matched));
    }

    // A matched descendant settles it; our own range is not consulted.
    let mut stack = match found {
        Some(stack) => stack,
        None if scope.contains(address) => InlineStack::new(),
        None => return Ok(Search::NotMatched),
    };
    stack.scopes.push(scope);
    Ok(Search::Matched(stack))
}
