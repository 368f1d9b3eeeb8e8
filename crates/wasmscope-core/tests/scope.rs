//! Tests for PC-to-inline-stack resolution over an in-memory scope tree

use wasmscope_core::error::Result;
use wasmscope_core::scope::{find_containing, AddressRange, RangeUnavailable, Scope, ScopeKind};

#[derive(Clone, Debug)]
struct TestScope
{
    name: &'static str,
    kind: ScopeKind,
    range: std::result::Result<Vec<AddressRange>, RangeUnavailable>,
    children: Vec<TestScope>,
}

impl TestScope
{
    fn function(name: &'static str, begin: u64, end: u64, children: Vec<TestScope>) -> Self
    {
        Self {
            name,
            kind: ScopeKind::Function,
            range: Ok(vec![AddressRange::new(begin, end)]),
            children,
        }
    }

    fn inlined(name: &'static str, begin: u64, end: u64) -> Self
    {
        Self {
            name,
            kind: ScopeKind::InlinedCall,
            range: Ok(vec![AddressRange::new(begin, end)]),
            children: Vec::new(),
        }
    }

    fn unit(children: Vec<TestScope>) -> Self
    {
        Self {
            name: "unit",
            kind: ScopeKind::Other,
            range: Err(RangeUnavailable::Absent),
            children,
        }
    }
}

impl Scope for TestScope
{
    fn kind(&self) -> ScopeKind
    {
        self.kind
    }

    fn address_ranges(&self) -> std::result::Result<Vec<AddressRange>, RangeUnavailable>
    {
        self.range.clone()
    }

    fn children(&self) -> Result<Vec<Self>>
    {
        Ok(self.children.clone())
    }
}

fn resolve(root: &TestScope, address: u64) -> Vec<&'static str>
{
    find_containing(root, address)
        .unwrap()
        .iter()
        .map(|scope| scope.name)
        .collect()
}

fn tree() -> TestScope
{
    TestScope::unit(vec![TestScope::function(
        "outer",
        0x100,
        0x200,
        vec![TestScope::inlined("inlined", 0x140, 0x160)],
    )])
}

#[test]
fn test_inlined_call_is_innermost()
{
    assert_eq!(resolve(&tree(), 0x150), ["inlined", "outer"]);
}

#[test]
fn test_outer_function_only()
{
    assert_eq!(resolve(&tree(), 0x120), ["outer"]);
}

#[test]
fn test_address_outside_every_scope()
{
    assert!(resolve(&tree(), 0x300).is_empty());
}

#[test]
fn test_innermost_and_outermost_accessors()
{
    let stack = find_containing(&tree(), 0x140).unwrap();
    assert_eq!(stack.innermost().map(|scope| scope.name), Some("inlined"));
    assert_eq!(stack.outermost().map(|scope| scope.name), Some("outer"));
    assert_eq!(stack.len(), 2);
}

#[test]
fn test_mismatched_range_is_not_fatal()
{
    let broken = TestScope {
        name: "broken",
        kind: ScopeKind::Function,
        range: Err(RangeUnavailable::TypeMismatch),
        children: vec![TestScope::inlined("leaf", 0x10, 0x20)],
    };
    let root = TestScope::unit(vec![broken, TestScope::function("later", 0x0, 0x100, vec![])]);

    // The broken function matches only through its child.
    assert_eq!(resolve(&root, 0x18), ["leaf", "broken"]);
    assert_eq!(resolve(&root, 0x40), ["later"]);
}

#[test]
fn test_discontiguous_ranges()
{
    let split = TestScope {
        name: "split",
        kind: ScopeKind::Function,
        range: Ok(vec![AddressRange::new(0x0, 0x10), AddressRange::new(0x80, 0x90)]),
        children: Vec::new(),
    };
    assert_eq!(resolve(&split, 0x85), ["split"]);
    assert!(resolve(&split, 0x40).is_empty());
}

#[test]
fn test_nested_inlining_order()
{
    let mut middle = TestScope::inlined("middle", 0x20, 0x60);
    middle.children.push(TestScope::inlined("leaf", 0x30, 0x38));
    let root = TestScope::function("outer", 0x0, 0x100, vec![middle]);

    assert_eq!(resolve(&root, 0x34), ["leaf", "middle", "outer"]);
    assert_eq!(resolve(&root, 0x40), ["middle", "outer"]);
}

#[test]
fn test_address_range_display()
{
    let range = AddressRange::new(0x140, 0x160);
    assert_eq!(range.to_string(), "[0x140, 0x160)");
    assert!(range.contains(0x15f));
    assert!(!range.contains(0x160));
}
