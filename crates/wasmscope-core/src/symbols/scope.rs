//! DIE-backed scopes.

use gimli::{constants, AttributeValue, DwTag, Unit, UnitOffset};
use tracing::trace;

use super::demangle::demangle_linkage_name;
use super::{attr_text, section_offset};
use crate::error::{Result, WasmScopeError};
use crate::loader::{ModuleDwarf, SectionReader};
use crate::scope::{AddressRange, RangeUnavailable, Scope, ScopeKind};
use crate::types::LinkageName;

/// A debugging information entry viewed as a node of the scope tree.
///
/// Holds only the entry's offset and tag; attributes and children are read
/// from the unit on demand.
#[derive(Clone, Copy)]
pub struct DieScope<'u, 'a>
{
    dwarf: &'u ModuleDwarf<'a>,
    unit: &'u Unit<SectionReader<'a>>,
    offset: UnitOffset,
    tag: DwTag,
}

/// One attribute of a [`ScopeDescription`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeDescription
{
    /// Attribute name, e.g. `DW_AT_low_pc`.
    pub name: String,
    /// Rendered value; strings are resolved, addresses are hex.
    pub value: String,
    /// Set for `DW_AT_linkage_name` and `DW_AT_MIPS_linkage_name`.
    pub linkage: Option<LinkageName>,
}

/// Printable summary of a scope: where it is, what it is, and its attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeDescription
{
    /// Offset of the entry within `.debug_info`.
    pub offset: usize,
    /// Tag name, e.g. `DW_TAG_inlined_subroutine`.
    pub tag: String,
    pub attributes: Vec<AttributeDescription>,
}

impl ScopeDescription
{
    /// Value of `DW_AT_name`, if the entry has one.
    pub fn name(&self) -> Option<&str>
    {
        self.attributes
            .iter()
            .find(|attr| attr.name == "DW_AT_name")
            .map(|attr| attr.value.as_str())
    }
}

impl<'u, 'a> DieScope<'u, 'a>
{
    pub(super) fn root(dwarf: &'u ModuleDwarf<'a>, unit: &'u Unit<SectionReader<'a>>) -> Result<Self>
    {
        let mut tree = unit
            .entries_tree(None)
            .map_err(|err| WasmScopeError::dwarf("building unit tree", err))?;
        let root = tree.root().map_err(|err| WasmScopeError::dwarf("navigating unit root", err))?;
        let entry = root.entry();
        Ok(Self {
            dwarf,
            unit,
            offset: entry.offset(),
            tag: entry.tag(),
        })
    }

    pub fn tag(&self) -> DwTag
    {
        self.tag
    }

    /// Offset of the entry within `.debug_info`.
    pub fn section_offset(&self) -> usize
    {
        section_offset(self.offset.to_unit_section_offset(self.unit))
    }

    /// Read every attribute of the entry into a printable description.
    ///
    /// ## Errors
    ///
    /// Returns `Dwarf` if the entry or its attribute list cannot be decoded.
    pub fn describe(&self) -> Result<ScopeDescription>
    {
        let entry = self
            .unit
            .entry(self.offset)
            .map_err(|err| WasmScopeError::dwarf("reading scope entry", err))?;

        let mut attributes = Vec::new();
        let mut attrs = entry.attrs();
        while let Some(attr) = attrs
            .next()
            .map_err(|err| WasmScopeError::dwarf("reading scope attributes", err))?
        {
            let value = self.render_value(attr.value());
            let linkage = matches!(attr.name(), constants::DW_AT_linkage_name | constants::DW_AT_MIPS_linkage_name)
                .then(|| demangle_linkage_name(value.clone()));
            attributes.push(AttributeDescription {
                name: attr.name().to_string(),
                value,
                linkage,
            });
        }

        Ok(ScopeDescription {
            offset: self.section_offset(),
            tag: self.tag.to_string(),
            attributes,
        })
    }

    fn render_value(&self, value: AttributeValue<SectionReader<'a>>) -> String
    {
        if let Ok(text) = attr_text(self.dwarf, self.unit, value.clone()) {
            return text;
        }

        match value {
            AttributeValue::Addr(address) => format!("{address:#x}"),
            AttributeValue::Data1(data) => data.to_string(),
            AttributeValue::Data2(data) => data.to_string(),
            AttributeValue::Data4(data) => data.to_string(),
            AttributeValue::Data8(data) | AttributeValue::Udata(data) => data.to_string(),
            AttributeValue::Sdata(data) => data.to_string(),
            AttributeValue::Flag(flag) => flag.to_string(),
            AttributeValue::UnitRef(offset) => {
                format!("<{:#x}>", section_offset(offset.to_unit_section_offset(self.unit)))
            }
            AttributeValue::DebugInfoRef(offset) => format!("<{:#x}>", offset.0),
            AttributeValue::FileIndex(index) => format!("file #{index}"),
            AttributeValue::Language(language) => language.to_string(),
            AttributeValue::Encoding(encoding) => encoding.to_string(),
            AttributeValue::Inline(inline) => inline.to_string(),
            other => format!("{other:?}"),
        }
    }
}

impl Scope for DieScope<'_, '_>
{
    fn kind(&self) -> ScopeKind
    {
        match self.tag {
            constants::DW_TAG_subprogram => ScopeKind::Function,
            constants::DW_TAG_inlined_subroutine => ScopeKind::InlinedCall,
            _ => ScopeKind::Other,
        }
    }

    fn address_ranges(&self) -> std::result::Result<Vec<AddressRange>, RangeUnavailable>
    {
        let mismatch = |err: gimli::Error| {
            trace!(offset = self.offset.0, error = %err, "scope range unreadable");
            RangeUnavailable::TypeMismatch
        };

        let entry = self.unit.entry(self.offset).map_err(mismatch)?;
        let mut iter = self.dwarf.die_ranges(self.unit, &entry).map_err(mismatch)?;
        let mut ranges = Vec::new();
        while let Some(range) = iter.next().map_err(mismatch)? {
            ranges.push(AddressRange::new(range.begin, range.end));
        }

        if !ranges.is_empty() {
            return Ok(ranges);
        }

        // A low_pc with no high_pc or ranges covers exactly one address.
        if entry.attr(constants::DW_AT_high_pc).map_err(mismatch)?.is_none()
            && entry.attr(constants::DW_AT_ranges).map_err(mismatch)?.is_none()
        {
            if let Some(value) = entry.attr_value(constants::DW_AT_low_pc).map_err(mismatch)? {
                if let Some(low) = self.dwarf.attr_address(self.unit, value).map_err(mismatch)? {
                    return Ok(vec![AddressRange::new(low, low.saturating_add(1))]);
                }
            }
        }
        Err(RangeUnavailable::Absent)
    }

    fn children(&self) -> Result<Vec<Self>>
    {
        let mut tree = self
            .unit
            .entries_tree(Some(self.offset))
            .map_err(|err| WasmScopeError::dwarf("building scope tree", err))?;
        let root = tree.root().map_err(|err| WasmScopeError::dwarf("navigating scope root", err))?;

        let mut children = Vec::new();
        let mut iter = root.children();
        while let Some(child) = iter
            .next()
            .map_err(|err| WasmScopeError::dwarf("iterating scope children", err))?
        {
            let entry = child.entry();
            children.push(Self {
                offset: entry.offset(),
                tag: entry.tag(),
                ..*self
            });
        }
        Ok(children)
    }
}
