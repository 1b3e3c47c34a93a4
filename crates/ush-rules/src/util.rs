//! Analyzer Utilities: predicates and extraction helpers shared by every
//! rule family, so individual rules stay small declarative walks instead of
//! re-deriving "is this an UdonSharp script" or "what sync mode does this
//! type declare" at every call site.

use ush_core::cst::ast::{Attribute, CompilationUnit, TypeDecl};
use ush_core::cst::{UshSyntaxKind, UshSyntaxNode};

/// True if `type_decl` is an UdonSharp script: its base list names the
/// marker base type `UdonSharpBehaviour`, or any of its own or its
/// members' attributes carry a token starting with "Udon" (case
/// insensitive). This is the syntax-only predicate used in place of
/// walking a resolved inheritance chain, since no symbol table is
/// available to this engine.
pub fn is_udonsharp_script(type_decl: &TypeDecl) -> bool {
    if type_decl.extends_or_implements("UdonSharpBehaviour") {
        return true;
    }
    if type_decl
        .attribute_lists()
        .flat_map(|l| l.attributes())
        .any(|a| attribute_mentions_udon(&a))
    {
        return true;
    }
    type_decl.members().iter().any(|member| {
        let attrs: Vec<Attribute> = match member {
            ush_core::cst::ast::Member::Field(f) => f.attribute_lists().into_iter().flat_map(|l| l.attributes()).collect(),
            ush_core::cst::ast::Member::Property(p) => p.attribute_lists().into_iter().flat_map(|l| l.attributes()).collect(),
            ush_core::cst::ast::Member::Method(m) => m.attribute_lists().into_iter().flat_map(|l| l.attributes()).collect(),
            _ => Vec::new(),
        };
        attrs.iter().any(attribute_mentions_udon)
    })
}

fn attribute_mentions_udon(attr: &Attribute) -> bool {
    attr.name()
        .map(|n| n.to_ascii_lowercase().contains("udon"))
        .unwrap_or(false)
}

/// Walks ancestors of `node` to find the nearest enclosing type
/// declaration (class/struct/interface/enum).
pub fn enclosing_type_decl(node: &UshSyntaxNode) -> Option<TypeDecl> {
    node.ancestors().find_map(TypeDecl::cast)
}

/// All type declarations visible in the same file, top-level or nested in
/// a namespace — the only scope a syntax-only fallback can search.
pub fn file_type_decls(root: &UshSyntaxNode) -> Vec<TypeDecl> {
    root.descendants()
        .find_map(CompilationUnit::cast)
        .map(|unit| unit.all_type_decls())
        .unwrap_or_default()
}

/// A behaviour's replication mode, extracted from
/// `[UdonBehaviourSyncMode(Mode=X)]`, matched by simple name with or
/// without the `Attribute` suffix per the attribute-recognition design
/// note.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncMode {
    Continuous,
    Manual,
    NoVariableSync,
    None,
}

impl SyncMode {
    fn from_token(token: &str) -> Option<Self> {
        let last = token.rsplit('.').next().unwrap_or(token);
        match last {
            "Continuous" => Some(SyncMode::Continuous),
            "Manual" => Some(SyncMode::Manual),
            "NoVariableSync" => Some(SyncMode::NoVariableSync),
            "None" => Some(SyncMode::None),
            _ => None,
        }
    }
}

/// Extracts the sync mode of `type_decl` from its `UdonBehaviourSyncMode`
/// attribute, defaulting to `Continuous` (the runtime's default) when the
/// attribute is absent or its argument cannot be read.
pub fn sync_mode_of(type_decl: &TypeDecl) -> SyncMode {
    type_decl
        .attribute_lists()
        .flat_map(|l| l.attributes())
        .find(|a| a.normalized_name().as_deref() == Some("UdonBehaviourSyncMode"))
        .and_then(|a| a.first_arg_text())
        .and_then(|text| SyncMode::from_token(&text))
        .unwrap_or(SyncMode::Continuous)
}

/// Tweening mode named by a `UdonSynced` attribute argument
/// (`[UdonSynced(UdonSyncMode.Linear)]`), if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TweenMode {
    None,
    Linear,
    Smooth,
}

pub fn tween_mode_of(attr: &Attribute) -> TweenMode {
    match attr
        .first_arg_text()
        .as_deref()
        .map(|t| t.rsplit('.').next().unwrap_or(t).to_string())
        .as_deref()
    {
        Some("Linear") => TweenMode::Linear,
        Some("Smooth") => TweenMode::Smooth,
        _ => TweenMode::None,
    }
}

/// Normalises a syntactic type-reference string for comparison purposes:
/// strips array/nullable suffixes are handled by the caller, this only
/// normalises the base name through the primitive-alias table (`int` <->
/// `System.Int32`, …) and drops namespace qualification for the remaining
/// cases (the same tolerance attribute matching gets, applied to types
/// because reference assemblies may be absent).
pub fn normalize_type_name(name: &str) -> String {
    let trimmed = name.trim();
    let unqualified = trimmed.rsplit('.').next().unwrap_or(trimmed);
    match unqualified {
        "Int32" if trimmed.starts_with("System.") => "int".to_string(),
        "int" => "int".to_string(),
        "Int32" => "int".to_string(),
        "UInt32" => "uint".to_string(),
        "uint" => "uint".to_string(),
        "Int64" => "long".to_string(),
        "long" => "long".to_string(),
        "UInt64" => "ulong".to_string(),
        "ulong" => "ulong".to_string(),
        "Int16" => "short".to_string(),
        "short" => "short".to_string(),
        "UInt16" => "ushort".to_string(),
        "ushort" => "ushort".to_string(),
        "Byte" => "byte".to_string(),
        "byte" => "byte".to_string(),
        "SByte" => "sbyte".to_string(),
        "sbyte" => "sbyte".to_string(),
        "Single" => "float".to_string(),
        "float" => "float".to_string(),
        "Double" => "double".to_string(),
        "double" => "double".to_string(),
        "Decimal" => "decimal".to_string(),
        "decimal" => "decimal".to_string(),
        "Boolean" => "bool".to_string(),
        "bool" => "bool".to_string(),
        "String" => "string".to_string(),
        "string" => "string".to_string(),
        "Char" => "char".to_string(),
        "char" => "char".to_string(),
        "Object" => "object".to_string(),
        "object" => "object".to_string(),
        other => other.to_string(),
    }
}

const NUMERIC_TYPES: &[&str] = &[
    "int", "uint", "long", "ulong", "short", "ushort", "byte", "sbyte", "float", "double", "decimal",
];

/// Whether `from` is implicitly convertible to `to` for the purposes of a
/// payload-argument check: exact match after normalisation, or both sides
/// are members of the numeric-alias family (treated as mutually
/// convertible for this syntax-only check since there is no symbol table
/// to consult for an actual implicit-conversion rule), or `to` is `object`,
/// or `from` is the `null` literal.
pub fn types_compatible(from: &str, to: &str) -> bool {
    if from == "null" {
        return true;
    }
    let from = normalize_type_name(from);
    let to = normalize_type_name(to);
    if from == to {
        return true;
    }
    if to == "object" {
        return true;
    }
    NUMERIC_TYPES.contains(&from.as_str()) && NUMERIC_TYPES.contains(&to.as_str())
}

/// Best-effort syntactic type of a literal expression, used where the
/// engine has no symbol table to ask for an expression's static type.
/// Returns `None` for any expression shape other than a literal, so
/// callers skip the check rather than risk a false positive.
pub fn literal_expr_type(node: &UshSyntaxNode) -> Option<&'static str> {
    if node.kind() != UshSyntaxKind::LiteralExpr {
        return None;
    }
    let token = node.children_with_tokens().filter_map(|e| e.into_token()).next()?;
    Some(match token.kind() {
        UshSyntaxKind::IntLiteral => "int",
        UshSyntaxKind::FloatLiteral => "float",
        UshSyntaxKind::StringLiteral => "string",
        UshSyntaxKind::CharLiteral => "char",
        UshSyntaxKind::TrueKw | UshSyntaxKind::FalseKw => "bool",
        UshSyntaxKind::NullKw => "null",
        _ => return None,
    })
}

/// The fixed set of types `UdonSynced` supports. Arrays are checked by the
/// caller against the element type.
const SYNCED_SUPPORTED_TYPES: &[&str] = &[
    "bool", "byte", "sbyte", "short", "ushort", "int", "uint", "long", "ulong", "float", "double",
    "decimal", "char", "string", "Vector2", "Vector3", "Vector4", "Quaternion", "Color", "Color32",
    "VRCPlayerApi", "GameObject", "Transform", "UdonBehaviour",
];

pub fn is_supported_synced_type(simple_name: &str) -> bool {
    SYNCED_SUPPORTED_TYPES.contains(&simple_name)
}

pub const LINEAR_TWEEN_TYPES: &[&str] = &["float", "Vector2", "Vector3", "Vector4", "Quaternion"];
pub const SMOOTH_TWEEN_TYPES: &[&str] = &["float", "int", "Vector2", "Vector3"];

#[cfg(test)]
mod tests {
    use super::*;
    use ush_core::cst::parse;

    fn first_type_decl(source: &str) -> TypeDecl {
        let (root, _) = parse(source);
        file_type_decls(&root).into_iter().next().expect("type decl")
    }

    #[test]
    fn detects_udonsharp_behaviour_by_base_list() {
        let t = first_type_decl("public class Foo : UdonSharpBehaviour {\n}\n");
        assert!(is_udonsharp_script(&t));
    }

    #[test]
    fn detects_udonsharp_by_attribute_substring() {
        let t = first_type_decl("[SomeUdonThing]\npublic class Foo {\n}\n");
        assert!(is_udonsharp_script(&t));
    }

    #[test]
    fn plain_class_is_not_udonsharp() {
        let t = first_type_decl("public class Foo {\n}\n");
        assert!(!is_udonsharp_script(&t));
    }

    #[test]
    fn sync_mode_defaults_to_continuous() {
        let t = first_type_decl("public class Foo : UdonSharpBehaviour {\n}\n");
        assert_eq!(sync_mode_of(&t), SyncMode::Continuous);
    }

    #[test]
    fn sync_mode_read_from_attribute() {
        let t = first_type_decl(
            "[UdonBehaviourSyncMode(BehaviourSyncMode.Manual)]\npublic class Foo : UdonSharpBehaviour {\n}\n",
        );
        assert_eq!(sync_mode_of(&t), SyncMode::Manual);
    }

    #[test]
    fn numeric_aliases_are_mutually_compatible() {
        assert!(types_compatible("int", "System.Int32"));
        assert!(types_compatible("float", "int"));
        assert!(!types_compatible("string", "int"));
    }
}
