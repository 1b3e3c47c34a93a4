//! Typed AST wrappers over the raw CST.
//!
//! Each wrapper is a thin newtype around [`UshSyntaxNode`] that exposes the
//! accessors the rule engine needs (child declarations, modifiers,
//! attributes, expression operands) without re-deriving syntax-kind checks
//! at every call site.

use super::tree::{UshSyntaxNode, UshSyntaxToken};
use super::UshSyntaxKind;

/// Generates a newtype wrapper implementing the `cast`/`syntax` pair every
/// typed node needs.
macro_rules! ast_node {
    ($name:ident, $kind:expr) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub struct $name(UshSyntaxNode);

        impl $name {
            pub fn cast(node: UshSyntaxNode) -> Option<Self> {
                if node.kind() == $kind {
                    Some(Self(node))
                } else {
                    None
                }
            }

            pub fn syntax(&self) -> &UshSyntaxNode {
                &self.0
            }
        }
    };
}

fn child_node<T>(parent: &UshSyntaxNode, cast: impl Fn(UshSyntaxNode) -> Option<T>) -> Option<T> {
    parent.children().find_map(cast)
}

fn child_nodes<T>(
    parent: &UshSyntaxNode,
    cast: impl Fn(UshSyntaxNode) -> Option<T> + 'static,
) -> impl Iterator<Item = T> {
    parent.children().filter_map(cast)
}

fn child_token(parent: &UshSyntaxNode, kind: UshSyntaxKind) -> Option<UshSyntaxToken> {
    parent
        .children_with_tokens()
        .filter_map(|el| el.into_token())
        .find(|t| t.kind() == kind)
}

fn name_ident(parent: &UshSyntaxNode) -> Option<String> {
    child_token(parent, UshSyntaxKind::Ident).map(|t| t.text().to_string())
}

ast_node!(CompilationUnit, UshSyntaxKind::CompilationUnit);
ast_node!(UsingDirective, UshSyntaxKind::UsingDirective);
ast_node!(NamespaceDecl, UshSyntaxKind::NamespaceDecl);
ast_node!(ClassDecl, UshSyntaxKind::ClassDecl);
ast_node!(StructDecl, UshSyntaxKind::StructDecl);
ast_node!(InterfaceDecl, UshSyntaxKind::InterfaceDecl);
ast_node!(EnumDecl, UshSyntaxKind::EnumDecl);
ast_node!(BaseList, UshSyntaxKind::BaseList);
ast_node!(TypeRef, UshSyntaxKind::TypeRef);
ast_node!(AttributeList, UshSyntaxKind::AttributeList);
ast_node!(Attribute, UshSyntaxKind::Attribute);
ast_node!(AttributeArgList, UshSyntaxKind::AttributeArgList);
ast_node!(AttributeArg, UshSyntaxKind::AttributeArg);
ast_node!(ModifierList, UshSyntaxKind::ModifierList);
ast_node!(MemberList, UshSyntaxKind::MemberList);
ast_node!(FieldDecl, UshSyntaxKind::FieldDecl);
ast_node!(VariableDeclarator, UshSyntaxKind::VariableDeclarator);
ast_node!(MethodDecl, UshSyntaxKind::MethodDecl);
ast_node!(ConstructorDecl, UshSyntaxKind::ConstructorDecl);
ast_node!(ParameterList, UshSyntaxKind::ParameterList);
ast_node!(Parameter, UshSyntaxKind::Parameter);
ast_node!(PropertyDecl, UshSyntaxKind::PropertyDecl);
ast_node!(AccessorList, UshSyntaxKind::AccessorList);
ast_node!(Accessor, UshSyntaxKind::Accessor);
ast_node!(LocalFunctionDecl, UshSyntaxKind::LocalFunctionDecl);
ast_node!(Block, UshSyntaxKind::Block);
ast_node!(InvocationExpr, UshSyntaxKind::InvocationExpr);
ast_node!(MemberAccessExpr, UshSyntaxKind::MemberAccessExpr);
ast_node!(ConditionalAccessExpr, UshSyntaxKind::ConditionalAccessExpr);
ast_node!(IdentExpr, UshSyntaxKind::IdentExpr);
ast_node!(LiteralExpr, UshSyntaxKind::LiteralExpr);
ast_node!(ArgList, UshSyntaxKind::ArgList);
ast_node!(Arg, UshSyntaxKind::Arg);
ast_node!(AssignExpr, UshSyntaxKind::AssignExpr);
ast_node!(IsExpr, UshSyntaxKind::IsExpr);
ast_node!(AsExpr, UshSyntaxKind::AsExpr);
ast_node!(CastExpr, UshSyntaxKind::CastExpr);
ast_node!(ObjectCreationExpr, UshSyntaxKind::ObjectCreationExpr);
ast_node!(ArrayCreationExpr, UshSyntaxKind::ArrayCreationExpr);
ast_node!(ElementAccessExpr, UshSyntaxKind::ElementAccessExpr);
ast_node!(TypeofExpr, UshSyntaxKind::TypeofExpr);
ast_node!(NameofExpr, UshSyntaxKind::NameofExpr);
ast_node!(ObjectInitializer, UshSyntaxKind::ObjectInitializer);
ast_node!(CollectionInitializer, UshSyntaxKind::CollectionInitializer);
ast_node!(QualifiedName, UshSyntaxKind::QualifiedName);

/// Any of the type declaration node kinds: class, struct, interface, enum.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeDecl {
    Class(ClassDecl),
    Struct(StructDecl),
    Interface(InterfaceDecl),
    Enum(EnumDecl),
}

impl TypeDecl {
    pub fn cast(node: UshSyntaxNode) -> Option<Self> {
        match node.kind() {
            UshSyntaxKind::ClassDecl => ClassDecl::cast(node).map(TypeDecl::Class),
            UshSyntaxKind::StructDecl => StructDecl::cast(node).map(TypeDecl::Struct),
            UshSyntaxKind::InterfaceDecl => InterfaceDecl::cast(node).map(TypeDecl::Interface),
            UshSyntaxKind::EnumDecl => EnumDecl::cast(node).map(TypeDecl::Enum),
            _ => None,
        }
    }

    pub fn syntax(&self) -> &UshSyntaxNode {
        match self {
            TypeDecl::Class(n) => n.syntax(),
            TypeDecl::Struct(n) => n.syntax(),
            TypeDecl::Interface(n) => n.syntax(),
            TypeDecl::Enum(n) => n.syntax(),
        }
    }

    pub fn name(&self) -> Option<String> {
        name_ident(self.syntax())
    }

    pub fn base_list(&self) -> Option<BaseList> {
        child_node(self.syntax(), BaseList::cast)
    }

    pub fn attribute_lists(&self) -> impl Iterator<Item = AttributeList> {
        child_nodes(self.syntax(), AttributeList::cast)
    }

    pub fn modifiers(&self) -> Vec<String> {
        modifier_strings(self.syntax())
    }

    pub fn members(&self) -> Vec<Member> {
        let Some(list) = child_node(self.syntax(), MemberList::cast) else {
            return Vec::new();
        };
        list.syntax().children().filter_map(Member::cast).collect()
    }

    /// True if any entry in the base list textually matches `name`, ignoring
    /// generic arguments and qualification.
    pub fn extends_or_implements(&self, name: &str) -> bool {
        let Some(base_list) = self.base_list() else {
            return false;
        };
        base_list
            .syntax()
            .children()
            .filter_map(TypeRef::cast)
            .any(|t| t.simple_name().as_deref() == Some(name))
    }
}

impl CompilationUnit {
    pub fn using_directives(&self) -> impl Iterator<Item = UsingDirective> {
        child_nodes(self.syntax(), UsingDirective::cast)
    }

    pub fn namespaces(&self) -> impl Iterator<Item = NamespaceDecl> {
        child_nodes(self.syntax(), NamespaceDecl::cast)
    }

    pub fn type_decls(&self) -> impl Iterator<Item = TypeDecl> {
        child_nodes(self.syntax(), TypeDecl::cast)
    }

    /// All type declarations reachable from this unit, whether at the top
    /// level or nested in namespaces.
    pub fn all_type_decls(&self) -> Vec<TypeDecl> {
        let mut out: Vec<TypeDecl> = self.type_decls().collect();
        for ns in self.namespaces() {
            out.extend(ns.type_decls());
        }
        out
    }
}

impl NamespaceDecl {
    pub fn name(&self) -> Option<String> {
        child_node(self.syntax(), QualifiedName::cast).map(|q| q.syntax().text().to_string())
    }

    pub fn type_decls(&self) -> impl Iterator<Item = TypeDecl> {
        child_nodes(self.syntax(), TypeDecl::cast)
    }
}

impl TypeRef {
    pub fn simple_name(&self) -> Option<String> {
        let text: String = self
            .syntax()
            .children_with_tokens()
            .filter_map(|el| el.into_token())
            .filter(|t| matches!(t.kind(), UshSyntaxKind::Ident | UshSyntaxKind::Dot))
            .map(|t| t.text().to_string())
            .collect();
        text.rsplit('.').next().map(|s| s.to_string())
    }

    pub fn full_text(&self) -> String {
        self.syntax().text().to_string()
    }
}

fn modifier_strings(node: &UshSyntaxNode) -> Vec<String> {
    let Some(list) = child_node(node, ModifierList::cast) else {
        return Vec::new();
    };
    list.syntax()
        .children_with_tokens()
        .filter_map(|el| el.into_token())
        .map(|t| t.text().to_string())
        .collect()
}

fn attribute_lists(node: &UshSyntaxNode) -> Vec<AttributeList> {
    child_nodes(node, AttributeList::cast).collect()
}

impl AttributeList {
    pub fn attributes(&self) -> impl Iterator<Item = Attribute> {
        child_nodes(self.syntax(), Attribute::cast)
    }
}

impl Attribute {
    /// Name as written, e.g. `UdonSynced` or `UdonSynced` without the
    /// optional trailing `Attribute` suffix normalised out.
    pub fn name(&self) -> Option<String> {
        child_node(self.syntax(), QualifiedName::cast)
            .map(|q| q.syntax().text().to_string())
            .or_else(|| name_ident(self.syntax()))
    }

    /// Name with a trailing `Attribute` suffix stripped, matching how the
    /// runtime resolves attribute usages written either way.
    pub fn normalized_name(&self) -> Option<String> {
        self.name().map(|n| {
            let last = n.rsplit('.').next().unwrap_or(&n);
            last.strip_suffix("Attribute").unwrap_or(last).to_string()
        })
    }

    pub fn args(&self) -> Vec<AttributeArg> {
        let Some(list) = child_node(self.syntax(), AttributeArgList::cast) else {
            return Vec::new();
        };
        list.syntax()
            .children()
            .filter_map(AttributeArg::cast)
            .collect()
    }

    pub fn first_arg_text(&self) -> Option<String> {
        self.args().first().map(|a| a.syntax().text().to_string())
    }
}

impl FieldDecl {
    pub fn type_ref(&self) -> Option<TypeRef> {
        child_node(self.syntax(), TypeRef::cast)
    }

    pub fn modifiers(&self) -> Vec<String> {
        modifier_strings(self.syntax())
    }

    pub fn attribute_lists(&self) -> Vec<AttributeList> {
        attribute_lists(self.syntax())
    }

    pub fn declarators(&self) -> impl Iterator<Item = VariableDeclarator> {
        child_nodes(self.syntax(), VariableDeclarator::cast)
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.attribute_lists()
            .iter()
            .flat_map(|l| l.attributes())
            .any(|a| a.normalized_name().as_deref() == Some(name))
    }
}

impl VariableDeclarator {
    pub fn name(&self) -> Option<String> {
        name_ident(self.syntax())
    }
}

impl PropertyDecl {
    pub fn type_ref(&self) -> Option<TypeRef> {
        child_node(self.syntax(), TypeRef::cast)
    }

    pub fn name(&self) -> Option<String> {
        name_ident(self.syntax())
    }

    pub fn modifiers(&self) -> Vec<String> {
        modifier_strings(self.syntax())
    }

    pub fn attribute_lists(&self) -> Vec<AttributeList> {
        attribute_lists(self.syntax())
    }
}

impl MethodDecl {
    pub fn return_type(&self) -> Option<TypeRef> {
        child_node(self.syntax(), TypeRef::cast)
    }

    pub fn name(&self) -> Option<String> {
        name_ident(self.syntax())
    }

    pub fn modifiers(&self) -> Vec<String> {
        modifier_strings(self.syntax())
    }

    pub fn attribute_lists(&self) -> Vec<AttributeList> {
        attribute_lists(self.syntax())
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.attribute_lists()
            .iter()
            .flat_map(|l| l.attributes())
            .any(|a| a.normalized_name().as_deref() == Some(name))
    }

    pub fn parameters(&self) -> Vec<Parameter> {
        let Some(list) = child_node(self.syntax(), ParameterList::cast) else {
            return Vec::new();
        };
        list.syntax().children().filter_map(Parameter::cast).collect()
    }

    pub fn body(&self) -> Option<Block> {
        child_node(self.syntax(), Block::cast)
    }

    pub fn is_public(&self) -> bool {
        self.modifiers().iter().any(|m| m == "public")
    }
}

impl Parameter {
    pub fn type_ref(&self) -> Option<TypeRef> {
        child_node(self.syntax(), TypeRef::cast)
    }

    pub fn name(&self) -> Option<String> {
        name_ident(self.syntax())
    }

    pub fn is_ref_or_out(&self) -> bool {
        self.syntax()
            .children_with_tokens()
            .filter_map(|el| el.into_token())
            .any(|t| matches!(t.kind(), UshSyntaxKind::RefKw | UshSyntaxKind::OutKw))
    }
}

impl InvocationExpr {
    /// The callee expression, i.e. everything before the final `(...)` arg list.
    pub fn target(&self) -> Option<UshSyntaxNode> {
        self.syntax()
            .children()
            .find(|n| !matches!(n.kind(), UshSyntaxKind::ArgList))
    }

    /// The simple method name being invoked, whether called directly
    /// (`Foo()`) or through member access (`x.Foo()`).
    pub fn method_name(&self) -> Option<String> {
        let target = self.target()?;
        match target.kind() {
            UshSyntaxKind::IdentExpr => name_ident(&target),
            UshSyntaxKind::MemberAccessExpr => {
                MemberAccessExpr::cast(target).and_then(|m| m.member_name())
            }
            _ => None,
        }
    }

    pub fn args(&self) -> Vec<Arg> {
        let Some(list) = child_node(self.syntax(), ArgList::cast) else {
            return Vec::new();
        };
        list.syntax().children().filter_map(Arg::cast).collect()
    }

    /// Text of the first argument, stripped of surrounding quotes if it is a
    /// string literal. Used to read the event-name argument of
    /// `SendCustomEvent`-family calls without a full expression evaluator.
    pub fn first_arg_literal_text(&self) -> Option<String> {
        let arg = self.args().into_iter().next()?;
        let lit = arg.syntax().children().find_map(LiteralExpr::cast)?;
        let text = lit.syntax().text().to_string();
        Some(text.trim_matches('"').to_string())
    }
}

impl ElementAccessExpr {
    pub fn target(&self) -> Option<UshSyntaxNode> {
        self.syntax()
            .children()
            .find(|n| !matches!(n.kind(), UshSyntaxKind::ArgList))
    }

    pub fn args(&self) -> Vec<Arg> {
        let Some(list) = child_node(self.syntax(), ArgList::cast) else {
            return Vec::new();
        };
        list.syntax().children().filter_map(Arg::cast).collect()
    }
}

impl TypeofExpr {
    pub fn type_ref(&self) -> Option<TypeRef> {
        child_node(self.syntax(), TypeRef::cast)
    }
}

impl NameofExpr {
    pub fn qualified_name(&self) -> Option<QualifiedName> {
        child_node(self.syntax(), QualifiedName::cast)
    }
}

impl MemberAccessExpr {
    pub fn target(&self) -> Option<UshSyntaxNode> {
        self.syntax().children().next()
    }

    pub fn member_name(&self) -> Option<String> {
        child_token(self.syntax(), UshSyntaxKind::Ident).map(|t| t.text().to_string())
    }
}

impl IdentExpr {
    pub fn name(&self) -> Option<String> {
        child_token(self.syntax(), UshSyntaxKind::Ident).map(|t| t.text().to_string())
    }
}

/// Any class/struct/interface/enum member.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Member {
    Field(FieldDecl),
    Property(PropertyDecl),
    Method(MethodDecl),
    Constructor(ConstructorDecl),
    Nested(TypeDecl),
}

impl Member {
    pub fn cast(node: UshSyntaxNode) -> Option<Self> {
        match node.kind() {
            UshSyntaxKind::FieldDecl => FieldDecl::cast(node).map(Member::Field),
            UshSyntaxKind::PropertyDecl => PropertyDecl::cast(node).map(Member::Property),
            UshSyntaxKind::MethodDecl => MethodDecl::cast(node).map(Member::Method),
            UshSyntaxKind::ConstructorDecl => ConstructorDecl::cast(node).map(Member::Constructor),
            UshSyntaxKind::ClassDecl
            | UshSyntaxKind::StructDecl
            | UshSyntaxKind::InterfaceDecl
            | UshSyntaxKind::EnumDecl => TypeDecl::cast(node).map(Member::Nested),
            _ => None,
        }
    }

    pub fn syntax(&self) -> &UshSyntaxNode {
        match self {
            Member::Field(n) => n.syntax(),
            Member::Property(n) => n.syntax(),
            Member::Method(n) => n.syntax(),
            Member::Constructor(n) => n.syntax(),
            Member::Nested(n) => n.syntax(),
        }
    }

    pub fn as_method(&self) -> Option<&MethodDecl> {
        match self {
            Member::Method(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_field(&self) -> Option<&FieldDecl> {
        match self {
            Member::Field(f) => Some(f),
            _ => None,
        }
    }
}

/// Walks every node in the subtree and returns those of a given typed kind.
/// Used by rules that need every invocation, every field, etc. within a
/// method body without re-implementing a visitor for each rule.
pub fn descendants<T>(root: &UshSyntaxNode, cast: fn(UshSyntaxNode) -> Option<T>) -> Vec<T> {
    root.descendants().filter_map(cast).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cst::parser::parse;

    fn parse_unit(source: &str) -> CompilationUnit {
        let (root, errors) = parse(source);
        assert!(errors.is_empty(), "unexpected parse errors: {errors:?}");
        root.children()
            .find_map(CompilationUnit::cast)
            .expect("compilation unit")
    }

    #[test]
    fn reads_class_name_and_base_list() {
        let unit = parse_unit("public class Foo : UdonSharpBehaviour {\n}\n");
        let decls = unit.all_type_decls();
        assert_eq!(decls.len(), 1);
        assert_eq!(decls[0].name().as_deref(), Some("Foo"));
        assert!(decls[0].extends_or_implements("UdonSharpBehaviour"));
    }

    #[test]
    fn reads_field_attribute_and_declarator_name() {
        let unit = parse_unit(
            "public class Foo : UdonSharpBehaviour {\n    [UdonSynced]\n    public int Score;\n}\n",
        );
        let decls = unit.all_type_decls();
        let members = decls[0].members();
        let field = members[0].as_field().expect("field member");
        assert!(field.has_attribute("UdonSynced"));
        let names: Vec<_> = field.declarators().filter_map(|d| d.name()).collect();
        assert_eq!(names, vec!["Score".to_string()]);
    }

    #[test]
    fn reads_invocation_method_name_and_first_arg() {
        let unit = parse_unit(
            "public class Foo : UdonSharpBehaviour {\n    public void Bar() {\n        SendCustomEvent(\"Baz\");\n    }\n}\n",
        );
        let decls = unit.all_type_decls();
        let members = decls[0].members();
        let method = members[0].as_method().expect("method member");
        let body = method.body().expect("method body");
        let invocations = descendants(body.syntax(), InvocationExpr::cast);
        assert_eq!(invocations.len(), 1);
        assert_eq!(invocations[0].method_name().as_deref(), Some("SendCustomEvent"));
        assert_eq!(invocations[0].first_arg_literal_text().as_deref(), Some("Baz"));
    }
}
