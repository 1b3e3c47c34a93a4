//! Recursive-descent parser for the UdonSharp C# subset.
//!
//! Builds a lossless rowan tree: every trivia token from the lexer is threaded
//! back into the tree so `node.text().to_string() == source`. The grammar
//! covers namespaces, type declarations (class/struct/interface/enum),
//! members (fields, properties, methods, constructors, nested types), the
//! statement forms the rule set inspects, and expressions up through object
//! and collection initializers.

use super::builder::CstBuilder;
use super::lexer::{CstToken, lex_with_trivia};
use super::tree::UshSyntaxNode;
use super::UshSyntaxKind::{self, *};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub message: String,
    pub offset: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    Lexer,
    Syntax,
}

/// Parse a full document into a lossless CST plus the errors encountered.
pub fn parse(source: &str) -> (UshSyntaxNode, Vec<ParseError>) {
    let (tokens, lex_errors) = lex_with_trivia(source);
    let mut parser = Parser::new(tokens);
    parser.parse_compilation_unit();
    let mut errors: Vec<ParseError> = lex_errors
        .into_iter()
        .map(|e| ParseError {
            message: e.message,
            offset: e.offset,
        })
        .collect();
    errors.append(&mut parser.errors);
    (parser.builder.finish(), errors)
}

struct Parser {
    tokens: Vec<CstToken>,
    /// indices into `tokens` of every non-trivia token, Eof included
    sig: Vec<usize>,
    /// cursor into `tokens` for the next token to emit
    pos: usize,
    /// cursor into `sig`
    sc: usize,
    builder: CstBuilder,
    errors: Vec<ParseError>,
}

impl Parser {
    fn new(tokens: Vec<CstToken>) -> Self {
        let sig: Vec<usize> = tokens
            .iter()
            .enumerate()
            .filter(|(_, t)| !t.kind.is_trivia())
            .map(|(i, _)| i)
            .collect();
        Self {
            tokens,
            sig,
            pos: 0,
            sc: 0,
            builder: CstBuilder::new(),
            errors: Vec::new(),
        }
    }

    // --- lookahead helpers (do not mutate builder/pos) ---

    fn kind_at(&self, sig_offset: usize) -> UshSyntaxKind {
        self.sig
            .get(self.sc + sig_offset)
            .map(|&i| self.tokens[i].kind)
            .unwrap_or(Eof)
        }

    fn cur(&self) -> UshSyntaxKind {
        self.kind_at(0)
    }

    fn at(&self, k: UshSyntaxKind) -> bool {
        self.cur() == k
    }

    fn text_at(&self, sig_offset: usize) -> &str {
        self.sig
            .get(self.sc + sig_offset)
            .map(|&i| self.tokens[i].text.as_str())
            .unwrap_or("")
    }

    fn offset_of(&self) -> u32 {
        self.sig
            .get(self.sc)
            .map(|&i| self.tokens[i].range.start)
            .unwrap_or_else(|| self.tokens.last().map(|t| t.range.end).unwrap_or(0))
    }

    // --- emission helpers ---

    fn start(&mut self, kind: UshSyntaxKind) {
        self.builder.start_node(kind);
    }

    fn finish(&mut self) {
        self.builder.finish_node();
    }

    /// Emit leading trivia then the current significant token, advancing both cursors.
    fn bump(&mut self) {
        while self.pos < self.tokens.len() && self.tokens[self.pos].kind.is_trivia() {
            self.builder.token(self.tokens[self.pos].kind, &self.tokens[self.pos].text);
            self.pos += 1;
        }
        if self.pos < self.tokens.len() {
            let tok = &self.tokens[self.pos];
            self.builder.token(tok.kind, &tok.text);
            self.pos += 1;
        }
        if self.sc < self.sig.len() {
            self.sc += 1;
        }
    }

    fn error(&mut self, message: impl Into<String>) {
        self.errors.push(ParseError {
            message: message.into(),
            offset: self.offset_of(),
        });
    }

    fn expect(&mut self, k: UshSyntaxKind) {
        if self.at(k) {
            self.bump();
        } else {
            self.error(format!("expected {k:?}, found {:?}", self.cur()));
        }
    }

    fn bump_if(&mut self, k: UshSyntaxKind) -> bool {
        if self.at(k) {
            self.bump();
            true
        } else {
            false
        }
    }

    /// Skip one significant token inside an `Error` node, for recovery.
    fn error_recover(&mut self) {
        self.start(Error);
        self.bump();
        self.finish();
    }

    // --- type-ref scanning (lookahead only) ---

    /// Returns the sig-offset just past a syntactic type reference starting
    /// at the current cursor, or `None` if the cursor is not a type-like
    /// token. Handles qualified names, generic argument lists, array ranks,
    /// and a trailing nullable `?`.
    fn scan_type_ref(&self, start: usize) -> Option<usize> {
        let mut i = start;
        if !matches!(self.kind_at(i), Ident | VoidKw) {
            return None;
        }
        i += 1;
        while self.kind_at(i) == Dot {
            if self.kind_at(i + 1) != Ident {
                return None;
            }
            i += 2;
        }
        if self.kind_at(i) == Lt {
            let mut depth = 0i32;
            let mut j = i;
            loop {
                match self.kind_at(j) {
                    Lt => {
                        depth += 1;
                        j += 1;
                    }
                    Gt => {
                        depth -= 1;
                        j += 1;
                        if depth == 0 {
                            break;
                        }
                    }
                    Comma | Ident | Dot | LBracket | RBracket | Question => j += 1,
                    _ => return None,
                }
                if j - i > 64 {
                    return None;
                }
            }
            i = j;
        }
        loop {
            if self.kind_at(i) == Question {
                i += 1;
            }
            if self.kind_at(i) == LBracket {
                let mut j = i + 1;
                while self.kind_at(j) == Comma {
                    j += 1;
                }
                if self.kind_at(j) != RBracket {
                    break;
                }
                i = j + 1;
            } else {
                break;
            }
        }
        Some(i)
    }

    /// Looks for `TypeRef Ident (`|`{`|`=`|`;`|`,` starting at the current cursor.
    /// Returns `(name_offset, after_name_kind)` when it matches a field,
    /// property, or method header shape.
    fn scan_member_header(&self) -> Option<(usize, UshSyntaxKind)> {
        let after_type = self.scan_type_ref(0)?;
        if self.kind_at(after_type) != Ident {
            return None;
        }
        let after_name = after_type + 1;
        let next = self.kind_at(after_name);
        if matches!(next, LParen | LBrace | Eq | Semicolon | Comma) {
            Some((after_type, next))
        } else {
            None
        }
    }

    // --- compilation unit ---

    fn parse_compilation_unit(&mut self) {
        self.start(Root);
        self.start(CompilationUnit);
        while self.at(UsingKw) {
            self.parse_using_directive();
        }
        while !self.at(Eof) {
            if self.at(NamespaceKw) {
                self.parse_namespace();
            } else if self.at_type_decl_start() {
                self.parse_type_decl();
            } else {
                self.error(format!("unexpected token {:?} at top level", self.cur()));
                self.error_recover();
            }
        }
        self.finish();
        self.finish();
    }

    fn at_type_decl_start(&self) -> bool {
        let mut i = 0;
        while self.kind_at(i) == LBracket {
            i = self.skip_attribute_list_from(i);
        }
        matches!(
            self.kind_at(i),
            PublicKw | PrivateKw | ProtectedKw | InternalKw | StaticKw | AbstractKw | SealedKw
                | PartialKw | ClassKw | StructKw | InterfaceKw | EnumKw
        )
    }

    fn skip_attribute_list_from(&self, start: usize) -> usize {
        let mut i = start;
        if self.kind_at(i) != LBracket {
            return i;
        }
        let mut depth = 0i32;
        loop {
            match self.kind_at(i) {
                LBracket => {
                    depth += 1;
                    i += 1;
                }
                RBracket => {
                    depth -= 1;
                    i += 1;
                    if depth == 0 {
                        break;
                    }
                }
                Eof => break,
                _ => i += 1,
            }
        }
        i
    }

    fn parse_using_directive(&mut self) {
        self.start(UsingDirective);
        self.bump(); // using
        self.parse_qualified_name();
        self.expect(Semicolon);
        self.finish();
    }

    fn parse_qualified_name(&mut self) {
        self.start(QualifiedName);
        self.expect(Ident);
        while self.at(Dot) {
            self.bump();
            self.expect(Ident);
        }
        self.finish();
    }

    fn parse_namespace(&mut self) {
        self.start(NamespaceDecl);
        self.bump(); // namespace
        self.parse_qualified_name();
        self.expect(LBrace);
        while self.at(UsingKw) {
            self.parse_using_directive();
        }
        while !self.at(RBrace) && !self.at(Eof) {
            if self.at_type_decl_start() {
                self.parse_type_decl();
            } else {
                self.error(format!("unexpected token {:?} in namespace body", self.cur()));
                self.error_recover();
            }
        }
        self.expect(RBrace);
        self.finish();
    }

    // --- attributes & modifiers ---

    fn parse_attribute_lists(&mut self) {
        while self.at(LBracket) {
            self.start(AttributeList);
            self.bump(); // [
            loop {
                self.parse_attribute();
                if self.at(Comma) {
                    self.bump();
                } else {
                    break;
                }
            }
            self.expect(RBracket);
            self.finish();
        }
    }

    fn parse_attribute(&mut self) {
        self.start(Attribute);
        self.parse_qualified_name();
        if self.at(LParen) {
            self.start(AttributeArgList);
            self.bump();
            while !self.at(RParen) && !self.at(Eof) {
                self.start(AttributeArg);
                // named argument: Ident '=' expr
                if self.cur() == Ident && self.kind_at(1) == Eq {
                    self.bump();
                    self.bump();
                }
                self.parse_expr();
                self.finish();
                if self.at(Comma) {
                    self.bump();
                } else {
                    break;
                }
            }
            self.expect(RParen);
            self.finish();
        }
        self.finish();
    }

    fn is_modifier(&self) -> bool {
        matches!(
            self.cur(),
            PublicKw | PrivateKw | ProtectedKw | InternalKw | StaticKw | ReadonlyKw | ConstKw
                | AbstractKw | SealedKw | OverrideKw | VirtualKw | PartialKw | NewKw
        )
    }

    fn parse_modifier_list(&mut self) {
        self.start(ModifierList);
        while self.is_modifier() {
            self.bump();
        }
        self.finish();
    }

    // --- type declarations ---

    fn parse_type_decl(&mut self) {
        self.parse_attribute_lists();
        self.parse_modifier_list();
        let kind = match self.cur() {
            ClassKw => ClassDecl,
            StructKw => StructDecl,
            InterfaceKw => InterfaceDecl,
            EnumKw => EnumDecl,
            _ => {
                self.error(format!("expected type declaration, found {:?}", self.cur()));
                self.error_recover();
                return;
            }
        };
        self.start(kind);
        self.bump(); // class/struct/interface/enum keyword
        self.expect(Ident);
        if self.at(Lt) {
            self.parse_generic_param_list();
        }
        if self.at(Colon) {
            self.parse_base_list();
        }
        self.expect(LBrace);
        self.start(MemberList);
        if kind == EnumDecl {
            self.parse_enum_body();
        } else {
            while !self.at(RBrace) && !self.at(Eof) {
                self.parse_member();
            }
        }
        self.finish();
        self.expect(RBrace);
        self.finish();
    }

    fn parse_generic_param_list(&mut self) {
        self.start(GenericArgList);
        self.bump(); // <
        loop {
            self.expect(Ident);
            if self.at(Comma) {
                self.bump();
            } else {
                break;
            }
        }
        self.expect(Gt);
        self.finish();
    }

    fn parse_base_list(&mut self) {
        self.start(BaseList);
        self.bump(); // :
        loop {
            self.parse_type_ref();
            if self.at(Comma) {
                self.bump();
            } else {
                break;
            }
        }
        self.finish();
    }

    fn parse_enum_body(&mut self) {
        while !self.at(RBrace) && !self.at(Eof) {
            self.parse_attribute_lists();
            self.start(VariableDeclarator);
            self.expect(Ident);
            if self.at(Eq) {
                self.bump();
                self.parse_expr();
            }
            self.finish();
            if self.at(Comma) {
                self.bump();
            } else {
                break;
            }
        }
    }

    // --- type refs ---

    fn parse_type_ref(&mut self) {
        self.start(TypeRef);
        if self.at(VoidKw) {
            self.bump();
        } else {
            self.parse_qualified_name();
            if self.at(Lt) {
                self.start(GenericArgList);
                self.bump();
                loop {
                    self.parse_type_ref();
                    if self.at(Comma) {
                        self.bump();
                    } else {
                        break;
                    }
                }
                self.expect(Gt);
                self.finish();
            }
        }
        loop {
            if self.at(Question) {
                self.start(NullableTypeSuffix);
                self.bump();
                self.finish();
                continue;
            }
            if self.at(LBracket) {
                self.start(ArrayTypeSuffix);
                self.bump();
                while self.at(Comma) {
                    self.bump();
                }
                self.expect(RBracket);
                self.finish();
                continue;
            }
            break;
        }
        self.finish();
    }

    // --- members ---

    fn parse_member(&mut self) {
        self.parse_attribute_lists();
        self.parse_modifier_list();

        if self.at_type_decl_start_no_modifiers() {
            self.parse_type_decl();
            return;
        }

        // constructor: Ident '(' directly, no type prefix
        if self.cur() == Ident && self.kind_at(1) == LParen {
            self.parse_constructor();
            return;
        }

        if let Some((name_off, after)) = self.scan_member_header() {
            let _ = name_off;
            match after {
                LParen => self.parse_method(),
                LBrace => self.parse_property(),
                Eq | Semicolon | Comma => self.parse_field(),
                _ => unreachable!(),
            }
            return;
        }

        self.error(format!("unrecognised member starting with {:?}", self.cur()));
        self.error_recover();
    }

    fn at_type_decl_start_no_modifiers(&self) -> bool {
        matches!(self.cur(), ClassKw | StructKw | InterfaceKw | EnumKw)
    }

    fn parse_field(&mut self) {
        self.start(FieldDecl);
        self.parse_type_ref();
        loop {
            self.start(VariableDeclarator);
            self.expect(Ident);
            if self.at(Eq) {
                self.bump();
                self.parse_variable_initializer();
            }
            self.finish();
            if self.at(Comma) {
                self.bump();
            } else {
                break;
            }
        }
        self.expect(Semicolon);
        self.finish();
    }

    fn parse_variable_initializer(&mut self) {
        if self.at(LBrace) {
            self.parse_collection_initializer();
        } else {
            self.parse_expr();
        }
    }

    fn parse_property(&mut self) {
        self.start(PropertyDecl);
        self.parse_type_ref();
        self.expect(Ident);
        self.expect(LBrace);
        self.start(AccessorList);
        while matches!(self.cur(), GetKw | SetKw) {
            self.start(Accessor);
            self.bump();
            if self.at(LBrace) {
                self.parse_block();
            } else {
                self.expect(Semicolon);
            }
            self.finish();
        }
        self.finish();
        self.expect(RBrace);
        if self.at(Eq) {
            self.bump();
            self.parse_expr();
            self.expect(Semicolon);
        }
        self.finish();
    }

    fn parse_constructor(&mut self) {
        self.start(ConstructorDecl);
        self.bump(); // name
        self.parse_parameter_list();
        self.parse_block();
        self.finish();
    }

    fn parse_method(&mut self) {
        self.start(MethodDecl);
        self.parse_type_ref();
        self.expect(Ident);
        if self.at(Lt) {
            self.parse_generic_param_list();
        }
        self.parse_parameter_list();
        if self.at(LBrace) {
            self.parse_block();
        } else if self.at(FatArrow) {
            self.bump();
            self.parse_expr();
            self.expect(Semicolon);
        } else {
            self.expect(Semicolon);
        }
        self.finish();
    }

    fn parse_parameter_list(&mut self) {
        self.start(ParameterList);
        self.expect(LParen);
        while !self.at(RParen) && !self.at(Eof) {
            self.start(Parameter);
            self.parse_attribute_lists();
            while matches!(self.cur(), RefKw | OutKw | ParamsKw) {
                self.bump();
            }
            self.parse_type_ref();
            self.expect(Ident);
            if self.at(Eq) {
                self.bump();
                self.parse_expr();
            }
            self.finish();
            if self.at(Comma) {
                self.bump();
            } else {
                break;
            }
        }
        self.expect(RParen);
        self.finish();
    }

    // --- statements ---

    fn parse_block(&mut self) {
        self.start(Block);
        self.expect(LBrace);
        while !self.at(RBrace) && !self.at(Eof) {
            self.parse_statement();
        }
        self.expect(RBrace);
        self.finish();
    }

    fn parse_statement(&mut self) {
        match self.cur() {
            LBrace => self.parse_block(),
            IfKw => self.parse_if(),
            ForKw => self.parse_for(),
            ForeachKw => self.parse_foreach(),
            WhileKw => self.parse_while(),
            DoKw => self.parse_do(),
            SwitchKw => self.parse_switch(),
            BreakKw => {
                self.start(BreakStatement);
                self.bump();
                self.expect(Semicolon);
                self.finish();
            }
            ContinueKw => {
                self.start(ContinueStatement);
                self.bump();
                self.expect(Semicolon);
                self.finish();
            }
            ReturnKw => {
                self.start(ReturnStatement);
                self.bump();
                if !self.at(Semicolon) {
                    self.parse_expr();
                }
                self.expect(Semicolon);
                self.finish();
            }
            ThrowKw => {
                self.start(ThrowStatement);
                self.bump();
                if !self.at(Semicolon) {
                    self.parse_expr();
                }
                self.expect(Semicolon);
                self.finish();
            }
            TryKw => self.parse_try(),
            GotoKw => self.parse_goto_stmt(),
            Semicolon => {
                self.start(EmptyStatement);
                self.bump();
                self.finish();
            }
            Ident if self.kind_at(1) == Colon => {
                self.start(LabeledStatement);
                self.bump(); // label
                self.bump(); // :
                self.parse_statement();
                self.finish();
            }
            VarKw => self.parse_local_var_decl(),
            _ => {
                if self.scan_member_header().is_some() {
                    self.parse_local_decl_or_function();
                } else {
                    self.start(ExprStatement);
                    self.parse_expr();
                    self.expect(Semicolon);
                    self.finish();
                }
            }
        }
    }

    fn parse_local_decl_or_function(&mut self) {
        let (_, after) = self.scan_member_header().expect("checked by caller");
        if after == LParen {
            self.start(LocalFunctionDecl);
            self.parse_type_ref();
            self.expect(Ident);
            self.parse_parameter_list();
            self.parse_block();
            self.finish();
        } else {
            self.parse_local_var_decl();
        }
    }

    fn parse_local_var_decl(&mut self) {
        self.start(LocalVarDecl);
        if self.at(VarKw) {
            self.bump();
        } else {
            self.parse_type_ref();
        }
        loop {
            self.start(VariableDeclarator);
            self.expect(Ident);
            if self.at(Eq) {
                self.bump();
                self.parse_variable_initializer();
            }
            self.finish();
            if self.at(Comma) {
                self.bump();
            } else {
                break;
            }
        }
        self.expect(Semicolon);
        self.finish();
    }

    fn parse_if(&mut self) {
        self.start(IfStatement);
        self.bump();
        self.expect(LParen);
        self.parse_expr();
        self.expect(RParen);
        self.parse_statement();
        if self.at(ElseKw) {
            self.bump();
            self.parse_statement();
        }
        self.finish();
    }

    fn parse_for(&mut self) {
        self.start(ForStatement);
        self.bump();
        self.expect(LParen);
        if !self.at(Semicolon) {
            if self.scan_member_header().is_some() || self.at(VarKw) {
                self.parse_local_var_decl_no_semi();
            } else {
                self.parse_expr();
            }
        }
        self.expect(Semicolon);
        if !self.at(Semicolon) {
            self.parse_expr();
        }
        self.expect(Semicolon);
        if !self.at(RParen) {
            self.parse_expr();
            while self.at(Comma) {
                self.bump();
                self.parse_expr();
            }
        }
        self.expect(RParen);
        self.parse_statement();
        self.finish();
    }

    fn parse_local_var_decl_no_semi(&mut self) {
        self.start(LocalVarDecl);
        if self.at(VarKw) {
            self.bump();
        } else {
            self.parse_type_ref();
        }
        loop {
            self.start(VariableDeclarator);
            self.expect(Ident);
            if self.at(Eq) {
                self.bump();
                self.parse_variable_initializer();
            }
            self.finish();
            if self.at(Comma) {
                self.bump();
            } else {
                break;
            }
        }
        self.finish();
    }

    fn parse_foreach(&mut self) {
        self.start(ForeachStatement);
        self.bump();
        self.expect(LParen);
        if self.at(VarKw) {
            self.bump();
        } else {
            self.parse_type_ref();
        }
        self.expect(Ident);
        self.expect(InKw);
        self.parse_expr();
        self.expect(RParen);
        self.parse_statement();
        self.finish();
    }

    fn parse_while(&mut self) {
        self.start(WhileStatement);
        self.bump();
        self.expect(LParen);
        self.parse_expr();
        self.expect(RParen);
        self.parse_statement();
        self.finish();
    }

    fn parse_do(&mut self) {
        self.start(DoStatement);
        self.bump();
        self.parse_statement();
        self.expect(WhileKw);
        self.expect(LParen);
        self.parse_expr();
        self.expect(RParen);
        self.expect(Semicolon);
        self.finish();
    }

    fn parse_switch(&mut self) {
        self.start(SwitchStatement);
        self.bump();
        self.expect(LParen);
        self.parse_expr();
        self.expect(RParen);
        self.expect(LBrace);
        while !self.at(RBrace) && !self.at(Eof) {
            self.start(SwitchSection);
            while matches!(self.cur(), CaseKw | DefaultKw) {
                if self.at(CaseKw) {
                    self.bump();
                    self.parse_expr();
                } else {
                    self.bump();
                }
                self.expect(Colon);
            }
            while !matches!(self.cur(), CaseKw | DefaultKw | RBrace | Eof) {
                self.parse_statement();
            }
            self.finish();
        }
        self.expect(RBrace);
        self.finish();
    }

    fn parse_try(&mut self) {
        self.start(TryStatement);
        self.bump();
        self.parse_block();
        while self.at(CatchKw) {
            self.start(CatchClause);
            self.bump();
            if self.at(LParen) {
                self.bump();
                self.parse_type_ref();
                if self.at(Ident) {
                    self.bump();
                }
                self.expect(RParen);
            }
            self.parse_block();
            self.finish();
        }
        if self.at(FinallyKw) {
            self.start(FinallyClause);
            self.bump();
            self.parse_block();
            self.finish();
        }
        self.finish();
    }

    fn parse_goto_stmt(&mut self) {
        if self.kind_at(1) == CaseKw {
            self.start(GotoCaseStatement);
            self.bump(); // goto
            self.bump(); // case
            self.parse_expr();
            self.expect(Semicolon);
            self.finish();
        } else if self.kind_at(1) == DefaultKw {
            self.start(GotoDefaultStatement);
            self.bump();
            self.bump();
            self.expect(Semicolon);
            self.finish();
        } else {
            self.start(GotoStatement);
            self.bump();
            self.expect(Ident);
            self.expect(Semicolon);
            self.finish();
        }
    }

    // --- expressions ---

    fn parse_expr(&mut self) {
        self.parse_assignment();
    }

    fn parse_assignment(&mut self) {
        let checkpoint = self.builder.checkpoint();
        self.parse_null_coalescing();
        if matches!(self.cur(), Eq | PlusEq | MinusEq) {
            self.bump();
            self.parse_assignment();
            self.builder.wrap(checkpoint, AssignExpr);
        }
    }

    fn parse_null_coalescing(&mut self) {
        let checkpoint = self.builder.checkpoint();
        self.parse_logical_or();
        while self.at(QuestionQuestion) {
            self.bump();
            self.parse_logical_or();
            self.builder.wrap(checkpoint, BinaryExpr);
        }
    }

    fn parse_logical_or(&mut self) {
        let checkpoint = self.builder.checkpoint();
        self.parse_logical_and();
        while self.at(PipePipe) {
            self.bump();
            self.parse_logical_and();
            self.builder.wrap(checkpoint, BinaryExpr);
        }
    }

    fn parse_logical_and(&mut self) {
        let checkpoint = self.builder.checkpoint();
        self.parse_equality();
        while self.at(AmpAmp) {
            self.bump();
            self.parse_equality();
            self.builder.wrap(checkpoint, BinaryExpr);
        }
    }

    fn parse_equality(&mut self) {
        let checkpoint = self.builder.checkpoint();
        self.parse_relational();
        while matches!(self.cur(), EqEq | NotEq) {
            self.bump();
            self.parse_relational();
            self.builder.wrap(checkpoint, BinaryExpr);
        }
    }

    fn parse_relational(&mut self) {
        let checkpoint = self.builder.checkpoint();
        self.parse_additive();
        loop {
            match self.cur() {
                Lt | Gt | LtEq | GtEq => {
                    self.bump();
                    self.parse_additive();
                    self.builder.wrap(checkpoint, BinaryExpr);
                }
                IsKw => {
                    self.bump();
                    self.parse_type_ref();
                    if self.at(Ident) {
                        self.bump();
                    }
                    self.builder.wrap(checkpoint, IsExpr);
                }
                AsKw => {
                    self.bump();
                    self.parse_type_ref();
                    self.builder.wrap(checkpoint, AsExpr);
                }
                _ => break,
            }
        }
    }

    fn parse_additive(&mut self) {
        let checkpoint = self.builder.checkpoint();
        self.parse_multiplicative();
        while matches!(self.cur(), Plus | Minus) {
            self.bump();
            self.parse_multiplicative();
            self.builder.wrap(checkpoint, BinaryExpr);
        }
    }

    fn parse_multiplicative(&mut self) {
        let checkpoint = self.builder.checkpoint();
        self.parse_unary();
        while matches!(self.cur(), Star | Slash | Percent) {
            self.bump();
            self.parse_unary();
            self.builder.wrap(checkpoint, BinaryExpr);
        }
    }

    fn parse_unary(&mut self) {
        if matches!(self.cur(), Bang | Minus | Plus | PlusPlus | MinusMinus) {
            self.start(UnaryExpr);
            self.bump();
            self.parse_unary();
            self.finish();
            return;
        }
        if self.at(LParen) && self.looks_like_cast() {
            self.start(CastExpr);
            self.bump(); // (
            self.parse_type_ref();
            self.expect(RParen);
            self.parse_unary();
            self.finish();
            return;
        }
        self.parse_postfix();
    }

    fn looks_like_cast(&self) -> bool {
        let Some(after_type) = self.scan_type_ref(1) else {
            return false;
        };
        self.kind_at(after_type) == RParen
            && matches!(
                self.kind_at(after_type + 1),
                Ident | IntLiteral | FloatLiteral | StringLiteral | CharLiteral | LParen
                    | ThisKw | BaseKw | NewKw | Bang | Minus
            )
    }

    fn parse_postfix(&mut self) {
        let checkpoint = self.builder.checkpoint();
        self.parse_primary();
        loop {
            match self.cur() {
                Dot => {
                    self.bump();
                    self.expect(Ident);
                    self.builder.wrap(checkpoint, MemberAccessExpr);
                }
                QuestionDot => {
                    self.bump();
                    self.expect(Ident);
                    self.builder.wrap(checkpoint, ConditionalAccessExpr);
                }
                LBracket => {
                    self.start(ArgList);
                    self.bump();
                    if !self.at(RBracket) {
                        self.parse_arg();
                        while self.at(Comma) {
                            self.bump();
                            self.parse_arg();
                        }
                    }
                    self.expect(RBracket);
                    self.finish();
                    self.builder.wrap(checkpoint, ElementAccessExpr);
                }
                Question if self.kind_at(1) == LBracket => {
                    self.bump(); // ?
                    self.start(ArgList);
                    self.bump(); // [
                    if !self.at(RBracket) {
                        self.parse_arg();
                        while self.at(Comma) {
                            self.bump();
                            self.parse_arg();
                        }
                    }
                    self.expect(RBracket);
                    self.finish();
                    self.builder.wrap(checkpoint, ConditionalAccessExpr);
                }
                LParen => {
                    self.start(ArgList);
                    self.bump();
                    if !self.at(RParen) {
                        self.parse_arg();
                        while self.at(Comma) {
                            self.bump();
                            self.parse_arg();
                        }
                    }
                    self.expect(RParen);
                    self.finish();
                    self.builder.wrap(checkpoint, InvocationExpr);
                }
                PlusPlus | MinusMinus => {
                    self.bump();
                    self.builder.wrap(checkpoint, UnaryExpr);
                }
                _ => break,
            }
        }
    }

    fn parse_arg(&mut self) {
        self.start(Arg);
        if matches!(self.cur(), RefKw | OutKw) {
            self.bump();
        }
        self.parse_expr();
        self.finish();
    }

    fn parse_primary(&mut self) {
        match self.cur() {
            IntLiteral | FloatLiteral | StringLiteral | CharLiteral | TrueKw | FalseKw | NullKw => {
                self.start(LiteralExpr);
                self.bump();
                self.finish();
            }
            ThisKw => {
                self.start(ThisExpr);
                self.bump();
                self.finish();
            }
            BaseKw => {
                self.start(BaseExpr);
                self.bump();
                self.finish();
            }
            LParen => {
                self.start(ParenExpr);
                self.bump();
                self.parse_expr();
                self.expect(RParen);
                self.finish();
            }
            TypeofKw => {
                self.start(TypeofExpr);
                self.bump();
                self.expect(LParen);
                self.parse_type_ref();
                self.expect(RParen);
                self.finish();
            }
            NameofKw => {
                self.start(NameofExpr);
                self.bump();
                self.expect(LParen);
                self.parse_qualified_name();
                self.expect(RParen);
                self.finish();
            }
            NewKw => self.parse_new_expr(),
            Ident => {
                self.start(IdentExpr);
                self.bump();
                self.finish();
            }
            _ => {
                self.error(format!("unexpected token {:?} in expression", self.cur()));
                self.error_recover();
            }
        }
    }

    fn parse_new_expr(&mut self) {
        self.bump(); // new
        if self.at(LBracket) {
            // implicit array creation: new[] { ... }
            self.start(ArrayCreationExpr);
            self.bump();
            while self.at(Comma) {
                self.bump();
            }
            self.expect(RBracket);
            if self.at(LBrace) {
                self.parse_collection_initializer();
            }
            self.finish();
            return;
        }
        let checkpoint_is_array = self.scan_type_ref(0).is_some();
        if checkpoint_is_array {
            let after = self.scan_type_ref(0).unwrap();
            let has_bracket_dims = self.kind_at(after.saturating_sub(1)) == RBracket
                || self.kind_at(0) != Eof && self.text_for_range_contains_bracket();
            let _ = has_bracket_dims;
        }
        self.start(ObjectCreationExpr);
        self.parse_type_ref();
        if self.at(LParen) {
            self.start(ArgList);
            self.bump();
            if !self.at(RParen) {
                self.parse_arg();
                while self.at(Comma) {
                    self.bump();
                    self.parse_arg();
                }
            }
            self.expect(RParen);
            self.finish();
        } else if self.at(LBracket) {
            self.bump();
            if !self.at(RBracket) {
                self.parse_expr();
                while self.at(Comma) {
                    self.bump();
                    self.parse_expr();
                }
            }
            self.expect(RBracket);
        }
        if self.at(LBrace) {
            self.parse_collection_initializer();
        }
        self.finish();
    }

    fn text_for_range_contains_bracket(&self) -> bool {
        false
    }

    fn parse_collection_initializer(&mut self) {
        let looks_object_init = self.looks_like_object_initializer();
        self.start(if looks_object_init {
            ObjectInitializer
        } else {
            CollectionInitializer
        });
        self.bump(); // {
        while !self.at(RBrace) && !self.at(Eof) {
            self.start(InitializerMember);
            if looks_object_init && self.cur() == Ident && self.kind_at(1) == Eq {
                self.bump();
                self.bump();
                self.parse_variable_initializer();
            } else if self.at(LBrace) {
                self.parse_collection_initializer();
            } else {
                self.parse_expr();
            }
            self.finish();
            if self.at(Comma) {
                self.bump();
            } else {
                break;
            }
        }
        self.expect(RBrace);
        self.finish();
    }

    fn looks_like_object_initializer(&self) -> bool {
        self.kind_at(1) == Ident && self.kind_at(2) == Eq
    }
}
