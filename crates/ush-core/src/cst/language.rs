//! Rowan language implementation for the UdonSharp C# subset grammar.

use rowan::Language;

use super::UshSyntaxKind;

/// Zero-sized type connecting `UshSyntaxKind` to rowan's generic CST machinery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UshLanguage;

impl Language for UshLanguage {
    type Kind = UshSyntaxKind;

    fn kind_from_raw(raw: rowan::SyntaxKind) -> Self::Kind {
        use UshSyntaxKind::*;
        match raw.0 {
            0 => Whitespace,
            1 => CommentLine,
            2 => CommentBlock,
            3 => Newline,
            10 => NamespaceKw,
            11 => UsingKw,
            12 => ClassKw,
            13 => StructKw,
            14 => InterfaceKw,
            15 => EnumKw,
            16 => PublicKw,
            17 => PrivateKw,
            18 => ProtectedKw,
            19 => InternalKw,
            20 => StaticKw,
            21 => ReadonlyKw,
            22 => ConstKw,
            23 => AbstractKw,
            24 => SealedKw,
            25 => OverrideKw,
            26 => VirtualKw,
            27 => PartialKw,
            28 => NewKw,
            29 => VoidKw,
            30 => VarKw,
            31 => IfKw,
            32 => ElseKw,
            33 => ForKw,
            34 => ForeachKw,
            35 => WhileKw,
            36 => DoKw,
            37 => SwitchKw,
            38 => CaseKw,
            39 => DefaultKw,
            40 => BreakKw,
            41 => ContinueKw,
            42 => ReturnKw,
            43 => ThrowKw,
            44 => TryKw,
            45 => CatchKw,
            46 => FinallyKw,
            47 => GotoKw,
            48 => NullKw,
            49 => TrueKw,
            50 => FalseKw,
            51 => ThisKw,
            52 => BaseKw,
            53 => IsKw,
            54 => AsKw,
            55 => TypeofKw,
            56 => NameofKw,
            57 => InKw,
            58 => OutKw,
            59 => RefKw,
            60 => ParamsKw,
            61 => GetKw,
            62 => SetKw,
            100 => LBrace,
            101 => RBrace,
            102 => LParen,
            103 => RParen,
            104 => LBracket,
            105 => RBracket,
            106 => Semicolon,
            107 => Comma,
            108 => Dot,
            109 => Colon,
            110 => ColonColon,
            111 => QuestionDot,
            112 => QuestionQuestion,
            113 => Question,
            114 => Arrow,
            115 => FatArrow,
            116 => Eq,
            117 => EqEq,
            118 => NotEq,
            119 => Lt,
            120 => Gt,
            121 => LtEq,
            122 => GtEq,
            123 => Plus,
            124 => Minus,
            125 => Star,
            126 => Slash,
            127 => Percent,
            128 => Amp,
            129 => AmpAmp,
            130 => Pipe,
            131 => PipePipe,
            132 => Bang,
            133 => PlusEq,
            134 => MinusEq,
            135 => PlusPlus,
            136 => MinusMinus,
            137 => At,
            150 => Ident,
            151 => IntLiteral,
            152 => FloatLiteral,
            153 => StringLiteral,
            154 => CharLiteral,
            200 => Root,
            201 => CompilationUnit,
            202 => UsingDirective,
            203 => NamespaceDecl,
            204 => ClassDecl,
            205 => StructDecl,
            206 => InterfaceDecl,
            207 => EnumDecl,
            208 => BaseList,
            209 => TypeRef,
            210 => AttributeList,
            211 => Attribute,
            212 => AttributeArgList,
            213 => AttributeArg,
            214 => ModifierList,
            215 => MemberList,
            216 => FieldDecl,
            217 => VariableDeclarator,
            218 => MethodDecl,
            219 => ConstructorDecl,
            220 => ParameterList,
            221 => Parameter,
            222 => PropertyDecl,
            223 => AccessorList,
            224 => Accessor,
            225 => LocalFunctionDecl,
            226 => ArrayTypeSuffix,
            227 => NullableTypeSuffix,
            228 => GenericArgList,
            300 => Block,
            301 => ExprStatement,
            302 => LocalVarDecl,
            303 => IfStatement,
            304 => ForStatement,
            305 => ForeachStatement,
            306 => WhileStatement,
            307 => DoStatement,
            308 => SwitchStatement,
            309 => SwitchSection,
            310 => BreakStatement,
            311 => ContinueStatement,
            312 => ReturnStatement,
            313 => ThrowStatement,
            314 => TryStatement,
            315 => CatchClause,
            316 => FinallyClause,
            317 => GotoStatement,
            318 => GotoCaseStatement,
            319 => GotoDefaultStatement,
            320 => LabeledStatement,
            321 => EmptyStatement,
            400 => InvocationExpr,
            401 => MemberAccessExpr,
            402 => ConditionalAccessExpr,
            403 => ElementAccessExpr,
            404 => IdentExpr,
            405 => LiteralExpr,
            406 => ArgList,
            407 => Arg,
            408 => AssignExpr,
            409 => BinaryExpr,
            410 => UnaryExpr,
            411 => ParenExpr,
            412 => IsExpr,
            413 => AsExpr,
            414 => TypeofExpr,
            415 => NameofExpr,
            416 => ObjectCreationExpr,
            417 => ArrayCreationExpr,
            418 => ObjectInitializer,
            419 => CollectionInitializer,
            420 => InitializerMember,
            421 => ThisExpr,
            422 => BaseExpr,
            423 => CastExpr,
            424 => LambdaExpr,
            425 => QualifiedName,
            900 => Error,
            901 => Eof,
            999 => Tombstone,
            other => {
                tracing::warn!("unknown syntax kind: {}", other);
                Unknown
            }
        }
    }

    fn kind_to_raw(kind: Self::Kind) -> rowan::SyntaxKind {
        rowan::SyntaxKind(kind as u16)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrips_every_sampled_kind() {
        for kind in [
            UshSyntaxKind::Whitespace,
            UshSyntaxKind::ClassKw,
            UshSyntaxKind::Ident,
            UshSyntaxKind::ClassDecl,
            UshSyntaxKind::InvocationExpr,
            UshSyntaxKind::Root,
        ] {
            let raw = UshLanguage::kind_to_raw(kind);
            assert_eq!(UshLanguage::kind_from_raw(raw), kind);
        }
    }
}
