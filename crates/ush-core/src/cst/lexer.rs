//! Lexer for the UdonSharp C# subset.
//!
//! Produces a flat token stream with trivia (whitespace, comments) attached
//! as its own tokens so the CST builder can reconstruct the source text
//! byte-for-byte.

use super::UshSyntaxKind;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CstToken {
    pub kind: UshSyntaxKind,
    pub text: String,
    pub range: std::ops::Range<u32>,
}

impl CstToken {
    pub fn new(kind: UshSyntaxKind, text: impl Into<String>, range: std::ops::Range<u32>) -> Self {
        Self {
            kind,
            text: text.into(),
            range,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexerError {
    pub message: String,
    pub offset: u32,
}

pub struct CstLexResult {
    pub tokens: Vec<CstToken>,
    pub errors: Vec<LexerError>,
}

fn keyword_kind(ident: &str) -> Option<UshSyntaxKind> {
    use UshSyntaxKind::*;
    Some(match ident {
        "namespace" => NamespaceKw,
        "using" => UsingKw,
        "class" => ClassKw,
        "struct" => StructKw,
        "interface" => InterfaceKw,
        "enum" => EnumKw,
        "public" => PublicKw,
        "private" => PrivateKw,
        "protected" => ProtectedKw,
        "internal" => InternalKw,
        "static" => StaticKw,
        "readonly" => ReadonlyKw,
        "const" => ConstKw,
        "abstract" => AbstractKw,
        "sealed" => SealedKw,
        "override" => OverrideKw,
        "virtual" => VirtualKw,
        "partial" => PartialKw,
        "new" => NewKw,
        "void" => VoidKw,
        "var" => VarKw,
        "if" => IfKw,
        "else" => ElseKw,
        "for" => ForKw,
        "foreach" => ForeachKw,
        "while" => WhileKw,
        "do" => DoKw,
        "switch" => SwitchKw,
        "case" => CaseKw,
        "default" => DefaultKw,
        "break" => BreakKw,
        "continue" => ContinueKw,
        "return" => ReturnKw,
        "throw" => ThrowKw,
        "try" => TryKw,
        "catch" => CatchKw,
        "finally" => FinallyKw,
        "goto" => GotoKw,
        "null" => NullKw,
        "true" => TrueKw,
        "false" => FalseKw,
        "this" => ThisKw,
        "base" => BaseKw,
        "is" => IsKw,
        "as" => AsKw,
        "typeof" => TypeofKw,
        "nameof" => NameofKw,
        "in" => InKw,
        "out" => OutKw,
        "ref" => RefKw,
        "params" => ParamsKw,
        "get" => GetKw,
        "set" => SetKw,
        _ => return None,
    })
}

/// Lex the full source into a flat token stream, trivia included.
pub fn lex_with_trivia(source: &str) -> (Vec<CstToken>, Vec<LexerError>) {
    let mut lexer = Lexer::new(source);
    lexer.run();
    (lexer.tokens, lexer.errors)
}

struct Lexer<'a> {
    src: &'a str,
    bytes: &'a [u8],
    pos: usize,
    tokens: Vec<CstToken>,
    errors: Vec<LexerError>,
}

impl<'a> Lexer<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            src,
            bytes: src.as_bytes(),
            pos: 0,
            tokens: Vec::new(),
            errors: Vec::new(),
        }
    }

    fn push(&mut self, kind: UshSyntaxKind, start: usize) {
        let text = &self.src[start..self.pos];
        self.tokens
            .push(CstToken::new(kind, text, start as u32..self.pos as u32));
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.bytes.get(self.pos + offset).copied()
    }

    fn bump(&mut self) {
        self.pos += 1;
    }

    fn run(&mut self) {
        while let Some(b) = self.peek() {
            let start = self.pos;
            match b {
                b' ' | b'\t' | b'\r' => {
                    while matches!(self.peek(), Some(b' ') | Some(b'\t') | Some(b'\r')) {
                        self.bump();
                    }
                    self.push(UshSyntaxKind::Whitespace, start);
                }
                b'\n' => {
                    self.bump();
                    self.push(UshSyntaxKind::Newline, start);
                }
                b'/' if self.peek_at(1) == Some(b'/') => {
                    while !matches!(self.peek(), None | Some(b'\n')) {
                        self.bump();
                    }
                    self.push(UshSyntaxKind::CommentLine, start);
                }
                b'/' if self.peek_at(1) == Some(b'*') => {
                    self.bump();
                    self.bump();
                    while let Some(c) = self.peek() {
                        if c == b'*' && self.peek_at(1) == Some(b'/') {
                            self.bump();
                            self.bump();
                            break;
                        }
                        self.bump();
                    }
                    self.push(UshSyntaxKind::CommentBlock, start);
                }
                b'"' => {
                    self.bump();
                    let mut closed = false;
                    while let Some(c) = self.peek() {
                        if c == b'\\' {
                            self.bump();
                            if self.peek().is_some() {
                                self.bump();
                            }
                            continue;
                        }
                        if c == b'"' {
                            self.bump();
                            closed = true;
                            break;
                        }
                        if c == b'\n' {
                            break;
                        }
                        self.bump();
                    }
                    if !closed {
                        self.errors.push(LexerError {
                            message: "unterminated string literal".into(),
                            offset: start as u32,
                        });
                    }
                    self.push(UshSyntaxKind::StringLiteral, start);
                }
                b'\'' => {
                    self.bump();
                    while let Some(c) = self.peek() {
                        if c == b'\\' {
                            self.bump();
                            if self.peek().is_some() {
                                self.bump();
                            }
                            continue;
                        }
                        if c == b'\'' {
                            self.bump();
                            break;
                        }
                        self.bump();
                    }
                    self.push(UshSyntaxKind::CharLiteral, start);
                }
                b'0'..=b'9' => {
                    while matches!(self.peek(), Some(b'0'..=b'9') | Some(b'_')) {
                        self.bump();
                    }
                    let mut is_float = false;
                    if self.peek() == Some(b'.') && matches!(self.peek_at(1), Some(b'0'..=b'9')) {
                        is_float = true;
                        self.bump();
                        while matches!(self.peek(), Some(b'0'..=b'9')) {
                            self.bump();
                        }
                    }
                    while matches!(
                        self.peek(),
                        Some(b'f') | Some(b'F') | Some(b'd') | Some(b'D') | Some(b'm')
                            | Some(b'M') | Some(b'u') | Some(b'U') | Some(b'l') | Some(b'L')
                    ) {
                        is_float = is_float
                            || matches!(
                                self.peek(),
                                Some(b'f') | Some(b'F') | Some(b'd') | Some(b'D') | Some(b'm') | Some(b'M')
                            );
                        self.bump();
                    }
                    self.push(
                        if is_float {
                            UshSyntaxKind::FloatLiteral
                        } else {
                            UshSyntaxKind::IntLiteral
                        },
                        start,
                    );
                }
                b'a'..=b'z' | b'A'..=b'Z' | b'_' => {
                    while matches!(
                        self.peek(),
                        Some(b'a'..=b'z') | Some(b'A'..=b'Z') | Some(b'0'..=b'9') | Some(b'_')
                    ) {
                        self.bump();
                    }
                    let text = &self.src[start..self.pos];
                    let kind = keyword_kind(text).unwrap_or(UshSyntaxKind::Ident);
                    self.push(kind, start);
                }
                _ => self.lex_punctuation(start),
            }
        }
        self.tokens
            .push(CstToken::new(UshSyntaxKind::Eof, "", self.pos as u32..self.pos as u32));
    }

    fn lex_punctuation(&mut self, start: usize) {
        use UshSyntaxKind::*;
        let two = (self.peek(), self.peek_at(1));
        let kind = match two {
            (Some(b'?'), Some(b'.')) => {
                self.bump();
                self.bump();
                QuestionDot
            }
            (Some(b'?'), Some(b'?')) => {
                self.bump();
                self.bump();
                QuestionQuestion
            }
            (Some(b':'), Some(b':')) => {
                self.bump();
                self.bump();
                ColonColon
            }
            (Some(b'='), Some(b'=')) => {
                self.bump();
                self.bump();
                EqEq
            }
            (Some(b'!'), Some(b'=')) => {
                self.bump();
                self.bump();
                NotEq
            }
            (Some(b'<'), Some(b'=')) => {
                self.bump();
                self.bump();
                LtEq
            }
            (Some(b'>'), Some(b'=')) => {
                self.bump();
                self.bump();
                GtEq
            }
            (Some(b'&'), Some(b'&')) => {
                self.bump();
                self.bump();
                AmpAmp
            }
            (Some(b'|'), Some(b'|')) => {
                self.bump();
                self.bump();
                PipePipe
            }
            (Some(b'+'), Some(b'=')) => {
                self.bump();
                self.bump();
                PlusEq
            }
            (Some(b'-'), Some(b'=')) => {
                self.bump();
                self.bump();
                MinusEq
            }
            (Some(b'+'), Some(b'+')) => {
                self.bump();
                self.bump();
                PlusPlus
            }
            (Some(b'-'), Some(b'-')) => {
                self.bump();
                self.bump();
                MinusMinus
            }
            (Some(b'='), Some(b'>')) => {
                self.bump();
                self.bump();
                FatArrow
            }
            (Some(b'-'), Some(b'>')) => {
                self.bump();
                self.bump();
                Arrow
            }
            (Some(b'{'), _) => {
                self.bump();
                LBrace
            }
            (Some(b'}'), _) => {
                self.bump();
                RBrace
            }
            (Some(b'('), _) => {
                self.bump();
                LParen
            }
            (Some(b')'), _) => {
                self.bump();
                RParen
            }
            (Some(b'['), _) => {
                self.bump();
                LBracket
            }
            (Some(b']'), _) => {
                self.bump();
                RBracket
            }
            (Some(b';'), _) => {
                self.bump();
                Semicolon
            }
            (Some(b','), _) => {
                self.bump();
                Comma
            }
            (Some(b'.'), _) => {
                self.bump();
                Dot
            }
            (Some(b':'), _) => {
                self.bump();
                Colon
            }
            (Some(b'?'), _) => {
                self.bump();
                Question
            }
            (Some(b'='), _) => {
                self.bump();
                Eq
            }
            (Some(b'<'), _) => {
                self.bump();
                Lt
            }
            (Some(b'>'), _) => {
                self.bump();
                Gt
            }
            (Some(b'+'), _) => {
                self.bump();
                Plus
            }
            (Some(b'-'), _) => {
                self.bump();
                Minus
            }
            (Some(b'*'), _) => {
                self.bump();
                Star
            }
            (Some(b'/'), _) => {
                self.bump();
                Slash
            }
            (Some(b'%'), _) => {
                self.bump();
                Percent
            }
            (Some(b'&'), _) => {
                self.bump();
                Amp
            }
            (Some(b'|'), _) => {
                self.bump();
                Pipe
            }
            (Some(b'!'), _) => {
                self.bump();
                Bang
            }
            (Some(b'@'), _) => {
                self.bump();
                At
            }
            (Some(other), _) => {
                self.bump();
                self.errors.push(LexerError {
                    message: format!("unexpected character '{}'", other as char),
                    offset: start as u32,
                });
                Error
            }
            (None, _) => return,
        };
        self.push(kind, start);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<UshSyntaxKind> {
        lex_with_trivia(source)
            .0
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn lexes_class_header() {
        let ks = kinds("public class Foo : UdonSharpBehaviour {}");
        assert_eq!(
            ks,
            vec![
                UshSyntaxKind::PublicKw,
                UshSyntaxKind::Whitespace,
                UshSyntaxKind::ClassKw,
                UshSyntaxKind::Whitespace,
                UshSyntaxKind::Ident,
                UshSyntaxKind::Whitespace,
                UshSyntaxKind::Colon,
                UshSyntaxKind::Whitespace,
                UshSyntaxKind::Ident,
                UshSyntaxKind::Whitespace,
                UshSyntaxKind::LBrace,
                UshSyntaxKind::RBrace,
                UshSyntaxKind::Eof,
            ]
        );
    }

    #[test]
    fn roundtrips_source_text() {
        let source = "namespace N { class A { } } // trailing\n";
        let (tokens, errors) = lex_with_trivia(source);
        assert!(errors.is_empty());
        let rebuilt: String = tokens
            .iter()
            .filter(|t| t.kind != UshSyntaxKind::Eof)
            .map(|t| t.text.as_str())
            .collect();
        assert_eq!(rebuilt, source);
    }

    #[test]
    fn reports_unterminated_string() {
        let (_, errors) = lex_with_trivia("\"abc");
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn distinguishes_int_and_float_literals() {
        assert_eq!(kinds("1")[0], UshSyntaxKind::IntLiteral);
        assert_eq!(kinds("1.5")[0], UshSyntaxKind::FloatLiteral);
        assert_eq!(kinds("1f")[0], UshSyntaxKind::FloatLiteral);
    }
}
