//! Lexer shared by grammar and transform-override text.
//!
//! Produces span-based tokens without storing text; text is sliced from source only when needed.
//!
//! ## Error handling
//!
//! The lexer coalesces consecutive error characters into single `Garbage` tokens rather
//! than producing one error per character.

use std::ops::Range;

use logos::Logos;
use rowan::TextRange;

/// Token kinds. Keywords are only those that start declarations; expression words
/// such as `with` or `child` are matched contextually so they stay usable as names.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u16)]
pub enum SyntaxKind {
    #[token("(")]
    ParenOpen = 0,

    #[token(")")]
    ParenClose,

    #[token("[")]
    BracketOpen,

    #[token("]")]
    BracketClose,

    #[token("{")]
    BraceOpen,

    #[token("}")]
    BraceClose,

    /// `::` for embedded references. Defined before `Colon` for correct precedence.
    #[token("::")]
    DoubleColon,

    #[token(":=")]
    ColonEquals,

    #[token(":")]
    Colon,

    #[token("==")]
    EqualsEquals,

    #[token("=")]
    Equals,

    /// Append-alternative override marker.
    #[token("+=|")]
    AppendEquals,

    #[token("->")]
    Arrow,

    #[token("||")]
    PipePipe,

    #[token("|")]
    Pipe,

    #[token("<empty>")]
    EmptyKw,

    #[token("<")]
    Less,

    #[token("?")]
    Question,

    #[token("*")]
    Star,

    #[token("+")]
    Plus,

    #[token("/")]
    Slash,

    #[token(",")]
    Comma,

    #[token(";")]
    Semicolon,

    #[token(".")]
    Dot,

    #[regex(r"[0-9]+")]
    Number,

    /// Single-quoted literal terminal.
    #[regex(r"'(?:[^'\\]|\\.)*'")]
    Literal,

    /// Double-quoted pattern terminal.
    #[regex(r#""(?:[^"\\]|\\.)*""#)]
    Pattern,

    #[token("namespace")]
    KwNamespace,

    #[token("grammar")]
    KwGrammar,

    #[token("override")]
    KwOverride,

    #[token("skip")]
    KwSkip,

    #[token("leaf")]
    KwLeaf,

    #[token("transform")]
    KwTransform,

    /// Identifier. `§` is accepted so synthesized rule names can be written back.
    /// Defined after keywords so they take precedence.
    #[regex(r"[a-zA-Z_§][a-zA-Z0-9_§]*")]
    Id,

    /// `$self`, `$nothing`, `$alternative` and property names such as `$group2`.
    #[regex(r"\$[a-zA-Z_][a-zA-Z0-9_]*")]
    DollarId,

    /// `#create-missing-types` and friends.
    #[regex(r"#[a-zA-Z][a-zA-Z0-9\-]*")]
    Directive,

    #[regex(r"[ \t]+")]
    Whitespace,

    #[token("\n")]
    #[token("\r\n")]
    Newline,

    #[regex(r"//[^\n]*", allow_greedy = true)]
    LineComment,

    #[regex(r"/\*(?:[^*]|\*[^/])*\*/")]
    BlockComment,

    /// Coalesced unrecognized characters
    Garbage,
    /// Past the last token
    Eof,
}

impl SyntaxKind {
    #[inline]
    pub fn is_trivia(self) -> bool {
        matches!(
            self,
            SyntaxKind::Whitespace
                | SyntaxKind::Newline
                | SyntaxKind::LineComment
                | SyntaxKind::BlockComment
        )
    }
}

/// Zero-copy token: kind + span, text retrieved via [`token_text`] when needed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub kind: SyntaxKind,
    pub span: TextRange,
}

impl Token {
    #[inline]
    pub fn new(kind: SyntaxKind, span: TextRange) -> Self {
        Self { kind, span }
    }
}

/// Bitset of token kinds, used for recovery and FIRST sets.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct TokenSet(u64);

impl TokenSet {
    pub const EMPTY: TokenSet = TokenSet(0);

    /// Panics at compile time if any kind's discriminant >= 64.
    #[inline]
    pub const fn new(kinds: &[SyntaxKind]) -> Self {
        let mut bits = 0u64;
        let mut i = 0;
        while i < kinds.len() {
            let kind = kinds[i] as u16;
            assert!(kind < 64, "SyntaxKind value exceeds TokenSet capacity");
            bits |= 1 << kind;
            i += 1;
        }
        TokenSet(bits)
    }

    #[inline]
    pub const fn contains(&self, kind: SyntaxKind) -> bool {
        let kind = kind as u16;
        if kind >= 64 {
            return false;
        }
        self.0 & (1 << kind) != 0
    }

    #[inline]
    pub const fn union(self, other: TokenSet) -> TokenSet {
        TokenSet(self.0 | other.0)
    }
}

fn range_to_text_range(range: Range<usize>) -> TextRange {
    TextRange::new((range.start as u32).into(), (range.end as u32).into())
}

/// Tokenizes source into a vector of span-based tokens.
///
/// Consecutive lexer errors are coalesced into single `Garbage` tokens.
pub fn lex(source: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut lexer = SyntaxKind::lexer(source);
    let mut error_start: Option<usize> = None;

    loop {
        match lexer.next() {
            Some(Ok(kind)) => {
                if let Some(start) = error_start.take() {
                    let end = lexer.span().start;
                    tokens.push(Token::new(
                        SyntaxKind::Garbage,
                        range_to_text_range(start..end),
                    ));
                }
                tokens.push(Token::new(kind, range_to_text_range(lexer.span())));
            }
            Some(Err(())) => {
                if error_start.is_none() {
                    error_start = Some(lexer.span().start);
                }
            }
            None => {
                if let Some(start) = error_start.take() {
                    tokens.push(Token::new(
                        SyntaxKind::Garbage,
                        range_to_text_range(start..source.len()),
                    ));
                }
                break;
            }
        }
    }

    tokens
}

/// Retrieves the text slice for a token. O(1) slice into source.
#[inline]
pub fn token_text<'s>(source: &'s str, token: &Token) -> &'s str {
    &source[Range::<usize>::from(token.span)]
}

/// Content of a quoted literal or pattern token.
///
/// `\\` and an escaped quote are unescaped; any other backslash sequence is kept
/// verbatim so regex escapes such as `\d` survive in patterns.
pub fn unquote(text: &str) -> String {
    let mut chars = text.chars();
    let quote = chars.next();
    let inner = &text[quote.map_or(0, char::len_utf8)..];
    let inner = inner.strip_suffix(quote.unwrap_or('"')).unwrap_or(inner);

    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\'
            && let Some(&next) = chars.peek()
            && (next == '\\' || Some(next) == quote)
        {
            out.push(next);
            chars.next();
            continue;
        }
        out.push(c);
    }
    out
}
