//! Line tokenizer.
//!
//! Splits the comment-stripped content of one source line into tokens. Each
//! token is a word, a delimiter from a fixed longest-first table, or a quoted
//! string literal with its escapes already decoded. Keywords tokenize as
//! plain words; `and` / `or` / `not` are reclassified as operators later, at
//! expression build time.

use smallvec::SmallVec;
use strum::EnumString;

use crate::error::{RunResult, RuntimeError};

/// Delimiters matched longest-first, so `+=` wins over `+` and `<=` over `<`.
const DELIMITERS: [&str; 26] = [
    "+=", "-=", "*=", "/=", "%=", "^=", "==", "!=", "<=", ">=", // two-character
    "(", ")", "[", "]", ":", ";", ",", "@", // structural
    "+", "-", "*", "/", "%", "^", "<", ">", // single-character operators
];

// Bare `=` must be tried after every compound that ends in `=`.
const ASSIGN: &str = "=";

/// The kind of one token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TokenKind {
    /// A run of non-delimiter, non-whitespace characters.
    Word,
    /// An entry from the delimiter table.
    Delimiter,
    /// A quoted string literal, stored with quotes stripped and escapes decoded.
    Str,
}

/// One token of a source line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Token {
    pub kind: TokenKind,
    pub text: String,
}

impl Token {
    fn word(text: String) -> Self {
        Self {
            kind: TokenKind::Word,
            text,
        }
    }

    fn delimiter(text: &str) -> Self {
        Self {
            kind: TokenKind::Delimiter,
            text: text.to_owned(),
        }
    }

    /// True if this token is the given delimiter.
    pub fn is_delimiter(&self, text: &str) -> bool {
        self.kind == TokenKind::Delimiter && self.text == text
    }

    /// True if this token is the given bare word.
    pub fn is_word(&self, text: &str) -> bool {
        self.kind == TokenKind::Word && self.text == text
    }
}

/// Token storage; most lines fit inline without a heap allocation.
pub(crate) type TokenList = SmallVec<[Token; 8]>;

/// Splits one line's content into tokens.
///
/// # Errors
/// Returns a syntax error for unterminated string literals and unknown
/// escape sequences.
pub(crate) fn tokenize(content: &str) -> RunResult<TokenList> {
    let mut tokens = TokenList::new();
    let mut word = String::new();
    let mut rest = content;

    'outer: while let Some(c) = rest.chars().next() {
        if c == ' ' || c == '\t' {
            flush_word(&mut tokens, &mut word);
            rest = &rest[1..];
            continue;
        }
        if c == '"' || c == '\'' {
            flush_word(&mut tokens, &mut word);
            let (literal, remaining) = scan_string(rest, c)?;
            tokens.push(Token {
                kind: TokenKind::Str,
                text: literal,
            });
            rest = remaining;
            continue;
        }
        for delimiter in DELIMITERS {
            if rest.starts_with(delimiter) {
                flush_word(&mut tokens, &mut word);
                tokens.push(Token::delimiter(delimiter));
                rest = &rest[delimiter.len()..];
                continue 'outer;
            }
        }
        if rest.starts_with(ASSIGN) {
            flush_word(&mut tokens, &mut word);
            tokens.push(Token::delimiter(ASSIGN));
            rest = &rest[1..];
            continue;
        }
        word.push(c);
        rest = &rest[c.len_utf8()..];
    }
    flush_word(&mut tokens, &mut word);
    Ok(tokens)
}

fn flush_word(tokens: &mut TokenList, word: &mut String) {
    if !word.is_empty() {
        tokens.push(Token::word(std::mem::take(word)));
    }
}

/// Scans a quoted literal starting at `rest` (which begins with `quote`).
///
/// Returns the decoded content and the remaining input after the closing
/// quote.
fn scan_string(rest: &str, quote: char) -> RunResult<(String, &str)> {
    let mut literal = String::new();
    let mut chars = rest.char_indices().skip(1);
    while let Some((index, c)) = chars.next() {
        if c == quote {
            return Ok((literal, &rest[index + quote.len_utf8()..]));
        }
        if c == '\\' {
            let Some((_, escaped)) = chars.next() else {
                break;
            };
            literal.push(decode_escape(escaped)?);
            continue;
        }
        literal.push(c);
    }
    Err(RuntimeError::syntax("Unterminated string literal"))
}

fn decode_escape(c: char) -> RunResult<char> {
    match c {
        'n' => Ok('\n'),
        't' => Ok('\t'),
        'r' => Ok('\r'),
        'b' => Ok('\u{8}'),
        '\\' => Ok('\\'),
        '"' => Ok('"'),
        '\'' => Ok('\''),
        other => Err(RuntimeError::syntax(format!("Invalid escape sequence '\\{other}'"))),
    }
}

/// Reserved words of the language. Variable and function names may not
/// collide with any of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString)]
#[strum(serialize_all = "lowercase")]
pub(crate) enum Keyword {
    // type names
    Int,
    Long,
    Double,
    Str,
    Bool,
    Tuple,
    Type,
    Function,
    Void,
    // control keywords
    If,
    Else,
    Do,
    While,
    Until,
    For,
    Otherwise,
    Break,
    Continue,
    Return,
    Print,
    Try,
    Catch,
    // literals
    True,
    False,
    // operator keywords
    And,
    Or,
    Not,
}

impl Keyword {
    /// True if this keyword names a primitive type.
    pub fn is_type_name(self) -> bool {
        matches!(
            self,
            Self::Int
                | Self::Long
                | Self::Double
                | Self::Str
                | Self::Bool
                | Self::Tuple
                | Self::Type
                | Self::Function
                | Self::Void
        )
    }
}

/// True if `word` is a reserved word.
pub(crate) fn is_keyword(word: &str) -> bool {
    word.parse::<Keyword>().is_ok()
}

/// True if `word` names a primitive type.
pub(crate) fn is_type_name(word: &str) -> bool {
    word.parse::<Keyword>().is_ok_and(Keyword::is_type_name)
}

/// True if `name` matches `[A-Za-z_][A-Za-z0-9_]*`.
///
/// Keyword collision is checked separately by the scope table, which owns
/// declaration validation.
pub(crate) fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (first.is_ascii_alphabetic() || first == '_') && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn texts(content: &str) -> Vec<String> {
        tokenize(content).unwrap().into_iter().map(|t| t.text).collect()
    }

    #[test]
    fn words_and_delimiters() {
        assert_eq!(texts("int x = 5"), ["int", "x", "=", "5"]);
        assert_eq!(texts("print(a,b)"), ["print", "(", "a", ",", "b", ")"]);
    }

    #[test]
    fn compound_assignment_wins_over_bare_equals() {
        assert_eq!(texts("x += 1"), ["x", "+=", "1"]);
        assert_eq!(texts("x ^= 2"), ["x", "^=", "2"]);
        assert_eq!(texts("x=-1"), ["x", "=", "-", "1"]);
    }

    #[test]
    fn comparison_operators_match_longest_first() {
        assert_eq!(texts("a<=b"), ["a", "<=", "b"]);
        assert_eq!(texts("a<b"), ["a", "<", "b"]);
        assert_eq!(texts("a==b"), ["a", "==", "b"]);
        assert_eq!(texts("a!=b"), ["a", "!=", "b"]);
    }

    #[test]
    fn string_literals_span_until_matching_quote() {
        let tokens = tokenize("print \"a b\"").unwrap();
        assert_eq!(tokens[1].kind, TokenKind::Str);
        assert_eq!(tokens[1].text, "a b");

        let tokens = tokenize("'it\\'s'").unwrap();
        assert_eq!(tokens[0].text, "it's");
    }

    #[test]
    fn string_escapes_decode() {
        let tokens = tokenize(r#""a\tb\n\\""#).unwrap();
        assert_eq!(tokens[0].text, "a\tb\n\\");
    }

    #[test]
    fn invalid_escape_is_a_syntax_error() {
        let err = tokenize(r#""a\q""#).unwrap_err();
        assert!(err.message.contains("\\q"), "got: {}", err.message);
    }

    #[test]
    fn unterminated_literal_is_a_syntax_error() {
        assert!(tokenize("\"abc").is_err());
        assert!(tokenize("'abc\\'").is_err());
    }

    #[test]
    fn keywords_tokenize_as_words() {
        let tokens = tokenize("if not done:").unwrap();
        assert_eq!(tokens[0].kind, TokenKind::Word);
        assert_eq!(tokens[1].kind, TokenKind::Word);
        assert!(tokens[3].is_delimiter(":"));
    }

    #[test]
    fn identifier_validity() {
        assert!(is_valid_identifier("foo"));
        assert!(is_valid_identifier("_x1"));
        assert!(!is_valid_identifier("1x"));
        assert!(!is_valid_identifier("a-b"));
        assert!(!is_valid_identifier(""));
    }

    #[test]
    fn keyword_recognition() {
        assert!(is_keyword("while"));
        assert!(is_keyword("and"));
        assert!(is_type_name("long"));
        assert!(!is_type_name("while"));
        assert!(!is_keyword("whileish"));
    }
}
