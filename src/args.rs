//! Editor argument strings.
//!
//! Users type the extra command-line options for their editor as a single string,
//! e.g. `-n --wait "--title=Browser text"`. [`tokenize`] splits that string into the
//! argument vector handed to the child process, following the usual shell quoting
//! rules without ever running a shell. [`stringify`] goes the other way for display
//! and persistence.
//!
//! Quoting rules:
//!
//! - Whitespace separates arguments unless it is quoted or escaped.
//! - `'...'` is literal; no escapes are interpreted inside it.
//! - `"..."` interprets `\"` and `\\`; any other `\x` becomes `x`.
//! - Outside quotes, `\x` becomes `x` for any `x`, whitespace and quotes included.
//! - Quoted runs glue onto adjacent unquoted text: `bar="baz qux"` is `bar=baz qux`.
//! - An unterminated quote is treated as if it were not there; the rest of the input,
//!   whitespace included, becomes part of the last argument. A dangling quote with
//!   nothing after it adds no argument. Tokenizing never fails.

use std::borrow::Cow;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    Unquoted,
    InSingleQuote,
    InDoubleQuote,
    /// After a backslash outside quotes.
    Escaped,
    /// After a backslash inside double quotes.
    EscapedInDoubleQuote,
}

/// Split a user-typed argument string into an argument vector.
///
/// ```rust
/// use native_editor_host::args::tokenize;
///
/// assert_eq!(tokenize(r#"foo "bar baz" qux"#), ["foo", "bar baz", "qux"]);
/// assert_eq!(tokenize(r#"bar="baz qux""#), ["bar=baz qux"]);
/// assert!(tokenize("   ").is_empty());
/// ```
pub fn tokenize(input: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    // Distinguishes an empty quoted argument ("") from no argument at all.
    let mut in_token = false;
    // Set when the most recent quote began the current token; with the length at that
    // point it tells whether an unterminated quote contributed anything.
    let mut quote_began_token = false;
    let mut len_at_quote = 0;
    let mut state = ScanState::Unquoted;

    for c in input.chars() {
        state = match state {
            ScanState::Unquoted => match c {
                c if c.is_whitespace() => {
                    if in_token {
                        tokens.push(std::mem::take(&mut current));
                        in_token = false;
                    }
                    ScanState::Unquoted
                }
                '\'' | '"' => {
                    quote_began_token = !in_token;
                    len_at_quote = current.len();
                    in_token = true;
                    if c == '\'' {
                        ScanState::InSingleQuote
                    } else {
                        ScanState::InDoubleQuote
                    }
                }
                '\\' => ScanState::Escaped,
                c => {
                    current.push(c);
                    in_token = true;
                    ScanState::Unquoted
                }
            },
            ScanState::Escaped => {
                current.push(c);
                in_token = true;
                ScanState::Unquoted
            }
            ScanState::InSingleQuote => {
                if c == '\'' {
                    ScanState::Unquoted
                } else {
                    current.push(c);
                    ScanState::InSingleQuote
                }
            }
            ScanState::InDoubleQuote => match c {
                '"' => ScanState::Unquoted,
                '\\' => ScanState::EscapedInDoubleQuote,
                c => {
                    current.push(c);
                    ScanState::InDoubleQuote
                }
            },
            // `\"` and `\\` are the real escapes; for anything else the backslash is
            // dropped too.
            ScanState::EscapedInDoubleQuote => {
                current.push(c);
                ScanState::InDoubleQuote
            }
        };
    }

    // A trailing lone backslash contributes nothing. An open quote keeps what it
    // collected, but on its own it does not make an argument.
    let unterminated = matches!(
        state,
        ScanState::InSingleQuote | ScanState::InDoubleQuote | ScanState::EscapedInDoubleQuote
    );
    if unterminated && quote_began_token && current.len() == len_at_quote {
        in_token = false;
    }
    if in_token {
        tokens.push(current);
    }
    tokens
}

/// Re-tokenize arguments that arrive already split, normalizing their escaping.
///
/// Each element is tokenized on its own and the results are concatenated in order.
pub fn tokenize_all<I, S>(args: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    args.into_iter()
        .flat_map(|arg| tokenize(arg.as_ref()))
        .collect()
}

/// Join arguments into one string that [`tokenize`] splits back into the same vector.
///
/// ```rust
/// use native_editor_host::args::stringify;
///
/// assert_eq!(stringify(&["-n", "my file.txt", r#"say "hi""#]), r#"-n "my file.txt" "say \"hi\"""#);
/// ```
pub fn stringify<S: AsRef<str>>(tokens: &[S]) -> String {
    tokens
        .iter()
        .map(|token| quote(token.as_ref()))
        .collect::<Vec<_>>()
        .join(" ")
}

fn needs_quoting(c: char) -> bool {
    c.is_whitespace() || matches!(c, '"' | '\'' | '\\')
}

fn quote(token: &str) -> Cow<'_, str> {
    if !token.is_empty() && !token.chars().any(needs_quoting) {
        return Cow::Borrowed(token);
    }

    let mut out = String::with_capacity(token.len() + 2);
    out.push('"');
    for c in token.chars() {
        if matches!(c, '"' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
    Cow::Owned(out)
}
