//! Syntax classification — per-byte highlight tags for rendered rows.
//!
//! A [`SyntaxProfile`] describes one language: filename patterns, two
//! keyword tiers, comment tokens, and feature flags. The static [`PROFILES`]
//! registry is consulted in order when a file is opened or renamed; the
//! first matching profile wins.
//!
//! [`classify`] is the engine: a single left-to-right pass over a row's
//! render bytes producing one [`Highlight`] tag per byte plus the row's
//! trailing open-block-comment flag. The precedence order is load-bearing
//! and must not be reordered:
//!
//! 1. line comment (wins over everything to its right)
//! 2. block comment
//! 3. string
//! 4. number
//! 5. keyword
//!
//! A quote inside a comment is a comment; a comment token inside a string
//! is a string. Tests pin both.
//!
//! Rows depend on their predecessor only through the open-comment flag, so
//! an edit re-classifies forward exactly as far as the flag keeps changing
//! (see `Document::rehighlight_from`).

use leaf_term::ansi::Color;

// ---------------------------------------------------------------------------
// Highlight tags
// ---------------------------------------------------------------------------

/// Classification of one render byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Highlight {
    /// Unclassified text.
    #[default]
    Normal,
    /// Line comment (from the token to end of row).
    Comment,
    /// Block comment (possibly spanning rows).
    BlockComment,
    /// Tier-A keyword (flow control and declarations).
    KeywordA,
    /// Tier-B keyword (types).
    KeywordB,
    /// String literal, including quotes and escapes.
    String,
    /// Numeric literal, allowing one embedded decimal point.
    Number,
    /// Current search match overlay.
    Match,
}

impl Highlight {
    /// The terminal color for this tag.
    ///
    /// Uses the standard ANSI palette so highlighting adapts to the user's
    /// terminal colors instead of imposing our own.
    #[must_use]
    pub const fn color(self) -> Color {
        match self {
            Self::Normal => Color::Default,
            Self::Comment | Self::BlockComment => Color::Ansi(6), // cyan
            Self::KeywordA => Color::Ansi(3),                     // yellow
            Self::KeywordB => Color::Ansi(2),                     // green
            Self::String => Color::Ansi(5),                       // magenta
            Self::Number => Color::Ansi(1),                       // red
            Self::Match => Color::Ansi(4),                        // blue
        }
    }
}

// ---------------------------------------------------------------------------
// Profiles
// ---------------------------------------------------------------------------

/// A language descriptor driving [`classify`].
///
/// `block_comment` holds both delimiters or neither — a start token without
/// an end token would classify the rest of the file as comment forever.
#[derive(Debug)]
pub struct SyntaxProfile {
    /// Display name for the status line.
    pub name: &'static str,
    /// Filename patterns. A pattern starting with `.` matches a suffix;
    /// any other pattern matches by substring.
    pub patterns: &'static [&'static str],
    /// Tier-A keywords (flow control, declarations).
    pub keywords_a: &'static [&'static str],
    /// Tier-B keywords (types).
    pub keywords_b: &'static [&'static str],
    /// Token opening a comment that runs to end of row.
    pub line_comment: Option<&'static str>,
    /// Start and end tokens of block comments.
    pub block_comment: Option<(&'static str, &'static str)>,
    /// Whether numeric literals are highlighted.
    pub numbers: bool,
    /// Whether string literals are highlighted.
    pub strings: bool,
}

/// The static profile registry, consulted in order. First match wins.
pub static PROFILES: &[SyntaxProfile] = &[
    SyntaxProfile {
        name: "c",
        patterns: &[".c", ".h", ".cpp"],
        keywords_a: &[
            "switch", "if", "while", "for", "break", "continue", "return", "else", "struct",
            "union", "typedef", "static", "enum", "class", "case",
        ],
        keywords_b: &[
            "int", "long", "double", "float", "char", "unsigned", "signed", "void",
        ],
        line_comment: Some("//"),
        block_comment: Some(("/*", "*/")),
        numbers: true,
        strings: true,
    },
    SyntaxProfile {
        name: "rust",
        patterns: &[".rs"],
        keywords_a: &[
            "fn", "let", "mut", "if", "else", "match", "while", "for", "loop", "return",
            "struct", "enum", "impl", "trait", "use", "mod", "pub", "const", "static",
        ],
        keywords_b: &[
            "i8", "i16", "i32", "i64", "u8", "u16", "u32", "u64", "usize", "isize", "f32",
            "f64", "bool", "char", "str", "String",
        ],
        line_comment: Some("//"),
        block_comment: Some(("/*", "*/")),
        numbers: true,
        strings: true,
    },
];

/// Select a profile for a filename.
///
/// Iterates [`PROFILES`] in registration order; within a profile, patterns
/// are tried in order. A pattern starting with `.` matches the filename
/// suffix, anything else matches by substring. Returns `None` when no
/// profile matches (the caller clears all tags to normal).
#[must_use]
pub fn select_profile(filename: &str) -> Option<&'static SyntaxProfile> {
    PROFILES.iter().find(|profile| {
        profile.patterns.iter().any(|pat| {
            if pat.starts_with('.') {
                // Suffix match keeps the dot: "foo.c" matches ".c";
                // "fooc" does not, and neither does the bare name ".c".
                filename.ends_with(pat) && filename.len() > pat.len()
            } else {
                filename.contains(pat)
            }
        })
    })
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// Bytes that delimit keywords and numbers.
const SEPARATORS: &[u8] = b",.()+-/*=~%<>[]{};:&|!?";

/// Whether a byte separates tokens (whitespace, NUL, or fixed punctuation).
#[must_use]
pub fn is_separator(byte: u8) -> bool {
    byte == 0 || byte.is_ascii_whitespace() || SEPARATORS.contains(&byte)
}

/// Classify one row's render bytes.
///
/// `prev_open` is the predecessor row's trailing open-comment flag (false
/// for row 0). Returns one tag per render byte and this row's own trailing
/// flag. With no profile, every byte is [`Highlight::Normal`] and the flag
/// is false.
#[must_use]
pub fn classify(
    render: &[u8],
    profile: Option<&SyntaxProfile>,
    prev_open: bool,
) -> (Vec<Highlight>, bool) {
    let mut tags = vec![Highlight::Normal; render.len()];
    let Some(profile) = profile else {
        return (tags, false);
    };

    let mut prev_sep = true;
    let mut in_string: Option<u8> = None;
    let mut in_comment = prev_open;

    let mut i = 0;
    while i < render.len() {
        let byte = render[i];
        let prev_tag = if i > 0 { tags[i - 1] } else { Highlight::Normal };

        // 1. Line comment: from here to end of row, unconditionally.
        if let Some(token) = profile.line_comment {
            if in_string.is_none() && !in_comment && render[i..].starts_with(token.as_bytes()) {
                for tag in &mut tags[i..] {
                    *tag = Highlight::Comment;
                }
                break;
            }
        }

        // 2. Block comment.
        if let Some((start, end)) = profile.block_comment {
            if in_string.is_none() {
                if in_comment {
                    if render[i..].starts_with(end.as_bytes()) {
                        for tag in &mut tags[i..i + end.len()] {
                            *tag = Highlight::BlockComment;
                        }
                        i += end.len();
                        in_comment = false;
                        prev_sep = true;
                    } else {
                        tags[i] = Highlight::BlockComment;
                        i += 1;
                    }
                    continue;
                } else if render[i..].starts_with(start.as_bytes()) {
                    for tag in &mut tags[i..i + start.len()] {
                        *tag = Highlight::BlockComment;
                    }
                    i += start.len();
                    in_comment = true;
                    continue;
                }
            }
        }

        // 3. Strings.
        if profile.strings {
            if let Some(quote) = in_string {
                tags[i] = Highlight::String;
                // Backslash escapes the next byte, both stay string.
                if byte == b'\\' && i + 1 < render.len() {
                    tags[i + 1] = Highlight::String;
                    i += 2;
                    continue;
                }
                if byte == quote {
                    in_string = None;
                }
                i += 1;
                prev_sep = true;
                continue;
            }
            if byte == b'"' || byte == b'\'' {
                in_string = Some(byte);
                tags[i] = Highlight::String;
                i += 1;
                continue;
            }
        }

        // 4. Numbers: a digit after a separator or another number byte,
        //    or a single embedded decimal point.
        if profile.numbers
            && ((byte.is_ascii_digit() && (prev_sep || prev_tag == Highlight::Number))
                || (byte == b'.' && prev_tag == Highlight::Number))
        {
            tags[i] = Highlight::Number;
            i += 1;
            prev_sep = false;
            continue;
        }

        // 5. Keywords: only at token boundaries, longest match across both
        //    tiers, and the byte after the keyword must itself separate.
        if prev_sep {
            let mut best: Option<(usize, Highlight)> = None;
            let candidates = profile
                .keywords_a
                .iter()
                .map(|kw| (*kw, Highlight::KeywordA))
                .chain(profile.keywords_b.iter().map(|kw| (*kw, Highlight::KeywordB)));
            for (kw, tag) in candidates {
                let len = kw.len();
                let boundary =
                    i + len == render.len() || render.get(i + len).copied().is_some_and(is_separator);
                if render[i..].starts_with(kw.as_bytes())
                    && boundary
                    && best.is_none_or(|(bl, _)| len > bl)
                {
                    best = Some((len, tag));
                }
            }
            if let Some((len, tag)) = best {
                for t in &mut tags[i..i + len] {
                    *t = tag;
                }
                i += len;
                prev_sep = false;
                continue;
            }
        }

        // 6. Untagged byte; remember whether it separates tokens.
        prev_sep = is_separator(byte);
        i += 1;
    }

    (tags, in_comment)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
